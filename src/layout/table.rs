//! # Table Layout
//!
//! Groups are laid out side by side, each a column of equal-height rows
//! below an optional header. Field widths inside a group are either fixed
//! by the style or measured from the widest text in that field.
//!
//! ```text
//!   margin.top
//!   +--------------------------------+   +----------------------+
//!   | header                         |   | header               |
//!   +--------------------------------+   +----------------------+
//!   header_separator
//!   +------+ +-----+ +---------------+   +------+ +-----+ +-----+
//!   | time | | sec | | label         |   | time | | sec | | ... |
//!   +------+ +-----+ +---------------+   +------+ +-----+ +-----+
//!   row_separator
//!   ...                                  group_separator between groups
//!   margin.bottom
//! ```
//!
//! A group without records gets one placeholder row. A group that tracks
//! "now" gets a triangular cursor in front of the first record dated today
//! or later.

use serde::Serialize;

use super::{check_canvas, check_confetti, place_text, plan_footer, FooterPlan, PlanOptions, Point, Rect, TextPlacement};
use crate::error::Result;
use crate::font::FontContext;
use crate::model::{Flags, Group, Record};
use crate::style::{Align, FieldSpec, FieldWidth, LayoutMode, TableStyle};

/// Complete geometry of a table render.
#[derive(Debug, Clone, Serialize)]
pub struct TablePlan {
    pub width: f64,
    pub height: f64,
    pub groups: Vec<GroupPlan>,
    /// Where the appended image goes, if there is one.
    pub appendix: Option<Rect>,
    pub footer: FooterPlan,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupPlan {
    pub x: f64,
    pub width: f64,
    pub header: Option<HeaderPlan>,
    /// One entry per record, or a single placeholder row.
    pub rows: Vec<RowPlan>,
    /// Resolved width of each style field.
    pub field_widths: Vec<f64>,
    pub cursor: Option<CursorPlan>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeaderPlan {
    pub rect: Rect,
    pub text: TextPlacement,
}

#[derive(Debug, Clone, Serialize)]
pub struct RowPlan {
    pub rect: Rect,
    /// Classification flags with the lowlight predicate applied.
    pub flags: Flags,
    pub cells: Vec<CellPlan>,
    pub placeholder: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CellPlan {
    /// Index into the style's field list; `None` for a placeholder cell.
    pub field: Option<usize>,
    pub rect: Rect,
    pub text: Option<TextPlacement>,
}

/// The "now" marker: a triangle whose tip touches the row text inset.
#[derive(Debug, Clone, Serialize)]
pub struct CursorPlan {
    /// Index of the record the cursor precedes; equals the record count when
    /// it sits after the last one.
    pub before: usize,
    /// True when it points at a record dated exactly today.
    pub on_row: bool,
    /// Tip first, then the two base corners.
    pub points: [Point; 3],
}

impl TablePlan {
    /// The canvas as a rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Every rectangle the renderer fills.
    pub fn painted_rects(&self) -> Vec<Rect> {
        let mut rects = vec![];
        for group in &self.groups {
            if let Some(header) = &group.header {
                rects.push(header.rect);
            }
            for row in &group.rows {
                rects.push(row.rect);
                rects.extend(row.cells.iter().map(|c| c.rect));
            }
            if let Some(cursor) = &group.cursor {
                rects.push(bounding_box(&cursor.points));
            }
        }
        rects.extend(self.appendix);
        rects
    }
}

impl GroupPlan {
    pub fn row_rects(&self) -> Vec<Rect> {
        self.rows.iter().map(|r| r.rect).collect()
    }
}

/// Smallest rectangle containing all points.
pub fn bounding_box(points: &[Point]) -> Rect {
    let min_x = points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let min_y = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let max_x = points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
    let max_y = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
    Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
}

// ── Planning ───────────────────────────────────────────────────

/// Plan a table. `appendix` is the pixel size of an image to append below
/// the rows, already loaded by the caller.
pub fn plan(
    groups: &[Group],
    style: &TableStyle,
    ctx: &FontContext,
    options: &PlanOptions,
    appendix: Option<(f64, f64)>,
) -> Result<TablePlan> {
    let row_h = style.row_height.max(0.0);
    let row_sep = style.row_separator.max(0.0);
    let field_sep = style.field_separator.max(0.0);
    let group_sep = style.group_separator.max(0.0);

    let header_block = if groups.iter().any(|g| g.header.is_some()) {
        style.header_height.max(0.0) + style.header_separator.max(0.0)
    } else {
        0.0
    };

    // The cursor triangle must fit left of the first group and above the
    // first row gap.
    let cursor = style
        .cursor
        .filter(|_| groups.iter().any(|g| g.tracks_now));
    let mut margin = style.margin;
    if let Some(c) = cursor {
        margin.left = margin.left.max(c.width - style.text_inset.x);
        margin.top = margin.top.max(row_h / 2.0 + row_sep / 2.0 - header_block);
    }

    let rows_top = margin.top + header_block;
    let row_y = |i: usize| rows_top + i as f64 * (row_h + row_sep);

    // Widths first: every group's x depends on the ones before it.
    let mut sizing = Vec::with_capacity(groups.len());
    for group in groups {
        sizing.push(group_width(group, style, ctx, field_sep)?);
    }

    let mut plans = Vec::with_capacity(groups.len());
    let mut x = margin.left;
    for (group, (field_widths, width)) in groups.iter().zip(sizing) {
        let header = match &group.header {
            Some(text) => Some(HeaderPlan {
                rect: Rect::new(x, margin.top, width, style.header_height.max(0.0)),
                text: place_text(
                    ctx,
                    text,
                    &style.header_font,
                    x + style.header_text_inset.x,
                    margin.top + style.header_text_inset.y,
                )?,
            }),
            None => None,
        };

        let mut rows = Vec::with_capacity(group.records.len().max(1));
        for (i, record) in group.records.iter().enumerate() {
            rows.push(plan_row(
                record,
                style,
                ctx,
                options,
                x,
                row_y(i),
                width,
                &field_widths,
                field_sep,
            )?);
        }
        if group.records.is_empty() {
            let rect = Rect::new(x, row_y(0), width, row_h);
            let text = place_text(
                ctx,
                &style.placeholder,
                &style.cell_font,
                x + style.text_inset.x,
                rect.y + style.text_inset.y,
            )?;
            rows.push(RowPlan {
                rect,
                flags: Flags::default(),
                cells: vec![CellPlan {
                    field: None,
                    rect,
                    text: Some(text),
                }],
                placeholder: true,
            });
        }

        let cursor = match cursor {
            Some(c) if group.tracks_now => {
                let (before, on_row) = cursor_slot(&group.records, options);
                let y = if on_row {
                    row_y(before) + row_h / 2.0
                } else {
                    row_y(before) - row_sep / 2.0
                };
                let tip_x = x + style.text_inset.x;
                Some(CursorPlan {
                    before,
                    on_row,
                    points: [
                        Point::new(tip_x, y),
                        Point::new(tip_x - c.width, y - row_h / 2.0),
                        Point::new(tip_x - c.width, y + row_h / 2.0),
                    ],
                })
            }
            _ => None,
        };

        plans.push(GroupPlan {
            x,
            width,
            header,
            rows,
            field_widths,
            cursor,
        });
        x += width + group_sep;
    }

    // Canvas
    let content_width: f64 = plans.iter().map(|g| g.width).sum::<f64>()
        + group_sep * plans.len().saturating_sub(1) as f64;
    let mut width = margin.left + content_width + margin.right;
    let mut height = if plans.is_empty() {
        margin.top + margin.bottom
    } else {
        let max_rows = groups.iter().map(|g| g.records.len()).max().unwrap_or(0).max(1);
        rows_top + max_rows as f64 * row_h + (max_rows - 1) as f64 * row_sep + margin.bottom
    };
    for cursor in plans.iter().filter_map(|g| g.cursor.as_ref()) {
        let bottom = cursor.points.iter().map(|p| p.y).fold(f64::MIN, f64::max);
        height = height.max(bottom);
    }

    let appendix = match appendix {
        Some((w, h)) => {
            height += style.appendix_separator.max(0.0) + h;
            width = width.max(margin.left + w + margin.right);
            Some(Rect::new(
                ((width - w) / 2.0).floor(),
                height - h - margin.bottom,
                w,
                h,
            ))
        }
        None => None,
    };

    width = width.max(1.0);
    height = height.max(1.0);
    check_canvas(width, height)?;
    check_confetti(style.confetti.as_ref())?;

    let footer = match &style.footer {
        Some(f) => plan_footer(ctx, f, width, height, options.note, options.now)?,
        None => FooterPlan::default(),
    };

    Ok(TablePlan {
        width,
        height,
        groups: plans,
        appendix,
        footer,
    })
}

/// Resolve field widths and the total group width.
fn group_width(
    group: &Group,
    style: &TableStyle,
    ctx: &FontContext,
    field_sep: f64,
) -> Result<(Vec<f64>, f64)> {
    let pad = 2.0 * style.text_inset.x;
    let mut widths = Vec::with_capacity(style.fields.len());
    for field in &style.fields {
        let width = match (style.mode, field.width) {
            (LayoutMode::FixedField, FieldWidth::Fixed(w)) => w.max(0.0),
            _ => widest(group, field, style, ctx)? + pad,
        };
        widths.push(width);
    }
    let content = widths.iter().sum::<f64>() + field_sep * widths.len().saturating_sub(1) as f64;

    if let Some(fixed) = style.group_width {
        return Ok((widths, fixed.max(0.0)));
    }

    let mut width = content;
    if style.mode == LayoutMode::Measured || style.fields.is_empty() {
        if let Some(header) = &group.header {
            let w = ctx.measure(header, &style.header_font)?.width;
            width = width.max(w + 2.0 * style.header_text_inset.x);
        }
        if group.records.is_empty() {
            let w = ctx.measure(&style.placeholder, &style.cell_font)?.width;
            width = width.max(w + pad);
        }
    }
    Ok((widths, width))
}

fn widest(group: &Group, field: &FieldSpec, style: &TableStyle, ctx: &FontContext) -> Result<f64> {
    let font = ctx.sized(&style.cell_font)?;
    Ok(group
        .records
        .iter()
        .filter_map(|r| r.field(field.kind))
        .map(|text| font.measure(&text).width)
        .fold(0.0, f64::max))
}

#[allow(clippy::too_many_arguments)]
fn plan_row(
    record: &Record,
    style: &TableStyle,
    ctx: &FontContext,
    options: &PlanOptions,
    x: f64,
    y: f64,
    width: f64,
    field_widths: &[f64],
    field_sep: f64,
) -> Result<RowPlan> {
    let rect = Rect::new(x, y, width, style.row_height.max(0.0));
    let mut cells = Vec::with_capacity(style.fields.len());
    let mut cell_x = x;
    for (i, (field, &fw)) in style.fields.iter().zip(field_widths).enumerate() {
        let cell = Rect::new(cell_x, y, fw, rect.height);
        let text = match record.field(field.kind) {
            Some(text) => {
                let measured = ctx.measure(&text, &style.cell_font)?.width;
                let tx = match field.align {
                    Align::Left => cell.x + style.text_inset.x,
                    Align::Center => {
                        cell.x + style.text_inset.x
                            + (fw - 2.0 * style.text_inset.x - measured) / 2.0
                    }
                };
                Some(place_text(ctx, &text, &style.cell_font, tx, y + style.text_inset.y)?)
            }
            None => None,
        };
        cells.push(CellPlan {
            field: Some(i),
            rect: cell,
            text,
        });
        cell_x += fw + field_sep;
    }
    Ok(RowPlan {
        rect,
        flags: record.effective_flags(options.lowlight),
        cells,
        placeholder: false,
    })
}

/// Where the cursor goes: before the first record dated today or later,
/// else after the last record. Records without a date are skipped.
fn cursor_slot(records: &[Record], options: &PlanOptions) -> (usize, bool) {
    let today = options.now.date();
    match records
        .iter()
        .position(|r| r.date.is_some_and(|d| d >= today))
    {
        Some(i) => (i, records[i].date == Some(today)),
        None => (records.len(), false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::BLOCK_FAMILY;
    use crate::style::presets;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn bus(time: &str, line: &str, dest: &str) -> Record {
        Record::new(dest).with_time(time).with_secondary(line)
    }

    fn dated(label: &str, y: i32, m: u32, d: u32) -> Record {
        Record::new(label).with_date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_timetable_geometry() {
        let ctx = FontContext::new();
        let style = presets::timetable().with_family(BLOCK_FAMILY);
        let groups = vec![
            Group::new(
                "Eindhoven, HTC/Berkenbos",
                vec![
                    bus("15:48", "407", "Eindhoven Station"),
                    bus("16:18", "407", "Eindhoven Station"),
                ],
            ),
            Group::new("Eindhoven, HTC/Dommeldal", vec![bus("15:46", "407", "Eindhoven Station")]),
        ];
        let plan = plan(&groups, &style, &ctx, &PlanOptions::at(at(2024, 1, 10)), None).unwrap();

        // 45 + 950 + 45 + 950 + 45
        assert!((plan.width - 2035.0).abs() < 0.001);
        // 25 + 78 + 20 + 2*60 + 15 + 25
        assert!((plan.height - 283.0).abs() < 0.001);

        let second = &plan.groups[1];
        assert!((second.x - 1040.0).abs() < 0.001);
        assert_eq!(second.field_widths, vec![200.0, 120.0, 600.0]);
        let row = &plan.groups[0].rows[1];
        assert!((row.rect.y - 198.0).abs() < 0.001);
        // destination cell starts after time and line plus two separators
        assert!((row.cells[2].rect.x - (45.0 + 200.0 + 15.0 + 120.0 + 15.0)).abs() < 0.001);
    }

    #[test]
    fn test_centered_text_uses_measured_width() {
        let ctx = FontContext::new();
        let style = presets::timetable().with_family(BLOCK_FAMILY);
        let groups = vec![Group::new("Stop", vec![bus("15:48", "407", "Best")])];
        let plan = plan(&groups, &style, &ctx, &PlanOptions::at(at(2024, 1, 10)), None).unwrap();
        let cell = &plan.groups[0].rows[0].cells[0];
        let text = cell.text.as_ref().unwrap();
        let left_gap = text.x - cell.rect.x;
        let right_gap = cell.rect.right() - (text.x + text.width);
        assert!((left_gap - right_gap).abs() < 0.001);
    }

    #[test]
    fn test_measured_mode_fits_widest_text() {
        let ctx = FontContext::new();
        let style = presets::departures().with_family(BLOCK_FAMILY);
        let groups = vec![Group::headless(vec![
            Record::new("Utrecht Centraal").with_time("15:48"),
            Record::new("Venlo").with_time("16:02"),
        ])];
        let plan = plan(&groups, &style, &ctx, &PlanOptions::at(at(2024, 1, 10)), None).unwrap();
        let label_w = ctx.measure("Utrecht Centraal", &style.cell_font).unwrap().width;
        assert!((plan.groups[0].field_widths[0] - (label_w + 60.0)).abs() < 0.001);
        for row in &plan.groups[0].rows {
            for cell in &row.cells {
                if let Some(text) = &cell.text {
                    assert!(text.x + text.width <= cell.rect.right() + 1e-9);
                }
            }
        }
        // headerless: rows start right at the top margin
        assert!((plan.groups[0].rows[0].rect.y - 50.0).abs() < 0.001);
    }

    #[test]
    fn test_rows_never_overlap_and_fit_canvas() {
        let ctx = FontContext::new();
        let style = presets::calendar().with_family(BLOCK_FAMILY);
        let groups = vec![
            Group::new("January 2024", (1..=5).map(|d| dated("x", 2024, 1, d)).collect()).tracking_now(),
            Group::new("February 2024", vec![]),
            Group::new("March 2024", (1..=2).map(|d| dated("y", 2024, 3, d)).collect()),
        ];
        let plan = plan(&groups, &style, &ctx, &PlanOptions::at(at(2024, 1, 31)), None).unwrap();
        for group in &plan.groups {
            let rects = group.row_rects();
            for (i, a) in rects.iter().enumerate() {
                for b in &rects[i + 1..] {
                    assert!(!a.intersects(b));
                }
            }
        }
        let bounds = plan.bounds();
        for rect in plan.painted_rects() {
            assert!(bounds.contains(&rect), "{:?} outside {:?}", rect, bounds);
        }
    }

    #[test]
    fn test_cursor_precedes_first_future_record() {
        let ctx = FontContext::new();
        let style = presets::calendar().with_family(BLOCK_FAMILY);
        let groups = vec![Group::new(
            "January 2024",
            vec![
                dated("a", 2024, 1, 5),
                dated("b", 2024, 1, 20),
                dated("c", 2024, 2, 1),
            ],
        )
        .tracking_now()];
        let plan = plan(&groups, &style, &ctx, &PlanOptions::at(at(2024, 1, 10)), None).unwrap();
        let group = &plan.groups[0];
        let cursor = group.cursor.as_ref().unwrap();
        assert_eq!(cursor.before, 1);
        assert!(!cursor.on_row);
        // tip sits in the gap between rows 0 and 1
        let gap_mid = (group.rows[0].rect.bottom() + group.rows[1].rect.y) / 2.0;
        assert!((cursor.points[0].y - gap_mid).abs() < 0.001);
        assert!((cursor.points[0].x - (group.x + style.text_inset.x)).abs() < 0.001);
    }

    #[test]
    fn test_cursor_points_at_todays_row() {
        let ctx = FontContext::new();
        let style = presets::calendar().with_family(BLOCK_FAMILY);
        let groups =
            vec![Group::new("January", vec![dated("a", 2024, 1, 5), dated("b", 2024, 1, 10)]).tracking_now()];
        let plan = plan(&groups, &style, &ctx, &PlanOptions::at(at(2024, 1, 10)), None).unwrap();
        let group = &plan.groups[0];
        let cursor = group.cursor.as_ref().unwrap();
        assert_eq!(cursor.before, 1);
        assert!(cursor.on_row);
        let center = group.rows[1].rect.y + group.rows[1].rect.height / 2.0;
        assert!((cursor.points[0].y - center).abs() < 0.001);
    }

    #[test]
    fn test_cursor_after_last_record() {
        let ctx = FontContext::new();
        let style = presets::calendar().with_family(BLOCK_FAMILY);
        let groups = vec![Group::new("January", vec![dated("a", 2024, 1, 5)]).tracking_now()];
        let plan = plan(&groups, &style, &ctx, &PlanOptions::at(at(2024, 1, 30)), None).unwrap();
        let cursor = plan.groups[0].cursor.as_ref().unwrap();
        assert_eq!(cursor.before, 1);
        assert!(plan.bounds().contains(&bounding_box(&cursor.points)));
    }

    #[test]
    fn test_exactly_one_cursor_per_tracking_group() {
        let ctx = FontContext::new();
        let style = presets::calendar().with_family(BLOCK_FAMILY);
        let groups = vec![
            Group::new("January", vec![dated("a", 2024, 1, 5)]).tracking_now(),
            Group::new("February", vec![dated("b", 2024, 2, 5)]),
        ];
        let plan = plan(&groups, &style, &ctx, &PlanOptions::at(at(2024, 1, 1)), None).unwrap();
        assert!(plan.groups[0].cursor.is_some());
        assert!(plan.groups[1].cursor.is_none());
    }

    #[test]
    fn test_empty_group_gets_placeholder_row() {
        let ctx = FontContext::new();
        let style = presets::timetable().with_family(BLOCK_FAMILY);
        let groups = vec![Group::new("Eindhoven, HTC/The Strip", vec![])];
        let plan = plan(&groups, &style, &ctx, &PlanOptions::at(at(2024, 1, 10)), None).unwrap();
        let rows = &plan.groups[0].rows;
        assert_eq!(rows.len(), 1);
        assert!(rows[0].placeholder);
        let text = rows[0].cells[0].text.as_ref().unwrap();
        assert_eq!(text.text, "no (more) busses");
        assert!(plan.height >= rows[0].rect.bottom());
        assert!((rows[0].rect.width - 950.0).abs() < 0.001);
    }

    #[test]
    fn test_no_groups_gives_margin_sized_canvas() {
        let ctx = FontContext::new();
        let style = presets::timetable().with_family(BLOCK_FAMILY);
        let plan = plan(&[], &style, &ctx, &PlanOptions::at(at(2024, 1, 10)), None).unwrap();
        assert!((plan.width - 90.0).abs() < 0.001);
        assert!((plan.height - 50.0).abs() < 0.001);
        assert!(plan.groups.is_empty());
    }

    #[test]
    fn test_lowlight_applies_to_row_flags() {
        let ctx = FontContext::new();
        let style = presets::timetable().with_family(BLOCK_FAMILY);
        let groups = vec![Group::new(
            "Stop",
            vec![bus("15:48", "20", "High Tech Campus"), bus("15:50", "407", "Station")],
        )];
        let mut options = PlanOptions::at(at(2024, 1, 10));
        options.lowlight = Some("Campus");
        let plan = plan(&groups, &style, &ctx, &options, None).unwrap();
        assert!(plan.groups[0].rows[0].flags.lowlighted);
        assert!(!plan.groups[0].rows[1].flags.lowlighted);
    }

    #[test]
    fn test_appendix_is_centered_below_rows() {
        let ctx = FontContext::new();
        let style = presets::timetable().with_family(BLOCK_FAMILY);
        let groups = vec![Group::new("Stop", vec![bus("15:48", "407", "Station")])];
        let plan = plan(
            &groups,
            &style,
            &ctx,
            &PlanOptions::at(at(2024, 1, 10)),
            Some((400.0, 300.0)),
        )
        .unwrap();
        let map = plan.appendix.unwrap();
        // 25 + 78 + 20 + 60 + 25, plus 20 + 300
        assert!((plan.height - 528.0).abs() < 0.001);
        assert!((map.y - 203.0).abs() < 0.001);
        assert!((map.x - ((plan.width - 400.0) / 2.0).floor()).abs() < 0.001);
        let last_row = plan.groups[0].rows[0].rect;
        assert!(!map.intersects(&last_row));
    }

    #[test]
    fn test_huge_input_overflows() {
        let ctx = FontContext::new();
        let style = presets::timetable().with_family(BLOCK_FAMILY);
        let records: Vec<Record> = (0..400).map(|_| bus("15:48", "407", "Station")).collect();
        let groups = vec![Group::new("Stop", records)];
        let err = plan(&groups, &style, &ctx, &PlanOptions::at(at(2024, 1, 10)), None).unwrap_err();
        assert_eq!(err.kind(), "LayoutOverflowError");
    }

    #[test]
    fn test_runaway_confetti_overflows() {
        let ctx = FontContext::new();
        let mut style = presets::calendar().with_family(BLOCK_FAMILY);
        if let Some(confetti) = style.confetti.as_mut() {
            confetti.min_count = 4_000_000_000;
        }
        let groups = vec![Group::new("December 2023", vec![])];
        let err = plan(&groups, &style, &ctx, &PlanOptions::at(at(2024, 1, 10)), None).unwrap_err();
        assert_eq!(err.kind(), "LayoutOverflowError");
    }
}
