//! # Table Painter
//!
//! Paint order is back to front: background, confetti, headers, rows,
//! cursor, appended image, footer.

use rand::Rng;

use super::Canvas;
use crate::error::Result;
use crate::font::FontContext;
use crate::image_loader::LoadedImage;
use crate::layout::table::{RowPlan, TablePlan};
use crate::style::{CellBoxes, TableStyle};

pub fn paint_table<R: Rng + ?Sized>(
    plan: &TablePlan,
    style: &TableStyle,
    ctx: &FontContext,
    appendix: Option<&LoadedImage>,
    rng: &mut R,
) -> Result<Canvas> {
    let mut canvas = Canvas::new(plan.width, plan.height, style.background)?;

    if let Some(confetti) = &style.confetti {
        canvas.scatter_confetti(confetti, rng);
    }

    for group in &plan.groups {
        if let Some(header) = &group.header {
            canvas.fill_rect(&header.rect, style.header_bg);
            canvas.draw_text(ctx, &header.text, style.header_fg)?;
        }
        for row in &group.rows {
            paint_row(&mut canvas, row, style, ctx)?;
        }
    }

    if let Some(cursor_style) = &style.cursor {
        for cursor in plan.groups.iter().filter_map(|g| g.cursor.as_ref()) {
            canvas.fill_polygon(&cursor.points, cursor_style.fill, Some(cursor_style.outline));
        }
    }

    if let (Some(slot), Some(image)) = (&plan.appendix, appendix) {
        canvas.draw_image(image, slot.x, slot.y);
    }

    if let Some(footer) = &style.footer {
        canvas.draw_footer(ctx, &plan.footer, footer.color)?;
    }
    Ok(canvas)
}

fn paint_row(canvas: &mut Canvas, row: &RowPlan, style: &TableStyle, ctx: &FontContext) -> Result<()> {
    if row.placeholder {
        canvas.fill_rect(&row.rect, style.cell_bg);
        if let Some(outline) = style.cell_outline {
            canvas.stroke_rect(&row.rect, outline);
        }
        for text in row.cells.iter().filter_map(|c| c.text.as_ref()) {
            canvas.draw_text(ctx, text, style.cell_fg)?;
        }
        return Ok(());
    }

    if style.cell_boxes == CellBoxes::PerRow {
        canvas.fill_rect(&row.rect, style.row_colors(row.flags).bg);
        if let Some(outline) = style.cell_outline {
            canvas.stroke_rect(&row.rect, outline);
        }
    }

    for cell in &row.cells {
        let Some(field) = cell.field.and_then(|i| style.fields.get(i)) else {
            continue;
        };
        let colors = style.cell_colors(row.flags, field);
        if style.cell_boxes == CellBoxes::PerField {
            canvas.fill_rect(&cell.rect, colors.bg);
            if let Some(outline) = style.cell_outline {
                canvas.stroke_rect(&cell.rect, outline);
            }
        }
        if let Some(text) = &cell.text {
            canvas.draw_text(ctx, text, colors.fg)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::BLOCK_FAMILY;
    use crate::layout::{table, PlanOptions};
    use crate::model::{Group, Record};
    use crate::style::{presets, Color};
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn options() -> PlanOptions<'static> {
        PlanOptions::at(
            NaiveDate::from_ymd_opt(2024, 1, 10)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        )
    }

    #[test]
    fn test_header_and_row_colors() {
        let ctx = FontContext::new();
        let mut style = presets::timetable().with_family(BLOCK_FAMILY);
        style.confetti = None;
        style.footer = None;
        let groups = vec![Group::new(
            "Centraal",
            vec![Record::new("Zandvoort").with_time("09:12").with_secondary("80")],
        )];
        let plan = table::plan(&groups, &style, &ctx, &options(), None).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let canvas = paint_table(&plan, &style, &ctx, None, &mut rng).unwrap();

        let header = plan.groups[0].header.as_ref().unwrap().rect;
        // a point in the header's right end, clear of the header text
        let hx = (header.right() - 2.0) as u32;
        let hy = (header.y + 2.0) as u32;
        assert_eq!(canvas.pixel(hx, hy), Some(style.header_bg));

        let row = plan.groups[0].rows[0].rect;
        let rx = (row.right() - 2.0) as u32;
        let ry = (row.y + 2.0) as u32;
        assert_eq!(canvas.pixel(rx, ry), Some(style.cell_bg));
    }

    #[test]
    fn test_per_field_cells_leave_gaps() {
        let ctx = FontContext::new();
        let mut style = presets::timetable().with_family(BLOCK_FAMILY);
        style.footer = None;
        let groups = vec![Group::new(
            "Centraal",
            vec![Record::new("Zandvoort").with_time("09:12").with_secondary("80")],
        )];
        let plan = table::plan(&groups, &style, &ctx, &options(), None).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let canvas = paint_table(&plan, &style, &ctx, None, &mut rng).unwrap();

        let cells = &plan.groups[0].rows[0].cells;
        let gap_x = (cells[0].rect.right() + style.field_separator / 2.0) as u32;
        let y = (cells[0].rect.y + 2.0) as u32;
        assert_eq!(canvas.pixel(gap_x, y).unwrap().a, 0);
        let inside_x = (cells[0].rect.x + 2.0) as u32;
        assert_eq!(canvas.pixel(inside_x, y), Some(style.cell_bg));
    }

    #[test]
    fn test_cursor_is_painted() {
        let ctx = FontContext::new();
        let mut style = presets::calendar().with_family(BLOCK_FAMILY);
        style.confetti = None;
        style.footer = None;
        let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        let groups = vec![Group::new(
            "January",
            vec![
                Record::new("Ada").with_time(" 3").with_date(day(3)),
                Record::new("Alan").with_time("20").with_date(day(20)),
            ],
        )
        .tracking_now()];
        let plan = table::plan(&groups, &style, &ctx, &options(), None).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let canvas = paint_table(&plan, &style, &ctx, None, &mut rng).unwrap();

        let cursor = plan.groups[0].cursor.as_ref().unwrap();
        let c = style.cursor.unwrap();
        // a point well inside the triangle, towards its base
        let p = &cursor.points;
        let cx = (p[0].x * 0.2 + p[1].x * 0.4 + p[2].x * 0.4) as u32;
        let cy = (p[0].y * 0.2 + p[1].y * 0.4 + p[2].y * 0.4) as u32;
        let painted = canvas.pixel(cx, cy).unwrap();
        assert!(painted == c.fill || painted == c.outline);
        assert_ne!(painted, Color::TRANSPARENT);
    }
}
