//! # Radial Layout
//!
//! Pie geometry is angular. Each record gets a slice proportional to its
//! value; angles are in degrees, start at three o'clock and grow clockwise
//! (the canvas y axis points down).
//!
//! Rays mark a fixed number of equal sectors. A slice gets a ray, and a
//! label at the outer end of that ray, when its end crosses a sector
//! boundary that no earlier slice has crossed. Where the label sits
//! relative to the ray end comes from a hand-tuned table of angle buckets
//! that keeps labels off the circle near the top and bottom.

use serde::Serialize;

use super::{check_canvas, place_text, plan_footer, FooterPlan, PlanOptions, Point, TextPlacement};
use crate::error::{PlacardError, Result};
use crate::font::FontContext;
use crate::model::{format_value, Record};
use crate::style::RadialStyle;

/// Offsets for a label anchored at the outer end of a ray.
///
/// The label's top-left corner is `end + factor * label size + em * font
/// size`, per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelAnchor {
    /// Applies to mid-angles below this bound (degrees).
    pub below: f64,
    pub width_factor: f64,
    pub height_factor: f64,
    pub dx_em: f64,
    pub dy_em: f64,
}

const fn anchor(below: f64, width_factor: f64, height_factor: f64, dx_em: f64, dy_em: f64) -> LabelAnchor {
    LabelAnchor {
        below,
        width_factor,
        height_factor,
        dx_em,
        dy_em,
    }
}

/// Label placement buckets, in ascending angle order. The last entry
/// catches everything up to 360.
pub const LABEL_ANCHORS: [LabelAnchor; 11] = [
    anchor(30.0, 0.0, -0.5, 0.0, 0.0),
    anchor(78.0, 0.0, 0.0, 0.0, 0.0),
    anchor(90.0, 0.0, 0.0, -2.0, 0.75),
    anchor(102.0, -1.0, 0.0, 2.0, 0.75),
    anchor(150.0, -1.0, 0.0, 0.0, 0.0),
    anchor(210.0, -1.0, -0.5, 0.0, 0.0),
    anchor(258.0, -1.0, -1.0, 0.0, 0.0),
    anchor(270.0, -1.0, -1.0, 2.0, -0.75),
    anchor(282.0, 0.0, -1.0, -2.0, -0.75),
    anchor(330.0, 0.0, -1.0, 0.0, 0.0),
    anchor(f64::INFINITY, 0.0, -0.5, 0.0, 0.0),
];

/// The bucket for a mid-angle in degrees.
pub fn label_anchor(angle: f64) -> &'static LabelAnchor {
    LABEL_ANCHORS
        .iter()
        .find(|a| angle < a.below)
        .unwrap_or(&LABEL_ANCHORS[LABEL_ANCHORS.len() - 1])
}

/// Which style color a slice (and its ray and label) is painted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SliceTone {
    Even,
    Odd,
    Highlight,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlicePlan {
    /// Index of the record this slice shows.
    pub record: usize,
    pub start: f64,
    pub end: f64,
    pub tone: SliceTone,
}

impl SlicePlan {
    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    pub fn mid(&self) -> f64 {
        (self.start + self.end) / 2.0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RayPlan {
    /// Index into `RadialPlan::slices`.
    pub slice: usize,
    pub angle: f64,
    pub from: Point,
    pub to: Point,
    pub label: TextPlacement,
}

#[derive(Debug, Clone, Serialize)]
pub struct RadialPlan {
    pub width: f64,
    pub height: f64,
    pub center: Point,
    pub radius: f64,
    pub inner_radius: f64,
    pub slices: Vec<SlicePlan>,
    pub rays: Vec<RayPlan>,
    pub caption: Vec<TextPlacement>,
    pub footer: FooterPlan,
}

/// Point at `radius` from `center`, `angle` degrees clockwise from three
/// o'clock.
pub fn polar(center: Point, radius: f64, angle: f64) -> Point {
    let rad = angle.to_radians();
    Point::new(center.x + radius * rad.cos(), center.y + radius * rad.sin())
}

pub fn plan(
    records: &[Record],
    caption: &[String],
    style: &RadialStyle,
    ctx: &FontContext,
    options: &PlanOptions,
) -> Result<RadialPlan> {
    for record in records {
        record.validate()?;
    }
    let values: Vec<f64> = records.iter().map(|r| r.value.unwrap_or(0.0)).collect();
    let total: f64 = values.iter().sum();
    if records.is_empty() || total <= 0.0 {
        return Err(PlacardError::EmptyInput(format!(
            "pie chart needs a positive total, got {} records summing to {}",
            records.len(),
            total
        )));
    }
    check_canvas(style.width, style.height)?;

    let center = Point::new(style.width / 2.0, style.height / 2.0);
    let ray_angle = if style.number_of_rays > 0 {
        360.0 / style.number_of_rays as f64
    } else {
        f64::INFINITY
    };

    let mut slices = Vec::with_capacity(records.len());
    let mut rays = vec![];
    let mut cumulative = 0.0_f64;
    let mut start = 0.0;
    let mut last_ray = 0.0;
    for (i, (record, value)) in records.iter().zip(&values).enumerate() {
        cumulative += value;
        // The last slice closes the circle exactly.
        let end = if i + 1 == records.len() {
            360.0
        } else {
            cumulative / total * 360.0
        };
        let tone = if record.highlighted {
            SliceTone::Highlight
        } else if i % 2 == 0 {
            SliceTone::Even
        } else {
            SliceTone::Odd
        };
        let slice = SlicePlan {
            record: i,
            start,
            end,
            tone,
        };

        let boundary = (end / ray_angle).floor() * ray_angle;
        if ray_angle.is_finite() && boundary > last_ray {
            let angle = slice.mid();
            let from = polar(center, style.ray_start, angle);
            let to = polar(center, style.ray_end, angle);
            let text = format!(" {} ({}) ", record.label, format_value(*value));
            let size = ctx.measure(&text, &style.label_font)?;
            let a = label_anchor(angle);
            let fs = style.label_font.size;
            let x = to.x + a.width_factor * size.width + a.dx_em * fs;
            let y = to.y + a.height_factor * size.height + a.dy_em * fs;
            rays.push(RayPlan {
                slice: slices.len(),
                angle,
                from,
                to,
                label: place_text(ctx, &text, &style.label_font, x, y)?,
            });
            last_ray = boundary;
        }

        slices.push(slice);
        start = end;
    }

    // Caption: first line large, above the center; the rest below it.
    let mut placed = Vec::with_capacity(caption.len());
    for (i, line) in caption.iter().enumerate() {
        let (font, y) = if i == 0 {
            (&style.caption_font, center.y - 2.0 * style.caption_font.size)
        } else {
            (
                &style.label_font,
                center.y + (i - 1) as f64 * 2.0 * style.label_font.size,
            )
        };
        let w = ctx.measure(line, font)?.width;
        placed.push(place_text(ctx, line, font, center.x - w / 2.0, y)?);
    }

    let footer = match &style.footer {
        Some(f) => plan_footer(ctx, f, style.width, style.height, options.note, options.now)?,
        None => FooterPlan::default(),
    };

    Ok(RadialPlan {
        width: style.width,
        height: style.height,
        center,
        radius: style.radius,
        inner_radius: style.inner_radius,
        slices,
        rays,
        caption: placed,
        footer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::BLOCK_FAMILY;
    use crate::style::presets;
    use chrono::NaiveDate;

    fn options() -> PlanOptions<'static> {
        PlanOptions::at(
            NaiveDate::from_ymd_opt(2024, 1, 10)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        )
    }

    fn records(values: &[f64]) -> Vec<Record> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Record::new(&format!("Inventor {}", i)).with_value(*v))
            .collect()
    }

    #[test]
    fn test_spans_sum_to_full_circle() {
        let ctx = FontContext::new();
        let style = presets::pie().with_family(BLOCK_FAMILY);
        let plan = plan(&records(&[1.0, 2.0, 3.0, 4.0]), &[], &style, &ctx, &options()).unwrap();
        let spans: Vec<f64> = plan.slices.iter().map(|s| s.span()).collect();
        let expected = [36.0, 72.0, 108.0, 144.0];
        for (span, want) in spans.iter().zip(expected) {
            assert!((span - want).abs() < 1e-9, "{} != {}", span, want);
        }
        assert!((spans.iter().sum::<f64>() - 360.0).abs() < 1e-9);
        assert_eq!(plan.slices.last().unwrap().end, 360.0);
    }

    #[test]
    fn test_one_ray_per_crossed_sector() {
        let ctx = FontContext::new();
        let style = presets::pie().with_family(BLOCK_FAMILY);
        // 100 slices of 3.6 degrees against 12 degree sectors
        let plan = plan(&records(&[1.0; 100]), &[], &style, &ctx, &options()).unwrap();
        assert_eq!(plan.rays.len(), 30);
        let mut slices: Vec<usize> = plan.rays.iter().map(|r| r.slice).collect();
        slices.dedup();
        assert_eq!(slices.len(), 30);
    }

    #[test]
    fn test_small_first_slice_gets_no_ray() {
        let ctx = FontContext::new();
        let style = presets::pie().with_family(BLOCK_FAMILY);
        let plan = plan(&records(&[1.0, 99.0]), &[], &style, &ctx, &options()).unwrap();
        assert_eq!(plan.rays.len(), 1);
        assert_eq!(plan.rays[0].slice, 1);
    }

    #[test]
    fn test_ray_endpoints() {
        let ctx = FontContext::new();
        let style = presets::pie().with_family(BLOCK_FAMILY);
        let plan = plan(&records(&[1.0, 1.0]), &[], &style, &ctx, &options()).unwrap();
        // first slice spans 0..180, its ray points straight down
        let ray = &plan.rays[0];
        assert!((ray.angle - 90.0).abs() < 1e-9);
        assert!((ray.from.x - 960.0).abs() < 1e-6);
        assert!((ray.from.y - (513.0 + 410.0)).abs() < 1e-6);
        assert!((ray.to.y - (513.0 + 450.0)).abs() < 1e-6);
    }

    #[test]
    fn test_label_anchor_buckets() {
        assert_eq!(label_anchor(0.0).height_factor, -0.5);
        assert_eq!(label_anchor(45.0).width_factor, 0.0);
        assert_eq!(label_anchor(89.9).dx_em, -2.0);
        assert_eq!(label_anchor(90.0).width_factor, -1.0);
        assert_eq!(label_anchor(180.0).height_factor, -0.5);
        assert_eq!(label_anchor(275.0).dy_em, -0.75);
        assert_eq!(label_anchor(359.0).height_factor, -0.5);
    }

    #[test]
    fn test_label_left_of_ray_on_left_half() {
        let ctx = FontContext::new();
        let style = presets::pie().with_family(BLOCK_FAMILY);
        // three equal slices: the middle one's ray points at 180 degrees
        let plan = plan(&records(&[1.0, 1.0, 1.0]), &[], &style, &ctx, &options()).unwrap();
        let ray = plan.rays.iter().find(|r| (r.angle - 180.0).abs() < 1e-9).unwrap();
        assert!((ray.label.x + ray.label.width - ray.to.x).abs() < 1e-6);
        assert!((ray.label.y + ray.label.height / 2.0 - ray.to.y).abs() < 1e-6);
        assert_eq!(ray.label.text, " Inventor 1 (1) ");
    }

    #[test]
    fn test_tones() {
        let ctx = FontContext::new();
        let style = presets::pie().with_family(BLOCK_FAMILY);
        let mut recs = records(&[1.0, 1.0, 1.0]);
        recs[2].highlighted = true;
        let plan = plan(&recs, &[], &style, &ctx, &options()).unwrap();
        let tones: Vec<SliceTone> = plan.slices.iter().map(|s| s.tone).collect();
        assert_eq!(tones, vec![SliceTone::Even, SliceTone::Odd, SliceTone::Highlight]);
    }

    #[test]
    fn test_caption_lines_centered() {
        let ctx = FontContext::new();
        let style = presets::pie().with_family(BLOCK_FAMILY);
        let caption = vec![
            "Circle of Inventors".to_string(),
            "based on patent families".to_string(),
            "as of January 2024".to_string(),
        ];
        let plan = plan(&records(&[1.0]), &caption, &style, &ctx, &options()).unwrap();
        for line in &plan.caption {
            assert!((line.x + line.width / 2.0 - 960.0).abs() < 1e-6);
        }
        assert!((plan.caption[0].y - (513.0 - 64.0)).abs() < 1e-6);
        assert!((plan.caption[1].y - 513.0).abs() < 1e-6);
        assert!((plan.caption[2].y - 553.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_total_is_empty_input() {
        let ctx = FontContext::new();
        let style = presets::pie().with_family(BLOCK_FAMILY);
        let err = plan(&records(&[0.0, 0.0]), &[], &style, &ctx, &options()).unwrap_err();
        assert_eq!(err.kind(), "EmptyInputError");
        let err = plan(&[], &[], &style, &ctx, &options()).unwrap_err();
        assert_eq!(err.kind(), "EmptyInputError");
    }
}
