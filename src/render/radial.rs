//! # Radial Painter

use super::Canvas;
use crate::error::Result;
use crate::font::FontContext;
use crate::layout::radial::{RadialPlan, SliceTone};
use crate::style::{Color, RadialStyle};

fn tone_color(style: &RadialStyle, tone: SliceTone) -> Color {
    match tone {
        SliceTone::Even => style.even_color,
        SliceTone::Odd => style.odd_color,
        SliceTone::Highlight => style.highlight_color,
    }
}

/// Wedges, then rays and their labels, then the inner disc and caption on
/// top of it, then the footer.
pub fn paint_radial(plan: &RadialPlan, style: &RadialStyle, ctx: &FontContext) -> Result<Canvas> {
    let mut canvas = Canvas::new(plan.width, plan.height, style.background)?;

    for slice in &plan.slices {
        let color = tone_color(style, slice.tone);
        canvas.fill_wedge(plan.center, plan.radius, slice.start, slice.end, color);
    }

    for ray in &plan.rays {
        let color = plan
            .slices
            .get(ray.slice)
            .map_or(style.even_color, |s| tone_color(style, s.tone));
        canvas.line(ray.from, ray.to, style.ray_width, color);
        canvas.draw_text(ctx, &ray.label, color)?;
    }

    if plan.inner_radius > 0.0 {
        canvas.clear_disc(plan.center, plan.inner_radius, style.background);
    }
    for line in &plan.caption {
        canvas.draw_text(ctx, line, style.caption_color)?;
    }

    if let Some(footer) = &style.footer {
        canvas.draw_footer(ctx, &plan.footer, footer.color)?;
    }
    Ok(canvas)
}
