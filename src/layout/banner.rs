//! # Banner Layout
//!
//! Two lines of text in one family. The first line sets the width; the
//! second is re-sized so it spans the same width, then re-measured at that
//! size so the painted line matches the planned one.

use serde::Serialize;

use super::{check_canvas, place_text, TextPlacement};
use crate::error::{PlacardError, Result};
use crate::font::FontContext;
use crate::style::BannerStyle;

#[derive(Debug, Clone, Serialize)]
pub struct BannerPlan {
    pub width: f64,
    pub height: f64,
    pub title: TextPlacement,
    /// Absent when there is no second line.
    pub subtitle: Option<TextPlacement>,
}

pub fn plan(title: &str, subtitle: &str, style: &BannerStyle, ctx: &FontContext) -> Result<BannerPlan> {
    if title.trim().is_empty() {
        return Err(PlacardError::EmptyInput("banner has no title".to_string()));
    }
    let m = style.margin;
    let first = place_text(ctx, title, &style.font, m.left, m.top)?;

    let subtitle = if subtitle.trim().is_empty() {
        None
    } else {
        let natural = ctx.measure(subtitle, &style.font)?;
        let size = if natural.width > 0.0 {
            (style.font.size * first.width / natural.width).floor().max(1.0)
        } else {
            style.font.size
        };
        let y = m.top + first.height + style.line_gap;
        Some(place_text(ctx, subtitle, &style.font.with_size(size), m.left, y)?)
    };

    let width = m.left + first.width + m.right;
    let second_height = subtitle.as_ref().map_or(0.0, |s| s.height + style.line_gap);
    let height = m.top + first.height + second_height + m.bottom;
    check_canvas(width, height)?;

    Ok(BannerPlan {
        width: width.max(1.0),
        height: height.max(1.0),
        title: first,
        subtitle,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::BLOCK_FAMILY;
    use crate::style::presets;

    #[test]
    fn test_second_line_scaled_to_first() {
        let ctx = FontContext::new();
        let style = presets::word_of_day().with_family(BLOCK_FAMILY);
        // 4 glyphs over 16: a quarter of the size
        let plan = plan("gist", "thecentralpoints", &style, &ctx).unwrap();
        let sub = plan.subtitle.unwrap();
        assert!((sub.font.size - 60.0).abs() < 0.001);
        assert!((sub.width - plan.title.width).abs() < 0.001);
        assert!((plan.width - (50.0 + plan.title.width + 50.0)).abs() < 0.001);
        assert!((plan.height - (150.0 + 240.0 + 60.0 + 250.0)).abs() < 0.001);
        assert!((sub.y - (150.0 + 240.0)).abs() < 0.001);
    }

    #[test]
    fn test_size_is_floored() {
        let ctx = FontContext::new();
        let style = presets::word_of_day().with_family(BLOCK_FAMILY);
        let plan = plan("abc", "abcdefg", &style, &ctx).unwrap();
        // 240 * 3 / 7 = 102.86
        assert!((plan.subtitle.unwrap().font.size - 102.0).abs() < 0.001);
    }

    #[test]
    fn test_empty_title_is_empty_input() {
        let ctx = FontContext::new();
        let style = presets::word_of_day().with_family(BLOCK_FAMILY);
        let err = plan("  ", "definition", &style, &ctx).unwrap_err();
        assert_eq!(err.kind(), "EmptyInputError");
    }

    #[test]
    fn test_missing_subtitle_gives_one_line() {
        let ctx = FontContext::new();
        let style = presets::word_of_day().with_family(BLOCK_FAMILY);
        let plan = plan("word", "", &style, &ctx).unwrap();
        assert!(plan.subtitle.is_none());
        assert!((plan.height - (150.0 + 240.0 + 250.0)).abs() < 0.001);
    }
}
