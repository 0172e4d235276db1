//! # Strip Layout
//!
//! Images placed left to right, top-aligned, with a margin around the
//! strip and a fixed gap between neighbours.

use serde::Serialize;

use super::{check_canvas, Rect};
use crate::error::{PlacardError, Result};
use crate::style::StripStyle;

#[derive(Debug, Clone, Serialize)]
pub struct StripPlan {
    pub width: f64,
    pub height: f64,
    /// One slot per image, in input order.
    pub slots: Vec<Rect>,
}

/// Plan a strip for images of the given pixel sizes.
pub fn plan(sizes: &[(f64, f64)], style: &StripStyle) -> Result<StripPlan> {
    if sizes.is_empty() {
        return Err(PlacardError::EmptyInput("strip has no images".to_string()));
    }
    let m = style.margin;
    let sep = style.separator.max(0.0);

    let mut slots = Vec::with_capacity(sizes.len());
    let mut x = m.left;
    for &(w, h) in sizes {
        slots.push(Rect::new(x, m.top, w, h));
        x += w + sep;
    }
    let content = x - sep - m.left;
    let tallest = sizes.iter().map(|&(_, h)| h).fold(0.0, f64::max);

    let width = m.left + content + m.right;
    let height = m.top + tallest + m.bottom;
    check_canvas(width, height)?;

    Ok(StripPlan {
        width,
        height,
        slots,
    })
}
