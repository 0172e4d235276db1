//! # Layout Planner
//!
//! Turns records and a style table into absolute pixel geometry. Planning
//! is pure: it reads the records, the style and the font metrics, and
//! returns a plan. Nothing is painted here and nothing is mutated.
//!
//! Every piece of text in a plan is a [`TextPlacement`] that carries the
//! exact [`FontSpec`] it was measured with. The renderer paints it with the
//! same spec, through the same [`FontContext`], so the measured width is
//! the painted width.
//!
//! - [`table`]: groups side by side, records stacked under a header
//! - [`radial`]: pie slices, rays and labels
//! - [`banner`]: two lines, the second scaled to the width of the first
//! - [`strip`]: images side by side

pub mod banner;
pub mod radial;
pub mod strip;
pub mod table;

use std::fmt::Write;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::{PlacardError, Result};
use crate::font::FontContext;
use crate::style::{ConfettiStyle, FontSpec, FooterStyle, Side};

/// Largest canvas side, in pixels.
pub const MAX_CANVAS_SIDE: f64 = 16384.0;
/// Largest canvas area, in pixels.
pub const MAX_CANVAS_PIXELS: f64 = 64.0 * 1024.0 * 1024.0;
/// Most confetti dots painted on one canvas.
pub const MAX_CONFETTI: u32 = 10_000;

/// Request-level inputs shared by the planners.
#[derive(Debug, Clone, Copy)]
pub struct PlanOptions<'a> {
    /// Render time: places the cursor and stamps the footer.
    pub now: NaiveDateTime,
    /// Records whose label contains this string are lowlighted.
    pub lowlight: Option<&'a str>,
    /// Free-form footer text.
    pub note: Option<&'a str>,
}

impl<'a> PlanOptions<'a> {
    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            now,
            lowlight: None,
            note: None,
        }
    }
}

// ── Geometry ───────────────────────────────────────────────────

/// An axis-aligned rectangle, top-left origin, y down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// True when the two rectangles share interior area. Touching edges
    /// don't count.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// True when `other` lies inside this rectangle (edges inclusive).
    pub fn contains(&self, other: &Rect) -> bool {
        const EPS: f64 = 1e-6;
        other.x >= self.x - EPS
            && other.y >= self.y - EPS
            && other.right() <= self.right() + EPS
            && other.bottom() <= self.bottom() + EPS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A measured string at an absolute position. `(x, y)` is the top-left
/// corner of its text box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextPlacement {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub font: FontSpec,
}

impl TextPlacement {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Measure `text` and place it with its box's top-left corner at `(x, y)`.
pub fn place_text(
    ctx: &FontContext,
    text: &str,
    font: &FontSpec,
    x: f64,
    y: f64,
) -> Result<TextPlacement> {
    let size = ctx.measure(text, font)?;
    Ok(TextPlacement {
        text: text.to_string(),
        x,
        y,
        width: size.width,
        height: size.height,
        font: font.clone(),
    })
}

/// Reject canvases no sane request would produce.
pub fn check_canvas(width: f64, height: f64) -> Result<()> {
    let sane = width.is_finite()
        && height.is_finite()
        && width <= MAX_CANVAS_SIDE
        && height <= MAX_CANVAS_SIDE
        && width * height <= MAX_CANVAS_PIXELS;
    if sane {
        Ok(())
    } else {
        Err(PlacardError::LayoutOverflow(format!(
            "canvas {}x{} exceeds the allowed bounds",
            width, height
        )))
    }
}

/// Reject confetti that could ask for more than [`MAX_CONFETTI`] dots.
pub fn check_confetti(confetti: Option<&ConfettiStyle>) -> Result<()> {
    match confetti {
        Some(c) if c.max_count() > MAX_CONFETTI => Err(PlacardError::LayoutOverflow(format!(
            "confetti count up to {} exceeds {}",
            c.max_count(),
            MAX_CONFETTI
        ))),
        _ => Ok(()),
    }
}

// ── Footer ─────────────────────────────────────────────────────

/// The diagnostic line along the bottom edge: note on the left, render
/// timestamp on the side the style asks for.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FooterPlan {
    pub left: Option<TextPlacement>,
    pub right: Option<TextPlacement>,
}

impl FooterPlan {
    pub fn placements(&self) -> impl Iterator<Item = &TextPlacement> {
        self.left.iter().chain(self.right.iter())
    }
}

/// Place the footer inside a `width` x `height` canvas. The footer never
/// grows the canvas; it sits half a font size above the bottom edge.
pub fn plan_footer(
    ctx: &FontContext,
    style: &FooterStyle,
    width: f64,
    height: f64,
    note: Option<&str>,
    now: NaiveDateTime,
) -> Result<FooterPlan> {
    let mut stamp = String::new();
    write!(stamp, "{}", now.format(&style.timestamp_format)).map_err(|_| {
        PlacardError::InvalidStyle(format!(
            "bad timestamp format '{}'",
            style.timestamp_format
        ))
    })?;
    let note = note.filter(|n| !n.is_empty());

    let (left_text, right_text) = match style.timestamp_side {
        Side::Left => {
            let text = match note {
                Some(n) => format!("{} {}", n, stamp),
                None => stamp,
            };
            (Some(text), None)
        }
        Side::Right => (note.map(str::to_string), Some(stamp)),
    };

    let font = ctx.sized(&style.font)?;
    let y = height - font.line_height() - style.font.size / 2.0;

    let left = match left_text {
        Some(text) => Some(place_text(ctx, &text, &style.font, style.inset, y)?),
        None => None,
    };
    let right = match right_text {
        Some(text) => {
            let w = font.measure(&text).width;
            Some(place_text(ctx, &text, &style.font, width - w - style.inset, y)?)
        }
        None => None,
    };
    Ok(FooterPlan { left, right })
}
