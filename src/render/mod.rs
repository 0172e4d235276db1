//! # Renderer
//!
//! Paints plans onto a raster canvas and encodes the result as PNG.
//!
//! The renderer never measures for layout: every position it uses comes
//! from a plan. Text is painted from the plan's [`TextPlacement`]s through
//! the same [`FontContext`] that measured them, so glyph outlines land
//! exactly where the planner put them.
//!
//! Geometry is `f64` up to this point and `f32` inside tiny-skia.

pub mod radial;
pub mod table;

use rand::Rng;
use tiny_skia::{
    BlendMode, FillRule, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform,
};

use crate::error::{PlacardError, Result};
use crate::font::FontContext;
use crate::image_loader::LoadedImage;
use crate::layout::banner::BannerPlan;
use crate::layout::strip::StripPlan;
use crate::layout::{FooterPlan, Point, Rect, TextPlacement, MAX_CONFETTI};
use crate::style::{BannerStyle, Color, ConfettiStyle, StripStyle};

pub use radial::paint_radial;
pub use table::paint_table;

/// Wedge arcs are approximated with one segment per this many degrees.
const ARC_STEP_DEGREES: f64 = 1.0;

/// A raster surface owned by one render call.
pub struct Canvas {
    pixmap: Pixmap,
}

impl Canvas {
    /// A canvas of `width` x `height` pixels (rounded up) filled with
    /// `background`.
    pub fn new(width: f64, height: f64, background: Color) -> Result<Self> {
        let w = width.ceil().max(1.0) as u32;
        let h = height.ceil().max(1.0) as u32;
        let mut pixmap = Pixmap::new(w, h)
            .ok_or_else(|| PlacardError::Encode(format!("cannot allocate a {}x{} canvas", w, h)))?;
        if !background.is_transparent() {
            pixmap.fill(background.to_skia());
        }
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// The straight-alpha color at a pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.pixmap.pixel(x, y).map(|p| {
            let c = p.demultiply();
            Color::rgba(c.red(), c.green(), c.blue(), c.alpha())
        })
    }

    pub fn fill_rect(&mut self, rect: &Rect, color: Color) {
        if let Some(r) = skia_rect(rect) {
            self.pixmap
                .fill_rect(r, &paint(color), Transform::identity(), None);
        }
    }

    /// One-pixel outline just inside `rect`.
    pub fn stroke_rect(&mut self, rect: &Rect, color: Color) {
        let inset = Rect::new(rect.x + 0.5, rect.y + 0.5, rect.width - 1.0, rect.height - 1.0);
        if let Some(r) = skia_rect(&inset) {
            let path = PathBuilder::from_rect(r);
            self.stroke(&path, color, 1.0);
        }
    }

    pub fn fill_polygon(&mut self, points: &[Point], fill: Color, outline: Option<Color>) {
        let mut pb = PathBuilder::new();
        for (i, p) in points.iter().enumerate() {
            if i == 0 {
                pb.move_to(p.x as f32, p.y as f32);
            } else {
                pb.line_to(p.x as f32, p.y as f32);
            }
        }
        pb.close();
        if let Some(path) = pb.finish() {
            self.fill_path(&path, fill);
            if let Some(outline) = outline {
                self.stroke(&path, outline, 1.0);
            }
        }
    }

    /// Pie slice from `start` to `end` degrees, clockwise from three o'clock.
    pub fn fill_wedge(&mut self, center: Point, radius: f64, start: f64, end: f64, color: Color) {
        if end - start >= 360.0 {
            self.fill_disc(center, radius, color);
            return;
        }
        let mut pb = PathBuilder::new();
        pb.move_to(center.x as f32, center.y as f32);
        let steps = ((end - start) / ARC_STEP_DEGREES).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let angle = start + (end - start) * i as f64 / steps as f64;
            let p = crate::layout::radial::polar(center, radius, angle);
            pb.line_to(p.x as f32, p.y as f32);
        }
        pb.close();
        if let Some(path) = pb.finish() {
            self.fill_path(&path, color);
        }
    }

    pub fn fill_disc(&mut self, center: Point, radius: f64, color: Color) {
        if let Some(path) = PathBuilder::from_circle(center.x as f32, center.y as f32, radius as f32) {
            self.fill_path(&path, color);
        }
    }

    /// Replace a disc with `color`, alpha included. A transparent color
    /// punches a hole through whatever was painted there.
    pub fn clear_disc(&mut self, center: Point, radius: f64, color: Color) {
        if let Some(path) = PathBuilder::from_circle(center.x as f32, center.y as f32, radius as f32) {
            let mut paint = paint(color);
            paint.blend_mode = BlendMode::Source;
            self.pixmap
                .fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }
    }

    pub fn fill_ellipse(&mut self, rect: &Rect, color: Color) {
        if let Some(path) = skia_rect(rect).and_then(PathBuilder::from_oval) {
            self.fill_path(&path, color);
        }
    }

    pub fn line(&mut self, from: Point, to: Point, width: f64, color: Color) {
        let mut pb = PathBuilder::new();
        pb.move_to(from.x as f32, from.y as f32);
        pb.line_to(to.x as f32, to.y as f32);
        if let Some(path) = pb.finish() {
            self.stroke(&path, color, width as f32);
        }
    }

    /// Paint a planned string with the font it was measured with.
    pub fn draw_text(&mut self, ctx: &FontContext, text: &TextPlacement, color: Color) -> Result<()> {
        let font = ctx.sized(&text.font)?;
        if let Some(path) = font.text_path(&text.text, text.x, text.y)? {
            self.fill_path(&path, color);
        }
        Ok(())
    }

    /// Copy an image with its top-left corner at `(x, y)`.
    pub fn draw_image(&mut self, image: &LoadedImage, x: f64, y: f64) {
        self.pixmap.draw_pixmap(
            x.round() as i32,
            y.round() as i32,
            image.pixmap.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    /// Scatter random dots over the whole canvas, never more than
    /// [`MAX_CONFETTI`].
    pub fn scatter_confetti<R: Rng + ?Sized>(&mut self, style: &ConfettiStyle, rng: &mut R) -> u32 {
        if style.palette.is_empty() {
            return 0;
        }
        let count = style
            .min_count
            .saturating_add(rng.gen_range(0..=style.extra_count))
            .min(MAX_CONFETTI);
        let (lo, hi) = if style.min_diameter <= style.max_diameter {
            (style.min_diameter, style.max_diameter)
        } else {
            (style.max_diameter, style.min_diameter)
        };
        let w = self.width() as f64;
        let h = self.height() as f64;
        for _ in 0..count {
            let x = rng.gen_range(0.0..=w);
            let y = rng.gen_range(0.0..=h);
            let d = rng.gen_range(lo..=hi);
            let color = style.palette[rng.gen_range(0..style.palette.len())];
            self.fill_ellipse(&Rect::new(x, y, d, d), color);
        }
        count
    }

    pub fn draw_footer(&mut self, ctx: &FontContext, footer: &FooterPlan, color: Color) -> Result<()> {
        for text in footer.placements() {
            self.draw_text(ctx, text, color)?;
        }
        Ok(())
    }

    /// The terminal step: PNG bytes.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|e| PlacardError::Encode(format!("png encode failed: {}", e)))
    }

    fn fill_path(&mut self, path: &tiny_skia::Path, color: Color) {
        self.pixmap
            .fill_path(path, &paint(color), FillRule::Winding, Transform::identity(), None);
    }

    fn stroke(&mut self, path: &tiny_skia::Path, color: Color, width: f32) {
        let stroke = Stroke {
            width,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(path, &paint(color), &stroke, Transform::identity(), None);
    }
}

fn paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color.to_skia());
    paint.anti_alias = true;
    paint
}

fn skia_rect(rect: &Rect) -> Option<tiny_skia::Rect> {
    tiny_skia::Rect::from_xywh(
        rect.x as f32,
        rect.y as f32,
        rect.width as f32,
        rect.height as f32,
    )
}

// ── Banner and strip ───────────────────────────────────────────

pub fn paint_banner(plan: &BannerPlan, style: &BannerStyle, ctx: &FontContext) -> Result<Canvas> {
    let mut canvas = Canvas::new(plan.width, plan.height, style.background)?;
    canvas.draw_text(ctx, &plan.title, style.color)?;
    if let Some(subtitle) = &plan.subtitle {
        canvas.draw_text(ctx, subtitle, style.color)?;
    }
    Ok(canvas)
}

pub fn paint_strip(plan: &StripPlan, style: &StripStyle, images: &[LoadedImage]) -> Result<Canvas> {
    let mut canvas = Canvas::new(plan.width, plan.height, style.background)?;
    for (slot, image) in plan.slots.iter().zip(images) {
        canvas.draw_image(image, slot.x, slot.y);
    }
    Ok(canvas)
}
