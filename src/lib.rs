//! # Placard
//!
//! A table-and-wedge layout engine for display boards.
//!
//! Record sources hand over typed records; placard measures their text,
//! lays them out deterministically and paints a PNG. The same font context
//! measures every string during planning and outlines it during painting,
//! so column widths always fit what ends up on the canvas.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON / source adapters)
//!       ↓
//!   [model]    Records, groups, chart document
//!       ↓
//!   [layout]   Pure planning: geometry from records + style + metrics
//!       ↓
//!   [render]   Raster painting and PNG encoding
//! ```
//!
//! Every render carries an [`OpLog`] that describes what happened. On
//! failure it comes back with the error, ready to be served as a plain-text
//! diagnostic.

pub mod error;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod oplog;
pub mod render;
pub mod source;
pub mod style;

use chrono::NaiveDateTime;
use rand::Rng;

pub use error::{PlacardError, Result};
pub use font::FontContext;
pub use model::{Chart, ChartDocument, Group, Record};
pub use oplog::OpLog;

use font::BLOCK_FAMILY;
use image_loader::{load_image, LoadedImage};
use layout::PlanOptions;
use model::FontEntry;
use render::Canvas;
use style::{presets, FontSpec};

/// Text of the placeholder image rendered for empty input.
pub const NO_DATA: &str = "no data";

/// The result of one render request. Either way the log comes along.
#[derive(Debug)]
pub enum RenderOutcome {
    Rendered {
        png: Vec<u8>,
        log: OpLog,
        width: u32,
        height: u32,
    },
    Failed {
        error: PlacardError,
        log: OpLog,
    },
}

impl RenderOutcome {
    pub fn log(&self) -> &OpLog {
        match self {
            RenderOutcome::Rendered { log, .. } | RenderOutcome::Failed { log, .. } => log,
        }
    }

    pub fn is_rendered(&self) -> bool {
        matches!(self, RenderOutcome::Rendered { .. })
    }

    /// The PNG bytes, or the error.
    pub fn into_result(self) -> Result<Vec<u8>> {
        match self {
            RenderOutcome::Rendered { png, .. } => Ok(png),
            RenderOutcome::Failed { error, .. } => Err(error),
        }
    }
}

/// An HTTP-shaped answer for a render outcome. Transport is the caller's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: &'static str,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Response {
    pub fn from_outcome(outcome: RenderOutcome) -> Self {
        match outcome {
            RenderOutcome::Rendered { png, .. } => Response {
                status: "200 OK",
                content_type: "image/png",
                body: png,
            },
            RenderOutcome::Failed { error, log } => {
                let mut body = log.to_text();
                body.push_str(&format!("\r\nERROR  : {}\r\n", error));
                Response {
                    status: "404 ERROR",
                    content_type: "text/plain",
                    body: body.into_bytes(),
                }
            }
        }
    }
}

// ── Entry points ───────────────────────────────────────────────

/// Parse a chart document, register its fonts in a fresh context and
/// render it.
pub fn render_json(json: &str) -> RenderOutcome {
    let mut log = OpLog::new();
    let doc = match ChartDocument::from_json(json) {
        Ok(doc) => doc,
        Err(error) => return RenderOutcome::Failed { error, log },
    };
    let mut ctx = FontContext::new();
    if let Err(error) = register_fonts(&mut ctx, &doc.fonts, &mut log) {
        return RenderOutcome::Failed { error, log };
    }
    render_chart_logged(&doc, &ctx, &mut rand::thread_rng(), log)
}

/// Register the fonts a document names. Each one is logged; the first
/// failure stops registration.
pub fn register_fonts(ctx: &mut FontContext, fonts: &[FontEntry], log: &mut OpLog) -> Result<()> {
    for entry in fonts {
        match ctx.register_source(&entry.family, &entry.src) {
            Ok(()) => log.push("font", format!("{} registered", entry.family)),
            Err(e) => {
                log.push("font", format!("{} failed", entry.family));
                return Err(e);
            }
        }
    }
    Ok(())
}

/// Render a chart with fonts already registered in `ctx`.
pub fn render_chart(doc: &ChartDocument, ctx: &FontContext) -> RenderOutcome {
    render_chart_with_rng(doc, ctx, &mut rand::thread_rng())
}

/// Same as [`render_chart`], with the confetti randomness injected.
pub fn render_chart_with_rng<R: Rng + ?Sized>(
    doc: &ChartDocument,
    ctx: &FontContext,
    rng: &mut R,
) -> RenderOutcome {
    render_chart_logged(doc, ctx, rng, OpLog::new())
}

fn render_chart_logged<R: Rng + ?Sized>(
    doc: &ChartDocument,
    ctx: &FontContext,
    rng: &mut R,
    mut log: OpLog,
) -> RenderOutcome {
    let now = doc
        .now
        .unwrap_or_else(|| chrono::Local::now().naive_local());
    match render_inner(doc, ctx, now, rng, &mut log) {
        Ok(canvas) => match canvas.encode_png() {
            Ok(png) => {
                log.push("buffer", format!("{} bytes", png.len()));
                RenderOutcome::Rendered {
                    width: canvas.width(),
                    height: canvas.height(),
                    png,
                    log,
                }
            }
            Err(error) => RenderOutcome::Failed { error, log },
        },
        Err(error) => {
            log::error!("{} ({})", error, error.kind());
            RenderOutcome::Failed { error, log }
        }
    }
}

// ── Pipeline ───────────────────────────────────────────────────

fn render_inner<R: Rng + ?Sized>(
    doc: &ChartDocument,
    ctx: &FontContext,
    now: NaiveDateTime,
    rng: &mut R,
    log: &mut OpLog,
) -> Result<Canvas> {
    log.push(
        "request",
        format!("{} with {} records", doc.chart.kind(), doc.chart.record_count()),
    );
    let options = PlanOptions {
        now,
        lowlight: doc.lowlight.as_deref(),
        note: doc.note.as_deref(),
    };

    let fonts = chart_fonts(&doc.chart);
    for spec in &fonts {
        ctx.sized(spec)?;
        log.push("font", format!("{} {}", spec.family, spec.size));
    }

    let result = match &doc.chart {
        Chart::Table {
            groups,
            style,
            appendix,
        } => {
            let image = match appendix {
                Some(src) => {
                    let img = load_image(src)?;
                    log.push("image", format!("appendix {}*{}", img.width(), img.height()));
                    Some(img)
                }
                None => None,
            };
            let size = image.as_ref().map(|i| (i.width() as f64, i.height() as f64));
            let plan = layout::table::plan(groups, style, ctx, &options, size)?;
            log.push("size", format!("{}*{}", plan.width, plan.height));
            log.push(
                "draw",
                format!("tables {}, rows {}", plan.groups.len(), doc.chart.record_count()),
            );
            render::paint_table(&plan, style, ctx, image.as_ref(), rng)
        }
        Chart::Pie {
            records,
            caption,
            style,
        } => layout::radial::plan(records, caption, style, ctx, &options).and_then(|plan| {
            log.push("size", format!("{}*{}", plan.width, plan.height));
            log.push("draw", format!("slices {}, rays {}", plan.slices.len(), plan.rays.len()));
            render::paint_radial(&plan, style, ctx)
        }),
        Chart::Banner {
            title,
            subtitle,
            style,
        } => layout::banner::plan(title, subtitle, style, ctx).and_then(|plan| {
            log.push("size", format!("{}*{}", plan.width, plan.height));
            render::paint_banner(&plan, style, ctx)
        }),
        Chart::Strip { images, style } => {
            let loaded = images
                .iter()
                .map(|src| load_image(src))
                .collect::<Result<Vec<LoadedImage>>>()?;
            let sizes: Vec<(f64, f64)> = loaded
                .iter()
                .map(|i| (i.width() as f64, i.height() as f64))
                .collect();
            layout::strip::plan(&sizes, style).and_then(|plan| {
                log.push("size", format!("{}*{}", plan.width, plan.height));
                log.push("draw", format!("images {}", plan.slots.len()));
                render::paint_strip(&plan, style, &loaded)
            })
        }
    };

    match result {
        Err(PlacardError::EmptyInput(reason)) => {
            log::warn!("empty input, rendering placeholder: {}", reason);
            log.push("empty", &reason);
            let font = fonts
                .first()
                .cloned()
                .unwrap_or_else(|| FontSpec::new(BLOCK_FAMILY, 36.0));
            render_placeholder(font, ctx, &options, rng)
        }
        other => other,
    }
}

/// The "no data" image: a single placeholder row.
fn render_placeholder<R: Rng + ?Sized>(
    font: FontSpec,
    ctx: &FontContext,
    options: &PlanOptions,
    rng: &mut R,
) -> Result<Canvas> {
    let style = presets::placeholder(font, NO_DATA);
    let groups = [Group::headless(vec![])];
    let plan = layout::table::plan(&groups, &style, ctx, options, None)?;
    render::paint_table(&plan, &style, ctx, None, rng)
}

fn chart_fonts(chart: &Chart) -> Vec<FontSpec> {
    let fonts = match chart {
        Chart::Table { style, .. } => style.fonts(),
        Chart::Pie { style, .. } => style.fonts(),
        Chart::Banner { style, .. } => style.fonts(),
        Chart::Strip { .. } => vec![],
    };
    let mut unique: Vec<FontSpec> = Vec::with_capacity(fonts.len());
    for spec in fonts {
        if !unique.contains(spec) {
            unique.push(spec.clone());
        }
    }
    unique
}
