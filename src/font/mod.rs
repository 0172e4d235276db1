//! # Font Management
//!
//! The Measurer. Families are registered once in a [`FontRegistry`]; a
//! [`FontContext`] hands out [`SizedFont`]s keyed by (family, size) and
//! keeps them in an unbounded cache.
//!
//! A `SizedFont` both measures strings and produces their glyph outlines,
//! so the planner and the painter can't disagree about metrics: whatever
//! width was used to size a column is the width that gets painted.
//!
//! The registry always contains the built-in `Block` family. It needs no
//! font file: every glyph is a fixed-advance ink box. It keeps headless
//! environments and tests independent of installed fonts.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use tiny_skia::PathBuilder;
use ttf_parser::{GlyphId, OutlineBuilder};

use crate::error::{PlacardError, Result};
use crate::image_loader::read_source_bytes;
use crate::style::FontSpec;

/// Name of the built-in family.
pub const BLOCK_FAMILY: &str = "Block";

// Block metrics, in font units.
const BLOCK_UNITS_PER_EM: u16 = 1000;
const BLOCK_ADVANCE: u16 = 600;
const BLOCK_SPACE_ADVANCE: u16 = 300;
const BLOCK_ASCENDER: i16 = 800;
const BLOCK_DESCENDER: i16 = -200;
const BLOCK_INK_LEFT: f32 = 50.0;
const BLOCK_INK_RIGHT: f32 = 550.0;
const BLOCK_INK_TOP: f32 = 700.0;

/// Pixel extent of a rendered string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextSize {
    pub width: f64,
    pub height: f64,
}

/// Font data as registered.
#[derive(Debug)]
pub enum FontData {
    /// The built-in fixed-advance family.
    Block,
    /// A TrueType/OpenType face.
    TrueType(TrueTypeFont),
}

/// A parsed TrueType/OpenType font: the raw bytes plus the metrics the
/// measurer needs without re-parsing.
#[derive(Debug)]
pub struct TrueTypeFont {
    data: Vec<u8>,
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    /// Character to (glyph id, advance width).
    glyphs: HashMap<char, (u16, u16)>,
    /// Advance of glyph 0, used for unmapped characters.
    notdef_advance: u16,
}

impl TrueTypeFont {
    /// Parse and validate font data.
    pub fn parse(data: Vec<u8>) -> std::result::Result<Self, String> {
        let face = ttf_parser::Face::parse(&data, 0).map_err(|e| e.to_string())?;
        let units_per_em = face.units_per_em();
        if units_per_em == 0 {
            return Err("font has zero units per em".to_string());
        }

        let mut glyphs = HashMap::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables {
                if !subtable.is_unicode() {
                    continue;
                }
                subtable.codepoints(|code| {
                    if let Some(ch) = char::from_u32(code) {
                        if let Some(gid) = subtable.glyph_index(code) {
                            let advance = face.glyph_hor_advance(gid).unwrap_or(0);
                            glyphs.entry(ch).or_insert((gid.0, advance));
                        }
                    }
                });
            }
        }
        let notdef_advance = face.glyph_hor_advance(GlyphId(0)).unwrap_or(units_per_em / 2);
        let ascender = face.ascender();
        let descender = face.descender();

        Ok(Self {
            units_per_em,
            ascender,
            descender,
            notdef_advance,
            glyphs,
            data,
        })
    }

    fn glyph(&self, ch: char) -> (u16, u16) {
        self.glyphs
            .get(&ch)
            .copied()
            .unwrap_or((0, self.notdef_advance))
    }
}

impl FontData {
    fn units_per_em(&self) -> u16 {
        match self {
            FontData::Block => BLOCK_UNITS_PER_EM,
            FontData::TrueType(f) => f.units_per_em,
        }
    }

    fn ascender(&self) -> i16 {
        match self {
            FontData::Block => BLOCK_ASCENDER,
            FontData::TrueType(f) => f.ascender,
        }
    }

    fn descender(&self) -> i16 {
        match self {
            FontData::Block => BLOCK_DESCENDER,
            FontData::TrueType(f) => f.descender,
        }
    }

    fn advance(&self, ch: char) -> u16 {
        match self {
            FontData::Block if ch == ' ' => BLOCK_SPACE_ADVANCE,
            FontData::Block => BLOCK_ADVANCE,
            FontData::TrueType(f) => f.glyph(ch).1,
        }
    }
}

// ── Registry ───────────────────────────────────────────────────

/// Maps family names to font data.
pub struct FontRegistry {
    fonts: HashMap<String, Arc<FontData>>,
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    pub fn new() -> Self {
        let mut fonts = HashMap::new();
        fonts.insert(BLOCK_FAMILY.to_string(), Arc::new(FontData::Block));
        Self { fonts }
    }

    /// Register a TrueType/OpenType family from bytes.
    pub fn register(&mut self, family: &str, data: Vec<u8>) -> Result<()> {
        let font = TrueTypeFont::parse(data).map_err(|e| PlacardError::font_load(family, e))?;
        self.fonts
            .insert(family.to_string(), Arc::new(FontData::TrueType(font)));
        Ok(())
    }

    /// Register a family from a font file on disk.
    pub fn register_file(&mut self, family: &str, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            PlacardError::font_load(family, format!("cannot read '{}': {}", path.display(), e))
        })?;
        self.register(family, data)
    }

    /// Register a family from a path, data URI or base64 string.
    pub fn register_source(&mut self, family: &str, src: &str) -> Result<()> {
        let data = read_source_bytes(src).map_err(|e| PlacardError::font_load(family, e))?;
        self.register(family, data)
    }

    pub fn get(&self, family: &str) -> Option<&Arc<FontData>> {
        self.fonts.get(family)
    }

    pub fn contains(&self, family: &str) -> bool {
        self.fonts.contains_key(family)
    }

    /// Registered family names, sorted.
    pub fn families(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.fonts.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

// ── Sized fonts ────────────────────────────────────────────────

/// A family at one pixel size. Measures strings and builds glyph paths
/// from the same metrics.
#[derive(Debug)]
pub struct SizedFont {
    family: String,
    size: f64,
    data: Arc<FontData>,
}

impl SizedFont {
    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    fn scale(&self) -> f64 {
        self.size / self.data.units_per_em() as f64
    }

    /// Distance from the top of the text box to the baseline.
    pub fn ascent(&self) -> f64 {
        self.data.ascender() as f64 * self.scale()
    }

    /// Height of the text box: ascender to descender.
    pub fn line_height(&self) -> f64 {
        (self.data.ascender() as f64 - self.data.descender() as f64) * self.scale()
    }

    pub fn measure(&self, text: &str) -> TextSize {
        let units: u64 = text.chars().map(|ch| self.data.advance(ch) as u64).sum();
        TextSize {
            width: units as f64 * self.scale(),
            height: self.line_height(),
        }
    }

    /// Outline of `text` with its text box's top-left corner at `(x, top)`.
    /// `None` when nothing would be inked (empty or all blanks).
    pub fn text_path(&self, text: &str, x: f64, top: f64) -> Result<Option<tiny_skia::Path>> {
        let scale = self.scale() as f32;
        let baseline = (top + self.ascent()) as f32;
        let mut pen = x as f32;
        let mut builder = PathBuilder::new();

        match self.data.as_ref() {
            FontData::Block => {
                for ch in text.chars() {
                    if !ch.is_whitespace() {
                        let rect = tiny_skia::Rect::from_ltrb(
                            pen + BLOCK_INK_LEFT * scale,
                            baseline - BLOCK_INK_TOP * scale,
                            pen + BLOCK_INK_RIGHT * scale,
                            baseline,
                        );
                        if let Some(rect) = rect {
                            builder.push_rect(rect);
                        }
                    }
                    pen += self.data.advance(ch) as f32 * scale;
                }
            }
            FontData::TrueType(font) => {
                let face = ttf_parser::Face::parse(&font.data, 0)
                    .map_err(|e| PlacardError::font_load(&self.family, e.to_string()))?;
                for ch in text.chars() {
                    let (gid, advance) = font.glyph(ch);
                    let mut outline = GlyphOutline {
                        builder: &mut builder,
                        origin_x: pen,
                        baseline,
                        scale,
                    };
                    face.outline_glyph(GlyphId(gid), &mut outline);
                    pen += advance as f32 * scale;
                }
            }
        }

        Ok(builder.finish())
    }
}

/// Feeds ttf-parser outlines (y up, font units) into a tiny-skia path
/// (y down, pixels).
struct GlyphOutline<'a> {
    builder: &'a mut PathBuilder,
    origin_x: f32,
    baseline: f32,
    scale: f32,
}

impl GlyphOutline<'_> {
    fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (self.origin_x + x * self.scale, self.baseline - y * self.scale)
    }
}

impl OutlineBuilder for GlyphOutline<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.map(x, y);
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x, y) = self.map(x, y);
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.map(x1, y1);
        let (x2, y2) = self.map(x2, y2);
        let (x, y) = self.map(x, y);
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

// ── Context ────────────────────────────────────────────────────

type CacheKey = (String, u64);

/// Shared font context used by the planner and the renderer.
pub struct FontContext {
    registry: FontRegistry,
    cache: RwLock<HashMap<CacheKey, Arc<SizedFont>>>,
}

impl Default for FontContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FontContext {
    pub fn new() -> Self {
        Self::with_registry(FontRegistry::new())
    }

    pub fn with_registry(registry: FontRegistry) -> Self {
        Self {
            registry,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Register a family from bytes, replacing any cached sizes of it.
    pub fn register(&mut self, family: &str, data: Vec<u8>) -> Result<()> {
        self.registry.register(family, data)?;
        self.evict(family);
        Ok(())
    }

    /// Register a family from a path, data URI or base64 string.
    pub fn register_source(&mut self, family: &str, src: &str) -> Result<()> {
        self.registry.register_source(family, src)?;
        self.evict(family);
        Ok(())
    }

    fn evict(&mut self, family: &str) {
        let cache = self.cache.get_mut().unwrap_or_else(|e| e.into_inner());
        cache.retain(|(f, _), _| f != family);
    }

    /// Resolve a font spec. Unknown families fail: there is no fallback.
    pub fn sized(&self, spec: &FontSpec) -> Result<Arc<SizedFont>> {
        if !(spec.size.is_finite() && spec.size > 0.0) {
            return Err(PlacardError::font_load(
                &spec.family,
                format!("invalid size {}", spec.size),
            ));
        }
        let key = (spec.family.clone(), spec.size.to_bits());

        {
            let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(font) = cache.get(&key) {
                return Ok(Arc::clone(font));
            }
        }

        let data = self
            .registry
            .get(&spec.family)
            .ok_or_else(|| PlacardError::font_load(&spec.family, "family is not registered"))?;
        let font = Arc::new(SizedFont {
            family: spec.family.clone(),
            size: spec.size,
            data: Arc::clone(data),
        });
        log::debug!("loaded font {} {}", spec.family, spec.size);

        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        Ok(Arc::clone(cache.entry(key).or_insert(font)))
    }

    /// Measure `text` in the given font.
    pub fn measure(&self, text: &str, spec: &FontSpec) -> Result<TextSize> {
        Ok(self.sized(spec)?.measure(text))
    }

    /// Number of cached (family, size) entries.
    pub fn cached(&self) -> usize {
        self.cache.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn registry(&self) -> &FontRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_metrics() {
        let ctx = FontContext::new();
        let size = ctx.measure("ab c", &FontSpec::new(BLOCK_FAMILY, 10.0)).unwrap();
        // three glyphs at 6px, one space at 3px
        assert!((size.width - 21.0).abs() < 0.001);
        assert!((size.height - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_measure_is_deterministic_and_cached() {
        let ctx = FontContext::new();
        let spec = FontSpec::new(BLOCK_FAMILY, 36.0);
        let a = ctx.measure("Eindhoven Station", &spec).unwrap();
        let b = ctx.measure("Eindhoven Station", &spec).unwrap();
        assert_eq!(a, b);
        assert_eq!(ctx.cached(), 1);
        ctx.measure("x", &spec.with_size(20.0)).unwrap();
        assert_eq!(ctx.cached(), 2);
    }

    #[test]
    fn test_unknown_family_fails() {
        let ctx = FontContext::new();
        let err = ctx
            .measure("x", &FontSpec::new("Kiona Light", 240.0))
            .unwrap_err();
        assert_eq!(err.kind(), "FontLoadError");
        assert!(err.to_string().contains("Kiona Light"));
    }

    #[test]
    fn test_zero_size_fails() {
        let ctx = FontContext::new();
        assert!(ctx.measure("x", &FontSpec::new(BLOCK_FAMILY, 0.0)).is_err());
    }

    #[test]
    fn test_register_garbage_fails() {
        let mut ctx = FontContext::new();
        let err = ctx.register("Broken", vec![0, 1, 2, 3]).unwrap_err();
        assert_eq!(err.kind(), "FontLoadError");
        assert!(!ctx.registry().contains("Broken"));
    }

    #[test]
    fn test_register_missing_file_fails() {
        let mut registry = FontRegistry::new();
        assert!(registry.register_file("Arial", "/nonexistent/arial.ttf").is_err());
        assert_eq!(registry.families(), vec![BLOCK_FAMILY]);
    }

    #[test]
    fn test_block_path_matches_measured_width() {
        let ctx = FontContext::new();
        let font = ctx.sized(&FontSpec::new(BLOCK_FAMILY, 20.0)).unwrap();
        let width = font.measure("AB").width;
        let path = font.text_path("AB", 10.0, 5.0).unwrap().unwrap();
        let bounds = path.bounds();
        assert!(bounds.left() as f64 >= 10.0);
        assert!(bounds.right() as f64 <= 10.0 + width);
        // ink sits above the baseline
        assert!((bounds.bottom() as f64 - (5.0 + font.ascent())).abs() < 0.01);
    }

    #[test]
    fn test_blank_text_has_no_path() {
        let ctx = FontContext::new();
        let font = ctx.sized(&FontSpec::new(BLOCK_FAMILY, 20.0)).unwrap();
        assert!(font.text_path("   ", 0.0, 0.0).unwrap().is_none());
        assert!(font.text_path("", 0.0, 0.0).unwrap().is_none());
    }
}
