//! # Style Tables
//!
//! Immutable bundles of fonts, colors and spacing constants. A style is
//! built once, from a preset or from JSON, and only read afterwards: the
//! planner reads spacing and fonts from it, the renderer reads colors.
//!
//! Every style struct deserializes with `#[serde(default)]`, so a JSON
//! document only needs to name the values it changes. The defaults are the
//! presets in [`presets`].

pub mod presets;

use crate::error::{PlacardError, Result};
use crate::model::{Classification, FieldKind, Flags};
use serde::{Deserialize, Serialize};

// ── Primitives ─────────────────────────────────────────────────

/// An 8-bit RGBA color.
///
/// Deserializes from `{ "r": .., "g": .., "b": .., "a": .. }` (alpha
/// optional) or from a `"#rrggbb"` / `"#rrggbbaa"` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ColorRepr")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };

    pub const GREY_DARK: Color = Color::rgb(70, 85, 95);
    pub const GREY_MEDIUM: Color = Color::rgb(125, 136, 143);
    pub const GREY_LIGHT: Color = Color::rgb(172, 178, 183);
    pub const GREEN: Color = Color::rgb(65, 171, 2);
    pub const BLUE: Color = Color::rgb(0, 117, 176);
    pub const RED: Color = Color::rgb(255, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (the `#` is optional).
    pub fn hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let invalid = || PlacardError::InvalidStyle(format!("'{}' is not a hex color", hex));
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        // All ASCII from here on, so byte offsets are char boundaries.
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match digits.len() {
            3 => Ok(Self::rgb(
                channel(&digits[0..1].repeat(2))?,
                channel(&digits[1..2].repeat(2))?,
                channel(&digits[2..3].repeat(2))?,
            )),
            6 => Ok(Self::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            8 => Ok(Self::rgba(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
                channel(&digits[6..8])?,
            )),
            _ => Err(invalid()),
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    pub fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Hex(String),
    Channels {
        r: u8,
        g: u8,
        b: u8,
        #[serde(default = "opaque")]
        a: u8,
    },
}

fn opaque() -> u8 {
    255
}

impl TryFrom<ColorRepr> for Color {
    type Error = PlacardError;

    fn try_from(repr: ColorRepr) -> Result<Self> {
        match repr {
            ColorRepr::Hex(s) => Color::hex(&s),
            ColorRepr::Channels { r, g, b, a } => Ok(Color::rgba(r, g, b, a)),
        }
    }
}

/// Edge values (top, right, bottom, left) used for margins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }
}

/// A horizontal/vertical pair, used for text insets inside cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Inset {
    pub x: f64,
    pub y: f64,
}

impl Inset {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A font family plus pixel size. The same spec is used to measure a string
/// during planning and to paint it afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: String,
    pub size: f64,
}

impl FontSpec {
    pub fn new(family: &str, size: f64) -> Self {
        Self {
            family: family.to_string(),
            size,
        }
    }

    pub fn with_size(&self, size: f64) -> Self {
        Self {
            family: self.family.clone(),
            size,
        }
    }
}

// ── Table styles ───────────────────────────────────────────────

/// How field widths are chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutMode {
    /// Every field is as wide as its widest measured text plus padding.
    Measured,
    /// Fields use their fixed widths; fields without one are measured.
    #[default]
    FixedField,
}

/// Width rule for one field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FieldWidth {
    Fixed(f64),
    Measured,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Align {
    #[default]
    Left,
    Center,
}

/// Whether a record gets one rectangle for the whole row or one per field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellBoxes {
    #[default]
    PerRow,
    PerField,
}

/// One column inside a group: which record field it shows and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub kind: FieldKind,
    pub width: FieldWidth,
    #[serde(default)]
    pub align: Align,
    /// Text color when no classification applies. Falls back to the cell color.
    #[serde(default)]
    pub color: Option<Color>,
    /// Classifications that recolor this field.
    #[serde(default)]
    pub reacts_to: Vec<Classification>,
}

impl FieldSpec {
    pub fn fixed(kind: FieldKind, width: f64) -> Self {
        Self {
            kind,
            width: FieldWidth::Fixed(width),
            align: Align::Left,
            color: None,
            reacts_to: vec![],
        }
    }

    pub fn measured(kind: FieldKind) -> Self {
        Self {
            kind,
            width: FieldWidth::Measured,
            align: Align::Left,
            color: None,
            reacts_to: vec![],
        }
    }

    pub fn centered(mut self) -> Self {
        self.align = Align::Center;
        self
    }

    pub fn colored(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn reacting_to(mut self, classes: &[Classification]) -> Self {
        self.reacts_to = classes.to_vec();
        self
    }
}

/// Color overrides for one classification. `None` keeps the base color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantColors {
    #[serde(default)]
    pub fg: Option<Color>,
    #[serde(default)]
    pub bg: Option<Color>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Variants {
    pub highlighted: VariantColors,
    pub delayed: VariantColors,
    pub lowlighted: VariantColors,
}

impl Variants {
    pub fn get(&self, class: Classification) -> VariantColors {
        match class {
            Classification::Highlighted => self.highlighted,
            Classification::Delayed => self.delayed,
            Classification::Lowlighted => self.lowlighted,
        }
    }
}

/// Resolved foreground/background pair for a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellColors {
    pub fg: Color,
    pub bg: Color,
}

/// The triangular "now" pointer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorStyle {
    pub width: f64,
    pub fill: Color,
    pub outline: Color,
}

/// Decorative ellipses scattered under the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfettiStyle {
    /// At least this many ellipses ...
    pub min_count: u32,
    /// ... plus a random amount up to this.
    pub extra_count: u32,
    pub min_diameter: f64,
    pub max_diameter: f64,
    pub palette: Vec<Color>,
}

impl ConfettiStyle {
    /// The largest count a render can draw.
    pub fn max_count(&self) -> u32 {
        self.min_count.saturating_add(self.extra_count)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    #[default]
    Left,
    Right,
}

/// Low-contrast diagnostic line along the bottom edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterStyle {
    pub font: FontSpec,
    pub color: Color,
    /// Horizontal distance from the canvas edge.
    pub inset: f64,
    /// `chrono` format string for the render timestamp.
    pub timestamp_format: String,
    /// Where the timestamp goes. On the left it follows the note.
    #[serde(default)]
    pub timestamp_side: Side,
}

/// Style table for grouped, tabular layouts: calendars, timetables,
/// departure boards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableStyle {
    pub mode: LayoutMode,
    pub background: Color,
    pub margin: Edges,

    // ── Header block ───────────────────────────────────────────
    pub header_font: FontSpec,
    pub header_fg: Color,
    pub header_bg: Color,
    pub header_height: f64,
    /// Space between the header and the first row.
    pub header_separator: f64,
    pub header_text_inset: Inset,

    // ── Rows ───────────────────────────────────────────────────
    pub cell_font: FontSpec,
    pub cell_fg: Color,
    pub cell_bg: Color,
    pub cell_outline: Option<Color>,
    pub cell_boxes: CellBoxes,
    pub row_height: f64,
    pub row_separator: f64,
    pub text_inset: Inset,
    pub fields: Vec<FieldSpec>,
    pub field_separator: f64,

    // ── Groups ─────────────────────────────────────────────────
    /// Overrides the computed group width.
    pub group_width: Option<f64>,
    pub group_separator: f64,
    /// Text of the row shown for a group without records.
    pub placeholder: String,

    // ── Classification ─────────────────────────────────────────
    pub variants: Variants,
    /// First classification in this list that a record carries wins.
    pub precedence: Vec<Classification>,

    // ── Decorations ────────────────────────────────────────────
    pub cursor: Option<CursorStyle>,
    pub confetti: Option<ConfettiStyle>,
    pub footer: Option<FooterStyle>,
    /// Space between the last row and an appended image.
    pub appendix_separator: f64,
}

impl Default for TableStyle {
    fn default() -> Self {
        presets::timetable()
    }
}

impl TableStyle {
    /// The classification that decides a record's colors, if any.
    ///
    /// Walks `precedence` in order and returns the first class the record
    /// carries. With `filter`, classes outside it are ignored.
    pub fn classify(&self, flags: Flags, filter: Option<&[Classification]>) -> Option<Classification> {
        self.precedence
            .iter()
            .copied()
            .filter(|c| filter.map_or(true, |allowed| allowed.contains(c)))
            .find(|c| flags.has(*c))
    }

    /// Colors for one field cell of a record.
    pub fn cell_colors(&self, flags: Flags, field: &FieldSpec) -> CellColors {
        let base = CellColors {
            fg: field.color.unwrap_or(self.cell_fg),
            bg: self.cell_bg,
        };
        self.apply(base, self.classify(flags, Some(&field.reacts_to)))
    }

    /// Colors for a whole row box. Only classes some field reacts to count.
    pub fn row_colors(&self, flags: Flags) -> CellColors {
        let reacting: Vec<Classification> = self
            .fields
            .iter()
            .flat_map(|f| f.reacts_to.iter().copied())
            .collect();
        let base = CellColors {
            fg: self.cell_fg,
            bg: self.cell_bg,
        };
        self.apply(base, self.classify(flags, Some(&reacting)))
    }

    fn apply(&self, base: CellColors, class: Option<Classification>) -> CellColors {
        match class {
            Some(c) => {
                let v = self.variants.get(c);
                CellColors {
                    fg: v.fg.unwrap_or(base.fg),
                    bg: v.bg.unwrap_or(base.bg),
                }
            }
            None => base,
        }
    }

    /// Every font this style paints with.
    pub fn fonts(&self) -> Vec<&FontSpec> {
        let mut fonts = vec![&self.header_font, &self.cell_font];
        if let Some(footer) = &self.footer {
            fonts.push(&footer.font);
        }
        fonts
    }

    /// Same style, every font switched to `family` (sizes kept).
    pub fn with_family(mut self, family: &str) -> Self {
        self.header_font.family = family.to_string();
        self.cell_font.family = family.to_string();
        if let Some(footer) = self.footer.as_mut() {
            footer.font.family = family.to_string();
        }
        self
    }
}

// ── Radial style ───────────────────────────────────────────────

/// Style table for the pie chart with rays and labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RadialStyle {
    pub width: f64,
    pub height: f64,
    pub background: Color,
    pub radius: f64,
    /// Radius of the disc punched out of the middle, in background color.
    pub inner_radius: f64,
    pub ray_start: f64,
    pub ray_end: f64,
    pub ray_width: f64,
    pub number_of_rays: u32,
    pub even_color: Color,
    pub odd_color: Color,
    pub highlight_color: Color,
    pub label_font: FontSpec,
    pub caption_font: FontSpec,
    pub caption_color: Color,
    pub footer: Option<FooterStyle>,
}

impl Default for RadialStyle {
    fn default() -> Self {
        presets::pie()
    }
}

impl RadialStyle {
    pub fn fonts(&self) -> Vec<&FontSpec> {
        let mut fonts = vec![&self.label_font, &self.caption_font];
        if let Some(footer) = &self.footer {
            fonts.push(&footer.font);
        }
        fonts
    }

    pub fn with_family(mut self, family: &str) -> Self {
        self.label_font.family = family.to_string();
        self.caption_font.family = family.to_string();
        if let Some(footer) = self.footer.as_mut() {
            footer.font.family = family.to_string();
        }
        self
    }
}

// ── Banner and strip styles ────────────────────────────────────

/// Style for the two-line word-of-the-day banner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BannerStyle {
    pub font: FontSpec,
    pub color: Color,
    pub background: Color,
    pub margin: Edges,
    /// Extra space between the two lines.
    pub line_gap: f64,
}

impl Default for BannerStyle {
    fn default() -> Self {
        presets::word_of_day()
    }
}

impl BannerStyle {
    pub fn fonts(&self) -> Vec<&FontSpec> {
        vec![&self.font]
    }

    pub fn with_family(mut self, family: &str) -> Self {
        self.font.family = family.to_string();
        self
    }
}

/// Style for images laid side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StripStyle {
    pub background: Color,
    pub margin: Edges,
    pub separator: f64,
}

impl Default for StripStyle {
    fn default() -> Self {
        presets::strip()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_colors() {
        assert_eq!(Color::hex("#0075b0").unwrap(), Color::BLUE);
        assert_eq!(Color::hex("fff").unwrap(), Color::WHITE);
        assert_eq!(Color::hex("#00000000").unwrap(), Color::TRANSPARENT);
    }

    #[test]
    fn test_bad_hex_colors_are_rejected() {
        for bad in ["#zzzzzz", "#aéééb", "#é", "#12345", ""] {
            let err = Color::hex(bad).unwrap_err();
            assert_eq!(err.kind(), "InvalidStyleError", "{bad}");
        }
        assert!(serde_json::from_str::<Color>("\"#aéééb\"").is_err());
        assert!(serde_json::from_str::<Color>("\"#zzzzzz\"").is_err());
    }

    #[test]
    fn test_color_deserializes_both_forms() {
        let a: Color = serde_json::from_str("\"#ff0000\"").unwrap();
        let b: Color = serde_json::from_str("{\"r\": 255, \"g\": 0, \"b\": 0}").unwrap();
        assert_eq!(a, Color::RED);
        assert_eq!(b, Color::RED);
    }

    #[test]
    fn test_delayed_beats_highlighted() {
        let style = presets::timetable();
        let flags = Flags {
            highlighted: true,
            delayed: true,
            lowlighted: false,
        };
        assert_eq!(style.classify(flags, None), Some(Classification::Delayed));
    }

    #[test]
    fn test_precedence_order_is_configurable() {
        let mut style = presets::timetable();
        style.precedence = vec![Classification::Highlighted, Classification::Delayed];
        let flags = Flags {
            highlighted: true,
            delayed: true,
            lowlighted: false,
        };
        assert_eq!(style.classify(flags, None), Some(Classification::Highlighted));
    }

    #[test]
    fn test_field_only_reacts_to_its_classes() {
        let style = presets::timetable();
        let flags = Flags {
            highlighted: false,
            delayed: true,
            lowlighted: false,
        };
        let time = &style.fields[0];
        let line = &style.fields[1];
        assert_eq!(style.cell_colors(flags, time).fg, Color::RED);
        assert_eq!(style.cell_colors(flags, line).fg, Color::GREY_DARK);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let style: TableStyle = serde_json::from_str("{\"rowHeight\": 42}").unwrap();
        assert!((style.row_height - 42.0).abs() < 0.001);
        assert_eq!(style.placeholder, presets::timetable().placeholder);
    }

    #[test]
    fn test_with_family_rewrites_every_font() {
        let style = presets::calendar().with_family("Block");
        assert!(style.fonts().iter().all(|f| f.family == "Block"));
    }
}
