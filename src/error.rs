//! Structured error types for the placard engine.
//!
//! The three kinds that matter to callers are font loading, empty input and
//! layout overflow. The rest wrap the parsing and decoding steps around them.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PlacardError>;

/// The unified error type returned by all public placard API functions.
#[derive(Error, Debug)]
pub enum PlacardError {
    /// A font family is not registered, or its data could not be read or parsed.
    #[error("Font error: family '{family}': {reason}")]
    FontLoad { family: String, reason: String },

    /// The record source produced nothing that can be drawn.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// The plan is larger than any sane request would need: an oversized
    /// canvas, or more decorative shapes than the painter will draw.
    #[error("Layout overflow: {0}")]
    LayoutOverflow(String),

    /// JSON input failed to parse as a valid chart document.
    #[error("Failed to parse document: {source}{}", format_hint(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// A record carries a value the planner cannot use.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// A style value that can't be applied, e.g. a bad timestamp format.
    #[error("Invalid style: {0}")]
    InvalidStyle(String),

    /// A payload handed to a record source adapter has the wrong shape.
    #[error("Source error: {0}")]
    Source(String),

    /// An image could not be loaded or decoded.
    #[error("Image error: {0}")]
    Image(String),

    /// The canvas could not be allocated or encoded.
    #[error("Encode error: {0}")]
    Encode(String),
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl PlacardError {
    pub fn font_load(family: &str, reason: impl Into<String>) -> Self {
        PlacardError::FontLoad {
            family: family.to_string(),
            reason: reason.into(),
        }
    }

    /// Short machine-friendly name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            PlacardError::FontLoad { .. } => "FontLoadError",
            PlacardError::EmptyInput(_) => "EmptyInputError",
            PlacardError::LayoutOverflow(_) => "LayoutOverflowError",
            PlacardError::Parse { .. } => "ParseError",
            PlacardError::InvalidRecord(_) => "InvalidRecordError",
            PlacardError::InvalidStyle(_) => "InvalidStyleError",
            PlacardError::Source(_) => "SourceError",
            PlacardError::Image(_) => "ImageError",
            PlacardError::Encode(_) => "EncodeError",
        }
    }
}

impl From<serde_json::Error> for PlacardError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the chart document schema. Check the chart \"type\" and field names.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input, is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        PlacardError::Parse { source: e, hint }
    }
}
