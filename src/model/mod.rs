//! # Chart Model
//!
//! The input representation for the engine. A record source (a timetable
//! API adapter, a spreadsheet reader, a calendar) turns its payload into
//! [`Record`]s, optionally grouped under a header. A [`ChartDocument`]
//! wraps those records together with the style table and the request-level
//! settings (`now`, the lowlight string, the footer note).
//!
//! Records are typed: every field a board can show has a slot, and the
//! classification flags that select color overrides are explicit.

use std::borrow::Cow;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{PlacardError, Result};
use crate::style::{BannerStyle, RadialStyle, StripStyle, TableStyle};

/// A classification that selects a style override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    Highlighted,
    Delayed,
    Lowlighted,
}

/// The classification flags of one record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags {
    pub highlighted: bool,
    pub delayed: bool,
    pub lowlighted: bool,
}

impl Flags {
    pub fn has(&self, class: Classification) -> bool {
        match class {
            Classification::Highlighted => self.highlighted,
            Classification::Delayed => self.delayed,
            Classification::Lowlighted => self.lowlighted,
        }
    }

    pub fn any(&self) -> bool {
        self.highlighted || self.delayed || self.lowlighted
    }
}

/// Named display slots of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// A time or day, e.g. `15:48 +2` or `14`.
    Time,
    /// The main text: a name, a destination.
    Label,
    /// A short second column: a bus line, a track.
    Secondary,
    /// Trailing free text, e.g. the stations a train calls at.
    Detail,
    /// The numeric value, formatted.
    Value,
}

/// One renderable row or slice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Record {
    pub time: Option<String>,
    pub label: String,
    pub secondary: Option<String>,
    pub detail: Option<String>,
    pub value: Option<f64>,
    /// The date the record is about, used to place the "now" cursor.
    pub date: Option<NaiveDate>,
    pub highlighted: bool,
    pub delayed: bool,
    pub lowlighted: bool,
}

impl Record {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            ..Default::default()
        }
    }

    pub fn with_time(mut self, time: &str) -> Self {
        self.time = Some(time.to_string());
        self
    }

    pub fn with_secondary(mut self, secondary: &str) -> Self {
        self.secondary = Some(secondary.to_string());
        self
    }

    pub fn with_detail(mut self, detail: &str) -> Self {
        self.detail = Some(detail.to_string());
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn highlighted(mut self) -> Self {
        self.highlighted = true;
        self
    }

    pub fn delayed(mut self) -> Self {
        self.delayed = true;
        self
    }

    pub fn has_time(&self) -> bool {
        self.time.is_some()
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub fn has_classification(&self) -> bool {
        self.flags().any()
    }

    pub fn flags(&self) -> Flags {
        Flags {
            highlighted: self.highlighted,
            delayed: self.delayed,
            lowlighted: self.lowlighted,
        }
    }

    /// Flags with the lowlight predicate applied: a record whose label
    /// contains `lowlight` is lowlighted. An empty string matches every label.
    pub fn effective_flags(&self, lowlight: Option<&str>) -> Flags {
        let mut flags = self.flags();
        if let Some(needle) = lowlight {
            flags.lowlighted |= self.label.contains(needle);
        }
        flags
    }

    /// The display text for one field, if the record has it.
    pub fn field(&self, kind: FieldKind) -> Option<Cow<'_, str>> {
        match kind {
            FieldKind::Time => self.time.as_deref().map(Cow::Borrowed),
            FieldKind::Label => Some(Cow::Borrowed(self.label.as_str())),
            FieldKind::Secondary => self.secondary.as_deref().map(Cow::Borrowed),
            FieldKind::Detail => self.detail.as_deref().map(Cow::Borrowed),
            FieldKind::Value => self.value.map(|v| Cow::Owned(format_value(v))),
        }
    }

    /// Reject values the planner can't lay out.
    pub fn validate(&self) -> Result<()> {
        if let Some(v) = self.value {
            if !v.is_finite() || v < 0.0 {
                return Err(PlacardError::InvalidRecord(format!(
                    "'{}' has value {}, expected a finite non-negative number",
                    self.label, v
                )));
            }
        }
        Ok(())
    }
}

/// Whole numbers print without a fractional part.
pub fn format_value(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

/// A labeled, ordered collection of records: a month, a stop.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Group {
    pub header: Option<String>,
    pub records: Vec<Record>,
    /// Whether this group gets the "now" cursor.
    pub tracks_now: bool,
}

impl Group {
    pub fn new(header: &str, records: Vec<Record>) -> Self {
        Self {
            header: Some(header.to_string()),
            records,
            tracks_now: false,
        }
    }

    pub fn headless(records: Vec<Record>) -> Self {
        Self {
            header: None,
            records,
            tracks_now: false,
        }
    }

    pub fn tracking_now(mut self) -> Self {
        self.tracks_now = true;
        self
    }
}

/// What to draw.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Chart {
    /// Groups side by side, records stacked below each header.
    Table {
        groups: Vec<Group>,
        #[serde(default)]
        style: TableStyle,
        /// Image appended below the table (path, data URI or base64).
        #[serde(default)]
        appendix: Option<String>,
    },
    /// Pie chart with a slice per record.
    Pie {
        records: Vec<Record>,
        /// Lines centered inside the ring; the first in the caption font.
        #[serde(default)]
        caption: Vec<String>,
        #[serde(default)]
        style: RadialStyle,
    },
    /// Two lines, the second scaled to the width of the first.
    Banner {
        title: String,
        subtitle: String,
        #[serde(default)]
        style: BannerStyle,
    },
    /// Images side by side (paths, data URIs or base64).
    Strip {
        images: Vec<String>,
        #[serde(default)]
        style: StripStyle,
    },
}

impl Chart {
    pub fn kind(&self) -> &'static str {
        match self {
            Chart::Table { .. } => "Table",
            Chart::Pie { .. } => "Pie",
            Chart::Banner { .. } => "Banner",
            Chart::Strip { .. } => "Strip",
        }
    }

    /// Total number of records across all groups.
    pub fn record_count(&self) -> usize {
        match self {
            Chart::Table { groups, .. } => groups.iter().map(|g| g.records.len()).sum(),
            Chart::Pie { records, .. } => records.len(),
            Chart::Banner { .. } => 2,
            Chart::Strip { images, .. } => images.len(),
        }
    }
}

/// A font to register before rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontEntry {
    pub family: String,
    /// File path, data URI (`data:font/ttf;base64,...`) or raw base64.
    pub src: String,
}

/// A complete render request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDocument {
    pub chart: Chart,
    /// Render time. Defaults to the local clock.
    #[serde(default)]
    pub now: Option<NaiveDateTime>,
    /// Records whose label contains this string are lowlighted.
    #[serde(default)]
    pub lowlight: Option<String>,
    /// Free-form text for the footer line.
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub fonts: Vec<FontEntry>,
}

impl ChartDocument {
    pub fn new(chart: Chart) -> Self {
        Self {
            chart,
            now: None,
            lowlight: None,
            note: None,
            fonts: vec![],
        }
    }

    pub fn at(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_access() {
        let r = Record::new("Eindhoven Station")
            .with_time("15:48")
            .with_secondary("407")
            .with_value(12.0);
        assert_eq!(r.field(FieldKind::Time).as_deref(), Some("15:48"));
        assert_eq!(r.field(FieldKind::Label).as_deref(), Some("Eindhoven Station"));
        assert_eq!(r.field(FieldKind::Secondary).as_deref(), Some("407"));
        assert_eq!(r.field(FieldKind::Detail), None);
        assert_eq!(r.field(FieldKind::Value).as_deref(), Some("12"));
        assert!(r.has_time() && r.has_value() && !r.has_classification());
    }

    #[test]
    fn test_lowlight_substring() {
        let r = Record::new("Eindhoven High Tech Campus");
        assert!(r.effective_flags(Some("Campus")).lowlighted);
        assert!(!r.effective_flags(Some("Station")).lowlighted);
        assert!(!r.effective_flags(None).lowlighted);
        assert!(r.effective_flags(Some("")).lowlighted);
    }

    #[test]
    fn test_validate_rejects_negative_value() {
        assert!(Record::new("a").with_value(-1.0).validate().is_err());
        assert!(Record::new("a").with_value(f64::NAN).validate().is_err());
        assert!(Record::new("a").with_value(3.0).validate().is_ok());
    }

    #[test]
    fn test_document_from_json() {
        let json = r#"{
            "chart": {
                "type": "Table",
                "groups": [
                    { "header": "Eindhoven, HTC/Berkenbos",
                      "records": [ { "time": "15:48", "label": "Eindhoven Station", "secondary": "407", "delayed": true } ] }
                ]
            },
            "now": "2024-01-10T12:00:00",
            "lowlight": "Campus"
        }"#;
        let doc = ChartDocument::from_json(json).unwrap();
        assert_eq!(doc.chart.kind(), "Table");
        assert_eq!(doc.chart.record_count(), 1);
        assert_eq!(doc.lowlight.as_deref(), Some("Campus"));
        match &doc.chart {
            Chart::Table { groups, .. } => assert!(groups[0].records[0].delayed),
            _ => panic!("expected a table"),
        }
    }
}
