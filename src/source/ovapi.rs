//! # OVapi Stop Areas
//!
//! Payload shape, per requested stop area code:
//!
//! ```text
//! { "ehvhbb": { "64121290": { "Stop": { "TimingPointName": "..." },
//!                             "Passes": { "<id>": { "DestinationName50": "...",
//!                                                   "LinePublicNumber": "...",
//!                                                   "TargetArrivalTime": "...",
//!                                                   "ExpectedArrivalTime": "..." } } } } }
//! ```
//!
//! Each stop area holds one timing point. Its passes become records sorted
//! by planned arrival; a pass at least a minute late is delayed and shows
//! the delay in whole minutes after its time.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDateTime;
use serde::Deserialize;

use super::source_error;
use crate::error::Result;
use crate::model::{Group, Record};

const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Delays shorter than this are not shown.
const DELAY_THRESHOLD_SECS: i64 = 60;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TimingPoint {
    stop: Stop,
    #[serde(default)]
    passes: HashMap<String, Pass>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Stop {
    timing_point_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Pass {
    destination_name50: String,
    line_public_number: String,
    target_arrival_time: String,
    expected_arrival_time: String,
}

type StopAreas = HashMap<String, BTreeMap<String, TimingPoint>>;

/// One group per requested stop area, in request order.
pub fn stop_area_groups(json: &str, stops: &[&str]) -> Result<Vec<Group>> {
    let areas: StopAreas = serde_json::from_str(json)?;
    stops
        .iter()
        .map(|code| {
            let area = areas
                .get(*code)
                .ok_or_else(|| source_error("ovapi", format!("stop area '{}' missing", code)))?;
            let (_, point) = area
                .iter()
                .next()
                .ok_or_else(|| source_error("ovapi", format!("stop area '{}' has no timing point", code)))?;
            timing_point_group(point)
        })
        .collect()
}

fn timing_point_group(point: &TimingPoint) -> Result<Group> {
    let mut passes = Vec::with_capacity(point.passes.len());
    for pass in point.passes.values() {
        let target = parse_time(&pass.target_arrival_time)?;
        let expected = parse_time(&pass.expected_arrival_time)?;
        passes.push((target, (expected - target).num_seconds(), pass));
    }
    passes.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.2.line_public_number.cmp(&b.2.line_public_number)));

    let records = passes
        .into_iter()
        .map(|(target, delay, pass)| {
            let mut time = target.format("%H:%M").to_string();
            let mut record = Record::new(&pass.destination_name50)
                .with_secondary(&pass.line_public_number);
            if delay >= DELAY_THRESHOLD_SECS {
                time.push_str(&format!(" +{}", delay / 60));
                record = record.delayed();
            }
            record.with_time(&time)
        })
        .collect();
    Ok(Group::new(&point.stop.timing_point_name, records))
}

fn parse_time(text: &str) -> Result<NaiveDateTime> {
    // Offsets like "+0200" may trail the local time; the local part is enough.
    let local = text.get(..19).unwrap_or(text);
    NaiveDateTime::parse_from_str(local, TIME_FORMAT)
        .map_err(|e| source_error("ovapi", format!("bad time '{}': {}", text, e)))
}
