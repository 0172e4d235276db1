//! # NS Departures
//!
//! Turns the `payload.departures` list of an NS departure board into
//! records: direction as the label, planned time, track and train category
//! as the secondary field, and the stations it calls at as the detail.

use serde::Deserialize;

use super::source_error;
use crate::error::Result;
use crate::model::{Group, Record};

#[derive(Debug, Deserialize)]
struct Board {
    payload: Payload,
}

#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(default)]
    departures: Vec<Departure>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Departure {
    direction: String,
    planned_date_time: String,
    #[serde(default)]
    planned_track: String,
    product: Product,
    #[serde(default)]
    route_stations: Vec<Station>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Product {
    long_category_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Station {
    medium_name: String,
}

/// Departures in board order.
pub fn departure_records(json: &str) -> Result<Vec<Record>> {
    let board: Board = serde_json::from_str(json)?;
    board.payload.departures.iter().map(departure_record).collect()
}

/// The board as a single headerless group.
pub fn departure_group(json: &str) -> Result<Group> {
    Ok(Group::headless(departure_records(json)?))
}

fn departure_record(dep: &Departure) -> Result<Record> {
    // "2021-09-29T13:42:00+0200": hours and minutes sit at 11..16
    let time = dep
        .planned_date_time
        .get(11..16)
        .ok_or_else(|| source_error("ns", format!("bad time '{}'", dep.planned_date_time)))?;
    let mut record = Record::new(&dep.direction)
        .with_time(time)
        .with_secondary(&format!(
            "track {} {}",
            dep.planned_track, dep.product.long_category_name
        ));
    if !dep.route_stations.is_empty() {
        let stations: Vec<&str> = dep.route_stations.iter().map(|s| s.medium_name.as_str()).collect();
        record = record.with_detail(&format!("via {}", stations.join(", ")));
    }
    Ok(record)
}
