//! # Ranked Pie Entries
//!
//! Counts are ranked (rank 1 is the highest count), the top ranks are
//! highlighted, and the result is shuffled so neighbouring slices don't
//! line up by size.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;

use crate::model::Record;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Entry {
    pub label: String,
    pub count: f64,
}

impl Entry {
    pub fn new(label: &str, count: f64) -> Self {
        Self {
            label: label.to_string(),
            count,
        }
    }
}

/// Rank by count, highlight ranks `1..=top`, shuffle with `rng`.
pub fn ranked_records<R: Rng + ?Sized>(entries: &[Entry], top: usize, rng: &mut R) -> Vec<Record> {
    let mut ranked: Vec<&Entry> = entries.iter().collect();
    ranked.sort_by(|a, b| b.count.total_cmp(&a.count));
    let mut records: Vec<Record> = ranked
        .into_iter()
        .enumerate()
        .map(|(i, e)| {
            let record = Record::new(&e.label).with_value(e.count);
            if i < top {
                record.highlighted()
            } else {
                record
            }
        })
        .collect();
    records.shuffle(rng);
    records
}
