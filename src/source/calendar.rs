//! # Birthday Calendar
//!
//! Spreads a name/date list over three month groups starting at the month
//! of `now`. Birthdays are matched on month and day only, so the birth year
//! is irrelevant; each record is dated in the year of its column so the
//! cursor can find today.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::model::{Group, Record};

/// Number of months shown.
pub const MONTHS: u32 = 3;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Birthday {
    pub name: String,
    pub date: NaiveDate,
}

impl Birthday {
    pub fn new(name: &str, date: NaiveDate) -> Self {
        Self {
            name: name.to_string(),
            date,
        }
    }
}

/// Month groups for `now`'s month and the two after it. Today's birthdays
/// are highlighted and only the current month tracks the cursor.
pub fn month_groups(birthdays: &[Birthday], now: NaiveDateTime) -> Vec<Group> {
    let today = now.date();
    let mut month = today.month();
    let mut year = today.year();
    let mut groups = Vec::with_capacity(MONTHS as usize);
    for i in 0..MONTHS {
        let mut rows: Vec<&Birthday> = birthdays.iter().filter(|b| b.date.month() == month).collect();
        // stable: people sharing a day keep their input order
        rows.sort_by_key(|b| b.date.day());

        let records = rows
            .into_iter()
            .map(|b| {
                let day = b.date.day();
                let mut record = Record::new(&b.name)
                    .with_time(&format!("{:2}", day))
                    .with_date(column_date(year, month, day));
                if month == today.month() && day == today.day() {
                    record = record.highlighted();
                }
                record
            })
            .collect();

        let header = format!("{} {}", MONTH_NAMES[(month - 1) as usize], year);
        let group = Group::new(&header, records);
        groups.push(if i == 0 { group.tracking_now() } else { group });

        month += 1;
        if month == 13 {
            month = 1;
            year += 1;
        }
    }
    groups
}

/// February 29th falls back to the 28th in common years.
fn column_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day)
        .or_else(|| NaiveDate::from_ymd_opt(year, month, 28))
        .unwrap_or(NaiveDate::MIN)
}
