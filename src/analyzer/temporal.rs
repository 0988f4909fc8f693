use std::borrow::Borrow;

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::parser::types::{Review, Sentiment};

pub const DAYS_PER_WEEK: usize = 7;
pub const HOURS_PER_DAY: usize = 24;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatCell {
    pub count: usize,
    pub neg_count: usize,
}

/// Day-of-week × hour grid. Row 0 is Monday, row 6 is Sunday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeHeatmap {
    pub cells: [[HeatCell; HOURS_PER_DAY]; DAYS_PER_WEEK],
}

impl Default for TimeHeatmap {
    fn default() -> Self {
        TimeHeatmap {
            cells: [[HeatCell::default(); HOURS_PER_DAY]; DAYS_PER_WEEK],
        }
    }
}

impl TimeHeatmap {
    pub fn cell(&self, row: usize, hour: usize) -> HeatCell {
        self.cells[row][hour]
    }

    pub fn total(&self) -> usize {
        self.cells.iter().flatten().map(|c| c.count).sum()
    }
}

/// Re-base a Sunday-first weekday (0 = Sunday) onto a Monday-first row.
pub fn weekday_row(days_from_sunday: u32) -> usize {
    if days_from_sunday == 0 {
        6
    } else {
        days_from_sunday as usize - 1
    }
}

/// (row, hour) of the cell a timestamp falls into.
pub fn heat_coordinates(ts: NaiveDateTime) -> (usize, usize) {
    (
        weekday_row(ts.weekday().num_days_from_sunday()),
        ts.hour() as usize,
    )
}

/// Negativity density by weekday and hour. Undated reviews are skipped.
pub fn time_heatmap<R: Borrow<Review>>(reviews: &[R]) -> TimeHeatmap {
    let mut heatmap = TimeHeatmap::default();
    for r in reviews {
        let review: &Review = r.borrow();
        let Some(ts) = review.timestamp() else {
            continue;
        };
        let (row, hour) = heat_coordinates(ts);
        let cell = &mut heatmap.cells[row][hour];
        cell.count += 1;
        if review.sentiment == Sentiment::Negative {
            cell.neg_count += 1;
        }
    }
    heatmap
}
