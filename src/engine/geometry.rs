//! Time ↔ vertical position mapping for the day grid.
//!
//! The grid's first row is `window.start_hour`; one hour is `hour_height`
//! units tall. Nothing here clamps: items outside the window get negative or
//! past-the-end positions and the renderer decides what to hide.

use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;

use crate::config::WorkingWindow;
use crate::model::TimeInterval;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridPosition {
    pub top: f64,
    pub height: f64,
}

impl GridPosition {
    /// Apply the render-time visual floor. Not part of the geometric mapping.
    pub fn with_min_height(self, min_height: f64) -> Self {
        Self {
            top: self.top,
            height: self.height.max(min_height),
        }
    }
}

/// Grid origin for the day `t` falls on: `start_hour:00` of that date.
fn grid_origin(t: NaiveDateTime, window: &WorkingWindow) -> NaiveDateTime {
    t.date().and_time(NaiveTime::MIN) + Duration::hours(window.start_hour as i64)
}

fn offset(minutes: i64, hour_height: f64) -> f64 {
    minutes as f64 / 60.0 * hour_height
}

/// Both ends are measured from the start day's origin, so an end at the
/// next day's midnight still yields a positive height.
pub fn position_of(
    interval: &TimeInterval,
    window: &WorkingWindow,
    hour_height: f64,
) -> GridPosition {
    let origin = grid_origin(interval.start, window);
    GridPosition {
        top: offset((interval.start - origin).num_minutes(), hour_height),
        height: offset((interval.end - interval.start).num_minutes(), hour_height),
    }
}

/// Offset of the current-time line, or `None` when `now` falls outside
/// `[start_hour, end_hour)`.
pub fn now_indicator(
    now: NaiveDateTime,
    window: &WorkingWindow,
    hour_height: f64,
) -> Option<f64> {
    if !window.hours().contains(&now.hour()) {
        return None;
    }
    let origin = grid_origin(now, window);
    Some(offset((now - origin).num_minutes(), hour_height))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourMark {
    pub hour: u32,
    pub top: f64,
}

/// One row per hour label, `start_hour..=end_hour`.
pub fn hour_marks(window: &WorkingWindow, hour_height: f64) -> Vec<HourMark> {
    (window.start_hour..=window.end_hour)
        .enumerate()
        .map(|(i, hour)| HourMark {
            hour,
            top: i as f64 * hour_height,
        })
        .collect()
}

/// Offsets of the sub-hour grid lines inside one hour row.
pub fn slot_lines(window: &WorkingWindow, hour_height: f64) -> Vec<f64> {
    let step = window.slot_minutes;
    if step == 0 || step >= 60 {
        return Vec::new();
    }
    (1..60 / step)
        .map(|i| (i * step) as f64 / 60.0 * hour_height)
        .collect()
}
