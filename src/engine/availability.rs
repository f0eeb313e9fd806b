use chrono::{Duration, NaiveDate};

use crate::config::WorkingWindow;
use crate::model::*;

use super::conflict::has_conflict;

pub const DEFAULT_SLOT_MINUTES: u32 = 15;

// ── Fixed-step slot enumeration ───────────────────────────────────

/// Enumerate free slots of exactly `duration` minutes (default 15) for each
/// resource on `date`.
///
/// Walks the window hour by hour; inside each hour, minute 0, d, 2d, … < 60.
/// Each candidate `[slot_start, slot_start + d)` is kept when it does not
/// conflict with any of that resource's appointments, blackouts included.
/// Output is grouped by resource in roster order, chronological within.
///
/// The walk never snaps to appointment edges, so an idle gap shorter than
/// `d`, or one not aligned to the step, is not reported. `idle_spans` gives
/// the exact gaps.
pub fn find_available_slots(
    resources: &[Resource],
    appointments: &[Appointment],
    date: NaiveDate,
    duration: Option<u32>,
    window: &WorkingWindow,
) -> Vec<FreeSlot> {
    let duration = duration.unwrap_or(DEFAULT_SLOT_MINUTES);
    if duration == 0 {
        return Vec::new();
    }
    let step = Duration::minutes(duration as i64);
    let mut slots = Vec::new();

    for resource in resources {
        let booked: Vec<&TimeInterval> = appointments
            .iter()
            .filter(|appt| appt.resource_id == resource.id)
            .map(|appt| &appt.interval)
            .collect();

        for hour in window.hours() {
            let mut minute = 0;
            while minute < 60 {
                let Some(slot_start) = date.and_hms_opt(hour, minute, 0) else {
                    break;
                };
                let slot = TimeInterval::new(slot_start, slot_start + step);
                if !has_conflict(&slot, booked.iter().copied()) {
                    slots.push(FreeSlot {
                        resource_id: resource.id.clone(),
                        resource_name: resource.name.clone(),
                        interval: slot,
                    });
                }
                minute += duration;
            }
        }
    }

    slots
}

// ── Exact idle time ───────────────────────────────────────────────

/// The working window on `date` as an interval.
pub fn window_span(window: &WorkingWindow, date: NaiveDate) -> Option<TimeInterval> {
    let start = date.and_hms_opt(window.start_hour, 0, 0)?;
    let end = start + Duration::hours((window.end_hour - window.start_hour) as i64);
    Some(TimeInterval::new(start, end))
}

/// Idle time of one resource inside the window on `date`: the window minus
/// every appointment, with no granularity applied.
pub fn idle_spans(
    window: &WorkingWindow,
    date: NaiveDate,
    appointments: &[Appointment],
) -> Vec<TimeInterval> {
    let Some(day) = window_span(window, date) else {
        return Vec::new();
    };
    let mut busy: Vec<TimeInterval> = appointments
        .iter()
        .map(|appt| appt.interval)
        .filter(|interval| interval.overlaps(&day))
        .collect();
    busy.sort_by_key(|s| s.start);
    let busy = merge_overlapping(&busy);
    subtract_intervals(&[day], &busy)
}

/// Merge sorted overlapping/adjacent intervals into disjoint intervals.
pub fn merge_overlapping(sorted: &[TimeInterval]) -> Vec<TimeInterval> {
    let mut merged: Vec<TimeInterval> = Vec::new();
    for &span in sorted {
        if let Some(last) = merged.last_mut()
            && span.start <= last.end
        {
            last.end = last.end.max(span.end);
            continue;
        }
        merged.push(span);
    }
    merged
}

/// Remove sorted, disjoint `to_remove` spans from sorted `base` spans.
pub fn subtract_intervals(base: &[TimeInterval], to_remove: &[TimeInterval]) -> Vec<TimeInterval> {
    let mut result = Vec::new();
    let mut ri = 0;

    for &b in base {
        let mut current_start = b.start;
        let current_end = b.end;

        while ri < to_remove.len() && to_remove[ri].end <= current_start {
            ri += 1;
        }

        let mut j = ri;
        while j < to_remove.len() && to_remove[j].start < current_end {
            let r = &to_remove[j];
            if r.start > current_start {
                result.push(TimeInterval::new(current_start, r.start));
            }
            current_start = current_start.max(r.end);
            j += 1;
        }

        if current_start < current_end {
            result.push(TimeInterval::new(current_start, current_end));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::conflict::intervals_conflict;
    use crate::model::fixtures::*;
    use proptest::prelude::*;

    fn window() -> WorkingWindow {
        WorkingWindow::default()
    }

    fn starts(slots: &[FreeSlot]) -> Vec<(u32, u32)> {
        use chrono::Timelike;
        slots
            .iter()
            .map(|s| (s.interval.start.hour(), s.interval.start.minute()))
            .collect()
    }

    // ── find_available_slots ──────────────────────────────

    #[test]
    fn empty_day_covers_window() {
        let slots = find_available_slots(&[resource("r1")], &[], day(), Some(15), &window());
        assert_eq!(slots.len(), 32);
        assert_eq!(slots[0].interval, span(9, 0, 9, 15));
        assert_eq!(slots[31].interval, span(16, 45, 17, 0));
        for pair in slots.windows(2) {
            assert_eq!(pair[0].interval.end, pair[1].interval.start);
        }
    }

    #[test]
    fn duration_defaults_to_fifteen() {
        let slots = find_available_slots(&[resource("r1")], &[], day(), None, &window());
        assert!(slots.iter().all(|s| s.interval.duration_minutes() == 15));
        assert_eq!(slots.len(), 32);
    }

    #[test]
    fn booking_blocks_only_its_slots() {
        let appts = vec![booking("a1", "r1", span(10, 0, 10, 45))];
        let slots = find_available_slots(&[resource("r1")], &appts, day(), Some(15), &window());
        let got: Vec<TimeInterval> = slots.iter().map(|s| s.interval).collect();

        assert!(got.contains(&span(9, 45, 10, 0)));
        assert!(got.contains(&span(10, 45, 11, 0)));
        assert!(!got.contains(&span(10, 0, 10, 15)));
        assert!(!got.contains(&span(10, 15, 10, 30)));
        assert!(!got.contains(&span(10, 30, 10, 45)));
        assert_eq!(slots.len(), 29);
    }

    #[test]
    fn blackout_blocks_like_booking() {
        let appts = vec![blackout("a2", "r1", span(12, 0, 13, 0))];
        let slots = find_available_slots(&[resource("r1")], &appts, day(), Some(30), &window());
        let got = starts(&slots);
        assert!(got.contains(&(11, 30)));
        assert!(!got.contains(&(12, 0)));
        assert!(!got.contains(&(12, 30)));
        assert!(got.contains(&(13, 0)));
    }

    #[test]
    fn other_resources_do_not_block() {
        let appts = vec![booking("a1", "r2", span(9, 0, 17, 0))];
        let slots = find_available_slots(
            &[resource("r1"), resource("r2")],
            &appts,
            day(),
            Some(60),
            &window(),
        );
        assert_eq!(slots.len(), 8);
        assert!(slots.iter().all(|s| s.resource_id == "r1"));
        assert_eq!(slots[0].resource_name, "Stylist r1");
    }

    #[test]
    fn resource_order_then_chronological() {
        let slots = find_available_slots(
            &[resource("r2"), resource("r1")],
            &[],
            day(),
            Some(240),
            &window(),
        );
        let order: Vec<_> = slots.iter().map(|s| s.resource_id.as_str()).collect();
        // Minute walk restarts each hour, so a 4h step yields one slot per hour.
        assert_eq!(order.len(), 16);
        assert!(order[..8].iter().all(|id| *id == "r2"));
        assert!(order[8..].iter().all(|id| *id == "r1"));
        assert!(slots[..8].windows(2).all(|p| p[0].interval.start < p[1].interval.start));
    }

    #[test]
    fn short_gap_is_not_surfaced() {
        // 10 idle minutes between two bookings, 15 minute grid.
        let appts = vec![
            booking("a1", "r1", span(9, 0, 10, 5)),
            booking("a2", "r1", span(10, 15, 11, 0)),
        ];
        let slots = find_available_slots(&[resource("r1")], &appts, day(), Some(15), &window());
        let got = starts(&slots);
        assert_eq!(got[0], (11, 0));
    }

    #[test]
    fn step_not_dividing_hour_restarts_each_hour() {
        let slots = find_available_slots(&[resource("r1")], &[], day(), Some(45), &window());
        let got = starts(&slots);
        assert_eq!(&got[..4], &[(9, 0), (9, 45), (10, 0), (10, 45)]);
    }

    #[test]
    fn zero_duration_yields_nothing() {
        let slots = find_available_slots(&[resource("r1")], &[], day(), Some(0), &window());
        assert!(slots.is_empty());
    }

    #[test]
    fn slots_anchor_to_requested_date() {
        let other = day().succ_opt().unwrap();
        let slots = find_available_slots(&[resource("r1")], &[], other, Some(60), &window());
        assert!(slots.iter().all(|s| s.interval.start.date() == other));
    }

    // ── idle_spans ────────────────────────────────────────

    #[test]
    fn idle_spans_exact_gaps() {
        let appts = vec![
            booking("a1", "r1", span(9, 15, 10, 0)),
            blackout("a2", "r1", span(12, 0, 13, 0)),
            booking("a9", "r1", span(14, 30, 16, 45)),
        ];
        let idle = idle_spans(&window(), day(), &appts);
        assert_eq!(
            idle,
            vec![
                span(9, 0, 9, 15),
                span(10, 0, 12, 0),
                span(13, 0, 14, 30),
                span(16, 45, 17, 0),
            ]
        );
    }

    #[test]
    fn idle_spans_shows_gap_the_grid_misses() {
        let appts = vec![
            booking("a1", "r1", span(9, 0, 10, 5)),
            booking("a2", "r1", span(10, 15, 17, 0)),
        ];
        assert_eq!(idle_spans(&window(), day(), &appts), vec![span(10, 5, 10, 15)]);
    }

    #[test]
    fn idle_spans_ignores_out_of_window_and_merges() {
        let appts = vec![
            booking("early", "r1", span(7, 0, 8, 0)),
            booking("x", "r1", span(9, 0, 11, 0)),
            booking("y", "r1", span(10, 0, 12, 0)),
        ];
        assert_eq!(idle_spans(&window(), day(), &appts), vec![span(12, 0, 17, 0)]);
    }

    // ── interval helpers ──────────────────────────────────

    #[test]
    fn subtract_middle_punch() {
        let result = subtract_intervals(&[span(9, 0, 12, 0)], &[span(10, 0, 11, 0)]);
        assert_eq!(result, vec![span(9, 0, 10, 0), span(11, 0, 12, 0)]);
    }

    #[test]
    fn subtract_full_overlap() {
        let result = subtract_intervals(&[span(10, 0, 11, 0)], &[span(9, 0, 12, 0)]);
        assert!(result.is_empty());
    }

    #[test]
    fn merge_adjacent() {
        let sorted = [span(9, 0, 10, 0), span(10, 0, 11, 0), span(12, 0, 13, 0)];
        let merged = merge_overlapping(&sorted);
        assert_eq!(merged, vec![span(9, 0, 11, 0), span(12, 0, 13, 0)]);
    }

    fn booking_strategy() -> impl Strategy<Value = Vec<(u32, u32, i64)>> {
        prop::collection::vec((9u32..17, 0u32..60, 5i64..120), 0..6)
    }

    fn step_strategy() -> impl Strategy<Value = u32> {
        prop::sample::select(vec![5u32, 10, 12, 15, 20, 30, 60])
    }

    proptest! {
        #[test]
        fn free_slots_never_overlap_bookings(raw in booking_strategy(), step in step_strategy()) {
            let appts: Vec<Appointment> = raw
                .iter()
                .enumerate()
                .map(|(i, &(h, m, len))| {
                    let start = at(h, m);
                    let interval = TimeInterval::new(start, start + Duration::minutes(len));
                    booking(&format!("a{i}"), "r1", interval)
                })
                .collect();
            let roster = [resource("r1")];
            let slots = find_available_slots(&roster, &appts, day(), Some(step), &window());
            for slot in &slots {
                prop_assert_eq!(slot.interval.duration_minutes(), step as i64);
                for appt in &appts {
                    prop_assert!(!intervals_conflict(&slot.interval, &appt.interval));
                }
            }
        }

        #[test]
        fn empty_day_is_tiled_exactly(step in step_strategy()) {
            let slots = find_available_slots(&[resource("r1")], &[], day(), Some(step), &window());
            prop_assert_eq!(slots.len() as u32, 8 * 60 / step);
            prop_assert_eq!(slots[0].interval.start, at(9, 0));
            prop_assert_eq!(slots[slots.len() - 1].interval.end, at(17, 0));
            for pair in slots.windows(2) {
                prop_assert_eq!(pair[0].interval.end, pair[1].interval.start);
            }
        }
    }
}
