use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Half-open interval `[start, end)` on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeInterval {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        debug_assert!(start < end, "TimeInterval start must be before end");
        Self { start, end }
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Drop seconds and sub-second precision; minutes are the finest unit.
pub fn truncate_to_minute(t: NaiveDateTime) -> NaiveDateTime {
    t.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(t)
}

/// A schedulable staff member. Loaded once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Confirmed,
    Pending,
}

/// What an appointment represents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppointmentKind {
    /// Time reserved for a client.
    Booking {
        client_name: String,
        details: Option<String>,
        status: BookingStatus,
    },
    /// Resource unavailable (break, meeting). Blocks slots like a booking.
    Blackout { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub resource_id: String,
    pub title: String,
    pub interval: TimeInterval,
    #[serde(flatten)]
    pub kind: AppointmentKind,
}

impl Appointment {
    pub fn is_blackout(&self) -> bool {
        matches!(self.kind, AppointmentKind::Blackout { .. })
    }

    pub fn client_name(&self) -> Option<&str> {
        match &self.kind {
            AppointmentKind::Booking { client_name, .. } => Some(client_name),
            AppointmentKind::Blackout { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftKind {
    #[default]
    Booking,
    Blackout,
}

/// Unchecked user input for a new appointment. Every field may be absent;
/// the validator decides what is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppointmentDraft {
    pub title: Option<String>,
    pub resource_id: Option<String>,
    pub kind: DraftKind,
    pub client_name: Option<String>,
    pub details: Option<String>,
    pub status: Option<BookingStatus>,
    /// Blackout label. Falls back to `details`, then the title.
    pub reason: Option<String>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

/// One free, fixed-size gap on a resource's day. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeSlot {
    pub resource_id: String,
    pub resource_name: String,
    pub interval: TimeInterval,
}

/// A resource's appointments, sorted by `interval.start`.
#[derive(Debug, Clone)]
pub struct ResourceSchedule {
    pub resource: Resource,
    pub appointments: Vec<Appointment>,
}

impl ResourceSchedule {
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            appointments: Vec::new(),
        }
    }

    /// Insert appointment maintaining sort order by start.
    pub fn insert_appointment(&mut self, appointment: Appointment) {
        let pos = self
            .appointments
            .partition_point(|a| a.interval.start <= appointment.interval.start);
        self.appointments.insert(pos, appointment);
    }

    /// Return only appointments whose interval overlaps the query window.
    /// Uses binary search to skip appointments starting at or after `query.end`.
    pub fn overlapping(&self, query: &TimeInterval) -> impl Iterator<Item = &Appointment> {
        let right_bound = self
            .appointments
            .partition_point(|a| a.interval.start < query.end);
        self.appointments[..right_bound]
            .iter()
            .filter(move |a| a.interval.end > query.start)
    }

    pub fn on_date(&self, date: NaiveDate) -> impl Iterator<Item = &Appointment> {
        self.appointments
            .iter()
            .filter(move |a| a.interval.start.date() == date)
    }
}

/// Change notifications sent to listeners of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    AppointmentAdded { appointment: Appointment },
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn interval_basics() {
        let s = span(9, 0, 9, 45);
        assert_eq!(s.duration_minutes(), 45);
        assert_eq!(s.date(), day());
    }

    #[test]
    fn interval_overlap() {
        let a = span(9, 0, 10, 0);
        let b = span(9, 30, 10, 30);
        let c = span(10, 0, 11, 0);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c)); // adjacent, not overlapping
    }

    #[test]
    fn truncate_drops_seconds() {
        let t = day().and_hms_milli_opt(9, 15, 42, 250).unwrap();
        assert_eq!(truncate_to_minute(t), at(9, 15));
    }

    #[test]
    fn appointment_ordering() {
        let mut rs = ResourceSchedule::new(resource("r1"));
        rs.insert_appointment(booking("a", "r1", span(14, 0, 15, 0)));
        rs.insert_appointment(blackout("b", "r1", span(9, 0, 10, 0)));
        rs.insert_appointment(booking("c", "r1", span(12, 0, 13, 0)));
        let ids: Vec<_> = rs.appointments.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn overlapping_skips_past_and_future() {
        let mut rs = ResourceSchedule::new(resource("r1"));
        rs.insert_appointment(booking("past", "r1", span(9, 0, 10, 0)));
        rs.insert_appointment(booking("hit", "r1", span(10, 30, 11, 30)));
        rs.insert_appointment(booking("future", "r1", span(15, 0, 16, 0)));

        let query = span(11, 0, 12, 0);
        let hits: Vec<_> = rs.overlapping(&query).collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "hit");
    }

    #[test]
    fn overlapping_adjacent_not_included() {
        let mut rs = ResourceSchedule::new(resource("r1"));
        rs.insert_appointment(booking("a", "r1", span(9, 0, 10, 0)));
        let hits: Vec<_> = rs.overlapping(&span(10, 0, 11, 0)).collect();
        assert!(hits.is_empty());
    }

    #[test]
    fn on_date_filters_other_days() {
        let mut rs = ResourceSchedule::new(resource("r1"));
        rs.insert_appointment(booking("today", "r1", span(9, 0, 10, 0)));
        let tomorrow = day().succ_opt().unwrap();
        let next = TimeInterval::new(
            tomorrow.and_hms_opt(9, 0, 0).unwrap(),
            tomorrow.and_hms_opt(10, 0, 0).unwrap(),
        );
        rs.insert_appointment(booking("tomorrow", "r1", next));

        let ids: Vec<_> = rs.on_date(day()).map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["today"]);
    }

    #[test]
    fn kind_helpers() {
        let b = booking("a", "r1", span(9, 0, 10, 0));
        assert!(!b.is_blackout());
        assert_eq!(b.client_name(), Some("Alex Morgan"));

        let x = blackout("b", "r1", span(12, 0, 13, 0));
        assert!(x.is_blackout());
        assert_eq!(x.client_name(), None);
    }

    #[test]
    fn appointment_json_shape() {
        let a = blackout("a2", "r1", span(12, 0, 13, 0));
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["type"], "blackout");
        assert_eq!(json["reason"], "Lunch break");
        assert_eq!(json["interval"]["start"], "2026-03-02T12:00:00");

        let back: Appointment = serde_json::from_value(json).unwrap();
        assert_eq!(back, a);
    }

    #[test]
    fn draft_defaults_to_booking() {
        let draft: AppointmentDraft =
            serde_json::from_str(r#"{"title":"Cut","start":"2026-03-02T09:00:00"}"#).unwrap();
        assert_eq!(draft.kind, DraftKind::Booking);
        assert_eq!(draft.start, Some(at(9, 0)));
        assert_eq!(draft.end, None);
    }
}
