//! Demo roster and a demo day of appointments.

use chrono::NaiveDate;

use crate::model::*;

fn resource(id: &str, name: &str, specialty: &str, color: &str) -> Resource {
    Resource {
        id: id.into(),
        name: name.into(),
        specialty: specialty.into(),
        color: color.into(),
    }
}

pub fn demo_resources() -> Vec<Resource> {
    vec![
        resource("r1", "John Smith", "Haircuts", "#3b82f6"),
        resource("r2", "Sarah Johnson", "Color Treatment", "#10b981"),
        resource("r3", "Michael Brown", "Beard & Shaving", "#8b5cf6"),
        resource("r4", "Emily Davis", "Styling", "#f97316"),
    ]
}

struct Row {
    id: &'static str,
    resource_id: &'static str,
    title: &'static str,
    start: (u32, u32),
    end: (u32, u32),
    /// `None` marks a blackout.
    client: Option<&'static str>,
    details: Option<&'static str>,
    status: BookingStatus,
}

const DEMO_DAY: &[Row] = &[
    Row {
        id: "a1",
        resource_id: "r1",
        title: "Haircut & Style",
        start: (9, 15),
        end: (10, 0),
        client: Some("Alex Morgan"),
        details: Some("Prefers shorter on sides, longer on top"),
        status: BookingStatus::Confirmed,
    },
    Row {
        id: "a2",
        resource_id: "r1",
        title: "Unavailable",
        start: (12, 0),
        end: (13, 0),
        client: None,
        details: Some("Lunch break"),
        status: BookingStatus::Confirmed,
    },
    Row {
        id: "a3",
        resource_id: "r2",
        title: "Color Treatment",
        start: (9, 0),
        end: (10, 45),
        client: Some("Taylor Wilson"),
        details: Some("Wants to go from blonde to auburn"),
        status: BookingStatus::Confirmed,
    },
    Row {
        id: "a4",
        resource_id: "r3",
        title: "Beard Trim",
        start: (11, 30),
        end: (12, 15),
        client: Some("Jordan Lee"),
        details: None,
        status: BookingStatus::Confirmed,
    },
    Row {
        id: "a5",
        resource_id: "r2",
        title: "Unavailable",
        start: (13, 0),
        end: (14, 30),
        client: None,
        details: Some("Training session"),
        status: BookingStatus::Confirmed,
    },
    Row {
        id: "a6",
        resource_id: "r4",
        title: "Hair Wash & Blowdry",
        start: (10, 0),
        end: (10, 45),
        client: Some("Casey Ryan"),
        details: None,
        status: BookingStatus::Confirmed,
    },
    Row {
        id: "a7",
        resource_id: "r3",
        title: "Hair Coloring",
        start: (14, 15),
        end: (16, 15),
        client: Some("Jamie Parker"),
        details: Some("Going for blue highlights"),
        status: BookingStatus::Pending,
    },
    Row {
        id: "a8",
        resource_id: "r4",
        title: "Haircut",
        start: (13, 15),
        end: (14, 0),
        client: Some("Riley Smith"),
        details: None,
        status: BookingStatus::Confirmed,
    },
    Row {
        id: "a9",
        resource_id: "r1",
        title: "Full Makeover",
        start: (14, 30),
        end: (16, 45),
        client: Some("Avery Johnson"),
        details: Some("Complete styling for wedding tomorrow"),
        status: BookingStatus::Confirmed,
    },
    Row {
        id: "a10",
        resource_id: "r4",
        title: "Unavailable",
        start: (15, 0),
        end: (16, 30),
        client: None,
        details: Some("Meeting with product vendor"),
        status: BookingStatus::Confirmed,
    },
];

/// The demo day's bookings and blackouts, anchored to `date`.
pub fn demo_appointments(date: NaiveDate) -> Vec<Appointment> {
    DEMO_DAY
        .iter()
        .filter_map(|row| {
            let start = date.and_hms_opt(row.start.0, row.start.1, 0)?;
            let end = date.and_hms_opt(row.end.0, row.end.1, 0)?;
            let kind = match row.client {
                Some(client) => AppointmentKind::Booking {
                    client_name: client.into(),
                    details: row.details.map(Into::into),
                    status: row.status,
                },
                None => AppointmentKind::Blackout {
                    reason: row.details.unwrap_or(row.title).into(),
                },
            };
            Some(Appointment {
                id: row.id.into(),
                resource_id: row.resource_id.into(),
                title: row.title.into(),
                interval: TimeInterval::new(start, end),
                kind,
            })
        })
        .collect()
}
