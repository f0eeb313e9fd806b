use chrono::{NaiveTime, Timelike};
use ulid::Ulid;

use crate::config::SchedulerConfig;
use crate::model::*;

use super::conflict::has_conflict;
use super::ValidationError;

/// A draft that passed every rule except the conflict check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedDraft {
    pub resource_id: String,
    pub title: String,
    pub interval: TimeInterval,
    pub kind: AppointmentKind,
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ValidationError::MissingField(field)),
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Field, interval, window and duration rules, in that order.
pub fn check_draft(
    draft: AppointmentDraft,
    config: &SchedulerConfig,
) -> Result<CheckedDraft, ValidationError> {
    let title = required(draft.title, "title")?;
    let resource_id = required(draft.resource_id, "resource_id")?;
    let client_name = match draft.kind {
        DraftKind::Booking => Some(required(draft.client_name, "client_name")?),
        DraftKind::Blackout => None,
    };
    let start = draft.start.ok_or(ValidationError::MissingField("start"))?;
    let end = draft.end.ok_or(ValidationError::MissingField("end"))?;
    let (start, end) = (truncate_to_minute(start), truncate_to_minute(end));

    if end <= start {
        return Err(ValidationError::InvalidInterval);
    }

    let window = &config.window;
    let midnight = start.date().and_time(NaiveTime::MIN);
    let end_offset = (end - midnight).num_minutes();
    if start.hour() < window.start_hour || end_offset > (window.end_hour * 60) as i64 {
        return Err(ValidationError::OutOfWindow {
            start_hour: window.start_hour,
            end_hour: window.end_hour,
        });
    }

    let interval = TimeInterval::new(start, end);
    let minutes = interval.duration_minutes();
    if minutes < config.min_appointment_duration as i64 {
        return Err(ValidationError::TooShort {
            min_minutes: config.min_appointment_duration,
        });
    }
    if minutes > config.max_appointment_duration as i64 {
        return Err(ValidationError::TooLong {
            max_minutes: config.max_appointment_duration,
        });
    }

    let kind = match client_name {
        Some(client_name) => AppointmentKind::Booking {
            client_name,
            details: optional(draft.details),
            status: draft.status.unwrap_or_default(),
        },
        None => AppointmentKind::Blackout {
            reason: optional(draft.reason)
                .or_else(|| optional(draft.details))
                .unwrap_or_else(|| title.clone()),
        },
    };

    Ok(CheckedDraft {
        resource_id,
        title,
        interval,
        kind,
    })
}

/// Conflict check against the target resource's appointments. Appointments
/// of other resources in `existing` are ignored. Mints the id on success.
pub fn admit<'a, I>(checked: CheckedDraft, existing: I) -> Result<Appointment, ValidationError>
where
    I: IntoIterator<Item = &'a Appointment>,
{
    let same_resource = existing
        .into_iter()
        .filter(|appt| appt.resource_id == checked.resource_id)
        .map(|appt| &appt.interval);
    if has_conflict(&checked.interval, same_resource) {
        return Err(ValidationError::SlotUnavailable);
    }
    Ok(Appointment {
        id: Ulid::new().to_string(),
        resource_id: checked.resource_id,
        title: checked.title,
        interval: checked.interval,
        kind: checked.kind,
    })
}

/// Run every admission rule against a snapshot of existing appointments.
pub fn validate(
    draft: AppointmentDraft,
    existing: &[Appointment],
    config: &SchedulerConfig,
) -> Result<Appointment, ValidationError> {
    let checked = check_draft(draft, config)?;
    admit(checked, existing)
}
