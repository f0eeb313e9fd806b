use tracing::{debug, info};

use crate::limits::*;
use crate::model::*;

use super::conflict::find_conflict;
use super::validate::{admit, check_draft};
use super::{Engine, EngineError};

fn check_len(value: &Option<String>, max: usize, what: &'static str) -> Result<(), EngineError> {
    match value {
        Some(v) if v.len() > max => Err(EngineError::LimitExceeded(what)),
        _ => Ok(()),
    }
}

fn check_draft_limits(draft: &AppointmentDraft) -> Result<(), EngineError> {
    check_len(&draft.title, MAX_TITLE_LEN, "title too long")?;
    check_len(&draft.resource_id, MAX_ID_LEN, "resource id too long")?;
    check_len(&draft.client_name, MAX_NAME_LEN, "client name too long")?;
    check_len(&draft.details, MAX_DETAILS_LEN, "details too long")?;
    check_len(&draft.reason, MAX_DETAILS_LEN, "reason too long")
}

impl Engine {
    /// Validate `draft` and append it to its resource's timeline.
    ///
    /// The conflict check and the append run under the resource's write
    /// guard, so two submissions for the same slot cannot both succeed.
    /// Listeners of the resource are notified after the guard is released.
    pub fn submit(&self, draft: AppointmentDraft) -> Result<Appointment, EngineError> {
        let result = self.try_submit(draft);
        let outcome = match &result {
            Ok(_) => "admitted",
            Err(e) => e.code(),
        };
        metrics::counter!(crate::observability::SUBMISSIONS_TOTAL, "outcome" => outcome)
            .increment(1);
        result
    }

    fn try_submit(&self, draft: AppointmentDraft) -> Result<Appointment, EngineError> {
        check_draft_limits(&draft)?;
        let checked = check_draft(draft, &self.config)?;
        let resource_id = checked.resource_id.clone();
        let interval = checked.interval;

        let mut schedule = self
            .store
            .schedule_mut(&resource_id)
            .ok_or_else(|| EngineError::NotFound(resource_id.clone()))?;
        if schedule.appointments.len() >= MAX_APPOINTMENTS_PER_RESOURCE {
            return Err(EngineError::LimitExceeded("too many appointments on resource"));
        }

        // Only appointments starting before the candidate ends can overlap it.
        let appointment = match admit(checked, schedule.overlapping(&interval)) {
            Ok(appointment) => appointment,
            Err(e) => {
                if let Some(hit) = find_conflict(&interval, schedule.overlapping(&interval)) {
                    debug!("rejected {resource_id} {interval:?}: conflicts with {}", hit.id);
                }
                return Err(e.into());
            }
        };
        schedule.insert_appointment(appointment.clone());
        drop(schedule);

        self.store
            .map_entity(appointment.id.clone(), resource_id.clone());
        info!(
            "admitted {} on {resource_id} [{}, {})",
            appointment.id, interval.start, interval.end
        );
        self.notify.send(
            &resource_id,
            &Event::AppointmentAdded {
                appointment: appointment.clone(),
            },
        );
        Ok(appointment)
    }

    /// Load pre-existing appointments (seed data) without running the
    /// admission rules. Ids must be unique and resources must exist.
    pub fn load_appointments(&self, appointments: Vec<Appointment>) -> Result<usize, EngineError> {
        let mut loaded = 0;
        for appointment in appointments {
            if self.store.contains_entity(&appointment.id) {
                return Err(EngineError::AlreadyExists(appointment.id));
            }
            let resource_id = appointment.resource_id.clone();
            let mut schedule = self
                .store
                .schedule_mut(&resource_id)
                .ok_or_else(|| EngineError::NotFound(resource_id.clone()))?;
            if schedule.appointments.len() >= MAX_APPOINTMENTS_PER_RESOURCE {
                return Err(EngineError::LimitExceeded("too many appointments on resource"));
            }
            let id = appointment.id.clone();
            schedule.insert_appointment(appointment);
            drop(schedule);
            self.store.map_entity(id, resource_id);
            loaded += 1;
        }
        info!("loaded {loaded} appointments");
        Ok(loaded)
    }
}
