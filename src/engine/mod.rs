mod availability;
mod conflict;
mod error;
pub mod geometry;
mod mutations;
mod queries;
mod store;
mod validate;

pub use availability::{
    DEFAULT_SLOT_MINUTES, find_available_slots, idle_spans, merge_overlapping, subtract_intervals,
    window_span,
};
pub use conflict::{find_conflict, has_conflict, intervals_conflict};
pub use error::{EngineError, ValidationError};
pub use geometry::{GridPosition, HourMark, position_of};
pub use queries::{DayLayout, PlacedAppointment, ResourceColumn};
pub use store::InMemoryStore;
pub use validate::{CheckedDraft, admit, check_draft, validate};

use std::sync::Arc;

use crate::config::SchedulerConfig;
use crate::model::*;
use crate::notify::NotifyHub;

/// The day schedule: roster, appointments and the admission path, bound to
/// one read-only configuration.
pub struct Engine {
    pub config: SchedulerConfig,
    store: InMemoryStore,
    pub notify: Arc<NotifyHub>,
}

impl Engine {
    pub fn new(
        config: SchedulerConfig,
        resources: Vec<Resource>,
        notify: Arc<NotifyHub>,
    ) -> Result<Self, EngineError> {
        use crate::limits::*;
        if resources.len() > MAX_RESOURCES {
            return Err(EngineError::LimitExceeded("too many resources"));
        }
        for r in &resources {
            if r.id.is_empty() || r.id.len() > MAX_ID_LEN {
                return Err(EngineError::LimitExceeded("resource id length"));
            }
            if r.name.len() > MAX_NAME_LEN {
                return Err(EngineError::LimitExceeded("resource name too long"));
            }
        }
        Ok(Self {
            config,
            store: InMemoryStore::with_roster(resources)?,
            notify,
        })
    }

    pub fn store(&self) -> &InMemoryStore {
        &self.store
    }
}
