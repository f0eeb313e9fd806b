use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::model::*;

use super::availability::{find_available_slots, idle_spans};
use super::geometry::{self, GridPosition, HourMark};
use super::{Engine, EngineError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedAppointment {
    pub appointment: Appointment,
    pub position: GridPosition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceColumn {
    pub resource: Resource,
    pub items: Vec<PlacedAppointment>,
}

/// Everything a renderer needs to draw one day: hour rows, sub-hour lines
/// and one column per resource with positioned items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayLayout {
    pub date: NaiveDate,
    pub hours: Vec<HourMark>,
    pub slot_lines: Vec<f64>,
    pub columns: Vec<ResourceColumn>,
}

impl Engine {
    pub fn resources(&self) -> Vec<Resource> {
        self.store.resources()
    }

    /// Appointments whose start falls on `date`, roster order then chronological.
    pub fn appointments_for_date(&self, date: NaiveDate) -> Vec<Appointment> {
        self.store.appointments_on(date)
    }

    pub fn appointment(&self, id: &str) -> Option<Appointment> {
        self.store.get_appointment(id)
    }

    pub fn available_slots(&self, date: NaiveDate, duration: Option<u32>) -> Vec<FreeSlot> {
        let resources = self.resources();
        let appointments = self.appointments_for_date(date);
        let window = &self.config.window;
        let slots = find_available_slots(&resources, &appointments, date, duration, window);
        metrics::histogram!(crate::observability::SLOTS_RETURNED).record(slots.len() as f64);
        slots
    }

    pub fn idle_spans(
        &self,
        resource_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<TimeInterval>, EngineError> {
        let appointments = self
            .store
            .appointments_of(resource_id, date)
            .ok_or_else(|| EngineError::NotFound(resource_id.to_string()))?;
        Ok(idle_spans(&self.config.window, date, &appointments))
    }

    /// Grid positions for every appointment on `date`. Bookings get the
    /// configured minimum visible height; blackouts keep their true height.
    pub fn day_layout(&self, date: NaiveDate) -> DayLayout {
        let window = &self.config.window;
        let hour_height = self.config.hour_height;
        let columns = self
            .resources()
            .into_iter()
            .map(|resource| {
                let items = self
                    .store
                    .appointments_of(&resource.id, date)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|appointment| {
                        let mut position =
                            geometry::position_of(&appointment.interval, window, hour_height);
                        if !appointment.is_blackout() {
                            position = position.with_min_height(self.config.min_item_height);
                        }
                        PlacedAppointment {
                            appointment,
                            position,
                        }
                    })
                    .collect();
                ResourceColumn { resource, items }
            })
            .collect();

        DayLayout {
            date,
            hours: geometry::hour_marks(window, hour_height),
            slot_lines: geometry::slot_lines(window, hour_height),
            columns,
        }
    }

    /// Offset of the current-time line, if enabled and inside the window.
    pub fn now_line(&self, now: NaiveDateTime) -> Option<f64> {
        if !self.config.show_current_time {
            return None;
        }
        geometry::now_indicator(now, &self.config.window, self.config.hour_height)
    }
}
