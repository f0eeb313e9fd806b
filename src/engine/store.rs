use chrono::NaiveDate;
use dashmap::DashMap;
use dashmap::mapref::one::RefMut;

use crate::model::*;

use super::EngineError;

/// Resource roster plus each resource's appointments.
///
/// One `DashMap` entry per resource: holding its `RefMut` is the admission
/// lock for that resource's timeline.
pub struct InMemoryStore {
    /// Resource ids in display order. Fixed once loaded.
    roster: Vec<String>,
    schedules: DashMap<String, ResourceSchedule>,
    /// Reverse lookup: appointment id → resource id
    entity_to_resource: DashMap<String, String>,
}

impl InMemoryStore {
    pub fn with_roster(resources: Vec<Resource>) -> Result<Self, EngineError> {
        let schedules = DashMap::new();
        let mut roster = Vec::with_capacity(resources.len());
        for resource in resources {
            if schedules.contains_key(&resource.id) {
                return Err(EngineError::AlreadyExists(resource.id));
            }
            roster.push(resource.id.clone());
            schedules.insert(resource.id.clone(), ResourceSchedule::new(resource));
        }
        Ok(Self {
            roster,
            schedules,
            entity_to_resource: DashMap::new(),
        })
    }

    // ── Roster ───────────────────────────────────────────────

    pub fn contains_resource(&self, id: &str) -> bool {
        self.schedules.contains_key(id)
    }

    pub fn resources(&self) -> Vec<Resource> {
        self.roster
            .iter()
            .filter_map(|id| self.schedules.get(id).map(|s| s.resource.clone()))
            .collect()
    }

    // ── Schedules ────────────────────────────────────────────

    /// Write access to one resource's timeline. Blocks other writers and
    /// readers of the same shard until dropped.
    pub fn schedule_mut(&self, resource_id: &str) -> Option<RefMut<'_, String, ResourceSchedule>> {
        self.schedules.get_mut(resource_id)
    }

    /// Snapshot of one resource's appointments on `date`, chronological.
    pub fn appointments_of(&self, resource_id: &str, date: NaiveDate) -> Option<Vec<Appointment>> {
        self.schedules
            .get(resource_id)
            .map(|s| s.on_date(date).cloned().collect())
    }

    /// Snapshot of every appointment on `date`: roster order, then chronological.
    pub fn appointments_on(&self, date: NaiveDate) -> Vec<Appointment> {
        let mut out = Vec::new();
        for id in &self.roster {
            if let Some(schedule) = self.schedules.get(id) {
                out.extend(schedule.on_date(date).cloned());
            }
        }
        out
    }

    pub fn appointment_count(&self) -> usize {
        self.entity_to_resource.len()
    }

    // ── Entity index ─────────────────────────────────────────

    pub fn get_resource_for_entity(&self, entity_id: &str) -> Option<String> {
        self.entity_to_resource.get(entity_id).map(|e| e.value().clone())
    }

    pub fn contains_entity(&self, entity_id: &str) -> bool {
        self.entity_to_resource.contains_key(entity_id)
    }

    pub fn map_entity(&self, entity_id: String, resource_id: String) {
        self.entity_to_resource.insert(entity_id, resource_id);
    }

    pub fn get_appointment(&self, entity_id: &str) -> Option<Appointment> {
        let resource_id = self.get_resource_for_entity(entity_id)?;
        let schedule = self.schedules.get(&resource_id)?;
        schedule
            .appointments
            .iter()
            .find(|a| a.id == entity_id)
            .cloned()
    }
}
