use std::collections::BTreeMap;

use contracts::{Activity, ActivityId, ActivityType, ValidationError};
use serde::Deserialize;

use crate::error::EngineError;

/// Immutable activity snapshot, indexed by id and type.
#[derive(Debug, Clone, Default)]
pub struct ActivityCatalog {
    activities: Vec<Activity>,
    by_id: BTreeMap<ActivityId, usize>,
    by_type: BTreeMap<ActivityType, Vec<usize>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Wrapped { activities: Vec<Activity> },
    Bare(Vec<Activity>),
}

impl ActivityCatalog {
    /// Builds a snapshot, rejecting impossible entries and duplicate ids.
    pub fn from_activities(activities: Vec<Activity>) -> Result<Self, ValidationError> {
        let mut catalog = Self::default();
        for activity in activities {
            activity.validate()?;
            if catalog.by_id.contains_key(&activity.id) {
                return Err(ValidationError::DuplicateActivity(activity.id));
            }
            let idx = catalog.activities.len();
            catalog.by_id.insert(activity.id, idx);
            catalog
                .by_type
                .entry(activity.activity_type)
                .or_default()
                .push(idx);
            catalog.activities.push(activity);
        }
        Ok(catalog)
    }

    /// Parses either a bare JSON array or an object with an `activities` array.
    pub fn from_json(raw: &str) -> Result<Self, EngineError> {
        let activities = match serde_json::from_str::<CatalogFile>(raw)? {
            CatalogFile::Wrapped { activities } | CatalogFile::Bare(activities) => activities,
        };
        Ok(Self::from_activities(activities)?)
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn get(&self, id: ActivityId) -> Option<&Activity> {
        self.by_id.get(&id).map(|&idx| &self.activities[idx])
    }

    pub fn of_type(&self, activity_type: ActivityType) -> impl Iterator<Item = &Activity> + '_ {
        self.by_type
            .get(&activity_type)
            .into_iter()
            .flatten()
            .map(|&idx| &self.activities[idx])
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }
}
