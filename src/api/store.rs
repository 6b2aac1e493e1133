use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::core::{Asset, ForecastSettings, IncomeStream, Milestone};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioRecord {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub assets: Vec<Asset>,
    pub income_streams: Vec<IncomeStream>,
    pub milestones: Vec<Milestone>,
    pub settings: Option<ForecastSettings>,
    pub created_at: DateTime<Utc>,
}

// Stand-in for the persistence collaborator: scenarios live for the lifetime
// of the process and are shared across handlers.
#[derive(Clone, Default)]
pub struct ScenarioStore {
    inner: Arc<RwLock<HashMap<Uuid, ScenarioRecord>>>,
}

impl ScenarioStore {
    pub fn insert(&self, record: ScenarioRecord) {
        self.inner
            .write()
            .expect("scenario store lock poisoned")
            .insert(record.id, record);
    }

    pub fn get(&self, id: Uuid) -> Option<ScenarioRecord> {
        self.inner
            .read()
            .expect("scenario store lock poisoned")
            .get(&id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .expect("scenario store lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(id: Uuid) -> ScenarioRecord {
        ScenarioRecord {
            id,
            name: "Baseline plan".to_string(),
            description: None,
            location: Some("Seattle, WA".to_string()),
            assets: vec![],
            income_streams: vec![],
            milestones: vec![],
            settings: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn insert_then_get_returns_the_record() {
        let store = ScenarioStore::default();
        let id = Uuid::new_v4();
        store.insert(sample_record(id));

        let fetched = store.get(id).expect("record should exist");
        assert_eq!(fetched.id, id);
        assert_eq!(fetched.name, "Baseline plan");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn get_of_unknown_id_returns_none() {
        let store = ScenarioStore::default();
        assert!(store.get(Uuid::new_v4()).is_none());
        assert!(store.is_empty());
    }
}
