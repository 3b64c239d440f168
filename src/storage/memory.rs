use crate::error::{MiguelbotError, Result};
use crate::storage::RecordBackend;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-process record storage
///
/// Clones share the same map, which lets two stores observe each other's
/// writes the way two launches observe the same database file.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    records: Arc<Mutex<HashMap<String, (String, DateTime<Utc>)>>>,
}

impl MemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, (String, DateTime<Utc>)>>> {
        self.records
            .lock()
            .map_err(|_| MiguelbotError::Storage("Memory store lock poisoned".to_string()).into())
    }
}

impl RecordBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).map(|(value, _)| value.clone()))
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?
            .insert(key.to_string(), (value.to_string(), Utc::now()));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn updated_at(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(self.lock()?.get(key).map(|(_, at)| *at))
    }
}
