//! Live-bot registry.
//!
//! The only engine state mutated by more than one caller: the
//! scheduler tick, explicit start/stop, and each loop's self-removal
//! on termination. All access goes through one mutex so membership
//! checks are atomic with respect to insert and remove.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::application::runtime::BotRuntime;

/// Thread-safe map from bot id to its live runtime handle.
#[derive(Default)]
pub struct RuntimeRegistry {
    inner: Mutex<HashMap<Uuid, Arc<BotRuntime>>>,
}

impl RuntimeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a runtime unless the bot is already running. Returns
    /// false (and drops the candidate) when an entry already exists —
    /// this is the sole de-duplication point between the tick and
    /// explicit starts.
    pub fn insert_if_absent(&self, runtime: Arc<BotRuntime>) -> bool {
        let mut map = self.inner.lock().expect("registry lock poisoned");
        if map.contains_key(&runtime.bot_id) {
            return false;
        }
        map.insert(runtime.bot_id, runtime);
        true
    }

    /// Remove and return the runtime for a bot. Idempotent.
    pub fn remove(&self, bot_id: Uuid) -> Option<Arc<BotRuntime>> {
        self.inner
            .lock()
            .expect("registry lock poisoned")
            .remove(&bot_id)
    }

    pub fn get(&self, bot_id: Uuid) -> Option<Arc<BotRuntime>> {
        self.inner
            .lock()
            .expect("registry lock poisoned")
            .get(&bot_id)
            .cloned()
    }

    pub fn contains(&self, bot_id: Uuid) -> bool {
        self.inner
            .lock()
            .expect("registry lock poisoned")
            .contains_key(&bot_id)
    }

    /// Snapshot of currently-registered bot ids.
    pub fn ids(&self) -> Vec<Uuid> {
        self.inner
            .lock()
            .expect("registry lock poisoned")
            .keys()
            .copied()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("registry lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
