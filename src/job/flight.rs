//! Single-flight guard keyed by object name

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Names of objects with a run in progress
#[derive(Debug, Clone, Default)]
pub(crate) struct InFlight {
    names: Arc<Mutex<HashSet<String>>>,
}

impl InFlight {
    /// Claim `name`, or `None` if it is already claimed
    pub(crate) fn acquire(&self, name: &str) -> Option<FlightGuard> {
        let mut names = self.names.lock().unwrap_or_else(PoisonError::into_inner);
        if !names.insert(name.to_string()) {
            return None;
        }
        Some(FlightGuard {
            names: Arc::clone(&self.names),
            name: name.to_string(),
        })
    }

    /// Number of claimed names
    pub(crate) fn len(&self) -> usize {
        self.names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Releases the claim on drop
#[derive(Debug)]
pub(crate) struct FlightGuard {
    names: Arc<Mutex<HashSet<String>>>,
    name: String,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.name);
    }
}
