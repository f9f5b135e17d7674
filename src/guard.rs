//! Per-repository-name mutual exclusion for provisioning runs.
//!
//! At most one saga may be in flight for a given repository name within
//! the process. A second caller is rejected immediately rather than
//! queued; the busy condition is surfaced, not retried.

use crate::error::GuardError;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Tracks repository names with an in-flight saga.
#[derive(Debug, Default)]
pub struct ProvisioningGuard {
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl ProvisioningGuard {
    /// Create an empty guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to claim `name` for a new saga run.
    ///
    /// The returned permit releases the name when dropped, so release
    /// happens exactly once on any terminal path.
    pub fn acquire(&self, name: &str) -> Result<ProvisioningPermit, GuardError> {
        let mut in_flight = self.in_flight.lock().expect("guard lock poisoned");

        if !in_flight.insert(name.to_string()) {
            return Err(GuardError::AlreadyInProgress(name.to_string()));
        }

        Ok(ProvisioningPermit {
            name: name.to_string(),
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    /// Check whether a saga is in flight for `name`.
    pub fn is_in_flight(&self, name: &str) -> bool {
        self.in_flight
            .lock()
            .expect("guard lock poisoned")
            .contains(name)
    }
}

/// Exclusive claim on a repository name for the duration of one saga run.
#[derive(Debug)]
pub struct ProvisioningPermit {
    name: String,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl ProvisioningPermit {
    /// The claimed repository name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for ProvisioningPermit {
    fn drop(&mut self) {
        if let Ok(mut in_flight) = self.in_flight.lock() {
            in_flight.remove(&self.name);
        }
    }
}
