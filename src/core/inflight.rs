use crate::utils::error::{Result, SmartFitError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Single-flight guard for one user action.
#[derive(Debug, Clone)]
pub struct InFlightGuard {
    action: &'static str,
    busy: Arc<AtomicBool>,
}

/// Held while the action runs; releases the guard on drop.
#[derive(Debug)]
pub struct InFlightTicket {
    busy: Arc<AtomicBool>,
}

impl InFlightGuard {
    pub fn new(action: &'static str) -> Self {
        Self {
            action,
            busy: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn try_begin(&self) -> Result<InFlightTicket> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Rejected duplicate {} while one is in flight", self.action);
            return Err(SmartFitError::ActionInFlight {
                action: self.action.to_string(),
            });
        }

        Ok(InFlightTicket {
            busy: Arc::clone(&self.busy),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for InFlightTicket {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
