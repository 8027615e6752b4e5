//! Disruption guard
//!
//! One atomic in-flight flag per (service, action) pair, created at
//! startup for every registered service and every known action, never
//! removed. Acquisition is a compare-and-set; keys are independent, so
//! a kill on one service never blocks a restart on another — or, by
//! design, a different action on the same service.

use crate::error::{EngineError, EngineResult};
use shared::{Action, ActionStatus};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

fn slot(action: Action) -> usize {
    match action {
        Action::Start => 0,
        Action::Restart => 1,
        Action::Stop => 2,
        Action::Terminate => 3,
        Action::Kill => 4,
        Action::RollingRestart => 5,
    }
}

#[derive(Debug)]
pub struct DisruptionGuard {
    flags: HashMap<String, [AtomicBool; 6]>,
}

impl DisruptionGuard {
    /// Build the flag table for every (service, action) pair
    pub fn new<'a>(services: impl IntoIterator<Item = &'a str>) -> Self {
        let flags = services
            .into_iter()
            .map(|service| (service.to_string(), Default::default()))
            .collect();
        Self { flags }
    }

    fn slots(&self, service: &str) -> EngineResult<&[AtomicBool; 6]> {
        self.flags
            .get(service)
            .ok_or_else(|| EngineError::not_found(format!("service {}", service)))
    }

    /// Atomically flip (service, action) from idle to running
    ///
    /// Fails with Conflict, without blocking, when another invocation of
    /// the same pair is already in flight.
    pub fn try_acquire(&self, service: &str, action: Action) -> EngineResult<()> {
        let flag = &self.slots(service)?[slot(action)];
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| EngineError::Conflict {
                service: service.to_string(),
                action,
            })?;
        Ok(())
    }

    /// Unconditionally reset (service, action) to idle
    pub fn release(&self, service: &str, action: Action) {
        if let Ok(slots) = self.slots(service) {
            slots[slot(action)].store(false, Ordering::Release);
        }
    }

    pub fn is_running(&self, service: &str, action: Action) -> bool {
        self.slots(service)
            .map(|slots| slots[slot(action)].load(Ordering::Acquire))
            .unwrap_or(false)
    }

    /// Read-only snapshot of one flag
    pub fn status(&self, service: &str, action: Action) -> EngineResult<ActionStatus> {
        let running = self.slots(service)?[slot(action)].load(Ordering::Acquire);
        Ok(ActionStatus {
            service: service.to_string(),
            action,
            running,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard() -> DisruptionGuard {
        DisruptionGuard::new(["svc-a", "svc-b"])
    }

    #[test]
    fn acquire_is_exclusive_per_pair() {
        let guard = guard();

        guard.try_acquire("svc-a", Action::Kill).unwrap();
        let err = guard.try_acquire("svc-a", Action::Kill).unwrap_err();
        assert!(matches!(err, EngineError::Conflict { .. }));

        guard.release("svc-a", Action::Kill);
        guard.try_acquire("svc-a", Action::Kill).unwrap();
    }

    #[test]
    fn pairs_are_independent() {
        let guard = guard();
        guard.try_acquire("svc-a", Action::Kill).unwrap();

        // other action on the same service, same action on another service
        guard.try_acquire("svc-a", Action::Restart).unwrap();
        guard.try_acquire("svc-b", Action::Kill).unwrap();
    }

    #[test]
    fn status_reflects_the_flag() {
        let guard = guard();
        assert!(!guard.status("svc-a", Action::Stop).unwrap().running);

        guard.try_acquire("svc-a", Action::Stop).unwrap();
        let status = guard.status("svc-a", Action::Stop).unwrap();
        assert!(status.running);
        assert_eq!(status.service, "svc-a");
        assert_eq!(status.action, Action::Stop);

        guard.release("svc-a", Action::Stop);
        assert!(!guard.status("svc-a", Action::Stop).unwrap().running);
    }

    #[test]
    fn unknown_service_is_not_found() {
        let guard = guard();
        assert!(matches!(
            guard.try_acquire("ghost", Action::Stop),
            Err(EngineError::NotFound { .. })
        ));
        assert!(guard.status("ghost", Action::Stop).is_err());
    }

    #[test]
    fn release_is_idempotent() {
        let guard = guard();
        guard.release("svc-a", Action::Stop);
        guard.try_acquire("svc-a", Action::Stop).unwrap();
        guard.release("svc-a", Action::Stop);
        guard.release("svc-a", Action::Stop);
        guard.try_acquire("svc-a", Action::Stop).unwrap();
    }
}
