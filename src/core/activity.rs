use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A registry round-trip a component can have in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateSchema,
    FetchSchema,
    CreateAttestation,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::CreateSchema => "create schema",
            Operation::FetchSchema => "fetch schema",
            Operation::CreateAttestation => "create attestation",
        })
    }
}

/// The message line shown under a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Failed(Operation),
    AttestationCreated,
}

impl Status {
    pub fn message(&self) -> &'static str {
        match self {
            Status::Failed(Operation::CreateSchema) => "failed to create schema",
            Status::Failed(Operation::FetchSchema) => "failed to fetch schema",
            Status::Failed(Operation::CreateAttestation) => "failed to create attestation",
            Status::AttestationCreated => "attestation created successfully",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Busy flag and status line of one component. At most one registry call
/// per component is outstanding while `busy` is set.
#[derive(Debug, Default)]
pub struct Activity {
    busy: bool,
    status: Option<Status>,
}

impl Activity {
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn status(&self) -> Option<Status> {
        self.status
    }

    /// Enters the busy state and clears the previous status, unless a call
    /// is already in flight.
    pub fn try_begin(cell: &Mutex<Activity>) -> Option<BusyGuard<'_>> {
        let mut activity = lock(cell);
        if activity.busy {
            return None;
        }
        activity.busy = true;
        activity.status = None;
        Some(BusyGuard { cell })
    }
}

/// Held for the duration of a registry call. Dropping it, including by
/// dropping the future that owns it, clears the busy flag.
#[derive(Debug)]
pub struct BusyGuard<'a> {
    cell: &'a Mutex<Activity>,
}

impl BusyGuard<'_> {
    pub fn finish(self, status: Option<Status>) {
        lock(self.cell).status = status;
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        lock(self.cell).busy = false;
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_is_refused_while_busy() {
        let cell = Mutex::new(Activity::default());
        let guard = Activity::try_begin(&cell).unwrap();
        assert!(Activity::try_begin(&cell).is_none());
        drop(guard);
        assert!(!lock(&cell).is_busy());
        assert!(Activity::try_begin(&cell).is_some());
    }

    #[test]
    fn begin_clears_previous_status() {
        let cell = Mutex::new(Activity::default());
        Activity::try_begin(&cell)
            .unwrap()
            .finish(Some(Status::Failed(Operation::FetchSchema)));
        assert_eq!(lock(&cell).status(), Some(Status::Failed(Operation::FetchSchema)));

        let _guard = Activity::try_begin(&cell).unwrap();
        assert_eq!(lock(&cell).status(), None);
        assert!(lock(&cell).is_busy());
    }

    #[test]
    fn failure_messages_are_fixed_per_operation() {
        assert_eq!(Status::Failed(Operation::CreateSchema).message(), "failed to create schema");
        assert_eq!(Status::Failed(Operation::FetchSchema).message(), "failed to fetch schema");
        assert_eq!(
            Status::Failed(Operation::CreateAttestation).to_string(),
            "failed to create attestation"
        );
        assert_eq!(Status::AttestationCreated.message(), "attestation created successfully");
    }
}
