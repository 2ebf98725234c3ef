//! In-memory task store.
//!
//! Holds the table in process memory; everything is lost on exit. The
//! revision is a write counter.

use parking_lot::Mutex;

use officeflow_model::task::Task;

use super::{Revision, Snapshot, StoreError, TaskStore};

/// Non-persistent [`TaskStore`].
#[derive(Default)]
pub struct InMemoryTaskStore {
    state: Mutex<(Vec<Task>, u64)>,
}

impl InMemoryTaskStore {
    /// Creates an empty store at [`Revision::EMPTY`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `tasks`, as if saved once.
    #[must_use]
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            state: Mutex::new((tasks, 1)),
        }
    }
}

impl TaskStore for InMemoryTaskStore {
    fn load(&self) -> Result<Snapshot, StoreError> {
        let state = self.state.lock();
        Ok(Snapshot {
            tasks: state.0.clone(),
            revision: Revision::from_raw(state.1),
        })
    }

    fn save(&self, tasks: &[Task]) -> Result<Revision, StoreError> {
        let mut state = self.state.lock();
        state.0 = tasks.to_vec();
        state.1 += 1;
        Ok(Revision::from_raw(state.1))
    }

    fn save_if(&self, expected: Revision, tasks: &[Task]) -> Result<Revision, StoreError> {
        let mut state = self.state.lock();
        let found = Revision::from_raw(state.1);
        if found != expected {
            return Err(StoreError::Conflict { expected, found });
        }
        state.0 = tasks.to_vec();
        state.1 += 1;
        Ok(Revision::from_raw(state.1))
    }
}
