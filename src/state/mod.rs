//! Per-screen view state.
//!
//! Each view model owns a `watch` channel holding its current state and the
//! tasks that feed it. Dropping the view model aborts those tasks.

pub mod detail;
pub mod list;
pub mod login;

pub use detail::{RocketDetailUiState, RocketDetailViewModel, NOT_FOUND_MESSAGE};
pub use list::{filter_rockets, RocketListUiState, RocketListViewModel};
pub use login::{LoginError, LoginFieldErrors, LoginRejection, LoginValidator};

use std::future::Future;
use std::sync::Mutex;

use tokio::task::JoinSet;

/// Tasks tied to the lifetime of a view model.
#[derive(Default)]
pub(crate) struct TaskScope {
    tasks: Mutex<JoinSet<()>>,
}

impl TaskScope {
    pub(crate) fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self
            .tasks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // Reap finished tasks so repeated refreshes don't pile up.
        while tasks.try_join_next().is_some() {}
        tasks.spawn(future);
    }
}
