use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::watch;
use tracing::warn;

use super::TaskScope;
use crate::models::Rocket;
use crate::usecase::GetRocketDetailUseCase;

pub const NOT_FOUND_MESSAGE: &str = "Rocket not found";

/// State of the rocket detail screen.
#[derive(Debug, Clone, PartialEq)]
pub enum RocketDetailUiState {
    Loading,
    Success(Rocket),
    Error(String),
}

/// View model of the rocket detail screen. Follows one rocket in the local
/// cache until dropped; a missing id becomes [`RocketDetailUiState::Error`].
pub struct RocketDetailViewModel {
    rocket_id: String,
    state: Arc<watch::Sender<RocketDetailUiState>>,
    _scope: TaskScope,
}

impl RocketDetailViewModel {
    pub fn new(rocket_id: impl Into<String>, use_case: GetRocketDetailUseCase) -> Self {
        let rocket_id = rocket_id.into();
        let (state, _) = watch::channel(RocketDetailUiState::Loading);
        let state = Arc::new(state);
        let scope = TaskScope::default();

        let mut rocket = use_case.observe_rocket_detail(&rocket_id);
        let tx = Arc::clone(&state);
        let id = rocket_id.clone();
        scope.spawn(async move {
            while let Some(item) = rocket.next().await {
                let next = match item {
                    Ok(Some(rocket)) => RocketDetailUiState::Success(rocket),
                    Ok(None) => RocketDetailUiState::Error(NOT_FOUND_MESSAGE.to_string()),
                    Err(e) => {
                        warn!(rocket_id = %id, error = %e, "reading cached rocket failed");
                        RocketDetailUiState::Error(e.to_string())
                    }
                };
                tx.send_replace(next);
            }
        });

        Self {
            rocket_id,
            state,
            _scope: scope,
        }
    }

    pub fn rocket_id(&self) -> &str {
        &self.rocket_id
    }

    pub fn state(&self) -> watch::Receiver<RocketDetailUiState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> RocketDetailUiState {
        self.state.borrow().clone()
    }
}
