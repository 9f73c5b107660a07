use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::{oneshot, watch};
use tracing::warn;

use super::TaskScope;
use crate::models::Rocket;
use crate::usecase::GetRocketsUseCase;

/// State of the rocket list screen.
#[derive(Debug, Clone, PartialEq)]
pub struct RocketListUiState {
    /// A refresh is in flight or nothing has been loaded yet.
    pub is_loading: bool,
    /// Message of the last failure, cleared by the next success.
    pub error: Option<String>,
    /// Search text typed by the user.
    pub query: String,
    /// Every cached rocket, ordered by name. Unfiltered.
    pub rockets: Vec<Rocket>,
}

impl Default for RocketListUiState {
    fn default() -> Self {
        Self {
            is_loading: true,
            error: None,
            query: String::new(),
            rockets: Vec::new(),
        }
    }
}

impl RocketListUiState {
    /// Rockets matching the current query.
    pub fn visible_rockets(&self) -> Vec<&Rocket> {
        filter_rockets(&self.rockets, &self.query)
    }
}

/// Rockets whose name or description contains `query`, ignoring case.
pub fn filter_rockets<'a>(rockets: &'a [Rocket], query: &str) -> Vec<&'a Rocket> {
    rockets.iter().filter(|r| r.matches(query)).collect()
}

/// View model of the rocket list screen.
///
/// Must be created inside a tokio runtime. Creation follows the cached list
/// until the view model is dropped, and refreshes once the first cached
/// snapshot is in the state.
pub struct RocketListViewModel {
    get_rockets: GetRocketsUseCase,
    state: Arc<watch::Sender<RocketListUiState>>,
    scope: TaskScope,
}

impl RocketListViewModel {
    pub fn new(get_rockets: GetRocketsUseCase) -> Self {
        let (state, _) = watch::channel(RocketListUiState::default());
        let vm = Self {
            get_rockets,
            state: Arc::new(state),
            scope: TaskScope::default(),
        };

        // Every snapshot clears `error`, so the creation refresh waits for the
        // first one to land before it can report a failure.
        let (first_applied, first_snapshot) = oneshot::channel();
        let mut updates = vm.get_rockets.observe_rockets();
        let state = Arc::clone(&vm.state);
        vm.scope.spawn(async move {
            let mut first_applied = Some(first_applied);
            while let Some(snapshot) = updates.next().await {
                match snapshot {
                    Ok(rockets) => state.send_modify(|s| {
                        s.rockets = rockets;
                        s.is_loading = false;
                        s.error = None;
                    }),
                    Err(e) => {
                        warn!(error = %e, "reading cached rockets failed");
                        state.send_modify(|s| {
                            s.is_loading = false;
                            s.error = Some(e.to_string());
                        });
                    }
                }
                if let Some(tx) = first_applied.take() {
                    let _ = tx.send(());
                }
            }
        });

        let get_rockets = vm.get_rockets.clone();
        let state = Arc::clone(&vm.state);
        vm.scope.spawn(async move {
            let _ = first_snapshot.await;
            mark_loading(&state);
            run_refresh(&get_rockets, &state).await;
        });

        vm
    }

    pub fn state(&self) -> watch::Receiver<RocketListUiState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> RocketListUiState {
        self.state.borrow().clone()
    }

    pub fn on_query_change(&self, query: impl Into<String>) {
        let query = query.into();
        self.state.send_modify(|s| s.query = query);
    }

    /// Start a refresh in the background. The outcome lands in the state;
    /// rockets already on screen stay there when it fails.
    pub fn refresh(&self) {
        mark_loading(&self.state);

        let get_rockets = self.get_rockets.clone();
        let state = Arc::clone(&self.state);
        self.scope.spawn(async move {
            run_refresh(&get_rockets, &state).await;
        });
    }
}

fn mark_loading(state: &watch::Sender<RocketListUiState>) {
    state.send_modify(|s| {
        s.is_loading = true;
        s.error = None;
    });
}

async fn run_refresh(get_rockets: &GetRocketsUseCase, state: &watch::Sender<RocketListUiState>) {
    match get_rockets.refresh().await {
        Ok(()) => state.send_modify(|s| s.is_loading = false),
        Err(e) => {
            warn!(error = %e, "rocket refresh failed");
            state.send_modify(|s| {
                s.is_loading = false;
                s.error = Some(e.to_string());
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::CatalogSource;
    use crate::error::NetworkError;
    use crate::models::{CatalogRecord, RocketEntity};
    use crate::repository::tests::{record, FakeCatalog};
    use crate::repository::RocketRepository;
    use crate::store::RocketStore;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Holds every fetch until `release` is notified, then fails.
    struct GatedFailure {
        release: Notify,
    }

    #[async_trait]
    impl CatalogSource for GatedFailure {
        async fn fetch_all(&self) -> Result<Vec<CatalogRecord>, NetworkError> {
            self.release.notified().await;
            Err(NetworkError::Api {
                status: 500,
                message: "boom".into(),
            })
        }
    }

    fn rocket(name: &str, description: &str) -> Rocket {
        let mut rec = record(&name.to_lowercase(), name);
        rec.description = description.to_string();
        Rocket::from(RocketEntity::from(rec))
    }

    async fn wait_for(
        rx: &mut watch::Receiver<RocketListUiState>,
        f: impl FnMut(&RocketListUiState) -> bool,
    ) -> RocketListUiState {
        tokio::time::timeout(Duration::from_secs(5), rx.wait_for(f))
            .await
            .expect("state never matched")
            .expect("view model dropped")
            .clone()
    }

    #[test]
    fn test_query_filtering() {
        let rockets = vec![
            rocket("Falcon 9", "Two-stage rocket"),
            rocket("Starship", "Fully reusable super heavy-lift vehicle"),
        ];

        for query in ["fal", "FAL", "Fal"] {
            let names: Vec<_> = filter_rockets(&rockets, query)
                .into_iter()
                .map(|r| r.name.as_str())
                .collect();
            assert_eq!(names, ["Falcon 9"]);
        }
        assert_eq!(filter_rockets(&rockets, "").len(), 2);
        assert_eq!(filter_rockets(&rockets, "reusable")[0].name, "Starship");
        assert!(filter_rockets(&rockets, "saturn").is_empty());
    }

    #[test]
    fn test_initial_state_is_loading() {
        let state = RocketListUiState::default();
        assert!(state.is_loading);
        assert!(state.error.is_none());
        assert!(state.rockets.is_empty());
    }

    #[tokio::test]
    async fn test_creation_refreshes_and_follows_store() {
        let catalog = Arc::new(FakeCatalog::serving(vec![
            record("ss", "Starship"),
            record("f9", "Falcon 9"),
        ]));
        let repo = Arc::new(RocketRepository::new(
            catalog,
            RocketStore::open_in_memory().unwrap(),
        ));
        let vm = RocketListViewModel::new(GetRocketsUseCase::new(repo));
        let mut rx = vm.state();

        let state = wait_for(&mut rx, |s| s.rockets.len() == 2 && !s.is_loading).await;
        let names: Vec<_> = state.rockets.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Falcon 9", "Starship"]);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_query_change_only_touches_query() {
        let catalog = Arc::new(FakeCatalog::serving(vec![
            record("ss", "Starship"),
            record("f9", "Falcon 9"),
        ]));
        let repo = Arc::new(RocketRepository::new(
            catalog,
            RocketStore::open_in_memory().unwrap(),
        ));
        let vm = RocketListViewModel::new(GetRocketsUseCase::new(repo));
        let mut rx = vm.state();
        wait_for(&mut rx, |s| s.rockets.len() == 2).await;

        vm.on_query_change("falcon");
        let state = vm.current();
        assert_eq!(state.query, "falcon");
        assert_eq!(state.rockets.len(), 2);
        assert_eq!(state.visible_rockets().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_cached_rockets() {
        let store = RocketStore::open_in_memory().unwrap();
        store
            .upsert_all(vec![RocketEntity::from(record("f9", "Falcon 9"))])
            .await
            .unwrap();

        let catalog = Arc::new(GatedFailure {
            release: Notify::new(),
        });
        let repo = Arc::new(RocketRepository::new(catalog.clone(), store));
        let vm = RocketListViewModel::new(GetRocketsUseCase::new(repo));
        let mut rx = vm.state();

        // Cached snapshot arrives while the fetch is still held back.
        wait_for(&mut rx, |s| s.rockets.len() == 1).await;

        catalog.release.notify_one();
        let state = wait_for(&mut rx, |s| s.error.is_some()).await;
        assert!(!state.is_loading);
        assert!(state.error.unwrap().contains("boom"));
        assert_eq!(state.rockets.len(), 1);
        assert_eq!(state.rockets[0].name, "Falcon 9");
    }

    #[tokio::test]
    async fn test_offline_first_launch_shows_error() {
        for _ in 0..20 {
            let repo = Arc::new(RocketRepository::new(
                Arc::new(FakeCatalog::failing()),
                RocketStore::open_in_memory().unwrap(),
            ));
            let vm = RocketListViewModel::new(GetRocketsUseCase::new(repo));
            let mut rx = vm.state();

            let state = wait_for(&mut rx, |s| s.error.is_some()).await;
            assert!(!state.is_loading);
            assert!(state.rockets.is_empty());

            // Nothing else is written, so the error has to stick.
            tokio::time::sleep(Duration::from_millis(20)).await;
            let state = vm.current();
            assert!(!state.is_loading);
            assert!(state.error.unwrap().contains("catalog unavailable"));
        }
    }

    #[tokio::test]
    async fn test_manual_refresh_recovers_after_failure() {
        let catalog = Arc::new(FakeCatalog::failing());
        let repo = Arc::new(RocketRepository::new(
            catalog.clone(),
            RocketStore::open_in_memory().unwrap(),
        ));
        let vm = RocketListViewModel::new(GetRocketsUseCase::new(repo));
        let mut rx = vm.state();
        let state = wait_for(&mut rx, |s| s.error.is_some()).await;
        assert!(!state.is_loading);

        catalog.set(Some(vec![record("f9", "Falcon 9")]));
        vm.refresh();
        let state = wait_for(&mut rx, |s| s.rockets.len() == 1 && !s.is_loading).await;
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_drop_stops_updates() {
        let store = RocketStore::open_in_memory().unwrap();
        let repo = Arc::new(RocketRepository::new(
            Arc::new(FakeCatalog::failing()),
            store.clone(),
        ));
        let vm = RocketListViewModel::new(GetRocketsUseCase::new(repo));
        let mut rx = vm.state();
        wait_for(&mut rx, |s| s.error.is_some()).await;

        drop(vm);
        store
            .upsert_all(vec![RocketEntity::from(record("f9", "Falcon 9"))])
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.borrow().rockets.is_empty());
    }
}
