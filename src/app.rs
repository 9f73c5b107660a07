use std::sync::Arc;

use tracing::info;

use crate::client::{CatalogSource, SpaceXClient};
use crate::config::AppConfig;
use crate::error::Result;
use crate::repository::RocketRepository;
use crate::state::{LoginValidator, RocketDetailViewModel, RocketListViewModel};
use crate::store::RocketStore;
use crate::usecase::{GetRocketDetailUseCase, GetRocketsUseCase};

/// Owns the shared pieces (HTTP client, store, repository) and hands out
/// use cases and view models built on them.
///
/// ```no_run
/// use rocket_catalog::{AppConfig, AppContainer};
///
/// # async fn run() -> rocket_catalog::Result<()> {
/// let app = AppContainer::from_config(&AppConfig::default())?;
/// let list = app.rocket_list_view_model();
/// let mut state = list.state();
/// state.changed().await.ok();
/// println!("{} rockets cached", state.borrow().rockets.len());
/// # Ok(())
/// # }
/// ```
pub struct AppContainer {
    repository: Arc<RocketRepository>,
    login: LoginValidator,
}

impl AppContainer {
    /// Build the real HTTP client and open the SQLite file named in `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = SpaceXClient::new(&config.api_base_url, config.request_timeout())?;
        let store = RocketStore::open(&config.database_path)?;
        info!(
            api = %config.api_base_url,
            db = %config.database_path.display(),
            "rocket catalog ready"
        );
        Ok(Self::new(Arc::new(client), store, LoginValidator::new(&config.login)))
    }

    pub fn new(api: Arc<dyn CatalogSource>, store: RocketStore, login: LoginValidator) -> Self {
        Self {
            repository: Arc::new(RocketRepository::new(api, store)),
            login,
        }
    }

    pub fn repository(&self) -> Arc<RocketRepository> {
        Arc::clone(&self.repository)
    }

    pub fn get_rockets_use_case(&self) -> GetRocketsUseCase {
        GetRocketsUseCase::new(self.repository())
    }

    pub fn get_rocket_detail_use_case(&self) -> GetRocketDetailUseCase {
        GetRocketDetailUseCase::new(self.repository())
    }

    /// Must be called inside a tokio runtime.
    pub fn rocket_list_view_model(&self) -> RocketListViewModel {
        RocketListViewModel::new(self.get_rockets_use_case())
    }

    /// Must be called inside a tokio runtime.
    pub fn rocket_detail_view_model(&self, rocket_id: &str) -> RocketDetailViewModel {
        RocketDetailViewModel::new(rocket_id, self.get_rocket_detail_use_case())
    }

    pub fn login_validator(&self) -> &LoginValidator {
        &self.login
    }
}
