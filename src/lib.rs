//! Rocket catalog client core.
//!
//! Fetches the [SpaceX rocket catalog](https://api.spacexdata.com/v4/rockets),
//! caches it in a local SQLite file and exposes the cache as observable view
//! state for a rocket list screen, a rocket detail screen and a login form.
//!
//! # Quick Start
//!
//! ```no_run
//! use rocket_catalog::{AppConfig, AppContainer, RocketDetailUiState};
//!
//! # async fn run() -> rocket_catalog::Result<()> {
//! let app = AppContainer::from_config(&AppConfig::default())?;
//!
//! // Pull the remote catalog into the local cache.
//! app.repository().refresh().await?;
//!
//! // Follow one rocket from the cache.
//! let detail = app.rocket_detail_view_model("5e9d0d95eda69973a809d1ec");
//! let mut state = detail.state();
//! let state = state.wait_for(|s| *s != RocketDetailUiState::Loading).await;
//! println!("{:?}", state.as_deref());
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod repository;
pub mod state;
pub mod store;
pub mod usecase;

// Re-export the main public types at the crate root for convenience.
pub use app::AppContainer;
pub use client::{CatalogSource, SpaceXClient, DEFAULT_BASE_URL};
pub use config::{AppConfig, LogLevel, LoggingConfig, LoginConfig};
pub use error::{ConfigError, Error, NetworkError, Result, StoreError};
pub use logging::init_logging;
pub use models::{CatalogRecord, Dimension, Mass, Rocket, RocketEntity, PLACEHOLDER_IMAGE_URL};
pub use repository::{RocketListStream, RocketRepository, RocketStream};
pub use state::{
    filter_rockets, LoginError, LoginFieldErrors, LoginRejection, LoginValidator,
    RocketDetailUiState, RocketDetailViewModel, RocketListUiState, RocketListViewModel,
};
pub use store::RocketStore;
pub use usecase::{GetRocketDetailUseCase, GetRocketsUseCase};
