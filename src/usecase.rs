//! Entry points the view models talk to. They only forward to the
//! repository, so view models never need to know how it is built.

use std::sync::Arc;

use crate::error::Result;
use crate::repository::{RocketListStream, RocketRepository, RocketStream};

#[derive(Clone)]
pub struct GetRocketsUseCase {
    repository: Arc<RocketRepository>,
}

impl GetRocketsUseCase {
    pub fn new(repository: Arc<RocketRepository>) -> Self {
        Self { repository }
    }

    pub fn observe_rockets(&self) -> RocketListStream {
        self.repository.observe_rockets()
    }

    pub async fn refresh(&self) -> Result<()> {
        self.repository.refresh().await
    }
}

#[derive(Clone)]
pub struct GetRocketDetailUseCase {
    repository: Arc<RocketRepository>,
}

impl GetRocketDetailUseCase {
    pub fn new(repository: Arc<RocketRepository>) -> Self {
        Self { repository }
    }

    pub fn observe_rocket_detail(&self, id: &str) -> RocketStream {
        self.repository.observe_rocket(id)
    }
}
