use std::sync::Arc;

use crate::{
    config::AppConfig,
    providers::{ai::AiProvider, catalog::PartCatalog},
    store::EntityStore,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<EntityStore>,
    pub config: Arc<AppConfig>,
    pub ai: Arc<dyn AiProvider>,
    pub catalog: Arc<dyn PartCatalog>,
}

impl AppState {
    pub fn new(
        store: Arc<EntityStore>,
        config: AppConfig,
        ai: Arc<dyn AiProvider>,
        catalog: Arc<dyn PartCatalog>,
    ) -> Self {
        Self {
            store,
            config: Arc::new(config),
            ai,
            catalog,
        }
    }
}
