//! Application state shared across handlers

use std::sync::Arc;

use crate::{
    config::Config,
    repository::{ContactRepository, InMemoryContactStore},
};

/// Shared state handed to every route
///
/// Cloning is cheap: both fields are reference counted.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    contacts: Arc<dyn ContactRepository>,
}

impl AppState {
    pub fn new(config: Config, contacts: Arc<dyn ContactRepository>) -> Self {
        Self {
            config: Arc::new(config),
            contacts,
        }
    }

    /// State backed by a fresh [`InMemoryContactStore`]
    pub fn in_memory(config: Config) -> Self {
        Self::new(config, Arc::new(InMemoryContactStore::new()))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn contacts(&self) -> &dyn ContactRepository {
        self.contacts.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service", &self.config.service.name)
            .finish_non_exhaustive()
    }
}
