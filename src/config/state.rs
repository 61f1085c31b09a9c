// Application state module
// Read-only state shared by every connection

use std::path::Path;

use super::types::Config;
use crate::page::PageStore;
use crate::render::{Renderer, TemplateLoadError};

/// Application state, built once at startup and never mutated
pub struct AppState {
    pub config: Config,
    pub store: PageStore,
    pub renderer: Renderer,
}

impl AppState {
    /// Build the page store and load templates from `config`
    pub fn new(config: &Config) -> Result<Self, TemplateLoadError> {
        let renderer = Renderer::load(config.storage.templates_dir.as_deref().map(Path::new))?;

        Ok(Self {
            config: config.clone(),
            store: PageStore::new(&config.storage.dir),
            renderer,
        })
    }
}
