use std::sync::Arc;

use subcheck_core::error::Result;
use subcheck_core::pacer::{Sleeper, ThreadSleeper};
use subcheck_core::{AppConfig, CustomSearchClient, RequirementsTable, SearchClient, Workspace};

use crate::render::Templates;

/// Process-wide, read-only after startup.
pub struct AppState {
    pub config: AppConfig,
    pub table: RequirementsTable,
    pub workspace: Workspace,
    pub client: Arc<dyn SearchClient>,
    pub sleeper: Arc<dyn Sleeper>,
    pub templates: Templates,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Production wiring: real search client, blocking sleeper, embedded templates.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let table = RequirementsTable::load_or_embedded(config.requirements_path.as_deref())?;
        let client: Arc<dyn SearchClient> = Arc::new(CustomSearchClient::new(&config.search));
        Self::new(config, table, client, Arc::new(ThreadSleeper))
    }

    pub fn new(
        config: AppConfig,
        table: RequirementsTable,
        client: Arc<dyn SearchClient>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self> {
        let workspace = Workspace::open(&config.upload_dir, &config.extract_dir)?;
        let templates = Templates::embedded().map_err(|e| {
            subcheck_core::SubcheckError::Config(format!("templates: {e}"))
        })?;
        Ok(Self {
            config,
            table,
            workspace,
            client,
            sleeper,
            templates,
        })
    }
}
