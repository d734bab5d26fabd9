//! CLI command implementations

pub mod auth;
pub mod collect;
pub mod contributions;
pub mod contributors;
pub mod dashboard;
pub mod expenses;
pub mod payments;
pub mod tolas;

use crate::api::ApiClient;
use crate::config::Config;
use crate::errors::{ConsoleError, Result};
use crate::loader::find_tola;
use crate::models::Tola;
use crate::output::OutputFormat;
use crate::session::SessionStore;

/// Everything a command needs for one run.
pub struct Context {
    pub config: Config,
    pub api: ApiClient,
    pub store: SessionStore,
    pub format: OutputFormat,
}

impl Context {
    pub fn is_authenticated(&self) -> bool {
        self.api.session().is_authenticated()
    }

    /// Resolve a Tola by numeric id or name against the backend list.
    pub async fn resolve_tola(&self, key: &str) -> Result<Tola> {
        let tolas = self.api.list_tolas().await?;
        find_tola(&tolas, key)
            .cloned()
            .ok_or_else(|| ConsoleError::NotFound(format!("Tola '{key}'")))
    }
}
