use anyhow::Context;
use vigil_config::{ConfigError, VigilConfig};
use vigil_engine::TargetConnInfo;
use vigil_store::AuditStore;

use crate::cli::root_commands::TargetArgs;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub store: AuditStore,
    pub config: VigilConfig,
}

impl AppContext {
    /// Open the audit store at `store.path`.
    pub async fn init(config: VigilConfig) -> anyhow::Result<Self> {
        let store = AuditStore::new_local(&config.store.path)
            .await
            .with_context(|| format!("failed to open audit store at {}", config.store.path))?;
        Ok(Self { store, config })
    }

    /// Connection info from `--target-url`, else from config.
    pub fn target_conn_info(&self, args: &TargetArgs) -> anyhow::Result<TargetConnInfo> {
        resolve_target(&self.config, args)
    }

    /// Schemas from `--schema`, else from config.
    pub fn schemas(&self, args: &TargetArgs) -> Vec<String> {
        if args.schemas.is_empty() {
            self.config.target.schemas.clone()
        } else {
            args.schemas.clone()
        }
    }
}

fn resolve_target(
    config: &VigilConfig,
    args: &TargetArgs,
) -> anyhow::Result<TargetConnInfo> {
    let url = match &args.target_url {
        Some(url) => url.clone(),
        None if config.target.is_configured() => config.target.database_url.clone(),
        None => {
            return Err(ConfigError::NotConfigured {
                section: "target".into(),
            })
            .context("pass --target-url or set VIGIL_TARGET__DATABASE_URL");
        }
    };
    Ok(TargetConnInfo::new(url, config.engine.connect_timeout()))
}
