//! Repository entry point.
//!
//! `AuditStore` wraps `VigilDb`; every repository method lives in an
//! `impl AuditStore` block under `repos/`.

use crate::VigilDb;
use crate::error::StoreError;

pub struct AuditStore {
    db: VigilDb,
}

impl AuditStore {
    /// Open a store backed by a local database file, or `":memory:"` for tests.
    ///
    /// Parent directories of a file path are created as needed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the directory cannot be created or the
    /// database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, StoreError> {
        if db_path != ":memory:" {
            if let Some(parent) = std::path::Path::new(db_path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        StoreError::Other(anyhow::anyhow!(
                            "creating store directory {}: {e}",
                            parent.display()
                        ))
                    })?;
                }
            }
        }
        let db = VigilDb::open_local(db_path).await?;
        Ok(Self { db })
    }

    #[must_use]
    pub const fn db(&self) -> &VigilDb {
        &self.db
    }
}
