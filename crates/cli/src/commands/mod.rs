pub(crate) mod chat;
pub(crate) mod profile;
pub(crate) mod serve;
pub(crate) mod transcript;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use sofia_storage::SqliteStore;

use crate::ensure_db_dir;

pub(crate) fn open_store(db_path: &Path) -> Result<Arc<SqliteStore>> {
    ensure_db_dir(db_path)?;
    Ok(Arc::new(SqliteStore::new(db_path)?))
}
