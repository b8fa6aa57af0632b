//! Per-subscription feature persistence.
//!
//! Each subscription owns one namespace (`config_<subId>`) holding a flat
//! `feature key -> JSON primitive` record. Saving replaces the whole record.

use crate::error::{StorageError, StorageResult};
use imsconf_types::{Configuration, Feature, FeatureValue, SubId};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

const NAMESPACE_PREFIX: &str = "config_";

/// Namespace name for a subscription's record.
pub fn namespace_for(sub_id: SubId) -> String {
    format!("{NAMESPACE_PREFIX}{sub_id}")
}

fn sub_id_from_namespace(namespace: &str) -> Option<SubId> {
    namespace.strip_prefix(NAMESPACE_PREFIX)?.parse().ok()
}

/// Persistent feature store backed by SQLite.
#[derive(Clone)]
pub struct FeatureStore {
    conn: Arc<Mutex<Connection>>,
}

impl FeatureStore {
    /// Opens (or creates) a feature store at the given path.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        Self::with_connection(conn)
    }

    /// Opens an in-memory feature store (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StorageResult<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StorageResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS feature_values (
                namespace TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                UNIQUE(namespace, key)
            );
            ",
        )?;
        Ok(())
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    /// Loads the saved configuration for a subscription.
    ///
    /// Returns `Ok(None)` when nothing was ever saved for `sub_id`. Otherwise
    /// the result covers the whole current catalogue: features missing from
    /// the record, or stored under a different type, read as their default.
    pub fn load(&self, sub_id: SubId) -> StorageResult<Option<Configuration>> {
        let namespace = namespace_for(sub_id);
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM feature_values WHERE namespace = ?1")?;
        let rows = stmt.query_map(params![namespace], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut stored = Vec::new();
        for row in rows {
            stored.push(row?);
        }
        if stored.is_empty() {
            return Ok(None);
        }

        let mut config = Configuration::new();
        for (key, raw) in stored {
            let Some(feature) = Feature::from_key(&key) else {
                debug!(%sub_id, key, "ignoring stored key outside the catalogue");
                continue;
            };
            let value: FeatureValue = serde_json::from_str(&raw).map_err(|e| {
                StorageError::InvalidData(format!("{namespace}/{key}: {e}"))
            })?;
            if value.value_type() != feature.value_type() {
                warn!(
                    %sub_id,
                    key,
                    stored = %value.value_type(),
                    expected = %feature.value_type(),
                    "stored value has the wrong type, using default"
                );
                continue;
            }
            config.set(feature, value);
        }
        Ok(Some(config.completed()))
    }

    /// Replaces the saved record for a subscription with exactly the entries
    /// of `config`. Keys from earlier saves that are not in `config` are gone
    /// afterwards.
    ///
    /// Carrier-specific string features are never written under
    /// [`SubId::ALL`].
    pub fn save(&self, sub_id: SubId, config: &Configuration) -> StorageResult<()> {
        let namespace = namespace_for(sub_id);
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM feature_values WHERE namespace = ?1",
            params![namespace],
        )?;
        let mut written = 0usize;
        for (feature, value) in config.iter() {
            if sub_id.is_all() && feature.is_subscription_specific() {
                continue;
            }
            tx.execute(
                "INSERT INTO feature_values (namespace, key, value) VALUES (?1, ?2, ?3)",
                params![namespace, feature.key(), serde_json::to_string(value)?],
            )?;
            written += 1;
        }
        tx.commit()?;
        debug!(%sub_id, written, "saved feature record");
        Ok(())
    }

    /// Lists every subscription with a saved record, in ascending order.
    pub fn stored_sub_ids(&self) -> StorageResult<Vec<SubId>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT DISTINCT namespace FROM feature_values")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut ids = Vec::new();
        for row in rows {
            let namespace = row?;
            match sub_id_from_namespace(&namespace) {
                Some(id) => ids.push(id),
                None => warn!(namespace, "skipping unrecognised namespace"),
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Drops every saved record (app data reset).
    pub fn clear_all(&self) -> StorageResult<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM feature_values", [])?;
        Ok(())
    }
}
