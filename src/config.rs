//! Indexer configuration.

use crate::error::{IndexError, Result};
use crate::path::QueryablePath;
use crate::queryable::QueryableSet;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Default SRID applied to baseline (Dublin-Core) bounding boxes.
pub const DEFAULT_SRID: i32 = 4326;

/// Log verbosity for the engine.
///
/// The engine itself only emits `tracing` events; this is carried in the
/// configuration so the embedding application can initialize its subscriber
/// at the operator-requested level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Corresponding `tracing` level.
    pub fn as_tracing(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Configuration for an indexing session.
///
/// Loaded once (typically from JSON) and read-only for the lifetime of a
/// rebuild.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Operator-configured queryables, field name → textual path expression.
    ///
    /// These strictly override any schema-provided field with the same name
    /// and are additionally applied as their own pass on every record, so
    /// their values always win.
    pub additional_queryables: BTreeMap<String, String>,

    /// SRID stamped on bounding boxes extracted through the Dublin-Core
    /// baseline paths. Default: 4326.
    pub default_srid: i32,

    /// Log verbosity requested by the operator.
    pub log_level: LogLevel,

    /// Exclude records belonging to the "internal" exposure category when
    /// listing the corpus for a full rebuild.
    pub exclude_internal_recordsets: bool,

    /// Only list records marked published for a full rebuild.
    pub published_only: bool,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            additional_queryables: BTreeMap::new(),
            default_srid: DEFAULT_SRID,
            log_level: LogLevel::default(),
            exclude_internal_recordsets: false,
            published_only: false,
        }
    }
}

impl IndexerConfig {
    /// Parse and validate the operator queryables into a [`QueryableSet`].
    ///
    /// Path expressions are parsed here, once, so malformed operator
    /// configuration is rejected at load time rather than mid-rebuild.
    pub fn additional_set(&self) -> Result<QueryableSet> {
        let mut set = QueryableSet::new("additional");
        for (field, raw) in &self.additional_queryables {
            let path = QueryablePath::parse(raw).map_err(|e| {
                IndexError::InvalidConfig(format!("additional queryable `{field}`: {e}"))
            })?;
            set.insert(field, path);
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = IndexerConfig::default();
        assert_eq!(cfg.default_srid, 4326);
        assert!(!cfg.published_only);
        assert!(cfg.additional_set().unwrap().is_empty());
    }

    #[test]
    fn deserializes_from_json() {
        let cfg: IndexerConfig = serde_json::from_str(
            r#"{
                "additional_queryables": {"digitalTransferOptions": "distribution/transferOptions/protocol"},
                "default_srid": 3857,
                "log_level": "debug",
                "published_only": true
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.default_srid, 3857);
        assert_eq!(cfg.log_level, LogLevel::Debug);
        assert!(cfg.published_only);
        let set = cfg.additional_set().unwrap();
        assert!(set.get("digitalTransferOptions").is_some());
    }

    #[test]
    fn rejects_malformed_operator_path() {
        let mut cfg = IndexerConfig::default();
        cfg.additional_queryables
            .insert("bad".into(), "thing[zero]".into());
        assert!(matches!(
            cfg.additional_set(),
            Err(IndexError::InvalidConfig(_))
        ));
    }
}
