use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::filter::EventFilter;
use crate::migrate::MigrationStrategy;
use crate::namespace::namespace;
use crate::PROCESSOR;

const DEFAULT_MAX_CONNECTIONS: u32 = 4;

/// Projector configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ProjectorConfig {
    pub database_url: String,
    pub drive_id: String,
    pub max_connections: u32,
    pub migration_strategy: MigrationStrategy,
    pub filter: EventFilter,
}

impl ProjectorConfig {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let max_connections = match lookup("PROJECTOR_MAX_CONNECTIONS") {
            None => DEFAULT_MAX_CONNECTIONS,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "PROJECTOR_MAX_CONNECTIONS",
                        value: raw,
                        reason: "expected a positive integer".into(),
                    })
                }
            },
        };

        let migration_strategy = match lookup("PROJECTOR_MIGRATION_STRATEGY") {
            None => MigrationStrategy::default(),
            Some(raw) => raw.parse()?,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            drive_id: required("DRIVE_ID")?,
            max_connections,
            migration_strategy,
            filter: EventFilter::default(),
        })
    }

    /// Override the event filter from a TOML file.
    pub fn with_filter_file(mut self, path: &Path) -> Result<Self, ConfigError> {
        self.filter = FilterFile::load(path)?.apply(self.filter);
        Ok(self)
    }

    pub fn namespace(&self) -> String {
        namespace(PROCESSOR, &self.drive_id)
    }
}

/// TOML filter overrides. Absent keys keep the default.
///
/// ```toml
/// document_types = ["docmodel/workstream"]
/// scopes = ["global"]
/// branches = ["*"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterFile {
    pub document_types: Option<Vec<String>>,
    pub scopes: Option<Vec<String>>,
    pub branches: Option<Vec<String>>,
}

impl FilterFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn apply(self, base: EventFilter) -> EventFilter {
        EventFilter {
            document_types: self.document_types.unwrap_or(base.document_types),
            scopes: self.scopes.unwrap_or(base.scopes),
            branches: self.branches.unwrap_or(base.branches),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply() {
        let config = ProjectorConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/docmodel"),
            ("DRIVE_ID", "powerhouse"),
        ]))
        .unwrap();

        assert_eq!(config.max_connections, 4);
        assert_eq!(config.migration_strategy, MigrationStrategy::Introspect);
        assert_eq!(config.filter, EventFilter::default());
        assert!(config.namespace().starts_with("workstreams_powerhouse_"));
    }

    #[test]
    fn missing_drive_id_is_reported() {
        let err = ProjectorConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://x")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DRIVE_ID")));
    }

    fn with_required(extra: (&'static str, &'static str)) -> impl Fn(&str) -> Option<String> {
        lookup(&[("DATABASE_URL", "postgres://x"), ("DRIVE_ID", "d"), extra])
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(
            ProjectorConfig::from_lookup(with_required(("PROJECTOR_MAX_CONNECTIONS", "0"))).is_err()
        );
        assert!(ProjectorConfig::from_lookup(with_required((
            "PROJECTOR_MIGRATION_STRATEGY",
            "yolo"
        )))
        .is_err());

        let config =
            ProjectorConfig::from_lookup(with_required(("PROJECTOR_MIGRATION_STRATEGY", "attempt")))
                .unwrap();
        assert_eq!(config.migration_strategy, MigrationStrategy::AttemptAndIgnore);
    }

    #[test]
    fn filter_file_overrides_only_present_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"branches = ["*"]"#).unwrap();

        let filter = FilterFile::load(file.path()).unwrap().apply(EventFilter::default());
        assert_eq!(filter.branches, vec!["*"]);
        assert_eq!(filter.document_types, EventFilter::default().document_types);
    }

    #[test]
    fn filter_file_rejects_unknown_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"drives = ["a"]"#).unwrap();

        assert!(matches!(
            FilterFile::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }
}
