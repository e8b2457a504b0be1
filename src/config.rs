//! TOML configuration: named connections, resolver selection and static key
//! maps.
//!
//! ```toml
//! default_format = "json"
//!
//! [connections.local]
//! driver = "sqlite"
//! database = "app.db"
//! resolver = ["foreign_key", "static_map"]
//!
//! [connections.local.keys.users]
//! id = ["posts.author_id"]
//! ```
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{CopyError, Result};
use crate::resolver::{ConstraintResolver, NamingResolver, RelationKey, ResolverChain, StaticMapResolver};

pub const DEFAULT_CONFIG_FILE: &str = "copyql.toml";
pub const DEFAULT_FORMAT: &str = "sql";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Driver {
    Sqlite,
}

impl TryFrom<String> for Driver {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        match s.as_str() {
            "sqlite" | "sqlite3" => Ok(Driver::Sqlite),
            _ => Err(format!("Unsupported driver: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverKind {
    ForeignKey,
    Inflector,
    StaticMap,
}

impl TryFrom<&str> for ResolverKind {
    type Error = CopyError;

    fn try_from(s: &str) -> Result<Self> {
        match s {
            "foreign_key" | "constraint" => Ok(ResolverKind::ForeignKey),
            "inflector" | "naming" => Ok(ResolverKind::Inflector),
            "static_map" | "static" => Ok(ResolverKind::StaticMap),
            _ => Err(CopyError::Config(format!("Unsupported resolver: {s}"))),
        }
    }
}

/// `resolver = "name"` or `resolver = ["a", "b"]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ResolverSpec {
    Single(String),
    List(Vec<String>),
}

impl Default for ResolverSpec {
    fn default() -> Self {
        ResolverSpec::Single("foreign_key".to_string())
    }
}

impl ResolverSpec {
    pub fn names(&self) -> Vec<&str> {
        match self {
            ResolverSpec::Single(name) => vec![name.as_str()],
            ResolverSpec::List(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

/// Static map: table -> column -> related keys.
pub type KeyMap = BTreeMap<String, BTreeMap<String, Vec<RelationKey>>>;

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    pub driver: Driver,
    /// Relative paths are taken from the config file's directory.
    pub database: PathBuf,
    #[serde(default)]
    pub resolver: ResolverSpec,
    #[serde(default)]
    pub keys: KeyMap,
}

impl ConnectionConfig {
    /// # Errors
    /// `CopyError::Config` for an unknown resolver name.
    pub fn resolver_kinds(&self) -> Result<Vec<ResolverKind>> {
        self.resolver.names().into_iter().map(ResolverKind::try_from).collect()
    }

    /// Chain the configured resolvers in the order they are listed.
    ///
    /// # Errors
    /// `CopyError::Config` for an unknown resolver name.
    pub fn build_resolver(&self) -> Result<ResolverChain> {
        let kinds = self.resolver_kinds()?;
        if !self.keys.is_empty() && !kinds.contains(&ResolverKind::StaticMap) {
            log::warn!("static keys are configured but the static_map resolver is not selected");
        }
        let mut chain = ResolverChain::new();
        for kind in kinds {
            match kind {
                ResolverKind::ForeignKey => chain.push(Box::new(ConstraintResolver)),
                ResolverKind::Inflector => chain.push(Box::new(NamingResolver::new())),
                ResolverKind::StaticMap => chain.push(Box::new(self.static_map())),
            }
        }
        Ok(chain)
    }

    #[must_use]
    pub fn static_map(&self) -> StaticMapResolver {
        let mut map = StaticMapResolver::default();
        for (table, columns) in &self.keys {
            for (column, keys) in columns {
                for key in keys {
                    map.insert(table, column, key.clone());
                }
            }
        }
        map
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub default_format: Option<String>,
    #[serde(default)]
    pub connections: BTreeMap<String, ConnectionConfig>,
}

impl Config {
    /// Parse and validate a TOML document. Database paths are left as written.
    ///
    /// # Errors
    /// `CopyError::Config` when the document does not parse, names no
    /// connection, or selects an unknown resolver.
    pub fn from_toml(data: &str) -> Result<Self> {
        let config: Config = toml::from_str(data).map_err(|e| CopyError::Config(e.message().to_string()))?;
        if config.connections.is_empty() {
            return Err(CopyError::Config("no connections configured".to_string()));
        }
        for (name, conn) in &config.connections {
            conn.resolver_kinds()
                .map_err(|e| CopyError::Config(format!("connection '{name}': {}", strip_prefix(&e))))?;
        }
        Ok(config)
    }

    /// # Errors
    /// `CopyError::Config` naming the available connections.
    pub fn connection(&self, name: &str) -> Result<&ConnectionConfig> {
        self.connections.get(name).ok_or_else(|| {
            let known: Vec<&str> = self.connections.keys().map(String::as_str).collect();
            CopyError::Config(format!("Unknown connection: {name} (available: {})", known.join(", ")))
        })
    }

    /// The format to export with: explicit choice, then `default_format`,
    /// then `sql`.
    #[must_use]
    pub fn format<'a>(&'a self, requested: Option<&'a str>) -> &'a str {
        requested.or(self.default_format.as_deref()).unwrap_or(DEFAULT_FORMAT)
    }

    fn resolve_paths(&mut self, base: &Path) {
        for conn in self.connections.values_mut() {
            if conn.database.is_relative() {
                conn.database = base.join(&conn.database);
            }
        }
    }
}

fn strip_prefix(e: &CopyError) -> String {
    match e {
        CopyError::Config(msg) => msg.clone(),
        other => other.to_string(),
    }
}

/// Load a config file. Relative database paths are resolved against the
/// file's directory.
///
/// # Errors
/// `CopyError::Config` when the file cannot be read or is invalid.
pub fn load_config_at(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path)
        .map_err(|e| CopyError::Config(format!("cannot read {}: {e}", path.display())))?;
    let mut config =
        Config::from_toml(&data).map_err(|e| CopyError::Config(format!("{}: {}", path.display(), strip_prefix(&e))))?;
    config.resolve_paths(path.parent().unwrap_or_else(|| Path::new("")));
    log::debug!("loaded {} connections from {}", config.connections.len(), path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Resolver;
    use crate::schema::Schema;

    const SAMPLE: &str = r#"
default_format = "json"

[connections.local]
driver = "sqlite"
database = "app.db"
resolver = ["constraint", "static"]

[connections.local.keys.users]
id = ["posts.author_id", "posts.editor_id"]

[connections.legacy]
driver = "sqlite"
database = "/abs/legacy.db"
resolver = "naming"
"#;

    #[test]
    fn parses_connections_and_resolvers() {
        let cfg = Config::from_toml(SAMPLE).unwrap();
        assert_eq!(cfg.format(None), "json");
        assert_eq!(cfg.format(Some("sql")), "sql");

        let local = cfg.connection("local").unwrap();
        assert_eq!(local.driver, Driver::Sqlite);
        assert_eq!(local.resolver_kinds().unwrap(), vec![ResolverKind::ForeignKey, ResolverKind::StaticMap]);
        let chain = local.build_resolver().unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(
            chain.resolve(&Schema::new(), "users", "id"),
            vec![RelationKey::new("posts", "author_id"), RelationKey::new("posts", "editor_id")]
        );

        let legacy = cfg.connection("legacy").unwrap();
        assert_eq!(legacy.resolver_kinds().unwrap(), vec![ResolverKind::Inflector]);
    }

    #[test]
    fn resolver_defaults_to_foreign_key() {
        let cfg = Config::from_toml("[connections.a]\ndriver = \"sqlite\"\ndatabase = \"a.db\"\n").unwrap();
        let a = cfg.connection("a").unwrap();
        assert_eq!(a.resolver_kinds().unwrap(), vec![ResolverKind::ForeignKey]);
        assert_eq!(cfg.format(None), DEFAULT_FORMAT);
    }

    #[test]
    fn validation_errors() {
        let cases = [
            ("default_format = \"sql\"\n", "no connections"),
            ("[connections.a]\ndriver = \"oracle\"\ndatabase = \"a\"\n", "Unsupported driver: oracle"),
            ("[connections.a]\ndriver = \"sqlite\"\ndatabase = \"a\"\nresolver = \"magic\"\n", "Unsupported resolver: magic"),
            (
                "[connections.a]\ndriver = \"sqlite\"\ndatabase = \"a\"\n[connections.a.keys.t]\nc = [\"nodot\"]\n",
                "invalid relation key",
            ),
        ];
        for (toml, needle) in cases {
            let err = Config::from_toml(toml).unwrap_err();
            assert!(matches!(err, CopyError::Config(_)));
            assert!(err.to_string().contains(needle), "{err} should mention {needle}");
        }
    }

    #[test]
    fn unknown_connection_lists_known() {
        let cfg = Config::from_toml(SAMPLE).unwrap();
        let err = cfg.connection("prod").unwrap_err().to_string();
        assert!(err.contains("Unknown connection: prod"));
        assert!(err.contains("legacy, local"));
    }

    #[test]
    fn load_resolves_relative_database_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("copyql.toml");
        fs::write(&path, SAMPLE).unwrap();
        let cfg = load_config_at(&path).unwrap();
        assert_eq!(cfg.connection("local").unwrap().database, dir.path().join("app.db"));
        assert_eq!(cfg.connection("legacy").unwrap().database, PathBuf::from("/abs/legacy.db"));
    }

    #[test]
    fn load_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config_at(&dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }
}
