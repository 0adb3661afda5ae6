//! Process configuration, read from the environment.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `BIND_ADDR` | `0.0.0.0:8080` | listen address |
//! | `JWT_SECRET` | insecure dev value | HS256 secret for bearer tokens |
//! | `DATABASE_URL` | unset | Postgres grant store; in-memory when unset |
//! | `MENU_TAXONOMY_PATH` | unset | JSON taxonomy replacing the built-in catalog |

use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

use bizconsole_auth::{MenuTaxonomy, TaxonomyError};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid BIND_ADDR '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        source: AddrParseError,
    },

    #[error("cannot read menu taxonomy {path:?}: {source}")]
    TaxonomyIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Taxonomy(#[from] TaxonomyError),
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub database_url: Option<String>,
    pub menu_taxonomy_path: Option<PathBuf>,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let raw_addr = var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .parse()
            .map_err(|source| ConfigError::InvalidBindAddr {
                value: raw_addr.clone(),
                source,
            })?;

        let jwt_secret = var("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        Ok(Self {
            bind_addr,
            jwt_secret,
            database_url: var("DATABASE_URL"),
            menu_taxonomy_path: var("MENU_TAXONOMY_PATH").map(PathBuf::from),
        })
    }

    /// The configured taxonomy file, or the built-in catalog.
    pub fn load_taxonomy(&self) -> Result<MenuTaxonomy, ConfigError> {
        match &self.menu_taxonomy_path {
            None => Ok(MenuTaxonomy::builtin().clone()),
            Some(path) => {
                let document =
                    std::fs::read_to_string(path).map_err(|source| ConfigError::TaxonomyIo {
                        path: path.clone(),
                        source,
                    })?;
                let taxonomy = MenuTaxonomy::from_json(&document)?;
                tracing::info!(
                    path = %path.display(),
                    version = taxonomy.version(),
                    keys = taxonomy.len(),
                    "loaded menu taxonomy"
                );
                Ok(taxonomy)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.jwt_secret, DEV_JWT_SECRET);
        assert!(config.database_url.is_none());
        assert!(config.menu_taxonomy_path.is_none());
    }

    #[test]
    fn explicit_values_and_blank_as_unset() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("JWT_SECRET", "s3cret"),
            ("DATABASE_URL", "  "),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.jwt_secret, "s3cret");
        assert!(config.database_url.is_none());
    }

    #[test]
    fn invalid_bind_addr() {
        let err = ApiConfig::from_lookup(lookup(&[("BIND_ADDR", "localhost")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBindAddr { .. }));
    }

    #[test]
    fn builtin_taxonomy_when_no_path() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        let taxonomy = config.load_taxonomy().unwrap();
        assert_eq!(taxonomy.version(), MenuTaxonomy::builtin().version());
    }

    #[test]
    fn taxonomy_file_errors_are_reported() {
        let missing = ApiConfig::from_lookup(lookup(&[(
            "MENU_TAXONOMY_PATH",
            "/definitely/not/here.json",
        )]))
        .unwrap();
        assert!(matches!(
            missing.load_taxonomy(),
            Err(ConfigError::TaxonomyIo { .. })
        ));

        let path = std::env::temp_dir().join(format!("taxonomy-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{ "version": 9, "root": { "key": "root", "name": "Menu", "children": [
                { "key": "a", "name": "A", "allowedActions": ["view"] },
                { "key": "a", "name": "A again", "allowedActions": ["view"] } ] } }"#,
        )
        .unwrap();
        let dup = ApiConfig {
            menu_taxonomy_path: Some(path.clone()),
            ..ApiConfig::from_lookup(lookup(&[])).unwrap()
        };
        assert!(matches!(
            dup.load_taxonomy(),
            Err(ConfigError::Taxonomy(TaxonomyError::DuplicateKey(_)))
        ));
        let _ = std::fs::remove_file(path);
    }
}
