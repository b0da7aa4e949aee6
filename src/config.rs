use crate::services::object_id;
use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use std::{env, fmt, str::FromStr};

/// Centralized application configuration.
/// Combines environment variables and CLI arguments, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreConfig,
    pub object_id_len: usize,
}

/// Which `MapStore` backs the service.
#[derive(Clone)]
pub enum StoreConfig {
    /// Process-local store; data is lost on exit.
    Memory,
    Postgres {
        database_url: String,
        service_key: String,
        max_connections: u32,
    },
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreConfig::Memory => f.write_str("Memory"),
            StoreConfig::Postgres {
                database_url,
                max_connections,
                ..
            } => f
                .debug_struct("Postgres")
                .field("database_url", database_url)
                .field("service_key", &"<redacted>")
                .field("max_connections", max_connections)
                .finish(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    Postgres,
    Memory,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Map record API")]
pub struct Args {
    /// Host to bind to (overrides MAP_MANAGER_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides MAP_MANAGER_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Storage backend (overrides MAP_MANAGER_STORE)
    #[arg(long, value_enum)]
    pub store: Option<StoreKind>,

    /// Postgres URL (overrides MAP_MANAGER_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Privileged database credential (overrides MAP_MANAGER_SERVICE_KEY)
    #[arg(long)]
    pub service_key: Option<String>,

    /// Pool size (overrides MAP_MANAGER_MAX_CONNECTIONS)
    #[arg(long)]
    pub max_connections: Option<u32>,

    /// Hex length of generated object ids (overrides MAP_MANAGER_OBJECT_ID_LENGTH)
    #[arg(long)]
    pub object_id_length: Option<usize>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        Self::resolve(Args::parse(), |key| env::var(key).ok())
    }

    /// Merge `args` over values looked up with `env`, then validate.
    ///
    /// Fails when the Postgres store is selected without a database URL or
    /// service key, or when a numeric value does not parse.
    pub fn resolve(args: Args, env: impl Fn(&str) -> Option<String>) -> Result<(Self, bool)> {
        let lookup = |key: &str| env(key).filter(|v| !v.is_empty());

        let host = args
            .host
            .or_else(|| lookup("MAP_MANAGER_HOST"))
            .unwrap_or_else(|| "0.0.0.0".into());
        let port = match args.port {
            Some(port) => port,
            None => parse_env(&lookup, "MAP_MANAGER_PORT", 8000)?,
        };
        let object_id_len = match args.object_id_length {
            Some(len) => len,
            None => parse_env(
                &lookup,
                "MAP_MANAGER_OBJECT_ID_LENGTH",
                object_id::DEFAULT_OBJECT_ID_LEN,
            )?,
        };
        object_id::validate_len(object_id_len).map_err(|msg| anyhow!(msg))?;

        let kind = match args.store {
            Some(kind) => kind,
            None => match lookup("MAP_MANAGER_STORE") {
                Some(value) => <StoreKind as ValueEnum>::from_str(&value, true)
                    .map_err(|err| anyhow!("parsing MAP_MANAGER_STORE value `{}`: {}", value, err))?,
                None => StoreKind::Postgres,
            },
        };

        let store = match kind {
            StoreKind::Memory => StoreConfig::Memory,
            StoreKind::Postgres => {
                let database_url = args
                    .database_url
                    .or_else(|| lookup("MAP_MANAGER_DATABASE_URL"))
                    .context("MAP_MANAGER_DATABASE_URL (or --database-url) must be set")?;
                let service_key = args
                    .service_key
                    .or_else(|| lookup("MAP_MANAGER_SERVICE_KEY"))
                    .context("MAP_MANAGER_SERVICE_KEY (or --service-key) must be set")?;
                let max_connections = match args.max_connections {
                    Some(n) => n,
                    None => parse_env(&lookup, "MAP_MANAGER_MAX_CONNECTIONS", 5)?,
                };
                StoreConfig::Postgres {
                    database_url,
                    service_key,
                    max_connections,
                }
            }
        };

        if args.migrate && matches!(store, StoreConfig::Memory) {
            anyhow::bail!("--migrate requires the postgres store");
        }

        let cfg = Self {
            host,
            port,
            store,
            object_id_len,
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_env<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", key, value)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn resolve(argv: &[&str], vars: &[(&str, &str)]) -> Result<(AppConfig, bool)> {
        let args = Args::try_parse_from(std::iter::once("map-manager").chain(argv.iter().copied()))
            .unwrap();
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::resolve(args, |key| vars.get(key).cloned())
    }

    #[test]
    fn postgres_store_requires_url_and_key() {
        let err = resolve(&[], &[]).unwrap_err();
        assert!(err.to_string().contains("MAP_MANAGER_DATABASE_URL"));

        let err = resolve(&[], &[("MAP_MANAGER_DATABASE_URL", "postgres://db/maps")]).unwrap_err();
        assert!(err.to_string().contains("MAP_MANAGER_SERVICE_KEY"));

        let err = resolve(
            &[],
            &[
                ("MAP_MANAGER_DATABASE_URL", "postgres://db/maps"),
                ("MAP_MANAGER_SERVICE_KEY", ""),
            ],
        )
        .unwrap_err();
        assert!(err.to_string().contains("MAP_MANAGER_SERVICE_KEY"));
    }

    #[test]
    fn defaults_apply_with_credentials_present() {
        let (cfg, migrate) = resolve(
            &[],
            &[
                ("MAP_MANAGER_DATABASE_URL", "postgres://db/maps"),
                ("MAP_MANAGER_SERVICE_KEY", "secret"),
            ],
        )
        .unwrap();
        assert!(!migrate);
        assert_eq!(cfg.addr(), "0.0.0.0:8000");
        assert_eq!(cfg.object_id_len, 16);
        match cfg.store {
            StoreConfig::Postgres {
                max_connections, ..
            } => assert_eq!(max_connections, 5),
            StoreConfig::Memory => panic!("expected postgres store"),
        }
    }

    #[test]
    fn args_override_environment() {
        let (cfg, _) = resolve(
            &["--store", "memory", "--port", "9100"],
            &[("MAP_MANAGER_PORT", "7000"), ("MAP_MANAGER_STORE", "postgres")],
        )
        .unwrap();
        assert_eq!(cfg.port, 9100);
        assert!(matches!(cfg.store, StoreConfig::Memory));
    }

    #[test]
    fn malformed_numbers_are_errors() {
        let err = resolve(&["--store", "memory"], &[("MAP_MANAGER_PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("MAP_MANAGER_PORT"));
    }

    #[test]
    fn odd_object_id_length_is_rejected() {
        assert!(resolve(&["--store", "memory", "--object-id-length", "15"], &[]).is_err());
    }

    #[test]
    fn migrate_needs_postgres() {
        assert!(resolve(&["--store", "memory", "--migrate"], &[]).is_err());
    }

    #[test]
    fn debug_output_redacts_service_key() {
        let (cfg, _) = resolve(
            &["--database-url", "postgres://db/maps", "--service-key", "hunter2"],
            &[],
        )
        .unwrap();
        let rendered = format!("{:?}", cfg);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
