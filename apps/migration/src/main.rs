//! Migration CLI tool.
//!
//! Runs the SeaORM migration CLI against the blog database:
//!
//! ```text
//! migration [-u URL] [-s SCHEMA] [-v] [up [-n N] | down [-n N] | fresh | refresh | reset | status | init | generate NAME]
//! ```
//!
//! Pool sizing follows `DB_MAX_CONNECTIONS` and `DB_MIN_CONNECTIONS`.

use anyhow::Context;
use blog_infra::{BlogConfig, DatabaseConfig};
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ConnectOptions, Database};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = BlogConfig::from_env().context("loading configuration")?;
    let pool = config.database;

    // The CLI installs its own tracing subscriber.
    cli::run_cli_with_connection(migration::Migrator, move |options| async move {
        Database::connect(pool_options(options, pool.as_ref())).await
    })
    .await;

    Ok(())
}

fn pool_options(mut options: ConnectOptions, config: Option<&DatabaseConfig>) -> ConnectOptions {
    if let Some(config) = config {
        options
            .max_connections(config.max_connections)
            .min_connections(config.min_connections);
    }
    options
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use sea_orm_migration::cli::Cli;

    use super::*;

    #[test]
    fn test_cli_accepts_migrator_commands() {
        let accepted: [&[&str]; 7] = [
            &["migration"],
            &["migration", "up", "--num", "2"],
            &["migration", "down"],
            &["migration", "fresh"],
            &["migration", "status"],
            &["migration", "-u", "postgres://localhost/blog", "reset"],
            &["migration", "generate", "add_tags"],
        ];
        for args in accepted {
            assert!(Cli::try_parse_from(args).is_ok(), "{args:?}");
        }

        assert!(Cli::try_parse_from(["migration", "sideways"]).is_err());
        assert!(Cli::try_parse_from(["migration", "up", "--num", "two"]).is_err());
    }

    #[test]
    fn test_pool_options_from_config() {
        let config = DatabaseConfig {
            url: "postgres://localhost/blog".to_string(),
            max_connections: 4,
            min_connections: 2,
        };
        let options = pool_options(ConnectOptions::new("postgres://localhost/blog"), Some(&config));
        assert_eq!(options.get_max_connections(), Some(4));
        assert_eq!(options.get_min_connections(), Some(2));

        let options = pool_options(ConnectOptions::new("postgres://localhost/blog"), None);
        assert_eq!(options.get_max_connections(), None);
    }
}
