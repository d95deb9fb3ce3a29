//! Database connection settings.
//!
//! [`DbConfig`] is built once from the command line (which in turn falls back
//! to environment variables) and passed down explicitly.

use std::fmt;

use log::warn;
use sqlx::postgres::PgConnectOptions;

use crate::cli::DbArgs;

/// The database every connection targets. `POSTGRES_DB` is read into
/// [`DbConfig::requested_database`] but does not change this.
pub const DATABASE_NAME: &str = "todo";

pub const DEFAULT_USER: &str = "postgres";
pub const DEFAULT_PASSWORD: &str = "123";
pub const DEFAULT_HOST: &str = "database";
pub const DEFAULT_PORT: u16 = 5432;

#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub requested_database: Option<String>,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            user: DEFAULT_USER.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            requested_database: None,
        }
    }
}

impl DbConfig {
    pub fn database(&self) -> &str {
        DATABASE_NAME
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(self.database())
    }

    pub fn warn_if_database_ignored(&self) {
        if let Some(requested) = self
            .requested_database
            .as_deref()
            .filter(|name| *name != DATABASE_NAME)
        {
            warn!(
                "POSTGRES_DB is set to '{requested}' but connections always use database '{DATABASE_NAME}'"
            );
        }
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("user", &self.user)
            .field("password", &"***")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("requested_database", &self.requested_database)
            .finish()
    }
}

impl From<&DbArgs> for DbConfig {
    fn from(args: &DbArgs) -> Self {
        Self {
            user: args.user.clone(),
            password: args.password.clone(),
            host: args.host.clone(),
            port: args.port,
            requested_database: args.database.clone(),
        }
    }
}
