use std::{net::SocketAddr, path::PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::{config, io_utils::DEFAULT_DATA_DIR};

#[derive(Debug, Parser)]
#[command(author, version, about = "Course catalog page seeded from CSV files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import the CSV datasets, then serve the catalog page
    Serve(ServeArgs),
    /// Import the CSV datasets once and exit
    Import(ImportArgs),
}

#[derive(Debug, Args)]
pub struct DbArgs {
    /// PostgreSQL user
    #[arg(long = "db-user", env = "PGPUSER", default_value = config::DEFAULT_USER)]
    pub user: String,
    /// PostgreSQL password
    #[arg(
        long = "db-password",
        env = "PGPASSWORD",
        default_value = config::DEFAULT_PASSWORD,
        hide_env_values = true,
        hide_default_value = true
    )]
    pub password: String,
    /// PostgreSQL host
    #[arg(long = "db-host", env = "HOST", default_value = config::DEFAULT_HOST)]
    pub host: String,
    /// PostgreSQL port
    #[arg(long = "db-port", env = "PGPORT", default_value_t = config::DEFAULT_PORT)]
    pub port: u16,
    /// Requested database name (connections always use 'todo')
    #[arg(long = "db-name", env = "POSTGRES_DB")]
    pub database: Option<String>,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[command(flatten)]
    pub db: DbArgs,
    /// Directory holding courses.csv, statistics.csv and admission.csv
    #[arg(long = "data-dir", env = "DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,
    /// Address to listen on
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    #[command(flatten)]
    pub db: DbArgs,
    /// Directory holding courses.csv, statistics.csv and admission.csv
    #[arg(long = "data-dir", env = "DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,
    /// Read and validate the CSV files without connecting to the database
    #[arg(long = "dry-run")]
    pub dry_run: bool,
    /// Print the import report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn import_flags_parse() {
        let cli = Cli::try_parse_from([
            "course-catalog",
            "import",
            "--dry-run",
            "--json",
            "--data-dir",
            "fixtures",
            "--db-host",
            "localhost",
        ])
        .expect("parse");
        match cli.command {
            Commands::Import(args) => {
                assert!(args.dry_run);
                assert!(args.json);
                assert_eq!(args.data_dir, PathBuf::from("fixtures"));
                assert_eq!(args.db.host, "localhost");
            }
            other => panic!("Expected import command, got {other:?}"),
        }
    }
}
