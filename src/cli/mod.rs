use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_FILE;

#[derive(Debug, Parser)]
#[command(
    name = "copyql",
    version,
    about = "Copy a connected subset of rows out of a relational database",
    long_about = "Start from one or more TABLE.COLUMN:VALUE lookups and follow foreign keys, naming conventions or a static key map until no new rows turn up. The closed set of rows is written as SQL inserts or JSON, parents before children."
)]
pub struct Cli {
    /// Only log errors
    #[arg(short, long, global = true, default_value_t = false)]
    pub quiet: bool,
    /// More log output (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Export the rows reachable from the given lookups
    Export {
        /// Path to the TOML configuration file
        #[arg(short, long, env = "COPYQL_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
        /// Output format (sql, json); defaults to the config's default_format
        #[arg(short, long)]
        format: Option<String>,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Follow the most recently discovered relationship first
        #[arg(long, default_value_t = false)]
        depth_first: bool,
        /// Connection name from the configuration file
        connection: String,
        /// Seed lookups, TABLE.COLUMN:VALUE
        #[arg(required = true, num_args = 1..)]
        queries: Vec<String>,
    },
    /// Generate shell completion scripts
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Log level selected by `-q` / `-v`.
    #[must_use]
    pub fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            return log::LevelFilter::Error;
        }
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_arguments() {
        let cli = Cli::try_parse_from([
            "copyql", "-vv", "export", "-c", "x.toml", "-f", "json", "--depth-first", "local", "users.id:1", "posts.id:2",
        ])
        .unwrap();
        assert_eq!(cli.log_level(), log::LevelFilter::Debug);
        match cli.command {
            Commands::Export { config, format, output, depth_first, connection, queries } => {
                assert_eq!(config, PathBuf::from("x.toml"));
                assert_eq!(format.as_deref(), Some("json"));
                assert!(output.is_none());
                assert!(depth_first);
                assert_eq!(connection, "local");
                assert_eq!(queries, vec!["users.id:1", "posts.id:2"]);
            }
            Commands::Completions { .. } => panic!("expected export"),
        }
    }

    #[test]
    fn export_requires_a_query() {
        assert!(Cli::try_parse_from(["copyql", "export", "local"]).is_err());
    }

    #[test]
    fn quiet_wins_over_verbose() {
        let cli = Cli::try_parse_from(["copyql", "export", "-q", "-v", "local", "t.c:v"]).unwrap();
        assert_eq!(cli.log_level(), log::LevelFilter::Error);
    }
}
