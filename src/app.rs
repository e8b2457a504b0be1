use crate::cli::{Cli, Commands};
use crate::config::load_config_at;
use crate::db;
use crate::errors::Result;
use crate::export::Exporters;
use crate::query;
use crate::resolver::constraint::warn_unsupported_keys;
use crate::traversal::{Order, Traversal};
use clap::CommandFactory;
use clap_complete::generate;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

/// Everything `copyql export` needs, independent of argument parsing.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub config: PathBuf,
    pub connection: String,
    pub queries: Vec<String>,
    pub format: Option<String>,
    pub output: Option<PathBuf>,
    pub order: Order,
}

/// Run the CLI logic in-process with the built-in exporters.
///
/// Returns an exit code (0 = success).
#[must_use]
pub fn run_cli(cli: Cli) -> i32 {
    run_cli_with(cli, &Exporters::default())
}

/// Run the CLI logic with a caller-supplied exporter registry.
#[must_use]
pub fn run_cli_with(cli: Cli, exporters: &Exporters) -> i32 {
    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let bin_name = env!("CARGO_PKG_NAME");
            let mut out = io::stdout();
            generate(shell, &mut cmd, bin_name, &mut out);
            0
        }
        Commands::Export { config, format, output, depth_first, connection, queries } => {
            let req = ExportRequest {
                config,
                connection,
                queries,
                format,
                output,
                order: if depth_first { Order::DepthFirst } else { Order::BreadthFirst },
            };
            match run_export(&req, exporters) {
                Ok(_) => 0,
                Err(e) => {
                    eprintln!("Error: {e}");
                    1
                }
            }
        }
    }
}

/// Parse seeds, load config, traverse and write the export.
///
/// Returns the number of exported rows. Nothing is written when any step
/// fails.
///
/// # Errors
/// Any `CopyError` from parsing, configuration, the database or the exporter.
pub fn run_export(req: &ExportRequest, exporters: &Exporters) -> Result<usize> {
    let seeds = query::parse_all(&req.queries)?;
    let config = load_config_at(&req.config)?;
    let conn = config.connection(&req.connection)?;
    let format = config.format(req.format.as_deref());
    let exporter = exporters.get(format)?;
    let resolver = conn.build_resolver()?;

    let database = db::connect(conn)?;
    let schema = database.schema()?;
    warn_unsupported_keys(&schema);

    let (rows, stats) = Traversal::new(&schema, &*database, &resolver).order(req.order).run_with_stats(&seeds)?;
    log::info!(
        "{}: {} rows from {} seeds ({} fetched, {} queries)",
        req.connection,
        rows.len(),
        seeds.len(),
        stats.rows_fetched,
        stats.queries_processed
    );

    // Render fully first: a failing exporter must write nothing.
    let mut buf = Vec::new();
    exporter.export(&schema, &rows, &mut buf)?;
    match &req.output {
        Some(path) => {
            fs::write(path, &buf)?;
            log::info!("wrote {}", path.display());
        }
        None => {
            let mut out = io::stdout().lock();
            out.write_all(&buf)?;
            out.flush()?;
        }
    }
    Ok(rows.len())
}
