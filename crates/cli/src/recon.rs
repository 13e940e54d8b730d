//! `conciliar run` / `conciliar validate`: config-driven reconciliation.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use clap::Subcommand;
use serde::Serialize;

use conciliar_io::{load_movements, write_xlsx, ExportConfig, IoError};
use conciliar_recon::config::SourceConfig;
use conciliar_recon::{reconcile, RawMovement, ReconConfig, Reconciliation};

use crate::exit_codes::{
    recon_exit_code, EXIT_INVALID_CONFIG, EXIT_PROBABLE, EXIT_RUNTIME, EXIT_UNMATCHED,
};
use crate::CliError;

#[derive(Subcommand)]
pub enum ReconCommands {
    /// Load both sides, reconcile, and write the spreadsheet report
    #[command(after_help = "\
Examples:
  conciliar run enero.toml
  conciliar run enero.toml --json
  conciliar run enero.toml --output result.json --no-export
  conciliar run enero.toml --out-dir /tmp/reports --strict")]
    Run {
        /// Path to the TOML config file
        config: PathBuf,

        /// Print the JSON result to stdout
        #[arg(long)]
        json: bool,

        /// Write the JSON result to a file (overrides [output].json)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Directory for the .xlsx report (overrides [output].dir)
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Skip the .xlsx report
        #[arg(long, conflicts_with = "out_dir")]
        no_export: bool,

        /// Exit non-zero when probable pairs need review
        #[arg(long)]
        strict: bool,
    },

    /// Validate a config without loading any data
    #[command(after_help = "\
Examples:
  conciliar validate enero.toml")]
    Validate {
        /// Path to the TOML config file
        config: PathBuf,
    },
}

pub struct RunOptions {
    pub json: bool,
    pub output: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub no_export: bool,
    pub strict: bool,
}

pub fn cmd_recon(cmd: ReconCommands) -> Result<(), CliError> {
    match cmd {
        ReconCommands::Run { config, json, output, out_dir, no_export, strict } => cmd_recon_run(
            config,
            RunOptions { json, output, out_dir, no_export, strict },
        ),
        ReconCommands::Validate { config } => cmd_recon_validate(config),
    }
}

#[derive(Serialize)]
struct RunMeta {
    config_name: String,
    engine_version: String,
    run_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    export: Option<String>,
}

#[derive(Serialize)]
struct RunReport<'a> {
    meta: RunMeta,
    #[serde(flatten)]
    result: &'a Reconciliation,
}

fn load_config(config_path: &Path) -> Result<ReconConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path).map_err(|e| {
        CliError::new(EXIT_RUNTIME, format!("cannot read config {}: {e}", config_path.display()))
    })?;
    ReconConfig::from_toml(&config_str).map_err(|e| CliError::new(EXIT_INVALID_CONFIG, e.to_string()))
}

fn base_dir(config_path: &Path) -> &Path {
    config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

fn load_side(base: &Path, label: &str, source: &SourceConfig) -> Result<Vec<RawMovement>, CliError> {
    let path = base.join(&source.file);
    log::debug!("loading {label} records from {}", path.display());
    load_movements(&path, source).map_err(|e| {
        let hint = match &e {
            IoError::MissingColumn { .. } => Some(format!("check [{label}.columns] in the config")),
            IoError::UnsupportedFormat { .. } => {
                Some("convert the file to csv or xlsx".to_string())
            }
            _ => None,
        };
        let err = CliError::new(EXIT_RUNTIME, format!("{label}: {e}"));
        match hint {
            Some(h) => err.with_hint(h),
            None => err,
        }
    })
}

fn cmd_recon_run(config_path: PathBuf, opts: RunOptions) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let base = base_dir(&config_path);

    let statement = load_side(base, "statement", &config.statement)?;
    let accounting = load_side(base, "accounting", &config.accounting)?;

    let result = reconcile(&statement, &accounting, &config.policy)
        .map_err(|e| CliError::new(recon_exit_code(&e), e.to_string()))?;

    let now: NaiveDateTime = Local::now().naive_local();

    let export = if opts.no_export {
        None
    } else {
        let export_config = ExportConfig {
            dir: opts.out_dir.clone().unwrap_or_else(|| base.join(&config.output.dir)),
            prefix: config.output.prefix.clone(),
        };
        let path = write_xlsx(&result, &export_config, now)
            .map_err(|e| CliError::new(EXIT_RUNTIME, e.to_string()))?;
        eprintln!("wrote {}", path.display());
        Some(path)
    };

    let json_file = opts
        .output
        .clone()
        .or_else(|| config.output.json.as_ref().map(|j| base.join(j)));

    if opts.json || json_file.is_some() {
        let report = RunReport {
            meta: RunMeta {
                config_name: config.name.clone(),
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                run_at: now.format("%Y-%m-%dT%H:%M:%S").to_string(),
                export: export.as_ref().map(|p| p.display().to_string()),
            },
            result: &result,
        };
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::new(EXIT_RUNTIME, format!("JSON serialization error: {e}")))?;

        if let Some(ref path) = json_file {
            std::fs::write(path, &json_str).map_err(|e| {
                CliError::new(EXIT_RUNTIME, format!("cannot write {}: {e}", path.display()))
            })?;
            eprintln!("wrote {}", path.display());
        }
        if opts.json {
            println!("{json_str}");
        }
    }

    let s = &result.summary;
    eprintln!(
        "'{}': {} statement / {} accounting record(s), {} matched, {} probable, {} statement-only, {} accounting-only",
        config.name,
        s.statement_total,
        s.accounting_total,
        s.matched,
        s.probable,
        s.statement_only,
        s.accounting_only,
    );

    if s.unmatched() > 0 {
        return Err(CliError::new(
            EXIT_UNMATCHED,
            format!("{} unmatched record(s)", s.unmatched()),
        ));
    }
    if opts.strict && s.probable > 0 {
        return Err(CliError::new(
            EXIT_PROBABLE,
            format!("{} probable pair(s) need review (--strict)", s.probable),
        ));
    }
    Ok(())
}

fn cmd_recon_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let p = &config.policy;
    eprintln!(
        "valid: '{}' ({} vs {}), window {} day(s), matched >= {}, probable >= {}",
        config.name,
        config.statement.file,
        config.accounting.file,
        p.date_window_days,
        p.matched_min_score,
        p.probable_min_score,
    );
    Ok(())
}
