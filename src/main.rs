use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod adherence;
mod config;
mod error;
mod filter;
mod ingest;
mod models;
mod pipeline;
mod report;
mod schema;
mod session;

use ingest::InputFormat;
use pipeline::FilterRequest;
use session::AllowList;

#[derive(Parser)]
#[command(name = "adherence-dashboard")]
#[command(about = "Schedule adherence dashboard for call-center schedule exports", long_about = None)]
struct Cli {
    #[arg(long, global = true, env = "ADHERENCE_USERNAME")]
    username: Option<String>,
    #[arg(long, global = true, env = "ADHERENCE_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    /// TOML config file; defaults to ./adherence.toml when present
    #[arg(long, global = true, env = "ADHERENCE_CONFIG")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the week, day and date filters a dataset offers
    Options {
        #[arg(long)]
        file: PathBuf,
    },
    /// Build the adherence dashboard for one filter selection
    Report {
        #[arg(long)]
        file: PathBuf,
        #[arg(long = "week")]
        weeks: Vec<String>,
        #[arg(long = "day")]
        days: Vec<String>,
        /// Day-first, e.g. 03/04/2025 for 3 April; defaults to the earliest date
        #[arg(long, value_parser = parse_cli_date)]
        date: Option<NaiveDate>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Markdown,
    Json,
}

fn parse_cli_date(value: &str) -> Result<NaiveDate, String> {
    schema::parse_date(value).ok_or_else(|| format!("'{value}' is not a date (use DD/MM/YYYY)"))
}

fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(file: &Path) -> anyhow::Result<(Vec<u8>, InputFormat)> {
    let format = InputFormat::from_path(file)?;
    let bytes = std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    Ok((bytes, format))
}

fn log_pipeline_error(err: &error::PipelineError) {
    tracing::error!(recoverable = err.is_recoverable(), "{err}");
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref(), Path::new(config::DEFAULT_CONFIG_FILE))?;
    init_logging(&config.log_filter);

    let (Some(username), Some(password)) = (cli.username.as_deref(), cli.password.as_deref()) else {
        anyhow::bail!("login required: pass --username and --password");
    };
    let session = session::login(&AllowList::default(), username, password)?;

    match cli.command {
        Commands::Options { file } => {
            let (bytes, format) = read_input(&file)?;
            let options = pipeline::inspect(&bytes, format).inspect_err(log_pipeline_error)?;
            print!("{}", report::build_options(&options));
        }
        Commands::Report {
            file,
            weeks,
            days,
            date,
            format: output_format,
            out,
        } => {
            let (bytes, format) = read_input(&file)?;
            let request = FilterRequest { weeks, days, date };
            let dashboard =
                pipeline::run(&bytes, format, &request).inspect_err(log_pipeline_error)?;

            let rendered = match output_format {
                OutputFormat::Markdown => {
                    report::build_report(Some(&session.username), &dashboard, &config.report)
                }
                OutputFormat::Json => report::build_json(&dashboard)?,
            };

            match out {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Report written to {}.", path.display());
                }
                None => print!("{rendered}"),
            }
        }
    }

    session.logout();
    Ok(())
}
