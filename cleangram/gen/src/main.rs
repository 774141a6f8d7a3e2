//! cleangram code generator
//!
//! Reads the Telegram Bot API reference page and renders the cleangram
//! Python client library.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use cleangram_gen::config::GeneratorConfig;
use cleangram_gen::errors::GeneratorError;
use cleangram_gen::fetch::{DEFAULT_SOURCE, load_document};
use cleangram_gen::format::{CommandFormatter, Formatter, Passthrough};
use cleangram_gen::output::{GenerationSummary, generate_and_write};
use cleangram_schema::{Api, extract_api};

/// cleangram generator - turns the Bot API reference into a typed client
#[derive(Parser, Debug)]
#[command(name = "cleangram-gen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the client package
    Gen {
        /// URL or file path of the reference page
        #[arg(short, long, default_value = DEFAULT_SOURCE)]
        source: String,

        /// Output directory of the package
        #[arg(short, long, default_value = "cleangram")]
        output: PathBuf,

        /// Distribution name recorded in _version.py
        #[arg(long, default_value = "cleangram")]
        package: String,

        /// Column generated text is wrapped at
        #[arg(long, default_value_t = 79)]
        wrap_column: usize,

        /// Formatter command reading stdin and printing stdout (e.g. "black -q -")
        #[arg(long)]
        formatter: Option<String>,

        /// Log generated files without writing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Extract the schema and print a summary
    Parse {
        /// URL or file path of the reference page
        #[arg(short, long, default_value = DEFAULT_SOURCE)]
        source: String,

        /// Print the schema as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Initialize tracing subscriber based on verbosity and output format
fn init_tracing(verbose: u8, json: bool) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,cleangram_gen=info,cleangram_schema=info".to_string(),
            2 => "info,cleangram_gen=debug,cleangram_schema=debug".to_string(),
            _ => "debug,cleangram_gen=trace,cleangram_schema=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_file(verbose >= 3)
                    .with_line_number(verbose >= 3)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    }
}

async fn load_api(source: &str) -> Result<Api, GeneratorError> {
    let html = load_document(source).await?;
    Ok(extract_api(&html)?)
}

fn print_summary(summary: &GenerationSummary, dry_run: bool) {
    let action = if dry_run { "rendered" } else { "written" };
    println!(
        "{} {} files {}",
        "✓".green(),
        summary.succeeded.len(),
        action
    );

    if !summary.failed.is_empty() {
        println!("{} {} files failed:", "✗".red(), summary.failed.len());
        for (path, reason) in &summary.failed {
            println!("  {} {}", path.display().to_string().bold(), reason);
        }
    }
}

fn print_api(api: &Api) {
    println!("{} {}", "Bot API".bold(), api.version);
    for header in &api.headers {
        println!("\n{} ({})", header.name.bold(), header.components.len());
        for component in &header.components {
            let kind = if component.is_object() {
                "object".cyan()
            } else {
                "path".yellow()
            };
            println!("  {:<40} {} {} args", component.name, kind, component.args.len());
        }
    }
}

async fn run(cli: Cli) -> Result<bool, GeneratorError> {
    match cli.command {
        Commands::Gen {
            source,
            output,
            package,
            wrap_column,
            formatter,
            dry_run,
        } => {
            let config = GeneratorConfig {
                package,
                output,
                wrap_column,
                dry_run,
                formatter: formatter
                    .map(|command| command.split_whitespace().map(str::to_string).collect()),
                ..Default::default()
            };
            config.validate()?;

            let api = load_api(&source).await?;

            let command_formatter = config
                .formatter
                .as_deref()
                .and_then(CommandFormatter::from_command);
            let formatter: &dyn Formatter = match &command_formatter {
                Some(command) => command,
                None => &Passthrough,
            };

            let summary = generate_and_write(&api, &config, formatter)?;
            print_summary(&summary, config.dry_run);
            Ok(summary.is_success())
        }
        Commands::Parse { source, json } => {
            let api = load_api(&source).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&api)?);
            } else {
                print_api(&api);
            }
            Ok(true)
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
