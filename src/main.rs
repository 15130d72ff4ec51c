//! mhdb CLI: spreadsheet-to-OWL/Turtle ontology compiler.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result};

use mhdb::config::Config;
use mhdb::pipeline::{self, OutputFormat};
use mhdb::table::Workbook;

#[derive(Parser)]
#[command(name = "mhdb", version, about = "Spreadsheet-to-OWL/Turtle ontology compiler")]
struct Cli {
    /// Path to the project config file.
    #[arg(long, global = true, default_value = "mhdb.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert the configured workbooks into an ontology document.
    Convert {
        /// Output path for the main document.
        #[arg(long, default_value = "mhdb.ttl")]
        output: PathBuf,

        /// Output encoding.
        #[arg(long, value_enum, default_value_t = Emit::Turtle)]
        emit: Emit,

        /// Parse the generated document back through oxigraph and report
        /// the triple count.
        #[arg(long)]
        validate: bool,
    },

    /// Show the configured sources and their sheet statistics.
    Info,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Emit {
    Turtle,
    Json,
}

impl From<Emit> for OutputFormat {
    fn from(emit: Emit) -> Self {
        match emit {
            Emit::Turtle => OutputFormat::Turtle,
            Emit::Json => OutputFormat::Json,
        }
    }
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config).into_diagnostic()?;

    match cli.command {
        Commands::Convert {
            output,
            emit,
            validate,
        } => {
            let summary =
                pipeline::run(&config, &output, emit.into(), validate).into_diagnostic()?;

            println!(
                "Wrote {} ({} subjects, {} triples, {} bytes; {}).",
                output.display(),
                summary.subjects,
                summary.triples,
                summary.bytes,
                summary.report
            );
            if let Some(parsed) = summary.parsed_triples {
                println!("Validated: oxigraph parsed {parsed} triples back.");
            }
            if let Some(states) = summary.states {
                println!(
                    "Wrote {} ({} bytes; {}).",
                    states.output.display(),
                    states.bytes,
                    states.report
                );
                if let Some(parsed) = states.parsed_triples {
                    println!("Validated: oxigraph parsed {parsed} triples back.");
                }
            }
        }

        Commands::Info => {
            println!("Ontology: {}", config.ontology.label);
            println!("  base URI: {}", config.ontology.base_uri);
            println!("  version:  {}", config.ontology.version);
            println!("  prefixes: {}", config.prefix_table().len());

            let sources = [
                ("behaviors", config.sources.behaviors.as_deref()),
                ("mentalhealth", config.sources.mentalhealth.as_deref()),
                ("technology", config.sources.technology.as_deref()),
                ("states", config.states.as_ref().map(|s| s.workbook.as_path())),
            ];
            for (role, path) in sources {
                match path {
                    Some(path) => {
                        let workbook = Workbook::load(path).into_diagnostic()?;
                        println!("Source \"{role}\": {}", path.display());
                        for sheet in workbook.sheet_names() {
                            let table = workbook.sheet(sheet).into_diagnostic()?;
                            println!(
                                "  {sheet}: {} rows, {} columns",
                                table.len(),
                                table.columns().len()
                            );
                        }
                    }
                    None => println!("Source \"{role}\": not configured"),
                }
            }
        }
    }

    Ok(())
}
