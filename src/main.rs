use clap::{Parser, Subcommand};
use fmtcodec::file::{format_of, read_value, write_value};
use fmtcodec::{default_registry, Encoding};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fmtcodec", about = "Convert between structured data formats")]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a file and re-encode it in another format
    Convert {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Input format (default: input file extension)
        #[arg(long)]
        from: Option<String>,
        /// Output format (default: output file extension)
        #[arg(long)]
        to: Option<String>,
    },
    /// Decode a file and print it as JSON
    Show {
        input: PathBuf,
        /// Input format (default: file extension)
        #[arg(long)]
        from: Option<String>,
    },
    /// List the supported formats
    Formats,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let registry = default_registry();

    match cli.command {

        // ── Convert ──────────────────────────────────────────────────────────
        Commands::Convert { input, output, from, to } => {
            let from = format_of(&input, from.as_deref())?;
            let to = format_of(&output, to.as_deref())?;
            let value = read_value(registry, &input, Some(from.as_str()))?;
            write_value(registry, &value, &output, Some(to.as_str()))?;
            println!("{} ({}) → {} ({})", input.display(), from, output.display(), to);
        }

        // ── Show ─────────────────────────────────────────────────────────────
        Commands::Show { input, from } => {
            let value = read_value(registry, &input, from.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }

        // ── Formats ──────────────────────────────────────────────────────────
        Commands::Formats => {
            println!("{:<8} {:<8} {:<8}", "Format", "Encoding", "Reviver");
            for name in registry.formats() {
                let Some(codec) = registry.get(name) else { continue };
                let encoding = match codec.encoding() {
                    Encoding::Utf8   => "utf8",
                    Encoding::Binary => "binary",
                };
                let reviver = if codec.supports_reviver() { "yes" } else { "no" };
                println!("{:<8} {:<8} {:<8}", name, encoding, reviver);
            }
        }
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
