/*!
CBOR Tools - A CLI for working with CBOR data through the node tree

# Commands

- `inspect`: Decode CBOR data and display it as a tree outline, JSON or hex
- `reencode`: Decode CBOR data and write it back out with minimal heads

# Examples

```bash
# Show the decoded tree
cbor inspect data.cbor

# Inspect as JSON (lossy)
cbor inspect --format json data.cbor

# Normalise a file, logging whether anything changed
cbor --log-level debug reencode data.cbor -o normal.cbor
```
*/

use clap::{Parser, Subcommand};

mod inspect;
mod io;
mod reencode;

/// A CLI tool for working with CBOR data
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "A CLI tool for inspecting and re-encoding CBOR data",
    long_about = "Decodes CBOR (Concise Binary Object Representation) data into a tree of nodes.\n\n\
                  Features:\n\
                  - Inspect the decoded tree in human-readable formats\n\
                  - Re-encode data with minimal-width heads\n\
                  - Decode failures report the error kind and byte offset"
)]
struct Cli {
    /// Logging verbosity: off, error, warn, info, debug or trace
    #[arg(long, global = true, default_value = "info", value_name = "LEVEL")]
    log_level: tracing_subscriber::filter::LevelFilter,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode and display CBOR data in various formats
    Inspect(inspect::Command),

    /// Decode CBOR data and encode it again
    Reencode(reencode::Command),
}

fn init_logger(log_level: tracing_subscriber::filter::LevelFilter) {
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(
            log_level > tracing_subscriber::filter::LevelFilter::from_level(tracing::Level::INFO),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(cli.log_level);

    match cli.command {
        Commands::Inspect(args) => args.exec(),
        Commands::Reencode(args) => args.exec(),
    }
}
