/*!
Reencode command - decode CBOR and write the tree back out
*/

use super::io::{Input, Output};
use anyhow::Context;
use clap::Parser;
use tracing::*;

/// Decode and re-encode CBOR data
#[derive(Parser, Debug)]
#[command(
    about = "Decode CBOR data and encode it again",
    long_about = "Decode CBOR data and encode it again.\n\n\
                  Heads are rewritten at their shortest width and every float is written \
                  as an 8-byte double, so the output may differ from the input."
)]
pub struct Command {
    /// Write hex instead of binary
    #[arg(long)]
    hex: bool,

    /// Output file (default: stdout)
    #[arg(short = 'o', long)]
    output: Option<Output>,

    /// Input CBOR file (use '-' for stdin)
    input: Input,
}

impl Command {
    pub fn exec(self) -> anyhow::Result<()> {
        let data = self.input.read_all()?;
        let doc = cbor_tree::decode(&data)
            .with_context(|| format!("Failed to decode {}", self.input))?;
        let encoded = doc.root().to_vec().context("Failed to encode")?;

        if encoded == data {
            info!("{}: {} bytes, unchanged", self.input, data.len());
        } else {
            info!(
                "{}: {} bytes re-encoded as {} bytes",
                self.input,
                data.len(),
                encoded.len()
            );
        }

        let output = self.output.unwrap_or_default();
        if self.hex {
            output.write_str(&hex::encode(&encoded))?;
        } else {
            output.write_all(&encoded)?;
        }
        Ok(())
    }
}
