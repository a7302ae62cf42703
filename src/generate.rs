use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use whitelist_cli::{build_whitelist_data, read_address_list, write_file_atomic};

#[derive(Parser, Debug)]
#[command(name = "generate")]
#[command(about = "Build Merkle tree and proofs from a whitelist", long_about = None)]
pub struct Cli {
    /// Input file containing whitelist addresses (one per line)
    #[arg(short, long)]
    input: PathBuf,

    /// Output JSON file for the root and proofs
    #[arg(short, long, default_value = "merkle_data.json")]
    output: PathBuf,
}

pub fn run(cli: Cli) -> Result<()> {
    println!("Reading addresses from {:?}...", cli.input);
    let addresses = read_address_list(&cli.input)?;
    println!("Total addresses: {}", addresses.len());

    println!("Building Merkle tree...");
    let data = build_whitelist_data(&addresses).context("Failed to build Merkle tree")?;

    println!("Merkle root: {}", data.root);

    let json_output = serde_json::to_string_pretty(&data).context("Failed to serialize JSON")?;
    write_file_atomic(&cli.output, &json_output).context("Failed to write output file")?;

    println!("Merkle data saved to {:?}", cli.output);
    Ok(())
}
