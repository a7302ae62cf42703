use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

use whitelist_cli::{hash_leaf, parse_digest, verify_proof, WhitelistData};

#[derive(Parser, Debug)]
#[command(name = "verify")]
#[command(about = "Re-verify every proof in a Merkle data file", long_about = None)]
pub struct Cli {
    /// Merkle data JSON file produced by `generate`
    #[arg(short, long)]
    data: PathBuf,
}

/// Recomputes the root from every stored proof; returns the number of
/// verified addresses, or an error on the first mismatch.
fn verify_data(data: &WhitelistData) -> Result<usize> {
    let root = parse_digest(&data.root).context("Invalid root digest")?;

    for (address, proof_hex) in &data.proofs {
        let mut proof = Vec::with_capacity(proof_hex.len());
        for entry in proof_hex {
            proof.push(
                parse_digest(entry)
                    .with_context(|| format!("Invalid proof entry for address {}", address))?,
            );
        }

        let leaf = hash_leaf(address);
        if !verify_proof(&leaf, &proof, &root) {
            anyhow::bail!("Proof for address {} does not match the root", address);
        }
    }

    Ok(data.proofs.len())
}

pub fn run(cli: Cli) -> Result<()> {
    println!("Loading Merkle data from {:?}...", cli.data);
    let content = fs::read_to_string(&cli.data).context("Failed to read data file")?;
    let data: WhitelistData =
        serde_json::from_str(&content).context("Failed to parse data JSON")?;

    let verified = verify_data(&data)?;

    println!("Merkle root: {}", data.root);
    println!("All {} proofs verified", verified);
    Ok(())
}
