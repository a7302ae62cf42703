use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

use whitelist_cli::{hash_leaf, hex_encode, read_address_list, write_file_atomic, MerkleTree};

#[derive(Parser, Debug)]
#[command(name = "prove")]
#[command(about = "Derive the inclusion proof for a single address", long_about = None)]
pub struct Cli {
    /// Input file containing whitelist addresses (one per line)
    #[arg(short, long)]
    input: PathBuf,

    /// Address to prove membership for (matched exactly as written)
    #[arg(short, long)]
    address: String,

    /// Output JSON file for the proof
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Debug, Serialize)]
struct ProofOutput {
    root: String,
    address: String,
    leaf: String,
    proof: Vec<String>,
}

pub fn run(cli: Cli) -> Result<()> {
    println!("Reading addresses from {:?}...", cli.input);
    let addresses = read_address_list(&cli.input)?;

    println!("Building Merkle tree...");
    let leaves = addresses.iter().map(|addr| hash_leaf(addr)).collect();
    let tree = MerkleTree::from_leaves(leaves).context("Failed to build Merkle tree")?;

    println!("Generating Merkle proof...");
    let leaf = hash_leaf(&cli.address);
    let proof = tree
        .proof_for_leaf(&leaf)
        .with_context(|| format!("No proof for address {}", cli.address))?;

    let output = ProofOutput {
        root: hex_encode(tree.root()),
        address: cli.address,
        leaf: hex_encode(leaf),
        proof: proof.iter().copied().map(hex_encode).collect(),
    };

    println!("Writing proof to {:?}...", cli.output);
    let json_output = serde_json::to_string_pretty(&output).context("Failed to serialize JSON")?;
    write_file_atomic(&cli.output, &json_output).context("Failed to write proof file")?;

    println!("\nProof generated successfully!");
    println!("Merkle root: {}", output.root);
    println!("Proof length: {} nodes", output.proof.len());

    Ok(())
}
