#![forbid(unsafe_code)]

use allowlist::{
    AllowlistConfig, AllowlistService, AllowlistTree, EncodingScheme, LeafEncoder, QueryOutcome,
    server,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "allowlist")]
#[command(about = "RewardCrate whitelist Merkle tools", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML config file (values also read from ALLOWLIST_* env vars)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// JSON allocation list, overrides the config file
    #[arg(short, long, global = true)]
    allocations: Option<PathBuf>,

    /// Leaf encoding: concat, packed or standard
    #[arg(short, long, global = true)]
    encoding: Option<EncodingScheme>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the Merkle root
    Root,
    /// Look up an address and print its proof as JSON
    Proof {
        #[arg(long)]
        address: String,
        #[arg(long)]
        token_id: String,
    },
    /// Derive and verify a proof for every allocation entry
    Check,
    /// Write the tree layers as JSON
    Dump {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the tree
    Render,
    /// Serve the whitelist proof API
    Serve {
        #[arg(short, long)]
        listen: Option<String>,
    },
}

fn write_file_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir).context("Failed to create temp file")?;
    file.write_all(contents.as_bytes())
        .context("Failed to write to temp file")?;
    file.as_file()
        .sync_all()
        .context("Failed to sync temp file")?;
    file.persist(path)
        .map_err(|e| e.error)
        .context("Failed to move temp file to output")?;
    Ok(())
}

fn check(service: &AllowlistService) -> Result<()> {
    let allocations = service.allocations();
    let tree = service.tree()?;
    let encoding = service.encoding();

    println!("Root: {}", tree.root_hex());
    println!("Entries: {}\n", allocations.len());

    let mut failures = 0usize;
    for (i, entry) in allocations.iter().enumerate() {
        let leaf = encoding.leaf_hash(entry)?;
        let proof = tree.proof(i)?;
        let valid = AllowlistTree::verify(&tree.root(), &leaf, &proof);
        println!(
            "[{}] {} token {} x{} -> {} ({} nodes)",
            i,
            entry.address,
            entry.token_id,
            entry.amount,
            if valid { "ok" } else { "INVALID" },
            proof.len()
        );
        if !valid {
            failures += 1;
        }
    }

    for (address, token_id) in allocations.duplicates() {
        warn!(%address, token_id, "duplicate allocation; only the first entry is reachable");
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} proofs failed to verify", allocations.len());
    }
    println!("\nAll {} proofs verify.", allocations.len());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config =
        AllowlistConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(path) = cli.allocations {
        config = config.with_allocations(path);
    }
    if let Some(encoding) = cli.encoding {
        config = config.with_encoding(encoding);
    }

    let allocations = config
        .load_allocations()
        .context("Failed to load allocation list")?;
    info!(
        entries = allocations.len(),
        encoding = %config.encoding,
        source = ?config.allocations,
        "loaded allocations"
    );
    let service = AllowlistService::new(allocations, config.encoding)
        .with_tree_cache(config.cache_trees);

    match cli.command {
        Commands::Root => println!("{}", service.root()?),
        Commands::Proof { address, token_id } => {
            let outcome = service
                .query(Some(address.as_str()), Some(token_id.as_str()))
                .context("Invalid query")?;
            if let QueryOutcome::NotFound { message } = &outcome {
                info!(%address, %token_id, "{message}");
            }
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Check => check(&service)?,
        Commands::Dump { output } => {
            let data = service.tree()?.dump(service.encoding());
            let json = serde_json::to_string_pretty(&data).context("Failed to serialize tree")?;
            match output {
                Some(path) => {
                    write_file_atomic(&path, &json).context("Failed to write tree file")?;
                    info!(path = %path.display(), "tree written");
                }
                None => println!("{json}"),
            }
        }
        Commands::Render => println!("{}", service.tree()?.render()),
        Commands::Serve { listen } => {
            let listen = listen.unwrap_or_else(|| config.listen.clone());
            server::serve(&listen, Arc::new(service))
                .await
                .context("Server error")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_file_atomic_leaves_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("tree.json");
        let sibling = dir.path().join("tree.tmp");
        std::fs::write(&sibling, "keep").unwrap();

        write_file_atomic(&output, "{\"root\":\"0x00\"}").unwrap();
        write_file_atomic(&output, "{\"root\":\"0x01\"}").unwrap();

        assert_eq!(std::fs::read_to_string(&output).unwrap(), "{\"root\":\"0x01\"}");
        assert_eq!(std::fs::read_to_string(&sibling).unwrap(), "keep");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_write_file_atomic_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("missing").join("tree.json");
        assert!(write_file_atomic(&output, "{}").is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
