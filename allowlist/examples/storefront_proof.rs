//! Whitelist mint example.
//!
//! Builds the tree over the storefront allocation list, looks up one wallet
//! and checks the proof the way the mint contract would.
//!
//! Run: `cargo run --example storefront_proof`

use allowlist::{
    AllocationEntry, AllocationList, AllowlistService, AllowlistTree, EncodingScheme, LeafEncoder,
    QueryOutcome,
};

fn main() -> allowlist::Result<()> {
    let allocations = AllocationList::default_fixture()?;
    let service = AllowlistService::new(allocations, EncodingScheme::Concat);

    println!("=== RewardCrate Allowlist ===\n");
    println!("Root: {}", service.root()?);
    println!("Entries: {}\n", service.allocations().len());

    let wallet = "0xf01f3c8e6b2d4a97c5e0b1d8a3f6c2e9b7d504ad";
    match service.query(Some(wallet), Some("1"))? {
        QueryOutcome::Found { amount, proof, root } => {
            println!("{wallet} may mint {amount} of token 1");
            println!("Proof:");
            for (i, hash) in proof.iter().enumerate() {
                println!("  [{i}] {hash}");
            }

            let leaf = EncodingScheme::Concat.leaf_hash(&AllocationEntry::new(wallet, 1, amount))?;
            let valid = AllowlistTree::verify_hex(&root, &leaf, &proof)?;
            println!("\nProof valid: {valid}");
        }
        QueryOutcome::NotFound { message } => println!("{wallet}: {message}"),
    }

    let stranger = "0x0000000000000000000000000000000000000000";
    let outcome = service.query(Some(stranger), Some("1"))?;
    println!("\n{stranger} whitelisted: {}", outcome.is_whitelisted());

    println!("\n=== Tree Structure ===\n");
    println!("{}", service.tree()?.render());

    Ok(())
}
