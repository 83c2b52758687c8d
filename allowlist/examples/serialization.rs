//! Serialization example.
//!
//! Dumps a tree to JSON and loads it back, e.g. to publish the layers next
//! to the root the contract is configured with.
//!
//! Run: `cargo run --example serialization`

use allowlist::{AllocationList, AllowlistTree, AllowlistTreeData, EncodingScheme};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

fn main() -> Result<()> {
    let allocations = AllocationList::default_fixture()?;

    for scheme in EncodingScheme::ALL {
        let tree = AllowlistTree::from_allocations(&allocations, &scheme)?;
        println!("[{scheme}] root: {}", tree.root_hex());

        let json = serde_json::to_string_pretty(&tree.dump(scheme))?;
        let data: AllowlistTreeData = serde_json::from_str(&json)?;
        let loaded = AllowlistTree::load(&data)?;

        println!("[{scheme}] loaded root: {}", loaded.root_hex());
        assert_eq!(tree.root(), loaded.root());
    }

    Ok(())
}
