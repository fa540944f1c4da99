//! Engine-facing output document.
//!
//! ```yaml
//! Blocks:
//!   - Id: a
//!     Name: Source
//!     BlockType: BasicCpp
//!     BlockClass: BasicBlocks/Constant
//!     Value: "1.0"
//! Links:
//!   - Id: L1
//!     Name: L1
//!     SourceBlockId: a
//!     SourcePortIdx: 0
//!     DestinationBlockId: b
//!     DestinationPortIdx: 0
//! ```
//!
//! Block properties follow the four fixed keys in insertion order; a
//! property named like a fixed key is dropped.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::low_level::{LowLevelBlock, LowLevelLink, LowLevelStructure};

const BLOCK_KEYS: [&str; 4] = ["Id", "Name", "BlockType", "BlockClass"];

impl LowLevelStructure {
    /// Render the structure as a generic document, formatting every typed
    /// property for the engine.
    pub fn to_document(&self) -> Value {
        let mut doc = Map::new();
        doc.insert(
            "Blocks".to_string(),
            Value::Array(self.blocks.iter().map(block_document).collect()),
        );
        doc.insert(
            "Links".to_string(),
            Value::Array(self.links.iter().map(link_document).collect()),
        );
        Value::Object(doc)
    }

    pub fn to_yaml_string(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.to_document())
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_document())
    }

    /// SHA-256 over the compact JSON rendering. Equal for structurally
    /// identical outputs.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();

        let json = serde_json::to_string(&self.to_document()).unwrap_or_default();
        hasher.update(json.as_bytes());

        let result = hasher.finalize();
        format!("{:x}", result)
    }
}

fn block_document(block: &LowLevelBlock) -> Value {
    let mut map = Map::new();
    map.insert("Id".to_string(), Value::String(block.id.clone()));
    map.insert("Name".to_string(), Value::String(block.name.clone()));
    map.insert("BlockType".to_string(), Value::String(block.block_type.clone()));
    map.insert("BlockClass".to_string(), Value::String(block.block_class.clone()));
    for (name, value) in &block.properties {
        if BLOCK_KEYS.contains(&name.as_str()) {
            continue;
        }
        map.insert(name.clone(), value.engine_value());
    }
    Value::Object(map)
}

fn link_document(link: &LowLevelLink) -> Value {
    let mut map = Map::new();
    map.insert("Id".to_string(), Value::String(link.id.clone()));
    map.insert("Name".to_string(), Value::String(link.name.clone()));
    map.insert("SourceBlockId".to_string(), Value::String(link.source_block_id.clone()));
    map.insert("SourcePortIdx".to_string(), Value::from(link.source_port));
    map.insert(
        "DestinationBlockId".to_string(),
        Value::String(link.destination_block_id.clone()),
    );
    map.insert("DestinationPortIdx".to_string(), Value::from(link.destination_port));
    Value::Object(map)
}
