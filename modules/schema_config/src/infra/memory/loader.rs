//! Loading installed schema definitions from YAML files

use crate::contract::{Result, SchemaDefinition};
use std::fs;
use std::path::Path;

/// Parse every `*.yaml` / `*.yml` file in `dir`, in file name order.
///
/// A missing directory yields no schemas.
pub fn load_schema_dir(dir: &Path) -> Result<Vec<SchemaDefinition>> {
    if !dir.is_dir() {
        tracing::warn!(dir = %dir.display(), "Schema directory not found, skipping");
        return Ok(Vec::new());
    }

    let mut files: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && matches!(
                    path.extension().and_then(|e| e.to_str()),
                    Some("yaml") | Some("yml")
                )
        })
        .collect();
    files.sort();

    let mut definitions = Vec::with_capacity(files.len());
    for path in files {
        definitions.push(load_schema_file(&path)?);
    }

    tracing::debug!(dir = %dir.display(), count = definitions.len(), "Loaded schema definitions");
    Ok(definitions)
}

/// Parse a single schema definition file
pub fn load_schema_file(path: &Path) -> Result<SchemaDefinition> {
    let content = fs::read_to_string(path)?;
    let definition: SchemaDefinition = serde_yaml::from_str(&content)?;
    Ok(definition)
}
