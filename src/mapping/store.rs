use anyhow::{bail, Context, Result};
use std::{fs, path::Path};
use tracing::info;

use super::FieldMapping;

/// Load a mapping from a `.yaml`/`.yml` or `.json` file.
/// Keys missing from the file keep their basic-preset defaults.
pub fn load_mapping<P: AsRef<Path>>(path: P) -> Result<FieldMapping> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;

    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let mapping: FieldMapping = match ext.as_str() {
        "json" => serde_json::from_str(&text).with_context(|| format!("parsing {:?}", path))?,
        "yaml" | "yml" => {
            serde_yaml::from_str(&text).with_context(|| format!("parsing {:?}", path))?
        }
        other => bail!("unsupported mapping file extension `{}` for {:?}", other, path),
    };

    mapping
        .validate()
        .with_context(|| format!("invalid mapping in {:?}", path))?;
    info!(path = %path.display(), columns = mapping.width(), "loaded field mapping");
    Ok(mapping)
}

/// Render a mapping as YAML, the format `load_mapping` reads back.
pub fn mapping_to_yaml(mapping: &FieldMapping) -> Result<String> {
    serde_yaml::to_string(mapping).context("serializing field mapping")
}
