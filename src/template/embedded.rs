//! Starter-project templates embedded at compile time.

use include_dir::{include_dir, Dir};
use serde::Deserialize;

use crate::error::{Result, StackupError};

use super::spec::{ConflictPolicy, TemplateSpec};

/// Embedded templates directory.
static TEMPLATES_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/templates");

const MANIFEST: &str = "manifest.yml";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Manifest {
    files: Vec<ManifestEntry>,
}

/// One embedded template and where it lands in the project.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestEntry {
    /// Path inside the embedded directory.
    pub source: String,
    /// Path relative to the project root.
    pub destination: String,
}

fn embedded_text(path: &str) -> Result<&'static str> {
    let file = TEMPLATES_DIR
        .get_file(path)
        .ok_or_else(|| StackupError::TemplateAuthoring {
            template: path.to_string(),
            message: "not embedded".to_string(),
        })?;
    file.contents_utf8()
        .ok_or_else(|| StackupError::TemplateAuthoring {
            template: path.to_string(),
            message: "invalid UTF-8".to_string(),
        })
}

/// Load the embedded manifest.
pub fn manifest() -> Result<Vec<ManifestEntry>> {
    let content = embedded_text(MANIFEST)?;
    let manifest: Manifest =
        serde_yaml::from_str(content).map_err(|e| StackupError::TemplateAuthoring {
            template: MANIFEST.to_string(),
            message: e.to_string(),
        })?;
    Ok(manifest.files)
}

/// Every embedded template as a spec with the given conflict policy.
///
/// Placeholders are left for the plan runner to fill from the project
/// context.
pub fn starter_templates(policy: ConflictPolicy) -> Result<Vec<TemplateSpec>> {
    manifest()?
        .into_iter()
        .map(|entry| {
            let content = embedded_text(&entry.source)?;
            Ok(TemplateSpec::new(entry.destination, content).on_conflict(policy))
        })
        .collect()
}
