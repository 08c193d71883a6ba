//! Writes rendered templates to disk.
//!
//! Writes go to a temporary file in the destination directory which is then
//! renamed over the destination, so a reader sees either the old content or
//! the new content, never a partial file. A replaced file keeps its
//! permissions; a new one gets the same mode `File::create` would give it.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{Result, StackupError};

use super::spec::{ConflictPolicy, TemplateSpec};

/// What [`emit`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitOutcome {
    /// The destination did not exist and was created.
    Written(PathBuf),
    /// The destination already held exactly the rendered content.
    Unchanged(PathBuf),
    /// The destination differs and the policy is `Skip`.
    Skipped(PathBuf),
    /// The destination was replaced.
    Overwritten(PathBuf),
    /// The old content was saved to `backup` and the destination replaced.
    BackedUp { path: PathBuf, backup: PathBuf },
}

impl EmitOutcome {
    /// Whether the destination was modified.
    pub fn changed(&self) -> bool {
        matches!(
            self,
            Self::Written(_) | Self::Overwritten(_) | Self::BackedUp { .. }
        )
    }
}

/// Backup location for `path`: the same name with `.bak` appended.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

/// Render `spec` with only its own values and write it under `root`.
pub fn emit(spec: &TemplateSpec, root: &Path) -> Result<EmitOutcome> {
    emit_with(spec, root, &BTreeMap::new())
}

/// Render `spec` over `base` values and write it under `root`.
///
/// Rendering happens before the filesystem is touched, so an authoring
/// error leaves everything as it was.
pub fn emit_with(
    spec: &TemplateSpec,
    root: &Path,
    base: &BTreeMap<String, String>,
) -> Result<EmitOutcome> {
    let rendered = spec.render_over(base)?;
    let dest = root.join(spec.destination());

    if dest.is_dir() {
        return Err(StackupError::io_at(
            &dest,
            std::io::Error::other("destination is a directory"),
        ));
    }

    if !dest.exists() {
        write_atomic(&dest, &rendered)?;
        tracing::debug!("Wrote {}", dest.display());
        return Ok(EmitOutcome::Written(dest));
    }

    let existing = std::fs::read(&dest).map_err(|e| StackupError::io_at(&dest, e))?;
    if existing == rendered.as_bytes() {
        return Ok(EmitOutcome::Unchanged(dest));
    }

    match spec.policy() {
        ConflictPolicy::Skip => {
            tracing::debug!("Keeping existing {}", dest.display());
            Ok(EmitOutcome::Skipped(dest))
        }
        ConflictPolicy::Overwrite => {
            write_atomic(&dest, &rendered)?;
            Ok(EmitOutcome::Overwritten(dest))
        }
        ConflictPolicy::BackupThenOverwrite => {
            let backup = backup_path(&dest);
            std::fs::copy(&dest, &backup).map_err(|e| StackupError::io_at(&backup, e))?;
            write_atomic(&dest, &rendered)?;
            tracing::info!("Backed up {} to {}", dest.display(), backup.display());
            Ok(EmitOutcome::BackedUp { path: dest, backup })
        }
    }
}

/// Replace `dest` with `content` via a temporary file and rename.
pub fn write_atomic(dest: &Path, content: &str) -> Result<()> {
    let parent = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| StackupError::io_at(parent, e))?;
    let previous = std::fs::metadata(dest).ok().map(|m| m.permissions());

    let mut temp = temp_file_in(parent).map_err(|e| StackupError::io_at(parent, e))?;
    temp.write_all(content.as_bytes())
        .and_then(|_| match previous {
            Some(permissions) => temp.as_file().set_permissions(permissions),
            None => Ok(()),
        })
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| StackupError::io_at(temp.path(), e))?;
    temp.persist(dest)
        .map_err(|e| StackupError::io_at(dest, e.error))?;
    Ok(())
}

/// Temporary file created with mode 0666 less the umask.
#[cfg(unix)]
fn temp_file_in(dir: &Path) -> std::io::Result<NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;

    tempfile::Builder::new()
        .permissions(std::fs::Permissions::from_mode(0o666))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn temp_file_in(dir: &Path) -> std::io::Result<NamedTempFile> {
    NamedTempFile::new_in(dir)
}
