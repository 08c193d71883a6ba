//! Installer that clones a git repository.

use std::path::{Path, PathBuf};

use crate::context::ProjectContext;
use crate::error::{InstallError, Result, StackupError};
use crate::shell::HostEnv;

use super::{CommandInstaller, Installer};

/// Clones `url` into `dest` with a shallow history.
///
/// A completed clone is recognised by a sentinel file inside `dest`. A
/// destination without the sentinel is removed and cloned again only when
/// it is an empty directory or a lone `.git` whose `HEAD` does not resolve,
/// the states an interrupted `git clone` leaves behind. Anything else
/// belongs to the user and is reported instead of touched.
#[derive(Debug, Clone)]
pub struct GitCloneInstaller {
    url: String,
    dest: PathBuf,
    sentinel: PathBuf,
}

impl GitCloneInstaller {
    /// Clone `url` into `dest`; `sentinel` is relative to `dest`.
    pub fn new(
        url: impl Into<String>,
        dest: impl Into<PathBuf>,
        sentinel: impl Into<PathBuf>,
    ) -> Self {
        Self {
            url: url.into(),
            dest: dest.into(),
            sentinel: sentinel.into(),
        }
    }

    /// Where the repository lands.
    pub fn dest(&self) -> &Path {
        &self.dest
    }

    /// Path whose existence marks a complete clone.
    pub fn sentinel_path(&self) -> PathBuf {
        self.dest.join(&self.sentinel)
    }

    fn is_failed_clone(&self, host: &HostEnv<'_>, dest: &Path) -> bool {
        let entries: Vec<_> = match std::fs::read_dir(dest) {
            Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.file_name()).collect(),
            Err(e) => {
                tracing::debug!("Cannot list {}: {}", dest.display(), e);
                return false;
            }
        };
        match entries.as_slice() {
            [] => true,
            [only] if only == ".git" => {
                let args = ["rev-parse", "--verify", "--quiet", "HEAD"].map(String::from);
                match host.run("git", &args, Some(dest)) {
                    Ok(result) => !result.success,
                    Err(e) => {
                        tracing::debug!("git rev-parse failed to start: {}", e);
                        false
                    }
                }
            }
            _ => false,
        }
    }
}

impl Installer for GitCloneInstaller {
    fn describe(&self) -> String {
        format!("git clone {} {}", self.url, self.dest.display())
    }

    fn execute(&self, host: &mut HostEnv<'_>, ctx: &ProjectContext) -> Result<()> {
        let dest = ctx.resolve(&self.dest);
        if ctx.resolve(&self.sentinel_path()).exists() {
            tracing::debug!("{} already cloned", dest.display());
            return Ok(());
        }

        if dest.exists() {
            if !self.is_failed_clone(host, &dest) {
                return Err(InstallError::DestinationOccupied {
                    path: dest,
                    url: self.url.clone(),
                }
                .into());
            }
            if !host.network_available() {
                return Err(InstallError::NetworkUnavailable {
                    detail: format!("cannot re-clone {}", self.url),
                }
                .into());
            }
            tracing::warn!("Removing interrupted clone at {}", dest.display());
            std::fs::remove_dir_all(&dest).map_err(|e| StackupError::io_at(&dest, e))?;
        }

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StackupError::io_at(parent, e))?;
        }

        CommandInstaller::new(
            "git",
            [
                "clone".to_string(),
                "--depth".to_string(),
                "1".to_string(),
                self.url.clone(),
                dest.display().to_string(),
            ],
        )
        .needs_network()
        .execute(host, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::ScriptedRunner;
    use std::fs;
    use tempfile::TempDir;

    const URL: &str = "https://github.com/pyenv/pyenv.git";

    fn ctx(root: &Path) -> ProjectContext {
        ProjectContext::new("demo", root).unwrap()
    }

    #[test]
    fn clones_when_destination_missing() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join(".pyenv");
        let runner = ScriptedRunner::new();
        runner.respond("git", 0, "");
        let mut host = HostEnv::new(&runner, temp.path());

        GitCloneInstaller::new(URL, &dest, "bin/pyenv")
            .execute(&mut host, &ctx(temp.path()))
            .unwrap();
        assert_eq!(
            runner.invocations(),
            vec![format!("git clone --depth 1 {} {}", URL, dest.display())]
        );
    }

    #[test]
    fn complete_clone_is_left_alone() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join(".pyenv");
        fs::create_dir_all(dest.join("bin")).unwrap();
        fs::write(dest.join("bin/pyenv"), "").unwrap();
        let runner = ScriptedRunner::new();
        let mut host = HostEnv::new(&runner, temp.path());

        GitCloneInstaller::new(URL, &dest, "bin/pyenv")
            .execute(&mut host, &ctx(temp.path()))
            .unwrap();
        assert!(runner.invocations().is_empty());
    }

    #[test]
    fn empty_destination_is_recloned() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join(".nvm");
        fs::create_dir_all(&dest).unwrap();
        let runner = ScriptedRunner::new();
        runner.respond("git", 0, "");
        let mut host = HostEnv::new(&runner, temp.path());

        GitCloneInstaller::new("https://github.com/nvm-sh/nvm.git", &dest, "nvm.sh")
            .execute(&mut host, &ctx(temp.path()))
            .unwrap();
        assert_eq!(runner.count("git clone"), 1);
    }

    #[test]
    fn git_dir_without_head_is_recloned() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join(".nvm");
        fs::create_dir_all(dest.join(".git/objects")).unwrap();
        let runner = ScriptedRunner::new();
        runner.respond("git rev-parse --verify --quiet HEAD", 1, "");
        runner.respond("git", 0, "");
        let mut host = HostEnv::new(&runner, temp.path());

        GitCloneInstaller::new("https://github.com/nvm-sh/nvm.git", &dest, "nvm.sh")
            .execute(&mut host, &ctx(temp.path()))
            .unwrap();
        assert!(!dest.join(".git/objects").exists());
        assert_eq!(runner.count("git clone"), 1);
    }

    #[test]
    fn git_dir_with_head_is_not_removed() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join(".nvm");
        fs::create_dir_all(dest.join(".git")).unwrap();
        let runner = ScriptedRunner::new();
        runner.respond("git rev-parse --verify --quiet HEAD", 0, "abc123\n");
        let mut host = HostEnv::new(&runner, temp.path());

        let err = GitCloneInstaller::new("https://github.com/nvm-sh/nvm.git", &dest, "nvm.sh")
            .execute(&mut host, &ctx(temp.path()))
            .unwrap_err();
        assert!(err.to_string().contains("is not a complete clone"));
        assert!(dest.join(".git").exists());
        assert_eq!(runner.count("git clone"), 0);
    }

    #[test]
    fn installed_node_versions_survive() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join(".nvm");
        let node = dest.join("versions/node/v18.19.0/bin/node");
        fs::create_dir_all(node.parent().unwrap()).unwrap();
        fs::write(&node, "").unwrap();
        let runner = ScriptedRunner::new();
        runner.respond("git", 0, "");
        let mut host = HostEnv::new(&runner, temp.path());

        let err = GitCloneInstaller::new("https://github.com/nvm-sh/nvm.git", &dest, "nvm.sh")
            .execute(&mut host, &ctx(temp.path()))
            .unwrap_err();
        assert!(matches!(
            err,
            StackupError::Install(InstallError::DestinationOccupied { .. })
        ));
        assert!(err.is_expected());
        assert!(node.exists());
        assert!(runner.invocations().is_empty());
    }

    #[test]
    fn offline_keeps_interrupted_clone() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join(".nvm");
        fs::create_dir_all(&dest).unwrap();
        let runner = ScriptedRunner::new();
        let mut host = HostEnv::new(&runner, temp.path()).with_network(false);

        let err = GitCloneInstaller::new("https://github.com/nvm-sh/nvm.git", &dest, "nvm.sh")
            .execute(&mut host, &ctx(temp.path()))
            .unwrap_err();
        assert!(err.to_string().contains("Network unavailable"));
        assert!(dest.exists());
    }
}
