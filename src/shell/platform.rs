//! Platform-specific shell detection.

use std::path::{Path, PathBuf};

/// Information about the user's login shell.
#[derive(Debug, Clone)]
pub struct ShellInfo {
    /// Shell executable path.
    pub executable: PathBuf,

    /// Shell name (bash, zsh, fish, ...).
    pub name: ShellType,

    /// Config files that affect this shell, most preferred first.
    pub config_files: Vec<PathBuf>,
}

/// Known shell types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellType {
    Bash,
    Zsh,
    Fish,
    Sh,
    Unknown,
}

impl ShellType {
    /// Parse shell type from executable name.
    pub fn from_executable(exe: &str) -> Self {
        let name = Path::new(exe)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();

        match name.as_str() {
            "bash" => ShellType::Bash,
            "zsh" => ShellType::Zsh,
            "fish" => ShellType::Fish,
            "sh" | "dash" => ShellType::Sh,
            _ => ShellType::Unknown,
        }
    }

    /// Whether this shell reads POSIX `export`/`eval` syntax.
    pub fn is_posix(&self) -> bool {
        !matches!(self, ShellType::Fish)
    }
}

impl ShellInfo {
    /// The profile file stackup appends PATH setup to.
    ///
    /// Prefers an existing file from `config_files`, otherwise the first
    /// candidate. Fish falls back to `~/.profile` because the appended
    /// blocks use POSIX syntax.
    pub fn profile_file(&self, home: &Path) -> PathBuf {
        if !self.name.is_posix() {
            return home.join(".profile");
        }
        self.config_files
            .iter()
            .find(|f| f.is_file())
            .or_else(|| self.config_files.first())
            .cloned()
            .unwrap_or_else(|| home.join(".profile"))
    }
}

/// Detect the user's shell from `$SHELL`.
pub fn detect_shell(home: &Path) -> ShellInfo {
    let executable = std::env::var("SHELL")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/bin/sh"));
    shell_info_for(executable, home)
}

/// Build shell info for a given executable.
pub fn shell_info_for(executable: PathBuf, home: &Path) -> ShellInfo {
    let shell_type = ShellType::from_executable(&executable.to_string_lossy());
    ShellInfo {
        executable,
        name: shell_type,
        config_files: get_config_files(shell_type, home),
    }
}

fn get_config_files(shell_type: ShellType, home: &Path) -> Vec<PathBuf> {
    match shell_type {
        ShellType::Bash => {
            if cfg!(target_os = "macos") {
                vec![home.join(".bash_profile"), home.join(".bashrc")]
            } else {
                vec![home.join(".bashrc"), home.join(".bash_profile")]
            }
        }
        ShellType::Zsh => vec![home.join(".zshrc"), home.join(".zprofile")],
        ShellType::Fish => vec![home.join(".config/fish/config.fish")],
        ShellType::Sh | ShellType::Unknown => vec![home.join(".profile")],
    }
}

/// Check if running in a CI environment.
///
/// Used to force non-interactive mode in `main()`. Checks common CI
/// environment variables: `CI`, `GITHUB_ACTIONS`, `GITLAB_CI`, `CIRCLECI`,
/// `TRAVIS`, `JENKINS_URL`.
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok()
        || std::env::var("GITHUB_ACTIONS").is_ok()
        || std::env::var("GITLAB_CI").is_ok()
        || std::env::var("CIRCLECI").is_ok()
        || std::env::var("TRAVIS").is_ok()
        || std::env::var("JENKINS_URL").is_ok()
}

/// Check if running as root.
pub fn is_elevated() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: geteuid() is a simple syscall that returns the effective user ID
        unsafe { libc::geteuid() == 0 }
    }

    #[cfg(not(unix))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn shell_type_from_executable() {
        assert_eq!(ShellType::from_executable("/bin/bash"), ShellType::Bash);
        assert_eq!(ShellType::from_executable("/usr/bin/zsh"), ShellType::Zsh);
        assert_eq!(ShellType::from_executable("/usr/bin/fish"), ShellType::Fish);
        assert_eq!(ShellType::from_executable("/bin/dash"), ShellType::Sh);
        assert_eq!(ShellType::from_executable("unknown"), ShellType::Unknown);
    }

    #[test]
    fn zsh_profile_defaults_to_zshrc() {
        let home = TempDir::new().unwrap();
        let info = shell_info_for(PathBuf::from("/bin/zsh"), home.path());
        assert_eq!(info.profile_file(home.path()), home.path().join(".zshrc"));
    }

    #[test]
    fn existing_profile_is_preferred() {
        let home = TempDir::new().unwrap();
        std::fs::write(home.path().join(".zprofile"), "# mine\n").unwrap();
        let info = shell_info_for(PathBuf::from("/bin/zsh"), home.path());
        assert_eq!(info.profile_file(home.path()), home.path().join(".zprofile"));
    }

    #[test]
    fn fish_falls_back_to_posix_profile() {
        let home = TempDir::new().unwrap();
        let info = shell_info_for(PathBuf::from("/usr/bin/fish"), home.path());
        assert_eq!(info.profile_file(home.path()), home.path().join(".profile"));
    }

    #[test]
    fn unknown_shell_uses_profile() {
        let home = TempDir::new().unwrap();
        let info = shell_info_for(PathBuf::from("/opt/weird/nu"), home.path());
        assert_eq!(info.profile_file(home.path()), home.path().join(".profile"));
    }

    #[test]
    fn is_ci_does_not_panic() {
        let _ = is_ci();
    }
}
