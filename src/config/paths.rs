//! XDG-aware config and data directory resolution, grounded in
//! `examples/original_source/paths/paths.go`. We reach for the `dirs` crate
//! rather than splicing `$HOME` by hand, the way `slircd-ng`'s own path
//! handling prefers a crate over ad-hoc env var logic.

use std::io;
use std::path::{Path, PathBuf};

use super::ConfigError;

const SAMPLE_CONFIG: &str = include_str!("sample_config.ini");

/// `$XDG_CONFIG_HOME/irchuu.conf`, falling back to `~/.config/irchuu.conf`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("irchuu.conf")
}

/// `$XDG_DATA_HOME/irchuu/`, falling back to `~/.local/share/irchuu/`.
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("irchuu")
}

/// Create the data and config parent directories if missing, and write the
/// sample configuration to `path` if no file exists there yet.
///
/// Returns `Ok(true)` if a fresh config was written (the caller should print
/// a message and exit, matching `MakePaths`'s `defer os.Exit(0)`), or
/// `Ok(false)` if an existing config was found and the caller should proceed
/// to load it.
pub fn populate_default_config(path: &Path, data_dir: &Path) -> Result<bool, ConfigError> {
    create_dir(data_dir)?;
    if let Some(parent) = path.parent() {
        create_dir(parent)?;
    }

    if path.exists() {
        return Ok(false);
    }

    std::fs::write(path, SAMPLE_CONFIG).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(metadata) = std::fs::metadata(path) {
            let mut perms = metadata.permissions();
            perms.set_mode(0o600);
            let _ = std::fs::set_permissions(path, perms);
        }
    }

    Ok(true)
}

fn create_dir(dir: &Path) -> Result<(), ConfigError> {
    if dir.exists() {
        return Ok(());
    }
    std::fs::create_dir_all(dir).map_err(|source: io::Error| ConfigError::Io {
        path: dir.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn populates_config_once() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join("nested/irchuu.conf");
        let data_path = tmp.path().join("data");

        let wrote = populate_default_config(&config_path, &data_path).unwrap();
        assert!(wrote);
        assert!(config_path.exists());
        assert!(data_path.is_dir());

        let wrote_again = populate_default_config(&config_path, &data_path).unwrap();
        assert!(!wrote_again);
    }
}
