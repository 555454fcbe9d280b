//! Cross-platform directory path resolution
//!
//! - Linux/macOS: XDG Base Directory specification (~/.config)
//! - Windows: Known Folder API (AppData\Roaming)

use std::path::{Path, PathBuf};

/// Get the configuration directory path
///
/// Checks METAROUTE_CONFIG_DIR environment variable first, then falls back to:
/// - Unix (Linux/macOS): XDG_CONFIG_HOME/metaroute or ~/.config/metaroute
/// - Windows: %APPDATA%\metaroute\config
pub fn config_dir() -> PathBuf {
    std::env::var("METAROUTE_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            #[cfg(windows)]
            {
                use directories::ProjectDirs;
                ProjectDirs::from("", "", "metaroute")
                    .map(|dirs| dirs.config_dir().to_path_buf())
                    .unwrap_or_else(|| PathBuf::from(".").join(".config").join("metaroute"))
            }
            #[cfg(not(windows))]
            {
                use directories::BaseDirs;
                std::env::var("XDG_CONFIG_HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| {
                        BaseDirs::new()
                            .map(|dirs| dirs.home_dir().join(".config"))
                            .unwrap_or_else(|| PathBuf::from(".").join(".config"))
                    })
                    .join("metaroute")
            }
        })
}

/// Get the root configuration file path
pub fn root_config_path() -> PathBuf {
    config_dir().join("config.yaml")
}

/// Get the default connector manifest directory
pub fn connectors_dir() -> PathBuf {
    config_dir().join("connectors")
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir() {
        let dir = config_dir();
        assert!(dir.to_string_lossy().contains("metaroute") || std::env::var("METAROUTE_CONFIG_DIR").is_ok());
    }

    #[test]
    fn test_connectors_dir_is_under_config_dir() {
        assert!(connectors_dir().starts_with(config_dir()));
        assert_eq!(root_config_path().file_name().unwrap(), "config.yaml");
    }
}
