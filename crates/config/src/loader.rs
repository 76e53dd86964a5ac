use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::CipherConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "cipherkit.toml",
    "cipherkit.yaml",
    "cipherkit.yml",
    "cipherkit.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<CipherConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./cipherkit.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/cipherkit/cipherkit.{toml,yaml,yml,json}` (user-global)
///
/// Returns `CipherConfig::default()` if no config file is found or the one
/// found cannot be parsed.
pub fn discover_and_load() -> CipherConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading cipher config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to load cipher config, using defaults"
                );
            },
        }
    } else {
        debug!("no cipher config file found, using defaults");
    }
    CipherConfig::default()
}

/// Returns the user-global config directory (`~/.config/cipherkit/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "cipherkit").map(|d| d.config_dir().to_path_buf())
}

fn find_config_file() -> Option<PathBuf> {
    find_in(Path::new(".")).or_else(|| config_dir().and_then(|dir| find_in(&dir)))
}

fn find_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<CipherConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}
