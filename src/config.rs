use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

/// Environment variable consulted when no saves directory is configured.
pub const SAVES_DIR_ENV: &str = "PARCHMENT_SAVES_DIR";

/// Default bound for `wait` when neither the flag file nor the CLI sets one.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub sample: bool,
    pub saves_dir: Option<PathBuf>,
    pub wait_timeout_ms: Option<u64>,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            sample: self.sample || other.sample,
            saves_dir: other.saves_dir.clone().or_else(|| self.saves_dir.clone()),
            wait_timeout_ms: other.wait_timeout_ms.or(self.wait_timeout_ms),
        }
    }

    /// The saves directory: configured value, then the environment, then `./saves`.
    pub fn resolve_saves_dir(&self) -> PathBuf {
        self.saves_dir
            .clone()
            .or_else(|| std::env::var_os(SAVES_DIR_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("saves"))
    }

    pub fn wait_timeout(&self) -> Duration {
        self.wait_timeout_ms
            .map_or(DEFAULT_WAIT_TIMEOUT, Duration::from_millis)
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("parchment").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("parchment")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("parchment").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("parchment")
                .join("config");
        }
    }

    PathBuf::from(".parchmentrc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".parchmentrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# parchment defaults (saved with --save)".to_string());
    if flags.sample {
        lines.push("--sample".to_string());
    }
    if let Some(dir) = &flags.saves_dir {
        lines.push(format!("--saves-dir {}", dir.display()));
    }
    if let Some(ms) = flags.wait_timeout_ms {
        lines.push(format!("--wait-timeout-ms {ms}"));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick the flags this module knows out of CLI-style tokens.
///
/// Unknown tokens are skipped, so the raw process arguments can be passed in.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if token == "--sample" {
            flags.sample = true;
        } else if token == "--saves-dir" {
            if let Some(next) = tokens.get(i + 1) {
                flags.saves_dir = Some(PathBuf::from(next));
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--saves-dir=") {
            flags.saves_dir = Some(PathBuf::from(value));
        } else if token == "--wait-timeout-ms" {
            if let Some(next) = tokens.get(i + 1) {
                flags.wait_timeout_ms = next.parse().ok();
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--wait-timeout-ms=") {
            flags.wait_timeout_ms = value.parse().ok();
        }
        i += 1;
    }
    flags
}
