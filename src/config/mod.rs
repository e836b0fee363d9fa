//! Server configuration.
//!
//! Layering: built-in defaults -> optional config file (`--config`, JSON or YAML
//! by extension) -> CLI flags. The resulting `ServerConfig` is immutable and
//! shared behind an `Arc` for the lifetime of the process.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_TMUX: &str = "tmux";
pub const DEFAULT_EDITOR: &str = "nvim";
pub const DEFAULT_REGISTRY_CLI: &str = "claude";
pub const DEFAULT_VAULT_DIR: &str = "vaults";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Terminal multiplexer binary.
    pub tmux: String,
    /// Editor launched inside new panes.
    pub editor: String,
    /// Directory whose children are the note vaults.
    pub vault_root: PathBuf,
    /// CLI used for `mcp add` / `mcp list`.
    pub registry_cli: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            tmux: DEFAULT_TMUX.to_string(),
            editor: DEFAULT_EDITOR.to_string(),
            vault_root: home.join(DEFAULT_VAULT_DIR),
            registry_cli: DEFAULT_REGISTRY_CLI.to_string(),
        }
    }
}

/// Partial configuration, as read from a file or collected from CLI flags.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    pub tmux: Option<String>,
    pub editor: Option<String>,
    pub vault_root: Option<String>,
    pub registry_cli: Option<String>,
}

impl ServerConfig {
    /// Apply a layer on top of `self`. Blank values are ignored.
    pub fn merge(mut self, layer: ConfigOverrides) -> Self {
        if let Some(v) = non_blank(layer.tmux) {
            self.tmux = v;
        }
        if let Some(v) = non_blank(layer.editor) {
            self.editor = v;
        }
        if let Some(v) = non_blank(layer.vault_root) {
            self.vault_root = expand_home(&v);
        }
        if let Some(v) = non_blank(layer.registry_cli) {
            self.registry_cli = v;
        }
        self
    }

    /// Build the effective configuration from an optional file plus CLI flags.
    pub fn load(file: Option<&Path>, cli: ConfigOverrides) -> Result<Self> {
        let mut config = ServerConfig::default();
        if let Some(path) = file {
            config = config.merge(load_file(path)?);
        }
        Ok(config.merge(cli))
    }
}

/// Read a JSON or YAML configuration file (decided by extension; unknown
/// extensions are tried as JSON first, then YAML).
pub fn load_file(path: &Path) -> Result<ConfigOverrides> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file '{}'", path.display()))?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed: ConfigOverrides = match ext.as_str() {
        "json" => serde_json::from_str(&content)
            .with_context(|| format!("invalid JSON in '{}'", path.display()))?,
        "yaml" | "yml" => serde_yaml::from_str(&content)
            .with_context(|| format!("invalid YAML in '{}'", path.display()))?,
        _ => match serde_json::from_str(&content) {
            Ok(v) => v,
            Err(_) => match serde_yaml::from_str(&content) {
                Ok(v) => v,
                Err(e) => bail!("config file '{}' is neither JSON nor YAML: {e}", path.display()),
            },
        },
    };
    Ok(parsed)
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(raw: &str) -> PathBuf {
    if raw == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = raw.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_point_at_standard_binaries() {
        let c = ServerConfig::default();
        assert_eq!(c.tmux, "tmux");
        assert_eq!(c.editor, "nvim");
        assert_eq!(c.registry_cli, "claude");
        assert!(c.vault_root.ends_with("vaults"));
    }

    #[test]
    fn cli_layer_wins_and_blank_is_ignored() {
        let c = ServerConfig::default().merge(ConfigOverrides {
            editor: Some("hx".into()),
            tmux: Some("   ".into()),
            ..Default::default()
        });
        assert_eq!(c.editor, "hx");
        assert_eq!(c.tmux, "tmux");
    }

    #[test]
    fn expand_home_leaves_absolute_paths() {
        assert_eq!(expand_home("/srv/notes"), PathBuf::from("/srv/notes"));
    }

    #[test]
    fn yaml_file_then_cli_override() {
        let mut f = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(f, "editor: vim\nvault_root: /data/vaults\ntmux: /usr/local/bin/tmux").unwrap();

        let c = ServerConfig::load(
            Some(f.path()),
            ConfigOverrides {
                editor: Some("emacs".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(c.editor, "emacs");
        assert_eq!(c.tmux, "/usr/local/bin/tmux");
        assert_eq!(c.vault_root, PathBuf::from("/data/vaults"));
    }

    #[test]
    fn json_file_rejects_unknown_keys() {
        let mut f = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(f, r#"{{"editor":"vim","colour":"blue"}}"#).unwrap();
        let err = load_file(f.path()).unwrap_err();
        assert!(err.to_string().contains("invalid JSON"), "{err}");
    }
}
