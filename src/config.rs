//! Saved command-line defaults.
//!
//! Flags live in plain text files, one or more per line, `#` comments
//! allowed: a global file under the user config dir and a local
//! `.zenithrc` in the working directory. CLI flags win over local, local
//! over global. Access tokens are never written to these files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::state::Theme;

const LOCAL_FILE: &str = ".zenithrc";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub zen: bool,
    pub theme: Option<Theme>,
    pub drive_api_key: Option<String>,
    pub storage_dir: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge, with `other` taking precedence for valued options.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            zen: self.zen || other.zen,
            theme: other.theme.or(self.theme),
            drive_api_key: other
                .drive_api_key
                .clone()
                .or_else(|| self.drive_api_key.clone()),
            storage_dir: other
                .storage_dir
                .clone()
                .or_else(|| self.storage_dir.clone()),
            log_file: other.log_file.clone().or_else(|| self.log_file.clone()),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    dirs::config_dir().map_or_else(
        || PathBuf::from(LOCAL_FILE),
        |dir| dir.join("zenith").join("config"),
    )
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(LOCAL_FILE)
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
    let mut lines = vec!["# zenith defaults (saved with --save)".to_string()];
    if flags.zen {
        lines.push("--zen".to_string());
    }
    if let Some(theme) = flags.theme {
        lines.push(format!("--theme {}", theme.label()));
    }
    if let Some(key) = &flags.drive_api_key {
        lines.push(format!("--drive-api-key {key}"));
    }
    if let Some(dir) = &flags.storage_dir {
        lines.push(format!("--storage-dir {}", dir.display()));
    }
    if let Some(log) = &flags.log_file {
        lines.push(format!("--log-file {}", log.display()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))?;
    tracing::info!(path = %path.display(), "saved default flags");
    Ok(())
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick known flags out of raw argv-style tokens; anything else is ignored.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        if token == "--zen" {
            flags.zen = true;
            i += 1;
            continue;
        }
        let (name, inline) = match token.split_once('=') {
            Some((name, value)) => (name, Some(value.to_string())),
            None => (token, None),
        };
        if !matches!(
            name,
            "--theme" | "--drive-api-key" | "--storage-dir" | "--log-file"
        ) {
            i += 1;
            continue;
        }
        let value = match inline {
            Some(value) => Some(value),
            None => {
                let next = tokens.get(i + 1).cloned();
                if next.is_some() {
                    i += 1;
                }
                next
            }
        };
        if let Some(value) = value {
            match name {
                "--theme" => flags.theme = value.parse().ok(),
                "--drive-api-key" => flags.drive_api_key = Some(value),
                "--storage-dir" => flags.storage_dir = Some(PathBuf::from(value)),
                _ => flags.log_file = Some(PathBuf::from(value)),
            }
        }
        i += 1;
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let flags = parse_flag_tokens(&tokens(&[
            "zenith",
            "--zen",
            "--theme",
            "light",
            "--drive-api-key=abc",
            "--log-file",
            "zenith.log",
            "notes.md",
        ]));
        assert!(flags.zen);
        assert_eq!(flags.theme, Some(Theme::Light));
        assert_eq!(flags.drive_api_key.as_deref(), Some("abc"));
        assert_eq!(flags.log_file, Some(PathBuf::from("zenith.log")));
        assert_eq!(flags.storage_dir, None);
    }

    #[test]
    fn test_unknown_theme_is_dropped() {
        let flags = parse_flag_tokens(&tokens(&["--theme=sepia"]));
        assert_eq!(flags.theme, None);
    }

    #[test]
    fn test_drive_token_is_not_a_saved_flag() {
        let flags = parse_flag_tokens(&tokens(&["--drive-token", "secret"]));
        assert_eq!(flags, ConfigFlags::default());
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            zen: true,
            theme: Some(Theme::Light),
            drive_api_key: Some("file-key".into()),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            theme: Some(Theme::Dark),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.zen);
        assert_eq!(merged.theme, Some(Theme::Dark));
        assert_eq!(merged.drive_api_key.as_deref(), Some("file-key"));
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(".zenithrc");
        let flags = ConfigFlags {
            zen: true,
            theme: Some(Theme::Dark),
            drive_api_key: Some("key".into()),
            storage_dir: Some(PathBuf::from("store")),
            log_file: Some(PathBuf::from("zenith.log")),
        };

        save_config_flags(&path, &flags).unwrap();
        assert_eq!(load_config_flags(&path).unwrap(), flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
        assert_eq!(load_config_flags(&path).unwrap(), ConfigFlags::default());
    }
}
