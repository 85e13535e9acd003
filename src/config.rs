//! User configuration (`config.toml`).
//!
//! ```toml
//! mode = "rewrite"     # or "tree"
//! max_passes = 500
//!
//! [cells]
//! A1 = "5"
//! B1 = "=A1*2"
//! ```
//!
//! Problems with the file are reported as warnings and the defaults are used.

use directories::ProjectDirs;
use gridcalc_core::{EvalMode, EvalOptions};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const MAX_CONFIG_FILE_BYTES: u64 = 256 * 1024;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    mode: Option<String>,
    max_passes: Option<usize>,
    cells: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Config {
    pub options: EvalOptions,
    /// Cells written before anything else, in id order.
    pub cells: Vec<(String, String)>,
}

pub fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "gridcalc")?;
    Some(proj.config_dir().join("config.toml"))
}

/// Load configuration from `config_file`, or from the user config dir when
/// none is given. Returns the configuration and any warnings.
pub fn load_config(config_file: Option<&PathBuf>) -> (Config, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let Some(path) = config_file.cloned().or_else(user_config_path) else {
        return (Config::default(), warnings);
    };

    if !path.exists() {
        if config_file.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (Config::default(), warnings);
    }

    match read_config_file(&path) {
        Ok(file) => {
            let config = build_config(file, &mut warnings);
            (config, warnings)
        }
        Err(err) => {
            warnings.push(err);
            (Config::default(), warnings)
        }
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile, String> {
    let meta = std::fs::metadata(path)
        .map_err(|err| format!("Failed to read {}: {}", path.display(), err))?;
    if meta.len() > MAX_CONFIG_FILE_BYTES {
        return Err(format!(
            "Refusing to read {}: file too large ({} bytes, max {})",
            path.display(),
            meta.len(),
            MAX_CONFIG_FILE_BYTES
        ));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|err| format!("Failed to read {}: {}", path.display(), err))?;
    parse_config(&content).map_err(|err| format!("Failed to parse {}: {}", path.display(), err))
}

fn parse_config(content: &str) -> Result<ConfigFile, toml::de::Error> {
    toml::from_str::<ConfigFile>(content)
}

fn build_config(file: ConfigFile, warnings: &mut Vec<String>) -> Config {
    let mut options = EvalOptions::default();

    if let Some(mode) = file.mode.as_deref() {
        match mode.parse::<EvalMode>() {
            Ok(mode) => options.mode = mode,
            Err(err) => warnings.push(err),
        }
    }

    match file.max_passes {
        Some(0) => warnings.push("max_passes must be at least 1".to_string()),
        Some(n) => options.max_passes = n,
        None => {}
    }

    let cells = file.cells.unwrap_or_default().into_iter().collect();
    Config { options, cells }
}
