use std::path::{Path, PathBuf};

use mindtrack_scoring::config::EngineConfig;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Config file schema version written by this build.
/// Every bump needs a step in [`migrate`].
pub const CURRENT_VERSION: u32 = 1;

/// Engine settings that pre-versioned configs kept at the top level.
const V0_ENGINE_KEYS: [&str; 6] = [
    "max_condition_depth",
    "formula_step_limit",
    "formula_max_length",
    "unknown_scoring_type",
    "formula_failure",
    "population_mode",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindtrackConfig {
    /// Schema version. Missing or 0 = pre-versioned config.
    #[serde(default)]
    pub config_version: u32,
    #[serde(default)]
    pub engine: EngineConfig,
    /// Score ledger location. Falls back to [`default_ledger_path`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger: Option<PathBuf>,
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for MindtrackConfig {
    fn default() -> Self {
        Self {
            config_version: CURRENT_VERSION,
            engine: EngineConfig::default(),
            ledger: None,
            json_logs: false,
        }
    }
}

fn config_dir() -> eyre::Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| eyre::eyre!("no config directory found"))?;
    Ok(base.join("mindtrack"))
}

pub fn default_config_path() -> eyre::Result<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

pub fn default_ledger_path() -> eyre::Result<PathBuf> {
    let base = dirs::data_dir().ok_or_else(|| eyre::eyre!("no data directory found"))?;
    Ok(base.join("mindtrack").join("ledger.json"))
}

/// The config named on the command line, else the one in the user's config
/// directory, else defaults. An explicitly named file must exist.
pub fn resolve_config(explicit: Option<&Path>) -> eyre::Result<MindtrackConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    match default_config_path() {
        Ok(path) if path.exists() => load_config(&path),
        _ => {
            tracing::debug!("no config file, using defaults");
            Ok(MindtrackConfig::default())
        }
    }
}

pub fn load_config(path: &Path) -> eyre::Result<MindtrackConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read config at {}: {e}", path.display()))?;

    // Migrations run on raw JSON, before the typed parse.
    let json: Value = serde_json::from_str(&contents)?;
    let on_disk_version = json
        .get("config_version")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32;

    let migrated = migrate(json, on_disk_version)?;
    let config: MindtrackConfig = serde_json::from_value(migrated)?;
    Ok(config)
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
///
/// Each migration is a pure transform on the raw JSON value.
pub fn migrate(mut json: Value, from_version: u32) -> eyre::Result<Value> {
    if from_version > CURRENT_VERSION {
        return Err(eyre::eyre!(
            "config_version {from_version} is newer than this build supports ({CURRENT_VERSION}). \
             Please update mindtrack."
        ));
    }

    // v0 → v1: engine settings move under "engine"; "fallback" becomes "lenient"
    if from_version < 1 {
        let obj = json
            .as_object_mut()
            .ok_or_else(|| eyre::eyre!("config is not a JSON object"))?;
        let mut engine = match obj.remove("engine") {
            Some(Value::Object(existing)) => existing,
            _ => Map::new(),
        };
        for key in V0_ENGINE_KEYS {
            if let Some(value) = obj.remove(key) {
                engine.entry(key).or_insert(value);
            }
        }
        if engine.get("formula_failure").and_then(Value::as_str) == Some("fallback") {
            engine.insert("formula_failure".to_string(), Value::String("lenient".to_string()));
        }
        obj.insert("engine".to_string(), Value::Object(engine));
        obj.insert("config_version".to_string(), Value::Number(1.into()));
        tracing::info!("migrated config v0 → v1 (engine settings nested)");
    }

    Ok(json)
}

/// Write out the config at `path` with every setting spelled out. An
/// existing file is migrated and rewritten; a missing one gets defaults.
pub fn init_config(path: &Path) -> eyre::Result<MindtrackConfig> {
    let config = if path.exists() {
        load_config(path)?
    } else {
        MindtrackConfig::default()
    };
    save_config(path, &config)?;
    Ok(MindtrackConfig {
        config_version: CURRENT_VERSION,
        ..config
    })
}

pub fn save_config(path: &Path, config: &MindtrackConfig) -> eyre::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| eyre::eyre!("config path {} has no parent directory", path.display()))?;
    std::fs::create_dir_all(dir)?;

    // Saved files always carry the current version.
    let mut stamped = config.clone();
    stamped.config_version = CURRENT_VERSION;

    let json = serde_json::to_string_pretty(&stamped)?;

    // tmp + rename
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json.as_bytes())?;
    std::fs::rename(&tmp_path, path)?;

    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}
