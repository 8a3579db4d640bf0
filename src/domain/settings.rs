use crate::domain::models::Unit;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_level")]
    pub level: String, // "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_true")]
    pub console_logging_enabled: bool,
    #[serde(default = "default_false")]
    pub file_logging_enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_prefix")]
    pub file_name_prefix: String,
    #[serde(default = "default_rotation")]
    pub rotation: String, // "daily", "hourly", "minutely", "never"
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            console_logging_enabled: default_true(),
            file_logging_enabled: default_false(),
            log_dir: default_log_dir(),
            file_name_prefix: default_prefix(),
            rotation: default_rotation(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_log_dir() -> String {
    "logs".to_string()
}
fn default_prefix() -> String {
    "gluconnect".to_string()
}
fn default_rotation() -> String {
    "daily".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Path to the meter device node (e.g. "/dev/sda").
    #[serde(default)]
    pub device_path: Option<String>,
    /// Name of the driver used to talk to the meter.
    #[serde(default)]
    pub driver: Option<String>,
    /// Unit glucose values are reported in over BLE.
    #[serde(default = "default_unit")]
    pub display_unit: Unit,

    // BLE server settings
    /// Bluetooth adapter to serve on; `None` picks the default adapter.
    #[serde(default)]
    pub adapter: Option<String>,
    #[serde(default = "default_local_name")]
    pub local_name: String,
    /// Seconds to keep serving after a shutdown request, letting a
    /// central finish an in-flight read.
    #[serde(default = "default_grace_period_secs")]
    pub grace_period_secs: u64,

    #[serde(default)]
    pub log_settings: LogSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            device_path: None,
            driver: None,
            display_unit: default_unit(),
            adapter: None,
            local_name: default_local_name(),
            grace_period_secs: default_grace_period_secs(),
            log_settings: LogSettings::default(),
        }
    }
}

fn default_unit() -> Unit {
    Unit::MgDl
}
fn default_local_name() -> String {
    "Gluconnect Service".to_string()
}
fn default_grace_period_secs() -> u64 {
    2
}

pub struct SettingsService {
    settings: Settings,
    settings_path: PathBuf,
}

impl SettingsService {
    pub fn new() -> anyhow::Result<Self> {
        let settings_path = Self::get_settings_path()?;
        let settings = Self::load_from_file(&settings_path).unwrap_or_default();

        let service = Self {
            settings,
            settings_path,
        };
        // First run: leave an editable settings file behind.
        if !service.settings_path.exists() {
            service.save()?;
        }
        Ok(service)
    }

    fn get_settings_path() -> anyhow::Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        path.push("Gluconnect");
        fs::create_dir_all(&path)?;
        path.push("settings.json");
        Ok(path)
    }

    fn load_from_file(path: &PathBuf) -> anyhow::Result<Settings> {
        let contents = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&contents)?;
        Ok(settings)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(&self.settings)?;
        fs::write(&self.settings_path, json)?;
        Ok(())
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let settings = Settings::default();
        assert_eq!(settings.display_unit, Unit::MgDl);
        assert_eq!(settings.local_name, "Gluconnect Service");
        assert_eq!(settings.grace_period_secs, 2);
        assert!(settings.device_path.is_none());
    }

    #[test]
    fn partial_settings_file_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"device_path": "/dev/sda", "driver": "demo"}"#).unwrap();
        assert_eq!(settings.device_path.as_deref(), Some("/dev/sda"));
        assert_eq!(settings.driver.as_deref(), Some("demo"));
        assert_eq!(settings.display_unit, Unit::MgDl);
        assert!(settings.log_settings.console_logging_enabled);
    }
}
