//! Persisted graphics settings.
//!
//! Settings live in a `ConfigFile`, a flat set of named sections each mapping
//! keys to JSON values. The graphics subset sits under the `Setup` section:
//!
//! ```json
//! {
//!   "Setup": {
//!     "Resolution": "1024x768",
//!     "Fullscreen": 0,
//!     "MipmapLevel": 4,
//!     "ShadowMappingResolution": 1024
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::device::{Device, DeviceConfig, TexFilter};
use crate::errors::*;

pub const SETUP_SECTION: &str = "Setup";

/// Sections of keys to values, persisted as JSON.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigFile {
    sections: BTreeMap<String, BTreeMap<String, Value>>,
}

impl ConfigFile {
    pub fn new() -> Self {
        ConfigFile::default()
    }

    /// Loads the config file at `path`. A missing file yields an empty
    /// config.
    pub fn load<P>(path: P) -> Result<ConfigFile>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        if !path.exists() {
            info!(
                "[ConfigFile] {} does not exist, using defaults.",
                path.display()
            );
            return Ok(ConfigFile::new());
        }

        let payload = fs::read_to_string(path)?;
        ConfigFile::parse(&payload)
    }

    /// Parses config from JSON text.
    pub fn parse(payload: &str) -> Result<ConfigFile> {
        let sections = serde_json::from_str(payload)?;
        Ok(ConfigFile { sections })
    }

    pub fn save<P>(&self, path: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        fs::write(path.as_ref(), self.to_json()?)?;
        debug!("[ConfigFile] Saved to {}.", path.as_ref().display());
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.sections)?)
    }

    #[inline]
    pub fn get(&self, section: &str, key: &str) -> Option<&Value> {
        self.sections.get(section).and_then(|v| v.get(key))
    }

    pub fn set<T: Into<Value>>(&mut self, section: &str, key: &str, value: T) {
        self.sections
            .entry(section.to_owned())
            .or_insert_with(BTreeMap::new)
            .insert(key.to_owned(), value.into());
    }

    pub fn remove(&mut self, section: &str, key: &str) -> Option<Value> {
        self.sections.get_mut(section).and_then(|v| v.remove(key))
    }

    /// Reads an integer. Numeric strings are accepted too.
    pub fn get_int(&self, section: &str, key: &str) -> Option<i64> {
        match self.get(section, key)? {
            Value::Number(v) => v.as_i64().or_else(|| v.as_f64().map(|v| v as i64)),
            Value::String(v) => v.trim().parse().ok(),
            Value::Bool(v) => Some(*v as i64),
            _ => None,
        }
    }

    /// Reads a float. Numeric strings are accepted too.
    pub fn get_float(&self, section: &str, key: &str) -> Option<f32> {
        match self.get(section, key)? {
            Value::Number(v) => v.as_f64().map(|v| v as f32),
            Value::String(v) => v.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn get_string(&self, section: &str, key: &str) -> Option<&str> {
        self.get(section, key).and_then(|v| v.as_str())
    }

    #[inline]
    pub fn set_int(&mut self, section: &str, key: &str, value: i64) {
        self.set(section, key, value);
    }

    #[inline]
    pub fn set_float(&mut self, section: &str, key: &str, value: f32) {
        self.set(section, key, f64::from(value));
    }

    #[inline]
    pub fn set_string(&mut self, section: &str, key: &str, value: &str) {
        self.set(section, key, value);
    }
}

/// The graphics keys of the `Setup` section.
pub struct GraphicsSettings;

impl GraphicsSettings {
    /// Applies every graphics value present in `config` to the device
    /// tunables. The device clamps what its context can not honor.
    pub fn load(config: &ConfigFile, device: &mut dyn Device) {
        let uint = |key| {
            config
                .get_int(SETUP_SECTION, key)
                .map(|v| v.max(0).min(i64::from(u32::max_value())) as u32)
        };

        if let Some(v) = uint("MipmapLevel") {
            device.set_texture_mipmap_level(v);
        }

        if let Some(v) = uint("Anisotropy") {
            device.set_texture_anisotropy_level(v);
        }

        if let Some(v) = uint("MSAA") {
            device.set_multisample(v);
        }

        if let Some(v) = config.get_int(SETUP_SECTION, "FilterMode") {
            match TexFilter::from_code(v) {
                Some(filter) => device.set_texture_filter_mode(filter),
                None => warn!("[GraphicsSettings] Unknown filter mode {}.", v),
            }
        }

        if let Some(v) = uint("ShadowMapping") {
            device.set_shadow_mapping(v != 0);
        }

        if let Some(v) = uint("ShadowMappingQuality") {
            device.set_shadow_mapping_quality(v != 0);
        }

        if let Some(v) = uint("ShadowMappingResolution") {
            device.set_shadow_mapping_resolution(v);
        }
    }

    /// Writes the device tunables into `config`.
    pub fn save(config: &mut ConfigFile, device: &dyn Device) {
        let s = SETUP_SECTION;
        config.set_int(s, "MipmapLevel", i64::from(device.texture_mipmap_level()));
        config.set_int(s, "Anisotropy", i64::from(device.texture_anisotropy_level()));
        config.set_int(s, "MSAA", i64::from(device.multisample()));
        config.set_int(s, "FilterMode", device.texture_filter_mode().code());
        config.set_int(s, "ShadowMapping", device.shadow_mapping() as i64);
        config.set_int(s, "ShadowMappingQuality", device.shadow_mapping_quality() as i64);
        config.set_int(
            s,
            "ShadowMappingResolution",
            i64::from(device.shadow_mapping_resolution()),
        );
    }

    /// Writes the surface size and fullscreen flag.
    pub fn save_resolution(config: &mut ConfigFile, device: &DeviceConfig) {
        config.set_string(SETUP_SECTION, "Resolution", &device.resolution());
        config.set_int(SETUP_SECTION, "Fullscreen", device.full_screen as i64);
    }
}

impl DeviceConfig {
    /// Builds the surface configuration from the persisted resolution,
    /// falling back to defaults for anything missing or malformed.
    pub fn from_config_file(config: &ConfigFile) -> DeviceConfig {
        let mut v = DeviceConfig::default();

        if let Some(resolution) = config.get_string(SETUP_SECTION, "Resolution") {
            match DeviceConfig::parse_resolution(resolution) {
                Some(size) => v.size = size,
                None => warn!("[GraphicsSettings] Malformed resolution {:?}.", resolution),
            }
        }

        if let Some(full_screen) = config.get_int(SETUP_SECTION, "Fullscreen") {
            v.full_screen = full_screen != 0;
        }

        v
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn typed_access() {
        let mut config = ConfigFile::new();
        config.set_int("Setup", "MSAA", 4);
        config.set_float("Setup", "ShadowColor", 0.5);
        config.set_string("Setup", "Resolution", "640x480");

        assert_eq!(config.get_int("Setup", "MSAA"), Some(4));
        assert_eq!(config.get_float("Setup", "ShadowColor"), Some(0.5));
        assert_eq!(config.get_string("Setup", "Resolution"), Some("640x480"));
        assert_eq!(config.get_int("Setup", "Resolution"), None);
        assert_eq!(config.get_int("Edit", "MSAA"), None);

        assert!(config.remove("Setup", "MSAA").is_some());
        assert_eq!(config.get_int("Setup", "MSAA"), None);
    }

    #[test]
    fn lenient_numbers() {
        let config =
            ConfigFile::parse(r#"{ "Setup": { "A": "12", "B": 3.0, "C": true } }"#).unwrap();
        assert_eq!(config.get_int("Setup", "A"), Some(12));
        assert_eq!(config.get_int("Setup", "B"), Some(3));
        assert_eq!(config.get_int("Setup", "C"), Some(1));
        assert_eq!(config.get_float("Setup", "A"), Some(12.0));
    }

    #[test]
    fn json() {
        let mut config = ConfigFile::new();
        config.set_int("Setup", "MipmapLevel", 8);

        let json = config.to_json().unwrap();
        assert_eq!(ConfigFile::parse(&json).unwrap(), config);
        assert!(ConfigFile::parse("[1, 2]").is_err());
    }

    #[test]
    fn device_config() {
        let mut config = ConfigFile::new();
        assert_eq!(
            DeviceConfig::from_config_file(&config),
            DeviceConfig::default()
        );

        let mut device = DeviceConfig::default();
        device.size.x = 1280;
        device.size.y = 720;
        device.full_screen = true;
        GraphicsSettings::save_resolution(&mut config, &device);

        assert_eq!(config.get_string("Setup", "Resolution"), Some("1280x720"));
        assert_eq!(DeviceConfig::from_config_file(&config), device);

        config.set_string("Setup", "Resolution", "huge");
        assert_eq!(
            DeviceConfig::from_config_file(&config).size,
            DeviceConfig::default().size
        );
    }
}
