extern crate robogfx;

use std::env;
use std::fs;

use robogfx::prelude::*;

fn device() -> GL33Device {
    let mut device = GL33Device::new(DeviceConfig::default(), Box::new(HeadlessVisitor::new()));
    device.create().unwrap();
    device
}

#[test]
fn load_applies_and_clamps() {
    let mut device = device();

    let config = ConfigFile::parse(
        r#"{
            "Setup": {
                "MipmapLevel": 8,
                "Anisotropy": 64,
                "MSAA": 32,
                "FilterMode": 1,
                "ShadowMapping": 0,
                "ShadowMappingQuality": "1",
                "ShadowMappingResolution": 16384
            }
        }"#,
    )
    .unwrap();

    GraphicsSettings::load(&config, &mut device);

    assert_eq!(device.texture_mipmap_level(), 8);
    assert_eq!(device.texture_anisotropy_level(), 16);
    assert_eq!(device.multisample(), 8);
    assert_eq!(device.texture_filter_mode(), TexFilter::Bilinear);
    assert!(!device.shadow_mapping());
    assert!(device.shadow_mapping_quality());
    assert_eq!(
        device.shadow_mapping_resolution(),
        device.max_texture_size()
    );
}

#[test]
fn missing_keys_keep_tunables() {
    let mut device = device();
    let before = *device.tunables();

    let mut config = ConfigFile::new();
    config.set_int("Setup", "FilterMode", 42);
    config.set_int("Edit", "MSAA", 1);
    GraphicsSettings::load(&config, &mut device);

    assert_eq!(*device.tunables(), before);
}

#[test]
fn save_round_trip() {
    let mut device = device();
    device.set_texture_mipmap_level(2);
    device.set_multisample(4);
    device.set_texture_filter_mode(TexFilter::Nearest);
    device.set_shadow_mapping_resolution(0);

    let mut config = ConfigFile::new();
    GraphicsSettings::save(&mut config, &device);
    assert_eq!(config.get_int("Setup", "MipmapLevel"), Some(2));
    assert_eq!(config.get_int("Setup", "MSAA"), Some(4));
    assert_eq!(config.get_int("Setup", "FilterMode"), Some(0));
    assert_eq!(config.get_int("Setup", "ShadowMappingResolution"), Some(0));

    let mut other = self::device();
    GraphicsSettings::load(&config, &mut other);
    assert_eq!(*other.tunables(), *device.tunables());
}

#[test]
fn file_round_trip() {
    let dir = env::temp_dir().join(format!("robogfx-settings-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("settings.json");

    let empty = ConfigFile::load(&path).unwrap();
    assert_eq!(empty, ConfigFile::new());

    let mut surface = DeviceConfig::default();
    surface.size = Vector2::new(1920, 1080);
    surface.full_screen = true;

    let mut config = ConfigFile::new();
    GraphicsSettings::save_resolution(&mut config, &surface);
    GraphicsSettings::save(&mut config, &device());
    config.save(&path).unwrap();

    let loaded = ConfigFile::load(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(DeviceConfig::from_config_file(&loaded), surface);

    fs::remove_dir_all(&dir).unwrap();
}
