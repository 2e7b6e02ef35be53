use crate::backends::Capabilities;

use super::types::TexFilter;

/// Quality knobs persisted by the graphics settings.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Tunables {
    /// Number of mipmap levels generated for mipmapped textures.
    pub texture_mipmap_level: u32,
    pub texture_anisotropy_level: u32,
    pub multisample: u32,
    pub texture_filter_mode: TexFilter,
    pub shadow_mapping: bool,
    pub shadow_mapping_quality: bool,
    /// Side of the offscreen shadow map, 0 renders shadows into the window
    /// surface instead.
    pub shadow_mapping_resolution: u32,
}

impl Default for Tunables {
    fn default() -> Self {
        Tunables {
            texture_mipmap_level: 4,
            texture_anisotropy_level: 2,
            multisample: 2,
            texture_filter_mode: TexFilter::Trilinear,
            shadow_mapping: true,
            shadow_mapping_quality: true,
            shadow_mapping_resolution: 1024,
        }
    }
}

/// Upper bound of the mipmap level tunable.
pub const MAX_MIPMAP_LEVEL: u32 = 16;

impl Tunables {
    /// Clamps every value into what the context supports.
    pub fn clamp(&mut self, caps: &Capabilities) {
        self.texture_mipmap_level = self.texture_mipmap_level.max(1).min(MAX_MIPMAP_LEVEL);

        self.texture_anisotropy_level = if caps.anisotropy_supported {
            self.texture_anisotropy_level
                .max(1)
                .min(caps.max_anisotropy.max(1))
        } else {
            1
        };

        self.multisample = self.multisample.max(1).min(caps.max_samples.max(1));

        if !caps.shadow_mapping_supported {
            self.shadow_mapping = false;
            self.shadow_mapping_quality = false;
        }

        if self.shadow_mapping_resolution > 0 {
            let max = if caps.framebuffer_supported {
                caps.max_texture_size
            } else {
                0
            };

            self.shadow_mapping_resolution = self.shadow_mapping_resolution.min(max);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn clamp() {
        let mut caps = Capabilities::headless();
        caps.max_anisotropy = 8;
        caps.max_samples = 4;
        caps.max_texture_size = 2048;

        let mut t = Tunables {
            texture_mipmap_level: 0,
            texture_anisotropy_level: 16,
            multisample: 16,
            texture_filter_mode: TexFilter::Bilinear,
            shadow_mapping: true,
            shadow_mapping_quality: true,
            shadow_mapping_resolution: 8192,
        };

        t.clamp(&caps);
        assert_eq!(t.texture_mipmap_level, 1);
        assert_eq!(t.texture_anisotropy_level, 8);
        assert_eq!(t.multisample, 4);
        assert_eq!(t.shadow_mapping_resolution, 2048);
        assert!(t.shadow_mapping);

        caps.anisotropy_supported = false;
        caps.shadow_mapping_supported = false;
        t.clamp(&caps);
        assert_eq!(t.texture_anisotropy_level, 1);
        assert!(!t.shadow_mapping);
        assert!(!t.shadow_mapping_quality);
    }
}
