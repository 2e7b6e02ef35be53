use std::cmp;

use crate::errors::*;

/// Describes a version.
///
/// A version can only be compared to another version if they belong to the same API.
/// For example, both `Version::GL(3, 0) >= Version::ES(3, 0)` and `Version::ES(3, 0) >=
/// Version::GL(3, 0)` return `false`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Version {
    /// Regular OpenGL.
    GL(u8, u8),
    /// OpenGL embedded system.
    ES(u8, u8),
}

impl PartialOrd for Version {
    #[inline]
    fn partial_cmp(&self, other: &Version) -> Option<cmp::Ordering> {
        let (es1, major1, minor1) = match *self {
            Version::GL(major, minor) => (false, major, minor),
            Version::ES(major, minor) => (true, major, minor),
        };

        let (es2, major2, minor2) = match *other {
            Version::GL(major, minor) => (false, major, minor),
            Version::ES(major, minor) => (true, major, minor),
        };

        if es1 != es2 {
            None
        } else {
            match major1.cmp(&major2) {
                cmp::Ordering::Equal => Some(minor1.cmp(&minor2)),
                v => Some(v),
            }
        }
    }
}

/// Represents the capabilities of the context.
///
/// Contrary to the state, these values never change.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Capabilities {
    pub version: Version,
    /// Anisotropic texture filtering is available.
    pub anisotropy_supported: bool,
    pub max_anisotropy: u32,
    /// Maximum number of samples of a multisampled framebuffer.
    pub max_samples: u32,
    /// Depth textures could be attached to framebuffers and sampled with
    /// depth comparison.
    pub shadow_mapping_supported: bool,
    /// Maximum width and height of a texture.
    pub max_texture_size: u32,
    pub framebuffer_supported: bool,
    /// Maximum number of textures that can be bound to a program.
    pub max_texture_units: u32,
}

impl Default for Capabilities {
    fn default() -> Self {
        Capabilities {
            version: Version::GL(0, 0),
            anisotropy_supported: false,
            max_anisotropy: 1,
            max_samples: 1,
            shadow_mapping_supported: false,
            max_texture_size: 0,
            framebuffer_supported: false,
            max_texture_units: 0,
        }
    }
}

impl Capabilities {
    /// Capabilities reported by the headless backend.
    pub fn headless() -> Self {
        Capabilities {
            version: Version::GL(3, 3),
            anisotropy_supported: true,
            max_anisotropy: 16,
            max_samples: 8,
            shadow_mapping_supported: true,
            max_texture_size: 4096,
            framebuffer_supported: true,
            max_texture_units: 16,
        }
    }

    /// Checks that the context reaches the feature level of the device. The
    /// shader program is written in GLSL 330, which needs OpenGL 3.3.
    pub fn check_requirements(&self, texture_stages: usize) -> Result<()> {
        if !(self.version >= Version::GL(3, 3)) {
            return Err(DeviceError::Requirement(format!(
                "OpenGL 3.3 (found {:?})",
                self.version
            ))
            .into());
        }

        if (self.max_texture_units as usize) < texture_stages {
            return Err(DeviceError::Requirement(format!(
                "{} texture units (found {})",
                texture_stages, self.max_texture_units
            ))
            .into());
        }

        if self.max_texture_size == 0 {
            return Err(DeviceError::Requirement("2D textures".into()).into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn version() {
        assert!(Version::GL(3, 3) > Version::GL(3, 0));
        assert!(Version::GL(4, 0) > Version::GL(3, 3));
        assert!(!(Version::GL(3, 0) >= Version::ES(3, 0)));
        assert!(!(Version::ES(3, 0) >= Version::GL(3, 0)));
    }

    #[test]
    fn requirements() {
        assert!(Capabilities::headless().check_requirements(3).is_ok());
        assert!(Capabilities::default().check_requirements(3).is_err());

        let mut caps = Capabilities::headless();
        caps.version = Version::GL(4, 1);
        assert!(caps.check_requirements(3).is_ok());

        // Framebuffer objects alone can't run a GLSL 330 program.
        caps.version = Version::GL(3, 1);
        assert!(caps.check_requirements(3).is_err());

        caps.version = Version::ES(3, 0);
        assert!(caps.check_requirements(3).is_err());

        let mut caps = Capabilities::headless();
        caps.max_texture_units = 2;
        assert!(caps.check_requirements(3).is_err());
    }
}
