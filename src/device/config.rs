use serde::{Deserialize, Serialize};

use crate::math::prelude::Vector2;

/// Window and surface parameters a device is constructed with.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Size of the window surface in pixels.
    pub size: Vector2<u32>,
    pub full_screen: bool,
    pub resizeable: bool,
    pub double_buf: bool,
    /// Waits for vertical synchronization when swapping buffers.
    pub vsync: bool,
    /// Bits of the depth buffer.
    pub depth_size: u8,
    /// Bits of the stencil buffer.
    pub stencil_size: u8,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig {
            size: Vector2::new(800, 600),
            full_screen: false,
            resizeable: true,
            double_buf: true,
            vsync: true,
            depth_size: 24,
            stencil_size: 8,
        }
    }
}

impl DeviceConfig {
    /// Parses a `"WxH"` resolution string.
    pub fn parse_resolution(v: &str) -> Option<Vector2<u32>> {
        let mut iter = v.trim().splitn(2, 'x');
        let w = iter.next()?.trim().parse().ok()?;
        let h = iter.next()?.trim().parse().ok()?;

        if w == 0 || h == 0 {
            None
        } else {
            Some(Vector2::new(w, h))
        }
    }

    /// Formats the size as a `"WxH"` resolution string.
    pub fn resolution(&self) -> String {
        format!("{}x{}", self.size.x, self.size.y)
    }
}
