use crate::math::prelude::*;

/// Reflectance of the surfaces being drawn.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Material {
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
}

impl Material {
    pub fn new(ambient: Color, diffuse: Color, specular: Color) -> Self {
        Material {
            ambient,
            diffuse,
            specular,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LightType {
    Point,
    Spot,
    Directional,
}

impl LightType {
    pub fn code(self) -> i32 {
        match self {
            LightType::Point => 0,
            LightType::Spot => 1,
            LightType::Directional => 2,
        }
    }
}

/// A light source occupying one of the device's light slots.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Light {
    pub light_type: LightType,
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub position: Vector3<f32>,
    pub direction: Vector3<f32>,
    /// Constant, linear and quadratic attenuation factors.
    pub attenuation: [f32; 3],
    /// Half angle of the spot cone, in radians.
    pub spot_angle: f32,
    pub spot_intensity: f32,
}

impl Default for Light {
    fn default() -> Self {
        Light {
            light_type: LightType::Point,
            ambient: Color::black(),
            diffuse: Color::white(),
            specular: Color::white(),
            position: Vector3::new(0.0, 0.0, 0.0),
            direction: Vector3::new(0.0, 0.0, 1.0),
            attenuation: [1.0, 0.0, 0.0],
            spot_angle: ::std::f32::consts::FRAC_PI_2,
            spot_intensity: 1.0,
        }
    }
}

impl Light {
    /// Returns the position uploaded to the shader program. Directional
    /// lights send the direction towards the light with `w = 0`.
    pub fn homogeneous_position(&self) -> Vector4<f32> {
        match self.light_type {
            LightType::Directional => {
                Vector4::new(-self.direction.x, -self.direction.y, -self.direction.z, 0.0)
            }
            _ => Vector4::new(self.position.x, self.position.y, self.position.z, 1.0),
        }
    }
}
