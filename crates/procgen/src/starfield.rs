//! Background starfield: points sampled uniformly over a spherical shell.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use rand::prelude::*;

/// One star as uploaded to the host's point buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct StarVertex {
    pub position: [f32; 3],
    pub size: f32,
    pub color: [f32; 4],
}

/// Shape of the star shell.
#[derive(Debug, Clone, Copy)]
pub struct StarfieldParams {
    pub count: usize,
    /// Stars are placed between these radii (scene units).
    pub inner_radius: f32,
    pub outer_radius: f32,
}

impl Default for StarfieldParams {
    fn default() -> Self {
        Self {
            count: 5000,
            inner_radius: 300.0,
            outer_radius: 600.0,
        }
    }
}

/// Star positions, generated once per scene and never regenerated. Only the
/// field's bulk rotation changes afterwards.
#[derive(Debug, Clone)]
pub struct Starfield {
    pub stars: Vec<StarVertex>,
}

impl Starfield {
    pub fn generate<R: Rng + ?Sized>(params: StarfieldParams, rng: &mut R) -> Self {
        let (inner, outer) = if params.inner_radius <= params.outer_radius {
            (params.inner_radius, params.outer_radius)
        } else {
            (params.outer_radius, params.inner_radius)
        };

        let stars = (0..params.count)
            .map(|_| {
                let r = inner + rng.gen::<f32>() * (outer - inner);
                // Uniform direction: azimuth uniform, cos(polar) uniform in [-1, 1].
                let theta = rng.gen::<f32>() * std::f32::consts::TAU;
                let phi = (2.0 * rng.gen::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
                let position = Vec3::new(
                    r * phi.sin() * theta.cos(),
                    r * phi.cos(),
                    r * phi.sin() * theta.sin(),
                );
                let brightness = 0.6 + rng.gen::<f32>() * 0.4;
                // Slight blue/yellow tint per star.
                let tint = rng.gen::<f32>() * 0.1 - 0.05;
                StarVertex {
                    position: position.to_array(),
                    size: 0.5 + rng.gen::<f32>(),
                    color: [
                        (brightness + tint).min(1.0),
                        brightness,
                        (brightness - tint).min(1.0),
                        1.0,
                    ],
                }
            })
            .collect();

        Self { stars }
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    /// Raw vertex bytes for the host's point buffer.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.stars)
    }
}
