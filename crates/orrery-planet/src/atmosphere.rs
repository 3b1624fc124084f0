//! Visual-only atmosphere shell around a generated planet.

use glam::Vec3;
use orrery_mesh::{Color, IcoSphere, Mesh, MeshError};
use rand::Rng;

/// Shell radius as a multiple of the planet's outer radius.
pub const SHELL_EXPAND: f32 = 1.02;
/// Shell thickness as a fraction of the planet's outer radius.
pub const SHELL_THICKNESS: f32 = 0.04;

/// Scattering parameters handed to the renderer with the shell mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct AtmosphereParams {
    /// Planet surface radius (the terrain's outer radius).
    pub planet_radius: f32,
    /// Top of the atmosphere.
    pub atmosphere_radius: f32,
    /// Radius where the shell starts fading in.
    pub inner_radius: f32,
    pub thickness: f32,
    /// Rayleigh scattering coefficients (RGB).
    pub rayleigh_coefficients: Vec3,
    /// Rayleigh scale height, half the shell thickness.
    pub rayleigh_scale_height: f32,
    pub mie_coefficient: f32,
    /// Mie scale height; haze hugs the ground at a tenth of the thickness.
    pub mie_scale_height: f32,
    /// Henyey-Greenstein g: 0 is isotropic, 1 fully forward.
    pub mie_direction: f32,
    /// Sky tint with the overall strength in alpha.
    pub tint: Color,
}

impl AtmosphereParams {
    pub fn for_outer_radius(outer_radius: f32, tint: Color) -> Self {
        let atmosphere_radius = outer_radius * SHELL_EXPAND;
        let thickness = outer_radius * SHELL_THICKNESS;
        Self {
            planet_radius: outer_radius,
            atmosphere_radius,
            inner_radius: atmosphere_radius - thickness,
            thickness,
            rayleigh_coefficients: Vec3::new(5.8e-4, 13.5e-4, 33.1e-4),
            rayleigh_scale_height: thickness * 0.5,
            mie_coefficient: 2e-4,
            mie_scale_height: thickness * 0.1,
            mie_direction: 0.76,
            tint,
        }
    }

    /// Random hue at half saturation and full value, alpha 0.5.
    pub fn random_tint<R: Rng>(rng: &mut R) -> Color {
        Color::from_hsv(rng.random::<f32>(), 0.5, 1.0).with_alpha(0.5)
    }
}

/// Non-colliding sphere mesh plus its shading parameters.
#[derive(Clone, Debug)]
pub struct AtmosphereShell {
    pub mesh: Mesh,
    pub params: AtmosphereParams,
}

impl AtmosphereShell {
    pub fn build<R: Rng>(outer_radius: f32, level: u32, rng: &mut R) -> Result<Self, MeshError> {
        let params = AtmosphereParams::for_outer_radius(outer_radius, AtmosphereParams::random_tint(rng));
        let mut mesh = IcoSphere::build(level, params.atmosphere_radius)?;
        mesh.name = "Atmosphere".to_string();
        mesh.fill_colors(params.tint);
        Ok(Self { mesh, params })
    }
}
