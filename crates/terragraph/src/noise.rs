//! Fractal / domain-warped noise applied to a height field.
//!
//! Two configured noise instances drive each cell: one warps the physical
//! sample point, the other evaluates the base fractal at the warped point.
//! The result combines with the existing height via the node's height mode,
//! but only where the existing height reaches the apply threshold.
use fastnoise_lite::{DomainWarpType, FastNoiseLite, FractalType, NoiseType};

use crate::field::HeightField;
use crate::grid::GridDescriptor;
use crate::node::{FractalKind, NoiseKind, NoiseLayerSettings, NoiseSettings, WarpFractalKind,
    WarpKind, WarpSettings};

impl From<NoiseKind> for NoiseType {
    fn from(kind: NoiseKind) -> Self {
        match kind {
            NoiseKind::OpenSimplex2 => NoiseType::OpenSimplex2,
            NoiseKind::OpenSimplex2S => NoiseType::OpenSimplex2S,
            NoiseKind::Cellular => NoiseType::Cellular,
            NoiseKind::Perlin => NoiseType::Perlin,
            NoiseKind::ValueCubic => NoiseType::ValueCubic,
            NoiseKind::Value => NoiseType::Value,
        }
    }
}

impl From<FractalKind> for FractalType {
    fn from(kind: FractalKind) -> Self {
        match kind {
            FractalKind::None => FractalType::None,
            FractalKind::Fbm => FractalType::FBm,
            FractalKind::Ridged => FractalType::Ridged,
            FractalKind::PingPong => FractalType::PingPong,
        }
    }
}

impl From<WarpKind> for DomainWarpType {
    fn from(kind: WarpKind) -> Self {
        match kind {
            WarpKind::OpenSimplex2 => DomainWarpType::OpenSimplex2,
            WarpKind::OpenSimplex2Reduced => DomainWarpType::OpenSimplex2Reduced,
            WarpKind::BasicGrid => DomainWarpType::BasicGrid,
        }
    }
}

impl From<WarpFractalKind> for FractalType {
    fn from(kind: WarpFractalKind) -> Self {
        match kind {
            WarpFractalKind::None => FractalType::None,
            WarpFractalKind::Progressive => FractalType::DomainWarpProgressive,
            WarpFractalKind::Independent => FractalType::DomainWarpIndependent,
        }
    }
}

fn build_noise(settings: &NoiseLayerSettings, seed: i32) -> FastNoiseLite {
    let mut noise = FastNoiseLite::new();
    noise.set_seed(Some(seed));
    noise.set_noise_type(Some(settings.kind.into()));
    noise.set_frequency(Some(settings.frequency));
    noise.set_fractal_type(Some(settings.fractal.into()));
    noise.set_fractal_octaves(Some(settings.octaves as i32));
    noise.set_fractal_lacunarity(Some(settings.lacunarity));
    noise.set_fractal_gain(Some(settings.gain));
    noise
}

fn build_warp(settings: &WarpSettings, seed: i32) -> FastNoiseLite {
    let mut warp = FastNoiseLite::new();
    warp.set_seed(Some(seed));
    warp.set_domain_warp_type(Some(settings.kind.into()));
    warp.set_domain_warp_amp(Some(settings.amplitude));
    warp.set_frequency(Some(settings.frequency));
    warp.set_fractal_type(Some(settings.fractal.into()));
    warp.set_fractal_octaves(Some(settings.octaves as i32));
    warp.set_fractal_lacunarity(Some(settings.lacunarity));
    warp.set_fractal_gain(Some(settings.gain));
    warp
}

/// Apply domain-warped fractal noise to a copy of `input`.
pub fn apply(input: &HeightField, grid: &GridDescriptor, settings: &NoiseSettings) -> HeightField {
    assert_eq!(
        input.resolution(),
        grid.resolution,
        "noise input must match the grid resolution"
    );

    let seed = settings.seed as i32;
    let warp = build_warp(&settings.warp, seed);
    let noise = build_noise(&settings.noise, seed);

    let mut out = input.clone();
    let n = grid.resolution;
    for row in 0..n {
        for col in 0..n {
            let index = out.index(col, row);
            let existing = out.data()[index];
            // Masking policy, not a blend: cells below the threshold stay.
            if existing < settings.apply_height_threshold {
                continue;
            }

            let p = grid.index_to_physical(col, row);
            let (wx, wy) = warp.domain_warp_2d(p.x, p.y);
            let value = noise.get_noise_2d(wx, wy) * settings.multiplier;
            out.data_mut()[index] = settings.mode.apply(existing, value);
        }
    }

    out
}
