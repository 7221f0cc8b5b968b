//! Modifier kinds and their settings.
//!
//! This module defines the data model for modifier nodes. Each [`ModifierKind`]
//! is a typed operation in the terrain DAG carrying its own settings payload;
//! defaults stand in for the freshly-created configuration of a new node.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::field::MaskField;
use crate::gradient::Gradient;
use crate::grid::GridDescriptor;

/// How a computed value combines with the existing height at a cell.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeightMode {
    Set,
    Add,
    Subtract,
    Multiply,
}

impl HeightMode {
    /// Apply this mode to an existing height and an incoming value.
    #[inline]
    pub fn apply(self, existing: f32, value: f32) -> f32 {
        match self {
            HeightMode::Set => value,
            HeightMode::Add => existing + value,
            HeightMode::Subtract => existing - value,
            HeightMode::Multiply => existing * value,
        }
    }
}

/// Elementwise combination mode for the Combine node.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CombineMode {
    Blend,
    Max,
    Min,
    Add,
    Subtract,
}

/// Height profile applied across each fault line.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaultMode {
    Step,
    Sin,
    Cos,
}

/// Gradient estimator used by the Slope node.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlopeStyle {
    /// 4-neighbor central difference.
    Center,
    /// 8-neighbor Sobel-weighted average.
    Average,
}

/// Base noise algorithm for the Noise node.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoiseKind {
    OpenSimplex2,
    OpenSimplex2S,
    Cellular,
    Perlin,
    ValueCubic,
    Value,
}

/// Fractal accumulation applied to the base noise.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FractalKind {
    None,
    Fbm,
    Ridged,
    PingPong,
}

/// Domain warp algorithm.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WarpKind {
    OpenSimplex2,
    OpenSimplex2Reduced,
    BasicGrid,
}

/// Fractal accumulation applied to the domain warp.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WarpFractalKind {
    None,
    Progressive,
    Independent,
}

/// Settings for the Start node: the grid every downstream node evaluates over.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StartSettings {
    pub grid: GridDescriptor,
}

/// Settings for the HeightMap node: a stored map resampled onto the grid.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct HeightMapSettings {
    /// Row-major stored map, `map_resolution²` values.
    pub map: Vec<f32>,
    pub map_resolution: usize,
    pub mode: HeightMode,
}

impl Default for HeightMapSettings {
    fn default() -> Self {
        Self {
            map: vec![0.0; 4],
            map_resolution: 2,
            mode: HeightMode::Set,
        }
    }
}

/// Fractal knobs shared by the warp and base layers of the Noise node.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct NoiseLayerSettings {
    pub kind: NoiseKind,
    pub fractal: FractalKind,
    pub frequency: f32,
    pub octaves: u32,
    pub lacunarity: f32,
    pub gain: f32,
}

impl Default for NoiseLayerSettings {
    fn default() -> Self {
        Self {
            kind: NoiseKind::OpenSimplex2,
            fractal: FractalKind::Fbm,
            frequency: 0.01,
            octaves: 4,
            lacunarity: 2.0,
            gain: 0.5,
        }
    }
}

/// Domain warp configuration of the Noise node.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct WarpSettings {
    pub kind: WarpKind,
    pub fractal: WarpFractalKind,
    pub amplitude: f32,
    pub frequency: f32,
    pub octaves: u32,
    pub lacunarity: f32,
    pub gain: f32,
}

impl Default for WarpSettings {
    fn default() -> Self {
        Self {
            kind: WarpKind::OpenSimplex2,
            fractal: WarpFractalKind::None,
            amplitude: 1.0,
            frequency: 0.005,
            octaves: 4,
            lacunarity: 2.0,
            gain: 0.5,
        }
    }
}

/// Settings for the Noise node.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct NoiseSettings {
    pub seed: u64,
    pub mode: HeightMode,
    pub warp: WarpSettings,
    pub noise: NoiseLayerSettings,
    /// Cells whose existing height is below this threshold are left untouched.
    pub apply_height_threshold: f32,
    pub multiplier: f32,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            mode: HeightMode::Add,
            warp: WarpSettings::default(),
            noise: NoiseLayerSettings::default(),
            apply_height_threshold: 0.0,
            multiplier: 1.0,
        }
    }
}

/// Settings for the Fault node.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct FaultSettings {
    pub seed: u64,
    pub iterations: u32,
    /// Physical distance over which the Sin/Cos profiles decay.
    pub falloff: f32,
    pub mode: FaultMode,
}

impl Default for FaultSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            iterations: 64,
            falloff: 10.0,
            mode: FaultMode::Cos,
        }
    }
}

/// Settings for the Combine node.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct CombineSettings {
    pub mode: CombineMode,
    /// Blend factor, only used by [`CombineMode::Blend`].
    pub ratio: f32,
    pub swap_inputs: bool,
}

impl Default for CombineSettings {
    fn default() -> Self {
        Self {
            mode: CombineMode::Blend,
            ratio: 0.5,
            swap_inputs: false,
        }
    }
}

/// Settings for the FIR smoothing filter.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct FirFilterSettings {
    /// Smoothing strength in [0, 1]; 0 is a no-op.
    pub blend: f32,
}

impl Default for FirFilterSettings {
    fn default() -> Self {
        Self { blend: 0.5 }
    }
}

/// Settings for hydraulic droplet erosion.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ErosionSettings {
    pub seed: u64,
    /// Number of droplets simulated per execute.
    pub iterate_count: u32,
    /// Erosion brush radius in cells.
    pub radius: usize,
    pub inertia: f32,
    pub deposit_speed: f32,
    pub sediment_capacity_factor: f32,
    pub min_sediment_capacity: f32,
    pub erode_speed: f32,
    pub gravity: f32,
    pub evaporate_speed: f32,
    pub max_droplet_lifetime: u32,
    pub initial_water: f32,
    pub initial_speed: f32,
}

impl Default for ErosionSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            iterate_count: 50_000,
            radius: 3,
            inertia: 0.05,
            deposit_speed: 0.3,
            sediment_capacity_factor: 4.0,
            min_sediment_capacity: 0.01,
            erode_speed: 0.3,
            gravity: 4.0,
            evaporate_speed: 0.01,
            max_droplet_lifetime: 30,
            initial_water: 1.0,
            initial_speed: 1.0,
        }
    }
}

/// Settings for thermal erosion.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ThermalSettings {
    pub iterate_count: u32,
    /// Talus threshold: minimum height drop before material moves.
    pub slope_threshold: f32,
    /// Fraction of the drop transferred per step.
    pub erosion_rate: f32,
}

impl Default for ThermalSettings {
    fn default() -> Self {
        Self {
            iterate_count: 50,
            slope_threshold: 0.01,
            erosion_rate: 0.5,
        }
    }
}

/// Settings for the Height mask node.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct HeightMaskSettings {
    pub min_height_ratio: f32,
    pub max_height_ratio: f32,
}

impl Default for HeightMaskSettings {
    fn default() -> Self {
        Self {
            min_height_ratio: 0.0,
            max_height_ratio: 1.0,
        }
    }
}

/// Settings for the Slope mask node. Angles are in degrees.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct SlopeSettings {
    pub style: SlopeStyle,
    pub min_angle: f32,
    pub max_angle: f32,
}

impl Default for SlopeSettings {
    fn default() -> Self {
        Self {
            style: SlopeStyle::Center,
            min_angle: 0.0,
            max_angle: 90.0,
        }
    }
}

/// Settings for the ColorGradient node.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColorGradientSettings {
    pub gradient: Gradient,
}

/// Settings for the WeightMap node: a stored mask of its own resolution.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct WeightMapSettings {
    pub map: MaskField,
    pub mode: HeightMode,
}

impl Default for WeightMapSettings {
    fn default() -> Self {
        Self {
            map: MaskField::new(2),
            mode: HeightMode::Multiply,
        }
    }
}

/// A modifier node kind together with its settings payload.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum ModifierKind {
    Start(StartSettings),
    HeightMap(HeightMapSettings),
    Noise(NoiseSettings),
    Fault(FaultSettings),
    Combine(CombineSettings),
    FirFilter(FirFilterSettings),
    Erosion(ErosionSettings),
    ThermalErosion(ThermalSettings),
    Height(HeightMaskSettings),
    Slope(SlopeSettings),
    ColorGradient(ColorGradientSettings),
    Rgba,
    WeightMap(WeightMapSettings),
    Output,
}

impl ModifierKind {
    /// Number of input slots this kind exposes.
    pub fn max_input_count(&self) -> usize {
        match self {
            ModifierKind::Start(_) => 0,
            ModifierKind::Combine(_) => 2,
            ModifierKind::Rgba => 4,
            _ => 1,
        }
    }

    /// Whether executing this kind produces a mask field of its own.
    pub fn has_mask_output(&self) -> bool {
        matches!(
            self,
            ModifierKind::Height(_)
                | ModifierKind::Slope(_)
                | ModifierKind::ColorGradient(_)
                | ModifierKind::Rgba
                | ModifierKind::WeightMap(_)
                | ModifierKind::Output
        )
    }

    /// Display name of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            ModifierKind::Start(_) => "Start",
            ModifierKind::HeightMap(_) => "HeightMap",
            ModifierKind::Noise(_) => "Noise",
            ModifierKind::Fault(_) => "Fault",
            ModifierKind::Combine(_) => "Combine",
            ModifierKind::FirFilter(_) => "FIRFilter",
            ModifierKind::Erosion(_) => "Erosion",
            ModifierKind::ThermalErosion(_) => "ThermalErosion",
            ModifierKind::Height(_) => "Height",
            ModifierKind::Slope(_) => "Slope",
            ModifierKind::ColorGradient(_) => "ColorGradient",
            ModifierKind::Rgba => "RGBA",
            ModifierKind::WeightMap(_) => "WeightMap",
            ModifierKind::Output => "Output",
        }
    }

    /// Creates a Start node kind for the given grid.
    pub fn start(grid: GridDescriptor) -> Self {
        ModifierKind::Start(StartSettings { grid })
    }

    /// Creates a HeightMap node kind from a stored map.
    pub fn height_map(map_resolution: usize, map: Vec<f32>, mode: HeightMode) -> Self {
        ModifierKind::HeightMap(HeightMapSettings {
            map,
            map_resolution,
            mode,
        })
    }

    /// Creates a Combine node kind.
    pub fn combine(mode: CombineMode, ratio: f32) -> Self {
        ModifierKind::Combine(CombineSettings {
            mode,
            ratio,
            swap_inputs: false,
        })
    }

    /// Creates a FIR filter node kind.
    pub fn fir_filter(blend: f32) -> Self {
        ModifierKind::FirFilter(FirFilterSettings { blend })
    }

    /// Creates a WeightMap node kind from a stored mask.
    pub fn weight_map(map: MaskField, mode: HeightMode) -> Self {
        ModifierKind::WeightMap(WeightMapSettings { map, mode })
    }
}
