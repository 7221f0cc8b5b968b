#![forbid(unsafe_code)]
//! terragraph: procedural terrain height/mask synthesis as a graph of modifier nodes.
//!
//! Modules:
//! - graph/node: author and evaluate a DAG of modifier nodes over a fixed-resolution grid
//! - erosion/thermal/fault/noise: the numerical synthesis algorithms the graph hosts
//! - combine/fir: arithmetic combination and separable smoothing
//! - mask/gradient: mask derivation (height/slope selection, channel remix, gradients)
//!
//! For examples and docs, see README and docs.rs.
pub mod combine;
pub mod erosion;
pub mod error;
pub mod fault;
pub mod field;
pub mod fir;
pub mod gradient;
pub mod graph;
pub mod grid;
pub mod mask;
pub mod node;
pub mod noise;
pub(crate) mod rng;
pub mod thermal;

/// Convenient re-exports for common types. Import with `use terragraph::prelude::*;`.
pub mod prelude {
    pub use crate::erosion::ErosionBrush;
    pub use crate::error::{Error, Result};
    pub use crate::field::{HeightField, MaskField, Rgba};
    pub use crate::gradient::{Gradient, GradientKey};
    pub use crate::graph::{Graph, ModifierNode, NodeId};
    pub use crate::grid::GridDescriptor;
    pub use crate::node::{
        ColorGradientSettings, CombineMode, CombineSettings, ErosionSettings, FaultMode,
        FaultSettings, FirFilterSettings, FractalKind, HeightMapSettings, HeightMaskSettings,
        HeightMode, ModifierKind, NoiseKind, NoiseLayerSettings, NoiseSettings, SlopeSettings,
        SlopeStyle, StartSettings, ThermalSettings, WarpFractalKind, WarpKind, WarpSettings,
        WeightMapSettings,
    };
}
