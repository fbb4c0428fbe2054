//! The single source of truth for all cubec codec configuration.
//!
//! This module defines the unified `Params` struct, which is designed to be
//! created once at the application boundary (e.g., from a user's YAML file or
//! a parsed container header) and then passed down through the pipeline by
//! shared reference. `Params::validate` centralizes every range check so the
//! kernels can assume well-formed inputs.

use serde::{Deserialize, Serialize};

use crate::error::CodecError;

//==================================================================================
// I. Core Configuration Enums & Structs
//==================================================================================

/// The local-sum neighborhood shape used by the predictor.
///
/// Only `NeighborNarrow` is implemented by the scalar pipeline; the other
/// variants exist so that container headers written by wider toolchains can be
/// parsed and rejected with a precise error instead of a framing failure.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LocalSumMode {
    NeighborWide,
    #[default]
    NeighborNarrow,
    ColumnWide,
    ColumnNarrow,
}

impl LocalSumMode {
    /// Decodes the on-wire `u16` used by the v3 container header.
    pub fn from_wire(value: u16) -> Result<Self, CodecError> {
        match value {
            0 => Ok(Self::NeighborWide),
            1 => Ok(Self::NeighborNarrow),
            2 => Ok(Self::ColumnWide),
            3 => Ok(Self::ColumnNarrow),
            other => Err(CodecError::InvalidContainer(format!(
                "Unknown local-sum mode {}",
                other
            ))),
        }
    }

    /// The on-wire `u16` stored in the v3 container header.
    pub fn to_wire(self) -> u16 {
        match self {
            Self::NeighborWide => 0,
            Self::NeighborNarrow => 1,
            Self::ColumnWide => 2,
            Self::ColumnNarrow => 3,
        }
    }
}

/// Tuning of the sample-adaptive Golomb coder.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoderParams {
    /// Unary-prefix limit; prefixes of `u_max` zeros escape to a raw D-bit
    /// symbol.
    pub u_max: u16,
    /// Counter size gamma: the shared counter renormalizes at 2^gamma - 1.
    pub counter_size: u16,
    /// Initial count exponent gamma_0: the counter restarts at 2^gamma_0.
    pub initial_count_exponent: u16,
    /// Per-band accumulator seed exponent k'_z.
    pub kz_prime: u16,
}

impl Default for CoderParams {
    fn default() -> Self {
        Self {
            u_max: 18,
            counter_size: 6,
            initial_count_exponent: 1,
            kz_prime: 0,
        }
    }
}

//==================================================================================
// II. The Unified Params
//==================================================================================

/// The immutable configuration for one codec run.
///
/// Dimensions and depth describe the sample cube; the remaining fields tune
/// the predictor and the entropy coder. The defaults match the historical
/// encoder configuration, not the v2 container decode defaults (those live in
/// the container framer).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Params {
    /// Samples per row.
    pub nx: u16,
    /// Rows per band.
    pub ny: u16,
    /// Number of spectral bands.
    pub nz: u16,
    /// Sample bit depth D, in (0, 16].
    pub depth: u16,
    /// Predictor order P. Only 0 (three directional taps) is supported.
    pub p: u16,

    /// Reduced prediction mode flag. Not supported by the scalar pipeline.
    #[serde(default)]
    pub reduced: bool,
    /// Column-oriented local-sum flag. Not supported by the scalar pipeline.
    #[serde(default)]
    pub column_oriented: bool,

    #[serde(default)]
    pub local_sum: LocalSumMode,

    /// Weight resolution omega, in (0, 31].
    pub omega: i16,
    /// Predictor register width R, in (0, 64].
    pub register_bits: i16,
    /// Weight-update scale exponent bounds and log2 update period.
    pub v_min: i16,
    pub v_max: i16,
    pub tinc_log: i16,

    #[serde(default)]
    pub coder: CoderParams,
}

impl Params {
    /// Convenience constructor for the common lossless configuration: all
    /// predictor and coder tuning at defaults, caller supplies the cube shape.
    pub fn for_cube(nx: u16, ny: u16, nz: u16, depth: u16) -> Self {
        Self {
            nx,
            ny,
            nz,
            depth,
            ..Self::default()
        }
    }

    /// Total number of samples in the cube.
    pub fn total_samples(&self) -> usize {
        self.nx as usize * self.ny as usize * self.nz as usize
    }

    /// Number of weight components: P spectral taps plus the three
    /// directional taps.
    pub fn weight_components(&self) -> usize {
        self.p as usize + 3
    }

    /// Validates every parameter range. The pipeline assumes a validated
    /// `Params` and performs no further range checks.
    pub fn validate(&self) -> Result<(), CodecError> {
        if self.nx == 0 || self.ny == 0 || self.nz == 0 {
            return Err(CodecError::InvalidParams(
                "Image dimensions must be positive".to_string(),
            ));
        }
        if self.depth == 0 || self.depth > 16 {
            return Err(CodecError::InvalidParams(
                "Bit depth must be within (0, 16]".to_string(),
            ));
        }
        if self.p != 0 {
            return Err(CodecError::InvalidParams(
                "Predictor order P > 0 is not supported".to_string(),
            ));
        }
        if self.reduced {
            return Err(CodecError::InvalidParams(
                "Reduced prediction mode is not supported".to_string(),
            ));
        }
        if self.column_oriented {
            return Err(CodecError::InvalidParams(
                "Column-oriented local sums are not supported".to_string(),
            ));
        }
        if self.local_sum != LocalSumMode::NeighborNarrow {
            return Err(CodecError::InvalidParams(
                "Only neighbor-narrow local sums are implemented".to_string(),
            ));
        }
        if self.omega <= 0 || self.omega > 31 {
            return Err(CodecError::InvalidParams(
                "OMEGA must be within (0, 31]".to_string(),
            ));
        }
        if self.register_bits <= 0 || self.register_bits > 64 {
            return Err(CodecError::InvalidParams(
                "Register size must be within (0, 64]".to_string(),
            ));
        }
        if self.v_min > self.v_max {
            return Err(CodecError::InvalidParams(
                "V_MIN must not exceed V_MAX".to_string(),
            ));
        }
        if !(0..=32).contains(&self.tinc_log) {
            return Err(CodecError::InvalidParams(
                "T_INC log2 period must be within [0, 32]".to_string(),
            ));
        }
        if self.coder.u_max == 0 || self.coder.u_max > 32 {
            return Err(CodecError::InvalidParams(
                "UMAX must be within (0, 32]".to_string(),
            ));
        }
        if self.coder.counter_size == 0 || self.coder.counter_size > 16 {
            return Err(CodecError::InvalidParams(
                "Counter size must be within (0, 16]".to_string(),
            ));
        }
        if self.coder.initial_count_exponent > 16 {
            return Err(CodecError::InvalidParams(
                "Initial count exponent must be within [0, 16]".to_string(),
            ));
        }
        if self.coder.kz_prime > 16 {
            return Err(CodecError::InvalidParams(
                "KZ' must be within [0, 16]".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            nx: 0,
            ny: 0,
            nz: 0,
            depth: 0,
            p: 0,
            reduced: false,
            column_oriented: false,
            local_sum: LocalSumMode::NeighborNarrow,
            omega: 19,
            register_bits: 64,
            v_min: -1,
            v_max: 3,
            tinc_log: 6,
            coder: CoderParams::default(),
        }
    }
}

//==================================================================================
// III. Unit Tests
//==================================================================================
