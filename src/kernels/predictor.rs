//! This module contains the pure, stateless prediction kernel: it combines
//! the weighted local differences with the local sum inside an R-bit signed
//! register and clips the scaled prediction into the signed dynamic range.
//!
//! Every right shift here is arithmetic; the low bit of the scaled
//! prediction carries the parity consumed by the residual mapper.

use crate::pipeline::scan::CtrlFlags;
use crate::utils::{clip, mod_pow2};

/// Inputs for one prediction step.
#[derive(Debug, Clone, Copy)]
pub struct PredictorInputs<'a> {
    pub ctrl: &'a CtrlFlags,
    /// Sample bit depth D.
    pub depth: u16,
    /// Weight resolution omega.
    pub omega: i16,
    /// Register width R for the modular numerator reduction.
    pub register_bits: i16,
    /// Centered sample of the prior band at the cube origin, if available.
    /// Drives the only prediction at the origin cell; `None` predicts zero.
    pub prior_band_sample: Option<i32>,
    /// Dot product of weights and directional differences.
    pub numerator: i64,
    pub local_sum: i32,
}

/// The scaled prediction and its halved sample-domain value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prediction {
    /// scaled_pred >> 1, arithmetic.
    pub predicted: i32,
    /// Signed value in [-2^D, 2^D - 1]; low bit feeds the residual mapper.
    pub scaled_pred: i64,
}

/// Three-tap dot product of directional differences and weights, widened to
/// avoid intermediate overflow.
pub fn dot_product(diffs: &[i32], weights: &[i32]) -> i64 {
    diffs
        .iter()
        .zip(weights.iter())
        .map(|(&d, &w)| i64::from(d) * i64::from(w))
        .sum()
}

/// Computes the scaled prediction for one sample.
///
/// At the cube-origin cell only the prior band drives the prediction:
/// scaled_pred = 2 * max(prior, 0). Everywhere else the weighted numerator
/// plus `local_sum << omega` is reduced into an R-bit two's-complement
/// register, halved past the weight resolution, offset by one, and clipped
/// into [-2^D, 2^D - 1].
pub fn predict(inputs: &PredictorInputs<'_>) -> Prediction {
    let scaled_pred = if inputs.ctrl.first_line && inputs.ctrl.first_in_line {
        match inputs.prior_band_sample {
            Some(prior) if prior >= 0 => i64::from(prior) << 1,
            _ => 0,
        }
    } else {
        let loc_term = i64::from(inputs.local_sum) << inputs.omega;
        let reduced = mod_pow2(inputs.numerator + loc_term, inputs.register_bits);
        let candidate = (reduced >> (inputs.omega + 1)) + 1;
        let bound = 1i64 << inputs.depth;
        clip(candidate, -bound, bound - 1)
    };

    Prediction {
        predicted: (scaled_pred >> 1) as i32,
        scaled_pred,
    }
}

//==================================================================================
// Unit Tests
//==================================================================================
