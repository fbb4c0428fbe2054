//! This module contains the weight vector kernels: the reseed applied at the
//! cube origin and the per-sample sign-of-error update.
//!
//! The weight vector holds P spectral taps followed by the three directional
//! taps. The reseed cascade (7/8 of full scale, then successive eighths)
//! applies to the spectral prefix; directional taps reseed to zero. Updates
//! clip every component into [-2^(omega+2), 2^(omega+2) - 1].

use crate::pipeline::scan::CtrlFlags;
use crate::utils::clip;

/// Inputs for one weight update step.
#[derive(Debug, Clone, Copy)]
pub struct WeightUpdateInputs<'a> {
    pub ctrl: &'a CtrlFlags,
    pub depth: u16,
    pub omega: i16,
    pub scaled_pred: i64,
    /// Centered reconstructed sample.
    pub sample: i32,
    pub diffs: &'a [i32],
}

/// Initial weight vector for `components` taps.
///
/// Under the reduced layout every component belongs to the cascade; under the
/// full layout the trailing three directional taps start at zero. With the
/// only supported configuration (P = 0, full), all taps start at zero.
pub fn init_weights(reduced: bool, omega: i16, components: usize) -> Vec<i32> {
    let mut weights = vec![0i32; components];
    let cascade = if reduced {
        components
    } else {
        components.saturating_sub(3)
    };
    if cascade > 0 {
        weights[0] = ((7i64 << omega) / 8) as i32;
        for i in 1..cascade {
            weights[i] = weights[i - 1] / 8;
        }
    }
    weights
}

/// Applies the sign-of-error update to every tap, or reseeds the vector at
/// the cube-origin cell.
///
/// The update term is the directional difference, negated when the doubled
/// sample falls below the scaled prediction, scaled by
/// 2^-(scale_exponent + D - omega) with floor semantics, then halved with
/// rounding.
pub fn weight_update(weights: &mut [i32], inputs: &WeightUpdateInputs<'_>, reduced: bool) {
    if weights.is_empty() {
        return;
    }
    if inputs.ctrl.first_line && inputs.ctrl.first_in_line {
        let seed = init_weights(reduced, inputs.omega, weights.len());
        weights.copy_from_slice(&seed);
        return;
    }

    let non_negative_error = (i64::from(inputs.sample) << 1) >= inputs.scaled_pred;
    let shift =
        i32::from(inputs.ctrl.scale_exponent) + i32::from(inputs.depth) - i32::from(inputs.omega);
    let limit = 1i64 << (inputs.omega + 2);
    for (w, &d) in weights.iter_mut().zip(inputs.diffs.iter()) {
        let mut adjusted = if non_negative_error {
            i64::from(d)
        } else {
            -i64::from(d)
        };
        if shift > 0 {
            adjusted >>= shift;
        } else if shift < 0 {
            adjusted <<= -shift;
        }
        let update = (adjusted + 1) >> 1;
        *w = clip(i64::from(*w) + update, -limit, limit - 1) as i32;
    }
}

//==================================================================================
// Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn interior_ctrl(scale_exponent: i16) -> CtrlFlags {
        CtrlFlags {
            first_line: false,
            first_in_line: false,
            last_in_line: false,
            last: false,
            scale_exponent,
        }
    }

    fn origin_ctrl() -> CtrlFlags {
        CtrlFlags {
            first_line: true,
            first_in_line: true,
            last_in_line: false,
            last: false,
            scale_exponent: 0,
        }
    }

    #[test]
    fn test_init_weights_full_layout() {
        // Five components, full layout: two spectral taps take the cascade,
        // the directional taps start at zero.
        let weights = init_weights(false, 4, 5);
        assert_eq!(weights.len(), 5);
        assert_eq!(weights[0], 14); // (7 << 4) / 8
        assert_eq!(weights[1], 1);
        assert!(weights[2..].iter().all(|&w| w == 0));
    }

    #[test]
    fn test_init_weights_reduced_layout() {
        let weights = init_weights(true, 4, 4);
        assert_eq!(weights, vec![14, 1, 0, 0]);
    }

    #[test]
    fn test_init_weights_directional_only_is_zero() {
        // The supported configuration: P = 0, three directional taps.
        assert_eq!(init_weights(false, 19, 3), vec![0, 0, 0]);
    }

    #[test]
    fn test_origin_cell_reseeds() {
        let ctrl = origin_ctrl();
        let mut weights = vec![5i32; 4];
        let diffs = [6, 4, 2, 0];
        let inputs = WeightUpdateInputs {
            ctrl: &ctrl,
            depth: 4,
            omega: 4,
            scaled_pred: 0,
            sample: 0,
            diffs: &diffs,
        };
        weight_update(&mut weights, &inputs, false);
        assert_eq!(weights, init_weights(false, 4, 4));
    }

    #[test]
    fn test_update_tracks_error_sign() {
        let ctrl = interior_ctrl(0);
        let diffs = [6, 4, 2, 0];
        let mut weights = init_weights(false, 4, 4);

        // Doubled sample above the scaled prediction: positive differences
        // push their taps up.
        let increase = WeightUpdateInputs {
            ctrl: &ctrl,
            depth: 4,
            omega: 4,
            scaled_pred: 16,
            sample: 12,
            diffs: &diffs,
        };
        weight_update(&mut weights, &increase, false);
        let after_increase = weights.clone();
        assert!(after_increase[..3].iter().all(|&w| w > 0));

        // Doubled sample below the scaled prediction: the same differences
        // now pull the taps back down.
        let decrease = WeightUpdateInputs {
            ctrl: &ctrl,
            depth: 4,
            omega: 4,
            scaled_pred: 32,
            sample: 0,
            diffs: &diffs,
        };
        weight_update(&mut weights, &decrease, false);
        for (updated, prior) in weights.iter().zip(after_increase.iter()) {
            assert!(updated <= prior);
        }
    }

    #[test]
    fn test_negative_shift_scales_up() {
        // scale_exponent + D - omega = -6 + 4 - 4 = -6: the difference is
        // left-shifted before the halving.
        let ctrl = interior_ctrl(-6);
        let diffs = [1, 0, 0];
        let mut weights = vec![0i32; 3];
        let inputs = WeightUpdateInputs {
            ctrl: &ctrl,
            depth: 4,
            omega: 4,
            scaled_pred: 0,
            sample: 1,
            diffs: &diffs,
        };
        weight_update(&mut weights, &inputs, false);
        // (64 + 1) >> 1 = 32.
        assert_eq!(weights[0], 32);
    }

    #[test]
    fn test_update_clips_to_weight_range() {
        let ctrl = interior_ctrl(-8);
        let omega = 4i16;
        let limit = 1i32 << (omega + 2);
        let diffs = [i32::MAX / 2, -(i32::MAX / 2), 0];
        let mut weights = vec![0i32; 3];
        let inputs = WeightUpdateInputs {
            ctrl: &ctrl,
            depth: 4,
            omega,
            scaled_pred: 0,
            sample: 1,
            diffs: &diffs,
        };
        weight_update(&mut weights, &inputs, false);
        assert_eq!(weights[0], limit - 1);
        assert_eq!(weights[1], -limit);
    }
}
