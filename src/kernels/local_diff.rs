//! This module contains the pure, stateless kernel computing the
//! neighbor-narrow local sum and the directional local differences that feed
//! the predictor.
//!
//! All samples are centered (signed). Neighbor availability is conveyed by
//! the scan flags, not by sentinel values: the first line, first column and
//! last column each select a dedicated local-sum rule.

use crate::pipeline::scan::CtrlFlags;

/// The centered neighborhood of the current sample within one band.
///
/// Absent neighbors are zero except north-east at the last column, which the
/// band window substitutes with north before this kernel runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSamples {
    pub cur: i32,
    pub north: i32,
    pub north_east: i32,
    pub north_west: i32,
    pub west: i32,
}

/// Local sum plus the three directional differences and the center-relative
/// difference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalDiff {
    pub local_sum: i32,
    pub d_c: i32,
    pub d_n: i32,
    pub d_w: i32,
    pub d_nw: i32,
}

/// Computes the neighbor-narrow local sum and directional differences.
///
/// Local-sum cases:
/// - cube-origin cell of a band (first line, first column): 0
/// - interior of the first line: 4*west
/// - first column below the first line: 2*north + 2*north_east
/// - last column below the first line: west + north_west + 2*north
/// - interior: west + north_west + north + north_east
pub fn local_diff(ctrl: &CtrlFlags, samples: &LocalSamples) -> LocalDiff {
    let mut out = LocalDiff::default();

    let mut term1 = 0i32;
    let mut term2 = 0i32;
    if !ctrl.first_line && !ctrl.first_in_line && !ctrl.last_in_line {
        term1 = samples.west + samples.north_west;
        term2 = samples.north + samples.north_east;
    } else if ctrl.first_line && !ctrl.first_in_line {
        term1 = 4 * samples.west;
    } else if !ctrl.first_line && ctrl.first_in_line {
        term1 = 2 * samples.north;
        term2 = 2 * samples.north_east;
    } else if !ctrl.first_line && ctrl.last_in_line {
        term1 = samples.west + samples.north_west;
        term2 = 2 * samples.north;
    }
    out.local_sum = term1 + term2;

    if ctrl.first_line && ctrl.first_in_line {
        out.local_sum = 0;
        out.d_c = 0;
    } else {
        out.d_c = 4 * samples.cur - out.local_sum;
    }

    if !ctrl.first_line {
        out.d_n = 4 * samples.north - out.local_sum;
        if !ctrl.first_in_line {
            out.d_w = 4 * samples.west - out.local_sum;
            out.d_nw = 4 * samples.north_west - out.local_sum;
        } else {
            out.d_w = 4 * samples.north - out.local_sum;
            out.d_nw = 4 * samples.north - out.local_sum;
        }
    }

    out
}

//==================================================================================
// Unit Tests
//==================================================================================
