//! The sample-adaptive entropy coder: a limited-length Golomb-Rice code whose
//! parameter k is chosen per sample from a per-band accumulator and a counter
//! shared across bands.
//!
//! Codeword shapes:
//! - the cube-origin cell of each band emits its symbol as D raw bits;
//! - otherwise, u = delta >> k zeros, a one, then the low k bits of delta;
//! - prefixes reaching u_max zeros escape to u_max zeros plus D raw bits.
//!
//! Encoder and decoder run the identical state machine so the adaptive
//! parameter sequence never diverges.

use crate::config::Params;
use crate::error::CodecError;
use crate::kernels::bitio::{BitReader, BitWriter};
use crate::pipeline::scan::CtrlFlags;
use crate::utils::mask_bits;

//==================================================================================
// 1. Shared Adaptive State
//==================================================================================

/// Per-band accumulators plus the shared counter, with the derived constants
/// of one codec run.
#[derive(Debug)]
struct AdaptiveState {
    accumulators: Vec<u32>,
    counter: u32,
    initial_accumulator: u32,
    max_counter: u32,
    depth: u16,
    u_max: u32,
    initial_count_exponent: u32,
    last_band: u16,
}

impl AdaptiveState {
    fn new(params: &Params) -> Self {
        Self {
            accumulators: vec![0u32; params.nz as usize],
            counter: 0,
            initial_accumulator: initial_accumulator(params),
            max_counter: mask_bits(u32::from(params.coder.counter_size)),
            depth: params.depth,
            u_max: u32::from(params.coder.u_max),
            initial_count_exponent: u32::from(params.coder.initial_count_exponent),
            last_band: params.nz - 1,
        }
    }

    /// The Golomb parameter for the current sample, from the pre-update
    /// counter and the band's accumulator.
    fn select_k(&self, z: u16) -> u32 {
        let counter = self.counter;
        let rhs = self.accumulators[z as usize].saturating_add(rhs_part(counter));
        if self.depth <= 1 {
            return 0;
        }
        if counter == 0 {
            return u32::from(self.depth) - 2;
        }
        if u64::from(counter) << 1 > u64::from(rhs) {
            return 0;
        }
        let max_k = u32::from(self.depth) - 2;
        let mut selected = 0;
        for k in 1..=max_k {
            if u64::from(counter) << k <= u64::from(rhs) {
                selected = k;
            }
        }
        selected
    }

    /// Folds the decoded/encoded symbol into the band accumulator, then
    /// advances the shared counter. Must run once per sample, after the
    /// codeword is written or read.
    fn update(&mut self, ctrl: &CtrlFlags, z: u16, delta: u32) {
        let counter_pre = self.counter;
        let first_sample = ctrl.first_line && ctrl.first_in_line;

        let acc = &mut self.accumulators[z as usize];
        if first_sample {
            *acc = self.initial_accumulator;
        } else if counter_pre < self.max_counter {
            *acc = acc.saturating_add(delta);
        } else {
            *acc = ((u64::from(*acc) + u64::from(delta) + 1) >> 1) as u32;
        }

        if first_sample {
            self.counter = 1u32 << self.initial_count_exponent;
        } else if z >= self.last_band {
            if counter_pre < self.max_counter {
                self.counter = counter_pre + 1;
            } else {
                self.counter = (counter_pre + 1) >> 1;
            }
        }
    }
}

fn rhs_part(counter: u32) -> u32 {
    ((49u64 * u64::from(counter)) >> 7) as u32
}

/// Closed-form accumulator seed: ((3 * 2^(k'_z + 6) - 49) * 2^gamma_0) >> 7.
fn initial_accumulator(params: &Params) -> u32 {
    let lhs = 3u64 << (params.coder.kz_prime + 6);
    let numerator = (lhs - 49) << params.coder.initial_count_exponent;
    (numerator >> 7) as u32
}

//==================================================================================
// 2. Encoder
//==================================================================================

/// Encoder half of the coder; owns the adaptive state for one frame.
pub struct SampleAdaptiveEncoder {
    state: AdaptiveState,
}

impl SampleAdaptiveEncoder {
    pub fn new(params: &Params) -> Self {
        Self {
            state: AdaptiveState::new(params),
        }
    }

    /// Emits the codeword for `delta` and advances the adaptive state.
    pub fn encode_sample(
        &mut self,
        ctrl: &CtrlFlags,
        z: u16,
        delta: u32,
        writer: &mut BitWriter<'_, '_>,
    ) -> Result<(), CodecError> {
        let depth_bits = u32::from(self.state.depth);
        let first_sample = ctrl.first_line && ctrl.first_in_line;

        if first_sample {
            writer.write_bits(delta & mask_bits(depth_bits), depth_bits)?;
        } else {
            let k = self.state.select_k(z);
            let value = delta & mask_bits(depth_bits);
            let u = value >> k;
            if u >= self.state.u_max {
                for _ in 0..self.state.u_max {
                    writer.write_bit(false)?;
                }
                writer.write_bits(value, depth_bits)?;
            } else {
                for _ in 0..u {
                    writer.write_bit(false)?;
                }
                writer.write_bit(true)?;
                if k > 0 {
                    writer.write_bits(value & mask_bits(k), k)?;
                }
            }
        }

        self.state.update(ctrl, z, delta);
        Ok(())
    }
}

//==================================================================================
// 3. Decoder
//==================================================================================

/// Decoder half of the coder; mirrors the encoder's state machine exactly.
pub struct SampleAdaptiveDecoder {
    state: AdaptiveState,
}

impl SampleAdaptiveDecoder {
    pub fn new(params: &Params) -> Self {
        Self {
            state: AdaptiveState::new(params),
        }
    }

    /// Reads one codeword and advances the adaptive state.
    pub fn decode_sample(
        &mut self,
        ctrl: &CtrlFlags,
        z: u16,
        reader: &mut BitReader<'_>,
    ) -> Result<u32, CodecError> {
        let depth_bits = u32::from(self.state.depth);
        let first_sample = ctrl.first_line && ctrl.first_in_line;

        let delta = if first_sample {
            reader.read_bits(depth_bits)?
        } else {
            let k = self.state.select_k(z);
            let u = self.read_unary_limited(reader)?;
            if u >= self.state.u_max {
                reader.read_bits(depth_bits)?
            } else {
                let remainder = if k == 0 { 0 } else { reader.read_bits(k)? };
                (u << k) | remainder
            }
        };

        self.state.update(ctrl, z, delta);
        Ok(delta)
    }

    fn read_unary_limited(&self, reader: &mut BitReader<'_>) -> Result<u32, CodecError> {
        let mut zeros = 0u32;
        while zeros < self.state.u_max {
            if reader.read_bit()? {
                return Ok(zeros);
            }
            zeros += 1;
        }
        Ok(zeros)
    }
}

//==================================================================================
// 4. Unit Tests
//==================================================================================
