//! The top-level codec drivers. `encode` runs the forward pipeline
//! (scan -> local differences -> prediction -> residual mapping -> entropy
//! coding) and frames the payload; `decode` parses the container, replays the
//! identical prediction loop and inverts the mapper and coder.
//!
//! Both directions keep the per-band two-row windows and weight vectors in
//! lockstep: at the start of every sample the adaptive state on each side is
//! equal by construction, which is what makes encode-then-decode the
//! identity.

use log::{debug, info};

use crate::config::Params;
use crate::container::{self, ParsedHeader};
use crate::error::CodecError;
use crate::kernels::bitio::{BitReader, BitWriter, Bitstream};
use crate::kernels::local_diff::local_diff;
use crate::kernels::mapper::{residual_map, residual_unmap};
use crate::kernels::predictor::{dot_product, predict, PredictorInputs};
use crate::kernels::weights::{weight_update, WeightUpdateInputs};
use crate::pipeline::band::create_band_states;
use crate::pipeline::coder::{SampleAdaptiveDecoder, SampleAdaptiveEncoder};
use crate::pipeline::scan::{ScanConfig, ScanState};

fn scan_config(params: &Params) -> ScanConfig {
    ScanConfig {
        nx: params.nx,
        ny: params.ny,
        nz: params.nz,
        v_min: params.v_min,
        v_max: params.v_max,
        tinc_log: params.tinc_log,
    }
}

//==================================================================================
// 1. Encode
//==================================================================================

/// Encodes a BSQ sample cube into a self-describing container written to
/// `out`. The cube must hold exactly `params.total_samples()` values, each
/// below 2^D.
///
/// On an external `Bitstream` whose capacity is exceeded the call fails with
/// `BufferOverflow` and the partial contents must not be consumed.
pub fn encode(
    input: &[u16],
    out: &mut Bitstream<'_>,
    params: &Params,
) -> Result<(), CodecError> {
    params.validate()?;
    if input.len() != params.total_samples() {
        return Err(CodecError::InputSizeMismatch {
            expected: params.total_samples(),
            actual: input.len(),
        });
    }
    debug!(
        "encode: {}x{}x{} depth={} omega={} R={}",
        params.nx, params.ny, params.nz, params.depth, params.omega, params.register_bits
    );

    let mut payload = Bitstream::new();
    let payload_bits = encode_payload(input, &mut payload, params)?;

    let header = container::make_header(params, payload_bits);
    out.clear();
    out.extend_from_slice(&header)?;
    out.extend_from_slice(payload.bytes())?;
    info!(
        "encode: {} samples -> {} payload bits ({} container bytes)",
        input.len(),
        payload_bits,
        out.len()
    );
    Ok(())
}

fn encode_payload(
    input: &[u16],
    payload: &mut Bitstream<'_>,
    params: &Params,
) -> Result<usize, CodecError> {
    let mut bands = create_band_states(params);
    let mut scan = ScanState::new(scan_config(params));
    let mut coder = SampleAdaptiveEncoder::new(params);
    let mut writer = BitWriter::new(payload);
    let mut diffs = vec![0i32; params.weight_components()];

    let band_stride = params.nx as usize * params.ny as usize;
    let offset = 1i32 << (params.depth - 1);

    for _ in 0..params.total_samples() {
        let step = scan.step();
        let ctrl = &step.ctrl;
        let band = &mut bands[step.z as usize];
        let pixel = step.y as usize * params.nx as usize + step.x as usize;
        let index = step.z as usize * band_stride + pixel;
        let sample_centered = i32::from(input[index]) - offset;

        let mut neighborhood = band.gather(params.nx, step.x, step.y);
        neighborhood.cur = sample_centered;
        let local = local_diff(ctrl, &neighborhood);
        diffs[0] = local.d_n;
        diffs[1] = local.d_w;
        diffs[2] = local.d_nw;
        let numerator = dot_product(&diffs, &band.weights);

        let prediction = predict(&PredictorInputs {
            ctrl,
            depth: params.depth,
            omega: params.omega,
            register_bits: params.register_bits,
            prior_band_sample: None,
            numerator,
            local_sum: local.local_sum,
        });

        let mapped = residual_map(sample_centered, prediction.scaled_pred, params.depth);
        coder.encode_sample(ctrl, step.z, mapped.delta, &mut writer)?;

        weight_update(
            &mut band.weights,
            &WeightUpdateInputs {
                ctrl,
                depth: params.depth,
                omega: params.omega,
                scaled_pred: prediction.scaled_pred,
                sample: sample_centered,
                diffs: &diffs,
            },
            params.reduced,
        );
        band.store(step.x, sample_centered);
        if ctrl.last_in_line {
            band.rotate_rows();
        }
    }

    writer.finish()?;
    Ok(writer.bits_written())
}

//==================================================================================
// 2. Decode
//==================================================================================

/// Decodes a container into a freshly allocated cube, returning the
/// parameter set recovered from the header alongside it.
pub fn decode(container_bytes: &[u8]) -> Result<(Vec<u16>, Params), CodecError> {
    let header = container::parse_header(container_bytes)?;
    let mut output = vec![0u16; header.params.total_samples()];
    let params = decode_into_parsed(container_bytes, &mut output, header)?;
    Ok((output, params))
}

/// Decodes a container into a caller-provided buffer, which must match the
/// cube size declared by the header exactly.
pub fn decode_into(container_bytes: &[u8], output: &mut [u16]) -> Result<Params, CodecError> {
    let header = container::parse_header(container_bytes)?;
    decode_into_parsed(container_bytes, output, header)
}

fn decode_into_parsed(
    container_bytes: &[u8],
    output: &mut [u16],
    header: ParsedHeader,
) -> Result<Params, CodecError> {
    let params = header.params.clone();
    params.validate()?;
    if output.len() != params.total_samples() {
        return Err(CodecError::InputSizeMismatch {
            expected: params.total_samples(),
            actual: output.len(),
        });
    }
    debug!(
        "decode: v{} {}x{}x{} depth={} payload_bits={}",
        header.version, params.nx, params.ny, params.nz, params.depth, header.payload_bits
    );

    let payload = &container_bytes[header.header_size()..];
    decode_payload(payload, output, &params, header.payload_bits)?;
    info!(
        "decode: reconstructed {} samples from {} payload bits",
        output.len(),
        header.payload_bits
    );
    Ok(params)
}

fn decode_payload(
    payload: &[u8],
    output: &mut [u16],
    params: &Params,
    payload_bits: usize,
) -> Result<(), CodecError> {
    let mut bands = create_band_states(params);
    let mut scan = ScanState::new(scan_config(params));
    let mut reader = BitReader::new(payload, payload_bits);
    let mut coder = SampleAdaptiveDecoder::new(params);
    let mut diffs = vec![0i32; params.weight_components()];

    let band_stride = params.nx as usize * params.ny as usize;
    let offset = 1i32 << (params.depth - 1);
    let max_val = (1i32 << params.depth) - 1;

    for _ in 0..params.total_samples() {
        let step = scan.step();
        let ctrl = &step.ctrl;
        let band = &mut bands[step.z as usize];
        let pixel = step.y as usize * params.nx as usize + step.x as usize;
        let index = step.z as usize * band_stride + pixel;

        // The current cell is unknown on this side; only d_c would consume
        // it and d_c does not feed the prediction.
        let neighborhood = band.gather(params.nx, step.x, step.y);
        let local = local_diff(ctrl, &neighborhood);
        diffs[0] = local.d_n;
        diffs[1] = local.d_w;
        diffs[2] = local.d_nw;
        let numerator = dot_product(&diffs, &band.weights);

        let prediction = predict(&PredictorInputs {
            ctrl,
            depth: params.depth,
            omega: params.omega,
            register_bits: params.register_bits,
            prior_band_sample: None,
            numerator,
            local_sum: local.local_sum,
        });

        let delta = coder.decode_sample(ctrl, step.z, &mut reader)?;
        let residual = residual_unmap(delta, prediction.scaled_pred, params.depth);
        let sample_centered = prediction.predicted + residual;
        output[index] = (sample_centered + offset).clamp(0, max_val) as u16;

        weight_update(
            &mut band.weights,
            &WeightUpdateInputs {
                ctrl,
                depth: params.depth,
                omega: params.omega,
                scaled_pred: prediction.scaled_pred,
                sample: sample_centered,
                diffs: &diffs,
            },
            params.reduced,
        );
        band.store(step.x, sample_centered);
        if ctrl.last_in_line {
            band.rotate_rows();
        }
    }

    Ok(())
}
