//! Defines the on-wire container for one encoded frame. This is the single
//! source of truth for the header layouts, their constants, and the
//! header-only inspection API.
//!
//! Two fixed little-endian layouts share a common prefix:
//! - v2 (30 bytes, legacy): magic, version, dimensions, depth, order,
//!   local-sum mode, payload bit count, two reserved words. Predictor and
//!   coder tuning are implied by historical defaults.
//! - v3 (46 bytes): the same prefix followed by mode flags and the full
//!   predictor/coder parameter set.
//!
//! The encoder always emits v3. The decoder accepts both and tolerates
//! trailing bytes beyond the declared payload.

use std::io::{Cursor, Read};

use crate::config::{CoderParams, LocalSumMode, Params};
use crate::error::CodecError;

//==================================================================================
// Format Constants
//==================================================================================

/// The magic number identifying an encoded frame: 'C' '1' '2' '3'.
pub const CONTAINER_MAGIC: &[u8; 4] = b"C123";
pub const VERSION_V2: u16 = 2;
pub const VERSION_V3: u16 = 3;

/// v2 header size: magic(4) + version(2) + 6 u16 fields + payload_bits(4)
/// + reserved(8).
pub const HEADER_SIZE_V2: usize = 30;
/// v3 header size: magic(4) + version(2) + 16 u16/i16 fields +
/// payload_bits(4) + reserved(4).
pub const HEADER_SIZE_V3: usize = 46;

const FLAG_REDUCED: u16 = 0x0001;
const FLAG_COLUMN_ORIENTED: u16 = 0x0002;

//==================================================================================
// Public Structs
//==================================================================================

/// Everything a caller can learn from a container without touching the
/// payload: the full parameter set and the exact payload bit count. Used by
/// wrappers to size output buffers before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSummary {
    pub params: Params,
    pub payload_bits: usize,
}

/// Parsed header plus the version it came from; the version selects the
/// payload offset.
#[derive(Debug, Clone)]
pub(crate) struct ParsedHeader {
    pub params: Params,
    pub payload_bits: usize,
    pub version: u16,
}

impl ParsedHeader {
    pub fn header_size(&self) -> usize {
        if self.version == VERSION_V3 {
            HEADER_SIZE_V3
        } else {
            HEADER_SIZE_V2
        }
    }
}

//==================================================================================
// Serialization
//==================================================================================

/// Serializes the v3 header for `params` and `payload_bits`.
pub(crate) fn make_header(params: &Params, payload_bits: usize) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_SIZE_V3);
    buf.extend_from_slice(CONTAINER_MAGIC);
    buf.extend_from_slice(&VERSION_V3.to_le_bytes());
    buf.extend_from_slice(&params.nx.to_le_bytes());
    buf.extend_from_slice(&params.ny.to_le_bytes());
    buf.extend_from_slice(&params.nz.to_le_bytes());
    buf.extend_from_slice(&params.depth.to_le_bytes());
    buf.extend_from_slice(&params.p.to_le_bytes());
    buf.extend_from_slice(&params.local_sum.to_wire().to_le_bytes());
    let flags = (if params.reduced { FLAG_REDUCED } else { 0 })
        | (if params.column_oriented {
            FLAG_COLUMN_ORIENTED
        } else {
            0
        });
    buf.extend_from_slice(&flags.to_le_bytes());
    buf.extend_from_slice(&params.v_min.to_le_bytes());
    buf.extend_from_slice(&params.v_max.to_le_bytes());
    buf.extend_from_slice(&params.omega.to_le_bytes());
    buf.extend_from_slice(&params.register_bits.to_le_bytes());
    buf.extend_from_slice(&params.tinc_log.to_le_bytes());
    buf.extend_from_slice(&params.coder.u_max.to_le_bytes());
    buf.extend_from_slice(&params.coder.counter_size.to_le_bytes());
    buf.extend_from_slice(&params.coder.initial_count_exponent.to_le_bytes());
    buf.extend_from_slice(&params.coder.kz_prime.to_le_bytes());
    buf.extend_from_slice(&(payload_bits as u32).to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes()); // reserved
    debug_assert_eq!(buf.len(), HEADER_SIZE_V3);
    buf
}

//==================================================================================
// Parsing
//==================================================================================

fn read_u16(cursor: &mut Cursor<&[u8]>) -> Result<u16, CodecError> {
    let mut buf = [0u8; 2];
    cursor
        .read_exact(&mut buf)
        .map_err(|e| CodecError::InvalidContainer(e.to_string()))?;
    Ok(u16::from_le_bytes(buf))
}

fn read_i16(cursor: &mut Cursor<&[u8]>) -> Result<i16, CodecError> {
    read_u16(cursor).map(|v| v as i16)
}

fn read_u32(cursor: &mut Cursor<&[u8]>) -> Result<u32, CodecError> {
    let mut buf = [0u8; 4];
    cursor
        .read_exact(&mut buf)
        .map_err(|e| CodecError::InvalidContainer(e.to_string()))?;
    Ok(u32::from_le_bytes(buf))
}

/// Parses a v2 or v3 header from the front of `bytes`.
///
/// v2 containers carry no predictor/coder tuning; the historical defaults
/// are authoritative for archived payloads and must not change.
pub(crate) fn parse_header(bytes: &[u8]) -> Result<ParsedHeader, CodecError> {
    if bytes.len() < HEADER_SIZE_V2 {
        return Err(CodecError::ContainerTooSmall {
            needed: HEADER_SIZE_V2,
            actual: bytes.len(),
        });
    }

    let mut cursor = Cursor::new(bytes);
    let mut magic = [0u8; 4];
    cursor
        .read_exact(&mut magic)
        .map_err(|e| CodecError::InvalidContainer(e.to_string()))?;
    if &magic != CONTAINER_MAGIC {
        return Err(CodecError::InvalidContainer(
            "Bad container magic".to_string(),
        ));
    }

    let version = read_u16(&mut cursor)?;
    let mut params = Params {
        nx: read_u16(&mut cursor)?,
        ny: read_u16(&mut cursor)?,
        nz: read_u16(&mut cursor)?,
        depth: read_u16(&mut cursor)?,
        p: read_u16(&mut cursor)?,
        ..Params::default()
    };
    let local_sum_wire = read_u16(&mut cursor)?;

    match version {
        VERSION_V2 => {
            // A v2 header only distinguishes narrow from wide neighborhoods.
            params.local_sum = if local_sum_wire != 0 {
                LocalSumMode::NeighborNarrow
            } else {
                LocalSumMode::NeighborWide
            };
            params.v_min = -6;
            params.v_max = 9;
            params.omega = 19;
            params.register_bits = 64;
            params.tinc_log = 4;
            params.coder = CoderParams {
                u_max: 9,
                counter_size: 8,
                initial_count_exponent: 6,
                kz_prime: 8,
            };
            let payload_bits = read_u32(&mut cursor)? as usize;
            Ok(ParsedHeader {
                params,
                payload_bits,
                version,
            })
        }
        VERSION_V3 => {
            if bytes.len() < HEADER_SIZE_V3 {
                return Err(CodecError::ContainerTooSmall {
                    needed: HEADER_SIZE_V3,
                    actual: bytes.len(),
                });
            }
            params.local_sum = LocalSumMode::from_wire(local_sum_wire)?;
            let flags = read_u16(&mut cursor)?;
            params.reduced = flags & FLAG_REDUCED != 0;
            params.column_oriented = flags & FLAG_COLUMN_ORIENTED != 0;
            params.v_min = read_i16(&mut cursor)?;
            params.v_max = read_i16(&mut cursor)?;
            params.omega = read_i16(&mut cursor)?;
            params.register_bits = read_i16(&mut cursor)?;
            params.tinc_log = read_i16(&mut cursor)?;
            params.coder = CoderParams {
                u_max: read_u16(&mut cursor)?,
                counter_size: read_u16(&mut cursor)?,
                initial_count_exponent: read_u16(&mut cursor)?,
                kz_prime: read_u16(&mut cursor)?,
            };
            let payload_bits = read_u32(&mut cursor)? as usize;
            Ok(ParsedHeader {
                params,
                payload_bits,
                version,
            })
        }
        other => Err(CodecError::InvalidContainer(format!(
            "Unsupported container version {}",
            other
        ))),
    }
}

/// Header-only inspection: the parameter set and payload bit count, without
/// touching the payload bytes.
pub fn read_summary(container: &[u8]) -> Result<ContainerSummary, CodecError> {
    let header = parse_header(container)?;
    Ok(ContainerSummary {
        params: header.params,
        payload_bits: header.payload_bits,
    })
}

//==================================================================================
// Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_params() -> Params {
        let mut params = Params::for_cube(12, 6, 2, 12);
        params.v_min = -2;
        params.v_max = 5;
        params.omega = 13;
        params.register_bits = 32;
        params.tinc_log = 5;
        params.coder = CoderParams {
            u_max: 16,
            counter_size: 7,
            initial_count_exponent: 2,
            kz_prime: 3,
        };
        params
    }

    #[test]
    fn test_v3_header_roundtrip() {
        let params = sample_params();
        let header = make_header(&params, 12345);
        assert_eq!(header.len(), HEADER_SIZE_V3);

        let parsed = parse_header(&header).unwrap();
        assert_eq!(parsed.version, VERSION_V3);
        assert_eq!(parsed.payload_bits, 12345);
        assert_eq!(parsed.params, params);
    }

    #[test]
    fn test_v3_header_layout_is_little_endian() {
        let params = sample_params();
        let header = make_header(&params, 0x01020304);
        assert_eq!(&header[..4], b"C123");
        assert_eq!(u16::from_le_bytes([header[4], header[5]]), VERSION_V3);
        assert_eq!(u16::from_le_bytes([header[6], header[7]]), 12);
        // payload_bits sits after the sixteen u16 fields.
        assert_eq!(
            u32::from_le_bytes([header[38], header[39], header[40], header[41]]),
            0x01020304
        );
    }

    #[test]
    fn test_v2_header_fills_historical_defaults() {
        let mut header = Vec::new();
        header.extend_from_slice(CONTAINER_MAGIC);
        header.extend_from_slice(&VERSION_V2.to_le_bytes());
        for dim in [8u16, 4, 3, 10, 0, 1] {
            header.extend_from_slice(&dim.to_le_bytes());
        }
        header.extend_from_slice(&4096u32.to_le_bytes());
        header.extend_from_slice(&[0u8; 8]); // reserved
        assert_eq!(header.len(), HEADER_SIZE_V2);

        let parsed = parse_header(&header).unwrap();
        assert_eq!(parsed.version, VERSION_V2);
        assert_eq!(parsed.payload_bits, 4096);
        let p = parsed.params;
        assert_eq!((p.nx, p.ny, p.nz, p.depth), (8, 4, 3, 10));
        assert_eq!(p.local_sum, LocalSumMode::NeighborNarrow);
        assert_eq!((p.v_min, p.v_max), (-6, 9));
        assert_eq!(p.omega, 19);
        assert_eq!(p.register_bits, 64);
        assert_eq!(p.tinc_log, 4);
        assert_eq!(p.coder.u_max, 9);
        assert_eq!(p.coder.counter_size, 8);
        assert_eq!(p.coder.initial_count_exponent, 6);
        assert_eq!(p.coder.kz_prime, 8);
    }

    #[test]
    fn test_bad_magic_rejected() {
        let mut header = make_header(&sample_params(), 10);
        header[0] = b'X';
        assert!(matches!(
            parse_header(&header),
            Err(CodecError::InvalidContainer(_))
        ));
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let mut header = make_header(&sample_params(), 10);
        header[4] = 9;
        assert!(matches!(
            parse_header(&header),
            Err(CodecError::InvalidContainer(_))
        ));
    }

    #[test]
    fn test_short_container_rejected() {
        let header = make_header(&sample_params(), 10);
        assert!(matches!(
            parse_header(&header[..20]),
            Err(CodecError::ContainerTooSmall { .. })
        ));
        // Long enough for the v2 prefix but short of the v3 layout.
        assert!(matches!(
            parse_header(&header[..HEADER_SIZE_V2]),
            Err(CodecError::ContainerTooSmall { .. })
        ));
    }

    #[test]
    fn test_read_summary_skips_payload() {
        let params = sample_params();
        let mut container = make_header(&params, 24);
        container.extend_from_slice(&[0xFF, 0xFF, 0xFF]); // payload
        let summary = read_summary(&container).unwrap();
        assert_eq!(summary.params, params);
        assert_eq!(summary.payload_bits, 24);
        // Header alone is also enough.
        let summary = read_summary(&container[..HEADER_SIZE_V3]).unwrap();
        assert_eq!(summary.payload_bits, 24);
    }
}
