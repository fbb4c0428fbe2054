//! # cubec
//!
//! A lossless multispectral/hyperspectral image compression core implementing
//! the CCSDS 123.0-B-2 predictor and sample-adaptive entropy coder.
//!
//! The codec turns a band-sequential cube of unsigned samples (up to 16 bits
//! deep) into a self-describing byte container and recovers it bit-exactly.
//! One frame is the whole surface: there is no session, catalog, or I/O
//! layer. Hosts hand in a contiguous sample buffer and get back bytes.
//!
//! ## Pipeline
//!
//! samples -> scan controller -> local differences -> (adaptive-weight
//! predictor) -> residual mapper -> sample-adaptive Golomb coder -> bit
//! writer -> container framer. Decoding replays the same prediction loop and
//! inverts the mapper and coder.
//!
//! ## Usage
//!
//! ```ignore
//! use cubec::{decode, encode, Bitstream, Params};
//!
//! let params = Params::for_cube(64, 64, 8, 12);
//! let samples: Vec<u16> = vec![0; params.total_samples()];
//!
//! let mut container = Bitstream::new();
//! encode(&samples, &mut container, &params)?;
//!
//! let (restored, _params) = decode(container.bytes())?;
//! assert_eq!(restored, samples);
//! ```

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//==================================================================================
// 1. Module Declarations
//==================================================================================

pub mod config;
pub mod container;
pub mod kernels;
pub mod pipeline;

mod error;
mod utils;

//==================================================================================
// 2. Public API
//==================================================================================

pub use config::{CoderParams, LocalSumMode, Params};
pub use container::{read_summary, ContainerSummary};
pub use error::CodecError;
pub use kernels::bitio::Bitstream;
pub use pipeline::orchestrator::{decode, decode_into, encode};
pub use utils::{bytes_as_samples, samples_as_bytes};
