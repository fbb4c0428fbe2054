//! Pure, stateless kernels of the prediction pipeline. Each module owns one
//! transform, takes plain inputs, and carries its own unit tests; nothing in
//! here holds per-frame state.

pub mod bitio;
pub mod local_diff;
pub mod mapper;
pub mod predictor;
pub mod weights;
