//! This module defines the single, unified error type for the entire cubec
//! library. It uses the `thiserror` crate to provide ergonomic, context-aware
//! error handling.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    // =========================================================================
    // === Parameter & Input Validation
    // =========================================================================
    #[error("Invalid codec parameters: {0}")]
    InvalidParams(String),

    #[error("Sample buffer length mismatch: expected {expected} samples, got {actual}")]
    InputSizeMismatch { expected: usize, actual: usize },

    // =========================================================================
    // === Container Framing
    // =========================================================================
    /// The byte sequence does not start with the container magic, or declares
    /// a version this implementation does not understand.
    #[error("Invalid container: {0}")]
    InvalidContainer(String),

    #[error("Container too small: header needs {needed} bytes, got {actual}")]
    ContainerTooSmall { needed: usize, actual: usize },

    // =========================================================================
    // === Bit-Level I/O
    // =========================================================================
    /// The externally supplied output region filled up before the payload was
    /// fully emitted. Partial output must not be consumed.
    #[error("External bitstream buffer overflow: capacity {capacity} bytes exceeded")]
    BufferOverflow { capacity: usize },

    /// The payload ended before the number of bits promised by the header was
    /// consumed, or before all samples were reconstructed.
    #[error("Truncated payload: {0}")]
    TruncatedPayload(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_context() {
        let err = CodecError::InputSizeMismatch {
            expected: 192,
            actual: 190,
        };
        assert!(err.to_string().contains("192"));
        assert!(err.to_string().contains("190"));

        let err = CodecError::BufferOverflow { capacity: 4096 };
        assert!(err.to_string().contains("4096"));
    }
}
