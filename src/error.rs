//! Crate-wide error type.

use failure_derive::Fail;

/// The error type produced by every fallible operation in this crate.
#[derive(Debug, Fail)]
pub enum WasmError {
    /// The binary reader ran past the end of the available bytes.
    #[fail(display = "truncated input at offset {}", offset)]
    Truncated {
        /// Byte offset, relative to the start of the module, at which
        /// the read was attempted.
        offset: usize,
    },

    /// The bytes are present but do not form a valid module.
    #[fail(display = "invalid wasm module: {} (offset {})", message, offset)]
    InvalidWebAssembly {
        /// Human-readable description of the violated grammar rule.
        message: String,
        /// Byte offset at which the problem was detected.
        offset: usize,
    },

    /// A syntactically valid construct this core does not translate.
    #[fail(display = "unsupported wasm feature: {}", _0)]
    Unsupported(&'static str),

    /// An operand's kind disagreed with what its consumer expected.
    #[fail(display = "type mismatch: {}", message)]
    TypeMismatch {
        /// Human-readable description of the mismatch.
        message: String,
    },

    /// The host allocator failed to satisfy a request.
    #[fail(display = "resource exhausted")]
    ResourceExhausted,

    /// An opaque error raised by an embedder (e.g. a dump sink's own
    /// I/O failure).
    #[fail(display = "{}", _0)]
    User(Box<dyn std::error::Error + Send + Sync>),
}

impl WasmError {
    /// Convenience constructor for [`WasmError::InvalidWebAssembly`].
    pub fn invalid(message: impl Into<String>, offset: usize) -> WasmError {
        WasmError::InvalidWebAssembly {
            message: message.into(),
            offset,
        }
    }

    /// Convenience constructor for [`WasmError::TypeMismatch`].
    pub fn type_mismatch(message: impl Into<String>) -> WasmError {
        WasmError::TypeMismatch {
            message: message.into(),
        }
    }
}

/// Shorthand for `Result<T, WasmError>`, matching the naming used
/// throughout this crate's public functions.
pub type WasmResult<T> = Result<T, WasmError>;
