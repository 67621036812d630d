//! Translates a WebAssembly binary module into an SSA intermediate
//! representation through a caller-supplied IR builder.
//!
//! This crate does not generate machine code itself: [`ir`] defines
//! the builder contract a downstream code generator implements, and
//! [`module::translate_module`] drives a binary module through it.
//! [`dummy`] ships a minimal textual builder purely so the loader and
//! function translator can be exercised without a real backend.

pub mod binary_reader;
pub mod capi;
pub mod code_translator;
pub mod dummy;
pub mod error;
pub mod ir;
pub mod module;
pub mod sections;
pub mod state;
pub mod types;

pub use capi::{Config, Engine, Module, Store, TypedVec};
pub use error::{WasmError, WasmResult};
