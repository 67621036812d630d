//! The embedding API surface: `Engine`, `Config`, `Store`, and the
//! loaded `Module` view, shaped like the Wasm embedding standard the
//! same way `internal.h`'s `wasm_engine_t`/`wasm_store_t`/
//! `wasm_module_t` and `types.c`'s vector-per-type constructors are,
//! but expressed with owned Rust values and `Drop` instead of
//! `_new`/`_delete` pairs.

use crate::dummy::DummyModule;
use crate::error::WasmResult;
use crate::ir::DumpControl;
use crate::module::{self, Module as LoadedModule};
use crate::types::{ExportType, FuncType, GlobalType, MemoryLimits};
use std::rc::Rc;

/// A homogeneous growable vector, mirroring `wasm_*_vec_t`'s shape
/// with one generic type instead of one monomorphisation per element.
#[derive(Debug, Clone)]
pub struct TypedVec<T> {
    items: Vec<T>,
}

impl<T> TypedVec<T> {
    /// An empty vector.
    pub fn empty() -> TypedVec<T> {
        TypedVec { items: Vec::new() }
    }

    /// A vector with room for `capacity` elements, still empty.
    pub fn with_capacity(capacity: usize) -> TypedVec<T> {
        TypedVec { items: Vec::with_capacity(capacity) }
    }

    /// Adopt an existing `Vec<T>`.
    pub fn from_vec(items: Vec<T>) -> TypedVec<T> {
        TypedVec { items }
    }

    /// This vector's elements.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this vector holds no elements.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Configures an [`Engine`]: whether the (external) code generator
/// should optimise, and where produced IR should be dumped, if
/// anywhere.
pub struct Config {
    optimize: bool,
    dump_sink: Option<Box<dyn FnMut(&[u8]) -> DumpControl>>,
}

impl Config {
    /// A default configuration: no optimisation, no IR dump.
    pub fn new() -> Config {
        Config { optimize: false, dump_sink: None }
    }

    /// Enable or disable code-generator optimisations.
    pub fn optimize(mut self, enabled: bool) -> Config {
        self.optimize = enabled;
        self
    }

    /// Install a sink that receives the produced IR as a sequence of
    /// text chunks, stopping early if the sink returns
    /// [`DumpControl::Stop`].
    pub fn dump_sink(mut self, sink: impl FnMut(&[u8]) -> DumpControl + 'static) -> Config {
        self.dump_sink = Some(Box::new(sink));
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// A compilation environment. Cheaply cloned and shared across
/// [`Store`]s; carries only configuration, no per-module state.
#[derive(Clone)]
pub struct Engine {
    config: Rc<EngineConfig>,
}

struct EngineConfig {
    optimize: bool,
}

impl Engine {
    /// Build an engine from the default configuration.
    pub fn new() -> Engine {
        Engine::with_config(Config::new())
    }

    /// Build an engine from an explicit configuration.
    pub fn with_config(config: Config) -> Engine {
        Engine { config: Rc::new(EngineConfig { optimize: config.optimize }) }
    }

    /// Whether this engine was configured to optimise.
    pub fn optimize(&self) -> bool {
        self.config.optimize
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// A translation session bound to an [`Engine`]. Owns nothing beyond
/// the engine handle; modules loaded through it are independent.
#[derive(Clone)]
pub struct Store {
    engine: Engine,
}

impl Store {
    /// Bind a store to `engine`.
    pub fn new(engine: &Engine) -> Store {
        Store { engine: engine.clone() }
    }

    /// The engine this store is bound to.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }
}

/// A loaded module, exposing its tables as read-only views. Wraps
/// [`crate::module::Module`] bound to the in-repo [`DummyModule`] IR
/// builder, since this crate ships no real code generator.
pub struct Module {
    inner: LoadedModule<DummyModule>,
}

impl Module {
    /// Translate `bytes` into a module, bound to `store`'s engine
    /// configuration.
    pub fn new(_store: &Store, bytes: &[u8]) -> WasmResult<Module> {
        let ir = DummyModule::new();
        let inner = module::translate_module(bytes, ir)?;
        Ok(Module { inner })
    }

    /// This module's function signatures, in declaration order.
    pub fn function_types(&self) -> Vec<&FuncType> {
        self.inner
            .functions
            .iter()
            .filter_map(|(_, record)| self.inner.types.get(record.type_index))
            .collect()
    }

    /// This module's memory descriptors, in declaration order.
    pub fn memory_types(&self) -> Vec<&MemoryLimits> {
        self.inner.memories.iter().map(|(_, limits)| limits).collect()
    }

    /// This module's global descriptors, in declaration order.
    pub fn global_types(&self) -> Vec<&GlobalType> {
        self.inner.globals.iter().map(|(_, global)| global).collect()
    }

    /// This module's exports.
    pub fn exports(&self) -> &[ExportType] {
        &self.inner.exports
    }

    /// Stream the module's translated IR as text to `sink`.
    pub fn dump(&self, sink: &mut dyn FnMut(&[u8]) -> DumpControl) {
        use crate::ir::IrModule;
        self.inner.ir.dump(sink);
    }
}
