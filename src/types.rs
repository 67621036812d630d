//! The type model: interned value kinds, function signatures, memory
//! limits, global descriptors, and the entity indices used to key into
//! a module's tables.

use cranelift_entity::entity_impl;

/// A Wasm value kind. Instances are `Copy` and compare by value, which
/// gives the interning semantics the original C implementation
/// achieves through singleton pointers: two `ValType`s of the same
/// kind are indistinguishable.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "enable-serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValType {
    /// 32-bit integer.
    I32,
    /// 64-bit integer.
    I64,
    /// 32-bit float.
    F32,
    /// 64-bit float.
    F64,
    /// Opaque reference to a function.
    FuncRef,
    /// Opaque reference to a host object.
    ExternRef,
}

impl ValType {
    /// Decode a single value-kind byte per the core's type table.
    pub fn from_byte(byte: u8) -> Option<ValType> {
        Some(match byte {
            0x7F => ValType::I32,
            0x7E => ValType::I64,
            0x7D => ValType::F32,
            0x7C => ValType::F64,
            0x70 => ValType::FuncRef,
            0x6F => ValType::ExternRef,
            _ => return None,
        })
    }

    /// Whether this kind is a plain integer (the only kinds this core
    /// translates arithmetic for).
    pub fn is_integer(self) -> bool {
        matches!(self, ValType::I32 | ValType::I64)
    }
}

/// A function signature: an ordered parameter list and at most one
/// result, matching this core's single-return-value restriction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "enable-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FuncType {
    params: Vec<ValType>,
    results: Vec<ValType>,
}

impl FuncType {
    /// Construct a signature from parameter and result vectors.
    ///
    /// Returns `None` if `results` carries more than one entry, which
    /// this core does not support.
    pub fn new(params: Vec<ValType>, results: Vec<ValType>) -> Option<FuncType> {
        if results.len() > 1 {
            return None;
        }
        Some(FuncType { params, results })
    }

    /// This signature's parameter kinds, in order.
    pub fn params(&self) -> &[ValType] {
        &self.params
    }

    /// This signature's result kind, if any.
    pub fn result(&self) -> Option<ValType> {
        self.results.first().copied()
    }
}

/// The page-count bounds of a linear memory.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "enable-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MemoryLimits {
    /// Minimum size, in 64KiB pages.
    pub min: u32,
    /// Maximum size, in 64KiB pages, or `None` if unbounded.
    pub max: Option<u32>,
}

/// Whether a global is immutable or assignable after initialisation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "enable-serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mutability {
    /// The global's value never changes after module instantiation.
    Const,
    /// The global may be reassigned with `global.set`.
    Var,
}

/// A restricted constant expression: this core accepts only the two
/// integer `const` forms as global initialisers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConstExpr {
    /// `i32.const <value>`
    I32(i32),
    /// `i64.const <value>`
    I64(i64),
}

impl ConstExpr {
    /// The value kind this expression produces.
    pub fn kind(self) -> ValType {
        match self {
            ConstExpr::I32(_) => ValType::I32,
            ConstExpr::I64(_) => ValType::I64,
        }
    }
}

/// A global variable's declared type and initial value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalType {
    /// The declared value kind.
    pub content: ValType,
    /// Whether the global may later be reassigned.
    pub mutability: Mutability,
    /// The value it is initialised to.
    pub init: ConstExpr,
}

/// The kind of an exported (or imported) entity.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExternKind {
    /// A function.
    Func,
    /// A table (not supported by this core; parsing one export with
    /// this kind is a fatal error).
    Table,
    /// A linear memory.
    Memory,
    /// A global variable.
    Global,
}

impl ExternKind {
    /// Decode an export/import kind byte.
    pub fn from_byte(byte: u8) -> Option<ExternKind> {
        Some(match byte {
            0x00 => ExternKind::Func,
            0x01 => ExternKind::Table,
            0x02 => ExternKind::Memory,
            0x03 => ExternKind::Global,
            _ => return None,
        })
    }
}

/// A tagged union over the four extern-entity descriptor shapes.
///
/// Accessing through the wrong variant (`as_func_type` on a
/// `ExternType::Memory`, for instance) returns `None` rather than
/// panicking, mirroring the original's mismatched-tag-returns-null
/// probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternType {
    /// A function's signature.
    Func(FuncType),
    /// A global's declared type.
    Global(GlobalType),
    /// A linear memory's limits.
    Memory(MemoryLimits),
}

impl ExternType {
    /// This descriptor's kind tag.
    pub fn kind(&self) -> ExternKind {
        match self {
            ExternType::Func(_) => ExternKind::Func,
            ExternType::Global(_) => ExternKind::Global,
            ExternType::Memory(_) => ExternKind::Memory,
        }
    }

    /// View as a function signature, or `None` if this is a different kind.
    pub fn as_func_type(&self) -> Option<&FuncType> {
        match self {
            ExternType::Func(f) => Some(f),
            _ => None,
        }
    }

    /// View as a global type, or `None` if this is a different kind.
    pub fn as_global_type(&self) -> Option<&GlobalType> {
        match self {
            ExternType::Global(g) => Some(g),
            _ => None,
        }
    }

    /// View as memory limits, or `None` if this is a different kind.
    pub fn as_memory_type(&self) -> Option<&MemoryLimits> {
        match self {
            ExternType::Memory(m) => Some(m),
            _ => None,
        }
    }
}

/// A single entry in the export table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportType {
    /// The export's name, as UTF-8 bytes (not validated as UTF-8 by
    /// this core; embedders that need strict validation should check
    /// before use).
    pub name: Vec<u8>,
    /// The exported entity's type.
    pub ty: ExternType,
}

/// Index into a module's type table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeIndex(u32);
entity_impl!(TypeIndex);

/// Index into a module's function table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FuncIndex(u32);
entity_impl!(FuncIndex);

/// Index into a module's memory descriptors.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemoryIndex(u32);
entity_impl!(MemoryIndex);

/// Index into a module's global descriptors.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlobalIndex(u32);
entity_impl!(GlobalIndex);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valtype_interning_by_value() {
        assert_eq!(ValType::from_byte(0x7F), Some(ValType::I32));
        assert_eq!(ValType::I32, ValType::I32);
        assert_ne!(ValType::I32, ValType::I64);
    }

    #[test]
    fn valtype_unknown_byte() {
        assert_eq!(ValType::from_byte(0xFF), None);
    }

    #[test]
    fn func_type_rejects_multi_value() {
        assert!(FuncType::new(vec![], vec![ValType::I32, ValType::I64]).is_none());
        assert!(FuncType::new(vec![ValType::I32], vec![ValType::I32]).is_some());
    }

    #[test]
    fn extern_type_mismatched_tag_is_none() {
        let ext = ExternType::Memory(MemoryLimits { min: 1, max: None });
        assert!(ext.as_func_type().is_none());
        assert!(ext.as_memory_type().is_some());
    }

    #[test]
    fn entity_indices_roundtrip() {
        use cranelift_entity::EntityRef;
        let idx = FuncIndex::new(3);
        assert_eq!(idx.index(), 3);
    }
}
