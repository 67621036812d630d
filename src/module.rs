//! The module container and top-level loader driver.
//!
//! Owns every table a binary module populates plus the caller-supplied
//! IR module those tables' functions are translated into. Mirrors the
//! `wasm_module`/`wasm_module_new`/section-dispatch loop of the system
//! this loader's structure is modelled on, but expressed as ordinary
//! owned Rust collections: there is no explicit destructor to write,
//! since dropping a `Module` drops its fields in declaration order and
//! each field is a plain owned value.

use crate::binary_reader::BinaryReader;
use crate::code_translator::{ir_type_of, translate_function_body, CallResolver};
use crate::error::{WasmError, WasmResult};
use crate::ir::{IrModule, IrType};
use crate::sections::{parse_export_section, parse_global_section, parse_memory_section, parse_type_section};
use crate::types::{ExportType, FuncIndex, FuncType, GlobalIndex, GlobalType, MemoryIndex, MemoryLimits, TypeIndex};
use cranelift_entity::{EntityRef, PrimaryMap};
use log::{debug, error, trace};

const MAGIC: [u8; 4] = [0x00, 0x61, 0x73, 0x6D];
const VERSION: [u8; 4] = [0x01, 0x00, 0x00, 0x00];

/// One function's signature and IR handle, in either lifecycle state
/// described by the data model: a freshly reserved handle with no body
/// yet, or one whose body has since been translated. Both states share
/// this representation; only the IR module's own internal bookkeeping
/// (not tracked here) distinguishes them.
#[derive(Debug, Clone, Copy)]
pub struct FunctionRecord<F> {
    /// Index into the module's type table.
    pub type_index: TypeIndex,
    /// Handle into the caller-supplied IR module.
    pub handle: F,
}

/// A loaded module: every table a binary module can populate, plus the
/// IR module its functions were translated into.
pub struct Module<M: IrModule> {
    /// The type table.
    pub types: PrimaryMap<TypeIndex, FuncType>,
    /// The function table (signature + IR handle, parallel to the
    /// function and code sections).
    pub functions: PrimaryMap<FuncIndex, FunctionRecord<M::Function>>,
    /// The memory descriptors.
    pub memories: PrimaryMap<MemoryIndex, MemoryLimits>,
    /// The global descriptors.
    pub globals: PrimaryMap<GlobalIndex, GlobalType>,
    /// The export table.
    pub exports: Vec<ExportType>,
    /// The IR module every function's body was translated into.
    pub ir: M,
}

impl<M: IrModule> CallResolver<M::Function> for Module<M> {
    fn signature(&self, index: FuncIndex) -> WasmResult<&FuncType> {
        let record = self
            .functions
            .get(index)
            .ok_or_else(|| WasmError::invalid("call references unknown function index", 0))?;
        self.types
            .get(record.type_index)
            .ok_or_else(|| WasmError::invalid("function references unknown type index", 0))
    }

    fn handle(&self, index: FuncIndex) -> WasmResult<M::Function> {
        Ok(self
            .functions
            .get(index)
            .ok_or_else(|| WasmError::invalid("call references unknown function index", 0))?
            .handle)
    }
}

/// A resolver over references into a function and type table, used
/// while a module is still being assembled (the full [`Module`] isn't
/// constructed yet, since its own `ir` field is borrowed mutably for
/// the duration of each function's translation).
struct FunctionTable<'a, F> {
    functions: &'a PrimaryMap<FuncIndex, FunctionRecord<F>>,
    types: &'a PrimaryMap<TypeIndex, FuncType>,
}

impl<'a, F: Copy + Eq> CallResolver<F> for FunctionTable<'a, F> {
    fn signature(&self, index: FuncIndex) -> WasmResult<&FuncType> {
        let record = self
            .functions
            .get(index)
            .ok_or_else(|| WasmError::invalid("call references unknown function index", 0))?;
        self.types
            .get(record.type_index)
            .ok_or_else(|| WasmError::invalid("function references unknown type index", 0))
    }

    fn handle(&self, index: FuncIndex) -> WasmResult<F> {
        Ok(self
            .functions
            .get(index)
            .ok_or_else(|| WasmError::invalid("call references unknown function index", 0))?
            .handle)
    }
}

/// Translate a complete binary module into `ir`, returning the loaded
/// [`Module`] on success. On any error, the partially built module (and
/// everything it had allocated so far) is simply dropped by the
/// caller; no extra teardown is needed.
pub fn translate_module<M: IrModule>(data: &[u8], mut ir: M) -> WasmResult<Module<M>> {
    let mut reader = BinaryReader::new(data);

    let magic = reader.pull(4)?;
    if magic != MAGIC {
        return Err(WasmError::invalid("missing wasm magic number", 0));
    }
    let version = reader.pull(4)?;
    if version != VERSION {
        return Err(WasmError::invalid("unsupported wasm version", 4));
    }

    let mut types: PrimaryMap<TypeIndex, FuncType> = PrimaryMap::new();
    let mut functions: PrimaryMap<FuncIndex, FunctionRecord<M::Function>> = PrimaryMap::new();
    let mut memories: PrimaryMap<MemoryIndex, MemoryLimits> = PrimaryMap::new();
    let mut globals: PrimaryMap<GlobalIndex, GlobalType> = PrimaryMap::new();
    let mut exports: Vec<ExportType> = Vec::new();
    let mut code_section_seen = false;

    let result = (|| -> WasmResult<()> {
        while !reader.is_empty() {
            let id = reader.pull_byte()?;
            let size = reader.pull_u32()? as usize;
            trace!("section {}, {} bytes", id, size);
            let mut section = reader.pull_reader(size)?;

            match id {
                0x00 => {}
                0x01 => {
                    types = parse_type_section(&mut section)?;
                }
                0x02 => return Err(WasmError::Unsupported("import section")),
                0x03 => {
                    let count = section.pull_u32()?;
                    for _ in 0..count {
                        let type_idx = TypeIndex::new(section.pull_u32()? as usize);
                        let sig = types
                            .get(type_idx)
                            .ok_or_else(|| WasmError::invalid("function section references unknown type", section.position()))?;
                        let result_ty = match sig.result() {
                            Some(kind) => ir_type_of(kind)?,
                            None => IrType::None,
                        };
                        let param_tys = sig
                            .params()
                            .iter()
                            .map(|&kind| ir_type_of(kind))
                            .collect::<WasmResult<Vec<_>>>()?;
                        let name = format!("func{:x}", functions.len());
                        let handle = ir.create_function(&name, result_ty, &param_tys);
                        functions.push(FunctionRecord { type_index: type_idx, handle });
                    }
                }
                0x05 => {
                    memories = parse_memory_section(&mut section)?;
                }
                0x06 => {
                    globals = parse_global_section(&mut section)?;
                }
                0x07 => {
                    let mut function_types: PrimaryMap<FuncIndex, TypeIndex> = PrimaryMap::new();
                    for (_, record) in functions.iter() {
                        function_types.push(record.type_index);
                    }
                    exports = parse_export_section(&mut section, &types, &function_types, &memories, &globals)?;
                }
                0x0A => {
                    code_section_seen = true;
                    let count = section.pull_u32()?;
                    if count as usize != functions.len() {
                        return Err(WasmError::invalid(
                            "code section entry count does not match function section",
                            section.position(),
                        ));
                    }
                    for i in 0..count {
                        let body_size = section.pull_u32()? as usize;
                        let mut body = section.pull_reader(body_size)?;
                        let func_idx = FuncIndex::new(i as usize);
                        let record = functions[func_idx];
                        let sig = types
                            .get(record.type_index)
                            .ok_or_else(|| WasmError::invalid("function references unknown type", body.position()))?
                            .clone();
                        let resolver = FunctionTable { functions: &functions, types: &types };
                        ir.build_function(record.handle, &mut |builder| {
                            translate_function_body(&mut body, builder, &sig, &resolver)
                        })?;
                        debug!("function {}: translated", i);
                    }
                }
                _ => return Err(WasmError::Unsupported("unknown section id")),
            }
        }
        Ok(())
    })();

    if let Err(ref e) = result {
        error!("module translation failed: {}", e);
    }
    result?;

    if !code_section_seen && functions.len() != 0 {
        return Err(WasmError::invalid("function section present without a code section", reader.position()));
    }

    Ok(Module { types, functions, memories, globals, exports, ir })
}
