//! Decodes the section payloads the module loader dispatches on:
//! type, memory, global, and export. The function and code sections
//! are threaded through `M::Function` handles and stay in
//! [`crate::module`], where the IR module and the function table are
//! both in scope.

use crate::binary_reader::BinaryReader;
use crate::error::{WasmError, WasmResult};
use crate::types::{
    ConstExpr, ExportType, ExternKind, ExternType, FuncIndex, FuncType, GlobalIndex, GlobalType,
    MemoryIndex, MemoryLimits, Mutability, TypeIndex, ValType,
};
use cranelift_entity::{EntityRef, PrimaryMap};

fn pull_valtype(reader: &mut BinaryReader) -> WasmResult<ValType> {
    let byte = reader.pull_byte()?;
    ValType::from_byte(byte).ok_or_else(|| WasmError::invalid("unknown value kind byte", reader.position()))
}

fn pull_valtype_vec(reader: &mut BinaryReader) -> WasmResult<Vec<ValType>> {
    let count = reader.pull_u32()?;
    let mut out = Vec::with_capacity(count as usize);
    for _ in 0..count {
        out.push(pull_valtype(reader)?);
    }
    Ok(out)
}

/// Parse the type section: `N` entries, each `0x60` then a params
/// vector and a results vector.
pub fn parse_type_section(reader: &mut BinaryReader) -> WasmResult<PrimaryMap<TypeIndex, FuncType>> {
    let count = reader.pull_u32()?;
    let mut types = PrimaryMap::new();
    for _ in 0..count {
        let form = reader.pull_byte()?;
        if form != 0x60 {
            return Err(WasmError::invalid("type entry missing 0x60 form tag", reader.position()));
        }
        let params = pull_valtype_vec(reader)?;
        let results = pull_valtype_vec(reader)?;
        let sig = FuncType::new(params, results)
            .ok_or_else(|| WasmError::invalid("function type declares more than one result", reader.position()))?;
        types.push(sig);
    }
    Ok(types)
}

/// Parse the memory section: `N` entries of (flags, min, optional max).
pub fn parse_memory_section(reader: &mut BinaryReader) -> WasmResult<PrimaryMap<MemoryIndex, MemoryLimits>> {
    let count = reader.pull_u32()?;
    let mut memories = PrimaryMap::new();
    for _ in 0..count {
        let flags = reader.pull_byte()?;
        let min = reader.pull_u32()?;
        let max = match flags {
            0x00 => None,
            0x01 => Some(reader.pull_u32()?),
            _ => return Err(WasmError::invalid("unknown memory limits flag", reader.position())),
        };
        memories.push(MemoryLimits { min, max });
    }
    Ok(memories)
}

/// Parse one restricted constant expression: `i32.const`/`i64.const`
/// followed by `end` (`0x0B`). Any other opcode is fatal.
pub fn parse_const_expr(reader: &mut BinaryReader) -> WasmResult<ConstExpr> {
    let opcode = reader.pull_byte()?;
    let expr = match opcode {
        0x41 => ConstExpr::I32(reader.pull_i32()?),
        0x42 => ConstExpr::I64(reader.pull_i64()?),
        _ => return Err(WasmError::Unsupported("global initialiser expression")),
    };
    let end = reader.pull_byte()?;
    if end != 0x0B {
        return Err(WasmError::invalid("global initialiser missing end opcode", reader.position()));
    }
    Ok(expr)
}

/// Parse the global section: for each entry, content kind, mutability,
/// then a constant expression.
pub fn parse_global_section(reader: &mut BinaryReader) -> WasmResult<PrimaryMap<GlobalIndex, GlobalType>> {
    let count = reader.pull_u32()?;
    let mut globals = PrimaryMap::new();
    for _ in 0..count {
        let content = pull_valtype(reader)?;
        let mutability = match reader.pull_byte()? {
            0x00 => Mutability::Const,
            0x01 => Mutability::Var,
            _ => return Err(WasmError::invalid("unknown global mutability byte", reader.position())),
        };
        let init = parse_const_expr(reader)?;
        if init.kind() != content {
            return Err(WasmError::type_mismatch("global initialiser kind does not match its declared content kind"));
        }
        globals.push(GlobalType { content, mutability, init });
    }
    Ok(globals)
}

/// Parse the export section. Needs the already-populated type,
/// function, memory, and global tables to build each export's extern
/// descriptor.
pub fn parse_export_section(
    reader: &mut BinaryReader,
    types: &PrimaryMap<TypeIndex, FuncType>,
    function_types: &PrimaryMap<FuncIndex, TypeIndex>,
    memories: &PrimaryMap<MemoryIndex, MemoryLimits>,
    globals: &PrimaryMap<GlobalIndex, GlobalType>,
) -> WasmResult<Vec<ExportType>> {
    let count = reader.pull_u32()?;
    let mut exports = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let name_len = reader.pull_u32()? as usize;
        let name = reader.pull(name_len)?.to_vec();
        let kind = ExternKind::from_byte(reader.pull_byte()?)
            .ok_or_else(|| WasmError::invalid("unknown export kind byte", reader.position()))?;
        let index = reader.pull_u32()?;
        let ty = match kind {
            ExternKind::Func => {
                let func_idx = FuncIndex::new(index as usize);
                let type_idx = *function_types
                    .get(func_idx)
                    .ok_or_else(|| WasmError::invalid("export references unknown function", reader.position()))?;
                let sig = types
                    .get(type_idx)
                    .ok_or_else(|| WasmError::invalid("export references unknown type", reader.position()))?;
                ExternType::Func(sig.clone())
            }
            ExternKind::Memory => {
                let mem_idx = MemoryIndex::new(index as usize);
                let limits = memories
                    .get(mem_idx)
                    .ok_or_else(|| WasmError::invalid("export references unknown memory", reader.position()))?;
                ExternType::Memory(*limits)
            }
            ExternKind::Global => {
                let global_idx = GlobalIndex::new(index as usize);
                let global = globals
                    .get(global_idx)
                    .ok_or_else(|| WasmError::invalid("export references unknown global", reader.position()))?;
                ExternType::Global(global.clone())
            }
            ExternKind::Table => {
                return Err(WasmError::Unsupported("exporting a table"));
            }
        };
        exports.push(ExportType { name, ty });
    }
    Ok(exports)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leb_u(mut value: u64) -> Vec<u8> {
        let mut out = Vec::new();
        loop {
            let mut byte = (value & 0x7F) as u8;
            value >>= 7;
            if value != 0 {
                byte |= 0x80;
            }
            out.push(byte);
            if value == 0 {
                break;
            }
        }
        out
    }

    #[test]
    fn parses_a_single_empty_to_empty_type() {
        let mut bytes = leb_u(1);
        bytes.push(0x60);
        bytes.extend(leb_u(0));
        bytes.extend(leb_u(0));
        let mut reader = BinaryReader::new(&bytes);
        let types = parse_type_section(&mut reader).unwrap();
        assert_eq!(types.len(), 1);
        assert!(types[TypeIndex::new(0)].params().is_empty());
        assert_eq!(types[TypeIndex::new(0)].result(), None);
    }

    #[test]
    fn rejects_multi_result_type() {
        let mut bytes = leb_u(1);
        bytes.push(0x60);
        bytes.extend(leb_u(0));
        bytes.extend(leb_u(2));
        bytes.push(0x7F);
        bytes.push(0x7F);
        let mut reader = BinaryReader::new(&bytes);
        assert!(parse_type_section(&mut reader).is_err());
    }

    #[test]
    fn parses_memory_limits_with_and_without_max() {
        let mut bytes = leb_u(2);
        bytes.push(0x00);
        bytes.extend(leb_u(1));
        bytes.push(0x01);
        bytes.extend(leb_u(1));
        bytes.extend(leb_u(4));
        let mut reader = BinaryReader::new(&bytes);
        let mems = parse_memory_section(&mut reader).unwrap();
        assert_eq!(mems[MemoryIndex::new(0)], MemoryLimits { min: 1, max: None });
        assert_eq!(mems[MemoryIndex::new(1)], MemoryLimits { min: 1, max: Some(4) });
    }

    #[test]
    fn parses_a_const_i32_global() {
        let mut bytes = leb_u(1);
        bytes.push(0x7F);
        bytes.push(0x00);
        bytes.push(0x41);
        bytes.extend(leb_u(7));
        bytes.push(0x0B);
        let mut reader = BinaryReader::new(&bytes);
        let globals = parse_global_section(&mut reader).unwrap();
        let g = &globals[GlobalIndex::new(0)];
        assert_eq!(g.content, ValType::I32);
        assert_eq!(g.mutability, Mutability::Const);
        assert_eq!(g.init, ConstExpr::I32(7));
    }

    #[test]
    fn rejects_export_of_a_table() {
        let mut bytes = leb_u(1);
        bytes.extend(leb_u(1));
        bytes.push(b't');
        bytes.push(0x01);
        bytes.extend(leb_u(0));
        let mut reader = BinaryReader::new(&bytes);
        let types = PrimaryMap::new();
        let function_types = PrimaryMap::new();
        let memories = PrimaryMap::new();
        let globals = PrimaryMap::new();
        assert!(parse_export_section(&mut reader, &types, &function_types, &memories, &globals).is_err());
    }
}
