//! Translates one function body, opcode by opcode, into SSA via the
//! [`crate::ir`] builder contract.
//!
//! The overall shape — a giant match over opcodes, small helper
//! functions per opcode family, and an explicit "unreachable operator"
//! skip path for dead code — follows `cranelift-wasm`'s own
//! `code_translator.rs`. The label/phi bridging it performs instead of
//! relying on an automatic SSA-construction builder follows
//! `wasm_jit_instr`/`wasm_jit_expr` in the system this crate's control
//! flow translation is modelled on.

use crate::binary_reader::BinaryReader;
use crate::error::{WasmError, WasmResult};
use crate::ir::{IntCmpKind, IrFunctionBuilder, IrType, MemSize};
use crate::state::{ControlFrame, LocalSlot, TranslationState};
use crate::types::{FuncIndex, FuncType, ValType};
use cranelift_entity::EntityRef;
use log::trace;

/// Looks up a callee's signature and builder handle by function index.
/// The module loader implements this against its own function table;
/// the translator only depends on this narrow seam.
pub trait CallResolver<F: Copy + Eq> {
    /// The callee's declared signature.
    fn signature(&self, index: FuncIndex) -> WasmResult<&FuncType>;
    /// The callee's IR builder handle.
    fn handle(&self, index: FuncIndex) -> WasmResult<F>;
}

/// Map a Wasm value kind to its IR representation. Exposed to the
/// module loader so it can compute function signatures before any
/// body is translated.
pub(crate) fn ir_type_of(kind: ValType) -> WasmResult<IrType> {
    match kind {
        ValType::I32 => Ok(IrType::I32),
        ValType::I64 => Ok(IrType::I64),
        ValType::FuncRef | ValType::ExternRef => Ok(IrType::Ptr),
        ValType::F32 | ValType::F64 => Err(WasmError::Unsupported("floating-point locals")),
    }
}

fn check_kind(actual: ValType, expected: ValType) -> WasmResult<()> {
    if actual == expected {
        Ok(())
    } else {
        Err(WasmError::type_mismatch(format!(
            "expected {:?}, found {:?}",
            expected, actual
        )))
    }
}

fn pop<B: IrFunctionBuilder>(state: &mut TranslationState<B>) -> WasmResult<crate::state::StackValue<B::Value>> {
    state
        .pop()
        .ok_or_else(|| WasmError::type_mismatch("operand stack underflow"))
}

fn zero_const<B: IrFunctionBuilder>(builder: &mut B, kind: ValType) -> WasmResult<B::Value> {
    Ok(builder.build_iconst(ir_type_of(kind)?, 0))
}

/// Translate one function body: locals prologue, then the opcode
/// stream, then the implicit termination check.
pub fn translate_function_body<B: IrFunctionBuilder>(
    body: &mut BinaryReader,
    builder: &mut B,
    sig: &FuncType,
    resolver: &dyn CallResolver<B::Function>,
) -> WasmResult<()> {
    let mut state = TranslationState::<B>::new();

    let entry = builder.create_block();
    builder.set_entry_block(entry);
    builder.set_block(entry);

    for (i, &kind) in sig.params().iter().enumerate() {
        let value = builder.build_param_ref(i as u32);
        state.locals.push(LocalSlot { kind, value });
    }

    let local_decl_runs = body.pull_u32()?;
    for _ in 0..local_decl_runs {
        let count = body.pull_u32()?;
        let kind_byte = body.pull_byte()?;
        let kind = ValType::from_byte(kind_byte)
            .ok_or_else(|| WasmError::invalid("unknown local value kind", body.position()))?;
        for _ in 0..count {
            let value = zero_const(builder, kind)?;
            state.locals.push(LocalSlot { kind, value });
        }
    }

    translate_operators(body, builder, sig, resolver, &mut state)?;

    if !body.is_empty() {
        return Err(WasmError::invalid(
            "code body has trailing bytes past its final end",
            body.position(),
        ));
    }

    if state.reachable {
        let value = match sig.result() {
            Some(kind) => {
                let v = pop(&mut state)?;
                check_kind(v.kind, kind)?;
                Some(v.value)
            }
            None => None,
        };
        builder.build_return(value);
    }

    Ok(())
}

fn translate_operators<B: IrFunctionBuilder>(
    body: &mut BinaryReader,
    builder: &mut B,
    sig: &FuncType,
    resolver: &dyn CallResolver<B::Function>,
    state: &mut TranslationState<B>,
) -> WasmResult<()> {
    // Counts `block`/`loop` constructs entered while `state.reachable`
    // is false, so their own (also dead) `end` markers can be told
    // apart from the `end` that closes the real enclosing frame and
    // restores reachability. Zero whenever `state.reachable` is true.
    let mut dead_depth: u32 = 0;

    loop {
        let opcode = body.pull_byte()?;
        trace!("translating opcode 0x{:02x} (reachable={})", opcode, state.reachable);

        if !state.reachable {
            match opcode {
                0x02 | 0x03 => {
                    body.pull_byte()?;
                    dead_depth += 1;
                }
                0x0B if dead_depth > 0 => {
                    dead_depth -= 1;
                }
                0x0B => {
                    if translate_end(builder, state)? {
                        return Ok(());
                    }
                }
                _ => skip_unreachable_operator(opcode, body)?,
            }
            continue;
        }

        match opcode {
            0x00 => {
                builder.build_unreachable();
                state.reachable = false;
                state.mark_innermost_terminated();
            }
            0x01 => {}
            0x02 => translate_block(body, builder, state)?,
            0x03 => translate_loop(body, builder, state)?,
            0x0B => {
                if translate_end(builder, state)? {
                    return Ok(());
                }
            }
            0x0C => {
                let depth = body.pull_u32()?;
                translate_br(depth, builder, state)?;
            }
            0x0D => {
                let depth = body.pull_u32()?;
                translate_br_if(depth, builder, state)?;
            }
            0x0F => translate_return(builder, sig, state)?,
            0x10 => {
                let idx = body.pull_u32()?;
                translate_call(FuncIndex::new(idx as usize), builder, resolver, state)?;
            }
            0x1A => {
                pop(state)?;
            }
            0x1B => translate_select(builder, state)?,
            0x20 => {
                let idx = body.pull_u32()? as usize;
                translate_local_get(idx, state)?;
            }
            0x21 => {
                let idx = body.pull_u32()? as usize;
                translate_local_set(idx, state)?;
            }
            0x22 => {
                let idx = body.pull_u32()? as usize;
                translate_local_tee(idx, state)?;
            }
            0x23 => {
                let idx = body.pull_u32()?;
                translate_global_get(idx, builder, state)?;
            }
            0x28..=0x35 => translate_load(opcode, body, builder, state)?,
            0x36..=0x3E => translate_store(opcode, body, builder, state)?,
            0x41 => {
                let v = body.pull_i32()?;
                let value = builder.build_iconst(IrType::I32, v as u32 as u64);
                state.push(ValType::I32, value);
            }
            0x42 => {
                let v = body.pull_i64()?;
                let value = builder.build_iconst(IrType::I64, v as u64);
                state.push(ValType::I64, value);
            }
            0x45 => translate_eqz(ValType::I32, builder, state)?,
            0x50 => translate_eqz(ValType::I64, builder, state)?,
            0x46..=0x4F => translate_icmp(opcode, ValType::I32, builder, state)?,
            0x51..=0x5A => translate_icmp(opcode, ValType::I64, builder, state)?,
            0x6A..=0x78 => translate_binop(opcode, ValType::I32, builder, state)?,
            0x7C..=0x8A => translate_binop(opcode, ValType::I64, builder, state)?,
            0xA7 => translate_wrap(builder, state)?,
            0xAC => translate_extend_i32_s(builder, state)?,
            0xAD => translate_extend_i32_u(builder, state)?,
            0xC0..=0xC4 => translate_sign_extend(opcode, builder, state)?,
            _ => return Err(WasmError::Unsupported("opcode not supported by this core")),
        }
    }
}

/// Consume the encoded immediates of `opcode` without emitting any IR,
/// since it occurs in dead code. `block`/`loop`/`end` are handled by
/// the caller (which tracks dead nesting depth) and never reach here.
fn skip_unreachable_operator(opcode: u8, body: &mut BinaryReader) -> WasmResult<()> {
    match opcode {
        0x00 | 0x01 | 0x0F | 0x1A | 0x1B => {}
        0x0C | 0x0D | 0x10 | 0x20 | 0x21 | 0x22 | 0x23 => {
            body.pull_u32()?;
        }
        0x28..=0x3E => {
            body.pull_u32()?;
            body.pull_u32()?;
        }
        0x41 => {
            body.pull_i32()?;
        }
        0x42 => {
            body.pull_i64()?;
        }
        0x45 | 0x46..=0x4F | 0x50 | 0x51..=0x5A | 0x6A..=0x78 | 0x7C..=0x8A | 0xA7 | 0xAC | 0xAD
        | 0xC0..=0xC4 => {}
        _ => return Err(WasmError::Unsupported("opcode not supported by this core")),
    }
    Ok(())
}

fn prepare_branch<B: IrFunctionBuilder>(builder: &mut B, locals: &[LocalSlot<B::Value>], frame: &ControlFrame<B>) {
    for (i, &phi) in frame.local_phis.iter().enumerate() {
        builder.add_phi_input(phi, locals[i].value);
    }
}

fn translate_block<B: IrFunctionBuilder>(
    body: &mut BinaryReader,
    builder: &mut B,
    state: &mut TranslationState<B>,
) -> WasmResult<()> {
    let blocktype = body.pull_byte()?;
    if blocktype != 0x40 {
        return Err(WasmError::Unsupported("non-empty block types"));
    }
    let target = builder.create_block();
    let current = builder.current_block();
    builder.set_block(target);
    let mut local_phis = Vec::with_capacity(state.locals.len());
    let mut local_values = Vec::with_capacity(state.locals.len());
    for local in &state.locals {
        let (value, phi) = builder.build_phi(ir_type_of(local.kind)?, &[]);
        local_phis.push(phi);
        local_values.push(LocalSlot { kind: local.kind, value });
    }
    builder.set_block(current);
    state.labels.push(ControlFrame {
        block: target,
        local_phis,
        local_values,
        terminated: false,
        is_loop: false,
    });
    Ok(())
}

fn translate_loop<B: IrFunctionBuilder>(
    body: &mut BinaryReader,
    builder: &mut B,
    state: &mut TranslationState<B>,
) -> WasmResult<()> {
    let blocktype = body.pull_byte()?;
    if blocktype != 0x40 {
        return Err(WasmError::Unsupported("non-empty block types"));
    }
    let header = builder.create_block();
    let current = builder.current_block();
    builder.set_block(header);
    let mut local_phis = Vec::with_capacity(state.locals.len());
    let mut local_values = Vec::with_capacity(state.locals.len());
    for local in &state.locals {
        let (value, phi) = builder.build_phi(ir_type_of(local.kind)?, &[]);
        local_phis.push(phi);
        local_values.push(LocalSlot { kind: local.kind, value });
    }
    builder.set_block(current);
    for (i, &phi) in local_phis.iter().enumerate() {
        builder.add_phi_input(phi, state.locals[i].value);
    }
    builder.build_branch(header);
    builder.set_block(header);
    state.locals = local_values.clone();
    state.labels.push(ControlFrame {
        block: header,
        local_phis,
        local_values,
        terminated: false,
        is_loop: true,
    });
    Ok(())
}

/// Returns `true` once the outermost `end` (the function body's own)
/// has been processed.
fn translate_end<B: IrFunctionBuilder>(builder: &mut B, state: &mut TranslationState<B>) -> WasmResult<bool> {
    let frame = match state.labels.pop() {
        None => return Ok(true),
        Some(frame) => frame,
    };

    if frame.is_loop {
        if frame.terminated {
            let fresh = builder.create_block();
            builder.set_block(fresh);
        }
    } else {
        if !frame.terminated {
            prepare_branch(builder, &state.locals, &frame);
            builder.build_branch(frame.block);
        }
        builder.set_block(frame.block);
        state.locals = frame.local_values;
    }
    state.reachable = true;
    Ok(false)
}

fn translate_br<B: IrFunctionBuilder>(
    depth: u32,
    builder: &mut B,
    state: &mut TranslationState<B>,
) -> WasmResult<()> {
    let idx = state
        .labels
        .len()
        .checked_sub(1 + depth as usize)
        .ok_or_else(|| WasmError::invalid("br depth exceeds label stack", 0))?;
    {
        let frame = &state.labels[idx];
        let locals = &state.locals;
        prepare_branch(builder, locals, frame);
        builder.build_branch(frame.block);
    }
    state.reachable = false;
    state.mark_innermost_terminated();
    Ok(())
}

fn translate_br_if<B: IrFunctionBuilder>(
    depth: u32,
    builder: &mut B,
    state: &mut TranslationState<B>,
) -> WasmResult<()> {
    let cond = pop(state)?;
    check_kind(cond.kind, ValType::I32)?;
    let idx = state
        .labels
        .len()
        .checked_sub(1 + depth as usize)
        .ok_or_else(|| WasmError::invalid("br_if depth exceeds label stack", 0))?;
    let continuation = builder.create_block();
    {
        let frame = &state.labels[idx];
        let locals = &state.locals;
        prepare_branch(builder, locals, frame);
        builder.build_brcond(cond.value, frame.block, continuation);
    }
    builder.set_block(continuation);
    Ok(())
}

fn translate_return<B: IrFunctionBuilder>(
    builder: &mut B,
    sig: &FuncType,
    state: &mut TranslationState<B>,
) -> WasmResult<()> {
    let value = match sig.result() {
        Some(kind) => {
            let v = pop(state)?;
            check_kind(v.kind, kind)?;
            Some(v.value)
        }
        None => None,
    };
    builder.build_return(value);
    state.reachable = false;
    state.mark_innermost_terminated();
    Ok(())
}

fn translate_call<B: IrFunctionBuilder>(
    index: FuncIndex,
    builder: &mut B,
    resolver: &dyn CallResolver<B::Function>,
    state: &mut TranslationState<B>,
) -> WasmResult<()> {
    let callee_sig = resolver.signature(index)?.clone();
    let handle = resolver.handle(index)?;
    let mut args = Vec::with_capacity(callee_sig.params().len());
    for &expected_kind in callee_sig.params().iter().rev() {
        let v = pop(state)?;
        check_kind(v.kind, expected_kind)?;
        args.push(v.value);
    }
    args.reverse();
    let result = builder.build_call(handle, &args);
    if let Some(kind) = callee_sig.result() {
        let value = result.ok_or_else(|| WasmError::invalid("callee did not produce its declared result", 0))?;
        state.push(kind, value);
    }
    Ok(())
}

fn translate_select<B: IrFunctionBuilder>(builder: &mut B, state: &mut TranslationState<B>) -> WasmResult<()> {
    let cond = pop(state)?;
    check_kind(cond.kind, ValType::I32)?;
    let val2 = pop(state)?;
    let val1 = pop(state)?;
    check_kind(val2.kind, val1.kind)?;

    let continuation = builder.create_block();
    builder.build_brcond(cond.value, continuation, continuation);
    builder.set_block(continuation);
    let (value, phi) = builder.build_phi(ir_type_of(val1.kind)?, &[]);
    builder.add_phi_input(phi, val1.value);
    builder.add_phi_input(phi, val2.value);
    state.push(val1.kind, value);
    Ok(())
}

fn translate_local_get<B: IrFunctionBuilder>(index: usize, state: &mut TranslationState<B>) -> WasmResult<()> {
    let local = *state
        .locals
        .get(index)
        .ok_or_else(|| WasmError::invalid("local index out of range", 0))?;
    state.push(local.kind, local.value);
    Ok(())
}

fn translate_local_set<B: IrFunctionBuilder>(index: usize, state: &mut TranslationState<B>) -> WasmResult<()> {
    let v = pop(state)?;
    let slot = state
        .locals
        .get_mut(index)
        .ok_or_else(|| WasmError::invalid("local index out of range", 0))?;
    check_kind(v.kind, slot.kind)?;
    slot.value = v.value;
    Ok(())
}

fn translate_local_tee<B: IrFunctionBuilder>(index: usize, state: &mut TranslationState<B>) -> WasmResult<()> {
    let v = *state
        .stack
        .last()
        .ok_or_else(|| WasmError::type_mismatch("operand stack underflow"))?;
    let slot = state
        .locals
        .get_mut(index)
        .ok_or_else(|| WasmError::invalid("local index out of range", 0))?;
    check_kind(v.kind, slot.kind)?;
    slot.value = v.value;
    Ok(())
}

fn translate_global_get<B: IrFunctionBuilder>(
    index: u32,
    builder: &mut B,
    state: &mut TranslationState<B>,
) -> WasmResult<()> {
    if index != 0 {
        return Err(WasmError::Unsupported("global.get of a non-zero index"));
    }
    let value = builder.build_iconst(IrType::I32, 0);
    state.push(ValType::I32, value);
    Ok(())
}

fn load_layout(opcode: u8) -> WasmResult<(MemSize, ValType, Option<u8>)> {
    Ok(match opcode {
        0x28 => (MemSize::Word, ValType::I32, None),
        0x29 => (MemSize::DWord, ValType::I64, None),
        0x2C => (MemSize::Byte, ValType::I32, Some(8)),
        0x2D => (MemSize::Byte, ValType::I32, None),
        0x2E => (MemSize::Half, ValType::I32, Some(16)),
        0x2F => (MemSize::Half, ValType::I32, None),
        0x30 => (MemSize::Byte, ValType::I64, Some(8)),
        0x31 => (MemSize::Byte, ValType::I64, None),
        0x32 => (MemSize::Half, ValType::I64, Some(16)),
        0x33 => (MemSize::Half, ValType::I64, None),
        0x34 => (MemSize::Word, ValType::I64, Some(32)),
        0x35 => (MemSize::Word, ValType::I64, None),
        _ => return Err(WasmError::Unsupported("memory access width")),
    })
}

fn store_layout(opcode: u8) -> WasmResult<(MemSize, ValType)> {
    Ok(match opcode {
        0x36 => (MemSize::Word, ValType::I32),
        0x37 => (MemSize::DWord, ValType::I64),
        0x3A => (MemSize::Byte, ValType::I32),
        0x3B => (MemSize::Half, ValType::I32),
        0x3C => (MemSize::Byte, ValType::I64),
        0x3D => (MemSize::Half, ValType::I64),
        0x3E => (MemSize::Word, ValType::I64),
        _ => return Err(WasmError::Unsupported("memory access width")),
    })
}

/// Compute the effective pointer for a memory access: the popped I32
/// address, widened to pointer width, summed with the instruction's
/// static offset immediate, then added to the (currently always zero)
/// memory base.
fn effective_pointer<B: IrFunctionBuilder>(builder: &mut B, addr: B::Value, offset: u32) -> B::Value {
    let widened = builder.build_iext(IrType::Ptr, addr);
    let offset_const = builder.build_iconst(IrType::Ptr, offset as u64);
    let address = builder.build_iadd(widened, offset_const);
    let base = builder.build_iconst(IrType::Ptr, 0);
    builder.build_ptroff(base, address)
}

fn translate_load<B: IrFunctionBuilder>(
    opcode: u8,
    body: &mut BinaryReader,
    builder: &mut B,
    state: &mut TranslationState<B>,
) -> WasmResult<()> {
    let _align = body.pull_u32()?;
    let offset = body.pull_u32()?;
    let (size, result_kind, sign_bits) = load_layout(opcode)?;
    let addr = pop(state)?;
    check_kind(addr.kind, ValType::I32)?;
    let ptr = effective_pointer(builder, addr.value, offset);
    let mut value = builder.build_load(size, ir_type_of(result_kind)?, ptr);
    if let Some(bits) = sign_bits {
        value = builder.build_sfill(bits, value);
    }
    state.push(result_kind, value);
    Ok(())
}

fn translate_store<B: IrFunctionBuilder>(
    opcode: u8,
    body: &mut BinaryReader,
    builder: &mut B,
    state: &mut TranslationState<B>,
) -> WasmResult<()> {
    let _align = body.pull_u32()?;
    let offset = body.pull_u32()?;
    let (size, operand_kind) = store_layout(opcode)?;
    let value = pop(state)?;
    check_kind(value.kind, operand_kind)?;
    let addr = pop(state)?;
    check_kind(addr.kind, ValType::I32)?;
    let ptr = effective_pointer(builder, addr.value, offset);
    builder.build_store(size, value.value, ptr);
    Ok(())
}

fn translate_eqz<B: IrFunctionBuilder>(
    kind: ValType,
    builder: &mut B,
    state: &mut TranslationState<B>,
) -> WasmResult<()> {
    let v = pop(state)?;
    check_kind(v.kind, kind)?;
    let zero = zero_const(builder, kind)?;
    let result = builder.build_icmp(IntCmpKind::Eq, v.value, zero);
    state.push(ValType::I32, result);
    Ok(())
}

fn icmp_kind(opcode: u8, base: u8) -> Option<(IntCmpKind, bool)> {
    // `swap` indicates the comparison's operands must be swapped
    // because the opcode's natural kind isn't directly in IntCmpKind
    // (gt/ge are expressed as swapped lt/le).
    let rel = opcode - base;
    Some(match rel {
        0 => (IntCmpKind::Eq, false),
        1 => (IntCmpKind::Ne, false),
        2 => (IntCmpKind::Slt, false),
        3 => (IntCmpKind::Ult, false),
        4 => (IntCmpKind::Slt, true),  // gt_s
        5 => (IntCmpKind::Ult, true),  // gt_u
        6 => (IntCmpKind::Sle, false), // le_s
        7 => (IntCmpKind::Ule, false), // le_u
        8 => (IntCmpKind::Sle, true),  // ge_s
        9 => (IntCmpKind::Ule, true),  // ge_u
        _ => return None,
    })
}

fn translate_icmp<B: IrFunctionBuilder>(
    opcode: u8,
    kind: ValType,
    builder: &mut B,
    state: &mut TranslationState<B>,
) -> WasmResult<()> {
    let base = if kind == ValType::I32 { 0x46 } else { 0x51 };
    let (cmp, swap) = icmp_kind(opcode, base).ok_or(WasmError::Unsupported("comparison opcode"))?;
    let rhs = pop(state)?;
    let lhs = pop(state)?;
    check_kind(rhs.kind, kind)?;
    check_kind(lhs.kind, kind)?;
    let result = if swap {
        builder.build_icmp(cmp, rhs.value, lhs.value)
    } else {
        builder.build_icmp(cmp, lhs.value, rhs.value)
    };
    state.push(ValType::I32, result);
    Ok(())
}

fn translate_binop<B: IrFunctionBuilder>(
    opcode: u8,
    kind: ValType,
    builder: &mut B,
    state: &mut TranslationState<B>,
) -> WasmResult<()> {
    let base = if kind == ValType::I32 { 0x6A } else { 0x7C };
    let rel = opcode - base;
    let rhs = pop(state)?;
    let lhs = pop(state)?;
    check_kind(rhs.kind, kind)?;
    check_kind(lhs.kind, kind)?;
    let result = match rel {
        0 => builder.build_iadd(lhs.value, rhs.value),
        1 => builder.build_isub(lhs.value, rhs.value),
        2 => builder.build_imul(lhs.value, rhs.value),
        3 => builder.build_sdiv(lhs.value, rhs.value),
        4 => builder.build_udiv(lhs.value, rhs.value),
        5 => builder.build_srem(lhs.value, rhs.value),
        6 => builder.build_urem(lhs.value, rhs.value),
        7 => builder.build_and(lhs.value, rhs.value),
        8 => builder.build_or(lhs.value, rhs.value),
        9 => builder.build_xor(lhs.value, rhs.value),
        10 => builder.build_shl(lhs.value, rhs.value),
        11 => builder.build_ashr(lhs.value, rhs.value),
        12 => builder.build_lshr(lhs.value, rhs.value),
        _ => return Err(WasmError::Unsupported("rotl/rotr are not supported by this core")),
    };
    state.push(kind, result);
    Ok(())
}

fn translate_wrap<B: IrFunctionBuilder>(builder: &mut B, state: &mut TranslationState<B>) -> WasmResult<()> {
    let v = pop(state)?;
    check_kind(v.kind, ValType::I64)?;
    let result = builder.build_itrunc(IrType::I32, v.value);
    state.push(ValType::I32, result);
    Ok(())
}

fn translate_extend_i32_s<B: IrFunctionBuilder>(
    builder: &mut B,
    state: &mut TranslationState<B>,
) -> WasmResult<()> {
    let v = pop(state)?;
    check_kind(v.kind, ValType::I32)?;
    let widened = builder.build_iext(IrType::I64, v.value);
    let result = builder.build_sfill(32, widened);
    state.push(ValType::I64, result);
    Ok(())
}

fn translate_extend_i32_u<B: IrFunctionBuilder>(
    builder: &mut B,
    state: &mut TranslationState<B>,
) -> WasmResult<()> {
    let v = pop(state)?;
    check_kind(v.kind, ValType::I32)?;
    let result = builder.build_iext(IrType::I64, v.value);
    state.push(ValType::I64, result);
    Ok(())
}

fn translate_sign_extend<B: IrFunctionBuilder>(
    opcode: u8,
    builder: &mut B,
    state: &mut TranslationState<B>,
) -> WasmResult<()> {
    let (kind, width) = match opcode {
        0xC0 => (ValType::I32, 8),
        0xC1 => (ValType::I32, 16),
        0xC2 => (ValType::I64, 8),
        0xC3 => (ValType::I64, 16),
        0xC4 => (ValType::I64, 32),
        _ => unreachable!(),
    };
    let v = pop(state)?;
    check_kind(v.kind, kind)?;
    let result = builder.build_sfill(width, v.value);
    state.push(kind, result);
    Ok(())
}
