//! A minimal textual IR builder, used only by this crate's own tests.
//!
//! The real IR builder is an external collaborator (see [`crate::ir`]);
//! this module exists purely so the module loader and function
//! translator can be exercised without one. It is deliberately the
//! simplest possible instruction selection: no optimisation, no
//! register allocation, just enough bookkeeping to answer "did the
//! translator emit the shape it should have".
//!
//! [`DummyModule`] plays both roles from [`crate::ir`]: it is its own
//! [`IrFunctionBuilder`], scoped by an internal "function currently
//! being built" cursor that [`IrModule::build_function`] sets for the
//! duration of its callback. This sidesteps needing a second,
//! separately-borrowed builder type (and the lifetime gymnastics that
//! would require without generic associated types, unavailable on this
//! crate's edition).

use crate::error::WasmError;
use crate::ir::{DumpControl, IntCmpKind, IrFunctionBuilder, IrModule, IrType, MemSize};
use cranelift_entity::{entity_impl, PrimaryMap};
use std::collections::HashMap;
use std::fmt::Write as _;

/// Handle to a function created in a [`DummyModule`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DummyFunc(u32);
entity_impl!(DummyFunc);

/// Handle to a block within a function currently being built.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DummyBlock(u32);

/// Handle to a value within a function currently being built.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DummyValue(u32);

/// Handle to a phi within a function currently being built. Shares its
/// numbering with the [`DummyValue`] it produces.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DummyPhi(u32);

#[derive(Debug, Clone)]
enum Inst {
    Param(u32),
    IConst(IrType, u64),
    Binop(&'static str, DummyValue, DummyValue),
    Icmp(IntCmpKind, DummyValue, DummyValue),
    Phi(IrType, Vec<DummyValue>),
    Sfill(u8, DummyValue),
    Iext(IrType, DummyValue),
    Itrunc(IrType, DummyValue),
    Load(MemSize, IrType, DummyValue),
    Store(MemSize, DummyValue, DummyValue),
    Ptroff(DummyValue, DummyValue),
    Call(DummyFunc, Vec<DummyValue>),
}

#[derive(Debug, Clone)]
enum Term {
    Branch(DummyBlock),
    Brcond(DummyValue, DummyBlock, DummyBlock),
    Return(Option<DummyValue>),
    Unreachable,
}

#[derive(Default, Debug, Clone)]
struct BlockData {
    insts: Vec<(DummyValue, Inst)>,
    term: Option<Term>,
}

#[derive(Debug)]
struct FunctionData {
    name: String,
    result: IrType,
    params: Vec<IrType>,
    blocks: Vec<BlockData>,
    entry: Option<DummyBlock>,
    /// Maps a value id to the block/instruction slot that defines it,
    /// so `add_phi_input` can find a phi created in an earlier block.
    defined_at: HashMap<u32, (usize, usize)>,
    next_value: u32,
}

impl FunctionData {
    fn fresh_value(&mut self) -> DummyValue {
        let id = self.next_value;
        self.next_value += 1;
        DummyValue(id)
    }

    fn push_inst(&mut self, block: usize, inst: Inst) -> DummyValue {
        let value = self.fresh_value();
        let slot = self.blocks[block].insts.len();
        self.blocks[block].insts.push((value, inst));
        self.defined_at.insert(value.0, (block, slot));
        value
    }
}

/// The test-double IR module: owns every function's textual representation.
pub struct DummyModule {
    functions: PrimaryMap<DummyFunc, FunctionData>,
    /// The function and block [`IrFunctionBuilder`] calls currently
    /// target; set by [`IrModule::build_function`] for the scope of
    /// its callback.
    current_func: Option<DummyFunc>,
    current_block: usize,
}

impl DummyModule {
    /// An empty module.
    pub fn new() -> DummyModule {
        DummyModule {
            functions: PrimaryMap::new(),
            current_func: None,
            current_block: 0,
        }
    }

    /// Render one function's blocks and instructions as text, for
    /// tests that want to assert on emitted shape without going
    /// through the dump-sink callback protocol.
    pub fn render_function(&self, func: DummyFunc) -> String {
        let data = &self.functions[func];
        let mut out = String::new();
        let _ = writeln!(out, "function {}({:?}) -> {:?} {{", data.name, data.params, data.result);
        for (bi, block) in data.blocks.iter().enumerate() {
            let _ = writeln!(out, "  block{}:", bi);
            for (value, inst) in &block.insts {
                let _ = writeln!(out, "    v{} = {}", value.0, render_inst(inst));
            }
            if let Some(term) = &block.term {
                let _ = writeln!(out, "    {}", render_term(term));
            }
        }
        let _ = writeln!(out, "}}");
        out
    }

    fn data_mut(&mut self) -> &mut FunctionData {
        let func = self.current_func.expect("builder used outside build_function");
        &mut self.functions[func]
    }

    fn data(&self) -> &FunctionData {
        let func = self.current_func.expect("builder used outside build_function");
        &self.functions[func]
    }
}

impl Default for DummyModule {
    fn default() -> Self {
        Self::new()
    }
}

fn render_inst(inst: &Inst) -> String {
    match inst {
        Inst::Param(i) => format!("param {}", i),
        Inst::IConst(ty, v) => format!("iconst.{:?} {}", ty, v),
        Inst::Binop(op, a, b) => format!("{} v{}, v{}", op, a.0, b.0),
        Inst::Icmp(kind, a, b) => format!("icmp {:?} v{}, v{}", kind, a.0, b.0),
        Inst::Phi(ty, inputs) => format!(
            "phi.{:?} [{}]",
            ty,
            inputs.iter().map(|v| format!("v{}", v.0)).collect::<Vec<_>>().join(", ")
        ),
        Inst::Sfill(w, v) => format!("sfill{} v{}", w, v.0),
        Inst::Iext(ty, v) => format!("iext.{:?} v{}", ty, v.0),
        Inst::Itrunc(ty, v) => format!("itrunc.{:?} v{}", ty, v.0),
        Inst::Load(size, ty, ptr) => format!("load.{:?}.{:?} v{}", size, ty, ptr.0),
        Inst::Store(size, val, ptr) => format!("store.{:?} v{}, v{}", size, val.0, ptr.0),
        Inst::Ptroff(ptr, off) => format!("ptroff v{}, v{}", ptr.0, off.0),
        Inst::Call(f, args) => format!(
            "call {:?}({})",
            f,
            args.iter().map(|v| format!("v{}", v.0)).collect::<Vec<_>>().join(", ")
        ),
    }
}

fn render_term(term: &Term) -> String {
    match term {
        Term::Branch(b) => format!("branch block{}", b.0),
        Term::Brcond(cond, t, f) => format!("brcond v{}, block{}, block{}", cond.0, t.0, f.0),
        Term::Return(Some(v)) => format!("return v{}", v.0),
        Term::Return(None) => "return".to_string(),
        Term::Unreachable => "unreachable".to_string(),
    }
}

impl IrModule for DummyModule {
    type Function = DummyFunc;
    type Builder = DummyModule;

    fn create_function(&mut self, name: &str, result: IrType, params: &[IrType]) -> DummyFunc {
        self.functions.push(FunctionData {
            name: name.to_string(),
            result,
            params: params.to_vec(),
            blocks: Vec::new(),
            entry: None,
            defined_at: HashMap::new(),
            next_value: 0,
        })
    }

    fn build_function(
        &mut self,
        func: DummyFunc,
        build: &mut dyn FnMut(&mut Self::Builder) -> Result<(), WasmError>,
    ) -> Result<(), WasmError> {
        let previous = self.current_func.replace(func);
        self.current_block = 0;
        let result = build(self);
        self.current_func = previous;
        result
    }

    fn dump(&self, sink: &mut dyn FnMut(&[u8]) -> DumpControl) {
        for (func, _) in self.functions.iter() {
            let text = self.render_function(func);
            if let DumpControl::Stop = sink(text.as_bytes()) {
                return;
            }
        }
    }
}

impl IrFunctionBuilder for DummyModule {
    type Function = DummyFunc;
    type Block = DummyBlock;
    type Value = DummyValue;
    type Phi = DummyPhi;

    fn create_block(&mut self) -> DummyBlock {
        let data = self.data_mut();
        let idx = data.blocks.len();
        data.blocks.push(BlockData::default());
        DummyBlock(idx as u32)
    }

    fn set_block(&mut self, block: DummyBlock) {
        self.current_block = block.0 as usize;
    }

    fn set_entry_block(&mut self, block: DummyBlock) {
        self.data_mut().entry = Some(block);
    }

    fn current_block(&self) -> DummyBlock {
        DummyBlock(self.current_block as u32)
    }

    fn build_phi(&mut self, ty: IrType, inputs: &[DummyValue]) -> (DummyValue, DummyPhi) {
        let block = self.current_block;
        let value = self.data_mut().push_inst(block, Inst::Phi(ty, inputs.to_vec()));
        (value, DummyPhi(value.0))
    }

    fn add_phi_input(&mut self, phi: DummyPhi, value: DummyValue) {
        let data = self.data_mut();
        let (block, slot) = data.defined_at[&phi.0];
        if let (_, Inst::Phi(_, inputs)) = &mut data.blocks[block].insts[slot] {
            inputs.push(value);
        } else {
            panic!("add_phi_input on a non-phi value");
        }
    }

    fn build_param_ref(&mut self, index: u32) -> DummyValue {
        let block = self.current_block;
        self.data_mut().push_inst(block, Inst::Param(index))
    }

    fn build_iconst(&mut self, ty: IrType, value: u64) -> DummyValue {
        let block = self.current_block;
        self.data_mut().push_inst(block, Inst::IConst(ty, value))
    }

    fn build_iadd(&mut self, a: DummyValue, b: DummyValue) -> DummyValue {
        let block = self.current_block;
        self.data_mut().push_inst(block, Inst::Binop("iadd", a, b))
    }
    fn build_isub(&mut self, a: DummyValue, b: DummyValue) -> DummyValue {
        let block = self.current_block;
        self.data_mut().push_inst(block, Inst::Binop("isub", a, b))
    }
    fn build_imul(&mut self, a: DummyValue, b: DummyValue) -> DummyValue {
        let block = self.current_block;
        self.data_mut().push_inst(block, Inst::Binop("imul", a, b))
    }
    fn build_sdiv(&mut self, a: DummyValue, b: DummyValue) -> DummyValue {
        let block = self.current_block;
        self.data_mut().push_inst(block, Inst::Binop("sdiv", a, b))
    }
    fn build_udiv(&mut self, a: DummyValue, b: DummyValue) -> DummyValue {
        let block = self.current_block;
        self.data_mut().push_inst(block, Inst::Binop("udiv", a, b))
    }
    fn build_srem(&mut self, a: DummyValue, b: DummyValue) -> DummyValue {
        let block = self.current_block;
        self.data_mut().push_inst(block, Inst::Binop("srem", a, b))
    }
    fn build_urem(&mut self, a: DummyValue, b: DummyValue) -> DummyValue {
        let block = self.current_block;
        self.data_mut().push_inst(block, Inst::Binop("urem", a, b))
    }
    fn build_and(&mut self, a: DummyValue, b: DummyValue) -> DummyValue {
        let block = self.current_block;
        self.data_mut().push_inst(block, Inst::Binop("and", a, b))
    }
    fn build_or(&mut self, a: DummyValue, b: DummyValue) -> DummyValue {
        let block = self.current_block;
        self.data_mut().push_inst(block, Inst::Binop("or", a, b))
    }
    fn build_xor(&mut self, a: DummyValue, b: DummyValue) -> DummyValue {
        let block = self.current_block;
        self.data_mut().push_inst(block, Inst::Binop("xor", a, b))
    }
    fn build_shl(&mut self, a: DummyValue, b: DummyValue) -> DummyValue {
        let block = self.current_block;
        self.data_mut().push_inst(block, Inst::Binop("shl", a, b))
    }
    fn build_ashr(&mut self, a: DummyValue, b: DummyValue) -> DummyValue {
        let block = self.current_block;
        self.data_mut().push_inst(block, Inst::Binop("ashr", a, b))
    }
    fn build_lshr(&mut self, a: DummyValue, b: DummyValue) -> DummyValue {
        let block = self.current_block;
        self.data_mut().push_inst(block, Inst::Binop("lshr", a, b))
    }

    fn build_icmp(&mut self, kind: IntCmpKind, a: DummyValue, b: DummyValue) -> DummyValue {
        let block = self.current_block;
        self.data_mut().push_inst(block, Inst::Icmp(kind, a, b))
    }

    fn build_sfill(&mut self, width: u8, value: DummyValue) -> DummyValue {
        let block = self.current_block;
        self.data_mut().push_inst(block, Inst::Sfill(width, value))
    }
    fn build_iext(&mut self, to: IrType, value: DummyValue) -> DummyValue {
        let block = self.current_block;
        self.data_mut().push_inst(block, Inst::Iext(to, value))
    }
    fn build_itrunc(&mut self, to: IrType, value: DummyValue) -> DummyValue {
        let block = self.current_block;
        self.data_mut().push_inst(block, Inst::Itrunc(to, value))
    }

    fn build_load(&mut self, size: MemSize, result_ty: IrType, ptr: DummyValue) -> DummyValue {
        let block = self.current_block;
        self.data_mut().push_inst(block, Inst::Load(size, result_ty, ptr))
    }
    fn build_store(&mut self, size: MemSize, value: DummyValue, ptr: DummyValue) {
        let block = self.current_block;
        self.data_mut().push_inst(block, Inst::Store(size, value, ptr));
    }
    fn build_ptroff(&mut self, ptr: DummyValue, offset: DummyValue) -> DummyValue {
        let block = self.current_block;
        self.data_mut().push_inst(block, Inst::Ptroff(ptr, offset))
    }

    fn build_call(&mut self, callee: DummyFunc, args: &[DummyValue]) -> Option<DummyValue> {
        let block = self.current_block;
        Some(self.data_mut().push_inst(block, Inst::Call(callee, args.to_vec())))
    }

    fn build_branch(&mut self, target: DummyBlock) {
        let block = self.current_block;
        self.data_mut().blocks[block].term = Some(Term::Branch(target));
    }
    fn build_brcond(&mut self, cond: DummyValue, if_true: DummyBlock, if_false: DummyBlock) {
        let block = self.current_block;
        self.data_mut().blocks[block].term = Some(Term::Brcond(cond, if_true, if_false));
    }
    fn build_return(&mut self, value: Option<DummyValue>) {
        let block = self.current_block;
        self.data_mut().blocks[block].term = Some(Term::Return(value));
    }
    fn build_unreachable(&mut self) {
        let block = self.current_block;
        self.data_mut().blocks[block].term = Some(Term::Unreachable);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_trivial_function() {
        let mut module = DummyModule::new();
        let f = module.create_function("f", IrType::I32, &[]);
        module
            .build_function(f, &mut |b| {
                let entry = b.create_block();
                b.set_entry_block(entry);
                b.set_block(entry);
                let v = b.build_iconst(IrType::I32, 42);
                b.build_return(Some(v));
                Ok(())
            })
            .unwrap();
        let text = module.render_function(f);
        assert!(text.contains("iconst.I32 42"));
        assert!(text.contains("return v0"));
    }

    #[test]
    fn phi_accumulates_inputs_from_multiple_blocks() {
        let mut module = DummyModule::new();
        let f = module.create_function("loopy", IrType::I32, &[IrType::I32]);
        module
            .build_function(f, &mut |b| {
                let entry = b.create_block();
                let header = b.create_block();
                b.set_entry_block(entry);
                b.set_block(entry);
                let zero = b.build_iconst(IrType::I32, 0);
                b.build_branch(header);

                b.set_block(header);
                let (phi_value, phi) = b.build_phi(IrType::I32, &[]);
                b.add_phi_input(phi, zero);
                let one = b.build_iconst(IrType::I32, 1);
                let next = b.build_iadd(phi_value, one);
                b.add_phi_input(phi, next);
                b.build_return(Some(phi_value));
                Ok(())
            })
            .unwrap();
        let text = module.render_function(f);
        assert!(text.contains("phi.I32 [v0, v2]"));
    }
}
