//! Per-function translation state: the operand stack, the locals
//! array, and the label stack of control-flow frames.
//!
//! The label/phi bridging here follows the same shape as
//! `wasm_create_label`/`wasm_prepare_branch`/`wasm_jit_expr` in the
//! system this crate's behaviour is modelled on: every label
//! pre-creates one phi per live local in its target block, and every
//! branch to that label feeds the locals' current values as phi
//! inputs before jumping.

use crate::ir::IrFunctionBuilder;
use crate::types::ValType;

/// One entry of the operand stack: a kind tag alongside the IR value
/// that carries it.
#[derive(Debug, Clone, Copy)]
pub struct StackValue<V> {
    /// The Wasm value kind.
    pub kind: ValType,
    /// The IR value.
    pub value: V,
}

/// One declared local: its kind and current SSA value.
#[derive(Debug, Clone, Copy)]
pub struct LocalSlot<V> {
    /// The local's declared kind.
    pub kind: ValType,
    /// The value currently bound to this local.
    pub value: V,
}

/// One entry of the label stack, covering both `block` and `loop`
/// frames (see §4.4.2/§4.4.4 of the design).
pub struct ControlFrame<B: IrFunctionBuilder> {
    /// The block a `br` to this label branches to.
    pub block: B::Block,
    /// One phi per live local, pre-created in `block`.
    pub local_phis: Vec<B::Phi>,
    /// The (kind, value) pairs control adopts when entering `block`.
    pub local_values: Vec<LocalSlot<B::Value>>,
    /// Whether the block currently being emitted into has already
    /// been terminated (by `br`, `return`, or `unreachable`).
    pub terminated: bool,
    /// Whether this is a `loop` frame (affects `end` handling).
    pub is_loop: bool,
}

/// All translation state for one function body.
pub struct TranslationState<B: IrFunctionBuilder> {
    /// The operand stack.
    pub stack: Vec<StackValue<B::Value>>,
    /// The locals array (parameters first, then declared locals).
    pub locals: Vec<LocalSlot<B::Value>>,
    /// The label stack. Empty once translation of the body completes.
    pub labels: Vec<ControlFrame<B>>,
    /// Whether the current position is reachable. Cleared by `br`,
    /// `return`, and `unreachable`; restored to `true` by the `end`
    /// that closes the frame that terminator targeted. While `false`,
    /// the translator still consumes operator immediates to keep the
    /// byte stream in sync, but emits no IR.
    pub reachable: bool,
}

impl<B: IrFunctionBuilder> TranslationState<B> {
    /// A fresh, empty state.
    pub fn new() -> Self {
        TranslationState {
            stack: Vec::new(),
            locals: Vec::new(),
            labels: Vec::new(),
            reachable: true,
        }
    }

    /// Push one operand.
    pub fn push(&mut self, kind: ValType, value: B::Value) {
        self.stack.push(StackValue { kind, value });
    }

    /// Pop one operand.
    pub fn pop(&mut self) -> Option<StackValue<B::Value>> {
        self.stack.pop()
    }

    /// Mark the innermost label (if any) as terminated. A no-op when
    /// the label stack is empty, which happens for a `return` at the
    /// body's top nesting level.
    pub fn mark_innermost_terminated(&mut self) {
        if let Some(frame) = self.labels.last_mut() {
            frame.terminated = true;
        }
    }

    /// Borrow the label frame `depth` levels up from the innermost
    /// (0 = innermost).
    pub fn label_at(&self, depth: u32) -> Option<&ControlFrame<B>> {
        let idx = self.labels.len().checked_sub(1 + depth as usize)?;
        self.labels.get(idx)
    }
}

impl<B: IrFunctionBuilder> Default for TranslationState<B> {
    fn default() -> Self {
        Self::new()
    }
}
