//! End-to-end scenarios, exercised against the in-repo IR builder test
//! double: hand-encoded Wasm byte sequences in, expected emitted IR
//! shape out.

use cranelift_entity::EntityRef;
use wasm_ssa::dummy::DummyModule;
use wasm_ssa::module::translate_module;
use wasm_ssa::types::FuncIndex;

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

fn leb_i(mut value: i64) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        let done = (value == 0 && byte & 0x40 == 0) || (value == -1 && byte & 0x40 != 0);
        out.push(if done { byte } else { byte | 0x80 });
        if done {
            break;
        }
    }
    out
}

fn section(id: u8, payload: Vec<u8>) -> Vec<u8> {
    let mut out = vec![id];
    out.extend(leb_u(payload.len() as u64));
    out.extend(payload);
    out
}

/// Build a one-function module: a single type `params -> results`,
/// one function of that type, and `body` as its (already
/// locals-prefixed) code.
fn one_function_module(params: &[u8], results: &[u8], body: Vec<u8>) -> Vec<u8> {
    let mut type_payload = leb_u(1);
    type_payload.push(0x60);
    type_payload.extend(leb_u(params.len() as u64));
    type_payload.extend_from_slice(params);
    type_payload.extend(leb_u(results.len() as u64));
    type_payload.extend_from_slice(results);

    let mut func_payload = leb_u(1);
    func_payload.extend(leb_u(0)); // type index 0

    let mut code_payload = leb_u(1);
    code_payload.extend(leb_u(body.len() as u64));
    code_payload.extend(body);

    let mut module = vec![0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00];
    module.extend(section(0x01, type_payload));
    module.extend(section(0x03, func_payload));
    module.extend(section(0x0A, code_payload));
    module
}

fn translate_one(params: &[u8], results: &[u8], body: Vec<u8>) -> String {
    let bytes = one_function_module(params, results, body);
    let module = translate_module(&bytes, DummyModule::new()).expect("translation should succeed");
    let handle = module.functions[FuncIndex::new(0)].handle;
    module.ir.render_function(handle)
}

#[test]
fn scenario_1_empty_function_returns_constant() {
    let mut body = leb_u(0); // no declared locals
    body.push(0x41);
    body.extend(leb_i(42));
    body.push(0x0B);

    let text = translate_one(&[], &[0x7F], body);
    assert!(text.contains("v0 = iconst.I32 42"), "{}", text);
    assert!(text.contains("return v0"), "{}", text);
}

#[test]
fn scenario_2_identity_on_parameter() {
    let mut body = leb_u(0);
    body.push(0x20);
    body.extend(leb_u(0));
    body.push(0x0B);

    let text = translate_one(&[0x7F], &[0x7F], body);
    assert!(text.contains("v0 = param 0"), "{}", text);
    assert!(text.contains("return v0"), "{}", text);
}

#[test]
fn scenario_3_add_two_parameters() {
    let mut body = leb_u(0);
    body.push(0x20);
    body.extend(leb_u(0));
    body.push(0x20);
    body.extend(leb_u(1));
    body.push(0x6A); // i32.add
    body.push(0x0B);

    let text = translate_one(&[0x7F, 0x7F], &[0x7F], body);
    assert!(text.contains("v2 = iadd v0, v1"), "{}", text);
    assert!(text.contains("return v2"), "{}", text);
}

#[test]
fn scenario_4_gt_s_swaps_operands() {
    let mut body = leb_u(0);
    body.push(0x20);
    body.extend(leb_u(0));
    body.push(0x20);
    body.extend(leb_u(1));
    body.push(0x4A); // i32.gt_s
    body.push(0x0B);

    let text = translate_one(&[0x7F, 0x7F], &[0x7F], body);
    // gt_s(a, b) is synthesised as slt(b, a): only Slt appears.
    assert!(text.contains("v2 = icmp Slt v1, v0"), "{}", text);
    assert!(!text.contains("Sgt"));
}

#[test]
fn scenario_5_block_br_early_exit() {
    let mut body = leb_u(0);
    body.push(0x02);
    body.push(0x40); // block, empty type
    body.push(0x41);
    body.extend(leb_i(7));
    body.push(0x0C);
    body.extend(leb_u(0)); // br 0
    body.push(0x41);
    body.extend(leb_i(9)); // dead code, never translated
    body.push(0x0B); // end block
    body.push(0x0B); // end function

    let text = translate_one(&[], &[0x7F], body);
    assert!(text.contains("v0 = iconst.I32 7"), "{}", text);
    assert!(!text.contains("iconst.I32 9"), "{}", text);
    assert!(text.contains("branch block1"), "{}", text);
    assert!(text.contains("return v0"), "{}", text);
}

#[test]
fn scenario_6_loop_accumulator() {
    // one declared local (index 1) beyond the single I32 parameter.
    let mut body = leb_u(1);
    body.extend(leb_u(1));
    body.push(0x7F);

    body.push(0x20);
    body.extend(leb_u(0)); // local.get 0
    body.push(0x41);
    body.extend(leb_i(0)); // i32.const 0
    body.push(0x21);
    body.extend(leb_u(1)); // local.set 1

    body.push(0x03);
    body.push(0x40); // loop, empty type

    body.push(0x20);
    body.extend(leb_u(1)); // local.get 1
    body.push(0x41);
    body.extend(leb_i(1)); // i32.const 1
    body.push(0x6A); // i32.add
    body.push(0x21);
    body.extend(leb_u(1)); // local.set 1

    body.push(0x20);
    body.extend(leb_u(1)); // local.get 1
    body.push(0x20);
    body.extend(leb_u(0)); // local.get 0
    body.push(0x48); // i32.lt_s
    body.push(0x0D);
    body.extend(leb_u(0)); // br_if 0
    body.push(0x0B); // end loop

    body.push(0x20);
    body.extend(leb_u(1)); // local.get 1
    body.push(0x0B); // end function

    let text = translate_one(&[0x7F], &[0x7F], body);
    // the header's local-1 phi carries the pre-loop zero and the
    // backedge's incremented value.
    assert!(text.contains("v4 = phi.I32 [v2, v6]"), "{}", text);
    assert!(text.contains("v6 = iadd v4, v5"), "{}", text);
    assert!(text.contains("v7 = icmp Slt v6, v3"), "{}", text);
    assert!(text.contains("brcond v7, block1, block2"), "{}", text);
    assert!(text.contains("return v6"), "{}", text);
}

#[test]
fn header_validation_rejects_bad_magic() {
    let bytes = [0x00, 0x61, 0x73, 0x00, 0x01, 0x00, 0x00, 0x00];
    assert!(translate_module(&bytes, DummyModule::new()).is_err());
}

#[test]
fn unknown_section_id_is_fatal() {
    let mut module = vec![0x00, 0x61, 0x73, 0x6D, 0x01, 0x00, 0x00, 0x00];
    module.extend(section(0x63, vec![]));
    assert!(translate_module(&module, DummyModule::new()).is_err());
}
