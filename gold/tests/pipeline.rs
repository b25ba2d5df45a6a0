//! Builds small AST trees directly (no surface grammar is implemented in
//! this crate) and runs them through the scope/constant/codegen pipeline.

use gold::{AssembleWithRelocations, AstNode, AttrValue, FlattenSymbol, Kind, Storage};
use lexan::TextSpan;
use std::collections::BTreeMap;

fn at(line: u32) -> TextSpan {
    TextSpan::point(line, 0)
}

fn leaf(kind: Kind, line: u32, attrs: Vec<(&str, AttrValue)>) -> AstNode {
    let attrs = attrs.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
    AstNode::leaf(kind, at(line), attrs)
}

fn node(kind: Kind, line: u32, attrs: Vec<(&str, AttrValue)>, children: Vec<AstNode>) -> AstNode {
    let attrs: BTreeMap<String, AttrValue> = attrs.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
    AstNode::new(kind, at(line), attrs, children)
}

/// `let x = 1; let y = x + 1; print(y)` -- after `ExplicitScopes`, the two
/// `let`s nest into a single `let_scoped(x, let_scoped(y, print(y)))`.
#[test]
fn explicit_scopes_nests_successive_lets() {
    use gold::{Order, PatternTransform};

    let print_call = leaf(
        Kind::Call,
        3,
        vec![("name", AttrValue::Str("print".to_string()))],
    );
    let let_y = node(
        Kind::Let,
        2,
        vec![("name", AttrValue::Str("y".to_string()))],
        vec![print_call.clone()],
    );
    let let_x = node(
        Kind::Let,
        1,
        vec![("name", AttrValue::Str("x".to_string()))],
        vec![let_y.clone()],
    );
    let unit = node(Kind::Unit, 1, vec![], vec![let_x]);

    let mut pass = gold::passes::binding::ExplicitScopes;
    let rewritten = pass.rewrite(unit, Order::Descending).unwrap();

    assert_eq!(rewritten.children.len(), 1);
    let outer_scope = &rewritten.children[0];
    assert_eq!(outer_scope.kind, Kind::LetScoped);
    assert_eq!(outer_scope.children.len(), 1);

    let inner_scope = &outer_scope.children[0];
    assert_eq!(inner_scope.kind, Kind::LetScoped);
    assert_eq!(inner_scope.children, vec![print_call]);
}

/// `constant K = 42; lda(K)` resolves to an `lda` with immediate storage
/// 42, which `AssembleWithRelocations` lowers to `A9 2A`.
#[test]
fn constants_evaluate_resolve_and_assemble() {
    use gold::passes::binding::{EvaluateConstants, ResolveConstants};

    // The constant's bound value is a leaf carrying the integer directly,
    // standing in for a literal-expression node in the absent surface grammar.
    let value_node = leaf(Kind::Data, 1, vec![("value", AttrValue::Int(42))]);

    let constant = node(
        Kind::Constant,
        1,
        vec![
            ("name", AttrValue::Str("K".to_string())),
            ("type", AttrValue::Str("byte".to_string())),
        ],
        vec![value_node],
    );

    let identifier_k = leaf(
        Kind::Identifier,
        2,
        vec![("name", AttrValue::Str("K".to_string()))],
    );
    let lda = node(Kind::Lda, 2, vec![], vec![identifier_k]);

    let unit = node(Kind::Unit, 1, vec![], vec![constant, lda]);

    let mut evaluate = EvaluateConstants::default();
    let evaluated = evaluate.run(unit);
    // The constant node itself is deleted, leaving only the `lda`.
    assert_eq!(evaluated.children.len(), 1);
    assert_eq!(evaluated.children[0].kind, Kind::Lda);

    let mut resolve = ResolveConstants::default();
    let resolved = resolve.run(evaluated);
    let lda_node = &resolved.children[0];
    assert_eq!(lda_node.children.len(), 1);
    // The identifier was replaced by the bound constant's value node.
    assert_eq!(lda_node.children[0].kind, Kind::Data);
    assert_eq!(
        lda_node.children[0].attr("value"),
        Some(&AttrValue::Int(42))
    );

    // Give the resolved value node the `storage` attribute an upstream
    // layout pass (out of scope here) would have assigned, and assemble.
    let mut lda_with_storage = resolved.children[0].clone();
    lda_with_storage.set_attr("storage", AttrValue::Storage(Storage::immediate(42, 1)));
    let assembled = AssembleWithRelocations::run(lda_with_storage).unwrap();
    match assembled.attr("data") {
        Some(AttrValue::Bytes(bytes)) => assert_eq!(bytes, &vec![0xA9, 0x2A]),
        other => panic!("expected emitted bytes, got {other:?}"),
    }
}

#[test]
fn sta_jmp_rts_emit_expected_bytes() {
    let mut sta = leaf(Kind::Sta, 1, vec![]);
    sta.set_attr("storage", AttrValue::Storage(Storage::absolute(0xD020, 1)));
    let assembled = AssembleWithRelocations::run(sta).unwrap();
    assert_eq!(assembled.attr("data"), Some(&AttrValue::Bytes(vec![0x8D, 0x20, 0xD0])));

    let mut jmp = leaf(Kind::Jmp, 1, vec![]);
    jmp.set_attr("storage", AttrValue::Storage(Storage::absolute(0x1000, 2)));
    let assembled = AssembleWithRelocations::run(jmp).unwrap();
    assert_eq!(assembled.attr("data"), Some(&AttrValue::Bytes(vec![0x4C, 0x00, 0x10])));

    let rts = leaf(Kind::Rts, 1, vec![]);
    let assembled = AssembleWithRelocations::run(rts).unwrap();
    assert_eq!(assembled.attr("data"), Some(&AttrValue::Bytes(vec![0x60])));
}

#[test]
fn wrong_width_immediate_is_rejected() {
    let mut lda = leaf(Kind::Lda, 1, vec![]);
    lda.set_attr("storage", AttrValue::Storage(Storage::immediate(300, 2)));
    assert!(AssembleWithRelocations::run(lda).is_err());
}

#[test]
fn flatten_symbol_concatenates_instruction_bytes_in_order() {
    let lda = leaf(Kind::Data, 1, vec![("data", AttrValue::Bytes(vec![0xA9, 0x2A]))]);
    let rts = leaf(Kind::Data, 2, vec![("data", AttrValue::Bytes(vec![0x60]))]);
    let fun = node(
        Kind::Fun,
        1,
        vec![
            ("name", AttrValue::Str("main".to_string())),
            ("type", AttrValue::Str("fun".to_string())),
        ],
        vec![lda, rts],
    );

    let flattened = FlattenSymbol::run(fun).unwrap();
    assert_eq!(flattened.kind, Kind::FunSymbol);
    assert_eq!(
        flattened.attr("text"),
        Some(&AttrValue::Bytes(vec![0xA9, 0x2A, 0x60]))
    );
}
