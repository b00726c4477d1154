use super::*;
use tscc_ast::{FunctionLiteral, Span, VariableDeclaration};

const V: SymbolId = SymbolId(1);
const W: SymbolId = SymbolId(2);
const N: SymbolId = SymbolId(3);
const INNER: SymbolId = SymbolId(4);

fn literal(
    arena: &mut NodeArena,
    parameters: Vec<Parameter>,
    body: FunctionBody,
    span: Span,
) -> NodeIndex {
    arena.function_literal(
        FunctionLiteral {
            parameters,
            return_type: None,
            body,
        },
        span,
    )
}

/// `var v = 1; this.ondone = (n) => v + n;`
fn single_capture(arena: &mut NodeArena) -> (Vec<NodeIndex>, NodeIndex) {
    let one = arena.number("1");
    let decl = arena.var_stmt(vec![VariableDeclaration::new("v", V, None, Some(one))]);
    let v = arena.ident("v", V);
    let n = arena.ident("n", N);
    let sum = arena.binary(v, "+", n);
    let lit = literal(
        arena,
        vec![Parameter::new("n", None).with_symbol(N)],
        FunctionBody::Expression(sum),
        Span::new(40, 52),
    );
    let target = arena.this_property("ondone");
    let assign = arena.binary(target, "=", lit);
    let stmt = arena.expr_stmt(assign);
    (vec![decl, stmt], lit)
}

#[test]
fn test_captures_enclosing_local_but_not_parameter() {
    let mut arena = NodeArena::new();
    let (body, lit) = single_capture(&mut arena);
    let mut pass = ClosurePass::new(&arena);
    pass.scan_member(&[], &body);
    let table = pass.finish();

    let info = table.get(lit).unwrap();
    assert_eq!(info.name, "__closure_40_52");
    assert_eq!(
        info.captures,
        vec![Capture {
            symbol: V,
            name: "v".to_string()
        }]
    );
    assert!(info.captures_symbol(V));
    assert!(!info.captures_symbol(N));
}

#[test]
fn test_member_parameters_are_capturable() {
    let mut arena = NodeArena::new();
    let w = arena.ident("w", W);
    let lit = literal(&mut arena, Vec::new(), FunctionBody::Expression(w), Span::new(5, 15));
    let ret = arena.ret(Some(lit));
    let mut pass = ClosurePass::new(&arena);
    pass.scan_member(&[Parameter::new("w", None).with_symbol(W)], &[ret]);
    let table = pass.finish();
    assert_eq!(table.get(lit).unwrap().captures[0].name, "w");
}

#[test]
fn test_unresolved_and_literal_locals_are_not_captured() {
    let mut arena = NodeArena::new();
    let global = arena.ident("console", SymbolId::NONE);
    let init = arena.ident("v", V);
    let inner_decl = arena.var_stmt(vec![VariableDeclaration::new("x", INNER, None, Some(init))]);
    let x = arena.ident("x", INNER);
    let use_x = arena.expr_stmt(x);
    let use_global = arena.expr_stmt(global);
    let lit = literal(
        &mut arena,
        Vec::new(),
        FunctionBody::Block(vec![inner_decl, use_x, use_global]),
        Span::new(0, 30),
    );
    let stmt = arena.expr_stmt(lit);
    let mut pass = ClosurePass::new(&arena);
    pass.scan_member(&[Parameter::new("v", None).with_symbol(V)], &[stmt]);
    let table = pass.finish();
    let names: Vec<&str> = table
        .get(lit)
        .unwrap()
        .captures
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["v"]);
}

#[test]
fn test_nested_literals_resolve_innermost_first() {
    // (a) => { w; return () => v + w; }  with v, w locals of the member
    let mut arena = NodeArena::new();
    let v = arena.ident("v", V);
    let w_inner = arena.ident("w", W);
    let sum = arena.binary(v, "+", w_inner);
    let inner = literal(&mut arena, Vec::new(), FunctionBody::Expression(sum), Span::new(30, 45));
    let w_outer = arena.ident("w", W);
    let touch_w = arena.expr_stmt(w_outer);
    let ret = arena.ret(Some(inner));
    let outer = literal(
        &mut arena,
        vec![Parameter::new("a", None).with_symbol(N)],
        FunctionBody::Block(vec![touch_w, ret]),
        Span::new(10, 50),
    );
    let stmt = arena.expr_stmt(outer);

    let mut pass = ClosurePass::new(&arena);
    pass.scan_member(
        &[
            Parameter::new("v", None).with_symbol(V),
            Parameter::new("w", None).with_symbol(W),
        ],
        &[stmt],
    );
    let table = pass.finish();

    let order: Vec<NodeIndex> = table.iter().map(|c| c.node).collect();
    assert_eq!(order, vec![inner, outer]);

    let inner_names: Vec<&str> = table.get(inner).unwrap().captures.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(inner_names, vec!["v", "w"]);
    // w is referenced by the outer literal before the inner literal adds v.
    let outer_names: Vec<&str> = table.get(outer).unwrap().captures.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(outer_names, vec!["w", "v"]);
}

#[test]
fn test_inner_capture_of_outer_parameter_does_not_leak_upward() {
    // (n) => () => n
    let mut arena = NodeArena::new();
    let n = arena.ident("n", N);
    let inner = literal(&mut arena, Vec::new(), FunctionBody::Expression(n), Span::new(8, 16));
    let outer = literal(
        &mut arena,
        vec![Parameter::new("n", None).with_symbol(N)],
        FunctionBody::Expression(inner),
        Span::new(0, 16),
    );
    let stmt = arena.expr_stmt(outer);
    let mut pass = ClosurePass::new(&arena);
    pass.scan_member(&[], &[stmt]);
    let table = pass.finish();
    assert_eq!(table.get(inner).unwrap().captures.len(), 1);
    assert!(table.get(outer).unwrap().captures.is_empty());
}

#[test]
fn test_extraction_is_deterministic() {
    let mut arena = NodeArena::new();
    let (body, lit) = single_capture(&mut arena);

    let run = || {
        let mut pass = ClosurePass::new(&arena);
        pass.scan_member(&[], &body);
        pass.finish().get(lit).cloned().unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_for_loop_variables_are_locals() {
    let mut arena = NodeArena::new();
    let zero = arena.number("0");
    let i = arena.ident("i", V);
    let lit = literal(&mut arena, Vec::new(), FunctionBody::Expression(i), Span::new(20, 28));
    let body = arena.expr_stmt(lit);
    let for_stmt = arena.for_stmt(
        Some(ForInitializer::Variables(vec![VariableDeclaration::new(
            "i",
            V,
            None,
            Some(zero),
        )])),
        None,
        None,
        body,
    );
    let mut pass = ClosurePass::new(&arena);
    pass.scan_member(&[], &[for_stmt]);
    assert_eq!(pass.finish().get(lit).unwrap().captures[0].symbol, V);
}

#[test]
fn test_spanless_literals_get_distinct_names() {
    let mut arena = NodeArena::new();
    let one = arena.number("1");
    let two = arena.number("2");
    let first = literal(&mut arena, Vec::new(), FunctionBody::Expression(one), Span::default());
    let second = literal(&mut arena, Vec::new(), FunctionBody::Expression(two), Span::default());
    let spanned = literal(&mut arena, Vec::new(), FunctionBody::Expression(one), Span::new(5, 9));

    assert_eq!(closure_name(&arena, first), format!("__closure_n{}", first.0));
    assert_eq!(closure_name(&arena, second), format!("__closure_n{}", second.0));
    assert_ne!(closure_name(&arena, first), closure_name(&arena, second));
    assert_eq!(closure_name(&arena, spanned), "__closure_5_9");
}
