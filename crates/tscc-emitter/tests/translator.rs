use super::*;
use crate::closure::ClosurePass;
use tscc_ast::{
    ClassMember, Parameter, PropertyDecl, SemanticModel, Span, SwitchClause, UpdateOperator,
    Visibility,
};

const V: SymbolId = SymbolId(1);
const N: SymbolId = SymbolId(2);
const I: SymbolId = SymbolId(3);

fn demo_class() -> ClassDecl {
    let mut class = ClassDecl::new("Demo");
    class.members = vec![
        ClassMember::Property(PropertyDecl::new("title", Some(TypeDescriptor::string()))),
        ClassMember::Property(PropertyDecl::new(
            "owner",
            Some(TypeDescriptor::class("Demo").weak().nullable()),
        )),
        ClassMember::Property(
            PropertyDecl::new("parent", Some(TypeDescriptor::class("Demo")))
                .with_visibility(Visibility::Private),
        ),
        ClassMember::Property(
            PropertyDecl::new("count", Some(TypeDescriptor::number_alias("int"))).static_(),
        ),
    ];
    class
}

fn expr(arena: &NodeArena, idx: NodeIndex, class: Option<&ClassDecl>) -> String {
    let model = SemanticModel::new();
    let options = CodegenOptions::default();
    let table = ClosureTable::default();
    let mut translator = Translator::new(arena, &model, &options, "demo.ts");
    translator
        .expression(idx, BodyContext::new(class, &table))
        .unwrap()
}

fn stmts(arena: &NodeArena, body: &[NodeIndex]) -> (String, Vec<Diagnostic>) {
    let model = SemanticModel::new();
    let options = CodegenOptions::default();
    let mut pass = ClosurePass::new(arena);
    pass.scan_member(&[], body);
    let table = pass.finish();
    let mut translator = Translator::new(arena, &model, &options, "demo.ts");
    let mut writer = SourceWriter::new();
    writer.increase_indent();
    translator
        .body(&mut writer, body, BodyContext::new(None, &table))
        .unwrap();
    (writer.finish(), translator.take_diagnostics())
}

// =============================================================================
// Expressions
// =============================================================================

#[test]
fn test_this_property_reads_backing_field() {
    let class = demo_class();
    let mut arena = NodeArena::new();
    let title = arena.this_property("title");
    let owner = arena.this_property("owner");
    let parent = arena.this_property("parent");
    assert_eq!(expr(&arena, title, Some(&class)), "this->_title");
    assert_eq!(expr(&arena, owner, Some(&class)), "this->_owner.get()");
    assert_eq!(expr(&arena, parent, Some(&class)), "this->parent.get()");
}

#[test]
fn test_assignment_target_is_not_unwrapped() {
    let class = demo_class();
    let mut arena = NodeArena::new();
    let owner = arena.this_property("owner");
    let value = arena.ident("o", SymbolId::NONE);
    let assign = arena.binary(owner, "=", value);
    assert_eq!(expr(&arena, assign, Some(&class)), "this->_owner=o");
}

#[test]
fn test_static_property_and_undeclared_member() {
    let class = demo_class();
    let mut arena = NodeArena::new();
    let count = arena.this_property("count");
    let size = arena.this_property("size");
    assert_eq!(expr(&arena, count, Some(&class)), "Demo::_count");
    assert_eq!(expr(&arena, size, Some(&class)), "this->size()");
}

#[test]
fn test_member_access_on_other_objects_calls_getter() {
    let mut arena = NodeArena::new();
    let obj = arena.ident("item", SymbolId::NONE);
    let access = arena.property(obj, "name");
    assert_eq!(expr(&arena, access, None), "item->name()");
}

#[test]
fn test_calls() {
    let mut arena = NodeArena::new();
    let obj = arena.ident("a", SymbolId::NONE);
    let method = arena.property(obj, "run");
    let one = arena.number("1");
    let two = arena.number("2");
    let method_call = arena.call(method, vec![one, two]);
    let fn_ident = arena.ident("fn", SymbolId::NONE);
    let three = arena.number("3");
    let value_call = arena.call(fn_ident, vec![three]);
    let class = arena.ident("Demo", SymbolId::NONE);
    let construct = arena.new_expr(class, vec![]);

    assert_eq!(expr(&arena, method_call, None), "a->run(1,2)");
    assert_eq!(expr(&arena, value_call, None), "(*(fn))(3)");
    assert_eq!(expr(&arena, construct, None), "new Demo()");
}

#[test]
fn test_null_and_undefined_become_nullptr() {
    let mut arena = NodeArena::new();
    let fn_ident = arena.ident("fn", SymbolId::NONE);
    let undefined = arena.ident("undefined", SymbolId::NONE);
    let compare = arena.binary(fn_ident, "!=", undefined);
    let null = arena.keyword(Keyword::Null);
    assert_eq!(expr(&arena, compare, None), "fn!=nullptr");
    assert_eq!(expr(&arena, null, None), "nullptr");
}

#[test]
fn test_unary_and_parenthesized() {
    let mut arena = NodeArena::new();
    let i = arena.ident("i", I);
    let inc = arena.postfix(UpdateOperator::PlusPlus, i);
    let flag = arena.ident("done", SymbolId::NONE);
    let not = arena.prefix(tscc_ast::UnaryOperator::Exclamation, flag);
    let grouped = arena.paren(not);
    assert_eq!(expr(&arena, inc, None), "i++");
    assert_eq!(expr(&arena, grouped, None), "(!done)");
}

#[test]
fn test_string_literals_are_escaped() {
    assert_eq!(quote_string("hello"), "\"hello\"");
    assert_eq!(quote_string("a\"b\\c\n"), "\"a\\\"b\\\\c\\n\"");
    assert_eq!(quote_string("\u{1}"), "\"\\001\"");
    assert_eq!(quote_string("日本"), "\"日本\"");
}

#[test]
fn test_object_literal_expression_is_reported() {
    let mut arena = NodeArena::with_source("x = { a: 1 }");
    let one = arena.number("1");
    let lit = arena.add(
        NodeData::ObjectLiteral {
            properties: vec![tscc_ast::ObjectProperty {
                name: "a".to_string(),
                value: one,
            }],
        },
        Span::new(4, 12),
    );
    let stmt = arena.expr_stmt(lit);
    let (out, diags) = stmts(&arena, &[stmt]);
    assert_eq!(out, "\t{ a: 1 };\n");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, diagnostic_codes::UNSUPPORTED_EXPRESSION);
    assert_eq!(diags[0].start, 4);
}

// =============================================================================
// Statements
// =============================================================================

#[test]
fn test_if_else_blocks() {
    let mut arena = NodeArena::new();
    let fn_ident = arena.ident("fn", SymbolId::NONE);
    let null = arena.keyword(Keyword::Null);
    let cond = arena.binary(fn_ident, "!=", null);
    let one = arena.number("1");
    let ret_one = arena.ret(Some(one));
    let then_block = arena.block(vec![ret_one]);
    let ret = arena.ret(None);
    let else_block = arena.block(vec![ret]);
    let stmt = arena.if_stmt(cond, then_block, Some(else_block));

    let (out, diags) = stmts(&arena, &[stmt]);
    assert_eq!(
        out,
        "\tif(fn!=nullptr) {\n\t\treturn 1;\n\t}\n\telse {\n\t\treturn;\n\t}\n"
    );
    assert!(diags.is_empty());
}

#[test]
fn test_if_without_block_indents_branch() {
    let mut arena = NodeArena::new();
    let cond = arena.ident("ok", SymbolId::NONE);
    let brk = arena.break_stmt();
    let stmt = arena.if_stmt(cond, brk, None);
    let (out, _) = stmts(&arena, &[stmt]);
    assert_eq!(out, "\tif(ok) \n\t\tbreak;\n");
}

#[test]
fn test_for_with_annotated_declarations() {
    let mut arena = NodeArena::new();
    let zero = arena.number("0");
    let ten = arena.number("10");
    let i = arena.ident("i", I);
    let n = arena.ident("n", N);
    let cond = arena.binary(i, "<", n);
    let i2 = arena.ident("i", I);
    let inc = arena.postfix(UpdateOperator::PlusPlus, i2);
    let cont = arena.continue_stmt();
    let body = arena.block(vec![cont]);
    let int = TypeDescriptor::number_alias("int");
    let stmt = arena.for_stmt(
        Some(ForInitializer::Variables(vec![
            VariableDeclaration::new("i", I, Some(int.clone()), Some(zero)),
            VariableDeclaration::new("n", N, Some(int), Some(ten)),
        ])),
        Some(cond),
        Some(inc),
        body,
    );
    let (out, _) = stmts(&arena, &[stmt]);
    assert_eq!(
        out,
        "\tfor(kk::Int i = (kk::Int)0,n = (kk::Int)10;i<n;i++) {\n\t\tcontinue;\n\t}\n"
    );
}

#[test]
fn test_while_and_switch() {
    let mut arena = NodeArena::new();
    let cond = arena.keyword(Keyword::True);
    let brk = arena.break_stmt();
    let body = arena.block(vec![brk]);
    let wh = arena.while_stmt(cond, body);

    let v = arena.ident("v", V);
    let one = arena.number("1");
    let b1 = arena.break_stmt();
    let b2 = arena.break_stmt();
    let sw = arena.switch_stmt(
        v,
        vec![
            SwitchClause {
                test: Some(one),
                statements: vec![b1],
            },
            SwitchClause {
                test: None,
                statements: vec![b2],
            },
        ],
    );

    let (out, _) = stmts(&arena, &[wh, sw]);
    assert_eq!(
        out,
        "\twhile(true) {\n\t\tbreak;\n\t}\n\tswitch(v) {\n\tcase 1:\n\t\tbreak;\n\tdefault:\n\t\tbreak;\n\t}\n"
    );
}

#[test]
fn test_variable_declarations() {
    let mut arena = NodeArena::new();
    let zero = arena.number("0");
    let s = arena.string("x");
    let decls = arena.var_stmt(vec![
        VariableDeclaration::new("n", N, Some(TypeDescriptor::number()), Some(zero)),
        VariableDeclaration::new("s", V, None, Some(s)),
        VariableDeclaration::new("d", I, Some(TypeDescriptor::class("Demo")), None),
    ]);
    let (out, _) = stmts(&arena, &[decls]);
    assert_eq!(
        out,
        "\tkk::Number n = (kk::Number)0;\n\tkk::Any s = \"x\";\n\tDemo * d;\n"
    );
}

#[test]
fn test_inferred_variable_type_comes_from_symbol() {
    let mut arena = NodeArena::new();
    let s = arena.string("x");
    let decl = arena.var_stmt(vec![VariableDeclaration::new("s", V, None, Some(s))]);
    let mut model = SemanticModel::new();
    model.symbols.insert(
        V,
        tscc_ast::Symbol {
            name: "s".to_string(),
            scope: Vec::new(),
            ty: Some(TypeDescriptor::string()),
        },
    );
    let options = CodegenOptions::default();
    let table = ClosureTable::default();
    let mut translator = Translator::new(&arena, &model, &options, "demo.ts");
    let mut writer = SourceWriter::new();
    translator
        .statement(&mut writer, decl, BodyContext::new(None, &table))
        .unwrap();
    assert_eq!(writer.finish(), "kk::String s = \"x\";\n");
}

#[test]
fn test_unsupported_statement_is_copied_and_reported() {
    let source = "for (const k in items) {}";
    let mut arena = NodeArena::with_source(source);
    let stmt = arena.unsupported("ForInStatement", source, Span::new(0, 25));
    let (out, diags) = stmts(&arena, &[stmt]);
    assert_eq!(out, format!("\t{source}\n"));
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, diagnostic_codes::UNSUPPORTED_STATEMENT);
    assert_eq!((diags[0].start, diags[0].length), (0, 25));
}

#[test]
fn test_unsupported_variable_type_is_fatal() {
    let mut arena = NodeArena::new();
    let anon = TypeDescriptor::object("{ a: number }", tscc_ast::ObjectKind::Anonymous);
    let decl = arena.var_stmt(vec![VariableDeclaration::new("o", V, Some(anon), None)]);
    let model = SemanticModel::new();
    let options = CodegenOptions::default();
    let table = ClosureTable::default();
    let mut translator = Translator::new(&arena, &model, &options, "demo.ts");
    let mut writer = SourceWriter::new();
    let err = translator
        .statement(&mut writer, decl, BodyContext::new(None, &table))
        .unwrap_err();
    assert!(err.to_string().contains("variable 'o'"));
}

// =============================================================================
// Closures
// =============================================================================

/// `var v = 1; var f = (n: number): number => v + n;`
#[test]
fn test_closure_construction_lists_captures() {
    let mut arena = NodeArena::new();
    let one = arena.number("1");
    let decl = arena.var_stmt(vec![VariableDeclaration::new("v", V, None, Some(one))]);
    let v = arena.ident("v", V);
    let n = arena.ident("n", N);
    let sum = arena.binary(v, "+", n);
    let lit = arena.function_literal(
        FunctionLiteral {
            parameters: vec![Parameter::new("n", Some(TypeDescriptor::number())).with_symbol(N)],
            return_type: Some(TypeDescriptor::number()),
            body: FunctionBody::Expression(sum),
        },
        Span::new(40, 52),
    );
    let target = arena.ident("f", SymbolId::NONE);
    let assign = arena.binary(target, "=", lit);
    let stmt = arena.expr_stmt(assign);

    let (out, diags) = stmts(&arena, &[decl, stmt]);
    assert_eq!(
        out,
        "\tkk::Any v = 1;\n\tf=new kk::Closure<kk::Number,kk::Number>(&__closure_40_52,{{\"v\",v}});\n"
    );
    assert!(diags.is_empty());
}

#[test]
fn test_closure_body_reads_captures_through_handle() {
    let mut arena = NodeArena::new();
    let v = arena.ident("v", V);
    let this = arena.this();
    let sum = arena.binary(v, "+", this);
    let lit = arena.function_literal(
        FunctionLiteral {
            parameters: Vec::new(),
            return_type: None,
            body: FunctionBody::Expression(sum),
        },
        Span::new(3, 9),
    );
    let ret = arena.ret(Some(lit));

    let mut pass = ClosurePass::new(&arena);
    pass.scan_member(&[Parameter::new("v", None).with_symbol(V)], &[ret]);
    let table = pass.finish();
    let info = table.get(lit).unwrap();

    let model = SemanticModel::new();
    let options = CodegenOptions::default();
    let mut translator = Translator::new(&arena, &model, &options, "demo.ts");
    let ctx = BodyContext::new(None, &table).in_closure(info);
    assert_eq!(
        translator.expression(sum, ctx).unwrap(),
        "__closure->get(\"v\")+this"
    );
    let diags = translator.take_diagnostics();
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].code, diagnostic_codes::THIS_IN_FUNCTION_LITERAL);
}

#[test]
fn test_closure_signature_falls_back_to_resolved_type() {
    let mut arena = NodeArena::new();
    let body = arena.block(Vec::new());
    let literal = FunctionLiteral {
        parameters: vec![Parameter::new("e", None)],
        return_type: None,
        body: FunctionBody::Block(vec![body]),
    };
    let lit = arena.function_literal(literal.clone(), Span::new(0, 10));
    let mut model = SemanticModel::new();
    model.set_node_type(
        lit,
        TypeDescriptor::function(
            vec![("e", TypeDescriptor::string())],
            TypeDescriptor::boolean(),
        ),
    );
    let options = CodegenOptions::default();
    let translator = Translator::new(&arena, &model, &options, "demo.ts");
    let sig = translator.closure_signature(lit, &literal).unwrap();
    assert_eq!(sig.return_type, "kk::Boolean");
    assert_eq!(
        sig.parameters,
        vec![("kk::String".to_string(), "e".to_string())]
    );
    assert_eq!(
        translator.closure_template(&sig),
        "kk::Closure<kk::Boolean,kk::String>"
    );
}
