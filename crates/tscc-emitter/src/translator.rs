//! Expression and statement translation.
//!
//! Recursive descent over the supported expression and statement forms.
//! Expressions translate to strings; statements write indented lines to a
//! [`SourceWriter`]. Forms outside the supported grammar are copied from the
//! source unchanged and reported as diagnostics. Type classification failures
//! are fatal and propagate.

use crate::closure::{ClosureInfo, ClosureTable};
use crate::ownership::{OwnershipClassifier, TypeUse, needs_unwrap};
use crate::source_writer::SourceWriter;
use tracing::{debug, warn};
use tscc_ast::{
    ClassDecl, ForInitializer, FunctionBody, FunctionLiteral, Keyword, NodeArena, NodeData,
    NodeIndex, Signature, SymbolId, TypeDescriptor, TypeFacade, VariableDeclaration,
};
use tscc_common::{CodegenError, CodegenOptions, CodegenResult, Diagnostic, diagnostic_codes};

/// Name of the captured-state parameter of synthesized closure functions.
pub const CLOSURE_HANDLE: &str = "__closure";

/// What a body is translated against.
#[derive(Clone, Copy)]
pub struct BodyContext<'a> {
    /// Enclosing class, for `this.member` resolution. `None` in free
    /// functions and inside closures.
    pub class: Option<&'a ClassDecl>,
    /// Closures extracted from the enclosing class or function.
    pub closures: &'a ClosureTable,
    /// The closure whose body is being translated.
    pub closure: Option<&'a ClosureInfo>,
}

impl<'a> BodyContext<'a> {
    pub const fn new(class: Option<&'a ClassDecl>, closures: &'a ClosureTable) -> Self {
        BodyContext {
            class,
            closures,
            closure: None,
        }
    }

    pub const fn in_closure(self, closure: &'a ClosureInfo) -> Self {
        BodyContext {
            class: None,
            closures: self.closures,
            closure: Some(closure),
        }
    }
}

/// Spelled signature of a function literal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClosureSignature {
    pub return_type: String,
    /// `(type, name)` pairs.
    pub parameters: Vec<(String, String)>,
}

pub struct Translator<'a> {
    arena: &'a NodeArena,
    facade: &'a dyn TypeFacade,
    options: &'a CodegenOptions,
    classifier: OwnershipClassifier<'a>,
    file_name: &'a str,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Translator<'a> {
    pub fn new(
        arena: &'a NodeArena,
        facade: &'a dyn TypeFacade,
        options: &'a CodegenOptions,
        file_name: &'a str,
    ) -> Self {
        Translator {
            arena,
            facade,
            options,
            classifier: OwnershipClassifier::new(options),
            file_name,
            diagnostics: Vec::new(),
        }
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn report(&mut self, node: NodeIndex, code: u32, args: &[&str]) {
        let span = self.arena.span(node);
        self.diagnostics.push(Diagnostic::from_code(
            self.file_name,
            span.pos,
            span.len(),
            code,
            args,
        ));
    }

    fn source_text(&self, idx: NodeIndex) -> String {
        match self.arena.text_of(idx) {
            Some(text) => text.to_string(),
            None => self
                .arena
                .data(idx)
                .map(|d| format!("/* {} */", d.kind_name()))
                .unwrap_or_default(),
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub fn expression(&mut self, idx: NodeIndex, ctx: BodyContext<'_>) -> CodegenResult<String> {
        self.expression_inner(idx, ctx, false)
    }

    fn expression_inner(
        &mut self,
        idx: NodeIndex,
        ctx: BodyContext<'_>,
        is_assignment_target: bool,
    ) -> CodegenResult<String> {
        let arena = self.arena;
        let Some(node) = arena.get(idx) else {
            return Ok(String::new());
        };

        match &node.data {
            NodeData::PropertyAccess { object, name } => {
                self.property_access(*object, name, ctx, is_assignment_target)
            }
            NodeData::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.expression_inner(*left, ctx, is_assignment(operator))?;
                let right = self.expression(*right, ctx)?;
                Ok(format!("{left}{operator}{right}"))
            }
            NodeData::Identifier(ident) => Ok(self.identifier(&ident.name, ident.symbol, ctx)),
            NodeData::Call { callee, arguments } => {
                let args = self.arguments(arguments, ctx)?;
                if let Some(NodeData::PropertyAccess { object, name }) = arena.data(*callee) {
                    let object = self.expression(*object, ctx)?;
                    Ok(format!("{object}->{name}({args})"))
                } else {
                    let callee = self.expression(*callee, ctx)?;
                    Ok(format!("(*({callee}))({args})"))
                }
            }
            NodeData::New { callee, arguments } => {
                let callee = self.expression(*callee, ctx)?;
                let args = self.arguments(arguments, ctx)?;
                Ok(format!("new {callee}({args})"))
            }
            NodeData::NumericLiteral { text } => Ok(text.clone()),
            NodeData::StringLiteral { value } => Ok(quote_string(value)),
            NodeData::Keyword { keyword } => Ok(match keyword {
                Keyword::True => "true".to_string(),
                Keyword::False => "false".to_string(),
                Keyword::Null | Keyword::Undefined => "nullptr".to_string(),
                Keyword::This => {
                    if ctx.closure.is_some() {
                        self.report(idx, diagnostic_codes::THIS_IN_FUNCTION_LITERAL, &[]);
                    }
                    "this".to_string()
                }
            }),
            NodeData::PrefixUnary { operator, operand } => {
                let operand = self.expression(*operand, ctx)?;
                Ok(format!("{}{operand}", operator.as_str()))
            }
            NodeData::PostfixUnary { operator, operand } => {
                let operand = self.expression(*operand, ctx)?;
                Ok(format!("{operand}{}", operator.as_str()))
            }
            NodeData::Parenthesized { expression } => {
                Ok(format!("({})", self.expression(*expression, ctx)?))
            }
            NodeData::FunctionLiteral(literal) => self.closure_construction(idx, literal, ctx),
            _ => {
                let text = self.source_text(idx);
                warn!(kind = node.data.kind_name(), text = %text, "unsupported expression");
                self.report(idx, diagnostic_codes::UNSUPPORTED_EXPRESSION, &[&text]);
                Ok(text)
            }
        }
    }

    fn arguments(&mut self, arguments: &[NodeIndex], ctx: BodyContext<'_>) -> CodegenResult<String> {
        let mut args = Vec::with_capacity(arguments.len());
        for &arg in arguments {
            args.push(self.expression(arg, ctx)?);
        }
        Ok(args.join(","))
    }

    fn identifier(&self, name: &str, symbol: SymbolId, ctx: BodyContext<'_>) -> String {
        if name == "undefined" || name == "null" {
            return "nullptr".to_string();
        }
        if ctx.closure.is_some_and(|c| c.captures_symbol(symbol)) {
            return format!("{CLOSURE_HANDLE}->get({})", quote_string(name));
        }
        name.to_string()
    }

    /// `this.member` resolves against the class's declared properties first:
    /// a hit is direct field access (unwrapped when read), a miss is a
    /// zero-argument call. Any other member access is a getter call.
    fn property_access(
        &mut self,
        object: NodeIndex,
        name: &str,
        ctx: BodyContext<'_>,
        is_assignment_target: bool,
    ) -> CodegenResult<String> {
        let is_this = matches!(
            self.arena.data(object),
            Some(NodeData::Keyword {
                keyword: Keyword::This
            })
        );

        if is_this && let Some(class) = ctx.class {
            let Some(prop) = class.property(name) else {
                return Ok(format!("this->{name}()"));
            };
            let owner = if prop.is_static {
                format!("{}::", class.name)
            } else {
                "this->".to_string()
            };
            let mut out = format!("{owner}{}", prop.field_name());
            if !is_assignment_target {
                let ty = prop.type_annotation.as_ref();
                let in_property = |e: CodegenError| {
                    e.with_context(format!("property '{}' of class '{}'", prop.name, class.name))
                };
                let value = self
                    .classifier
                    .classify(ty, TypeUse::Value)
                    .map_err(in_property)?;
                let field = self
                    .classifier
                    .classify(ty, TypeUse::Field)
                    .map_err(in_property)?;
                if needs_unwrap(&value, &field) {
                    out.push_str(".get()");
                }
            }
            return Ok(out);
        }

        let object = self.expression(object, ctx)?;
        Ok(format!("{object}->{name}()"))
    }

    // =========================================================================
    // Closures
    // =========================================================================

    fn literal_signature(&self, idx: NodeIndex) -> Option<&'a Signature> {
        self.facade.call_signatures(idx).first()
    }

    /// Return and parameter types of a function literal, from its own
    /// annotations first and the resolved signature second.
    pub fn closure_signature(
        &self,
        idx: NodeIndex,
        literal: &FunctionLiteral,
    ) -> CodegenResult<ClosureSignature> {
        let signature = self.literal_signature(idx);

        let return_type = match (&literal.return_type, signature) {
            (Some(ty), _) => self.classifier.return_type_name(Some(ty))?,
            (None, Some(sig)) => self.classifier.return_type_name(Some(&sig.return_type))?,
            (None, None) => match literal.body {
                FunctionBody::Block(_) => "void".to_string(),
                FunctionBody::Expression(_) => self.classifier.type_name(None, TypeUse::Value)?,
            },
        };

        let mut parameters = Vec::with_capacity(literal.parameters.len());
        for (i, param) in literal.parameters.iter().enumerate() {
            let ty = param.type_annotation.as_ref().or_else(|| {
                signature
                    .and_then(|s| s.parameters.get(i))
                    .and_then(|p| p.ty.as_ref())
            });
            let spelled = self.classifier.type_name(ty, TypeUse::Value).map_err(|e| {
                e.with_context(format!("parameter '{}' of a function literal", param.name))
            })?;
            parameters.push((spelled, param.name.clone()));
        }

        Ok(ClosureSignature {
            return_type,
            parameters,
        })
    }

    /// `ns::Closure<R,A..>` for a function literal.
    pub fn closure_template(&self, signature: &ClosureSignature) -> String {
        let mut parts = vec![signature.return_type.clone()];
        parts.extend(signature.parameters.iter().map(|(ty, _)| ty.clone()));
        format!("{}<{}>", self.options.runtime("Closure"), parts.join(","))
    }

    /// `new ns::Closure<R,A..>(&__closure_s_e,{{"v",v},...})`. Captured
    /// values are read at the point of construction.
    fn closure_construction(
        &mut self,
        idx: NodeIndex,
        literal: &FunctionLiteral,
        ctx: BodyContext<'_>,
    ) -> CodegenResult<String> {
        let Some(info) = ctx.closures.get(idx) else {
            let text = self.source_text(idx);
            self.report(idx, diagnostic_codes::UNSUPPORTED_EXPRESSION, &[&text]);
            return Ok(text);
        };
        let signature = self.closure_signature(idx, literal)?;
        let captures: Vec<String> = info
            .captures
            .iter()
            .map(|c| {
                format!(
                    "{{{},{}}}",
                    quote_string(&c.name),
                    self.identifier(&c.name, c.symbol, ctx)
                )
            })
            .collect();
        debug!(closure = %info.name, captures = captures.len(), "closure construction");
        Ok(format!(
            "new {}(&{},{{{}}})",
            self.closure_template(&signature),
            info.name,
            captures.join(",")
        ))
    }

    // =========================================================================
    // Statements
    // =========================================================================

    pub fn body(
        &mut self,
        writer: &mut SourceWriter,
        statements: &[NodeIndex],
        ctx: BodyContext<'_>,
    ) -> CodegenResult<()> {
        for &stmt in statements {
            self.statement(writer, stmt, ctx)?;
        }
        Ok(())
    }

    pub fn statement(
        &mut self,
        writer: &mut SourceWriter,
        idx: NodeIndex,
        ctx: BodyContext<'_>,
    ) -> CodegenResult<()> {
        let arena = self.arena;
        let Some(node) = arena.get(idx) else {
            return Ok(());
        };

        match &node.data {
            NodeData::Return { expression } => {
                writer.write_indent();
                match expression {
                    Some(expr) => {
                        let expr = self.expression(*expr, ctx)?;
                        writer.write("return ");
                        writer.write(&expr);
                        writer.write(";\n");
                    }
                    None => writer.write("return;\n"),
                }
            }
            NodeData::If {
                condition,
                then_statement,
                else_statement,
            } => {
                let condition = self.expression(*condition, ctx)?;
                writer.write_indent();
                writer.write("if(");
                writer.write(&condition);
                writer.write(") ");
                self.nested_statement(writer, *then_statement, ctx)?;
                if let Some(else_statement) = else_statement {
                    writer.write_indent();
                    writer.write("else ");
                    self.nested_statement(writer, *else_statement, ctx)?;
                }
            }
            NodeData::For {
                initializer,
                condition,
                incrementor,
                body,
            } => {
                let initializer = match initializer {
                    Some(ForInitializer::Variables(decls)) => self.for_variables(decls, ctx)?,
                    Some(ForInitializer::Expression(expr)) => self.expression(*expr, ctx)?,
                    None => String::new(),
                };
                let condition = match condition {
                    Some(expr) => self.expression(*expr, ctx)?,
                    None => String::new(),
                };
                let incrementor = match incrementor {
                    Some(expr) => self.expression(*expr, ctx)?,
                    None => String::new(),
                };
                writer.write_indent();
                writer.write(&format!("for({initializer};{condition};{incrementor}) "));
                self.nested_statement(writer, *body, ctx)?;
            }
            NodeData::While { condition, body } => {
                let condition = self.expression(*condition, ctx)?;
                writer.write_indent();
                writer.write(&format!("while({condition}) "));
                self.nested_statement(writer, *body, ctx)?;
            }
            NodeData::Switch {
                expression,
                clauses,
            } => {
                let expression = self.expression(*expression, ctx)?;
                writer.write_indent();
                writer.write(&format!("switch({expression}) {{\n"));
                for clause in clauses {
                    match clause.test {
                        Some(test) => {
                            let test = self.expression(test, ctx)?;
                            writer.write_indented_line(&format!("case {test}:"));
                        }
                        None => writer.write_indented_line("default:"),
                    }
                    writer.increase_indent();
                    self.body(writer, &clause.statements, ctx)?;
                    writer.decrease_indent();
                }
                writer.write_indented_line("}");
            }
            NodeData::Block { statements } => {
                if writer.is_new_line() {
                    writer.write_indent();
                }
                writer.write("{\n");
                writer.increase_indent();
                self.body(writer, statements, ctx)?;
                writer.decrease_indent();
                writer.write_indented_line("}");
            }
            NodeData::ExpressionStatement { expression } => {
                let expr = self.expression(*expression, ctx)?;
                writer.write_indent();
                writer.write(&expr);
                writer.write(";\n");
            }
            NodeData::VariableStatement { declarations } => {
                for decl in declarations {
                    let line = self.variable_declaration(decl, ctx)?;
                    writer.write_indent();
                    writer.write(&line);
                    writer.write(";\n");
                }
            }
            NodeData::Break => writer.write_indented_line("break;"),
            NodeData::Continue => writer.write_indented_line("continue;"),
            _ => {
                let text = self.source_text(idx);
                warn!(kind = node.data.kind_name(), text = %text, "unsupported statement");
                self.report(idx, diagnostic_codes::UNSUPPORTED_STATEMENT, &[&text]);
                writer.write_indented_line(&text);
            }
        }
        Ok(())
    }

    /// Branch and loop bodies: blocks open on the statement's line, anything
    /// else goes on the next line one level in.
    fn nested_statement(
        &mut self,
        writer: &mut SourceWriter,
        idx: NodeIndex,
        ctx: BodyContext<'_>,
    ) -> CodegenResult<()> {
        if matches!(self.arena.data(idx), Some(NodeData::Block { .. })) {
            return self.statement(writer, idx, ctx);
        }
        writer.write_line();
        writer.increase_indent();
        self.statement(writer, idx, ctx)?;
        writer.decrease_indent();
        Ok(())
    }

    /// Declared type of a variable, or the resolver's inferred type.
    fn variable_type(&self, decl: &VariableDeclaration) -> Option<&'a TypeDescriptor> {
        self.facade
            .type_of_symbol(decl.symbol)
            .or_else(|| decl.initializer.and_then(|init| self.facade.type_of_node(init)))
    }

    fn spell_variable_type(&self, decl: &VariableDeclaration) -> CodegenResult<String> {
        let ty = match &decl.type_annotation {
            Some(ty) => Some(ty),
            None => self.variable_type(decl),
        };
        self.classifier
            .type_name(ty, TypeUse::Value)
            .map_err(|e| e.with_context(format!("variable '{}'", decl.name)))
    }

    /// `T name = (T)init` when annotated, `T name = init` when inferred.
    fn variable_declaration(
        &mut self,
        decl: &VariableDeclaration,
        ctx: BodyContext<'_>,
    ) -> CodegenResult<String> {
        let ty = self.spell_variable_type(decl)?;
        let mut out = format!("{ty} {}", decl.name);
        if let Some(init) = decl.initializer {
            let init = self.expression(init, ctx)?;
            if decl.type_annotation.is_some() {
                out.push_str(&format!(" = ({ty}){init}"));
            } else {
                out.push_str(&format!(" = {init}"));
            }
        }
        Ok(out)
    }

    /// `T a = (T)x,b = (T)y`: one type for the whole list, taken from the
    /// first declaration.
    fn for_variables(
        &mut self,
        decls: &[VariableDeclaration],
        ctx: BodyContext<'_>,
    ) -> CodegenResult<String> {
        let Some(first) = decls.first() else {
            return Ok(String::new());
        };
        let ty = self.spell_variable_type(first)?;
        let cast = first.type_annotation.is_some();
        let mut parts = Vec::with_capacity(decls.len());
        for decl in decls {
            let mut part = decl.name.clone();
            if let Some(init) = decl.initializer {
                let init = self.expression(init, ctx)?;
                if cast {
                    part.push_str(&format!(" = ({ty}){init}"));
                } else {
                    part.push_str(&format!(" = {init}"));
                }
            }
            parts.push(part);
        }
        Ok(format!("{ty} {}", parts.join(",")))
    }
}

fn is_assignment(operator: &str) -> bool {
    operator.ends_with('=') && !matches!(operator, "==" | "===" | "!=" | "!==" | "<=" | ">=")
}

/// Quote a string as a C++ string literal.
pub fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\{:03o}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
#[path = "../tests/translator.rs"]
mod tests;
