//! Definition artifact (`.cc`) emission.
//!
//! Mirrors the declaration walk but writes bodies: synthesized closure
//! functions first, then static field definitions, accessor bodies, method
//! bodies, and constructors with per-property initialization. Bodies go
//! through the [`Translator`].

use crate::closure::{ClosurePass, ClosureTable};
use crate::declaration_emitter::setter_name;
use crate::ownership::{OwnershipClassifier, TypeUse, needs_unwrap};
use crate::source_writer::SourceWriter;
use crate::translator::{BodyContext, CLOSURE_HANDLE, Translator, quote_string};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};
use tscc_ast::{
    AccessorDecl, AccessorKind, ClassDecl, ClassMember, ConstructorDecl, Declaration,
    FunctionBody, FunctionDecl, InterfaceBody, MethodDecl, NodeArena, NodeData, NodeIndex,
    ObjectKind, ObjectProperty, Parameter, PrimitiveType, PropertyDecl, SourceUnit, TypeDescriptor,
    TypeFacade, TypeKind,
};
use tscc_common::{CodegenError, CodegenOptions, CodegenResult, Diagnostic, diagnostic_codes};

/// Setter parameter name in generated property setters.
const NEW_VALUE: &str = "__newValue__";

/// Temporary holding an object built from an object-literal initializer.
const TEMPORARY: &str = "__V__";

pub struct DefinitionEmitter<'a> {
    writer: SourceWriter,
    arena: &'a NodeArena,
    options: &'a CodegenOptions,
    classifier: OwnershipClassifier<'a>,
    translator: Translator<'a>,
    /// Key types of the unit's map aliases, by alias name.
    map_keys: FxHashMap<&'a str, &'a TypeDescriptor>,
}

fn collect_map_keys<'a>(
    declarations: &'a [Declaration],
    keys: &mut FxHashMap<&'a str, &'a TypeDescriptor>,
) {
    for decl in declarations {
        match decl {
            Declaration::Namespace(ns) => collect_map_keys(&ns.children, keys),
            Declaration::Interface(interface) => {
                if let InterfaceBody::IndexSignature(index) = &interface.body
                    && let Some(key) = &index.key
                {
                    keys.insert(interface.name.as_str(), key);
                }
            }
            Declaration::Class(_) | Declaration::Function(_) => {}
        }
    }
}

impl<'a> DefinitionEmitter<'a> {
    pub fn new(
        unit: &'a SourceUnit,
        facade: &'a dyn TypeFacade,
        options: &'a CodegenOptions,
    ) -> Self {
        let mut map_keys = FxHashMap::default();
        collect_map_keys(&unit.declarations, &mut map_keys);
        DefinitionEmitter {
            writer: SourceWriter::new(),
            arena: &unit.arena,
            options,
            classifier: OwnershipClassifier::new(options),
            translator: Translator::new(&unit.arena, facade, options, &unit.file_name),
            map_keys,
        }
    }

    /// Emit the whole artifact for one unit.
    pub fn emit_unit(&mut self, unit: &SourceUnit) -> CodegenResult<()> {
        self.writer
            .write(&format!("#include \"{}.h\"\n\n", unit.basename()));
        self.declarations(&unit.declarations)
    }

    pub fn finish(mut self) -> (String, Vec<Diagnostic>) {
        let diagnostics = self.translator.take_diagnostics();
        (self.writer.finish(), diagnostics)
    }

    fn declarations(&mut self, declarations: &[Declaration]) -> CodegenResult<()> {
        for decl in declarations {
            match decl {
                Declaration::Namespace(ns) => {
                    self.writer.write_indent();
                    self.writer.write(&format!("namespace {} {{\n\n", ns.name));
                    self.writer.increase_indent();
                    self.declarations(&ns.children)?;
                    self.writer.decrease_indent();
                    self.writer.write_indent();
                    self.writer.write("}\n\n");
                }
                Declaration::Class(class) => self.class(class)?,
                Declaration::Function(function) => self.function(function)?,
                Declaration::Interface(_) => {}
            }
        }
        Ok(())
    }

    fn parameters(&self, parameters: &[Parameter]) -> CodegenResult<String> {
        let mut out = Vec::with_capacity(parameters.len());
        for param in parameters {
            out.push(
                self.classifier
                    .declare(&param.name, param.type_annotation.as_ref(), TypeUse::Value)
                    .map_err(|e| e.with_context(format!("parameter '{}'", param.name)))?,
            );
        }
        Ok(out.join(","))
    }

    /// Write `head {`, the translated statements and the closing brace.
    fn function_body(
        &mut self,
        head: &str,
        statements: &[NodeIndex],
        ctx: BodyContext<'_>,
    ) -> CodegenResult<()> {
        self.writer.write_indented_line(&format!("{head} {{"));
        self.writer.increase_indent();
        self.translator.body(&mut self.writer, statements, ctx)?;
        self.writer.decrease_indent();
        self.writer.write_indented_line("}");
        self.writer.write_line();
        Ok(())
    }

    // =========================================================================
    // Closures
    // =========================================================================

    /// Synthesized functions for every literal in the table, nested literals
    /// first.
    fn closures(&mut self, closures: &ClosureTable, ctx: BodyContext<'_>) -> CodegenResult<()> {
        let arena = self.arena;
        for info in closures.iter() {
            let Some(NodeData::FunctionLiteral(literal)) = arena.data(info.node) else {
                continue;
            };
            let signature = self.translator.closure_signature(info.node, literal)?;
            let mut params = vec![format!(
                "{} * {CLOSURE_HANDLE}",
                self.options.runtime("ClosureState")
            )];
            params.extend(
                signature
                    .parameters
                    .iter()
                    .map(|(ty, name)| format!("{ty} {name}")),
            );
            let head = format!(
                "static {} {}({})",
                signature.return_type,
                info.name,
                params.join(",")
            );
            trace!(closure = %info.name, "closure function");

            let inner = ctx.in_closure(info);
            match &literal.body {
                FunctionBody::Block(statements) => self.function_body(&head, statements, inner)?,
                FunctionBody::Expression(expr) => {
                    let expr = self.translator.expression(*expr, inner)?;
                    self.writer.write_indented_line(&format!("{head} {{"));
                    self.writer.increase_indent();
                    if signature.return_type == "void" {
                        self.writer.write_indented_line(&format!("{expr};"));
                    } else {
                        self.writer.write_indented_line(&format!("return {expr};"));
                    }
                    self.writer.decrease_indent();
                    self.writer.write_indented_line("}");
                    self.writer.write_line();
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Classes
    // =========================================================================

    fn class(&mut self, class: &ClassDecl) -> CodegenResult<()> {
        debug!(class = %class.name, "class >>");
        let mut pass = ClosurePass::new(self.arena);
        pass.scan_class(class);
        let closures = pass.finish();
        let ctx = BodyContext::new(Some(class), &closures);

        self.closures(&closures, ctx)?;
        self.static_fields(class, ctx)?;

        for member in &class.members {
            match member {
                ClassMember::Property(prop) => {
                    self.property(class, prop).map_err(|e| {
                        e.with_context(format!(
                            "property '{}' of class '{}'",
                            prop.name, class.name
                        ))
                    })?;
                }
                ClassMember::Method(method) => {
                    self.method(class, method, ctx).map_err(|e| {
                        e.with_context(format!("method '{}' of class '{}'", method.name, class.name))
                    })?;
                }
                ClassMember::Accessor(accessor) => self.accessor(class, accessor, ctx)?,
                ClassMember::Constructor(ctor) => self.constructor(class, Some(ctor), ctx)?,
            }
        }

        if class.constructor().is_none() {
            self.constructor(class, None, ctx)?;
        }
        debug!(class = %class.name, closures = closures.len(), "class <<");
        Ok(())
    }

    /// `T Class::_field = init;` for static properties.
    fn static_fields(&mut self, class: &ClassDecl, ctx: BodyContext<'_>) -> CodegenResult<()> {
        let mut any = false;
        for prop in class.properties().filter(|p| p.is_static) {
            let ty = prop.type_annotation.as_ref();
            let field_type = self.classifier.type_name(ty, TypeUse::Field).map_err(|e| {
                e.with_context(format!("property '{}' of class '{}'", prop.name, class.name))
            })?;
            let value = match prop.initializer {
                Some(init) => self.translator.expression(init, ctx)?,
                None => self.classifier.zero_value(ty).to_string(),
            };
            self.writer.write_indented_line(&format!(
                "{field_type} {}::{} = {value};",
                class.name,
                prop.field_name()
            ));
            any = true;
        }
        if any {
            self.writer.write_line();
        }
        Ok(())
    }

    /// `Class::_x` for static properties, `this->_x` otherwise.
    fn field_access(class: &ClassDecl, prop: &PropertyDecl) -> String {
        if prop.is_static {
            format!("{}::{}", class.name, prop.field_name())
        } else {
            format!("this->{}", prop.field_name())
        }
    }

    /// Getter and setter bodies of a public property.
    fn property(&mut self, class: &ClassDecl, prop: &PropertyDecl) -> CodegenResult<()> {
        if !prop.visibility.is_public() {
            return Ok(());
        }
        let ty = prop.type_annotation.as_ref();
        let value = self.classifier.classify(ty, TypeUse::Value)?;
        let field = self.classifier.classify(ty, TypeUse::Field)?;
        let value_type = self.classifier.spell(&value);
        let access = Self::field_access(class, prop);

        let unwrap = if needs_unwrap(&value, &field) {
            ".get()"
        } else {
            ""
        };
        self.writer.write_indented_line(&format!(
            "{value_type} {}::{}() {{",
            class.name, prop.name
        ));
        self.writer.increase_indent();
        self.writer
            .write_indented_line(&format!("return {access}{unwrap};"));
        self.writer.decrease_indent();
        self.writer.write_indented_line("}");
        self.writer.write_line();

        if !prop.readonly {
            self.writer.write_indented_line(&format!(
                "void {}::{}({value_type} {NEW_VALUE}) {{",
                class.name,
                setter_name(&prop.name)
            ));
            self.writer.increase_indent();
            self.writer
                .write_indented_line(&format!("{access} = {NEW_VALUE};"));
            self.writer.decrease_indent();
            self.writer.write_indented_line("}");
            self.writer.write_line();
        }
        Ok(())
    }

    fn method(
        &mut self,
        class: &ClassDecl,
        method: &MethodDecl,
        ctx: BodyContext<'_>,
    ) -> CodegenResult<()> {
        let Some(body) = &method.body else {
            return Ok(());
        };
        let ret = self
            .classifier
            .return_type_name(method.return_type.as_ref())?;
        let params = self.parameters(&method.parameters)?;
        let head = format!("{ret} {}::{}({params})", class.name, method.name);
        self.function_body(&head, body, ctx)
    }

    fn accessor(
        &mut self,
        class: &ClassDecl,
        accessor: &AccessorDecl,
        ctx: BodyContext<'_>,
    ) -> CodegenResult<()> {
        let Some(body) = &accessor.body else {
            return Ok(());
        };
        let ty = self
            .classifier
            .type_name(accessor.type_annotation.as_ref(), TypeUse::Value)
            .map_err(|e| {
                e.with_context(format!(
                    "accessor '{}' of class '{}'",
                    accessor.name, class.name
                ))
            })?;
        let head = match accessor.accessor {
            AccessorKind::Get => format!("{ty} {}::{}()", class.name, accessor.name),
            AccessorKind::Set => {
                let parameter = accessor.parameter.as_ref().map_or("v", |p| p.name.as_str());
                format!(
                    "void {}::{}({ty} {parameter})",
                    class.name,
                    setter_name(&accessor.name)
                )
            }
        };
        self.function_body(&head, body, ctx)
    }

    /// Explicit or synthesized constructor: every instance property is
    /// initialized once in declaration order, then the explicit body runs.
    fn constructor(
        &mut self,
        class: &ClassDecl,
        ctor: Option<&ConstructorDecl>,
        ctx: BodyContext<'_>,
    ) -> CodegenResult<()> {
        let params = match ctor {
            Some(ctor) => self.parameters(&ctor.parameters)?,
            None => String::new(),
        };
        self.writer
            .write_indented_line(&format!("{0}::{0}({params}) {{", class.name));
        self.writer.increase_indent();

        for prop in class.properties().filter(|p| !p.is_static) {
            self.initializer(class, prop, ctx).map_err(|e| {
                e.with_context(format!("property '{}' of class '{}'", prop.name, class.name))
            })?;
        }
        if let Some(body) = ctor.and_then(|c| c.body.as_ref()) {
            self.translator.body(&mut self.writer, body, ctx)?;
        }

        self.writer.decrease_indent();
        self.writer.write_indented_line("}");
        self.writer.write_line();
        Ok(())
    }

    fn initializer(
        &mut self,
        class: &ClassDecl,
        prop: &PropertyDecl,
        ctx: BodyContext<'_>,
    ) -> CodegenResult<()> {
        let access = Self::field_access(class, prop);
        let ty = prop.type_annotation.as_ref();
        let arena = self.arena;

        let Some(init) = prop.initializer else {
            let zero = self.classifier.zero_value(ty);
            self.writer
                .write_indented_line(&format!("{access} = {zero};"));
            return Ok(());
        };

        let Some(NodeData::ObjectLiteral { properties }) = arena.data(init) else {
            let value = self.translator.expression(init, ctx)?;
            self.writer
                .write_indented_line(&format!("{access} = {value};"));
            return Ok(());
        };

        let target = ty
            .and_then(|t| t.as_object())
            .filter(|obj| obj.type_arguments.is_empty());
        match target {
            Some(obj) if matches!(obj.kind, ObjectKind::Class | ObjectKind::Interface) => {
                self.object_literal(&access, &obj.name, properties, false, ctx)
            }
            Some(obj) if obj.kind == ObjectKind::MapAlias => {
                self.object_literal(&access, &obj.name, properties, true, ctx)
            }
            _ => {
                self.translator.report(
                    init,
                    diagnostic_codes::OBJECT_LITERAL_FOR_NON_OBJECT,
                    &[&prop.name],
                );
                let zero = self.classifier.zero_value(ty);
                self.writer
                    .write_indented_line(&format!("{access} = {zero};"));
                Ok(())
            }
        }
    }

    /// `{ T * __V__ = new T(); __V__->setA(a); this->_x = __V__; }`, with
    /// keyed insertions instead of setter calls for map aliases.
    fn object_literal(
        &mut self,
        access: &str,
        type_name: &str,
        properties: &[ObjectProperty],
        keyed: bool,
        ctx: BodyContext<'_>,
    ) -> CodegenResult<()> {
        self.writer.write_indented_line("{");
        self.writer.increase_indent();
        self.writer.write_indented_line(&format!(
            "{type_name} * {TEMPORARY} = new {type_name}();"
        ));
        for prop in properties {
            let value = self.translator.expression(prop.value, ctx)?;
            let line = if keyed {
                format!(
                    "(*{TEMPORARY})[{}] = {value};",
                    self.map_key(type_name, &prop.name)
                )
            } else {
                format!("{TEMPORARY}->{}({value});", setter_name(&prop.name))
            };
            self.writer.write_indented_line(&line);
        }
        self.writer
            .write_indented_line(&format!("{access} = {TEMPORARY};"));
        self.writer.decrease_indent();
        self.writer.write_indented_line("}");
        Ok(())
    }

    /// Spell an object-literal key for a map alias: bare for numeric keys,
    /// quoted otherwise. Aliases declared outside the unit use string keys.
    fn map_key(&self, alias: &str, name: &str) -> String {
        let numeric = self
            .map_keys
            .get(alias)
            .and_then(|key| key.non_nullable())
            .is_some_and(|key| matches!(key.kind, TypeKind::Primitive(PrimitiveType::Number)));
        if numeric && name.parse::<f64>().is_ok() {
            name.to_string()
        } else {
            quote_string(name)
        }
    }

    // =========================================================================
    // Free functions
    // =========================================================================

    fn function(&mut self, function: &FunctionDecl) -> CodegenResult<()> {
        let Some(body) = &function.body else {
            return Ok(());
        };
        let mut pass = ClosurePass::new(self.arena);
        pass.scan_function(function);
        let closures = pass.finish();
        let ctx = BodyContext::new(None, &closures);
        self.closures(&closures, ctx)?;

        let in_function = |e: CodegenError| e.with_context(format!("function '{}'", function.name));
        let ret = self
            .classifier
            .return_type_name(function.return_type.as_ref())
            .map_err(in_function)?;
        let params = self.parameters(&function.parameters)?;
        let head = format!("{ret} {}({params})", function.name);
        self.function_body(&head, body, ctx)
    }
}

#[cfg(test)]
#[path = "../tests/definition_emitter.rs"]
mod tests;
