//! Declaration artifact (`.h`) emission.
//!
//! Walks the declaration graph once and writes the include guard, the runtime
//! header inclusion, namespace scopes, class and interface shapes with their
//! inheritance lists, accessor and member declarations, map-alias typedefs
//! for index-signature interfaces and free function signatures.

use crate::ownership::{OwnershipClassifier, TypeUse};
use crate::source_writer::SourceWriter;
use tracing::{debug, warn};
use tscc_ast::{
    AccessorDecl, AccessorKind, ClassDecl, ClassMember, Declaration, FunctionDecl, InterfaceBody,
    InterfaceDecl, InterfaceMember, MethodDecl, Parameter, PropertyDecl, SourceUnit,
    TypeDescriptor, Visibility,
};
use tscc_common::{CodegenOptions, CodegenResult, Diagnostic, diagnostic_codes};

/// `title` -> `setTitle`.
pub fn setter_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("set{}{}", first.to_uppercase(), chars.as_str()),
        None => "set".to_string(),
    }
}

/// `src/my-demo` -> `_SRC_MY_DEMO_H`.
pub fn include_guard(basename: &str) -> String {
    let name: String = basename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("_{name}_H")
}

pub struct DeclarationEmitter<'a> {
    writer: SourceWriter,
    options: &'a CodegenOptions,
    classifier: OwnershipClassifier<'a>,
    file_name: &'a str,
    diagnostics: Vec<Diagnostic>,
    /// Access level of the most recent label in the open class body.
    visibility: Option<Visibility>,
}

impl<'a> DeclarationEmitter<'a> {
    pub fn new(options: &'a CodegenOptions, file_name: &'a str) -> Self {
        DeclarationEmitter {
            writer: SourceWriter::new(),
            options,
            classifier: OwnershipClassifier::new(options),
            file_name,
            diagnostics: Vec::new(),
            visibility: None,
        }
    }

    /// Emit the whole artifact for one unit.
    pub fn emit_unit(&mut self, unit: &SourceUnit) -> CodegenResult<()> {
        let guard = include_guard(unit.basename());
        self.writer.write(&format!("#ifndef {guard}\n"));
        self.writer.write(&format!("#define {guard}\n\n"));
        self.writer
            .write(&format!("#include <{}>\n\n", self.options.runtime_header()));
        self.declarations(&unit.declarations)?;
        self.writer.write("#endif\n\n");
        Ok(())
    }

    pub fn finish(self) -> (String, Vec<Diagnostic>) {
        (self.writer.finish(), self.diagnostics)
    }

    fn declarations(&mut self, declarations: &[Declaration]) -> CodegenResult<()> {
        for decl in declarations {
            match decl {
                Declaration::Namespace(ns) => {
                    debug!(namespace = %ns.name, "namespace >>");
                    self.writer.write_indent();
                    self.writer.write(&format!("namespace {} {{\n\n", ns.name));
                    self.writer.increase_indent();
                    self.declarations(&ns.children)?;
                    self.writer.decrease_indent();
                    self.writer.write_indent();
                    self.writer.write("}\n\n");
                    debug!(namespace = %ns.name, "namespace <<");
                }
                Declaration::Class(class) => self.class(class)?,
                Declaration::Interface(interface) => self.interface(interface)?,
                Declaration::Function(function) => self.function(function)?,
            }
        }
        Ok(())
    }

    // =========================================================================
    // Shared pieces
    // =========================================================================

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

    fn value_type(&self, ty: Option<&TypeDescriptor>, what: &str) -> CodegenResult<String> {
        self.classifier
            .type_name(ty, TypeUse::Value)
            .map_err(|e| e.with_context(what.to_string()))
    }

    /// `virtual T name()` / `static T name()`.
    fn getter_head(
        &self,
        name: &str,
        ty: Option<&TypeDescriptor>,
        is_static: bool,
    ) -> CodegenResult<String> {
        let ty = self.value_type(ty, &format!("accessor '{name}'"))?;
        Ok(format!("{}{ty} {name}()", dispatch(is_static)))
    }

    /// `virtual void setName(T v)` / `static void setName(T v)`.
    fn setter_head(
        &self,
        name: &str,
        ty: Option<&TypeDescriptor>,
        parameter: &str,
        is_static: bool,
    ) -> CodegenResult<String> {
        let ty = self.value_type(ty, &format!("accessor '{name}'"))?;
        Ok(format!(
            "{}void {}({ty} {parameter})",
            dispatch(is_static),
            setter_name(name)
        ))
    }

    /// Emit an access label if it differs from the current one. Labels sit
    /// one level out from the members they precede.
    fn label(&mut self, visibility: Visibility) {
        if self.visibility == Some(visibility) {
            return;
        }
        self.visibility = Some(visibility);
        self.writer.write_indent_offset(-1);
        self.writer.write(visibility.label());
        self.writer.write_line();
    }

    // =========================================================================
    // Classes
    // =========================================================================

    fn class_heritage(&self, class: &ClassDecl) -> String {
        let mut bases = vec![match &class.superclass {
            Some(superclass) => superclass.clone(),
            None => self.options.runtime("Object"),
        }];
        bases.extend(class.implements.iter().cloned());
        heritage(&bases)
    }

    fn class(&mut self, class: &ClassDecl) -> CodegenResult<()> {
        debug!(class = %class.name, "class >>");
        self.writer.write_indent();
        self.writer.write(&format!(
            "class {}{} {{\n",
            class.name,
            self.class_heritage(class)
        ));
        self.writer.increase_indent();
        self.visibility = None;

        for member in &class.members {
            match member {
                ClassMember::Property(prop) => self.property(prop).map_err(|e| {
                    e.with_context(format!("property '{}' of class '{}'", prop.name, class.name))
                })?,
                ClassMember::Method(method) => self.method(method).map_err(|e| {
                    e.with_context(format!("method '{}' of class '{}'", method.name, class.name))
                })?,
                ClassMember::Constructor(ctor) => {
                    let params = self.parameters(&ctor.parameters)?;
                    self.label(Visibility::Public);
                    self.writer
                        .write_indented_line(&format!("{}({params});", class.name));
                    self.writer.write_line();
                }
                ClassMember::Accessor(accessor) => self.accessor(accessor)?,
            }
        }

        if class.constructor().is_none() {
            self.label(Visibility::Public);
            self.writer.write_indented_line(&format!("{}();", class.name));
            self.writer.write_line();
        }

        self.writer.decrease_indent();
        self.writer.write_indent();
        self.writer.write("};\n\n");
        self.visibility = None;
        debug!(class = %class.name, "class <<");
        Ok(())
    }

    /// Public properties get an accessor pair (getter only when readonly) and
    /// a protected `_`-prefixed backing field; others are the field itself.
    fn property(&mut self, prop: &PropertyDecl) -> CodegenResult<()> {
        let ty = prop.type_annotation.as_ref();
        let field_type = self.classifier.type_name(ty, TypeUse::Field)?;
        let storage = if prop.is_static { "static " } else { "" };

        if prop.visibility.is_public() {
            let getter = self.getter_head(&prop.name, ty, prop.is_static)?;
            self.label(Visibility::Public);
            self.writer.write_indented_line(&format!("{getter};"));
            if !prop.readonly {
                let setter = self.setter_head(&prop.name, ty, "v", prop.is_static)?;
                self.writer.write_indented_line(&format!("{setter};"));
            }
            self.label(Visibility::Protected);
        } else {
            self.label(prop.visibility);
        }

        self.writer.write_indented_line(&format!(
            "{storage}{field_type} {};",
            prop.field_name()
        ));
        self.writer.write_line();
        Ok(())
    }

    fn method(&mut self, method: &MethodDecl) -> CodegenResult<()> {
        let ret = self.classifier.return_type_name(method.return_type.as_ref())?;
        let params = self.parameters(&method.parameters)?;
        let pure = if method.body.is_none() && !method.is_static {
            " = 0"
        } else {
            ""
        };
        self.label(method.visibility);
        self.writer.write_indented_line(&format!(
            "{}{ret} {}({params}){pure};",
            dispatch(method.is_static),
            method.name
        ));
        Ok(())
    }

    fn accessor(&mut self, accessor: &AccessorDecl) -> CodegenResult<()> {
        let ty = accessor.type_annotation.as_ref();
        let head = match accessor.accessor {
            AccessorKind::Get => self.getter_head(&accessor.name, ty, accessor.is_static)?,
            AccessorKind::Set => {
                let parameter = accessor.parameter.as_ref().map_or("v", |p| p.name.as_str());
                self.setter_head(&accessor.name, ty, parameter, accessor.is_static)?
            }
        };
        self.label(accessor.visibility);
        self.writer.write_indented_line(&format!("{head};"));
        Ok(())
    }

    // =========================================================================
    // Interfaces
    // =========================================================================

    fn interface(&mut self, interface: &InterfaceDecl) -> CodegenResult<()> {
        let members: &[InterfaceMember] = match &interface.body {
            InterfaceBody::Members(members) => members,
            InterfaceBody::IndexSignature(index) => {
                if let Some(key) = &index.key {
                    return self.map_alias(interface, key, &index.value);
                }
                warn!(interface = %interface.name, "index signature without key");
                self.diagnostics.push(Diagnostic::from_code(
                    self.file_name,
                    interface.span.pos,
                    interface.span.len(),
                    diagnostic_codes::INDEX_SIGNATURE_WITHOUT_KEY,
                    &[&interface.name],
                ));
                &[]
            }
        };

        debug!(interface = %interface.name, "interface >>");
        let heritage_list = if interface.extends.is_empty() {
            heritage(&[self.options.runtime("IObject")])
        } else {
            heritage(&interface.extends)
        };
        self.writer.write_indent();
        self.writer
            .write(&format!("class {}{heritage_list} {{\n", interface.name));
        self.writer.increase_indent();
        self.writer.write_indent_offset(-1);
        self.writer.write("public:\n");

        for member in members {
            match member {
                InterfaceMember::Property(prop) => {
                    let ty = prop.type_annotation.as_ref();
                    let getter = self.getter_head(&prop.name, ty, false)?;
                    self.writer.write_indented_line(&format!("{getter} = 0;"));
                    if !prop.readonly {
                        let setter = self.setter_head(&prop.name, ty, "v", false)?;
                        self.writer.write_indented_line(&format!("{setter} = 0;"));
                    }
                }
                InterfaceMember::Method(method) => {
                    let ret = self
                        .classifier
                        .return_type_name(method.return_type.as_ref())
                        .map_err(|e| {
                            e.with_context(format!(
                                "method '{}' of interface '{}'",
                                method.name, interface.name
                            ))
                        })?;
                    let params = self.parameters(&method.parameters)?;
                    self.writer.write_indented_line(&format!(
                        "virtual {ret} {}({params}) = 0;",
                        method.name
                    ));
                }
            }
        }

        self.writer.decrease_indent();
        self.writer.write_indent();
        self.writer.write("};\n\n");
        debug!(interface = %interface.name, "interface <<");
        Ok(())
    }

    /// `typedef ns::Map<K,V> Name;`
    fn map_alias(
        &mut self,
        interface: &InterfaceDecl,
        key: &TypeDescriptor,
        value: &TypeDescriptor,
    ) -> CodegenResult<()> {
        let what = format!("index signature of '{}'", interface.name);
        let key = self.value_type(Some(key), &what)?;
        let value = self.value_type(Some(value), &what)?;
        self.writer.write_indent();
        self.writer.write(&format!(
            "typedef {}<{key},{value}> {};\n\n",
            self.options.runtime("Map"),
            interface.name
        ));
        Ok(())
    }

    // =========================================================================
    // Free functions
    // =========================================================================

    fn function(&mut self, function: &FunctionDecl) -> CodegenResult<()> {
        let ret = self
            .classifier
            .return_type_name(function.return_type.as_ref())
            .map_err(|e| e.with_context(format!("function '{}'", function.name)))?;
        let params = self.parameters(&function.parameters)?;
        self.writer.write_indent();
        self.writer
            .write(&format!("{ret} {}({params});\n\n", function.name));
        Ok(())
    }
}

const fn dispatch(is_static: bool) -> &'static str {
    if is_static { "static " } else { "virtual " }
}

/// `:public A,public B`
fn heritage(bases: &[String]) -> String {
    let list: Vec<String> = bases.iter().map(|b| format!("public {b}")).collect();
    format!(":{}", list.join(","))
}

#[cfg(test)]
#[path = "../tests/declaration_emitter.rs"]
mod tests;
