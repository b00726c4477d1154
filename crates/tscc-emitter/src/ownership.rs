//! Ownership classification.
//!
//! Decides how a resolved type is represented in generated code: a runtime
//! primitive, the dynamic `Any`, a raw class pointer, a strong or weak
//! wrapper, a closure pointer or a map-alias pointer. The same type can be
//! spelled differently depending on where it appears ([`TypeUse`]): object
//! and function values are raw pointers in signatures and locals but always
//! sit behind a wrapper when stored in a field.

use tscc_ast::{NumberKind, ObjectKind, ObjectRef, PrimitiveType, RefOwnership, TypeDescriptor, TypeKind};
use tscc_common::{CodegenError, CodegenOptions, CodegenResult};

/// Where a type is being spelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeUse {
    /// Parameters, locals, accessor and method signatures.
    Value,
    /// Backing storage of a property.
    Field,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimitiveMapping {
    String,
    Boolean,
    Number(NumberKind),
}

/// Classification result. Names inside are already spelled for output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ownership {
    Primitive(PrimitiveMapping),
    Dynamic,
    Void,
    /// `Foo *`
    ClassPointer(String),
    /// `PropertyMap *`, for index-signature interfaces.
    MapAlias(String),
    /// `ns::Strong<pointee>` or `ns::Weak<pointee>`.
    Wrapped {
        strength: RefOwnership,
        pointee: String,
    },
    /// `ns::Closure<R,A..> *`; holds the template spelling without the `*`.
    Closure(String),
}

impl Ownership {
    pub const fn is_wrapped(&self) -> bool {
        matches!(self, Ownership::Wrapped { .. })
    }

    /// Object-like values that are dereferenced with `->`.
    pub const fn is_pointer(&self) -> bool {
        matches!(
            self,
            Ownership::ClassPointer(_) | Ownership::MapAlias(_) | Ownership::Closure(_)
        )
    }
}

/// Reading a field of this classification as a value needs `.get()`.
pub fn needs_unwrap(value: &Ownership, field: &Ownership) -> bool {
    field.is_wrapped() && !value.is_wrapped()
}

pub struct OwnershipClassifier<'a> {
    options: &'a CodegenOptions,
}

impl<'a> OwnershipClassifier<'a> {
    pub const fn new(options: &'a CodegenOptions) -> Self {
        OwnershipClassifier { options }
    }

    /// Classify a type for the given use. `None` (no annotation) is dynamic.
    pub fn classify(&self, ty: Option<&TypeDescriptor>, usage: TypeUse) -> CodegenResult<Ownership> {
        let Some(original) = ty else {
            return Ok(Ownership::Dynamic);
        };
        let Some(ty) = original.non_nullable() else {
            return Err(CodegenError::unsupported("type position", original.to_string()));
        };

        let ownership = match &ty.kind {
            TypeKind::Any => Ownership::Dynamic,
            TypeKind::Void => Ownership::Void,
            TypeKind::Primitive(PrimitiveType::String) => {
                Ownership::Primitive(PrimitiveMapping::String)
            }
            TypeKind::Primitive(PrimitiveType::Boolean) => {
                Ownership::Primitive(PrimitiveMapping::Boolean)
            }
            TypeKind::Primitive(PrimitiveType::Number) => Ownership::Primitive(
                PrimitiveMapping::Number(integer_alias(original, ty).unwrap_or(NumberKind::Number)),
            ),
            TypeKind::Object(obj) => self.classify_object(original, obj, usage)?,
            TypeKind::Function(_) => {
                let closure = self.closure_template(ty)?;
                match usage {
                    TypeUse::Value => Ownership::Closure(closure),
                    TypeUse::Field => Ownership::Wrapped {
                        strength: RefOwnership::Strong,
                        pointee: format!("{closure} *"),
                    },
                }
            }
            TypeKind::Null | TypeKind::Undefined | TypeKind::Union(_) => {
                return Err(CodegenError::unsupported("type position", original.to_string()));
            }
        };

        tracing::trace!(ty = %original, ?usage, ?ownership, "classified type");
        Ok(ownership)
    }

    fn classify_object(
        &self,
        original: &TypeDescriptor,
        obj: &ObjectRef,
        usage: TypeUse,
    ) -> CodegenResult<Ownership> {
        let strength = if is_weak(original, obj) {
            RefOwnership::Weak
        } else {
            RefOwnership::Strong
        };

        if !obj.type_arguments.is_empty() {
            let mut args = Vec::with_capacity(obj.type_arguments.len());
            for arg in &obj.type_arguments {
                args.push(self.type_name(Some(arg), TypeUse::Value)?);
            }
            return Ok(Ownership::Wrapped {
                strength,
                pointee: format!("{}<{}>", obj.name, args.join(",")),
            });
        }

        let value = match obj.kind {
            ObjectKind::Class | ObjectKind::Interface => Ownership::ClassPointer(obj.name.clone()),
            ObjectKind::MapAlias => Ownership::MapAlias(obj.name.clone()),
            ObjectKind::Anonymous => {
                return Err(CodegenError::unsupported("type position", original.to_string()));
            }
        };
        Ok(match usage {
            TypeUse::Value => value,
            TypeUse::Field => Ownership::Wrapped {
                strength,
                pointee: format!("{} *", obj.name),
            },
        })
    }

    /// `ns::Closure<R,A..>` for a function type's first call signature.
    pub fn closure_template(&self, ty: &TypeDescriptor) -> CodegenResult<String> {
        let signature = ty
            .as_function()
            .and_then(|f| f.signatures.first())
            .ok_or_else(|| CodegenError::MissingSignature {
                type_text: ty.to_string(),
            })?;
        let mut parts = vec![self.return_type_name(Some(&signature.return_type))?];
        for param in &signature.parameters {
            parts.push(self.type_name(param.ty.as_ref(), TypeUse::Value)?);
        }
        Ok(format!("{}<{}>", self.options.runtime("Closure"), parts.join(",")))
    }

    /// Spell a classification.
    pub fn spell(&self, ownership: &Ownership) -> String {
        match ownership {
            Ownership::Primitive(PrimitiveMapping::String) => self.options.runtime("String"),
            Ownership::Primitive(PrimitiveMapping::Boolean) => self.options.runtime("Boolean"),
            Ownership::Primitive(PrimitiveMapping::Number(kind)) => {
                self.options.runtime(kind.runtime_name())
            }
            Ownership::Dynamic => self.options.runtime("Any"),
            Ownership::Void => "void".to_string(),
            Ownership::ClassPointer(name) | Ownership::MapAlias(name) => format!("{name} *"),
            Ownership::Wrapped { strength, pointee } => {
                let wrapper = match strength {
                    RefOwnership::Strong => "Strong",
                    RefOwnership::Weak => "Weak",
                };
                format!("{}<{pointee}>", self.options.runtime(wrapper))
            }
            Ownership::Closure(template) => format!("{template} *"),
        }
    }

    pub fn type_name(&self, ty: Option<&TypeDescriptor>, usage: TypeUse) -> CodegenResult<String> {
        Ok(self.spell(&self.classify(ty, usage)?))
    }

    /// Return types: a missing annotation means `void`, not `Any`.
    pub fn return_type_name(&self, ty: Option<&TypeDescriptor>) -> CodegenResult<String> {
        match ty {
            None => Ok("void".to_string()),
            Some(ty) => self.type_name(Some(ty), TypeUse::Value),
        }
    }

    /// `T name`, as used in parameter lists and declarations.
    pub fn declare(&self, name: &str, ty: Option<&TypeDescriptor>, usage: TypeUse) -> CodegenResult<String> {
        Ok(format!("{} {name}", self.type_name(ty, usage)?))
    }

    /// Zero value of a type: `""`, `0`, `false` or `nullptr`.
    pub fn zero_value(&self, ty: Option<&TypeDescriptor>) -> &'static str {
        let Some(ty) = ty.and_then(TypeDescriptor::non_nullable) else {
            return "nullptr";
        };
        match ty.kind {
            TypeKind::Primitive(PrimitiveType::String) => "\"\"",
            TypeKind::Primitive(PrimitiveType::Number) => "0",
            TypeKind::Primitive(PrimitiveType::Boolean) => "false",
            _ => "nullptr",
        }
    }
}

/// Integer alias named by the declared text of the type or of its union.
fn integer_alias(original: &TypeDescriptor, member: &TypeDescriptor) -> Option<NumberKind> {
    [member.declared_text.as_deref(), original.declared_text.as_deref()]
        .into_iter()
        .flatten()
        .flat_map(|text| text.split('|'))
        .find_map(NumberKind::from_alias)
}

/// The structural tag wins; the spelled marker (`Foo | weak`, `weak<Foo>`)
/// is accepted for resolvers that do not set it.
fn is_weak(original: &TypeDescriptor, obj: &ObjectRef) -> bool {
    if obj.ownership == RefOwnership::Weak {
        return true;
    }
    let Some(text) = original.declared_text.as_deref() else {
        return false;
    };
    text.split('|').map(str::trim).any(|part| {
        part == "weak" || part.starts_with("weak<") || part.starts_with("Weak<")
    })
}

#[cfg(test)]
#[path = "../tests/ownership.rs"]
mod tests;
