//! Resolved type descriptors.
//!
//! A [`TypeDescriptor`] is what the external resolver hands us for a type
//! annotation or an inferred type. `declared_text` keeps the annotation as it
//! was written (`int`, `Foo | undefined`, `weak<Foo>`), which carries
//! information the structural kind does not: integer aliases of `number` and
//! the textual weak marker.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub kind: TypeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_text: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TypeKind {
    Primitive(PrimitiveType),
    Any,
    Void,
    Null,
    Undefined,
    Object(ObjectRef),
    Function(FunctionType),
    Union(Vec<TypeDescriptor>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimitiveType {
    String,
    Boolean,
    Number,
}

/// Fixed-width numeric kinds selected by integer aliases of `number`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumberKind {
    Number,
    Int,
    Uint,
    Int32,
    Uint32,
    Int64,
    Uint64,
}

impl NumberKind {
    /// Map a declared alias name (`int`, `uint64`, ...) to its numeric kind.
    pub fn from_alias(name: &str) -> Option<NumberKind> {
        match name.trim() {
            "int" => Some(NumberKind::Int),
            "uint" => Some(NumberKind::Uint),
            "int32" => Some(NumberKind::Int32),
            "uint32" => Some(NumberKind::Uint32),
            "int64" => Some(NumberKind::Int64),
            "uint64" => Some(NumberKind::Uint64),
            _ => None,
        }
    }

    /// Runtime-support type name, without the namespace prefix.
    pub const fn runtime_name(self) -> &'static str {
        match self {
            NumberKind::Number => "Number",
            NumberKind::Int => "Int",
            NumberKind::Uint => "Uint",
            NumberKind::Int32 => "Int32",
            NumberKind::Uint32 => "Uint32",
            NumberKind::Int64 => "Int64",
            NumberKind::Uint64 => "Uint64",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    #[default]
    Class,
    Interface,
    /// An index-signature interface, emitted as a map typedef.
    MapAlias,
    /// Object literal types and other shapes without a declaration.
    Anonymous,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefOwnership {
    #[default]
    Strong,
    Weak,
}

/// Reference to a declared object type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Name of the target declaration as it is spelled in generated code.
    pub name: String,
    #[serde(default)]
    pub kind: ObjectKind,
    #[serde(default)]
    pub ownership: RefOwnership,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_arguments: Vec<TypeDescriptor>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignatureParameter {
    pub name: String,
    #[serde(default, rename = "type")]
    pub ty: Option<TypeDescriptor>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub parameters: Vec<SignatureParameter>,
    pub return_type: Box<TypeDescriptor>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionType {
    #[serde(default)]
    pub signatures: Vec<Signature>,
}

// =============================================================================
// Constructors
// =============================================================================

impl TypeDescriptor {
    pub const fn new(kind: TypeKind) -> Self {
        TypeDescriptor {
            kind,
            declared_text: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.declared_text = Some(text.into());
        self
    }

    pub const fn string() -> Self {
        Self::new(TypeKind::Primitive(PrimitiveType::String))
    }

    pub const fn boolean() -> Self {
        Self::new(TypeKind::Primitive(PrimitiveType::Boolean))
    }

    pub const fn number() -> Self {
        Self::new(TypeKind::Primitive(PrimitiveType::Number))
    }

    /// `number` declared through an alias such as `int` or `uint64`.
    pub fn number_alias(alias: &str) -> Self {
        Self::number().with_text(alias)
    }

    pub const fn any() -> Self {
        Self::new(TypeKind::Any)
    }

    pub const fn void() -> Self {
        Self::new(TypeKind::Void)
    }

    pub const fn undefined() -> Self {
        Self::new(TypeKind::Undefined)
    }

    pub const fn null() -> Self {
        Self::new(TypeKind::Null)
    }

    pub fn object(name: impl Into<String>, kind: ObjectKind) -> Self {
        Self::new(TypeKind::Object(ObjectRef {
            name: name.into(),
            kind,
            ownership: RefOwnership::Strong,
            type_arguments: Vec::new(),
        }))
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::object(name, ObjectKind::Class)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::object(name, ObjectKind::Interface)
    }

    pub fn map_alias(name: impl Into<String>) -> Self {
        Self::object(name, ObjectKind::MapAlias)
    }

    pub fn generic(name: impl Into<String>, type_arguments: Vec<TypeDescriptor>) -> Self {
        Self::new(TypeKind::Object(ObjectRef {
            name: name.into(),
            kind: ObjectKind::Class,
            ownership: RefOwnership::Strong,
            type_arguments,
        }))
    }

    pub fn function(parameters: Vec<(&str, TypeDescriptor)>, return_type: TypeDescriptor) -> Self {
        let parameters = parameters
            .into_iter()
            .map(|(name, ty)| SignatureParameter {
                name: name.to_string(),
                ty: Some(ty),
            })
            .collect();
        Self::new(TypeKind::Function(FunctionType {
            signatures: vec![Signature {
                parameters,
                return_type: Box::new(return_type),
            }],
        }))
    }

    pub fn union(members: Vec<TypeDescriptor>) -> Self {
        Self::new(TypeKind::Union(members))
    }

    /// `T | undefined`.
    pub fn nullable(self) -> Self {
        Self::union(vec![self, Self::undefined()])
    }

    /// Mark an object reference (or the object member of a union) weak.
    pub fn weak(mut self) -> Self {
        match &mut self.kind {
            TypeKind::Object(obj) => obj.ownership = RefOwnership::Weak,
            TypeKind::Union(members) => {
                for member in members.iter_mut() {
                    if let TypeKind::Object(obj) = &mut member.kind {
                        obj.ownership = RefOwnership::Weak;
                    }
                }
            }
            _ => {}
        }
        self
    }
}

// =============================================================================
// Queries
// =============================================================================

impl TypeDescriptor {
    pub const fn is_nullish(&self) -> bool {
        matches!(self.kind, TypeKind::Null | TypeKind::Undefined)
    }

    /// Strip `null`/`undefined` members from a union.
    ///
    /// Returns the single remaining member, or `None` when the union has no
    /// non-null member or more than one. Non-union types are returned as is.
    pub fn non_nullable(&self) -> Option<&TypeDescriptor> {
        let TypeKind::Union(members) = &self.kind else {
            return Some(self);
        };
        let mut rest = members.iter().filter(|m| !m.is_nullish());
        let first = rest.next()?;
        if rest.next().is_some() {
            return None;
        }
        first.non_nullable()
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match &self.non_nullable()?.kind {
            TypeKind::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionType> {
        match &self.non_nullable()?.kind {
            TypeKind::Function(func) => Some(func),
            _ => None,
        }
    }
}

// =============================================================================
// Display
// =============================================================================

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = &self.declared_text {
            return f.write_str(text);
        }
        match &self.kind {
            TypeKind::Primitive(PrimitiveType::String) => f.write_str("string"),
            TypeKind::Primitive(PrimitiveType::Boolean) => f.write_str("boolean"),
            TypeKind::Primitive(PrimitiveType::Number) => f.write_str("number"),
            TypeKind::Any => f.write_str("any"),
            TypeKind::Void => f.write_str("void"),
            TypeKind::Null => f.write_str("null"),
            TypeKind::Undefined => f.write_str("undefined"),
            TypeKind::Object(obj) => {
                f.write_str(&obj.name)?;
                if !obj.type_arguments.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in obj.type_arguments.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
            TypeKind::Function(func) => {
                let Some(sig) = func.signatures.first() else {
                    return f.write_str("Function");
                };
                f.write_str("(")?;
                for (i, param) in sig.parameters.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    match &param.ty {
                        Some(ty) => write!(f, "{}: {ty}", param.name)?,
                        None => f.write_str(&param.name)?,
                    }
                }
                write!(f, ") => {}", sig.return_type)
            }
            TypeKind::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/types.rs"]
mod tests;
