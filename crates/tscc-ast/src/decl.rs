//! The declaration graph of one compilation unit.
//!
//! Namespaces, classes, interfaces and free functions in source order.
//! Member bodies are statement lists in the unit's [`NodeArena`].

use crate::arena::NodeArena;
use crate::node::{NodeIndex, Parameter, Span};
use crate::types::TypeDescriptor;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub const fn label(self) -> &'static str {
        match self {
            Visibility::Public => "public:",
            Visibility::Protected => "protected:",
            Visibility::Private => "private:",
        }
    }

    pub const fn is_public(self) -> bool {
        matches!(self, Visibility::Public)
    }
}

/// A compilation unit: the declaration graph plus the arena holding bodies.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceUnit {
    pub file_name: String,
    #[serde(default)]
    pub declarations: Vec<Declaration>,
    #[serde(default)]
    pub arena: NodeArena,
}

impl SourceUnit {
    pub fn new(file_name: impl Into<String>) -> Self {
        SourceUnit {
            file_name: file_name.into(),
            declarations: Vec::new(),
            arena: NodeArena::new(),
        }
    }

    /// File name without directory and extension: `src/demo.ts` -> `demo`.
    pub fn basename(&self) -> &str {
        let name = self
            .file_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.file_name);
        match name.find('.') {
            Some(0) | None => name,
            Some(dot) => &name[..dot],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Declaration {
    Namespace(NamespaceDecl),
    Class(ClassDecl),
    Interface(InterfaceDecl),
    Function(FunctionDecl),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamespaceDecl {
    pub name: String,
    #[serde(default)]
    pub children: Vec<Declaration>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    #[serde(default)]
    pub superclass: Option<String>,
    #[serde(default)]
    pub implements: Vec<String>,
    #[serde(default)]
    pub members: Vec<ClassMember>,
}

impl ClassDecl {
    pub fn new(name: impl Into<String>) -> Self {
        ClassDecl {
            name: name.into(),
            superclass: None,
            implements: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn properties(&self) -> impl Iterator<Item = &PropertyDecl> {
        self.members.iter().filter_map(|m| match m {
            ClassMember::Property(p) => Some(p),
            _ => None,
        })
    }

    /// Declared property with the given name, if any.
    pub fn property(&self, name: &str) -> Option<&PropertyDecl> {
        self.properties().find(|p| p.name == name)
    }

    /// The explicit constructor; the first one wins if several were declared.
    pub fn constructor(&self) -> Option<&ConstructorDecl> {
        self.members.iter().find_map(|m| match m {
            ClassMember::Constructor(c) => Some(c),
            _ => None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ClassMember {
    Property(PropertyDecl),
    Method(MethodDecl),
    Constructor(ConstructorDecl),
    Accessor(AccessorDecl),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyDecl {
    pub name: String,
    #[serde(default, rename = "type")]
    pub type_annotation: Option<TypeDescriptor>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub initializer: Option<NodeIndex>,
    #[serde(default)]
    pub span: Span,
}

impl PropertyDecl {
    pub fn new(name: impl Into<String>, ty: Option<TypeDescriptor>) -> Self {
        PropertyDecl {
            name: name.into(),
            type_annotation: ty,
            visibility: Visibility::Public,
            readonly: false,
            is_static: false,
            initializer: None,
            span: Span::default(),
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub fn static_(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn with_initializer(mut self, initializer: NodeIndex) -> Self {
        self.initializer = Some(initializer);
        self
    }

    /// Name of the storage member. Public properties are backed by a
    /// `_`-prefixed field behind accessors; others are the field itself.
    pub fn field_name(&self) -> String {
        if self.visibility.is_public() {
            format!("_{}", self.name)
        } else {
            self.name.clone()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub return_type: Option<TypeDescriptor>,
    /// `None` for abstract (bodiless) methods.
    #[serde(default)]
    pub body: Option<Vec<NodeIndex>>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default, rename = "static")]
    pub is_static: bool,
}

impl MethodDecl {
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<Parameter>,
        return_type: Option<TypeDescriptor>,
        body: Option<Vec<NodeIndex>>,
    ) -> Self {
        MethodDecl {
            name: name.into(),
            parameters,
            return_type,
            body,
            visibility: Visibility::Public,
            is_static: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstructorDecl {
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub body: Option<Vec<NodeIndex>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessorKind {
    Get,
    Set,
}

/// An explicit `get x()` or `set x(v)` accessor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccessorDecl {
    pub accessor: AccessorKind,
    pub name: String,
    /// Getter return type, or the setter parameter's type.
    #[serde(default, rename = "type")]
    pub type_annotation: Option<TypeDescriptor>,
    /// The setter's value parameter.
    #[serde(default)]
    pub parameter: Option<Parameter>,
    #[serde(default)]
    pub body: Option<Vec<NodeIndex>>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default, rename = "static")]
    pub is_static: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InterfaceDecl {
    pub name: String,
    #[serde(default)]
    pub extends: Vec<String>,
    pub body: InterfaceBody,
    #[serde(default)]
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum InterfaceBody {
    Members(Vec<InterfaceMember>),
    IndexSignature(IndexSignature),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum InterfaceMember {
    Property(PropertySignature),
    Method(MethodSignature),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertySignature {
    pub name: String,
    #[serde(default, rename = "type")]
    pub type_annotation: Option<TypeDescriptor>,
    #[serde(default)]
    pub readonly: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MethodSignature {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub return_type: Option<TypeDescriptor>,
}

/// `[key: K]: V`. `key` is `None` when the signature declares no parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexSignature {
    #[serde(default)]
    pub key: Option<TypeDescriptor>,
    pub value: TypeDescriptor,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub return_type: Option<TypeDescriptor>,
    #[serde(default)]
    pub body: Option<Vec<NodeIndex>>,
}
