//! Resolved program model consumed by the tscc code generator.
//!
//! Everything here is produced by an external front-end (parser plus type
//! checker) and read, never modified, by the emitters:
//! - [`SourceUnit`]: the declaration graph of one compilation unit
//! - [`NodeArena`] / [`NodeIndex`]: expression and statement bodies
//! - [`TypeDescriptor`]: resolved types
//! - [`TypeFacade`]: per-node type and symbol queries, with [`SemanticModel`]
//!   as the tabled implementation shipped in [`UnitInput`]

pub mod arena;
pub use arena::NodeArena;

pub mod decl;
pub use decl::{
    AccessorDecl, AccessorKind, ClassDecl, ClassMember, ConstructorDecl, Declaration,
    FunctionDecl, IndexSignature, InterfaceBody, InterfaceDecl, InterfaceMember, MethodDecl,
    MethodSignature, NamespaceDecl, PropertyDecl, PropertySignature, SourceUnit, Visibility,
};

pub mod input;
pub use input::UnitInput;

pub mod node;
pub use node::{
    ForInitializer, FunctionBody, FunctionLiteral, Identifier, Keyword, Node, NodeData,
    NodeIndex, ObjectProperty, Parameter, Span, SwitchClause, UnaryOperator, UpdateOperator,
    VariableDeclaration,
};

pub mod symbols;
pub use symbols::{SemanticModel, Symbol, SymbolId, TypeFacade};

pub mod types;
pub use types::{
    FunctionType, NumberKind, ObjectKind, ObjectRef, PrimitiveType, RefOwnership, Signature,
    SignatureParameter, TypeDescriptor, TypeKind,
};
