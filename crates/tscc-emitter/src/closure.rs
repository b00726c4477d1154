//! Closure extraction.
//!
//! A read-only pass over the bodies of one class or free function that finds
//! every function literal and computes the locals it captures. Results go to
//! a [`ClosureTable`] keyed by the literal's [`NodeIndex`]; the translator
//! consults it to emit the synthesized function and the construction
//! expression at the literal's position.
//!
//! Capture rules:
//! - only locals of enclosing frames are captured (parameters and variables
//!   of the member body or of an enclosing literal); class members, globals
//!   and unresolved names never are
//! - member bodies are capture horizons: a pass starts a fresh frame stack
//!   for each member
//! - a literal's own parameters and variables are never captured by it
//! - order is the order of first reference, and a nested literal's captures
//!   count as references of its parent at the nested literal's position

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use tscc_ast::{
    ClassDecl, ClassMember, ForInitializer, FunctionBody, FunctionDecl, NodeArena, NodeData,
    NodeIndex, Parameter, SymbolId,
};
use tracing::trace;

/// A captured local.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Capture {
    pub symbol: SymbolId,
    pub name: String,
}

/// Extraction result for one function literal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClosureInfo {
    pub node: NodeIndex,
    /// Synthesized function name, derived from the literal's span.
    pub name: String,
    pub captures: Vec<Capture>,
}

impl ClosureInfo {
    pub fn captures_symbol(&self, symbol: SymbolId) -> bool {
        !symbol.is_none() && self.captures.iter().any(|c| c.symbol == symbol)
    }
}

/// Side table of extracted closures.
///
/// Iteration order is completion order: nested literals come before the
/// literal that contains them.
#[derive(Clone, Debug, Default)]
pub struct ClosureTable {
    by_node: FxHashMap<NodeIndex, usize>,
    closures: Vec<ClosureInfo>,
}

impl ClosureTable {
    pub fn get(&self, node: NodeIndex) -> Option<&ClosureInfo> {
        self.by_node.get(&node).map(|&i| &self.closures[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClosureInfo> {
        self.closures.iter()
    }

    pub fn len(&self) -> usize {
        self.closures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closures.is_empty()
    }

    fn insert(&mut self, info: ClosureInfo) {
        if self.by_node.contains_key(&info.node) {
            return;
        }
        self.by_node.insert(info.node, self.closures.len());
        self.closures.push(info);
    }
}

/// Synthesized name for a literal at `[pos, end)`. Literals shipped without
/// a span are named after their arena index instead.
pub fn closure_name(arena: &NodeArena, node: NodeIndex) -> String {
    let span = arena.span(node);
    if span.is_empty() {
        return format!("__closure_n{}", node.0);
    }
    format!("__closure_{}_{}", span.pos, span.end)
}

struct Frame {
    /// `NodeIndex::NONE` for the member body frame.
    literal: NodeIndex,
    declared: FxHashSet<SymbolId>,
    references: IndexMap<SymbolId, String>,
}

impl Frame {
    fn new(literal: NodeIndex, parameters: &[Parameter]) -> Self {
        Frame {
            literal,
            declared: parameters.iter().map(|p| p.symbol).collect(),
            references: IndexMap::new(),
        }
    }
}

pub struct ClosurePass<'a> {
    arena: &'a NodeArena,
    frames: Vec<Frame>,
    table: ClosureTable,
}

impl<'a> ClosurePass<'a> {
    pub fn new(arena: &'a NodeArena) -> Self {
        ClosurePass {
            arena,
            frames: Vec::new(),
            table: ClosureTable::default(),
        }
    }

    /// Scan every body and initializer of a class.
    pub fn scan_class(&mut self, class: &ClassDecl) {
        for member in &class.members {
            match member {
                ClassMember::Property(prop) => {
                    if let Some(init) = prop.initializer {
                        self.scan_member(&[], &[init]);
                    }
                }
                ClassMember::Method(method) => {
                    if let Some(body) = &method.body {
                        self.scan_member(&method.parameters, body);
                    }
                }
                ClassMember::Constructor(ctor) => {
                    if let Some(body) = &ctor.body {
                        self.scan_member(&ctor.parameters, body);
                    }
                }
                ClassMember::Accessor(accessor) => {
                    if let Some(body) = &accessor.body {
                        self.scan_member(accessor.parameter.as_slice(), body);
                    }
                }
            }
        }
    }

    pub fn scan_function(&mut self, function: &FunctionDecl) {
        if let Some(body) = &function.body {
            self.scan_member(&function.parameters, body);
        }
    }

    /// Scan one member body. Its parameters and locals are the outermost
    /// capturable frame.
    pub fn scan_member(&mut self, parameters: &[Parameter], nodes: &[NodeIndex]) {
        self.frames.clear();
        self.frames.push(Frame::new(NodeIndex::NONE, parameters));
        for &node in nodes {
            self.visit(node);
        }
        self.frames.clear();
    }

    pub fn finish(self) -> ClosureTable {
        self.table
    }

    fn declare(&mut self, symbol: SymbolId) {
        if symbol.is_none() {
            return;
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.declared.insert(symbol);
        }
    }

    fn reference(&mut self, symbol: SymbolId, name: &str) {
        if symbol.is_none() || self.frames.len() < 2 {
            return;
        }
        let Some((top, enclosing)) = self.frames.split_last_mut() else {
            return;
        };
        if top.declared.contains(&symbol) {
            return;
        }
        if enclosing.iter().any(|f| f.declared.contains(&symbol)) {
            top.references
                .entry(symbol)
                .or_insert_with(|| name.to_string());
        }
    }

    fn visit_all(&mut self, nodes: &[NodeIndex]) {
        for &node in nodes {
            self.visit(node);
        }
    }

    fn visit_opt(&mut self, node: Option<NodeIndex>) {
        if let Some(node) = node {
            self.visit(node);
        }
    }

    fn visit(&mut self, idx: NodeIndex) {
        let arena = self.arena;
        let Some(node) = arena.get(idx) else {
            return;
        };

        match &node.data {
            NodeData::Identifier(ident) => self.reference(ident.symbol, &ident.name),
            NodeData::PropertyAccess { object, .. } => self.visit(*object),
            NodeData::Binary { left, right, .. } => {
                self.visit(*left);
                self.visit(*right);
            }
            NodeData::Call { callee, arguments } | NodeData::New { callee, arguments } => {
                self.visit(*callee);
                self.visit_all(arguments);
            }
            NodeData::PrefixUnary { operand, .. } | NodeData::PostfixUnary { operand, .. } => {
                self.visit(*operand);
            }
            NodeData::Parenthesized { expression }
            | NodeData::ExpressionStatement { expression } => self.visit(*expression),
            NodeData::ObjectLiteral { properties } => {
                for prop in properties {
                    self.visit(prop.value);
                }
            }
            NodeData::FunctionLiteral(literal) => {
                self.frames.push(Frame::new(idx, &literal.parameters));
                match &literal.body {
                    FunctionBody::Block(statements) => self.visit_all(statements),
                    FunctionBody::Expression(expr) => self.visit(*expr),
                }
                self.close_literal();
            }
            NodeData::Return { expression } => self.visit_opt(*expression),
            NodeData::If {
                condition,
                then_statement,
                else_statement,
            } => {
                self.visit(*condition);
                self.visit(*then_statement);
                self.visit_opt(*else_statement);
            }
            NodeData::For {
                initializer,
                condition,
                incrementor,
                body,
            } => {
                match initializer {
                    Some(ForInitializer::Variables(decls)) => {
                        for decl in decls {
                            self.declare(decl.symbol);
                            self.visit_opt(decl.initializer);
                        }
                    }
                    Some(ForInitializer::Expression(expr)) => self.visit(*expr),
                    None => {}
                }
                self.visit_opt(*condition);
                self.visit_opt(*incrementor);
                self.visit(*body);
            }
            NodeData::While { condition, body } => {
                self.visit(*condition);
                self.visit(*body);
            }
            NodeData::Switch {
                expression,
                clauses,
            } => {
                self.visit(*expression);
                for clause in clauses {
                    self.visit_opt(clause.test);
                    self.visit_all(&clause.statements);
                }
            }
            NodeData::Block { statements } => self.visit_all(statements),
            NodeData::VariableStatement { declarations } => {
                for decl in declarations {
                    self.declare(decl.symbol);
                    self.visit_opt(decl.initializer);
                }
            }
            NodeData::NumericLiteral { .. }
            | NodeData::StringLiteral { .. }
            | NodeData::Keyword { .. }
            | NodeData::Break
            | NodeData::Continue
            | NodeData::Unsupported { .. } => {}
        }
    }

    /// Pop a literal frame, record its captures and hand them to the parent.
    fn close_literal(&mut self) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        let captures: Vec<Capture> = frame
            .references
            .into_iter()
            .filter(|(symbol, _)| !frame.declared.contains(symbol))
            .map(|(symbol, name)| Capture { symbol, name })
            .collect();

        for capture in &captures {
            self.reference(capture.symbol, &capture.name);
        }

        let info = ClosureInfo {
            node: frame.literal,
            name: closure_name(self.arena, frame.literal),
            captures,
        };
        trace!(
            closure = %info.name,
            captures = info.captures.len(),
            "extracted closure"
        );
        self.table.insert(info);
    }
}

#[cfg(test)]
#[path = "../tests/closure.rs"]
mod tests;
