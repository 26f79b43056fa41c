// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Abstract syntax tree for Hexen programs (§3.7, §6.1).
//!
//! The parser is an external collaborator; this module only defines the
//! contract it must produce. Every node carries a `SourceSpan`. Type
//! positions (parameter types, declared types, conversion targets) are
//! already resolved to [`crate::types::Type`] by the parser, since the
//! primitive/array-shape grammar maps directly onto the type lattice.

use crate::error::SourceSpan;
use crate::types::Type;
use serde::{Deserialize, Serialize};

/// Stable identity for an expression node, used by the analyzer to attach a
/// resolved type without mutating the AST in place (§6.3 "annotated ast").
pub type NodeId = u32;

/// A name as written in source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier {
    pub name: String,
    pub span: SourceSpan,
}

impl Identifier {
    pub fn new(name: impl Into<String>, span: SourceSpan) -> Self {
        Self { name: name.into(), span }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Mod,
    FloatDiv,
    IntDiv,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// A whole program: an ordered list of top-level function declarations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub items: Vec<FuncDecl>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Param {
    pub name: Identifier,
    pub is_mut: bool,
    pub ty: Type,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuncDecl {
    pub id: NodeId,
    pub name: Identifier,
    pub params: Vec<Param>,
    pub return_type: Type,
    pub body: Block,
    pub span: SourceSpan,
}

/// A brace-delimited sequence of statements (§4.6). Whether it is a function
/// body, a statement block, or an expression block is determined by the
/// position it appears in, not by a tag on the node itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub id: NodeId,
    pub stmts: Vec<Statement>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statement {
    pub id: NodeId,
    pub kind: StmtKind,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StmtKind {
    ValDecl { name: Identifier, ty: Option<Type>, init: Expression },
    MutDecl { name: Identifier, ty: Type, init: Expression },
    Assign { lhs: Expression, rhs: Expression },
    Return { value: Option<Expression> },
    /// `->`, the block/loop-iteration value producer.
    Produce { value: Expression },
    If { cond: Expression, then_block: Block, else_block: Option<Block> },
    Break { label: Option<String> },
    Continue { label: Option<String> },
    /// A statement block used purely for scoping, or an expression evaluated
    /// for its side effects (here: a call).
    ExprStmt(Expression),
    StmtBlock(Block),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expression {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExprKind {
    IntLit(i64),
    FloatLit(f64),
    BoolLit(bool),
    StrLit(String),
    Undef,
    Identifier(String),
    Binary { op: BinaryOp, left: Box<Expression>, right: Box<Expression> },
    Unary { op: UnaryOp, operand: Box<Expression> },
    /// `expr:T`
    Conversion { expr: Box<Expression>, target: Type },
    ArrayLit(Vec<Expression>),
    ArrayAccess { array: Box<Expression>, index: Box<Expression> },
    /// `expr[..]`
    ArrayCopy(Box<Expression>),
    /// `expr.name` — the only Hexen property today is `.length`.
    PropertyAccess { object: Box<Expression>, name: String },
    Range { lo: Box<Expression>, hi: Option<Box<Expression>>, inclusive: bool, step: Option<Box<Expression>> },
    Call { callee: Identifier, args: Vec<Expression> },
    ExprBlock(Block),
    /// `for x [: T] in iter { body }` — a statement when analyzed with no
    /// context, an array-producing expression when analyzed against an
    /// array target type (§4.9, unified with block semantics).
    ForIn { var: Identifier, var_type: Option<Type>, iter: Box<Expression>, body: Block, label: Option<String> },
    /// `while cond { body }` — statement-only; never produces a value.
    While { cond: Box<Expression>, body: Block, label: Option<String> },
}

impl Expression {
    pub fn new(id: NodeId, kind: ExprKind, span: SourceSpan) -> Self {
        Self { id, kind, span }
    }
}

/// What an identifier use or declaration resolved to: the symbol's declared
/// name, type, and declaration site. Lighter than [`crate::symbols::Symbol`]
/// (no mutability/initialization bookkeeping) since it only needs to answer
/// "what does this node refer to" for a consumer of the annotated AST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRef {
    pub name: String,
    pub ty: Type,
    pub declared_at: SourceSpan,
}

/// Attaches a resolved type to every expression node and a symbol reference
/// for every identifier use, keyed by [`NodeId`] rather than mutating the
/// tree in place (§6.3).
#[derive(Debug, Clone, Default)]
pub struct Annotations {
    pub types: std::collections::HashMap<NodeId, Type>,
    pub symbols: std::collections::HashMap<NodeId, SymbolRef>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, id: NodeId, ty: Type) {
        self.types.insert(id, ty);
    }

    pub fn type_of(&self, id: NodeId) -> Option<&Type> {
        self.types.get(&id)
    }

    pub fn record_symbol(&mut self, id: NodeId, symbol: SymbolRef) {
        self.symbols.insert(id, symbol);
    }

    pub fn symbol_of(&self, id: NodeId) -> Option<&SymbolRef> {
        self.symbols.get(&id)
    }
}
