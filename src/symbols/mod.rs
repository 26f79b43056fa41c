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

//! Symbol table and scope management for the Hexen semantic analyzer.
//!
//! A flat arena of frames (§3.5) rather than a recursive tree: `declare`,
//! `lookup`, and label resolution all walk outward from the current frame
//! via parent indices.

use crate::error::{SemanticError, SourceSpan};
use crate::types::Type;
use std::collections::HashMap;

/// Declared mutability of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    Val,
    Mut,
    /// A `for`/`while` loop's own binding: immutable like `Val`, but
    /// reassignment is reported with a more specific diagnostic (§4.9).
    LoopVar,
}

/// A declared name: variable, parameter, or function.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub ty: Type,
    pub mutability: Mutability,
    pub initialized: bool,
    pub declared_at: SourceSpan,
}

impl Symbol {
    pub fn new(name: String, ty: Type, mutability: Mutability, initialized: bool, declared_at: SourceSpan) -> Self {
        Self { name, ty, mutability, initialized, declared_at }
    }
}

/// A declared function signature, kept alongside the symbol table so calls
/// can be checked before (and independent of) the callee's body analysis.
#[derive(Debug, Clone)]
pub struct FunctionSignature {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Type,
    pub declared_at: SourceSpan,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub is_mut: bool,
    pub ty: Type,
}

/// What role a frame plays, beyond holding declarations.
#[derive(Debug, Clone)]
pub enum FrameTag {
    /// An ordinary block scope (statement block, if/while body, …).
    Plain,
    /// A function body: carries the return type so `return` can be checked.
    Function { return_type: Type },
    /// A `for`/`while` body: carries the optional label and, for array-
    /// producing loops, the element type each `->` must unify with. Points
    /// back to the nearest enclosing function frame for fast return-type
    /// queries (§4.2).
    Loop { label: Option<String>, element_type: Option<Type>, function_frame: usize },
}

#[derive(Debug)]
struct Frame {
    tag: FrameTag,
    symbols: HashMap<String, Symbol>,
    parent: Option<usize>,
}

/// Arena-backed stack of frames implementing `push`/`pop`/`declare`/`lookup`
/// (§3.5, §4.2).
pub struct SymbolTable {
    frames: Vec<Frame>,
    current: usize,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame { tag: FrameTag::Plain, symbols: HashMap::new(), parent: None }],
            current: 0,
        }
    }

    /// Push a new frame as a child of the current one; returns its index.
    pub fn enter_scope(&mut self, tag: FrameTag) -> usize {
        let parent = Some(self.current);
        self.frames.push(Frame { tag, symbols: HashMap::new(), parent });
        self.current = self.frames.len() - 1;
        self.current
    }

    /// Pop back to the parent of the current frame.
    pub fn exit_scope(&mut self) {
        if let Some(parent) = self.frames[self.current].parent {
            self.current = parent;
        }
    }

    /// Declare `symbol` in the current frame. Fails if the name already
    /// exists in this frame (shadowing an outer frame is fine).
    pub fn declare(&mut self, symbol: Symbol) -> Result<(), SemanticError> {
        let frame = &mut self.frames[self.current];
        if let Some(existing) = frame.symbols.get(&symbol.name) {
            return Err(SemanticError::DuplicateDeclaration {
                name: symbol.name,
                span: symbol.declared_at,
                previous: existing.declared_at.clone(),
            });
        }
        frame.symbols.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    /// Look up `name`, walking outward from the current frame.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        let mut idx = Some(self.current);
        while let Some(i) = idx {
            if let Some(sym) = self.frames[i].symbols.get(name) {
                return Some(sym);
            }
            idx = self.frames[i].parent;
        }
        None
    }

    /// Mutable lookup, for recording initialization after a first assignment.
    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        let mut idx = Some(self.current);
        while let Some(i) = idx {
            if self.frames[i].symbols.contains_key(name) {
                return self.frames[i].symbols.get_mut(name);
            }
            idx = self.frames[i].parent;
        }
        None
    }

    /// The return type of the nearest enclosing function frame, if any.
    pub fn enclosing_return_type(&self) -> Option<&Type> {
        let mut idx = Some(self.current);
        while let Some(i) = idx {
            if let FrameTag::Function { return_type } = &self.frames[i].tag {
                return Some(return_type);
            }
            idx = self.frames[i].parent;
        }
        None
    }

    /// Whether the current point lies inside at least one loop frame that is
    /// still within the nearest function frame.
    pub fn in_loop(&self) -> bool {
        self.innermost_loop().is_some()
    }

    fn innermost_loop(&self) -> Option<usize> {
        let mut idx = Some(self.current);
        while let Some(i) = idx {
            if matches!(self.frames[i].tag, FrameTag::Loop { .. }) {
                return Some(i);
            }
            idx = self.frames[i].parent;
        }
        None
    }

    /// Resolve a `break`/`continue` target (§4.2): no label means the
    /// innermost loop frame; a label means the first enclosing loop frame
    /// whose label matches.
    pub fn resolve_loop_label(&self, label: Option<&str>, span: &SourceSpan) -> Result<usize, SemanticError> {
        match label {
            None => self.innermost_loop().ok_or_else(|| SemanticError::BreakOutsideLoop { span: span.clone() }),
            Some(label) => {
                let mut idx = Some(self.current);
                while let Some(i) = idx {
                    if let FrameTag::Loop { label: Some(l), .. } = &self.frames[i].tag {
                        if l == label {
                            return Ok(i);
                        }
                    }
                    idx = self.frames[i].parent;
                }
                Err(SemanticError::UnknownLabel { label: label.to_string(), span: span.clone() })
            }
        }
    }

    /// The element type a `->` inside the given loop frame must unify with.
    pub fn loop_element_type(&self, loop_frame: usize) -> Option<&Type> {
        match &self.frames[loop_frame].tag {
            FrameTag::Loop { element_type, .. } => element_type.as_ref(),
            _ => None,
        }
    }

    /// Enforces uniqueness of `label` among loop frames nested within the
    /// same enclosing function frame before pushing a new loop frame.
    pub fn enter_loop_scope(
        &mut self,
        label: Option<String>,
        element_type: Option<Type>,
        span: &SourceSpan,
    ) -> Result<usize, SemanticError> {
        if let Some(label) = &label {
            let mut idx = Some(self.current);
            while let Some(i) = idx {
                match &self.frames[i].tag {
                    FrameTag::Loop { label: Some(l), .. } if l == label => {
                        return Err(SemanticError::DuplicateLabel { label: label.clone(), span: span.clone() });
                    }
                    FrameTag::Function { .. } => break,
                    _ => {}
                }
                idx = self.frames[i].parent;
            }
        }
        let function_frame = self.function_frame_index().unwrap_or(self.current);
        Ok(self.enter_scope(FrameTag::Loop { label, element_type, function_frame }))
    }

    fn function_frame_index(&self) -> Option<usize> {
        let mut idx = Some(self.current);
        while let Some(i) = idx {
            if matches!(self.frames[i].tag, FrameTag::Function { .. }) {
                return Some(i);
            }
            idx = self.frames[i].parent;
        }
        None
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
