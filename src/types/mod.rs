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

//! The Hexen type lattice.
//!
//! Pure data and pairwise rules: no symbol table, no AST, no diagnostics.
//! The semantic analyzer attaches spans and messages around the outcomes
//! computed here.

use std::fmt;

/// Concrete primitive types (present at runtime).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Primitive {
    I32,
    I64,
    F32,
    F64,
    Bool,
    String,
    Void,
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Primitive::I32 => "i32",
            Primitive::I64 => "i64",
            Primitive::F32 => "f32",
            Primitive::F64 => "f64",
            Primitive::Bool => "bool",
            Primitive::String => "string",
            Primitive::Void => "void",
        };
        write!(f, "{s}")
    }
}

impl Primitive {
    pub fn is_integer(self) -> bool {
        matches!(self, Primitive::I32 | Primitive::I64)
    }

    pub fn is_float(self) -> bool {
        matches!(self, Primitive::F32 | Primitive::F64)
    }

    pub fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float()
    }
}

/// The element kind of a comptime array, known from the literal's leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum NumericKind {
    Int,
    Float,
}

/// A single array dimension: either a known size or the `_` wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Dimension {
    Fixed(usize),
    Inferred,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Fixed(n) => write!(f, "[{n}]"),
            Dimension::Inferred => write!(f, "[_]"),
        }
    }
}

/// The Hexen type lattice (§3.1): primitives, comptime scalars, concrete and
/// comptime arrays, ranges, and the two internal sentinels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Type {
    Primitive(Primitive),
    ComptimeInt,
    ComptimeFloat,
    Array { element: Box<Type>, dims: Vec<Dimension> },
    ComptimeArray { kind: NumericKind, dims: Vec<usize> },
    Range { element: Box<Type>, bounded: bool },
    /// Error-recovery sentinel; propagates silently without further diagnostics.
    Unknown,
    /// Only valid as a declaration initializer.
    Undef,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(p) => write!(f, "{p}"),
            Type::ComptimeInt => write!(f, "comptime_int"),
            Type::ComptimeFloat => write!(f, "comptime_float"),
            Type::Array { element, dims } => {
                for d in dims {
                    write!(f, "{d}")?;
                }
                write!(f, "{element}")
            }
            Type::ComptimeArray { kind, dims } => {
                for d in dims {
                    write!(f, "[{d}]")?;
                }
                match kind {
                    NumericKind::Int => write!(f, "comptime_int"),
                    NumericKind::Float => write!(f, "comptime_float"),
                }
            }
            Type::Range { element, bounded } => {
                write!(f, "range<{element}>{}", if *bounded { "" } else { " (unbounded)" })
            }
            Type::Unknown => write!(f, "<unknown>"),
            Type::Undef => write!(f, "undef"),
        }
    }
}

impl Type {
    pub fn i32() -> Type { Type::Primitive(Primitive::I32) }
    pub fn i64() -> Type { Type::Primitive(Primitive::I64) }
    pub fn f32() -> Type { Type::Primitive(Primitive::F32) }
    pub fn f64() -> Type { Type::Primitive(Primitive::F64) }
    pub fn bool() -> Type { Type::Primitive(Primitive::Bool) }
    pub fn string() -> Type { Type::Primitive(Primitive::String) }
    pub fn void() -> Type { Type::Primitive(Primitive::Void) }

    pub fn is_numeric(&self) -> bool {
        match self {
            Type::Primitive(p) => p.is_numeric(),
            Type::ComptimeInt | Type::ComptimeFloat => true,
            _ => false,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Primitive(p) if p.is_integer()) || matches!(self, Type::ComptimeInt)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Type::Primitive(p) if p.is_float()) || matches!(self, Type::ComptimeFloat)
    }

    pub fn is_comptime(&self) -> bool {
        matches!(self, Type::ComptimeInt | Type::ComptimeFloat | Type::ComptimeArray { .. })
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Type::Primitive(Primitive::Bool))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Type::Primitive(Primitive::String))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array { .. } | Type::ComptimeArray { .. })
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    /// The element type one access/iteration step down, or `None` if not an array.
    pub fn element_type(&self) -> Option<Type> {
        match self {
            Type::Array { element, dims } if dims.len() > 1 => Some(Type::Array {
                element: element.clone(),
                dims: dims[1..].to_vec(),
            }),
            Type::Array { element, .. } => Some((**element).clone()),
            Type::ComptimeArray { kind, dims } if dims.len() > 1 => Some(Type::ComptimeArray {
                kind: *kind,
                dims: dims[1..].to_vec(),
            }),
            Type::ComptimeArray { kind, .. } => Some(match kind {
                NumericKind::Int => Type::ComptimeInt,
                NumericKind::Float => Type::ComptimeFloat,
            }),
            _ => None,
        }
    }

    /// The leading dimension's size, if statically known (§4.4 `.length`).
    pub fn leading_dimension(&self) -> Option<usize> {
        match self {
            Type::Array { dims, .. } => match dims.first() {
                Some(Dimension::Fixed(n)) => Some(*n),
                _ => None,
            },
            Type::ComptimeArray { dims, .. } => dims.first().copied(),
            _ => None,
        }
    }

    /// Total scalar-leaf count, used by the array conversion/shape algebra (§3.3, §4.8).
    /// `None` when any dimension is not statically known.
    pub fn total_elements(&self) -> Option<usize> {
        match self {
            Type::Array { dims, .. } => dims.iter().try_fold(1usize, |acc, d| match d {
                Dimension::Fixed(n) => Some(acc * n),
                Dimension::Inferred => None,
            }),
            Type::ComptimeArray { dims, .. } => Some(dims.iter().product()),
            _ => None,
        }
    }
}

/// Outcome of [`unify_literal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnifyError {
    /// A float literal met an integer context without an explicit conversion.
    FloatNeedsExplicitForInt,
    /// The context type is not a numeric type a literal can adapt to.
    Incompatible,
}

/// §4.1 `unify_literal`: resolve a comptime literal's type against an optional
/// target context.
pub fn unify_literal(target: Option<&Type>, literal: &Type) -> Result<Type, UnifyError> {
    let Some(target) = target else {
        return Ok(literal.clone());
    };
    if !target.is_numeric() {
        return Err(UnifyError::Incompatible);
    }
    match literal {
        Type::ComptimeInt => Ok(target.clone()),
        Type::ComptimeFloat => {
            if target.is_integer() {
                Err(UnifyError::FloatNeedsExplicitForInt)
            } else {
                Ok(target.clone())
            }
        }
        other => Ok(other.clone()),
    }
}

/// Outcome of [`check_convert`] on success: whether a runtime conversion must
/// be inserted (false for identity and comptime materialization).
pub type NeedsRuntimeConversion = bool;

/// Outcome of a successful [`check_convert`]. `resolved_dims` is set only
/// when the target was an array shape containing an `_` (§4.8): the shape
/// solver's answer, to be substituted for the target's literal `Inferred`
/// dims by the caller rather than left unresolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOutcome {
    pub needs_runtime_conversion: NeedsRuntimeConversion,
    pub resolved_dims: Option<Vec<usize>>,
}

impl ConvertOutcome {
    fn identity() -> Self {
        ConvertOutcome { needs_runtime_conversion: false, resolved_dims: None }
    }

    fn runtime() -> Self {
        ConvertOutcome { needs_runtime_conversion: true, resolved_dims: None }
    }

    fn shape(needs_runtime_conversion: NeedsRuntimeConversion, dims: Vec<usize>) -> Self {
        ConvertOutcome { needs_runtime_conversion, resolved_dims: Some(dims) }
    }
}

/// Builds the type a conversion/assignment actually produces: `target` with
/// any `_` dims filled in by the shape solver, or `target` unchanged when
/// there was nothing to resolve (§3.3, §4.8, Scenario E).
pub fn resolved_type(target: &Type, outcome: &ConvertOutcome) -> Type {
    match (target, &outcome.resolved_dims) {
        (Type::Array { element, .. }, Some(dims)) => {
            Type::Array { element: element.clone(), dims: dims.iter().map(|n| Dimension::Fixed(*n)).collect() }
        }
        _ => target.clone(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// Defined only as an explicit conversion, but `explicit` was false.
    RequiresExplicit,
    /// No conversion exists between these types under any mode (bool/string mixing).
    Nonsensical,
    /// Array shapes don't reconcile; carries source/target element counts.
    ShapeMismatch { source_count: usize, target_count: usize },
    /// More than one inferred `_` and the source shape does not resolve it.
    MultiInferredAmbiguous,
}

/// §4.1 `check_convert`: applies the scalar table (§3.2) and the array shape
/// algebra (§3.3).
pub fn check_convert(source: &Type, target: &Type, explicit: bool) -> Result<ConvertOutcome, ConvertError> {
    if source == target {
        return Ok(ConvertOutcome::identity());
    }

    match (source, target) {
        (Type::ComptimeInt, t) if t.is_numeric() => Ok(ConvertOutcome::identity()),
        (Type::ComptimeFloat, t) if t.is_float() => Ok(ConvertOutcome::identity()),
        (Type::ComptimeFloat, t) if t.is_integer() => {
            if explicit { Ok(ConvertOutcome::runtime()) } else { Err(ConvertError::RequiresExplicit) }
        }
        (a, b) if a.is_numeric() && b.is_numeric() => {
            if explicit { Ok(ConvertOutcome::runtime()) } else { Err(ConvertError::RequiresExplicit) }
        }
        (a, b) if (a.is_bool() && b.is_numeric()) || (a.is_numeric() && b.is_bool()) => {
            Err(ConvertError::Nonsensical)
        }
        (a, b) if (a.is_string() && (b.is_numeric() || b.is_bool())) || (b.is_string() && (a.is_numeric() || a.is_bool())) => {
            Err(ConvertError::Nonsensical)
        }
        (Type::ComptimeArray { kind, dims }, Type::Array { element, dims: target_dims }) => {
            check_array_conversion(dims.iter().product(), element, *kind, target_dims, explicit)
        }
        (Type::Array { element: source_element, dims }, Type::Array { element, dims: target_dims }) => {
            // §4.7: a target shape with an inferred `_` dimension accepts any
            // source size whose element type already matches — this is the
            // "any size is accepted" rule for `[_]T` parameters/targets, not
            // a reshape, so it needs no explicit `:[...]T` syntax.
            let target_has_inferred = target_dims.iter().any(|d| matches!(d, Dimension::Inferred));
            let same_element = source_element == element;
            if !explicit && !(target_has_inferred && same_element) {
                // §3.3 point 3 / §3.4: a concrete array reshaping into a
                // different shape is "flattening" and always requires the
                // explicit `:[...]T` syntax otherwise — there is no silent
                // flatten.
                return Err(ConvertError::RequiresExplicit);
            }
            let Some(total) = dims.iter().try_fold(1usize, |acc, d| match d {
                Dimension::Fixed(n) => Some(acc * n),
                Dimension::Inferred => None,
            }) else {
                return Err(ConvertError::ShapeMismatch { source_count: 0, target_count: 0 });
            };
            check_array_conversion_elem(total, element, target_dims)
        }
        _ => Err(ConvertError::Nonsensical),
    }
}

fn check_array_conversion(
    total: usize,
    _element_kind: NumericKind,
    _kind: NumericKind,
    target_dims: &[Dimension],
    _explicit: bool,
) -> Result<ConvertOutcome, ConvertError> {
    resolve_shape(total, target_dims)
        .map(|dims| ConvertOutcome::shape(false, dims))
        .ok_or_else(|| shape_error(total, target_dims))
}

fn check_array_conversion_elem(
    total: usize,
    _target_element: &Type,
    target_dims: &[Dimension],
) -> Result<ConvertOutcome, ConvertError> {
    resolve_shape(total, target_dims)
        .map(|dims| ConvertOutcome::shape(false, dims))
        .ok_or_else(|| shape_error(total, target_dims))
}

fn shape_error(total: usize, target_dims: &[Dimension]) -> ConvertError {
    let inferred_count = target_dims.iter().filter(|d| matches!(d, Dimension::Inferred)).count();
    if inferred_count > 1 {
        ConvertError::MultiInferredAmbiguous
    } else {
        let known_product: usize = target_dims
            .iter()
            .map(|d| match d {
                Dimension::Fixed(n) => *n,
                Dimension::Inferred => 1,
            })
            .product();
        ConvertError::ShapeMismatch { source_count: total, target_count: known_product }
    }
}

/// §9 design note: a small, total shape solver. Given the source's total
/// scalar-leaf count and a target dimension list with at most one `_`,
/// returns the fully resolved dimension list, or `None` with the caller
/// expected to render a `ShapeMismatch`/`MultiInferredAmbiguous` diagnostic.
pub fn resolve_shape(source_total: usize, target_dims: &[Dimension]) -> Option<Vec<usize>> {
    let inferred = target_dims.iter().filter(|d| matches!(d, Dimension::Inferred)).count();
    if inferred > 1 {
        return None;
    }

    let known_product: usize = target_dims
        .iter()
        .map(|d| match d {
            Dimension::Fixed(n) => *n,
            Dimension::Inferred => 1,
        })
        .product();

    if inferred == 0 {
        return (known_product == source_total).then(|| {
            target_dims
                .iter()
                .map(|d| match d {
                    Dimension::Fixed(n) => *n,
                    Dimension::Inferred => unreachable!(),
                })
                .collect()
        });
    }

    if known_product == 0 || source_total % known_product != 0 {
        return None;
    }
    let filled = source_total / known_product;
    Some(
        target_dims
            .iter()
            .map(|d| match d {
                Dimension::Fixed(n) => *n,
                Dimension::Inferred => filled,
            })
            .collect(),
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryTypeError {
    /// Two different concrete types met without an explicit conversion.
    MixedConcrete { left: Type, right: Type },
    NotNumeric,
}

/// §4.1 `widen_binary` / §4.4 arithmetic promotion: resolves the result type
/// of a binary numeric operator given both already-analyzed operand types.
pub fn widen_binary(lhs: &Type, rhs: &Type, ctx: Option<&Type>) -> Result<Type, BinaryTypeError> {
    if !lhs.is_numeric() || !rhs.is_numeric() {
        return Err(BinaryTypeError::NotNumeric);
    }

    match (lhs, rhs) {
        (Type::ComptimeInt, Type::ComptimeInt) => resolve_comptime(Type::ComptimeInt, ctx),
        (Type::ComptimeFloat, Type::ComptimeFloat)
        | (Type::ComptimeInt, Type::ComptimeFloat)
        | (Type::ComptimeFloat, Type::ComptimeInt) => resolve_comptime(Type::ComptimeFloat, ctx),

        (comptime, concrete) if comptime.is_comptime() && !concrete.is_comptime() => Ok(concrete.clone()),
        (concrete, comptime) if comptime.is_comptime() && !concrete.is_comptime() => Ok(concrete.clone()),

        (a, b) if a == b => Ok(a.clone()),
        (a, b) => Err(BinaryTypeError::MixedConcrete { left: a.clone(), right: b.clone() }),
    }
}

fn resolve_comptime(comptime: Type, ctx: Option<&Type>) -> Result<Type, BinaryTypeError> {
    match ctx {
        Some(t) if t.is_numeric() => match unify_literal(Some(t), &comptime) {
            Ok(resolved) => Ok(resolved),
            Err(_) => Ok(comptime),
        },
        _ => Ok(comptime),
    }
}
