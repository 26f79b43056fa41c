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

//! Array pass-by-value / explicit-copy discipline (§3.4, §4.8).
//!
//! Shape algebra itself (`resolve_shape`, `check_convert`) lives in
//! `crate::types`; this module only decides *when* `[..]` is syntactically
//! required before a concrete array flows into a new owner.

use crate::ast::{Expression, ExprKind};

/// Whether `expr`, stripped of any `:T` conversion wrapper, is already
/// exempt from the copy requirement: a fresh array literal, a fresh call
/// result, or already wrapped in `[..]`.
fn is_exempt(expr: &Expression) -> bool {
    match &expr.kind {
        ExprKind::ArrayCopy(_) | ExprKind::ArrayLit(_) | ExprKind::Call { .. } => true,
        ExprKind::Conversion { expr: inner, .. } => is_exempt(inner),
        _ => false,
    }
}

/// §4.7 call-argument rule: a concrete array parameter always requires the
/// argument to be an explicit copy (or exempt), regardless of whether a
/// shape conversion is also happening.
pub(super) fn call_argument_missing_copy(expr: &Expression) -> bool {
    !is_exempt(expr)
}

/// §3.4 variable-initializer rule: a concrete array flowing into a new
/// owner only requires `[..]` when the initializer itself is a `:T`
/// conversion (the "any conversion or flattening" trigger) and the result
/// is a concrete array. A plain same-type move (no `:T` wrapper) needs no
/// copy.
pub(super) fn initializer_missing_copy(expr: &Expression, source_is_concrete_array: bool, conversion_happens: bool) -> bool {
    source_is_concrete_array && conversion_happens && !is_exempt(expr)
}
