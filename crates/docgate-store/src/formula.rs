// docgate-store/src/formula.rs
// ============================================================================
// Module: Filter Formulas
// Description: Deterministic query-formula construction for the store.
// Purpose: Build exact-match predicates with escaped string literals.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Predicates are textual boolean expressions over field equality using
//! single-quoted string literals. Embedded quotes are backslash-escaped.
//! The store's formula dialect varies across field-name casing and quoting
//! edge cases that cannot be fully validated client-side; the adapter pairs
//! every formula built here with an equivalent in-process predicate for the
//! fallback scan.

/// Canonical lower-case label matched by the approved-set predicate.
pub const APPROVED_STATUS: &str = "approved";

/// Escapes a string literal for use inside single quotes.
#[must_use]
pub fn escape_literal(value: &str) -> String {
    value.replace('\'', "\\'")
}

/// Builds the match-by-project predicate.
#[must_use]
pub fn by_project(project: &str) -> String {
    format!("{{project}}='{}'", escape_literal(project))
}

/// Builds the match-by-project-and-slug conjunction.
#[must_use]
pub fn by_project_and_slug(project: &str, slug: &str) -> String {
    format!(
        "AND({{project}}='{}', {{slug}}='{}')",
        escape_literal(project),
        escape_literal(slug)
    )
}

/// Builds the case-insensitive approved-status predicate.
#[must_use]
pub fn approved_status() -> String {
    format!("LOWER({{status}})='{APPROVED_STATUS}'")
}

/// Builds the approved-status predicate restricted to one project.
#[must_use]
pub fn approved_in_project(project: &str) -> String {
    format!("AND({}, {})", by_project(project), approved_status())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
