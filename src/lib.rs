//! `Nivesh` - An investment platform backend.
//!
//! This crate provides the complete server for a plan-based investment
//! product: registration and login, a purchasable plan catalog, a two-pool
//! balance ledger (non-withdrawable recharge funds and withdrawable profit),
//! daily profit accrual, recharge/withdrawal request workflows, referrals,
//! and an admin console.

// Deny the most critical lints that could lead to bugs or security issues
#![deny(
    // Security and correctness
    unsafe_code,
    unsafe_op_in_unsafe_fn,

    // Code quality - things that are almost always bugs
    unreachable_code,
    unreachable_patterns,
    unused_must_use,

    // Documentation - broken links are bugs
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
// Warn on things that should be fixed but aren't necessarily bugs
#![warn(
    missing_docs,

    // Clippy categories for overall code quality
    clippy::all,
    clippy::pedantic,

    // Performance
    clippy::inefficient_to_string,
    clippy::needless_pass_by_value,

    // Correctness
    clippy::dbg_macro,
    clippy::float_cmp,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,

    // Future compatibility
    future_incompatible,
    rust_2018_idioms,
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,  // Common pattern in Rust
    clippy::missing_errors_doc,        // Will add gradually
    clippy::missing_panics_doc,        // Will add gradually
)]

/// HTTP surface - routers, handlers, and auth guards
pub mod api;
/// Credential boundary - password hashing and session tokens
pub mod auth;
/// Configuration management, database setup, and first-run seeding
pub mod config;
/// Core business logic - the framework-agnostic ledger operations
pub mod core;
/// SeaORM entity definitions for database tables
pub mod entities;
/// Unified error types and result handling
pub mod errors;

#[cfg(test)]
pub mod test_utils;
