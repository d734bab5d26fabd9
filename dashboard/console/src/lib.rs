//! Chanda collection console.
//!
//! Library half of the `chanda` binary: a typed client for the Chanda REST
//! backend plus the contribution capture workflow (reference data, form,
//! preview gate, submission) and the list views built on top of it.

pub mod api;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod form;
pub mod gate;
pub mod loader;
pub mod models;
pub mod output;
pub mod session;
pub mod submit;
pub mod table;
pub mod validation;
pub mod workflow;
