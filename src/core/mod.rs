//! Core library components.
//!
//! Document model, path handling, the secure-value processor and the file
//! plumbing around it. Nothing in here prints; the CLI owns all output.

pub mod action;
pub mod batch;
pub mod cipher;
pub mod config;
pub mod constants;
pub mod document;
pub mod path;
pub mod pillar;
pub mod processor;
pub mod store;
