//! Ambient, run-wide concerns: configuration and error types. Everything
//! here is a value object built once per run and then read-only
//! (`spec.md` §9 "Global singletons become value objects").

pub mod config;
pub mod error;
