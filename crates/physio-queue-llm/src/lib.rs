//! LLM wrapper for AI-assisted desk-entry parsing.
//!
//! This crate turns free-form front-desk input into a structured
//! (name, memo) pair using a small local model via llama.cpp bindings.
//! Extraction is best-effort: any failure here means the caller falls back
//! to the deterministic parser in `physio-queue-core`, which is total.

pub mod extraction;
pub mod prompts;

pub use extraction::*;
pub use prompts::*;
