//! High-level operations.
//!
//! This module contains the implementation of the mfront-interfaces commands.

pub mod generate;
pub mod inspect;

pub use generate::{
    generate, load_behaviour, resolve_behaviours, select_interfaces, treat_keywords,
    GenerateOptions, GenerateResult,
};
pub use inspect::{format_summaries, list_interfaces, treated_hypotheses, InterfaceSummary};
