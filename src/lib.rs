//! mfront-interfaces - Interface generators binding material behaviours to finite element solvers
//!
//! This crate provides the code generation back end turning a behaviour
//! description into the C++ glue each solver calls, together with the
//! build manifest describing the libraries to compile.

pub mod codegen;
pub mod core;
pub mod interfaces;
pub mod ops;
pub mod util;

/// Test utilities for the interface generators.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides behaviour fixtures and a recording lock.
#[cfg(test)]
pub mod test_support;

pub use core::{
    behaviour::BehaviourDescription, hypothesis::ModellingHypothesis,
    targets::TargetsDescription,
};

pub use interfaces::{GenerationError, HostId, Interface, InterfaceRegistry};
pub use util::context::GenerationContext;
