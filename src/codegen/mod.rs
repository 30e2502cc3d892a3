//! C++ emission.
//!
//! Interfaces build structured plans (component maps, conversion steps,
//! symbol tables, MTest dumps); this module turns them into text.

pub mod conventions;
pub mod mtest;
pub mod pipeline;
pub mod symbols;
pub mod writer;

pub use conventions::{ComponentMap, TensorConvention, TensorKind};
pub use pipeline::{ConversionPipeline, ConversionStep};
pub use symbols::{Symbol, SymbolTable, SymbolValue, SymbolsGenerator};
pub use writer::CxxWriter;
