//! Core data structures.
//!
//! This module contains the description of a behaviour as handed over by
//! the front end, and the algebra the interfaces build on:
//! - Modelling hypotheses and packed type sizes
//! - Behaviour descriptions and finite strain strategies
//! - Material properties lists
//! - The build manifest

pub mod behaviour;
pub mod file_description;
pub mod finite_strain;
pub mod hypothesis;
pub mod material_properties;
pub mod targets;
pub mod type_size;

pub use behaviour::{BehaviourDescription, BehaviourType, SymmetryType};
pub use file_description::FileDescription;
pub use finite_strain::FiniteStrainStrategy;
pub use hypothesis::ModellingHypothesis;
pub use material_properties::MaterialPropertiesList;
pub use targets::{ManifestFormat, TargetsDescription};
pub use type_size::{TypeSize, VariableType};
