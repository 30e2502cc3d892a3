//! Behaviour descriptions.
//!
//! A [`BehaviourDescription`] is the read-only input of every interface. It
//! is produced by the DSL front end; this crate deserializes it from TOML.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use miette::{Diagnostic as MietteDiagnostic, NamedSource, SourceSpan};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::file_description::FileDescription;
use crate::core::hypothesis::ModellingHypothesis;
use crate::core::type_size::{TypeSize, VariableType};
use crate::interfaces::errors::GenerationError;

/// Well-known attribute keys.
pub mod attributes {
    pub const REQUIRES_STIFFNESS_TENSOR: &str = "requiresStiffnessTensor";
    pub const REQUIRES_UNALTERED_STIFFNESS_TENSOR: &str = "requiresUnAlteredStiffnessTensor";
    pub const REQUIRES_THERMAL_EXPANSION_COEFFICIENT_TENSOR: &str =
        "requiresThermalExpansionCoefficientTensor";
    pub const STRAIN_MEASURE: &str = "strainMeasure";
    pub const FINITE_STRAIN_STRATEGY: &str = "finiteStrainStrategy";
    pub const COMPUTES_STORED_ENERGY: &str = "computesStoredEnergy";
    pub const COMPUTES_DISSIPATED_ENERGY: &str = "computesDissipatedEnergy";
}

/// Kind of constitutive law.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviourType {
    StandardStrainBasedBehaviour,
    StandardFiniteStrainBehaviour,
    CohesiveZoneModel,
    General,
}

impl BehaviourType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BehaviourType::StandardStrainBasedBehaviour => "StandardStrainBasedBehaviour",
            BehaviourType::StandardFiniteStrainBehaviour => "StandardFiniteStrainBehaviour",
            BehaviourType::CohesiveZoneModel => "CohesiveZoneModel",
            BehaviourType::General => "General",
        }
    }

    /// Code of the `_BehaviourType` symbol.
    pub fn symbol_code(&self) -> i32 {
        match self {
            BehaviourType::General => 0,
            BehaviourType::StandardStrainBasedBehaviour => 1,
            BehaviourType::StandardFiniteStrainBehaviour => 2,
            BehaviourType::CohesiveZoneModel => 3,
        }
    }

    /// Enumerator of `tfel::material::MechanicalBehaviourBase`.
    pub fn tfel_enumerator(&self) -> &'static str {
        match self {
            BehaviourType::StandardStrainBasedBehaviour => "STANDARDSTRAINBASEDBEHAVIOUR",
            BehaviourType::StandardFiniteStrainBehaviour => "STANDARDFINITESTRAINBEHAVIOUR",
            BehaviourType::CohesiveZoneModel => "COHESIVEZONEMODEL",
            BehaviourType::General => "GENERALBEHAVIOUR",
        }
    }
}

impl std::fmt::Display for BehaviourType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Material or elastic symmetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SymmetryType {
    #[default]
    Isotropic,
    Orthotropic,
}

impl SymmetryType {
    pub fn symbol_code(&self) -> i32 {
        match self {
            SymmetryType::Isotropic => 0,
            SymmetryType::Orthotropic => 1,
        }
    }

    pub fn tfel_enumerator(&self) -> &'static str {
        match self {
            SymmetryType::Isotropic => "ISOTROPIC",
            SymmetryType::Orthotropic => "ORTHOTROPIC",
        }
    }
}

/// Strain measure declared by a strain-based behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrainMeasure {
    Linearised,
    GreenLagrange,
    Hencky,
}

impl StrainMeasure {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrainMeasure::Linearised => "Linearised",
            StrainMeasure::GreenLagrange => "GreenLagrange",
            StrainMeasure::Hencky => "Hencky",
        }
    }
}

impl std::str::FromStr for StrainMeasure {
    type Err = GenerationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Linearised" | "Linearized" => Ok(StrainMeasure::Linearised),
            "GreenLagrange" => Ok(StrainMeasure::GreenLagrange),
            "Hencky" => Ok(StrainMeasure::Hencky),
            _ => Err(GenerationError::InvalidKeywordValue {
                keyword: attributes::STRAIN_MEASURE.to_string(),
                value: s.to_string(),
                expected: "Linearised, GreenLagrange or Hencky".to_string(),
            }),
        }
    }
}

/// Physical or user bounds of a variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    #[serde(default)]
    pub lower: Option<f64>,
    #[serde(default)]
    pub upper: Option<f64>,
}

/// A declared variable (material property, state variable, parameter...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDescription {
    /// Name used inside the behaviour code.
    pub name: String,

    /// TFEL type name (`real`, `StrainStensor`...).
    #[serde(rename = "type", default = "default_type_name")]
    pub type_name: String,

    /// Glossary name, used as external name when present.
    #[serde(default)]
    pub glossary: Option<String>,

    /// Array size (1 for plain variables).
    #[serde(default = "default_array_size")]
    pub array_size: u16,

    /// Bounds checked by the generated code.
    #[serde(default)]
    pub bounds: Option<Bounds>,

    /// Default value, only meaningful for parameters.
    #[serde(default)]
    pub default_value: Option<f64>,
}

fn default_type_name() -> String {
    "real".to_string()
}

fn default_array_size() -> u16 {
    1
}

impl VariableDescription {
    /// Create a scalar variable.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        VariableDescription {
            name: name.into(),
            type_name: type_name.into(),
            glossary: None,
            array_size: 1,
            bounds: None,
            default_value: None,
        }
    }

    /// Set the glossary name.
    pub fn with_glossary(mut self, glossary: impl Into<String>) -> Self {
        self.glossary = Some(glossary.into());
        self
    }

    /// Set the array size.
    pub fn with_array_size(mut self, n: u16) -> Self {
        self.array_size = n;
        self
    }

    /// Set a default value.
    pub fn with_default_value(mut self, v: f64) -> Self {
        self.default_value = Some(v);
        self
    }

    /// Set bounds.
    pub fn with_bounds(mut self, lower: Option<f64>, upper: Option<f64>) -> Self {
        self.bounds = Some(Bounds { lower, upper });
        self
    }

    pub fn variable_type(&self) -> VariableType {
        VariableType::from_type_name(&self.type_name)
    }

    /// Name seen by host codes and reflection tooling.
    pub fn external_name(&self) -> &str {
        self.glossary.as_deref().unwrap_or(&self.name)
    }

    /// Packed size of the whole variable.
    pub fn type_size(&self) -> TypeSize {
        TypeSize::of(self.variable_type(), self.array_size)
    }

    /// External names with array entries expanded (`name[0]`, `name[1]`...).
    pub fn expanded_external_names(&self) -> Vec<String> {
        if self.array_size <= 1 {
            vec![self.external_name().to_string()]
        } else {
            (0..self.array_size)
                .map(|i| format!("{}[{}]", self.external_name(), i))
                .collect()
        }
    }
}

/// Per-hypothesis variables of a behaviour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviourData {
    pub material_properties: Vec<VariableDescription>,
    /// Persistent variables, i.e. the state variables saved by the host.
    pub state_variables: Vec<VariableDescription>,
    /// External state variables; the temperature is always implicit.
    pub external_state_variables: Vec<VariableDescription>,
    pub parameters: Vec<VariableDescription>,
}

impl BehaviourData {
    /// Packed size of the state variables.
    pub fn state_variables_size(&self) -> TypeSize {
        self.state_variables
            .iter()
            .fold(TypeSize::default(), |acc, v| acc + v.type_size())
    }

    /// Packed size of the external state variables (temperature excluded).
    pub fn external_state_variables_size(&self) -> TypeSize {
        self.external_state_variables
            .iter()
            .fold(TypeSize::default(), |acc, v| acc + v.type_size())
    }
}

/// Typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Float(f64),
    String(String),
}

/// Gradient / thermodynamic force pair of a general behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainVariable {
    pub gradient: VariableDescription,
    pub force: VariableDescription,
}

/// Abstract description of a constitutive law.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviourDescription {
    /// Class name of the generated behaviour.
    pub class_name: String,

    #[serde(default)]
    pub material: Option<String>,

    /// Library the generated sources belong to.
    #[serde(default)]
    pub library: Option<String>,

    /// Name of the DSL used to write the behaviour.
    #[serde(default = "default_dsl")]
    pub dsl: String,

    pub behaviour_type: BehaviourType,

    #[serde(default)]
    pub symmetry: SymmetryType,

    /// Defaults to `symmetry` when absent.
    #[serde(default)]
    pub elastic_symmetry: Option<SymmetryType>,

    /// Hypotheses supported by the behaviour.
    pub hypotheses: BTreeSet<ModellingHypothesis>,

    /// Variables shared by every hypothesis.
    #[serde(default)]
    pub data: BehaviourData,

    /// Hypothesis specific variables, keyed by hypothesis name.
    #[serde(default)]
    pub specialised: BTreeMap<String, BehaviourData>,

    /// Gradients and forces of a `General` behaviour.
    #[serde(default)]
    pub main_variables: Vec<MainVariable>,

    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,

    /// Metadata of the behaviour file, copied into generated banners.
    #[serde(default)]
    pub file_description: FileDescription,
}

fn default_dsl() -> String {
    "Implicit".to_string()
}

/// Error raised while reading a behaviour description.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("invalid behaviour description: {message}")]
#[diagnostic(
    code(mfront::behaviour::parse),
    help("Check the behaviour description against the documented TOML layout")
)]
pub struct BehaviourFileError {
    pub message: String,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("here")]
    pub span: Option<SourceSpan>,
}

impl BehaviourDescription {
    /// Create an empty description.
    pub fn new(class_name: impl Into<String>, behaviour_type: BehaviourType) -> Self {
        BehaviourDescription {
            class_name: class_name.into(),
            material: None,
            library: None,
            dsl: default_dsl(),
            behaviour_type,
            symmetry: SymmetryType::Isotropic,
            elastic_symmetry: None,
            hypotheses: BTreeSet::new(),
            data: BehaviourData::default(),
            specialised: BTreeMap::new(),
            main_variables: Vec::new(),
            attributes: BTreeMap::new(),
            file_description: FileDescription::default(),
        }
    }

    /// Parse a description from TOML text.
    pub fn from_toml_str(name: &str, contents: &str) -> Result<Self, BehaviourFileError> {
        toml::from_str(contents).map_err(|e| BehaviourFileError {
            message: e.message().to_string(),
            src: NamedSource::new(name, contents.to_string()),
            span: e.span().map(SourceSpan::from),
        })
    }

    /// Load a description from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = crate::util::fs::read_to_string(path)?;
        let bd = Self::from_toml_str(&path.display().to_string(), &contents)
            .map_err(|e| anyhow::anyhow!("{:?}", miette::Report::new(e)))?;
        tracing::debug!(
            "loaded behaviour `{}` from {}",
            bd.behaviour_name(),
            path.display()
        );
        Ok(bd)
    }

    /// Behaviour name: `<material>_<class>` or the class name.
    pub fn behaviour_name(&self) -> String {
        match &self.material {
            Some(m) if !m.is_empty() => format!("{}_{}", m, self.class_name),
            _ => self.class_name.clone(),
        }
    }

    /// Library name, empty when unset.
    pub fn library_name(&self) -> &str {
        self.library.as_deref().unwrap_or("")
    }

    pub fn elastic_symmetry(&self) -> SymmetryType {
        self.elastic_symmetry.unwrap_or(self.symmetry)
    }

    /// Data for a hypothesis, falling back to the shared data.
    pub fn data(&self, h: ModellingHypothesis) -> &BehaviourData {
        self.specialised.get(h.as_str()).unwrap_or(&self.data)
    }

    pub fn is_strain_based(&self) -> bool {
        self.behaviour_type == BehaviourType::StandardStrainBasedBehaviour
    }

    /// Boolean attribute, false when absent.
    pub fn bool_attribute(&self, key: &str) -> bool {
        matches!(self.attributes.get(key), Some(AttributeValue::Bool(true)))
    }

    pub fn string_attribute(&self, key: &str) -> Option<&str> {
        match self.attributes.get(key) {
            Some(AttributeValue::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn float_attribute(&self, key: &str) -> Option<f64> {
        match self.attributes.get(key) {
            Some(AttributeValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// Set an attribute. Overwriting an existing value with a different
    /// one is refused unless `allow_override` is set.
    pub fn set_attribute(
        &mut self,
        key: &str,
        value: AttributeValue,
        allow_override: bool,
    ) -> Result<(), GenerationError> {
        if let Some(previous) = self.attributes.get(key) {
            if !allow_override && *previous != value {
                return Err(GenerationError::InvalidKeywordValue {
                    keyword: key.to_string(),
                    value: format!("{:?}", value),
                    expected: format!("the previously declared value {:?}", previous),
                });
            }
        }
        self.attributes.insert(key.to_string(), value);
        Ok(())
    }

    pub fn requires_stiffness_tensor(&self) -> bool {
        self.bool_attribute(attributes::REQUIRES_STIFFNESS_TENSOR)
    }

    pub fn requires_thermal_expansion_coefficient_tensor(&self) -> bool {
        self.bool_attribute(attributes::REQUIRES_THERMAL_EXPANSION_COEFFICIENT_TENSOR)
    }

    /// Declared strain measure, if any.
    pub fn strain_measure(&self) -> Result<Option<StrainMeasure>, GenerationError> {
        self.string_attribute(attributes::STRAIN_MEASURE)
            .map(str::parse)
            .transpose()
    }

    /// Gradient/force pairs exchanged with the host.
    pub fn main_variables(&self) -> Vec<MainVariable> {
        let pair = |g: &str, gt: &str, f: &str, ft: &str| MainVariable {
            gradient: VariableDescription::new(g, gt),
            force: VariableDescription::new(f, ft),
        };
        match self.behaviour_type {
            BehaviourType::StandardStrainBasedBehaviour => {
                vec![pair("Strain", "StrainStensor", "Stress", "StressStensor")]
            }
            BehaviourType::StandardFiniteStrainBehaviour => vec![pair(
                "DeformationGradient",
                "DeformationGradientTensor",
                "Stress",
                "StressStensor",
            )],
            BehaviourType::CohesiveZoneModel => vec![pair(
                "OpeningDisplacement",
                "DisplacementTVector",
                "CohesiveForce",
                "ForceTVector",
            )],
            BehaviourType::General => self.main_variables.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESCRIPTION: &str = r#"
class_name = "Norton"
material = "Steel"
behaviour_type = "StandardStrainBasedBehaviour"
hypotheses = ["Tridimensional", "PlaneStrain"]

[attributes]
requiresStiffnessTensor = true
strainMeasure = "Hencky"

[[data.material_properties]]
name = "A"

[[data.state_variables]]
name = "p"
glossary = "EquivalentViscoplasticStrain"

[[data.state_variables]]
name = "evp"
type = "StrainStensor"

[[specialised.PlaneStrain.material_properties]]
name = "B"
"#;

    #[test]
    fn test_parse_description() {
        let bd = BehaviourDescription::from_toml_str("norton.toml", DESCRIPTION).unwrap();
        assert_eq!(bd.behaviour_name(), "Steel_Norton");
        assert!(bd.requires_stiffness_tensor());
        assert!(!bd.requires_thermal_expansion_coefficient_tensor());
        assert_eq!(bd.strain_measure().unwrap(), Some(StrainMeasure::Hencky));
        assert_eq!(bd.hypotheses.len(), 2);
        let d3 = bd.data(ModellingHypothesis::Tridimensional);
        assert_eq!(d3.material_properties[0].name, "A");
        let ps = bd.data(ModellingHypothesis::PlaneStrain);
        assert_eq!(ps.material_properties[0].name, "B");
        assert_eq!(
            d3.state_variables_size(),
            TypeSize::new(1, 0, 1, 0)
        );
    }

    #[test]
    fn test_parse_error_has_span() {
        let err = BehaviourDescription::from_toml_str("bad.toml", "class_name = 3").unwrap_err();
        assert!(err.span.is_some());
    }

    #[test]
    fn test_attribute_override_is_refused() {
        let mut bd = BehaviourDescription::new("A", BehaviourType::StandardStrainBasedBehaviour);
        bd.set_attribute("k", AttributeValue::Bool(true), false).unwrap();
        bd.set_attribute("k", AttributeValue::Bool(true), false).unwrap();
        assert!(bd
            .set_attribute("k", AttributeValue::Bool(false), false)
            .is_err());
        bd.set_attribute("k", AttributeValue::Bool(false), true).unwrap();
        assert!(!bd.bool_attribute("k"));
    }

    #[test]
    fn test_expanded_names() {
        let v = VariableDescription::new("a", "real")
            .with_glossary("Damage")
            .with_array_size(3);
        assert_eq!(
            v.expanded_external_names(),
            vec!["Damage[0]", "Damage[1]", "Damage[2]"]
        );
    }
}
