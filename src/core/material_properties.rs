//! Material properties layout.
//!
//! Host codes pass material properties as one flat array. Some hosts
//! expect the elastic and thermal expansion coefficients in front of the
//! user-declared properties; the offsets computed here feed every pointer
//! expression of the generated wrappers.

use std::collections::HashSet;

use serde::Serialize;

use crate::core::behaviour::{BehaviourDescription, BehaviourType, SymmetryType};
use crate::core::hypothesis::ModellingHypothesis;
use crate::core::type_size::{TypeSize, VariableType};
use crate::interfaces::errors::GenerationError;

/// Host-specific rules for injected material properties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterialPropertiesPolicy {
    /// Inject elastic properties even if the behaviour does not request the
    /// stiffness tensor (mechanical behaviours only).
    pub always_inject_elasticity: bool,
    /// Inject thermal expansion even if not requested (mechanical behaviours only).
    pub always_inject_thermal_expansion: bool,
    /// Insert a `MassDensity` slot between elasticity and thermal expansion.
    pub mass_density: bool,
}

/// One entry of a material properties list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialPropertyEntry {
    /// External (glossary) name.
    pub name: String,
    /// Name inside the behaviour, `None` for injected entries the behaviour
    /// does not declare.
    pub variable_name: Option<String>,
    pub variable_type: VariableType,
    pub array_size: u16,
    pub offset: TypeSize,
}

impl MaterialPropertyEntry {
    fn size(&self) -> TypeSize {
        TypeSize::of(self.variable_type, self.array_size)
    }
}

/// Ordered material properties of one (behaviour, hypothesis) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialPropertiesList {
    pub hypothesis: ModellingHypothesis,
    pub entries: Vec<MaterialPropertyEntry>,
    /// Index of the first user-declared entry.
    pub first_user_entry: usize,
    /// Number of injected elastic slots.
    pub elastic_properties: usize,
    /// Number of injected thermal expansion slots.
    pub thermal_expansion_properties: usize,
    pub mass_density: bool,
}

/// Number of elastic slots injected for a symmetry and space dimension.
pub fn elastic_properties_count(symmetry: SymmetryType, n: u16) -> usize {
    match (symmetry, n) {
        (SymmetryType::Isotropic, _) => 2,
        (SymmetryType::Orthotropic, 1) => 6,
        (SymmetryType::Orthotropic, 2) => 7,
        (SymmetryType::Orthotropic, _) => 9,
    }
}

fn elastic_names(symmetry: SymmetryType, n: u16) -> &'static [&'static str] {
    const ISOTROPIC: [&str; 2] = ["YoungModulus", "PoissonRatio"];
    const ORTHOTROPIC: [&str; 9] = [
        "YoungModulus1",
        "YoungModulus2",
        "YoungModulus3",
        "PoissonRatio12",
        "PoissonRatio23",
        "PoissonRatio13",
        "ShearModulus12",
        "ShearModulus23",
        "ShearModulus13",
    ];
    match symmetry {
        SymmetryType::Isotropic => &ISOTROPIC,
        SymmetryType::Orthotropic => &ORTHOTROPIC[..elastic_properties_count(symmetry, n)],
    }
}

fn thermal_expansion_names(symmetry: SymmetryType) -> &'static [&'static str] {
    match symmetry {
        SymmetryType::Isotropic => &["ThermalExpansion"],
        SymmetryType::Orthotropic => {
            &["ThermalExpansion1", "ThermalExpansion2", "ThermalExpansion3"]
        }
    }
}

impl MaterialPropertiesList {
    /// Entries prepended by the interface.
    pub fn injected_entries(&self) -> &[MaterialPropertyEntry] {
        &self.entries[..self.first_user_entry]
    }

    /// Entries declared by the behaviour.
    pub fn user_entries(&self) -> &[MaterialPropertyEntry] {
        &self.entries[self.first_user_entry..]
    }

    /// Total packed size.
    pub fn total_size(&self) -> TypeSize {
        self.entries
            .last()
            .map(|e| e.offset + e.size())
            .unwrap_or_default()
    }

    /// Offset of the first user-declared property.
    pub fn user_offset(&self) -> TypeSize {
        self.entries
            .get(self.first_user_entry)
            .map(|e| e.offset)
            .unwrap_or_else(|| self.total_size())
    }

    /// Offset of the first thermal expansion slot.
    pub fn thermal_expansion_offset(&self) -> usize {
        self.elastic_properties + usize::from(self.mass_density)
    }

    /// Expanded external names, in order.
    pub fn external_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|e| {
                if e.array_size <= 1 {
                    vec![e.name.clone()]
                } else {
                    (0..e.array_size)
                        .map(|i| format!("{}[{}]", e.name, i))
                        .collect()
                }
            })
            .collect()
    }

    /// Find an entry by behaviour variable name.
    pub fn find_variable(&self, variable: &str) -> Option<&MaterialPropertyEntry> {
        self.entries
            .iter()
            .find(|e| e.variable_name.as_deref() == Some(variable))
    }
}

/// Build the material properties list with the default policy.
pub fn build_material_properties_list(
    bd: &BehaviourDescription,
    h: ModellingHypothesis,
) -> Result<MaterialPropertiesList, GenerationError> {
    build_material_properties_list_with_policy(bd, h, MaterialPropertiesPolicy::default())
}

/// Build the material properties list of a behaviour for a hypothesis.
pub fn build_material_properties_list_with_policy(
    bd: &BehaviourDescription,
    h: ModellingHypothesis,
    policy: MaterialPropertiesPolicy,
) -> Result<MaterialPropertiesList, GenerationError> {
    let n = h.space_dimension()?;
    let mechanical = matches!(
        bd.behaviour_type,
        BehaviourType::StandardStrainBasedBehaviour | BehaviourType::StandardFiniteStrainBehaviour
    );
    let data = bd.data(h);

    let mut entries: Vec<MaterialPropertyEntry> = Vec::new();
    let mut offset = TypeSize::default();
    let mut push = |entries: &mut Vec<MaterialPropertyEntry>,
                    name: &str,
                    variable_name: Option<String>,
                    ty: VariableType,
                    array_size: u16| {
        let entry = MaterialPropertyEntry {
            name: name.to_string(),
            variable_name,
            variable_type: ty,
            array_size,
            offset,
        };
        offset += entry.size();
        entries.push(entry);
    };

    // The behaviour may itself declare an injected property; it then reads
    // the injected slot.
    let declared = |external: &str| {
        data.material_properties
            .iter()
            .find(|v| v.external_name() == external)
            .map(|v| v.name.clone())
    };

    let mut elastic_properties = 0;
    if bd.requires_stiffness_tensor() || (policy.always_inject_elasticity && mechanical) {
        for &name in elastic_names(bd.elastic_symmetry(), n) {
            push(&mut entries, name, declared(name), VariableType::Scalar, 1);
        }
        elastic_properties = elastic_properties_count(bd.elastic_symmetry(), n);
    }
    if policy.mass_density && mechanical {
        push(
            &mut entries,
            "MassDensity",
            declared("MassDensity"),
            VariableType::Scalar,
            1,
        );
    }
    let mut thermal_expansion_properties = 0;
    if bd.requires_thermal_expansion_coefficient_tensor()
        || (policy.always_inject_thermal_expansion && mechanical)
    {
        let names = thermal_expansion_names(bd.symmetry);
        for &name in names {
            push(&mut entries, name, declared(name), VariableType::Scalar, 1);
        }
        thermal_expansion_properties = names.len();
    }

    let first_user_entry = entries.len();
    let injected: HashSet<String> = entries.iter().map(|e| e.name.clone()).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    for mp in &data.material_properties {
        if !seen.insert(mp.external_name()) {
            return Err(GenerationError::DuplicateMaterialProperty {
                name: mp.external_name().to_string(),
            });
        }
        if injected.contains(mp.external_name()) {
            continue;
        }
        push(
            &mut entries,
            mp.external_name(),
            Some(mp.name.clone()),
            mp.variable_type(),
            mp.array_size,
        );
    }

    Ok(MaterialPropertiesList {
        hypothesis: h,
        entries,
        first_user_entry,
        elastic_properties,
        thermal_expansion_properties,
        mass_density: policy.mass_density && mechanical,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::behaviour::{attributes, AttributeValue, VariableDescription};

    fn behaviour(symmetry: SymmetryType) -> BehaviourDescription {
        let mut bd =
            BehaviourDescription::new("Test", BehaviourType::StandardStrainBasedBehaviour);
        bd.symmetry = symmetry;
        bd.hypotheses.insert(ModellingHypothesis::Tridimensional);
        bd.hypotheses.insert(ModellingHypothesis::PlaneStrain);
        bd.data.material_properties = vec![
            VariableDescription::new("k", "real"),
            VariableDescription::new("a", "real").with_array_size(3),
            VariableDescription::new("e0", "StrainStensor"),
        ];
        bd
    }

    #[test]
    fn test_plain_list_starts_at_zero() {
        let bd = behaviour(SymmetryType::Isotropic);
        let mpl =
            build_material_properties_list(&bd, ModellingHypothesis::Tridimensional).unwrap();
        assert_eq!(mpl.first_user_entry, 0);
        assert!(mpl.user_offset().is_null());
        assert_eq!(
            mpl.total_size()
                .value_for_hypothesis(ModellingHypothesis::Tridimensional)
                .unwrap(),
            1 + 3 + 6
        );
    }

    #[test]
    fn test_offsets_strictly_increase_and_names_are_unique() {
        let mut bd = behaviour(SymmetryType::Orthotropic);
        bd.set_attribute(
            attributes::REQUIRES_STIFFNESS_TENSOR,
            AttributeValue::Bool(true),
            false,
        )
        .unwrap();
        bd.set_attribute(
            attributes::REQUIRES_THERMAL_EXPANSION_COEFFICIENT_TENSOR,
            AttributeValue::Bool(true),
            false,
        )
        .unwrap();
        for h in [
            ModellingHypothesis::Tridimensional,
            ModellingHypothesis::PlaneStrain,
        ] {
            let mpl = build_material_properties_list(&bd, h).unwrap();
            let names = mpl.external_names();
            let unique: HashSet<_> = names.iter().collect();
            assert_eq!(unique.len(), names.len());
            let offsets: Vec<i32> = mpl
                .entries
                .iter()
                .map(|e| e.offset.value_for_hypothesis(h).unwrap())
                .collect();
            assert!(offsets.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_orthotropic_elastic_prefix() {
        let mut bd = behaviour(SymmetryType::Orthotropic);
        bd.set_attribute(
            attributes::REQUIRES_STIFFNESS_TENSOR,
            AttributeValue::Bool(true),
            false,
        )
        .unwrap();
        for (h, expected) in [
            (ModellingHypothesis::PlaneStrain, 7),
            (ModellingHypothesis::Tridimensional, 9),
        ] {
            let mpl = build_material_properties_list(&bd, h).unwrap();
            assert_eq!(mpl.elastic_properties, expected);
            assert_eq!(mpl.first_user_entry, expected);
            assert_eq!(mpl.user_offset().value_for_hypothesis(h).unwrap(), expected as i32);
            assert_eq!(
                elastic_properties_count(SymmetryType::Orthotropic, h.space_dimension().unwrap()),
                expected
            );
        }
    }

    #[test]
    fn test_isotropic_thermal_expansion_and_mass_density() {
        let mut bd = behaviour(SymmetryType::Isotropic);
        bd.data
            .material_properties
            .push(VariableDescription::new("young", "real").with_glossary("YoungModulus"));
        let policy = MaterialPropertiesPolicy {
            always_inject_elasticity: true,
            always_inject_thermal_expansion: true,
            mass_density: true,
        };
        let mpl = build_material_properties_list_with_policy(
            &bd,
            ModellingHypothesis::Tridimensional,
            policy,
        )
        .unwrap();
        let names: Vec<_> = mpl.injected_entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["YoungModulus", "PoissonRatio", "MassDensity", "ThermalExpansion"]
        );
        assert_eq!(mpl.thermal_expansion_offset(), 3);
        assert_eq!(
            mpl.find_variable("young").map(|e| e.name.as_str()),
            Some("YoungModulus")
        );
        // the user declaration of YoungModulus is not duplicated
        assert_eq!(mpl.user_entries().len(), 3);
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let mut bd = behaviour(SymmetryType::Isotropic);
        bd.data
            .material_properties
            .push(VariableDescription::new("k", "real"));
        let err = build_material_properties_list(&bd, ModellingHypothesis::Tridimensional)
            .unwrap_err();
        assert!(matches!(err, GenerationError::DuplicateMaterialProperty { .. }));
    }

    #[test]
    fn test_undefined_hypothesis_is_rejected() {
        let bd = behaviour(SymmetryType::Isotropic);
        assert!(
            build_material_properties_list(&bd, ModellingHypothesis::UndefinedHypothesis)
                .is_err()
        );
    }
}
