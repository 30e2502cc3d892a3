//! Reflection symbols exported by the generated libraries.
//!
//! Host-agnostic tools (MTest, the python bindings...) load a generated
//! library and read these symbols to discover the hypotheses, the material
//! properties and the state variables of a behaviour, in the order the
//! wrapper expects them.

use serde::Serialize;

use crate::codegen::writer::{quoted, real_literal, CxxWriter};
use crate::core::behaviour::{BehaviourDescription, BehaviourType, VariableDescription};
use crate::core::finite_strain::FiniteStrainStrategy;
use crate::core::hypothesis::ModellingHypothesis;
use crate::core::material_properties::MaterialPropertiesList;
use crate::core::type_size::VariableType;

/// Version of the TFEL libraries the generated code is written against.
pub const TFEL_VERSION: &str = "4.2.0";

/// Value of an exported symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SymbolValue {
    UShort(u16),
    Int(i32),
    Real(f64),
    Str(String),
    Strings(Vec<String>),
    Ints(Vec<i32>),
}

/// An exported `extern "C"` variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Symbol {
    pub name: String,
    pub value: SymbolValue,
}

impl Symbol {
    pub fn new(name: impl Into<String>, value: SymbolValue) -> Self {
        Symbol {
            name: name.into(),
            value,
        }
    }

    pub fn flag(name: impl Into<String>, value: bool) -> Self {
        Symbol::new(name, SymbolValue::UShort(u16::from(value)))
    }
}

/// Exported setter functions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SymbolFunction {
    /// `<name>(const int)` selecting the out-of-bounds policy.
    OutOfBoundsPolicy { name: String, policy_class: String },
    /// `<name>(const char* const, const double)` setting a parameter.
    SetParameter { name: String, initializer: String },
}

/// Ordered symbols of one entry point.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SymbolTable {
    pub symbols: Vec<Symbol>,
    pub functions: Vec<SymbolFunction>,
}

impl SymbolTable {
    pub fn push(&mut self, name: impl Into<String>, value: SymbolValue) {
        self.symbols.push(Symbol::new(name, value));
    }

    pub fn extend(&mut self, other: SymbolTable) {
        self.symbols.extend(other.symbols);
        self.functions.extend(other.functions);
    }

    pub fn get(&self, name: &str) -> Option<&SymbolValue> {
        self.symbols.iter().find(|s| s.name == name).map(|s| &s.value)
    }

    pub fn names(&self) -> Vec<&str> {
        self.symbols.iter().map(|s| s.name.as_str()).collect()
    }

    /// Render the symbols, to be placed in an `extern "C"` block.
    pub fn render(&self, w: &mut CxxWriter) {
        for s in &self.symbols {
            render_symbol(w, s);
        }
        for f in &self.functions {
            w.blank();
            render_function(w, f);
        }
    }
}

fn render_symbol(w: &mut CxxWriter, s: &Symbol) {
    let name = &s.name;
    let line = match &s.value {
        SymbolValue::UShort(v) => format!("MFRONT_SHAREDOBJ unsigned short {} = {}u;", name, v),
        SymbolValue::Int(v) => format!("MFRONT_SHAREDOBJ int {} = {};", name, v),
        SymbolValue::Real(v) => format!("MFRONT_SHAREDOBJ double {} = {};", name, real_literal(*v)),
        SymbolValue::Str(v) => format!("MFRONT_SHAREDOBJ const char* {} = {};", name, quoted(v)),
        SymbolValue::Strings(v) if v.is_empty() => {
            format!("MFRONT_SHAREDOBJ const char * const * {} = nullptr;", name)
        }
        SymbolValue::Strings(v) => format!(
            "MFRONT_SHAREDOBJ const char * {}[{}] = {{{}}};",
            name,
            v.len(),
            v.iter().map(|s| quoted(s)).collect::<Vec<_>>().join(",")
        ),
        SymbolValue::Ints(v) if v.is_empty() => {
            format!("MFRONT_SHAREDOBJ const int * {} = nullptr;", name)
        }
        SymbolValue::Ints(v) => format!(
            "MFRONT_SHAREDOBJ int {}[{}] = {{{}}};",
            name,
            v.len(),
            v.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(",")
        ),
    };
    w.line(line);
}

fn render_function(w: &mut CxxWriter, f: &SymbolFunction) {
    match f {
        SymbolFunction::OutOfBoundsPolicy { name, policy_class } => {
            w.open(format!("MFRONT_SHAREDOBJ void {}(const int p)", name))
                .open("if(p==0)")
                .line(format!(
                    "{}::getOutOfBoundsPolicy().setOutOfBoundsPolicy(tfel::material::None);",
                    policy_class
                ))
                .close("")
                .open("else if(p==1)")
                .line(format!(
                    "{}::getOutOfBoundsPolicy().setOutOfBoundsPolicy(tfel::material::Warning);",
                    policy_class
                ))
                .close("")
                .open("else if(p==2)")
                .line(format!(
                    "{}::getOutOfBoundsPolicy().setOutOfBoundsPolicy(tfel::material::Strict);",
                    policy_class
                ))
                .close("")
                .open("else")
                .line(format!(
                    "std::cerr << \"{}: invalid argument ('\" << p << \"')\\n\";",
                    name
                ))
                .close("")
                .close("");
        }
        SymbolFunction::SetParameter { name, initializer } => {
            w.open(format!(
                "MFRONT_SHAREDOBJ int {}(const char* const key, const double value)",
                name
            ))
            .open("try")
            .line(format!("{}::get().set(key, value);", initializer))
            .close("")
            .open("catch(...)")
            .line("return 0;")
            .close("")
            .line("return 1;")
            .close("");
        }
    }
}

/// Kinematic code of the `_BehaviourKinematic` symbol.
pub fn kinematic_code(bd: &BehaviourDescription, strategy: Option<FiniteStrainStrategy>) -> u16 {
    match bd.behaviour_type {
        BehaviourType::General => 0,
        BehaviourType::StandardStrainBasedBehaviour => match strategy {
            Some(s) if s.uses_deformation_gradients() => 3,
            _ => 1,
        },
        BehaviourType::CohesiveZoneModel => 2,
        BehaviourType::StandardFiniteStrainBehaviour => 3,
    }
}

/// Hypothesis-specific inputs of the generator.
#[derive(Debug, Clone)]
pub struct HypothesisSymbols<'a> {
    pub hypothesis: ModellingHypothesis,
    pub material_properties: &'a MaterialPropertiesList,
    /// State variables managed by the host wrapper, placed before the
    /// behaviour ones.
    pub leading_state_variables: &'a [(String, VariableType)],
}

/// Builds the symbol table of one entry point.
#[derive(Debug, Clone)]
pub struct SymbolsGenerator<'a> {
    pub interface: &'a str,
    /// Exported function name, prefix of every symbol.
    pub function: &'a str,
    pub source_file: &'a str,
    /// Name of the `<Host>OutOfBoundsPolicy` class.
    pub policy_class: String,
    /// Whether the host passes the temperature outside of the external
    /// state variables.
    pub temperature_removed: bool,
    pub strategy: Option<FiniteStrainStrategy>,
}

impl SymbolsGenerator<'_> {
    /// Symbols of an entry point treating `hypotheses`.
    ///
    /// Hypothesis-specific symbols are qualified by the hypothesis name
    /// when the entry point treats more than one hypothesis.
    pub fn generate(
        &self,
        bd: &BehaviourDescription,
        hypotheses: &[HypothesisSymbols<'_>],
    ) -> SymbolTable {
        let mut table = self.general_symbols(bd, hypotheses);
        let qualified = hypotheses.len() > 1;
        for hs in hypotheses {
            let prefix = if qualified {
                format!("{}_{}", self.function, hs.hypothesis.as_str())
            } else {
                self.function.to_string()
            };
            table.extend(self.hypothesis_symbols(bd, hs, &prefix));
        }
        table.functions.push(SymbolFunction::OutOfBoundsPolicy {
            name: format!("{}_setOutOfBoundsPolicy", self.function),
            policy_class: self.policy_class.clone(),
        });
        table
    }

    fn general_symbols(
        &self,
        bd: &BehaviourDescription,
        hypotheses: &[HypothesisSymbols<'_>],
    ) -> SymbolTable {
        let f = self.function;
        let mut t = SymbolTable::default();
        t.push(format!("{}_mfront_ept", f), SymbolValue::Str(f.to_string()));
        t.push(
            format!("{}_tfel_version", f),
            SymbolValue::Str(TFEL_VERSION.to_string()),
        );
        t.push(
            format!("{}_mfront_interface", f),
            SymbolValue::Str(self.interface.to_string()),
        );
        t.push(format!("{}_src", f), SymbolValue::Str(self.source_file.to_string()));
        t.push(
            format!("{}_nModellingHypotheses", f),
            SymbolValue::UShort(hypotheses.len() as u16),
        );
        t.push(
            format!("{}_ModellingHypotheses", f),
            SymbolValue::Strings(
                hypotheses
                    .iter()
                    .map(|h| h.hypothesis.as_str().to_string())
                    .collect(),
            ),
        );
        t.push(
            format!("{}_BehaviourType", f),
            SymbolValue::UShort(bd.behaviour_type.symbol_code() as u16),
        );
        t.push(
            format!("{}_BehaviourKinematic", f),
            SymbolValue::UShort(kinematic_code(bd, self.strategy)),
        );
        t.push(
            format!("{}_SymmetryType", f),
            SymbolValue::UShort(bd.symmetry.symbol_code() as u16),
        );
        t.push(
            format!("{}_ElasticSymmetryType", f),
            SymbolValue::UShort(bd.elastic_symmetry().symbol_code() as u16),
        );
        t.symbols.push(Symbol::flag(
            format!("{}_requiresStiffnessTensor", f),
            bd.requires_stiffness_tensor(),
        ));
        t.symbols.push(Symbol::flag(
            format!("{}_requiresThermalExpansionCoefficientTensor", f),
            bd.requires_thermal_expansion_coefficient_tensor(),
        ));
        let main = bd.main_variables();
        let gradients: Vec<&VariableDescription> = main.iter().map(|m| &m.gradient).collect();
        let forces: Vec<&VariableDescription> = main.iter().map(|m| &m.force).collect();
        for (kind, vars) in [("Gradients", gradients), ("ThermodynamicForces", forces)] {
            t.push(
                format!("{}_n{}", f, kind),
                SymbolValue::UShort(vars.len() as u16),
            );
            t.push(
                format!("{}_{}", f, kind),
                SymbolValue::Strings(vars.iter().map(|v| v.external_name().to_string()).collect()),
            );
            t.push(
                format!("{}_{}Types", f, kind),
                SymbolValue::Ints(vars.iter().map(|v| v.variable_type().symbol_code()).collect()),
            );
        }
        t.symbols.push(Symbol::flag(
            format!("{}_TemperatureRemovedFromExternalStateVariables", f),
            self.temperature_removed,
        ));
        if let Some(s) = self.strategy {
            if bd.is_strain_based() {
                t.push(
                    format!("{}_FiniteStrainStrategy", f),
                    SymbolValue::Str(s.as_str().to_string()),
                );
            }
        }
        t
    }

    fn hypothesis_symbols(
        &self,
        bd: &BehaviourDescription,
        hs: &HypothesisSymbols<'_>,
        prefix: &str,
    ) -> SymbolTable {
        let mut t = SymbolTable::default();
        let data = bd.data(hs.hypothesis);

        let mps = hs.material_properties.external_names();
        t.push(
            format!("{}_nMaterialProperties", prefix),
            SymbolValue::UShort(mps.len() as u16),
        );
        t.push(
            format!("{}_MaterialProperties", prefix),
            SymbolValue::Strings(mps),
        );

        let mut isvs: Vec<String> = hs
            .leading_state_variables
            .iter()
            .map(|(n, _)| n.clone())
            .collect();
        let mut isv_types: Vec<i32> = hs
            .leading_state_variables
            .iter()
            .map(|(_, ty)| ty.symbol_code())
            .collect();
        for v in &data.state_variables {
            // arrays of state variables are exported entry by entry
            for name in v.expanded_external_names() {
                isvs.push(name);
                isv_types.push(v.variable_type().symbol_code());
            }
        }
        t.push(
            format!("{}_nInternalStateVariables", prefix),
            SymbolValue::UShort(isvs.len() as u16),
        );
        t.push(
            format!("{}_InternalStateVariables", prefix),
            SymbolValue::Strings(isvs),
        );
        t.push(
            format!("{}_InternalStateVariablesTypes", prefix),
            SymbolValue::Ints(isv_types),
        );

        let mut esvs: Vec<String> = Vec::new();
        if !self.temperature_removed {
            esvs.push("Temperature".to_string());
        }
        for v in &data.external_state_variables {
            esvs.extend(v.expanded_external_names());
        }
        t.push(
            format!("{}_nExternalStateVariables", prefix),
            SymbolValue::UShort(esvs.len() as u16),
        );
        t.push(
            format!("{}_ExternalStateVariables", prefix),
            SymbolValue::Strings(esvs),
        );

        t.push(
            format!("{}_nParameters", prefix),
            SymbolValue::UShort(data.parameters.len() as u16),
        );
        t.push(
            format!("{}_Parameters", prefix),
            SymbolValue::Strings(
                data.parameters
                    .iter()
                    .map(|p| p.external_name().to_string())
                    .collect(),
            ),
        );
        t.push(
            format!("{}_ParametersTypes", prefix),
            SymbolValue::Ints(data.parameters.iter().map(|_| 0).collect()),
        );
        for p in &data.parameters {
            if let Some(v) = p.default_value {
                t.push(
                    format!("{}_{}_ParameterDefaultValue", prefix, p.external_name()),
                    SymbolValue::Real(v),
                );
            }
        }

        let bounded = data
            .material_properties
            .iter()
            .chain(&data.state_variables)
            .chain(&data.external_state_variables);
        for v in bounded {
            if let Some(b) = v.bounds {
                if let Some(l) = b.lower {
                    t.push(
                        format!("{}_{}_LowerBound", prefix, v.external_name()),
                        SymbolValue::Real(l),
                    );
                }
                if let Some(u) = b.upper {
                    t.push(
                        format!("{}_{}_UpperBound", prefix, v.external_name()),
                        SymbolValue::Real(u),
                    );
                }
            }
        }

        if !data.parameters.is_empty() {
            t.functions.push(SymbolFunction::SetParameter {
                name: format!("{}_setParameter", prefix),
                initializer: format!(
                    "tfel::material::{}{}ParametersInitializer",
                    bd.class_name,
                    hs.hypothesis.as_str()
                ),
            });
        }
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::material_properties::build_material_properties_list;
    use crate::test_support::fixtures;

    fn generator(function: &str) -> SymbolsGenerator<'_> {
        SymbolsGenerator {
            interface: "Ansys",
            function,
            source_file: "TestPlasticity.mfront",
            policy_class: "ansys::AnsysOutOfBoundsPolicy".to_string(),
            temperature_removed: true,
            strategy: Some(FiniteStrainStrategy::Native),
        }
    }

    #[test]
    fn test_general_symbols_order() {
        let bd = fixtures::test_plasticity();
        let h = ModellingHypothesis::Tridimensional;
        let mpl = build_material_properties_list(&bd, h).unwrap();
        let table = generator("TestPlasticity_3D").generate(
            &bd,
            &[HypothesisSymbols {
                hypothesis: h,
                material_properties: &mpl,
                leading_state_variables: &[],
            }],
        );
        let names = table.names();
        assert_eq!(names[0], "TestPlasticity_3D_mfront_ept");
        assert_eq!(names[1], "TestPlasticity_3D_tfel_version");
        assert_eq!(names[2], "TestPlasticity_3D_mfront_interface");
        let mp = names
            .iter()
            .position(|n| *n == "TestPlasticity_3D_MaterialProperties")
            .unwrap();
        let isv = names
            .iter()
            .position(|n| *n == "TestPlasticity_3D_InternalStateVariables")
            .unwrap();
        assert!(mp < isv);
        assert_eq!(
            table.get("TestPlasticity_3D_ExternalStateVariables"),
            Some(&SymbolValue::Strings(vec![]))
        );
        assert_eq!(
            table.get("TestPlasticity_3D_BehaviourKinematic"),
            Some(&SymbolValue::UShort(1))
        );
    }

    #[test]
    fn test_dispatched_entries_are_qualified() {
        let bd = fixtures::test_plasticity();
        let lists: Vec<_> = [
            ModellingHypothesis::Tridimensional,
            ModellingHypothesis::PlaneStrain,
        ]
        .into_iter()
        .map(|h| build_material_properties_list(&bd, h).unwrap())
        .collect();
        let hs: Vec<_> = lists
            .iter()
            .map(|mpl| HypothesisSymbols {
                hypothesis: mpl.hypothesis,
                material_properties: mpl,
                leading_state_variables: &[],
            })
            .collect();
        let mut g = generator("umattestplasticity");
        g.temperature_removed = false;
        let table = g.generate(&bd, &hs);
        assert!(table
            .get("umattestplasticity_PlaneStrain_nMaterialProperties")
            .is_some());
        assert_eq!(
            table.get("umattestplasticity_Tridimensional_ExternalStateVariables"),
            Some(&SymbolValue::Strings(vec!["Temperature".to_string()]))
        );
    }

    #[test]
    fn test_leading_state_variables_come_first() {
        let bd = fixtures::test_plasticity();
        let h = ModellingHypothesis::PlaneStrain;
        let mpl = build_material_properties_list(&bd, h).unwrap();
        let leading = vec![("FirstOrthotropicAxis".to_string(), VariableType::TVector)];
        let table = generator("f").generate(
            &bd,
            &[HypothesisSymbols {
                hypothesis: h,
                material_properties: &mpl,
                leading_state_variables: &leading,
            }],
        );
        match table.get("f_InternalStateVariables") {
            Some(SymbolValue::Strings(v)) => assert_eq!(v[0], "FirstOrthotropicAxis"),
            other => panic!("unexpected {:?}", other),
        }
        match table.get("f_InternalStateVariablesTypes") {
            Some(SymbolValue::Ints(v)) => assert_eq!(v[0], 2),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_render_symbols() {
        let mut t = SymbolTable::default();
        t.push("f_nMaterialProperties", SymbolValue::UShort(2));
        t.push(
            "f_MaterialProperties",
            SymbolValue::Strings(vec!["YoungModulus".to_string(), "PoissonRatio".to_string()]),
        );
        t.push("f_Parameters", SymbolValue::Strings(vec![]));
        t.functions.push(SymbolFunction::OutOfBoundsPolicy {
            name: "f_setOutOfBoundsPolicy".to_string(),
            policy_class: "AnsysOutOfBoundsPolicy".to_string(),
        });
        let mut w = CxxWriter::new();
        t.render(&mut w);
        let text = w.finish();
        assert!(text.contains("MFRONT_SHAREDOBJ unsigned short f_nMaterialProperties = 2u;"));
        assert!(text.contains(
            "MFRONT_SHAREDOBJ const char * f_MaterialProperties[2] = {\"YoungModulus\",\"PoissonRatio\"};"
        ));
        assert!(text.contains("const char * const * f_Parameters = nullptr;"));
        assert!(text.contains("void f_setOutOfBoundsPolicy(const int p)"));
    }
}
