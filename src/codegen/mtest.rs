//! MTest reproduction cases written by wrappers on integration failure.

use serde::Serialize;

use crate::codegen::writer::{quoted, CxxWriter};
use crate::core::behaviour::{BehaviourDescription, VariableDescription};
use crate::core::hypothesis::ModellingHypothesis;
use crate::core::material_properties::MaterialPropertiesList;
use crate::core::type_size::VariableType;
use crate::interfaces::errors::GenerationError;

/// A variable recorded in the MTest file, with its position in the host
/// array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordedVariable {
    pub name: String,
    pub variable_type: VariableType,
    pub offset: usize,
}

/// Everything a failing wrapper writes to reproduce the failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MTestDump {
    pub interface: String,
    pub library: String,
    pub behaviour: String,
    pub hypothesis: ModellingHypothesis,
    pub finite_strain: bool,
    /// Expression of the material properties array.
    pub material_properties_expr: String,
    pub material_properties: Vec<RecordedVariable>,
    pub state_variables: Vec<RecordedVariable>,
    pub external_state_variables: Vec<RecordedVariable>,
}

impl MTestDump {
    /// Record the variables of a behaviour for a hypothesis.
    ///
    /// `leading_state_variables` is the number of host-managed state
    /// variables placed before the behaviour ones.
    pub fn new(
        interface: &str,
        bd: &BehaviourDescription,
        mpl: &MaterialPropertiesList,
        material_properties_expr: &str,
        leading_state_variables: usize,
    ) -> Result<Self, GenerationError> {
        let h = mpl.hypothesis;
        let data = bd.data(h);
        let material_properties = mpl
            .entries
            .iter()
            .map(|e| {
                Ok(RecordedVariable {
                    name: e.name.clone(),
                    variable_type: e.variable_type,
                    offset: e.offset.index_for_hypothesis(h)?,
                })
            })
            .collect::<Result<Vec<_>, GenerationError>>()?;
        let record = |vars: &[VariableDescription],
                      start: usize|
         -> Result<Vec<RecordedVariable>, GenerationError> {
            let mut offset = start;
            let mut out = Vec::new();
            for v in vars {
                let size = v.variable_type().type_size().index_for_hypothesis(h)?;
                for name in v.expanded_external_names() {
                    out.push(RecordedVariable {
                        name,
                        variable_type: v.variable_type(),
                        offset,
                    });
                    offset += size;
                }
            }
            Ok(out)
        };
        Ok(MTestDump {
            interface: interface.to_lowercase(),
            library: bd.library_name().to_string(),
            behaviour: bd.behaviour_name(),
            hypothesis: h,
            finite_strain: !bd.is_strain_based(),
            material_properties_expr: material_properties_expr.to_string(),
            material_properties,
            state_variables: record(&data.state_variables, leading_state_variables)?,
            external_state_variables: record(&data.external_state_variables, 0)?,
        })
    }

    fn generator_class(&self) -> &'static str {
        if self.finite_strain {
            "mfront::UmatFiniteStrainMTestFileGenerator"
        } else {
            "mfront::UmatSmallStrainMTestFileGenerator"
        }
    }

    /// Include needed by the generated source.
    pub fn include(&self) -> String {
        let header = if self.finite_strain {
            "MFront/UmatFiniteStrainMTestFileGenerator.hxx"
        } else {
            "MFront/UmatSmallStrainMTestFileGenerator.hxx"
        };
        format!("#include\"{}\"", header)
    }

    /// Copies of the initial state, taken before the integration.
    pub fn save_initial_state(w: &mut CxxWriter, stensor_size: usize, nisvs: &str, isvs: &str) {
        w.line(format!("double eto0[{}];", stensor_size))
            .line(format!("double sig0[{}];", stensor_size))
            .line(format!("std::copy(eto, eto+{}, eto0);", stensor_size))
            .line(format!("std::copy(sig, sig+{}, sig0);", stensor_size))
            .line(format!(
                "const std::vector<double> isvs0({}, {}+{});",
                isvs, isvs, nisvs
            ));
    }

    /// Statements writing the MTest file.
    pub fn render(&self, w: &mut CxxWriter) {
        w.comment("writing an MTest file reproducing the failure").open("");
        w.line(format!(
            "{} mg({},{},{});",
            self.generator_class(),
            quoted(&self.interface),
            quoted(&self.library),
            quoted(&self.behaviour)
        ))
        .line(format!(
            "mg.setModellingHypothesis({});",
            self.hypothesis.cxx_enumerator()
        ))
        .line("mg.setHandleThermalExpansion(false);")
        .line("mg.addTime(0.);")
        .line("mg.addTime(dt);")
        .line("mg.setStrainTensor(eto0);")
        .line("mg.setStrainTensorIncrement(deto);")
        .line("mg.setStressTensor(sig0);");
        for mp in &self.material_properties {
            w.line(format!(
                "mg.addMaterialProperty({},*({}+{}));",
                quoted(&mp.name),
                self.material_properties_expr,
                mp.offset
            ));
        }
        for v in &self.state_variables {
            w.line(format!(
                "mg.addInternalStateVariable({},{},&isvs0[{}]);",
                quoted(&v.name),
                supported_type(v.variable_type),
                v.offset
            ));
        }
        w.line("mg.addExternalStateVariableValue(\"Temperature\",0.,T);")
            .line("mg.addExternalStateVariableValue(\"Temperature\",dt,T+dT);");
        for v in &self.external_state_variables {
            w.line(format!(
                "mg.addExternalStateVariableValue({},0.,esvs[{}]);",
                quoted(&v.name),
                v.offset
            ))
            .line(format!(
                "mg.addExternalStateVariableValue({},dt,esvs[{}]+desvs[{}]);",
                quoted(&v.name),
                v.offset,
                v.offset
            ));
        }
        w.line(format!("mg.generate({});", quoted(&self.behaviour)))
            .close("");
    }
}

fn supported_type(ty: VariableType) -> &'static str {
    match ty {
        VariableType::Scalar => "tfel::material::SupportedTypes::SCALAR",
        VariableType::TVector => "tfel::material::SupportedTypes::TVECTOR",
        VariableType::Stensor => "tfel::material::SupportedTypes::STENSOR",
        VariableType::Tensor => "tfel::material::SupportedTypes::TENSOR",
    }
}
