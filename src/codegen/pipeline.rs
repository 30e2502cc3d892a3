//! Conversion steps emitted around the behaviour integration.
//!
//! The steps are plain data: the wrapper plan lists them, tests inspect
//! them, and [`render_steps`] turns them into C++ statements. Local names
//! are fixed: `eto`, `deto`, `sig` and `K` hold TFEL-layout arrays, `F0` and
//! `F1` the deformation gradients, `R` the rotation matrix.

use serde::Serialize;

use crate::codegen::conventions::{ComponentMap, TangentLink};
use crate::codegen::writer::CxxWriter;
use crate::core::finite_strain::FiniteStrainStrategy;
use crate::core::type_size::VariableType;

/// Storage of a deformation gradient passed by a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GradientLayout {
    /// 3x3 column-major matrix.
    FortranMatrix,
    /// TFEL tensor layout.
    Tfel,
}

/// Where the orthotropy axes come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AxesSource {
    /// Leading state variables hold the first axis (2D) or two axes (3D).
    StateVariables { host: String },
    /// A 3x3 column-major rotation matrix argument.
    FortranMatrix { host: String },
    /// A 3x3 row-major rotation matrix.
    CMatrix { host: String },
}

/// One step of a conversion pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ConversionStep {
    DeclareArray {
        name: String,
        size: usize,
    },
    /// Copy a host stensor into a TFEL array, padding missing components.
    ImportStensor {
        host: String,
        local: String,
        map: ComponentMap,
    },
    /// Difference of two host stensors into a TFEL array.
    ImportStensorIncrement {
        host_begin: String,
        host_end: String,
        local: String,
        map: ComponentMap,
    },
    /// Copy a TFEL array back to the host, dropping padded components.
    ExportStensor {
        local: String,
        host: String,
        map: ComponentMap,
    },
    /// Export the tangent operator.
    ExportTangent {
        local: String,
        host: String,
        tfel_size: usize,
        host_size: usize,
        links: Vec<TangentLink>,
        column_major: bool,
    },
    ImportDeformationGradient {
        host: String,
        local: String,
        layout: GradientLayout,
    },
    ComputeGreenLagrangeStrain,
    ConvertCauchyToSecondPiolaKirchhoff,
    ConvertSecondPiolaKirchhoffToCauchy,
    BuildLogarithmicStrainHandlers,
    ComputeHenckyStrain,
    ConvertCauchyToDualStress,
    ConvertDualStressToCauchy,
    ConvertLogarithmicTangentToSpatialModuli,
    /// Convert the tangent between two TFEL finite strain operator kinds.
    ConvertTangentOperator {
        from: String,
        to: String,
    },
    BuildRotationMatrix {
        source: AxesSource,
    },
    RotateToMaterialFrame {
        variables: Vec<(String, VariableType)>,
    },
    RotateToGlobalFrame {
        variables: Vec<(String, VariableType)>,
    },
    RotateTangentToGlobalFrame,
    /// Accumulate the strain increment into host storage (hosts passing
    /// increments only).
    AccumulateStrain {
        host: String,
        size: usize,
    },
    /// Plain copy, for gradients without a tensorial convention.
    CopyArray {
        from: String,
        to: String,
        size: usize,
    },
}

/// Steps run before and after the integration.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversionPipeline {
    pub before: Vec<ConversionStep>,
    pub after: Vec<ConversionStep>,
}

impl ConversionPipeline {
    pub fn extend(&mut self, other: ConversionPipeline) {
        self.before.extend(other.before);
        self.after.extend(other.after);
    }
}

/// Steps a finite strain strategy adds once `F0`, `F1` and `sig` are
/// available in TFEL layout.
///
/// `host_tangent` is the TFEL name of the tangent operator kind the host
/// expects.
pub fn strategy_pipeline(strategy: FiniteStrainStrategy, host_tangent: &str) -> ConversionPipeline {
    use ConversionStep::*;
    match strategy {
        FiniteStrainStrategy::Native => ConversionPipeline::default(),
        FiniteStrainStrategy::FiniteRotationSmallStrain => ConversionPipeline {
            before: vec![ComputeGreenLagrangeStrain, ConvertCauchyToSecondPiolaKirchhoff],
            after: vec![
                ConvertSecondPiolaKirchhoffToCauchy,
                ConvertTangentOperator {
                    from: "DS_DEGL".to_string(),
                    to: host_tangent.to_string(),
                },
            ],
        },
        FiniteStrainStrategy::MieheApelLambrechtLogarithmicStrain => {
            let mut after = vec![
                ConvertDualStressToCauchy,
                ConvertLogarithmicTangentToSpatialModuli,
            ];
            if host_tangent != "SPATIAL_MODULI" {
                after.push(ConvertTangentOperator {
                    from: "SPATIAL_MODULI".to_string(),
                    to: host_tangent.to_string(),
                });
            }
            ConversionPipeline {
                before: vec![
                    BuildLogarithmicStrainHandlers,
                    ComputeHenckyStrain,
                    ConvertCauchyToDualStress,
                ],
                after,
            }
        }
    }
}

fn stensor_t(n: u16) -> String {
    format!("tfel::math::stensor<{}u,double>", n)
}

fn tensor_t(n: u16) -> String {
    format!("tfel::math::tensor<{}u,double>", n)
}

fn st2tost2_t(n: u16) -> String {
    format!("tfel::math::st2tost2<{}u,double>", n)
}

fn rotate(w: &mut CxxWriter, n: u16, variables: &[(String, VariableType)], matrix: &str) {
    for (name, ty) in variables {
        match ty {
            VariableType::Tensor => {
                w.line(format!(
                    "{} = tfel::math::change_basis({}, {});",
                    name, name, matrix
                ));
            }
            _ => {
                w.open("")
                    .line(format!("{} sr;", stensor_t(n)))
                    .line(format!("sr.importTab({});", name))
                    .line(format!("sr.changeBasis({});", matrix))
                    .line(format!("sr.exportTab({});", name))
                    .close("");
            }
        }
    }
}

/// Render steps for a space dimension.
pub fn render_steps(w: &mut CxxWriter, steps: &[ConversionStep], n: u16) {
    for step in steps {
        render_step(w, step, n);
    }
}

fn render_step(w: &mut CxxWriter, step: &ConversionStep, n: u16) {
    use ConversionStep::*;
    match step {
        DeclareArray { name, size } => {
            w.line(format!("double {}[{}] = {{}};", name, size));
        }
        ImportStensor { host, local, map } => {
            if map.is_permutation() {
                w.comment("shear components are not stored in the same order");
            }
            for l in &map.links {
                match l.host {
                    Some(j) => w.line(format!(
                        "{}[{}] = {}[{}]{};",
                        local,
                        l.tfel,
                        host,
                        j,
                        l.to_tfel.cxx_factor()
                    )),
                    None => w.line(format!("{}[{}] = 0;", local, l.tfel)),
                };
            }
        }
        ImportStensorIncrement {
            host_begin,
            host_end,
            local,
            map,
        } => {
            for l in &map.links {
                match l.host {
                    Some(j) => w.line(format!(
                        "{}[{}] = ({}[{}]-{}[{}]){};",
                        local,
                        l.tfel,
                        host_end,
                        j,
                        host_begin,
                        j,
                        l.to_tfel.cxx_factor()
                    )),
                    None => w.line(format!("{}[{}] = 0;", local, l.tfel)),
                };
            }
        }
        ExportStensor { local, host, map } => {
            for l in &map.links {
                if let Some(j) = l.host {
                    w.line(format!(
                        "{}[{}] = {}[{}]{};",
                        host,
                        j,
                        local,
                        l.tfel,
                        l.to_tfel.inverse().cxx_factor()
                    ));
                }
            }
        }
        ExportTangent {
            local,
            host,
            tfel_size,
            host_size,
            links,
            column_major,
        } => {
            for l in links {
                let h = if *column_major {
                    l.host_row + l.host_column * host_size
                } else {
                    l.host_row * host_size + l.host_column
                };
                w.line(format!(
                    "{}[{}] = {}[{}]{};",
                    host,
                    h,
                    local,
                    l.tfel_row * tfel_size + l.tfel_column,
                    l.factor.cxx_factor()
                ));
            }
        }
        ImportDeformationGradient {
            host,
            local,
            layout,
        } => match layout {
            GradientLayout::FortranMatrix => {
                w.line(format!(
                    "auto {} = {}::buildFromFortranMatrix({});",
                    local,
                    tensor_t(n),
                    host
                ));
            }
            GradientLayout::Tfel => {
                w.line(format!("{} {};", tensor_t(n), local));
                w.line(format!("{}.importTab({});", local, host));
            }
        },
        ComputeGreenLagrangeStrain => {
            w.line("const auto e0 = tfel::math::computeGreenLagrangeTensor(F0);")
                .line("const auto e1 = tfel::math::computeGreenLagrangeTensor(F1);")
                .line("e0.exportTab(eto);")
                .line("(e1-e0).exportTab(deto);");
        }
        ConvertCauchyToSecondPiolaKirchhoff => {
            w.open("")
                .line(format!("{} s0;", stensor_t(n)))
                .line("s0.importTab(sig);")
                .line(
                    "tfel::math::convertCauchyStressToSecondPiolaKirchhoffStress(s0, F0).exportTab(sig);",
                )
                .close("");
        }
        ConvertSecondPiolaKirchhoffToCauchy => {
            w.line(format!("{} S1;", stensor_t(n)))
                .line("S1.importTab(sig);")
                .line("const auto s1 = tfel::math::convertSecondPiolaKirchhoffStressToCauchyStress(S1, F1);")
                .line("s1.exportTab(sig);");
        }
        BuildLogarithmicStrainHandlers => {
            let handler = format!("tfel::material::LogarithmicStrainHandler<{}u,double>", n);
            w.line(format!("using LogarithmicStrainHandler = {};", handler))
                .line("const LogarithmicStrainHandler lgh0(LogarithmicStrainHandler::EULERIAN, F0);")
                .line("const LogarithmicStrainHandler lgh1(LogarithmicStrainHandler::EULERIAN, F1);");
        }
        ComputeHenckyStrain => {
            w.line("const auto e0 = lgh0.getHenckyStrain();")
                .line("const auto e1 = lgh1.getHenckyStrain();")
                .line("e0.exportTab(eto);")
                .line("(e1-e0).exportTab(deto);");
        }
        ConvertCauchyToDualStress => {
            w.open("")
                .line(format!("{} s0;", stensor_t(n)))
                .line("s0.importTab(sig);")
                .line("lgh0.convertFromCauchyStress(s0).exportTab(sig);")
                .close("");
        }
        ConvertDualStressToCauchy => {
            w.line(format!("{} T1;", stensor_t(n)))
                .line("T1.importTab(sig);")
                .line("const auto s1 = lgh1.convertToCauchyStress(T1);")
                .line("s1.exportTab(sig);");
        }
        ConvertLogarithmicTangentToSpatialModuli => {
            w.open("")
                .line(format!("{} Kl;", st2tost2_t(n)))
                .line("Kl.importTab(K);")
                .line("lgh1.convertToSpatialTangentModuli(Kl, T1).exportTab(K);")
                .close("");
        }
        ConvertTangentOperator { from, to } => {
            w.open("")
                .line("using tfel::material::FiniteStrainBehaviourTangentOperatorBase;")
                .line(format!("{} Kt;", st2tost2_t(n)))
                .line("Kt.importTab(K);")
                .line(format!(
                    "tfel::material::convert<FiniteStrainBehaviourTangentOperatorBase::{},\n    \
                     FiniteStrainBehaviourTangentOperatorBase::{}>(Kt, F0, F1, s1).exportTab(K);",
                    to, from
                ))
                .close("");
        }
        BuildRotationMatrix { source } => render_rotation_matrix(w, source, n),
        RotateToMaterialFrame { variables } => rotate(w, n, variables, "R"),
        RotateToGlobalFrame { variables } => {
            w.line("const auto Rt = tfel::math::transpose(R);");
            rotate(w, n, variables, "Rt");
        }
        RotateTangentToGlobalFrame => {
            w.open("")
                .line(format!("{} Kr;", st2tost2_t(n)))
                .line("Kr.importTab(K);")
                .line("Kr.changeBasis(Rt);")
                .line("Kr.exportTab(K);")
                .close("");
        }
        AccumulateStrain { host, size } => {
            w.line(format!(
                "for(unsigned short i = 0; i != {}; ++i){{ {}[i] += deto[i]; }}",
                size, host
            ));
        }
        CopyArray { from, to, size } => {
            w.line(format!("std::copy({f}, {f}+{}, {});", size, to, f = from));
        }
    }
}

fn render_rotation_matrix(w: &mut CxxWriter, source: &AxesSource, n: u16) {
    let matrix = "tfel::math::tmatrix<3u,3u,double>";
    match source {
        AxesSource::StateVariables { host } if n == 2 => {
            w.line(format!("const double* const v = {};", host)).line(format!(
                "const {} R = {{v[0], v[1], 0., -v[1], v[0], 0., 0., 0., 1.}};",
                matrix
            ));
        }
        AxesSource::StateVariables { host } => {
            w.line(format!(
                "const tfel::math::tvector<3u,double> v1 = {{{h}[0], {h}[1], {h}[2]}};",
                h = host
            ))
            .line(format!(
                "const tfel::math::tvector<3u,double> v2 = {{{h}[3], {h}[4], {h}[5]}};",
                h = host
            ))
            .line("const auto v3 = tfel::math::cross_product(v1, v2);")
            .line(format!(
                "const {} R = {{v1[0], v1[1], v1[2], v2[0], v2[1], v2[2], v3[0], v3[1], v3[2]}};",
                matrix
            ));
        }
        AxesSource::FortranMatrix { host } => {
            w.line(format!(
                "const auto R = {}::buildFromFortranMatrix({});",
                matrix, host
            ));
        }
        AxesSource::CMatrix { host } => {
            w.line(format!("{} R;", matrix))
                .line(format!("std::copy({h}, {h}+9, R.begin());", h = host));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::conventions::{
        component_map, tangent_map, ShearScaling, StensorOrdering, TensorConvention, TensorKind,
    };
    use crate::core::hypothesis::ModellingHypothesis;

    #[test]
    fn test_native_strategy_adds_nothing() {
        let p = strategy_pipeline(FiniteStrainStrategy::Native, "ABAQUS");
        assert_eq!(p, ConversionPipeline::default());
    }

    #[test]
    fn test_green_lagrange_pipeline() {
        let p = strategy_pipeline(FiniteStrainStrategy::FiniteRotationSmallStrain, "ABAQUS");
        assert_eq!(p.before[0], ConversionStep::ComputeGreenLagrangeStrain);
        assert_eq!(
            p.after.last(),
            Some(&ConversionStep::ConvertTangentOperator {
                from: "DS_DEGL".to_string(),
                to: "ABAQUS".to_string()
            })
        );
    }

    #[test]
    fn test_logarithmic_pipeline_skips_identity_tangent_conversion() {
        let p = strategy_pipeline(
            FiniteStrainStrategy::MieheApelLambrechtLogarithmicStrain,
            "SPATIAL_MODULI",
        );
        assert!(p.before.contains(&ConversionStep::BuildLogarithmicStrainHandlers));
        assert!(!p
            .after
            .iter()
            .any(|s| matches!(s, ConversionStep::ConvertTangentOperator { .. })));
    }

    #[test]
    fn test_render_import_with_swapped_shear() {
        let ansys = TensorConvention {
            ordering: StensorOrdering::ShearSwapped,
            scaling: ShearScaling::Engineering,
            reduced_plane_stress: false,
        };
        let map = component_map(&ansys, ModellingHypothesis::Tridimensional, TensorKind::Strain)
            .unwrap();
        let mut w = CxxWriter::new();
        render_steps(
            &mut w,
            &[ConversionStep::ImportStensor {
                host: "Strain".to_string(),
                local: "eto".to_string(),
                map,
            }],
            3,
        );
        let text = w.finish();
        assert!(text.contains("eto[4] = Strain[5]*cste_isqrt2;"));
        assert!(text.contains("eto[0] = Strain[0];"));
        assert!(text.contains("not stored in the same order"));
    }

    #[test]
    fn test_render_plane_stress_export_truncates() {
        let abaqus = TensorConvention {
            ordering: StensorOrdering::Tfel,
            scaling: ShearScaling::Engineering,
            reduced_plane_stress: true,
        };
        let h = ModellingHypothesis::PlaneStress;
        let map = component_map(&abaqus, h, TensorKind::Stress).unwrap();
        let mut w = CxxWriter::new();
        render_steps(
            &mut w,
            &[
                ConversionStep::ExportStensor {
                    local: "sig".to_string(),
                    host: "STRESS".to_string(),
                    map,
                },
                ConversionStep::ExportTangent {
                    local: "K".to_string(),
                    host: "DDSDDE".to_string(),
                    tfel_size: 4,
                    host_size: 3,
                    links: tangent_map(&abaqus, h).unwrap(),
                    column_major: true,
                },
            ],
            2,
        );
        let text = w.finish();
        assert!(text.contains("STRESS[2] = sig[3]*cste_isqrt2;"));
        assert!(!text.contains("sig[2]"));
        // D(xy,xy) = K(3,3)/2, column-major index 2+2*3
        assert!(text.contains("DDSDDE[8] = K[15]/2;"));
    }

    #[test]
    fn test_rotation_matrix_from_state_variables() {
        let mut w = CxxWriter::new();
        render_steps(
            &mut w,
            &[ConversionStep::BuildRotationMatrix {
                source: AxesSource::StateVariables {
                    host: "STATEV".to_string(),
                },
            }],
            3,
        );
        assert!(w.as_str().contains("cross_product(v1, v2)"));
    }

    #[test]
    fn test_render_copy_array() {
        let mut w = CxxWriter::new();
        render_steps(
            &mut w,
            &[ConversionStep::CopyArray {
                from: "STRAN".to_string(),
                to: "eto".to_string(),
                size: 3,
            }],
            3,
        );
        assert_eq!(w.as_str().trim(), "std::copy(STRAN, STRAN+3, eto);");
    }
}
