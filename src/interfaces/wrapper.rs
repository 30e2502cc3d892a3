//! Wrapper plans.
//!
//! [`InterfacePlan::build`] turns a behaviour and a host record into plain
//! data: entry points, per-hypothesis sizes and offsets, conversion steps,
//! symbol tables and MTest dumps. [`render_header`] and [`render_source`]
//! print a plan and make no decision of their own.
//!
//! Inside a generated function the behaviour always sees TFEL-layout arrays:
//! `eto`, `deto` (or `F0`, `F1`), `sig` and `K`. The host arrays are only
//! touched by the conversion steps.

use serde::Serialize;

use crate::codegen::conventions::{
    component_map, tangent_map, ComponentLink, ComponentMap, Scale, TensorKind,
};
use crate::codegen::mtest::MTestDump;
use crate::codegen::pipeline::{
    render_steps, strategy_pipeline, AxesSource, ConversionPipeline, ConversionStep,
};
use crate::codegen::symbols::{
    HypothesisSymbols, Symbol, SymbolTable, SymbolValue, SymbolsGenerator,
};
use crate::codegen::writer::{header_guard, quoted, real_literal, CxxWriter};
use crate::core::behaviour::{
    AttributeValue, BehaviourDescription, BehaviourType, StrainMeasure, SymmetryType,
};
use crate::core::file_description::FileDescription;
use crate::core::finite_strain::{resolve_strategy, FiniteStrainStrategy};
use crate::core::hypothesis::ModellingHypothesis;
use crate::core::material_properties::{
    build_material_properties_list_with_policy, MaterialPropertiesList,
};
use crate::core::type_size::VariableType;
use crate::interfaces::errors::GenerationError;
use crate::interfaces::host::{
    EntryPointStyle, HostId, HostProfile, KeywordValue, OrthotropyPolicy, Role,
    FINITE_STRAIN_STRATEGY, GENERATE_MTEST_ON_FAILURE,
};
use crate::interfaces::hosts::{aster, castem};
use crate::util::context::GenerationContext;

/// Local names declared by generated functions.
///
/// Host parameters must not use any of them.
pub const RESERVED_LOCALS: &[&str] = &[
    "data",
    "Integrator",
    "integrated",
    "dt",
    "T",
    "dT",
    "esvs",
    "desvs",
    "eto",
    "deto",
    "sig",
    "K",
    "F0",
    "F1",
    "R",
    "Rt",
    "v",
    "v1",
    "v2",
    "v3",
    "e0",
    "e1",
    "s0",
    "S1",
    "s1",
    "T1",
    "lgh0",
    "lgh1",
    "Kl",
    "Kt",
    "Kr",
    "sr",
    "eto0",
    "sig0",
    "isvs0",
    "cste_sqrt2",
    "cste_isqrt2",
    "LogarithmicStrainHandler",
    "mg",
    "msg",
    "ex",
    "i",
    "j",
    // time sub-stepping
    "eto_s",
    "deto_s",
    "sig_s",
    "isvs_s",
    "esvs_s",
    "desvs_s",
    "T_s",
    "remaining",
    "fraction",
    "subdivisions",
    "success",
    // tangent operator comparison
    "pert",
    "Kn",
    "sigp",
    "sigm",
    "deto_p",
    "K_p",
    "isvs_p",
    "data_p",
    "error",
];

/// How generated code reports errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ErrorReport {
    /// Throw a `std::runtime_error` to the host.
    Exception,
    /// Print the error on the standard error stream.
    #[default]
    Message,
    NoMessage,
}

impl ErrorReport {
    fn from_name(name: &str) -> Self {
        match name {
            "Exception" => ErrorReport::Exception,
            "NoMessage" => ErrorReport::NoMessage,
            _ => ErrorReport::Message,
        }
    }
}

/// Time sub-stepping on integration failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubStepping {
    pub maximum: u32,
    /// Treat non finite stresses as a failure.
    pub on_invalid_results: bool,
}

/// Comparison of the tangent operator to a centered finite difference.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TangentComparison {
    pub criterium: f64,
    pub perturbation: f64,
}

/// Options read from the host keywords and the generation context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WrapperOptions {
    pub mtest: bool,
    pub debug: bool,
    pub substepping: Option<SubStepping>,
    pub tangent_comparison: Option<TangentComparison>,
    /// Copy the tangent operator after the state variables.
    pub save_tangent: bool,
    pub error_report: ErrorReport,
    /// TFEL tangent operator kind expected by the host in finite strain.
    pub finite_strain_tangent: String,
}

impl WrapperOptions {
    pub fn new(host: &HostProfile, bd: &BehaviourDescription, ctx: &GenerationContext) -> Self {
        let key = |name: &str| host.attribute_key(name);
        let mtest_key = key(GENERATE_MTEST_ON_FAILURE);
        let mtest = if bd.has_attribute(&mtest_key) {
            bd.bool_attribute(&mtest_key)
        } else {
            ctx.generate_mtest_on_failure()
        };
        let substepping = bd
            .bool_attribute(&key(castem::USE_TIME_SUB_STEPPING))
            .then(|| SubStepping {
                maximum: bd
                    .float_attribute(&key(castem::MAXIMUM_SUB_STEPPING))
                    .map(|v| v as u32)
                    .unwrap_or(castem::DEFAULT_MAXIMUM_SUB_STEPPING),
                on_invalid_results: bd
                    .bool_attribute(&key(castem::DO_SUB_STEPPING_ON_INVALID_RESULTS)),
            });
        let tangent_comparison = bd
            .bool_attribute(&key(aster::COMPARE_TO_NUMERICAL_TANGENT_OPERATOR))
            .then(|| TangentComparison {
                criterium: bd
                    .float_attribute(&key(aster::TANGENT_OPERATOR_COMPARISON_CRITERIUM))
                    .unwrap_or(aster::DEFAULT_COMPARISON_CRITERIUM),
                perturbation: bd
                    .float_attribute(&key(aster::STRAIN_PERTURBATION_VALUE))
                    .unwrap_or(aster::DEFAULT_STRAIN_PERTURBATION),
            });
        let finite_strain_tangent = bd
            .string_attribute(&key(aster::FINITE_STRAIN_FORMULATION))
            .map(aster::formulation_tangent)
            .unwrap_or(host.finite_strain_tangent)
            .to_string();
        WrapperOptions {
            mtest,
            debug: ctx.is_debug(),
            substepping,
            tangent_comparison,
            save_tangent: bd.bool_attribute(&key(aster::SAVE_TANGENT_OPERATOR)),
            error_report: bd
                .string_attribute(&key(aster::ERROR_REPORT))
                .map(ErrorReport::from_name)
                .unwrap_or_default(),
            finite_strain_tangent,
        }
    }
}

/// What the behaviour is fed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Kinematics {
    /// Strains and stresses, possibly built from deformation gradients by a
    /// finite strain strategy.
    SmallStrain,
    /// Deformation gradients and Cauchy stresses.
    FiniteStrain,
    /// Gradients and forces copied as they are.
    Plain,
}

impl Kinematics {
    fn of(behaviour_type: BehaviourType) -> Self {
        match behaviour_type {
            BehaviourType::StandardStrainBasedBehaviour => Kinematics::SmallStrain,
            BehaviourType::StandardFiniteStrainBehaviour => Kinematics::FiniteStrain,
            BehaviourType::CohesiveZoneModel | BehaviourType::General => Kinematics::Plain,
        }
    }
}

/// Access to the external state variables of the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ExternalStateVariablesAccess {
    None,
    Increment { values: String, increments: String },
    AtEnd { values: String, at_end: String },
}

/// Compile-time traits of the behaviour for one hypothesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BehaviourTraits {
    pub material_properties_nb: usize,
    pub elastic_properties_nb: usize,
    pub properties_offset: usize,
    pub thermal_expansion_properties_offset: usize,
    pub internal_variables_nb: usize,
    pub external_variables_nb: usize,
    pub requires_stiffness_tensor: bool,
    pub requires_thermal_expansion_coefficient_tensor: bool,
}

/// Everything the wrapper of one hypothesis needs.
#[derive(Debug, Clone, Serialize)]
pub struct HypothesisPlan {
    pub hypothesis: ModellingHypothesis,
    /// Suffix or dispatch code of the hypothesis.
    pub binding: String,
    pub dimension: u16,
    pub stensor_size: usize,
    pub kinematics: Kinematics,
    pub uses_deformation_gradients: bool,
    pub gradient_size: usize,
    pub force_size: usize,
    pub tangent_rows: usize,
    pub tangent_columns: usize,
    /// Tangent operator kind requested from a finite strain behaviour.
    pub tangent_kind: Option<String>,
    pub material_properties: MaterialPropertiesList,
    pub material_properties_size: usize,
    /// State variables managed by the wrapper, before the behaviour ones.
    pub leading_state_variables: Vec<(String, VariableType)>,
    pub leading_size: usize,
    pub state_variables_size: usize,
    /// Values stored after the behaviour state variables.
    pub trailing_size: usize,
    /// Position of every state variable in the host array.
    pub state_variable_offsets: Vec<(String, usize)>,
    /// Host array updated by the integration.
    pub state_variables: String,
    pub external_state_variables_size: usize,
    pub external_state_variables: ExternalStateVariablesAccess,
    pub temperature: String,
    pub temperature_increment: String,
    pub pipeline: ConversionPipeline,
    pub mtest: Option<MTestDump>,
    pub traits: BehaviourTraits,
}

/// An exported function.
#[derive(Debug, Clone, Serialize)]
pub struct EntryPointPlan {
    pub name: String,
    pub hypotheses: Vec<ModellingHypothesis>,
    pub symbols: SymbolTable,
}

/// Generated glue of a behaviour for a host.
#[derive(Debug, Clone)]
pub struct InterfacePlan<'a> {
    pub host: &'a HostProfile,
    pub behaviour: String,
    pub class_name: String,
    pub behaviour_type: BehaviourType,
    pub symmetry: SymmetryType,
    pub elastic_symmetry: SymmetryType,
    /// Library receiving the source.
    pub library: String,
    /// Header path, relative to `include/`.
    pub header: String,
    /// Source file name, relative to `src/`.
    pub source: String,
    pub file_description: FileDescription,
    pub strategy: Option<FiniteStrainStrategy>,
    pub options: WrapperOptions,
    pub hypotheses: Vec<HypothesisPlan>,
    pub entry_points: Vec<EntryPointPlan>,
}

impl<'a> InterfacePlan<'a> {
    /// Plan the glue of `bd` for the given hypotheses.
    ///
    /// Fails before anything is written on an unsupported behaviour type,
    /// an incompatible finite strain strategy or a behaviour the host ABI
    /// can't carry.
    pub fn build(
        host: &'a HostProfile,
        bd: &BehaviourDescription,
        ctx: &GenerationContext,
        hypotheses: &[ModellingHypothesis],
        orthotropy: OrthotropyPolicy,
    ) -> Result<Self, GenerationError> {
        if !host.supports_behaviour_type(bd.behaviour_type) {
            return Err(GenerationError::UnsupportedBehaviourType {
                interface: host.name().to_string(),
                behaviour_type: bd.behaviour_type.to_string(),
                supported: host.behaviour_types.iter().map(|t| t.to_string()).collect(),
            });
        }
        let strategy = if host.finite_strain_strategies {
            resolve_strategy(bd, host.name())?
        } else {
            match bd.strain_measure()? {
                Some(m) if bd.is_strain_based() && m != StrainMeasure::Linearised => {
                    return Err(GenerationError::UnsupportedFeature {
                        interface: host.name().to_string(),
                        feature: format!("the `{}` strain measure", m.as_str()),
                    });
                }
                _ => None,
            }
        };
        let kinematics = Kinematics::of(bd.behaviour_type);
        let small_strain = kinematics == Kinematics::SmallStrain
            && !strategy.is_some_and(|s| s.uses_deformation_gradients());

        let mut options = WrapperOptions::new(host, bd, ctx);
        if !small_strain {
            if options.mtest {
                tracing::warn!(
                    "MTest files are only generated for small strain kinematics, none for `{}`",
                    bd.behaviour_name()
                );
                options.mtest = false;
            }
            if options.substepping.take().is_some() {
                tracing::warn!("time sub-stepping ignored for `{}`", bd.behaviour_name());
            }
            if options.tangent_comparison.take().is_some() {
                tracing::warn!(
                    "tangent operator comparison ignored for `{}`",
                    bd.behaviour_name()
                );
            }
        }

        let plans = hypotheses
            .iter()
            .map(|&h| plan_hypothesis(host, bd, h, kinematics, strategy, orthotropy, &options))
            .collect::<Result<Vec<_>, _>>()?;

        let name = bd.behaviour_name();
        let library = bd.library_name();
        let header = format!(
            "MFront/{}/{}{}{}.hxx",
            host.include_dir, host.file_prefix, library, name
        );
        let source = format!("{}{}{}.cxx", host.file_prefix, library, name);

        let functions: Vec<(String, Vec<ModellingHypothesis>)> = match host.entry_points {
            EntryPointStyle::PerHypothesis => plans
                .iter()
                .map(|hp| {
                    let f = if hp.binding.is_empty() {
                        name.clone()
                    } else {
                        format!("{}_{}", name, hp.binding)
                    };
                    (f, vec![hp.hypothesis])
                })
                .collect(),
            EntryPointStyle::Dispatched { prefix, suffix } => vec![(
                format!("{}{}{}", prefix, name.to_lowercase(), suffix),
                hypotheses.to_vec(),
            )],
        };
        let entry_points = functions
            .into_iter()
            .map(|(f, treated)| {
                let generator = SymbolsGenerator {
                    interface: host.name(),
                    function: &f,
                    source_file: &source,
                    policy_class: host.policy_class(),
                    temperature_removed: host.temperature_removed,
                    strategy,
                };
                let inputs: Vec<HypothesisSymbols<'_>> = plans
                    .iter()
                    .filter(|hp| treated.contains(&hp.hypothesis))
                    .map(|hp| HypothesisSymbols {
                        hypothesis: hp.hypothesis,
                        material_properties: &hp.material_properties,
                        leading_state_variables: &hp.leading_state_variables,
                    })
                    .collect();
                let mut symbols = generator.generate(bd, &inputs);
                symbols.extend(host_symbols(host, bd, &f));
                EntryPointPlan {
                    name: f,
                    hypotheses: treated,
                    symbols,
                }
            })
            .collect();

        Ok(InterfacePlan {
            host,
            behaviour: name,
            class_name: bd.class_name.clone(),
            behaviour_type: bd.behaviour_type,
            symmetry: bd.symmetry,
            elastic_symmetry: bd.elastic_symmetry(),
            library: host.library_name(library),
            header,
            source,
            file_description: bd.file_description.clone(),
            strategy,
            options,
            hypotheses: plans,
            entry_points,
        })
    }

    /// Names of the exported functions.
    pub fn entry_point_names(&self) -> Vec<String> {
        self.entry_points.iter().map(|e| e.name.clone()).collect()
    }

    pub fn hypothesis(&self, h: ModellingHypothesis) -> Option<&HypothesisPlan> {
        self.hypotheses.iter().find(|hp| hp.hypothesis == h)
    }
}

fn identity_map(size: usize) -> ComponentMap {
    ComponentMap {
        tfel_size: size,
        host_size: size,
        links: (0..size)
            .map(|i| ComponentLink {
                tfel: i,
                host: Some(i),
                to_tfel: Scale::One,
            })
            .collect(),
    }
}

fn declare(name: &str, size: usize) -> ConversionStep {
    ConversionStep::DeclareArray {
        name: name.to_string(),
        size,
    }
}

fn copy(from: &str, to: &str, size: usize) -> ConversionStep {
    ConversionStep::CopyArray {
        from: from.to_string(),
        to: to.to_string(),
        size,
    }
}

fn plan_hypothesis(
    host: &HostProfile,
    bd: &BehaviourDescription,
    h: ModellingHypothesis,
    kinematics: Kinematics,
    strategy: Option<FiniteStrainStrategy>,
    orthotropy: OrthotropyPolicy,
    options: &WrapperOptions,
) -> Result<HypothesisPlan, GenerationError> {
    use ConversionStep::*;

    let unsupported = |feature: &str| GenerationError::UnsupportedFeature {
        interface: host.name().to_string(),
        feature: feature.to_string(),
    };
    let required = |role: Role, feature: &str| host.expr(role).ok_or_else(|| unsupported(feature));

    let n = h.space_dimension()?;
    let ssize = usize::from(h.stensor_size()?);
    let tsize = usize::from(h.tensor_size()?);
    let data = bd.data(h);
    let uses_f = kinematics == Kinematics::FiniteStrain
        || strategy.is_some_and(|s| s.uses_deformation_gradients());

    let (gradient_size, force_size) = match kinematics {
        Kinematics::SmallStrain => (ssize, ssize),
        Kinematics::FiniteStrain => (tsize, ssize),
        Kinematics::Plain => {
            let mut g = 0;
            let mut f = 0;
            for mv in bd.main_variables() {
                g += mv.gradient.type_size().index_for_hypothesis(h)?;
                f += mv.force.type_size().index_for_hypothesis(h)?;
            }
            (g, f)
        }
    };
    let host_tangent = uses_f.then_some(options.finite_strain_tangent.as_str());
    let (tangent_rows, tangent_columns) = match (kinematics, host_tangent) {
        (Kinematics::Plain, _) => (force_size, gradient_size),
        (_, Some("DSIG_DF" | "DTAU_DDF")) => (ssize, tsize),
        (_, Some("DPK1_DF")) => (tsize, tsize),
        _ => (ssize, ssize),
    };
    let tangent_size = tangent_rows * tangent_columns;

    let axes = if bd.symmetry == SymmetryType::Orthotropic
        && n > 1
        && kinematics != Kinematics::Plain
    {
        orthotropy.axes_source(host)
    } else {
        None
    };
    if axes.is_some() && (tangent_rows, tangent_columns) != (ssize, ssize) {
        return Err(unsupported("the rotation of non symmetric tangent operators"));
    }

    let mut leading = Vec::new();
    if host.stored_strain && kinematics == Kinematics::SmallStrain && !uses_f {
        leading.push(("Strain".to_string(), VariableType::Stensor));
    }
    if matches!(axes, Some(AxesSource::StateVariables { .. })) {
        leading.push(("FirstOrthotropicAxis".to_string(), VariableType::TVector));
        if n == 3 {
            leading.push(("SecondOrthotropicAxis".to_string(), VariableType::TVector));
        }
    }

    let mut state_variable_offsets = Vec::new();
    let mut offset = 0;
    for (name, ty) in &leading {
        state_variable_offsets.push((name.clone(), offset));
        offset += ty.type_size().index_for_hypothesis(h)?;
    }
    let leading_size = offset;
    for v in &data.state_variables {
        let size = v.variable_type().type_size().index_for_hypothesis(h)?;
        for name in v.expanded_external_names() {
            state_variable_offsets.push((name, offset));
            offset += size;
        }
    }
    let nisvs = data.state_variables_size().index_for_hypothesis(h)?;
    let trailing_size = if options.save_tangent { tangent_size } else { 0 };

    let mpl = build_material_properties_list_with_policy(bd, h, host.material_properties)?;
    let material_properties_size = mpl.total_size().index_for_hypothesis(h)?;
    let properties_offset = mpl.user_offset().index_for_hypothesis(h)?;

    let nesv = data.external_state_variables_size().index_for_hypothesis(h)?;
    let external_state_variables = if nesv == 0 {
        ExternalStateVariablesAccess::None
    } else {
        match (
            host.expr(Role::ExternalStateVariables),
            host.expr(Role::ExternalStateVariablesIncrement),
            host.expr(Role::ExternalStateVariablesAtEnd),
        ) {
            (Some(values), Some(increments), _) => {
                ExternalStateVariablesAccess::Increment { values, increments }
            }
            (Some(values), None, Some(at_end)) => {
                ExternalStateVariablesAccess::AtEnd { values, at_end }
            }
            _ => return Err(unsupported("external state variables")),
        }
    };

    let temperature = host
        .expr(Role::Temperature)
        .unwrap_or_else(|| "0.".to_string());
    let temperature_increment = match (
        host.expr(Role::TemperatureIncrement),
        host.expr(Role::TemperatureAtEnd),
    ) {
        (Some(dt), _) => dt,
        (None, Some(at_end)) => format!("{}-T", at_end),
        (None, None) => "0.".to_string(),
    };

    let isvs_in = required(Role::StateVariables, "state variables")?;
    let isvs = host
        .expr(Role::StateVariablesOut)
        .unwrap_or_else(|| isvs_in.clone());
    let stress_in = required(Role::Stress, "stresses")?;
    let stress_out = host
        .expr(Role::StressOut)
        .unwrap_or_else(|| stress_in.clone());
    let tangent = required(Role::Tangent, "tangent operators")?;

    let mut pipeline = ConversionPipeline::default();
    if isvs != isvs_in && leading_size + nisvs > 0 {
        pipeline.before.push(copy(&isvs_in, &isvs, leading_size + nisvs));
    }
    match kinematics {
        Kinematics::Plain => {
            pipeline.before.push(declare("eto", gradient_size));
            pipeline.before.push(declare("deto", gradient_size));
            pipeline.before.push(declare("sig", force_size));
            pipeline.before.push(declare("K", tangent_size));
            let g0 = required(Role::Strain, "gradients")?;
            pipeline.before.push(copy(&g0, "eto", gradient_size));
            if let Some(dg) = host.expr(Role::StrainIncrement) {
                pipeline.before.push(copy(&dg, "deto", gradient_size));
            } else if let Some(g1) = host.expr(Role::StrainAtEnd) {
                pipeline.before.push(ImportStensorIncrement {
                    host_begin: g0,
                    host_end: g1,
                    local: "deto".to_string(),
                    map: identity_map(gradient_size),
                });
            } else {
                return Err(unsupported("gradient increments"));
            }
            pipeline.before.push(copy(&stress_in, "sig", force_size));
            pipeline.after.push(copy("sig", &stress_out, force_size));
            pipeline.after.push(copy("K", &tangent, tangent_size));
        }
        Kinematics::SmallStrain | Kinematics::FiniteStrain => {
            let strain_map = component_map(&host.convention, h, TensorKind::Strain)?;
            let stress_map = component_map(&host.convention, h, TensorKind::Stress)?;
            if kinematics == Kinematics::SmallStrain {
                pipeline.before.push(declare("eto", ssize));
                pipeline.before.push(declare("deto", ssize));
            }
            pipeline.before.push(declare("sig", ssize));
            pipeline.before.push(declare("K", tangent_size));

            let mut rotated = Vec::new();
            if uses_f {
                let f0 = required(Role::DeformationGradient0, "deformation gradients")?;
                let f1 = required(Role::DeformationGradient1, "deformation gradients")?;
                for (local, expr) in [("F0", f0), ("F1", f1)] {
                    pipeline.before.push(ImportDeformationGradient {
                        host: expr,
                        local: local.to_string(),
                        layout: host.gradient_layout,
                    });
                    rotated.push((local.to_string(), VariableType::Tensor));
                }
            } else {
                if host.stored_strain {
                    pipeline.before.push(copy(&isvs_in, "eto", ssize));
                } else {
                    let e0 = required(Role::Strain, "small strain kinematics")?;
                    pipeline.before.push(ImportStensor {
                        host: e0,
                        local: "eto".to_string(),
                        map: strain_map.clone(),
                    });
                }
                if let Some(de) = host.expr(Role::StrainIncrement) {
                    pipeline.before.push(ImportStensor {
                        host: de,
                        local: "deto".to_string(),
                        map: strain_map.clone(),
                    });
                } else if let (Some(e0), Some(e1)) =
                    (host.expr(Role::Strain), host.expr(Role::StrainAtEnd))
                {
                    pipeline.before.push(ImportStensorIncrement {
                        host_begin: e0,
                        host_end: e1,
                        local: "deto".to_string(),
                        map: strain_map.clone(),
                    });
                } else {
                    return Err(unsupported("strain increments"));
                }
                rotated.push(("eto".to_string(), VariableType::Stensor));
                rotated.push(("deto".to_string(), VariableType::Stensor));
            }
            pipeline.before.push(ImportStensor {
                host: stress_in,
                local: "sig".to_string(),
                map: stress_map.clone(),
            });
            rotated.push(("sig".to_string(), VariableType::Stensor));
            if let Some(source) = axes.clone() {
                pipeline.before.push(BuildRotationMatrix { source });
                pipeline.before.push(RotateToMaterialFrame { variables: rotated });
            }
            if let (Some(s), Kinematics::SmallStrain, Some(to)) = (strategy, kinematics, host_tangent)
            {
                pipeline.extend(strategy_pipeline(s, to));
            }
            if axes.is_some() {
                pipeline.after.push(RotateToGlobalFrame {
                    variables: vec![("sig".to_string(), VariableType::Stensor)],
                });
                pipeline.after.push(RotateTangentToGlobalFrame);
            }
            pipeline.after.push(ExportStensor {
                local: "sig".to_string(),
                host: stress_out,
                map: stress_map.clone(),
            });
            if (tangent_rows, tangent_columns) == (ssize, ssize) {
                pipeline.after.push(ExportTangent {
                    local: "K".to_string(),
                    host: tangent.clone(),
                    tfel_size: ssize,
                    host_size: stress_map.host_size,
                    links: tangent_map(&host.convention, h)?,
                    column_major: host.tangent_column_major,
                });
            } else {
                pipeline.after.push(copy("K", &tangent, tangent_size));
            }
            if host.stored_strain && !uses_f {
                pipeline.after.push(AccumulateStrain {
                    host: isvs.clone(),
                    size: ssize,
                });
            }
        }
    }
    if options.save_tangent {
        pipeline.after.push(copy(
            &tangent,
            &format!("{}+{}", isvs, leading_size + nisvs),
            trailing_size,
        ));
    }

    let mtest = if options.mtest {
        let mps = required(Role::MaterialProperties, "material properties")?;
        Some(MTestDump::new(host.name(), bd, &mpl, &mps, leading_size)?)
    } else {
        None
    };

    let traits = BehaviourTraits {
        material_properties_nb: material_properties_size - properties_offset,
        elastic_properties_nb: mpl.elastic_properties,
        properties_offset,
        thermal_expansion_properties_offset: mpl.thermal_expansion_offset(),
        internal_variables_nb: nisvs,
        external_variables_nb: nesv,
        requires_stiffness_tensor: bd.requires_stiffness_tensor(),
        requires_thermal_expansion_coefficient_tensor: bd
            .requires_thermal_expansion_coefficient_tensor(),
    };

    Ok(HypothesisPlan {
        hypothesis: h,
        binding: host.binding(h).unwrap_or_default().to_string(),
        dimension: n,
        stensor_size: ssize,
        kinematics,
        uses_deformation_gradients: uses_f,
        gradient_size,
        force_size,
        tangent_rows,
        tangent_columns,
        tangent_kind: (kinematics == Kinematics::FiniteStrain)
            .then(|| options.finite_strain_tangent.clone()),
        material_properties: mpl,
        material_properties_size,
        leading_state_variables: leading,
        leading_size,
        state_variables_size: nisvs,
        trailing_size,
        state_variable_offsets,
        state_variables: isvs,
        external_state_variables_size: nesv,
        external_state_variables,
        temperature,
        temperature_increment,
        pipeline,
        mtest,
        traits,
    })
}

/// Symbols exporting the host keywords set on the behaviour.
fn host_symbols(host: &HostProfile, bd: &BehaviourDescription, function: &str) -> SymbolTable {
    let mut t = SymbolTable::default();
    for kw in host.keywords {
        if kw.name == GENERATE_MTEST_ON_FAILURE || kw.name == FINITE_STRAIN_STRATEGY {
            continue;
        }
        let name = format!("{}_{}", function, kw.name);
        let symbol = match (kw.value, bd.attributes.get(&host.attribute_key(kw.name))) {
            (KeywordValue::Flag | KeywordValue::Bool, Some(AttributeValue::Bool(b))) => {
                Symbol::flag(name, *b)
            }
            (KeywordValue::UnsignedInt, Some(AttributeValue::Float(v))) => {
                Symbol::new(name, SymbolValue::UShort(*v as u16))
            }
            (KeywordValue::Real, Some(AttributeValue::Float(v))) => {
                Symbol::new(name, SymbolValue::Real(*v))
            }
            (KeywordValue::Choice(_), Some(AttributeValue::String(s))) => {
                Symbol::new(name, SymbolValue::Str(s.clone()))
            }
            _ => continue,
        };
        t.symbols.push(symbol);
    }
    t
}

fn offset_expr(base: &str, offset: usize) -> String {
    if offset == 0 {
        base.to_string()
    } else {
        format!("{}+{}", base, offset)
    }
}

/// Render the header declaring the traits and the entry points.
pub fn render_header(plan: &InterfacePlan<'_>) -> String {
    let host = plan.host;
    let guard = header_guard(&plan.header);
    let mut w = CxxWriter::new();
    w.lines(plan.file_description.banner(
        &plan.header,
        &format!("{} interface of the {} behaviour", host.name(), plan.behaviour),
    ))
    .blank()
    .line(format!("#ifndef {}", guard))
    .line(format!("#define {}", guard))
    .blank()
    .line("#include\"TFEL/Config/TFELConfig.hxx\"")
    .line("#include\"TFEL/Material/ModellingHypothesis.hxx\"")
    .line(format!(
        "#include\"MFront/{}/{}Traits.hxx\"",
        host.include_dir, host.class_prefix
    ));
    if host.id == HostId::Generic {
        w.line("#include\"MFront/GenericBehaviour/BehaviourData.h\"");
    }
    w.blank()
        .line("#ifndef MFRONT_SHAREDOBJ")
        .line("#define MFRONT_SHAREDOBJ TFEL_VISIBILITY_EXPORT")
        .line("#endif")
        .blank()
        .open("namespace tfel::material")
        .line("template<ModellingHypothesis::Hypothesis, typename NumType, bool use_qt>")
        .line(format!("class {};", plan.class_name))
        .close(" // end of namespace tfel::material")
        .blank()
        .open(format!("namespace {}", host.namespace));
    for hp in &plan.hypotheses {
        render_traits(&mut w, plan, hp);
    }
    w.close(&format!(" // end of namespace {}", host.namespace))
        .blank()
        .line("#ifdef __cplusplus")
        .line("extern \"C\" {")
        .line("#endif")
        .blank();
    for ep in &plan.entry_points {
        w.line(format!(
            "MFRONT_SHAREDOBJ {} {}({});",
            host.return_type,
            ep.name,
            host.signature()
        ))
        .blank();
    }
    w.line("#ifdef __cplusplus")
        .line("}")
        .line("#endif")
        .blank()
        .line(format!("#endif /* {} */", guard));
    w.finish()
}

fn render_traits(w: &mut CxxWriter, plan: &InterfacePlan<'_>, hp: &HypothesisPlan) {
    let prefix = plan.host.class_prefix;
    let t = &hp.traits;
    let flag = |b: bool| if b { "true" } else { "false" };
    w.line("template<>")
        .open(format!(
            "struct {}Traits<tfel::material::{}<tfel::material::{},double,false>>",
            prefix,
            plan.class_name,
            hp.hypothesis.cxx_enumerator()
        ))
        .line("using ModellingHypothesis = tfel::material::ModellingHypothesis;")
        .line(format!(
            "static constexpr ModellingHypothesis::Hypothesis H = {};",
            hp.hypothesis.cxx_enumerator()
        ))
        .line(format!("static constexpr unsigned short N = {};", hp.dimension))
        .line(format!(
            "static constexpr {p}BehaviourType btype = {p}BehaviourType::{};",
            plan.behaviour_type.tfel_enumerator(),
            p = prefix
        ))
        .line(format!(
            "static constexpr bool requiresStiffnessTensor = {};",
            flag(t.requires_stiffness_tensor)
        ))
        .line(format!(
            "static constexpr bool requiresThermalExpansionCoefficientTensor = {};",
            flag(t.requires_thermal_expansion_coefficient_tensor)
        ))
        .line(format!(
            "static constexpr unsigned short material_properties_nb = {};",
            t.material_properties_nb
        ))
        .line(format!(
            "static constexpr unsigned short elastic_properties_nb = {};",
            t.elastic_properties_nb
        ))
        .line(format!(
            "static constexpr unsigned short propertiesOffset = {};",
            t.properties_offset
        ))
        .line(format!(
            "static constexpr unsigned short thermalExpansionPropertiesOffset = {};",
            t.thermal_expansion_properties_offset
        ))
        .line(format!(
            "static constexpr unsigned short internal_variables_nb = {};",
            t.internal_variables_nb
        ))
        .line(format!(
            "static constexpr unsigned short external_variables_nb = {};",
            t.external_variables_nb
        ))
        .line(format!(
            "static constexpr {p}SymmetryType type = {p}SymmetryType::{};",
            plan.symmetry.tfel_enumerator(),
            p = prefix
        ))
        .line(format!(
            "static constexpr {p}SymmetryType etype = {p}SymmetryType::{};",
            plan.elastic_symmetry.tfel_enumerator(),
            p = prefix
        ))
        .close(";")
        .blank();
}

/// Render the source defining the symbols and the entry points.
pub fn render_source(plan: &InterfacePlan<'_>) -> String {
    let host = plan.host;
    let mut w = CxxWriter::new();
    w.lines(plan.file_description.banner(
        &format!("src/{}", plan.source),
        &format!("{} interface of the {} behaviour", host.name(), plan.behaviour),
    ))
    .blank();
    for header in ["algorithm", "cmath", "iostream", "sstream", "stdexcept", "vector"] {
        w.line(format!("#include<{}>", header));
    }
    w.blank();
    for header in ["stensor", "st2tost2", "tensor", "tmatrix", "tvector"] {
        w.line(format!("#include\"TFEL/Math/{}.hxx\"", header));
    }
    if plan.hypotheses.iter().any(|hp| hp.uses_deformation_gradients) {
        w.line("#include\"TFEL/Material/FiniteStrainBehaviourTangentOperator.hxx\"");
    }
    if plan.strategy == Some(FiniteStrainStrategy::MieheApelLambrechtLogarithmicStrain) {
        w.line("#include\"TFEL/Material/LogarithmicStrainHandler.hxx\"");
    }
    w.line(format!("#include\"TFEL/Material/{}.hxx\"", plan.class_name))
        .line(format!(
            "#include\"MFront/{}/{}Interface.hxx\"",
            host.include_dir, host.class_prefix
        ))
        .line(format!(
            "#include\"MFront/{}/{}OutOfBoundsPolicy.hxx\"",
            host.include_dir, host.class_prefix
        ));
    if let Some(dump) = plan.hypotheses.iter().find_map(|hp| hp.mtest.as_ref()) {
        w.line(dump.include());
    }
    w.line(format!("#include{}", quoted(&plan.header)))
        .blank()
        .line("extern \"C\" {")
        .blank();
    for ep in &plan.entry_points {
        ep.symbols.render(&mut w);
        w.blank();
        render_entry_point(&mut w, plan, ep);
        w.blank();
    }
    w.line("} // end of extern \"C\"");
    w.finish()
}

fn render_failure(w: &mut CxxWriter, host: &HostProfile) {
    w.lines(host.failure.statements);
    match host.failure.return_values {
        Some((_, failure)) => w.line(format!("return {};", failure)),
        None => w.line("return;"),
    };
}

/// Report an error; `message` is a C++ stream expression.
fn render_report(w: &mut CxxWriter, mode: ErrorReport, function: &str, message: &str) {
    match mode {
        ErrorReport::Message => {
            w.line(format!(
                "std::cerr << \"{}: \" << {} << '\\n';",
                function, message
            ));
        }
        ErrorReport::Exception => {
            w.open("")
                .line("std::ostringstream msg;")
                .line(format!("msg << \"{}: \" << {};", function, message))
                .line("throw(std::runtime_error(msg.str()));")
                .close("");
        }
        ErrorReport::NoMessage => {}
    }
}

fn render_entry_point(w: &mut CxxWriter, plan: &InterfacePlan<'_>, ep: &EntryPointPlan) {
    let host = plan.host;
    let mode = plan.options.error_report;
    w.line(format!(
        "MFRONT_SHAREDOBJ {} {}({})",
        host.return_type,
        ep.name,
        host.signature()
    ))
    .open("")
    .line("using tfel::material::ModellingHypothesis;")
    .line("constexpr const auto cste_sqrt2 = tfel::math::Cste<double>::sqrt2;")
    .line("constexpr const auto cste_isqrt2 = tfel::math::Cste<double>::isqrt2;")
    .line("static_cast<void>(cste_sqrt2);")
    .line("static_cast<void>(cste_isqrt2);");
    for p in host.parameters.iter().filter(|p| p.role == Role::Unused) {
        w.line(format!("static_cast<void>({});", p.name));
    }
    w.open("try");
    let treated = plan
        .hypotheses
        .iter()
        .filter(|hp| ep.hypotheses.contains(&hp.hypothesis));
    match host.entry_points {
        EntryPointStyle::PerHypothesis => {
            for hp in treated {
                render_body(w, plan, &ep.name, hp);
            }
        }
        EntryPointStyle::Dispatched { .. } => {
            let code = host.expr(Role::Dispatch).unwrap_or_default();
            for (i, hp) in treated.enumerate() {
                let keyword = if i == 0 { "if" } else { "else if" };
                w.open(format!("{}({} == {})", keyword, code, hp.binding));
                render_body(w, plan, &ep.name, hp);
                w.close("");
            }
            w.open("else");
            render_report(w, mode, &ep.name, "\"unsupported modelling hypothesis\"");
            render_failure(w, host);
            w.close("");
        }
    }
    w.close("");
    for (handler, what) in [
        ("catch(std::exception& ex)", "ex.what()"),
        ("catch(...)", "\"unknown exception\""),
    ] {
        w.open(handler);
        match mode {
            ErrorReport::Exception => {
                w.lines(host.failure.statements).line("throw;");
            }
            _ => {
                if mode == ErrorReport::Message {
                    w.line(format!(
                        "std::cerr << \"{}: \" << {} << '\\n';",
                        ep.name, what
                    ));
                }
                render_failure(w, host);
            }
        }
        w.close("");
    }
    if let Some((success, _)) = host.failure.return_values {
        w.line(format!("return {};", success));
    }
    w.close("");
}

fn render_body(w: &mut CxxWriter, plan: &InterfacePlan<'_>, function: &str, hp: &HypothesisPlan) {
    let host = plan.host;
    let options = &plan.options;
    let mode = options.error_report;
    let mps = host.expr(Role::MaterialProperties).unwrap_or_default();
    if options.debug {
        w.comment(format!("{} ({})", hp.hypothesis, hp.binding));
        for e in &hp.material_properties.entries {
            if let Ok(offset) = e.offset.index_for_hypothesis(hp.hypothesis) {
                w.comment(format!("{}[{}]: {}", mps, offset, e.name));
            }
        }
        for (name, offset) in &hp.state_variable_offsets {
            w.comment(format!("{}[{}]: {}", hp.state_variables, offset, name));
        }
    }
    if let Some(nprops) = host.expr(Role::NumberOfMaterialProperties) {
        w.open(format!("if({} != {})", nprops, hp.material_properties_size));
        render_report(
            w,
            mode,
            function,
            &format!(
                "\"invalid number of material properties (\" << {} << \" given, {} expected)\"",
                nprops, hp.material_properties_size
            ),
        );
        render_failure(w, host);
        w.close("");
    }
    if let Some(nstatv) = host.expr(Role::NumberOfStateVariables) {
        let expected = hp.leading_size + hp.state_variables_size + hp.trailing_size;
        w.open(format!("if({} != {})", nstatv, expected));
        render_report(
            w,
            mode,
            function,
            &format!(
                "\"invalid number of state variables (\" << {} << \" given, {} expected)\"",
                nstatv, expected
            ),
        );
        render_failure(w, host);
        w.close("");
    }

    w.line(format!(
        "const double dt = {};",
        host.expr(Role::TimeIncrement).unwrap_or_default()
    ))
    .line(format!("const double T = {};", hp.temperature))
    .line(format!("const double dT = {};", hp.temperature_increment));
    match &hp.external_state_variables {
        ExternalStateVariablesAccess::None => {
            w.line("const double* const esvs = nullptr;")
                .line("const double* const desvs = nullptr;");
        }
        ExternalStateVariablesAccess::Increment { values, increments } => {
            w.line(format!("const double* const esvs = {};", values))
                .line(format!("const double* const desvs = {};", increments));
        }
        ExternalStateVariablesAccess::AtEnd { values, at_end } => {
            let n = hp.external_state_variables_size;
            w.line(format!("const double* const esvs = {};", values))
                .line(format!("double desvs[{}];", n))
                .line(format!(
                    "for(unsigned short i = 0; i != {}; ++i){{ desvs[i] = {}[i]-esvs[i]; }}",
                    n, at_end
                ));
        }
    }
    w.line("static_cast<void>(esvs);")
        .line("static_cast<void>(desvs);");
    render_steps(w, &hp.pipeline.before, hp.dimension);
    if hp.mtest.is_some() || options.tangent_comparison.is_some() {
        MTestDump::save_initial_state(
            w,
            hp.stensor_size,
            &(hp.leading_size + hp.state_variables_size).to_string(),
            &hp.state_variables,
        );
    }

    w.line(format!(
        "using Integrator = {};",
        host.adaptor(hp.hypothesis, &plan.class_name)
    ))
    .line("Integrator::Data data;")
    .line("data.dt = dt;")
    .line("data.T = T;")
    .line("data.dT = dT;")
    .line(format!("data.mps = {};", mps))
    .line(format!(
        "data.isvs = {};",
        offset_expr(&hp.state_variables, hp.leading_size)
    ))
    .line("data.esvs = esvs;")
    .line("data.desvs = desvs;");
    match hp.kinematics {
        Kinematics::FiniteStrain => {
            w.line("data.F0 = F0.begin();").line("data.F1 = F1.begin();");
            if let Some(kind) = &hp.tangent_kind {
                w.line(format!(
                    "data.tangent_operator = tfel::material::FiniteStrainBehaviourTangentOperatorBase::{};",
                    kind
                ));
            }
        }
        Kinematics::Plain => {
            w.line("data.g0 = eto;").line("data.dg = deto;");
        }
        Kinematics::SmallStrain => {
            w.line("data.eto = eto;").line("data.deto = deto;");
        }
    }
    w.line("data.sig = sig;").line("data.K = K;");

    match &options.substepping {
        Some(ss) => render_substepping(w, hp, ss),
        None => {
            w.line("const bool integrated = Integrator::exe(data);");
        }
    }
    w.open("if(!integrated)");
    if let Some(dump) = &hp.mtest {
        dump.render(w);
    }
    render_report(w, mode, function, "\"integration failed\"");
    render_failure(w, host);
    w.close("");
    if let Some(tc) = &options.tangent_comparison {
        render_tangent_comparison(w, plan, function, hp, tc);
    }
    render_steps(w, &hp.pipeline.after, hp.dimension);
}

fn render_substepping(w: &mut CxxWriter, hp: &HypothesisPlan, ss: &SubStepping) {
    let s = hp.stensor_size;
    let nisvs = hp.state_variables_size;
    let nesv = hp.external_state_variables_size;
    w.comment("time sub-stepping")
        .line(format!("double eto_s[{}];", s))
        .line(format!("std::copy(eto, eto+{}, eto_s);", s))
        .line(format!("double deto_s[{}];", s))
        .line(format!("double sig_s[{}];", s))
        .line(format!("std::copy(sig, sig+{}, sig_s);", s))
        .line(format!(
            "std::vector<double> isvs_s(data.isvs, data.isvs+{});",
            nisvs
        ));
    if nesv > 0 {
        w.line(format!("std::vector<double> esvs_s(esvs, esvs+{});", nesv))
            .line(format!("std::vector<double> desvs_s({});", nesv));
    }
    w.line("double T_s = T;")
        .line("double remaining = 1.;")
        .line("double fraction = 1.;")
        .line("unsigned short subdivisions = 0;")
        .line("bool integrated = true;")
        .open("while((remaining > 0.) && (integrated))")
        .line(format!(
            "for(unsigned short i = 0; i != {}; ++i){{ deto_s[i] = fraction*deto[i]; }}",
            s
        ));
    if nesv > 0 {
        w.line(format!(
            "for(unsigned short i = 0; i != {}; ++i){{ desvs_s[i] = fraction*desvs[i]; }}",
            nesv
        ))
        .line("data.esvs = esvs_s.data();")
        .line("data.desvs = desvs_s.data();");
    }
    w.line("data.eto = eto_s;")
        .line("data.deto = deto_s;")
        .line("data.dt = fraction*dt;")
        .line("data.T = T_s;")
        .line("data.dT = fraction*dT;")
        .line("bool success = Integrator::exe(data);");
    if ss.on_invalid_results {
        w.open("if(success)")
            .line(format!(
                "for(unsigned short i = 0; i != {}; ++i){{ success = success && std::isfinite(sig[i]); }}",
                s
            ))
            .close("");
    }
    w.open("if(success)").line(format!(
        "for(unsigned short i = 0; i != {}; ++i){{ eto_s[i] += deto_s[i]; }}",
        s
    ));
    if nesv > 0 {
        w.line(format!(
            "for(unsigned short i = 0; i != {}; ++i){{ esvs_s[i] += desvs_s[i]; }}",
            nesv
        ));
    }
    w.line("T_s += fraction*dT;")
        .line("remaining -= fraction;")
        .line(format!("std::copy(sig, sig+{}, sig_s);", s))
        .line(format!(
            "std::copy(data.isvs, data.isvs+{}, isvs_s.begin());",
            nisvs
        ))
        .open("if(fraction > remaining)")
        .line("fraction = remaining;")
        .close("")
        .close("")
        .open("else")
        .line(format!("std::copy(sig_s, sig_s+{}, sig);", s))
        .line("std::copy(isvs_s.begin(), isvs_s.end(), data.isvs);")
        .line("fraction /= 2.;")
        .line("++subdivisions;")
        .open(format!("if(subdivisions > {})", ss.maximum))
        .line("integrated = false;")
        .close("")
        .close("")
        .close("")
        .line("data.eto = eto;")
        .line("data.deto = deto;")
        .line("data.dt = dt;")
        .line("data.T = T;")
        .line("data.dT = dT;")
        .line("data.esvs = esvs;")
        .line("data.desvs = desvs;");
}

fn render_tangent_comparison(
    w: &mut CxxWriter,
    plan: &InterfacePlan<'_>,
    function: &str,
    hp: &HypothesisPlan,
    tc: &TangentComparison,
) {
    let mode = plan.options.error_report;
    let s = hp.stensor_size;
    w.comment("comparison to a numerical approximation of the tangent operator")
        .open("")
        .line(format!("const double pert = {};", real_literal(tc.perturbation)))
        .line(format!("double Kn[{}];", s * s))
        .open(format!("for(unsigned short j = 0; j != {}; ++j)", s))
        .line(format!("double sigp[{}];", s))
        .line(format!("double sigm[{}];", s));
    for (target, sign) in [("sigp", "+"), ("sigm", "-")] {
        w.open("")
            .line(format!("double deto_p[{}];", s))
            .line(format!("std::copy(deto, deto+{}, deto_p);", s))
            .line(format!("deto_p[j] {}= pert;", sign))
            .line(format!("std::copy(sig0, sig0+{}, {});", s, target))
            .line(format!(
                "std::vector<double> isvs_p(isvs0.begin()+{}, isvs0.end());",
                hp.leading_size
            ))
            .line(format!("double K_p[{}] = {{}};", s * s))
            .line("Integrator::Data data_p = data;")
            .line("data_p.deto = deto_p;")
            .line(format!("data_p.sig = {};", target))
            .line("data_p.isvs = isvs_p.data();")
            .line("data_p.K = K_p;")
            .open("if(!Integrator::exe(data_p))");
        render_report(
            w,
            mode,
            function,
            "\"integration of a perturbed state failed\"",
        );
        render_failure(w, plan.host);
        w.close("").close("");
    }
    w.line(format!(
        "for(unsigned short i = 0; i != {}; ++i){{ Kn[i*{}+j] = (sigp[i]-sigm[i])/(2*pert); }}",
        s, s
    ))
    .close("")
    .line("double error = 0.;")
    .line(format!(
        "for(unsigned short i = 0; i != {}; ++i){{ error = std::max(error, std::abs(Kn[i]-K[i])); }}",
        s * s
    ))
    .open(format!("if(error > {})", real_literal(tc.criterium)));
    render_report(
        w,
        mode,
        function,
        "\"tangent operator comparison failed (error: \" << error << \")\"",
    );
    w.close("").close("");
}
