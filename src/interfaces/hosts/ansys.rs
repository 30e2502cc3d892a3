//! Ansys `usermat`.

use super::{INT_IN, INT_OUT, IN, MTEST, OUT, STRATEGY};
use crate::codegen::conventions::{ShearScaling, StensorOrdering, TensorConvention};
use crate::codegen::pipeline::GradientLayout;
use crate::core::behaviour::BehaviourType;
use crate::core::hypothesis::ModellingHypothesis as MH;
use crate::core::material_properties::MaterialPropertiesPolicy;
use crate::interfaces::host::{
    no_flags, param, EntryPointStyle, FailureProtocol, HostId, HostProfile, OrthotropyPolicy,
    Resource, Role,
};

pub static PROFILE: HostProfile = HostProfile {
    id: HostId::Ansys,
    include_dir: "Ansys",
    file_prefix: "ansys",
    namespace: "ansys",
    class_prefix: "Ansys",
    keyword_prefix: "Ansys",
    keyword_aliases: &[],
    library_prefix: "Ansys",
    hypotheses: &[
        (MH::Axisymmetrical, "axis"),
        (MH::PlaneStrain, "pstrain"),
        (MH::PlaneStress, "pstress"),
        (MH::Tridimensional, "3D"),
    ],
    behaviour_types: &[
        BehaviourType::StandardStrainBasedBehaviour,
        BehaviourType::StandardFiniteStrainBehaviour,
    ],
    entry_points: EntryPointStyle::PerHypothesis,
    return_type: "void",
    parameters: &[
        param("matId", INT_IN, Role::Unused),
        param("elemId", INT_IN, Role::Unused),
        param("kDomIntPt", INT_IN, Role::Unused),
        param("kLayer", INT_IN, Role::Unused),
        param("kSectPt", INT_IN, Role::Unused),
        param("ldstep", INT_IN, Role::Unused),
        param("isubst", INT_IN, Role::Unused),
        param("keycut", INT_OUT, Role::FailureFlag),
        param("nDirect", INT_IN, Role::Unused),
        param("nShear", INT_IN, Role::Unused),
        param("ncomp", INT_IN, Role::Unused),
        param("nStatev", INT_IN, Role::NumberOfStateVariables),
        param("nProp", INT_IN, Role::NumberOfMaterialProperties),
        param("Time", IN, Role::Unused),
        param("dTime", IN, Role::TimeIncrement),
        param("Temp", IN, Role::Temperature),
        param("dTemp", IN, Role::TemperatureIncrement),
        param("stress", OUT, Role::Stress),
        param("ustatev", OUT, Role::StateVariables),
        param("dsdePl", OUT, Role::Tangent),
        param("sedEl", OUT, Role::Unused),
        param("sedPl", OUT, Role::Unused),
        param("epseq", OUT, Role::Unused),
        param("Strain", IN, Role::Strain),
        param("dStrain", IN, Role::StrainIncrement),
        param("epsPl", OUT, Role::Unused),
        param("prop", IN, Role::MaterialProperties),
        param("coords", IN, Role::Unused),
        param("rotateM", IN, Role::Unused),
        param("defGrad_t", IN, Role::DeformationGradient0),
        param("defGrad", IN, Role::DeformationGradient1),
        param("tsstif", OUT, Role::Unused),
        param("epsZZ", OUT, Role::Unused),
        param("var1", OUT, Role::Unused),
        param("var2", OUT, Role::Unused),
        param("var3", OUT, Role::Unused),
        param("var4", OUT, Role::Unused),
        param("var5", OUT, Role::Unused),
        param("var6", OUT, Role::Unused),
        param("var7", OUT, Role::Unused),
        param("var8", OUT, Role::Unused),
    ],
    role_overrides: &[],
    convention: TensorConvention {
        ordering: StensorOrdering::ShearSwapped,
        scaling: ShearScaling::Engineering,
        reduced_plane_stress: false,
    },
    tangent_column_major: true,
    failure: FailureProtocol {
        statements: &["*keycut = 1;"],
        return_values: None,
    },
    finite_strain_strategies: true,
    gradient_layout: GradientLayout::FortranMatrix,
    finite_strain_tangent: "ABAQUS",
    material_properties: MaterialPropertiesPolicy {
        always_inject_elasticity: false,
        always_inject_thermal_expansion: false,
        mass_density: false,
    },
    orthotropy: OrthotropyPolicy::HostManaged,
    stored_strain: false,
    temperature_removed: true,
    keywords: &[STRATEGY, MTEST],
    resources: &[Resource {
        path: "ansys/usermat.cpp",
        contents: include_str!("../../../resources/ansys/usermat.cpp"),
    }],
    link_libraries: &["AnsysInterface"],
    cppflags: no_flags,
    include_directories: no_flags,
};
