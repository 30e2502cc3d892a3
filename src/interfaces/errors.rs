//! Generation error types and diagnostics.

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error raised while generating the glue of a behaviour for a host.
///
/// Every error is fatal for the (behaviour, interface) pair being treated.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("unsupported modelling hypothesis `{hypothesis}`: {context}")]
    UnsupportedHypothesis { hypothesis: String, context: String },

    #[error("no modelling hypothesis to treat for `{behaviour}` with the `{interface}` interface")]
    NoHypothesisToTreat {
        interface: String,
        behaviour: String,
        declared: Vec<String>,
        supported: Vec<String>,
    },

    #[error("the `{interface}` interface does not support behaviours of type `{behaviour_type}`")]
    UnsupportedBehaviourType {
        interface: String,
        behaviour_type: String,
        supported: Vec<String>,
    },

    #[error("the `{interface}` interface does not support {feature}")]
    UnsupportedFeature { interface: String, feature: String },

    #[error("incompatible finite strain strategy: {reason}")]
    IncompatibleFiniteStrainStrategy { reason: String },

    #[error("unsupported keyword `{keyword}` for the `{interface}` interface")]
    UnsupportedKeyword {
        interface: String,
        keyword: String,
        allowed: Vec<String>,
    },

    #[error("invalid value `{value}` for `{keyword}`")]
    InvalidKeywordValue {
        keyword: String,
        value: String,
        expected: String,
    },

    #[error("material property `{name}` is declared twice")]
    DuplicateMaterialProperty { name: String },

    #[error("cycle detected between specific targets")]
    SpecificTargetCycle { targets: Vec<String> },

    #[error("unknown interface `{name}`")]
    UnknownInterface { name: String, available: Vec<String> },

    #[error("failed to acquire the resource lock `{path}`: {message}")]
    Lock { path: String, message: String },

    #[error("I/O error on `{path}`")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl GenerationError {
    /// Build an I/O error for a path.
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        GenerationError::Io {
            path: path.display().to_string(),
            source,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            GenerationError::UnsupportedHypothesis {
                hypothesis,
                context,
            } => Diagnostic::error(format!("unsupported modelling hypothesis `{}`", hypothesis))
                .with_context(context.clone())
                .with_suggestion(
                    "Restrict the behaviour to the hypotheses supported by the interface"
                        .to_string(),
                ),

            GenerationError::NoHypothesisToTreat {
                interface,
                behaviour,
                declared,
                supported,
            } => Diagnostic::error(format!(
                "`{}` shares no modelling hypothesis with the `{}` interface",
                behaviour, interface
            ))
            .with_context(format!("behaviour declares: {}", declared.join(", ")))
            .with_context(format!("interface supports: {}", supported.join(", ")))
            .with_suggestion(format!(
                "Add one of the hypotheses supported by `{}` to the behaviour",
                interface
            ))
            .with_suggestion(suggestions::HYPOTHESES),

            GenerationError::UnsupportedBehaviourType {
                interface,
                behaviour_type,
                supported,
            } => Diagnostic::error(format!(
                "`{}` behaviours can't be exported to `{}`",
                behaviour_type, interface
            ))
            .with_context(format!("supported types: {}", supported.join(", "))),

            GenerationError::UnsupportedFeature { interface, feature } => {
                Diagnostic::error(format!("the `{}` interface does not support {}", interface, feature))
                    .with_suggestion(format!(
                        "Use an interface with a richer calling convention than `{}`",
                        interface
                    ))
            }

            GenerationError::IncompatibleFiniteStrainStrategy { reason } => {
                Diagnostic::error("incompatible finite strain strategy")
                    .with_context(reason.clone())
                    .with_suggestion(
                        "Remove the interface keyword and rely on the declared strain measure"
                            .to_string(),
                    )
            }

            GenerationError::UnsupportedKeyword {
                interface,
                keyword,
                allowed,
            } => {
                let mut diag = Diagnostic::error(format!(
                    "keyword `{}` is not handled by the `{}` interface",
                    keyword, interface
                ));
                if !allowed.is_empty() {
                    diag = diag.with_context(format!("allowed keywords: {}", allowed.join(", ")));
                }
                diag.with_suggestion("Check the spelling of the keyword".to_string())
            }

            GenerationError::InvalidKeywordValue {
                keyword,
                value,
                expected,
            } => Diagnostic::error(format!("invalid value `{}` for `{}`", value, keyword))
                .with_context(format!("expected {}", expected)),

            GenerationError::DuplicateMaterialProperty { name } => {
                Diagnostic::error(format!("material property `{}` is declared twice", name))
                    .with_suggestion("Rename one of the material properties".to_string())
            }

            GenerationError::SpecificTargetCycle { targets } => {
                Diagnostic::error("cycle detected between specific targets")
                    .with_context(format!("cycle: {}", targets.join(" -> ")))
            }

            GenerationError::UnknownInterface { name, available } => {
                Diagnostic::error(format!("unknown interface `{}`", name))
                    .with_context(format!("available interfaces: {}", available.join(", ")))
                    .with_suggestion(suggestions::UNKNOWN_INTERFACE)
            }

            GenerationError::Lock { path, message } => {
                Diagnostic::error(format!("failed to acquire the resource lock `{}`", path))
                    .with_context(message.clone())
                    .with_suggestion(
                        "Remove the lock file if no other generator is running".to_string(),
                    )
            }

            GenerationError::Io { path, source } => {
                Diagnostic::error(format!("I/O error on `{}`", path))
                    .with_context(source.to_string())
                    .with_location(path.clone())
            }
        }
    }
}
