use hnc_propagation_k8s_api::{labels::ParseError, validation::NameErrors};
use thiserror::Error;

/// Errors produced while reading an object's propagation annotations.
///
/// Every variant names the annotation that caused it. Callers must treat an
/// error as a rejection and never fall back to a default verdict.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("while parsing {annotation:?}: {source}")]
    Selector {
        annotation: &'static str,
        #[source]
        source: ParseError,
    },

    #[error("invalid {annotation:?}: {name:?} is not a valid namespace name: {errors}")]
    InvalidNamespace {
        annotation: &'static str,
        name: String,
        errors: NameErrors,
    },

    #[error(
        "invalid {annotation:?}: should only have one non-negated namespace, but got multiple: \
         {names:?}"
    )]
    MultipleNonNegated {
        annotation: &'static str,
        names: Vec<String>,
    },

    #[error("invalid {annotation} value: {value:?} is not a boolean")]
    InvalidFlag {
        annotation: &'static str,
        value: String,
    },

    #[error("internal error while parsing {annotation:?}: {source}")]
    Internal {
        annotation: &'static str,
        #[source]
        source: ParseError,
    },
}

// === impl Error ===

impl Error {
    /// The annotation key whose value caused the error.
    pub fn annotation(&self) -> &'static str {
        match self {
            Self::Selector { annotation, .. }
            | Self::InvalidNamespace { annotation, .. }
            | Self::MultipleNonNegated { annotation, .. }
            | Self::InvalidFlag { annotation, .. }
            | Self::Internal { annotation, .. } => annotation,
        }
    }

    /// Returns true if the error indicates a bug rather than bad input.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}
