#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

//! Decides whether an object in a hierarchical namespace is propagated into a
//! descendant namespace.
//!
//! Objects opt in or out of propagation with one of four annotations:
//!
//! - `propagate.hnc.x-k8s.io/select`: a label selector that the destination
//!   namespace's labels must match;
//! - `propagate.hnc.x-k8s.io/treeSelect`: namespace names, optionally negated
//!   with `!`, whose subtrees are selected;
//! - `propagate.hnc.x-k8s.io/none`: when true, the object is never propagated;
//! - `propagate.hnc.x-k8s.io/all`: when true, the object is always propagated,
//!   even if an exclusion rule matches it.
//!
//! Objects without a decisive annotation are propagated unless they match an
//! [`exclusion::Rule`].

pub mod annotations;
mod decision;
mod error;
pub mod exclusion;
pub mod flag;
pub mod tree;

pub use self::{
    annotations::Directives,
    decision::{Propagation, Step},
    error::Error,
    exclusion::Exclusions,
    tree::TreeSelector,
};
pub use hnc_propagation_k8s_api::{Labels, Object, Selector};

/// Returns true if `obj` carries any propagation directive, using the built-in
/// exclusion table.
pub fn selector_exists(obj: &Object, ns_labels: &Labels) -> Result<bool, Error> {
    Propagation::default().selector_exists(obj, ns_labels)
}

/// Returns true if `obj` should be propagated into the namespace labeled
/// `ns_labels`, using the built-in exclusion table.
pub fn should_propagate(obj: &Object, ns_labels: &Labels) -> Result<bool, Error> {
    Propagation::default().should_propagate(obj, ns_labels)
}
