use crate::{
    core::{annotations, Directives},
    k8s::{DynamicObject, Object, ResourceExt},
};
use anyhow::{bail, Result};
use kube::core::admission::Operation;
use tracing::{debug, info, trace, warn};

pub type AdmissionRequest = kube::core::admission::AdmissionRequest<DynamicObject>;
pub type AdmissionResponse = kube::core::admission::AdmissionResponse;
pub type AdmissionReview = kube::core::admission::AdmissionReview<DynamicObject>;

/// Rejects objects whose propagation annotations cannot be evaluated.
#[derive(Clone, Debug, Default)]
pub struct Admission {}

// === impl Admission ===

impl Admission {
    pub fn new() -> Self {
        Self {}
    }

    /// Answers an admission review.
    pub fn review(&self, review: AdmissionReview) -> AdmissionReview {
        trace!(?review);
        let rsp = match review.try_into() {
            Ok(req) => {
                debug!(?req);
                self.admit(&req)
            }
            Err(error) => {
                warn!(%error, "Invalid admission request");
                AdmissionResponse::invalid(error)
            }
        };
        debug!(?rsp);
        rsp.into_review()
    }

    pub fn admit(&self, req: &AdmissionRequest) -> AdmissionResponse {
        let rsp = AdmissionResponse::from(req);

        if matches!(req.operation, Operation::Delete) {
            return rsp;
        }
        let Some(obj) = req.object.as_ref() else {
            return rsp;
        };

        let ns = obj.namespace().unwrap_or_default();
        let name = obj.name_any();
        let kind = &req.kind.kind;
        if let Err(error) = validate(&Object::from(obj)) {
            info!(%error, %ns, %name, %kind, "Denied");
            return rsp.deny(error);
        }

        rsp
    }
}

/// Checks that an object's propagation annotations are recognized, mutually
/// exclusive and well-formed.
pub fn validate(obj: &Object) -> Result<()> {
    let unrecognized = annotations::unrecognized(obj).collect::<Vec<_>>();
    if !unrecognized.is_empty() {
        bail!(
            "unrecognized propagation annotation(s): {}",
            unrecognized.join(", ")
        );
    }

    let present = annotations::present(obj).collect::<Vec<_>>();
    if present.len() > 1 {
        bail!(
            "only one propagation annotation may be set, but got: {}",
            present.join(", ")
        );
    }

    let directives = Directives::read(obj);
    directives.selector()?;
    directives.tree_selector()?;
    directives.none()?;
    directives.all()?;

    Ok(())
}
