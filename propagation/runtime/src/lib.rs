#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use hnc_propagation_core as core;
pub use hnc_propagation_k8s_api as k8s;

mod admission;
mod args;

pub use self::{
    admission::{validate, Admission, AdmissionRequest, AdmissionResponse, AdmissionReview},
    args::Args,
};
