#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod labels;
mod object;
pub mod validation;

pub use self::{
    labels::{Labels, Selector},
    object::Object,
};
pub use k8s_openapi::api::{
    self,
    core::v1::{ConfigMap, Namespace},
};
pub use kube::{core::DynamicObject, Resource, ResourceExt};
