use crate::labels::Map;
use kube::{core::DynamicObject, Resource, ResourceExt};

/// The parts of a resource that propagation decisions read.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Object {
    name: String,
    kind: String,
    group: String,
    annotations: Map,
    labels: Map,
}

// === impl Object ===

impl Object {
    pub fn new(group: impl Into<String>, kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            group: group.into(),
            annotations: Map::default(),
            labels: Map::default(),
        }
    }

    /// Describes a typed resource, e.g. `Object::of::<ConfigMap>("kube-root-ca.crt")`.
    pub fn of<T>(name: impl Into<String>) -> Self
    where
        T: Resource,
        T::DynamicType: Default,
    {
        let dt = Default::default();
        Self::new(T::group(&dt), T::kind(&dt), name)
    }

    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    pub fn with_annotations(mut self, annotations: Map) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn with_labels(mut self, labels: Map) -> Self {
        self.labels = labels;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The API group. The core group is the empty string.
    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn annotations(&self) -> &Map {
        &self.annotations
    }

    pub fn labels(&self) -> &Map {
        &self.labels
    }

    /// Returns the annotation's value, or the empty string if it is not set.
    pub fn annotation(&self, key: &str) -> &str {
        self.annotations.get(key).map(String::as_str).unwrap_or("")
    }
}

impl From<&DynamicObject> for Object {
    fn from(obj: &DynamicObject) -> Self {
        let (group, kind) = match obj.types.as_ref() {
            Some(types) => (api_group(&types.api_version), types.kind.as_str()),
            None => ("", ""),
        };

        Self::new(group, kind, obj.name_any())
            .with_annotations(obj.annotations().clone())
            .with_labels(obj.labels().clone())
    }
}

impl From<DynamicObject> for Object {
    fn from(obj: DynamicObject) -> Self {
        Self::from(&obj)
    }
}

/// Extracts the group from an `apiVersion` such as `apps/v1`. Core resources
/// (`v1`) have the empty group.
fn api_group(api_version: &str) -> &str {
    api_version
        .rsplit_once('/')
        .map(|(group, _)| group)
        .unwrap_or("")
}
