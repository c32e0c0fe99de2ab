use crate::Error;
use hnc_propagation_k8s_api::Object;
use tracing::trace;

/// A condition that keeps a known third-party-managed resource from being
/// propagated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rule {
    /// Matches a resource by group, kind and name.
    ByName {
        group: &'static str,
        kind: &'static str,
        name: &'static str,
    },

    /// Matches a resource carrying the label with exactly this value.
    ByLabel {
        key: &'static str,
        value: &'static str,
    },

    /// Matches a resource carrying the annotation. A `None` value matches any
    /// value.
    ByAnnotation {
        key: &'static str,
        value: Option<&'static str>,
    },
}

/// Known CA config maps, the Rancher `norman` creator label, and OpenShift
/// project descriptions.
pub static DEFAULT_RULES: &[Rule] = &[
    Rule::ByName {
        group: "",
        kind: "ConfigMap",
        name: "istio-ca-root-cert",
    },
    Rule::ByName {
        group: "",
        kind: "ConfigMap",
        name: "kube-root-ca.crt",
    },
    Rule::ByLabel {
        key: "cattle.io/creator",
        value: "norman",
    },
    Rule::ByAnnotation {
        key: "openshift.io/description",
        value: None,
    },
];

/// An ordered exclusion table. The first matching rule excludes the object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Exclusions {
    rules: Vec<Rule>,
}

// === impl Rule ===

impl Rule {
    pub fn matches(&self, obj: &Object) -> bool {
        match self {
            Self::ByName { group, kind, name } => {
                obj.group() == *group && obj.kind() == *kind && obj.name() == *name
            }
            // An empty label value is distinct from an absent label.
            Self::ByLabel { key, value } => obj
                .labels()
                .get(*key)
                .is_some_and(|actual| actual == *value),
            Self::ByAnnotation { key, value } => match (obj.annotations().get(*key), value) {
                (Some(_), None) => true,
                (Some(actual), Some(expected)) => actual == expected,
                (None, _) => false,
            },
        }
    }

    fn order(&self) -> u8 {
        match self {
            Self::ByName { .. } => 0,
            Self::ByLabel { .. } => 1,
            Self::ByAnnotation { .. } => 2,
        }
    }
}

// === impl Exclusions ===

impl Default for Exclusions {
    fn default() -> Self {
        Self::new(DEFAULT_RULES.iter().cloned())
    }
}

impl Exclusions {
    /// Builds a table from `rules`. Name rules are evaluated before label rules,
    /// which are evaluated before annotation rules; the relative order within
    /// each kind is kept.
    pub fn new(rules: impl IntoIterator<Item = Rule>) -> Self {
        let mut rules = rules.into_iter().collect::<Vec<_>>();
        rules.sort_by_key(Rule::order);
        Self { rules }
    }

    /// A table that excludes nothing.
    pub fn none() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Returns true if `obj` must not be propagated.
    ///
    /// None of the current rule kinds can fail; the error is reserved for rule
    /// kinds that need to.
    pub fn is_excluded(&self, obj: &Object) -> Result<bool, Error> {
        match self.rules.iter().find(|rule| rule.matches(obj)) {
            Some(rule) => {
                trace!(?rule, name = %obj.name(), "Excluded");
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
