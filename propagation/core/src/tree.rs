use crate::{
    annotations::{TREE_DEPTH_SUFFIX, TREE_SELECTOR},
    Error,
};
use hnc_propagation_k8s_api::{validation, Labels, Selector};

/// A selector expressed as namespace names. `team-a` selects the descendants of
/// `team-a` and `!team-b` excludes the descendants of `team-b`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeSelector {
    entries: Vec<Entry>,
    selector: Selector,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub namespace: String,
    pub negated: bool,
}

/// Returns the depth label that the hierarchy tracker sets on descendants of
/// `namespace`.
pub fn depth_label(namespace: &str) -> String {
    format!("{namespace}{TREE_DEPTH_SUFFIX}")
}

// === impl TreeSelector ===

impl TreeSelector {
    /// Parses a comma-separated list of optionally negated namespace names.
    ///
    /// Returns `None` when the value is empty. At most one namespace may be
    /// non-negated.
    pub fn parse(value: &str) -> Result<Option<Self>, Error> {
        if value.is_empty() {
            return Ok(None);
        }

        let mut entries = Vec::new();
        for seg in value.split(',') {
            let seg = seg.trim();
            let (namespace, negated) = match seg.strip_prefix('!') {
                Some(ns) => (ns, true),
                None => (seg, false),
            };

            if let Err(errors) = validation::validate_dns1123_label(namespace) {
                return Err(Error::InvalidNamespace {
                    annotation: TREE_SELECTOR,
                    name: namespace.to_string(),
                    errors,
                });
            }

            entries.push(Entry {
                namespace: namespace.to_string(),
                negated,
            });
        }

        let non_negated = entries
            .iter()
            .filter(|e| !e.negated)
            .map(|e| e.namespace.clone())
            .collect::<Vec<_>>();
        if non_negated.len() > 1 {
            return Err(Error::MultipleNonNegated {
                annotation: TREE_SELECTOR,
                names: non_negated,
            });
        }

        let expr = entries
            .iter()
            .map(Entry::requirement)
            .collect::<Vec<_>>()
            .join(",");
        let selector = Selector::parse(&expr).map_err(|source| Error::Internal {
            annotation: TREE_SELECTOR,
            source,
        })?;

        Ok(Some(Self { entries, selector }))
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// The single non-negated namespace, if any.
    pub fn target(&self) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| !e.negated)
            .map(|e| e.namespace.as_str())
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn matches(&self, labels: &Labels) -> bool {
        self.selector.matches(labels)
    }
}

// === impl Entry ===

impl Entry {
    fn requirement(&self) -> String {
        let label = depth_label(&self.namespace);
        if self.negated {
            format!("!{label}")
        } else {
            label
        }
    }
}
