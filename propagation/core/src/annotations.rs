use crate::{flag, tree::TreeSelector, Error};
use hnc_propagation_k8s_api::{Object, Selector};

pub const PROPAGATE_PREFIX: &str = "propagate.hnc.x-k8s.io";

pub const SELECTOR: &str = "propagate.hnc.x-k8s.io/select";
pub const TREE_SELECTOR: &str = "propagate.hnc.x-k8s.io/treeSelect";
pub const NONE_SELECTOR: &str = "propagate.hnc.x-k8s.io/none";
pub const ALL_SELECTOR: &str = "propagate.hnc.x-k8s.io/all";

/// Every recognized selector annotation, in precedence order.
pub const SELECTORS: [&str; 4] = [SELECTOR, TREE_SELECTOR, NONE_SELECTOR, ALL_SELECTOR];

/// Appended to a namespace name to form the label that the hierarchy tracker
/// sets on each of that namespace's descendants.
pub const TREE_DEPTH_SUFFIX: &str = ".tree.hnc.x-k8s.io/depth";

/// The raw selector annotation values of an object. Unset annotations read as
/// the empty string.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Directives<'o> {
    pub selector: &'o str,
    pub tree_selector: &'o str,
    pub none: &'o str,
    pub all: &'o str,
}

// === impl Directives ===

impl<'o> Directives<'o> {
    pub fn read(obj: &'o Object) -> Self {
        Self {
            selector: obj.annotation(SELECTOR),
            tree_selector: obj.annotation(TREE_SELECTOR),
            none: obj.annotation(NONE_SELECTOR),
            all: obj.annotation(ALL_SELECTOR),
        }
    }

    /// Parses the plain selector. An unset selector matches everything.
    pub fn selector(&self) -> Result<Selector, Error> {
        Selector::parse(self.selector).map_err(|source| Error::Selector {
            annotation: SELECTOR,
            source,
        })
    }

    pub fn tree_selector(&self) -> Result<Option<TreeSelector>, Error> {
        TreeSelector::parse(self.tree_selector)
    }

    pub fn none(&self) -> Result<bool, Error> {
        flag::parse(NONE_SELECTOR, self.none)
    }

    pub fn all(&self) -> Result<bool, Error> {
        flag::parse(ALL_SELECTOR, self.all)
    }
}

/// Returns the propagation annotations on `obj` that are not recognized
/// selector annotations.
pub fn unrecognized(obj: &Object) -> impl Iterator<Item = &str> {
    obj.annotations().keys().filter_map(|key| {
        let (prefix, _) = key.split_once('/')?;
        if prefix == PROPAGATE_PREFIX && !SELECTORS.contains(&key.as_str()) {
            Some(key.as_str())
        } else {
            None
        }
    })
}

/// Returns the recognized selector annotations set on `obj`, in precedence
/// order.
pub fn present(obj: &Object) -> impl Iterator<Item = &'static str> + '_ {
    SELECTORS
        .into_iter()
        .filter(|key| obj.annotations().contains_key(*key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_each_key() {
        let obj = Object::new("", "Secret", "creds")
            .with_annotation(SELECTOR, "env=prod")
            .with_annotation(TREE_SELECTOR, "team-a")
            .with_annotation(NONE_SELECTOR, "false")
            .with_annotation(ALL_SELECTOR, "")
            .with_annotation("unrelated", "x");

        assert_eq!(
            Directives::read(&obj),
            Directives {
                selector: "env=prod",
                tree_selector: "team-a",
                none: "false",
                all: "",
            }
        );
    }

    #[test]
    fn absent_keys_read_empty() {
        let obj = Object::new("", "Secret", "creds");
        assert_eq!(Directives::read(&obj), Directives::default());
    }

    #[test]
    fn selector_errors_name_the_annotation() {
        let obj = Object::new("", "Secret", "creds").with_annotation(SELECTOR, "env in prod");
        let err = Directives::read(&obj).selector().unwrap_err();
        assert_eq!(err.annotation(), SELECTOR);
        assert!(err.to_string().contains(SELECTOR), "{err}");
    }

    #[test]
    fn unset_directives_parse_to_defaults() {
        let obj = Object::new("", "Secret", "creds");
        let directives = Directives::read(&obj);
        assert!(directives.selector().unwrap().is_empty());
        assert_eq!(directives.tree_selector(), Ok(None));
        assert_eq!(directives.none(), Ok(false));
        assert_eq!(directives.all(), Ok(false));
    }

    #[test]
    fn unrecognized_propagation_annotations() {
        let obj = Object::new("", "Secret", "creds")
            .with_annotation(SELECTOR, "")
            .with_annotation("propagate.hnc.x-k8s.io/selct", "env=prod")
            .with_annotation("hnc.x-k8s.io/inherited-from", "parent");

        assert_eq!(
            unrecognized(&obj).collect::<Vec<_>>(),
            vec!["propagate.hnc.x-k8s.io/selct"]
        );
        assert_eq!(present(&obj).collect::<Vec<_>>(), vec![SELECTOR]);
    }
}
