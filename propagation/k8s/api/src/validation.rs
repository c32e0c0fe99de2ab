use regex::Regex;
use std::{fmt, sync::LazyLock};
use thiserror::Error;

pub const DNS1123_LABEL_MAX_LEN: usize = 63;
pub const DNS1123_SUBDOMAIN_MAX_LEN: usize = 253;
pub const QUALIFIED_NAME_MAX_LEN: usize = 63;
pub const LABEL_VALUE_MAX_LEN: usize = 63;

const DNS1123_LABEL_FMT: &str = "[a-z0-9]([-a-z0-9]*[a-z0-9])?";
const DNS1123_SUBDOMAIN_FMT: &str =
    r"[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*";
const QUALIFIED_NAME_FMT: &str = "([A-Za-z0-9][-A-Za-z0-9_.]*)?[A-Za-z0-9]";

static DNS1123_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^{DNS1123_LABEL_FMT}$")).expect("should compile"));
static DNS1123_SUBDOMAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^{DNS1123_SUBDOMAIN_FMT}$")).expect("should compile"));
static QUALIFIED_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^{QUALIFIED_NAME_FMT}$")).expect("should compile"));

/// A single naming rule that a value violates.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("must be no more than {max} characters")]
    TooLong { max: usize },

    #[error(
        "a lowercase RFC 1123 label must consist of lower case alphanumeric characters or '-', \
         and must start and end with an alphanumeric character (regex used for validation is '{}')",
        DNS1123_LABEL_FMT
    )]
    Dns1123Label,

    #[error(
        "a lowercase RFC 1123 subdomain must consist of lower case alphanumeric characters, '-' \
         or '.', and must start and end with an alphanumeric character (regex used for \
         validation is '{}')",
        DNS1123_SUBDOMAIN_FMT
    )]
    Dns1123Subdomain,

    #[error("must be non-empty")]
    EmptyPrefix,

    #[error("prefix part {0}")]
    Prefix(Box<NameError>),

    #[error("name part must be non-empty")]
    EmptyName,

    #[error(
        "name part must consist of alphanumeric characters, '-', '_' or '.', and must start and \
         end with an alphanumeric character (regex used for validation is '{}')",
        QUALIFIED_NAME_FMT
    )]
    QualifiedName,

    #[error(
        "a qualified name must consist of alphanumeric characters, '-', '_' or '.', with an \
         optional DNS subdomain prefix and '/'"
    )]
    TooManySlashes,

    #[error(
        "a valid label must be an empty string or consist of alphanumeric characters, '-', '_' \
         or '.', and must start and end with an alphanumeric character (regex used for \
         validation is '({})?')",
        QUALIFIED_NAME_FMT
    )]
    LabelValue,
}

/// Every rule a value violates, in the order they were checked.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameErrors(Vec<NameError>);

// === impl NameErrors ===

impl NameErrors {
    pub fn iter(&self) -> impl Iterator<Item = &NameError> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn push(&mut self, err: NameError) {
        self.0.push(err);
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for NameErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for NameErrors {}

/// Validates a lowercase RFC 1123 label, as used for namespace names.
pub fn validate_dns1123_label(value: &str) -> Result<(), NameErrors> {
    let mut errors = NameErrors::default();
    if value.len() > DNS1123_LABEL_MAX_LEN {
        errors.push(NameError::TooLong {
            max: DNS1123_LABEL_MAX_LEN,
        });
    }
    if !DNS1123_LABEL.is_match(value) {
        errors.push(NameError::Dns1123Label);
    }
    errors.into_result()
}

/// Validates a lowercase RFC 1123 subdomain, as used for label key prefixes.
pub fn validate_dns1123_subdomain(value: &str) -> Result<(), NameErrors> {
    let mut errors = NameErrors::default();
    if value.len() > DNS1123_SUBDOMAIN_MAX_LEN {
        errors.push(NameError::TooLong {
            max: DNS1123_SUBDOMAIN_MAX_LEN,
        });
    }
    if !DNS1123_SUBDOMAIN.is_match(value) {
        errors.push(NameError::Dns1123Subdomain);
    }
    errors.into_result()
}

/// Validates a label key: an optional DNS subdomain prefix and `/`, followed by
/// a name of at most 63 characters.
pub fn validate_qualified_name(value: &str) -> Result<(), NameErrors> {
    let mut errors = NameErrors::default();

    let parts = value.split('/').collect::<Vec<_>>();
    let name = match parts.as_slice() {
        [name] => *name,
        [prefix, name] => {
            if prefix.is_empty() {
                errors.push(NameError::Prefix(Box::new(NameError::EmptyPrefix)));
            } else if let Err(prefix_errors) = validate_dns1123_subdomain(prefix) {
                for err in prefix_errors.0 {
                    errors.push(NameError::Prefix(Box::new(err)));
                }
            }
            *name
        }
        _ => {
            errors.push(NameError::TooManySlashes);
            return errors.into_result();
        }
    };

    if name.is_empty() {
        errors.push(NameError::EmptyName);
    } else {
        if name.len() > QUALIFIED_NAME_MAX_LEN {
            errors.push(NameError::TooLong {
                max: QUALIFIED_NAME_MAX_LEN,
            });
        }
        if !QUALIFIED_NAME.is_match(name) {
            errors.push(NameError::QualifiedName);
        }
    }

    errors.into_result()
}

/// Validates a label value. The empty string is a valid value.
pub fn validate_label_value(value: &str) -> Result<(), NameErrors> {
    let mut errors = NameErrors::default();
    if value.len() > LABEL_VALUE_MAX_LEN {
        errors.push(NameError::TooLong {
            max: LABEL_VALUE_MAX_LEN,
        });
    }
    if !value.is_empty() && !QUALIFIED_NAME.is_match(value) {
        errors.push(NameError::LabelValue);
    }
    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dns1123_labels() {
        for valid in ["a", "team-a", "0", "a1-b2", "x".repeat(63).as_str()] {
            assert!(validate_dns1123_label(valid).is_ok(), "{valid:?}");
        }

        for invalid in ["", "-a", "a-", "Team", "a_b", "a.b", "!a"] {
            assert!(validate_dns1123_label(invalid).is_err(), "{invalid:?}");
        }
    }

    #[test]
    fn dns1123_label_reports_every_rule() {
        let long = format!("-{}", "a".repeat(63));
        let errors = validate_dns1123_label(&long).unwrap_err();
        assert_eq!(
            errors.iter().cloned().collect::<Vec<_>>(),
            vec![NameError::TooLong { max: 63 }, NameError::Dns1123Label]
        );
        assert!(errors.to_string().contains("; "));
    }

    #[test]
    fn qualified_names() {
        for valid in [
            "env",
            "app.kubernetes.io/name",
            "team-a.tree.hnc.x-k8s.io/depth",
            "A_b.c",
        ] {
            assert!(validate_qualified_name(valid).is_ok(), "{valid:?}");
        }

        for invalid in ["", "/name", "a/b/c", "prefix/", "-env", "Bad.Prefix/name"] {
            assert!(validate_qualified_name(invalid).is_err(), "{invalid:?}");
        }
    }

    #[test]
    fn qualified_name_prefix_errors() {
        let errors = validate_qualified_name("/env").unwrap_err();
        assert_eq!(
            errors.iter().cloned().collect::<Vec<_>>(),
            vec![NameError::Prefix(Box::new(NameError::EmptyPrefix))]
        );
        assert_eq!(errors.to_string(), "prefix part must be non-empty");
    }

    #[test]
    fn label_values() {
        for valid in ["", "prod", "v1.2_3-x"] {
            assert!(validate_label_value(valid).is_ok(), "{valid:?}");
        }

        for invalid in ["-prod", "prod-", "a b", "x".repeat(64).as_str()] {
            assert!(validate_label_value(invalid).is_err(), "{invalid:?}");
        }
    }
}
