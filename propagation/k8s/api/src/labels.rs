use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    sync::Arc,
};

mod parse;

pub use self::parse::ParseError;

/// The labels of a namespace that an object may be propagated into.
#[derive(Clone, Debug, Eq, Default)]
pub struct Labels(Arc<Map>);

pub type Map = BTreeMap<String, String>;

pub type Expressions = Vec<Expression>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expression {
    key: String,
    operator: Operator,
    values: BTreeSet<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Operator {
    In,
    NotIn,
    Exists,
    DoesNotExist,
}

/// Selects the namespaces whose labels satisfy every requirement.
///
/// A selector without requirements matches all label sets.
#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct Selector {
    expressions: Expressions,
}

// === Selector ===

impl Selector {
    pub fn from_expressions(expressions: Expressions) -> Self {
        Self { expressions }
    }

    /// Parses a selector expression such as `env=prod,tier in (web,api),!legacy`.
    ///
    /// The empty string parses to a selector that matches everything.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        parse::parse(s)
    }

    /// Returns true if the selector has no requirements.
    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    pub fn expressions(&self) -> impl Iterator<Item = &Expression> {
        self.expressions.iter()
    }

    pub fn matches(&self, labels: &Labels) -> bool {
        self.expressions
            .iter()
            .all(|expr| expr.matches(labels.as_ref()))
    }
}

impl std::str::FromStr for Selector {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, expr) in self.expressions.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{expr}")?;
        }
        Ok(())
    }
}

impl std::iter::FromIterator<Expression> for Selector {
    fn from_iter<T: IntoIterator<Item = Expression>>(iter: T) -> Self {
        Self::from_expressions(iter.into_iter().collect())
    }
}

// === Labels ===

impl Labels {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }
}

impl From<Map> for Labels {
    #[inline]
    fn from(labels: Map) -> Self {
        Self(Arc::new(labels))
    }
}

impl AsRef<Map> for Labels {
    #[inline]
    fn as_ref(&self) -> &Map {
        self.0.as_ref()
    }
}

impl<T: AsRef<Map>> std::cmp::PartialEq<T> for Labels {
    #[inline]
    fn eq(&self, t: &T) -> bool {
        self.0.as_ref().eq(t.as_ref())
    }
}

impl std::iter::FromIterator<(String, String)> for Labels {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(Arc::new(iter.into_iter().collect()))
    }
}

impl std::iter::FromIterator<(&'static str, &'static str)> for Labels {
    fn from_iter<T: IntoIterator<Item = (&'static str, &'static str)>>(iter: T) -> Self {
        iter.into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

// === Expression ===

impl Expression {
    pub fn new(
        key: impl Into<String>,
        operator: Operator,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            key: key.into(),
            operator,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn exists(key: impl Into<String>) -> Self {
        Self::new(key, Operator::Exists, None::<String>)
    }

    pub fn does_not_exist(key: impl Into<String>) -> Self {
        Self::new(key, Operator::DoesNotExist, None::<String>)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    fn matches(&self, labels: &Map) -> bool {
        match self.operator {
            Operator::In => match labels.get(&self.key) {
                Some(v) => self.values.contains(v),
                None => false,
            },
            Operator::NotIn => match labels.get(&self.key) {
                Some(v) => !self.values.contains(v),
                None => true,
            },
            Operator::Exists => labels.contains_key(&self.key),
            Operator::DoesNotExist => !labels.contains_key(&self.key),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = self.values.iter().cloned().collect::<Vec<_>>().join(",");
        match self.operator {
            Operator::Exists => write!(f, "{}", self.key),
            Operator::DoesNotExist => write!(f, "!{}", self.key),
            Operator::In if self.values.len() == 1 => write!(f, "{}={}", self.key, values),
            Operator::NotIn if self.values.len() == 1 => write!(f, "{}!={}", self.key, values),
            Operator::In => write!(f, "{} in ({})", self.key, values),
            Operator::NotIn => write!(f, "{} notin ({})", self.key, values),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches() {
        for (selector, labels, matches, msg) in &[
            (Selector::default(), Labels::default(), true, "empty match"),
            (
                Selector::from_iter(Some(Expression::new("foo", Operator::In, ["bar"]))),
                Labels::from_iter(Some(("foo", "bar"))),
                true,
                "exact label match",
            ),
            (
                Selector::from_iter(Some(Expression::new("foo", Operator::In, ["bar"]))),
                Labels::from_iter(vec![("foo", "bar"), ("bah", "baz")]),
                true,
                "sufficient label match",
            ),
            (
                Selector::from_iter(Some(Expression::new("foo", Operator::In, ["bar"]))),
                Labels::from_iter(Some(("foo", "baz"))),
                false,
                "label value mismatch",
            ),
            (
                Selector::from_iter(Some(Expression::new("foo", Operator::In, ["bar", "baz"]))),
                Labels::from_iter(Some(("foo", "baz"))),
                true,
                "set membership match",
            ),
            (
                Selector::from_iter(Some(Expression::new("foo", Operator::In, ["bar"]))),
                Labels::default(),
                false,
                "in requires the key",
            ),
            (
                Selector::from_iter(Some(Expression::new("foo", Operator::NotIn, ["bar"]))),
                Labels::from_iter(Some(("foo", "bar"))),
                false,
                "notin excludes listed value",
            ),
            (
                Selector::from_iter(Some(Expression::new("foo", Operator::NotIn, ["bar"]))),
                Labels::default(),
                true,
                "notin matches absent key",
            ),
            (
                Selector::from_iter(Some(Expression::exists("foo"))),
                Labels::from_iter(Some(("foo", ""))),
                true,
                "exists matches empty value",
            ),
            (
                Selector::from_iter(Some(Expression::does_not_exist("foo"))),
                Labels::from_iter(Some(("foo", ""))),
                false,
                "does not exist rejects empty value",
            ),
            (
                Selector::from_iter(vec![Expression::exists("a"), Expression::exists("b")]),
                Labels::from_iter(Some(("a", "1"))),
                false,
                "all expressions must match",
            ),
        ] {
            assert_eq!(selector.matches(labels), *matches, "{}", msg);
        }
    }

    #[test]
    fn is_empty() {
        assert!(Selector::default().is_empty());
        assert!(Selector::from_expressions(vec![]).is_empty());
        assert!(!Selector::from_iter(Some(Expression::exists("a"))).is_empty());
    }

    #[test]
    fn display() {
        let selector = Selector::from_iter(vec![
            Expression::new("env", Operator::In, ["prod"]),
            Expression::new("tier", Operator::NotIn, ["api", "web"]),
            Expression::does_not_exist("legacy"),
        ]);
        assert_eq!(selector.to_string(), "env=prod,tier notin (api,web),!legacy");
    }
}
