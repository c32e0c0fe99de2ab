use crate::Error;

/// Parses a boolean flag annotation.
///
/// An unset (empty) annotation is `false`. Otherwise the value must be a
/// boolean literal: `true`/`false` in any case, or one of `1`, `t`, `T`, `0`,
/// `f`, `F`.
pub fn parse(annotation: &'static str, value: &str) -> Result<bool, Error> {
    if value.is_empty() {
        return Ok(false);
    }

    match value {
        "1" | "t" | "T" => Ok(true),
        "0" | "f" | "F" => Ok(false),
        v if v.eq_ignore_ascii_case("true") => Ok(true),
        v if v.eq_ignore_ascii_case("false") => Ok(false),
        v => Err(Error::InvalidFlag {
            annotation,
            value: v.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::{ALL_SELECTOR, NONE_SELECTOR};
    use rstest::rstest;

    #[rstest]
    #[case("", false)]
    #[case("true", true)]
    #[case("TRUE", true)]
    #[case("True", true)]
    #[case("1", true)]
    #[case("t", true)]
    #[case("T", true)]
    #[case("false", false)]
    #[case("FaLsE", false)]
    #[case("0", false)]
    #[case("f", false)]
    fn literals(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(parse(NONE_SELECTOR, value), Ok(expected));
    }

    #[rstest]
    #[case("notabool")]
    #[case("yes")]
    #[case(" true")]
    #[case("2")]
    fn rejects_other_values(#[case] value: &str) {
        let err = parse(ALL_SELECTOR, value).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidFlag {
                annotation: ALL_SELECTOR,
                value: value.to_string(),
            }
        );
        assert!(err.to_string().contains(ALL_SELECTOR), "{err}");
    }
}
