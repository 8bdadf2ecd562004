use thiserror::Error;

/// Failures surfaced by whole-operation requests.
///
/// Per-point problems (a sample that evaluates to `NaN`, a mesh vertex that
/// fails) never show up here: the sampler drops the point and the mesher
/// flattens the vertex to `z = 0`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Malformed expression syntax.
    #[error("Parse error: {0}")]
    Parse(String),
    /// A referenced variable has no binding.
    #[error("Evaluation error: {0}")]
    Evaluation(String),
    /// The expression uses a construct the differentiator does not handle.
    #[error("Differentiation error: {0}")]
    Differentiation(String),
    /// Malformed JSON or CSV sample data.
    #[error("Input format error: {0}")]
    InputFormat(String),
    /// A sampling domain with `min >= max` or non-finite bounds.
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    pub(crate) fn parse_at(message: impl AsRef<str>, position: usize) -> Self {
        Self::Parse(format!("{} at position {}", message.as_ref(), position + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::EngineError;

    #[test]
    fn parse_at_reports_one_based_position() {
        let err = EngineError::parse_at("Unexpected ')'", 4);
        assert_eq!(err.to_string(), "Parse error: Unexpected ')' at position 5");
    }

    #[test]
    fn variants_are_labeled() {
        assert!(EngineError::Evaluation("Unknown variable: a".into())
            .to_string()
            .starts_with("Evaluation error"));
        assert!(EngineError::InputFormat("bad".into())
            .to_string()
            .starts_with("Input format error"));
    }
}
