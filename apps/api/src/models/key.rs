use crate::errors::AppError;

/// A path segment that addresses a record either by surrogate id or by its
/// unique human-readable key (a blog alias, a username).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKey {
    Id(i64),
    Name(String),
}

impl RecordKey {
    /// Numeric segments are always read as ids.
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<i64>() {
            Ok(id) => RecordKey::Id(id),
            Err(_) => RecordKey::Name(raw.to_string()),
        }
    }
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKey::Id(id) => write!(f, "{id}"),
            RecordKey::Name(name) => write!(f, "'{name}'"),
        }
    }
}

/// Parses a numeric-only path segment; anything else is a malformed identifier.
pub fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|_| AppError::UnprocessableEntity(format!("Invalid identifier '{raw}'.")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_segment_is_id() {
        assert_eq!(RecordKey::parse("42"), RecordKey::Id(42));
    }

    #[test]
    fn test_text_segment_is_name() {
        assert_eq!(
            RecordKey::parse("hello-world"),
            RecordKey::Name("hello-world".to_string())
        );
    }

    #[test]
    fn test_parse_id_rejects_text() {
        assert!(matches!(
            parse_id("invalid"),
            Err(AppError::UnprocessableEntity(_))
        ));
        assert_eq!(parse_id("7").unwrap(), 7);
    }
}
