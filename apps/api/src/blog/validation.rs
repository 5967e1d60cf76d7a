use crate::errors::AppError;
use crate::models::blog::{BlogFields, BlogPayload, CategoryRef};

const MAX_ALIAS_LEN: usize = 128;

/// Static segments under `/blog` that shadow `/blog/:id_or_alias`.
const RESERVED_ALIASES: &[&str] = &["categories"];

/// A payload that passed validation, split into row fields, markdown body
/// and the category references still to be resolved.
#[derive(Debug, Clone)]
pub struct ArticleDraft {
    pub fields: BlogFields,
    pub content: String,
    pub categories: Vec<CategoryRef>,
}

pub fn validate_payload(payload: BlogPayload) -> Result<ArticleDraft, AppError> {
    let content = match payload.content {
        Some(content) if !content.trim().is_empty() => content,
        _ => {
            return Err(AppError::UnprocessableEntity(
                "Value required for key 'content'.".to_string(),
            ))
        }
    };

    let alias = payload.alias.trim().to_string();
    validate_alias(&alias)?;

    Ok(ArticleDraft {
        fields: BlogFields {
            alias,
            title: payload.title,
            artwork_url: payload.artwork_url,
            excerpt: payload.excerpt,
            tags: payload.tags,
        },
        content,
        categories: payload.categories,
    })
}

/// Aliases double as URL segments and file names.
pub fn validate_alias(alias: &str) -> Result<(), AppError> {
    if alias.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "Value required for key 'alias'.".to_string(),
        ));
    }
    if alias.len() > MAX_ALIAS_LEN {
        return Err(AppError::UnprocessableEntity(format!(
            "Value for key 'alias' must be at most {MAX_ALIAS_LEN} characters."
        )));
    }
    let url_safe = alias
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !url_safe {
        return Err(AppError::UnprocessableEntity(
            "Value for key 'alias' may only contain ASCII letters, digits, '-' and '_'."
                .to_string(),
        ));
    }
    // A segment that parses as an id always resolves as one, so such an alias would be unreachable.
    if alias.parse::<i64>().is_ok() {
        return Err(AppError::UnprocessableEntity(
            "Value for key 'alias' must not be purely numeric.".to_string(),
        ));
    }
    if RESERVED_ALIASES.contains(&alias) {
        return Err(AppError::UnprocessableEntity(format!(
            "Value '{alias}' for key 'alias' is reserved."
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(alias: &str, content: Option<&str>) -> BlogPayload {
        BlogPayload {
            title: "Title".to_string(),
            alias: alias.to_string(),
            excerpt: None,
            content: content.map(str::to_string),
            tags: vec![],
            categories: vec![],
            artwork_url: None,
        }
    }

    fn message(err: AppError) -> String {
        match err {
            AppError::UnprocessableEntity(msg) => msg,
            other => panic!("expected unprocessable, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_content_names_the_field() {
        let err = validate_payload(payload("post", None)).unwrap_err();
        assert_eq!(message(err), "Value required for key 'content'.");
    }

    #[test]
    fn test_blank_content_is_missing() {
        let err = validate_payload(payload("post", Some("  \n"))).unwrap_err();
        assert!(message(err).contains("'content'"));
    }

    #[test]
    fn test_valid_payload_keeps_content_verbatim() {
        let draft = validate_payload(payload(" my-post ", Some("# Title\n\nbody\n"))).unwrap();
        assert_eq!(draft.fields.alias, "my-post");
        assert_eq!(draft.content, "# Title\n\nbody\n");
    }

    #[test]
    fn test_alias_rejects_path_characters() {
        for alias in ["../etc", "a/b", "with space", "dot.md", ""] {
            assert!(validate_alias(alias).is_err(), "alias {alias:?} should be rejected");
        }
    }

    #[test]
    fn test_alias_rejects_numeric_only() {
        assert!(validate_alias("2024").is_err());
        assert!(validate_alias("-5").is_err());
        assert!(validate_alias("2024-recap").is_ok());
        assert!(validate_alias("-5-tips").is_ok());
    }

    #[test]
    fn test_alias_rejects_reserved_segment() {
        let err = validate_alias("categories").unwrap_err();
        assert!(message(err).contains("reserved"));
        assert!(validate_alias("categories-of-rust").is_ok());
    }

    #[test]
    fn test_alias_length_limit() {
        assert!(validate_alias(&"a".repeat(MAX_ALIAS_LEN)).is_ok());
        assert!(validate_alias(&"a".repeat(MAX_ALIAS_LEN + 1)).is_err());
    }
}
