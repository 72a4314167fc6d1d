//! Declared content-type validation
//!
//! Uploads are classified purely by the media type the client declares. The bytes
//! are never sniffed, so the declared type is a trust boundary: a client can label
//! any payload `image/png` and it will be stored and served under that type.

/// Content-type validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentTypeError {
    #[error("Invalid content type: {0:?}")]
    Invalid(String),

    #[error("Unsupported media type: {content_type} (allowed: {allowed:?})")]
    Unsupported {
        content_type: String,
        allowed: Vec<String>,
    },
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_token_char)
}

/// Split `s` on `;` outside of quoted strings. `None` if a quote is left open.
fn split_parameters(s: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if in_quotes {
        return None;
    }
    parts.push(&s[start..]);
    Some(parts)
}

/// A parameter value is a token or a quoted string. Quote balance is checked by
/// [`split_parameters`].
fn is_parameter_value(value: &str) -> bool {
    if is_token(value) {
        return true;
    }
    value.len() >= 2 && value.starts_with('"') && value.ends_with('"')
}

/// Parse a media type, returning its lower-cased `type/subtype` essence.
///
/// Parameters (`; charset=...`, quoted values included) are checked for shape and
/// then dropped, so a parameter can never widen what the allow-list accepts.
pub fn parse_media_type(declared: &str) -> Result<String, ContentTypeError> {
    let invalid = || ContentTypeError::Invalid(declared.to_string());

    let parts = split_parameters(declared).ok_or_else(invalid)?;
    let mut parts = parts.into_iter();
    let essence = parts.next().map(str::trim).unwrap_or_default();

    let (kind, subtype) = essence.split_once('/').ok_or_else(invalid)?;
    if !is_token(kind) || !is_token(subtype) {
        return Err(invalid());
    }

    for param in parts {
        let param = param.trim();
        if param.is_empty() {
            continue;
        }
        let (name, value) = param.split_once('=').ok_or_else(invalid)?;
        if !is_token(name.trim()) || !is_parameter_value(value.trim()) {
            return Err(invalid());
        }
    }

    Ok(essence.to_ascii_lowercase())
}

/// Approve `declared` if its essence is in `allowed` (exact, case-insensitive).
///
/// Returns the normalized media type to store the object under.
pub fn validate_content_type(
    declared: &str,
    allowed: &[String],
) -> Result<String, ContentTypeError> {
    let media_type = parse_media_type(declared)?;

    if !allowed.iter().any(|ct| ct.eq_ignore_ascii_case(&media_type)) {
        return Err(ContentTypeError::Unsupported {
            content_type: media_type,
            allowed: allowed.to_vec(),
        });
    }

    Ok(media_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thumbnail_types() -> Vec<String> {
        vec!["image/jpeg".to_string(), "image/png".to_string()]
    }

    #[test]
    fn approves_every_allowed_type() {
        let allowed = thumbnail_types();
        for ct in &allowed {
            assert_eq!(validate_content_type(ct, &allowed).unwrap(), *ct);
        }
    }

    #[test]
    fn rejects_types_outside_allow_list() {
        let allowed = thumbnail_types();
        for ct in ["application/pdf", "video/mp4", "image/gif", "image/svg+xml"] {
            assert!(matches!(
                validate_content_type(ct, &allowed),
                Err(ContentTypeError::Unsupported { .. })
            ));
        }
    }

    #[test]
    fn strips_parameters_and_case() {
        let allowed = thumbnail_types();
        assert_eq!(
            validate_content_type("Image/PNG; charset=binary", &allowed).unwrap(),
            "image/png"
        );
    }

    #[test]
    fn accepts_quoted_parameter_values() {
        let allowed = thumbnail_types();
        for ct in [
            "image/png; name=\"a;b\"",
            "image/png; name=\"say \\\"hi\\\"\"; charset=binary",
            "image/png; name=\"\"",
        ] {
            assert_eq!(validate_content_type(ct, &allowed).unwrap(), "image/png", "{}", ct);
        }
    }

    #[test]
    fn rejects_unterminated_quotes() {
        let allowed = thumbnail_types();
        for ct in ["image/png; name=\"a;b", "image/png; name=a\"b"] {
            assert!(matches!(
                validate_content_type(ct, &allowed),
                Err(ContentTypeError::Invalid(_))
            ));
        }
    }

    #[test]
    fn rejects_malformed_input() {
        let allowed = thumbnail_types();
        for ct in ["", "   ", "image", "image/", "/png", "image/png/x", "ima ge/png", "image/png; =x"] {
            assert!(
                matches!(
                    validate_content_type(ct, &allowed),
                    Err(ContentTypeError::Invalid(_))
                ),
                "expected {:?} to be rejected as malformed",
                ct
            );
        }
    }
}
