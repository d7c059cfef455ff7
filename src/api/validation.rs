//! Request validation for link creation
//!
//! Checks URL syntax, shortcode shape and validity bounds before anything
//! reaches the registry. Every failing field is reported, not just the first.

use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::config::MAX_VALIDITY_MINUTES;
use crate::models::CreateUrlRequest;
use crate::registry::is_valid_shortcode;

const ALLOWED_SCHEMES: &[&str] = &["http", "https", "ftp"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// A create request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCreate {
    pub url: String,
    pub validity_minutes: u32,
    pub shortcode: Option<String>,
}

pub fn validate_create(
    request: &CreateUrlRequest,
    default_validity_minutes: u32,
) -> Result<ValidatedCreate, Vec<FieldError>> {
    let mut errors = Vec::new();

    let url = match &request.url {
        None | Some(Value::Null) => {
            errors.push(FieldError::new("url", "URL is required"));
            None
        }
        Some(Value::String(raw)) => match raw.trim() {
            "" => {
                errors.push(FieldError::new("url", "URL is required"));
                None
            }
            raw if is_valid_url(raw) => Some(raw.to_string()),
            _ => {
                errors.push(FieldError::new("url", "URL must be a valid URL format"));
                None
            }
        },
        Some(_) => {
            errors.push(FieldError::new("url", "URL must be a string"));
            None
        }
    };

    let validity_minutes = match &request.validity {
        None | Some(Value::Null) => Some(default_validity_minutes),
        Some(value) => match parse_validity(value) {
            Some(minutes) => Some(minutes),
            None => {
                errors.push(FieldError::new(
                    "validity",
                    format!(
                        "Validity must be an integer between 1 and {} minutes",
                        MAX_VALIDITY_MINUTES
                    ),
                ));
                None
            }
        },
    };

    // The web client omits empty shortcodes, but treat "" as "generate one" too
    let shortcode = match &request.shortcode {
        None | Some(Value::Null) => None,
        Some(Value::String(code)) if code.is_empty() => None,
        Some(Value::String(code)) if is_valid_shortcode(code) => Some(code.clone()),
        Some(_) => {
            errors.push(FieldError::new(
                "shortcode",
                "Shortcode must be alphanumeric and between 3-20 characters",
            ));
            None
        }
    };

    match (url, validity_minutes) {
        (Some(url), Some(validity_minutes)) if errors.is_empty() => Ok(ValidatedCreate {
            url,
            validity_minutes,
            shortcode,
        }),
        _ => Err(errors),
    }
}

fn is_valid_url(raw: &str) -> bool {
    match Url::parse(raw) {
        Ok(url) => ALLOWED_SCHEMES.contains(&url.scheme()) && url.host_str().is_some(),
        Err(_) => false,
    }
}

/// Accepts JSON integers, integral floats (`15.0`) and integer strings within
/// bounds.
fn parse_validity(value: &Value) -> Option<u32> {
    let minutes = match value {
        Value::Number(n) => match n.as_i64() {
            Some(minutes) => minutes,
            None => {
                let minutes = n.as_f64()?;
                if minutes.fract() != 0.0 || !minutes.is_finite() {
                    return None;
                }
                // Out-of-range floats saturate and fail the bounds check below
                minutes as i64
            }
        },
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };

    (1..=i64::from(MAX_VALIDITY_MINUTES))
        .contains(&minutes)
        .then_some(minutes as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: Value) -> CreateUrlRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_minimal_request_uses_default_validity() {
        let validated = validate_create(&request(json!({"url": "https://example.com"})), 30).unwrap();
        assert_eq!(
            validated,
            ValidatedCreate {
                url: "https://example.com".to_string(),
                validity_minutes: 30,
                shortcode: None,
            }
        );
    }

    #[test]
    fn test_full_request() {
        let validated = validate_create(
            &request(json!({"url": "https://example.com/a?b=c", "validity": 1440, "shortcode": "abc123"})),
            30,
        )
        .unwrap();
        assert_eq!(validated.validity_minutes, 1440);
        assert_eq!(validated.shortcode.as_deref(), Some("abc123"));
    }

    #[test]
    fn test_validity_as_string() {
        let validated =
            validate_create(&request(json!({"url": "https://example.com", "validity": "15"})), 30)
                .unwrap();
        assert_eq!(validated.validity_minutes, 15);
    }

    #[test]
    fn test_validity_as_integral_float() {
        let validated =
            validate_create(&request(json!({"url": "https://example.com", "validity": 15.0})), 30)
                .unwrap();
        assert_eq!(validated.validity_minutes, 15);
    }

    #[test]
    fn test_rejects_non_string_fields() {
        let errors = validate_create(&request(json!({"url": 5, "shortcode": 12345})), 30)
            .unwrap_err();
        assert_eq!(
            errors,
            vec![
                FieldError::new("url", "URL must be a string"),
                FieldError::new(
                    "shortcode",
                    "Shortcode must be alphanumeric and between 3-20 characters"
                ),
            ]
        );
    }

    #[test]
    fn test_null_fields_are_absent() {
        let validated = validate_create(
            &request(json!({"url": "https://example.com", "validity": null, "shortcode": null})),
            30,
        )
        .unwrap();
        assert_eq!(validated.validity_minutes, 30);
        assert_eq!(validated.shortcode, None);
    }

    #[test]
    fn test_empty_shortcode_means_generate() {
        let validated =
            validate_create(&request(json!({"url": "https://example.com", "shortcode": ""})), 30)
                .unwrap();
        assert_eq!(validated.shortcode, None);
    }

    #[test]
    fn test_missing_url() {
        let errors = validate_create(&request(json!({})), 30).unwrap_err();
        assert_eq!(errors, vec![FieldError::new("url", "URL is required")]);
    }

    #[test]
    fn test_rejects_bad_url() {
        for url in ["example.com", "not a url", "javascript:alert(1)", "mailto:a@b.c"] {
            let errors = validate_create(&request(json!({ "url": url })), 30).unwrap_err();
            assert_eq!(errors.len(), 1, "{url} should be rejected");
            assert_eq!(errors[0].field, "url");
        }
    }

    #[test]
    fn test_rejects_out_of_range_validity() {
        for validity in [
            json!(0),
            json!(1441),
            json!(-5),
            json!(2.5),
            json!(1440.5),
            json!(0.0),
            json!("soon"),
            json!(true),
        ] {
            let errors = validate_create(
                &request(json!({"url": "https://example.com", "validity": validity})),
                30,
            )
            .unwrap_err();
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].field, "validity");
        }
    }

    #[test]
    fn test_rejects_bad_shortcode() {
        for code in ["ab", "has-dash", "waytoolongshortcode123"] {
            let errors = validate_create(
                &request(json!({"url": "https://example.com", "shortcode": code})),
                30,
            )
            .unwrap_err();
            assert_eq!(errors.len(), 1, "{code} should be rejected");
            assert_eq!(errors[0].field, "shortcode");
        }
    }

    #[test]
    fn test_reports_every_field() {
        let errors = validate_create(
            &request(json!({"url": "nope", "validity": 0, "shortcode": "!"})),
            30,
        )
        .unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["url", "validity", "shortcode"]);
    }
}
