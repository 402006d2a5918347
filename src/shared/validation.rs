//! Validation Utilities

use validator::{Validate, ValidationErrors};

use super::error::{AppError, FieldError};

/// Validate a request body, mapping failures to `AppError::InvalidFields`.
pub fn validate_request<T: Validate>(body: &T) -> Result<(), AppError> {
    body.validate().map_err(validation_error)
}

/// Convert validation errors to AppError
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let mut field_errors: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldError {
                field: field.to_string(),
                message: e
                    .message
                    .clone()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string()),
            })
        })
        .collect();

    // HashMap iteration order is unstable
    field_errors.sort_by(|a, b| a.field.cmp(&b.field));

    let message = field_errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ");

    if field_errors.is_empty() {
        AppError::Validation("Validation failed".into())
    } else {
        AppError::InvalidFields {
            message,
            fields: field_errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "must not be empty"))]
        content: String,
        #[validate(length(max = 3))]
        tag: String,
    }

    #[test]
    fn test_validation_error_lists_fields_in_order() {
        let sample = Sample {
            content: String::new(),
            tag: "toolong".into(),
        };

        match validate_request(&sample) {
            Err(AppError::InvalidFields { message, fields }) => {
                assert_eq!(message, "content: must not be empty; tag: length");
                assert_eq!(
                    fields.iter().map(|f| f.field.as_str()).collect::<Vec<_>>(),
                    vec!["content", "tag"]
                );
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_valid_request_passes() {
        let sample = Sample {
            content: "hi".into(),
            tag: "ok".into(),
        };
        assert!(validate_request(&sample).is_ok());
    }
}
