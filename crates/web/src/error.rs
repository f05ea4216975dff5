use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use scoring::RankingError;
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Web layer errors
#[derive(Debug)]
pub enum WebError {
    Ranking(RankingError),
    Validation(ValidationErrors),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ranking(e) => write!(f, "Ranking error: {}", e),
            Self::Validation(e) => write!(f, "Validation error: {}", e),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        // engine input errors are client errors; only computation failures are 500
        let status_code = match &self {
            Self::Ranking(e) if e.is_validation() => StatusCode::BAD_REQUEST,
            Self::Ranking(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
        };

        let body = match &self {
            Self::Ranking(e) if e.is_validation() => {
                json!({
                    "error": e.to_string()
                })
            }
            Self::Ranking(e) => {
                tracing::error!("Ranking failed: {:?}", e);
                json!({
                    "error": format!("Ranking failed: {}", e)
                })
            }
            Self::Validation(errors) => {
                let field_errors: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errors)| {
                        errors.iter().map(move |e| {
                            format!(
                                "{}: {}",
                                field,
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            )
                        })
                    })
                    .collect();

                json!({
                    "error": "Validation failed",
                    "details": field_errors
                })
            }
        };

        (status_code, Json(body)).into_response()
    }
}

impl From<RankingError> for WebError {
    fn from(error: RankingError) -> Self {
        Self::Ranking(error)
    }
}

impl From<ValidationErrors> for WebError {
    fn from(error: ValidationErrors) -> Self {
        Self::Validation(error)
    }
}

pub type WebResult<T> = Result<T, WebError>;

#[cfg(test)]
mod tests {
    use super::*;
    use scoring::error::EntryLocation;

    #[test]
    fn test_ranking_validation_is_bad_request() {
        let error = WebError::from(RankingError::MissingField {
            location: EntryLocation::Question {
                question: 0,
                entry: 0,
            },
            field: "user_id",
        });
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_computation_failure_is_server_error() {
        let error = WebError::from(RankingError::Computation("boom".to_string()));
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_errors_are_bad_request() {
        let mut errors = ValidationErrors::new();
        errors.add("users_scores", validator::ValidationError::new("length"));
        let error = WebError::from(errors);
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
