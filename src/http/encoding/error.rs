use tracing::{event, Level};
use warp::http::StatusCode;
use warp::{Rejection, Reply};

use crate::error::Error;

#[derive(Debug)]
pub struct ApiRejection(pub Error);

impl warp::reject::Reject for ApiRejection {}

impl From<Error> for ApiRejection {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "error")]
    pub kind: String,
    #[serde(rename = "error_description")]
    pub description: String,
}

pub fn status_of(error: &Error) -> StatusCode {
    use Error::*;

    match error {
        MalformedRequest(_) | AccountMismatch | OriginMismatch | ClientNotApproved => {
            StatusCode::BAD_REQUEST
        }
        SessionExpired | InvalidCredentials | SignatureInvalid | IssuerMismatch
        | AudienceMismatch | NonceMismatch | AssertionExpired => StatusCode::UNAUTHORIZED,
        AccountLookupFailed => StatusCode::SERVICE_UNAVAILABLE,
        Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: &Error) -> ErrorResponse {
    let description = match error {
        Error::Internal(detail) => {
            event!(Level::ERROR, detail = %detail, "Internal failure");
            "internal server error".to_string()
        }
        e => e.to_string(),
    };
    ErrorResponse {
        kind: error.code().to_string(),
        description,
    }
}

pub async fn handle_reject(err: Rejection) -> Result<impl Reply, Rejection> {
    match err.find::<ApiRejection>() {
        Some(ApiRejection(e)) => {
            let body = warp::reply::json(&error_response(e));
            Ok(warp::reply::with_status(body, status_of(e)))
        }
        None => Err(err),
    }
}
