use std::time::Duration;

use warp::http::{header, StatusCode};
use warp::reply::{Reply, Response};
use warp::Rejection;

use crate::core::types::SessionId;

use super::error::ApiRejection;
use super::SESSION_COOKIE;

pub fn json_encode(
    value: Result<impl serde::Serialize, impl Into<ApiRejection>>,
) -> Result<impl Reply, Rejection> {
    value
        .map(|v| warp::reply::json(&v))
        .map_err(|e| warp::reject::custom::<ApiRejection>(e.into()))
}

pub fn accept<T, E>(result: Result<T, E>) -> Result<T, Rejection>
where
    E: Into<ApiRejection>,
{
    result.map_err(|e| warp::reject::custom(e.into()))
}

/// `__Host-` cookies must be `Secure`, host-only and scoped to `/`.
/// `SameSite=None` lets the browser send it on cross-site identity fetches.
pub fn session_cookie(id: &SessionId, ttl: Duration) -> String {
    format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; Secure; SameSite=None",
        SESSION_COOKIE,
        id.0,
        ttl.as_secs()
    )
}

pub fn clear_session_cookie() -> String {
    format!(
        "{}=; Path=/; Max-Age=0; HttpOnly; Secure; SameSite=None",
        SESSION_COOKIE
    )
}

pub fn with_session(reply: impl Reply, id: &SessionId, ttl: Duration) -> impl Reply {
    warp::reply::with_header(reply, header::SET_COOKIE, session_cookie(id, ttl))
}

pub fn see_other(location: &'static str) -> Response {
    warp::reply::with_status(
        warp::reply::with_header(warp::reply(), header::LOCATION, location),
        StatusCode::SEE_OTHER,
    )
    .into_response()
}
