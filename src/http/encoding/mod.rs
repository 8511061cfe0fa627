pub mod error;
pub mod reply;

use std::convert::Infallible;

use warp::{Filter, Rejection};

use crate::core::types::{Origin, SessionId};
use crate::error::Error;

pub const SESSION_COOKIE: &str = "__Host-session";
pub const FETCH_DEST_HEADER: &str = "sec-fetch-dest";
pub const SIGNIN_STATUS_HEADER: &str = "idp-signin-status";

const BODY_LIMIT: u64 = 16 * 1024;

/// Requires `Sec-Fetch-Dest: webidentity`, which browsers attach to
/// identity-protocol fetches and pages cannot forge.
pub fn web_identity() -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::header::optional::<String>(FETCH_DEST_HEADER)
        .and_then(|dest: Option<String>| async move {
            match dest.as_deref() {
                Some("webidentity") => Ok(()),
                _ => reply::accept(Err(Error::malformed("sec-fetch-dest is not webidentity"))),
            }
        })
        .untuple_one()
}

pub fn session() -> impl Filter<Extract = (Option<SessionId>,), Error = Infallible> + Clone {
    warp::cookie::optional::<String>(SESSION_COOKIE).map(|c: Option<String>| c.map(SessionId))
}

/// Like [`session`], but a missing cookie is a `SessionExpired` rejection.
pub fn require_session() -> impl Filter<Extract = (SessionId,), Error = Rejection> + Clone {
    session().and_then(|s: Option<SessionId>| async move {
        reply::accept(s.ok_or(Error::SessionExpired))
    })
}

/// The `Origin` request header, verbatim.
pub fn request_origin() -> impl Filter<Extract = (Option<Origin>,), Error = Rejection> + Clone {
    warp::header::optional::<String>("origin").map(|o: Option<String>| o.map(Origin))
}

/// Passes only when the request declares a form-encoded body.
fn form_content() -> impl Filter<Extract = (), Error = Rejection> + Clone {
    warp::header::optional::<String>("content-type")
        .and_then(|ct: Option<String>| async move {
            match ct {
                Some(ct)
                    if ct
                        .to_ascii_lowercase()
                        .starts_with("application/x-www-form-urlencoded") =>
                {
                    Ok(())
                }
                _ => Err(warp::reject()),
            }
        })
        .untuple_one()
}

/// Accepts a form-encoded or JSON body. Form bodies must say so in
/// `Content-Type`; anything else is read as JSON.
pub fn form_or_json<T: serde::de::DeserializeOwned + Send + 'static>(
) -> impl Filter<Extract = (T,), Error = Rejection> + Clone {
    let form = form_content().and(warp::body::form::<T>());
    let json = warp::body::json::<T>();
    warp::body::content_length_limit(BODY_LIMIT)
        .and(form.or(json).unify())
        .or_else(|_| async move {
            reply::accept(Err(Error::malformed("missing or invalid request body")))
        })
}
