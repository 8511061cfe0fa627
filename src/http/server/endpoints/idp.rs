use std::sync::Arc;

use warp::http::header;
use warp::Filter;

use crate::core::models::AssertionRequest;
use crate::core::types::{Origin, SessionId};
use crate::http::encoding::{self, reply, SIGNIN_STATUS_HEADER};
use crate::idp::{IdentityProvider, LoginRequest};

pub fn idp_endpoint(
    provider: Arc<IdentityProvider>,
) -> impl warp::Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let with_provider = warp::any().map(move || provider.clone());

    let well_known = warp::path!(".well-known" / "web-identity")
        .and(warp::get())
        .and(with_provider.clone())
        .map(|provider: Arc<IdentityProvider>| warp::reply::json(&provider.well_known()));

    let config = warp::path!("fedcm.json")
        .and(warp::get())
        .and(encoding::web_identity())
        .and(with_provider.clone())
        .map(|provider: Arc<IdentityProvider>| warp::reply::json(&provider.config_document()));

    let client_metadata = warp::path!("client_metadata.json")
        .and(warp::get())
        .and(encoding::web_identity())
        .and(with_provider.clone())
        .map(|provider: Arc<IdentityProvider>| warp::reply::json(&provider.client_metadata()));

    let accounts = warp::path!("accounts.json")
        .and(warp::get())
        .and(encoding::web_identity())
        .and(with_provider.clone())
        .and(encoding::require_session())
        .and_then(|provider: Arc<IdentityProvider>, session: SessionId| async move {
            reply::json_encode(provider.accounts(&session))
        });

    let id_assertion = warp::path!("id_assertion.json")
        .and(warp::post())
        .and(encoding::web_identity())
        .and(with_provider.clone())
        .and(encoding::require_session())
        .and(encoding::request_origin())
        .and(encoding::form_or_json::<AssertionRequest>())
        .and_then(
            |provider: Arc<IdentityProvider>,
             session: SessionId,
             origin: Option<Origin>,
             req: AssertionRequest| async move {
                let result = provider.issue(&session, &req, origin.as_ref()).await;
                reply::json_encode(result)
            },
        );

    // Only the endpoint's existence is supported; nothing is revoked.
    let revocation = warp::path!("revocation.json")
        .and(warp::post())
        .and(encoding::web_identity())
        .map(|| warp::reply::json(&serde_json::json!({})));

    let login = warp::path!("sessions" / "new")
        .and(warp::post())
        .and(with_provider.clone())
        .and(encoding::session())
        .and(encoding::form_or_json::<LoginRequest>())
        .and_then(
            |provider: Arc<IdentityProvider>, session: Option<SessionId>, req: LoginRequest| async move {
                let id = reply::accept(provider.login(session.as_ref(), &req).await)?;
                let redirect = warp::reply::with_header(
                    reply::see_other("/"),
                    SIGNIN_STATUS_HEADER,
                    "action=signin",
                );
                Ok::<_, warp::Rejection>(reply::with_session(redirect, &id, provider.session_ttl()))
            },
        );

    let logout = warp::path!("logout")
        .and(warp::get())
        .and(with_provider.clone())
        .and(encoding::session())
        .map(|provider: Arc<IdentityProvider>, session: Option<SessionId>| {
            if let Some(session) = session {
                provider.logout(&session);
            }
            let redirect = warp::reply::with_header(
                reply::see_other("/"),
                SIGNIN_STATUS_HEADER,
                "action=signout",
            );
            warp::reply::with_header(redirect, header::SET_COOKIE, reply::clear_session_cookie())
        });

    let index = warp::path::end()
        .and(warp::get())
        .and(with_provider)
        .and(encoding::require_session())
        .and_then(|provider: Arc<IdentityProvider>, session: SessionId| async move {
            reply::json_encode(provider.current_user(&session))
        });

    well_known
        .or(config)
        .or(client_metadata)
        .or(accounts)
        .or(id_assertion)
        .or(revocation)
        .or(login)
        .or(logout)
        .or(index)
}
