use std::sync::Arc;

use warp::Filter;

use crate::core::types::SessionId;
use crate::http::encoding::{self, reply};
use crate::rp::{RelyingParty, VerifyRequest};

pub fn rp_endpoint(
    rp: Arc<RelyingParty>,
) -> impl warp::Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let with_rp = warp::any().map(move || rp.clone());

    let challenge = warp::path!("challenge")
        .and(warp::get())
        .and(with_rp.clone())
        .and(encoding::session())
        .map(|rp: Arc<RelyingParty>, session: Option<SessionId>| {
            let challenge = rp.begin_challenge(session.as_ref());
            let body = warp::reply::json(&rp.challenge_response(&challenge));
            reply::with_session(body, &challenge.session_id, rp.session_ttl())
        });

    let verify = warp::path!("verify")
        .and(warp::post())
        .and(with_rp.clone())
        .and(encoding::require_session())
        .and(encoding::form_or_json::<VerifyRequest>())
        .and_then(
            |rp: Arc<RelyingParty>, session: SessionId, req: VerifyRequest| async move {
                reply::json_encode(rp.verify(&session, &req.token))
            },
        );

    let me = warp::path!("me")
        .and(warp::get())
        .and(with_rp)
        .and(encoding::require_session())
        .and_then(|rp: Arc<RelyingParty>, session: SessionId| async move {
            reply::json_encode(rp.identity(&session))
        });

    challenge.or(verify).or(me)
}
