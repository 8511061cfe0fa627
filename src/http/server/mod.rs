use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::{event, Level};
use warp::Filter;

use crate::http::encoding::{error::handle_reject, FETCH_DEST_HEADER};
use crate::idp::IdentityProvider;
use crate::rp::RelyingParty;

mod endpoints;

use endpoints::{idp::idp_endpoint, rp::rp_endpoint};

const CLEAN_UP_INTERVAL: Duration = Duration::from_secs(15);

/// Identity fetches are cross-site by nature, so every origin is allowed and
/// credentials are permitted.
fn cors() -> warp::cors::Builder {
    warp::cors()
        .allow_any_origin()
        .allow_credentials(true)
        .allow_methods(vec!["GET", "POST"])
        .allow_headers(vec!["content-type", FETCH_DEST_HEADER])
}

pub fn idp_routes(
    provider: Arc<IdentityProvider>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    idp_endpoint(provider)
        .recover(handle_reject)
        .with(warp::log("fedid::idp"))
        .with(cors())
}

pub fn rp_routes(
    rp: Arc<RelyingParty>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    rp_endpoint(rp)
        .recover(handle_reject)
        .with(warp::log("fedid::rp"))
        .with(cors())
}

/// Something holding sessions that need periodic purging.
pub trait Service: Send + Sync + 'static {
    fn clean_up(&self) -> usize;
}

impl Service for IdentityProvider {
    fn clean_up(&self) -> usize {
        IdentityProvider::clean_up(self)
    }
}

impl Service for RelyingParty {
    fn clean_up(&self) -> usize {
        RelyingParty::clean_up(self)
    }
}

pub struct Server<S> {
    service: Arc<S>,
}

impl<S: Service> Server<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }

    fn start_clean_up_worker(&self) {
        let service = Arc::clone(&self.service);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLEAN_UP_INTERVAL);
            loop {
                interval.tick().await;
                service.clean_up();
            }
        });
    }
}

impl Server<IdentityProvider> {
    pub async fn serve(self, addr: SocketAddr) {
        self.start_clean_up_worker();
        event!(Level::INFO, %addr, issuer = %self.service.config().issuer, "Identity provider listening");
        warp::serve(idp_routes(self.service)).run(addr).await;
    }
}

impl Server<RelyingParty> {
    pub async fn serve(self, addr: SocketAddr) {
        self.start_clean_up_worker();
        event!(Level::INFO, %addr, origin = %self.service.config().origin, "Relying party listening");
        warp::serve(rp_routes(self.service)).run(addr).await;
    }
}
