use std::sync::Arc;

use clap::Parser;
use fedid::http::server::Server;
use fedid::util::cli::RpOptions;

#[tokio::main]
async fn main() -> Result<(), fedid::Error> {
    tracing_subscriber::fmt::init();
    dotenv::dotenv().ok();

    let opts = RpOptions::parse();
    let rp = Arc::new(opts.relying_party()?);

    Server::new(rp).serve(opts.bind).await;
    Ok(())
}
