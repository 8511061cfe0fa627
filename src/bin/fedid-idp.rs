use std::sync::Arc;

use clap::Parser;
use fedid::http::server::Server;
use fedid::util::cli::IdpOptions;

#[tokio::main]
async fn main() -> Result<(), fedid::Error> {
    tracing_subscriber::fmt::init();
    dotenv::dotenv().ok();

    let opts = IdpOptions::parse();
    let provider = Arc::new(opts.provider()?);

    Server::new(provider).serve(opts.bind).await;
    Ok(())
}
