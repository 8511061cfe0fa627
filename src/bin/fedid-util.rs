use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), fedid::Error> {
    use fedid::util::cli::*;

    dotenv::dotenv().ok();

    let opts = UtilOptions::parse();
    run_cli_action(opts).await
}
