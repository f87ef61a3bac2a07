use env_logger::Env;

#[tokio::main]
async fn main() {
    // Load .env file if present (for development convenience)
    // Silently ignore if not found - production uses system env vars
    let _ = dotenvy::dotenv();

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Err(e) = livenotes::run().await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
