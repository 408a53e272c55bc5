use std::sync::Arc;

use foodbridge::config;
use foodbridge::startup;
use foodbridge::utils::logger::init_logging;

#[tokio::main]
async fn main() {
    // `foodbridge --schema` prints the config JSON schema and exits.
    if std::env::args().any(|arg| arg == "--schema") {
        config::print_schema();
        return;
    }

    let config = Arc::new(config::load_config());
    init_logging(&config.logging);

    if let Err(e) = startup::run(config).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
