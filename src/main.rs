use notes_client::{ApiClient, Session, config};

use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() {
    // Log setup, stdout is reserved for the view
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    // Load config
    let cfg = config::load_config().unwrap_or_else(|e| {
        tracing::error!("Failed to load config: {e}");
        panic!("failed to load config: {e}");
    });
    tracing::info!("Using notes API at {}", cfg.api.base_url);

    // Session creation
    let api = ApiClient::new(&cfg.api).unwrap_or_else(|e| {
        tracing::error!("Failed to create API client: {e}");
        panic!("failed to create API client: {e}");
    });
    let mut session = Session::new(api, &cfg.session);

    session.mount();
    session.settle().await;
    println!("{}", session.view());

    // Every input line becomes a new note
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                session.submit(line);
                session.settle().await;
                println!("{}", session.view());
            }
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Failed to read input: {e}");
                break;
            }
        }
    }

    session.shutdown();
}
