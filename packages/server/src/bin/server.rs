//! Hiroba broadcast server.
//!
//! Serves the chat, live feed, per-post and notification consumers over
//! WebSocket, plus a small HTTP API.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server
//! cargo run --bin hiroba-server -- --port 3000 --user 1:alice:alice-token
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use hiroba_server::{
    infrastructure::{
        auth::{TokenAuthenticator, UserCredential},
        group_registry::InMemoryGroupRegistry,
        repository::{InMemoryChatMessageRepository, InMemoryPostRepository},
    },
    ui::{AppState, ConsumerSettings, Server},
    usecase::PersistencePolicy,
};
use hiroba_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "hiroba-server")]
#[command(about = "WebSocket connection-group broadcast server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HIROBA_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "HIROBA_PORT", default_value = "8080")]
    port: u16,

    /// Time allowed for one send to a member before it is evicted
    #[arg(long, env = "HIROBA_SEND_TIMEOUT_MS", default_value = "1000")]
    send_timeout_ms: u64,

    /// Outbound queue length of each connection
    #[arg(long, env = "HIROBA_CHANNEL_CAPACITY", default_value = "64", value_parser = clap::value_parser!(u64).range(1..))]
    channel_capacity: u64,

    /// Whether chat messages that fail to persist are still broadcast
    #[arg(long, env = "HIROBA_PERSISTENCE_POLICY", value_enum, default_value_t = PersistencePolicy::BestEffort)]
    persistence_policy: PersistencePolicy,

    /// Chat messages replayed to a newly joined chat connection
    #[arg(long, env = "HIROBA_HISTORY_LIMIT", default_value = "50")]
    history_limit: usize,

    /// Accepted credential as <id>:<username>:<token> (repeatable)
    #[arg(long = "user", env = "HIROBA_USERS", value_delimiter = ',')]
    users: Vec<UserCredential>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Registry and repositories
    // 2. Authenticator
    // 3. AppState (UseCases)
    // 4. Server

    // 1. Create Registry and Repositories (in-memory)
    let registry = Arc::new(InMemoryGroupRegistry::new(Duration::from_millis(
        args.send_timeout_ms,
    )));
    let chat_repository = Arc::new(InMemoryChatMessageRepository::new());
    let post_repository = Arc::new(InMemoryPostRepository::new());

    // 2. Create Authenticator
    let authenticator = Arc::new(TokenAuthenticator::new(args.users));
    tracing::info!("{} user credential(s) configured", authenticator.user_count());

    // 3. Create UseCases
    let settings = ConsumerSettings {
        channel_capacity: args.channel_capacity as usize,
        persistence_policy: args.persistence_policy,
        history_limit: args.history_limit,
    };
    tracing::info!("{:?}", settings);
    let state = AppState::new(
        registry,
        chat_repository,
        post_repository,
        authenticator,
        Arc::new(SystemClock),
        settings,
    );

    // 4. Create and run the server
    let server = Server::new(Arc::new(state));
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
