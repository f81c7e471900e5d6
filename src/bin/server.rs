use std::{
    env::{self},
    fs::OpenOptions,
    net::SocketAddr,
    path::PathBuf,
    sync::Arc,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::{Handle, tls_rustls::RustlsConfig};
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use procvisual::{AppState, Mailer, build_router, graceful_shutdown, logging_middleware};

/// The ProcVisual web server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// File path to an SSL certificate `cert.pem` and key `key.pem`.
    #[arg(long)]
    cert_path: String,

    /// The port to serve the app from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The canonical name of the timezone to use for dates, e.g. "Pacific/Auckland".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,

    /// The URL users are sent to when buying lifetime access.
    #[arg(long)]
    checkout_url: Option<String>,

    /// Gate the app behind the lifetime access flag.
    #[arg(long, default_value_t = false)]
    require_lifetime_access: bool,

    /// The SMTP relay for transactional email, e.g. "smtp.example.com".
    ///
    /// Email is disabled when not set. Requires `--smtp-username` and
    /// `--smtp-from`, and the `SMTP_PASSWORD` environment variable.
    #[arg(long)]
    smtp_relay: Option<String>,

    /// The username to authenticate with the SMTP relay.
    #[arg(long)]
    smtp_username: Option<String>,

    /// The sender address, e.g. "ProcVisual <no-reply@example.com>".
    #[arg(long)]
    smtp_from: Option<String>,
}

#[tokio::main]
async fn main() {
    setup_logging();

    let args = Args::parse();

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let tls_config = RustlsConfig::from_pem_file(
        PathBuf::from(&args.cert_path).join("cert.pem"),
        PathBuf::from(&args.cert_path).join("key.pem"),
    )
    .await
    .expect("Could not open TLS certificates.");

    let secret = env::var("SECRET").expect("The environment variable 'SECRET' must be set");

    let mailer = create_mailer(&args);

    let connection = Connection::open(&args.db_path).expect("Could not open database file");
    let state = AppState::new(
        connection,
        &secret,
        &args.timezone,
        mailer,
        args.checkout_url,
        args.require_lifetime_access,
    )
    .expect("Could not create app state");

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router =
        add_tracing_layer(build_router(state)).layer(middleware::from_fn(logging_middleware));

    tracing::info!("HTTPS server listening on {}", addr);
    axum_server::bind_rustls(addr, tls_config)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("Server stopped unexpectedly");
}

fn create_mailer(args: &Args) -> Option<Mailer> {
    let relay = args.smtp_relay.as_deref()?;
    let username = args
        .smtp_username
        .as_deref()
        .expect("'--smtp-username' must be set when '--smtp-relay' is set");
    let from = args
        .smtp_from
        .as_deref()
        .expect("'--smtp-from' must be set when '--smtp-relay' is set");
    let password = env::var("SMTP_PASSWORD")
        .expect("The environment variable 'SMTP_PASSWORD' must be set when '--smtp-relay' is set");

    let mailer = Mailer::new(relay, username, &password, from).expect("Could not create mailer");

    Some(mailer)
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
