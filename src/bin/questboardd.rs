use std::sync::Arc;

use arrrg::CommandLine;
use arrrg_derive::CommandLine;
use tokio::net::TcpListener;
use tokio::signal;

use questboard::{DataStore, InMemoryDataStore, create_api_router, sql::PgDataStore};

#[derive(CommandLine, Default, PartialEq, Eq)]
struct Args {
    #[arrrg(optional, "PostgreSQL database URL for durable storage")]
    database_url: Option<String>,
    #[arrrg(optional, "Host to bind the HTTP server")]
    host: Option<String>,
    #[arrrg(optional, "Port to bind the HTTP server")]
    port: Option<u16>,
    #[arrrg(flag, "Enable verbose logging")]
    verbose: bool,
}

const HELP_TEXT: &str = r#"questboardd - Questboard daemon

USAGE:
    questboardd [OPTIONS]

OPTIONS:
    --database-url <URL>    PostgreSQL database URL; without it, state is
                            held in memory and lost on restart
    --host <HOST>           Host to bind the HTTP server [default: 127.0.0.1]
    --port <PORT>           Port to bind the HTTP server [default: 8080]
    --verbose               Enable verbose logging

DESCRIPTION:
    Runs the Questboard daemon with event-tracking endpoints mounted
    under /api/

    The server supports graceful shutdown via SIGTERM or Ctrl+C.

API ENDPOINTS:
    Parties:
      GET    /api/parties                   List all parties
      GET    /api/parties/{name}            Get a party by name

    Encounters:
      GET    /api/encounters                List all encounters
      GET    /api/encounters/party/{id}     List a party's encounters
      PATCH  /api/encounters/{id}           Update completion or notes

    Combat:
      GET    /api/combat-encounters         List all combat scenarios
      GET    /api/combat-checkins           List all checkins
      GET    /api/combat-checkins/{id}      List checkins for a combat
      PATCH  /api/combat-checkins/{id}      Update a checkin

    Issues:
      GET    /api/issues                    List issues, newest first
      POST   /api/issues                    Log an issue
      PATCH  /api/issues/{id}               Update an issue

    Feedback:
      GET    /api/feedback                  List feedback, newest first
      POST   /api/feedback                  Record feedback
      PATCH  /api/feedback/{id}             Update review status"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, free) = Args::from_command_line("USAGE: questboardd [OPTIONS]");

    if !free.is_empty() && free[0] == "help" {
        println!("{}", HELP_TEXT);
        return Ok(());
    }

    let host = args.host.unwrap_or_else(|| "127.0.0.1".to_string());
    let port = args.port.unwrap_or(8080);

    if args.verbose {
        println!("Questboard daemon starting with configuration:");
        println!(
            "  Storage: {}",
            if args.database_url.is_some() {
                "PostgreSQL"
            } else {
                "in-memory"
            }
        );
        println!("  Bind address: {}:{}", host, port);
    }

    let data_store: Arc<dyn DataStore> = match &args.database_url {
        Some(url) => {
            let pool = sqlx::PgPool::connect(url)
                .await
                .map_err(|e| format!("Failed to connect to database: {}", e))?;
            Arc::new(PgDataStore::new(pool))
        }
        None => Arc::new(InMemoryDataStore::new()),
    };

    let app = create_api_router(data_store);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    println!("Questboard daemon started");
    println!("Server listening on: http://{}", addr);
    if args.database_url.is_none() {
        println!("Running with in-memory storage; state is lost on restart");
    }
    println!("Use Ctrl+C or send SIGTERM for graceful shutdown");

    let shutdown_signal = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                eprintln!("Server error: {}", e);
                std::process::exit(1);
            }
        }
        () = shutdown_signal => {
            println!();
            println!("Shutdown signal received, stopping server gracefully...");
            println!("Questboard daemon stopped");
        }
    }

    Ok(())
}
