//! Kedai application binary - composition root.
//!
//! Ties the workspace together into a terminal assistant:
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Seed the in-memory product catalog and outlet directory
//! 3. Build the conversation orchestrator over the three tools
//! 4. Run a stdin/stdout REPL as the transport layer
//!
//! Meta-commands inside the REPL: `/clear` drops the current session,
//! `/quit` exits.

mod cli;

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use kedai_chat::{ChatError, ChatOrchestrator};
use kedai_core::KedaiConfig;
use kedai_tools::{ArithmeticCalculator, InMemoryCatalog, InMemoryOutlets, Outlet, Product};

use cli::CliArgs;

/// Demo product catalog seeded into the in-memory search tool.
fn demo_catalog() -> Vec<Product> {
    let rm = |name: &str, price: f64, category: &str| Product {
        name: name.to_string(),
        price,
        currency: "RM".to_string(),
        category: category.to_string(),
    };
    vec![
        rm("Classic Tumbler 500ml", 55.0, "drinkware"),
        rm("Travel Mug 350ml", 45.0, "drinkware"),
        rm("Cold Cup 650ml", 65.0, "drinkware"),
        rm("Stainless Flask 750ml", 89.0, "drinkware"),
        rm("Americano", 9.5, "coffee"),
        rm("Caffe Latte", 12.0, "coffee"),
        rm("Spanish Latte", 13.5, "coffee"),
        rm("Matcha Latte", 14.0, "tea"),
        rm("Chocolate Frost", 13.0, "chocolate"),
    ]
}

/// Demo outlet directory.
fn demo_outlets() -> Vec<Outlet> {
    let outlet = |name: &str, city: &str, services: &[&str], address: &str, hours: &str| Outlet {
        name: name.to_string(),
        city: city.to_string(),
        services: services.iter().map(|s| s.to_string()).collect(),
        address: address.to_string(),
        hours: hours.to_string(),
    };
    vec![
        outlet(
            "Kedai SS15",
            "Subang Jaya",
            &["dine-in", "drive-thru", "pickup"],
            "Jalan SS15/4",
            "8am-10pm",
        ),
        outlet(
            "Kedai Sunway",
            "Subang Jaya",
            &["dine-in", "delivery"],
            "Sunway Pyramid",
            "10am-10pm",
        ),
        outlet(
            "Kedai KLCC",
            "Kuala Lumpur",
            &["dine-in", "pickup"],
            "Suria KLCC",
            "10am-10pm",
        ),
        outlet(
            "Kedai Mid Valley",
            "Kuala Lumpur",
            &["dine-in", "delivery", "wifi"],
            "Mid Valley Megamall",
            "10am-10pm",
        ),
        outlet(
            "Kedai Damansara Uptown",
            "Damansara",
            &["dine-in", "drive-thru", "wifi"],
            "Jalan SS21/39",
            "7am-11pm",
        ),
        outlet(
            "Kedai Ipoh Garden",
            "Ipoh",
            &["dine-in", "takeaway"],
            "Jalan Medan Ipoh",
            "9am-9pm",
        ),
    ]
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config first, so the log level can come from it.
    let config_path = args.resolve_config_path();
    let config = KedaiConfig::load_or_default(&config_path);
    let log_level = args.resolve_log_level(&config.general.log_level);

    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    tracing::info!("Starting Kedai v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_path.display(), "Configuration resolved");

    // Tools.
    let catalog = Arc::new(InMemoryCatalog::new(demo_catalog()));
    let outlets = Arc::new(InMemoryOutlets::new(demo_outlets()));
    let calculator = Arc::new(ArithmeticCalculator);

    // Orchestrator.
    let orchestrator = ChatOrchestrator::new(&config, catalog, outlets, calculator);

    // REPL transport.
    let mut session_id = args.session.clone().unwrap_or_default();
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout
        .write_all(b"Kedai assistant ready. Ask about products, outlets, or a calculation.\n")
        .await?;
    stdout
        .write_all(b"Type /clear to reset the session, /quit to exit.\n\n> ")
        .await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let input = line.trim();

        match input {
            "/quit" | "/exit" => break,
            "/clear" => {
                if !session_id.is_empty() {
                    orchestrator.clear_session(&session_id);
                }
                session_id.clear();
                stdout.write_all(b"Session cleared.\n\n> ").await?;
                stdout.flush().await?;
                continue;
            }
            _ => {}
        }

        match orchestrator.handle_turn(&session_id, input).await {
            Ok(outcome) => {
                // Keep replying under the session the orchestrator chose.
                session_id = outcome.session_id.clone();
                let mut rendered = format!(
                    "[{} {:.2}] {}\n",
                    outcome.intent, outcome.confidence, outcome.reply_text
                );
                if !outcome.suggestions.is_empty() {
                    rendered.push_str(&format!("(try: {})\n", outcome.suggestions.join(" | ")));
                }
                rendered.push_str("\n> ");
                stdout.write_all(rendered.as_bytes()).await?;
                stdout.flush().await?;
            }
            Err(e @ ChatError::MessageTooLong(_)) => {
                stdout
                    .write_all(format!("Input rejected: {}\n\n> ", e).as_bytes())
                    .await?;
                stdout.flush().await?;
            }
            Err(e) => {
                tracing::error!(error = %e, "Turn failed");
                stdout
                    .write_all(b"Something went wrong; please try again.\n\n> ")
                    .await?;
                stdout.flush().await?;
            }
        }
    }

    tracing::info!("Goodbye");
    Ok(())
}
