//! End-to-end turn flow scenarios driving the public orchestrator surface
//! with the in-memory reference tools.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kedai_chat::{ChatOrchestrator, Intent};
use kedai_core::KedaiConfig;
use kedai_tools::{
    ArithmeticCalculator, Calculator, InMemoryCatalog, InMemoryOutlets, Outlet, OutletDirectory,
    OutletFilters, OutletMatches, Product, ProductSearch, ToolError,
};

fn demo_products() -> Vec<Product> {
    vec![
        Product {
            name: "Classic Tumbler 500ml".to_string(),
            price: 55.0,
            currency: "RM".to_string(),
            category: "drinkware".to_string(),
        },
        Product {
            name: "Travel Mug 350ml".to_string(),
            price: 45.0,
            currency: "RM".to_string(),
            category: "drinkware".to_string(),
        },
        Product {
            name: "Americano".to_string(),
            price: 9.5,
            currency: "RM".to_string(),
            category: "coffee".to_string(),
        },
    ]
}

fn demo_outlets() -> Vec<Outlet> {
    vec![
        Outlet {
            name: "Kedai SS15".to_string(),
            city: "Subang Jaya".to_string(),
            services: vec!["dine-in".to_string(), "drive-thru".to_string()],
            address: "Jalan SS15/4".to_string(),
            hours: "8am-10pm".to_string(),
        },
        Outlet {
            name: "Kedai Mid Valley".to_string(),
            city: "Kuala Lumpur".to_string(),
            services: vec!["dine-in".to_string(), "delivery".to_string()],
            address: "Mid Valley Megamall".to_string(),
            hours: "10am-10pm".to_string(),
        },
        Outlet {
            name: "Kedai KLCC".to_string(),
            city: "Kuala Lumpur".to_string(),
            services: vec!["dine-in".to_string()],
            address: "Suria KLCC".to_string(),
            hours: "10am-10pm".to_string(),
        },
    ]
}

fn orchestrator() -> ChatOrchestrator {
    ChatOrchestrator::new(
        &KedaiConfig::default(),
        Arc::new(InMemoryCatalog::new(demo_products())),
        Arc::new(InMemoryOutlets::new(demo_outlets())),
        Arc::new(ArithmeticCalculator),
    )
}

// ---- Greeting ----

#[tokio::test]
async fn hi_is_greeting() {
    let orch = orchestrator();
    let outcome = orch.handle_turn("s", "Hi").await.unwrap();
    assert_eq!(outcome.intent, Intent::Greeting);
    assert!(!outcome.reply_text.is_empty());
}

// ---- Calculation ----

#[tokio::test]
async fn plain_addition_replies_forty() {
    let orch = orchestrator();
    let outcome = orch.handle_turn("s", "25 + 15").await.unwrap();
    assert_eq!(outcome.intent, Intent::Calculation);
    assert!(outcome.reply_text.contains("40"));
    // No currency on input means none on output.
    assert!(!outcome.reply_text.contains("RM"));
}

#[tokio::test]
async fn currency_marker_is_preserved() {
    let orch = orchestrator();
    let outcome = orch.handle_turn("s", "Calculate RM105 + RM55").await.unwrap();
    assert_eq!(outcome.intent, Intent::Calculation);
    assert!(outcome.reply_text.contains("RM 160"));
}

#[tokio::test]
async fn division_by_zero_names_the_problem_and_keeps_intent() {
    let orch = orchestrator();
    let outcome = orch.handle_turn("s", "5 / 0").await.unwrap();
    assert_eq!(outcome.intent, Intent::Calculation);
    assert!(outcome.reply_text.contains("divide by zero"));
}

#[tokio::test]
async fn malformed_expression_gets_specific_message() {
    let orch = orchestrator();
    let outcome = orch.handle_turn("s", "calculate 5 +").await.unwrap();
    assert_eq!(outcome.intent, Intent::Calculation);
    assert!(outcome.reply_text.contains("Try something like"));
}

// ---- Hyphenated compounds vs subtraction ----

#[tokio::test]
async fn hyphenated_compound_never_triggers_calculation() {
    let orch = orchestrator();
    let outcome = orch.handle_turn("s", "drive-thru").await.unwrap();
    assert_ne!(outcome.intent, Intent::Calculation);
}

#[tokio::test]
async fn spaced_hyphen_is_subtraction() {
    let orch = orchestrator();
    let outcome = orch.handle_turn("s", "10 - 3").await.unwrap();
    assert_eq!(outcome.intent, Intent::Calculation);
    assert!(outcome.reply_text.contains('7'));
}

// ---- Outlet search & sequential filtering ----

#[tokio::test]
async fn drive_thru_query_is_outlet_search_and_narrows() {
    let orch = orchestrator();
    let outcome = orch
        .handle_turn("s", "What outlets have drive-thru service?")
        .await
        .unwrap();
    assert_eq!(outcome.intent, Intent::OutletSearch);
    // Strictly smaller than the full outlet set: one of three.
    assert!(outcome.reply_text.contains("1 outlet"));
    assert!(outcome.reply_text.contains("Kedai SS15"));
    assert!(!outcome.reply_text.contains("Kedai KLCC"));
}

#[tokio::test]
async fn city_filter_lists_city_outlets_only() {
    let orch = orchestrator();
    let outcome = orch
        .handle_turn("s", "which outlets are in Kuala Lumpur?")
        .await
        .unwrap();
    assert_eq!(outcome.intent, Intent::OutletSearch);
    assert!(outcome.reply_text.contains("2 outlets"));
    assert!(!outcome.reply_text.contains("Kedai SS15"));
}

#[tokio::test]
async fn service_filter_applies_within_city_subset() {
    let orch = orchestrator();
    // Drive-thru exists, but not in Kuala Lumpur: the partial count from
    // the city narrowing is reported instead of a full unfiltered list.
    let outcome = orch
        .handle_turn("s", "any drive-thru outlets in Kuala Lumpur?")
        .await
        .unwrap();
    assert_eq!(outcome.intent, Intent::OutletSearch);
    assert!(outcome.reply_text.contains("2 outlets in Kuala Lumpur"));
    assert!(outcome.reply_text.contains("none offering drive-thru"));
}

#[tokio::test]
async fn outlet_question_without_filters_asks_followup() {
    let orch = orchestrator();
    let outcome = orch.handle_turn("s", "where is your nearest outlet?").await.unwrap();
    assert_eq!(outcome.intent, Intent::OutletSearch);
    assert!(outcome.reply_text.contains("city or service"));
}

// ---- Product search ----

#[tokio::test]
async fn product_query_lists_matches() {
    let orch = orchestrator();
    let outcome = orch.handle_turn("s", "do you have a tumbler?").await.unwrap();
    assert_eq!(outcome.intent, Intent::ProductSearch);
    assert!(outcome.reply_text.contains("Classic Tumbler 500ml"));
    assert!(outcome.reply_text.contains("RM 55"));
}

#[tokio::test]
async fn unmatched_product_degrades_to_clarification() {
    let orch = orchestrator();
    let outcome = orch.handle_turn("s", "do you sell spaceships?").await.unwrap();
    assert_eq!(outcome.intent, Intent::ProductSearch);
    assert!(outcome.reply_text.contains("couldn't find"));
}

// ---- Follow-up round trip ----

#[tokio::test]
async fn followup_round_trip_resolves_product() {
    let orch = orchestrator();
    let ask = orch.handle_turn("s", "I want to order something").await.unwrap();
    assert_eq!(ask.intent, Intent::ProductSearch);
    assert!(ask.reply_text.contains("which product"));

    let answer = orch.handle_turn("s", "americano").await.unwrap();
    assert_eq!(answer.intent, Intent::ProductSearch);
    assert!(answer.reply_text.contains("Americano"));

    let session = orch.get_session("s").await.unwrap();
    assert!(session.pending_followup.is_none());
}

#[tokio::test]
async fn followup_cleared_after_at_most_one_turn() {
    let orch = orchestrator();
    orch.handle_turn("s", "I want to order something").await.unwrap();
    orch.handle_turn("s", "hmm let me think").await.unwrap();
    let session = orch.get_session("s").await.unwrap();
    assert!(session.pending_followup.is_none());
}

// ---- Tool failure isolation ----

struct HangingCalculator;

#[async_trait]
impl Calculator for HangingCalculator {
    async fn evaluate(&self, _expr: &str) -> Result<f64, ToolError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(0.0)
    }
}

struct BrokenOutlets;

#[async_trait]
impl OutletDirectory for BrokenOutlets {
    async fn search(&self, _filters: &OutletFilters) -> Result<OutletMatches, ToolError> {
        Err(ToolError::Unavailable("directory offline".to_string()))
    }
}

#[tokio::test]
async fn hanging_tool_times_out_into_reply_and_spares_other_sessions() {
    let mut config = KedaiConfig::default();
    config.tools.dispatch_timeout_ms = 50;
    let orch = Arc::new(ChatOrchestrator::new(
        &config,
        Arc::new(InMemoryCatalog::new(demo_products())),
        Arc::new(InMemoryOutlets::new(demo_outlets())),
        Arc::new(HangingCalculator),
    ));

    let slow = {
        let orch = Arc::clone(&orch);
        tokio::spawn(async move { orch.handle_turn("slow", "25 + 15").await.unwrap() })
    };
    // Another session proceeds while the first waits on its tool.
    let other = orch.handle_turn("other", "Hi").await.unwrap();
    assert_eq!(other.intent, Intent::Greeting);

    let outcome = slow.await.unwrap();
    assert_eq!(outcome.intent, Intent::Calculation);
    assert!(outcome.reply_text.contains("isn't responding"));
}

#[tokio::test]
async fn broken_outlet_tool_degrades_to_reply() {
    let orch = ChatOrchestrator::new(
        &KedaiConfig::default(),
        Arc::new(InMemoryCatalog::new(demo_products())),
        Arc::new(BrokenOutlets),
        Arc::new(ArithmeticCalculator),
    );
    let outcome = orch.handle_turn("s", "outlets in kl please").await.unwrap();
    assert_eq!(outcome.intent, Intent::OutletSearch);
    assert!(outcome.reply_text.contains("Which city"));
}

// ---- Closed set across a conversation ----

#[tokio::test]
async fn every_reply_carries_a_closed_set_intent() {
    let orch = orchestrator();
    for utterance in [
        "Hi",
        "what can you do?",
        "do you have mugs?",
        "outlets in subang",
        "calculate 2 * 8",
        "thanks",
        "bye",
        "qwerty zxcvb",
        "",
    ] {
        let outcome = orch.handle_turn("s", utterance).await.unwrap();
        assert!(
            Intent::PRIORITY_ORDER.contains(&outcome.intent),
            "{} produced {:?}",
            utterance,
            outcome.intent
        );
        assert!((0.0..=1.0).contains(&outcome.confidence));
    }
}

// ---- First-turn vs continuing general chat ----

#[tokio::test]
async fn general_chat_phrasing_varies_with_history() {
    let orch = orchestrator();
    let first = orch.handle_turn("s", "how are you").await.unwrap();
    let later = orch.handle_turn("s", "how are you").await.unwrap();
    assert_eq!(first.intent, Intent::GeneralChat);
    assert_eq!(later.intent, Intent::GeneralChat);
    assert_ne!(first.reply_text, later.reply_text);
}

// ---- Mixed conversation keeps context sane ----

#[tokio::test]
async fn conversation_flows_across_intents() {
    let orch = orchestrator();
    let greet = orch.handle_turn("s", "good morning!").await.unwrap();
    assert_eq!(greet.intent, Intent::Greeting);

    let product = orch.handle_turn("s", "price of the americano?").await.unwrap();
    assert_eq!(product.intent, Intent::ProductSearch);
    assert!(product.reply_text.contains("9.50"));

    let total = orch.handle_turn("s", "calculate 9.50 * 2").await.unwrap();
    assert_eq!(total.intent, Intent::Calculation);
    assert!(total.reply_text.contains("19"));

    let outlets = orch.handle_turn("s", "where can I pick it up in subang?").await.unwrap();
    assert_eq!(outlets.intent, Intent::OutletSearch);
    assert!(outlets.reply_text.contains("Kedai SS15"));

    let bye = orch.handle_turn("s", "bye!").await.unwrap();
    assert_eq!(bye.intent, Intent::Goodbye);

    let history = orch.get_history("s").await.unwrap();
    assert_eq!(history.len(), 5);
}
