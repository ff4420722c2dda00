//! Conversational orchestrator for Kedai.
//!
//! Turns a raw utterance plus prior session state into a classified intent,
//! a planned action with resolved parameters, a dispatch to the matching
//! tool (or a direct answer), and a next-state session update. The whole
//! pipeline is deterministic rule-plus-heuristic logic, reproducible in
//! tests with no learned model in the loop.

pub mod classifier;
pub mod composer;
pub mod dispatcher;
pub mod error;
pub mod extractor;
pub mod orchestrator;
pub mod planner;
pub mod session;
pub mod types;
pub mod vocab;

pub use classifier::{IntentClassifier, TurnContext};
pub use composer::{Reply, ResponseComposer};
pub use dispatcher::ToolDispatcher;
pub use error::ChatError;
pub use extractor::extract;
pub use orchestrator::ChatOrchestrator;
pub use planner::ActionPlanner;
pub use session::SessionStore;
pub use types::{
    ActionKind, ActionPlan, Classification, ExtractedParams, FailureKind, Intent, PlannedAction,
    Session, SessionSummary, ToolCall, ToolFailure, ToolOutcome, ToolPayload, TurnOutcome,
    TurnRecord,
};
