//! Core types and value objects for the conversation orchestrator.
//!
//! Defines the closed intent set, classification and extraction results,
//! action plans, tool outcomes, and session state.

use std::fmt;

use kedai_core::Timestamp;
use kedai_tools::{OutletMatches, Product};
use serde::{Deserialize, Serialize};

// =============================================================================
// Intent
// =============================================================================

/// The closed set of conversational intents.
///
/// Every code path that hands a result to the transport layer normalizes
/// into one of these labels; the only way to name an intent is through this
/// enum, which rules out the free-string label drift by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    ProductSearch,
    OutletSearch,
    Calculation,
    Greeting,
    Goodbye,
    Help,
    GeneralChat,
    Unknown,
}

impl Intent {
    /// All intents in the fixed tie-break order: greeting-family labels win
    /// ties over explicit tool intents, which win over general chat, which
    /// wins over unknown. Score ties are always broken by this order, never
    /// by map iteration order.
    pub const PRIORITY_ORDER: [Intent; 8] = [
        Intent::Greeting,
        Intent::Goodbye,
        Intent::Help,
        Intent::Calculation,
        Intent::ProductSearch,
        Intent::OutletSearch,
        Intent::GeneralChat,
        Intent::Unknown,
    ];

    /// Position in the tie-break order; lower wins.
    pub fn priority(&self) -> usize {
        Self::PRIORITY_ORDER
            .iter()
            .position(|i| i == self)
            .unwrap_or(Self::PRIORITY_ORDER.len())
    }

    /// Whether this intent dispatches to an external tool.
    pub fn is_tool_intent(&self) -> bool {
        matches!(
            self,
            Intent::ProductSearch | Intent::OutletSearch | Intent::Calculation
        )
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::ProductSearch => write!(f, "product_search"),
            Intent::OutletSearch => write!(f, "outlet_search"),
            Intent::Calculation => write!(f, "calculation"),
            Intent::Greeting => write!(f, "greeting"),
            Intent::Goodbye => write!(f, "goodbye"),
            Intent::Help => write!(f, "help"),
            Intent::GeneralChat => write!(f, "general_chat"),
            Intent::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for Intent {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "product_search" => Ok(Intent::ProductSearch),
            "outlet_search" => Ok(Intent::OutletSearch),
            "calculation" => Ok(Intent::Calculation),
            "greeting" => Ok(Intent::Greeting),
            "goodbye" => Ok(Intent::Goodbye),
            "help" => Ok(Intent::Help),
            "general_chat" => Ok(Intent::GeneralChat),
            "unknown" => Ok(Intent::Unknown),
            _ => Err(format!("Unknown intent label: {}", s)),
        }
    }
}

// =============================================================================
// Classification & extraction
// =============================================================================

/// Result of intent classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub intent: Intent,
    /// Normalized confidence in `[0, 1]`.
    pub confidence: f32,
    /// Runner-up intents that scored significantly without being dominated,
    /// ordered by descending score. Normally empty.
    pub secondary: Vec<Intent>,
}

/// Structured parameters pulled out of an utterance.
///
/// All optional: a missing required parameter for the winning intent is the
/// signal that drives the planner toward a follow-up question.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedParams {
    pub product_terms: Vec<String>,
    pub city: Option<String>,
    pub service: Option<String>,
    pub amount_expression: Option<String>,
    /// Currency marker found on input (e.g. "RM"); the composer must echo
    /// it on the numeric result and must never invent one.
    pub currency: Option<String>,
    pub promo_code: Option<String>,
}

// =============================================================================
// Action plan
// =============================================================================

/// A concrete tool invocation with resolved arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCall {
    ProductSearch { query: String },
    OutletSearch { city: Option<String>, service: Option<String> },
    Calculate { expression: String },
}

impl ToolCall {
    pub fn tool_name(&self) -> &'static str {
        match self {
            ToolCall::ProductSearch { .. } => "product_search",
            ToolCall::OutletSearch { .. } => "outlet_search",
            ToolCall::Calculate { .. } => "calculator",
        }
    }
}

/// What the planner decided to do with a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlannedAction {
    AskFollowUp { prompt: String },
    CallTool(ToolCall),
    AnswerDirectly { text: String },
}

/// The planner's output: one action, targeting one intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionPlan {
    pub action: PlannedAction,
    pub intent: Intent,
}

/// Coarse action category recorded in session history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    AskedFollowUp,
    CalledTool,
    AnsweredDirectly,
}

impl From<&PlannedAction> for ActionKind {
    fn from(action: &PlannedAction) -> Self {
        match action {
            PlannedAction::AskFollowUp { .. } => ActionKind::AskedFollowUp,
            PlannedAction::CallTool(_) => ActionKind::CalledTool,
            PlannedAction::AnswerDirectly { .. } => ActionKind::AnsweredDirectly,
        }
    }
}

// =============================================================================
// Tool outcomes
// =============================================================================

/// Payload of a successful tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolPayload {
    Products(Vec<Product>),
    Outlets(OutletMatches),
    Number(f64),
}

/// Why a tool call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Timeout,
    Unavailable,
    NoResults,
    DivisionByZero,
    MalformedExpression,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Unavailable => write!(f, "unavailable"),
            FailureKind::NoResults => write!(f, "no_results"),
            FailureKind::DivisionByZero => write!(f, "division_by_zero"),
            FailureKind::MalformedExpression => write!(f, "malformed_expression"),
        }
    }
}

/// A captured tool failure. Never propagates as a fault; the composer turns
/// it into the tool's designated fallback reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolFailure {
    pub kind: FailureKind,
    pub detail: String,
    /// Size of a partially filtered result set, when one exists (e.g. the
    /// city-narrowed outlet count after the service filter emptied it).
    pub partial_count: Option<usize>,
}

/// Tagged result of a tool dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ToolOutcome {
    Success(ToolPayload),
    Failure(ToolFailure),
}

// =============================================================================
// Session state
// =============================================================================

/// One utterance/reply exchange as recorded in session history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRecord {
    pub utterance: String,
    pub intent: Intent,
    pub at: Timestamp,
}

/// Per-session conversational state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    /// Bounded to the configured window; older turns are dropped, not archived.
    pub history: Vec<TurnRecord>,
    pub last_intent: Option<Intent>,
    pub last_action: Option<ActionKind>,
    /// Set when the planner asked a clarifying question and is awaiting the
    /// answer. Consumed unconditionally at the start of the next turn.
    pub pending_followup: Option<Intent>,
    pub created_at: Timestamp,
    pub last_active_at: Timestamp,
}

impl Session {
    /// Create a fresh session for the given id.
    pub fn fresh(id: String, now: Timestamp) -> Self {
        Self {
            id,
            history: Vec::new(),
            last_intent: None,
            last_action: None,
            pending_followup: None,
            created_at: now,
            last_active_at: now,
        }
    }

    /// Whether the session has been idle past the configured threshold.
    pub fn is_expired(&self, idle_minutes: u32, now: Timestamp) -> bool {
        now.seconds_since(self.last_active_at) > i64::from(idle_minutes) * 60
    }

    /// Discard all state, keeping the id. Used for lazy idle expiry.
    pub fn reset(&mut self, now: Timestamp) {
        self.history.clear();
        self.last_intent = None;
        self.last_action = None;
        self.pending_followup = None;
        self.created_at = now;
        self.last_active_at = now;
    }

    /// Record a completed turn. Called as the final step of turn handling,
    /// after the reply is fully composed.
    pub fn record_turn(
        &mut self,
        utterance: &str,
        intent: Intent,
        action: ActionKind,
        pending: Option<Intent>,
        max_history: usize,
        now: Timestamp,
    ) {
        self.history.push(TurnRecord {
            utterance: utterance.to_string(),
            intent,
            at: now,
        });
        while self.history.len() > max_history {
            self.history.remove(0);
        }
        self.last_intent = Some(intent);
        self.last_action = Some(action);
        self.pending_followup = pending;
        self.last_active_at = now;
    }
}

/// Condensed session view for listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub turns: usize,
    pub created_at: Timestamp,
    pub last_active_at: Timestamp,
}

// =============================================================================
// Transport-facing output
// =============================================================================

/// The single output type handed back to the transport layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub session_id: String,
    pub reply_text: String,
    pub intent: Intent,
    pub confidence: f32,
    /// Suggested follow-up utterances, at most four.
    pub suggestions: Vec<String>,
}

// =============================================================================
// Tests
// =============================================================================
