//! Conversation orchestrator: the coordinator wiring classifier, extractor,
//! planner, dispatcher, and composer around the session store.
//!
//! One turn flows: checkout session (lazy expiry) → consume pending
//! follow-up → classify → extract → plan → dispatch (tool plans only) →
//! compose → commit session. The commit is the last step, so a turn
//! abandoned mid-flight (client disconnect, cancelled future) leaves the
//! session exactly as it was.

use std::sync::Arc;
use std::time::Duration;

use kedai_core::config::ChatConfig;
use kedai_core::{KedaiConfig, Timestamp};
use kedai_tools::{Calculator, OutletDirectory, ProductSearch};
use uuid::Uuid;

use crate::classifier::{IntentClassifier, TurnContext};
use crate::composer::ResponseComposer;
use crate::dispatcher::ToolDispatcher;
use crate::error::ChatError;
use crate::extractor::extract;
use crate::planner::ActionPlanner;
use crate::session::SessionStore;
use crate::types::{
    ActionKind, PlannedAction, Session, SessionSummary, TurnOutcome, TurnRecord,
};

/// Central conversation orchestrator.
pub struct ChatOrchestrator {
    classifier: IntentClassifier,
    planner: ActionPlanner,
    dispatcher: ToolDispatcher,
    composer: ResponseComposer,
    sessions: SessionStore,
    config: ChatConfig,
}

impl ChatOrchestrator {
    /// Build an orchestrator over the three collaborator tools.
    pub fn new(
        config: &KedaiConfig,
        products: Arc<dyn ProductSearch>,
        outlets: Arc<dyn OutletDirectory>,
        calculator: Arc<dyn Calculator>,
    ) -> Self {
        let classifier = IntentClassifier::new(&config.chat);
        let dispatcher = ToolDispatcher::new(
            products,
            outlets,
            calculator,
            Duration::from_millis(config.tools.dispatch_timeout_ms),
        );
        let composer = ResponseComposer::new(
            config.tools.max_products_in_reply,
            config.tools.max_outlets_in_reply,
        );
        let sessions = SessionStore::new(config.chat.session_idle_minutes);

        Self {
            classifier,
            planner: ActionPlanner,
            dispatcher,
            composer,
            sessions,
            config: config.chat.clone(),
        }
    }

    /// Handle one utterance for a session.
    ///
    /// The returned intent is always from the closed set; conditions caused
    /// by user input resolve into a reply, never an error. The only errors
    /// a transport sees are the disabled switch and the length guard.
    pub async fn handle_turn(
        &self,
        session_id: &str,
        utterance: &str,
    ) -> Result<TurnOutcome, ChatError> {
        if !self.config.enabled {
            return Err(ChatError::Disabled);
        }
        if utterance.chars().count() > self.config.max_message_length {
            return Err(ChatError::MessageTooLong(self.config.max_message_length));
        }

        let sid = if session_id.trim().is_empty() {
            Uuid::new_v4().to_string()
        } else {
            session_id.to_string()
        };

        // Per-session mutual exclusion: the slot lock is held for the whole
        // turn. Other sessions proceed independently.
        let slot = self.sessions.checkout(&sid);
        let mut session = slot.lock().await;

        let now = Timestamp::now();
        if session.is_expired(self.sessions.idle_minutes(), now) {
            tracing::debug!(session = %sid, "Idle session expired; treating as fresh");
            session.reset(now);
        }

        // Pending follow-up is consumed unconditionally: at most one
        // round-trip before re-classification from scratch.
        let pending = session.pending_followup.take();
        let context = TurnContext {
            pending_followup: pending,
            last_intent: session.last_intent,
        };

        let classification = self.classifier.classify(utterance, &context);
        debug_assert!(
            (0.0..=1.0).contains(&classification.confidence),
            "confidence out of range"
        );

        let params = extract(utterance, &classification);
        let first_turn = session.history.is_empty();
        let plan = self.planner.plan(&classification, &params, first_turn);

        let outcome = match &plan.action {
            PlannedAction::CallTool(call) => Some(self.dispatcher.dispatch(call).await),
            _ => None,
        };

        let reply = self.composer.compose(&plan, outcome.as_ref(), &params);

        // A follow-up for the intent we just asked about is not re-armed:
        // the next unanswered turn falls back to scratch classification.
        let pending_next = match &plan.action {
            PlannedAction::AskFollowUp { .. } if pending != Some(plan.intent) => Some(plan.intent),
            _ => None,
        };

        // Commit only now that the reply is fully composed.
        session.record_turn(
            utterance,
            plan.intent,
            ActionKind::from(&plan.action),
            pending_next,
            self.config.max_history_turns,
            Timestamp::now(),
        );

        tracing::info!(
            session = %sid,
            intent = %plan.intent,
            confidence = classification.confidence,
            "Turn handled"
        );

        Ok(TurnOutcome {
            session_id: sid,
            reply_text: reply.text,
            intent: plan.intent,
            confidence: classification.confidence,
            suggestions: reply.suggestions,
        })
    }

    /// Snapshot a session by id.
    pub async fn get_session(&self, session_id: &str) -> Option<Session> {
        self.sessions.get(session_id).await
    }

    /// Summaries of all live sessions.
    pub async fn list_sessions(&self) -> Vec<SessionSummary> {
        self.sessions.summaries().await
    }

    /// Drop a session entirely (explicit clear from the transport layer).
    pub fn clear_session(&self, session_id: &str) -> bool {
        self.sessions.clear(session_id)
    }

    /// Turn history for a session.
    pub async fn get_history(&self, session_id: &str) -> Result<Vec<TurnRecord>, ChatError> {
        match self.sessions.get(session_id).await {
            Some(session) => Ok(session.history),
            None => Err(ChatError::SessionNotFound(session_id.to_string())),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
