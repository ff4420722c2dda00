//! Tool dispatch with a failure boundary.
//!
//! Every external call runs under a timeout and every way it can go wrong
//! (timeout, tool error, empty result set) normalizes into a
//! `ToolOutcome::Failure` for the composer to turn into a fallback reply.
//! Nothing is retried; a failed attempt degrades within the same turn.

use std::sync::Arc;
use std::time::Duration;

use kedai_tools::{Calculator, OutletDirectory, OutletFilters, ProductSearch, ToolError};

use crate::types::{FailureKind, ToolCall, ToolFailure, ToolOutcome, ToolPayload};

/// Dispatches planned tool calls to the collaborator implementations.
pub struct ToolDispatcher {
    products: Arc<dyn ProductSearch>,
    outlets: Arc<dyn OutletDirectory>,
    calculator: Arc<dyn Calculator>,
    timeout: Duration,
}

impl ToolDispatcher {
    pub fn new(
        products: Arc<dyn ProductSearch>,
        outlets: Arc<dyn OutletDirectory>,
        calculator: Arc<dyn Calculator>,
        timeout: Duration,
    ) -> Self {
        Self {
            products,
            outlets,
            calculator,
            timeout,
        }
    }

    /// Invoke the tool named by the plan and normalize the result.
    pub async fn dispatch(&self, call: &ToolCall) -> ToolOutcome {
        let outcome = match call {
            ToolCall::ProductSearch { query } => self.dispatch_products(query).await,
            ToolCall::OutletSearch { city, service } => {
                self.dispatch_outlets(city.clone(), service.clone()).await
            }
            ToolCall::Calculate { expression } => self.dispatch_calculator(expression).await,
        };

        if let ToolOutcome::Failure(ref failure) = outcome {
            tracing::warn!(
                tool = call.tool_name(),
                kind = %failure.kind,
                detail = %failure.detail,
                "Tool dispatch failed"
            );
        }
        outcome
    }

    async fn dispatch_products(&self, query: &str) -> ToolOutcome {
        match tokio::time::timeout(self.timeout, self.products.search(query)).await {
            Err(_) => timeout_failure(self.timeout),
            Ok(Err(e)) => error_failure(e),
            Ok(Ok(products)) if products.is_empty() => ToolOutcome::Failure(ToolFailure {
                kind: FailureKind::NoResults,
                detail: query.to_string(),
                partial_count: None,
            }),
            Ok(Ok(products)) => ToolOutcome::Success(ToolPayload::Products(products)),
        }
    }

    async fn dispatch_outlets(&self, city: Option<String>, service: Option<String>) -> ToolOutcome {
        let filters = OutletFilters { city, service };
        match tokio::time::timeout(self.timeout, self.outlets.search(&filters)).await {
            Err(_) => timeout_failure(self.timeout),
            Ok(Err(e)) => error_failure(e),
            Ok(Ok(matches)) if matches.outlets.is_empty() => ToolOutcome::Failure(ToolFailure {
                kind: FailureKind::NoResults,
                detail: String::new(),
                partial_count: Some(matches.city_candidates),
            }),
            Ok(Ok(matches)) => ToolOutcome::Success(ToolPayload::Outlets(matches)),
        }
    }

    async fn dispatch_calculator(&self, expression: &str) -> ToolOutcome {
        match tokio::time::timeout(self.timeout, self.calculator.evaluate(expression)).await {
            Err(_) => timeout_failure(self.timeout),
            Ok(Err(e)) => error_failure(e),
            Ok(Ok(value)) => ToolOutcome::Success(ToolPayload::Number(value)),
        }
    }
}

fn timeout_failure(timeout: Duration) -> ToolOutcome {
    ToolOutcome::Failure(ToolFailure {
        kind: FailureKind::Timeout,
        detail: format!("exceeded {} ms", timeout.as_millis()),
        partial_count: None,
    })
}

fn error_failure(err: ToolError) -> ToolOutcome {
    let (kind, detail) = match err {
        ToolError::Timeout(ms) => (FailureKind::Timeout, format!("exceeded {} ms", ms)),
        ToolError::DivisionByZero => (FailureKind::DivisionByZero, String::new()),
        ToolError::MalformedExpression(detail) => (FailureKind::MalformedExpression, detail),
        ToolError::NoResults => (FailureKind::NoResults, String::new()),
        ToolError::Unavailable(detail) | ToolError::InvalidFilter(detail) => {
            (FailureKind::Unavailable, detail)
        }
    };
    ToolOutcome::Failure(ToolFailure {
        kind,
        detail,
        partial_count: None,
    })
}

// =============================================================================
// Tests
// =============================================================================
