//! Reply composition.
//!
//! Turns an action plan plus tool outcome into the final reply text and
//! follow-up suggestions. Currency markers found on the input reappear on
//! numeric results and are never invented. Session mutation is NOT done
//! here; the orchestrator commits state only after composition succeeds.

use kedai_tools::{Outlet, Product};

use crate::types::{
    ActionPlan, ExtractedParams, FailureKind, Intent, PlannedAction, ToolCall, ToolFailure,
    ToolOutcome, ToolPayload,
};

/// A composed reply: text plus suggested follow-ups.
#[derive(Debug, Clone)]
pub struct Reply {
    pub text: String,
    pub suggestions: Vec<String>,
}

/// Composes replies from plans and tool outcomes.
pub struct ResponseComposer {
    max_products: usize,
    max_outlets: usize,
}

const MAX_SUGGESTIONS: usize = 4;

impl ResponseComposer {
    pub fn new(max_products: usize, max_outlets: usize) -> Self {
        Self {
            max_products,
            max_outlets,
        }
    }

    /// Compose the reply for a completed turn.
    ///
    /// `outcome` is present exactly when the plan called a tool. A missing
    /// outcome for a tool plan is a programming fault: loud in debug builds,
    /// a generic apology in release.
    pub fn compose(
        &self,
        plan: &ActionPlan,
        outcome: Option<&ToolOutcome>,
        params: &ExtractedParams,
    ) -> Reply {
        match &plan.action {
            PlannedAction::AnswerDirectly { text } => Reply {
                text: text.clone(),
                suggestions: suggestions_for_intent(plan.intent),
            },
            PlannedAction::AskFollowUp { prompt } => Reply {
                text: prompt.clone(),
                suggestions: Vec::new(),
            },
            PlannedAction::CallTool(call) => match outcome {
                Some(ToolOutcome::Success(payload)) => self.compose_success(call, payload, params),
                Some(ToolOutcome::Failure(failure)) => compose_fallback(call, failure, params),
                None => {
                    debug_assert!(false, "tool plan composed without a tool outcome");
                    Reply {
                        text: "Sorry, something went wrong on my side. Could you try that \
                               again?"
                            .to_string(),
                        suggestions: Vec::new(),
                    }
                }
            },
        }
    }

    fn compose_success(
        &self,
        call: &ToolCall,
        payload: &ToolPayload,
        params: &ExtractedParams,
    ) -> Reply {
        match payload {
            ToolPayload::Products(products) => self.compose_products(products, params),
            ToolPayload::Outlets(matches) => self.compose_outlets(&matches.outlets, params),
            ToolPayload::Number(value) => compose_number(*value, params, call),
        }
    }

    fn compose_products(&self, products: &[Product], params: &ExtractedParams) -> Reply {
        let shown = &products[..products.len().min(self.max_products)];
        let mut lines = vec![format!(
            "Here's what I found ({} match{}):",
            products.len(),
            if products.len() == 1 { "" } else { "es" }
        )];
        for p in shown {
            lines.push(format!(
                "- {}: {}",
                p.name,
                format_amount(p.price, &Some(p.currency.clone()))
            ));
        }
        if products.len() > shown.len() {
            lines.push(format!("...and {} more.", products.len() - shown.len()));
        }
        if let Some(promo) = &params.promo_code {
            lines.push(format!("I'll note promo code {} for checkout.", promo));
        }

        let mut suggestions = vec!["Where's the nearest outlet?".to_string()];
        if let Some(first) = shown.first() {
            suggestions.push(format!("Calculate {} * 2", first.price));
        }
        suggestions.truncate(MAX_SUGGESTIONS);

        Reply {
            text: lines.join("\n"),
            suggestions,
        }
    }

    fn compose_outlets(&self, outlets: &[Outlet], params: &ExtractedParams) -> Reply {
        let shown = &outlets[..outlets.len().min(self.max_outlets)];
        let scope = match (&params.city, &params.service) {
            (Some(city), Some(service)) => format!(" in {} with {}", city, service),
            (Some(city), None) => format!(" in {}", city),
            (None, Some(service)) => format!(" with {}", service),
            (None, None) => String::new(),
        };
        let mut lines = vec![format!(
            "I found {} outlet{}{}:",
            outlets.len(),
            if outlets.len() == 1 { "" } else { "s" },
            scope
        )];
        for o in shown {
            lines.push(format!("- {}: {} ({})", o.name, o.address, o.hours));
        }
        if outlets.len() > shown.len() {
            lines.push(format!("...and {} more.", outlets.len() - shown.len()));
        }

        Reply {
            text: lines.join("\n"),
            suggestions: vec![
                "What drinks do you have?".to_string(),
                "Which of them open late?".to_string(),
            ],
        }
    }
}

fn compose_number(value: f64, params: &ExtractedParams, call: &ToolCall) -> Reply {
    let rendered = format_amount(value, &params.currency);
    let text = match call {
        ToolCall::Calculate { expression } => {
            format!("{} = {}", restore_currency(expression, &params.currency), rendered)
        }
        _ => format!("That comes to {}.", rendered),
    };
    Reply {
        text,
        suggestions: vec!["Need another total?".to_string()],
    }
}

/// Per-tool fallback replies for captured failures.
fn compose_fallback(call: &ToolCall, failure: &ToolFailure, params: &ExtractedParams) -> Reply {
    let text = match call {
        ToolCall::ProductSearch { query } => match failure.kind {
            FailureKind::NoResults => format!(
                "I couldn't find anything matching \"{}\". Could you give me the product \
                 name, or part of it?",
                query
            ),
            _ => "The product lookup isn't responding right now. Could you try the product \
                  name again in a moment?"
                .to_string(),
        },
        ToolCall::OutletSearch { .. } => match (failure.kind, failure.partial_count) {
            (FailureKind::NoResults, Some(n)) if n > 0 => {
                let city = params.city.as_deref().unwrap_or("that area");
                let service = params.service.as_deref().unwrap_or("that service");
                format!(
                    "I found {} outlet{} in {}, but none offering {}. Want to try a \
                     different service or city?",
                    n,
                    if n == 1 { "" } else { "s" },
                    city,
                    service
                )
            }
            _ => "I couldn't find outlets for that. Which city should I search? For \
                  example Kuala Lumpur or Petaling Jaya."
                .to_string(),
        },
        ToolCall::Calculate { expression } => match failure.kind {
            FailureKind::DivisionByZero => format!(
                "I can't divide by zero in \"{}\". Try something like \"10 / 2\".",
                expression
            ),
            FailureKind::MalformedExpression => format!(
                "I couldn't read that expression ({}). Try something like \"25 + 15\".",
                failure.detail
            ),
            _ => "The calculator isn't responding right now. Try \"25 + 15\" again in a \
                  moment."
                .to_string(),
        },
    };

    Reply {
        text,
        suggestions: Vec::new(),
    }
}

/// Canned follow-up suggestions for direct-answer intents.
fn suggestions_for_intent(intent: Intent) -> Vec<String> {
    let mut suggestions = match intent {
        Intent::Greeting | Intent::Help | Intent::GeneralChat | Intent::Unknown => vec![
            "Do you have a tumbler?".to_string(),
            "Which outlets are in Kuala Lumpur?".to_string(),
            "Calculate 25 + 15".to_string(),
        ],
        Intent::Goodbye => Vec::new(),
        _ => Vec::new(),
    };
    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}

/// Render a numeric amount, echoing the input's currency marker.
///
/// Integral values drop the decimal part; currency symbols render without a
/// space (`$160`), letter codes with one (`RM 160`). No marker on input
/// means no marker on output.
fn format_amount(value: f64, currency: &Option<String>) -> String {
    let number = if value.fract().abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        format!("{:.2}", value)
    };
    match currency.as_deref() {
        Some("$") => format!("${}", number),
        Some(code) => format!("{} {}", code, number),
        None => number,
    }
}

/// Re-attach the currency marker to the operands of an echoed expression.
fn restore_currency(expression: &str, currency: &Option<String>) -> String {
    match currency.as_deref() {
        None => expression.to_string(),
        Some(code) => expression
            .split_whitespace()
            .map(|token| {
                if token.chars().next().is_some_and(|c| c.is_ascii_digit()) {
                    if code == "$" {
                        format!("${}", token)
                    } else {
                        format!("{} {}", code, token)
                    }
                } else {
                    token.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" "),
    }
}

// =============================================================================
// Tests
// =============================================================================
