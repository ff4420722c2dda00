//! Action planning.
//!
//! A small explicit state machine per intent: dispatch to a tool when the
//! required parameters are present, ask a follow-up when they are missing,
//! answer directly for conversational intents. Multi-intent ambiguity
//! resolves to the single highest-confidence intent; an ambiguous turn is
//! never treated as "no filter".

use crate::types::{
    ActionPlan, Classification, ExtractedParams, Intent, PlannedAction, ToolCall,
};

/// Plans one action per turn from classification, parameters, and a view of
/// the session.
pub struct ActionPlanner;

impl ActionPlanner {
    /// Decide what to do with this turn.
    ///
    /// `first_turn` is true when the session history is empty, which varies
    /// the general-chat phrasing between a first exchange and a continuing
    /// conversation.
    pub fn plan(
        &self,
        classification: &Classification,
        params: &ExtractedParams,
        first_turn: bool,
    ) -> ActionPlan {
        // The classifier orders {primary, secondary} by descending score
        // with priority tie-breaks, so the primary IS the highest-confidence
        // candidate. Planning targets exactly that one intent; secondary
        // intents only widen parameter extraction, never the result set.
        let target = classification.intent;

        let action = match target {
            Intent::ProductSearch => {
                if params.product_terms.is_empty() {
                    PlannedAction::AskFollowUp {
                        prompt: "Sure, which product are you after? A name or a keyword works."
                            .to_string(),
                    }
                } else {
                    PlannedAction::CallTool(ToolCall::ProductSearch {
                        query: params.product_terms.join(" "),
                    })
                }
            }
            Intent::OutletSearch => {
                if params.city.is_none() && params.service.is_none() {
                    PlannedAction::AskFollowUp {
                        prompt: "Which city or service should I look for? For example \
                                 \"outlets in Petaling Jaya\" or \"drive-thru\"."
                            .to_string(),
                    }
                } else {
                    PlannedAction::CallTool(ToolCall::OutletSearch {
                        city: params.city.clone(),
                        service: params.service.clone(),
                    })
                }
            }
            Intent::Calculation => match &params.amount_expression {
                Some(expression) => PlannedAction::CallTool(ToolCall::Calculate {
                    expression: expression.clone(),
                }),
                None => PlannedAction::AskFollowUp {
                    prompt: "What should I calculate? Try something like \"105 + 55\"."
                        .to_string(),
                },
            },
            Intent::Greeting => PlannedAction::AnswerDirectly {
                text: "Hello! I can help you find products, locate outlets, or work out \
                       prices. What can I do for you?"
                    .to_string(),
            },
            Intent::Goodbye => PlannedAction::AnswerDirectly {
                text: "Thanks for dropping by. See you next time!".to_string(),
            },
            Intent::Help => PlannedAction::AnswerDirectly {
                text: "Here's what I can do: search products (\"do you have a tumbler?\"), \
                       find outlets (\"which outlets are in Kuala Lumpur?\"), and calculate \
                       totals (\"calculate 25 + 15\")."
                    .to_string(),
            },
            Intent::GeneralChat => PlannedAction::AnswerDirectly {
                text: if first_turn {
                    "Hi! I'm the Kedai assistant. Ask me about products, outlet locations, \
                     or a quick price calculation."
                        .to_string()
                } else {
                    "Happy to keep chatting! Products, outlets, and price sums are where \
                     I'm most useful, though."
                        .to_string()
                },
            },
            Intent::Unknown => PlannedAction::AnswerDirectly {
                text: "Sorry, I didn't quite catch that. You can ask about products, \
                       outlets, or a calculation like \"25 + 15\"."
                    .to_string(),
            },
        };

        ActionPlan {
            action,
            intent: target,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn planner() -> ActionPlanner {
        ActionPlanner
    }

    fn classification(intent: Intent) -> Classification {
        Classification {
            intent,
            confidence: 0.8,
            secondary: Vec::new(),
        }
    }

    fn empty_params() -> ExtractedParams {
        ExtractedParams::default()
    }

    // ---- Product search ----

    #[test]
    fn test_product_with_terms_calls_tool() {
        let mut params = empty_params();
        params.product_terms = vec!["blue".to_string(), "tumbler".to_string()];
        let plan = planner().plan(&classification(Intent::ProductSearch), &params, true);
        assert_eq!(plan.intent, Intent::ProductSearch);
        assert_eq!(
            plan.action,
            PlannedAction::CallTool(ToolCall::ProductSearch {
                query: "blue tumbler".to_string()
            })
        );
    }

    #[test]
    fn test_product_without_terms_asks_followup() {
        let plan = planner().plan(&classification(Intent::ProductSearch), &empty_params(), true);
        assert!(matches!(plan.action, PlannedAction::AskFollowUp { .. }));
        assert_eq!(plan.intent, Intent::ProductSearch);
    }

    // ---- Outlet search ----

    #[test]
    fn test_outlet_with_city_calls_tool() {
        let mut params = empty_params();
        params.city = Some("Kuala Lumpur".to_string());
        let plan = planner().plan(&classification(Intent::OutletSearch), &params, true);
        assert_eq!(
            plan.action,
            PlannedAction::CallTool(ToolCall::OutletSearch {
                city: Some("Kuala Lumpur".to_string()),
                service: None,
            })
        );
    }

    #[test]
    fn test_outlet_with_service_only_calls_tool() {
        let mut params = empty_params();
        params.service = Some("drive-thru".to_string());
        let plan = planner().plan(&classification(Intent::OutletSearch), &params, true);
        assert!(matches!(
            plan.action,
            PlannedAction::CallTool(ToolCall::OutletSearch { city: None, .. })
        ));
    }

    #[test]
    fn test_outlet_without_filters_asks_followup() {
        let plan = planner().plan(&classification(Intent::OutletSearch), &empty_params(), true);
        assert!(matches!(plan.action, PlannedAction::AskFollowUp { .. }));
    }

    // ---- Calculation ----

    #[test]
    fn test_calculation_with_expression_calls_tool() {
        let mut params = empty_params();
        params.amount_expression = Some("25 + 15".to_string());
        let plan = planner().plan(&classification(Intent::Calculation), &params, true);
        assert_eq!(
            plan.action,
            PlannedAction::CallTool(ToolCall::Calculate {
                expression: "25 + 15".to_string()
            })
        );
    }

    #[test]
    fn test_calculation_without_expression_asks_followup() {
        let plan = planner().plan(&classification(Intent::Calculation), &empty_params(), true);
        assert!(matches!(plan.action, PlannedAction::AskFollowUp { .. }));
        assert_eq!(plan.intent, Intent::Calculation);
    }

    // ---- Direct answers ----

    #[test]
    fn test_greeting_answers_directly() {
        let plan = planner().plan(&classification(Intent::Greeting), &empty_params(), true);
        assert!(matches!(plan.action, PlannedAction::AnswerDirectly { .. }));
    }

    #[test]
    fn test_goodbye_answers_directly() {
        let plan = planner().plan(&classification(Intent::Goodbye), &empty_params(), false);
        assert!(matches!(plan.action, PlannedAction::AnswerDirectly { .. }));
    }

    #[test]
    fn test_help_lists_capabilities() {
        let plan = planner().plan(&classification(Intent::Help), &empty_params(), true);
        match plan.action {
            PlannedAction::AnswerDirectly { text } => {
                assert!(text.contains("products"));
                assert!(text.contains("outlets"));
                assert!(text.contains("calculate"));
            }
            other => panic!("expected direct answer, got {:?}", other),
        }
    }

    #[test]
    fn test_general_chat_varies_by_turn() {
        let first = planner().plan(&classification(Intent::GeneralChat), &empty_params(), true);
        let later = planner().plan(&classification(Intent::GeneralChat), &empty_params(), false);
        let (a, b) = match (first.action, later.action) {
            (
                PlannedAction::AnswerDirectly { text: a },
                PlannedAction::AnswerDirectly { text: b },
            ) => (a, b),
            other => panic!("expected direct answers, got {:?}", other),
        };
        assert_ne!(a, b);
    }

    #[test]
    fn test_unknown_answers_with_clarification() {
        let plan = planner().plan(&classification(Intent::Unknown), &empty_params(), true);
        match plan.action {
            PlannedAction::AnswerDirectly { text } => assert!(text.contains("didn't quite catch")),
            other => panic!("expected direct answer, got {:?}", other),
        }
        assert_eq!(plan.intent, Intent::Unknown);
    }

    // ---- Multi-intent ----

    #[test]
    fn test_multi_intent_plans_single_primary_never_unfiltered() {
        let c = Classification {
            intent: Intent::ProductSearch,
            confidence: 0.5,
            secondary: vec![Intent::OutletSearch],
        };
        let mut params = empty_params();
        params.product_terms = vec!["coffee".to_string()];
        params.service = Some("delivery".to_string());
        let plan = planner().plan(&c, &params, true);
        // Plans the primary product search; the outlet leg is not fused in.
        assert_eq!(plan.intent, Intent::ProductSearch);
        assert_eq!(
            plan.action,
            PlannedAction::CallTool(ToolCall::ProductSearch {
                query: "coffee".to_string()
            })
        );
    }

    #[test]
    fn test_multi_intent_missing_params_still_targets_primary() {
        let c = Classification {
            intent: Intent::OutletSearch,
            confidence: 0.5,
            secondary: vec![Intent::ProductSearch],
        };
        let plan = planner().plan(&c, &empty_params(), true);
        assert_eq!(plan.intent, Intent::OutletSearch);
        assert!(matches!(plan.action, PlannedAction::AskFollowUp { .. }));
    }
}
