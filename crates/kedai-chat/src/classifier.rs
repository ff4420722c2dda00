//! Layered intent classification.
//!
//! Table-driven scoring rather than nested conditionals: lexical keyword
//! tables score intents additively, a structural layer boosts arithmetic
//! and outlet-quantity shapes, and a context layer biases toward resolving
//! a pending follow-up. Confidence is the winning share of total signal;
//! ties break by the fixed intent priority order.

use std::sync::LazyLock;

use regex::Regex;

use kedai_core::config::ChatConfig;

use crate::extractor::strip_currency;
use crate::types::{Classification, Intent};
use crate::vocab;

// =============================================================================
// Keyword tables
// =============================================================================

struct KeywordSet {
    intent: Intent,
    weight: f32,
    phrases: &'static [&'static str],
}

/// The lexical scoring table: keyword set -> intent -> weight. A set scores
/// its weight once when any of its phrases is present as a whole token.
static LEXICON: &[KeywordSet] = &[
    KeywordSet {
        intent: Intent::Greeting,
        weight: 2.0,
        phrases: &[
            "hi", "hello", "hey", "greetings", "good morning", "good afternoon",
            "good evening", "hi there", "hello there", "yo",
        ],
    },
    KeywordSet {
        intent: Intent::Goodbye,
        weight: 2.0,
        phrases: &[
            "bye", "goodbye", "good bye", "see you", "see ya", "good night",
            "farewell",
        ],
    },
    KeywordSet {
        intent: Intent::Help,
        weight: 2.0,
        phrases: &[
            "help", "what can you do", "how do you work", "how does this work",
            "what do you do", "instructions",
        ],
    },
    KeywordSet {
        intent: Intent::GeneralChat,
        weight: 1.5,
        phrases: &[
            "how are you", "what s up", "whats up", "thanks", "thank you",
            "who are you", "what are you", "tell me a joke", "nice", "awesome",
        ],
    },
    KeywordSet {
        intent: Intent::ProductSearch,
        weight: 1.5,
        phrases: &[
            "coffee", "latte", "americano", "espresso", "cappuccino", "mocha",
            "matcha", "tea", "chocolate", "tumbler", "tumblers", "mug", "mugs",
            "cup", "cups", "bottle", "bottles", "flask", "drinkware",
            "merchandise", "product", "products", "item", "items", "drink",
            "drinks", "beverage", "beverages", "menu",
        ],
    },
    KeywordSet {
        intent: Intent::ProductSearch,
        weight: 1.0,
        phrases: &[
            "buy", "order", "purchase", "price", "cost", "sell", "recommend",
            "looking for", "do you have",
        ],
    },
    KeywordSet {
        intent: Intent::OutletSearch,
        weight: 1.5,
        phrases: &[
            "outlet", "outlets", "store", "stores", "branch", "branches",
            "location", "locations", "shop", "shops", "address",
            "opening hours", "nearest", "nearby", "near", "service", "services",
        ],
    },
    KeywordSet {
        intent: Intent::OutletSearch,
        weight: 1.0,
        phrases: &["open", "close", "closes", "closest", "where"],
    },
    KeywordSet {
        intent: Intent::Calculation,
        weight: 1.5,
        phrases: &[
            "calculate", "calculator", "compute", "plus", "minus", "times",
            "multiplied", "divided", "divide", "subtract", "percent", "equals",
            "sum of", "total of",
        ],
    },
];

/// Quantity phrases that boost outlet search when an outlet or service
/// keyword is also present.
static QUANTITY_PHRASES: &[&str] = &["how many", "which", "what", "where", "any"];

/// Keywords that signal an explicit topic change, suppressing the pending
/// follow-up bias.
static TOPIC_CHANGE_WORDS: &[&str] =
    &["instead", "actually", "forget", "never mind", "nevermind", "different"];

// =============================================================================
// Structural layer
// =============================================================================

// Operator detection: `+ * / =` count anywhere between numbers; a hyphen is
// a subtraction operator only when whitespace surrounds it on both sides,
// so hyphenated compounds like "drive-thru" never read as arithmetic.
static SYMBOL_OP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d\s*[+*/=]\s*\(*\s*-?\d").expect("Invalid operator regex"));

static SPACED_MINUS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d\s+-\s+\(*\s*-?\d").expect("Invalid operator regex"));

/// Whether the text contains a recognizable arithmetic expression shape.
pub(crate) fn has_arithmetic_shape(text: &str) -> bool {
    SYMBOL_OP_RE.is_match(text) || SPACED_MINUS_RE.is_match(text)
}

// =============================================================================
// Classifier
// =============================================================================

/// Recent-session context fed into classification.
#[derive(Debug, Clone, Default)]
pub struct TurnContext {
    /// Intent of a clarifying question asked last turn, if any.
    pub pending_followup: Option<Intent>,
    pub last_intent: Option<Intent>,
}

/// Rule-based, layered intent classifier.
pub struct IntentClassifier {
    significant_score: f32,
    dominance_margin: f32,
    followup_bias: f32,
}

const ARITHMETIC_BOOST: f32 = 3.0;
const QUANTITY_BOOST: f32 = 1.5;
const CITY_WEIGHT: f32 = 2.0;
const SERVICE_WEIGHT: f32 = 2.0;
/// Confidence floor reported when no signal matched at all.
const UNKNOWN_CONFIDENCE: f32 = 0.2;

impl IntentClassifier {
    pub fn new(config: &ChatConfig) -> Self {
        Self {
            significant_score: config.significant_score,
            dominance_margin: config.dominance_margin,
            followup_bias: config.followup_bias,
        }
    }

    /// Classify an utterance against recent context.
    ///
    /// Never fails: unrecognized or empty input yields `Unknown` with low
    /// confidence.
    pub fn classify(&self, utterance: &str, context: &TurnContext) -> Classification {
        let normalized = vocab::normalize(utterance);
        let padded = vocab::padded(&normalized);

        let mut scores = [0.0f32; 8];
        let add = |intent: Intent, weight: f32, scores: &mut [f32; 8]| {
            scores[intent.priority()] += weight;
        };

        // Lexical layer.
        for set in LEXICON {
            if set.phrases.iter().any(|p| vocab::contains_phrase(&padded, p)) {
                add(set.intent, set.weight, &mut scores);
            }
        }
        if vocab::match_city(&padded).is_some() {
            add(Intent::OutletSearch, CITY_WEIGHT, &mut scores);
        }
        if vocab::match_service(&padded).is_some() {
            add(Intent::OutletSearch, SERVICE_WEIGHT, &mut scores);
        }

        // Structural layer. Currency markers are stripped first so
        // "RM105 + RM55" still reads as an expression.
        let (currency_free, _) = strip_currency(&normalized);
        if has_arithmetic_shape(&currency_free) {
            add(Intent::Calculation, ARITHMETIC_BOOST, &mut scores);
        }
        if scores[Intent::OutletSearch.priority()] > 0.0
            && QUANTITY_PHRASES.iter().any(|p| vocab::contains_phrase(&padded, p))
        {
            add(Intent::OutletSearch, QUANTITY_BOOST, &mut scores);
        }

        // Context layer: bias toward resolving a pending follow-up unless
        // the utterance carries a strong signal for something else.
        if let Some(pending) = context.pending_followup {
            let strong_greeting = scores[Intent::Greeting.priority()] >= 2.0
                || scores[Intent::Goodbye.priority()] >= 2.0;
            let topic_change = TOPIC_CHANGE_WORDS
                .iter()
                .any(|p| vocab::contains_phrase(&padded, p));
            if !strong_greeting && !topic_change {
                add(pending, self.followup_bias, &mut scores);
            }
        }

        self.resolve(&scores)
    }

    /// Pick the winner and runners-up from the score table.
    fn resolve(&self, scores: &[f32; 8]) -> Classification {
        let total: f32 = scores.iter().sum();
        if total <= 0.0 {
            return Classification {
                intent: Intent::Unknown,
                confidence: UNKNOWN_CONFIDENCE,
                secondary: Vec::new(),
            };
        }

        // PRIORITY_ORDER iteration with a strict `>` makes ties fall to the
        // earlier (higher-priority) intent deterministically.
        let mut winner = Intent::Unknown;
        let mut winner_score = 0.0f32;
        for intent in Intent::PRIORITY_ORDER {
            let score = scores[intent.priority()];
            if score > winner_score {
                winner = intent;
                winner_score = score;
            }
        }

        let confidence = (winner_score / total).clamp(0.0, 1.0);

        // Multi-intent: report every significant, non-dominated runner-up
        // rather than silently discarding it.
        let mut secondary: Vec<Intent> = Vec::new();
        if winner_score >= self.significant_score {
            for intent in Intent::PRIORITY_ORDER {
                if intent == winner {
                    continue;
                }
                let score = scores[intent.priority()];
                if score >= self.significant_score
                    && (winner_score - score) / total < self.dominance_margin
                {
                    secondary.push(intent);
                }
            }
            secondary.sort_by(|a, b| {
                scores[b.priority()]
                    .partial_cmp(&scores[a.priority()])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }

        Classification {
            intent: winner,
            confidence,
            secondary,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
