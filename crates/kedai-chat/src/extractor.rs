//! Entity and parameter extraction.
//!
//! Pure function of the utterance and its classification. Extraction rules
//! are intent-gated: an amount expression is only sliced out when the turn
//! involves calculation, city/service only when it involves outlet search,
//! and so on. City and service names come from the fixed vocabularies;
//! unmatched tokens are ignored, never guessed.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{Classification, ExtractedParams, Intent};
use crate::vocab;

// =============================================================================
// Patterns
// =============================================================================

static CURRENCY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(rm|myr|usd)\s*").expect("Invalid currency regex"));

// An arithmetic span: numbers joined by `+ * /` (spacing optional) or by a
// hyphen with whitespace on both sides, with optional parentheses.
static EXPR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(?\s*-?\d+(?:\.\d+)?(?:[\s)]*(?:[+*/]|\s-\s)[\s(]*-?\d+(?:\.\d+)?)+[\s)]*")
        .expect("Invalid expression regex")
});

static PROMO_PHRASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bpromo\s*code\s+([A-Za-z0-9]+)").expect("Invalid promo regex")
});

static PROMO_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z]{3,})(\d{1,4})\b").expect("Invalid promo regex"));

// =============================================================================
// Helpers
// =============================================================================

/// Detect and remove currency markers, returning the stripped text and the
/// canonical marker found, if any.
pub(crate) fn strip_currency(text: &str) -> (String, Option<String>) {
    let mut currency = CURRENCY_RE.captures(text).map(|caps| {
        match caps[1].to_lowercase().as_str() {
            "usd" => "USD".to_string(),
            _ => "RM".to_string(),
        }
    });
    let mut stripped = CURRENCY_RE.replace_all(text, "").into_owned();
    if stripped.contains('$') {
        currency.get_or_insert_with(|| "$".to_string());
        stripped = stripped.replace('$', "");
    }
    (stripped, currency)
}

fn involves(classification: &Classification, intent: Intent) -> bool {
    classification.intent == intent || classification.secondary.contains(&intent)
}

fn extract_promo_code(utterance: &str) -> Option<String> {
    if let Some(caps) = PROMO_PHRASE_RE.captures(utterance) {
        return Some(caps[1].to_uppercase());
    }
    for caps in PROMO_TOKEN_RE.captures_iter(utterance) {
        // Currency-amount tokens like MYR105 are not promo codes.
        if matches!(&caps[1], "MYR" | "USD") {
            continue;
        }
        return Some(caps[0].to_string());
    }
    None
}

fn extract_product_terms(normalized: &str, promo_code: &Option<String>) -> Vec<String> {
    let promo_lower = promo_code.as_deref().map(|p| p.to_lowercase());
    normalized
        .split_whitespace()
        .filter_map(|token| {
            let clean = token.trim_matches(|c: char| !c.is_alphanumeric() && c != '-');
            if clean.len() < 3 {
                return None;
            }
            if clean.chars().all(|c| c.is_ascii_digit() || c == '.') {
                return None;
            }
            if vocab::is_stop_word(clean) || vocab::is_vocab_word(clean) {
                return None;
            }
            if matches!(clean, "rm" | "myr" | "usd" | "calculate" | "promo" | "code") {
                return None;
            }
            if promo_lower.as_deref() == Some(clean) {
                return None;
            }
            Some(clean.to_string())
        })
        .collect()
}

// =============================================================================
// Extraction
// =============================================================================

/// Pull structured parameters out of an utterance for the intents this turn
/// involves.
pub fn extract(utterance: &str, classification: &Classification) -> ExtractedParams {
    let normalized = vocab::normalize(utterance);
    let padded = vocab::padded(&normalized);

    let mut params = ExtractedParams::default();

    if involves(classification, Intent::OutletSearch) {
        params.city = vocab::match_city(&padded).map(str::to_string);
        params.service = vocab::match_service(&padded).map(str::to_string);
    }

    if involves(classification, Intent::Calculation) {
        let (stripped, currency) = strip_currency(&normalized);
        params.currency = currency;
        params.amount_expression = EXPR_RE
            .find(&stripped)
            .map(|m| m.as_str().trim().to_string());
    }

    if involves(classification, Intent::ProductSearch) {
        params.promo_code = extract_promo_code(utterance);
        params.product_terms = extract_product_terms(&normalized, &params.promo_code);
    }

    params
}

// =============================================================================
// Tests
// =============================================================================
