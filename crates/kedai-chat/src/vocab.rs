//! Fixed vocabularies and text normalization shared by the classifier and
//! the parameter extractor.
//!
//! City and service names are matched against these tables, never inferred;
//! unmatched tokens are ignored rather than guessed.

/// Canonical city vocabulary: `(alias, canonical)` pairs. Aliases are
/// matched on normalized, space-padded text; longer aliases win.
pub static CITY_VOCAB: &[(&str, &str)] = &[
    ("kuala lumpur", "Kuala Lumpur"),
    ("kl", "Kuala Lumpur"),
    ("petaling jaya", "Petaling Jaya"),
    ("pj", "Petaling Jaya"),
    ("subang jaya", "Subang Jaya"),
    ("subang", "Subang Jaya"),
    ("shah alam", "Shah Alam"),
    ("klang", "Klang"),
    ("cheras", "Cheras"),
    ("bangsar", "Bangsar"),
    ("damansara", "Damansara"),
    ("putrajaya", "Putrajaya"),
    ("cyberjaya", "Cyberjaya"),
    ("penang", "Penang"),
    ("ipoh", "Ipoh"),
    ("johor bahru", "Johor Bahru"),
    ("jb", "Johor Bahru"),
];

/// Canonical service vocabulary: `(alias, canonical)` pairs.
pub static SERVICE_VOCAB: &[(&str, &str)] = &[
    ("drive-thru", "drive-thru"),
    ("drive thru", "drive-thru"),
    ("drivethru", "drive-thru"),
    ("drive-through", "drive-thru"),
    ("dine-in", "dine-in"),
    ("dine in", "dine-in"),
    ("delivery", "delivery"),
    ("takeaway", "takeaway"),
    ("take away", "takeaway"),
    ("pickup", "pickup"),
    ("pick-up", "pickup"),
    ("wifi", "wifi"),
    ("24 hours", "24-hour"),
    ("24-hour", "24-hour"),
];

/// Words carrying no product meaning, filtered out of product term residue.
pub static STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "am", "be", "been", "being",
    "have", "has", "had", "do", "does", "did", "will", "would", "shall",
    "should", "may", "might", "must", "can", "could", "i", "me", "my", "we",
    "our", "you", "your", "it", "they", "them", "their", "what", "which",
    "who", "this", "that", "these", "those", "of", "in", "to", "for", "with",
    "on", "at", "from", "by", "about", "as", "and", "but", "or", "not", "no",
    "so", "if", "then", "than", "too", "very", "just", "also", "any", "some",
    "how", "when", "where", "why", "please", "there", "here",
    // Query verbs and fillers that never name a product.
    "find", "show", "search", "look", "looking", "want", "need", "get",
    "buy", "order", "purchase", "sell", "selling", "price", "cost", "much",
    "many", "tell", "give", "like", "got", "item", "items", "product",
    "products", "available", "anything", "something",
];

/// Lowercase the text and strip punctuation, keeping hyphens, arithmetic
/// operators, and decimal points between digits. The output collapses to
/// single spaces.
pub fn normalize(text: &str) -> String {
    let chars: Vec<char> = text.to_lowercase().chars().collect();
    let mut out = String::with_capacity(chars.len());
    for (i, &c) in chars.iter().enumerate() {
        let keep = c.is_alphanumeric()
            || c.is_whitespace()
            || matches!(c, '-' | '+' | '*' | '/' | '(' | ')')
            || (c == '.'
                && i > 0
                && i + 1 < chars.len()
                && chars[i - 1].is_ascii_digit()
                && chars[i + 1].is_ascii_digit());
        out.push(if keep { c } else { ' ' });
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Wrap normalized text in single spaces so whole-token phrases can be
/// matched with a plain substring search.
pub fn padded(normalized: &str) -> String {
    format!(" {} ", normalized)
}

/// Whole-token phrase containment on padded text.
pub fn contains_phrase(padded_text: &str, phrase: &str) -> bool {
    padded_text.contains(&format!(" {} ", phrase))
}

/// Match the longest city alias present in the padded text.
pub fn match_city(padded_text: &str) -> Option<&'static str> {
    longest_match(padded_text, CITY_VOCAB)
}

/// Match the longest service alias present in the padded text.
pub fn match_service(padded_text: &str) -> Option<&'static str> {
    longest_match(padded_text, SERVICE_VOCAB)
}

fn longest_match(padded_text: &str, vocab: &[(&str, &'static str)]) -> Option<&'static str> {
    let mut best: Option<(&str, &'static str)> = None;
    for (alias, canonical) in vocab {
        if contains_phrase(padded_text, alias) {
            match best {
                Some((b, _)) if b.len() >= alias.len() => {}
                _ => best = Some((alias, canonical)),
            }
        }
    }
    best.map(|(_, canonical)| canonical)
}

/// Whether a token is a stop word.
pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}

/// Whether a token appears in any city or service alias.
pub fn is_vocab_word(token: &str) -> bool {
    CITY_VOCAB
        .iter()
        .chain(SERVICE_VOCAB.iter())
        .any(|(alias, _)| alias.split_whitespace().any(|w| w == token))
}
