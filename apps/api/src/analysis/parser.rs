//! Tolerant JSON recovery for LLM output.
//!
//! Model replies are usually-but-not-always valid JSON: prose around the
//! object, dangling commas, Python-literal quoting. Recovery is an ordered
//! chain of parse strategies; the first one that produces a value wins, and
//! exhausting the chain yields `None` rather than an error.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static TRAILING_COMMA_BEFORE_BRACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*\}").expect("brace pattern compiles"));
static TRAILING_COMMA_BEFORE_BRACKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*\]").expect("bracket pattern compiles"));

type ParseStrategy = fn(&str) -> Option<Value>;

/// Ordered parse attempts, strictest first.
const STRATEGIES: &[ParseStrategy] = &[
    parse_strict,
    parse_first_object,
    parse_repaired,
    parse_relaxed,
];

/// Recovers a JSON object from free-text model output. Returns `None` when
/// every strategy fails; never errors and never panics.
pub fn extract_json(text: &str) -> Option<Value> {
    STRATEGIES.iter().find_map(|parse| parse(text))
}

fn parse_strict(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

fn parse_first_object(text: &str) -> Option<Value> {
    serde_json::from_str(first_balanced_object(text)?).ok()
}

fn parse_repaired(text: &str) -> Option<Value> {
    serde_json::from_str(&strip_dangling_commas(first_balanced_object(text)?)).ok()
}

/// Last resort: json5 accepts a superset of JSON (single-quoted strings,
/// unquoted keys), which covers Python-literal-shaped output.
fn parse_relaxed(text: &str) -> Option<Value> {
    json5::from_str(&strip_dangling_commas(first_balanced_object(text)?)).ok()
}

/// Finds the first balanced `{...}` span by brace depth, starting at the
/// first `{`. Only this span is ever considered; later objects are not
/// scanned. The counter is not string-aware, so a `}` inside a quoted value
/// closes the span early — a known limitation, pinned by a test.
fn first_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    for (offset, ch) in text[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Removes trailing commas immediately before `}` or `]`, the most common
/// way model output deviates from strict JSON.
fn strip_dangling_commas(text: &str) -> String {
    let repaired = TRAILING_COMMA_BEFORE_BRACE.replace_all(text, "}");
    TRAILING_COMMA_BEFORE_BRACKET
        .replace_all(&repaired, "]")
        .into_owned()
}
