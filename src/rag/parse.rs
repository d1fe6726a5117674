//! Parsing of structured model responses.
//!
//! Models are asked for JSON arrays but do not always comply: answers arrive
//! wrapped in markdown fences, prefixed with prose, or as plain numbered
//! lists. Parsing is strict first and falls back to lenient heuristics,
//! flagging recovered output so callers can surface the degradation.

use serde_json::Value;
use tracing::debug;

/// A parsed value plus how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub value: T,
    /// True when the strict JSON parse failed and the value came from the
    /// lenient fallback (possibly empty).
    pub recovered: bool,
}

/// Parse a response expected to be a JSON array of strings.
///
/// Tries, in order: the whole text as JSON, the contents of a fenced code
/// block, and the outermost `[...]` substring. On failure the `fallback`
/// heuristic produces a best-effort value and the result is marked recovered.
fn parse_string_list<F>(raw: &str, fallback: F) -> Parsed<Vec<String>>
where
    F: FnOnce(&str) -> Vec<String>,
{
    for candidate in json_candidates(raw) {
        if let Some(items) = try_string_array(&candidate) {
            return Parsed {
                value: items,
                recovered: false,
            };
        }
    }

    debug!("structured parse failed, applying lenient fallback");
    Parsed {
        value: fallback(raw),
        recovered: true,
    }
}

/// Parse follow-up questions from a model response.
///
/// The lenient fallback scans for sentences ending in `?`, strips list
/// numbering and bullets, and keeps at most three.
pub fn parse_questions(raw: &str) -> Parsed<Vec<String>> {
    parse_string_list(raw, extract_questions)
}

/// Parse key takeaways from a model response.
///
/// The lenient fallback treats each non-trivial line as one takeaway, with
/// numbering and bullets stripped.
pub fn parse_takeaways(raw: &str) -> Parsed<Vec<String>> {
    parse_string_list(raw, extract_list_lines)
}

/// JSON substrings worth attempting, most specific first.
fn json_candidates(raw: &str) -> Vec<String> {
    let mut candidates = Vec::new();

    let trimmed = raw.trim();
    candidates.push(trimmed.to_string());

    if let Some(fenced) = extract_fenced_block(trimmed) {
        candidates.push(fenced);
    }

    if let (Some(start), Some(end)) = (trimmed.find('['), trimmed.rfind(']')) {
        if start < end {
            candidates.push(trimmed[start..=end].to_string());
        }
    }

    candidates
}

/// The contents of the first ``` fence, with an optional language tag.
fn extract_fenced_block(text: &str) -> Option<String> {
    let open = text.find("```")?;
    let after_fence = &text[open + 3..];
    let body_start = after_fence.find('\n')? + 1;
    let body = &after_fence[body_start..];
    let close = body.find("```")?;
    Some(body[..close].trim().to_string())
}

/// Parse `text` as a JSON array, keeping only string elements.
fn try_string_array(text: &str) -> Option<Vec<String>> {
    let value: Value = serde_json::from_str(text).ok()?;
    let items = value.as_array()?;
    let strings: Vec<String> = items
        .iter()
        .filter_map(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if strings.is_empty() {
        return None;
    }
    Some(strings)
}

/// Strip leading list markers like `1. `, `- ` or `* `.
fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    let without_number = line
        .find(|c: char| !c.is_ascii_digit())
        .filter(|&i| i > 0 && line[i..].starts_with('.'))
        .map(|i| line[i + 1..].trim_start())
        .unwrap_or(line);
    without_number
        .strip_prefix("- ")
        .or_else(|| without_number.strip_prefix("* "))
        .unwrap_or(without_number)
        .trim()
}

/// Best-effort question extraction from free text.
fn extract_questions(raw: &str) -> Vec<String> {
    raw.lines()
        .map(strip_list_marker)
        .filter(|line| line.ends_with('?') && line.len() > 10)
        .map(|line| line.trim_matches('"').to_string())
        .take(3)
        .collect()
}

/// Best-effort list extraction: each substantial line is one item.
fn extract_list_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(strip_list_marker)
        .filter(|line| line.len() > 10 && !line.starts_with("```"))
        .map(|line| line.trim_matches('"').to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_json_array() {
        let parsed = parse_questions(r#"["What is AI?", "How does it work?"]"#);
        assert!(!parsed.recovered);
        assert_eq!(parsed.value, vec!["What is AI?", "How does it work?"]);
    }

    #[test]
    fn test_fenced_json_array() {
        let raw = "Here you go:\n```json\n[\"What next?\", \"Why now?\"]\n```\n";
        let parsed = parse_questions(raw);
        assert!(!parsed.recovered);
        assert_eq!(parsed.value, vec!["What next?", "Why now?"]);
    }

    #[test]
    fn test_json_embedded_in_prose() {
        let raw = "Sure! [\"First takeaway here\", \"Second takeaway here\"] Hope that helps.";
        let parsed = parse_takeaways(raw);
        assert!(!parsed.recovered);
        assert_eq!(parsed.value.len(), 2);
    }

    #[test]
    fn test_lenient_numbered_questions() {
        let raw = "1. What are the main benefits of this approach?\n\
                   2. How would you measure success?\n\
                   3. This line is not a question.\n\
                   4. What risks remain unaddressed?\n\
                   5. Could this scale to larger inputs?";
        let parsed = parse_questions(raw);
        assert!(parsed.recovered);
        assert_eq!(parsed.value.len(), 3);
        assert_eq!(
            parsed.value[0],
            "What are the main benefits of this approach?"
        );
    }

    #[test]
    fn test_lenient_bulleted_takeaways() {
        let raw = "- Focus on the fundamentals first\n\
                   * Practice deliberately every day\n\
                   ok\n\
                   - Review progress weekly";
        let parsed = parse_takeaways(raw);
        assert!(parsed.recovered);
        assert_eq!(
            parsed.value,
            vec![
                "Focus on the fundamentals first",
                "Practice deliberately every day",
                "Review progress weekly"
            ]
        );
    }

    #[test]
    fn test_unsalvageable_gives_empty_recovered() {
        let parsed = parse_questions("No luck.");
        assert!(parsed.recovered);
        assert!(parsed.value.is_empty());
    }

    #[test]
    fn test_non_string_array_falls_back() {
        let parsed = parse_questions("[1, 2, 3]");
        assert!(parsed.recovered);
        assert!(parsed.value.is_empty());
    }
}
