//! JSON recovery from model output.
//!
//! The generation runtime answers with model text that should be a single
//! JSON object but may wrap it in a markdown code fence or surround it
//! with prose. Extraction tries, in order:
//!
//! 1. A ```json fenced block
//! 2. Content that is itself a JSON object
//! 3. The first brace-balanced object found anywhere in the text
//!
//! Candidates are only accepted if they parse as JSON.

use regex::Regex;

/// Extracts a JSON object from model output.
///
/// Returns `None` when no parseable object can be found.
pub fn extract_json_object(content: &str) -> Option<String> {
    let trimmed = content.trim();

    if let Some(json) = extract_from_fenced_block(trimmed) {
        return Some(json);
    }

    if trimmed.starts_with('{') {
        if let Some(end) = find_matching_brace(trimmed) {
            let candidate = &trimmed[..=end];
            if serde_json::from_str::<serde_json::Value>(candidate).is_ok() {
                return Some(candidate.to_string());
            }
        }
    }

    if let Some(start) = trimmed.find('{') {
        if let Some(end) = find_matching_brace(&trimmed[start..]) {
            let candidate = &trimmed[start..=start + end];
            if serde_json::from_str::<serde_json::Value>(candidate).is_ok() {
                return Some(candidate.to_string());
            }
        }
    }

    None
}

/// Extracts an object from a ```json (or generic) code fence.
fn extract_from_fenced_block(content: &str) -> Option<String> {
    let re = Regex::new(r"```(?:json)?\s*\n?([\s\S]*?)\n?```").ok()?;
    let caps = re.captures(content)?;
    let block = caps.get(1)?.as_str().trim();
    let start = block.find('{')?;
    let end = find_matching_brace(&block[start..])?;
    let candidate = &block[start..=start + end];
    if serde_json::from_str::<serde_json::Value>(candidate).is_ok() {
        Some(candidate.to_string())
    } else {
        None
    }
}

/// Finds the index of the brace closing the object that opens `s`.
///
/// Handles nested braces, string literals and escape sequences. Returns
/// `None` when the object never closes.
pub fn find_matching_brace(s: &str) -> Option<usize> {
    let mut depth = 0;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in s.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => {
                escape_next = true;
            }
            '"' => {
                in_string = !in_string;
            }
            '{' if !in_string => {
                depth += 1;
            }
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_object() {
        let input = r#"{"topic": "Security"}"#;
        assert_eq!(extract_json_object(input), Some(input.to_string()));
    }

    #[test]
    fn test_fenced_block() {
        let input = "Here is the question:\n```json\n{\"topic\": \"Security\"}\n```\nDone.";
        assert_eq!(
            extract_json_object(input),
            Some(r#"{"topic": "Security"}"#.to_string())
        );
    }

    #[test]
    fn test_generic_fence() {
        let input = "```\n{\"topic\": \"Networking\"}\n```";
        assert_eq!(
            extract_json_object(input),
            Some(r#"{"topic": "Networking"}"#.to_string())
        );
    }

    #[test]
    fn test_object_in_prose() {
        let input = r#"Sure, here it is: {"topic": "Storage", "difficulty": "professional"} hope it helps"#;
        assert_eq!(
            extract_json_object(input),
            Some(r#"{"topic": "Storage", "difficulty": "professional"}"#.to_string())
        );
    }

    #[test]
    fn test_nested_object_with_escaped_quotes() {
        let input = r#"{"question": "He said \"why\"", "options": [{"label": "A"}]}"#;
        assert_eq!(extract_json_object(input), Some(input.to_string()));
    }

    #[test]
    fn test_no_json() {
        assert_eq!(extract_json_object("plain text only"), None);
        assert_eq!(extract_json_object(""), None);
    }

    #[test]
    fn test_truncated_object_rejected() {
        assert_eq!(extract_json_object(r#"{"topic": "Security""#), None);
    }

    #[test]
    fn test_find_matching_brace() {
        assert_eq!(find_matching_brace("{}"), Some(1));
        assert_eq!(find_matching_brace(r#"{"a": {"b": "c"}}"#), Some(16));
        assert_eq!(find_matching_brace(r#"{"braces": "{ not real }"}"#), Some(25));
        assert_eq!(find_matching_brace(r#"{"open": true"#), None);
    }
}
