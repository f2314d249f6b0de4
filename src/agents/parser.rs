//! Action Parser
//!
//! Tolerant line scanner over free-text model output.

use regex::Regex;
use std::sync::LazyLock;

static TOOL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(WebSearch|Wikipedia|Arxiv)").expect("valid tool regex"));

/// Action and input declared by one model response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedAction {
    /// Tool name in title case (`Websearch`, `Wikipedia`, `Arxiv`)
    pub action: Option<String>,
    pub input: Option<String>,
}

/// Scan `text` for `Action:` and `Action Input:` lines.
///
/// Marker matching ignores case and surrounding whitespace. When a marker
/// appears on several lines the last one wins. Missing or unrecognised lines
/// leave the field empty.
pub fn parse_agent_output(text: &str) -> ParsedAction {
    let mut parsed = ParsedAction::default();

    for line in text.lines() {
        let line = line.trim();
        let lower = line.to_lowercase();

        if lower.starts_with("action:") {
            if let Some(found) = TOOL_PATTERN.find(line) {
                parsed.action = Some(title_case(found.as_str()));
            }
        }

        if lower.starts_with("action input:") {
            if let Some((_, rest)) = line.split_once(':') {
                parsed.input = Some(strip_quotes(rest.trim()).to_string());
            }
        }
    }

    parsed
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Remove one pair of matching surrounding quotes
fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed_step() {
        let text = "Thought: I should look this up\nAction: Wikipedia\nAction Input: Alan Turing";
        let parsed = parse_agent_output(text);
        assert_eq!(parsed.action.as_deref(), Some("Wikipedia"));
        assert_eq!(parsed.input.as_deref(), Some("Alan Turing"));
    }

    #[test]
    fn test_tool_names_are_title_cased() {
        let cases = [
            ("Action: WebSearch", "Websearch"),
            ("action: websearch", "Websearch"),
            ("ACTION: ARXIV", "Arxiv"),
            ("  Action:   wikiPEDIA  ", "Wikipedia"),
            ("Action: <WebSearch|Wikipedia|Arxiv>", "Websearch"),
        ];
        for (line, expected) in cases {
            let parsed = parse_agent_output(line);
            assert_eq!(parsed.action.as_deref(), Some(expected), "line: {line}");
        }
    }

    #[test]
    fn test_unrecognised_tool_is_absent() {
        let parsed = parse_agent_output("Action: Calculator\nAction Input: 2+2");
        assert_eq!(parsed.action, None);
        assert_eq!(parsed.input.as_deref(), Some("2+2"));
    }

    #[test]
    fn test_marker_must_start_the_line() {
        let parsed = parse_agent_output("I will take Action: Wikipedia next\nmy Action Input: x");
        assert_eq!(parsed, ParsedAction::default());
    }

    #[test]
    fn test_input_keeps_text_after_first_colon() {
        let parsed = parse_agent_output("Action: Arxiv\nAction Input: BERT: pre-training");
        assert_eq!(parsed.input.as_deref(), Some("BERT: pre-training"));
    }

    #[test]
    fn test_quote_stripping() {
        let input = |text: &str| parse_agent_output(text).input;
        assert_eq!(input("Action Input: \"quantum computing\""), Some("quantum computing".into()));
        assert_eq!(input("Action Input: 'quantum computing'"), Some("quantum computing".into()));
        // Only one layer comes off
        assert_eq!(input("Action Input: \"\"nested\"\""), Some("\"nested\"".into()));
        // Unbalanced quotes stay
        assert_eq!(input("Action Input: \"dangling"), Some("\"dangling".into()));
        assert_eq!(input("Action Input: \"mixed'"), Some("\"mixed'".into()));
        assert_eq!(input("Action Input: \""), Some("\"".into()));
    }

    #[test]
    fn test_empty_input_is_present_but_empty() {
        let parsed = parse_agent_output("Action: WebSearch\nAction Input:   ");
        assert_eq!(parsed.input.as_deref(), Some(""));
    }

    #[test]
    fn test_last_marker_wins() {
        let text = "Action: Wikipedia\nAction Input: first\nAction: Arxiv\nAction Input: second";
        let parsed = parse_agent_output(text);
        assert_eq!(parsed.action.as_deref(), Some("Arxiv"));
        assert_eq!(parsed.input.as_deref(), Some("second"));
    }

    #[test]
    fn test_only_known_names_are_returned() {
        let samples = [
            "",
            "Final Answer: 42",
            "Action:",
            "Action: Wikipedia\nAction Input: x",
            "action: ARXIV papers\naction input: \"llm agents\"",
            "Action: Bing",
        ];
        for sample in samples {
            if let Some(action) = parse_agent_output(sample).action {
                assert!(["Websearch", "Wikipedia", "Arxiv"].contains(&action.as_str()));
            }
        }
    }
}
