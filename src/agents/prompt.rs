//! Prompts for the ReAct loop

use crate::agents::history::HistoryWindow;

/// System instruction for every reasoning step
pub const SYSTEM_PROMPT: &str = "You are a research assistant with 3 tools:
1) WebSearch - for current events, news, recent info
2) Wikipedia - for general knowledge, definitions, people, places
3) Arxiv - for academic papers and research

Choose the best tool. Format exactly:
Thought: <your reasoning>
Action: <WebSearch|Wikipedia|Arxiv>
Action Input: <search phrase>

Stop when you have enough info for a clear answer, then write:
Final Answer: <concise answer>
";

/// System instruction for the summary call once the step budget is spent
pub const SUMMARY_PROMPT: &str = "Provide a brief, clear answer in 1-2 sentences.";

/// Lines of history handed to the summary call
pub const SUMMARY_CONTEXT_LINES: usize = 6;

/// User turn for one reasoning step
pub fn build_conversation(question: &str, history: &HistoryWindow, observation: Option<&str>) -> String {
    let mut lines = vec![format!("Question: {}", question)];
    lines.extend(history.iter().map(String::from));
    if let Some(observation) = observation.filter(|o| !o.is_empty()) {
        lines.push(format!("Observation: {}", observation));
    }
    lines.join("\n")
}

/// User turn for the summary call
pub fn build_summary_context(history: &HistoryWindow) -> String {
    history.last(SUMMARY_CONTEXT_LINES).collect::<Vec<_>>().join("\n")
}
