//! Interactive chat
//!
//! A line-oriented loop over one [`ChatSession`]. Lines starting with `/` are
//! commands; anything else is a question for the agent.

use crate::agents::{AgentOutcome, ReactAgent};
use crate::llm::ModelChoice;
use crate::session::ChatSession;
use crate::utils::truncate_chars;
use anyhow::Result;
use colored::Colorize;
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};

const OBSERVATION_PREVIEW_CHARS: usize = 160;

#[derive(Debug, Clone, PartialEq, Eq)]
enum ReplCommand {
    Ask(String),
    Clear,
    History,
    Model(Option<String>),
    Steps(Option<String>),
    Help,
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> ReplCommand {
    let line = line.trim();
    let Some(command) = line.strip_prefix('/') else {
        return ReplCommand::Ask(line.to_string());
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, Some(arg.trim().to_string()).filter(|a| !a.is_empty())),
        None => (command, None),
    };

    match name.to_lowercase().as_str() {
        "clear" => ReplCommand::Clear,
        "history" => ReplCommand::History,
        "model" => ReplCommand::Model(arg),
        "steps" => ReplCommand::Steps(arg),
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" => ReplCommand::Quit,
        other => ReplCommand::Unknown(other.to_string()),
    }
}

enum ReplControl {
    Continue,
    Exit,
}

pub async fn run_repl(agent: &ReactAgent, session: &mut ChatSession) -> Result<()> {
    println!("{}", "ReAct research agent".green().bold());
    println!("Tools: WebSearch, Wikipedia, Arxiv. Type `/help` for commands, `/quit` to leave.\n");

    if !agent.is_configured() {
        println!("{}", "🔑 Please add your GROQ API Key.".yellow());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{}", "you> ".cyan().bold());
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        match dispatch(agent, session, parse_command(&line)).await {
            ReplControl::Continue => {}
            ReplControl::Exit => break,
        }
    }

    Ok(())
}

async fn dispatch(agent: &ReactAgent, session: &mut ChatSession, command: ReplCommand) -> ReplControl {
    match command {
        ReplCommand::Ask(question) => {
            println!("{}", "🤔 Thinking...".dimmed());
            match session.ask(agent, &question).await {
                Ok(outcome) => print_outcome(&outcome),
                Err(e) => eprintln!("{}", e.to_string().yellow()),
            }
        }
        ReplCommand::Clear => {
            session.clear_history();
            println!("History cleared.");
        }
        ReplCommand::History => print_history(session),
        ReplCommand::Model(None) => {
            let choices: Vec<&str> = ModelChoice::ALL.iter().map(|m| m.id()).collect();
            println!("Model: {} (available: {})", session.settings().model, choices.join(", "));
        }
        ReplCommand::Model(Some(name)) => match name.parse::<ModelChoice>() {
            Ok(model) => {
                session.set_model(model);
                println!("Model set to {}.", model);
            }
            Err(e) => eprintln!("{} {e}", "error:".red().bold()),
        },
        ReplCommand::Steps(None) => println!("Max steps: {}", session.settings().max_iters),
        ReplCommand::Steps(Some(raw)) => {
            let result = raw
                .parse::<usize>()
                .map_err(|e| e.to_string())
                .and_then(|n| session.set_max_steps(n).map(|_| n).map_err(|e| e.to_string()));
            match result {
                Ok(n) => println!("Max steps set to {}.", n),
                Err(e) => eprintln!("{} {e}", "error:".red().bold()),
            }
        }
        ReplCommand::Help => print_help(),
        ReplCommand::Quit => return ReplControl::Exit,
        ReplCommand::Unknown(name) => {
            eprintln!("{} unknown command /{name}; try /help", "error:".red().bold());
        }
    }
    ReplControl::Continue
}

fn print_outcome(outcome: &AgentOutcome) {
    for step in &outcome.steps {
        if let Some(tool) = &step.tool {
            println!(
                "{} {} {}",
                format!("🔧 Step {}:", step.step).blue().bold(),
                tool.tool,
                format!("({})", tool.input).dimmed()
            );
            println!("   {}", truncate_chars(&tool.observation, OBSERVATION_PREVIEW_CHARS).dimmed());
        }
    }

    let answer = if outcome.kind.is_error() {
        outcome.answer.red()
    } else {
        outcome.answer.normal()
    };
    println!("{} {}\n", "💡".bold(), answer);
}

fn print_history(session: &ChatSession) {
    if session.history().is_empty() {
        println!("No questions yet.");
        return;
    }
    for turn in session.history() {
        println!("{} {}", format!("[{}]", turn.timestamp.format("%H:%M:%S")).dimmed(), turn.user.bold());
        println!("  {}", turn.assistant);
    }
}

fn print_help() {
    println!("Commands:");
    println!("  /clear          forget previous questions");
    println!("  /history        show previous questions and answers");
    println!("  /model [name]   show or switch the model");
    println!("  /steps [n]      show or set max reasoning steps (1-6)");
    println!("  /help           this help");
    println!("  /quit           leave");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::react::testing::ScriptedLlm;
    use crate::agents::AgentSettings;
    use crate::middleware::RateLimiter;
    use crate::tools::testing::FakeTools;
    use std::sync::Arc;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("  what is rust? "), ReplCommand::Ask("what is rust?".to_string()));
        assert_eq!(parse_command("/clear"), ReplCommand::Clear);
        assert_eq!(parse_command("/QUIT"), ReplCommand::Quit);
        assert_eq!(parse_command("/model"), ReplCommand::Model(None));
        assert_eq!(
            parse_command("/model gemma2-9b-it"),
            ReplCommand::Model(Some("gemma2-9b-it".to_string()))
        );
        assert_eq!(parse_command("/steps   4 "), ReplCommand::Steps(Some("4".to_string())));
        assert_eq!(parse_command("/frobnicate"), ReplCommand::Unknown("frobnicate".to_string()));
    }

    #[tokio::test]
    async fn test_dispatch_updates_session() {
        let tools = FakeTools::new();
        let agent = ReactAgent::new(
            Arc::new(ScriptedLlm::replying(&["Final Answer: ok"])),
            Arc::new(tools.toolbox()),
        );
        let mut session = ChatSession::new(AgentSettings::default(), RateLimiter::default());

        dispatch(&agent, &mut session, parse_command("/model gemma2-9b-it")).await;
        dispatch(&agent, &mut session, parse_command("/steps 5")).await;
        dispatch(&agent, &mut session, parse_command("/steps 9")).await;
        assert_eq!(session.settings().model, ModelChoice::Gemma2_9bIt);
        assert_eq!(session.settings().max_iters, 5);

        dispatch(&agent, &mut session, parse_command("hello")).await;
        assert_eq!(session.history().len(), 1);

        dispatch(&agent, &mut session, parse_command("/clear")).await;
        assert!(session.history().is_empty());

        assert!(matches!(
            dispatch(&agent, &mut session, parse_command("/quit")).await,
            ReplControl::Exit
        ));
    }
}
