use crate::config::Config;
use crate::error::Result;
use crate::providers::{Message, Speaker};
use colored::Colorize;
use prettytable::{format, Table};

const PREVIEW_CHARS: usize = 60;

/// Print the stored transcript
///
/// With `json` the raw message list is printed (an empty list when nothing
/// is stored), otherwise a table with one row per message.
pub fn run_transcript(config: &Config, json: bool) -> Result<()> {
    let store = super::open_store(config)?;
    let messages = store.load()?.unwrap_or_default();

    if json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
        return Ok(());
    }

    if messages.is_empty() {
        println!("{}", "No saved transcript found.".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
    table.add_row(prettytable::row!["#".bold(), "Speaker".bold(), "Message".bold()]);

    for (index, message) in messages.iter().enumerate() {
        let speaker = match message.speaker {
            Speaker::User => message.speaker.to_string().cyan(),
            Speaker::Assistant => message.speaker.to_string().green(),
        };
        table.add_row(prettytable::row![index + 1, speaker, preview(message)]);
    }

    println!("\nSaved transcript ({} messages):", messages.len());
    table.printstd();
    if let Some(saved) = store.last_saved()? {
        println!("Last saved: {}", saved.format("%Y-%m-%d %H:%M"));
    }
    println!();

    Ok(())
}

/// First line of a message, shortened for the table
fn preview(message: &Message) -> String {
    let first_line = message.content.lines().next().unwrap_or("");
    let more_lines = message.content.lines().nth(1).is_some();

    if first_line.chars().count() > PREVIEW_CHARS {
        let cut: String = first_line.chars().take(PREVIEW_CHARS - 3).collect();
        format!("{}...", cut)
    } else if more_lines {
        format!("{} ...", first_line)
    } else {
        first_line.to_string()
    }
}
