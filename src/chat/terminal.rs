//! Interactive terminal chat.

use crate::chat::Conversation;
use anyhow::Result;
use colored::Colorize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Typed on its own (any case) to leave the chat.
pub const EXIT_KEYWORD: &str = "exit";

pub fn is_exit(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case(EXIT_KEYWORD)
}

/// Chat over stdin/stdout until `exit`, end of input or cancellation.
pub async fn run(conversation: Conversation, cancel: CancellationToken) -> Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    run_with_input(conversation, stdin, cancel).await?;
    Ok(())
}

/// Returns the number of turns sent.
pub async fn run_with_input<R>(
    mut conversation: Conversation,
    input: R,
    cancel: CancellationToken,
) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    println!(
        "{} Chat started on thread {}. Type '{}' to quit.",
        ">>>".green().bold(),
        conversation.thread_id(),
        EXIT_KEYWORD
    );

    let mut lines = input.lines();
    let mut turns = 0;
    loop {
        print_prompt();
        let line = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            break;
        };

        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if is_exit(text) {
            break;
        }

        turns += 1;
        match conversation.send(text).await {
            Ok(reply) => println!("{} {}", "Agent:".cyan().bold(), reply),
            Err(e) => println!("{} {}", "Error:".red().bold(), e),
        }
    }

    info!("Chat ended after {} turns", turns);
    println!("{}", "Goodbye!".dimmed());
    Ok(turns)
}

fn print_prompt() {
    use std::io::Write;
    print!("{} ", "You:".green().bold());
    let _ = std::io::stdout().flush();
}
