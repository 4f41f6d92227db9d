//! The interactive read-eval-print loop.
//!
//! Reads one line at a time, hands it to the [`Executor`], and prints command
//! output and errors. Conversation replies are written by the handler
//! itself, so this loop never prints them.

use std::io::{self, Write};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::commands::CommandResult;
use crate::core::constants::PROMPT;
use crate::core::executor::{ExecuteError, Executor};

/// Run until end of input or `:quit`.
pub async fn run_session<R, W>(executor: &mut Executor, input: R, out: &mut W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            debug!("input closed");
            return Ok(());
        };

        match executor.execute(&line).await {
            Ok(CommandResult::Continue) => {}
            Ok(CommandResult::Message(text)) => writeln!(out, "{text}")?,
            Ok(CommandResult::Quit) => return Ok(()),
            Err(err) => {
                writeln!(out, "Error: {err}")?;
                if let ExecuteError::CommandNotFound(name) = &err {
                    print_suggestions(executor, name, out)?;
                }
            }
        }
    }
}

fn print_suggestions<W: Write>(executor: &Executor, word: &str, out: &mut W) -> io::Result<()> {
    // Shorten the mistyped word until something matches, keeping the colon.
    let mut prefix = word;
    while prefix.len() > 1 {
        let suggestions = executor.suggestions(prefix);
        if !suggestions.is_empty() {
            writeln!(out, "Did you mean:")?;
            for (name, description) in suggestions {
                writeln!(out, "  {name:<10} {description}")?;
            }
            return Ok(());
        }
        let cut = prefix
            .char_indices()
            .last()
            .map_or(0, |(index, _)| index);
        prefix = &prefix[..cut];
    }
    Ok(())
}

/// Run the session on the process's stdin and stdout. Ctrl+C ends it; an
/// in-flight request is cancelled on the way out.
pub async fn run_chat(mut executor: Executor) -> io::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = io::stdout();
    let session = run_session(&mut executor, stdin, &mut stdout);

    tokio::select! {
        result = session => result,
        signal = tokio::signal::ctrl_c() => {
            signal?;
            println!();
            debug!("interrupted");
            Ok(())
        }
    }
}
