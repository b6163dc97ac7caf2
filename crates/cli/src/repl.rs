use anyhow::Result;
use std::io::{BufRead, Write};
use tally_assistant::{IntentEngine, UserId};

const QUIT_COMMANDS: &[&str] = &["/quit", "/exit"];

/// Line-oriented chat: each input line is one turn for `user`. Stops at EOF or `/quit`.
///
/// Returns the number of turns resolved.
pub(crate) fn run<R: BufRead, W: Write>(
    engine: &IntentEngine,
    user: &UserId,
    input: R,
    mut output: W,
) -> Result<usize> {
    let mut turns = 0usize;
    for line in input.lines() {
        let line = line?;
        if QUIT_COMMANDS.contains(&line.trim()) {
            break;
        }
        let resolution = engine.resolve(&line, user);
        writeln!(output, "{}", resolution.text)?;
        output.flush()?;
        turns += 1;
    }
    log::debug!("chat session for user={user} ended after {turns} turns");
    Ok(turns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_assistant::DEFAULT_RESPONSE;

    #[test]
    fn each_line_is_one_turn() {
        let engine = IntentEngine::with_defaults();
        let user = UserId::from("repl");
        let mut out = Vec::new();
        let turns = run(&engine, &user, "hello\nwhat is the weather\n".as_bytes(), &mut out).unwrap();

        assert_eq!(turns, 2);
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("👋 Hello there!"));
        assert_eq!(lines[1], DEFAULT_RESPONSE);
        assert_eq!(
            engine.last_message(&user).as_deref(),
            Some("what is the weather")
        );
    }

    #[test]
    fn quit_stops_without_resolving() {
        let engine = IntentEngine::with_defaults();
        let user = UserId::from("repl");
        let mut out = Vec::new();
        let turns = run(&engine, &user, "bye\n /quit \nhello\n".as_bytes(), &mut out).unwrap();

        assert_eq!(turns, 1);
        assert_eq!(engine.last_message(&user).as_deref(), Some("bye"));
    }
}
