//! Interactive terminal dialogs
//!
//! Questions are written to stderr and answers read line by line from stdin.
//! One [`Console`] is shared by every dialog of a run so buffered input is
//! never lost between them.

use anyhow::{bail, Result};
use songsort_common::config::RankingConfig;
use songsort_core::review::{ListMode, ListReview, ReviewOutcome};
use songsort_core::{
    Matchup, SessionCommand, SessionController, SessionReply, Side, SongId, SongList,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stderr, Stdin};

use crate::output;

/// Line-based question and answer over stdin/stderr
pub struct Console {
    lines: Lines<BufReader<Stdin>>,
    err: Stderr,
}

impl Console {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            err: tokio::io::stderr(),
        }
    }

    pub async fn say(&mut self, text: &str) -> Result<()> {
        self.err.write_all(text.as_bytes()).await?;
        self.err.flush().await?;
        Ok(())
    }

    /// Print `question` and read one line; `None` at end of input
    pub async fn ask(&mut self, question: &str) -> Result<Option<String>> {
        self.say(question).await?;
        Ok(self.lines.next_line().await?)
    }
}

/// One line typed during the editing pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    Drop(usize),
    Keep(usize),
    Artist(usize, String),
    Album(usize, String),
    Track(usize, u32),
    Title(usize, String),
    Show,
    Save,
    Discard,
}

pub const EDIT_HELP: &str = "\
Commands: d N (drop row N), k N (keep row N), a N text (artist), b N text (album),
          n N number (track), t N text (title), l (list), s (save and continue),
          x (discard edits and continue)
";

/// Parse an editing command; rows are 1-based as shown in the table
pub fn parse_edit_command(line: &str) -> Option<EditCommand> {
    let line = line.trim();
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim_start();

    match verb {
        "l" => return Some(EditCommand::Show),
        "s" => return Some(EditCommand::Save),
        "x" => return Some(EditCommand::Discard),
        _ => {}
    }

    let (row, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    let row: usize = row.parse().ok().filter(|r| *r > 0)?;
    let text = text.trim();

    match (verb, text.is_empty()) {
        ("d", true) => Some(EditCommand::Drop(row)),
        ("k", true) => Some(EditCommand::Keep(row)),
        ("a", false) => Some(EditCommand::Artist(row, text.to_string())),
        ("b", false) => Some(EditCommand::Album(row, text.to_string())),
        ("t", false) => Some(EditCommand::Title(row, text.to_string())),
        ("n", false) => text.parse().ok().map(|n| EditCommand::Track(row, n)),
        _ => None,
    }
}

/// Let the listener drop songs and fix metadata before sorting
///
/// Edits are staged in a [`ListReview`] and written only on save. End of
/// input discards them.
pub async fn edit_list(console: &mut Console, songs: &mut SongList) -> Result<ReviewOutcome> {
    let mut review = ListReview::new(ListMode::EditList, songs);
    let ids: Vec<SongId> = songs.ids();
    console
        .say(&format!("{}{}", output::render_table(&review, songs, true), EDIT_HELP))
        .await?;

    loop {
        let Some(line) = console.ask("edit> ").await? else {
            return Ok(review.reject());
        };
        let Some(command) = parse_edit_command(&line) else {
            console.say(&format!("'{}' is not a command.\n{}", line.trim(), EDIT_HELP)).await?;
            continue;
        };

        let row_id = |row: usize| ids.get(row - 1).copied();
        let staged = match command {
            EditCommand::Show => {
                console.say(&output::render_table(&review, songs, true)).await?;
                continue;
            }
            EditCommand::Save => return Ok(review.accept(songs)?),
            EditCommand::Discard => return Ok(review.reject()),
            EditCommand::Drop(row) => row_id(row).map(|id| review.set_keep(songs, id, false)),
            EditCommand::Keep(row) => row_id(row).map(|id| review.set_keep(songs, id, true)),
            EditCommand::Artist(row, text) => row_id(row).map(|id| review.set_artist(songs, id, text)),
            EditCommand::Album(row, text) => row_id(row).map(|id| review.set_album(songs, id, text)),
            EditCommand::Track(row, n) => row_id(row).map(|id| review.set_track_number(songs, id, n)),
            EditCommand::Title(row, text) => row_id(row).map(|id| review.set_title(songs, id, text)),
        };

        match staged {
            Some(result) => result?,
            None => {
                console
                    .say(&format!("No such row, the list has {} songs.\n", ids.len()))
                    .await?
            }
        }
    }
}

/// Run a session over `songs`, reading choices from the console
///
/// Returns `false` when the listener cancelled (`q` or end of input); ranks
/// are only written when the session completes.
pub async fn run_session(
    console: &mut Console,
    songs: &mut SongList,
    config: &RankingConfig,
) -> Result<bool> {
    let mut controller = SessionController::start(songs, config)?;

    loop {
        let question = match controller.handle(SessionCommand::NextPairRequested)? {
            SessionReply::Pair(matchup) => render(&matchup),
            SessionReply::Complete { comparisons } => {
                console
                    .say(&format!("Done after {} comparisons.\n", comparisons))
                    .await?;
                return Ok(true);
            }
            other => bail!("Unexpected reply to a pair request: {:?}", other),
        };

        let side = loop {
            let Some(line) = console.ask(&question).await? else {
                break None;
            };
            match line.trim() {
                "1" => break Some(Side::Left),
                "2" => break Some(Side::Right),
                "q" | "Q" => break None,
                other => console.say(&format!("'{}' is not a choice.\n", other)).await?,
            }
        };

        match side {
            Some(side) => {
                controller.choose(side)?;
            }
            None => {
                controller.handle(SessionCommand::CancelRequested)?;
                return Ok(false);
            }
        }
    }
}

fn render(matchup: &Matchup<'_>) -> String {
    format!(
        "\nComparison {} (at most {})\n  1) {}\n  2) {}\nWhich do you prefer? [1/2, q to cancel] ",
        matchup.comparison,
        matchup.max_comparisons,
        matchup.left.display_name(),
        matchup.right.display_name(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_row_commands() {
        assert_eq!(parse_edit_command("d 3"), Some(EditCommand::Drop(3)));
        assert_eq!(parse_edit_command("  k 1 "), Some(EditCommand::Keep(1)));
        assert_eq!(
            parse_edit_command("t 2 Live at Home"),
            Some(EditCommand::Title(2, "Live at Home".to_string()))
        );
        assert_eq!(parse_edit_command("n 4 12"), Some(EditCommand::Track(4, 12)));
        assert_eq!(
            parse_edit_command("a 1 The Band"),
            Some(EditCommand::Artist(1, "The Band".to_string()))
        );
    }

    #[test]
    fn test_parse_plain_commands() {
        assert_eq!(parse_edit_command("s"), Some(EditCommand::Save));
        assert_eq!(parse_edit_command("x"), Some(EditCommand::Discard));
        assert_eq!(parse_edit_command("l"), Some(EditCommand::Show));
    }

    #[test]
    fn test_parse_rejects_malformed_lines() {
        assert_eq!(parse_edit_command(""), None);
        assert_eq!(parse_edit_command("d"), None);
        assert_eq!(parse_edit_command("d 0"), None);
        assert_eq!(parse_edit_command("d two"), None);
        assert_eq!(parse_edit_command("d 2 extra"), None);
        assert_eq!(parse_edit_command("t 2"), None);
        assert_eq!(parse_edit_command("n 2 twelve"), None);
        assert_eq!(parse_edit_command("z 1"), None);
    }
}
