//! Table and JSON rendering
//!
//! Results go to stdout; everything addressed to the listener (import
//! summaries, prompts, the editing table) goes to stderr so `--json` output
//! stays machine readable.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use songsort_core::review::{LeadColumn, ListReview, ReviewRow};
use songsort_core::SongList;
use songsort_import::ImportReport;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

pub fn print_import_summary(folder: &Path, report: &ImportReport) {
    eprintln!(
        "Imported {} songs from {} ({} with tags)",
        report.songs.len(),
        folder.display(),
        report.tagged
    );
    if report.duplicates > 0 {
        eprintln!("  {} duplicate paths skipped", report.duplicates);
    }
    for issue in &report.failures {
        match &issue.path {
            Some(path) => eprintln!("  skipped {}: {}", path.display(), issue.message),
            None => eprintln!("  skipped entry: {}", issue.message),
        }
    }
    for issue in &report.warnings {
        if let Some(path) = &issue.path {
            eprintln!("  tags unreadable, used file name: {}", path.display());
        }
    }
}

/// Review table in list order, rows numbered from 1 when `numbered`
pub fn render_table(review: &ListReview, songs: &SongList, numbered: bool) -> String {
    let mut out = String::new();
    if let Some(label) = review.count_text(songs) {
        let _ = writeln!(out, "{}", label);
    }
    render_rows(&mut out, review, &review.rows(songs), numbered);
    out
}

/// Review table sorted by rank, unranked songs last
pub fn render_results(review: &ListReview, songs: &SongList) -> String {
    let mut rows = review.rows(songs);
    rows.sort_by_key(|row| match row.lead {
        LeadColumn::Rank(rank) if rank.is_ranked() => (0, rank.value()),
        _ => (1, 0),
    });
    let mut out = String::new();
    render_rows(&mut out, review, &rows, false);
    out
}

fn render_rows(out: &mut String, review: &ListReview, rows: &[ReviewRow], numbered: bool) {
    let number_width = if numbered { 5 } else { 0 };
    let _ = writeln!(
        out,
        "{:<number_width$}{:<6} {:<24} {:<24} {:>5}  {}",
        if numbered { "#" } else { "" },
        review.mode().first_column_header(),
        "Artist",
        "Album",
        "Track",
        "Title"
    );
    for (index, row) in rows.iter().enumerate() {
        let number = if numbered {
            (index + 1).to_string()
        } else {
            String::new()
        };
        let lead = match row.lead {
            LeadColumn::Keep(true) => "[x]".to_string(),
            LeadColumn::Keep(false) => "[ ]".to_string(),
            LeadColumn::Rank(rank) => rank.to_string(),
        };
        let _ = writeln!(
            out,
            "{:<number_width$}{:<6} {:<24} {:<24} {:>5}  {}",
            number,
            lead,
            truncate(&row.artist, 24),
            truncate(&row.album, 24),
            row.track_number,
            row.title
        );
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut short: String = text.chars().take(width.saturating_sub(1)).collect();
    short.push('…');
    short
}

#[cfg(test)]
mod tests {
    use super::*;
    use songsort_core::review::ListMode;
    use songsort_core::Song;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 24), "short");
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("äöüäöü", 6), "äöüäöü");
    }

    #[test]
    fn test_numbered_table_shows_staged_removal() {
        let mut songs = SongList::new();
        let first = songs
            .insert(Song::new("/m/A/B/01 - One.mp3", "A", "B", 1, "One"))
            .unwrap();
        songs
            .insert(Song::new("/m/A/B/02 - Two.mp3", "A", "B", 2, "Two"))
            .unwrap();
        let mut review = ListReview::new(ListMode::EditList, &songs);
        review.set_keep(&songs, first, false).unwrap();

        let table = render_table(&review, &songs, true);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Number of songs that will be sorted: 1");
        assert!(lines[1].starts_with("#    Keep?"));
        assert!(lines[2].starts_with("1    [ ]"));
        assert!(lines[3].starts_with("2    [x]"));
    }
}
