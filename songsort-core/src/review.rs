//! Song list review
//!
//! A review shows a song list as a table and stages the listener's edits until
//! they are accepted. The same review serves three purposes, selected by
//! [`ListMode`]: confirming freshly imported songs, editing the main list
//! before sorting, and showing the results of a finished session. Edits are
//! only written to the list on [`ListReview::accept`], so rejecting a review
//! leaves the list exactly as it was.

use crate::error::{Error, Result};
use crate::song::{Rank, SongId};
use crate::song_list::SongList;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// What a review is being used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListMode {
    /// Confirming songs imported from a folder
    ConfirmImport,
    /// Editing the main list before sorting
    EditList,
    /// Showing the results of a sort
    ShowResults,
}

impl ListMode {
    /// Header of the first table column
    pub fn first_column_header(&self) -> &'static str {
        match self {
            ListMode::ConfirmImport | ListMode::EditList => "Keep?",
            ListMode::ShowResults => "Rank",
        }
    }

    /// Text preceding the song count, if the mode shows one
    pub fn count_label(&self) -> Option<&'static str> {
        match self {
            ListMode::ConfirmImport => Some("Number of songs to import from folder: "),
            ListMode::EditList => Some("Number of songs that will be sorted: "),
            ListMode::ShowResults => None,
        }
    }

    pub fn allows_edits(&self) -> bool {
        match self {
            ListMode::ConfirmImport | ListMode::EditList => true,
            ListMode::ShowResults => false,
        }
    }

    fn accepted_outcome(&self) -> ReviewOutcome {
        match self {
            ListMode::ConfirmImport => ReviewOutcome::ImportedSongsConfirmed,
            ListMode::EditList => ReviewOutcome::SongListEdited,
            ListMode::ShowResults => ReviewOutcome::ResultsClosed,
        }
    }
}

/// How a review ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewOutcome {
    /// Imported songs accepted into the staging list
    ImportedSongsConfirmed,
    /// Main list edited (or closed without changes)
    SongListEdited,
    /// Results view closed
    ResultsClosed,
    /// Closed with unsaved changes, which were discarded
    ImportCancelled,
}

/// Staged changes to one song
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongEdit {
    pub remove: bool,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub track_number: Option<u32>,
    pub title: Option<String>,
}

/// First table column: keep checkbox or rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadColumn {
    Keep(bool),
    Rank(Rank),
}

/// One table row, with staged edits applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewRow {
    pub id: SongId,
    pub lead: LeadColumn,
    pub artist: String,
    pub album: String,
    pub track_number: u32,
    pub title: String,
}

/// Staged review of a song list
#[derive(Debug, Clone)]
pub struct ListReview {
    mode: ListMode,
    edits: BTreeMap<SongId, SongEdit>,
    unsaved_changes: bool,
}

impl ListReview {
    /// Open a review of `list`
    ///
    /// Imported songs count as unsaved until confirmed.
    pub fn new(mode: ListMode, list: &SongList) -> Self {
        Self {
            mode,
            edits: BTreeMap::new(),
            unsaved_changes: mode == ListMode::ConfirmImport,
        }
    }

    pub fn mode(&self) -> ListMode {
        self.mode
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved_changes
    }

    /// Number of songs `list` will hold if the review is accepted
    ///
    /// Staged removals of songs no longer in the list are not counted.
    pub fn songs_after_save(&self, list: &SongList) -> usize {
        let removed = self
            .edits
            .iter()
            .filter(|(id, edit)| edit.remove && list.contains(**id))
            .count();
        list.len().saturating_sub(removed)
    }

    /// Count label for the current mode, e.g. "Number of songs that will be sorted: 12"
    pub fn count_text(&self, list: &SongList) -> Option<String> {
        self.mode
            .count_label()
            .map(|label| format!("{}{}", label, self.songs_after_save(list)))
    }

    pub fn edit(&self, id: SongId) -> Option<&SongEdit> {
        self.edits.get(&id)
    }

    /// Mark a song to be kept or dropped
    pub fn set_keep(&mut self, list: &SongList, id: SongId, keep: bool) -> Result<()> {
        self.stage(list, id)?.remove = !keep;
        Ok(())
    }

    pub fn set_artist(&mut self, list: &SongList, id: SongId, artist: impl Into<String>) -> Result<()> {
        self.stage(list, id)?.artist = Some(artist.into());
        Ok(())
    }

    pub fn set_album(&mut self, list: &SongList, id: SongId, album: impl Into<String>) -> Result<()> {
        self.stage(list, id)?.album = Some(album.into());
        Ok(())
    }

    pub fn set_track_number(&mut self, list: &SongList, id: SongId, track_number: u32) -> Result<()> {
        self.stage(list, id)?.track_number = Some(track_number);
        Ok(())
    }

    pub fn set_title(&mut self, list: &SongList, id: SongId, title: impl Into<String>) -> Result<()> {
        self.stage(list, id)?.title = Some(title.into());
        Ok(())
    }

    /// Table rows in list order, staged values shown in place of current ones
    pub fn rows(&self, list: &SongList) -> Vec<ReviewRow> {
        list.iter()
            .map(|(id, song)| {
                let edit = self.edits.get(&id);
                let lead = match self.mode {
                    ListMode::ShowResults => LeadColumn::Rank(song.rank()),
                    ListMode::ConfirmImport | ListMode::EditList => {
                        LeadColumn::Keep(!edit.map_or(false, |e| e.remove))
                    }
                };
                ReviewRow {
                    id,
                    lead,
                    artist: edit
                        .and_then(|e| e.artist.clone())
                        .unwrap_or_else(|| song.artist().to_string()),
                    album: edit
                        .and_then(|e| e.album.clone())
                        .unwrap_or_else(|| song.album().to_string()),
                    track_number: edit
                        .and_then(|e| e.track_number)
                        .unwrap_or_else(|| song.track_number()),
                    title: edit
                        .and_then(|e| e.title.clone())
                        .unwrap_or_else(|| song.title().to_string()),
                }
            })
            .collect()
    }

    /// Write staged edits to `list` and close the review
    ///
    /// Every edited song is checked before the first change is made, so a stale
    /// handle leaves the list untouched. Results reviews never modify the list.
    pub fn accept(self, list: &mut SongList) -> Result<ReviewOutcome> {
        if self.mode.allows_edits() {
            if let Some(missing) = self.edits.keys().find(|id| !list.contains(**id)) {
                return Err(Error::SongNotFound(*missing));
            }

            let mut removed = 0;
            for (id, edit) in self.edits {
                if edit.remove {
                    list.remove(id)?;
                    removed += 1;
                    continue;
                }

                let song = list.require_mut(id)?;
                if let Some(artist) = edit.artist {
                    song.set_artist(artist);
                }
                if let Some(album) = edit.album {
                    song.set_album(album);
                }
                if let Some(track_number) = edit.track_number {
                    song.set_track_number(track_number);
                }
                if let Some(title) = edit.title {
                    song.set_title(title);
                }
            }
            debug!(mode = ?self.mode, removed, remaining = list.len(), "Review accepted");
        }

        Ok(self.mode.accepted_outcome())
    }

    /// Close the review without writing anything
    ///
    /// With unsaved changes the outcome is [`ReviewOutcome::ImportCancelled`];
    /// the caller is expected to have confirmed discarding them.
    pub fn reject(self) -> ReviewOutcome {
        if self.unsaved_changes {
            return ReviewOutcome::ImportCancelled;
        }
        match self.mode {
            ListMode::EditList => ReviewOutcome::SongListEdited,
            ListMode::ShowResults => ReviewOutcome::ResultsClosed,
            ListMode::ConfirmImport => ReviewOutcome::ImportCancelled,
        }
    }

    fn stage(&mut self, list: &SongList, id: SongId) -> Result<&mut SongEdit> {
        if !self.mode.allows_edits() {
            return Err(Error::InvalidState(format!(
                "songs cannot be edited in {:?} mode",
                self.mode
            )));
        }
        if !list.contains(id) {
            return Err(Error::SongNotFound(id));
        }

        self.unsaved_changes = true;
        Ok(self.edits.entry(id).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::song::Song;

    fn sample() -> (SongList, Vec<SongId>) {
        let mut list = SongList::new();
        let ids = ["One", "Two", "Three"]
            .iter()
            .enumerate()
            .map(|(i, title)| {
                list.insert(Song::new(
                    format!("/music/Artist/Album/{}.mp3", title),
                    "Artist",
                    "Album",
                    i as u32 + 1,
                    *title,
                ))
                .unwrap()
            })
            .collect();
        (list, ids)
    }

    #[test]
    fn test_mode_labels() {
        assert_eq!(ListMode::ConfirmImport.first_column_header(), "Keep?");
        assert_eq!(ListMode::ShowResults.first_column_header(), "Rank");
        assert_eq!(
            ListMode::EditList.count_label(),
            Some("Number of songs that will be sorted: ")
        );
        assert_eq!(ListMode::ShowResults.count_label(), None);
    }

    #[test]
    fn test_confirm_import_starts_unsaved() {
        let (list, _) = sample();
        let review = ListReview::new(ListMode::ConfirmImport, &list);
        assert!(review.has_unsaved_changes());
        assert_eq!(
            review.count_text(&list).unwrap(),
            "Number of songs to import from folder: 3"
        );
        assert_eq!(review.reject(), ReviewOutcome::ImportCancelled);
    }

    #[test]
    fn test_keep_toggles_update_count() {
        let (list, ids) = sample();
        let mut review = ListReview::new(ListMode::EditList, &list);
        assert!(!review.has_unsaved_changes());

        review.set_keep(&list, ids[0], false).unwrap();
        review.set_keep(&list, ids[0], false).unwrap();
        assert_eq!(review.songs_after_save(&list), 2);
        review.set_keep(&list, ids[0], true).unwrap();
        assert_eq!(review.songs_after_save(&list), 3);
        assert!(review.has_unsaved_changes());
    }

    #[test]
    fn test_accept_applies_edits_and_removals() {
        let (mut list, ids) = sample();
        let mut review = ListReview::new(ListMode::ConfirmImport, &list);
        review.set_keep(&list, ids[1], false).unwrap();
        review.set_title(&list, ids[1], "ignored because removed").unwrap();
        review.set_artist(&list, ids[2], "Other Artist").unwrap();
        review.set_track_number(&list, ids[2], 9).unwrap();

        let rows = review.rows(&list);
        assert_eq!(rows[1].lead, LeadColumn::Keep(false));
        assert_eq!(rows[2].artist, "Other Artist");
        // Nothing written yet
        assert_eq!(list.get(ids[2]).unwrap().artist(), "Artist");

        let outcome = review.accept(&mut list).unwrap();
        assert_eq!(outcome, ReviewOutcome::ImportedSongsConfirmed);
        assert_eq!(list.len(), 2);
        assert!(!list.contains(ids[1]));
        let edited = list.get(ids[2]).unwrap();
        assert_eq!(edited.artist(), "Other Artist");
        assert_eq!(edited.track_number(), 9);
        assert_eq!(edited.album(), "Album");
    }

    #[test]
    fn test_accept_with_stale_handle_changes_nothing() {
        let (mut list, ids) = sample();
        let mut review = ListReview::new(ListMode::EditList, &list);
        review.set_album(&list, ids[0], "New Album").unwrap();
        review.set_keep(&list, ids[2], false).unwrap();
        list.remove(ids[2]).unwrap();

        let result = review.accept(&mut list);
        assert!(matches!(result, Err(Error::SongNotFound(id)) if id == ids[2]));
        assert_eq!(list.get(ids[0]).unwrap().album(), "Album");
    }

    #[test]
    fn test_results_mode_is_read_only() {
        let (mut list, ids) = sample();
        let mut review = ListReview::new(ListMode::ShowResults, &list);
        assert!(matches!(
            review.set_title(&list, ids[0], "x"),
            Err(Error::InvalidState(_))
        ));
        assert_eq!(review.rows(&list)[0].lead, LeadColumn::Rank(Rank::UNRANKED));
        assert_eq!(review.accept(&mut list).unwrap(), ReviewOutcome::ResultsClosed);
    }

    #[test]
    fn test_reject_edit_list_without_changes() {
        let (list, _) = sample();
        let review = ListReview::new(ListMode::EditList, &list);
        assert_eq!(review.reject(), ReviewOutcome::SongListEdited);
    }

    #[test]
    fn test_count_follows_list_changes_after_opening() {
        let mut list = SongList::new();
        let mut review = ListReview::new(ListMode::EditList, &list);
        assert_eq!(review.songs_after_save(&list), 0);

        let id = list
            .insert(Song::new("/music/A/B/late.mp3", "A", "B", 1, "late"))
            .unwrap();
        assert_eq!(review.songs_after_save(&list), 1);

        review.set_keep(&list, id, false).unwrap();
        assert_eq!(review.songs_after_save(&list), 0);
        assert_eq!(
            review.count_text(&list).unwrap(),
            "Number of songs that will be sorted: 0"
        );

        // A removal staged for a song that has since left the list is not counted
        list.remove(id).unwrap();
        assert_eq!(review.songs_after_save(&list), 0);
        let other = list
            .insert(Song::new("/music/A/B/other.mp3", "A", "B", 2, "other"))
            .unwrap();
        assert_eq!(review.songs_after_save(&list), 1);
        assert!(matches!(
            review.set_keep(&list, id, true),
            Err(Error::SongNotFound(_))
        ));
        review.set_keep(&list, other, true).unwrap();
        assert_eq!(review.songs_after_save(&list), 1);
    }
}
