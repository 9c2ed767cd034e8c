//! Song list arena
//!
//! A [`SongList`] is the single owner of its songs. Other components refer to
//! entries through [`SongId`] handles and borrow the songs only for the
//! duration of a call.

use crate::error::{Error, Result};
use crate::song::{Rank, Song, SongId};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone)]
struct Entry {
    id: SongId,
    song: Song,
}

/// Ordered collection of songs with unique paths
#[derive(Debug, Clone, Default)]
pub struct SongList {
    entries: Vec<Entry>,
    next_id: u64,
}

impl SongList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a song, rejecting a path that is already present
    pub fn insert(&mut self, song: Song) -> Result<SongId> {
        if self.find_by_path(song.path()).is_some() {
            return Err(Error::DuplicateSong(song.path().to_path_buf()));
        }

        let id = SongId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { id, song });
        Ok(id)
    }

    /// Remove a song and hand ownership back to the caller
    pub fn remove(&mut self, id: SongId) -> Result<Song> {
        let index = self.position(id).ok_or(Error::SongNotFound(id))?;
        Ok(self.entries.remove(index).song)
    }

    pub fn get(&self, id: SongId) -> Option<&Song> {
        self.entries.iter().find(|e| e.id == id).map(|e| &e.song)
    }

    pub fn get_mut(&mut self, id: SongId) -> Option<&mut Song> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .map(|e| &mut e.song)
    }

    /// Like [`get`](Self::get), but an absent handle is an error
    pub fn require(&self, id: SongId) -> Result<&Song> {
        self.get(id).ok_or(Error::SongNotFound(id))
    }

    pub(crate) fn require_mut(&mut self, id: SongId) -> Result<&mut Song> {
        self.get_mut(id).ok_or(Error::SongNotFound(id))
    }

    pub fn contains(&self, id: SongId) -> bool {
        self.position(id).is_some()
    }

    /// Current index of a song in list order
    pub fn position(&self, id: SongId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    pub fn find_by_path(&self, path: &Path) -> Option<SongId> {
        self.entries
            .iter()
            .find(|e| e.song.path() == path)
            .map(|e| e.id)
    }

    /// Handles in list order
    pub fn ids(&self) -> Vec<SongId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SongId, &Song)> + '_ {
        self.entries.iter().map(|e| (e.id, &e.song))
    }

    /// Move every song of `other` into this list
    ///
    /// Songs whose path is already present are dropped. Moved songs receive new
    /// handles from this list. Returns the number of songs skipped.
    pub fn append(&mut self, other: SongList) -> usize {
        let mut skipped = 0;
        for entry in other.entries {
            if let Err(e) = self.insert(entry.song) {
                debug!("Skipping song on append: {}", e);
                skipped += 1;
            }
        }
        skipped
    }

    /// Reset every song to unranked
    pub fn clear_ranks(&mut self) {
        for entry in &mut self.entries {
            entry.song.set_rank(Rank::UNRANKED);
        }
    }

    /// Songs ordered for a results view: by rank, unranked last, ties in list order
    pub fn ranked(&self) -> Vec<(SongId, &Song)> {
        let mut songs: Vec<(SongId, &Song)> = self.iter().collect();
        songs.sort_by(|a, b| a.1.cmp_by_rank(b.1));
        songs
    }

    /// True when the ranks form exactly 1..=len with no gaps or repeats
    pub fn has_dense_ranks(&self) -> bool {
        let ranks: HashSet<i32> = self.entries.iter().map(|e| e.song.rank().value()).collect();
        ranks.len() == self.entries.len()
            && (1..=self.entries.len()).all(|r| {
                i32::try_from(r).map_or(false, |r| ranks.contains(&r))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(path: &str) -> Song {
        Song::new(path, "Artist", "Album", 1, path)
    }

    #[test]
    fn test_insert_assigns_distinct_ids() {
        let mut list = SongList::new();
        let a = list.insert(song("/a.mp3")).unwrap();
        let b = list.insert(song("/b.mp3")).unwrap();
        assert_ne!(a, b);
        assert_eq!(list.len(), 2);
        assert_eq!(list.ids(), vec![a, b]);
    }

    #[test]
    fn test_duplicate_path_rejected() {
        let mut list = SongList::new();
        list.insert(song("/a.mp3")).unwrap();
        match list.insert(song("/a.mp3")) {
            Err(Error::DuplicateSong(path)) => assert_eq!(path, Path::new("/a.mp3")),
            other => panic!("Expected DuplicateSong, got {:?}", other),
        }
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_remove_absent_song_is_recoverable() {
        let mut list = SongList::new();
        let a = list.insert(song("/a.mp3")).unwrap();
        let removed = list.remove(a).unwrap();
        assert_eq!(removed.path(), Path::new("/a.mp3"));
        assert!(matches!(list.remove(a), Err(Error::SongNotFound(id)) if id == a));
    }

    #[test]
    fn test_ids_not_reused_after_remove() {
        let mut list = SongList::new();
        let a = list.insert(song("/a.mp3")).unwrap();
        list.remove(a).unwrap();
        let b = list.insert(song("/a.mp3")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_append_skips_duplicates() {
        let mut main = SongList::new();
        main.insert(song("/a.mp3")).unwrap();

        let mut staged = SongList::new();
        staged.insert(song("/a.mp3")).unwrap();
        staged.insert(song("/b.mp3")).unwrap();

        let skipped = main.append(staged);
        assert_eq!(skipped, 1);
        assert_eq!(main.len(), 2);
        assert!(main.find_by_path(Path::new("/b.mp3")).is_some());
    }

    #[test]
    fn test_ranked_orders_by_rank() {
        let mut list = SongList::new();
        let a = list.insert(song("/a.mp3")).unwrap();
        let b = list.insert(song("/b.mp3")).unwrap();
        let c = list.insert(song("/c.mp3")).unwrap();
        list.require_mut(a).unwrap().set_rank(Rank::from_position(1));
        list.require_mut(c).unwrap().set_rank(Rank::from_position(0));

        let order: Vec<SongId> = list.ranked().into_iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec![c, a, b]);
        assert!(!list.has_dense_ranks());

        list.require_mut(b).unwrap().set_rank(Rank::from_position(2));
        assert!(list.has_dense_ranks());

        list.clear_ranks();
        assert!(list.iter().all(|(_, s)| !s.rank().is_ranked()));
    }
}
