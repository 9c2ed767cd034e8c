//! Session controller
//!
//! Front ends drive a ranking session by posting [`SessionCommand`]s and
//! receive a [`SessionReply`] for each. The controller holds the only mutable
//! borrow of the song list while the session runs, so the list cannot be edited
//! until the controller is dropped. Ranks are written once, when the session
//! completes; a cancelled or abandoned session writes nothing.

use crate::error::{Error, Result};
use crate::materializer::materialize;
use crate::session::{ComparisonSession, NextStep, SessionState};
use crate::song::{Song, SongId};
use crate::song_list::SongList;
use serde::{Deserialize, Serialize};
use songsort_common::config::RankingConfig;
use tracing::info;

/// Event posted by a front end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "winner")]
pub enum SessionCommand {
    /// Show me the next pair
    NextPairRequested,
    /// The listener preferred this song of the presented pair
    DecisionMade(SongId),
    /// Abandon the session
    CancelRequested,
}

/// Which song of a presented pair the listener picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// Two songs to compare, borrowed from the list for display
#[derive(Debug, Clone, Copy)]
pub struct Matchup<'a> {
    pub left_id: SongId,
    pub left: &'a Song,
    pub right_id: SongId,
    pub right: &'a Song,
    /// 1-based number of this comparison within the session
    pub comparison: usize,
    /// Upper bound on comparisons for the whole session
    pub max_comparisons: usize,
}

impl Matchup<'_> {
    /// Handle of the song on the given side
    pub fn id(&self, side: Side) -> SongId {
        match side {
            Side::Left => self.left_id,
            Side::Right => self.right_id,
        }
    }
}

/// Reply to a [`SessionCommand`]
#[derive(Debug, Clone)]
pub enum SessionReply<'a> {
    /// Present this pair
    Pair(Matchup<'a>),
    /// Decision stored, more comparisons follow
    Recorded { comparisons: usize },
    /// Session finished and ranks were written
    Complete { comparisons: usize },
    /// Session cancelled, ranks untouched
    Cancelled,
}

/// Drives a [`ComparisonSession`] over an exclusively borrowed song list
#[derive(Debug)]
pub struct SessionController<'a> {
    list: &'a mut SongList,
    session: ComparisonSession,
    materialized: bool,
}

impl<'a> SessionController<'a> {
    /// Start a session over every song of `list`, in list order
    ///
    /// A list of fewer than two songs completes at once (the single song, if
    /// any, gets rank 1) unless trivial sessions are disabled in `config`.
    pub fn start(list: &'a mut SongList, config: &RankingConfig) -> Result<Self> {
        let session = ComparisonSession::with_config(list.ids(), config)?;
        let mut controller = Self {
            list,
            session,
            materialized: false,
        };
        controller.finish_if_complete()?;
        Ok(controller)
    }

    pub fn session(&self) -> &ComparisonSession {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Read access to the list while the session holds it
    pub fn list(&self) -> &SongList {
        &*self.list
    }

    /// Release the list, keeping the session record
    pub fn into_session(self) -> ComparisonSession {
        self.session
    }

    /// Dispatch a command
    pub fn handle(&mut self, command: SessionCommand) -> Result<SessionReply<'_>> {
        match command {
            SessionCommand::NextPairRequested => {
                let comparisons = self.session.comparisons_made();
                Ok(match self.next_pair()? {
                    Some(matchup) => SessionReply::Pair(matchup),
                    None => SessionReply::Complete { comparisons },
                })
            }
            SessionCommand::DecisionMade(winner) => self.record_decision(winner),
            SessionCommand::CancelRequested => {
                self.cancel()?;
                Ok(SessionReply::Cancelled)
            }
        }
    }

    /// Next pair to show, `None` once the session is complete
    pub fn next_pair(&mut self) -> Result<Option<Matchup<'_>>> {
        match self.session.next_pair()? {
            NextStep::Complete => {
                self.finish_if_complete()?;
                Ok(None)
            }
            NextStep::Pair(pair) => {
                let list: &SongList = &*self.list;
                Ok(Some(Matchup {
                    left_id: pair.left,
                    left: list.require(pair.left)?,
                    right_id: pair.right,
                    right: list.require(pair.right)?,
                    comparison: self.session.comparisons_made() + 1,
                    max_comparisons: self.session.estimated_max_comparisons(),
                }))
            }
        }
    }

    /// Record the listener's pick by song handle
    pub fn record_decision(&mut self, winner: SongId) -> Result<SessionReply<'static>> {
        let state = self.session.record_decision(winner)?;
        let comparisons = self.session.comparisons_made();

        if state == SessionState::Complete {
            self.finish_if_complete()?;
            Ok(SessionReply::Complete { comparisons })
        } else {
            Ok(SessionReply::Recorded { comparisons })
        }
    }

    /// Record the listener's pick by side of the presented pair
    pub fn choose(&mut self, side: Side) -> Result<SessionReply<'static>> {
        let pair = self
            .session
            .current_pair()
            .ok_or_else(|| Error::InvalidState("no pair has been presented".to_string()))?;
        let winner = match side {
            Side::Left => pair.left,
            Side::Right => pair.right,
        };
        self.record_decision(winner)
    }

    /// Cancel the session; no rank is written
    pub fn cancel(&mut self) -> Result<()> {
        self.session.cancel()
    }

    fn finish_if_complete(&mut self) -> Result<()> {
        if self.materialized {
            return Ok(());
        }
        if let Some(order) = self.session.final_order() {
            let ranked = materialize(order, &mut *self.list)?;
            self.materialized = true;
            info!(
                session_id = %self.session.id(),
                songs = ranked,
                comparisons = self.session.comparisons_made(),
                "Ranks assigned"
            );
        }
        Ok(())
    }
}
