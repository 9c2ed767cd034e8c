//! # Songsort Core
//!
//! Pairwise ranking of a song collection:
//! - [`Song`] records owned by a single [`SongList`]
//! - [`ComparisonSession`] state machine scheduling the pairs a listener judges
//! - [`materializer`] writing the finished order into each song's rank
//! - [`SessionController`] accepting typed commands from a front end
//! - [`review`] staging edits to a list before it is committed

pub mod controller;
pub mod error;
pub mod materializer;
pub mod review;
pub mod session;
pub mod song;
pub mod song_list;

pub use controller::{Matchup, SessionCommand, SessionController, SessionReply, Side};
pub use error::{Error, Result};
pub use session::{ComparisonSession, Decision, NextStep, PendingPair, SessionState};
pub use song::{Rank, Song, SongId};
pub use song_list::SongList;
