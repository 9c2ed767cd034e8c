//! Comparison session state machine
//!
//! A session runs one pairwise-comparison sort over a fixed set of songs:
//! SORTING → AWAITING_DECISION → SORTING → ... → COMPLETE, or CANCELLED from
//! any non-terminal state. It advances exactly one comparison per decision and
//! never touches the song list itself; see [`SessionController`] for the
//! component that ties a session to a list.
//!
//! [`SessionController`]: crate::SessionController

mod schedule;

pub use schedule::max_comparisons;

use crate::error::{Error, Result};
use crate::song::SongId;
use chrono::{DateTime, Utc};
use schedule::Schedule;
use serde::{Deserialize, Serialize};
use songsort_common::config::RankingConfig;
use songsort_common::SortStrategy;
use tracing::{debug, info};
use uuid::Uuid;

/// Session workflow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    /// Working out the next pair or the final order
    Sorting,
    /// A pair has been presented and waits for the listener's pick
    AwaitingDecision,
    /// Final order available
    Complete,
    /// Session abandoned, no order produced
    Cancelled,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Complete | SessionState::Cancelled)
    }
}

/// State transition record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub session_id: Uuid,
    pub old_state: SessionState,
    pub new_state: SessionState,
    pub transitioned_at: DateTime<Utc>,
}

/// Pair of songs presented to the listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingPair {
    pub left: SongId,
    pub right: SongId,
}

impl PendingPair {
    pub fn contains(&self, id: SongId) -> bool {
        self.left == id || self.right == id
    }
}

/// One recorded judgement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub winner: SongId,
    pub loser: SongId,
}

/// Result of asking a session for its next step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// Present this pair and wait for a decision
    Pair(PendingPair),
    /// No more decisions needed
    Complete,
}

/// One run of the pairwise-comparison sort
#[derive(Debug, Clone)]
pub struct ComparisonSession {
    id: Uuid,
    strategy: SortStrategy,
    state: SessionState,
    input: Vec<SongId>,
    schedule: Schedule,
    decisions: Vec<Decision>,
    history: Vec<StateTransition>,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

impl ComparisonSession {
    /// Start a session over `songs` in their given order
    ///
    /// Fewer than two songs complete immediately with the trivial order.
    pub fn new(songs: Vec<SongId>, strategy: SortStrategy) -> Self {
        let schedule = Schedule::new(strategy, songs.clone());
        let mut session = Self {
            id: Uuid::new_v4(),
            strategy,
            state: SessionState::Sorting,
            input: songs,
            schedule,
            decisions: Vec::new(),
            history: Vec::new(),
            started_at: Utc::now(),
            ended_at: None,
        };

        info!(
            session_id = %session.id,
            songs = session.input.len(),
            strategy = %strategy,
            "Comparison session started"
        );

        if session.schedule.pending().is_none() {
            session.transition_to(SessionState::Complete);
        }
        session
    }

    /// Start a session using the ranking settings from configuration
    pub fn with_config(songs: Vec<SongId>, config: &RankingConfig) -> Result<Self> {
        if songs.len() < 2 && !config.allow_trivial_sessions {
            return Err(Error::InsufficientInput { count: songs.len() });
        }
        Ok(Self::new(songs, config.strategy))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn strategy(&self) -> SortStrategy {
        self.strategy
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Songs taking part, in input order
    pub fn songs(&self) -> &[SongId] {
        &self.input
    }

    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    pub fn comparisons_made(&self) -> usize {
        self.decisions.len()
    }

    /// Upper bound on the decisions this session can ask for
    pub fn estimated_max_comparisons(&self) -> usize {
        max_comparisons(self.strategy, self.input.len())
    }

    pub fn history(&self) -> &[StateTransition] {
        &self.history
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Pair currently waiting for a decision, if any
    pub fn current_pair(&self) -> Option<PendingPair> {
        match self.state {
            SessionState::AwaitingDecision => self.pending(),
            _ => None,
        }
    }

    /// Best-first order once the session is complete
    pub fn final_order(&self) -> Option<&[SongId]> {
        match self.state {
            SessionState::Complete => self.schedule.order(),
            _ => None,
        }
    }

    /// Next pair to present, or completion
    ///
    /// Asking again while a decision is pending returns the same pair.
    pub fn next_pair(&mut self) -> Result<NextStep> {
        match self.state {
            SessionState::Cancelled => Err(Error::InvalidState(
                "session has been cancelled".to_string(),
            )),
            SessionState::Complete => Ok(NextStep::Complete),
            SessionState::AwaitingDecision | SessionState::Sorting => match self.pending() {
                Some(pair) => {
                    if self.state == SessionState::Sorting {
                        self.transition_to(SessionState::AwaitingDecision);
                    }
                    debug!(
                        session_id = %self.id,
                        left = %pair.left,
                        right = %pair.right,
                        "Presenting pair"
                    );
                    Ok(NextStep::Pair(pair))
                }
                None => {
                    self.transition_to(SessionState::Complete);
                    Ok(NextStep::Complete)
                }
            },
        }
    }

    /// Record the listener's pick for the presented pair
    ///
    /// Returns the state after the step: `Sorting`, or `Complete` when this
    /// was the last decision needed.
    pub fn record_decision(&mut self, winner: SongId) -> Result<SessionState> {
        if self.state != SessionState::AwaitingDecision {
            return Err(Error::InvalidState(format!(
                "no decision pending (session is {:?})",
                self.state
            )));
        }

        let pair = self.pending().ok_or_else(|| {
            Error::InvalidState("awaiting a decision without a pending pair".to_string())
        })?;
        if !pair.contains(winner) {
            return Err(Error::InvalidState(format!(
                "{} is not part of the presented pair ({} vs {})",
                winner, pair.left, pair.right
            )));
        }

        let left_wins = winner == pair.left;
        let loser = if left_wins { pair.right } else { pair.left };
        self.schedule.resolve(left_wins);
        self.decisions.push(Decision { winner, loser });

        debug!(
            session_id = %self.id,
            winner = %winner,
            loser = %loser,
            comparisons = self.decisions.len(),
            "Decision recorded"
        );

        self.transition_to(SessionState::Sorting);
        if self.schedule.pending().is_none() {
            self.transition_to(SessionState::Complete);
        }
        Ok(self.state)
    }

    /// Abandon the session, discarding every recorded decision
    ///
    /// Cancelling twice is a no-op; cancelling a completed session fails.
    pub fn cancel(&mut self) -> Result<()> {
        match self.state {
            SessionState::Cancelled => Ok(()),
            SessionState::Complete => Err(Error::InvalidState(
                "session already complete".to_string(),
            )),
            SessionState::Sorting | SessionState::AwaitingDecision => {
                self.decisions.clear();
                self.transition_to(SessionState::Cancelled);
                Ok(())
            }
        }
    }

    fn pending(&self) -> Option<PendingPair> {
        self.schedule
            .pending()
            .map(|(left, right)| PendingPair { left, right })
    }

    fn transition_to(&mut self, new_state: SessionState) {
        let transition = StateTransition {
            session_id: self.id,
            old_state: self.state,
            new_state,
            transitioned_at: Utc::now(),
        };
        self.state = new_state;

        if new_state.is_terminal() {
            self.ended_at = Some(transition.transitioned_at);
            info!(
                session_id = %self.id,
                state = ?new_state,
                comparisons = self.decisions.len(),
                "Comparison session finished"
            );
        }

        self.history.push(transition);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: u64) -> Vec<SongId> {
        (0..n).map(SongId).collect()
    }

    #[test]
    fn test_starts_sorting_with_two_songs() {
        let session = ComparisonSession::new(ids(2), SortStrategy::BinaryInsertion);
        assert_eq!(session.state(), SessionState::Sorting);
        assert!(session.current_pair().is_none());
        assert!(session.final_order().is_none());
    }

    #[test]
    fn test_next_pair_is_idempotent_while_awaiting() {
        let mut session = ComparisonSession::new(ids(3), SortStrategy::Merge);
        let first = session.next_pair().unwrap();
        let second = session.next_pair().unwrap();
        assert_eq!(first, second);
        assert_eq!(session.state(), SessionState::AwaitingDecision);
    }

    #[test]
    fn test_decision_without_pair_is_invalid_state() {
        let mut session = ComparisonSession::new(ids(2), SortStrategy::BinaryInsertion);
        let result = session.record_decision(SongId(0));
        assert!(matches!(result, Err(Error::InvalidState(_))));
        assert_eq!(session.comparisons_made(), 0);
    }

    #[test]
    fn test_winner_outside_pair_is_rejected() {
        let mut session = ComparisonSession::new(ids(4), SortStrategy::Merge);
        let NextStep::Pair(pair) = session.next_pair().unwrap() else {
            panic!("expected a pair");
        };
        let outsider = ids(4).into_iter().find(|id| !pair.contains(*id)).unwrap();

        assert!(matches!(
            session.record_decision(outsider),
            Err(Error::InvalidState(_))
        ));
        // Still awaiting the same decision
        assert_eq!(session.current_pair(), Some(pair));
    }

    #[test]
    fn test_cancel_discards_decisions() {
        let mut session = ComparisonSession::new(ids(4), SortStrategy::BinaryInsertion);
        if let NextStep::Pair(pair) = session.next_pair().unwrap() {
            session.record_decision(pair.left).unwrap();
        }
        session.cancel().unwrap();

        assert_eq!(session.state(), SessionState::Cancelled);
        assert!(session.decisions().is_empty());
        assert!(session.final_order().is_none());
        assert!(session.ended_at().is_some());
        assert!(session.next_pair().is_err());
        assert!(session.cancel().is_ok());
    }

    #[test]
    fn test_cancel_after_complete_fails() {
        let mut session = ComparisonSession::new(ids(1), SortStrategy::BinaryInsertion);
        assert_eq!(session.state(), SessionState::Complete);
        assert!(matches!(session.cancel(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_insufficient_input_when_trivial_sessions_disabled() {
        let config = RankingConfig {
            strategy: SortStrategy::Merge,
            allow_trivial_sessions: false,
        };
        match ComparisonSession::with_config(ids(1), &config) {
            Err(Error::InsufficientInput { count }) => assert_eq!(count, 1),
            other => panic!("Expected InsufficientInput, got {:?}", other.map(|s| s.state())),
        }
        assert!(ComparisonSession::with_config(ids(2), &config).is_ok());
    }

    #[test]
    fn test_history_records_transitions() {
        let mut session = ComparisonSession::new(ids(2), SortStrategy::BinaryInsertion);
        let NextStep::Pair(pair) = session.next_pair().unwrap() else {
            panic!("expected a pair");
        };
        assert_eq!(session.record_decision(pair.right).unwrap(), SessionState::Complete);

        let states: Vec<SessionState> = session.history().iter().map(|t| t.new_state).collect();
        assert_eq!(
            states,
            vec![
                SessionState::AwaitingDecision,
                SessionState::Sorting,
                SessionState::Complete
            ]
        );
        assert_eq!(session.final_order().unwrap(), &[pair.right, pair.left]);
    }
}
