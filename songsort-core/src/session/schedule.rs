//! Comparison schedules
//!
//! A schedule owns the partial order built so far and decides which pair is
//! judged next. Both schedules are deterministic: the same input and the same
//! answers always produce the same questions and the same final order. Orders
//! are kept best-first.

use crate::song::SongId;
use songsort_common::SortStrategy;

/// Schedule dispatch over the configured strategy
#[derive(Debug, Clone)]
pub(crate) enum Schedule {
    BinaryInsertion(BinaryInsertion),
    Merge(MergeSchedule),
}

impl Schedule {
    pub(crate) fn new(strategy: SortStrategy, songs: Vec<SongId>) -> Self {
        match strategy {
            SortStrategy::BinaryInsertion => Schedule::BinaryInsertion(BinaryInsertion::new(songs)),
            SortStrategy::Merge => Schedule::Merge(MergeSchedule::new(songs)),
        }
    }

    /// Pair awaiting a decision as (left, right), `None` once the order is final
    pub(crate) fn pending(&self) -> Option<(SongId, SongId)> {
        match self {
            Schedule::BinaryInsertion(s) => s.pending(),
            Schedule::Merge(s) => s.pending(),
        }
    }

    /// Apply one decision about the pending pair
    pub(crate) fn resolve(&mut self, left_wins: bool) {
        match self {
            Schedule::BinaryInsertion(s) => s.resolve(left_wins),
            Schedule::Merge(s) => s.resolve(left_wins),
        }
    }

    /// Final best-first order, available once no pair is pending
    pub(crate) fn order(&self) -> Option<&[SongId]> {
        match self {
            Schedule::BinaryInsertion(s) => s.order(),
            Schedule::Merge(s) => s.order(),
        }
    }
}

/// Worst-case number of decisions a schedule asks for over `n` songs
pub fn max_comparisons(strategy: SortStrategy, n: usize) -> usize {
    if n < 2 {
        return 0;
    }
    match strategy {
        // Inserting into a prefix of k songs takes ceil(log2(k + 1)) probes.
        SortStrategy::BinaryInsertion => (1..n).map(|k| ceil_log2(k + 1)).sum(),
        // Merging runs of a and b songs takes at most a + b - 1 decisions.
        SortStrategy::Merge => {
            let mut total = 0;
            let mut width = 1;
            while width < n {
                let mut lo = 0;
                while lo < n {
                    let mid = (lo + width).min(n);
                    let hi = (lo + 2 * width).min(n);
                    if mid < hi {
                        total += hi - lo - 1;
                    }
                    lo = hi;
                }
                width *= 2;
            }
            total
        }
    }
}

fn ceil_log2(x: usize) -> usize {
    if x <= 1 {
        0
    } else {
        (usize::BITS - (x - 1).leading_zeros()) as usize
    }
}

/// Binary search probe of one song into the ordered prefix
#[derive(Debug, Clone, Copy)]
struct Probe {
    candidate: SongId,
    lo: usize,
    hi: usize,
}

/// Insert each song into a maintained ordered sequence via binary search
#[derive(Debug, Clone)]
pub(crate) struct BinaryInsertion {
    sorted: Vec<SongId>,
    remaining: std::vec::IntoIter<SongId>,
    probe: Option<Probe>,
}

impl BinaryInsertion {
    fn new(songs: Vec<SongId>) -> Self {
        let mut remaining = songs.into_iter();
        let sorted: Vec<SongId> = remaining.next().into_iter().collect();
        let mut schedule = Self {
            sorted,
            remaining,
            probe: None,
        };
        schedule.next_candidate();
        schedule
    }

    fn next_candidate(&mut self) {
        self.probe = self.remaining.next().map(|candidate| Probe {
            candidate,
            lo: 0,
            hi: self.sorted.len(),
        });
    }

    fn pending(&self) -> Option<(SongId, SongId)> {
        self.probe.map(|p| (p.candidate, self.sorted[(p.lo + p.hi) / 2]))
    }

    fn resolve(&mut self, left_wins: bool) {
        let Some(mut probe) = self.probe else {
            return;
        };

        let mid = (probe.lo + probe.hi) / 2;
        if left_wins {
            // Candidate beats the middle song, so it ranks above it.
            probe.hi = mid;
        } else {
            probe.lo = mid + 1;
        }

        if probe.lo == probe.hi {
            self.sorted.insert(probe.lo, probe.candidate);
            self.next_candidate();
        } else {
            self.probe = Some(probe);
        }
    }

    fn order(&self) -> Option<&[SongId]> {
        match self.probe {
            Some(_) => None,
            None => Some(&self.sorted),
        }
    }
}

/// Bottom-up merge sort over runs of doubling width
#[derive(Debug, Clone)]
pub(crate) struct MergeSchedule {
    current: Vec<SongId>,
    next: Vec<SongId>,
    width: usize,
    lo: usize,
    mid: usize,
    hi: usize,
    i: usize,
    j: usize,
}

impl MergeSchedule {
    fn new(songs: Vec<SongId>) -> Self {
        let n = songs.len();
        let mut schedule = Self {
            next: Vec::with_capacity(n),
            current: songs,
            width: 1,
            lo: 0,
            mid: 0,
            hi: 0,
            i: 0,
            j: 0,
        };
        schedule.set_bounds(0);
        schedule.settle();
        schedule
    }

    fn len(&self) -> usize {
        self.current.len()
    }

    fn is_done(&self) -> bool {
        self.width >= self.len()
    }

    fn set_bounds(&mut self, lo: usize) {
        let n = self.len();
        self.lo = lo;
        self.mid = (lo + self.width).min(n);
        self.hi = (lo + 2 * self.width).min(n);
        self.i = self.lo;
        self.j = self.mid;
    }

    /// Advance through merges that need no decision
    fn settle(&mut self) {
        while !self.is_done() {
            if self.i < self.mid && self.j < self.hi {
                return;
            }

            // One run is exhausted: the rest of the other keeps its order.
            self.next.extend_from_slice(&self.current[self.i..self.mid]);
            self.next.extend_from_slice(&self.current[self.j..self.hi]);

            if self.hi >= self.len() {
                self.current = std::mem::take(&mut self.next);
                self.width *= 2;
                self.set_bounds(0);
            } else {
                self.set_bounds(self.hi);
            }
        }
    }

    fn pending(&self) -> Option<(SongId, SongId)> {
        if self.is_done() {
            None
        } else {
            Some((self.current[self.i], self.current[self.j]))
        }
    }

    fn resolve(&mut self, left_wins: bool) {
        if self.is_done() {
            return;
        }

        if left_wins {
            self.next.push(self.current[self.i]);
            self.i += 1;
        } else {
            self.next.push(self.current[self.j]);
            self.j += 1;
        }
        self.settle();
    }

    fn order(&self) -> Option<&[SongId]> {
        if self.is_done() {
            Some(&self.current)
        } else {
            None
        }
    }
}
