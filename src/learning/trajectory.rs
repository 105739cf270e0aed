//! Per-episode record of visited after-states.
//!
//! Record `k` holds the tuple indices of the after-state reached by move `k` and
//! the immediate reward of that move. The TD learner walks the records from the
//! last one back to the first.

use crate::pattern::NUM_TUPLES;

/// Typical episode length, used to preallocate.
const TYPICAL_EPISODE_MOVES: usize = 512;

/// One after-state of the episode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AfterstateRecord {
    /// Tuple indices of the after-state, one per weight table
    pub indices: [usize; NUM_TUPLES],
    /// Reward of the move that produced this after-state, without the value term
    pub reward: f32,
}

impl AfterstateRecord {
    pub fn new(indices: [usize; NUM_TUPLES], reward: f32) -> Self {
        Self { indices, reward }
    }
}

/// Ordered after-state records of the episode in flight.
#[derive(Clone, Debug, Default)]
pub struct Trajectory {
    records: Vec<AfterstateRecord>,
}

impl Trajectory {
    /// Empty trajectory with room for a typical episode.
    pub fn new() -> Self {
        Self::with_capacity(TYPICAL_EPISODE_MOVES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    /// Append the record of the latest move.
    #[inline]
    pub fn push(&mut self, record: AfterstateRecord) {
        self.records.push(record);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records, oldest first.
    #[inline]
    pub fn records(&self) -> &[AfterstateRecord] {
        &self.records
    }

    /// Most recent record.
    #[inline]
    pub fn last(&self) -> Option<&AfterstateRecord> {
        self.records.last()
    }

    /// Records, most recent first.
    pub fn iter_rev(&self) -> impl Iterator<Item = &AfterstateRecord> {
        self.records.iter().rev()
    }

    /// Sum of move rewards.
    pub fn total_reward(&self) -> f32 {
        self.records.iter().map(|r| r.reward).sum()
    }

    /// Drop every record, keeping the allocation.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let trajectory = Trajectory::new();
        assert!(trajectory.is_empty());
        assert_eq!(trajectory.len(), 0);
        assert!(trajectory.last().is_none());
    }

    #[test]
    fn test_push_and_reverse_order() {
        let mut trajectory = Trajectory::new();
        for k in 0..3 {
            trajectory.push(AfterstateRecord::new([k; NUM_TUPLES], k as f32));
        }

        assert_eq!(trajectory.len(), 3);
        assert_eq!(trajectory.last().map(|r| r.indices[0]), Some(2));

        let rewards: Vec<f32> = trajectory.iter_rev().map(|r| r.reward).collect();
        assert_eq!(rewards, vec![2.0, 1.0, 0.0]);
        assert_eq!(trajectory.total_reward(), 3.0);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut trajectory = Trajectory::with_capacity(16);
        trajectory.push(AfterstateRecord::new([0; NUM_TUPLES], 3.0));
        trajectory.clear();
        assert!(trajectory.is_empty());
        assert!(trajectory.records.capacity() >= 16);
    }
}
