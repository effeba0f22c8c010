//! Incremental roster reveal: cursor transitions and the single-shot reveal timer.
//!
//! The cursor walks the team/player grid in row-major order. It is purely presentational
//! and never touches `Tournament::teams`.

use crate::models::{RevealCursor, Team, Tournament};
use std::time::Duration;
use tokio::task::JoinHandle;

/// One transition from `cursor`, or None when the cursor is terminal.
///
/// Reveals the next player of the current team if any remain; otherwise shows the next
/// team with no players; otherwise stops.
pub fn next_cursor(cursor: RevealCursor, team_sizes: &[usize]) -> Option<RevealCursor> {
    let len = *team_sizes.get(cursor.team)?;
    if cursor.revealed_in_team() < len {
        return Some(RevealCursor {
            team: cursor.team,
            player: Some(cursor.revealed_in_team()),
        });
    }
    if cursor.team + 1 < team_sizes.len() {
        return Some(RevealCursor {
            team: cursor.team + 1,
            player: None,
        });
    }
    None
}

/// True when no further transition exists (including a cursor outside the grid).
pub fn is_terminal(cursor: RevealCursor, team_sizes: &[usize]) -> bool {
    next_cursor(cursor, team_sizes).is_none()
}

/// Number of leading members of `team_index` that are visible under `cursor`.
pub fn visible_count(cursor: Option<RevealCursor>, team_index: usize, team_len: usize) -> usize {
    match cursor {
        None => 0,
        Some(c) if team_index < c.team => team_len,
        Some(c) if team_index == c.team => c.revealed_in_team().min(team_len),
        Some(_) => 0,
    }
}

/// Visible prefix of every team that has appeared so far (later teams are omitted).
pub fn visible_roster(tournament: &Tournament) -> Vec<&[String]> {
    let Some(cursor) = tournament.reveal else {
        return Vec::new();
    };
    tournament
        .teams
        .iter()
        .enumerate()
        .take_while(|(index, _)| *index <= cursor.team)
        .map(|(index, team)| &team.members[..visible_count(Some(cursor), index, team.len())])
        .collect()
}

/// Advance the tournament's reveal cursor by one step.
///
/// Returns whether more steps remain, so a timer knows whether to rearm.
pub fn advance_reveal(tournament: &mut Tournament) -> bool {
    let sizes: Vec<usize> = tournament.teams.iter().map(Team::len).collect();
    let Some(cursor) = tournament.reveal else {
        return false;
    };
    match next_cursor(cursor, &sizes) {
        Some(next) => {
            tournament.reveal = Some(next);
            !is_terminal(next, &sizes)
        }
        None => false,
    }
}

/// True when there is a cursor that can still move.
pub fn reveal_pending(tournament: &Tournament) -> bool {
    match tournament.reveal {
        Some(cursor) => !is_terminal(cursor, &tournament.team_sizes()),
        None => false,
    }
}

/// Owner of at most one pending reveal tick.
///
/// `arm` cancels whatever is pending before scheduling, so ticks from an older team
/// structure or delay never fire. Dropping the timer cancels it.
#[derive(Debug, Default)]
pub struct RevealTimer {
    pending: Option<JoinHandle<()>>,
}

impl RevealTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `tick` after `delay`, rearming after every tick that returns true.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm<F>(&mut self, delay: Duration, mut tick: F)
    where
        F: FnMut() -> bool + Send + 'static,
    {
        self.cancel();
        self.pending = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(delay).await;
                if !tick() {
                    break;
                }
            }
        }));
    }

    /// Restart scheduling for `tournament` from its current cursor.
    ///
    /// Call after regenerating teams or changing the delay. Any pending tick is dropped;
    /// a new one is armed with the tournament's delay only while the reveal can still move.
    /// Returns whether a tick is now scheduled.
    pub fn restart_for<F>(&mut self, tournament: &Tournament, tick: F) -> bool
    where
        F: FnMut() -> bool + Send + 'static,
    {
        if !reveal_pending(tournament) {
            self.cancel();
            return false;
        }
        self.arm(tournament.reveal_delay(), tick);
        true
    }

    /// Abort the pending tick, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// True while a tick is scheduled.
    pub fn is_armed(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for RevealTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(team: usize, player: Option<usize>) -> RevealCursor {
        RevealCursor { team, player }
    }

    #[test]
    fn walks_players_then_next_team() {
        let sizes = [2, 1];
        assert_eq!(next_cursor(at(0, None), &sizes), Some(at(0, Some(0))));
        assert_eq!(next_cursor(at(0, Some(0)), &sizes), Some(at(0, Some(1))));
        assert_eq!(next_cursor(at(0, Some(1)), &sizes), Some(at(1, None)));
        assert_eq!(next_cursor(at(1, None), &sizes), Some(at(1, Some(0))));
        assert_eq!(next_cursor(at(1, Some(0)), &sizes), None);
    }

    #[test]
    fn empty_team_is_skipped_over() {
        let sizes = [0, 1];
        assert_eq!(next_cursor(at(0, None), &sizes), Some(at(1, None)));
        assert!(is_terminal(at(0, None), &[0]));
    }

    #[test]
    fn out_of_bounds_cursor_is_terminal() {
        assert!(is_terminal(at(5, None), &[1, 1]));
        assert!(is_terminal(at(0, None), &[]));
    }

    #[test]
    fn visible_prefix_per_team() {
        let c = Some(at(1, Some(0)));
        assert_eq!(visible_count(c, 0, 3), 3);
        assert_eq!(visible_count(c, 1, 3), 1);
        assert_eq!(visible_count(c, 2, 3), 0);
        assert_eq!(visible_count(None, 0, 3), 0);
        assert_eq!(visible_count(Some(at(0, None)), 0, 3), 0);
    }

    #[test]
    fn advance_without_cursor_is_a_no_op() {
        let mut t = Tournament::default();
        assert!(!advance_reveal(&mut t));
        assert_eq!(t.reveal, None);
    }
}
