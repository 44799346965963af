//! Ranking of boards by confirmed lines, with marked cells as the tiebreak.

use std::cmp::Reverse;

/// Counters of one board as read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardStats {
    /// Board name.
    pub board: String,
    /// Number of confirmed lines.
    pub confirmed_count: u32,
    /// Number of marked cells.
    pub marked_count: u32,
    /// ISO-8601 timestamp of the board's first confirmation.
    pub first_confirmed_at: Option<String>,
}

impl BoardStats {
    fn composite_key(&self) -> (u32, u32) {
        (self.confirmed_count, self.marked_count)
    }
}

/// A board with its position in the standings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedBoard {
    /// 1-based rank; tied boards share the rank of the first board of their group.
    pub rank: usize,
    /// Counters of the board.
    pub stats: BoardStats,
}

/// Full leaderboard computation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standings {
    /// Boards ordered best first.
    pub ranked: Vec<RankedBoard>,
    /// Board with the earliest first confirmation.
    pub first_overall: Option<String>,
    /// Boards tied for the best composite key, once anything was confirmed.
    pub top_group: Option<Vec<String>>,
    /// Boards tied for the worst composite key, once anything was confirmed.
    pub bottom_group: Option<Vec<String>>,
}

/// Sort boards by `(confirmed_count, marked_count)` descending and report tie groups.
///
/// Boards with identical keys keep their input order.
pub fn rank(mut boards: Vec<BoardStats>) -> Standings {
    boards.sort_by_key(|stats| Reverse(stats.composite_key()));

    let first_overall = boards
        .iter()
        .filter_map(|stats| {
            stats
                .first_confirmed_at
                .as_deref()
                .map(|at| (at, stats.board.as_str()))
        })
        .min_by(|a, b| a.0.cmp(b.0))
        .map(|(_, board)| board.to_owned());

    let any_confirmed = boards.iter().any(|stats| stats.confirmed_count > 0);
    let group_of = |key: (u32, u32)| {
        boards
            .iter()
            .filter(|stats| stats.composite_key() == key)
            .map(|stats| stats.board.clone())
            .collect::<Vec<_>>()
    };

    let (top_group, bottom_group) = match (boards.first(), boards.last()) {
        (Some(best), Some(worst)) if any_confirmed => (
            Some(group_of(best.composite_key())),
            Some(group_of(worst.composite_key())),
        ),
        _ => (None, None),
    };

    let mut ranked = Vec::with_capacity(boards.len());
    let mut previous: Option<((u32, u32), usize)> = None;
    for (position, stats) in boards.into_iter().enumerate() {
        let key = stats.composite_key();
        let rank = match previous {
            Some((previous_key, previous_rank)) if previous_key == key => previous_rank,
            _ => position + 1,
        };
        previous = Some((key, rank));
        ranked.push(RankedBoard { rank, stats });
    }

    Standings {
        ranked,
        first_overall,
        top_group,
        bottom_group,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(board: &str, confirmed: u32, marked: u32, first: Option<&str>) -> BoardStats {
        BoardStats {
            board: board.into(),
            confirmed_count: confirmed,
            marked_count: marked,
            first_confirmed_at: first.map(Into::into),
        }
    }

    #[test]
    fn tie_groups_use_the_composite_key() {
        let standings = rank(vec![
            stats("Z", 1, 20, Some("2025-03-01T18:10:00.000Z")),
            stats("X", 2, 10, Some("2025-03-01T18:00:00.000Z")),
            stats("Y", 2, 10, Some("2025-03-01T18:05:00.000Z")),
        ]);

        assert_eq!(standings.top_group, Some(vec!["X".into(), "Y".into()]));
        assert_eq!(standings.bottom_group, Some(vec!["Z".into()]));
        assert_eq!(standings.first_overall.as_deref(), Some("X"));
        let ranks = standings
            .ranked
            .iter()
            .map(|entry| (entry.stats.board.as_str(), entry.rank))
            .collect::<Vec<_>>();
        assert_eq!(ranks, vec![("X", 1), ("Y", 1), ("Z", 3)]);
    }

    #[test]
    fn groups_are_absent_until_something_is_confirmed() {
        let standings = rank(vec![stats("A", 0, 5, None), stats("B", 0, 3, None)]);
        assert_eq!(standings.top_group, None);
        assert_eq!(standings.bottom_group, None);
        assert_eq!(standings.first_overall, None);
        // marked cells still order the table
        assert_eq!(standings.ranked[0].stats.board, "A");
    }

    #[test]
    fn marked_count_breaks_ties_on_confirmed_lines() {
        let standings = rank(vec![
            stats("A", 1, 4, Some("2025-03-01T18:00:00.000Z")),
            stats("B", 1, 9, Some("2025-03-01T17:00:00.000Z")),
            stats("C", 0, 24, None),
        ]);
        let order = standings
            .ranked
            .iter()
            .map(|entry| entry.stats.board.as_str())
            .collect::<Vec<_>>();
        assert_eq!(order, vec!["B", "A", "C"]);
        assert_eq!(standings.top_group, Some(vec!["B".into()]));
        assert_eq!(standings.bottom_group, Some(vec!["C".into()]));
        assert_eq!(standings.first_overall.as_deref(), Some("B"));
    }

    #[test]
    fn single_board_is_both_top_and_bottom() {
        let standings = rank(vec![stats("Solo", 3, 15, Some("2025-03-01T18:00:00.000Z"))]);
        assert_eq!(standings.top_group, Some(vec!["Solo".into()]));
        assert_eq!(standings.bottom_group, Some(vec!["Solo".into()]));
    }

    #[test]
    fn empty_input() {
        let standings = rank(Vec::new());
        assert!(standings.ranked.is_empty());
        assert_eq!(standings.top_group, None);
    }
}
