use serde::Serialize;
use utoipa::ToSchema;

use crate::state::leaderboard::{RankedBoard, Standings};

/// One row of the leaderboard.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardEntry {
    /// 1-based rank; tied boards share a rank.
    pub rank: usize,
    pub board: String,
    pub confirmed_count: u32,
    pub marked_count: u32,
    pub first_confirmation: Option<String>,
}

impl From<RankedBoard> for LeaderboardEntry {
    fn from(ranked: RankedBoard) -> Self {
        Self {
            rank: ranked.rank,
            board: ranked.stats.board,
            confirmed_count: ranked.stats.confirmed_count,
            marked_count: ranked.stats.marked_count,
            first_confirmation: ranked.stats.first_confirmed_at,
        }
    }
}

/// Ranked boards plus the highlights shown above the table.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardResponse {
    pub boards: Vec<LeaderboardEntry>,
    /// Board that confirmed a line first.
    pub first_overall: Option<String>,
    /// Boards sharing the lead, once any line is confirmed.
    pub top_group: Option<Vec<String>>,
    /// Boards sharing the last place, once any line is confirmed.
    pub bottom_group: Option<Vec<String>>,
}

impl From<Standings> for LeaderboardResponse {
    fn from(standings: Standings) -> Self {
        Self {
            boards: standings.ranked.into_iter().map(Into::into).collect(),
            first_overall: standings.first_overall,
            top_group: standings.top_group,
            bottom_group: standings.bottom_group,
        }
    }
}
