use crate::id::TeamId;
use serde::{Deserialize, Serialize};

/// One team's record for one season, mirrored from the team's running totals whenever a
/// result is recorded. At most one row exists per season and team.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Standing {
    pub season: String,
    pub team_id: TeamId,
    pub wins: u32,
    pub losses: u32,
    pub total_points: u32,
}

impl Standing {
    pub fn is_for(&self, season: &str, team: TeamId) -> bool {
        self.season == season && self.team_id == team
    }
}
