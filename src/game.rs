use crate::id::{GameId, PlayerId, RefereeId, TeamId, VenueId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Games may be assigned at most this many referees.
pub const MAX_REFEREES: usize = 3;

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[non_exhaustive]
pub struct Game {
    pub id: GameId,
    pub teams: AwayHome<GameSide>,
    pub kickoff: DateTime<Utc>,
    pub venue: Option<VenueId>,
    #[serde(default)]
    pub referees: Vec<RefereeId>,
    pub result: Option<GameResult>,
}

/// One side of a game. Name and logo are copied from the team when the game is scheduled so
/// the schedule still renders after the team is renamed or deleted.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GameSide {
    pub team_id: TeamId,
    pub name: String,
    pub logo_url: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GameResult {
    pub winner: TeamId,
    pub loser: TeamId,
    pub winner_score: u16,
    pub loser_score: u16,
    #[serde(default)]
    pub box_score: Vec<BoxScoreEntry>,
}

impl Game {
    pub fn new(kickoff: DateTime<Utc>, teams: AwayHome<GameSide>) -> Game {
        Game {
            id: GameId::new(),
            teams,
            kickoff,
            ..Game::default()
        }
    }

    pub fn is_completed(&self) -> bool {
        self.result.is_some()
    }

    pub fn involves(&self, team: TeamId) -> bool {
        self.side_of(team).is_some()
    }

    pub fn side_of(&self, team: TeamId) -> Option<TeamSelect> {
        if self.teams.home.team_id == team {
            Some(TeamSelect::Home)
        } else if self.teams.away.team_id == team {
            Some(TeamSelect::Away)
        } else {
            None
        }
    }

    /// Final scores by side, once the game has been played.
    pub fn scores(&self) -> Option<AwayHome<u16>> {
        let result = self.result.as_ref()?;
        let score_of = |team| {
            if team == result.winner {
                result.winner_score
            } else {
                result.loser_score
            }
        };
        Some(AwayHome {
            away: score_of(self.teams.away.team_id),
            home: score_of(self.teams.home.team_id),
        })
    }

    pub fn box_score_for(&self, player: PlayerId) -> Option<&BoxScoreEntry> {
        self.result
            .as_ref()?
            .box_score
            .iter()
            .find(|line| line.player_id == player)
    }
}

/// A player's line for a single game.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[non_exhaustive]
pub struct BoxScoreEntry {
    pub player_id: PlayerId,
    pub team_id: TeamId,
    #[serde(default)]
    pub two_made: u16,
    #[serde(default)]
    pub two_attempted: u16,
    #[serde(default)]
    pub three_made: u16,
    #[serde(default)]
    pub three_attempted: u16,
    #[serde(default)]
    pub free_made: u16,
    #[serde(default)]
    pub free_attempted: u16,
    #[serde(default)]
    pub offensive_rebounds: u16,
    #[serde(default)]
    pub defensive_rebounds: u16,
    #[serde(default)]
    pub assists: u16,
    #[serde(default)]
    pub steals: u16,
    #[serde(default)]
    pub blocks: u16,
    #[serde(default)]
    pub turnovers: u16,
    #[serde(default)]
    pub fouls: u16,
    #[serde(default)]
    pub minutes: u16,
}

impl BoxScoreEntry {
    pub fn new(player_id: PlayerId, team_id: TeamId) -> BoxScoreEntry {
        BoxScoreEntry {
            player_id,
            team_id,
            ..BoxScoreEntry::default()
        }
    }

    pub fn points(&self) -> u32 {
        2 * u32::from(self.two_made) + 3 * u32::from(self.three_made) + u32::from(self.free_made)
    }

    pub fn rebounds(&self) -> u32 {
        u32::from(self.offensive_rebounds) + u32::from(self.defensive_rebounds)
    }

    /// True when every tracked stat is zero; such lines are not stored.
    pub fn is_empty(&self) -> bool {
        [
            self.two_made,
            self.two_attempted,
            self.three_made,
            self.three_attempted,
            self.free_made,
            self.free_attempted,
            self.offensive_rebounds,
            self.defensive_rebounds,
            self.assists,
            self.steals,
            self.blocks,
            self.turnovers,
            self.fouls,
            self.minutes,
        ]
        .iter()
        .all(|n| *n == 0)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AwayHome<T> {
    pub away: T,
    pub home: T,
}

impl<T> AwayHome<T> {
    pub fn map<U, F>(self, mut op: F) -> AwayHome<U>
    where
        F: FnMut(T) -> U,
    {
        AwayHome {
            away: op(self.away),
            home: op(self.home),
        }
    }

    pub fn select(&self, select: TeamSelect) -> &T {
        match select {
            TeamSelect::Away => &self.away,
            TeamSelect::Home => &self.home,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamSelect {
    Away,
    Home,
}

#[cfg(test)]
mod tests {
    use super::{AwayHome, BoxScoreEntry, Game, GameResult, GameSide};
    use crate::id::{PlayerId, TeamId};
    use chrono::Utc;

    #[test]
    fn points_from_makes() {
        let mut line = BoxScoreEntry::new(PlayerId::new(), TeamId::new());
        line.two_made = 4;
        line.three_made = 3;
        line.free_made = 5;
        line.free_attempted = 6;
        assert_eq!(line.points(), 22);
    }

    #[test]
    fn empty_lines() {
        let mut line = BoxScoreEntry::new(PlayerId::new(), TeamId::new());
        assert!(line.is_empty());
        line.fouls = 1;
        assert!(!line.is_empty());
        line.fouls = 0;
        line.three_attempted = 2;
        assert!(!line.is_empty());
    }

    #[test]
    fn scores_by_side() {
        let home = TeamId::new();
        let away = TeamId::new();
        let mut game = Game::new(
            Utc::now(),
            AwayHome {
                away: GameSide {
                    team_id: away,
                    ..GameSide::default()
                },
                home: GameSide {
                    team_id: home,
                    ..GameSide::default()
                },
            },
        );
        assert_eq!(game.scores(), None);
        game.result = Some(GameResult {
            winner: away,
            loser: home,
            winner_score: 81,
            loser_score: 77,
            box_score: Vec::new(),
        });
        assert_eq!(game.scores(), Some(AwayHome { away: 81, home: 77 }));
    }
}
