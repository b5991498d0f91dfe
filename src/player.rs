use crate::id::{PlayerId, TeamId};
use crate::util::Average;
use crate::{Error, Result, StoredImage};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[non_exhaustive]
pub struct Player {
    pub id: PlayerId,
    pub team_id: TeamId,
    #[serde(alias = "firstName")]
    pub first_name: String,
    #[serde(alias = "lastName")]
    pub last_name: String,
    pub number: u8,
    /// Federation license number. Fixed once the player is created.
    pub license: String,
    pub position: Option<String>,
    #[serde(alias = "heightCm")]
    pub height_cm: Option<u16>,
    #[serde(alias = "weightKg")]
    pub weight_kg: Option<u16>,
    #[serde(alias = "birthDate")]
    pub birth_date: Option<NaiveDate>,
    pub nationality: Vec<String>,
    pub headshot: Option<StoredImage>,

    #[serde(default)]
    pub stats: SeasonAverages,
    #[serde(default, alias = "gamesPlayed")]
    pub games_played: u32,
}

impl Player {
    pub fn new(
        team_id: TeamId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        number: u8,
        license: impl Into<String>,
    ) -> Player {
        Player {
            id: PlayerId::new(),
            team_id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            number,
            license: license.into(),
            ..Player::default()
        }
    }

    pub fn name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Checks the fields a roster form refuses to submit without.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(Error::invalid("name", "first and last name are required"));
        }
        if self.license.trim().is_empty() {
            return Err(Error::invalid("license", "license is required"));
        }
        match self.nationality.len() {
            1 | 2 => {}
            n => {
                return Err(Error::invalid(
                    "nationality",
                    format!("a player has one or two nationalities, got {}", n),
                ))
            }
        }
        if self.nationality.iter().any(|code| code.trim().is_empty()) {
            return Err(Error::invalid("nationality", "empty nationality"));
        }
        Ok(())
    }
}

/// Season averages as shown on profile pages. These are always recomputed from the full game
/// history, never adjusted in place.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SeasonAverages {
    pub points: String,
    pub rebounds: String,
    pub assists: String,
    pub steals: String,
    pub blocks: String,
}

impl Default for SeasonAverages {
    fn default() -> SeasonAverages {
        SeasonAverages::from_totals(&StatTotals::default())
    }
}

impl SeasonAverages {
    pub fn from_totals(totals: &StatTotals) -> SeasonAverages {
        let avg = |total| {
            Average {
                total,
                games: totals.games,
            }
            .to_string()
        };
        SeasonAverages {
            points: avg(totals.points),
            rebounds: avg(totals.rebounds),
            assists: avg(totals.assists),
            steals: avg(totals.steals),
            blocks: avg(totals.blocks),
        }
    }
}

/// Counting stats summed over a set of games.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct StatTotals {
    pub games: u32,
    pub points: u32,
    pub rebounds: u32,
    pub assists: u32,
    pub steals: u32,
    pub blocks: u32,
}

impl StatTotals {
    pub fn add(&mut self, line: &crate::BoxScoreEntry) {
        self.games += 1;
        self.points += line.points();
        self.rebounds += line.rebounds();
        self.assists += u32::from(line.assists);
        self.steals += u32::from(line.steals);
        self.blocks += u32::from(line.blocks);
    }
}
