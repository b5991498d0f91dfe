use crate::audit::{AuditAction, EntityKind};
use crate::{AuditLog, Database, Error, Result, Stamp};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::Path;
use tracing::info;

/// The league database together with the admin operations that mutate it.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct League {
    #[serde(flatten, deserialize_with = "deserialize_database")]
    pub(crate) database: Database,
}

impl League {
    pub fn new(season: impl Into<String>) -> League {
        League {
            database: Database {
                season: season.into(),
                ..Database::default()
            },
        }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Switches the season the league records results under. Existing data is kept.
    pub fn set_season(&mut self, season: &str) -> Result<()> {
        let season = season.trim();
        if season.is_empty() {
            return Err(Error::invalid("season", "season is required"));
        }
        if self.database.season != season {
            info!(from = %self.database.season, to = season, "switching season");
            self.database.season = season.to_string();
        }
        Ok(())
    }

    pub fn from_database(database: Database) -> Result<League> {
        database.check_consistency().map_err(Error::Inconsistent)?;
        Ok(League { database })
    }

    pub fn into_database(self) -> Database {
        self.database
    }

    pub fn open(path: impl AsRef<Path>) -> Result<League> {
        let path = path.as_ref();
        let league: League = serde_json::from_reader(std::io::BufReader::new(
            fs_err::File::open(path)?,
        ))?;
        info!(
            path = %path.display(),
            teams = league.database.teams.len(),
            games = league.database.games.len(),
            "opened league database"
        );
        Ok(league)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs_err::write(path, json)?;
        info!(path = %path.display(), "saved league database");
        Ok(())
    }

    pub(crate) fn audit(
        &mut self,
        stamp: &Stamp,
        action: AuditAction,
        entity: EntityKind,
        entity_id: impl Display,
        summary: impl Into<String>,
    ) {
        let log = AuditLog::new(stamp, action, entity, entity_id, summary);
        info!(
            actor = %log.actor_email,
            action = %log.action,
            entity = ?log.entity,
            id = %log.entity_id,
            "{}",
            log.summary
        );
        self.database.audit_logs.push(log);
        self.debug_check();
    }

    fn debug_check(&self) {
        #[cfg(debug_assertions)]
        if let Err(problems) = self.database.check_consistency() {
            panic!("admin operation left the database inconsistent:\n{}", problems);
        }
    }
}

fn deserialize_database<'de, D>(deserializer: D) -> Result<Database, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let database = Database::deserialize(deserializer)?;
    database
        .check_consistency()
        .map_err(serde::de::Error::custom)?;
    Ok(database)
}

#[cfg(test)]
mod tests {
    use super::League;
    use crate::{Gender, Player, Team};

    #[test]
    fn load_rejects_inconsistent_documents() {
        let mut league = League::new("2025-26");
        let team = Team::new("Riverside Hawks", "Riverside", Gender::Men);
        let player = Player::new(team.id, "A", "One", 4, "L1");
        league.database.players.insert(player.id, player);
        let json = serde_json::to_string(&league).unwrap();
        let err = serde_json::from_str::<League>(&json).unwrap_err();
        assert!(err.to_string().contains("missing team"), "{}", err);

        league.database.teams.insert(team.id, team);
        let json = serde_json::to_string(&league).unwrap();
        let rebuilt: League = serde_json::from_str(&json).unwrap();
        assert_eq!(rebuilt.database.players.len(), 1);
        assert_eq!(rebuilt.database.season, "2025-26");
    }

    #[test]
    fn save_and_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("league.json");
        let mut league = League::new("2025-26");
        let team = Team::new("Riverside Hawks", "Riverside", Gender::Women);
        league.database.teams.insert(team.id, team);
        league.save(&path).unwrap();
        let opened = League::open(&path).unwrap();
        assert_eq!(opened.database.teams.len(), 1);
        assert!(League::open(dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn season_can_be_switched() {
        let mut league = League::new("2025-26");
        league.set_season(" 2026-27 ").unwrap();
        assert_eq!(league.database().season, "2026-27");
        assert!(league.set_season("  ").unwrap_err().is_validation());
        assert_eq!(league.database().season, "2026-27");
    }
}
