use crate::{
    CommitteeMember, Database, Game, NewsArticle, Partner, Player, Result, StaffMember, Team,
    TrafficEntry,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct Snapshot {
    pub season: String,
    pub teams: Vec<TeamDocument>,
    pub games: Vec<Game>,
    pub news: Vec<NewsArticle>,
    pub partners: Vec<Partner>,
    pub committee: Vec<CommitteeMember>,
    pub traffic: Vec<TrafficEntry>,
}

/// A team with its roster and coaching staff inlined, as the team pages read it.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct TeamDocument {
    #[serde(flatten)]
    pub team: Team,
    #[serde(default)]
    pub roster: Vec<Player>,
    #[serde(default)]
    pub staff: Vec<StaffMember>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct Meta {
    season: String,
}

const META: &str = "meta.json";
const TEAMS: &str = "teams.json";
const GAMES: &str = "games.json";
const NEWS: &str = "news.json";
const PARTNERS: &str = "partners.json";
const COMMITTEE: &str = "committee.json";
const TRAFFIC: &str = "traffic.json";

impl Snapshot {
    pub fn from_database(database: &Database) -> Snapshot {
        let teams = database
            .teams
            .values()
            .map(|team| {
                let mut roster = database.roster(team.id).cloned().collect::<Vec<_>>();
                roster.sort_by_key(|p| p.number);
                TeamDocument {
                    team: team.clone(),
                    roster,
                    staff: database.coaching_staff(team.id).cloned().collect(),
                }
            })
            .collect();
        let mut games = database.games.values().cloned().collect::<Vec<_>>();
        games.sort_by_key(|g| (g.kickoff, g.id));

        Snapshot {
            season: database.season.clone(),
            teams,
            games,
            news: database.news.values().cloned().collect(),
            partners: database.partners.values().cloned().collect(),
            committee: database.committee.values().cloned().collect(),
            traffic: database.traffic.clone(),
        }
    }

    pub fn write_dir(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        fs_err::create_dir_all(dir)?;
        write_json(
            dir,
            META,
            &Meta {
                season: self.season.clone(),
            },
        )?;
        write_json(dir, TEAMS, &self.teams)?;
        write_json(dir, GAMES, &self.games)?;
        write_json(dir, NEWS, &self.news)?;
        write_json(dir, PARTNERS, &self.partners)?;
        write_json(dir, COMMITTEE, &self.committee)?;
        write_json(dir, TRAFFIC, &self.traffic)?;
        info!(
            dir = %dir.display(),
            teams = self.teams.len(),
            games = self.games.len(),
            news = self.news.len(),
            "wrote snapshot"
        );
        Ok(())
    }

    /// Reads a snapshot directory. Collections without a file read as empty.
    pub fn read_dir(dir: impl AsRef<Path>) -> Result<Snapshot> {
        let dir = dir.as_ref();
        let meta: Meta = read_json(dir, META)?;
        Ok(Snapshot {
            season: meta.season,
            teams: read_json(dir, TEAMS)?,
            games: read_json(dir, GAMES)?,
            news: read_json(dir, NEWS)?,
            partners: read_json(dir, PARTNERS)?,
            committee: read_json(dir, COMMITTEE)?,
            traffic: read_json(dir, TRAFFIC)?,
        })
    }

    pub fn team_by_name(&self, name: &str) -> Option<&TeamDocument> {
        let key = crate::util::name_key(name);
        self.teams
            .iter()
            .find(|doc| crate::util::name_key(&doc.team.name) == key)
    }
}

fn write_json<T: Serialize + ?Sized>(dir: &Path, name: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs_err::write(dir.join(name), json)?;
    Ok(())
}

fn read_json<T: DeserializeOwned + Default>(dir: &Path, name: &str) -> Result<T> {
    match fs_err::read_to_string(dir.join(name)) {
        Ok(json) => Ok(serde_json::from_str(&json)?),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(file = name, "not in snapshot");
            Ok(T::default())
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::Snapshot;
    use crate::test_support::{league_with_teams, stamp};
    use crate::{MemoryStore, NewsArticle, Player};

    #[test]
    fn round_trips_through_a_directory() {
        let (mut league, [a, _]) = league_with_teams();
        let mut player = Player::new(a, "Ana", "Lopes", 11, "L1");
        player.nationality = vec!["PT".into()];
        league.add_player(&stamp(), player).unwrap();
        league
            .publish_news(
                &stamp(),
                NewsArticle::new("Season opens", "", "", "en"),
                &mut MemoryStore::new(),
            )
            .unwrap();

        let snapshot = Snapshot::from_database(league.database());
        let dir = tempfile::tempdir().unwrap();
        snapshot.write_dir(dir.path()).unwrap();
        let read = Snapshot::read_dir(dir.path()).unwrap();
        assert_eq!(read, snapshot);
        assert_eq!(read.season, "2025-26");
        let team = read.team_by_name("riverside  hawks").unwrap();
        assert_eq!(team.roster.len(), 1);
    }

    #[test]
    fn missing_files_read_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = Snapshot::read_dir(dir.path()).unwrap();
        assert_eq!(snapshot, Snapshot::default());
    }
}
