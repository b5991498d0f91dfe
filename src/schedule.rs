use crate::audit::{AuditAction, EntityKind};
use crate::id::{GameId, RefereeId, TeamId, VenueId};
use crate::storage::{delete_images, ObjectStore};
use crate::{
    AwayHome, Error, Game, GameSide, League, Referee, Result, Stamp, Venue, MAX_REFEREES,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The game form as submitted by an admin.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GameRequest {
    pub home: TeamId,
    pub away: TeamId,
    pub kickoff: DateTime<Utc>,
    pub venue: Option<VenueId>,
    #[serde(default)]
    pub referees: Vec<RefereeId>,
}

impl League {
    pub fn schedule_game(&mut self, stamp: &Stamp, request: GameRequest) -> Result<GameId> {
        if request.home == request.away {
            return Err(Error::invalid("teams", "a team cannot play itself"));
        }
        let side = |team: TeamId| -> Result<GameSide> {
            let team = team.load(&self.database)?;
            Ok(GameSide {
                team_id: team.id,
                name: team.name.clone(),
                logo_url: team.logo_url().map(str::to_string),
            })
        };
        let teams = AwayHome {
            away: side(request.away)?,
            home: side(request.home)?,
        };
        if let Some(venue) = request.venue {
            venue.load(&self.database)?;
        }
        self.check_referees(&request.referees)?;

        let mut game = Game::new(request.kickoff, teams);
        game.venue = request.venue;
        game.referees = request.referees;
        let id = game.id;
        let summary = format!(
            "scheduled {} vs {} at {}",
            game.teams.home.name, game.teams.away.name, game.kickoff
        );
        self.database.games.insert(id, game);
        self.audit(stamp, AuditAction::Create, EntityKind::Game, id, summary);
        Ok(id)
    }

    /// Moves a game that has not been played yet.
    pub fn reschedule_game(
        &mut self,
        stamp: &Stamp,
        id: GameId,
        kickoff: DateTime<Utc>,
        venue: Option<VenueId>,
    ) -> Result<()> {
        if let Some(venue) = venue {
            venue.load(&self.database)?;
        }
        let game = id.load_mut(&mut self.database)?;
        if game.is_completed() {
            return Err(Error::conflict(format!("game {} has already been played", id)));
        }
        game.kickoff = kickoff;
        game.venue = venue;
        let summary = format!("moved game to {}", kickoff);
        self.audit(stamp, AuditAction::Update, EntityKind::Game, id, summary);
        Ok(())
    }

    pub fn assign_referees(
        &mut self,
        stamp: &Stamp,
        id: GameId,
        referees: Vec<RefereeId>,
    ) -> Result<()> {
        self.check_referees(&referees)?;
        let game = id.load_mut(&mut self.database)?;
        let summary = format!("assigned {} referees", referees.len());
        game.referees = referees;
        self.audit(stamp, AuditAction::Update, EntityKind::Game, id, summary);
        Ok(())
    }

    /// Deletes a game that has not been played. Played games are part of every team's totals
    /// and every player's averages, so they stay.
    pub fn delete_game(&mut self, stamp: &Stamp, id: GameId) -> Result<()> {
        if id.load(&self.database)?.is_completed() {
            return Err(Error::conflict(format!(
                "game {} has a recorded result and cannot be deleted",
                id
            )));
        }
        self.database.games.remove(&id);
        self.audit(stamp, AuditAction::Delete, EntityKind::Game, id, "deleted game");
        Ok(())
    }

    fn check_referees(&self, referees: &[RefereeId]) -> Result<()> {
        if referees.len() > MAX_REFEREES {
            return Err(Error::invalid(
                "referees",
                format!("at most {} referees can be assigned", MAX_REFEREES),
            ));
        }
        let mut seen = BTreeSet::new();
        for referee in referees {
            if !seen.insert(*referee) {
                return Err(Error::invalid(
                    "referees",
                    format!("{} is assigned twice", referee.load(&self.database)?.name),
                ));
            }
            referee.load(&self.database)?;
        }
        Ok(())
    }

    pub fn add_referee(&mut self, stamp: &Stamp, referee: Referee) -> Result<RefereeId> {
        if referee.id.is_nil() {
            return Err(Error::invalid("id", "referee id must be set"));
        }
        if referee.name.trim().is_empty() {
            return Err(Error::invalid("name", "referee name is required"));
        }
        let id = referee.id;
        if self.database.referees.contains_key(&id) {
            return Err(Error::conflict(format!("referee {} already exists", id)));
        }
        let summary = format!("added referee {}", referee.name);
        self.database.referees.insert(id, referee);
        self.audit(stamp, AuditAction::Create, EntityKind::Referee, id, summary);
        Ok(id)
    }

    pub fn update_referee(&mut self, stamp: &Stamp, referee: Referee) -> Result<()> {
        if referee.name.trim().is_empty() {
            return Err(Error::invalid("name", "referee name is required"));
        }
        let current = referee.id.load_mut(&mut self.database)?;
        let summary = format!("updated referee {}", referee.name);
        *current = referee;
        let id = current.id;
        self.audit(stamp, AuditAction::Update, EntityKind::Referee, id, summary);
        Ok(())
    }

    pub fn delete_referee<S>(&mut self, stamp: &Stamp, id: RefereeId, store: &mut S) -> Result<()>
    where
        S: ObjectStore + ?Sized,
    {
        let referee = id.load(&self.database)?;
        if let Some(game) = self.database.games.values().find(|g| g.referees.contains(&id)) {
            return Err(Error::conflict(format!(
                "{} is assigned to game {}",
                referee.name, game.id
            )));
        }
        delete_images(store, referee.photo.iter())?;
        if let Some(referee) = self.database.referees.remove(&id) {
            let summary = format!("deleted referee {}", referee.name);
            self.audit(stamp, AuditAction::Delete, EntityKind::Referee, id, summary);
        }
        Ok(())
    }

    pub fn add_venue(&mut self, stamp: &Stamp, venue: Venue) -> Result<VenueId> {
        if venue.id.is_nil() {
            return Err(Error::invalid("id", "venue id must be set"));
        }
        if venue.name.trim().is_empty() {
            return Err(Error::invalid("name", "venue name is required"));
        }
        let id = venue.id;
        if self.database.venues.contains_key(&id) {
            return Err(Error::conflict(format!("venue {} already exists", id)));
        }
        let summary = format!("added venue {}", venue.name);
        self.database.venues.insert(id, venue);
        self.audit(stamp, AuditAction::Create, EntityKind::Venue, id, summary);
        Ok(id)
    }

    pub fn update_venue(&mut self, stamp: &Stamp, venue: Venue) -> Result<()> {
        if venue.name.trim().is_empty() {
            return Err(Error::invalid("name", "venue name is required"));
        }
        let current = venue.id.load_mut(&mut self.database)?;
        let summary = format!("updated venue {}", venue.name);
        *current = venue;
        let id = current.id;
        self.audit(stamp, AuditAction::Update, EntityKind::Venue, id, summary);
        Ok(())
    }

    pub fn delete_venue(&mut self, stamp: &Stamp, id: VenueId) -> Result<()> {
        let venue = id.load(&self.database)?;
        if let Some(game) = self.database.games.values().find(|g| g.venue == Some(id)) {
            return Err(Error::conflict(format!(
                "{} hosts game {}",
                venue.name, game.id
            )));
        }
        if let Some(venue) = self.database.venues.remove(&id) {
            let summary = format!("deleted venue {}", venue.name);
            self.audit(stamp, AuditAction::Delete, EntityKind::Venue, id, summary);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::GameRequest;
    use crate::test_support::{league_with_teams, stamp};
    use crate::{Error, MemoryStore, Referee, Venue};
    use chrono::{TimeZone, Utc};

    #[test]
    fn schedules_with_denormalized_sides() {
        let (mut league, [a, b]) = league_with_teams();
        let venue = league
            .add_venue(&stamp(), Venue::new("Salle Omnisport", "Riverside"))
            .unwrap();
        let id = league
            .schedule_game(
                &stamp(),
                GameRequest {
                    home: a,
                    away: b,
                    kickoff: Utc.with_ymd_and_hms(2025, 10, 4, 17, 30, 0).unwrap(),
                    venue: Some(venue),
                    referees: Vec::new(),
                },
            )
            .unwrap();
        let game = &league.database().games[&id];
        assert_eq!(game.teams.home.name, league.database().teams[&a].name);
        assert_eq!(game.teams.away.team_id, b);

        assert!(matches!(
            league.delete_venue(&stamp(), venue),
            Err(Error::Conflict(_))
        ));
        league.delete_game(&stamp(), id).unwrap();
        league.delete_venue(&stamp(), venue).unwrap();
    }

    #[test]
    fn referee_rules() {
        let (mut league, [a, b]) = league_with_teams();
        let refs = (0..4)
            .map(|n| {
                league
                    .add_referee(&stamp(), Referee::new(format!("Ref {}", n)))
                    .unwrap()
            })
            .collect::<Vec<_>>();
        let request = |referees| GameRequest {
            home: a,
            away: b,
            kickoff: Utc.with_ymd_and_hms(2025, 10, 4, 17, 30, 0).unwrap(),
            venue: None,
            referees,
        };

        let err = league.schedule_game(&stamp(), request(refs.clone())).unwrap_err();
        assert!(err.is_validation());
        let err = league
            .schedule_game(&stamp(), request(vec![refs[0], refs[0]]))
            .unwrap_err();
        assert!(err.is_validation());
        let game = league
            .schedule_game(&stamp(), request(refs[..3].to_vec()))
            .unwrap();

        let mut store = MemoryStore::new();
        assert!(league.delete_referee(&stamp(), refs[1], &mut store).is_err());
        league.assign_referees(&stamp(), game, vec![refs[3]]).unwrap();
        league.delete_referee(&stamp(), refs[1], &mut store).unwrap();
    }

    #[test]
    fn a_team_cannot_play_itself() {
        let (mut league, [a, _]) = league_with_teams();
        let err = league
            .schedule_game(
                &stamp(),
                GameRequest {
                    home: a,
                    away: a,
                    kickoff: Utc::now(),
                    venue: None,
                    referees: Vec::new(),
                },
            )
            .unwrap_err();
        assert!(err.is_validation());
    }
}
