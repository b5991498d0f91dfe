use crate::audit::{AuditAction, EntityKind, TrafficKind};
use crate::id::{PlayerId, StaffId, TeamId};
use crate::storage::{delete_images, delete_replaced, ObjectStore};
use crate::util::{name_key, slug};
use crate::{
    Error, League, Player, Result, StaffMember, StaffRole, Stamp, Team, TrafficEntry,
};
use tracing::info;

/// What a team deletion removed along with the team.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TeamRemoval {
    pub players: usize,
    pub staff: usize,
    pub images: usize,
}

impl League {
    pub fn add_team(&mut self, stamp: &Stamp, team: Team) -> Result<TeamId> {
        if team.id.is_nil() {
            return Err(Error::invalid("id", "team id must be set"));
        }
        if self.database.teams.contains_key(&team.id) {
            return Err(Error::conflict(format!("team {} already exists", team.id)));
        }
        self.check_team_name(&team)?;

        let id = team.id;
        let summary = format!("added team {}", team.name);
        self.database.teams.insert(id, team);
        self.audit(stamp, AuditAction::Create, EntityKind::Team, id, summary);
        Ok(id)
    }

    /// Replaces a team's editable fields. Win/loss totals only move when results are recorded.
    /// A replaced logo is deleted from `store`.
    pub fn update_team<S>(&mut self, stamp: &Stamp, team: Team, store: &mut S) -> Result<()>
    where
        S: ObjectStore + ?Sized,
    {
        self.check_team_name(&team)?;
        let current = team.id.load(&self.database)?;
        delete_replaced(store, current.logo.as_ref(), team.logo.as_ref())?;
        let current = team.id.load_mut(&mut self.database)?;
        let summary = format!("updated team {}", team.name);
        *current = Team {
            wins: current.wins,
            losses: current.losses,
            total_points: current.total_points,
            ..team
        };
        let id = current.id;
        self.audit(stamp, AuditAction::Update, EntityKind::Team, id, summary);
        Ok(())
    }

    /// Deletes a team with its roster, coaching staff, standings and every stored image
    /// belonging to them. Teams with games still to play cannot be deleted.
    pub fn delete_team<S>(&mut self, stamp: &Stamp, id: TeamId, store: &mut S) -> Result<TeamRemoval>
    where
        S: ObjectStore + ?Sized,
    {
        let team = id.load(&self.database)?;
        if let Some(game) = self
            .database
            .games
            .values()
            .find(|game| !game.is_completed() && game.involves(id))
        {
            return Err(Error::conflict(format!(
                "{} still has a scheduled game ({})",
                team.name, game.id
            )));
        }

        let players = self.database.roster(id).map(|p| p.id).collect::<Vec<_>>();
        let staff = self.database.coaching_staff(id).map(|s| s.id).collect::<Vec<_>>();
        let images = team
            .logo
            .iter()
            .chain(self.database.roster(id).filter_map(|p| p.headshot.as_ref()))
            .chain(
                self.database
                    .coaching_staff(id)
                    .filter_map(|s| s.photo.as_ref()),
            );
        let images = delete_images(store, images)?;

        for player in &players {
            self.database.players.remove(player);
        }
        for member in &staff {
            self.database.staff.remove(member);
        }
        self.database.standings.retain(|s| s.team_id != id);
        let team = self
            .database
            .teams
            .remove(&id)
            .ok_or_else(|| Error::not_found("team", id))?;

        let removal = TeamRemoval {
            players: players.len(),
            staff: staff.len(),
            images,
        };
        info!(team = %team.name, ?removal, "deleted team");
        self.audit(
            stamp,
            AuditAction::Delete,
            EntityKind::Team,
            id,
            format!("deleted team {}", team.name),
        );
        Ok(removal)
    }

    fn check_team_name(&self, team: &Team) -> Result<()> {
        if team.name.trim().is_empty() {
            return Err(Error::invalid("name", "team name is required"));
        }
        // Team pages are addressed by slug, so names must differ in it too.
        let path = slug(&team.name);
        if path.is_empty() {
            return Err(Error::invalid(
                "name",
                format!("{:?} needs at least one ASCII letter or digit", team.name),
            ));
        }
        let key = name_key(&team.name);
        if let Some(other) = self.database.teams.values().find(|other| {
            other.id != team.id && (name_key(&other.name) == key || slug(&other.name) == path)
        }) {
            return Err(Error::invalid(
                "name",
                format!("{} clashes with existing team {}", team.name, other.name),
            ));
        }
        Ok(())
    }

    pub fn add_player(&mut self, stamp: &Stamp, player: Player) -> Result<PlayerId> {
        if player.id.is_nil() {
            return Err(Error::invalid("id", "player id must be set"));
        }
        if self.database.players.contains_key(&player.id) {
            return Err(Error::conflict(format!("player {} already exists", player.id)));
        }
        let team = player.team_id.load(&self.database)?.name.clone();
        player.validate()?;
        self.check_number_free(player.team_id, player.number, None)?;

        let id = player.id;
        let name = player.name();
        let kind = TrafficKind::PlayerAdded {
            team: player.team_id,
        };
        self.database.players.insert(id, player);
        self.database
            .traffic
            .push(TrafficEntry::new(stamp, kind, id, name.clone()));
        self.audit(
            stamp,
            AuditAction::Create,
            EntityKind::Player,
            id,
            format!("added {} to {}", name, team),
        );
        Ok(id)
    }

    /// Replaces a player's editable fields. The license is fixed at creation, the team only
    /// changes through [`League::transfer_player`] and season stats only through recorded
    /// results. A replaced headshot is deleted from `store`.
    pub fn update_player<S>(&mut self, stamp: &Stamp, player: Player, store: &mut S) -> Result<()>
    where
        S: ObjectStore + ?Sized,
    {
        let current = player.id.load(&self.database)?;
        if current.license != player.license {
            return Err(Error::invalid("license", "a player's license cannot change"));
        }
        if current.team_id != player.team_id {
            return Err(Error::invalid("team", "use a transfer to move a player"));
        }
        player.validate()?;
        self.check_number_free(player.team_id, player.number, Some(player.id))?;
        delete_replaced(store, current.headshot.as_ref(), player.headshot.as_ref())?;

        let current = player.id.load_mut(&mut self.database)?;
        *current = Player {
            stats: current.stats.clone(),
            games_played: current.games_played,
            ..player
        };
        let (id, summary) = (current.id, format!("updated {}", current.name()));
        self.audit(stamp, AuditAction::Update, EntityKind::Player, id, summary);
        Ok(())
    }

    /// Deletes a player and their headshot. Box scores already recorded keep their lines.
    pub fn delete_player<S>(&mut self, stamp: &Stamp, id: PlayerId, store: &mut S) -> Result<()>
    where
        S: ObjectStore + ?Sized,
    {
        let player = id.load(&self.database)?;
        delete_images(store, player.headshot.iter())?;

        let player = self
            .database
            .players
            .remove(&id)
            .ok_or_else(|| Error::not_found("player", id))?;
        let name = player.name();
        let kind = TrafficKind::PlayerDeleted {
            team: player.team_id,
        };
        self.database
            .traffic
            .push(TrafficEntry::new(stamp, kind, id, name.clone()));
        self.audit(
            stamp,
            AuditAction::Delete,
            EntityKind::Player,
            id,
            format!("deleted {}", name),
        );
        Ok(())
    }

    /// Moves a player to another team, optionally under a new jersey number. Season stats
    /// travel with the player.
    pub fn transfer_player(
        &mut self,
        stamp: &Stamp,
        id: PlayerId,
        to: TeamId,
        number: Option<u8>,
    ) -> Result<()> {
        let player = id.load(&self.database)?;
        let from = player.team_id;
        if from == to {
            return Err(Error::invalid("team", "player is already on that team"));
        }
        let destination = to.load(&self.database)?.name.clone();
        let number = number.unwrap_or(player.number);
        self.check_number_free(to, number, Some(id))?;

        let player = id.load_mut(&mut self.database)?;
        player.team_id = to;
        player.number = number;
        let name = player.name();
        let kind = TrafficKind::PlayerTransferred { from, to };
        self.database
            .traffic
            .push(TrafficEntry::new(stamp, kind, id, name.clone()));
        self.audit(
            stamp,
            AuditAction::Update,
            EntityKind::Player,
            id,
            format!("transferred {} to {}", name, destination),
        );
        Ok(())
    }

    fn check_number_free(&self, team: TeamId, number: u8, except: Option<PlayerId>) -> Result<()> {
        match self.database.player_by_number(team, number) {
            Some(holder) if Some(holder.id) != except => Err(Error::invalid(
                "number",
                format!("#{} is already worn by {}", number, holder.name()),
            )),
            _ => Ok(()),
        }
    }

    pub fn add_staff(&mut self, stamp: &Stamp, member: StaffMember) -> Result<StaffId> {
        if member.id.is_nil() {
            return Err(Error::invalid("id", "staff id must be set"));
        }
        if self.database.staff.contains_key(&member.id) {
            return Err(Error::conflict(format!("staff member {} already exists", member.id)));
        }
        if member.name.trim().is_empty() {
            return Err(Error::invalid("name", "staff name is required"));
        }
        member.team_id.load(&self.database)?;
        self.check_role_open(member.team_id, member.role, None)?;

        let id = member.id;
        let summary = format!("added {} as {}", member.name, member.role);
        self.database.staff.insert(id, member);
        self.audit(stamp, AuditAction::Create, EntityKind::Staff, id, summary);
        Ok(id)
    }

    pub fn update_staff_role(&mut self, stamp: &Stamp, id: StaffId, role: StaffRole) -> Result<()> {
        let team = id.load(&self.database)?.team_id;
        self.check_role_open(team, role, Some(id))?;
        let member = id.load_mut(&mut self.database)?;
        member.role = role;
        let summary = format!("{} is now {}", member.name, role);
        self.audit(stamp, AuditAction::Update, EntityKind::Staff, id, summary);
        Ok(())
    }

    pub fn delete_staff<S>(&mut self, stamp: &Stamp, id: StaffId, store: &mut S) -> Result<()>
    where
        S: ObjectStore + ?Sized,
    {
        delete_images(store, id.load(&self.database)?.photo.iter())?;
        let member = self
            .database
            .staff
            .remove(&id)
            .ok_or_else(|| Error::not_found("staff member", id))?;
        self.audit(
            stamp,
            AuditAction::Delete,
            EntityKind::Staff,
            id,
            format!("removed {} from staff", member.name),
        );
        Ok(())
    }

    fn check_role_open(&self, team: TeamId, role: StaffRole, except: Option<StaffId>) -> Result<()> {
        let Some(capacity) = role.capacity() else {
            return Ok(());
        };
        let held = self
            .database
            .coaching_staff(team)
            .filter(|s| s.role == role && Some(s.id) != except)
            .count();
        if held >= capacity {
            return Err(Error::invalid(
                "role",
                format!("the team already has {} {}", held, role),
            ));
        }
        Ok(())
    }
}
