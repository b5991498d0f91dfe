use crate::id::{
    AdminUserId, CommitteeMemberId, GameId, NewsId, PartnerId, PlayerId, RefereeId, StaffId,
    TeamId, VenueId,
};
use crate::{
    AdminUser, AuditLog, CommitteeMember, Game, NewsArticle, Partner, Player, Referee, StaffMember,
    StaffRole, Standing, Team, TrafficEntry, Venue, MAX_REFEREES,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct Database {
    /// Season that recorded results count towards, e.g. "2025-26".
    #[serde(default)]
    pub season: String,

    pub teams: BTreeMap<TeamId, Team>,
    /// Every team's roster; `Player::team_id` says which.
    pub players: BTreeMap<PlayerId, Player>,
    /// Every team's coaching staff; `StaffMember::team_id` says which.
    #[serde(default)]
    pub staff: BTreeMap<StaffId, StaffMember>,
    pub games: BTreeMap<GameId, Game>,
    #[serde(default)]
    pub referees: BTreeMap<RefereeId, Referee>,
    #[serde(default)]
    pub venues: BTreeMap<VenueId, Venue>,
    #[serde(default)]
    pub partners: BTreeMap<PartnerId, Partner>,
    #[serde(default)]
    pub committee: BTreeMap<CommitteeMemberId, CommitteeMember>,
    #[serde(default)]
    pub news: BTreeMap<NewsId, NewsArticle>,
    #[serde(default)]
    pub admin_users: BTreeMap<AdminUserId, AdminUser>,

    #[serde(default)]
    pub standings: Vec<Standing>,
    #[serde(default)]
    pub traffic: Vec<TrafficEntry>,
    #[serde(default)]
    pub audit_logs: Vec<AuditLog>,
}

impl Database {
    pub fn roster(&self, team: TeamId) -> impl Iterator<Item = &Player> + '_ {
        self.players.values().filter(move |p| p.team_id == team)
    }

    pub fn coaching_staff(&self, team: TeamId) -> impl Iterator<Item = &StaffMember> + '_ {
        self.staff.values().filter(move |s| s.team_id == team)
    }

    pub fn player_by_number(&self, team: TeamId, number: u8) -> Option<&Player> {
        self.roster(team).find(|p| p.number == number)
    }

    pub fn team_by_name(&self, name: &str) -> Option<&Team> {
        let key = crate::util::name_key(name);
        self.teams
            .values()
            .find(|team| crate::util::name_key(&team.name) == key)
    }

    pub fn standing(&self, season: &str, team: TeamId) -> Option<&Standing> {
        self.standings.iter().find(|s| s.is_for(season, team))
    }

    // As in any document store, nothing stops a buggy writer from leaving references dangling.
    // Instead of guarding every write path, this checks the invariants the rest of the crate
    // relies on. It runs:
    //
    // 1. In the `Deserialize` implementation of `League`
    // 2. When debug assertions are enabled, after every admin operation
    pub(crate) fn check_consistency(&self) -> Result<(), String> {
        let mut problems = Vec::new();

        macro_rules! nil_check {
            ($iter:expr) => {
                for obj in $iter {
                    if obj.id.is_nil() {
                        problems.push(format!("- nil uuid: {:?}", obj))
                    }
                }
            };
        }
        nil_check!(self.teams.values());
        nil_check!(self.players.values());
        nil_check!(self.staff.values());
        nil_check!(self.games.values());
        nil_check!(self.referees.values());
        nil_check!(self.venues.values());
        nil_check!(self.partners.values());
        nil_check!(self.committee.values());
        nil_check!(self.news.values());
        nil_check!(self.admin_users.values());

        macro_rules! key_check {
            ($iter:expr, $kind:expr) => {
                for (key, obj) in $iter {
                    if obj.id != *key {
                        problems.push(format!("- {} {} is keyed with {}", $kind, obj.id, key));
                    }
                }
            };
        }
        key_check!(&self.teams, "team");
        key_check!(&self.players, "player");
        key_check!(&self.staff, "staff member");
        key_check!(&self.games, "game");
        key_check!(&self.referees, "referee");
        key_check!(&self.venues, "venue");
        key_check!(&self.partners, "partner");
        key_check!(&self.committee, "committee member");
        key_check!(&self.news, "news article");
        key_check!(&self.admin_users, "admin user");

        let mut numbers = BTreeSet::new();
        for player in self.players.values() {
            if !self.teams.contains_key(&player.team_id) {
                problems.push(format!(
                    "- player {} belongs to missing team {}",
                    player.id, player.team_id
                ));
            }
            if !numbers.insert((player.team_id, player.number)) {
                problems.push(format!(
                    "- team {} has more than one player wearing #{}",
                    player.team_id, player.number
                ));
            }
        }

        let mut held = BTreeMap::<(TeamId, StaffRole), usize>::new();
        for member in self.staff.values() {
            if !self.teams.contains_key(&member.team_id) {
                problems.push(format!(
                    "- staff member {} belongs to missing team {}",
                    member.id, member.team_id
                ));
            }
            *held.entry((member.team_id, member.role)).or_default() += 1;
        }
        for ((team, role), count) in held {
            if role.capacity().map_or(false, |cap| count > cap) {
                problems.push(format!("- team {} has {} staff as {}", team, count, role));
            }
        }

        for game in self.games.values() {
            self.check_game(game, &mut problems);
        }

        let mut seen = BTreeSet::new();
        for standing in &self.standings {
            if !seen.insert((standing.season.as_str(), standing.team_id)) {
                problems.push(format!(
                    "- duplicate {} standing for team {}",
                    standing.season, standing.team_id
                ));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems.join("\n"))
        }
    }

    fn check_game(&self, game: &Game, problems: &mut Vec<String>) {
        let (home, away) = (game.teams.home.team_id, game.teams.away.team_id);
        if home == away {
            problems.push(format!("- game {} has the same team on both sides", game.id));
        }
        // Completed games outlive deleted teams; their names were copied at scheduling time.
        if !game.is_completed() {
            for team in [home, away] {
                if !self.teams.contains_key(&team) {
                    problems.push(format!("- game {} references missing team {}", game.id, team));
                }
            }
        }
        if let Some(venue) = game.venue {
            if !self.venues.contains_key(&venue) {
                problems.push(format!("- game {} references missing venue {}", game.id, venue));
            }
        }
        if game.referees.len() > MAX_REFEREES {
            problems.push(format!("- game {} has more than {} referees", game.id, MAX_REFEREES));
        }
        let mut referees = BTreeSet::new();
        for referee in &game.referees {
            if !referees.insert(referee) {
                problems.push(format!("- game {} lists referee {} twice", game.id, referee));
            }
            if !self.referees.contains_key(referee) {
                problems.push(format!(
                    "- game {} references missing referee {}",
                    game.id, referee
                ));
            }
        }
        if let Some(result) = &game.result {
            let sides = BTreeSet::from([home, away]);
            if result.winner == result.loser
                || !sides.contains(&result.winner)
                || !sides.contains(&result.loser)
            {
                problems.push(format!("- game {} result names the wrong teams", game.id));
            }
            if result.winner_score <= result.loser_score {
                problems.push(format!(
                    "- game {} winner scored {} against {}",
                    game.id, result.winner_score, result.loser_score
                ));
            }
            for line in &result.box_score {
                if !sides.contains(&line.team_id) {
                    problems.push(format!(
                        "- game {} box score line for player {} names team {}",
                        game.id, line.player_id, line.team_id
                    ));
                }
            }
        }
    }
}
