//! Display-ready data for the public pages, derived from a [`Snapshot`].
//!
//! Everything here is a pure function of the snapshot and the options: running it twice on
//! the same export gives the same output.

use crate::franchise::{builtin_franchises, FranchiseTemplate, LogoResolver, PLACEHOLDER_LOGO};
use crate::id::{GameId, PlayerId, TeamId};
use crate::results::season_totals;
use crate::snapshot::{Snapshot, TeamDocument};
use crate::util::{name_key, per_game};
use crate::{
    routes, AwayHome, CommitteeMember, Game, Gender, NewsArticle, Partner, Player, StaffMember,
    StatTotals, Team, TrafficEntry,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Games show up as recently played from this long after kickoff...
const RECENT_AFTER_MINUTES: i64 = 45;
/// ...until this long after kickoff.
const RECENT_FOR_DAYS: i64 = 7;

#[derive(Debug, Clone)]
pub struct DisplayOptions {
    pub spotlight_size: usize,
    pub logos: LogoResolver,
    pub franchises: Vec<FranchiseTemplate>,
}

impl Default for DisplayOptions {
    fn default() -> DisplayOptions {
        DisplayOptions {
            spotlight_size: 5,
            logos: LogoResolver::default(),
            franchises: builtin_franchises(),
        }
    }
}

impl DisplayOptions {
    /// Options with no bundled teams or logos, only the placeholder.
    pub fn bare() -> DisplayOptions {
        DisplayOptions {
            spotlight_size: 5,
            logos: LogoResolver::new(Vec::<(String, String)>::new(), PLACEHOLDER_LOGO),
            franchises: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TeamBadge {
    /// Unset for franchise templates with no document yet.
    pub team_id: Option<TeamId>,
    pub name: String,
    pub logo: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StandingRow {
    pub rank: usize,
    pub team: TeamBadge,
    pub gender: Gender,
    pub games: u32,
    pub wins: u32,
    pub losses: u32,
    pub total_points: u32,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ByGender<T> {
    pub men: T,
    pub women: T,
}

impl<T> ByGender<T> {
    fn build(mut op: impl FnMut(Gender) -> T) -> ByGender<T> {
        ByGender {
            men: op(Gender::Men),
            women: op(Gender::Women),
        }
    }
}

/// A team known to the pages: either a document from the snapshot or a franchise template
/// that has no document yet.
struct KnownTeam<'a> {
    id: Option<TeamId>,
    name: &'a str,
    gender: Gender,
    stored_logo: Option<&'a str>,
}

fn known_teams<'a>(snapshot: &'a Snapshot, options: &'a DisplayOptions) -> Vec<KnownTeam<'a>> {
    let mut teams = snapshot
        .teams
        .iter()
        .map(|doc| KnownTeam {
            id: Some(doc.team.id),
            name: &doc.team.name,
            gender: doc.team.gender,
            stored_logo: doc.team.logo_url(),
        })
        .collect::<Vec<_>>();
    let names = teams.iter().map(|t| name_key(t.name)).collect::<BTreeSet<_>>();
    teams.extend(
        options
            .franchises
            .iter()
            .filter(|template| !names.contains(&name_key(&template.name)))
            .map(|template| KnownTeam {
                id: None,
                name: &template.name,
                gender: template.gender,
                stored_logo: None,
            }),
    );
    teams
}

fn badge(
    options: &DisplayOptions,
    id: Option<TeamId>,
    name: &str,
    stored: Option<&str>,
) -> TeamBadge {
    TeamBadge {
        team_id: id,
        name: name.to_string(),
        logo: options.logos.resolve(name, stored),
        path: routes::team_path(name),
    }
}

/// One row per known team, ranked by total points, then wins, then name. Totals are replayed
/// from the snapshot's completed games, so teams without games still get a zero row.
pub fn standings(
    snapshot: &Snapshot,
    options: &DisplayOptions,
    gender: Option<Gender>,
) -> Vec<StandingRow> {
    #[derive(Default)]
    struct Tally {
        games: u32,
        wins: u32,
        losses: u32,
        points: u32,
    }

    let mut tallies = BTreeMap::<TeamId, Tally>::new();
    for result in snapshot.games.iter().filter_map(|g| g.result.as_ref()) {
        let winner = tallies.entry(result.winner).or_default();
        winner.games += 1;
        winner.wins += 1;
        winner.points += u32::from(result.winner_score);
        let loser = tallies.entry(result.loser).or_default();
        loser.games += 1;
        loser.losses += 1;
        loser.points += u32::from(result.loser_score);
    }

    let mut rows = known_teams(snapshot, options)
        .into_iter()
        .filter(|team| gender.map_or(true, |g| g == team.gender))
        .map(|team| {
            let tally = team.id.and_then(|id| tallies.get(&id));
            StandingRow {
                rank: 0,
                team: badge(options, team.id, team.name, team.stored_logo),
                gender: team.gender,
                games: tally.map_or(0, |t| t.games),
                wins: tally.map_or(0, |t| t.wins),
                losses: tally.map_or(0, |t| t.losses),
                total_points: tally.map_or(0, |t| t.points),
            }
        })
        .collect::<Vec<_>>();
    rows.sort_by(|a, b| {
        b.total_points
            .cmp(&a.total_points)
            .then(b.wins.cmp(&a.wins))
            .then_with(|| a.team.name.cmp(&b.team.name))
    });
    for (idx, row) in rows.iter_mut().enumerate() {
        row.rank = idx + 1;
    }
    debug!(rows = rows.len(), ?gender, "derived standings");
    rows
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScheduleSide {
    pub team: TeamBadge,
    pub score: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScheduleRow {
    pub game_id: GameId,
    pub kickoff: DateTime<Utc>,
    pub gender: Option<Gender>,
    pub home: ScheduleSide,
    pub away: ScheduleSide,
}

impl ScheduleRow {
    pub fn is_completed(&self) -> bool {
        self.home.score.is_some() && self.away.score.is_some()
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Schedule {
    pub completed: Vec<ScheduleRow>,
    pub upcoming: Vec<ScheduleRow>,
}

fn team_index(snapshot: &Snapshot) -> BTreeMap<TeamId, &Team> {
    snapshot
        .teams
        .iter()
        .map(|doc| (doc.team.id, &doc.team))
        .collect()
}

fn schedule_row(
    teams: &BTreeMap<TeamId, &Team>,
    options: &DisplayOptions,
    game: &Game,
) -> ScheduleRow {
    let scores = game.scores().map_or(
        AwayHome {
            away: None,
            home: None,
        },
        |scores| scores.map(Some),
    );
    let side = |side: &crate::GameSide, score: Option<u16>| {
        // Prefer the team's current logo; the copy on the game dates from scheduling.
        let stored = teams
            .get(&side.team_id)
            .and_then(|team| team.logo_url())
            .or(side.logo_url.as_deref());
        ScheduleSide {
            team: badge(options, Some(side.team_id), &side.name, stored),
            score,
        }
    };
    ScheduleRow {
        game_id: game.id,
        kickoff: game.kickoff,
        gender: teams.get(&game.teams.home.team_id).map(|team| team.gender),
        home: side(&game.teams.home, scores.home),
        away: side(&game.teams.away, scores.away),
    }
}

/// Splits the snapshot's games into results and fixtures, each in kickoff order.
pub fn schedule(snapshot: &Snapshot, options: &DisplayOptions) -> Schedule {
    let teams = team_index(snapshot);
    let mut schedule = Schedule::default();
    for game in &snapshot.games {
        let row = schedule_row(&teams, options, game);
        if row.is_completed() {
            schedule.completed.push(row);
        } else {
            schedule.upcoming.push(row);
        }
    }
    schedule.completed.sort_by_key(|row| (row.kickoff, row.game_id));
    schedule.upcoming.sort_by_key(|row| (row.kickoff, row.game_id));
    debug!(
        completed = schedule.completed.len(),
        upcoming = schedule.upcoming.len(),
        "derived schedule"
    );
    schedule
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RecentGame {
    #[serde(flatten)]
    pub row: ScheduleRow,
    pub awaiting_result: bool,
}

/// Games that kicked off between 45 minutes and 7 days before `now`, most recent first. This
/// is what the stats tab offers for result entry; nothing about it is stored.
pub fn recently_played(
    snapshot: &Snapshot,
    options: &DisplayOptions,
    now: DateTime<Utc>,
) -> Vec<RecentGame> {
    let earliest = now - Duration::days(RECENT_FOR_DAYS);
    let latest = now - Duration::minutes(RECENT_AFTER_MINUTES);
    let teams = team_index(snapshot);
    let mut games = snapshot
        .games
        .iter()
        .filter(|game| game.kickoff >= earliest && game.kickoff <= latest)
        .map(|game| RecentGame {
            row: schedule_row(&teams, options, game),
            awaiting_result: !game.is_completed(),
        })
        .collect::<Vec<_>>();
    games.sort_by_key(|game| (Reverse(game.row.kickoff), game.row.game_id));
    games
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct PerGame {
    pub points: f64,
    pub rebounds: f64,
    pub assists: f64,
    pub steals: f64,
    pub blocks: f64,
}

impl PerGame {
    fn from_totals(totals: &StatTotals) -> PerGame {
        PerGame {
            points: per_game(totals.points, totals.games),
            rebounds: per_game(totals.rebounds, totals.games),
            assists: per_game(totals.assists, totals.games),
            steals: per_game(totals.steals, totals.games),
            blocks: per_game(totals.blocks, totals.games),
        }
    }

    /// The weighted composite spotlight players are ranked by.
    pub fn spotlight_score(&self) -> f64 {
        self.points
            + 0.75 * self.assists
            + 0.6 * self.rebounds
            + 0.8 * self.steals
            + 0.5 * self.blocks
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlayerAggregate {
    pub player_id: PlayerId,
    pub name: String,
    pub number: u8,
    pub team: TeamBadge,
    pub gender: Gender,
    pub totals: StatTotals,
    pub per_game: PerGame,
    pub score: f64,
    pub headshot: Option<String>,
    pub path: String,
}

/// Season totals for every rostered player, replayed from the box scores of all completed
/// games. Lines for players no longer on any roster are left out.
pub fn season_aggregates(snapshot: &Snapshot, options: &DisplayOptions) -> Vec<PlayerAggregate> {
    let totals = season_totals(&snapshot.games);
    snapshot
        .teams
        .iter()
        .flat_map(|doc| doc.roster.iter().map(move |player| (doc, player)))
        .map(|(doc, player)| {
            let totals = totals.get(&player.id).copied().unwrap_or_default();
            let per_game = PerGame::from_totals(&totals);
            PlayerAggregate {
                player_id: player.id,
                name: player.name(),
                number: player.number,
                team: badge(options, Some(doc.team.id), &doc.team.name, doc.team.logo_url()),
                gender: doc.team.gender,
                totals,
                score: per_game.spotlight_score(),
                per_game,
                headshot: player.headshot.as_ref().map(|h| h.url.clone()),
                path: routes::player_path(&doc.team.name, player.number),
            }
        })
        .collect()
}

/// The top players of each gender by spotlight score. Ties go to points per game, then name.
pub fn spotlight(snapshot: &Snapshot, options: &DisplayOptions) -> ByGender<Vec<PlayerAggregate>> {
    let mut ranked = season_aggregates(snapshot, options)
        .into_iter()
        .filter(|aggregate| aggregate.totals.games > 0)
        .collect::<Vec<_>>();
    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(b.per_game.points.total_cmp(&a.per_game.points))
            .then_with(|| a.name.cmp(&b.name))
            .then(a.player_id.cmp(&b.player_id))
    });
    ByGender::build(|gender| {
        ranked
            .iter()
            .filter(|aggregate| aggregate.gender == gender)
            .take(options.spotlight_size)
            .cloned()
            .collect()
    })
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GameLogRow {
    pub game_id: GameId,
    pub kickoff: DateTime<Utc>,
    pub opponent: String,
    pub home: bool,
    pub won: bool,
    pub points: u32,
    pub rebounds: u32,
    pub assists: u16,
    pub steals: u16,
    pub blocks: u16,
    pub minutes: u16,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlayerProfile {
    pub player: Player,
    pub team: TeamBadge,
    pub game_log: Vec<GameLogRow>,
}

/// Looks up a player page by team name and jersey number.
pub fn player_profile(
    snapshot: &Snapshot,
    options: &DisplayOptions,
    team_name: &str,
    number: u8,
) -> Option<PlayerProfile> {
    let doc = snapshot.team_by_name(team_name)?;
    let player = doc.roster.iter().find(|p| p.number == number)?;

    let mut game_log = snapshot
        .games
        .iter()
        .filter_map(|game| {
            let line = game.box_score_for(player.id)?;
            let result = game.result.as_ref()?;
            let side = game.side_of(line.team_id)?;
            let opponent = match side {
                crate::TeamSelect::Home => &game.teams.away.name,
                crate::TeamSelect::Away => &game.teams.home.name,
            };
            Some(GameLogRow {
                game_id: game.id,
                kickoff: game.kickoff,
                opponent: opponent.clone(),
                home: side == crate::TeamSelect::Home,
                won: result.winner == line.team_id,
                points: line.points(),
                rebounds: line.rebounds(),
                assists: line.assists,
                steals: line.steals,
                blocks: line.blocks,
                minutes: line.minutes,
            })
        })
        .collect::<Vec<_>>();
    game_log.sort_by_key(|row| row.kickoff);

    Some(PlayerProfile {
        player: player.clone(),
        team: badge(options, Some(doc.team.id), &doc.team.name, doc.team.logo_url()),
        game_log,
    })
}

/// Published articles, newest first.
pub fn news_feed(snapshot: &Snapshot) -> Vec<NewsArticle> {
    let mut feed = snapshot
        .news
        .iter()
        .filter(|article| article.is_published())
        .cloned()
        .collect::<Vec<_>>();
    feed.sort_by(|a, b| {
        b.published_at
            .cmp(&a.published_at)
            .then_with(|| a.title.cmp(&b.title))
    });
    feed
}

pub fn partners(snapshot: &Snapshot) -> Vec<Partner> {
    let mut partners = snapshot.partners.clone();
    partners.sort_by(|a, b| {
        (a.tier, a.order)
            .cmp(&(b.tier, b.order))
            .then_with(|| a.name.cmp(&b.name))
    });
    partners
}

pub fn committee(snapshot: &Snapshot) -> Vec<CommitteeMember> {
    let mut committee = snapshot.committee.clone();
    committee.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));
    committee
}

/// Roster moves, newest first.
pub fn traffic(snapshot: &Snapshot) -> Vec<TrafficEntry> {
    let mut traffic = snapshot.traffic.clone();
    traffic.sort_by_key(|entry| (Reverse(entry.at), entry.id));
    traffic
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TeamPage {
    pub team: TeamBadge,
    pub city: String,
    pub gender: Gender,
    pub roster: Vec<Player>,
    pub staff: Vec<StaffMember>,
    /// Roster moves in or out of this team, newest first.
    pub traffic: Vec<TrafficEntry>,
}

fn team_page(snapshot: &Snapshot, options: &DisplayOptions, doc: &TeamDocument) -> TeamPage {
    let mut roster = doc.roster.clone();
    roster.sort_by_key(|p| p.number);
    let mut staff = doc.staff.clone();
    staff.sort_by(|a, b| a.role.cmp(&b.role).then_with(|| a.name.cmp(&b.name)));
    TeamPage {
        team: badge(options, Some(doc.team.id), &doc.team.name, doc.team.logo_url()),
        city: doc.team.city.clone(),
        gender: doc.team.gender,
        roster,
        staff,
        traffic: traffic(snapshot)
            .into_iter()
            .filter(|entry| entry.involves(doc.team.id))
            .collect(),
    }
}

/// Everything the public pages render, in one document.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SiteData {
    pub season: String,
    pub standings: ByGender<Vec<StandingRow>>,
    pub schedule: Schedule,
    pub spotlight: ByGender<Vec<PlayerAggregate>>,
    pub teams: Vec<TeamPage>,
    pub news: Vec<NewsArticle>,
    pub partners: Vec<Partner>,
    pub committee: Vec<CommitteeMember>,
    pub traffic: Vec<TrafficEntry>,
}

impl SiteData {
    pub fn build(snapshot: &Snapshot, options: &DisplayOptions) -> SiteData {
        let mut teams = snapshot
            .teams
            .iter()
            .map(|doc| team_page(snapshot, options, doc))
            .collect::<Vec<_>>();
        teams.sort_by(|a, b| a.team.name.cmp(&b.team.name));

        SiteData {
            season: snapshot.season.clone(),
            standings: ByGender::build(|gender| standings(snapshot, options, Some(gender))),
            schedule: schedule(snapshot, options),
            spotlight: spotlight(snapshot, options),
            teams,
            news: news_feed(snapshot),
            partners: partners(snapshot),
            committee: committee(snapshot),
            traffic: traffic(snapshot),
        }
    }
}
