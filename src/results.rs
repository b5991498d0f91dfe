//! Recording game results and everything derived from them.
//!
//! A result touches the game, the roster entry of every player with a box score line, both
//! teams and both teams' standings. The document store this data comes from offers no
//! transaction spanning those writes, so here every write is computed against the unchanged
//! database first and only applied once all of them are known to succeed. A rejected result
//! leaves the database exactly as it was.

use crate::audit::{AuditAction, EntityKind};
use crate::id::{GameId, PlayerId, TeamId};
use crate::{
    BoxScoreEntry, Database, Error, Game, GameResult, League, Result, SeasonAverages, Stamp,
    Standing, StatTotals,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// The stats form as submitted by an admin.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResultSubmission {
    pub game: GameId,
    pub winner: TeamId,
    pub loser: TeamId,
    pub winner_score: u16,
    pub loser_score: u16,
    #[serde(default)]
    pub box_score: Vec<BoxScoreEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedResult {
    pub game: GameId,
    /// Box score lines kept after dropping all-zero ones.
    pub lines: usize,
    pub dropped: usize,
    pub players_updated: usize,
}

/// Every write a result causes, computed up front.
struct Staged {
    game: Game,
    players: BTreeMap<PlayerId, (SeasonAverages, u32)>,
    teams: [(TeamId, u32, u32, u32); 2],
    standings: Vec<Standing>,
    dropped: usize,
}

impl League {
    pub fn record_result(
        &mut self,
        stamp: &Stamp,
        submission: ResultSubmission,
    ) -> Result<RecordedResult> {
        let staged = stage(&self.database, submission)?;

        let game_id = staged.game.id;
        let result = RecordedResult {
            game: game_id,
            lines: staged
                .game
                .result
                .as_ref()
                .map_or(0, |result| result.box_score.len()),
            dropped: staged.dropped,
            players_updated: staged.players.len(),
        };
        let summary = match &staged.game.result {
            Some(r) => format!(
                "recorded {} {} - {} {}",
                name_of(&staged.game, r.winner),
                r.winner_score,
                r.loser_score,
                name_of(&staged.game, r.loser)
            ),
            None => String::new(),
        };

        // Nothing below can fail.
        self.database.games.insert(game_id, staged.game);
        for (id, (stats, games_played)) in staged.players {
            if let Some(player) = self.database.players.get_mut(&id) {
                player.stats = stats;
                player.games_played = games_played;
            }
        }
        for (id, wins, losses, total_points) in staged.teams {
            if let Some(team) = self.database.teams.get_mut(&id) {
                team.wins = wins;
                team.losses = losses;
                team.total_points = total_points;
            }
        }
        for standing in staged.standings {
            upsert_standing(&mut self.database.standings, standing);
        }

        info!(
            game = %game_id,
            lines = result.lines,
            dropped = result.dropped,
            players = result.players_updated,
            "recorded result"
        );
        self.audit(stamp, AuditAction::Update, EntityKind::Game, game_id, summary);
        Ok(result)
    }

    /// Recomputes every player's season averages from the recorded games. Results already keep
    /// averages current; this repairs databases edited by hand.
    pub fn recompute_averages(&mut self, stamp: &Stamp) -> usize {
        let totals = season_totals(self.database.games.values());
        let mut changed = 0;
        for player in self.database.players.values_mut() {
            let player_totals = totals.get(&player.id).copied().unwrap_or_default();
            let stats = SeasonAverages::from_totals(&player_totals);
            if player.stats != stats || player.games_played != player_totals.games {
                player.stats = stats;
                player.games_played = player_totals.games;
                changed += 1;
            }
        }
        let summary = format!("recomputed averages, {} players changed", changed);
        self.audit(stamp, AuditAction::Update, EntityKind::Player, "*", summary);
        changed
    }
}

fn stage(database: &Database, submission: ResultSubmission) -> Result<Staged> {
    if submission.winner_score <= submission.loser_score {
        return Err(Error::invalid(
            "score",
            format!(
                "winner's score ({}) must be higher than loser's ({})",
                submission.winner_score, submission.loser_score
            ),
        ));
    }
    if submission.winner == submission.loser {
        return Err(Error::invalid("winner", "winner and loser must differ"));
    }

    let game = submission.game.load(database)?;
    if game.is_completed() {
        return Err(Error::conflict(format!(
            "game {} already has a result",
            game.id
        )));
    }
    if !game.involves(submission.winner) || !game.involves(submission.loser) {
        return Err(Error::invalid(
            "winner",
            "winner and loser must be the two teams of the game",
        ));
    }

    let total_lines = submission.box_score.len();
    let box_score = submission
        .box_score
        .into_iter()
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>();
    let dropped = total_lines - box_score.len();

    let mut touched = BTreeSet::new();
    for line in &box_score {
        let player = line.player_id.load(database)?;
        if !game.involves(line.team_id) {
            return Err(Error::invalid(
                "box_score",
                format!("{} does not play for either team", player.name()),
            ));
        }
        if player.team_id != line.team_id {
            return Err(Error::invalid(
                "box_score",
                format!("{} is not on that team's roster", player.name()),
            ));
        }
        if !touched.insert(line.player_id) {
            return Err(Error::invalid(
                "box_score",
                format!("{} has more than one line", player.name()),
            ));
        }
    }

    let mut completed = game.clone();
    completed.result = Some(GameResult {
        winner: submission.winner,
        loser: submission.loser,
        winner_score: submission.winner_score,
        loser_score: submission.loser_score,
        box_score,
    });

    // Averages come from the whole history, this game included, never from the old average.
    let history = database
        .games
        .values()
        .filter(|g| g.id != completed.id)
        .chain(std::iter::once(&completed));
    let totals = season_totals(history);
    let players = touched
        .into_iter()
        .map(|id| {
            let player_totals = totals.get(&id).copied().unwrap_or_default();
            debug!(player = %id, games = player_totals.games, "recomputed averages");
            (
                id,
                (SeasonAverages::from_totals(&player_totals), player_totals.games),
            )
        })
        .collect();

    let winner = submission.winner.load(database)?;
    let loser = submission.loser.load(database)?;
    let teams = [
        (
            winner.id,
            winner.wins + 1,
            winner.losses,
            winner.total_points + u32::from(submission.winner_score),
        ),
        (
            loser.id,
            loser.wins,
            loser.losses + 1,
            loser.total_points + u32::from(submission.loser_score),
        ),
    ];
    let standings = teams
        .iter()
        .map(|&(team_id, wins, losses, total_points)| Standing {
            season: database.season.clone(),
            team_id,
            wins,
            losses,
            total_points,
        })
        .collect();

    Ok(Staged {
        game: completed,
        players,
        teams,
        standings,
        dropped,
    })
}

/// Sums every player's box score lines over the completed games in `games`.
pub fn season_totals<'a, I>(games: I) -> BTreeMap<PlayerId, StatTotals>
where
    I: IntoIterator<Item = &'a Game>,
{
    let mut totals = BTreeMap::<PlayerId, StatTotals>::new();
    for result in games.into_iter().filter_map(|game| game.result.as_ref()) {
        for line in &result.box_score {
            totals.entry(line.player_id).or_default().add(line);
        }
    }
    totals
}

fn upsert_standing(standings: &mut Vec<Standing>, standing: Standing) {
    match standings
        .iter_mut()
        .find(|s| s.is_for(&standing.season, standing.team_id))
    {
        Some(current) => *current = standing,
        None => standings.push(standing),
    }
}

fn name_of(game: &Game, team: TeamId) -> &str {
    match game.side_of(team) {
        Some(side) => &game.teams.select(side).name,
        None => "?",
    }
}

#[cfg(test)]
mod tests {
    use super::ResultSubmission;
    use crate::id::{GameId, PlayerId, TeamId};
    use crate::test_support::{league_with_teams, stamp};
    use crate::{BoxScoreEntry, Error, GameRequest, League, Player};
    use chrono::{Duration, TimeZone, Utc};

    struct Fixture {
        league: League,
        home: TeamId,
        away: TeamId,
        star: PlayerId,
        bench: PlayerId,
        rival: PlayerId,
    }

    fn fixture() -> Fixture {
        let (mut league, [home, away]) = league_with_teams();
        let mut add = |team, number, license: &str| {
            let mut player = Player::new(team, "P", license, number, license);
            player.nationality = vec!["CH".into()];
            league.add_player(&stamp(), player).unwrap()
        };
        let star = add(home, 7, "L-star");
        let bench = add(home, 12, "L-bench");
        let rival = add(away, 7, "L-rival");
        Fixture {
            league,
            home,
            away,
            star,
            bench,
            rival,
        }
    }

    fn game(f: &mut Fixture, days: i64) -> GameId {
        let kickoff = Utc.with_ymd_and_hms(2025, 10, 4, 18, 0, 0).unwrap() + Duration::days(days);
        f.league
            .schedule_game(
                &stamp(),
                GameRequest {
                    home: f.home,
                    away: f.away,
                    kickoff,
                    venue: None,
                    referees: Vec::new(),
                },
            )
            .unwrap()
    }

    fn line(player: PlayerId, team: TeamId, two: u16, three: u16, free: u16, reb: u16) -> BoxScoreEntry {
        let mut line = BoxScoreEntry::new(player, team);
        line.two_made = two;
        line.two_attempted = two;
        line.three_made = three;
        line.three_attempted = three;
        line.free_made = free;
        line.free_attempted = free;
        line.defensive_rebounds = reb;
        line
    }

    #[test]
    fn averages_are_recomputed_from_history() {
        let mut f = fixture();
        let first = game(&mut f, 0);
        let second = game(&mut f, 7);

        // 10 points, 4 rebounds
        f.league
            .record_result(
                &stamp(),
                ResultSubmission {
                    game: first,
                    winner: f.home,
                    loser: f.away,
                    winner_score: 72,
                    loser_score: 65,
                    box_score: vec![line(f.star, f.home, 2, 2, 0, 4)],
                },
            )
            .unwrap();
        // 20 points, 8 rebounds
        f.league
            .record_result(
                &stamp(),
                ResultSubmission {
                    game: second,
                    winner: f.away,
                    loser: f.home,
                    winner_score: 90,
                    loser_score: 88,
                    box_score: vec![line(f.star, f.home, 4, 3, 3, 8)],
                },
            )
            .unwrap();

        let star = &f.league.database().players[&f.star];
        assert_eq!(star.stats.points, "15.0");
        assert_eq!(star.stats.rebounds, "6.0");
        assert_eq!(star.games_played, 2);

        let home = &f.league.database().teams[&f.home];
        assert_eq!((home.wins, home.losses, home.total_points), (1, 1, 160));
        let away = &f.league.database().teams[&f.away];
        assert_eq!((away.wins, away.losses, away.total_points), (1, 1, 155));

        let standing = f.league.database().standing("2025-26", f.home).unwrap();
        assert_eq!((standing.wins, standing.losses, standing.total_points), (1, 1, 160));
        assert_eq!(f.league.database().standings.len(), 2);
    }

    #[test]
    fn tied_scores_are_rejected_before_any_write() {
        let mut f = fixture();
        let id = game(&mut f, 0);
        let before = serde_json::to_value(&f.league).unwrap();
        let err = f
            .league
            .record_result(
                &stamp(),
                ResultSubmission {
                    game: id,
                    winner: f.home,
                    loser: f.away,
                    winner_score: 80,
                    loser_score: 80,
                    box_score: vec![line(f.star, f.home, 5, 0, 0, 0)],
                },
            )
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(serde_json::to_value(&f.league).unwrap(), before);
    }

    #[test]
    fn empty_lines_are_dropped() {
        let mut f = fixture();
        let id = game(&mut f, 0);
        let recorded = f
            .league
            .record_result(
                &stamp(),
                ResultSubmission {
                    game: id,
                    winner: f.home,
                    loser: f.away,
                    winner_score: 60,
                    loser_score: 50,
                    box_score: vec![
                        line(f.star, f.home, 3, 0, 1, 2),
                        BoxScoreEntry::new(f.bench, f.home),
                        line(f.rival, f.away, 0, 0, 0, 3),
                    ],
                },
            )
            .unwrap();
        assert_eq!((recorded.lines, recorded.dropped, recorded.players_updated), (2, 1, 2));

        let db = f.league.database();
        let result = db.games[&id].result.as_ref().unwrap();
        assert!(result.box_score.iter().all(|l| l.player_id != f.bench));
        assert_eq!(db.players[&f.bench].games_played, 0);
        assert_eq!(db.players[&f.rival].stats.points, "0.0");
        assert_eq!(db.players[&f.rival].stats.rebounds, "3.0");
        assert_eq!(db.players[&f.star].stats.points, "7.0");
    }

    #[test]
    fn a_failing_line_leaves_everything_untouched() {
        let mut f = fixture();
        let id = game(&mut f, 0);
        let before = serde_json::to_value(&f.league).unwrap();
        // the rival is listed under the home team
        let err = f
            .league
            .record_result(
                &stamp(),
                ResultSubmission {
                    game: id,
                    winner: f.home,
                    loser: f.away,
                    winner_score: 60,
                    loser_score: 50,
                    box_score: vec![
                        line(f.star, f.home, 3, 0, 1, 2),
                        line(f.rival, f.home, 1, 0, 0, 0),
                    ],
                },
            )
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(serde_json::to_value(&f.league).unwrap(), before);
    }

    #[test]
    fn results_are_recorded_once() {
        let mut f = fixture();
        let id = game(&mut f, 0);
        let submission = ResultSubmission {
            game: id,
            winner: f.home,
            loser: f.away,
            winner_score: 60,
            loser_score: 50,
            box_score: Vec::new(),
        };
        f.league.record_result(&stamp(), submission.clone()).unwrap();
        assert!(matches!(
            f.league.record_result(&stamp(), submission),
            Err(Error::Conflict(_))
        ));
        assert_eq!(f.league.database().teams[&f.home].wins, 1);
    }

    #[test]
    fn outsiders_cannot_win() {
        let mut f = fixture();
        let id = game(&mut f, 0);
        let err = f
            .league
            .record_result(
                &stamp(),
                ResultSubmission {
                    game: id,
                    winner: TeamId::new(),
                    loser: f.away,
                    winner_score: 60,
                    loser_score: 50,
                    box_score: Vec::new(),
                },
            )
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn recompute_repairs_hand_edits() {
        let mut f = fixture();
        let id = game(&mut f, 0);
        f.league
            .record_result(
                &stamp(),
                ResultSubmission {
                    game: id,
                    winner: f.home,
                    loser: f.away,
                    winner_score: 60,
                    loser_score: 50,
                    box_score: vec![line(f.star, f.home, 5, 0, 0, 0)],
                },
            )
            .unwrap();
        f.league
            .database
            .players
            .get_mut(&f.star)
            .unwrap()
            .stats
            .points = "99.9".into();
        assert_eq!(f.league.recompute_averages(&stamp()), 1);
        assert_eq!(f.league.database().players[&f.star].stats.points, "10.0");
        assert_eq!(f.league.recompute_averages(&stamp()), 0);
    }
}
