#![warn(clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::uninlined_format_args
)]

mod admin;
mod audit;
mod content;
mod database;
mod directory;
mod display;
mod error;
mod franchise;
mod game;
pub mod id;
mod league;
mod news;
mod player;
mod results;
mod roster;
mod routes;
mod schedule;
mod snapshot;
mod standing;
mod storage;
mod team;
mod translator;
#[cfg(test)]
mod test_support;
mod util;

pub use crate::admin::{AdminUser, Permissions, Role, Tab};
pub use crate::audit::{AuditAction, AuditLog, EntityKind, TrafficEntry, TrafficKind};
pub use crate::database::Database;
pub use crate::directory::{CommitteeMember, Partner, PartnerTier, Referee, Venue};
pub use crate::display::{
    committee, news_feed, partners, player_profile, recently_played, schedule, season_aggregates,
    spotlight, standings, traffic, ByGender, DisplayOptions, GameLogRow, PerGame, PlayerAggregate,
    PlayerProfile, RecentGame, Schedule, ScheduleRow, ScheduleSide, SiteData, StandingRow,
    TeamBadge, TeamPage,
};
pub use crate::error::{Error, Result};
pub use crate::franchise::{builtin_franchises, FranchiseTemplate, LogoResolver, PLACEHOLDER_LOGO};
pub use crate::game::{
    AwayHome, BoxScoreEntry, Game, GameResult, GameSide, TeamSelect, MAX_REFEREES,
};
pub use crate::league::League;
pub use crate::news::{NewsArticle, NewsStatus, Translation, Translator};
pub use crate::player::{Player, SeasonAverages, StatTotals};
pub use crate::results::{season_totals, RecordedResult, ResultSubmission};
pub use crate::roster::TeamRemoval;
pub use crate::routes::{player_path, robots, sitemap, team_path, Sitemap};
pub use crate::schedule::GameRequest;
pub use crate::snapshot::{Snapshot, TeamDocument};
pub use crate::standing::Standing;
pub use crate::storage::{DirStore, MemoryStore, ObjectStore};
pub use crate::team::{Colors, Gender, StaffMember, StaffRole, Team};
pub use crate::translator::HttpTranslator;
pub use crate::util::{slug, Actor, Stamp, StoredImage};
