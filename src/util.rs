use std::fmt::{self, Display};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::AdminUserId;

/// Who made a change, as recorded in audit logs and traffic entries.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Actor {
    pub uid: AdminUserId,
    pub email: String,
}

/// The actor and time attached to every mutating operation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Stamp {
    pub actor: Actor,
    pub at: DateTime<Utc>,
}

impl Stamp {
    pub fn new(actor: Actor, at: DateTime<Utc>) -> Stamp {
        Stamp { actor, at }
    }

    pub fn now(actor: Actor) -> Stamp {
        Stamp::new(actor, Utc::now())
    }
}

/// An image held in object storage. `path` is the storage key, `url` what pages link to.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StoredImage {
    pub path: String,
    pub url: String,
}

/// A per-game average, kept as the one-decimal string the public pages print.
pub(crate) struct Average {
    pub(crate) total: u32,
    pub(crate) games: u32,
}

impl Display for Average {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.games == 0 {
            return write!(f, "0.0");
        }
        // Tenths, rounded half up.
        let games = u64::from(self.games);
        let tenths = (10 * u64::from(self.total) + games / 2) / games;
        write!(f, "{}.{}", tenths / 10, tenths % 10)
    }
}

pub(crate) fn per_game(total: u32, games: u32) -> f64 {
    if games == 0 {
        0.0
    } else {
        f64::from(total) / f64::from(games)
    }
}

/// Lowercase ASCII words joined by `-`, used for public page paths.
pub fn slug(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Case and whitespace insensitive key for matching team names typed by different admins.
pub(crate) fn name_key(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
