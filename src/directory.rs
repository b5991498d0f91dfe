use crate::id::{CommitteeMemberId, PartnerId, RefereeId, VenueId};
use crate::StoredImage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[non_exhaustive]
pub struct Referee {
    pub id: RefereeId,
    pub name: String,
    pub license: Option<String>,
    pub photo: Option<StoredImage>,
}

impl Referee {
    pub fn new(name: impl Into<String>) -> Referee {
        Referee {
            id: RefereeId::new(),
            name: name.into(),
            ..Referee::default()
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[non_exhaustive]
pub struct Venue {
    pub id: VenueId,
    pub name: String,
    pub city: String,
    pub address: Option<String>,
    pub capacity: Option<u32>,
}

impl Venue {
    pub fn new(name: impl Into<String>, city: impl Into<String>) -> Venue {
        Venue {
            id: VenueId::new(),
            name: name.into(),
            city: city.into(),
            ..Venue::default()
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[non_exhaustive]
pub struct Partner {
    pub id: PartnerId,
    pub name: String,
    pub tier: PartnerTier,
    pub website: Option<String>,
    pub logo: Option<StoredImage>,
    #[serde(default)]
    pub order: u32,
}

impl Partner {
    pub fn new(name: impl Into<String>, tier: PartnerTier) -> Partner {
        Partner {
            id: PartnerId::new(),
            name: name.into(),
            tier,
            ..Partner::default()
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartnerTier {
    Main,
    Premium,
    #[default]
    Official,
    Media,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[non_exhaustive]
pub struct CommitteeMember {
    pub id: CommitteeMemberId,
    pub name: String,
    pub role: String,
    pub email: Option<String>,
    pub photo: Option<StoredImage>,
    #[serde(default)]
    pub order: u32,
}

impl CommitteeMember {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> CommitteeMember {
        CommitteeMember {
            id: CommitteeMemberId::new(),
            name: name.into(),
            role: role.into(),
            ..CommitteeMember::default()
        }
    }
}
