use crate::id::{StaffId, TeamId};
use crate::StoredImage;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[non_exhaustive]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub city: String,
    pub gender: Gender,
    pub colors: Colors,
    pub logo: Option<StoredImage>,

    pub wins: u32,
    pub losses: u32,
    #[serde(alias = "totalPoints")]
    pub total_points: u32,
}

impl Team {
    pub fn new(name: impl Into<String>, city: impl Into<String>, gender: Gender) -> Team {
        Team {
            id: TeamId::new(),
            name: name.into(),
            city: city.into(),
            gender,
            ..Team::default()
        }
    }

    pub fn logo_url(&self) -> Option<&str> {
        self.logo.as_ref().map(|logo| logo.url.as_str())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    #[default]
    Men,
    Women,
}

impl Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Gender::Men => "men",
            Gender::Women => "women",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Colors {
    pub primary: String,
    pub secondary: String,
}

impl Default for Colors {
    fn default() -> Colors {
        Colors {
            primary: "#1d1d1b".into(),
            secondary: "#ffffff".into(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[non_exhaustive]
pub struct StaffMember {
    pub id: StaffId,
    pub team_id: TeamId,
    pub name: String,
    pub role: StaffRole,
    /// Free-form title shown on the roster page, e.g. "Physiotherapist".
    pub title: String,
    pub photo: Option<StoredImage>,
}

impl StaffMember {
    pub fn new(team_id: TeamId, name: impl Into<String>, role: StaffRole) -> StaffMember {
        StaffMember {
            id: StaffId::new(),
            team_id,
            name: name.into(),
            role,
            ..StaffMember::default()
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    HeadCoach,
    AssistantCoach,
    #[default]
    Support,
}

impl StaffRole {
    /// How many members of a coaching staff may hold this role at once.
    pub fn capacity(self) -> Option<usize> {
        match self {
            StaffRole::HeadCoach => Some(1),
            StaffRole::AssistantCoach => Some(2),
            StaffRole::Support => None,
        }
    }
}

impl Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StaffRole::HeadCoach => "head coach",
            StaffRole::AssistantCoach => "assistant coach",
            StaffRole::Support => "support staff",
        })
    }
}
