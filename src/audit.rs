use crate::id::{AuditLogId, PlayerId, TeamId, TrafficEntryId};
use crate::Stamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[non_exhaustive]
pub struct AuditLog {
    pub id: AuditLogId,
    pub action: AuditAction,
    pub entity: EntityKind,
    pub entity_id: String,
    pub summary: String,
    pub actor_uid: crate::id::AdminUserId,
    pub actor_email: String,
    pub at: DateTime<Utc>,
}

impl AuditLog {
    pub(crate) fn new(
        stamp: &Stamp,
        action: AuditAction,
        entity: EntityKind,
        entity_id: impl Display,
        summary: impl Into<String>,
    ) -> AuditLog {
        AuditLog {
            id: AuditLogId::new(),
            action,
            entity,
            entity_id: entity_id.to_string(),
            summary: summary.into(),
            actor_uid: stamp.actor.uid,
            actor_email: stamp.actor.email.clone(),
            at: stamp.at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Team,
    Player,
    Staff,
    Game,
    Referee,
    Venue,
    Partner,
    Committee,
    News,
    AdminUser,
}

impl Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[non_exhaustive]
pub struct TrafficEntry {
    pub id: TrafficEntryId,
    #[serde(flatten)]
    pub kind: TrafficKind,
    pub player_id: PlayerId,
    pub player_name: String,
    pub actor_email: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum TrafficKind {
    PlayerAdded { team: TeamId },
    PlayerDeleted { team: TeamId },
    PlayerTransferred { from: TeamId, to: TeamId },
}

impl TrafficEntry {
    pub(crate) fn new(
        stamp: &Stamp,
        kind: TrafficKind,
        player_id: PlayerId,
        player_name: String,
    ) -> TrafficEntry {
        TrafficEntry {
            id: TrafficEntryId::new(),
            kind,
            player_id,
            player_name,
            actor_email: stamp.actor.email.clone(),
            at: stamp.at,
        }
    }

    pub fn involves(&self, team: TeamId) -> bool {
        match self.kind {
            TrafficKind::PlayerAdded { team: t } | TrafficKind::PlayerDeleted { team: t } => {
                t == team
            }
            TrafficKind::PlayerTransferred { from, to } => from == team || to == team,
        }
    }
}
