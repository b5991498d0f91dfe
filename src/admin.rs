use crate::id::AdminUserId;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An admin counts as online when seen within this many minutes.
const ONLINE_WINDOW_MINUTES: i64 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[non_exhaustive]
pub struct AdminUser {
    pub id: AdminUserId,
    pub email: String,
    pub display_name: String,
    pub roles: BTreeSet<Role>,
    /// Derived from `roles`; stored so the console can read it without knowing the role table.
    pub permissions: Permissions,
    pub created_at: DateTime<Utc>,
    pub last_active_at: Option<DateTime<Utc>>,
}

impl AdminUser {
    pub fn new(
        email: impl Into<String>,
        display_name: impl Into<String>,
        roles: BTreeSet<Role>,
        created_at: DateTime<Utc>,
    ) -> AdminUser {
        let permissions = Permissions::from_roles(&roles);
        AdminUser {
            id: AdminUserId::new(),
            email: email.into(),
            display_name: display_name.into(),
            roles,
            permissions,
            created_at,
            last_active_at: None,
        }
    }

    pub fn is_online(&self, now: DateTime<Utc>) -> bool {
        self.last_active_at.map_or(false, |seen| {
            seen <= now && now - seen <= Duration::minutes(ONLINE_WINDOW_MINUTES)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    Editor,
    Statistician,
    RosterManager,
    Viewer,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Permissions {
    pub manage_stories: bool,
    pub manage_teams: bool,
    pub view_traffic: bool,
    pub manage_games: bool,
    pub record_stats: bool,
    pub manage_league: bool,
    pub manage_admins: bool,
}

impl Permissions {
    pub fn from_roles(roles: &BTreeSet<Role>) -> Permissions {
        let mut permissions = Permissions::default();
        for role in roles {
            match role {
                Role::Owner => {
                    return Permissions {
                        manage_stories: true,
                        manage_teams: true,
                        view_traffic: true,
                        manage_games: true,
                        record_stats: true,
                        manage_league: true,
                        manage_admins: true,
                    }
                }
                Role::Editor => permissions.manage_stories = true,
                Role::Statistician => {
                    permissions.manage_games = true;
                    permissions.record_stats = true;
                }
                Role::RosterManager => {
                    permissions.manage_teams = true;
                    permissions.view_traffic = true;
                }
                Role::Viewer => permissions.view_traffic = true,
            }
        }
        permissions
    }

    /// Console tabs these permissions unlock, in display order.
    pub fn tabs(self) -> Vec<Tab> {
        [
            (Tab::Stories, self.manage_stories),
            (Tab::Teams, self.manage_teams),
            (Tab::Traffic, self.view_traffic),
            (Tab::Games, self.manage_games),
            (Tab::Stats, self.record_stats),
            (Tab::League, self.manage_league),
            (Tab::Admins, self.manage_admins),
        ]
        .into_iter()
        .filter_map(|(tab, allowed)| allowed.then_some(tab))
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    Stories,
    Teams,
    Traffic,
    Games,
    Stats,
    League,
    Admins,
}

#[cfg(test)]
mod tests {
    use super::{AdminUser, Permissions, Role, Tab};
    use chrono::{Duration, TimeZone, Utc};
    use std::collections::BTreeSet;

    #[test]
    fn owner_sees_everything() {
        let permissions = Permissions::from_roles(&BTreeSet::from([Role::Owner, Role::Viewer]));
        assert_eq!(permissions.tabs().len(), 7);
    }

    #[test]
    fn roles_combine() {
        let permissions =
            Permissions::from_roles(&BTreeSet::from([Role::Editor, Role::Statistician]));
        assert_eq!(permissions.tabs(), [Tab::Stories, Tab::Games, Tab::Stats]);
        assert!(Permissions::from_roles(&BTreeSet::new()).tabs().is_empty());
    }

    #[test]
    fn online_within_five_minutes() {
        let now = Utc.with_ymd_and_hms(2025, 11, 2, 18, 0, 0).unwrap();
        let mut admin = AdminUser::new("a@league.test", "A", BTreeSet::new(), now);
        assert!(!admin.is_online(now));
        admin.last_active_at = Some(now - Duration::minutes(5));
        assert!(admin.is_online(now));
        admin.last_active_at = Some(now - Duration::minutes(6));
        assert!(!admin.is_online(now));
    }
}
