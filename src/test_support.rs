use crate::id::{AdminUserId, TeamId};
use crate::{Actor, Gender, League, Stamp, Team};
use chrono::{TimeZone, Utc};

pub(crate) fn stamp() -> Stamp {
    Stamp::new(
        Actor {
            uid: AdminUserId::new(),
            email: "scorer@league.test".into(),
        },
        Utc.with_ymd_and_hms(2025, 11, 2, 20, 0, 0).unwrap(),
    )
}

pub(crate) fn league_with_teams() -> (League, [TeamId; 2]) {
    let mut league = League::new("2025-26");
    let home = league
        .add_team(&stamp(), Team::new("Riverside Hawks", "Riverside", Gender::Men))
        .unwrap();
    let away = league
        .add_team(&stamp(), Team::new("Lakeside Otters", "Lakeside", Gender::Men))
        .unwrap();
    (league, [home, away])
}
