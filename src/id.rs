macro_rules! id {
    ($name:ident, $field:ident, $ty:ty, $kind:literal) => {
        id!($name);

        // Unlike references held inside the database (see `Database::check_consistency`), ids
        // handed to us by an admin can be stale, so a missing record is an error, not a panic.
        impl $name {
            pub fn load(self, database: &$crate::Database) -> $crate::Result<&$ty> {
                database
                    .$field
                    .get(&self)
                    .ok_or_else(|| $crate::Error::not_found($kind, self))
            }

            pub fn load_mut(self, database: &mut $crate::Database) -> $crate::Result<&mut $ty> {
                database
                    .$field
                    .get_mut(&self)
                    .ok_or_else(|| $crate::Error::not_found($kind, self))
            }
        }
    };

    ($name:ident) => {
        #[derive(
            Clone,
            Copy,
            Default,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            ::serde::Deserialize,
            ::serde::Serialize,
        )]
        #[repr(transparent)]
        #[serde(transparent)]
        pub struct $name(pub ::uuid::Uuid);

        impl $name {
            pub fn new() -> $name {
                $name(::uuid::Uuid::new_v4())
            }

            pub fn is_nil(self) -> bool {
                self.0.is_nil()
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Debug::fmt(&self.0, f)
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = ::uuid::Error;

            fn from_str(s: &str) -> Result<$name, ::uuid::Error> {
                ::std::str::FromStr::from_str(s).map($name)
            }
        }
    };
}

id!(AdminUserId, admin_users, crate::AdminUser, "admin user");
id!(AuditLogId);
id!(CommitteeMemberId, committee, crate::CommitteeMember, "committee member");
id!(GameId, games, crate::Game, "game");
id!(NewsId, news, crate::NewsArticle, "news article");
id!(PartnerId, partners, crate::Partner, "partner");
id!(PlayerId, players, crate::Player, "player");
id!(RefereeId, referees, crate::Referee, "referee");
id!(StaffId, staff, crate::StaffMember, "staff member");
id!(TeamId, teams, crate::Team, "team");
id!(TrafficEntryId);
id!(VenueId, venues, crate::Venue, "venue");
