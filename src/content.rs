use crate::audit::{AuditAction, EntityKind};
use crate::id::{AdminUserId, CommitteeMemberId, NewsId, PartnerId};
use crate::storage::{delete_images, delete_replaced, ObjectStore};
use crate::{
    AdminUser, CommitteeMember, Error, League, NewsArticle, NewsStatus, Partner, Permissions,
    Result, Role, Stamp,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

impl League {
    /// Inserts or replaces a partner. A replaced logo is deleted from `store`.
    pub fn save_partner<S>(
        &mut self,
        stamp: &Stamp,
        partner: Partner,
        store: &mut S,
    ) -> Result<PartnerId>
    where
        S: ObjectStore + ?Sized,
    {
        if partner.id.is_nil() {
            return Err(Error::invalid("id", "partner id must be set"));
        }
        if partner.name.trim().is_empty() {
            return Err(Error::invalid("name", "partner name is required"));
        }
        if let Some(current) = self.database.partners.get(&partner.id) {
            delete_replaced(store, current.logo.as_ref(), partner.logo.as_ref())?;
        }
        let id = partner.id;
        let summary = format!("saved partner {}", partner.name);
        let action = match self.database.partners.insert(id, partner) {
            Some(_) => AuditAction::Update,
            None => AuditAction::Create,
        };
        self.audit(stamp, action, EntityKind::Partner, id, summary);
        Ok(id)
    }

    pub fn delete_partner<S>(&mut self, stamp: &Stamp, id: PartnerId, store: &mut S) -> Result<()>
    where
        S: ObjectStore + ?Sized,
    {
        delete_images(store, id.load(&self.database)?.logo.iter())?;
        if let Some(partner) = self.database.partners.remove(&id) {
            let summary = format!("deleted partner {}", partner.name);
            self.audit(stamp, AuditAction::Delete, EntityKind::Partner, id, summary);
        }
        Ok(())
    }

    /// Inserts or replaces a committee member. A replaced photo is deleted from `store`.
    pub fn save_committee_member<S>(
        &mut self,
        stamp: &Stamp,
        member: CommitteeMember,
        store: &mut S,
    ) -> Result<CommitteeMemberId>
    where
        S: ObjectStore + ?Sized,
    {
        if member.id.is_nil() {
            return Err(Error::invalid("id", "committee member id must be set"));
        }
        if member.name.trim().is_empty() || member.role.trim().is_empty() {
            return Err(Error::invalid("name", "name and role are required"));
        }
        if let Some(current) = self.database.committee.get(&member.id) {
            delete_replaced(store, current.photo.as_ref(), member.photo.as_ref())?;
        }
        let id = member.id;
        let summary = format!("saved committee member {}", member.name);
        let action = match self.database.committee.insert(id, member) {
            Some(_) => AuditAction::Update,
            None => AuditAction::Create,
        };
        self.audit(stamp, action, EntityKind::Committee, id, summary);
        Ok(id)
    }

    pub fn delete_committee_member<S>(
        &mut self,
        stamp: &Stamp,
        id: CommitteeMemberId,
        store: &mut S,
    ) -> Result<()>
    where
        S: ObjectStore + ?Sized,
    {
        delete_images(store, id.load(&self.database)?.photo.iter())?;
        if let Some(member) = self.database.committee.remove(&id) {
            let summary = format!("removed {} from the committee", member.name);
            self.audit(stamp, AuditAction::Delete, EntityKind::Committee, id, summary);
        }
        Ok(())
    }

    /// Saves an article without publishing it. A published article saved as a draft is
    /// taken off the public pages.
    pub fn save_news_draft<S>(
        &mut self,
        stamp: &Stamp,
        mut article: NewsArticle,
        store: &mut S,
    ) -> Result<NewsId>
    where
        S: ObjectStore + ?Sized,
    {
        article.status = NewsStatus::Draft;
        article.published_at = None;
        self.save_news(stamp, article, store)
    }

    /// Publishes an article. Republishing keeps the original publication time.
    pub fn publish_news<S>(
        &mut self,
        stamp: &Stamp,
        mut article: NewsArticle,
        store: &mut S,
    ) -> Result<NewsId>
    where
        S: ObjectStore + ?Sized,
    {
        let published_at = self
            .database
            .news
            .get(&article.id)
            .and_then(|current| current.published_at);
        article.status = NewsStatus::Published;
        article.published_at = Some(published_at.unwrap_or(stamp.at));
        self.save_news(stamp, article, store)
    }

    fn save_news<S>(&mut self, stamp: &Stamp, article: NewsArticle, store: &mut S) -> Result<NewsId>
    where
        S: ObjectStore + ?Sized,
    {
        if article.id.is_nil() {
            return Err(Error::invalid("id", "article id must be set"));
        }
        article.validate()?;
        if let Some(current) = self.database.news.get(&article.id) {
            delete_replaced(store, current.cover.as_ref(), article.cover.as_ref())?;
        }
        let id = article.id;
        let summary = match article.status {
            NewsStatus::Draft => format!("saved draft {:?}", article.title),
            NewsStatus::Published => format!("published {:?}", article.title),
        };
        let action = match self.database.news.insert(id, article) {
            Some(_) => AuditAction::Update,
            None => AuditAction::Create,
        };
        self.audit(stamp, action, EntityKind::News, id, summary);
        Ok(id)
    }

    pub fn delete_news<S>(&mut self, stamp: &Stamp, id: NewsId, store: &mut S) -> Result<()>
    where
        S: ObjectStore + ?Sized,
    {
        delete_images(store, id.load(&self.database)?.cover.iter())?;
        if let Some(article) = self.database.news.remove(&id) {
            let summary = format!("deleted {:?}", article.title);
            self.audit(stamp, AuditAction::Delete, EntityKind::News, id, summary);
        }
        Ok(())
    }

    pub fn add_admin(&mut self, stamp: &Stamp, admin: AdminUser) -> Result<AdminUserId> {
        if admin.id.is_nil() {
            return Err(Error::invalid("id", "admin id must be set"));
        }
        if !admin.email.contains('@') {
            return Err(Error::invalid("email", format!("{:?} is not an email", admin.email)));
        }
        if self
            .database
            .admin_users
            .values()
            .any(|other| other.email.eq_ignore_ascii_case(&admin.email))
        {
            return Err(Error::invalid(
                "email",
                format!("{} is already an admin", admin.email),
            ));
        }
        let id = admin.id;
        let summary = format!("added admin {}", admin.email);
        let admin = AdminUser {
            permissions: Permissions::from_roles(&admin.roles),
            ..admin
        };
        self.database.admin_users.insert(id, admin);
        self.audit(stamp, AuditAction::Create, EntityKind::AdminUser, id, summary);
        Ok(id)
    }

    /// Replaces an admin's roles and rederives their permissions. The last owner cannot
    /// give up the owner role.
    pub fn set_admin_roles(
        &mut self,
        stamp: &Stamp,
        id: AdminUserId,
        roles: BTreeSet<Role>,
    ) -> Result<Permissions> {
        let admin = id.load(&self.database)?;
        let other_owners = self
            .database
            .admin_users
            .values()
            .filter(|a| a.id != id && a.roles.contains(&Role::Owner))
            .count();
        if admin.roles.contains(&Role::Owner) && !roles.contains(&Role::Owner) && other_owners == 0
        {
            return Err(Error::invalid("roles", "the league needs at least one owner"));
        }

        let admin = id.load_mut(&mut self.database)?;
        admin.permissions = Permissions::from_roles(&roles);
        admin.roles = roles;
        let (permissions, summary) = (admin.permissions, format!("changed roles of {}", admin.email));
        self.audit(stamp, AuditAction::Update, EntityKind::AdminUser, id, summary);
        Ok(permissions)
    }

    /// Records admin activity. Not audited; it happens on every console page load.
    pub fn touch_admin(&mut self, id: AdminUserId, at: DateTime<Utc>) -> Result<()> {
        let admin = id.load_mut(&mut self.database)?;
        admin.last_active_at = Some(admin.last_active_at.map_or(at, |seen| seen.max(at)));
        Ok(())
    }

    pub fn online_admins(&self, now: DateTime<Utc>) -> impl Iterator<Item = &AdminUser> + '_ {
        self.database
            .admin_users
            .values()
            .filter(move |admin| admin.is_online(now))
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::stamp;
    use crate::{AdminUser, League, MemoryStore, NewsArticle, NewsStatus, ObjectStore, Role};
    use crate::{Partner, PartnerTier, StoredImage, Tab};
    use chrono::Duration;
    use std::collections::BTreeSet;

    fn image(path: &str) -> Option<StoredImage> {
        Some(StoredImage {
            path: path.into(),
            url: format!("https://cdn.test/{}", path),
        })
    }

    #[test]
    fn publishing_keeps_first_publication_time() {
        let mut league = League::new("2025-26");
        let first = stamp();
        let article = NewsArticle::new("Opening night", "", "Tip-off at 8", "en");
        let mut store = MemoryStore::new();
        let id = league.publish_news(&first, article.clone(), &mut store).unwrap();
        let mut later = stamp();
        later.at = first.at + Duration::hours(3);
        league.publish_news(&later, article.clone(), &mut store).unwrap();
        assert_eq!(league.database().news[&id].published_at, Some(first.at));

        league.save_news_draft(&later, article, &mut store).unwrap();
        let draft = &league.database().news[&id];
        assert_eq!(draft.status, NewsStatus::Draft);
        assert_eq!(draft.published_at, None);
    }

    #[test]
    fn untitled_news_is_rejected() {
        let mut league = League::new("2025-26");
        let untitled = NewsArticle::new(" ", "", "", "en");
        let err = league
            .publish_news(&stamp(), untitled, &mut MemoryStore::new())
            .unwrap_err();
        assert!(err.is_validation());
        assert!(league.database().audit_logs.is_empty());
    }

    #[test]
    fn deleting_news_removes_cover() {
        let mut league = League::new("2025-26");
        let mut store = MemoryStore::new();
        store.put("news/cover.jpg", b"jpg").unwrap();
        let mut article = NewsArticle::new("Finals", "", "", "en");
        article.cover = Some(StoredImage {
            path: "news/cover.jpg".into(),
            url: "https://cdn.test/news/cover.jpg".into(),
        });
        let id = league.publish_news(&stamp(), article, &mut store).unwrap();
        league.delete_news(&stamp(), id, &mut store).unwrap();
        assert!(store.is_empty());
        assert!(league.database().news.is_empty());
    }

    #[test]
    fn replaced_cover_and_logo_are_deleted() {
        let mut league = League::new("2025-26");
        let mut store = MemoryStore::new();
        for path in ["news/old.jpg", "news/new.jpg", "partners/bank.png"] {
            store.put(path, b"img").unwrap();
        }
        let mut article = NewsArticle::new("Finals", "", "", "en");
        article.cover = image("news/old.jpg");
        league.save_news_draft(&stamp(), article.clone(), &mut store).unwrap();
        article.cover = image("news/new.jpg");
        league.publish_news(&stamp(), article, &mut store).unwrap();
        assert!(!store.exists("news/old.jpg").unwrap());
        assert!(store.exists("news/new.jpg").unwrap());

        let mut partner = Partner::new("City Bank", PartnerTier::Main);
        partner.logo = image("partners/bank.png");
        league.save_partner(&stamp(), partner.clone(), &mut store).unwrap();
        partner.website = Some("https://bank.test".into());
        league.save_partner(&stamp(), partner.clone(), &mut store).unwrap();
        assert!(store.exists("partners/bank.png").unwrap());
        partner.logo = None;
        league.save_partner(&stamp(), partner, &mut store).unwrap();
        assert!(!store.exists("partners/bank.png").unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn last_owner_stays_owner() {
        let mut league = League::new("2025-26");
        let s = stamp();
        let owner = AdminUser::new("owner@league.test", "Owner", BTreeSet::from([Role::Owner]), s.at);
        let id = league.add_admin(&s, owner).unwrap();
        assert!(league
            .set_admin_roles(&s, id, BTreeSet::from([Role::Editor]))
            .is_err());

        let second = AdminUser::new("two@league.test", "Two", BTreeSet::from([Role::Owner]), s.at);
        league.add_admin(&s, second).unwrap();
        let permissions = league
            .set_admin_roles(&s, id, BTreeSet::from([Role::Editor]))
            .unwrap();
        assert_eq!(permissions.tabs(), [Tab::Stories]);

        let dup = AdminUser::new("OWNER@league.test", "Dup", BTreeSet::new(), s.at);
        assert!(league.add_admin(&s, dup).is_err());
    }

    #[test]
    fn online_admins() {
        let mut league = League::new("2025-26");
        let s = stamp();
        let admin = AdminUser::new("a@league.test", "A", BTreeSet::from([Role::Viewer]), s.at);
        let id = league.add_admin(&s, admin).unwrap();
        assert_eq!(league.online_admins(s.at).count(), 0);
        league.touch_admin(id, s.at - Duration::minutes(2)).unwrap();
        assert_eq!(league.online_admins(s.at).count(), 1);
        assert_eq!(league.online_admins(s.at + Duration::minutes(10)).count(), 0);
    }
}
