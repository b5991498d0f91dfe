use crate::audit::{AuditAction, EntityKind};
use crate::id::NewsId;
use crate::{Error, League, Result, Stamp, StoredImage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[non_exhaustive]
pub struct NewsArticle {
    pub id: NewsId,
    pub title: String,
    pub summary: String,
    pub body: String,
    /// Language of `title`, `summary` and `body`.
    pub language: String,
    pub translation: Option<Translation>,
    pub status: NewsStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub cover: Option<StoredImage>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Translation {
    pub language: String,
    pub title: String,
    pub summary: String,
    pub body: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsStatus {
    #[default]
    Draft,
    Published,
}

impl NewsArticle {
    pub fn new(
        title: impl Into<String>,
        summary: impl Into<String>,
        body: impl Into<String>,
        language: impl Into<String>,
    ) -> NewsArticle {
        NewsArticle {
            id: NewsId::new(),
            title: title.into(),
            summary: summary.into(),
            body: body.into(),
            language: language.into(),
            ..NewsArticle::default()
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == NewsStatus::Published
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::invalid("title", "title is required"));
        }
        if self.language.trim().is_empty() {
            return Err(Error::invalid("language", "language is required"));
        }
        Ok(())
    }
}

/// A machine translation backend.
pub trait Translator {
    fn translate(&mut self, text: &str, from: &str, to: &str) -> Result<String>;
}

impl League {
    /// Rewrites every article not already in `target` so that `target` becomes its base
    /// language. The previous base text is kept as the article's translation and each rewrite
    /// is audited. Returns how many articles were rewritten.
    ///
    /// The first translator failure stops the batch; articles rewritten before it stay rewritten
    /// and the failing article is left untouched.
    pub fn translate_news<T>(
        &mut self,
        stamp: &Stamp,
        translator: &mut T,
        target: &str,
    ) -> Result<usize>
    where
        T: Translator + ?Sized,
    {
        if target.trim().is_empty() {
            return Err(Error::invalid("language", "target language is required"));
        }
        let pending = self
            .database
            .news
            .values()
            .filter(|article| article.language != target)
            .map(|article| article.id)
            .collect::<Vec<_>>();
        debug!(
            pending = pending.len(),
            skipped = self.database.news.len() - pending.len(),
            target,
            "translating news"
        );

        for &id in &pending {
            let article = id.load_mut(&mut self.database)?;
            translate_article(article, translator, target)?;
            let summary = format!("translated {:?} to {}", article.title, target);
            self.audit(stamp, AuditAction::Update, EntityKind::News, id, summary);
        }
        info!(rewritten = pending.len(), target, "translated news");
        Ok(pending.len())
    }
}

fn translate_article<T>(article: &mut NewsArticle, translator: &mut T, target: &str) -> Result<()>
where
    T: Translator + ?Sized,
{
    let from = article.language.clone();
    let mut translate = |text: &str| {
        if text.is_empty() {
            Ok(String::new())
        } else {
            translator.translate(text, &from, target)
        }
    };
    let title = translate(&article.title)?;
    let summary = translate(&article.summary)?;
    let body = translate(&article.body)?;

    let original = Translation {
        language: std::mem::replace(&mut article.language, target.to_string()),
        title: std::mem::replace(&mut article.title, title),
        summary: std::mem::replace(&mut article.summary, summary),
        body: std::mem::replace(&mut article.body, body),
    };
    article.translation = Some(original);
    Ok(())
}
