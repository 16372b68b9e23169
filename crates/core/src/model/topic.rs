use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::TopicId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TopicError {
    #[error("topic name cannot be empty")]
    EmptyName,

    #[error("invalid topic slug: {0:?}")]
    InvalidSlug(String),
}

/// A playable quiz topic, as shown in the lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    id: TopicId,
    slug: String,
    name: String,
    icon: String,
    question_count: u32,
}

impl Topic {
    /// Creates a new topic.
    ///
    /// Slugs are lowercase ASCII letters, digits and `-`.
    ///
    /// # Errors
    ///
    /// Returns `TopicError` if the name is blank or the slug is malformed.
    pub fn new(
        id: TopicId,
        slug: impl Into<String>,
        name: impl Into<String>,
        icon: impl Into<String>,
        question_count: u32,
    ) -> Result<Self, TopicError> {
        let slug = slug.into();
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(TopicError::EmptyName);
        }
        if !is_valid_slug(&slug) {
            return Err(TopicError::InvalidSlug(slug));
        }

        Ok(Self {
            id,
            slug,
            name,
            icon: icon.into(),
            question_count,
        })
    }

    #[must_use]
    pub fn id(&self) -> TopicId {
        self.id
    }

    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn icon(&self) -> &str {
        &self.icon
    }

    #[must_use]
    pub fn question_count(&self) -> u32 {
        self.question_count
    }
}

fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_trimmed_name() {
        let topic = Topic::new(TopicId::new(1), "world-capitals", "  Capitals ", "🌍", 3).unwrap();
        assert_eq!(topic.name(), "Capitals");
        assert_eq!(topic.slug(), "world-capitals");
    }

    #[test]
    fn rejects_bad_slugs() {
        for slug in ["", "Upper", "with space", "-lead", "trail-"] {
            let err = Topic::new(TopicId::new(1), slug, "Name", "", 0).unwrap_err();
            assert!(matches!(err, TopicError::InvalidSlug(_)), "{slug}");
        }
    }

    #[test]
    fn rejects_blank_name() {
        let err = Topic::new(TopicId::new(1), "ok", " ", "", 0).unwrap_err();
        assert_eq!(err, TopicError::EmptyName);
    }
}
