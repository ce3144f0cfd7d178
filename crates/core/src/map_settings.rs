//! Map settings: the named, sluggable container for a set of lots.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::slug::{resolve_slug, validate_slug};
use crate::types::{DbId, Timestamp};

/// One subdivision map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSettings {
    pub id: DbId,
    pub owner_id: DbId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub background_image: Option<String>,
    pub is_public: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl MapSettings {
    pub fn from_new(id: DbId, new: NewMapSettings, now: Timestamp) -> Self {
        MapSettings {
            id,
            owner_id: new.owner_id,
            name: new.name,
            slug: new.slug,
            description: new.description,
            background_image: new.background_image,
            is_public: new.is_public,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply validated changes. The owner is never touched.
    pub fn apply(&mut self, changes: MapSettingsChanges, now: Timestamp) {
        if let Some(v) = changes.name {
            self.name = v;
        }
        if let Some(v) = changes.slug {
            self.slug = v;
        }
        if let Some(v) = changes.description {
            self.description = v;
        }
        if let Some(v) = changes.background_image {
            self.background_image = v;
        }
        if let Some(v) = changes.is_public {
            self.is_public = v;
        }
        self.updated_at = now;
    }

    /// Whether `user_id` may edit this map and its lots.
    pub fn is_owned_by(&self, user_id: DbId) -> bool {
        self.owner_id == user_id
    }

    /// Fail with `Forbidden` unless `user_id` owns the map.
    pub fn ensure_owner(&self, user_id: DbId) -> Result<(), CoreError> {
        if self.is_owned_by(user_id) {
            Ok(())
        } else {
            Err(CoreError::Forbidden(format!(
                "Map {} belongs to another user",
                self.id
            )))
        }
    }
}

/// Request body for creating map settings. The owner comes from the
/// authenticated caller, never from the payload.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMapSettings {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Derived from `name` when omitted.
    pub slug: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(length(max = 2048))]
    pub background_image: Option<String>,
    /// Defaults to `false`.
    pub is_public: Option<bool>,
}

impl CreateMapSettings {
    pub fn into_new(mut self, owner_id: DbId) -> Result<NewMapSettings, CoreError> {
        self.name = self.name.trim().to_string();
        self.validate()?;
        let slug = resolve_slug(&self.name, self.slug.as_deref())?;
        Ok(NewMapSettings {
            owner_id,
            name: self.name,
            slug,
            description: self.description.and_then(non_blank),
            background_image: self.background_image.and_then(non_blank),
            is_public: self.is_public.unwrap_or(false),
        })
    }
}

/// Request body for patching map settings. All fields are optional.
///
/// Renaming a map keeps its slug so published viewer links stay valid;
/// send `slug` explicitly to change it. An empty `description` or
/// `backgroundImage` clears the field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMapSettings {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub slug: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(length(max = 2048))]
    pub background_image: Option<String>,
    pub is_public: Option<bool>,
}

impl UpdateMapSettings {
    pub fn into_changes(mut self) -> Result<MapSettingsChanges, CoreError> {
        self.name = self.name.map(|n| n.trim().to_string());
        self.validate()?;
        let slug = match self.slug {
            Some(s) => {
                let s = s.trim().to_string();
                validate_slug(&s)?;
                Some(s)
            }
            None => None,
        };
        Ok(MapSettingsChanges {
            name: self.name,
            slug,
            description: self.description.map(non_blank),
            background_image: self.background_image.map(non_blank),
            is_public: self.is_public,
        })
    }
}

/// Validated map settings ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMapSettings {
    pub owner_id: DbId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub background_image: Option<String>,
    pub is_public: bool,
}

/// Validated partial update of map settings.
///
/// For the optional text fields the outer `Option` means "change it" and the
/// inner one is the new value, so `Some(None)` clears.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapSettingsChanges {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<Option<String>>,
    pub background_image: Option<Option<String>>,
    pub is_public: Option<bool>,
}

fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn create(name: &str) -> CreateMapSettings {
        CreateMapSettings {
            name: name.to_string(),
            slug: None,
            description: None,
            background_image: None,
            is_public: None,
        }
    }

    #[test]
    fn slug_is_derived_when_absent() {
        let new = create("Sunset Ridge Phase 2").into_new(1).unwrap();
        assert_eq!(new.slug, "sunset-ridge-phase-2");
        assert!(!new.is_public);
        assert_eq!(new.owner_id, 1);
    }

    #[test]
    fn empty_name_is_rejected() {
        assert_matches!(create("").into_new(1), Err(CoreError::Validation(_)));
    }

    #[test]
    fn update_validates_slug() {
        let dto = UpdateMapSettings {
            slug: Some("Not A Slug".into()),
            ..Default::default()
        };
        assert_matches!(dto.into_changes(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn rename_keeps_slug() {
        let now = chrono::Utc::now();
        let mut map = MapSettings::from_new(4, create("Old Name").into_new(9).unwrap(), now);
        let changes = UpdateMapSettings {
            name: Some("New Name".into()),
            ..Default::default()
        }
        .into_changes()
        .unwrap();
        map.apply(changes, now);
        assert_eq!(map.name, "New Name");
        assert_eq!(map.slug, "old-name");
        assert_eq!(map.owner_id, 9);
    }

    #[test]
    fn blank_name_is_rejected_even_with_explicit_slug() {
        let mut dto = create("   ");
        dto.slug = Some("valid-slug".into());
        assert_matches!(dto.into_new(1), Err(CoreError::Validation(_)));

        let dto = UpdateMapSettings {
            name: Some("  ".into()),
            ..Default::default()
        };
        assert_matches!(dto.into_changes(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn empty_string_clears_optional_text() {
        let now = chrono::Utc::now();
        let mut dto = create("Plat");
        dto.description = Some("Phase one".into());
        dto.background_image = Some("https://cdn.example.com/plat.png".into());
        let mut map = MapSettings::from_new(4, dto.into_new(9).unwrap(), now);

        let changes = UpdateMapSettings {
            description: Some(String::new()),
            ..Default::default()
        }
        .into_changes()
        .unwrap();
        assert_eq!(changes.description, Some(None));
        assert_eq!(changes.background_image, None);

        map.apply(changes, now);
        assert_eq!(map.description, None);
        assert_eq!(
            map.background_image.as_deref(),
            Some("https://cdn.example.com/plat.png")
        );
    }

    #[test]
    fn only_owner_passes_ownership_check() {
        let now = chrono::Utc::now();
        let map = MapSettings::from_new(4, create("Owned").into_new(9).unwrap(), now);
        assert!(map.ensure_owner(9).is_ok());
        assert_matches!(map.ensure_owner(10), Err(CoreError::Forbidden(_)));
    }
}
