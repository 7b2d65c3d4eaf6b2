use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

/// A row of the `farm` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Farm {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: Option<i32>,
}

impl Farm {
    /// Apply a sparse patch. Fields absent from the patch are left untouched.
    pub fn apply(&mut self, patch: &FarmUpdate) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
    }

    pub fn is_owned_by(&self, user_id: i32) -> bool {
        self.owner_id == Some(user_id)
    }
}

/// Body of `POST /farms`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmCreate {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of `PUT /farms/:id`.
///
/// Outer `None` means the field was not sent. For `description`,
/// `Some(None)` means an explicit `null` and clears the column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FarmUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "reject_null")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_optional_field")]
    pub description: Option<Option<String>>,
}

/// absent -> None, null -> Some(None), value -> Some(Some(value))
fn deserialize_optional_field<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// `name` is NOT NULL in storage, so an explicit null is a malformed patch
fn reject_null<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(value) => Ok(Some(value)),
        None => Err(serde::de::Error::custom("name: may not be null")),
    }
}

/// Single farm as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmOut {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

impl From<Farm> for FarmOut {
    fn from(farm: Farm) -> Self {
        Self {
            id: farm.id,
            name: farm.name,
            description: farm.description,
        }
    }
}

/// One page of farms plus the total row count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmsOut {
    pub data: Vec<FarmOut>,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn green_acres() -> Farm {
        Farm {
            id: 7,
            name: "Green Acres".to_string(),
            description: Some("dairy".to_string()),
            owner_id: Some(1),
        }
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let patch: FarmUpdate = serde_json::from_value(json!({})).unwrap();
        assert!(patch.name.is_none() && patch.description.is_none());

        let mut farm = green_acres();
        farm.apply(&patch);
        assert_eq!(farm, green_acres());
    }

    #[test]
    fn description_only_patch_keeps_name() {
        let patch: FarmUpdate = serde_json::from_value(json!({ "description": "beef" })).unwrap();
        let mut farm = green_acres();
        farm.apply(&patch);
        assert_eq!(farm.name, "Green Acres");
        assert_eq!(farm.description.as_deref(), Some("beef"));
    }

    #[test]
    fn null_description_clears_it() {
        let patch: FarmUpdate = serde_json::from_value(json!({ "description": null })).unwrap();
        assert_eq!(patch.description, Some(None));

        let mut farm = green_acres();
        farm.apply(&patch);
        assert_eq!(farm.description, None);
    }

    #[test]
    fn null_name_is_rejected() {
        let parsed = serde_json::from_value::<FarmUpdate>(json!({ "name": null }));
        assert!(parsed.is_err());
    }

    #[test]
    fn create_requires_name() {
        assert!(serde_json::from_value::<FarmCreate>(json!({ "description": "x" })).is_err());

        let create: FarmCreate = serde_json::from_value(json!({ "name": "Hilltop" })).unwrap();
        assert_eq!(create.description, None);
    }

    #[test]
    fn output_hides_owner() {
        let out = serde_json::to_value(FarmOut::from(green_acres())).unwrap();
        assert_eq!(out, json!({ "id": 7, "name": "Green Acres", "description": "dairy" }));
    }

    #[test]
    fn ownership_check() {
        let farm = green_acres();
        assert!(farm.is_owned_by(1));
        assert!(!farm.is_owned_by(2));

        let orphan = Farm { owner_id: None, ..green_acres() };
        assert!(!orphan.is_owned_by(1));
    }
}
