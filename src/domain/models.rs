use crate::domain::resolve::{NamedEntity, VersionedEntity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    None,
    Low,
    Medium,
    High,
}

impl Priority {
    /// Numeric level understood by the TickTick API.
    pub fn level(self) -> i32 {
        match self {
            Priority::None => 0,
            Priority::Low => 1,
            Priority::Medium => 3,
            Priority::High => 5,
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "none" => Ok(Priority::None),
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(format!(
                "Invalid priority '{value}'. Use: none, low, medium, high"
            )),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ChecklistItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub status: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_all_day: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
}

impl ChecklistItem {
    pub fn open(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub sort_order: i64,
    pub closed: bool,
    pub group_id: Option<String>,
    pub view_mode: Option<String>,
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Habit {
    pub id: String,
    pub name: Option<String>,
    pub icon_res: Option<String>,
    pub color: Option<String>,
    pub sort_order: Option<i64>,
    pub status: Option<i32>,
    pub encouragement: Option<String>,
    pub total_check_ins: Option<i64>,
    pub current_streak: Option<i64>,
    pub created_time: Option<String>,
    pub modified_time: Option<String>,
    #[serde(rename = "type")]
    pub habit_type: Option<String>,
    pub goal: Option<f64>,
    pub step: Option<f64>,
    pub unit: Option<String>,
    pub record_enable: Option<bool>,
    pub repeat_rule: Option<String>,
    pub section_id: Option<String>,
    pub target_days: Option<i64>,
    pub target_start_date: Option<i64>,
    pub completed_cycles: Option<i64>,
    pub etag: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct HabitCheckin {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub habit_id: String,
    pub checkin_stamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkin_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub op_time: Option<String>,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<f64>,
    pub status: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct HabitSection {
    pub id: String,
    pub name: String,
    pub sort_order: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Filter {
    pub id: String,
    pub name: String,
    pub rule: Option<String>,
    pub sort_order: Option<i64>,
    pub sort_type: Option<String>,
    pub etag: Option<String>,
}

/// A project folder. The API calls these project groups.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectGroup {
    pub id: String,
    pub etag: Option<String>,
    pub name: String,
    pub show_all: Option<bool>,
    pub sort_order: Option<i64>,
    pub sort_type: Option<String>,
    pub view_mode: Option<String>,
}

impl NamedEntity for Project {
    fn entity_id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl NamedEntity for HabitSection {
    fn entity_id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl NamedEntity for Habit {
    fn entity_id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

impl VersionedEntity for Habit {
    fn etag(&self) -> &str {
        self.etag.as_deref().unwrap_or_default()
    }
}

impl NamedEntity for Filter {
    fn entity_id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl VersionedEntity for Filter {
    fn etag(&self) -> &str {
        self.etag.as_deref().unwrap_or_default()
    }
}

impl NamedEntity for ProjectGroup {
    fn entity_id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl VersionedEntity for ProjectGroup {
    fn etag(&self) -> &str {
        self.etag.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OAuthToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// `None` when the token was supplied out of band and its lifetime is unknown.
    pub expires_at: Option<DateTime<Utc>>,
    pub token_type: String,
    pub scope: Option<String>,
}

impl OAuthToken {
    pub fn bearer(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_at: None,
            token_type: "Bearer".to_string(),
            scope: None,
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>, leeway_seconds: i64) -> bool {
        if self.access_token.trim().is_empty() {
            return false;
        }
        match self.expires_at {
            Some(expires_at) => expires_at > now + chrono::Duration::seconds(leeway_seconds),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::resolve::{resolve_name, resolve_name_with_etag};
    use serde_json::json;

    fn fixed_time(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .expect("valid datetime")
            .with_timezone(&Utc)
    }

    #[test]
    fn priority_parses_case_insensitively() {
        assert_eq!("HIGH".parse::<Priority>().expect("high").level(), 5);
        assert_eq!("medium".parse::<Priority>().expect("medium").level(), 3);
        assert_eq!("Low".parse::<Priority>().expect("low").level(), 1);
        assert_eq!("none".parse::<Priority>().expect("none").level(), 0);
    }

    #[test]
    fn priority_rejects_unknown_level() {
        let error = "urgent".parse::<Priority>().expect_err("invalid");
        assert_eq!(error, "Invalid priority 'urgent'. Use: none, low, medium, high");
    }

    #[test]
    fn habit_type_maps_to_type_field() {
        let habit: Habit = serde_json::from_value(json!({
            "id": "h1",
            "name": null,
            "type": "Numeric",
            "goal": 8.0,
            "etag": "e1"
        }))
        .expect("habit payload");

        assert_eq!(habit.habit_type.as_deref(), Some("Numeric"));
        assert_eq!(habit.display_name(), "");
        assert_eq!(habit.etag(), "e1");
    }

    #[test]
    fn checklist_items_serialize_without_empty_fields() {
        let value = serde_json::to_value(ChecklistItem::open("Eggs")).expect("serialize");
        assert_eq!(value, json!({"title": "Eggs", "status": 0}));
    }

    #[test]
    fn models_plug_into_resolver() {
        let groups: Vec<ProjectGroup> = serde_json::from_value(json!([
            {"id": "g1", "name": "Work", "etag": "abc"},
            {"id": "g2", "name": "Home"}
        ]))
        .expect("groups payload");

        assert_eq!(
            resolve_name_with_etag("work", &groups, "folder").expect("folder"),
            ("g1".to_string(), "abc".to_string())
        );

        let projects = vec![Project {
            id: "p1".to_string(),
            name: "Groceries".to_string(),
            ..Project::default()
        }];
        assert_eq!(resolve_name("groc", &projects, "project").expect("project"), "p1");
    }

    #[test]
    fn token_without_expiry_stays_valid() {
        let token = OAuthToken::bearer("access", None);
        assert!(token.is_valid_at(fixed_time("2030-01-01T00:00:00Z"), 60));
    }

    #[test]
    fn token_expiry_respects_leeway() {
        let mut token = OAuthToken::bearer("access", Some("refresh".to_string()));
        token.expires_at = Some(fixed_time("2026-02-16T10:00:00Z"));

        assert!(token.is_valid_at(fixed_time("2026-02-16T09:58:00Z"), 60));
        assert!(!token.is_valid_at(fixed_time("2026-02-16T09:59:30Z"), 60));

        token.access_token = "  ".to_string();
        assert!(!token.is_valid_at(fixed_time("2026-02-16T09:00:00Z"), 60));
    }
}
