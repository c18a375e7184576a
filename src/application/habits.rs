use crate::application::lookup::{non_empty, resolve_habit, resolve_section};
use crate::application::params::{
    AddHabitParams, CheckinHabitParams, EditHabitParams, HabitLogParams, HabitSectionsParams,
    HabitsParams, SectionAction,
};
use crate::domain::models::HabitCheckin;
use crate::domain::temporal::date_to_stamp;
use crate::infrastructure::error::InfraError;
use crate::infrastructure::ticktick_client::TickTickApi;
use serde_json::{Map, Value, json};

const HABIT_ARCHIVED: i32 = 1;

fn required<'a>(value: Option<&'a str>, field: &str, action: &str) -> Result<&'a str, InfraError> {
    non_empty(value).ok_or_else(|| {
        InfraError::InvalidInput(format!("'{field}' is required for action='{action}'"))
    })
}

async fn resolve_habit_ids<A>(api: &A, habits: &[String]) -> Result<Vec<String>, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let mut ids = Vec::with_capacity(habits.len());
    for habit in habits {
        let (id, _) = resolve_habit(api, habit).await?;
        ids.push(id);
    }
    Ok(ids)
}

pub async fn list_habits<A>(api: &A) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    api.v2_get("/habits").await
}

pub async fn add_habit<A>(api: &A, params: AddHabitParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let mut habit = Map::new();
    habit.insert("name".into(), json!(params.name));
    habit.insert("type".into(), json!(params.habit_type));

    if let Some(goal) = params.goal {
        habit.insert("goal".into(), json!(goal));
    }
    if let Some(unit) = params.unit {
        habit.insert("unit".into(), json!(unit));
    }
    if let Some(section) = non_empty(params.section.as_deref()) {
        habit.insert("sectionId".into(), json!(resolve_section(api, section).await?));
    }
    if let Some(repeat_rule) = params.repeat_rule {
        habit.insert("repeatRule".into(), json!(repeat_rule));
    }
    if let Some(color) = params.color {
        habit.insert("color".into(), json!(color));
    }

    api.v2_post("/habits/batch", json!({ "add": [habit] })).await
}

pub async fn edit_habit<A>(api: &A, params: EditHabitParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let (id, etag) = resolve_habit(api, &params.habit).await?;
    let mut update = Map::new();
    update.insert("id".into(), json!(id));
    update.insert("etag".into(), json!(etag));

    if let Some(name) = params.name {
        update.insert("name".into(), json!(name));
    }
    if let Some(goal) = params.goal {
        update.insert("goal".into(), json!(goal));
    }
    if let Some(unit) = params.unit {
        update.insert("unit".into(), json!(unit));
    }
    if let Some(section) = non_empty(params.section.as_deref()) {
        update.insert("sectionId".into(), json!(resolve_section(api, section).await?));
    }
    if let Some(repeat_rule) = params.repeat_rule {
        update.insert("repeatRule".into(), json!(repeat_rule));
    }
    if let Some(color) = params.color {
        update.insert("color".into(), json!(color));
    }

    api.v2_post("/habits/batch", json!({ "update": [update] }))
        .await
}

pub async fn delete_habits<A>(api: &A, params: HabitsParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let ids = resolve_habit_ids(api, &params.habits).await?;
    api.v2_post("/habits/batch", json!({ "delete": ids })).await?;
    Ok(json!(format!("Deleted {} habit(s)", ids.len())))
}

pub async fn checkin_habit<A>(api: &A, params: CheckinHabitParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let (habit_id, _) = resolve_habit(api, &params.habit).await?;
    let checkin = HabitCheckin {
        habit_id,
        checkin_stamp: date_to_stamp(&params.date)?,
        value: params.value,
        status: 0,
        ..HabitCheckin::default()
    };
    api.v2_post("/habitCheckins/batch", json!({ "add": [checkin] }))
        .await
}

pub async fn habit_log<A>(api: &A, params: HabitLogParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let ids = resolve_habit_ids(api, &params.habits).await?;
    let after_stamp = date_to_stamp(&params.after)?;
    api.v2_post(
        "/habitCheckins/query",
        json!({"habitIds": ids, "afterStamp": after_stamp}),
    )
    .await
}

pub async fn archive_habits<A>(api: &A, params: HabitsParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let mut updates = Vec::with_capacity(params.habits.len());
    for habit in &params.habits {
        let (id, etag) = resolve_habit(api, habit).await?;
        updates.push(json!({"id": id, "etag": etag, "status": HABIT_ARCHIVED}));
    }
    api.v2_post("/habits/batch", json!({ "update": updates }))
        .await
}

pub async fn manage_habit_sections<A>(
    api: &A,
    params: HabitSectionsParams,
) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    match params.action {
        SectionAction::List => api.v2_get("/habitSections").await,
        SectionAction::Add => {
            let name = required(params.name.as_deref(), "name", "add")?;
            api.v2_post("/habitSections/batch", json!({"add": [{"name": name}]}))
                .await
        }
        SectionAction::Delete => {
            let sections = params
                .sections
                .filter(|sections| !sections.is_empty())
                .ok_or_else(|| {
                    InfraError::InvalidInput("'sections' is required for action='delete'".to_string())
                })?;
            let mut ids = Vec::with_capacity(sections.len());
            for section in &sections {
                ids.push(resolve_section(api, section).await?);
            }
            api.v2_post("/habitSections/batch", json!({ "delete": ids }))
                .await?;
            Ok(json!(format!("Deleted {} section(s)", ids.len())))
        }
        SectionAction::Rename => {
            let section = required(params.section.as_deref(), "section", "rename")?;
            let new_name = required(params.new_name.as_deref(), "new_name", "rename")?;
            let id = resolve_section(api, section).await?;
            api.v2_post(
                "/habitSections/batch",
                json!({"update": [{"id": id, "name": new_name}]}),
            )
            .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::application::test_support::FakeApi;
    use chrono::{Duration, Local};

    fn api() -> FakeApi {
        FakeApi::new()
            .on(
                "v2 GET /habits",
                json!([
                    {"id": "h1", "name": "Drink water", "etag": "w1", "type": "Numeric", "goal": 8.0},
                    {"id": "h2", "name": "Meditate", "etag": "m1"},
                    {"id": "h3", "name": null, "etag": "n1"}
                ]),
            )
            .on(
                "v2 GET /habitSections",
                json!([{"id": "s1", "name": "_morning"}, {"id": "s2", "name": "_night"}]),
            )
    }

    fn sections(action: SectionAction) -> HabitSectionsParams {
        HabitSectionsParams {
            action,
            name: None,
            section: None,
            new_name: None,
            sections: None,
        }
    }

    #[tokio::test]
    async fn add_habit_resolves_section() {
        let api = api();
        add_habit(
            &api,
            AddHabitParams {
                name: "Stretch".to_string(),
                habit_type: "Boolean".to_string(),
                section: Some("morning".to_string()),
                goal: Some(1.0),
                ..AddHabitParams::default()
            },
        )
        .await
        .expect("add");
        assert_eq!(
            api.body_of("v2 POST /habits/batch"),
            json!({"add": [{"name": "Stretch", "type": "Boolean", "goal": 1.0, "sectionId": "s1"}]})
        );
    }

    #[tokio::test]
    async fn edit_habit_carries_etag() {
        let api = api();
        edit_habit(
            &api,
            EditHabitParams {
                habit: "water".to_string(),
                goal: Some(10.0),
                unit: Some("glasses".to_string()),
                ..EditHabitParams::default()
            },
        )
        .await
        .expect("edit");
        assert_eq!(
            api.body_of("v2 POST /habits/batch"),
            json!({"update": [{"id": "h1", "etag": "w1", "goal": 10.0, "unit": "glasses"}]})
        );
    }

    #[tokio::test]
    async fn checkin_uses_date_stamp() {
        let api = api();
        checkin_habit(
            &api,
            CheckinHabitParams {
                habit: "Meditate".to_string(),
                date: "2026-02-16".to_string(),
                value: 1.0,
            },
        )
        .await
        .expect("checkin");
        assert_eq!(
            api.body_of("v2 POST /habitCheckins/batch"),
            json!({"add": [{"habitId": "h2", "checkinStamp": 20260216, "value": 1.0, "status": 0}]})
        );
    }

    #[tokio::test]
    async fn habit_log_queries_after_yesterday() {
        let api = api();
        habit_log(
            &api,
            HabitLogParams {
                habits: vec!["water".to_string(), "meditate".to_string()],
                after: "yesterday".to_string(),
            },
        )
        .await
        .expect("log");

        let yesterday = Local::now().date_naive() - Duration::days(1);
        let expected_stamp: i64 = yesterday
            .format("%Y%m%d")
            .to_string()
            .parse()
            .expect("numeric stamp");
        assert_eq!(
            api.body_of("v2 POST /habitCheckins/query"),
            json!({"habitIds": ["h1", "h2"], "afterStamp": expected_stamp})
        );
    }

    #[tokio::test]
    async fn archive_and_delete_resolve_every_habit() {
        let api = api();
        archive_habits(
            &api,
            HabitsParams {
                habits: vec!["Meditate".to_string(), "Drink water".to_string()],
            },
        )
        .await
        .expect("archive");
        assert_eq!(
            api.body_of("v2 POST /habits/batch"),
            json!({"update": [
                {"id": "h2", "etag": "m1", "status": 1},
                {"id": "h1", "etag": "w1", "status": 1}
            ]})
        );

        let message = delete_habits(
            &api,
            HabitsParams {
                habits: vec!["meditate".to_string()],
            },
        )
        .await
        .expect("delete");
        assert_eq!(message, json!("Deleted 1 habit(s)"));
        assert_eq!(api.body_of("v2 POST /habits/batch"), json!({"delete": ["h2"]}));
    }

    #[tokio::test]
    async fn invalid_checkin_date_is_a_format_error() {
        let api = api();
        let error = checkin_habit(
            &api,
            CheckinHabitParams {
                habit: "Meditate".to_string(),
                date: "2026-13-01".to_string(),
                value: 1.0,
            },
        )
        .await
        .expect_err("bad date");
        assert_eq!(error.code(), "invalid_format");
    }

    #[tokio::test]
    async fn section_actions_check_their_arguments() {
        let api = api();

        let error = manage_habit_sections(&api, sections(SectionAction::Add))
            .await
            .expect_err("add needs name");
        assert_eq!(error.to_string(), "'name' is required for action='add'");

        let error = manage_habit_sections(
            &api,
            HabitSectionsParams {
                sections: Some(Vec::new()),
                ..sections(SectionAction::Delete)
            },
        )
        .await
        .expect_err("delete needs sections");
        assert_eq!(error.to_string(), "'sections' is required for action='delete'");

        let error = manage_habit_sections(&api, sections(SectionAction::Rename))
            .await
            .expect_err("rename needs section");
        assert_eq!(error.to_string(), "'section' is required for action='rename'");

        let error = manage_habit_sections(
            &api,
            HabitSectionsParams {
                section: Some("night".to_string()),
                ..sections(SectionAction::Rename)
            },
        )
        .await
        .expect_err("rename needs new name");
        assert_eq!(error.to_string(), "'new_name' is required for action='rename'");

        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn section_rename_and_delete_resolve_names() {
        let api = api();
        manage_habit_sections(
            &api,
            HabitSectionsParams {
                section: Some("night".to_string()),
                new_name: Some("_evening".to_string()),
                ..sections(SectionAction::Rename)
            },
        )
        .await
        .expect("rename");
        assert_eq!(
            api.body_of("v2 POST /habitSections/batch"),
            json!({"update": [{"id": "s2", "name": "_evening"}]})
        );

        let message = manage_habit_sections(
            &api,
            HabitSectionsParams {
                sections: Some(vec!["_morning".to_string(), "_night".to_string()]),
                ..sections(SectionAction::Delete)
            },
        )
        .await
        .expect("delete");
        assert_eq!(message, json!("Deleted 2 section(s)"));

        let missing = manage_habit_sections(
            &api,
            HabitSectionsParams {
                sections: Some(vec!["_noon".to_string()]),
                ..sections(SectionAction::Delete)
            },
        )
        .await
        .expect_err("missing");
        assert!(missing.to_string().starts_with("No habit section found matching '_noon'"));
    }
}
