use crate::domain::models::{Filter, Habit, HabitSection, Project, ProjectGroup};
use crate::domain::resolve::{ResolveError, resolve_name, resolve_name_with_etag};
use crate::infrastructure::error::InfraError;
use crate::infrastructure::ticktick_client::TickTickApi;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

const INBOX_PLACEHOLDER_TITLE: &str = "__inbox_placeholder__";

/// Decodes a backend list, treating `null` as empty.
pub fn entities<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, InfraError> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_value(value)?)
}

/// Takes `key` out of an account-state payload, defaulting to an empty list.
pub fn take_list(mut state: Value, key: &str) -> Value {
    match state.get_mut(key).map(Value::take) {
        Some(Value::Null) | None => json!([]),
        Some(list) => list,
    }
}

pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

fn is_inbox_literal(project: &str) -> bool {
    project
        .strip_prefix("inbox")
        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|ch| ch.is_ascii_digit()))
}

/// Project name, id, or `inbox` to a project id.
pub async fn resolve_project_id<A>(api: &A, project: &str) -> Result<String, InfraError>
where
    A: TickTickApi + ?Sized,
{
    if project.eq_ignore_ascii_case("inbox") {
        return inbox_id(api).await;
    }
    if is_inbox_literal(project) {
        return Ok(project.to_string());
    }

    let projects: Vec<Project> = entities(api.v1_get("/project").await?)?;
    Ok(resolve_name(project, &projects, "project")?)
}

/// The inbox is missing from `/project`, so its id is discovered by creating and
/// deleting a throwaway task. The result is cached for the life of the client.
pub async fn inbox_id<A>(api: &A) -> Result<String, InfraError>
where
    A: TickTickApi + ?Sized,
{
    if let Some(cached) = api.cached_inbox_id() {
        return Ok(cached);
    }

    let placeholder = api
        .v1_post("/task", json!({ "title": INBOX_PLACEHOLDER_TITLE }))
        .await?;
    let inbox_id = placeholder
        .get("projectId")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| InfraError::InvalidInput("Could not discover inbox project ID".to_string()))?;

    if let Some(task_id) = placeholder.get("id").and_then(Value::as_str) {
        let endpoint = format!("/project/{inbox_id}/task/{task_id}");
        if let Err(error) = api.v1_delete(&endpoint).await {
            tracing::warn!(%error, task_id, "failed to delete inbox placeholder task");
        }
    }

    tracing::debug!(inbox_id = %inbox_id, "discovered inbox project");
    api.remember_inbox_id(inbox_id.clone());
    Ok(inbox_id)
}

pub async fn resolve_folder<A>(api: &A, folder: &str) -> Result<(String, String), InfraError>
where
    A: TickTickApi + ?Sized,
{
    let groups: Vec<ProjectGroup> = entities(take_list(api.batch_check().await?, "projectGroups"))?;
    Ok(resolve_name_with_etag(folder, &groups, "folder")?)
}

pub async fn resolve_filter<A>(api: &A, filter: &str) -> Result<(String, String), InfraError>
where
    A: TickTickApi + ?Sized,
{
    let filters: Vec<Filter> = entities(take_list(api.batch_check().await?, "filters"))?;
    Ok(resolve_name_with_etag(filter, &filters, "filter")?)
}

pub async fn resolve_habit<A>(api: &A, habit: &str) -> Result<(String, String), InfraError>
where
    A: TickTickApi + ?Sized,
{
    let habits: Vec<Habit> = entities(api.v2_get("/habits").await?)?;
    Ok(resolve_name_with_etag(habit, &habits, "habit")?)
}

pub async fn resolve_section<A>(api: &A, section: &str) -> Result<String, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let sections: Vec<HabitSection> = entities(api.v2_get("/habitSections").await?)?;
    // Section errors name "section" and never carry a suggestion.
    match resolve_name(section, &sections, "habit section") {
        Ok(id) => Ok(id),
        Err(ResolveError::AmbiguousMatch { query, names, .. }) => Err(ResolveError::AmbiguousMatch {
            entity_type: "section".to_string(),
            query,
            names,
        }
        .into()),
        Err(ResolveError::NotFound {
            entity_type, query, ..
        }) => Err(ResolveError::NotFound {
            entity_type,
            query,
            suggestion: None,
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::FakeApi;

    fn projects() -> Value {
        json!([
            {"id": "aaaaaaaaaaaaaaaaaaaaaaa1", "name": "Shopping"},
            {"id": "aaaaaaaaaaaaaaaaaaaaaaa2", "name": "Work Tasks"},
            {"id": "aaaaaaaaaaaaaaaaaaaaaaa3", "name": "Personal"}
        ])
    }

    #[tokio::test]
    async fn project_names_resolve_against_project_list() {
        let api = FakeApi::new().on("v1 GET /project", projects());
        let id = resolve_project_id(&api, "work").await.expect("resolve");
        assert_eq!(id, "aaaaaaaaaaaaaaaaaaaaaaa2");
    }

    #[tokio::test]
    async fn project_typo_reports_suggestion() {
        let api = FakeApi::new().on("v1 GET /project", projects());
        let error = resolve_project_id(&api, "Shoping").await.expect_err("typo");
        assert_eq!(error.code(), "not_found");
        assert_eq!(
            error.to_string(),
            "No project found matching 'Shoping'. Did you mean 'Shopping'?"
        );
    }

    #[tokio::test]
    async fn inbox_literal_ids_pass_through() {
        let api = FakeApi::new();
        let id = resolve_project_id(&api, "inbox118958109").await.expect("literal");
        assert_eq!(id, "inbox118958109");
        assert!(api.calls().is_empty());

        let api = FakeApi::new().on("v1 GET /project", projects());
        let error = resolve_project_id(&api, "Inbox118958109").await.expect_err("case sensitive");
        assert_eq!(error.code(), "not_found");
    }

    #[tokio::test]
    async fn inbox_is_discovered_once_then_cached() {
        let api = FakeApi::new().on(
            "v1 POST /task",
            json!({"id": "tmp1", "projectId": "inbox42"}),
        );

        assert_eq!(resolve_project_id(&api, "INBOX").await.expect("inbox"), "inbox42");
        assert_eq!(resolve_project_id(&api, "inbox").await.expect("cached"), "inbox42");

        assert_eq!(
            api.keys(),
            vec!["v1 POST /task", "v1 DELETE /project/inbox42/task/tmp1"]
        );
        assert_eq!(api.body_of("v1 POST /task"), json!({"title": "__inbox_placeholder__"}));
    }

    #[tokio::test]
    async fn placeholder_cleanup_failure_is_ignored() {
        let api = FakeApi::new()
            .on("v1 POST /task", json!({"id": "tmp1", "projectId": "inbox42"}))
            .failing("v1 DELETE /project/inbox42/task/tmp1");
        assert_eq!(inbox_id(&api).await.expect("inbox"), "inbox42");
    }

    #[tokio::test]
    async fn placeholder_without_project_id_fails() {
        let api = FakeApi::new().on("v1 POST /task", json!({"id": "tmp1"}));
        let error = inbox_id(&api).await.expect_err("no project id");
        assert_eq!(error.to_string(), "Could not discover inbox project ID");
        assert_eq!(api.cached_inbox_id(), None);
    }

    #[tokio::test]
    async fn folders_resolve_with_etag_from_account_state() {
        let api = FakeApi::new().on(
            "v2 GET /batch/check/0",
            json!({"projectGroups": [
                {"id": "g1", "name": "Errands", "etag": "e1"},
                {"id": "g2", "name": "Work", "etag": "e2"}
            ]}),
        );
        let (id, etag) = resolve_folder(&api, "work").await.expect("folder");
        assert_eq!((id.as_str(), etag.as_str()), ("g2", "e2"));
    }

    #[tokio::test]
    async fn missing_filter_list_counts_as_empty() {
        let api = FakeApi::new().on("v2 GET /batch/check/0", json!({"filters": null}));
        let error = resolve_filter(&api, "Today").await.expect_err("empty");
        assert_eq!(error.to_string(), "No filter found matching 'Today'");
    }

    #[tokio::test]
    async fn ambiguous_section_lists_candidates() {
        let api = FakeApi::new().on(
            "v2 GET /habitSections",
            json!([{"id": "s1", "name": "_morning"}, {"id": "s2", "name": "_morning run"}, {"id": "s3", "name": "_night"}]),
        );
        let error = resolve_section(&api, "morn").await.expect_err("ambiguous");
        assert_eq!(error.code(), "ambiguous_match");
        assert_eq!(
            error.to_string(),
            "Multiple sections match 'morn': _morning, _morning run. Use a more specific name or the full ID."
        );
    }

    #[tokio::test]
    async fn section_miss_has_no_suggestion() {
        let api = FakeApi::new().on(
            "v2 GET /habitSections",
            json!([{"id": "s1", "name": "_morning"}, {"id": "s2", "name": "_night"}]),
        );
        let error = resolve_section(&api, "_nigth").await.expect_err("miss");
        assert_eq!(error.code(), "not_found");
        assert_eq!(error.to_string(), "No habit section found matching '_nigth'");
    }

    #[tokio::test]
    async fn unknown_literal_habit_id_passes_with_empty_etag() {
        let api = FakeApi::new().on("v2 GET /habits", json!([{"id": "h1", "name": "Read", "etag": "x"}]));
        let (id, etag) = resolve_habit(&api, "0123456789abcdef0123").await.expect("literal");
        assert_eq!(id, "0123456789abcdef0123");
        assert_eq!(etag, "");
    }
}
