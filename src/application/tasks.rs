use crate::application::lookup::{entities, inbox_id, non_empty, resolve_project_id};
use crate::application::params::{
    AddTaskParams, EditTaskParams, ListTasksParams, MoveTaskParams, SetSubtaskParams,
    TaskRefParams, TaskStatus,
};
use crate::domain::models::{ChecklistItem, Priority, Project};
use crate::domain::temporal::{ParsedDateTime, parse_datetime, parse_duration};
use crate::infrastructure::error::InfraError;
use crate::infrastructure::ticktick_client::TickTickApi;
use serde_json::{Map, Value, json};

fn parse_priority(value: &str) -> Result<Priority, InfraError> {
    value.parse().map_err(InfraError::InvalidInput)
}

fn parse_optional_datetime(value: Option<&str>) -> Result<Option<ParsedDateTime>, InfraError> {
    Ok(non_empty(value).map(parse_datetime).transpose()?)
}

/// The `tasks` array of a project-data or trash payload.
fn tasks_of(mut data: Value) -> Vec<Value> {
    match data.get_mut("tasks").map(Value::take) {
        Some(Value::Array(tasks)) => tasks,
        _ => Vec::new(),
    }
}

pub async fn list_tasks<A>(api: &A, params: ListTasksParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let project = non_empty(params.project.as_deref());

    match (params.status, project) {
        (TaskStatus::Completed, Some(project)) => {
            let pid = resolve_project_id(api, project).await?;
            api.v2_get(&format!("/project/{pid}/completed")).await
        }
        (TaskStatus::Completed, None) => {
            api.v2_get(&format!("/project/all/completedInAll/?limit={}", params.limit))
                .await
        }
        (TaskStatus::Active, Some(project)) => {
            let pid = resolve_project_id(api, project).await?;
            let data = api.v1_get(&format!("/project/{pid}/data")).await?;
            Ok(Value::Array(tasks_of(data)))
        }
        (TaskStatus::Active, None) => list_all_active_tasks(api).await,
    }
}

async fn list_all_active_tasks<A>(api: &A) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let projects: Vec<Project> = entities(api.v1_get("/project").await?)?;
    let mut all_tasks = Vec::new();

    for project in &projects {
        match api.v1_get(&format!("/project/{}/data", project.id)).await {
            Ok(data) => all_tasks.extend(tasks_of(data)),
            Err(error) => {
                tracing::warn!(project = %project.id, %error, "skipping project while listing tasks");
            }
        }
    }

    let inbox = async {
        let inbox_id = inbox_id(api).await?;
        api.v1_get(&format!("/project/{inbox_id}/data")).await
    };
    match inbox.await {
        Ok(data) => all_tasks.extend(tasks_of(data)),
        Err(error) => tracing::warn!(%error, "skipping inbox while listing tasks"),
    }

    Ok(Value::Array(all_tasks))
}

pub async fn get_task<A>(api: &A, params: TaskRefParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let pid = resolve_project_id(api, &params.project).await?;
    api.v1_get(&format!("/project/{pid}/task/{}", params.task_id))
        .await
}

pub async fn add_task<A>(api: &A, params: AddTaskParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let mut body = Map::new();
    body.insert("title".into(), json!(params.title));

    if let Some(project) = non_empty(params.project.as_deref()) {
        body.insert("projectId".into(), json!(resolve_project_id(api, project).await?));
    }

    let priority = parse_priority(&params.priority)?;
    if priority != Priority::None {
        body.insert("priority".into(), json!(priority.level()));
    }

    if let Some(tags) = params.tags.filter(|tags| !tags.is_empty()) {
        body.insert("tags".into(), json!(tags));
    }
    if let Some(content) = params.content {
        body.insert("content".into(), json!(content));
    }
    if let Some(desc) = params.desc {
        body.insert("desc".into(), json!(desc));
    }
    if let Some(items) = params.items.filter(|items| !items.is_empty()) {
        let items: Vec<ChecklistItem> = items.into_iter().map(ChecklistItem::open).collect();
        body.insert("items".into(), serde_json::to_value(items)?);
    }

    let timezone = params.timezone.as_deref();
    let parsed_due = parse_optional_datetime(params.due.as_deref())?;
    let parsed_start = parse_optional_datetime(params.start.as_deref())?;

    if let Some(due) = parsed_due {
        body.insert("dueDate".into(), json!(due.to_api_string(timezone)?));
        body.insert(
            "isAllDay".into(),
            json!(params.all_day.unwrap_or(due.is_all_day())),
        );
    }

    if let Some(start) = parsed_start {
        body.insert("startDate".into(), json!(start.to_api_string(timezone)?));
        if params.all_day.is_none() && !body.contains_key("isAllDay") {
            body.insert("isAllDay".into(), json!(start.is_all_day()));
        }
    }

    if let Some(duration) = non_empty(params.duration.as_deref()) {
        let duration = parse_duration(duration)?;
        let base = parsed_start.or(parsed_due).ok_or_else(|| {
            InfraError::InvalidInput(
                "Duration requires a start or due date with a time component".to_string(),
            )
        })?;
        if base.is_all_day() {
            return Err(InfraError::InvalidInput(
                "Duration requires a date with a time component (use YYYY-MM-DDTHH:MM)"
                    .to_string(),
            ));
        }

        let end = base.add_duration(duration)?;
        match (parsed_start, parsed_due) {
            (Some(_), None) => {
                body.insert("dueDate".into(), json!(end.to_api_string(timezone)?));
            }
            (None, Some(due)) => {
                body.insert("startDate".into(), json!(due.to_api_string(timezone)?));
                body.insert("dueDate".into(), json!(end.to_api_string(timezone)?));
            }
            // Both ends were given explicitly; the duration only validates them.
            _ => {}
        }
    }

    if let Some(timezone) = non_empty(timezone) {
        body.insert("timeZone".into(), json!(timezone));
    }

    api.v1_post("/task", Value::Object(body)).await
}

pub async fn edit_task<A>(api: &A, params: EditTaskParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let pid = resolve_project_id(api, &params.project).await?;
    let mut body = Map::new();
    body.insert("taskId".into(), json!(params.task_id));
    body.insert("projectId".into(), json!(pid));

    if let Some(title) = params.title {
        body.insert("title".into(), json!(title));
    }
    if let Some(tags) = params.tags {
        body.insert("tags".into(), json!(tags));
    }
    if let Some(content) = params.content {
        body.insert("content".into(), json!(content));
    }
    if let Some(desc) = params.desc {
        body.insert("desc".into(), json!(desc));
    }
    if let Some(priority) = params.priority.as_deref() {
        body.insert("priority".into(), json!(parse_priority(priority)?.level()));
    }

    let timezone = params.timezone.as_deref();
    if params.clear_due {
        body.insert("dueDate".into(), Value::Null);
    } else if let Some(due) = parse_optional_datetime(params.due.as_deref())? {
        body.insert("dueDate".into(), json!(due.to_api_string(timezone)?));
        body.insert("isAllDay".into(), json!(due.is_all_day()));
    }

    if params.clear_start {
        body.insert("startDate".into(), Value::Null);
    } else if let Some(start) = parse_optional_datetime(params.start.as_deref())? {
        body.insert("startDate".into(), json!(start.to_api_string(timezone)?));
    }

    if let Some(timezone) = non_empty(timezone) {
        body.insert("timeZone".into(), json!(timezone));
    }

    api.v1_post(&format!("/task/{}", params.task_id), Value::Object(body))
        .await
}

pub async fn complete_task<A>(api: &A, params: TaskRefParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let pid = resolve_project_id(api, &params.project).await?;
    api.v1_post_empty(&format!("/project/{pid}/task/{}/complete", params.task_id))
        .await?;
    Ok(json!(format!("Task {} completed", params.task_id)))
}

pub async fn delete_task<A>(api: &A, params: TaskRefParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let pid = resolve_project_id(api, &params.project).await?;
    api.v1_delete(&format!("/project/{pid}/task/{}", params.task_id))
        .await?;
    Ok(json!(format!("Task {} deleted", params.task_id)))
}

pub async fn move_task<A>(api: &A, params: MoveTaskParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let from_pid = resolve_project_id(api, &params.from_project).await?;
    let to_pid = resolve_project_id(api, &params.to_project).await?;
    api.v2_post(
        "/batch/taskProject",
        json!([{
            "taskId": params.task_id,
            "fromProjectId": from_pid,
            "toProjectId": to_pid,
        }]),
    )
    .await?;
    Ok(json!(format!(
        "Task {} moved to {}",
        params.task_id, params.to_project
    )))
}

pub async fn set_subtask<A>(api: &A, params: SetSubtaskParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let pid = resolve_project_id(api, &params.project).await?;
    api.v2_post(
        "/batch/taskParent",
        json!([{
            "taskId": params.task_id,
            "parentId": params.parent_id,
            "projectId": pid,
        }]),
    )
    .await?;
    Ok(json!(format!(
        "Task {} is now a subtask of {}",
        params.task_id, params.parent_id
    )))
}

pub async fn unparent_task<A>(api: &A, params: TaskRefParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let pid = resolve_project_id(api, &params.project).await?;
    api.v1_post(
        &format!("/task/{}", params.task_id),
        json!({"taskId": params.task_id, "projectId": pid, "parentId": ""}),
    )
    .await
}

pub async fn list_trash<A>(api: &A) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let data = api.v2_get("/project/all/trash/page").await?;
    Ok(Value::Array(tasks_of(data)))
}
