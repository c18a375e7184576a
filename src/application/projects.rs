use crate::application::lookup::{non_empty, resolve_folder, resolve_project_id};
use crate::application::params::{AddProjectParams, EditProjectParams, ProjectParams};
use crate::infrastructure::error::InfraError;
use crate::infrastructure::ticktick_client::TickTickApi;
use serde_json::{Map, Value, json};

/// Sentinel group id the API reads as "no folder".
const NO_FOLDER: &str = "NONE";

pub async fn list_projects<A>(api: &A) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    api.v1_get("/project").await
}

pub async fn get_project<A>(api: &A, params: ProjectParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let pid = resolve_project_id(api, &params.project).await?;
    api.v1_get(&format!("/project/{pid}")).await
}

pub async fn add_project<A>(api: &A, params: AddProjectParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let mut body = Map::new();
    body.insert("name".into(), json!(params.name));

    if let Some(color) = non_empty(params.color.as_deref()) {
        body.insert("color".into(), json!(color));
    }
    if let Some(view_mode) = non_empty(params.view_mode.as_deref()) {
        body.insert("viewMode".into(), json!(view_mode));
    }
    if let Some(kind) = non_empty(params.kind.as_deref()) {
        body.insert("kind".into(), json!(kind));
    }
    if let Some(folder) = non_empty(params.folder.as_deref()) {
        let (folder_id, _) = resolve_folder(api, folder).await?;
        body.insert("groupId".into(), json!(folder_id));
    }

    api.v1_post("/project", Value::Object(body)).await
}

pub async fn edit_project<A>(api: &A, params: EditProjectParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let pid = resolve_project_id(api, &params.project).await?;
    let mut body = Map::new();
    body.insert("id".into(), json!(pid));

    if let Some(name) = params.name {
        body.insert("name".into(), json!(name));
    }
    if let Some(color) = params.color {
        body.insert("color".into(), json!(color));
    }
    if let Some(view_mode) = params.view_mode {
        body.insert("viewMode".into(), json!(view_mode));
    }

    if params.remove_folder {
        body.insert("groupId".into(), json!(NO_FOLDER));
    } else if let Some(folder) = non_empty(params.folder.as_deref()) {
        let (folder_id, _) = resolve_folder(api, folder).await?;
        body.insert("groupId".into(), json!(folder_id));
    }

    api.v1_post(&format!("/project/{pid}"), Value::Object(body))
        .await
}

pub async fn delete_project<A>(api: &A, params: ProjectParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let pid = resolve_project_id(api, &params.project).await?;
    api.v1_delete(&format!("/project/{pid}")).await?;
    Ok(json!(format!("Project {} deleted", params.project)))
}
