use crate::application::params::{EditTagParams, MergeTagsParams, RenameTagParams, TagNamesParams};
use crate::domain::models::Tag;
use crate::infrastructure::error::InfraError;
use crate::infrastructure::ticktick_client::TickTickApi;
use serde_json::{Value, json};
use url::form_urlencoded;

pub async fn list_tags<A>(api: &A) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    api.v2_get("/tags").await
}

pub async fn add_tags<A>(api: &A, params: TagNamesParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let add: Vec<Tag> = params
        .names
        .into_iter()
        .map(|name| Tag {
            label: Some(name.clone()),
            name,
            ..Tag::default()
        })
        .collect();
    api.v2_post("/batch/tag", json!({ "add": add })).await
}

pub async fn delete_tags<A>(api: &A, params: TagNamesParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    for name in &params.names {
        api.v2_delete(&tag_endpoint(name)).await?;
    }
    Ok(json!(format!("Deleted {} tag(s)", params.names.len())))
}

fn tag_endpoint(name: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("name", name)
        .finish();
    format!("/tag?{query}")
}

pub async fn rename_tag<A>(api: &A, params: RenameTagParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    api.v2_put(
        "/tag/rename",
        json!({"name": params.old_name, "newName": params.new_name}),
    )
    .await?;
    Ok(json!(format!(
        "Tag '{}' renamed to '{}'",
        params.old_name, params.new_name
    )))
}

pub async fn edit_tag<A>(api: &A, params: EditTagParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let parent = if params.clear_parent {
        Some(String::new())
    } else {
        params.parent
    };
    let tag = Tag {
        name: params.name,
        color: params.color,
        parent,
        sort_order: params.sort_order,
        sort_type: params.sort_type,
        ..Tag::default()
    };
    api.v2_post("/batch/tag", json!({ "update": [tag] })).await
}

pub async fn merge_tags<A>(api: &A, params: MergeTagsParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    api.v2_put(
        "/tag/merge",
        json!({"name": params.source, "newName": params.target}),
    )
    .await?;
    Ok(json!(format!(
        "Tag '{}' merged into '{}'",
        params.source, params.target
    )))
}
