use crate::application::lookup::{resolve_filter, take_list};
use crate::application::params::{AddFilterParams, DeleteFiltersParams, EditFilterParams};
use crate::infrastructure::error::InfraError;
use crate::infrastructure::ticktick_client::TickTickApi;
use serde_json::{Map, Value, json};

pub async fn list_filters<A>(api: &A) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    Ok(take_list(api.batch_check().await?, "filters"))
}

pub async fn add_filter<A>(api: &A, params: AddFilterParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let mut filter = Map::new();
    filter.insert("name".into(), json!(params.name));
    if let Some(rule) = params.rule {
        filter.insert("rule".into(), json!(rule));
    }
    if let Some(sort_type) = params.sort_type {
        filter.insert("sortType".into(), json!(sort_type));
    }
    api.v2_post("/batch/filter", json!({ "add": [filter] })).await
}

pub async fn edit_filter<A>(api: &A, params: EditFilterParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let (id, etag) = resolve_filter(api, &params.filter_name).await?;
    let mut update = Map::new();
    update.insert("id".into(), json!(id));
    update.insert("etag".into(), json!(etag));
    if let Some(name) = params.name {
        update.insert("name".into(), json!(name));
    }
    if let Some(rule) = params.rule {
        update.insert("rule".into(), json!(rule));
    }
    if let Some(sort_type) = params.sort_type {
        update.insert("sortType".into(), json!(sort_type));
    }
    api.v2_post("/batch/filter", json!({ "update": [update] }))
        .await
}

pub async fn delete_filters<A>(api: &A, params: DeleteFiltersParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let mut ids = Vec::with_capacity(params.filters.len());
    for filter in &params.filters {
        let (id, _) = resolve_filter(api, filter).await?;
        ids.push(id);
    }
    api.v2_post("/batch/filter", json!({ "delete": ids })).await?;
    Ok(json!(format!("Deleted {} filter(s)", ids.len())))
}
