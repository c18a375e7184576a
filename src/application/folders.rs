use crate::application::lookup::{resolve_folder, take_list};
use crate::application::params::{AddFolderParams, DeleteFoldersParams, RenameFolderParams};
use crate::infrastructure::error::InfraError;
use crate::infrastructure::ticktick_client::TickTickApi;
use serde_json::{Value, json};

const FOLDER_LIST_TYPE: &str = "group";

pub async fn list_folders<A>(api: &A) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    Ok(take_list(api.batch_check().await?, "projectGroups"))
}

pub async fn add_folder<A>(api: &A, params: AddFolderParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    api.v2_post(
        "/batch/projectGroup",
        json!({"add": [{"name": params.name, "listType": FOLDER_LIST_TYPE}]}),
    )
    .await
}

pub async fn delete_folders<A>(api: &A, params: DeleteFoldersParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let mut ids = Vec::with_capacity(params.folders.len());
    for folder in &params.folders {
        let (id, _) = resolve_folder(api, folder).await?;
        ids.push(id);
    }
    api.v2_post("/batch/projectGroup", json!({ "delete": ids }))
        .await?;
    Ok(json!(format!("Deleted {} folder(s)", ids.len())))
}

pub async fn rename_folder<A>(api: &A, params: RenameFolderParams) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let (id, etag) = resolve_folder(api, &params.folder).await?;
    api.v2_post(
        "/batch/projectGroup",
        json!({"update": [{
            "id": id,
            "etag": etag,
            "name": params.new_name,
            "listType": FOLDER_LIST_TYPE,
        }]}),
    )
    .await
}
