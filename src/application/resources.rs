use crate::infrastructure::error::InfraError;
use crate::infrastructure::ticktick_client::TickTickApi;
use serde_json::{Value, json};

pub const PROFILE_URI: &str = "ticktick://profile";
pub const SETTINGS_URI: &str = "ticktick://settings";
pub const PROJECTS_URI: &str = "ticktick://projects";
pub const TAGS_URI: &str = "ticktick://tags";

pub const JSON_MIME_TYPE: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceEntry {
    pub uri: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const RESOURCES: &[ResourceEntry] = &[
    ResourceEntry {
        uri: PROFILE_URI,
        name: "profile",
        description: "User profile and subscription status merged into one view",
    },
    ResourceEntry {
        uri: SETTINGS_URI,
        name: "settings",
        description: "User preference settings including web-specific options",
    },
    ResourceEntry {
        uri: PROJECTS_URI,
        name: "projects",
        description: "All projects with their IDs, names, colors and folder assignments",
    },
    ResourceEntry {
        uri: TAGS_URI,
        name: "tags",
        description: "All tags with their names, colors and parent relationships",
    },
];

/// Reads one resource. `Ok(None)` means the URI is not one of [`RESOURCES`].
pub async fn read_resource<A>(api: &A, uri: &str) -> Result<Option<Value>, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let contents = match uri {
        PROFILE_URI => profile(api).await?,
        SETTINGS_URI => api.v2_get("/user/preferences/settings?includeWeb=true").await?,
        PROJECTS_URI => api.v1_get("/project").await?,
        TAGS_URI => api.v2_get("/tags").await?,
        _ => return Ok(None),
    };
    Ok(Some(contents))
}

async fn profile<A>(api: &A) -> Result<Value, InfraError>
where
    A: TickTickApi + ?Sized,
{
    let mut profile = api.v2_get("/user/profile").await?;
    let status = api.v2_get("/user/status").await?;
    match profile.as_object_mut() {
        Some(fields) => {
            fields.insert("status".to_string(), status);
            Ok(profile)
        }
        None => Ok(json!({ "status": status })),
    }
}
