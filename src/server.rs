//! MCP ServerHandler implementation for TickTick.
//!
//! Every tool is a thin wrapper over one operation in [`crate::application`]:
//! the operation returns JSON, the wrapper renders it as text or as a
//! structured error payload.
//!
//! **Tasks**: `list_tasks`, `get_task`, `add_task`, `edit_task`, `complete_task`,
//! `delete_task`, `move_task`, `set_subtask`, `unparent_task`, `list_trash`
//!
//! **Projects**: `list_projects`, `get_project`, `add_project`, `edit_project`,
//! `delete_project`
//!
//! **Tags**: `list_tags`, `add_tags`, `delete_tags`, `rename_tag`, `edit_tag`,
//! `merge_tags`
//!
//! **Folders**: `list_folders`, `add_folder`, `delete_folders`, `rename_folder`
//!
//! **Habits**: `list_habits`, `add_habit`, `edit_habit`, `delete_habits`,
//! `checkin_habit`, `habit_log`, `archive_habits`, `manage_habit_sections`
//!
//! **Filters**: `list_filters`, `add_filter`, `edit_filter`, `delete_filters`
//!
//! **Focus**: `focus_status`, `focus_stats`, `focus_timeline`, `focus_log`,
//! `focus_start`, `focus_control`
//!
//! **Calendar**: `list_calendars`, `list_events`, `sync_account`

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    Implementation, ListResourcesResult, PaginatedRequestParams, ProtocolVersion,
    ReadResourceRequestParams, ReadResourceResult, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler, tool, tool_handler, tool_router};
use serde_json::{Value, json};

use crate::application::params::*;
use crate::application::resources::{self, JSON_MIME_TYPE, RESOURCES};
use crate::application::{calendar, filters, focus, folders, habits, projects, tags, tasks};
use crate::infrastructure::error::InfraError;
use crate::infrastructure::ticktick_client::TickTickApi;

const INSTRUCTIONS: &str = "Manage a TickTick account: tasks, projects, tags, folders, habits, \
filters, focus sessions and calendar events.\n\n\
- Projects, folders, filters, habits and habit sections can be referenced by name or ID. \
Names match exactly (case-insensitive) first, then by substring. \
Ambiguous names fail with a list of candidates, and a miss suggests the closest spelling.\n\
- Use the project name 'inbox' to target the Inbox.\n\
- Task dates: 'today', 'tomorrow', '2026-03-15' for all-day or '2026-03-15T14:30' \
for a specific time.\n\
- Check-in, habit log and focus log dates: 'today', 'yesterday' or '2026-03-15'.\n\
- Durations: '30m', '1h', '1h30m', '2h15m'.\n\
- Tags, folders, habits, filters, focus and calendar tools use the v2 API and need \
TICKTICK_V2_SESSION_TOKEN (the 't' cookie from a browser session).";

/// TickTick MCP server handler.
#[derive(Clone)]
pub struct TickTickMcpServer {
    tool_router: ToolRouter<Self>,
    api: Arc<dyn TickTickApi>,
}

impl TickTickMcpServer {
    pub fn new(api: Arc<dyn TickTickApi>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            api,
        }
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for TickTickMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                title: Some("TickTick MCP Server".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: Some(
                    "MCP server exposing TickTick tasks, projects, tags, habits, filters \
                     and focus sessions"
                        .to_string(),
                ),
                icons: None,
                website_url: None,
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let resources: Vec<Value> = RESOURCES
            .iter()
            .map(|entry| {
                json!({
                    "uri": entry.uri,
                    "name": entry.name,
                    "description": entry.description,
                    "mimeType": JSON_MIME_TYPE,
                })
            })
            .collect();
        serde_json::from_value(json!({ "resources": resources }))
            .map_err(|e| McpError::internal_error(e.to_string(), None))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let uri = request.uri;
        let contents = match resources::read_resource(self.api.as_ref(), &uri).await {
            Ok(Some(contents)) => contents,
            Ok(None) => {
                return Err(McpError::resource_not_found(
                    format!("Unknown resource: {uri}"),
                    None,
                ));
            }
            Err(e) => {
                tracing::error!(resource = %uri, error = %e, "resource read failed");
                return Err(McpError::internal_error(e.to_string(), None));
            }
        };
        let text = serde_json::to_string_pretty(&contents)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        serde_json::from_value(json!({
            "contents": [{ "uri": uri, "mimeType": JSON_MIME_TYPE, "text": text }]
        }))
        .map_err(|e| McpError::internal_error(e.to_string(), None))
    }
}

#[tool_router(router = tool_router)]
impl TickTickMcpServer {
    // ── Tasks ──

    #[tool(
        name = "list_tasks",
        description = "List tasks. Give a project (name, ID or 'inbox') to list one project, or omit it to list all projects plus the Inbox. status='completed' lists completed tasks instead of active ones.",
        annotations(read_only_hint = true, open_world_hint = true)
    )]
    pub async fn list_tasks(&self, Parameters(params): Parameters<ListTasksParams>) -> String {
        respond("list_tasks", tasks::list_tasks(self.api.as_ref(), params).await)
    }

    #[tool(
        name = "get_task",
        description = "Get one task with its full details.",
        annotations(read_only_hint = true, open_world_hint = true)
    )]
    pub async fn get_task(&self, Parameters(params): Parameters<TaskRefParams>) -> String {
        respond("get_task", tasks::get_task(self.api.as_ref(), params).await)
    }

    #[tool(
        name = "add_task",
        description = "Create a task. Supports due/start dates, a duration that derives the missing end or start, priority (none/low/medium/high), tags, checklist items and a timezone.",
        annotations(read_only_hint = false, destructive_hint = false, idempotent_hint = false, open_world_hint = true)
    )]
    pub async fn add_task(&self, Parameters(params): Parameters<AddTaskParams>) -> String {
        respond("add_task", tasks::add_task(self.api.as_ref(), params).await)
    }

    #[tool(
        name = "edit_task",
        description = "Update fields of an existing task. Use clear_due or clear_start to remove a date.",
        annotations(read_only_hint = false, destructive_hint = false, idempotent_hint = true, open_world_hint = true)
    )]
    pub async fn edit_task(&self, Parameters(params): Parameters<EditTaskParams>) -> String {
        respond("edit_task", tasks::edit_task(self.api.as_ref(), params).await)
    }

    #[tool(
        name = "complete_task",
        description = "Mark a task as completed.",
        annotations(read_only_hint = false, destructive_hint = false, idempotent_hint = true, open_world_hint = true)
    )]
    pub async fn complete_task(&self, Parameters(params): Parameters<TaskRefParams>) -> String {
        respond(
            "complete_task",
            tasks::complete_task(self.api.as_ref(), params).await,
        )
    }

    #[tool(
        name = "delete_task",
        description = "Delete a task. It moves to the trash.",
        annotations(read_only_hint = false, destructive_hint = true, idempotent_hint = true, open_world_hint = true)
    )]
    pub async fn delete_task(&self, Parameters(params): Parameters<TaskRefParams>) -> String {
        respond("delete_task", tasks::delete_task(self.api.as_ref(), params).await)
    }

    #[tool(
        name = "move_task",
        description = "Move a task from one project to another.",
        annotations(read_only_hint = false, destructive_hint = false, idempotent_hint = true, open_world_hint = true)
    )]
    pub async fn move_task(&self, Parameters(params): Parameters<MoveTaskParams>) -> String {
        respond("move_task", tasks::move_task(self.api.as_ref(), params).await)
    }

    #[tool(
        name = "set_subtask",
        description = "Make a task a subtask of another task in the same project.",
        annotations(read_only_hint = false, destructive_hint = false, idempotent_hint = true, open_world_hint = true)
    )]
    pub async fn set_subtask(&self, Parameters(params): Parameters<SetSubtaskParams>) -> String {
        respond("set_subtask", tasks::set_subtask(self.api.as_ref(), params).await)
    }

    #[tool(
        name = "unparent_task",
        description = "Detach a subtask from its parent so it becomes a top-level task.",
        annotations(read_only_hint = false, destructive_hint = false, idempotent_hint = true, open_world_hint = true)
    )]
    pub async fn unparent_task(&self, Parameters(params): Parameters<TaskRefParams>) -> String {
        respond(
            "unparent_task",
            tasks::unparent_task(self.api.as_ref(), params).await,
        )
    }

    #[tool(
        name = "list_trash",
        description = "List deleted tasks in the trash.",
        annotations(read_only_hint = true, open_world_hint = true)
    )]
    pub async fn list_trash(&self) -> String {
        respond("list_trash", tasks::list_trash(self.api.as_ref()).await)
    }

    // ── Projects ──

    #[tool(
        name = "list_projects",
        description = "List all projects with their IDs, names, colors and folders.",
        annotations(read_only_hint = true, open_world_hint = true)
    )]
    pub async fn list_projects(&self) -> String {
        respond("list_projects", projects::list_projects(self.api.as_ref()).await)
    }

    #[tool(
        name = "get_project",
        description = "Get one project by name or ID.",
        annotations(read_only_hint = true, open_world_hint = true)
    )]
    pub async fn get_project(&self, Parameters(params): Parameters<ProjectParams>) -> String {
        respond(
            "get_project",
            projects::get_project(self.api.as_ref(), params).await,
        )
    }

    #[tool(
        name = "add_project",
        description = "Create a project, optionally inside a folder.",
        annotations(read_only_hint = false, destructive_hint = false, idempotent_hint = false, open_world_hint = true)
    )]
    pub async fn add_project(&self, Parameters(params): Parameters<AddProjectParams>) -> String {
        respond(
            "add_project",
            projects::add_project(self.api.as_ref(), params).await,
        )
    }

    #[tool(
        name = "edit_project",
        description = "Update a project's name, color, view mode or folder. remove_folder takes it out of its folder.",
        annotations(read_only_hint = false, destructive_hint = false, idempotent_hint = true, open_world_hint = true)
    )]
    pub async fn edit_project(&self, Parameters(params): Parameters<EditProjectParams>) -> String {
        respond(
            "edit_project",
            projects::edit_project(self.api.as_ref(), params).await,
        )
    }

    #[tool(
        name = "delete_project",
        description = "Delete a project and all of its tasks.",
        annotations(read_only_hint = false, destructive_hint = true, idempotent_hint = true, open_world_hint = true)
    )]
    pub async fn delete_project(&self, Parameters(params): Parameters<ProjectParams>) -> String {
        respond(
            "delete_project",
            projects::delete_project(self.api.as_ref(), params).await,
        )
    }

    // ── Tags ──

    #[tool(
        name = "list_tags",
        description = "List all tags with their colors and parents.",
        annotations(read_only_hint = true, open_world_hint = true)
    )]
    pub async fn list_tags(&self) -> String {
        respond("list_tags", tags::list_tags(self.api.as_ref()).await)
    }

    #[tool(
        name = "add_tags",
        description = "Create one or more tags.",
        annotations(read_only_hint = false, destructive_hint = false, idempotent_hint = true, open_world_hint = true)
    )]
    pub async fn add_tags(&self, Parameters(params): Parameters<TagNamesParams>) -> String {
        respond("add_tags", tags::add_tags(self.api.as_ref(), params).await)
    }

    #[tool(
        name = "delete_tags",
        description = "Delete one or more tags. Tasks keep their other tags.",
        annotations(read_only_hint = false, destructive_hint = true, idempotent_hint = true, open_world_hint = true)
    )]
    pub async fn delete_tags(&self, Parameters(params): Parameters<TagNamesParams>) -> String {
        respond("delete_tags", tags::delete_tags(self.api.as_ref(), params).await)
    }

    #[tool(
        name = "rename_tag",
        description = "Rename a tag on every task that carries it.",
        annotations(read_only_hint = false, destructive_hint = false, idempotent_hint = false, open_world_hint = true)
    )]
    pub async fn rename_tag(&self, Parameters(params): Parameters<RenameTagParams>) -> String {
        respond("rename_tag", tags::rename_tag(self.api.as_ref(), params).await)
    }

    #[tool(
        name = "edit_tag",
        description = "Change a tag's color, parent tag or sort settings.",
        annotations(read_only_hint = false, destructive_hint = false, idempotent_hint = true, open_world_hint = true)
    )]
    pub async fn edit_tag(&self, Parameters(params): Parameters<EditTagParams>) -> String {
        respond("edit_tag", tags::edit_tag(self.api.as_ref(), params).await)
    }

    #[tool(
        name = "merge_tags",
        description = "Merge the source tag into the target tag. The source tag is removed.",
        annotations(read_only_hint = false, destructive_hint = true, idempotent_hint = false, open_world_hint = true)
    )]
    pub async fn merge_tags(&self, Parameters(params): Parameters<MergeTagsParams>) -> String {
        respond("merge_tags", tags::merge_tags(self.api.as_ref(), params).await)
    }

    // ── Folders ──

    #[tool(
        name = "list_folders",
        description = "List project folders.",
        annotations(read_only_hint = true, open_world_hint = true)
    )]
    pub async fn list_folders(&self) -> String {
        respond("list_folders", folders::list_folders(self.api.as_ref()).await)
    }

    #[tool(
        name = "add_folder",
        description = "Create a project folder.",
        annotations(read_only_hint = false, destructive_hint = false, idempotent_hint = false, open_world_hint = true)
    )]
    pub async fn add_folder(&self, Parameters(params): Parameters<AddFolderParams>) -> String {
        respond("add_folder", folders::add_folder(self.api.as_ref(), params).await)
    }

    #[tool(
        name = "delete_folders",
        description = "Delete one or more folders. Their projects are kept.",
        annotations(read_only_hint = false, destructive_hint = true, idempotent_hint = true, open_world_hint = true)
    )]
    pub async fn delete_folders(&self, Parameters(params): Parameters<DeleteFoldersParams>) -> String {
        respond(
            "delete_folders",
            folders::delete_folders(self.api.as_ref(), params).await,
        )
    }

    #[tool(
        name = "rename_folder",
        description = "Rename a folder.",
        annotations(read_only_hint = false, destructive_hint = false, idempotent_hint = true, open_world_hint = true)
    )]
    pub async fn rename_folder(&self, Parameters(params): Parameters<RenameFolderParams>) -> String {
        respond(
            "rename_folder",
            folders::rename_folder(self.api.as_ref(), params).await,
        )
    }

    // ── Habits ──

    #[tool(
        name = "list_habits",
        description = "List all habits.",
        annotations(read_only_hint = true, open_world_hint = true)
    )]
    pub async fn list_habits(&self) -> String {
        respond("list_habits", habits::list_habits(self.api.as_ref()).await)
    }

    #[tool(
        name = "add_habit",
        description = "Create a habit. habit_type is 'Boolean' (done/not done) or 'Real' (numeric goal with a unit).",
        annotations(read_only_hint = false, destructive_hint = false, idempotent_hint = false, open_world_hint = true)
    )]
    pub async fn add_habit(&self, Parameters(params): Parameters<AddHabitParams>) -> String {
        respond("add_habit", habits::add_habit(self.api.as_ref(), params).await)
    }

    #[tool(
        name = "edit_habit",
        description = "Update a habit's name, goal, unit, section, repeat rule or color.",
        annotations(read_only_hint = false, destructive_hint = false, idempotent_hint = true, open_world_hint = true)
    )]
    pub async fn edit_habit(&self, Parameters(params): Parameters<EditHabitParams>) -> String {
        respond("edit_habit", habits::edit_habit(self.api.as_ref(), params).await)
    }

    #[tool(
        name = "delete_habits",
        description = "Delete one or more habits and their check-in history.",
        annotations(read_only_hint = false, destructive_hint = true, idempotent_hint = true, open_world_hint = true)
    )]
    pub async fn delete_habits(&self, Parameters(params): Parameters<HabitsParams>) -> String {
        respond(
            "delete_habits",
            habits::delete_habits(self.api.as_ref(), params).await,
        )
    }

    #[tool(
        name = "checkin_habit",
        description = "Record a habit check-in for a date (default today).",
        annotations(read_only_hint = false, destructive_hint = false, idempotent_hint = false, open_world_hint = true)
    )]
    pub async fn checkin_habit(&self, Parameters(params): Parameters<CheckinHabitParams>) -> String {
        respond(
            "checkin_habit",
            habits::checkin_habit(self.api.as_ref(), params).await,
        )
    }

    #[tool(
        name = "habit_log",
        description = "List check-ins for one or more habits after a date.",
        annotations(read_only_hint = true, open_world_hint = true)
    )]
    pub async fn habit_log(&self, Parameters(params): Parameters<HabitLogParams>) -> String {
        respond("habit_log", habits::habit_log(self.api.as_ref(), params).await)
    }

    #[tool(
        name = "archive_habits",
        description = "Archive one or more habits.",
        annotations(read_only_hint = false, destructive_hint = false, idempotent_hint = true, open_world_hint = true)
    )]
    pub async fn archive_habits(&self, Parameters(params): Parameters<HabitsParams>) -> String {
        respond(
            "archive_habits",
            habits::archive_habits(self.api.as_ref(), params).await,
        )
    }

    #[tool(
        name = "manage_habit_sections",
        description = "List, add, delete or rename habit sections. 'add' needs name, 'delete' needs sections, 'rename' needs section and new_name.",
        annotations(read_only_hint = false, destructive_hint = true, idempotent_hint = false, open_world_hint = true)
    )]
    pub async fn manage_habit_sections(
        &self,
        Parameters(params): Parameters<HabitSectionsParams>,
    ) -> String {
        respond(
            "manage_habit_sections",
            habits::manage_habit_sections(self.api.as_ref(), params).await,
        )
    }

    // ── Filters ──

    #[tool(
        name = "list_filters",
        description = "List saved filters.",
        annotations(read_only_hint = true, open_world_hint = true)
    )]
    pub async fn list_filters(&self) -> String {
        respond("list_filters", filters::list_filters(self.api.as_ref()).await)
    }

    #[tool(
        name = "add_filter",
        description = "Create a saved filter from a rule string.",
        annotations(read_only_hint = false, destructive_hint = false, idempotent_hint = false, open_world_hint = true)
    )]
    pub async fn add_filter(&self, Parameters(params): Parameters<AddFilterParams>) -> String {
        respond("add_filter", filters::add_filter(self.api.as_ref(), params).await)
    }

    #[tool(
        name = "edit_filter",
        description = "Update a saved filter's name, rule or sort type.",
        annotations(read_only_hint = false, destructive_hint = false, idempotent_hint = true, open_world_hint = true)
    )]
    pub async fn edit_filter(&self, Parameters(params): Parameters<EditFilterParams>) -> String {
        respond("edit_filter", filters::edit_filter(self.api.as_ref(), params).await)
    }

    #[tool(
        name = "delete_filters",
        description = "Delete one or more saved filters.",
        annotations(read_only_hint = false, destructive_hint = true, idempotent_hint = true, open_world_hint = true)
    )]
    pub async fn delete_filters(&self, Parameters(params): Parameters<DeleteFiltersParams>) -> String {
        respond(
            "delete_filters",
            filters::delete_filters(self.api.as_ref(), params).await,
        )
    }

    // ── Focus ──

    #[tool(
        name = "focus_status",
        description = "Show the current focus timer state.",
        annotations(read_only_hint = true, open_world_hint = true)
    )]
    pub async fn focus_status(&self) -> String {
        respond("focus_status", focus::focus_status(self.api.as_ref()).await)
    }

    #[tool(
        name = "focus_stats",
        description = "Show focus statistics: today's and total pomodoros and focus time.",
        annotations(read_only_hint = true, open_world_hint = true)
    )]
    pub async fn focus_stats(&self) -> String {
        respond("focus_stats", focus::focus_stats(self.api.as_ref()).await)
    }

    #[tool(
        name = "focus_timeline",
        description = "Show the recent focus session timeline.",
        annotations(read_only_hint = true, open_world_hint = true)
    )]
    pub async fn focus_timeline(&self) -> String {
        respond("focus_timeline", focus::focus_timeline(self.api.as_ref()).await)
    }

    #[tool(
        name = "focus_log",
        description = "List focus sessions between two dates, both inclusive.",
        annotations(read_only_hint = true, open_world_hint = true)
    )]
    pub async fn focus_log(&self, Parameters(params): Parameters<FocusLogParams>) -> String {
        respond("focus_log", focus::focus_log(self.api.as_ref(), params).await)
    }

    #[tool(
        name = "focus_start",
        description = "Start a pomodoro focus session, optionally linked to a task.",
        annotations(read_only_hint = false, destructive_hint = false, idempotent_hint = false, open_world_hint = true)
    )]
    pub async fn focus_start(&self, Parameters(params): Parameters<FocusStartParams>) -> String {
        respond("focus_start", focus::focus_start(self.api.as_ref(), params).await)
    }

    #[tool(
        name = "focus_control",
        description = "Pause, resume or stop the active focus session.",
        annotations(read_only_hint = false, destructive_hint = false, idempotent_hint = false, open_world_hint = true)
    )]
    pub async fn focus_control(&self, Parameters(params): Parameters<FocusControlParams>) -> String {
        respond(
            "focus_control",
            focus::focus_control(self.api.as_ref(), params).await,
        )
    }

    // ── Calendar ──

    #[tool(
        name = "list_calendars",
        description = "List connected third-party calendar accounts.",
        annotations(read_only_hint = true, open_world_hint = true)
    )]
    pub async fn list_calendars(&self) -> String {
        respond(
            "list_calendars",
            calendar::list_calendars(self.api.as_ref()).await,
        )
    }

    #[tool(
        name = "list_events",
        description = "List calendar events between two dates.",
        annotations(read_only_hint = true, open_world_hint = true)
    )]
    pub async fn list_events(&self, Parameters(params): Parameters<ListEventsParams>) -> String {
        respond(
            "list_events",
            calendar::list_events(self.api.as_ref(), params).await,
        )
    }

    #[tool(
        name = "sync_account",
        description = "Fetch the full account state: projects, folders, filters, tags and sync checkpoints.",
        annotations(read_only_hint = true, open_world_hint = true)
    )]
    pub async fn sync_account(&self) -> String {
        respond("sync_account", calendar::sync_account(self.api.as_ref()).await)
    }
}

/// Renders an operation result as tool output text.
///
/// Plain confirmations come back as JSON strings and are returned unquoted.
fn respond(tool: &str, result: Result<Value, InfraError>) -> String {
    match result {
        Ok(Value::String(message)) => message,
        Ok(value) => serde_json::to_string_pretty(&value)
            .unwrap_or_else(|e| error_json("internal_error", &e.to_string())),
        Err(e) => {
            tracing::error!(tool, code = e.code(), error = %e, "tool call failed");
            error_json(e.code(), &e.to_string())
        }
    }
}

fn error_json(error_code: &str, message: &str) -> String {
    json!({
        "error": error_code,
        "message": message,
        "valid": false
    })
    .to_string()
}
