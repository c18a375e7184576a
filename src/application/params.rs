//! Parameter structs for every MCP tool.

use schemars::JsonSchema;
use serde::Deserialize;

fn default_limit() -> u32 {
    100
}

fn default_priority() -> String {
    "none".to_string()
}

fn default_habit_type() -> String {
    "Boolean".to_string()
}

fn default_today() -> String {
    "today".to_string()
}

fn default_checkin_value() -> f64 {
    1.0
}

fn default_focus_minutes() -> i64 {
    25
}

// ── tasks ──

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Active,
    Completed,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListTasksParams {
    #[schemars(description = "Project name or ID. Supports fuzzy matching. Use 'inbox' for the default inbox. Omit to list from all projects.")]
    pub project: Option<String>,
    #[schemars(description = "Task status: 'active' (default) or 'completed'")]
    #[serde(default)]
    pub status: TaskStatus,
    #[schemars(description = "Maximum number of completed tasks to return across all projects (default 100)")]
    #[serde(default = "default_limit")]
    pub limit: u32,
}

/// Identifies one task inside one project.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct TaskRefParams {
    #[schemars(description = "The task ID")]
    pub task_id: String,
    #[schemars(description = "Project name or ID containing the task. Use 'inbox' for the default inbox.")]
    pub project: String,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct AddTaskParams {
    #[schemars(description = "Task title")]
    pub title: String,
    #[schemars(description = "Project name or ID. Supports fuzzy matching. Omit for inbox.")]
    pub project: Option<String>,
    #[schemars(description = "Due date: 'today', 'tomorrow', 'YYYY-MM-DD' or 'YYYY-MM-DDTHH:MM'")]
    pub due: Option<String>,
    #[schemars(description = "Start date, same format as due")]
    pub start: Option<String>,
    #[schemars(description = "Duration like '1h', '30m', '1h30m'. Requires a start or due date with a time.")]
    pub duration: Option<String>,
    #[schemars(description = "Priority: 'none' (default), 'low', 'medium', 'high'")]
    #[serde(default = "default_priority")]
    pub priority: String,
    #[schemars(description = "Tag names to apply")]
    pub tags: Option<Vec<String>>,
    #[schemars(description = "Markdown content")]
    pub content: Option<String>,
    #[schemars(description = "Plain text description")]
    pub desc: Option<String>,
    #[schemars(description = "Checklist item titles")]
    pub items: Option<Vec<String>>,
    #[schemars(description = "Whether this is an all-day task. Detected from the date format when omitted.")]
    pub all_day: Option<bool>,
    #[schemars(description = "IANA timezone name, e.g. 'America/Chicago'. Defaults to the system timezone.")]
    pub timezone: Option<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct EditTaskParams {
    #[schemars(description = "The task ID to edit")]
    pub task_id: String,
    #[schemars(description = "Project name or ID containing the task")]
    pub project: String,
    #[schemars(description = "New title")]
    pub title: Option<String>,
    #[schemars(description = "New due date: 'today', 'tomorrow', 'YYYY-MM-DD' or 'YYYY-MM-DDTHH:MM'")]
    pub due: Option<String>,
    #[schemars(description = "New start date")]
    pub start: Option<String>,
    #[schemars(description = "New priority: 'none', 'low', 'medium', 'high'")]
    pub priority: Option<String>,
    #[schemars(description = "Replace all tags with this list")]
    pub tags: Option<Vec<String>>,
    #[schemars(description = "New markdown content")]
    pub content: Option<String>,
    #[schemars(description = "New plain text description")]
    pub desc: Option<String>,
    #[schemars(description = "Remove the due date")]
    #[serde(default)]
    pub clear_due: bool,
    #[schemars(description = "Remove the start date")]
    #[serde(default)]
    pub clear_start: bool,
    #[schemars(description = "IANA timezone used to interpret dates")]
    pub timezone: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct MoveTaskParams {
    #[schemars(description = "The task ID to move")]
    pub task_id: String,
    #[schemars(description = "Source project name or ID")]
    pub from_project: String,
    #[schemars(description = "Destination project name or ID")]
    pub to_project: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SetSubtaskParams {
    #[schemars(description = "The task ID to make a subtask")]
    pub task_id: String,
    #[schemars(description = "The parent task ID")]
    pub parent_id: String,
    #[schemars(description = "Project name or ID containing both tasks")]
    pub project: String,
}

// ── projects ──

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ProjectParams {
    #[schemars(description = "Project name or ID. Supports fuzzy matching. Use 'inbox' for the default inbox.")]
    pub project: String,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct AddProjectParams {
    #[schemars(description = "Project name")]
    pub name: String,
    #[schemars(description = "Hex color code, e.g. '#FF0000'")]
    pub color: Option<String>,
    #[schemars(description = "View mode: 'list', 'kanban', 'timeline'")]
    pub view_mode: Option<String>,
    #[schemars(description = "Project kind, e.g. 'TASK' or 'NOTE'")]
    pub kind: Option<String>,
    #[schemars(description = "Folder name or ID to place the project in")]
    pub folder: Option<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct EditProjectParams {
    #[schemars(description = "Project name or ID to edit")]
    pub project: String,
    #[schemars(description = "New project name")]
    pub name: Option<String>,
    #[schemars(description = "New hex color code")]
    pub color: Option<String>,
    #[schemars(description = "New view mode: 'list', 'kanban', 'timeline'")]
    pub view_mode: Option<String>,
    #[schemars(description = "Move the project to this folder (name or ID)")]
    pub folder: Option<String>,
    #[schemars(description = "Remove the project from its folder")]
    #[serde(default)]
    pub remove_folder: bool,
}

// ── tags ──

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TagNamesParams {
    #[schemars(description = "Tag names")]
    pub names: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RenameTagParams {
    #[schemars(description = "Current tag name")]
    pub old_name: String,
    #[schemars(description = "New tag name")]
    pub new_name: String,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct EditTagParams {
    #[schemars(description = "The tag name to edit")]
    pub name: String,
    #[schemars(description = "New hex color code")]
    pub color: Option<String>,
    #[schemars(description = "Parent tag name, for nested tags")]
    pub parent: Option<String>,
    #[schemars(description = "Remove the parent tag")]
    #[serde(default)]
    pub clear_parent: bool,
    #[schemars(description = "New sort order")]
    pub sort_order: Option<i64>,
    #[schemars(description = "Sort type, e.g. 'project' or 'dueDate'")]
    pub sort_type: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct MergeTagsParams {
    #[schemars(description = "Tag to merge from. It is deleted afterwards.")]
    pub source: String,
    #[schemars(description = "Tag to merge into")]
    pub target: String,
}

// ── folders ──

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddFolderParams {
    #[schemars(description = "Folder name")]
    pub name: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteFoldersParams {
    #[schemars(description = "Folder names or IDs. Supports fuzzy matching.")]
    pub folders: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct RenameFolderParams {
    #[schemars(description = "Current folder name or ID. Supports fuzzy matching.")]
    pub folder: String,
    #[schemars(description = "New folder name")]
    pub new_name: String,
}

// ── habits ──

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct AddHabitParams {
    #[schemars(description = "Habit name")]
    pub name: String,
    #[schemars(description = "'Boolean' for yes/no habits, 'Numeric' for tracked values (default 'Boolean')")]
    #[serde(default = "default_habit_type")]
    pub habit_type: String,
    #[schemars(description = "Daily goal value, e.g. 8 for '8 glasses of water'")]
    pub goal: Option<f64>,
    #[schemars(description = "Unit label for numeric habits, e.g. 'km'")]
    pub unit: Option<String>,
    #[schemars(description = "Habit section name or ID")]
    pub section: Option<String>,
    #[schemars(description = "Repeat rule string")]
    pub repeat_rule: Option<String>,
    #[schemars(description = "Hex color code")]
    pub color: Option<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct EditHabitParams {
    #[schemars(description = "Habit name or ID. Supports fuzzy matching.")]
    pub habit: String,
    #[schemars(description = "New habit name")]
    pub name: Option<String>,
    #[schemars(description = "New daily goal value")]
    pub goal: Option<f64>,
    #[schemars(description = "New unit label")]
    pub unit: Option<String>,
    #[schemars(description = "Move to this section (name or ID)")]
    pub section: Option<String>,
    #[schemars(description = "New repeat rule string")]
    pub repeat_rule: Option<String>,
    #[schemars(description = "New hex color code")]
    pub color: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct HabitsParams {
    #[schemars(description = "Habit names or IDs. Supports fuzzy matching.")]
    pub habits: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CheckinHabitParams {
    #[schemars(description = "Habit name or ID. Supports fuzzy matching.")]
    pub habit: String,
    #[schemars(description = "Check-in date: 'today' (default), 'yesterday' or 'YYYY-MM-DD'")]
    #[serde(default = "default_today")]
    pub date: String,
    #[schemars(description = "Check-in value (default 1.0, which marks a Boolean habit done)")]
    #[serde(default = "default_checkin_value")]
    pub value: f64,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct HabitLogParams {
    #[schemars(description = "Habit names or IDs. Supports fuzzy matching.")]
    pub habits: Vec<String>,
    #[schemars(description = "Return check-ins after this date: 'today' (default), 'yesterday' or 'YYYY-MM-DD'")]
    #[serde(default = "default_today")]
    pub after: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SectionAction {
    List,
    Add,
    Delete,
    Rename,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct HabitSectionsParams {
    #[schemars(description = "Operation: 'list', 'add', 'delete' or 'rename'")]
    pub action: SectionAction,
    #[schemars(description = "Section name, required for 'add'")]
    pub name: Option<String>,
    #[schemars(description = "Section name or ID, required for 'rename'")]
    pub section: Option<String>,
    #[schemars(description = "New section name, required for 'rename'")]
    pub new_name: Option<String>,
    #[schemars(description = "Section names or IDs, required for 'delete'")]
    pub sections: Option<Vec<String>>,
}

// ── filters ──

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct AddFilterParams {
    #[schemars(description = "Filter name")]
    pub name: String,
    #[schemars(description = "JSON rule definition string, e.g. '{\"and\":[],\"type\":0}'")]
    pub rule: Option<String>,
    #[schemars(description = "Sort type for filter results, e.g. 'dueDate'")]
    pub sort_type: Option<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct EditFilterParams {
    #[schemars(description = "Current filter name or ID. Supports fuzzy matching.")]
    pub filter_name: String,
    #[schemars(description = "New filter name")]
    pub name: Option<String>,
    #[schemars(description = "New JSON rule definition string")]
    pub rule: Option<String>,
    #[schemars(description = "New sort type")]
    pub sort_type: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteFiltersParams {
    #[schemars(description = "Filter names or IDs. Supports fuzzy matching.")]
    pub filters: Vec<String>,
}

// ── focus ──

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FocusLogParams {
    #[schemars(description = "Start date: 'today', 'yesterday' or 'YYYY-MM-DD'")]
    pub from_date: String,
    #[schemars(description = "End date, inclusive: 'today', 'yesterday' or 'YYYY-MM-DD'")]
    pub to_date: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FocusStartParams {
    #[schemars(description = "Focus duration in minutes (default 25)")]
    #[serde(default = "default_focus_minutes")]
    pub duration_minutes: i64,
    #[schemars(description = "Task ID to associate with the session")]
    pub task_id: Option<String>,
    #[schemars(description = "Project ID of the associated task")]
    pub project_id: Option<String>,
}

impl Default for FocusStartParams {
    fn default() -> Self {
        Self {
            duration_minutes: default_focus_minutes(),
            task_id: None,
            project_id: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FocusAction {
    Pause,
    Resume,
    Stop,
}

impl FocusAction {
    pub fn as_op(self) -> &'static str {
        match self {
            FocusAction::Pause => "pause",
            FocusAction::Resume => "resume",
            FocusAction::Stop => "stop",
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FocusControlParams {
    #[schemars(description = "'pause', 'resume' or 'stop'")]
    pub action: FocusAction,
    #[schemars(description = "Focus session ID. The current session is used when omitted.")]
    pub session_id: Option<String>,
}

// ── calendar ──

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListEventsParams {
    #[schemars(description = "Range start, e.g. '2026-02-11T00:00:00.000+0000'")]
    pub begin: String,
    #[schemars(description = "Range end, e.g. '2026-02-18T23:59:59.999+0000'")]
    pub end: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn omitted_fields_take_documented_defaults() {
        let params: ListTasksParams = serde_json::from_value(json!({})).expect("list params");
        assert_eq!(params.status, TaskStatus::Active);
        assert_eq!(params.limit, 100);

        let params: AddTaskParams = serde_json::from_value(json!({"title": "Call mom"})).expect("add params");
        assert_eq!(params.priority, "none");
        assert!(params.all_day.is_none());

        let params: CheckinHabitParams =
            serde_json::from_value(json!({"habit": "Run"})).expect("checkin params");
        assert_eq!(params.date, "today");
        assert_eq!(params.value, 1.0);

        let params: FocusStartParams = serde_json::from_value(json!({})).expect("focus params");
        assert_eq!(params.duration_minutes, 25);
    }

    #[test]
    fn actions_parse_lowercase_names() {
        let params: FocusControlParams =
            serde_json::from_value(json!({"action": "stop"})).expect("focus control");
        assert_eq!(params.action, FocusAction::Stop);
        assert_eq!(params.action.as_op(), "stop");

        let params: HabitSectionsParams =
            serde_json::from_value(json!({"action": "rename"})).expect("sections");
        assert_eq!(params.action, SectionAction::Rename);

        assert!(serde_json::from_value::<FocusControlParams>(json!({"action": "skip"})).is_err());
    }
}
