//! Text rendering for the project list and boards.

use crate::models::{ProjectBoard, Stage, Subtask, Task, TaskId};
use crate::views::{BoardStatus, BoardView, ProjectListView};

const DONE: &str = "[x]";
const OPEN: &str = "[ ]";

fn checkbox(subtask: &Subtask) -> &'static str {
    if subtask.completed {
        DONE
    } else {
        OPEN
    }
}

/// Render the project list screen.
pub fn render_project_list(view: &ProjectListView) -> String {
    let mut output = String::new();
    if view.is_initial_loading() {
        output.push_str("Loading projects...\n");
        return output;
    }
    if let Some(error) = view.error() {
        output.push_str(&format!("Error: {}\n", error));
    }
    if view.is_updating() {
        output.push_str("Updating...\n");
    }
    if view.projects().is_empty() && view.error().is_none() {
        output.push_str("No projects found.\n");
        return output;
    }
    for project in view.projects() {
        output.push_str(&format!("#{} {}\n", project.id, project.name));
        let description = project
            .description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or("No description provided.");
        output.push_str(&format!("    {}\n", description));
    }
    output
}

/// Render the board screen, including its status lines.
pub fn render_board(view: &BoardView) -> String {
    let mut output = String::new();
    let board = match (view.status(), view.board()) {
        (BoardStatus::Loading, _) => return "Loading project board...\n".to_string(),
        (BoardStatus::Failed, _) => {
            return format!("Error: {}\n", view.error().unwrap_or_default());
        }
        (_, Some(board)) => board,
        (_, None) => return "Project not found or no data available.\n".to_string(),
    };

    output.push_str(&format!("{} (#{})\n", board.project.name, board.project.id));
    let description = board
        .project
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or("No project description.");
    output.push_str(description);
    output.push('\n');
    if view.is_updating() {
        output.push_str("Updating board...\n");
    }
    if let Some(error) = view.error() {
        output.push_str(&format!("Error: {}\n", error));
    }
    output.push('\n');
    output.push_str(&render_stages(board, |id| view.is_expanded(id)));
    output
}

/// Render stages as trees of tasks. Subtasks are listed for tasks where
/// `expanded` returns true.
///
/// Example output:
/// ```text
/// Todo (#10)
/// ├── Write copy (#100) @sam 2024-01-02 → 2024-01-09 [1/2]
/// │   ├── [x] Outline (#1000)
/// │   └── [ ] Review (#1001)
/// └── Polish (#101)
/// Done (#11)
/// └── No tasks here.
/// ```
pub fn render_stages(board: &ProjectBoard, expanded: impl Fn(TaskId) -> bool) -> String {
    if board.stages.is_empty() {
        return "No stages defined.\n".to_string();
    }
    let mut output = String::new();
    for stage in &board.stages {
        render_stage(&mut output, stage, &expanded);
    }
    output
}

fn render_stage(output: &mut String, stage: &Stage, expanded: &impl Fn(TaskId) -> bool) {
    output.push_str(&format!("{} (#{})\n", stage.name, stage.id));

    if stage.tasks.is_empty() {
        output.push_str("└── No tasks here.\n");
        return;
    }

    for (i, task) in stage.tasks.iter().enumerate() {
        let is_last = i == stage.tasks.len() - 1;
        let branch = if is_last { "└── " } else { "├── " };
        output.push_str(branch);
        output.push_str(&task_line(task));
        output.push('\n');

        if expanded(task.id) {
            let child_prefix = if is_last { "    " } else { "│   " };
            for (j, subtask) in task.subtasks.iter().enumerate() {
                let sub_branch = if j == task.subtasks.len() - 1 {
                    "└── "
                } else {
                    "├── "
                };
                output.push_str(child_prefix);
                output.push_str(sub_branch);
                output.push_str(&format!(
                    "{} {} (#{})\n",
                    checkbox(subtask),
                    subtask.content,
                    subtask.id
                ));
            }
        }
    }
}

/// Content plus whatever optional details the task carries.
fn task_line(task: &Task) -> String {
    let mut line = format!("{} (#{})", task.content, task.id);
    if let Some(assignee) = &task.assignee {
        line.push_str(&format!(" @{}", assignee));
    }
    match (task.start_date, task.end_date) {
        (Some(start), Some(end)) => line.push_str(&format!(" {} → {}", start, end)),
        (Some(start), None) => line.push_str(&format!(" from {}", start)),
        (None, Some(end)) => line.push_str(&format!(" due {}", end)),
        (None, None) => {}
    }
    if !task.subtasks.is_empty() {
        line.push_str(&format!(
            " [{}/{}]",
            task.completed_subtasks(),
            task.subtasks.len()
        ));
    }
    line
}
