use std::io::{self, BufRead, Write};

use anyhow::{bail, Context};
use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stageboard::app::{App, Route, Screen};
use stageboard::client::ApiClient;
use stageboard::config::Config;
use stageboard::models::{ProjectId, StageId, SubtaskId, TaskId};
use stageboard::render::{render_board, render_project_list};
use stageboard::views::{BoardStatus, BoardView, Confirm, Outcome, ProjectListView, StageMove, TaskMove};

#[derive(Parser)]
#[command(name = "stageboard")]
#[command(about = "Kanban boards for projects, stages, tasks and subtasks")]
struct Cli {
    /// Backend URL (overrides STAGEBOARD_URL and the config file)
    #[arg(long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ping the backend's /hello endpoint
    Hello,
    /// Render the screen at a route such as `/` or `/projects/3`
    Open { route: String },
    /// List, create and delete projects
    #[command(subcommand)]
    Projects(ProjectCommands),
    /// Show or maintain a project board
    #[command(subcommand)]
    Board(BoardCommands),
    /// Manage stages (columns)
    #[command(subcommand)]
    Stage(StageCommands),
    /// Manage tasks (cards)
    #[command(subcommand)]
    Task(TaskCommands),
    /// Manage subtasks (checklist items)
    #[command(subcommand)]
    Subtask(SubtaskCommands),
}

#[derive(Subcommand)]
enum ProjectCommands {
    List,
    Create {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    Delete {
        id: ProjectId,
    },
}

#[derive(Subcommand)]
enum BoardCommands {
    Show {
        project: ProjectId,
        /// List subtasks under every task
        #[arg(short, long)]
        expand: bool,
    },
    /// Rewrite every order on the board to 0, 1, 2, ...
    Normalize { project: ProjectId },
}

#[derive(Clone, Copy, ValueEnum)]
enum StageDirection {
    Left,
    Right,
}

#[derive(Clone, Copy, ValueEnum)]
enum TaskDirection {
    Up,
    Down,
}

#[derive(Subcommand)]
enum StageCommands {
    Add {
        project: ProjectId,
        name: String,
    },
    Rename {
        project: ProjectId,
        stage: StageId,
        name: String,
    },
    Delete {
        project: ProjectId,
        stage: StageId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    Move {
        project: ProjectId,
        stage: StageId,
        #[arg(value_enum)]
        direction: StageDirection,
    },
}

#[derive(Subcommand)]
enum TaskCommands {
    Add {
        project: ProjectId,
        stage: StageId,
        content: String,
        #[arg(long)]
        assignee: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        start: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        end: Option<String>,
    },
    /// Edit a task. Pass an empty string to clear an optional field.
    Edit {
        project: ProjectId,
        task: TaskId,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        assignee: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
    Delete {
        project: ProjectId,
        task: TaskId,
        #[arg(short, long)]
        yes: bool,
    },
    #[command(group(ArgGroup::new("target").required(true).args(["direction", "to_stage"])))]
    Move {
        project: ProjectId,
        task: TaskId,
        #[arg(value_enum)]
        direction: Option<TaskDirection>,
        /// Send the task to the end of another stage
        #[arg(long)]
        to_stage: Option<StageId>,
    },
}

#[derive(Subcommand)]
enum SubtaskCommands {
    Add {
        project: ProjectId,
        task: TaskId,
        content: String,
    },
    Toggle {
        project: ProjectId,
        subtask: SubtaskId,
    },
    Edit {
        project: ProjectId,
        subtask: SubtaskId,
        content: String,
    },
    Delete {
        project: ProjectId,
        subtask: SubtaskId,
        #[arg(short, long)]
        yes: bool,
    },
}

/// Confirmation on stdin, or automatic with `--yes`.
struct PromptConfirm {
    assume_yes: bool,
}

impl Confirm for PromptConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        self.assume_yes || ask(prompt, &mut io::stdin().lock(), &mut io::stderr())
    }
}

/// Show `prompt` and read a yes/no answer. Any I/O failure counts as no, so
/// nothing blocks on input behind a prompt that was never shown.
fn ask(prompt: &str, input: &mut impl BufRead, output: &mut impl Write) -> bool {
    if write!(output, "{} [y/N] ", prompt).is_err() || output.flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if input.read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Initialize tracing on stderr so stdout only carries rendered output.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "stageboard=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(url) = cli.url {
        config = config.with_base_url(url);
    }
    tracing::debug!("Using backend at {}", config.base_url);
    let client = ApiClient::new(&config).context("Failed to build HTTP client")?;

    match cli.command {
        Commands::Hello => {
            let mut app = App::new(client);
            let health = app.check_health().await;
            if let Some(error) = &health.error {
                bail!("Error: {}", error);
            }
            println!("{}", health.message.as_deref().unwrap_or_default());
        }
        Commands::Open { route } => {
            let route: Route = route.parse()?;
            let mut app = App::new(client);
            match app.navigate(route).await {
                Screen::Projects(view) => print!("{}", render_project_list(view)),
                Screen::Board(view) => print!("{}", render_board(view)),
            }
        }
        Commands::Projects(cmd) => run_projects(client, cmd).await?,
        Commands::Board(cmd) => run_board(client, cmd).await?,
        Commands::Stage(cmd) => run_stage(client, cmd).await?,
        Commands::Task(cmd) => run_task(client, cmd).await?,
        Commands::Subtask(cmd) => run_subtask(client, cmd).await?,
    }

    Ok(())
}

async fn run_projects(client: ApiClient, cmd: ProjectCommands) -> anyhow::Result<()> {
    let mut view = ProjectListView::open(client).await;
    let outcome = match cmd {
        ProjectCommands::List => {
            if let Some(error) = view.error() {
                bail!("{}", error);
            }
            Outcome::Unchanged
        }
        ProjectCommands::Create { name, description } => {
            view.form.name = name;
            view.form.description = description.unwrap_or_default();
            view.create().await
        }
        ProjectCommands::Delete { id } => view.delete(id).await,
    };
    if outcome == Outcome::Rejected {
        bail!("{}", view.error().unwrap_or("Request failed"));
    }
    print!("{}", render_project_list(&view));
    Ok(())
}

async fn run_board(client: ApiClient, cmd: BoardCommands) -> anyhow::Result<()> {
    match cmd {
        BoardCommands::Show { project, expand } => {
            let mut view = open_board(client, project).await?;
            if expand {
                view.expand_all();
            }
            print!("{}", render_board(&view));
            Ok(())
        }
        BoardCommands::Normalize { project } => {
            let mut view = open_board(client, project).await?;
            let outcome = view.renormalize().await;
            finish(&view, outcome)
        }
    }
}

async fn run_stage(client: ApiClient, cmd: StageCommands) -> anyhow::Result<()> {
    match cmd {
        StageCommands::Add { project, name } => {
            let mut view = open_board(client, project).await?;
            view.new_stage_name = name;
            let outcome = view.create_stage().await;
            finish(&view, outcome)
        }
        StageCommands::Rename {
            project,
            stage,
            name,
        } => {
            let mut view = open_board(client, project).await?;
            if !view.begin_stage_rename(stage) {
                bail!("Stage {} not found.", stage);
            }
            view.set_stage_rename_text(name);
            let outcome = view.commit_stage_rename().await;
            finish(&view, outcome)
        }
        StageCommands::Delete {
            project,
            stage,
            yes,
        } => {
            let mut view = open_board(client, project).await?;
            let outcome = view
                .delete_stage(stage, &PromptConfirm { assume_yes: yes })
                .await;
            finish(&view, outcome)
        }
        StageCommands::Move {
            project,
            stage,
            direction,
        } => {
            let mut view = open_board(client, project).await?;
            let direction = match direction {
                StageDirection::Left => StageMove::Left,
                StageDirection::Right => StageMove::Right,
            };
            let outcome = view.move_stage(stage, direction).await;
            finish(&view, outcome)
        }
    }
}

async fn run_task(client: ApiClient, cmd: TaskCommands) -> anyhow::Result<()> {
    match cmd {
        TaskCommands::Add {
            project,
            stage,
            content,
            assignee,
            start,
            end,
        } => {
            let mut view = open_board(client, project).await?;
            if !view.open_task_form(stage, None) {
                bail!("Board is busy.");
            }
            if let Some(form) = view.task_form_mut() {
                form.content = content;
                form.assignee = assignee.unwrap_or_default();
                form.start_date = start.unwrap_or_default();
                form.end_date = end.unwrap_or_default();
            }
            let outcome = view.submit_task_form().await;
            finish(&view, outcome)
        }
        TaskCommands::Edit {
            project,
            task,
            content,
            assignee,
            start,
            end,
        } => {
            let mut view = open_board(client, project).await?;
            let stage = view
                .board()
                .and_then(|b| b.find_task(task))
                .map(|(stage, _)| stage.id)
                .with_context(|| format!("Task {} not found.", task))?;
            if !view.open_task_form(stage, Some(task)) {
                bail!("Task {} not found.", task);
            }
            if let Some(form) = view.task_form_mut() {
                if let Some(content) = content {
                    form.content = content;
                }
                if let Some(assignee) = assignee {
                    form.assignee = assignee;
                }
                if let Some(start) = start {
                    form.start_date = start;
                }
                if let Some(end) = end {
                    form.end_date = end;
                }
            }
            let outcome = view.submit_task_form().await;
            finish(&view, outcome)
        }
        TaskCommands::Delete { project, task, yes } => {
            let mut view = open_board(client, project).await?;
            let outcome = view
                .delete_task(task, &PromptConfirm { assume_yes: yes })
                .await;
            finish(&view, outcome)
        }
        TaskCommands::Move {
            project,
            task,
            direction,
            to_stage,
        } => {
            let mut view = open_board(client, project).await?;
            let movement = match (to_stage, direction) {
                (Some(stage), _) => TaskMove::ToStage(stage),
                (None, Some(TaskDirection::Up)) => TaskMove::Up,
                (None, Some(TaskDirection::Down)) => TaskMove::Down,
                (None, None) => bail!("Give a direction or --to-stage."),
            };
            let outcome = view.move_task(task, movement).await;
            finish(&view, outcome)
        }
    }
}

async fn run_subtask(client: ApiClient, cmd: SubtaskCommands) -> anyhow::Result<()> {
    match cmd {
        SubtaskCommands::Add {
            project,
            task,
            content,
        } => {
            let mut view = open_board(client, project).await?;
            view.set_subtask_draft(task, content);
            let outcome = view.create_subtask(task).await;
            view.expand_all();
            finish(&view, outcome)
        }
        SubtaskCommands::Toggle { project, subtask } => {
            let mut view = open_board(client, project).await?;
            let outcome = view.toggle_subtask(subtask).await;
            view.expand_all();
            finish(&view, outcome)
        }
        SubtaskCommands::Edit {
            project,
            subtask,
            content,
        } => {
            let mut view = open_board(client, project).await?;
            if !view.begin_subtask_edit(subtask) {
                bail!("Subtask {} not found.", subtask);
            }
            view.set_subtask_edit_text(content);
            let outcome = view.commit_subtask_edit().await;
            view.expand_all();
            finish(&view, outcome)
        }
        SubtaskCommands::Delete {
            project,
            subtask,
            yes,
        } => {
            let mut view = open_board(client, project).await?;
            let outcome = view
                .delete_subtask(subtask, &PromptConfirm { assume_yes: yes })
                .await;
            view.expand_all();
            finish(&view, outcome)
        }
    }
}

/// Load a board, failing unless it is ready for edits.
async fn open_board(client: ApiClient, project: ProjectId) -> anyhow::Result<BoardView> {
    let view = BoardView::open(client, project).await;
    match view.status() {
        BoardStatus::Ready => Ok(view),
        BoardStatus::Failed => bail!("{}", view.error().unwrap_or("Failed to load project")),
        BoardStatus::Loading | BoardStatus::NotFound => bail!("Project {} not found.", project),
    }
}

/// Report a handler's outcome and print the refreshed board.
fn finish(view: &BoardView, outcome: Outcome) -> anyhow::Result<()> {
    match outcome {
        Outcome::Applied => print!("{}", render_board(view)),
        Outcome::Unchanged => {
            eprintln!("Nothing to change.");
            print!("{}", render_board(view));
        }
        Outcome::Cancelled => eprintln!("Cancelled."),
        Outcome::Rejected => {
            let message = view
                .task_form()
                .and_then(|f| f.error())
                .or(view.error())
                .unwrap_or("Request failed");
            bail!("{}", message);
        }
    }
    Ok(())
}
