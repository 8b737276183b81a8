use std::io;

use anyhow::anyhow;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};

use taskdeck::commands::*;
use taskdeck::models::{SortKey, StatusFilter, TaskFilters};
use taskdeck::store::{CategoryStore, TaskStore};

#[derive(Parser)]
#[command(name = "taskdeck")]
#[command(about = "Task manager with recurring templates and time tracking", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tasks with optional filters
    List {
        /// Status filter (all, pending, completed, overdue)
        #[arg(short, long)]
        status: Option<String>,
        /// Priority filter (low, medium, high)
        #[arg(short, long)]
        priority: Option<String>,
        /// Category id
        #[arg(short, long)]
        category: Option<u64>,
        /// Text matched against title and description
        #[arg(long)]
        search: Option<String>,
        /// Sort key (title, priority, due, created, order)
        #[arg(long)]
        sort: Option<String>,
        /// Reverse the sort direction
        #[arg(short, long)]
        desc: bool,
    },
    /// Show aggregate statistics
    Stats,
    /// Add a new task
    Add {
        /// Task title (quoted if it has spaces)
        title: String,
        /// Longer description
        #[arg(short, long)]
        description: Option<String>,
        /// Priority (low, medium, high)
        #[arg(short, long)]
        priority: Option<String>,
        /// Category id
        #[arg(short, long)]
        category: Option<u64>,
        /// Due date in YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,
        /// Make this a recurring template (daily, weekly, monthly)
        #[arg(short, long)]
        recur: Option<String>,
        /// Intervals between occurrences
        #[arg(short, long)]
        every: Option<u32>,
        /// Dates (YYYY-MM-DD) excluded from generation
        #[arg(long)]
        skip: Vec<String>,
    },
    /// Mark one or more tasks as complete
    Complete {
        #[arg(required = true)]
        ids: Vec<u64>,
    },
    /// Remove a task (templates are archived, not deleted)
    Remove {
        id: u64,
    },
    /// Edit a task
    Edit {
        id: u64,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
        /// New priority
        #[arg(short, long)]
        priority: Option<String>,
        /// New category id
        #[arg(short, long)]
        category: Option<u64>,
        /// New due date in YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,
        /// New manual position
        #[arg(short, long)]
        order: Option<i64>,
    },
    /// Search tasks by title or description
    Search {
        query: String,
    },
    /// Move a task to a new manual position
    Reorder {
        id: u64,
        order: i64,
    },
    /// Track time against tasks
    Timer {
        #[command(subcommand)]
        command: TimerCommands,
    },
    /// Expand a recurring template into dated instances
    Generate {
        template_id: u64,
        /// Window start in YYYY-MM-DD
        #[arg(long)]
        from: String,
        /// Window end in YYYY-MM-DD (inclusive)
        #[arg(long)]
        to: String,
    },
    /// Manage categories
    Category {
        #[command(subcommand)]
        command: CategoryCommands,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
}

#[derive(Subcommand)]
enum TimerCommands {
    /// Start the timer on a task
    Start { id: u64 },
    /// Stop the running timer
    Stop { id: u64 },
    /// Show timer state and session history
    Show { id: u64 },
}

#[derive(Subcommand)]
enum CategoryCommands {
    /// List categories with task counts
    List,
    /// Add a new category
    Add {
        name: String,
        /// Display color, e.g. '#EF4444'
        #[arg(short, long)]
        color: Option<String>,
        #[arg(short, long)]
        icon: Option<String>,
    },
    /// Remove a category
    Remove { id: u64 },
}

fn main() {
    env_logger::init();
    if let Err(err) = run(Cli::parse()) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut tasks = TaskStore::seeded();
    let mut categories = CategoryStore::seeded();

    match cli.command {
        Commands::List {
            status,
            priority,
            category,
            search,
            sort,
            desc,
        } => {
            let filters = TaskFilters {
                status: match status {
                    Some(s) => s.parse::<StatusFilter>().map_err(|e| anyhow!(e))?,
                    None => StatusFilter::All,
                },
                priority: priority
                    .map(|p| p.parse().map_err(|e: String| anyhow!(e)))
                    .transpose()?,
                category,
                search,
            };
            let sort = match sort {
                Some(s) => s.parse::<SortKey>().map_err(|e| anyhow!(e))?,
                None => SortKey::Order,
            };
            cmd_list(&tasks, &categories, &filters, sort, desc)
        }
        Commands::Stats => cmd_stats(&tasks),
        Commands::Add {
            title,
            description,
            priority,
            category,
            due,
            recur,
            every,
            skip,
        } => cmd_add(
            &mut tasks,
            title,
            description,
            priority,
            category,
            due,
            recur,
            every,
            skip,
        ),
        Commands::Complete { ids } => cmd_complete(&mut tasks, ids),
        Commands::Remove { id } => cmd_remove(&mut tasks, id),
        Commands::Edit {
            id,
            title,
            description,
            priority,
            category,
            due,
            order,
        } => cmd_edit(
            &mut tasks,
            id,
            title,
            description,
            priority,
            category,
            due,
            order,
        ),
        Commands::Search { query } => cmd_search(&tasks, query),
        Commands::Reorder { id, order } => cmd_reorder(&mut tasks, id, order),
        Commands::Timer { command } => match command {
            TimerCommands::Start { id } => cmd_timer_start(&mut tasks, id),
            TimerCommands::Stop { id } => cmd_timer_stop(&mut tasks, id),
            TimerCommands::Show { id } => cmd_timer_show(&tasks, id),
        },
        Commands::Generate {
            template_id,
            from,
            to,
        } => cmd_generate(&mut tasks, template_id, from, to),
        Commands::Category { command } => match command {
            CategoryCommands::List => cmd_category_list(&mut categories, &tasks),
            CategoryCommands::Add { name, color, icon } => {
                cmd_category_add(&mut categories, name, color, icon)
            }
            CategoryCommands::Remove { id } => cmd_category_remove(&mut categories, id),
        },
        Commands::Completions { shell } => {
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "powershell" => Shell::PowerShell,
                "elvish" => Shell::Elvish,
                _ => {
                    eprintln!("Unsupported shell: {}", shell);
                    return Ok(());
                }
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "taskdeck", &mut io::stdout());
            Ok(())
        }
    }
}
