//! Command-line front end for taskgate.
//!
//! Usage:
//!
//! ```text
//! taskgate [--tasks-dir DIR] [--workdir DIR] [--config FILE] [--no-publish] <command>
//! ```
//!
//! `run-session` exits with 0 whenever the session ran, even if tasks
//! failed, 2 when pre-flight validation failed, and 1 on internal errors.
//! "No suitable tasks" exits with 0 and its own message.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use clap::{Args, Parser, Subcommand};
use mockable::{Clock, DefaultClock};
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use taskgate::command::{CommandRunner, ProcessCommandRunner};
use taskgate::deadline::Deadline;
use taskgate::publish::GitPublisher;
use taskgate::session::{
    SessionOptions, SessionOrchestrator, SessionOutcome, SessionResult, SimulatedWork,
};
use taskgate::task::{
    adapters::{git::GitChangedFiles, markdown::MarkdownTaskStore},
    domain::{TaskId, TaskStatus},
    ports::TaskStore,
    services::{TaskExecutor, TaskStats, import_issues, parse_issues, render_index},
};
use taskgate::validation::{CommandValidationGate, GateConfig, ValidationGate, ValidationResult};
use tokio::runtime::Builder;

/// Boxed error type for command handlers.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Exit code when the command succeeded.
const EXIT_OK: u8 = 0;
/// Exit code for internal errors.
const EXIT_INTERNAL: u8 = 1;
/// Exit code when validation blocked the command.
const EXIT_VALIDATION_FAILED: u8 = 2;

type Store = MarkdownTaskStore<DefaultClock>;

#[derive(Parser)]
#[command(
    name = "taskgate",
    version,
    about = "Bounded, validation-gated task lifecycle orchestrator"
)]
struct Cli {
    /// Directory holding the todo, in-progress and completed queues.
    #[arg(long, global = true, default_value = "tasks")]
    tasks_dir: Utf8PathBuf,
    /// Repository root where checks and git commands run.
    #[arg(long, global = true, default_value = ".")]
    workdir: Utf8PathBuf,
    /// Gate configuration file; defaults to `taskgate.toml` in the workdir.
    #[arg(long, global = true)]
    config: Option<Utf8PathBuf>,
    /// Do not commit or push completed tasks.
    #[arg(long, global = true)]
    no_publish: bool,
    /// Log session decisions to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one bounded session over suitable TODO tasks.
    RunSession(RunSessionArgs),
    /// Run the validation gate once.
    Validate {
        /// Treat warnings as failures.
        #[arg(long)]
        strict: bool,
    },
    /// List task identifiers, optionally for one status.
    List {
        /// `todo`, `in-progress` or `completed`.
        status: Option<String>,
    },
    /// Move a task to another status.
    Move {
        /// Task identifier.
        id: String,
        /// Target status.
        status: String,
    },
    /// Print per-queue counts.
    Stats,
    /// Regenerate the tasks README index.
    Index,
    /// Create TODO tasks from a JSON array of issues.
    Import {
        /// JSON file to read.
        file: Utf8PathBuf,
    },
}

#[derive(Args)]
struct RunSessionArgs {
    /// Maximum tasks to attempt.
    #[arg(long, default_value_t = 1)]
    max_tasks: usize,
    /// Only consider tasks whose component or body contains this text.
    #[arg(long)]
    component: Option<String>,
    /// Session wall-clock limit.
    #[arg(long, default_value_t = 300)]
    timeout_seconds: u64,
    /// Maximum files a task may modify.
    #[arg(long, default_value_t = 10)]
    max_files_per_task: usize,
    /// Treat validation warnings as failures.
    #[arg(long)]
    strict_validation: bool,
    /// Skip all validation (emergency override).
    #[arg(long)]
    skip_validation: bool,
    /// Report candidates without changing anything.
    #[arg(long)]
    dry_run: bool,
}

impl RunSessionArgs {
    fn options(&self) -> SessionOptions {
        SessionOptions {
            max_tasks: self.max_tasks,
            component_filter: self.component.clone(),
            timeout: Duration::from_secs(self.timeout_seconds),
            max_files: self.max_files_per_task,
            strict_validation: self.strict_validation,
            skip_validation: self.skip_validation,
            dry_run: self.dry_run,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    taskgate::logging::init(cli.verbose);
    let runtime = match Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => return report_error(&err.into()),
    };
    match runtime.block_on(run(&cli)) {
        Ok(code) => ExitCode::from(code),
        Err(err) => report_error(&err),
    }
}

fn report_error(err: &BoxError) -> ExitCode {
    let mut stderr = io::stderr().lock();
    if writeln!(stderr, "error: {err}").is_err() {
        return ExitCode::from(EXIT_INTERNAL);
    }
    ExitCode::from(EXIT_INTERNAL)
}

async fn run(cli: &Cli) -> Result<u8, BoxError> {
    let clock = Arc::new(DefaultClock);
    let store = Arc::new(MarkdownTaskStore::open(&cli.tasks_dir, DefaultClock)?);
    let runner: Arc<dyn CommandRunner> = Arc::new(ProcessCommandRunner::new());
    let mut out = io::stdout().lock();

    match &cli.command {
        Command::RunSession(args) => {
            let gate = build_gate(cli, &runner)?;
            let executor = build_executor(cli, &store, &clock, &runner);
            let orchestrator =
                SessionOrchestrator::new(executor, gate, Arc::new(SimulatedWork), clock);
            let result = orchestrator.run(&args.options()).await?;
            print_session(&mut out, &result)?;
            Ok(match result.outcome {
                SessionOutcome::PreflightFailed => EXIT_VALIDATION_FAILED,
                _ => EXIT_OK,
            })
        }
        Command::Validate { strict } => {
            let gate = build_gate(cli, &runner)?;
            let result = gate.run(*strict, &Deadline::unbounded(clock)).await;
            print_validation(&mut out, &result)?;
            Ok(if result.success {
                EXIT_OK
            } else {
                EXIT_VALIDATION_FAILED
            })
        }
        Command::List { status } => {
            let statuses = match status {
                Some(raw) => vec![TaskStatus::try_from(raw.as_str())?],
                None => TaskStatus::ALL.to_vec(),
            };
            for queue in statuses {
                for id in store.list(queue).await? {
                    writeln!(out, "{}\t{id}", queue.queue_name())?;
                }
            }
            Ok(EXIT_OK)
        }
        Command::Move { id, status } => {
            let task_id = TaskId::parse(id.as_str())?;
            let target = TaskStatus::try_from(status.as_str())?;
            let executor = build_executor(cli, &store, &clock, &runner);
            move_task(&executor, &task_id, target).await?;
            writeln!(out, "moved {task_id} to {}", target.queue_name())?;
            Ok(EXIT_OK)
        }
        Command::Stats => {
            let stats = TaskStats::collect(store.as_ref()).await?;
            writeln!(out, "total: {}", stats.total())?;
            writeln!(
                out,
                "completed: {} ({}%)",
                stats.completed,
                stats.completion_percent()
            )?;
            writeln!(out, "in progress: {}", stats.in_progress)?;
            writeln!(out, "todo: {}", stats.todo)?;
            Ok(EXIT_OK)
        }
        Command::Index => {
            let readme = render_index(store.as_ref(), clock.utc()).await?;
            store.write_readme(&readme)?;
            writeln!(out, "updated {}/README.md", store.root_path())?;
            Ok(EXIT_OK)
        }
        Command::Import { file } => {
            let issues = parse_issues(&read_file(file)?)?;
            let report = import_issues(store.as_ref(), clock.as_ref(), &issues).await;
            for id in &report.created {
                writeln!(out, "created {id}")?;
            }
            for rejection in &report.rejected {
                writeln!(out, "skipped '{}': {}", rejection.title, rejection.reason)?;
            }
            writeln!(
                out,
                "{} created, {} skipped",
                report.created.len(),
                report.rejected.len()
            )?;
            Ok(EXIT_OK)
        }
    }
}

fn build_gate(
    cli: &Cli,
    runner: &Arc<dyn CommandRunner>,
) -> Result<Arc<dyn ValidationGate>, BoxError> {
    let config = GateConfig::discover(cli.config.as_deref(), &cli.workdir)?;
    Ok(Arc::new(
        CommandValidationGate::new(Arc::clone(runner), config).in_dir(cli.workdir.clone()),
    ))
}

fn build_executor(
    cli: &Cli,
    store: &Arc<Store>,
    clock: &Arc<DefaultClock>,
    runner: &Arc<dyn CommandRunner>,
) -> TaskExecutor<Store, DefaultClock> {
    let estimator = GitChangedFiles::new(Arc::clone(runner), cli.workdir.clone())
        .ignoring(format!("{}/", cli.tasks_dir.as_str().trim_end_matches('/')));
    let executor = TaskExecutor::new(Arc::clone(store), Arc::clone(clock), Arc::new(estimator));
    if cli.no_publish {
        executor
    } else {
        executor.with_publisher(Arc::new(GitPublisher::new(
            Arc::clone(runner),
            cli.workdir.clone(),
        )))
    }
}

async fn move_task(
    executor: &TaskExecutor<Store, DefaultClock>,
    id: &TaskId,
    target: TaskStatus,
) -> Result<(), BoxError> {
    let current = executor.store().read(id).await?.status();
    match (current, target) {
        (TaskStatus::Todo, TaskStatus::InProgress) => {
            executor.begin(id).await?;
        }
        (TaskStatus::InProgress, TaskStatus::Completed) => {
            executor.complete(id).await?;
        }
        (TaskStatus::InProgress, TaskStatus::Todo) => {
            executor.rollback(id, "moved back manually").await?;
        }
        _ => {
            executor.store().move_task(id, current, target).await?;
        }
    }
    Ok(())
}

fn read_file(path: &Utf8Path) -> Result<String, BoxError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other("path must include a file name"))?;
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok(dir.read_to_string(file_name)?)
}

fn print_validation(out: &mut impl Write, result: &ValidationResult) -> io::Result<()> {
    for check in &result.checks {
        match check.failure {
            None => writeln!(out, "[pass] {}", check.name)?,
            Some(reason) => writeln!(out, "[fail] {} ({reason})", check.name)?,
        }
    }
    for error in &result.errors {
        writeln!(out, "error: {error}")?;
    }
    for warning in &result.warnings {
        writeln!(out, "warning: {warning}")?;
    }
    writeln!(
        out,
        "validation {} ({} checks, {} errors, {} warnings)",
        if result.success { "passed" } else { "failed" },
        result.checks_run,
        result.errors.len(),
        result.warnings.len()
    )
}

fn print_session(out: &mut impl Write, result: &SessionResult) -> io::Result<()> {
    match result.outcome {
        SessionOutcome::NoCandidates => writeln!(out, "No suitable tasks found.")?,
        SessionOutcome::PreflightFailed => {
            writeln!(out, "Pre-flight validation failed; no tasks attempted.")?;
        }
        SessionOutcome::DryRun => {
            writeln!(out, "Dry run: would attempt {} task(s):", result.completed.len())?;
            for id in &result.completed {
                writeln!(out, "  {id}")?;
            }
        }
        SessionOutcome::Completed | SessionOutcome::Halted | SessionOutcome::TimedOut => {
            writeln!(out, "Session {}.", result.outcome)?;
        }
    }
    writeln!(
        out,
        "attempted: {}, completed: {}, failed: {}, files modified: {}, duration: {:.1}s",
        result.tasks_attempted,
        result.tasks_completed,
        result.tasks_failed,
        result.total_files_modified,
        result.duration.as_secs_f64()
    )?;
    for stage in &result.validations {
        writeln!(
            out,
            "validation {}: {}",
            stage.stage,
            if stage.result.success { "passed" } else { "failed" }
        )?;
    }
    for error in &result.errors {
        writeln!(out, "error: {error}")?;
    }
    for warning in &result.warnings {
        writeln!(out, "warning: {warning}")?;
    }
    Ok(())
}
