//! Session limits and switches.

use std::time::Duration;

/// Tasks attempted per session unless overridden.
pub const DEFAULT_MAX_TASKS: usize = 1;
/// Session wall-clock limit unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
/// Files one task may modify unless overridden.
pub const DEFAULT_MAX_FILES: usize = 10;

/// Options for one [`super::SessionOrchestrator::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Maximum number of candidates selected.
    pub max_tasks: usize,
    /// Case-insensitive substring matched against component or body.
    pub component_filter: Option<String>,
    /// Wall-clock budget for the whole session.
    pub timeout: Duration,
    /// Maximum files a single task may modify.
    pub max_files: usize,
    /// Promote warnings to failures in every gate run.
    pub strict_validation: bool,
    /// Skip both pre-flight and post-task validation.
    pub skip_validation: bool,
    /// Report candidates without touching the store.
    pub dry_run: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            max_tasks: DEFAULT_MAX_TASKS,
            component_filter: None,
            timeout: DEFAULT_TIMEOUT,
            max_files: DEFAULT_MAX_FILES,
            strict_validation: false,
            skip_validation: false,
            dry_run: false,
        }
    }
}

impl SessionOptions {
    /// Sets the task limit.
    #[must_use]
    pub const fn with_max_tasks(mut self, max_tasks: usize) -> Self {
        self.max_tasks = max_tasks;
        self
    }

    /// Sets the component filter.
    #[must_use]
    pub fn with_component_filter(mut self, filter: impl Into<String>) -> Self {
        self.component_filter = Some(filter.into());
        self
    }

    /// Sets the session timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the per-task file budget.
    #[must_use]
    pub const fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    /// Enables strict validation.
    #[must_use]
    pub const fn strict(mut self) -> Self {
        self.strict_validation = true;
        self
    }

    /// Disables validation entirely.
    #[must_use]
    pub const fn skipping_validation(mut self) -> Self {
        self.skip_validation = true;
        self
    }

    /// Enables dry-run reporting.
    #[must_use]
    pub const fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }
}
