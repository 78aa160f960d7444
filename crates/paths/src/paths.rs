//! Where the options file and the logs live for the current runtime.

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Identifies the runtime environment where the application is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeEnvironment {
    /// Running via `cargo run` or from a `target/` directory
    Development,
    /// Running as an installed binary
    Production,
}

/// Project-aware paths rooted at `<base>/<studio>/<project_id>`.
#[derive(Debug, Clone)]
pub struct PathContext {
    environment: RuntimeEnvironment,
    base_path: Arc<Path>,
    studio: String,
    project_id: String,
    app_id: &'static str,
}

impl PathContext {
    /// Creates a new PathContext with automatic environment detection.
    pub fn new(
        studio: impl Into<String>,
        project_id: impl Into<String>,
        app_id: &'static str,
    ) -> Self {
        let environment = Self::detect_environment();
        Self {
            environment,
            base_path: Self::determine_base_path(environment).into(),
            studio: studio.into(),
            project_id: project_id.into(),
            app_id,
        }
    }

    /// Creates a PathContext with an explicit base path (useful for testing).
    pub fn with_base_path(
        base_path: PathBuf,
        studio: impl Into<String>,
        project_id: impl Into<String>,
        app_id: &'static str,
    ) -> Self {
        Self {
            environment: Self::detect_environment(),
            base_path: base_path.into(),
            studio: studio.into(),
            project_id: project_id.into(),
            app_id,
        }
    }

    fn detect_environment() -> RuntimeEnvironment {
        if let Ok(exe_path) = std::env::current_exe() {
            if exe_path.components().any(|c| c.as_os_str() == "target") {
                return RuntimeEnvironment::Development;
            }
        }

        if std::env::var_os("CARGO").is_some() || std::env::var_os("CARGO_MANIFEST_DIR").is_some() {
            return RuntimeEnvironment::Development;
        }

        RuntimeEnvironment::Production
    }

    fn determine_base_path(environment: RuntimeEnvironment) -> PathBuf {
        match environment {
            RuntimeEnvironment::Development => std::env::var_os("CARGO_MANIFEST_DIR")
                .map(PathBuf::from)
                .or_else(|| std::env::current_dir().ok())
                .unwrap_or_else(|| PathBuf::from(".")),
            // Application Support / LocalAppData / XDG_DATA_HOME
            RuntimeEnvironment::Production => {
                dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."))
            }
        }
    }

    pub fn environment(&self) -> RuntimeEnvironment {
        self.environment
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn studio(&self) -> &str {
        &self.studio
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn app_id(&self) -> &'static str {
        self.app_id
    }

    /// `<base>/<studio>/<project_id>`
    pub fn project_root(&self) -> PathBuf {
        self.base_path.join(&self.studio).join(&self.project_id)
    }

    /// The persisted options record: `<project_root>/<app_id>.options.json`
    pub fn options_file(&self) -> PathBuf {
        self.project_root()
            .join(format!("{}.options.json", self.app_id))
    }

    /// `<project_root>/logs/`
    pub fn logs_dir(&self) -> PathBuf {
        self.project_root().join("logs")
    }

    /// `<project_root>/logs/<app_id>.<timestamp>.log`
    pub fn log_file(&self, timestamp: &str) -> PathBuf {
        self.logs_dir()
            .join(format!("{}.{}.log", self.app_id, timestamp))
    }

    /// Log file stamped with the local time.
    pub fn log_file_now(&self) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
        self.log_file(&timestamp)
    }

    /// Creates the project root and the logs directory.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        for dir in [self.project_root(), self.logs_dir()] {
            if !dir.exists() {
                std::fs::create_dir_all(&dir)?;
            }
        }
        Ok(())
    }
}
