//! Application root: logging, paths and the options engine wired together
//! in startup order.

mod options;

pub use options::{OptionsRoot, Platform, StartupReport};

use paths::PathContext;
use std::marker::PhantomData;
#[cfg(debug_assertions)]
use std::path::PathBuf;
use tracing_subscriber::{
    Layer, filter::LevelFilter, filter::filter_fn, fmt, layer::SubscriberExt,
    util::SubscriberInitExt,
};

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Application infrastructure context.
pub struct AppContext {
    pub path_context: PathContext,
    pub version: &'static str,
    /// Flushes the file log on drop; keep it alive for the whole run.
    _log_guard: tracing_appender::non_blocking::WorkerGuard,
}

impl AppContext {
    pub fn app_id(&self) -> &str {
        self.path_context.app_id()
    }

    pub fn version(&self) -> &'static str {
        self.version
    }

    pub fn path_context(&self) -> &PathContext {
        &self.path_context
    }
}

/// Application identity. Pure constants.
pub trait Application: Sized + 'static {
    const APP_ID: &'static str;
    const STUDIO: &'static str = "indie_studio";
    const PROJECT_ID: &'static str = "first_person";
}

/// Sets up paths and logging before anything else runs.
pub struct AppBuilder<A: Application> {
    context: AppContext,
    _marker: PhantomData<A>,
}

impl<A: Application> AppBuilder<A> {
    /// Resolve the project directories for `A`, then continue as
    /// [`AppBuilder::with_path_context`].
    pub fn new(version: &'static str) -> Result<Self, BoxError> {
        #[cfg(debug_assertions)]
        let path_context = PathContext::with_base_path(
            PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                .join("..")
                .join("..")
                .join(".out"),
            A::STUDIO,
            A::PROJECT_ID,
            A::APP_ID,
        );
        #[cfg(not(debug_assertions))]
        let path_context = PathContext::new(A::STUDIO, A::PROJECT_ID, A::APP_ID);

        Self::with_path_context(path_context, version)
    }

    /// Create the project directories under `path_context` and install the
    /// console + file `tracing` subscriber.
    ///
    /// Fails if a global subscriber is already installed.
    pub fn with_path_context(
        path_context: PathContext,
        version: &'static str,
    ) -> Result<Self, BoxError> {
        let app_id = path_context.app_id();

        path_context.ensure_directories()?;

        let log_file_path = path_context.log_file_now();
        let log_dir = log_file_path
            .parent()
            .ok_or("log file path has no parent directory")?;
        let log_filename = log_file_path
            .file_name()
            .ok_or("log file path has no file name")?;

        let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        #[cfg(debug_assertions)]
        let level = LevelFilter::INFO;

        #[cfg(not(debug_assertions))]
        let level = LevelFilter::WARN;

        let file_layer = fmt::Layer::default()
            .with_target(false)
            .with_ansi(false)
            .with_writer(non_blocking)
            .with_filter(filter_fn(move |metadata| metadata.level() <= &level));

        let console_layer = fmt::Layer::default()
            .with_target(false)
            .with_filter(filter_fn(move |metadata| metadata.level() <= &level));

        tracing_subscriber::registry()
            .with(file_layer)
            .with(console_layer)
            .try_init()?;

        tracing::info!(app_id, version, "application starting");

        Ok(Self {
            context: AppContext {
                path_context,
                version,
                _log_guard: guard,
            },
            _marker: PhantomData,
        })
    }

    /// Assemble the options engine against `platform`, load the saved
    /// options and seed default bindings. Must run before any UI reads
    /// owner state.
    pub fn build_with_options<P: Platform>(
        self,
        platform: std::sync::Arc<P>,
        initial_quality: usize,
    ) -> Result<(AppContext, OptionsRoot, StartupReport), BoxError> {
        let options_file = self.context.path_context.options_file();
        let (root, report) = OptionsRoot::assemble(options_file, platform, initial_quality)?;
        Ok((self.context, root, report))
    }
}
