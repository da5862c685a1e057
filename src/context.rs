//! Thread contexts: where a continuation runs.
//!
//! The main context is one dedicated, lazily started thread that runs jobs
//! serially in submission order. Every background submission gets a freshly
//! spawned thread, so background deliveries have no ordering relative to each
//! other or to the main context.
use crate::error::ConfigError;
use std::{
    cell::Cell,
    sync::{
        atomic::{AtomicUsize, Ordering},
        mpsc::{channel, Sender},
        Condvar, Mutex, OnceLock,
    },
    thread,
};

/// A unit of work submitted to a context.
pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

/// Selects where a continuation is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreadContext {
    /// The single serial main context.
    Main,
    /// A fresh concurrent thread per submission.
    Background,
}

impl ThreadContext {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Background => "background",
        }
    }

    /// Submits `job` to this context. Never blocks on the job itself.
    pub fn submit<F>(self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        tracing::trace!(context = self.as_str(), "context.submit");
        match self {
            Self::Main => main_context().submit(Box::new(job)),
            Self::Background => spawn_background(job),
        }
    }
}

/// Settings for the thread contexts. Install with [`configure`] before any
/// future is created; otherwise the defaults apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextConfig {
    pub main_thread_name: String,
    pub background_thread_prefix: String,
    /// Stack size for background threads, `None` for the platform default.
    pub background_stack_size: Option<usize>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            main_thread_name: "future-main".to_owned(),
            background_thread_prefix: "future-background".to_owned(),
            background_stack_size: None,
        }
    }
}

impl ContextConfig {
    pub fn with_main_thread_name(mut self, name: impl Into<String>) -> Self {
        self.main_thread_name = name.into();
        self
    }

    pub fn with_background_thread_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.background_thread_prefix = prefix.into();
        self
    }

    pub fn with_background_stack_size(mut self, size: usize) -> Self {
        self.background_stack_size = Some(size);
        self
    }
}

static CONFIG: OnceLock<ContextConfig> = OnceLock::new();
static BACKGROUND_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Installs `config` for the whole process.
///
/// Fails with [`ConfigError::AlreadyInitialized`] once a configuration has
/// been installed or the defaults have been locked in by first use.
pub fn configure(config: ContextConfig) -> Result<(), ConfigError> {
    CONFIG.set(config).map_err(|_| ConfigError::AlreadyInitialized)
}

/// The active configuration.
pub(crate) fn config() -> &'static ContextConfig {
    CONFIG.get_or_init(ContextConfig::default)
}

thread_local! {
    static IS_MAIN: Cell<bool> = const { Cell::new(false) };
}

/// Whether the calling thread is the main context.
pub fn is_main_context() -> bool {
    IS_MAIN.with(Cell::get)
}

struct MainContext {
    sender: Mutex<Sender<Job>>,
}

impl MainContext {
    fn start(name: &str) -> Self {
        let (sender, receiver) = channel::<Job>();
        thread::Builder::new()
            .name(name.to_owned())
            .spawn(move || {
                IS_MAIN.with(|is_main| is_main.set(true));
                for job in receiver {
                    if std::panic::catch_unwind(std::panic::AssertUnwindSafe(job)).is_err() {
                        tracing::error!("job panicked on the main context");
                    }
                }
            })
            .expect("failed to spawn the main context thread");
        Self { sender: Mutex::new(sender) }
    }

    fn submit(&self, job: Job) {
        // The receiving loop lives for the whole process.
        let _ = self.sender.lock().unwrap().send(job);
    }
}

fn main_context() -> &'static MainContext {
    static MAIN: OnceLock<MainContext> = OnceLock::new();
    MAIN.get_or_init(|| MainContext::start(&config().main_thread_name))
}

fn spawn_background<F>(job: F)
where
    F: FnOnce() + Send + 'static,
{
    let config = config();
    let n = BACKGROUND_COUNTER.fetch_add(1, Ordering::Relaxed);
    let name = format!("{}-{}", config.background_thread_prefix, n);
    tracing::trace!(thread = %name, "context.spawn_background");
    let mut builder = thread::Builder::new().name(name);
    if let Some(size) = config.background_stack_size {
        builder = builder.stack_size(size);
    }
    builder.spawn(job).expect("failed to spawn a background context thread");
}

/// A counting signal: `wait` blocks until a matching `signal`.
#[derive(Debug, Default)]
pub struct Semaphore {
    count: Mutex<usize>,
    signal: Condvar,
}

impl Semaphore {
    pub fn new(count: usize) -> Self {
        Self { count: Mutex::new(count), signal: Condvar::new() }
    }

    /// Releases one waiter.
    pub fn signal(&self) {
        let mut count = self.count.lock().unwrap();
        *count += 1;
        self.signal.notify_one();
    }

    /// Blocks until the count is positive, then decrements it. No timeout.
    pub fn wait(&self) {
        let mut count = self.count.lock().unwrap();
        while *count == 0 {
            count = self.signal.wait(count).unwrap();
        }
        *count -= 1;
    }
}
