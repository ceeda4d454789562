//! Tracing subscriber setup.
//!
//! Both outputs share one renderer: the console gets it with colours, the
//! log file gets it plain behind a timestamp.
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use tracing::Level;
use tracing::field::{Field, Visit};

use super::types::TaskStatus;
use super::utils::{format_utc_datetime, format_utc_time, log_file_path};

/// Tracing target for stage headers.
pub(super) const STAGE_TARGET: &str = "dot_install::stage";
/// Tracing target for simulate-mode intents.
pub(super) const SIMULATE_TARGET: &str = "dot_install::simulate";
/// Tracing target for run summary lines; task lines carry a `status` field.
pub(super) const SUMMARY_TARGET: &str = "dot_install::summary";

/// Fields this crate puts on its events.
#[derive(Debug, Default)]
struct EventFields {
    message: String,
    status: Option<TaskStatus>,
}

impl EventFields {
    fn from_event(event: &tracing::Event<'_>) -> Self {
        let mut fields = Self::default();
        event.record(&mut fields);
        fields
    }
}

impl Visit for EventFields {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "status" => self.status = TaskStatus::from_label(value),
            _ => {}
        }
    }
}

/// What an event is, by level and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Stage,
    Simulate,
    Summary,
    Error,
    Warn,
    Debug,
    Detail,
}

impl Kind {
    fn of(metadata: &tracing::Metadata<'_>) -> Self {
        match (*metadata.level(), metadata.target()) {
            (Level::ERROR, _) => Self::Error,
            (Level::WARN, _) => Self::Warn,
            (Level::INFO, STAGE_TARGET) => Self::Stage,
            (Level::INFO, SIMULATE_TARGET) => Self::Simulate,
            (Level::INFO, SUMMARY_TARGET) => Self::Summary,
            (Level::INFO, _) => Self::Detail,
            _ => Self::Debug,
        }
    }
}

/// SGR styling, switched off for the log file.
#[derive(Debug, Clone, Copy)]
struct Style {
    ansi: bool,
}

impl Style {
    const CONSOLE: Self = Self { ansi: true };
    const PLAIN: Self = Self { ansi: false };

    fn paint(self, sgr: &str, text: &str) -> String {
        if self.ansi {
            format!("\x1b[{sgr}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}

const fn status_sgr(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Ok => "32",
        TaskStatus::Skipped => "33",
        TaskStatus::Simulated => "37",
        TaskStatus::Failed => "31",
    }
}

fn render(kind: Kind, fields: &EventFields, style: Style) -> String {
    let msg = fields.message.as_str();
    match kind {
        Kind::Stage => format!("{} {}", style.paint("1;34", "==>"), style.paint("1", msg)),
        Kind::Simulate => format!("  {} {msg}", style.paint("33", "[simulate]")),
        Kind::Summary => match fields.status {
            Some(status) => format!(
                "  {}",
                style.paint(status_sgr(status), &format!("{} {msg}", status.icon()))
            ),
            None => format!("  {msg}"),
        },
        Kind::Error => format!("{} {msg}", style.paint("31", "[error]")),
        Kind::Warn => format!("{} {msg}", style.paint("33", "[warn]")),
        Kind::Debug => format!("  {}", style.paint("2", &format!("[debug] {msg}"))),
        Kind::Detail => format!("  {msg}"),
    }
}

/// Appends every event to the run's log file.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Open the log file for `command` under the cache directory.
    ///
    /// Returns `None` if the cache directory cannot be created or the file
    /// cannot be opened.
    pub(super) fn new(command: &str) -> Option<Self> {
        Self::at(&log_file_path(command)?)
    }

    /// Truncate `path` to a run header and append later events to it.
    pub(super) fn at(path: &Path) -> Option<Self> {
        let version = option_env!("DOT_INSTALL_VERSION")
            .unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        fs::write(
            path,
            format!("# dot-install {version} started {}\n", format_utc_datetime()),
        )
        .ok()?;
        let file = fs::OpenOptions::new().append(true).open(path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let kind = Kind::of(event.metadata());
        let line = render(kind, &EventFields::from_event(event), Style::PLAIN);
        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "[{}] {line}", format_utc_time()).ok();
        }
    }
}

/// Console side of the renderer.
struct ConsoleFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let kind = Kind::of(event.metadata());
        let style = if writer.has_ansi_escapes() {
            Style::CONSOLE
        } else {
            Style::PLAIN
        };
        writeln!(
            writer,
            "{}",
            render(kind, &EventFields::from_event(event), style)
        )
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// Console output goes to stdout (INFO, or DEBUG when `verbose`) with
/// warnings and errors on stderr. Every event at DEBUG and above is also
/// appended to `$XDG_CACHE_HOME/dot-install/<command>.log`.
/// Must be called once at program startup, before any logging.
pub fn init_subscriber(verbose: bool, command: &str) {
    use std::io::IsTerminal as _;
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let make_writer = std::io::stderr
        .with_max_level(Level::WARN)
        .and(std::io::stdout.with_min_level(Level::INFO));

    let console_layer = fmt::layer()
        .event_format(ConsoleFormatter)
        .with_ansi(std::io::stdout().is_terminal())
        .with_writer(make_writer)
        .with_filter(console_level);

    let file_layer = FileLayer::new(command).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}
