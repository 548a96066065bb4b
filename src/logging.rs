//! One-call logging setup.
//!
//! The [`Logging`] description resolves the starting log level from three places, in order of
//! priority: a command line flag, the `LOG_LEVEL` environment variable and the configured
//! default. [`install`][Logging::install] then routes the [`log`] macros into a `fern` sink ‒
//! colored when the `color` feature is compiled in and not turned off.
//!
//! Installation goes through [`log_reroute`], so it can be repeated freely. A later install
//! replaces the sink of an earlier one instead of stacking another one next to it. The level also
//! stays adjustable while the program runs ‒ through [`set_level`], or through the registered
//! command line flag, which takes effect already during parsing (so even logging done by other
//! argument converters honors it).
//!
//! # Examples
//!
//! ```rust,no_run
//! use sheen::{LogLevel, Logging};
//!
//! # fn main() -> Result<(), sheen::AnyError> {
//! Logging::new().level(LogLevel::Warning).install()?;
//! log::warn!("This one gets through");
//! log::info!("This one does not");
//! # Ok(())
//! # }
//! ```

use std::env;
use std::error::Error;
use std::ffi::OsStr;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io;
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::Local;
use err_context::prelude::*;
use fern::Dispatch;
use itertools::Itertools;
use log::{info, LevelFilter, Record};
use serde::de::{Deserializer, Error as DeError};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use structopt::clap::{App, Arg};
use structopt::StructOpt;

use crate::action::Action;
use crate::error::AnyError;

/// The environment variable consulted for the starting log level.
pub const LEVEL_ENV_VAR: &str = "LOG_LEVEL";

/// Severity of log messages.
///
/// These are the application-facing levels ‒ five of them, ordered from the chattiest to the
/// quietest. They map onto the [`log`] crate's filters, except for
/// [`Critical`][LogLevel::Critical], which has no counterpart there and turns logging off
/// entirely.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum LogLevel {
    /// Everything, including development diagnostics.
    Debug,

    /// The ordinary operational chatter. The starting level.
    Info,

    /// Things that deserve attention but don't break anything.
    Warning,

    /// Things that broke.
    Error,

    /// Nothing gets logged at all.
    Critical,
}

impl LogLevel {
    /// All the level names, from the chattiest to the quietest.
    pub const NAMES: [&'static str; 5] = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"];

    /// The canonical upper-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::Critical => "CRITICAL",
        }
    }

    /// The corresponding filter of the [`log`] crate.
    ///
    /// [`Critical`][LogLevel::Critical] maps to [`LevelFilter::Off`] ‒ the [`log`] crate knows
    /// no level above error, so critical means being quiet.
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warning => LevelFilter::Warn,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Critical => LevelFilter::Off,
        }
    }

    fn from_index(index: usize) -> Self {
        match index {
            0 => LogLevel::Debug,
            1 => LogLevel::Info,
            2 => LogLevel::Warning,
            3 => LogLevel::Error,
            _ => LogLevel::Critical,
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl Display for LogLevel {
    fn fmt(&self, fmt: &mut Formatter) -> FmtResult {
        fmt.write_str(self.as_str())
    }
}

/// An attempt to name a log level that doesn't exist.
#[derive(Clone, Debug)]
pub struct UnknownLevel(String);

impl Display for UnknownLevel {
    fn fmt(&self, fmt: &mut Formatter) -> FmtResult {
        write!(
            fmt,
            "Unknown log level {} (expected one of {})",
            self.0,
            LogLevel::NAMES.iter().join(", "),
        )
    }
}

impl Error for UnknownLevel {}

impl FromStr for LogLevel {
    type Err = UnknownLevel;

    /// Parses a level name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARNING" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            "CRITICAL" => Ok(LogLevel::Critical),
            _ => Err(UnknownLevel(s.to_owned())),
        }
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s = String::deserialize(d)?;
        s.parse()
            .map_err(|_| D::Error::unknown_variant(&s, &LogLevel::NAMES))
    }
}

impl Serialize for LogLevel {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

// The level in effect, as an index into LogLevel so it fits into an atomic.
static CURRENT: AtomicUsize = AtomicUsize::new(LogLevel::Info as usize);

// Whether the one-shot hint about missing color support was printed already.
static COLOR_HINTED: AtomicBool = AtomicBool::new(false);

/// Changes the log level, effective immediately.
pub fn set_level(level: LogLevel) {
    CURRENT.store(level as usize, Ordering::SeqCst);
    log::set_max_level(level.to_level_filter());
}

/// The log level currently in effect.
///
/// Starts as [`Info`][LogLevel::Info], even before any [`install`][Logging::install].
pub fn current_level() -> LogLevel {
    LogLevel::from_index(CURRENT.load(Ordering::SeqCst))
}

/// Checks for the most verbose level, to guard expensive diagnostics.
pub fn is_debug() -> bool {
    current_level() == LogLevel::Debug
}

/// Colored output was requested but the support isn't compiled in.
#[derive(Copy, Clone, Debug)]
pub struct ColorsNotCompiledIn;

impl Display for ColorsNotCompiledIn {
    fn fmt(&self, fmt: &mut Formatter) -> FmtResult {
        write!(
            fmt,
            "Colored logging is not available: turn colors off or enable the color feature"
        )
    }
}

impl Error for ColorsNotCompiledIn {}

/// A description of how logging should be set up.
///
/// The description can be built in code, or loaded from a configuration file ‒ it knows how to
/// [`Deserialize`]. Nothing happens until [`install`][Logging::install] is called.
///
/// # Examples
///
/// ```rust,no_run
/// use sheen::{LogLevel, Logging};
///
/// # fn main() -> Result<(), sheen::AnyError> {
/// let logging = Logging::new()
///     .level(LogLevel::Debug)
///     .colors(false);
/// logging.install()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Logging {
    level: LogLevel,
    colors: Option<bool>,
    read_env: bool,
    strict_env: bool,
    flag_name: String,
    flag_help: String,
}

impl Default for Logging {
    fn default() -> Self {
        Logging {
            level: LogLevel::Info,
            colors: None,
            read_env: true,
            strict_env: false,
            flag_name: "log-level".to_owned(),
            flag_help: "Minimum severity of messages to log.".to_owned(),
        }
    }
}

impl Logging {
    /// A description with all the defaults.
    ///
    /// Info level, environment override enabled and leniently parsed, colors by what the build
    /// supports, flag spelled `--log-level`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the level used when neither the environment nor the flag has a say.
    pub fn level(self, level: LogLevel) -> Self {
        Logging { level, ..self }
    }

    /// Turns colored output on or off explicitly.
    ///
    /// Asking for colors in a build without the `color` feature makes
    /// [`install`][Logging::install] fail. Without the explicit setting colors follow what the
    /// build supports.
    pub fn colors(self, colors: bool) -> Self {
        Logging {
            colors: Some(colors),
            ..self
        }
    }

    /// Enables or disables consulting the `LOG_LEVEL` environment variable.
    pub fn read_env(self, read_env: bool) -> Self {
        Logging { read_env, ..self }
    }

    /// Makes an unparseable `LOG_LEVEL` value fatal instead of silently ignored.
    pub fn strict_env(self, strict_env: bool) -> Self {
        Logging { strict_env, ..self }
    }

    /// Renames the command line flag (without the leading dashes).
    pub fn flag_name(self, name: impl Into<String>) -> Self {
        Logging {
            flag_name: name.into(),
            ..self
        }
    }

    /// Replaces the help text of the command line flag.
    pub fn flag_help(self, help: impl Into<String>) -> Self {
        Logging {
            flag_help: help.into(),
            ..self
        }
    }

    fn resolve_level(&self) -> Result<LogLevel, AnyError> {
        if self.read_env {
            if let Ok(raw) = env::var(LEVEL_ENV_VAR) {
                match raw.parse::<LogLevel>() {
                    Ok(level) => return Ok(level),
                    Err(e) if self.strict_env => {
                        return Err(e.context(format!("Invalid {} value", LEVEL_ENV_VAR)).into());
                    }
                    // Lenient mode, fall back to the configured level
                    Err(_) => (),
                }
            }
        }
        Ok(self.level)
    }

    fn resolve_colors(&self) -> Result<bool, AnyError> {
        match self.colors {
            Some(true) if !cfg!(feature = "color") => Err(ColorsNotCompiledIn.into()),
            Some(explicit) => Ok(explicit),
            None => Ok(cfg!(feature = "color")),
        }
    }

    /// Resolves the level and routes the [`log`] macros into a fresh sink on stderr.
    ///
    /// The environment wins over the configured default and the resulting level is both applied
    /// and returned. Calling this repeatedly replaces the sink instead of stacking handlers, so
    /// libraries and tests can install over each other safely.
    ///
    /// The level is applied even when the call later fails on color resolution, so a program
    /// catching the error still logs at the requested level through whatever sink was in place.
    pub fn install(&self) -> Result<LogLevel, AnyError> {
        let level = self.resolve_level()?;
        set_level(level);
        let colors = self.resolve_colors()?;
        let _ = log_reroute::init();
        log_reroute::reroute_boxed(sink(colors).into_log().1);
        if self.colors.is_none()
            && !cfg!(feature = "color")
            && !COLOR_HINTED.swap(true, Ordering::SeqCst)
        {
            info!("Logging colors are off; enable the color feature to get them");
        }
        Ok(level)
    }

    /// The level flag as an [`Action`], for hosts rendering help through a
    /// [`LazyHelpFormatter`][crate::help::LazyHelpFormatter].
    ///
    /// The action carries a hook applying the level as the parser consumes the value, so the
    /// flag influences even logging done later in the same parse.
    pub fn action(&self) -> Action {
        Action::option(self.flag_name.as_str())
            .alias(format!("--{}", self.flag_name))
            .of_type::<LogLevel>()
            .choices(LogLevel::NAMES.iter().copied())
            .default_value(self.resolve_level().unwrap_or(self.level).as_str())
            .help(self.flag_help.as_str())
            .on_parse(apply_level)
    }

    /// Adds the level flag to a bare `clap` application.
    ///
    /// The flag applies the level during parsing, just like [`action`][Logging::action], and
    /// defaults to the resolved level, so reading it back when absent gives the same answer
    /// [`install`][Logging::install] would. The help text (with that default baked in) is
    /// leaked, the same once-per-process deal as
    /// [`configure`][crate::help::LazyHelpFormatter::configure].
    pub fn register<'s>(&'s self, app: App<'s, 's>) -> App<'s, 's> {
        let shown = self.resolve_level().unwrap_or(self.level);
        let help: &'static str =
            Box::leak(format!("{} (default: {})", self.flag_help, shown).into_boxed_str());
        app.arg(
            Arg::with_name(self.flag_name.as_str())
                .long(self.flag_name.as_str())
                .value_name("LogLevel")
                .number_of_values(1)
                .possible_values(&LogLevel::NAMES)
                .default_value(shown.as_str())
                .help(help)
                .validator(|raw: String| match raw.parse::<LogLevel>() {
                    Ok(level) => {
                        set_level(level);
                        Ok(())
                    }
                    Err(e) => Err(e.to_string()),
                }),
        )
    }
}

fn apply_level(raw: &str) {
    if let Ok(level) = raw.parse() {
        set_level(level);
    }
}

/// A `structopt` fragment with the standard logging flag.
///
/// Flatten it into the options of a program built on `structopt` derive. The derive path has no
/// place for parse-time hooks, so the level is applied by [`apply`][LogOpts::apply] right after
/// parsing instead.
///
/// # Examples
///
/// ```rust,no_run
/// use sheen::{LogOpts, Logging};
/// use structopt::StructOpt;
///
/// #[derive(Debug, StructOpt)]
/// struct Opts {
///     #[structopt(flatten)]
///     log: LogOpts,
///
///     /// Where to write the result.
///     #[structopt(short = "o", long = "output")]
///     output: Option<String>,
/// }
///
/// # fn main() -> Result<(), sheen::AnyError> {
/// Logging::new().install()?;
/// let opts = Opts::from_args();
/// opts.log.apply();
/// log::info!("Writing to {:?}", opts.output);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, StructOpt)]
pub struct LogOpts {
    /// Minimum severity of messages to log.
    #[structopt(
        long = "log-level",
        number_of_values = 1,
        possible_values = &LogLevel::NAMES
    )]
    log_level: Option<LogLevel>,
}

impl LogOpts {
    /// The level given on the command line, if any.
    pub fn level(&self) -> Option<LogLevel> {
        self.log_level
    }

    /// Applies the level from the command line, leaving the current one alone if absent.
    pub fn apply(&self) {
        if let Some(level) = self.log_level {
            set_level(level);
        }
    }
}

fn source_file<'a>(record: &Record<'a>) -> &'a str {
    let full = record.file().unwrap_or("?");
    Path::new(full)
        .file_name()
        .and_then(OsStr::to_str)
        .unwrap_or(full)
}

fn plain_sink() -> Dispatch {
    Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}] {:<10} {}:{}: {}",
                Local::now().format("%H:%M:%S"),
                record.level(),
                source_file(record),
                record.line().unwrap_or(0),
                message,
            ))
        })
        .chain(io::stderr())
}

#[cfg(feature = "color")]
fn colored_sink() -> Dispatch {
    use fern::colors::{Color, ColoredLevelConfig};

    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);
    Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{}] {} {}",
                Local::now().format("%H:%M:%S"),
                colors.color(record.level()),
                message,
            ))
        })
        .chain(io::stderr())
}

#[cfg(feature = "color")]
fn sink(colors: bool) -> Dispatch {
    if colors {
        colored_sink()
    } else {
        plain_sink()
    }
}

#[cfg(not(feature = "color"))]
fn sink(_colors: bool) -> Dispatch {
    plain_sink()
}
