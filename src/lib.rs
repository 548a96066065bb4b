#![doc(
    html_root_url = "https://docs.rs/sheen/0.2.0/sheen/",
    test(attr(deny(warnings)))
)]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Helpers for polished command line programs.
//!
//! Most command line programs share a layer that has nothing to do with what the program is
//! about: parse the arguments, print help that doesn't hurt to read, get logging going early
//! enough, turn argument strings into files and lists and maps. This crate is that layer, with a
//! few opinions about how it should behave:
//!
//! * Help output is for humans. All spellings of an argument on one line, the default
//!   emphasized in color, choices listed as words instead of a `{set,of,braces}`. The
//!   [`LazyHelpFormatter`] renders that, from plain [`Action`] descriptions that double as the
//!   parser configuration.
//! * Logging is one call and safe to repeat. [`Logging::install`] wires the [`log`] macros into
//!   a [`fern`] sink through [`log_reroute`], resolving the starting level from the command line
//!   flag, the `LOG_LEVEL` environment variable and the configured default, in that order of
//!   priority. Installing again replaces the sink instead of stacking another one.
//! * The level is live. The `--log-level` flag applies while the parser still runs and
//!   [`set_level`] works any time after, so `--log-level DEBUG` catches even the chatter of the
//!   argument converters themselves.
//! * Errors are boxed and chained. Everything fallible returns [`AnyError`] and
//!   [`log_error`][error::log_error] prints the whole cause chain, one message per cause.
//!
//! # Examples
//!
//! ```rust
//! use sheen::{run_prog_from, AnyError, LogOpts, Prog};
//! use structopt::StructOpt;
//!
//! /// Adds up numbers, with logging along the way.
//! #[derive(Debug, StructOpt)]
//! struct Sum {
//!     #[structopt(flatten)]
//!     log: LogOpts,
//!
//!     /// The numbers to add.
//!     values: Vec<i64>,
//! }
//!
//! impl Prog for Sum {
//!     type Output = i64;
//!
//!     fn run(self) -> Result<i64, AnyError> {
//!         self.log.apply();
//!         log::debug!("Adding {} numbers", self.values.len());
//!         Ok(self.values.into_iter().sum())
//!     }
//! }
//!
//! let sum = run_prog_from::<Sum, _>(vec!["sum", "1", "2", "3"]).unwrap();
//! assert_eq!(6, sum);
//! ```
//!
//! # Features
//!
//! * `color`: colored log output, through `fern`'s color support. On by default. Without it,
//!   explicitly asking for colors is a hard error and a one-time hint is logged the first time
//!   colors would have been picked automatically.

pub mod action;
pub mod error;
pub mod help;
pub mod logging;
pub mod prog;
pub mod registry;
pub mod utils;

pub use crate::action::{Action, Nargs};
pub use crate::error::AnyError;
pub use crate::help::LazyHelpFormatter;
pub use crate::logging::{current_level, is_debug, set_level, LogLevel, LogOpts, Logging};
pub use crate::prog::{run_prog, run_prog_from, Prog};
pub use crate::registry::Registry;
