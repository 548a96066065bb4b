//! Running whole programs.
//!
//! [`Prog`] ties the pieces together: options come from `structopt`, logging is up before the
//! arguments are parsed (so even converters can log), errors come out as [`AnyError`] and get
//! logged cause by cause. `main` shrinks to a single [`run_prog`] call.
//!
//! Subcommands need nothing special ‒ a `structopt` enum already is the dispatcher:
//!
//! ```rust
//! use sheen::{run_prog_from, AnyError, Prog};
//! use structopt::StructOpt;
//!
//! #[derive(Debug, StructOpt)]
//! enum Math {
//!     /// Add the numbers.
//!     Add { values: Vec<i64> },
//!
//!     /// Multiply the numbers.
//!     Mul { values: Vec<i64> },
//! }
//!
//! impl Prog for Math {
//!     type Output = i64;
//!
//!     fn run(self) -> Result<i64, AnyError> {
//!         Ok(match self {
//!             Math::Add { values } => values.into_iter().sum(),
//!             Math::Mul { values } => values.into_iter().product(),
//!         })
//!     }
//! }
//!
//! assert_eq!(6, run_prog_from::<Math, _>(vec!["math", "add", "1", "2", "3"]).unwrap());
//! ```
//!
//! For picking an implementation by name at runtime instead, see
//! [`Registry`][crate::Registry].

use std::ffi::OsString;

use structopt::StructOpt;

use crate::error::{self, AnyError};
use crate::logging::Logging;

/// A program with parsed options.
///
/// # Examples
///
/// ```rust
/// use sheen::{run_prog_from, AnyError, Prog};
/// use structopt::StructOpt;
///
/// #[derive(Debug, StructOpt)]
/// struct Hello {
///     /// Whom to greet.
///     #[structopt(short = "w", long = "who", default_value = "world")]
///     who: String,
/// }
///
/// impl Prog for Hello {
///     type Output = String;
///
///     fn run(self) -> Result<String, AnyError> {
///         Ok(format!("Hello, {}!", self.who))
///     }
/// }
///
/// let greeting = run_prog_from::<Hello, _>(vec!["hello", "--who", "there"]).unwrap();
/// assert_eq!("Hello, there!", greeting);
/// ```
pub trait Prog: StructOpt + Sized {
    /// What a successful run produces.
    type Output;

    /// Runs the program with the already parsed options.
    fn run(self) -> Result<Self::Output, AnyError>;
}

/// Sets up default logging, parses the process arguments and runs the program.
///
/// Any error from the run is logged cause by cause and handed back, so `main` can just forward
/// it (or map it to an exit code). Parse failures exit the process the way `structopt` always
/// does ‒ help for `-h`, a usage complaint for the rest.
///
/// Programs wanting a say in the logging setup should install their own [`Logging`] first;
/// the default install here is harmless to repeat over.
pub fn run_prog<P: Prog>() -> Result<P::Output, AnyError> {
    error::log_errors(module_path!(), || {
        Logging::new().install()?;
        P::from_args().run()
    })
}

/// Like [`run_prog`], with explicit arguments and errors instead of process exits.
///
/// Intended for tests and for programs embedding other programs, which is also why it leaves
/// logging alone. The first item is the program name.
pub fn run_prog_from<P, I>(args: I) -> Result<P::Output, AnyError>
where
    P: Prog,
    I: IntoIterator,
    I::Item: Into<OsString> + Clone,
{
    P::from_iter_safe(args)?.run()
}
