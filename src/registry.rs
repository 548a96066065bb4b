//! An explicit registry of named implementations.
//!
//! Applications that dispatch on a name ‒ subcommands, storage backends, output formats ‒ need
//! some table of what is available. A [`Registry`] is that table, spelled out in one place
//! instead of scraped together by some clever discovery scheme. Being explicit buys two things:
//! the set of names is stable and reviewable, and a failed lookup can tell the user what would
//! have worked.
//!
//! The registry plays well with the other pieces here. Its [`names`][Registry::names] can feed
//! [`Action::choices`][crate::Action::choices], so the help output and the accepted values never
//! drift apart.
//!
//! # Examples
//!
//! A registry typically lives in a static, filled once, and a converter picks from it:
//!
//! ```rust
//! use once_cell::sync::Lazy;
//! use sheen::{AnyError, Registry};
//!
//! #[derive(Copy, Clone, Debug, PartialEq)]
//! enum Backend {
//!     Memory,
//!     Disk,
//! }
//!
//! static BACKENDS: Lazy<Registry<Backend>> = Lazy::new(|| {
//!     Registry::new("backend")
//!         .with("memory", Backend::Memory)
//!         .with("disk", Backend::Disk)
//! });
//!
//! // The shape `structopt`'s `parse(try_from_str = ...)` expects.
//! fn backend(raw: &str) -> Result<Backend, AnyError> {
//!     Ok(*BACKENDS.get(raw)?)
//! }
//!
//! assert_eq!(Backend::Disk, backend("disk").unwrap());
//! assert!(backend("tape").is_err());
//! ```

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

use itertools::Itertools;

/// A lookup failure, listing what would have succeeded.
#[derive(Clone, Debug)]
pub struct UnknownEntry {
    kind: &'static str,
    given: String,
    known: Vec<&'static str>,
}

impl Display for UnknownEntry {
    fn fmt(&self, fmt: &mut Formatter) -> FmtResult {
        write!(
            fmt,
            "Invalid {} '{}' (choose from {})",
            self.kind,
            self.given,
            self.known.iter().map(|name| format!("'{}'", name)).join(", "),
        )
    }
}

impl Error for UnknownEntry {}

/// A set of named values of one kind.
///
/// The kind is a human word used in error messages (`"command"`, `"backend"`, ...). Entries are
/// kept sorted by name, so help listings come out in a stable order.
///
/// # Examples
///
/// ```rust
/// use sheen::Registry;
///
/// fn zero() -> i32 { 0 }
/// fn one() -> i32 { 1 }
///
/// let commands = Registry::<fn() -> i32>::new("command")
///     .with("zero", zero)
///     .with("one", one);
///
/// let run = commands.get("one").unwrap();
/// assert_eq!(1, run());
///
/// let err = commands.get("two").unwrap_err();
/// assert!(err.to_string().contains("'zero'"));
/// ```
#[derive(Clone, Debug)]
pub struct Registry<T> {
    kind: &'static str,
    entries: BTreeMap<&'static str, T>,
}

impl<T> Registry<T> {
    /// An empty registry for the given kind of values.
    pub fn new(kind: &'static str) -> Self {
        Registry {
            kind,
            entries: BTreeMap::new(),
        }
    }

    /// Adds an entry, builder style.
    pub fn with(mut self, name: &'static str, value: T) -> Self {
        self.entries.insert(name, value);
        self
    }

    /// Adds a named entry, returning the previous one of the same name if any.
    pub fn insert(&mut self, name: &'static str, value: T) -> Option<T> {
        self.entries.insert(name, value)
    }

    /// Checks if the name is registered, without the error ceremony of [`get`][Registry::get].
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Looks a name up. The error lists the alternatives, ready to be shown to the user.
    pub fn get(&self, name: &str) -> Result<&T, UnknownEntry> {
        self.entries.get(name).ok_or_else(|| UnknownEntry {
            kind: self.kind,
            given: name.to_owned(),
            known: self.names().collect(),
        })
    }

    /// The registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    /// The entries, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &T)> + '_ {
        self.entries.iter().map(|(name, value)| (*name, value))
    }

    /// How many entries are registered.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
