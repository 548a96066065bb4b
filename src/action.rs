//! Description of command line arguments.
//!
//! An [`Action`] describes a single argument an application accepts ‒ its aliases, value
//! placeholder, default, accepted choices and a bit of behaviour. The description serves two
//! purposes at once. It can be turned into a `clap` argument by [`to_arg`][Action::to_arg], so
//! the parser accepts exactly what is described. And it can be rendered into help output by a
//! [`LazyHelpFormatter`][crate::help::LazyHelpFormatter], which needs more detail than the parser
//! exposes back.
//!
//! Usually the two are combined through
//! [`LazyHelpFormatter::configure`][crate::help::LazyHelpFormatter::configure], which feeds the
//! same slice of actions to both sides.

use std::any::type_name;

use structopt::clap::Arg;

/// How many values an [`Action`] consumes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Nargs {
    /// Exactly one value. The default.
    One,

    /// Zero or one value.
    Optional,

    /// Any number of values, including none.
    Any,

    /// At least one value.
    AtLeastOne,

    /// Exactly the given number of values.
    Exactly(usize),
}

impl Default for Nargs {
    fn default() -> Self {
        Nargs::One
    }
}

/// A description of one command line argument.
///
/// Build one with [`option`][Action::option], [`positional`][Action::positional] or
/// [`flag`][Action::flag] and refine it with the chained setters.
///
/// # Examples
///
/// ```rust
/// use sheen::{Action, Nargs};
///
/// let color = Action::option("color")
///     .alias("-c")
///     .alias("--color")
///     .choices(vec!["always", "auto", "never"])
///     .default_value("auto")
///     .help("When to use colors in the output.");
///
/// let inputs = Action::positional("input")
///     .of_type::<std::path::PathBuf>()
///     .nargs(Nargs::AtLeastOne)
///     .help("Files to process.");
/// # let _ = (color, inputs);
/// ```
#[derive(Clone, Debug)]
pub struct Action {
    pub(crate) dest: String,
    pub(crate) aliases: Vec<String>,
    pub(crate) help: Option<String>,
    pub(crate) takes_value: bool,
    pub(crate) type_name: Option<String>,
    pub(crate) metavar: Option<String>,
    pub(crate) choices: Vec<String>,
    pub(crate) default: Option<String>,
    pub(crate) nargs: Nargs,
    pub(crate) required: bool,
    pub(crate) on_parse: Option<fn(&str)>,
}

impl Action {
    fn new(dest: String, takes_value: bool, required: bool) -> Self {
        Action {
            dest,
            aliases: Vec::new(),
            help: None,
            takes_value,
            type_name: None,
            metavar: None,
            choices: Vec::new(),
            default: None,
            nargs: Nargs::One,
            required,
            on_parse: None,
        }
    }

    /// An optional argument taking a value, like `--output FILE`.
    ///
    /// Add the actual `-o`/`--output` spellings with [`alias`][Action::alias].
    pub fn option(dest: impl Into<String>) -> Self {
        Action::new(dest.into(), true, false)
    }

    /// A positional argument. Required by default.
    pub fn positional(dest: impl Into<String>) -> Self {
        Action::new(dest.into(), true, true)
    }

    /// A flag taking no value, like `--verbose`.
    pub fn flag(dest: impl Into<String>) -> Self {
        Action::new(dest.into(), false, false)
    }

    /// Adds one spelling of the argument, with its leading dashes (`"-o"`, `"--output"`).
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Adds several spellings at once.
    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Sets the help line shown next to the argument.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Records the type the value is converted into.
    ///
    /// The type's name, stripped of module paths, becomes the value placeholder in help output,
    /// unless overridden by [`metavar`][Action::metavar].
    pub fn of_type<T: ?Sized>(mut self) -> Self {
        self.type_name = Some(short_type_name(type_name::<T>()));
        self
    }

    /// Overrides the value placeholder in help output.
    pub fn metavar(mut self, metavar: impl Into<String>) -> Self {
        self.metavar = Some(metavar.into());
        self
    }

    /// Restricts the value to the given choices.
    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices.extend(choices.into_iter().map(Into::into));
        self
    }

    /// Sets the default value, used when the argument is absent and shown in help output.
    pub fn default_value(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Sets how many values the argument consumes.
    pub fn nargs(mut self, nargs: Nargs) -> Self {
        self.nargs = nargs;
        self
    }

    /// Marks the argument as required or not.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Installs a hook called with each raw value as the parser consumes it.
    ///
    /// The hook runs during parsing, before the application gets to look at the results. This is
    /// how `--log-level` takes effect early enough to influence logging done by other argument
    /// converters (see [`Logging::action`][crate::logging::Logging::action]).
    pub fn on_parse(mut self, hook: fn(&str)) -> Self {
        self.on_parse = Some(hook);
        self
    }

    /// The name the parsed value is stored under.
    pub fn dest(&self) -> &str {
        &self.dest
    }

    /// The spellings of the argument, in the order added.
    pub fn aliases_ref(&self) -> &[String] {
        &self.aliases
    }

    /// Whether the argument takes no value.
    pub fn is_flag(&self) -> bool {
        !self.takes_value
    }

    /// The placeholder standing for the value in help output.
    ///
    /// An explicit [`metavar`][Action::metavar] wins, then the recorded type name, then the
    /// destination (upper-cased for options, as-is for positionals).
    pub fn placeholder(&self) -> String {
        if let Some(metavar) = &self.metavar {
            return metavar.clone();
        }
        if let Some(type_name) = &self.type_name {
            return type_name.clone();
        }
        if self.aliases.is_empty() {
            self.dest.clone()
        } else {
            self.dest.to_uppercase()
        }
    }

    /// Turns the description into a `clap` argument.
    ///
    /// The first `-x` alias becomes the short name and the first `--xyz` alias the long name.
    /// Further long aliases are registered as hidden aliases; `clap` has no place for extra short
    /// ones, so those only show up in help output.
    pub fn to_arg(&self) -> Arg<'_, '_> {
        let mut arg = Arg::with_name(self.dest.as_str()).takes_value(self.takes_value);

        let mut have_short = false;
        let mut have_long = false;
        for alias in &self.aliases {
            if let Some(long) = alias.strip_prefix("--") {
                if have_long {
                    arg = arg.alias(long);
                } else {
                    arg = arg.long(long);
                    have_long = true;
                }
            } else if let Some(short) = alias.strip_prefix('-') {
                if !have_short {
                    arg = arg.short(short);
                    have_short = true;
                }
            }
        }

        if self.takes_value {
            match self.nargs {
                Nargs::One => (),
                Nargs::Optional => arg = arg.min_values(0).max_values(1),
                Nargs::Any => arg = arg.multiple(true).min_values(0),
                Nargs::AtLeastOne => arg = arg.multiple(true).min_values(1),
                Nargs::Exactly(count) => arg = arg.number_of_values(count as u64),
            }
            if let Some(name) = self.metavar.as_ref().or_else(|| self.type_name.as_ref()) {
                arg = arg.value_name(name.as_str());
            }
            if let Some(default) = &self.default {
                arg = arg.default_value(default.as_str());
            }
        }

        let choices: Vec<&str> = self.choices.iter().map(String::as_str).collect();
        if !choices.is_empty() {
            arg = arg.possible_values(&choices);
        }

        if let Some(help) = &self.help {
            arg = arg.help(help.as_str());
        }

        if let Some(hook) = self.on_parse {
            arg = arg.validator(move |raw: String| {
                hook(&raw);
                Ok(())
            });
        }

        // A default value satisfies clap's required check before the user types anything, so
        // required makes sense only without one.
        let required =
            self.required && self.default.is_none() && !matches!(self.nargs, Nargs::Optional | Nargs::Any);
        arg.required(required)
    }
}

/// Strips module paths off a type name, inside any generic parameters too.
fn short_type_name(full: &str) -> String {
    fn last_segment(path: &str) -> &str {
        path.rsplit("::").next().unwrap_or(path)
    }

    let mut short = String::with_capacity(full.len());
    let mut start = 0;
    for (pos, ch) in full.char_indices() {
        if !ch.is_alphanumeric() && ch != '_' && ch != ':' {
            short.push_str(last_segment(&full[start..pos]));
            short.push(ch);
            start = pos + ch.len_utf8();
        }
    }
    short.push_str(last_segment(&full[start..]));
    short
}
