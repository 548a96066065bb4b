//! Relaxed, colorful help output.
//!
//! The stock help of argument parsers tends to be dense ‒ aliases listed with their value names
//! repeated, defaults buried in prose, choices squeezed into `{a,b,c}` sets. The
//! [`LazyHelpFormatter`] renders one block per [`Action`] the way a relaxed human would write it:
//!
//! * All spellings of an argument are joined into one invocation (`-o/--output`).
//! * The value placeholder is written once, derived from the converted-to type when no explicit
//!   one is given.
//! * A `(default: value)` note is emphasized with colors instead of hiding in the text.
//! * Choices get their own line, joined by ` / `.
//!
//! Colors are produced through [`console`] styles and respect its terminal detection. They can be
//! forced on or off with [`styled`][LazyHelpFormatter::styled], which tests and pagers are
//! grateful for.

use std::iter;
use std::mem;

use console::{measure_text_width, Style};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use structopt::clap::App;

use crate::action::{Action, Nargs};

/// A `(default: value)` note inside an already rendered line.
static DEFAULT_NOTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(default: (.*?)\)").expect("Invalid default-note pattern"));

/// A help formatter building the whole help text from [`Action`] descriptions.
///
/// The formatter itself is lazy about layout ‒ by default the help line simply follows the
/// invocation after a tab, letting the terminal pick the column. Set
/// [`max_help_position`][LazyHelpFormatter::max_help_position] and
/// [`width`][LazyHelpFormatter::width] to get classic aligned columns instead.
///
/// # Examples
///
/// ```rust
/// use sheen::{Action, LazyHelpFormatter};
///
/// let actions = vec![
///     Action::flag("verbose").alias("-v").alias("--verbose").help("Print more."),
///     Action::option("color")
///         .alias("--color")
///         .choices(vec!["always", "auto", "never"])
///         .default_value("auto")
///         .help("When to use colors."),
/// ];
///
/// let formatter = LazyHelpFormatter::new().styled(false);
/// let help = formatter.render("demo", &actions);
/// assert!(help.contains("-v/--verbose"));
/// assert!(help.contains("always / auto / never"));
/// ```
#[derive(Clone, Debug)]
pub struct LazyHelpFormatter {
    disable_help_usage: bool,
    max_help_position: Option<usize>,
    width: Option<usize>,
    styled: Option<bool>,
}

impl Default for LazyHelpFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl LazyHelpFormatter {
    /// A formatter with the usage line suppressed and automatic color detection.
    pub fn new() -> Self {
        LazyHelpFormatter {
            disable_help_usage: true,
            max_help_position: None,
            width: None,
            styled: None,
        }
    }

    /// Suppresses (or re-enables) the `usage:` line and the entry for the `help` action.
    ///
    /// Suppression is the default. The two go together ‒ a help text without a usage line
    /// has no place advertising `-h` either.
    pub fn disable_help_usage(mut self, disable: bool) -> Self {
        self.disable_help_usage = disable;
        self
    }

    /// Aligns help lines at the given column instead of a tab stop.
    ///
    /// Invocations wider than the column keep a two space gap.
    pub fn max_help_position(mut self, column: usize) -> Self {
        self.max_help_position = Some(column);
        self
    }

    /// Wraps help lines at the given width.
    pub fn width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    /// Forces styling on or off, overriding terminal detection.
    pub fn styled(mut self, styled: bool) -> Self {
        self.styled = Some(styled);
        self
    }

    fn paint(&self, style: Style, text: &str) -> String {
        let style = match self.styled {
            Some(force) => style.force_styling(force),
            None => style,
        };
        style.apply_to(text).to_string()
    }

    fn default_word_style() -> Style {
        Style::new().magenta()
    }

    fn default_value_style() -> Style {
        Style::new().magenta().bold()
    }

    fn choice_style() -> Style {
        Style::new().green().bold()
    }

    fn placeholder_style() -> Style {
        Style::new().red().bold()
    }

    fn flag_style() -> Style {
        Style::new().bold()
    }

    /// Renders the full help text for the given actions, in their order.
    pub fn render(&self, prog: &str, actions: &[Action]) -> String {
        let mut out = String::new();
        if !self.disable_help_usage {
            out.push_str(&self.format_usage(prog, actions));
            out.push('\n');
        }
        for action in actions {
            out.push_str(&self.format_action(action));
        }
        out
    }

    /// Renders the `usage:` line, always unstyled.
    pub fn format_usage(&self, prog: &str, actions: &[Action]) -> String {
        let mut usage = format!("usage: {}", prog);
        for action in actions {
            usage.push(' ');
            usage.push_str(&usage_token(action));
        }
        usage.push('\n');
        usage
    }

    /// Renders the block for one action.
    ///
    /// The block is the invocation with its default note, the help text on the same line,
    /// choices on a line of their own and exactly one trailing newline. The generated
    /// `(default: value)` note gets the emphasis treatment before the help text is added, so
    /// prose mentioning a default stays untouched. The `help` action renders to nothing while
    /// the usage line is suppressed.
    pub fn format_action(&self, action: &Action) -> String {
        if self.disable_help_usage && action.dest == "help" {
            return String::new();
        }

        let mut block = format!("  {}", self.format_invocation(action));
        if let Some(default) = &action.default {
            // Written plain first so the rewrite below has something to find.
            block.push_str(&format!(" (default: {})", default));
        }
        let mut block = self.emphasize_default(block);

        if let Some(help) = action.help.as_deref().filter(|help| !help.is_empty()) {
            self.append_help(&mut block, help);
        }

        if !action.choices.is_empty() {
            let choices = action
                .choices
                .iter()
                .map(|choice| self.paint(Self::choice_style(), choice))
                .join(" / ");
            block.push_str(&format!("\n\t{}", choices));
        }

        block.push('\n');
        block
    }

    /// Renders the invocation part of an action.
    ///
    /// All aliases are joined by `/` and the value placeholder appears once, expanded according
    /// to [`Nargs`]. Positionals take the same shape with the destination standing in for the
    /// aliases (`input i64`), collapsed to the bare destination when the placeholder would only
    /// repeat it. Flags are their emphasized aliases alone.
    pub fn format_invocation(&self, action: &Action) -> String {
        let spelled = if action.aliases.is_empty() {
            action.dest.clone()
        } else {
            action.aliases.join("/")
        };
        if action.is_flag() {
            self.paint(Self::flag_style(), &spelled)
        } else if action.aliases.is_empty()
            && action.metavar.is_none()
            && action.type_name.is_none()
        {
            // The placeholder falls back to the destination here, no point spelling it twice.
            self.expanded_placeholder(action)
        } else {
            format!("{} {}", spelled, self.expanded_placeholder(action))
        }
    }

    // The whole expansion gets painted in one go, so multi-value placeholders don't repeat
    // the markup for every copy.
    fn expanded_placeholder(&self, action: &Action) -> String {
        let expanded = expand_nargs(&action.placeholder(), action.nargs);
        self.paint(Self::placeholder_style(), &expanded)
    }

    /// Rewrites the first `(default: value)` into its emphasized form.
    fn emphasize_default(&self, line: String) -> String {
        let rewritten = DEFAULT_NOTE.captures(&line).map(|caps| {
            let emphasized = format!(
                "({}: {})",
                self.paint(Self::default_word_style(), "default"),
                self.paint(Self::default_value_style(), &caps[1]),
            );
            line.replacen(&caps[0], &emphasized, 1)
        });
        rewritten.unwrap_or(line)
    }

    fn append_help(&self, block: &mut String, help: &str) {
        let (first, continuation) = match self.max_help_position {
            Some(column) => {
                let used = measure_text_width(block);
                let pad = column.saturating_sub(used).max(2);
                (" ".repeat(pad), " ".repeat(column))
            }
            None => ("\t".to_owned(), "\t".to_owned()),
        };
        match self.width {
            Some(width) => {
                for (position, piece) in wrap(help, width).iter().enumerate() {
                    if position == 0 {
                        block.push_str(&first);
                    } else {
                        block.push('\n');
                        block.push_str(&continuation);
                    }
                    block.push_str(piece);
                }
            }
            None => {
                block.push_str(&first);
                block.push_str(help);
            }
        }
    }

    /// Registers the actions on a `clap` application and replaces its help text.
    ///
    /// The `help` action is left for `clap` itself (it already owns `-h`/`--help`), but still
    /// shows up in the rendered text when the usage line is enabled. The rendered text is leaked
    /// to satisfy the `'static` lifetime `clap` wants for it; building an application is a
    /// once-per-process affair.
    pub fn configure<'s>(&self, prog: &str, app: App<'s, 's>, actions: &'s [Action]) -> App<'s, 's> {
        let mut app = app;
        for action in actions {
            if action.dest == "help" {
                continue;
            }
            app = app.arg(action.to_arg());
        }
        let text: &'static str = Box::leak(self.render(prog, actions).into_boxed_str());
        app.help(text)
    }
}

fn expand_nargs(single: &str, nargs: Nargs) -> String {
    match nargs {
        Nargs::One => single.to_owned(),
        Nargs::Optional => format!("[{}]", single),
        Nargs::Any => format!("[{} ...]", single),
        Nargs::AtLeastOne => format!("{} [{} ...]", single, single),
        Nargs::Exactly(count) => iter::repeat(single).take(count).join(" "),
    }
}

/// The unstyled token an action contributes to the usage line.
fn usage_token(action: &Action) -> String {
    if action.is_flag() {
        return format!("[{}]", action.aliases.join("/"));
    }
    let expanded = expand_nargs(&action.placeholder(), action.nargs);
    if action.aliases.is_empty() {
        return expanded;
    }
    let spelled = format!("{} {}", action.aliases.join("/"), expanded);
    if action.required && action.default.is_none() {
        spelled
    } else {
        format!("[{}]", spelled)
    }
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.len() + 1 + word.len() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use structopt::clap::App;

    use super::*;

    fn plain() -> LazyHelpFormatter {
        LazyHelpFormatter::new().styled(false)
    }

    #[test]
    fn flag_invocation_joins_aliases() {
        let action = Action::flag("verbose").alias("-v").alias("--verbose");
        assert_eq!("-v/--verbose", plain().format_invocation(&action));
    }

    #[test]
    fn option_invocation_spells_placeholder_once() {
        let action = Action::option("output").alias("-o").alias("--output");
        assert_eq!("-o/--output OUTPUT", plain().format_invocation(&action));
    }

    #[test]
    fn bare_positional_shows_destination_once() {
        let action = Action::positional("input");
        assert_eq!("input", plain().format_invocation(&action));
    }

    /// A typed positional keeps its destination next to the derived placeholder.
    #[test]
    fn typed_positional_keeps_destination() {
        let typed = Action::positional("input").of_type::<i64>();
        assert_eq!("input i64", plain().format_invocation(&typed));
        assert!(plain().format_action(&typed).contains("input i64"));

        let named = Action::positional("input").metavar("FILE");
        assert_eq!("input FILE", plain().format_invocation(&named));
    }

    #[test]
    fn placeholders_expand_by_nargs() {
        let base = Action::positional("input");
        let fmt = plain();
        assert_eq!("input", fmt.format_invocation(&base.clone()));
        assert_eq!(
            "[input]",
            fmt.format_invocation(&base.clone().nargs(Nargs::Optional))
        );
        assert_eq!(
            "[input ...]",
            fmt.format_invocation(&base.clone().nargs(Nargs::Any))
        );
        assert_eq!(
            "input [input ...]",
            fmt.format_invocation(&base.clone().nargs(Nargs::AtLeastOne))
        );
        assert_eq!(
            "input input",
            fmt.format_invocation(&base.clone().nargs(Nargs::Exactly(2)))
        );
        // With a type in play the destination stays and only the placeholder expands.
        assert_eq!(
            "input i64 [i64 ...]",
            fmt.format_invocation(&base.of_type::<i64>().nargs(Nargs::AtLeastOne))
        );
    }

    /// Emphasis wraps the whole expanded placeholder, so the text inside stays contiguous.
    #[test]
    fn multi_value_placeholder_wrapped_once() {
        let action = Action::positional("input").nargs(Nargs::AtLeastOne);
        let styled = LazyHelpFormatter::new()
            .styled(true)
            .format_invocation(&action);
        assert!(styled.contains("input [input ...]"), "{:?}", styled);
        assert!(styled.contains('\u{1b}'), "{:?}", styled);
    }

    #[test]
    fn default_note_is_rendered() {
        let action = Action::option("color").alias("--color").default_value("auto");
        let block = plain().format_action(&action);
        assert!(block.contains("(default: auto)"), "{:?}", block);
    }

    /// Only the generated default note gets the emphasis treatment.
    #[test]
    fn default_note_emphasized_once() {
        let action = Action::option("color")
            .alias("--color")
            .default_value("auto")
            .help("see also (default: auto) above");
        let styled = LazyHelpFormatter::new().styled(true).format_action(&action);
        // The generated note is broken up by escape codes, the one in the help survives verbatim.
        assert_eq!(1, styled.matches("(default: auto)").count(), "{:?}", styled);
        assert!(styled.contains('\u{1b}'), "{:?}", styled);
    }

    /// The value inside the note survives the rewrite, once, with the plain spelling gone.
    #[test]
    fn default_value_survives_emphasis() {
        let action = Action::option("jobs").alias("--jobs").default_value("7");
        let styled = LazyHelpFormatter::new().styled(true).format_action(&action);
        assert_eq!(1, styled.matches('7').count(), "{:?}", styled);
        assert!(!styled.contains("(default: 7)"), "{:?}", styled);
    }

    /// A note written into the help text is prose, not the annotation; it stays verbatim.
    #[test]
    fn help_text_default_note_left_alone() {
        let action = Action::flag("keep")
            .alias("--keep")
            .help("Keep temporary files (default: delete them)");
        let styled = LazyHelpFormatter::new().styled(true).format_action(&action);
        assert_eq!(
            1,
            styled.matches("(default: delete them)").count(),
            "{:?}",
            styled
        );
    }

    #[test]
    fn help_follows_on_the_same_line() {
        let action = Action::option("output")
            .alias("-o")
            .alias("--output")
            .help("Write output here.");
        let block = plain().format_action(&action);
        assert_eq!("  -o/--output OUTPUT\tWrite output here.\n", block);
    }

    #[test]
    fn choices_get_their_own_line() {
        let action = Action::option("color")
            .alias("--color")
            .choices(vec!["always", "auto", "never"])
            .help("When to use colors.");
        let block = plain().format_action(&action);
        assert!(block.contains("\n\talways / auto / never\n"), "{:?}", block);
        assert!(block.ends_with('\n'));
        assert!(!block.ends_with("\n\n"));
    }

    #[test]
    fn empty_help_adds_nothing() {
        let action = Action::option("output").alias("--output").help("");
        let block = plain().format_action(&action);
        assert_eq!("  --output OUTPUT\n", block);
    }

    #[test]
    fn help_action_suppressed_by_default() {
        let action = Action::flag("help").alias("-h").alias("--help");
        assert_eq!("", plain().format_action(&action));
    }

    #[test]
    fn usage_line_when_enabled() {
        let actions = vec![
            Action::flag("help").alias("-h").alias("--help").help("Show this help."),
            Action::option("output").alias("-o").alias("--output"),
            Action::positional("input"),
        ];
        let help = plain().disable_help_usage(false).render("demo", &actions);
        assert!(
            help.starts_with("usage: demo [-h/--help] [-o/--output OUTPUT] input\n\n"),
            "{:?}",
            help
        );
        // The help action renders too once usage is back.
        assert!(help.contains("-h/--help"), "{:?}", help);
    }

    #[test]
    fn no_usage_line_by_default() {
        let actions = vec![Action::positional("input")];
        let help = plain().render("demo", &actions);
        assert!(!help.contains("usage:"), "{:?}", help);
    }

    #[test]
    fn long_help_wraps() {
        let action = Action::option("output").alias("--output").help(
            "A rather long explanation that certainly will not fit on one single narrow line",
        );
        let block = plain().width(30).format_action(&action);
        let continuations = block.matches("\n\t").count();
        assert!(continuations >= 2, "{:?}", block);
    }

    #[test]
    fn help_aligns_at_requested_column() {
        let action = Action::option("output")
            .alias("-o")
            .alias("--output")
            .help("Write output here.");
        let block = plain().max_help_position(30).format_action(&action);
        assert_eq!(Some(30), block.find("Write"), "{:?}", block);
    }

    #[test]
    fn narrow_columns_keep_a_gap() {
        let action = Action::option("output")
            .alias("-o")
            .alias("--output")
            .help("Write output here.");
        let block = plain().max_help_position(4).format_action(&action);
        assert!(block.contains("OUTPUT  Write"), "{:?}", block);
    }

    #[test]
    fn configure_parses_and_prints() {
        let actions = vec![
            Action::flag("help").alias("-h").alias("--help"),
            Action::option("color")
                .alias("--color")
                .choices(vec!["always", "auto", "never"])
                .default_value("auto"),
        ];
        let fmt = plain();

        let app = fmt.configure("demo", App::new("demo"), &actions);
        let matches = app
            .clone()
            .get_matches_from_safe(vec!["demo", "--color", "never"])
            .unwrap();
        assert_eq!(Some("never"), matches.value_of("color"));

        let mut buf = Vec::new();
        let mut app = app;
        app.write_help(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("--color"), "{:?}", text);
        assert!(text.contains("always / auto / never"), "{:?}", text);
    }
}
