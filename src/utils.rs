//! Argument value converters.
//!
//! Converters take the raw string of a command line argument and turn it into something typed,
//! with errors fit for showing to the user. They all have the shape
//! `fn(&str) -> Result<T, AnyError>`, which is exactly what `structopt`'s
//! `parse(try_from_str = ...)` wants, and they work just as well called by hand on values picked
//! out of a `clap` match.
//!
//! The filesystem converters do a bit more than validate ‒ the output ones create missing
//! directories on the way, logging what they had to do.

use std::collections::HashMap;
use std::convert::Infallible;
use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use err_context::prelude::*;
use log::{info, warn};

use crate::AnyError;

/// An error returned when a comma separated list of integers doesn't parse.
#[derive(Clone, Debug)]
pub struct NotIntList(String);

impl Display for NotIntList {
    fn fmt(&self, fmt: &mut Formatter) -> FmtResult {
        write!(fmt, "'{}' is not a comma separated list of integers", self.0)
    }
}

impl Error for NotIntList {}

/// Parses a comma separated list of integers, like `1,2,-3`.
///
/// Whitespace around the numbers is tolerated. Note that `structopt` gives `Vec` fields its own
/// per-occurrence meaning, so when deriving, put the result into a newtype or call this from the
/// program instead.
///
/// # Examples
///
/// ```rust
/// use sheen::utils::comma_separated_ints;
///
/// assert_eq!(vec![1, 2, -3], comma_separated_ints("1,2,-3").unwrap());
/// assert!(comma_separated_ints("1,two").is_err());
/// ```
pub fn comma_separated_ints(raw: &str) -> Result<Vec<i64>, AnyError> {
    raw.split(',')
        .map(|part| part.trim().parse::<i64>())
        .collect::<Result<_, _>>()
        .map_err(|_| NotIntList(raw.to_owned()).into())
}

/// An error returned when the user passes a key-value option without the equal sign.
#[derive(Clone, Debug)]
pub struct MissingEquals(String);

impl Display for MissingEquals {
    fn fmt(&self, fmt: &mut Formatter) -> FmtResult {
        write!(fmt, "Missing = in '{}'", self.0)
    }
}

impl Error for MissingEquals {}

/// A helper for parsing key-value command line arguments.
///
/// The split happens at the first equal sign; further ones belong to the value.
///
/// # Examples
///
/// ```rust
/// # use structopt::StructOpt;
/// # #[allow(dead_code)] // Allow not using this structure.
/// #[derive(Debug, StructOpt)]
/// struct MyOpts {
///     #[structopt(
///         short = "D",
///         long = "define",
///         parse(try_from_str = sheen::utils::key_val),
///         number_of_values(1),
///     )]
///     defines: Vec<(String, String)>,
/// }
///
/// # fn main() {}
/// ```
pub fn key_val<K, V>(opt: &str) -> Result<(K, V), AnyError>
where
    K: FromStr,
    K::Err: Error + Send + Sync + 'static,
    V: FromStr,
    V::Err: Error + Send + Sync + 'static,
{
    let pos = opt.find('=').ok_or_else(|| MissingEquals(opt.to_owned()))?;
    Ok((opt[..pos].parse()?, opt[pos + 1..].parse()?))
}

/// A map value with its type guessed from the spelling.
///
/// Used by [`key_value_pairs`]: whatever parses as an integer is an integer, then a float gets a
/// try, anything else stays a string.
#[derive(Clone, Debug, PartialEq)]
pub enum MapValue {
    /// The value parsed as an integer.
    Int(i64),

    /// The value parsed as a float (but not as an integer).
    Float(f64),

    /// The value kept verbatim.
    Str(String),
}

impl MapValue {
    fn coerce(raw: &str) -> Self {
        if let Ok(int) = raw.parse::<i64>() {
            return MapValue::Int(int);
        }
        if let Ok(float) = raw.parse::<f64>() {
            return MapValue::Float(float);
        }
        MapValue::Str(raw.to_owned())
    }
}

impl Display for MapValue {
    fn fmt(&self, fmt: &mut Formatter) -> FmtResult {
        match self {
            MapValue::Int(value) => write!(fmt, "{}", value),
            MapValue::Float(value) => write!(fmt, "{}", value),
            MapValue::Str(value) => write!(fmt, "{}", value),
        }
    }
}

impl FromStr for MapValue {
    type Err = Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(MapValue::coerce(raw))
    }
}

/// Parses a whole comma separated map in one argument, like `workers=4,name=x`.
///
/// Each `key=value` pair goes through [`key_val`] and the values come out as [`MapValue`], so
/// `workers=4` really is a number downstream. A key given twice keeps the later value.
///
/// # Examples
///
/// ```rust
/// use std::collections::HashMap;
///
/// use sheen::utils::MapValue;
/// use structopt::StructOpt;
///
/// # #[allow(dead_code)] // Allow not using this structure.
/// #[derive(Debug, StructOpt)]
/// struct MyOpts {
///     /// Extra settings, as key=value pairs.
///     #[structopt(long = "set", parse(try_from_str = sheen::utils::key_value_pairs))]
///     set: Option<HashMap<String, MapValue>>,
/// }
///
/// # fn main() {}
/// ```
pub fn key_value_pairs(raw: &str) -> Result<HashMap<String, MapValue>, AnyError> {
    let mut pairs = HashMap::new();
    for pair in raw.split(',') {
        let (key, value) = key_val(pair)?;
        pairs.insert(key, value);
    }
    Ok(pairs)
}

/// Opens a file for reading, with an error naming the file.
///
/// # Examples
///
/// ```rust
/// use std::fs::File;
///
/// use structopt::StructOpt;
///
/// # #[allow(dead_code)] // Allow not using this structure.
/// #[derive(Debug, StructOpt)]
/// struct MyOpts {
///     /// The data to process.
///     #[structopt(short = "i", parse(try_from_str = sheen::utils::input_file))]
///     input: File,
/// }
///
/// # fn main() {}
/// ```
pub fn input_file(raw: &str) -> Result<File, AnyError> {
    Ok(File::open(raw).context(format!("Cannot open {} for reading", raw))?)
}

/// Creates a file for writing, making any missing parent directories on the way.
///
/// The detour through the filesystem is logged ‒ a warning when the directory is found missing,
/// an info message once it exists.
pub fn output_file(raw: &str) -> Result<File, AnyError> {
    let path = Path::new(raw);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            warn!("Directory {} does not exist: trying to create", parent.display());
            fs::create_dir_all(parent)
                .context(format!("Cannot create directory {}", parent.display()))?;
            info!("Created directory {}", parent.display());
        }
    }
    Ok(File::create(raw).context(format!("Cannot open {} for writing", raw))?)
}

/// An error returned when an input directory is not present.
#[derive(Clone, Debug)]
pub struct NoSuchDirectory(String);

impl Display for NoSuchDirectory {
    fn fmt(&self, fmt: &mut Formatter) -> FmtResult {
        write!(fmt, "No such directory: {}", self.0)
    }
}

impl Error for NoSuchDirectory {}

/// Checks that the argument names an existing directory.
pub fn input_directory(raw: &str) -> Result<PathBuf, AnyError> {
    let path = Path::new(raw);
    if path.is_dir() {
        Ok(path.to_owned())
    } else {
        Err(NoSuchDirectory(raw.to_owned()).into())
    }
}

/// Accepts a directory, creating it (and its parents) if it doesn't exist yet.
///
/// Logs the same way as [`output_file`] when it has to create something.
pub fn output_directory(raw: &str) -> Result<PathBuf, AnyError> {
    let path = Path::new(raw);
    if !path.exists() {
        warn!("Directory {} does not exist: trying to create", raw);
        fs::create_dir_all(path).context(format!("Cannot create directory {}", raw))?;
        info!("Created directory {}", raw);
    }
    Ok(path.to_owned())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use maplit::hashmap;
    use tempfile::tempdir;

    use super::*;

    /// Valid inputs for the int list parser.
    #[test]
    fn int_list_success() {
        assert_eq!(vec![1, 2, 3], comma_separated_ints("1,2,3").unwrap());
        assert_eq!(vec![-4], comma_separated_ints("-4").unwrap());
        assert_eq!(vec![1, 2], comma_separated_ints("1, 2").unwrap());
    }

    #[test]
    fn int_list_fail() {
        comma_separated_ints("1,two,3")
            .unwrap_err()
            .downcast_ref::<NotIntList>()
            .expect("Different error returned");
        comma_separated_ints("")
            .unwrap_err()
            .downcast_ref::<NotIntList>()
            .expect("Different error returned");
    }

    /// Valid inputs for the key-value parser.
    #[test]
    fn key_val_success() {
        assert_eq!(
            ("hello".to_owned(), "world".to_owned()),
            key_val("hello=world").unwrap()
        );
        assert_eq!(("count".to_owned(), 4), key_val("count=4").unwrap());
    }

    /// The extra equal signs go into the value part.
    #[test]
    fn key_val_extra_equals() {
        assert_eq!(
            ("greeting".to_owned(), "hello=world".to_owned()),
            key_val("greeting=hello=world").unwrap(),
        );
    }

    #[test]
    fn key_val_missing_eq() {
        key_val::<String, String>("no equal sign")
            .unwrap_err()
            .downcast_ref::<MissingEquals>()
            .expect("Different error returned");
    }

    /// Values coerce to the first type that takes them: int, float, string.
    #[test]
    fn map_values_coerce() {
        let map = key_value_pairs("a=1,b=2.5,c=x,d=1e3").unwrap();
        let expected = hashmap! {
            "a".to_owned() => MapValue::Int(1),
            "b".to_owned() => MapValue::Float(2.5),
            "c".to_owned() => MapValue::Str("x".to_owned()),
            "d".to_owned() => MapValue::Float(1e3),
        };
        assert_eq!(expected, map);
    }

    #[test]
    fn later_pairs_win() {
        let map = key_value_pairs("a=1,a=2").unwrap();
        assert_eq!(Some(&MapValue::Int(2)), map.get("a"));
    }

    #[test]
    fn map_needs_equals() {
        key_value_pairs("a=1,b")
            .unwrap_err()
            .downcast_ref::<MissingEquals>()
            .expect("Different error returned");
    }

    #[test]
    fn input_file_must_exist() {
        let dir = tempdir().unwrap();
        let present = dir.path().join("present");
        fs::write(&present, b"content").unwrap();
        input_file(present.to_str().unwrap()).unwrap();
        input_file(dir.path().join("absent").to_str().unwrap()).unwrap_err();
    }

    /// Missing parent directories of an output file get created on the fly.
    #[test]
    fn output_file_creates_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("out.txt");
        let mut file = output_file(path.to_str().unwrap()).unwrap();
        file.write_all(b"content").unwrap();
        assert!(path.parent().unwrap().is_dir());
    }

    #[test]
    fn input_directory_checks() {
        let dir = tempdir().unwrap();
        assert_eq!(
            dir.path(),
            input_directory(dir.path().to_str().unwrap()).unwrap()
        );
        input_directory(dir.path().join("absent").to_str().unwrap())
            .unwrap_err()
            .downcast_ref::<NoSuchDirectory>()
            .expect("Different error returned");
    }

    #[test]
    fn output_directory_creates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fresh");
        assert_eq!(path, output_directory(path.to_str().unwrap()).unwrap());
        assert!(path.is_dir());
    }
}
