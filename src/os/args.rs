use std::borrow::Cow;
use std::ffi::{OsStr, OsString};

use thiserror::Error;

/// Marker, after which every argument is positional.
const END_OF_OPTIONS: &str = "--";

/// Snapshot of command-line arguments. The program name is kept apart from the arguments.
///
/// This is not an argument parser: it only scans for options that a caller asks about, and
/// leaves everything else alone, so it can sit next to whatever parser the application uses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    program: Option<OsString>,
    args: Vec<OsString>,
}

/// Errors encountered when scanning for an option.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgsError {
    /// Option `MissingValue.0` was given as the last argument, but it needs a value.
    #[error("option `{0}` expects a value")]
    MissingValue(String),

    /// The value of option `NonUTF8.0` is not an UTF-8 string.
    #[error("value of option `{0}` is not an UTF-8 string")]
    NonUTF8(String),
}

/// Whether an option takes a value.
#[derive(Debug, Clone, Copy)]
pub enum FlagValue {
    /// `--flag value` or `--flag=value`.
    Required,
    /// `--flag=value`, or `--flag value` if `value` is accepted by the predicate, or a bare
    /// `--flag`.
    Optional(fn(&str) -> bool),
}

/// Turn `num` into `--num` and `v` into `-v`. Anything starting with `-` is kept as is.
pub fn normalize_flag(flag: &str) -> Cow<'_, str> {
    if flag.starts_with('-') {
        Cow::Borrowed(flag)
    } else if flag.chars().count() == 1 {
        Cow::Owned(format!("-{flag}"))
    } else {
        Cow::Owned(format!("--{flag}"))
    }
}

impl Args {
    /// Create new [`Args`] from [`std::env::args_os`].
    pub fn new() -> Self {
        let mut args = std::env::args_os();
        let program = args.next();
        Self {
            program,
            ..Self::new_from(args)
        }
    }

    /// Create new [`Args`] using `args` as the argument list. The program name must not be
    /// included.
    pub fn new_from<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self {
            program: None,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Use `program` as the program name.
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = Some(program.into());
        self
    }

    /// Program name, as invoked. [`None`] for argument lists made with [`Args::new_from`].
    pub fn program(&self) -> Option<&OsStr> {
        self.program.as_deref()
    }

    /// Reload arguments from [`std::env::args_os`].
    pub fn reload(&mut self) {
        *self = Self::new();
    }

    /// Iterate over raw arguments, without the program name.
    pub fn iter(&self) -> impl Iterator<Item = &OsStr> {
        self.args.iter().map(OsString::as_os_str)
    }

    /// Collect every occurrence of any of `flags`, in command-line order.
    ///
    /// Each occurrence yields `Some(value)`, or `None` for a bare flag (only possible with
    /// [`FlagValue::Optional`]). Scanning stops at `--`.
    ///
    /// # Examples
    /// ```rust
    /// use fhs::os::args::{Args, FlagValue};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let args = Args::new_from(["--go", "a", "-g=b", "--", "--go", "c"]);
    /// let found = args.occurrences(&["--go", "-g"], FlagValue::Required)?;
    /// assert_eq!(found, [Some("a"), Some("b")]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn occurrences<S: AsRef<str>>(
        &self,
        flags: &[S],
        value: FlagValue,
    ) -> Result<Vec<Option<&str>>, ArgsError> {
        let flags: Vec<Cow<'_, str>> = flags.iter().map(|f| normalize_flag(f.as_ref())).collect();
        let mut found = Vec::new();
        let mut index = 0;
        while index < self.args.len() {
            let arg = &self.args[index];
            index += 1;
            let Some(arg) = arg.to_str() else {
                continue;
            };
            if arg == END_OF_OPTIONS {
                break;
            }
            for flag in &flags {
                let Some(rest) = arg.strip_prefix(&**flag) else {
                    continue;
                };
                if let Some(inline) = rest.strip_prefix('=') {
                    found.push(Some(inline));
                } else if rest.is_empty() {
                    let next = self.args.get(index).map(|next| {
                        next.to_str()
                            .ok_or_else(|| ArgsError::NonUTF8(flag.to_string()))
                    });
                    match (value, next) {
                        (FlagValue::Required, Some(next)) => {
                            let next = next?;
                            if next.starts_with(END_OF_OPTIONS) {
                                return Err(ArgsError::MissingValue(flag.to_string()));
                            }
                            found.push(Some(next));
                            index += 1;
                        }
                        (FlagValue::Required, None) => {
                            return Err(ArgsError::MissingValue(flag.to_string()));
                        }
                        (FlagValue::Optional(accepts), Some(Ok(next))) if accepts(next) => {
                            found.push(Some(next));
                            index += 1;
                        }
                        (FlagValue::Optional(_), _) => found.push(None),
                    }
                } else {
                    continue;
                }
                break;
            }
        }
        Ok(found)
    }

    /// Value of the last occurrence of `flag`, which must take a value.
    pub fn value_of(&self, flag: &str) -> Result<Option<&str>, ArgsError> {
        Ok(self
            .occurrences(&[flag], FlagValue::Required)?
            .into_iter()
            .last()
            .flatten())
    }

    /// Whether a bare `flag` (or `flag=...`) is present before `--`.
    pub fn is_present(&self, flag: &str) -> bool {
        self.occurrences(&[flag], FlagValue::Optional(|_| false))
            .is_ok_and(|found| !found.is_empty())
    }
}

impl<S: Into<OsString>> FromIterator<S> for Args {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new_from(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claim::{assert_err, assert_none, assert_ok};

    fn is_number(value: &str) -> bool {
        value.parse::<i64>().is_ok()
    }

    #[test]
    fn separate_and_inline_values() {
        let args = Args::new_from(["--test", "try this", "--num=28"]);
        assert_eq!(assert_ok!(args.value_of("--test")), Some("try this"));
        assert_eq!(assert_ok!(args.value_of("--num")), Some("28"));
        assert_eq!(assert_ok!(args.value_of("--missing")), None);
    }

    #[test]
    fn flag_without_dashes_is_normalized() {
        let args = Args::new_from(["--num", "28", "-v", "yes"]);
        assert_eq!(assert_ok!(args.value_of("num")), Some("28"));
        assert_eq!(assert_ok!(args.value_of("v")), Some("yes"));
    }

    #[test]
    fn last_occurrence_wins() {
        let args = Args::new_from(["--num", "1", "--num=2", "--num", "3"]);
        assert_eq!(assert_ok!(args.value_of("--num")), Some("3"));
    }

    #[test]
    fn prefix_of_another_flag_does_not_match() {
        let args = Args::new_from(["--number", "5", "--num-extra=6"]);
        assert_eq!(assert_ok!(args.value_of("--num")), None);
    }

    #[test]
    fn scanning_stops_at_end_of_options() {
        let args = Args::new_from(["file", "--", "--num", "28"]);
        assert_eq!(assert_ok!(args.value_of("--num")), None);
        assert!(!args.is_present("--num"));
    }

    #[test]
    fn missing_value_is_an_error() {
        let args = Args::new_from(["--num"]);
        assert_eq!(assert_err!(args.value_of("--num")), ArgsError::MissingValue("--num".into()));

        let args = Args::new_from(["--num", "--verbose"]);
        assert_eq!(assert_err!(args.value_of("--num")), ArgsError::MissingValue("--num".into()));
    }

    #[test]
    fn negative_number_is_a_value() {
        let args = Args::new_from(["--num", "-5"]);
        assert_eq!(assert_ok!(args.value_of("--num")), Some("-5"));
    }

    #[test]
    fn optional_value_only_consumes_accepted_arguments() {
        let args = Args::new_from(["-n", "file", "-n", "7", "-n=x"]);
        let found = assert_ok!(args.occurrences(&["-n"], FlagValue::Optional(is_number)));
        assert_eq!(found, [None, Some("7"), Some("x")]);
    }

    #[test]
    fn long_and_short_flags_keep_order() {
        let args = Args::new_from(["-v", "false", "--verbose=true", "-v"]);
        let found = assert_ok!(args.occurrences(
            &["--verbose", "-v"],
            FlagValue::Optional(|value| value == "true" || value == "false"),
        ));
        assert_eq!(found, [Some("false"), Some("true"), None]);
    }

    #[test]
    fn presence() {
        let args = Args::new_from(["--system", "--saveconfig=yes"]);
        assert!(args.is_present("--system"));
        assert!(args.is_present("--saveconfig"));
        assert!(!args.is_present("--sys"));
    }

    #[test]
    fn program_name_is_not_an_argument() {
        let args = Args::new_from(["--num", "28"]).with_program("/usr/bin/fhs-test");
        assert_eq!(args.program(), Some(OsStr::new("/usr/bin/fhs-test")));
        assert_eq!(args.iter().collect::<Vec<_>>(), ["--num", "28"]);
        assert_none!(Args::new_from(["x"]).program());
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_value() {
        use std::os::unix::ffi::OsStringExt;
        let args = Args::new_from([OsString::from("--name"), OsString::from_vec(vec![0xff])]);
        assert_eq!(assert_err!(args.value_of("--name")), ArgsError::NonUTF8("--name".into()));
    }
}
