//! Settings with command-line overrides.
//!
//! A setting is looked up, in order, on the command line, in the config files of the
//! application, in the config files of its module if it has one, and finally falls back to the
//! default supplied by the caller. Values found as
//! text are coerced to the type of the setting; a value that does not fit is an error, never a
//! silent fallback.
//!
//! ```rust,no_run
//! # use fhs::basedir::{AppName, Dirs};
//! # use fhs::os::{args::Args, env::Env};
//! # use fhs::settings::Loader;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dirs = Dirs::new(Env::new(), AppName::new("myapp")?);
//! let args = Args::new();
//! let loader = Loader::new(&dirs, &args);
//!
//! // `--num 28` on the command line, `num = 5` in `config.ini`, or 0.
//! let num: i64 = loader.get_setting("num", 0, Some("--num"))?;
//! # Ok(())
//! # }
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::basedir::{AppName, Dirs, PathError, PathKind, relative_name};
use crate::os::args::{Args, ArgsError, FlagValue, normalize_flag};

pub mod file;
pub mod value;

pub use file::{CONFIG_FILE_NAME, ConfigFile, ParseError};
pub use value::{CoerceError, SettingValue, Value, ValueType};

/// Option naming another config file, instead of [`CONFIG_FILE_NAME`].
///
/// A relative name is looked up in every config directory and must stay inside it, an absolute
/// one is used as is.
pub const CONFIG_FILE_FLAG: &str = "--configfile";

/// Option making [`Loader::load`] save what it loaded.
pub const SAVE_CONFIG_FLAG: &str = "--saveconfig";

/// Errors encountered when loading a setting.
#[derive(Debug, Error)]
pub enum SettingError {
    /// The value found for setting `name` does not fit its type.
    #[error("invalid value for setting `{name}`")]
    Type {
        name: String,
        #[source]
        source: CoerceError,
    },

    /// Setting `MissingRequired.0` has no default, and was found nowhere.
    #[error("setting `{0}` is required but not defined")]
    MissingRequired(String),

    #[error("malformed config file `{}`", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("cannot access config file `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Args(#[from] ArgsError),
}

/// Description of one setting: its name, default, type and command-line flags.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingSpec {
    name: String,
    default: Option<Value>,
    value_type: ValueType,
    flags: Vec<String>,
    /// Module name and the key inside the module config file.
    module: Option<(String, String)>,
}

impl SettingSpec {
    /// Setting `name` of the type of `default`, overridable with `--name`.
    pub fn new(name: impl Into<String>, default: impl Into<Value>) -> Self {
        let name = name.into();
        let default = default.into();
        Self {
            flags: vec![format!("--{name}")],
            value_type: default.value_type(),
            default: Some(default),
            module: None,
            name,
        }
    }

    /// Setting `name` without a default: it must be given on the command line or in a config
    /// file.
    pub fn required(name: impl Into<String>, value_type: ValueType) -> Self {
        let name = name.into();
        Self {
            flags: vec![format!("--{name}")],
            value_type,
            default: None,
            module: None,
            name,
        }
    }

    /// Setting `name` of `module`, stored as `module-name` in the config file of the
    /// application and overridable with `--module-name`.
    ///
    /// It is also read as plain `name` from `<module>.ini`, next to the config directory of the
    /// application.
    pub fn module(module: &str, name: &str, default: impl Into<Value>) -> Self {
        Self {
            module: Some((module.to_owned(), name.to_owned())),
            ..Self::new(format!("{module}-{name}"), default)
        }
    }

    /// Also accept `flag`. `v` and `verbose` are read as `-v` and `--verbose`.
    pub fn with_flag(mut self, flag: &str) -> Self {
        self.flags.push(normalize_flag(flag).into_owned());
        self
    }

    /// Also accept `-short`.
    pub fn with_short(self, short: char) -> Self {
        self.with_flag(&format!("-{short}"))
    }

    /// Do not look at the command line for this setting.
    pub fn without_flags(mut self) -> Self {
        self.flags.clear();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    /// Module the setting belongs to, if any.
    pub fn module_name(&self) -> Option<&str> {
        self.module.as_ref().map(|(module, _)| module.as_str())
    }
}

/// Settings resolved by [`Loader::load`], by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    values: BTreeMap<String, Value>,
}

impl Config {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Value of `name` as `T`, [`None`] if it is missing or has another type.
    pub fn get_as<T: SettingValue>(&self, name: &str) -> Option<T> {
        self.get(name).cloned().and_then(T::from_value)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Settings of `module`, with the `module-` prefix removed from their names.
    pub fn module(&self, module: &str) -> Config {
        let prefix = format!("{module}-");
        let values = self
            .values
            .iter()
            .filter_map(|(name, value)| Some((name.strip_prefix(&prefix)?.to_owned(), value.clone())))
            .collect();
        Config { values }
    }
}

/// Parsed config files, most important first.
type Files = Vec<(PathBuf, ConfigFile)>;

/// Config files of the application and of each module that is asked about.
#[derive(Debug, Default)]
struct Sources {
    app: Files,
    modules: HashMap<String, Files>,
}

fn read_files(paths: Vec<PathBuf>) -> Result<Files, SettingError> {
    let mut files = Vec::new();
    for path in paths {
        match ConfigFile::read(&path) {
            Ok(Some(Ok(file))) => {
                tracing::debug!(path = %path.display(), entries = file.len(), "read config file");
                files.push((path, file));
            }
            Ok(Some(Err(source))) => return Err(SettingError::Malformed { path, source }),
            Ok(None) => tracing::trace!(path = %path.display(), "no config file"),
            Err(source) => return Err(SettingError::Io { path, source }),
        }
    }
    Ok(files)
}

fn dedup(paths: impl IntoIterator<Item = PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    paths.into_iter().filter(|path| seen.insert(path.clone())).collect()
}

fn is_bool_literal(raw: &str) -> bool {
    value::parse_bool(raw).is_some()
}

/// Looks settings up for the application of a [`Dirs`].
///
/// Nothing is cached: every [`Loader::resolve`] reads the command line and the config files
/// again.
#[derive(Debug, Clone, Copy)]
pub struct Loader<'a> {
    dirs: &'a Dirs,
    args: &'a Args,
}

impl<'a> Loader<'a> {
    pub fn new(dirs: &'a Dirs, args: &'a Args) -> Self {
        Self { dirs, args }
    }

    fn config_name(&self) -> Result<&'a Path, SettingError> {
        let name = Path::new(self.args.value_of(CONFIG_FILE_FLAG)?.unwrap_or(CONFIG_FILE_NAME));
        if name.is_absolute() {
            Ok(name)
        } else {
            Ok(relative_name(name)?)
        }
    }

    /// Config files that are consulted, most important first, whether they exist or not.
    ///
    /// # Errors
    ///
    /// [`PathError::InvalidFileName`] if [`CONFIG_FILE_FLAG`] names a relative path that leaves
    /// the config directories.
    pub fn config_paths(&self) -> Result<Vec<PathBuf>, SettingError> {
        let name = self.config_name()?;
        Ok(dedup(
            self.dirs
                .search_dirs(PathKind::Config)?
                .into_iter()
                .map(|dir| dir.join(name)),
        ))
    }

    /// Config files of `module`, most important first: `<module>.ini` in the parent of every
    /// config directory. Module names follow the rules of [`AppName`].
    pub fn module_config_paths(&self, module: &str) -> Result<Vec<PathBuf>, SettingError> {
        let module = AppName::new(module)?;
        let file_name = format!("{module}.ini");
        Ok(dedup(
            self.dirs
                .search_dirs(PathKind::Config)?
                .iter()
                .filter_map(|dir| dir.parent())
                .map(|base| base.join(&file_name)),
        ))
    }

    /// The config file [`Loader::save`] writes to.
    pub fn writable_config_path(&self) -> Result<PathBuf, SettingError> {
        Ok(self.dirs.dir(PathKind::Config)?.join(self.config_name()?))
    }

    fn read_sources<'s>(
        &self,
        specs: impl IntoIterator<Item = &'s SettingSpec>,
    ) -> Result<Sources, SettingError> {
        let mut sources = Sources {
            app: read_files(self.config_paths()?)?,
            modules: HashMap::new(),
        };
        for module in specs.into_iter().filter_map(SettingSpec::module_name) {
            if !sources.modules.contains_key(module) {
                let files = read_files(self.module_config_paths(module)?)?;
                sources.modules.insert(module.to_owned(), files);
            }
        }
        Ok(sources)
    }

    fn from_command_line(&self, spec: &SettingSpec) -> Result<Option<Value>, SettingError> {
        if spec.flags.is_empty() {
            return Ok(None);
        }
        let flag_value = match spec.value_type {
            ValueType::Bool => FlagValue::Optional(is_bool_literal),
            _ => FlagValue::Required,
        };
        let found = self.args.occurrences(spec.flags.as_slice(), flag_value)?;
        if found.is_empty() {
            return Ok(None);
        }
        let value = match spec.value_type {
            ValueType::List => {
                Value::List(found.into_iter().flatten().map(str::to_owned).collect())
            }
            _ => match found.into_iter().last().flatten() {
                Some(raw) => coerce(spec, raw)?,
                // Only booleans may be given as a bare flag.
                None => Value::Bool(true),
            },
        };
        Ok(Some(value))
    }

    fn resolve_with(&self, spec: &SettingSpec, sources: &Sources) -> Result<Value, SettingError> {
        if let Some(value) = self.from_command_line(spec)? {
            tracing::debug!(setting = spec.name.as_str(), %value, "from command line");
            return Ok(value);
        }
        let app_entries = sources.app.iter().map(|(path, file)| (path, file, spec.name.as_str()));
        let module_entries = spec.module.iter().flat_map(|(module, key)| {
            sources
                .modules
                .get(module)
                .into_iter()
                .flatten()
                .map(move |(path, file)| (path, file, key.as_str()))
        });
        for (path, file, key) in app_entries.chain(module_entries) {
            if let Some(raw) = file.get(key) {
                let value = coerce(spec, raw)?;
                tracing::debug!(setting = spec.name.as_str(), %value, path = %path.display(), "from config file");
                return Ok(value);
            }
        }
        match &spec.default {
            Some(value) => {
                tracing::debug!(setting = spec.name.as_str(), %value, "from default");
                Ok(value.clone())
            }
            None => Err(SettingError::MissingRequired(spec.name.clone())),
        }
    }

    /// Value of the setting described by `spec`.
    ///
    /// # Errors
    ///
    /// * [`SettingError::Type`] if the value found does not fit the type of `spec`.
    /// * [`SettingError::MissingRequired`] if `spec` has no default and the value was found
    ///   nowhere.
    /// * [`SettingError::Malformed`] or [`SettingError::Io`] if a config file exists, but
    ///   cannot be read. A missing config file is not an error.
    pub fn resolve(&self, spec: &SettingSpec) -> Result<Value, SettingError> {
        let sources = self.read_sources([spec])?;
        self.resolve_with(spec, &sources)
    }

    /// Value of setting `name`, overridable with `cli_flag`, as the type of `default`.
    pub fn get_setting<T: SettingValue>(
        &self,
        name: &str,
        default: T,
        cli_flag: Option<&str>,
    ) -> Result<T, SettingError> {
        let mut spec = SettingSpec::new(name, default).without_flags();
        if let Some(flag) = cli_flag {
            spec = spec.with_flag(flag);
        }
        let value = self.resolve(&spec)?;
        T::from_value(value.clone()).ok_or_else(|| SettingError::Type {
            name: name.to_owned(),
            source: CoerceError {
                value: value.to_raw(),
                expected: T::TYPE,
            },
        })
    }

    /// Values of all `specs`, reading every config file once.
    ///
    /// If [`SAVE_CONFIG_FLAG`] is on the command line, the result is also saved with
    /// [`Loader::save`].
    pub fn load(&self, specs: &[SettingSpec]) -> Result<Config, SettingError> {
        let sources = self.read_sources(specs)?;
        let mut config = Config::default();
        for spec in specs {
            config.insert(spec.name.clone(), self.resolve_with(spec, &sources)?);
        }
        if self.args.is_present(SAVE_CONFIG_FLAG) {
            self.save(&config)?;
        }
        Ok(config)
    }

    /// Write `config` to [`Loader::writable_config_path`], replacing the file.
    pub fn save(&self, config: &Config) -> Result<PathBuf, SettingError> {
        let path = self.writable_config_path()?;
        let mut file = ConfigFile::new();
        for (name, value) in config.iter() {
            file.insert(name, value.to_raw());
        }
        file.write(&path).map_err(|source| SettingError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), settings = file.len(), "saved config file");
        Ok(path)
    }
}

fn coerce(spec: &SettingSpec, raw: &str) -> Result<Value, SettingError> {
    spec.value_type.coerce(raw).map_err(|source| SettingError::Type {
        name: spec.name.clone(),
        source,
    })
}

/// Value of setting `name` for the application of `dirs`: from `cli_flag` in `args`, from its
/// config file, or `default`.
pub fn get_setting<T: SettingValue>(
    dirs: &Dirs,
    args: &Args,
    name: &str,
    default: T,
    cli_flag: Option<&str>,
) -> Result<T, SettingError> {
    Loader::new(dirs, args).get_setting(name, default, cli_flag)
}
