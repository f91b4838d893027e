//! Directory resolution for application files.
//!
//! Resolves where an application keeps its configuration, data, cache, runtime and log files,
//! following the XDG Base Directory spec for users and the FHS for system-wide installations.
//!
//! ```rust
//! # use fhs::basedir::{self, PathKind};
//! # use fhs::os::env::Env;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let env = Env::from_iter([("XDG_CONFIG_HOME", "/srv/config")]);
//!
//! let config_dir = basedir::resolve_dir(&env, PathKind::Config, "myapp")?;
//! assert_eq!(config_dir, std::path::Path::new("/srv/config/myapp"));
//! # Ok(())
//! # }
//! ```
//!
//! Resolution never touches the filesystem. Directories are only created on request, with
//! [`Dirs::ensure_dir`].

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use crate::fs::path_ext::{MkdirOptions, PathExt};
use crate::os::args::Args;
use crate::os::env::Env;

pub mod fhs;
pub mod xdg;

/// Option selecting [`Scope::System`] in [`Scope::from_args`].
pub const SYSTEM_FLAG: &str = "--system";

/// Variable naming the application, read by [`AppName::from_env`].
pub const PACKAGE_NAME_VAR: &str = "PACKAGE_NAME";

/// Category of application files. Each one has its own location rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathKind {
    /// `$XDG_CONFIG_HOME`, or `/etc`.
    Config,
    /// `$XDG_DATA_HOME`, or `/var/lib`.
    Data,
    /// `$XDG_CACHE_HOME`, or `/var/cache`.
    Cache,
    /// `$XDG_RUNTIME_DIR`, or `/run`.
    Runtime,
    /// `$XDG_STATE_HOME`, or `/var/log`.
    Log,
}

impl PathKind {
    pub const ALL: [PathKind; 5] = [
        PathKind::Config,
        PathKind::Data,
        PathKind::Cache,
        PathKind::Runtime,
        PathKind::Log,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            PathKind::Config => "config",
            PathKind::Data => "data",
            PathKind::Cache => "cache",
            PathKind::Runtime => "runtime",
            PathKind::Log => "log",
        }
    }
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PathKind {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PathKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| PathError::InvalidKind(s.to_owned()))
    }
}

/// Whose files are resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Per-user locations from the XDG Base Directory spec.
    #[default]
    User,
    /// System-wide locations from the FHS. The environment is not consulted.
    System,
}

impl Scope {
    /// [`Scope::System`] if [`SYSTEM_FLAG`] is on the command line, [`Scope::User`] otherwise.
    pub fn from_args(args: &Args) -> Self {
        if args.is_present(SYSTEM_FLAG) {
            Scope::System
        } else {
            Scope::User
        }
    }
}

/// Name of an application, used as a directory name below every base directory.
///
/// It is never empty, never `.` or `..`, and contains no path separators.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AppName(String);

impl AppName {
    pub fn new(name: impl Into<String>) -> Result<Self, PathError> {
        let name = name.into();
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(std::path::is_separator)
            && !name.contains('\0');
        if valid {
            Ok(Self(name))
        } else {
            Err(PathError::InvalidAppName(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AppName {
    /// Default name of the running application: `$PACKAGE_NAME` if set, otherwise the file name
    /// of the program in `args`.
    ///
    /// # Errors
    ///
    /// [`PathError::InvalidAppName`] if neither gives a usable name.
    pub fn from_env(env: &Env, args: &Args) -> Result<Self, PathError> {
        if let Some(name) = env.get_os(PACKAGE_NAME_VAR).filter(|name| !name.is_empty()) {
            return Self::new(name.to_string_lossy());
        }
        let program = args
            .program()
            .and_then(|program| Path::new(program).file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(program)
    }
}

impl FromStr for AppName {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for AppName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<Path> for AppName {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl fmt::Display for AppName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors encountered when resolving a directory.
#[derive(Debug, Error)]
pub enum PathError {
    /// `InvalidKind.0` does not name a [`PathKind`].
    #[error("unknown path kind `{0}`")]
    InvalidKind(String),

    /// `InvalidAppName.0` cannot be used as a directory name.
    #[error("`{0}` is not a valid application name")]
    InvalidAppName(String),

    /// `InvalidFileName.0` is empty, absolute, or climbs out of its directory.
    #[error("`{}` is not a valid relative file name", .0.display())]
    InvalidFileName(PathBuf),

    /// A default below the home directory is needed, but there is no usable home directory.
    #[error("cannot determine the home directory")]
    MissingHome,

    /// Creating a directory failed.
    #[error("cannot create directory `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Home directory from `env`: `$HOME`, or `%USERPROFILE%` on Windows.
///
/// Relative values are not a home directory.
pub fn home(env: &Env) -> Option<PathBuf> {
    let key = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    env.get_path(key).filter(|home| home.is_absolute())
}

fn user_base(env: &Env, kind: PathKind) -> Result<PathBuf, PathError> {
    match kind {
        PathKind::Config => xdg::config(env),
        PathKind::Data => xdg::data(env),
        PathKind::Cache => xdg::cache(env),
        PathKind::Runtime => xdg::runtime(env),
        PathKind::Log => xdg::state(env),
    }
}

fn locate(
    env: &Env,
    scope: Scope,
    game: bool,
    kind: PathKind,
    app: &AppName,
) -> Result<PathBuf, PathError> {
    let base = match scope {
        Scope::User => user_base(env, kind)?,
        Scope::System => fhs::base(kind, game).to_path_buf(),
    };
    let dir = base.join(app.as_str());
    tracing::debug!(%kind, ?scope, game, dir = %dir.display(), "resolved directory");
    Ok(dir)
}

pub(crate) fn relative_name(name: &Path) -> Result<&Path, PathError> {
    let mut components = name.components().peekable();
    let valid = components.peek().is_some()
        && components.all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
    if valid {
        Ok(name)
    } else {
        Err(PathError::InvalidFileName(name.to_path_buf()))
    }
}

/// Resolve the per-user directory of `kind` for `app_name`.
///
/// The base directory comes from the XDG variable of `kind` if it is set to an absolute path,
/// and from the XDG default otherwise; `app_name` is appended to it.
///
/// # Errors
///
/// * [`PathError::InvalidAppName`] if `app_name` is empty or contains a path separator.
/// * [`PathError::MissingHome`] if a default below the home directory is needed, but `env` has
///   no usable home.
pub fn resolve_dir(env: &Env, kind: PathKind, app_name: &str) -> Result<PathBuf, PathError> {
    let app = AppName::new(app_name)?;
    locate(env, Scope::User, false, kind, &app)
}

/// Directories of one application.
///
/// Holds the environment snapshot, the application name, the [`Scope`], whether the
/// application is a game, and explicit per-kind overrides. Overrides name the final directory
/// and take precedence over everything else.
#[derive(Debug, Clone)]
pub struct Dirs {
    env: Env,
    app: AppName,
    scope: Scope,
    game: bool,
    overrides: HashMap<PathKind, PathBuf>,
}

impl Dirs {
    pub fn new(env: Env, app: AppName) -> Self {
        Self {
            env,
            app,
            scope: Scope::User,
            game: false,
            overrides: HashMap::new(),
        }
    }

    /// Resolve with `scope` instead of [`Scope::User`].
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Use the FHS locations for games: `/var/games` for system data, and the `games`
    /// directories ahead of the usual data search path.
    pub fn with_game(mut self, game: bool) -> Self {
        self.game = game;
        self
    }

    /// Use `dir` as the directory of `kind`, ignoring the environment and the scope.
    pub fn with_override(mut self, kind: PathKind, dir: impl Into<PathBuf>) -> Self {
        self.overrides.insert(kind, dir.into());
        self
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn app(&self) -> &AppName {
        &self.app
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn is_game(&self) -> bool {
        self.game
    }

    /// Writable directory of `kind`.
    pub fn dir(&self, kind: PathKind) -> Result<PathBuf, PathError> {
        if let Some(dir) = self.overrides.get(&kind) {
            tracing::debug!(%kind, dir = %dir.display(), "using directory override");
            return Ok(dir.clone());
        }
        locate(&self.env, self.scope, self.game, kind, &self.app)
    }

    /// Path of `name` in the writable directory of `kind`. `name` may have several components,
    /// but must stay inside the directory.
    pub fn file(&self, kind: PathKind, name: impl AsRef<Path>) -> Result<PathBuf, PathError> {
        let name = relative_name(name.as_ref())?;
        Ok(self.dir(kind)?.join(name))
    }

    /// Every directory where files of `kind` are looked up, most important first.
    ///
    /// The writable directory comes first. For users, it is followed by `$XDG_CONFIG_DIRS` or
    /// `$XDG_DATA_DIRS`, and then by the read-only FHS locations.
    pub fn search_dirs(&self, kind: PathKind) -> Result<Vec<PathBuf>, PathError> {
        let mut dirs = vec![self.dir(kind)?];
        if self.scope == Scope::User {
            let bases = match kind {
                PathKind::Config => xdg::config_dirs(&self.env),
                PathKind::Data => xdg::data_dirs(&self.env),
                PathKind::Cache | PathKind::Runtime | PathKind::Log => Vec::new(),
            };
            dirs.extend(bases.into_iter().map(|base| base.join(self.app.as_str())));
        }
        dirs.extend(
            fhs::search_bases(kind, self.game)
                .iter()
                .map(|base| Path::new(base).join(self.app.as_str())),
        );
        let mut seen = HashSet::new();
        dirs.retain(|dir| seen.insert(dir.clone()));
        Ok(dirs)
    }

    /// First existing `name` in [`Dirs::search_dirs`].
    pub fn find(&self, kind: PathKind, name: impl AsRef<Path>) -> Result<Option<PathBuf>, PathError> {
        Ok(self.find_all(kind, name)?.into_iter().next())
    }

    /// Every existing `name` in [`Dirs::search_dirs`], in search order.
    pub fn find_all(&self, kind: PathKind, name: impl AsRef<Path>) -> Result<Vec<PathBuf>, PathError> {
        let name = relative_name(name.as_ref())?;
        let found = self
            .search_dirs(kind)?
            .into_iter()
            .map(|dir| dir.join(name))
            .filter(|candidate| {
                let exists = candidate.exists();
                if !exists {
                    tracing::trace!(path = %candidate.display(), "not found");
                }
                exists
            })
            .collect();
        Ok(found)
    }

    /// Create the writable directory of `kind`, with its parents, and return it.
    pub fn ensure_dir(&self, kind: PathKind) -> Result<PathBuf, PathError> {
        let dir = self.dir(kind)?;
        dir.mkdir(MkdirOptions::WithParents)
            .map_err(|source| PathError::Io {
                path: dir.clone(),
                source,
            })?;
        Ok(dir)
    }
}
