//! XDG Base Directory Specification support.
//!
//! Implements base directory lookup following the XDG Base Directory spec, with the Windows
//! fallbacks in `%LOCALAPPDATA%`.
//!
//! Every function here returns a *base* directory; the application name is appended by
//! [`Dirs`](super::Dirs).

use std::ffi::OsStr;
use std::path::PathBuf;

use crate::basedir::{PathError, home};
use crate::os::env::Env;

pub const CONFIG_HOME: &str = "XDG_CONFIG_HOME";
pub const CONFIG_DIRS: &str = "XDG_CONFIG_DIRS";
pub const DATA_HOME: &str = "XDG_DATA_HOME";
pub const DATA_DIRS: &str = "XDG_DATA_DIRS";
pub const CACHE_HOME: &str = "XDG_CACHE_HOME";
pub const STATE_HOME: &str = "XDG_STATE_HOME";
pub const RUNTIME_DIR: &str = "XDG_RUNTIME_DIR";

const DEFAULT_CONFIG_DIRS: &[&str] = &["/etc/xdg"];
const DEFAULT_DATA_DIRS: &[&str] = &["/usr/local/share", "/usr/share"];

/// Read `key` as a base directory.
///
/// Empty values are treated as unset, and relative values are ignored, as the XDG spec requires
/// all paths in these variables to be absolute.
fn absolute_var(env: &Env, key: &str) -> Option<PathBuf> {
    let value = env.get_os(key).filter(|value| !value.is_empty())?;
    let path = expand_user(env, value);
    if path.is_absolute() {
        Some(path)
    } else {
        tracing::trace!(variable = key, path = %path.display(), "ignoring relative path");
        None
    }
}

#[cfg(feature = "expand-user")]
fn expand_user(env: &Env, value: &OsStr) -> PathBuf {
    match value.to_str() {
        Some(value) => PathBuf::from(
            shellexpand::tilde_with_context(value, || {
                home(env).and_then(|home| home.to_str().map(str::to_owned))
            })
            .into_owned(),
        ),
        None => PathBuf::from(value),
    }
}

#[cfg(not(feature = "expand-user"))]
fn expand_user(_env: &Env, value: &OsStr) -> PathBuf {
    PathBuf::from(value)
}

fn local_app_data(env: &Env) -> Result<PathBuf, PathError> {
    absolute_var(env, "LOCALAPPDATA").ok_or(PathError::MissingHome)
}

fn home_join(env: &Env, parts: &[&str]) -> Result<PathBuf, PathError> {
    let mut home = home(env).ok_or(PathError::MissingHome)?;
    home.extend(parts);
    Ok(home)
}

fn config_fallback(env: &Env) -> Result<PathBuf, PathError> {
    if cfg!(windows) {
        local_app_data(env)
    } else {
        home_join(env, &[".config"])
    }
}

fn cache_fallback(env: &Env) -> Result<PathBuf, PathError> {
    if cfg!(windows) {
        local_app_data(env).map(|mut buf| {
            buf.push("caches");
            buf
        })
    } else {
        home_join(env, &[".cache"])
    }
}

fn data_fallback(env: &Env) -> Result<PathBuf, PathError> {
    if cfg!(windows) {
        local_app_data(env)
    } else {
        home_join(env, &[".local", "share"])
    }
}

fn state_fallback(env: &Env) -> Result<PathBuf, PathError> {
    if cfg!(windows) {
        local_app_data(env)
    } else {
        home_join(env, &[".local", "state"])
    }
}

// The XDG spec defines no default for the runtime directory, so fall back to the temporary
// directory of the snapshot.
fn runtime_fallback(env: &Env) -> Result<PathBuf, PathError> {
    if cfg!(windows) {
        absolute_var(env, "TEMP")
            .or_else(|| absolute_var(env, "TMP"))
            .ok_or(PathError::MissingHome)
    } else {
        Ok(absolute_var(env, "TMPDIR").unwrap_or_else(|| PathBuf::from("/tmp")))
    }
}

fn search_path(env: &Env, key: &str, defaults: &[&str]) -> Vec<PathBuf> {
    let dirs: Vec<PathBuf> = env
        .get_os(key)
        .map(|value| {
            std::env::split_paths(value)
                .filter(|dir| !dir.as_os_str().is_empty())
                .map(|dir| expand_user(env, dir.as_os_str()))
                .filter(|dir| dir.is_absolute())
                .collect()
        })
        .unwrap_or_default();
    if dirs.is_empty() {
        defaults.iter().map(PathBuf::from).collect()
    } else {
        dirs
    }
}

/// Get proper path for `$XDG_CONFIG_HOME`.
///
/// # Errors
///
/// [`PathError::MissingHome`] if the variable is unusable and there is no home directory to
/// fall back to.
pub fn config(env: &Env) -> Result<PathBuf, PathError> {
    absolute_var(env, CONFIG_HOME).map_or_else(|| config_fallback(env), Ok)
}

/// Get proper path for `$XDG_DATA_HOME`.
///
/// # Errors
///
/// [`PathError::MissingHome`] if the variable is unusable and there is no home directory to
/// fall back to.
pub fn data(env: &Env) -> Result<PathBuf, PathError> {
    absolute_var(env, DATA_HOME).map_or_else(|| data_fallback(env), Ok)
}

/// Get proper path for `$XDG_CACHE_HOME`.
///
/// # Errors
///
/// [`PathError::MissingHome`] if the variable is unusable and there is no home directory to
/// fall back to.
pub fn cache(env: &Env) -> Result<PathBuf, PathError> {
    absolute_var(env, CACHE_HOME).map_or_else(|| cache_fallback(env), Ok)
}

/// Get proper path for `$XDG_STATE_HOME`.
///
/// # Errors
///
/// [`PathError::MissingHome`] if the variable is unusable and there is no home directory to
/// fall back to.
pub fn state(env: &Env) -> Result<PathBuf, PathError> {
    absolute_var(env, STATE_HOME).map_or_else(|| state_fallback(env), Ok)
}

/// Get proper path for `$XDG_RUNTIME_DIR`, or the temporary directory if it is unset.
pub fn runtime(env: &Env) -> Result<PathBuf, PathError> {
    absolute_var(env, RUNTIME_DIR).map_or_else(|| runtime_fallback(env), Ok)
}

/// Directories listed in `$XDG_CONFIG_DIRS`, `/etc/xdg` if none are usable.
pub fn config_dirs(env: &Env) -> Vec<PathBuf> {
    search_path(env, CONFIG_DIRS, DEFAULT_CONFIG_DIRS)
}

/// Directories listed in `$XDG_DATA_DIRS`, `/usr/local/share:/usr/share` if none are usable.
pub fn data_dirs(env: &Env) -> Vec<PathBuf> {
    search_path(env, DATA_DIRS, DEFAULT_DATA_DIRS)
}
