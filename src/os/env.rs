use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

use thiserror::Error;

/// Snapshot of environmental variables, which is safe to access on Windows: its environmental
/// variables are case-insensitive.
///
/// Every resolver in this crate reads the environment through an [`Env`], so tests can build one
/// with [`Env::new_from`] instead of touching the process state.
#[derive(Debug, Clone)]
pub struct Env {
    keys: HashMap<OsString, OsString>,

    normalised_keys: HashMap<OsString, OsString>,
}

/// Errors encountered when getting environmental variable.
#[derive(Debug, Clone, Error)]
pub enum EnvStrError {
    /// This variant indicates, that variable `Missing.0` is missing.
    #[error("there is no environmental variable `${0:?}`")]
    Missing(OsString),

    /// This variant indicates, that variable `$NonUTF8.0` is not an UTF-8 string.
    #[error("environmental variable `${0:?}` is not an UTF-8 string")]
    NonUTF8(OsString),
}

impl Env {
    /// Create new [`Env`] from [`std::env::vars_os`].
    pub fn new() -> Self {
        Self::new_from(std::env::vars_os().collect())
    }

    /// Create new [`Env`] using `keys` as existing environmental variables.
    pub fn new_from(env: HashMap<OsString, OsString>) -> Self {
        Self {
            normalised_keys: Env::normalize_map(&env),
            keys: env,
        }
    }

    fn normalize_key(key: impl AsRef<OsStr>) -> OsString {
        key.as_ref().to_ascii_uppercase()
    }

    fn normalize_map(keys: &HashMap<OsString, OsString>) -> HashMap<OsString, OsString> {
        keys.iter()
            .map(|(key, value)| (Env::normalize_key(key), value.clone()))
            .collect()
    }

    /// Reload environmental variables from `env`.
    pub fn reload_from(&mut self, env: HashMap<OsString, OsString>) {
        self.normalised_keys = Env::normalize_map(&env);
        self.keys = env;
    }

    /// Reload environmental variables from [`std::env::vars_os`].
    pub fn reload(&mut self) {
        self.reload_from(std::env::vars_os().collect())
    }

    /// Get environmental variable pointed by `key`.
    ///
    /// # Returns
    /// `Option<&OsStr>`. `None` variant indicates missing key, `Some`: existing key.
    ///
    /// # Examples
    /// ```rust
    /// use fhs::os::env::Env;
    /// use std::ffi::OsStr;
    ///
    /// let env = Env::from_iter([("FOO", "bar")]);
    /// assert_eq!(env.get_os("FOO"), Some(OsStr::new("bar")));
    /// assert_eq!(env.get_os("BAZ"), None);
    /// ```
    pub fn get_os(&self, key: impl AsRef<OsStr>) -> Option<&OsStr> {
        let key = key.as_ref();
        match self.keys.get(key) {
            Some(x) => Some(x),
            None => {
                if cfg!(target_os = "windows") {
                    self.normalised_keys
                        .get(&Env::normalize_key(key))
                        .map(|x| x.as_ref())
                } else {
                    None
                }
            }
        }
    }

    /// Get environmental variable pointed by `key` and convert it to UTF-8.
    ///
    /// # Returns
    /// `Result<&str, EnvStrError>`. `Ok` variant indicates existing UTF-8 variable, `Err`
    /// indicates some kind of error. See [`EnvStrError`] for details.
    ///
    /// # Examples
    /// ```rust
    /// use fhs::os::env::Env;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let env = Env::from_iter([("HOME", "/home/user")]);
    /// assert_eq!(env.get("HOME")?, "/home/user");
    /// # Ok(())
    /// # }
    /// ```
    pub fn get(&self, key: impl AsRef<OsStr>) -> Result<&str, EnvStrError> {
        let key = key.as_ref();
        self.get_os(key)
            .ok_or_else(|| EnvStrError::Missing(key.to_os_string()))?
            .to_str()
            .ok_or_else(|| EnvStrError::NonUTF8(key.to_os_string()))
    }

    /// Get environmental variable pointed by `key` as a path.
    ///
    /// An empty variable is treated the same as a missing one.
    pub fn get_path(&self, key: impl AsRef<OsStr>) -> Option<PathBuf> {
        self.get_os(key)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> FromIterator<(K, V)> for Env
where
    K: Into<OsString>,
    V: Into<OsString>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::new_from(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claim::{assert_err, assert_none, assert_ok, assert_some};

    #[test]
    fn get_existing_variable() {
        let env = Env::from_iter([("XDG_CONFIG_HOME", "/tmp/config")]);
        assert_eq!(assert_ok!(env.get("XDG_CONFIG_HOME")), "/tmp/config");
    }

    #[test]
    fn get_missing_variable() {
        let env = Env::from_iter([("XDG_CONFIG_HOME", "/tmp/config")]);
        let err = assert_err!(env.get("XDG_DATA_HOME"));
        assert!(matches!(err, EnvStrError::Missing(key) if key == "XDG_DATA_HOME"));
    }

    #[test]
    fn empty_variable_is_not_a_path() {
        let env = Env::from_iter([("XDG_CACHE_HOME", ""), ("HOME", "/home/user")]);
        assert_none!(env.get_path("XDG_CACHE_HOME"));
        assert_eq!(assert_some!(env.get_path("HOME")), PathBuf::from("/home/user"));
    }

    #[test]
    fn reload_replaces_snapshot() {
        let mut env = Env::from_iter([("A", "1")]);
        env.reload_from(HashMap::from([(OsString::from("B"), OsString::from("2"))]));
        assert_none!(env.get_os("A"));
        assert_eq!(assert_ok!(env.get("B")), "2");
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_variable() {
        use std::os::unix::ffi::OsStringExt;
        let env = Env::from_iter([(OsString::from("X"), OsString::from_vec(vec![0xff, 0xfe]))]);
        let err = assert_err!(env.get("X"));
        assert!(matches!(err, EnvStrError::NonUTF8(_)));
        let path = assert_some!(env.get_path("X"));
        assert_eq!(path.into_os_string().into_vec(), vec![0xff, 0xfe]);
    }
}
