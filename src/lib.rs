//! fhs - find application files where the FHS and the XDG Base Directory spec put them.
//!
//! The crate resolves configuration, data, cache, runtime and log directories for an
//! application ([`basedir`]), and loads settings that can come from the command line, a config
//! file, or a default ([`settings`]). Process state is read through explicit snapshots
//! ([`os`]), so every lookup can be reproduced with a hand-made environment and argument list.
//!
//! ```rust,no_run
//! # use fhs::basedir::{AppName, Dirs, PathKind, Scope};
//! # use fhs::os::{args::Args, env::Env};
//! # use fhs::settings::{Loader, SettingSpec};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let args = Args::new();
//! let dirs = Dirs::new(Env::new(), AppName::new("myapp")?).with_scope(Scope::from_args(&args));
//!
//! let config = Loader::new(&dirs, &args).load(&[
//!     SettingSpec::new("port", 8080),
//!     SettingSpec::new("verbose", false).with_short('v'),
//! ])?;
//! let cache = dirs.ensure_dir(PathKind::Cache)?;
//! # Ok(())
//! # }
//! ```

pub mod basedir;
pub mod fs;
pub mod os;
pub mod settings;
