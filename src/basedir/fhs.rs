//! Filesystem Hierarchy Standard locations, used for [`Scope::System`](super::Scope::System).
//!
//! Unlike [`xdg`](super::xdg), nothing here depends on the environment. Games keep their
//! variable data below `/var/games`, and their static data in the `games` subdirectories of
//! the usual locations, which are searched first.

use std::path::Path;

use crate::basedir::PathKind;

const DATA_BASES: &[&str] = &[
    "/var/local/lib",
    "/var/lib",
    "/usr/local/lib",
    "/usr/lib",
    "/usr/local/share",
    "/usr/share",
];

const GAME_DATA_BASES: &[&str] = &[
    "/var/local/games",
    "/var/games",
    "/usr/local/lib/games",
    "/usr/lib/games",
    "/usr/local/share/games",
    "/usr/share/games",
    "/var/local/lib",
    "/var/lib",
    "/usr/local/lib",
    "/usr/lib",
    "/usr/local/share",
    "/usr/share",
];

/// Base directory of `kind` for system-wide installations.
pub fn base(kind: PathKind, game: bool) -> &'static Path {
    Path::new(match kind {
        PathKind::Config => "/etc",
        PathKind::Data if game => "/var/games",
        PathKind::Data => "/var/lib",
        PathKind::Cache => "/var/cache",
        PathKind::Runtime => "/run",
        PathKind::Log => "/var/log",
    })
}

/// Read-only directories searched after the writable one, most specific first.
pub fn search_bases(kind: PathKind, game: bool) -> &'static [&'static str] {
    match kind {
        PathKind::Config => &["/etc"],
        PathKind::Data if game => GAME_DATA_BASES,
        PathKind::Data => DATA_BASES,
        PathKind::Cache | PathKind::Runtime | PathKind::Log => &[],
    }
}
