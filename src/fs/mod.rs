//! Filesystem utilities and extensions.
//!
//! Provides the [`PathExt`](path_ext::PathExt) extension trait for [`Path`](std::path::Path) with
//! the few filesystem operations this crate performs.

pub mod path_ext;
