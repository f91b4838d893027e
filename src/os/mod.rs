//! Snapshots of process state.
//!
//! [`Env`](env::Env) and [`Args`](args::Args) capture environmental variables and command-line
//! arguments, so path resolution and setting lookup never read process globals directly.

pub mod args;
pub mod env;
