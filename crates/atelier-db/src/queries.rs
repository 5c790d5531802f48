//! Query modules, one per table.

pub mod activity;
pub mod links;
pub mod sessions;
pub mod shares;
pub mod users;
pub mod workspaces;
