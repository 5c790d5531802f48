pub mod links;
pub mod shared;
pub mod shares;
pub mod users;
pub mod workspaces;
