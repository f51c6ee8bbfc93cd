//! Command-line operations over a filesystem mirror.

pub mod config;
mod list;
mod paths;
mod show;
mod versions;

pub use config::Config;
pub use list::list;
pub use paths::default_mirror_root;
pub use show::show;
pub use versions::versions;
