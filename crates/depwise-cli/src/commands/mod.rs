pub mod config;
pub mod inspect;
pub mod manage;
pub mod registry;

pub use config::{handle_config_command, ConfigCommand};
pub use inspect::{
    audit, conflicts, dashboard, licenses, list, list_projects, outdated, tree, unused, updates,
};
pub use manage::{audit_fix, install, move_dependency, uninstall, update};
pub use registry::{search, versions};
