//! CLI command handlers.

mod export;
mod list;
mod show;

pub use export::run_export_command;
pub use list::run_list_command;
pub use show::run_show_command;
