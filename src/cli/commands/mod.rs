//! CLI command implementations.

mod ask;
mod build;
mod config;
mod delete;
mod init;
mod list;
mod search;
mod takeaways;

pub use ask::run_ask;
pub use build::run_build;
pub use config::run_config;
pub use delete::run_delete;
pub use init::run_init;
pub use list::run_list;
pub use search::run_search;
pub use takeaways::run_takeaways;
