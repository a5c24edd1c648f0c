//! Command implementations.

pub mod config;
pub mod locate;
pub mod plan;
pub mod run;
pub mod show;

pub use self::config::execute_config;
pub use self::locate::execute_locate;
pub use self::plan::execute_plan;
pub use self::run::execute_run;
pub use self::show::execute_show;
