// Crate root library declaration and module exports.
pub mod calendar;
pub mod config;
pub mod model;
pub mod notify;
pub mod nudge;
pub mod planner;
pub mod registrar;

pub use config::ReminderConfig;
pub use model::display::preview_chips;
pub use model::parser::parse_task;
pub use planner::plan_triggers;

/// Initializes terminal logging for binaries and examples.
pub fn init_logging(level: log::LevelFilter) {
    let _ = simplelog::TermLogger::init(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
}
