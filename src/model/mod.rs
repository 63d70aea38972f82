// File: ./src/model/mod.rs
pub mod display;
pub mod item;
pub mod parser;

pub use item::{
    Category, CategoryCount, NudgeState, ParsedTask, Priority, ReminderTrigger, TaskItem,
    TriggerPayload, trigger_prefix,
};
