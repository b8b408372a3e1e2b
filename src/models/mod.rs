pub mod block;
pub mod caller;
pub mod day;
pub mod entry_mode;
pub mod template;
pub mod time_entry;
pub mod time_of_day;
