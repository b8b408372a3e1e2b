pub mod day;
pub mod log;
pub mod overlap;
pub mod template;
pub mod timer;
pub mod validation;
