pub mod break_log;
pub mod daily_attendance;
pub mod employee;
pub mod punch;
pub mod shift;
