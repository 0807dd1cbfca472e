pub mod daily;
pub mod schedule;
pub mod time_of_day;
pub mod zoned_now;
