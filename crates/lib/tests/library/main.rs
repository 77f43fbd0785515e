mod common;
mod schedule_tests;
mod select_tests;
mod watch_tests;
