pub mod uploads;
pub mod webhook;
