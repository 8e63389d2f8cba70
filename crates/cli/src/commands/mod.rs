pub mod find_devices;
pub mod run_schedule;
