pub mod calibration;
pub mod guide;
pub mod orders;
pub mod print_spec;
pub mod screenshots;
pub mod uploads;
