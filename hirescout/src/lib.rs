pub mod commands;
pub mod handlers;

pub use commands::{CLAP_STYLING, command_argument_builder};
pub use handlers::{
    apply_overrides, build_settings, driver_kind, handle_harvest, handle_probe, handle_run,
    probe_input,
};
