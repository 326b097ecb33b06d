pub mod config;
pub mod launch;
pub mod shell_init;
