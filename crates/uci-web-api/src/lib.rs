//! Configuration shared by the server and the `week_menu` binary.

pub mod config;
