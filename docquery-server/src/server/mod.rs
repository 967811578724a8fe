pub mod server_app;
pub mod server_config;
pub mod server_state;
