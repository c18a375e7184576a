pub mod config;
pub mod credential_store;
pub mod error;
pub mod http_transport;
pub mod oauth_client;
pub mod oauth_manager;
pub mod ticktick_client;
