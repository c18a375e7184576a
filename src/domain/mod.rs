pub mod models;
pub mod resolve;
pub mod temporal;
