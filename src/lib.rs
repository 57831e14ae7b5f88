pub mod access;
pub mod chat;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod models;
pub mod notify;
pub mod paging;
pub mod roles;
pub mod routes;
pub mod schema;
pub mod state;
pub mod store;
pub mod task;
pub mod utils;
