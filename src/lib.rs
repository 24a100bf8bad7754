#![doc = "The `taskledger` library crate."]
#![doc = ""]
#![doc = "Authentication (bcrypt credentials, HS256 bearer tokens), the transactional"]
#![doc = "persistence gateway over Postgres, and the HTTP handlers of the task service."]
#![doc = "The binary (`main.rs`) wires these together and runs the server."]

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;

pub use crate::error::AppError;
