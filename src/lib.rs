#[macro_use]
extern crate diesel;

pub mod auth;
pub mod config;
pub mod database;
pub mod models;
pub mod notifier;
pub mod protocol;
pub mod scheduler;
pub mod schema;
pub mod state;
pub mod user;
pub mod utils;
