#[macro_use]
extern crate serde_derive;

pub mod client;
pub mod config;
pub mod data;
pub mod database;
pub mod error;
pub mod file;
pub mod logger;
pub mod memory;
pub mod models;
pub mod mongo;
pub mod services;
pub mod utils;
