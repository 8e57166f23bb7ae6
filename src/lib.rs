#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
#![deny(clippy::cargo)]

pub mod batch;
pub mod common;
pub mod config;
pub mod generator;
pub mod invoker;
pub mod schema;
pub mod statement;
pub mod value;
