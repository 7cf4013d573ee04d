// Typed service endpoints over the dispatcher, plus engine bootstrap.

pub mod client;
pub mod models;
