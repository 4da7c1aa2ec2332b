pub mod command;
pub mod controller;
pub mod domain;
pub mod shelf;
pub mod store;
