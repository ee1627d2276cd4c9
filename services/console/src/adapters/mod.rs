pub mod rest;
pub mod vault;
