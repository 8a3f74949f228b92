pub mod error;
pub mod membership;
pub mod ports;
pub mod records;
pub mod schedule;
pub mod service;
pub mod store;
