#![no_std]

pub mod constants;
pub mod dividends;
pub mod errors;
pub mod events;
pub mod types;

pub use errors::Error;
