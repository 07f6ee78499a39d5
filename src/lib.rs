//! Roster library exports for testing

pub mod cli;
pub mod core;
pub mod gateway;

#[cfg(test)]
pub mod test_support;
