pub mod api;
mod cli;
pub mod domain;
pub mod infra;
mod run;
pub mod util;

#[cfg(test)]
mod tests;

pub use self::run::start;
