pub mod app;
pub mod cli;
pub mod config;
pub mod filters;
pub mod output;
pub mod pager;
pub mod render;
pub mod report;
pub mod state;
pub mod utils;
pub mod view;

#[cfg(test)]
mod tests;
