pub mod ai;
pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod form;
pub mod handoff;
pub mod list;
pub mod shared;
pub mod tui;
