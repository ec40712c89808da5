pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod editor;
pub mod input;
pub mod logging;
pub mod persistence;
pub mod report;
pub mod shelf;
pub mod ui;
