pub mod app;
pub mod cli;
pub mod error;
pub mod report;
pub mod signals;
pub mod track;
