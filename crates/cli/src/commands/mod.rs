//! CLI Commands

pub mod employees;
pub mod list;
pub mod run;
