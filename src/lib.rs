//! rgdesk: a front-end for ripgrep with search history and editor
//! integration.

pub mod cli;
pub mod core;
pub mod models;
pub mod server;
pub mod services;
