//! MCP stdio server exposing classification and analysis as tools.
pub mod server;
pub mod tools;
