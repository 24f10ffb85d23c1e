pub mod agent;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod llm;
pub mod pdf;
pub mod planner;
pub mod routes;
pub mod state;
pub mod text;
pub mod validation;

#[cfg(test)]
pub mod testing;
