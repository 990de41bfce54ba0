pub mod client;
pub mod config;
pub mod editor;
pub mod errors;
pub mod extract;
pub mod generation;
pub mod llm_client;
pub mod models;
pub mod render;
pub mod routes;
pub mod state;
pub mod storage;
