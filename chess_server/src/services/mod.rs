//! Agent services — engine plumbing, game state and turn logic.

pub mod agent;
pub mod artifact_service;
pub mod board_store;
pub mod engine;
pub mod notation;
pub mod push;
pub mod render;
