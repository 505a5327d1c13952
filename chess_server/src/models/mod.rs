//! Wire models for the A2A chess agent.

pub mod a2a;
pub mod rpc;
