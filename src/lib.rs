//! bolt-relay — answers messages in one Discord channel with text from a
//! text-generation provider.

pub mod comms;
pub mod config;
pub mod error;
pub mod llm;
pub mod logger;
pub mod relay;
