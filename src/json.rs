//! Main module for the lconf document model

pub mod error;
pub mod lexing;
pub mod loader;
pub mod location;
pub mod node;
pub mod parsing;
pub mod serializer;
pub mod template;
pub mod token;
