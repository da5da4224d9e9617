pub mod fields;
pub mod handlers;
pub mod language;
pub mod orchestrator;
pub mod parsers;
pub mod prompts;
