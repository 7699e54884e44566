//! The data types exchanged between the agent, the model, and the systems.
//!
//! Two external formats sit on either side of these structs:
//! - the openai chat payloads sent to and from the model
//! - the tool calls handed to systems and the content they return
//!
//! Conversion helpers translate at each boundary, which keeps the internal
//! shapes independent of both wire formats.
pub mod content;
pub mod message;
pub mod role;
pub mod tool;
