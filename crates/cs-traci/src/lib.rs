//! `cs-traci`: the control channel to the external traffic simulator.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`constants`]   | Command, variable, type and status codes                  |
//! | [`wire`]        | `WireWriter` / `WireReader`: big-endian value codec       |
//! | [`message`]     | Request framing and status-response parsing              |
//! | [`channel`]     | `ControlChannel`: the request/response surface the engine uses |
//! | [`client`]      | `TraciClient<S>`: blocking implementation over any byte stream |
//! | [`error`]       | `TraciError`, `TraciResult<T>`                            |
//!
//! # Wire format (summary)
//!
//! ```text
//! message  = [i32 total length incl. itself] command*
//! command  = [u8 len] [u8 id] payload            (len ≤ 255)
//!          | [u8 0] [i32 len] [u8 id] payload    (extended)
//! response = status-command [result-command]
//! status   = [u8 len] [u8 id] [u8 result] [string description]
//! ```
//!
//! Every exchange is synchronous: one request message, one response message.

pub mod channel;
pub mod client;
pub mod constants;
pub mod error;
pub mod message;
pub mod wire;


pub use channel::ControlChannel;
pub use client::TraciClient;
pub use error::{TraciError, TraciResult};
pub use wire::{WireReader, WireWriter};
