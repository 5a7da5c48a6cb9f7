//! Pipeline module — stage tasks and the queues between them.
//!
//! One task per stage, bounded mpsc queues in between:
//!
//! ```text
//! reader ─lines─▶ masker ─sentences─▶ dispatch ─known─▶ label ─labelled─▶ sink
//!                    │                   │                ▲
//!                    └─masks─▶ sink      └─unknown─▶ context (replays known)
//! ```

pub mod context;
pub mod dispatch;
pub mod label;
pub mod masker;
pub mod reader;
pub mod sink;
