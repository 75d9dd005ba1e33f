//! # reel-core
//!
//! Core types shared by every reel crate.
//!
//! This crate provides:
//! - Identifier newtypes for tasks, sessions, log entries, and correlation tokens
//! - Status enums with the task state machine transitions
//! - Conversation log entities (`MessageEntry` and its write-once terminal fields)
//! - Wire types for the render service (submit, poll, cancel, history)
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod wire;
