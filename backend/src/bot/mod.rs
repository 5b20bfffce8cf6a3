//! Chat-facing behaviour.
//!
//! `BotContext` owns all mutable bot state and is driven by a single event
//! loop, one event at a time. Handlers are split by concern: commands,
//! registration, and uploads.

mod admins;
mod commands;
mod context;
mod event_loop;
mod events;
mod messages;
mod registration;
mod upload;

pub use context::BotContext;
pub use event_loop::run_event_loop;
