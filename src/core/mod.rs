//! # Core Session Logic
//!
//! The document chat session manager. It knows nothing about any specific
//! UI technology or about HTTP; the transport is reached through a trait.
//!
//! ```text
//!   InputController ──▶ update() ──▶ Effect::SpawnRequest(Exchange)
//!                          ▲                    │
//!                          │                    ▼
//!                          └──── Action ◀── ChatTransport
//!                          │
//!                          ▼
//!                    MessageStore ──▶ view (tui)
//! ```
//!
//! ## Modules
//!
//! - [`message`]: `Message` and the append-only `MessageStore`
//! - [`input`]: the staged draft and its validation
//! - [`state`]: the `Session` aggregate and derived view state
//! - [`action`]: the `Action` enum and the `update()` state machine
//! - [`exchange`]: one in-flight request and how it is run
//! - [`observer`]: change and diagnostics callbacks
//! - [`clock`]: injected time source
//! - [`config`]: layered settings

pub mod action;
pub mod clock;
pub mod config;
pub mod exchange;
pub mod input;
pub mod message;
pub mod observer;
pub mod state;
