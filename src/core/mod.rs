//! # Core Application Logic
//!
//! Palaver's business logic. It knows nothing about any specific UI
//! technology or transport.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Conversation (data)  │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │
//!                    ┌───────────┴───────────┐
//!                    ▼                       ▼
//!             ┌────────────┐          ┌────────────┐
//!             │    TUI     │          │   agent    │
//!             │  Adapter   │          │  endpoint  │
//!             │ (ratatui)  │          │  (reqwest) │
//!             └────────────┘          └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`conversation`]: `Message` and `Conversation` — the transcript itself
//! - [`state`]: The `App` struct — all application state in one place
//! - [`action`]: The `Action` enum and `update()` — everything that can happen
//! - [`config`]: Settings file, env vars, and CLI flags collapsed to one value

pub mod action;
pub mod config;
pub mod conversation;
pub mod state;
