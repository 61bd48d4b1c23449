// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// hujjat-session: per-user conversation state for the document bot.

pub mod machine;
pub mod messages;
pub mod reply;
pub mod session;
pub mod store;

pub use machine::SessionMachine;
pub use reply::{Button, Event, Keyboard, MenuButton, Reply};
pub use session::{Session, SessionState, StoredUpload};
pub use store::SessionStore;
