//! Game engines behind one adapter.
//!
//! [`EngineAdapter`] exposes the same operations whether the game runs
//! in-process ([`LocalEngine`]) or on the ledger ([`RemoteEngine`]). The UI
//! talks to the adapter only and never branches on the active mode.

pub use adapter::*;
pub use clock::*;
pub use config::*;
pub use error::*;
pub use events::*;
pub use ledger::*;
pub use local::*;
pub use persistence::*;
pub use remote::*;

mod adapter;
mod clock;
mod config;
mod error;
mod events;
mod ledger;
mod local;
mod persistence;
mod remote;
