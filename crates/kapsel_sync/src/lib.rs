//! # KAPSEL Observation Layer
//!
//! Notification surfaces and orchestration around the banner engine.
//!
//! ## Pieces
//!
//! 1. **[`BroadcastHub`]** - server-side fan-out: every pull event is
//!    cloned into each subscriber's bounded channel, never blocking the
//!    pull that produced it
//! 2. **[`EconomyMirror`]** - client-local observable: latest snapshot
//!    per requester plus a drainable event backlog
//! 3. **[`Parlor`]** - the owning context: banner and account
//!    registries, per-requester pull serialization, one shared RNG
//!
//! Both surfaces are driven off the same mutation event and carry the
//! same full snapshot, so they can never disagree about settled state.
//!
//! ## Example
//!
//! ```rust,ignore
//! use kapsel_core::Credits;
//! use kapsel_sync::Parlor;
//!
//! let parlor = Parlor::new();
//! parlor.register_banner(&config)?;
//! parlor.open_account(1, Credits::new(5000))?;
//!
//! let observer = parlor.subscribe();
//! let result = parlor.pull(1, "launch")?;
//! assert_eq!(observer.recv()?.pull.snapshot, result.snapshot);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod hub;
pub mod observable;
pub mod parlor;

pub use hub::{BroadcastHub, DEFAULT_CHANNEL_CAPACITY};
pub use observable::EconomyMirror;
pub use parlor::Parlor;
