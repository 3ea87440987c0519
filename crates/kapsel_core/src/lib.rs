//! # KAPSEL Banner Engine
//!
//! Pure Rust logic for weighted random-reward banners.
//!
//! ## Design Principles
//!
//! 1. **Integer credits** - All balances and refunds are whole credits,
//!    no floating point anywhere near money
//! 2. **One compound operation** - `pull` is draw, debit, duplicate
//!    settlement and notification in a fixed order
//! 3. **Validate at the edge** - Configs and pool items are checked when
//!    they enter the system, never mid-draw
//! 4. **External configuration** - All banner data in TOML files
//!
//! ## Thread Safety
//!
//! A banner is immutable during pulls (`pull` takes `&self`); requester
//! state flows through the [`Requester`] seam. Serializing each
//! requester's pulls is the caller's job, which `kapsel_sync` does with
//! one lock per account.
//!
//! ## Example
//!
//! ```rust,ignore
//! use kapsel_core::{load_banners, Credits, PlayerAccount};
//!
//! let banners = load_banners("data/banners.toml")?;
//! let mut account = PlayerAccount::new(1, Credits::new(5000));
//! let mut rng = rand::rngs::StdRng::from_entropy();
//!
//! let result = banners[0].pull(&mut account, &mut rng)?;
//! println!("drew {} at {}", result.item.id, result.snapshot.credits);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod banner;
pub mod config;
pub mod currency;
pub mod draw;
pub mod error;
pub mod item;
pub mod notify;
pub mod session;
pub mod weights;

pub use banner::{Banner, BannerConfig, BannerId, FundsPolicy};
pub use config::{load_banner_configs, load_banners, parse_banner_configs, render_banner_configs};
pub use currency::{Credits, RefundFraction};
pub use draw::{draw_index, draw_one, DrawMode, DrawStatistics};
pub use error::{GachaError, GachaResult};
pub use item::{Item, ItemId, Rarity};
pub use notify::{EconomySnapshot, PullEvent, PullNotifier, PullResult};
pub use session::{EconomyState, PlayerAccount, Requester, RequesterId};
pub use weights::RarityWeights;
