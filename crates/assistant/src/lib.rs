//! # Tally Assistant
//!
//! Intent resolution for the expense tracker's chat widget.
//!
//! ## Architecture
//!
//! ```text
//! Raw message
//!     │
//!     ├──> Normalize (lowercase, trim)
//!     │
//!     ├──> Keyword rules, first hit wins
//!     │    greeting → add expense → view expenses → analytics → download csv
//!     │    → profile → help → thanks → farewell
//!     │
//!     ├──> Fallback (only when no rule fired)
//!     │    ├─> partial_ratio(keyword, message) for every catalog entry
//!     │    └─> best entry if score > threshold, else the default response
//!     │
//!     └──> Context store: remember the normalized message for the user
//! ```
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tally_assistant::{AssistantConfig, ContextStore, Intent, IntentEngine, UserId};
//!
//! let store = Arc::new(ContextStore::new());
//! let engine = IntentEngine::new(AssistantConfig::default(), Arc::clone(&store)).unwrap();
//!
//! let user = UserId::from(42u64);
//! let resolution = engine.resolve("  Thanks a lot! ", &user);
//! assert_eq!(resolution.intent, Intent::Thanks);
//! assert_eq!(store.get(&user).as_deref(), Some("thanks a lot!"));
//! ```

mod catalog;
mod config;
mod context;
mod engine;
mod error;
mod intent;
mod normalize;
pub mod rules;
pub mod similarity;

pub use catalog::{CatalogEntry, FallbackMatch, IntentCatalog};
pub use config::{AssistantConfig, DEFAULT_RESPONSE, DEFAULT_THRESHOLD};
pub use context::{ContextStore, UserId};
pub use engine::{Explanation, IntentEngine, KeywordScore, Resolution, Suggestion};
pub use error::{AssistantError, Result};
pub use intent::Intent;
pub use normalize::normalize;
