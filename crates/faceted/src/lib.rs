//! Faceted — a faceted filtering engine with URL-synchronized selection
//! state.
//!
//! Given a set of bound input controls and a set of candidate items tagged
//! with filter attributes, the engine computes, for every item, whether it
//! matches the current combination of control values, and keeps that
//! decision synchronized with the address bar so filter state survives
//! navigation and is shareable via link.
//!
//! # Core Types
//!
//! - [`container::FilterContainer`]: owns the pipeline and emits change
//!   signals
//! - [`control::BoundControl`]: one host input bound to a filter key
//! - [`item::FilterableItem`]: a candidate entity with per-key tag values
//! - [`config::ContainerConfig`]: membership/comparison modes, delimiters,
//!   URL participation
//! - [`query::UrlStateBackend`]: the address-bar seam; hosts bridge it to
//!   their history API
//!
//! # Example
//!
//! ```
//! use std::time::Instant;
//! use faceted::prelude::*;
//!
//! let config = ContainerConfig::new()
//!     .with_key("color", KeyConfig::new().with_membership(MembershipMode::Any));
//! let mut container = FilterContainer::with_in_memory_url(config);
//!
//! let red = container.add_control(BoundControl::toggle("color", "red"));
//! let shirt = container.add_item(FilterableItem::new().with_tag("color", "red"));
//!
//! container.signals().count_rendered.connect(|text| {
//!     println!("{text}");
//! });
//!
//! container.set_control_selected(red, true).unwrap();
//! container.apply_control(red).unwrap();
//! container.pump(Instant::now());
//! # assert!(container.is_item_visible(shirt));
//! ```
//!
//! # Architecture Overview
//!
//! ```text
//! control change ──> value extraction ──> match engine ──> visibility flags
//!                         │                                     │
//!                         v                                     v
//!                   URL query state                 group labels, result count
//! ```
//!
//! Evaluation is single-threaded and event-driven: the synchronous phase
//! runs inside the change event, derived aggregates settle on the host's
//! next tick, and the count render can be debounced for announcing
//! targets.

pub mod config;
pub mod container;
pub mod control;
pub mod counter;
mod error;
pub mod item;
pub mod key;
pub mod matcher;
pub mod query;
pub mod registry;
pub mod visibility;

pub use error::{FilterError, Result};

pub mod prelude {
    //! Re-exports of the most commonly used types.
    //!
    //! ```ignore
    //! use faceted::prelude::*;
    //! ```

    pub use crate::config::{ComparisonMode, ContainerConfig, KeyConfig, MembershipMode};
    pub use crate::container::{ContainerSignals, FilterContainer};
    pub use crate::control::{BoundControl, ControlId, ControlKind};
    pub use crate::counter::CountLabels;
    pub use crate::error::{FilterError, Result};
    pub use crate::item::{FilterableItem, GroupLabel, ItemId, LabelId};
    pub use crate::key::FilterKey;
    pub use crate::query::{InMemoryBackend, UrlStateBackend};
}
