//! fOS Widgets - Interactive UI components over a headless DOM
//!
//! Alert, button, carousel, collapse, dropdown, modal, offcanvas, popover,
//! tab, toast and tooltip behaviour driven by DOM events, with
//! transition-aware show/hide lifecycles.
//!
//! # Example
//! ```rust,ignore
//! use fos_widgets::{Runtime, Config, widgets::Modal, Component, Showable};
//!
//! let mut rt = Runtime::new();
//! fos_widgets::data_api::install_all(&mut rt);
//! let modal = Modal::get_or_create_instance(&mut rt, dialog, Config::new())?;
//! modal.show(&mut rt);
//! rt.advance(300);
//! ```
//!
//! Everything is single threaded: the [`Runtime`] owns the document, the
//! listener registry, the timer queue and the instance registry, and every
//! operation borrows it mutably. Time only moves when the host calls
//! [`Runtime::advance`].

pub mod backdrop;
pub mod bridge;
pub mod component;
pub mod config;
pub mod data_api;
pub mod dispatch;
mod error;
pub mod event;
pub mod focustrap;
pub mod placement;
pub mod registry;
mod runtime;
pub mod scrollbar;
pub mod timer;
pub mod transition;
pub mod value;
pub mod widgets;

pub use bridge::{Plugin, PluginCall};
pub use component::{Component, Disposable, Showable, TransitionState};
pub use config::Config;
pub use dispatch::Handler;
pub use error::WidgetError;
pub use event::Event;
pub use placement::{PlacementEngine, PlacementOptions, StaticPlacement};
pub use registry::ComponentKind;
pub use runtime::Runtime;
pub use timer::TimerId;
pub use value::Value;

// Re-export the DOM for hosts building pages
pub use fos_dom as dom;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
