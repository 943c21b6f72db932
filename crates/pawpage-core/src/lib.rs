#![forbid(unsafe_code)]

//! Core: page lifecycle, mobile menu, fragment navigation and contact form
//! validation, written against an abstract [`host::PageHost`].

pub mod anchor;
pub mod config;
pub mod error;
pub mod event;
pub mod form;
pub mod host;
pub mod logging;
pub mod memory;
pub mod menu;
pub mod page;
pub mod selector;
pub mod validation;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, info, trace, warn};

pub use config::PageConfig;
pub use error::ConfigError;
pub use event::{Disposition, PageEvent};
pub use host::PageHost;
pub use page::{BootReport, BootStatus, Lifecycle, Page};
