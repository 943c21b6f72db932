#![forbid(unsafe_code)]

//! Browser host for pawpage.
//!
//! On `wasm32` this crate implements [`pawpage_core::PageHost`] over
//! `web-sys`, installs document-level delegated listeners and exports:
//!
//! - an auto-start entry point booting with the default configuration,
//! - `boot(configJson?)` for pages that load the module manually,
//! - `bootReportJson()` describing what was wired.
//!
//! Log output goes to the devtools console through [`logging::ConsoleLayer`].

pub mod logging;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{boot, boot_report_json, start};

use pawpage_core::{BootStatus, ConfigError, PageConfig};

/// Parse the optional JSON override handed to `boot`.
pub fn parse_config(json: Option<&str>) -> Result<PageConfig, ConfigError> {
    match json.map(str::trim) {
        None | Some("") => Ok(PageConfig::default()),
        Some(json) => PageConfig::from_json_str(json),
    }
}

/// Short label returned to JavaScript callers.
#[must_use]
pub fn status_label(status: &BootStatus) -> &'static str {
    match status {
        BootStatus::Booted(_) => "booted",
        BootStatus::Deferred => "deferred",
        BootStatus::AlreadyBooted => "already-booted",
    }
}

/// Native builds compile this crate as a stub so `cargo check --workspace`
/// stays green on non-wasm targets.
#[cfg(not(target_arch = "wasm32"))]
pub fn boot_report_json() -> String {
    "null".to_string()
}
