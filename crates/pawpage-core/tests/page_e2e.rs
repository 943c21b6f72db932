#![forbid(unsafe_code)]

//! End-to-end tests for the page controller.
//!
//! A full landing page is built in a [`MemoryDocument`], booted through
//! [`Page::on_lifecycle`] and driven only through [`Page::dispatch`], the
//! same surface the browser host uses.
//!
//! # Invariants
//!
//! 1. **Menu sync**: `aria-expanded` and the panel's hidden class always
//!    agree after an event.
//! 2. **Focus restoration**: every close path focuses the toggle; an
//!    in-panel fragment link then hands focus to its target.
//! 3. **One transition per event**: booting twice never doubles a toggle.
//! 4. **Submit is always cancelled** for the contact form, whatever the
//!    outcome.
//!
//! # Failure Modes
//!
//! | Scenario | Expected Behavior |
//! |----------|-------------------|
//! | Fragment without a target | Default navigation kept, no focus move |
//! | Menu markup missing | Clicks and keys fall through untouched |
//! | Feedback region missing | Validation still runs, no message |
//!
//! Run: `cargo test -p pawpage-core --test page_e2e`

use core::time::Duration;

use pawpage_core::config::{ACCEPTED_MESSAGE, PageConfig, REJECTED_MESSAGE};
use pawpage_core::event::{Disposition, KeyEvent, Modifiers, PageEvent};
use pawpage_core::host::{PageHost, ReadyState, ScrollBehavior};
use pawpage_core::memory::{MemoryDocument, NodeId};
use pawpage_core::page::{BootStatus, Lifecycle, Page};
use pretty_assertions::assert_eq;
use tracing::Level;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(Level::DEBUG)
        .try_init();
}

struct Site {
    doc: MemoryDocument,
    toggle: NodeId,
    panel: NodeId,
    panel_links: Vec<NodeId>,
    dead_panel_link: NodeId,
    logo: NodeId,
    hero_cta: NodeId,
    missing_link: NodeId,
    pricing: NodeId,
    services: NodeId,
    form: NodeId,
    fields: [NodeId; 4],
    feedback: NodeId,
    main: NodeId,
}

impl Site {
    fn build() -> Self {
        let mut doc = MemoryDocument::new();
        let body = doc.body();

        let header = doc.append_with(body, "header", &[("data-menu-container", "")]);
        let logo = doc.append_with(header, "img", &[("alt", "Paw & Care")]);
        let toggle = doc.append_with(
            header,
            "button",
            &[("data-menu-toggle", ""), ("aria-expanded", "false")],
        );
        let panel = doc.append_with(
            header,
            "nav",
            &[("id", "mobile-menu"), ("class", "hidden md:hidden")],
        );
        let panel_links = ["#services", "#pricing", "#contact"]
            .into_iter()
            .map(|href| doc.append_with(panel, "a", &[("href", href)]))
            .collect();
        let dead_panel_link = doc.append_with(panel, "a", &[("href", "#careers")]);

        let main = doc.append(body, "main");
        let hero_cta = doc.append_with(main, "a", &[("href", "#pricing"), ("class", "btn")]);
        let missing_link = doc.append_with(main, "a", &[("href", "#missing")]);
        let services = doc.append_with(main, "section", &[("id", "services")]);
        let pricing = doc.append_with(main, "section", &[("id", "pricing")]);
        let contact = doc.append_with(main, "section", &[("id", "contact")]);

        let form = doc.append_with(contact, "form", &[("id", "contact-form")]);
        let name = doc.append_with(form, "input", &[("name", "name")]);
        let email = doc.append_with(form, "input", &[("name", "email"), ("type", "email")]);
        let pet = doc.append_with(form, "textarea", &[("name", "petDetails")]);
        let message = doc.append_with(form, "textarea", &[("name", "message")]);
        doc.append_with(form, "button", &[("type", "submit")]);
        let feedback = doc.append_with(
            contact,
            "p",
            &[("id", "form-feedback"), ("aria-live", "polite")],
        );

        Self {
            doc,
            toggle,
            panel,
            panel_links,
            dead_panel_link,
            logo,
            hero_cta,
            missing_link,
            pricing,
            services,
            form,
            fields: [name, email, pet, message],
            feedback,
            main,
        }
    }

    fn boot(&mut self) -> Page<NodeId> {
        init_tracing();
        let mut page = Page::new(PageConfig::default());
        let status = page.on_lifecycle(&mut self.doc, Lifecycle::ScriptLoaded);
        assert!(matches!(status, BootStatus::Booted(_)), "{status:?}");
        page
    }

    fn click(&mut self, page: &mut Page<NodeId>, target: NodeId) -> Disposition {
        page.dispatch(&mut self.doc, PageEvent::Click { target })
    }

    fn key(&mut self, page: &mut Page<NodeId>, dom_key: &str, shift: bool) -> Disposition {
        let mods = Modifiers::from_dom_flags(shift, false, false, false);
        page.dispatch(&mut self.doc, PageEvent::KeyDown(KeyEvent::from_dom(dom_key, mods)))
    }

    fn submit(&mut self, page: &mut Page<NodeId>, values: [&str; 4]) -> Disposition {
        for (field, value) in self.fields.iter().zip(values) {
            self.doc.set_value(*field, value);
        }
        let form = self.form;
        page.dispatch(&mut self.doc, PageEvent::Submit { form })
    }

    fn menu_open(&self) -> bool {
        let expanded = self.doc.attr(self.toggle, "aria-expanded") == Some("true");
        let visible = !self.doc.has_class(&self.panel, "hidden");
        assert_eq!(expanded, visible, "menu attribute and class disagree");
        expanded
    }

    fn invalid(&self, index: usize) -> bool {
        let field = self.fields[index];
        let class = self.doc.has_class(&field, "border-red-400");
        let aria = self.doc.attr(field, "aria-invalid") == Some("true");
        assert_eq!(class, aria);
        class
    }

    fn values(&self) -> Vec<&str> {
        self.fields.iter().map(|f| self.doc.value(*f)).collect()
    }
}

// ---------------------------------------------------------------------------
// Menu
// ---------------------------------------------------------------------------

#[test]
fn menu_round_trip_via_toggle() {
    let mut site = Site::build();
    let mut page = site.boot();
    assert!(!site.menu_open());
    assert!(site.doc.has_class(&site.panel, "md:hidden"));

    assert_eq!(site.click(&mut page, site.toggle), Disposition::Default);
    assert!(site.menu_open());
    assert_eq!(site.doc.active_element(), Some(site.panel_links[0]));

    site.click(&mut page, site.toggle);
    assert!(!site.menu_open());
    assert_eq!(site.doc.active_element(), Some(site.toggle));
    assert!(site.doc.has_class(&site.panel, "md:hidden"));
}

#[test]
fn escape_closes_only_when_open() {
    let mut site = Site::build();
    let mut page = site.boot();
    site.doc.set_active(Some(site.hero_cta));
    assert_eq!(site.key(&mut page, "Escape", false), Disposition::Default);
    assert_eq!(site.doc.active_element(), Some(site.hero_cta));

    site.click(&mut page, site.toggle);
    site.key(&mut page, "Esc", false);
    assert!(!site.menu_open());
    assert_eq!(site.doc.active_element(), Some(site.toggle));
}

#[test]
fn focus_is_trapped_while_open() {
    let mut site = Site::build();
    let mut page = site.boot();
    site.click(&mut page, site.toggle);

    let last = site.dead_panel_link;
    site.doc.set_active(Some(last));
    assert_eq!(site.key(&mut page, "Tab", false), Disposition::PreventDefault);
    assert_eq!(site.doc.active_element(), Some(site.panel_links[0]));

    assert_eq!(site.key(&mut page, "Tab", true), Disposition::PreventDefault);
    assert_eq!(site.doc.active_element(), Some(last));

    site.doc.set_active(Some(site.panel_links[1]));
    assert_eq!(site.key(&mut page, "Tab", false), Disposition::Default);
    assert!(site.menu_open());
}

#[test]
fn outside_click_closes_but_header_clicks_do_not() {
    let mut site = Site::build();
    let mut page = site.boot();
    site.click(&mut page, site.toggle);

    site.click(&mut page, site.logo);
    assert!(site.menu_open());

    site.click(&mut page, site.main);
    assert!(!site.menu_open());
    assert_eq!(site.doc.active_element(), Some(site.toggle));
}

#[test]
fn panel_link_closes_menu_and_lands_on_target() {
    let mut site = Site::build();
    let mut page = site.boot();
    site.click(&mut page, site.toggle);

    let link = site.panel_links[0];
    assert_eq!(site.click(&mut page, link), Disposition::PreventDefault);
    assert!(!site.menu_open());
    assert_eq!(site.doc.active_element(), Some(site.services));
}

#[test]
fn panel_link_without_target_returns_focus_to_toggle() {
    let mut site = Site::build();
    let mut page = site.boot();
    site.click(&mut page, site.toggle);

    assert_eq!(site.click(&mut page, site.dead_panel_link), Disposition::Default);
    assert!(!site.menu_open());
    assert_eq!(site.doc.active_element(), Some(site.toggle));
}

#[test]
fn double_boot_handles_each_click_once() {
    let mut site = Site::build();
    let mut page = site.boot();
    assert_eq!(
        page.on_lifecycle(&mut site.doc, Lifecycle::DomContentLoaded),
        BootStatus::AlreadyBooted
    );
    for expected_open in [true, false, true] {
        site.click(&mut page, site.toggle);
        assert_eq!(site.menu_open(), expected_open);
    }
}

// ---------------------------------------------------------------------------
// Anchors
// ---------------------------------------------------------------------------

#[test]
fn pricing_link_scrolls_and_focuses() {
    let mut site = Site::build();
    let mut page = site.boot();

    assert_eq!(site.click(&mut page, site.hero_cta), Disposition::PreventDefault);
    assert_eq!(site.doc.active_element(), Some(site.pricing));
    let scrolls = site.doc.take_scrolls();
    assert_eq!(scrolls.len(), 1);
    assert_eq!(scrolls[0].node, site.pricing);
    assert_eq!(scrolls[0].behavior, ScrollBehavior::Smooth);

    site.doc.advance(Duration::from_millis(500));
    assert_eq!(site.doc.attr(site.pricing, "tabindex"), None);
}

#[test]
fn missing_link_keeps_default_navigation() {
    let mut site = Site::build();
    let mut page = site.boot();
    assert_eq!(site.click(&mut page, site.missing_link), Disposition::Default);
    assert!(site.doc.take_scrolls().is_empty());
    assert_eq!(site.doc.pending_tasks(), 0);
}

#[test]
fn reduced_motion_scrolls_instantly() {
    let mut site = Site::build();
    site.doc.set_media("(prefers-reduced-motion: reduce)", true);
    let mut page = site.boot();
    site.click(&mut page, site.hero_cta);
    assert_eq!(site.doc.take_scrolls()[0].behavior, ScrollBehavior::Instant);
    assert_eq!(site.doc.attr(site.pricing, "tabindex"), None);
}

#[test]
fn anchors_added_after_boot_are_handled() {
    let mut site = Site::build();
    let mut page = site.boot();
    let late = site.doc.append_with(site.main, "a", &[("href", "#services")]);
    assert_eq!(site.click(&mut page, late), Disposition::PreventDefault);
    assert_eq!(site.doc.active_element(), Some(site.services));
}

// ---------------------------------------------------------------------------
// Contact form
// ---------------------------------------------------------------------------

#[test]
fn accepted_submission() {
    let mut site = Site::build();
    let mut page = site.boot();
    let d = site.submit(
        &mut page,
        ["Ana", "ana@example.com", "Senior cat, arthritis", "Need home visit"],
    );
    assert_eq!(d, Disposition::PreventDefault);
    assert_eq!(site.doc.text(site.feedback), ACCEPTED_MESSAGE);
    assert_eq!(site.doc.class_name(site.feedback), "text-sm text-green-600 mt-2");
    assert_eq!(site.values(), vec!["", "", "", ""]);
}

#[test]
fn rejected_submission_keeps_values() {
    let mut site = Site::build();
    let mut page = site.boot();
    let d = site.submit(&mut page, ["", "bademail", "x", "y"]);
    assert_eq!(d, Disposition::PreventDefault);
    assert!(site.invalid(0));
    assert!(site.invalid(1));
    assert!(!site.invalid(2));
    assert!(!site.invalid(3));
    assert_eq!(site.doc.text(site.feedback), REJECTED_MESSAGE);
    assert_eq!(site.doc.class_name(site.feedback), "text-sm text-red-600 mt-2");
    assert_eq!(site.values(), vec!["", "bademail", "x", "y"]);
}

#[test]
fn email_only_rejection() {
    let mut site = Site::build();
    let mut page = site.boot();
    site.submit(&mut page, ["Ana", "not-an-email", "Dog", "Checkup"]);
    assert_eq!(
        (0..4).map(|i| site.invalid(i)).collect::<Vec<_>>(),
        vec![false, true, false, false]
    );
}

#[test]
fn fix_and_resubmit_clears_markers() {
    let mut site = Site::build();
    let mut page = site.boot();
    site.submit(&mut page, ["", "", "", ""]);
    assert!((0..4).all(|i| site.invalid(i)));

    site.submit(&mut page, ["Ana", "ana@example.com", "Cat", "Hi"]);
    assert!((0..4).all(|i| !site.invalid(i)));
    assert_eq!(site.doc.text(site.feedback), ACCEPTED_MESSAGE);
}

#[test]
fn missing_feedback_region_is_tolerated() {
    let mut site = Site::build();
    site.doc.detach(site.feedback);
    let mut page = site.boot();
    assert_eq!(page.report().map(|r| r.feedback), Some(false));
    let d = site.submit(&mut page, ["Ana", "ana@example.com", "Cat", "Hi"]);
    assert_eq!(d, Disposition::PreventDefault);
    assert_eq!(site.values(), vec!["", "", "", ""]);
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn early_script_waits_for_dom_content_loaded() {
    init_tracing();
    let mut site = Site::build();
    site.doc.set_ready_state(ReadyState::Loading);
    site.doc.install_icons();
    let mut page = Page::new(PageConfig::default());

    assert_eq!(
        page.on_lifecycle(&mut site.doc, Lifecycle::ScriptLoaded),
        BootStatus::Deferred
    );
    assert_eq!(site.doc.icon_refresh_calls(), Some(0));
    assert_eq!(site.click(&mut page, site.hero_cta), Disposition::Default);

    site.doc.set_ready_state(ReadyState::Interactive);
    let status = page.on_lifecycle(&mut site.doc, Lifecycle::DomContentLoaded);
    let BootStatus::Booted(report) = status else {
        panic!("expected boot, got {status:?}");
    };
    assert!(report.menu && report.menu_container && report.form && report.feedback);
    assert!(report.icons_refreshed);
    assert_eq!(site.doc.icon_refresh_calls(), Some(1));

    page.on_lifecycle(&mut site.doc, Lifecycle::ScriptLoaded);
    assert_eq!(site.doc.icon_refresh_calls(), Some(1));
}

#[test]
fn page_without_markup_is_inert() {
    init_tracing();
    let mut doc = MemoryDocument::new();
    let body = doc.body();
    let p = doc.append(body, "p");
    let mut page = Page::new(PageConfig::default());
    page.on_lifecycle(&mut doc, Lifecycle::ScriptLoaded);
    assert!(page.menu().is_none());
    assert!(page.form().is_none());
    assert_eq!(
        page.dispatch(&mut doc, PageEvent::Click { target: p }),
        Disposition::Default
    );
    assert_eq!(doc.attribute(&p, "class"), None);
}
