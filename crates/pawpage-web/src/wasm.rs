#![forbid(unsafe_code)]

use std::cell::RefCell;
use std::time::Duration;

use js_sys::{Function, Reflect};
use pawpage_core::event::{KeyEvent, Modifiers, PageEvent};
use pawpage_core::host::{
    Deferred, FOCUSABLE_SELECTOR, IconRefresh, PageHost, ReadyState, ScrollBehavior,
};
use pawpage_core::page::{Lifecycle, Page};
use pawpage_core::selector::Selector;
use tracing::Level;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, Document, Element, Event, HtmlElement, HtmlFormElement,
    HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement, KeyboardEvent,
    ScrollIntoViewOptions, ScrollLogicalPosition, Window,
};

use crate::logging::{self, ConsoleSink};
use crate::{parse_config, status_label};

/// Writes log lines to the devtools console.
struct BrowserConsole;

impl ConsoleSink for BrowserConsole {
    fn write(&self, level: Level, line: &str) {
        let value = JsValue::from_str(line);
        match level {
            Level::ERROR => web_sys::console::error_1(&value),
            Level::WARN => web_sys::console::warn_1(&value),
            Level::INFO => web_sys::console::info_1(&value),
            Level::DEBUG => web_sys::console::debug_1(&value),
            Level::TRACE => web_sys::console::log_1(&value),
        }
    }
}

/// `window.lucide.createIcons`, when the page loaded the icon script.
struct LucideIcons {
    lucide: JsValue,
    create_icons: Function,
}

impl LucideIcons {
    fn detect(window: &Window) -> Option<Self> {
        let lucide = Reflect::get(window, &JsValue::from_str("lucide")).ok()?;
        if !lucide.is_object() {
            return None;
        }
        let create_icons = Reflect::get(&lucide, &JsValue::from_str("createIcons"))
            .ok()?
            .dyn_into::<Function>()
            .ok()?;
        Some(Self {
            lucide,
            create_icons,
        })
    }
}

impl IconRefresh for LucideIcons {
    fn refresh(&mut self) {
        if let Err(err) = self.create_icons.call0(&self.lucide) {
            tracing::warn!(error = ?err, "icon refresh failed");
        }
    }
}

/// [`PageHost`] over the live DOM.
struct WebHost {
    window: Window,
    document: Document,
    /// Looked up again whenever the page asks; the icon script may load
    /// after this module.
    icons: Option<LucideIcons>,
}

impl WebHost {
    fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self {
            window,
            document,
            icons: None,
        })
    }
}

impl PageHost for WebHost {
    type Node = Element;

    fn ready_state(&self) -> ReadyState {
        ReadyState::from_dom(&self.document.ready_state())
    }

    fn query(&self, selector: &Selector) -> Option<Element> {
        self.document.query_selector(selector.as_css()).ok().flatten()
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn closest(&self, node: &Element, selector: &Selector) -> Option<Element> {
        node.closest(selector.as_css()).ok().flatten()
    }

    fn contains(&self, ancestor: &Element, node: &Element) -> bool {
        ancestor.contains(Some(node.as_ref()))
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&mut self, node: &Element, name: &str, value: &str) {
        let _ = node.set_attribute(name, value);
    }

    fn remove_attribute(&mut self, node: &Element, name: &str) {
        let _ = node.remove_attribute(name);
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn add_class(&mut self, node: &Element, class: &str) {
        let _ = node.class_list().add_1(class);
    }

    fn remove_class(&mut self, node: &Element, class: &str) {
        let _ = node.class_list().remove_1(class);
    }

    fn set_class_name(&mut self, node: &Element, class_name: &str) {
        node.set_class_name(class_name);
    }

    fn set_text_content(&mut self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn focusable_within(&self, container: &Element) -> Vec<Element> {
        let Ok(list) = container.query_selector_all(FOCUSABLE_SELECTOR) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn active_element(&self) -> Option<Element> {
        self.document.active_element()
    }

    fn focus(&mut self, node: &Element) {
        if let Some(el) = node.dyn_ref::<HtmlElement>() {
            let _ = el.focus();
        }
    }

    fn scroll_into_view(&mut self, node: &Element, behavior: ScrollBehavior) {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(match behavior {
            ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
            ScrollBehavior::Instant => web_sys::ScrollBehavior::Instant,
        });
        options.set_block(ScrollLogicalPosition::Start);
        node.scroll_into_view_with_scroll_into_view_options(&options);
    }

    fn matches_media(&self, query: &str) -> bool {
        self.window
            .match_media(query)
            .ok()
            .flatten()
            .is_some_and(|list| list.matches())
    }

    fn defer(&mut self, delay: Duration, task: Deferred<Element>) {
        let callback = Closure::once_into_js(move || {
            RUNTIME.with(|slot| match slot.try_borrow_mut() {
                Ok(mut runtime) => match runtime.as_mut() {
                    Some(runtime) => task.run(&mut runtime.host),
                    None => tracing::debug!("deferred task dropped: no runtime"),
                },
                Err(_) => tracing::warn!("deferred task dropped: runtime busy"),
            });
        });
        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        if let Err(err) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), millis)
        {
            tracing::warn!(error = ?err, "setTimeout failed");
        }
    }

    fn form_field(&self, form: &Element, name: &str) -> Option<Element> {
        let selector = Selector::attribute_equals("name", name);
        form.query_selector(selector.as_css()).ok().flatten()
    }

    fn field_value(&self, field: &Element) -> String {
        if let Some(input) = field.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(area) = field.dyn_ref::<HtmlTextAreaElement>() {
            area.value()
        } else if let Some(select) = field.dyn_ref::<HtmlSelectElement>() {
            select.value()
        } else {
            String::new()
        }
    }

    fn reset_form(&mut self, form: &Element) {
        if let Some(form) = form.dyn_ref::<HtmlFormElement>() {
            form.reset();
        }
    }

    fn icon_refresh(&mut self) -> Option<&mut dyn IconRefresh> {
        self.icons = LucideIcons::detect(&self.window);
        self.icons.as_mut().map(|icons| icons as &mut dyn IconRefresh)
    }
}

struct Runtime {
    page: Page<Element>,
    host: WebHost,
}

thread_local! {
    static RUNTIME: RefCell<Option<Runtime>> = const { RefCell::new(None) };
    static LISTENERS: RefCell<Vec<(&'static str, Closure<dyn FnMut(Event)>)>> =
        const { RefCell::new(Vec::new()) };
}

fn js_error(message: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&message.to_string())
}

/// Module entry point: boot with the default configuration.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };
    logging::install(BrowserConsole, level);
    if let Err(err) = boot(None) {
        tracing::warn!(error = ?err, "auto-start failed");
    }
}

/// Boot the page controller. Safe to call any number of times.
///
/// A configuration passed before the page has booted replaces the pending
/// one; once booted, later calls change nothing. Returns `"booted"`,
/// `"deferred"` (waiting for `DOMContentLoaded`) or `"already-booted"`.
#[wasm_bindgen]
pub fn boot(config_json: Option<String>) -> Result<String, JsValue> {
    let override_given = config_json.as_deref().is_some_and(|s| !s.trim().is_empty());
    let config = parse_config(config_json.as_deref()).map_err(js_error)?;
    let host = WebHost::new().ok_or_else(|| js_error("no window or document"))?;
    let document = host.document.clone();

    let status = RUNTIME.with(|slot| {
        let mut slot = slot.try_borrow_mut().map_err(|_| js_error("runtime busy"))?;
        let runtime = match slot.take() {
            Some(runtime) if runtime.page.is_booted() || !override_given => runtime,
            Some(previous) => Runtime {
                page: Page::new(config),
                host: previous.host,
            },
            None => Runtime {
                page: Page::new(config),
                host,
            },
        };
        let runtime = slot.insert(runtime);
        Ok::<_, JsValue>(
            runtime
                .page
                .on_lifecycle(&mut runtime.host, Lifecycle::ScriptLoaded),
        )
    })?;

    bind_listeners(&document)?;
    Ok(status_label(&status).to_string())
}

/// JSON description of what the last boot wired, or `null`.
#[wasm_bindgen(js_name = bootReportJson)]
pub fn boot_report_json() -> String {
    RUNTIME.with(|slot| {
        slot.try_borrow()
            .ok()
            .and_then(|runtime| runtime.as_ref().and_then(|r| r.page.report().copied()))
            .and_then(|report| report.to_json().ok())
            .unwrap_or_else(|| "null".to_string())
    })
}

/// Install the delegated document listeners, each event type at most once.
///
/// A handler is stored as soon as the browser accepts it, so a failure on a
/// later type never frees a closure that is still registered, and a later
/// call retries only the missing types.
fn bind_listeners(document: &Document) -> Result<(), JsValue> {
    for kind in ["click", "keydown", "submit"] {
        listen(document, kind, false, on_event)?;
    }
    listen(document, "DOMContentLoaded", true, |_event: Event| {
        on_content_loaded();
    })
}

fn listen(
    document: &Document,
    kind: &'static str,
    once: bool,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), JsValue> {
    let bound = LISTENERS.with(|l| l.borrow().iter().any(|(k, _)| *k == kind));
    if bound {
        return Ok(());
    }
    let handler = Closure::<dyn FnMut(Event)>::new(handler);
    let options = AddEventListenerOptions::new();
    options.set_once(once);
    document.add_event_listener_with_callback_and_add_event_listener_options(
        kind,
        handler.as_ref().unchecked_ref(),
        &options,
    )?;
    LISTENERS.with(|l| l.borrow_mut().push((kind, handler)));
    tracing::debug!(kind, "document listener bound");
    Ok(())
}

fn on_content_loaded() {
    RUNTIME.with(|slot| {
        if let Ok(mut slot) = slot.try_borrow_mut()
            && let Some(runtime) = slot.as_mut()
        {
            runtime
                .page
                .on_lifecycle(&mut runtime.host, Lifecycle::DomContentLoaded);
        }
    });
}

fn on_event(event: Event) {
    let Some(page_event) = translate(&event) else {
        return;
    };
    let disposition = RUNTIME.with(|slot| {
        let mut slot = slot.try_borrow_mut().ok()?;
        let runtime = slot.as_mut()?;
        Some(runtime.page.dispatch(&mut runtime.host, page_event))
    });
    if disposition.is_some_and(|d| d.prevents_default()) {
        event.prevent_default();
    }
}

fn translate(event: &Event) -> Option<PageEvent<Element>> {
    match event.type_().as_str() {
        "click" => Some(PageEvent::Click {
            target: event_target(event)?,
        }),
        "keydown" => {
            let key = event.dyn_ref::<KeyboardEvent>()?;
            let mods = Modifiers::from_dom_flags(
                key.shift_key(),
                key.alt_key(),
                key.ctrl_key(),
                key.meta_key(),
            );
            Some(PageEvent::KeyDown(KeyEvent::from_dom(&key.key(), mods)))
        }
        "submit" => Some(PageEvent::Submit {
            form: event_target(event)?,
        }),
        _ => None,
    }
}

fn event_target(event: &Event) -> Option<Element> {
    event.target()?.dyn_into::<Element>().ok()
}
