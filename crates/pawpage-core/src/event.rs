#![forbid(unsafe_code)]

//! Page input events and DOM key normalization.
//!
//! Hosts translate native events into [`PageEvent`] values and hand them to
//! [`crate::page::Page::dispatch`]. The returned [`Disposition`] tells the
//! host whether to cancel the native default action.
//!
//! # Design Notes
//!
//! - Key codes are normalized from the DOM `key` string; `Shift+Tab` is
//!   represented explicitly as [`KeyCode::BackTab`].
//! - `Modifiers` use bitflags so hosts can pass a compact bitset.

use bitflags::bitflags;

bitflags! {
    /// Modifier keys held during a key event.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const SUPER = 0b1000;
    }
}

impl Modifiers {
    /// No modifiers.
    pub const NONE: Self = Self::empty();

    /// Build modifiers from the four DOM `KeyboardEvent` flags.
    #[must_use]
    pub fn from_dom_flags(shift: bool, alt: bool, ctrl: bool, meta: bool) -> Self {
        let mut mods = Self::empty();
        mods.set(Self::SHIFT, shift);
        mods.set(Self::ALT, alt);
        mods.set(Self::CTRL, ctrl);
        mods.set(Self::SUPER, meta);
        mods
    }
}

/// Key codes the page controller reacts to, plus a catch-all.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Escape,
    Tab,
    BackTab,
    Other(Box<str>),
}

/// A keyboard event as seen by the page controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// Normalized key code.
    pub code: KeyCode,
    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Create a key event with no modifiers.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
        }
    }

    /// Attach modifiers.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Build from a DOM `KeyboardEvent.key` value and its modifiers.
    #[must_use]
    pub fn from_dom(dom_key: &str, modifiers: Modifiers) -> Self {
        Self {
            code: normalize_dom_key(dom_key, modifiers),
            modifiers,
        }
    }

    /// Check if Shift modifier is held.
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    /// Ctrl, Alt or Super is held; such chords belong to the browser.
    #[must_use]
    pub const fn has_command_modifier(&self) -> bool {
        self.modifiers
            .intersects(Modifiers::CTRL.union(Modifiers::ALT).union(Modifiers::SUPER))
    }

    /// Forward Tab: no Shift and no command modifier.
    #[must_use]
    pub fn is_tab_forward(&self) -> bool {
        self.code == KeyCode::Tab && !self.shift() && !self.has_command_modifier()
    }

    /// Backward Tab, either reported as `BackTab` or as `Tab` with Shift held.
    /// Chords with a command modifier do not count.
    #[must_use]
    pub fn is_tab_backward(&self) -> bool {
        if self.has_command_modifier() {
            return false;
        }
        match self.code {
            KeyCode::BackTab => true,
            KeyCode::Tab => self.shift(),
            _ => false,
        }
    }
}

/// Normalize a DOM `key` value into a [`KeyCode`].
#[must_use]
pub fn normalize_dom_key(dom_key: &str, mods: Modifiers) -> KeyCode {
    if dom_key == "Tab" && mods.contains(Modifiers::SHIFT) {
        return KeyCode::BackTab;
    }

    let mut chars = dom_key.chars();
    if let Some(first) = chars.next()
        && chars.next().is_none()
    {
        return KeyCode::Char(first);
    }

    match dom_key {
        "Enter" => KeyCode::Enter,
        "Escape" | "Esc" => KeyCode::Escape,
        "Tab" => KeyCode::Tab,
        "Spacebar" => KeyCode::Char(' '),
        other => KeyCode::Other(other.into()),
    }
}

/// An input event delivered to the page.
///
/// `N` is the host's element handle type.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent<N> {
    /// A pointer activation (`click`) on `target`.
    Click { target: N },
    /// A key press anywhere in the document.
    KeyDown(KeyEvent),
    /// A `submit` event fired by `form`.
    Submit { form: N },
}

/// What the host should do with the native event after dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposition {
    /// Let the browser perform its default action.
    #[default]
    Default,
    /// Call `preventDefault()` on the native event.
    PreventDefault,
}

impl Disposition {
    /// Whether the default action should be cancelled.
    #[must_use]
    pub const fn prevents_default(self) -> bool {
        matches!(self, Self::PreventDefault)
    }
}
