// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// What a transport feeds into the session machine and what it gets back.
//
// The machine never talks to a chat protocol. It consumes `Event`s and
// produces `Reply`s; keyboards are hints the transport renders however it can.

/// One inbound user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// `/start`, with the name to greet the user by.
    Start { display_name: String },
    /// `/help`
    Help,
    /// `/menu`
    Menu,
    /// Free text. Main-menu button presses arrive as their label.
    Text(String),
    /// Inline keyboard press, carrying the button's callback id.
    Callback(String),
    /// An uploaded document.
    File { file_name: String, bytes: Vec<u8> },
}

impl Event {
    /// Short name for logs; never includes user content.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::Help => "help",
            Self::Menu => "menu",
            Self::Text(_) => "text",
            Self::Callback(_) => "callback",
            Self::File { .. } => "file",
        }
    }
}

/// One outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text {
        text: String,
        keyboard: Option<Keyboard>,
    },
    Document {
        bytes: Vec<u8>,
        file_name: String,
        caption: String,
    },
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self::Text {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }

    /// Text of a `Text` reply, `None` for documents.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text),
            Self::Document { .. } => None,
        }
    }
}

/// Callback id of the inline "back" button.
pub const BACK_TO_MAIN: &str = "back_to_main";

/// Keyboards attached to replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyboard {
    /// Persistent reply keyboard with the three top-level buttons.
    Main,
    /// Inline: PDF → Word, Word → PDF, back.
    Convert,
    /// Inline: Cyrillic → Latin, Latin → Cyrillic, back.
    Transliterate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Button {
    pub label: &'static str,
    /// Inline buttons send this id back; reply-keyboard buttons send their label.
    pub callback: Option<&'static str>,
}

impl Button {
    const fn reply(label: &'static str) -> Self {
        Self {
            label,
            callback: None,
        }
    }

    const fn inline(label: &'static str, callback: &'static str) -> Self {
        Self {
            label,
            callback: Some(callback),
        }
    }
}

const BACK: Button = Button::inline("⬅️ Orqaga", BACK_TO_MAIN);

impl Keyboard {
    /// Button layout, row by row.
    pub fn rows(&self) -> Vec<Vec<Button>> {
        match self {
            Self::Main => MenuButton::ALL
                .iter()
                .map(|button| vec![Button::reply(button.label())])
                .collect(),
            Self::Convert => vec![
                vec![
                    Button::inline("PDF → Word", "pdf_to_word"),
                    Button::inline("Word → PDF", "word_to_pdf"),
                ],
                vec![BACK],
            ],
            Self::Transliterate => vec![
                vec![
                    Button::inline("Kril → Lotin", "cyrillic_to_latin"),
                    Button::inline("Lotin → Kril", "latin_to_cyrillic"),
                ],
                vec![BACK],
            ],
        }
    }
}

/// Buttons of the main reply keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuButton {
    Convert,
    PageSelection,
    Transliterate,
}

impl MenuButton {
    pub const ALL: [MenuButton; 3] = [Self::Convert, Self::PageSelection, Self::Transliterate];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Convert => "🔄 Fayllarni o'zgartirish",
            Self::PageSelection => "📄 Betlash",
            Self::Transliterate => "🔤 Almashtirish",
        }
    }

    pub fn from_label(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL.into_iter().find(|button| button.label() == text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hujjat_core::Operation;

    #[test]
    fn inline_callbacks_are_known_operations_or_back() {
        for keyboard in [Keyboard::Convert, Keyboard::Transliterate] {
            for button in keyboard.rows().into_iter().flatten() {
                let id = button.callback.unwrap();
                assert!(id == BACK_TO_MAIN || Operation::from_callback(id).is_some(), "{id}");
            }
        }
    }

    #[test]
    fn main_keyboard_sends_labels() {
        let rows = Keyboard::Main.rows();
        assert_eq!(rows.len(), 3);
        for row in rows {
            assert!(row[0].callback.is_none());
            assert!(MenuButton::from_label(row[0].label).is_some());
        }
    }

    #[test]
    fn menu_labels_match_after_trimming() {
        assert_eq!(MenuButton::from_label(" 📄 Betlash\n"), Some(MenuButton::PageSelection));
        assert_eq!(MenuButton::from_label("Betlash"), None);
    }
}
