use crossterm::event::{KeyCode, KeyModifiers};

use crate::translate::{LANGUAGES, Language};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    SetLanguage(Language),
}

#[derive(Clone, Copy, Debug)]
pub struct MenuShortcut {
    pub key: char,
}

impl MenuShortcut {
    const fn new(key: char) -> Self {
        Self { key }
    }

    fn matches(&self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        match code {
            KeyCode::Char(ch) if ch == self.key => modifiers.is_empty(),
            _ => false,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct MenuItem {
    pub label: &'static str,
    pub action: MenuAction,
    pub shortcut: Option<MenuShortcut>,
    pub current: bool,
}

#[derive(Clone, Copy, Debug)]
pub enum MenuEntry {
    Section(&'static str),
    Item(MenuItem),
}

/// Popup listing the target languages, opened with `l`.
pub struct LanguageMenu {
    entries: Vec<MenuEntry>,
    selected_index: usize,
}

impl LanguageMenu {
    pub fn new(current: Language) -> Self {
        let entries = build_language_entries(current);
        let selected_index = entries
            .iter()
            .position(|entry| matches!(entry, MenuEntry::Item(item) if item.current))
            .or_else(|| {
                entries
                    .iter()
                    .position(|entry| matches!(entry, MenuEntry::Item(_)))
            })
            .unwrap_or(0);
        Self {
            entries,
            selected_index,
        }
    }

    pub fn move_selection(&mut self, delta: i32) {
        if self.entries.is_empty() {
            return;
        }

        let len = self.entries.len() as i32;
        let mut idx = self.selected_index as i32;

        for _ in 0..len {
            idx = (idx + delta).rem_euclid(len);
            if matches!(self.entries[idx as usize], MenuEntry::Item(_)) {
                self.selected_index = idx as usize;
                break;
            }
        }
    }

    pub fn current_action(&self) -> Option<MenuAction> {
        match self.entries.get(self.selected_index) {
            Some(MenuEntry::Item(item)) => Some(item.action),
            _ => None,
        }
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn shortcut_action(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Option<MenuAction> {
        for (idx, entry) in self.entries.iter().enumerate() {
            if let MenuEntry::Item(item) = entry {
                if item
                    .shortcut
                    .is_some_and(|shortcut| shortcut.matches(code, modifiers))
                {
                    self.selected_index = idx;
                    return Some(item.action);
                }
            }
        }
        None
    }
}

fn build_language_entries(current: Language) -> Vec<MenuEntry> {
    let mut entries = vec![MenuEntry::Section("Target language")];
    for (idx, language) in LANGUAGES.iter().enumerate() {
        let shortcut = char::from_digit(idx as u32 + 1, 10).map(MenuShortcut::new);
        entries.push(MenuEntry::Item(MenuItem {
            label: language.name,
            action: MenuAction::SetLanguage(*language),
            shortcut,
            current: *language == current,
        }));
    }
    entries
}
