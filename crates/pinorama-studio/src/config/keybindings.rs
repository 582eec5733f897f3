use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

use crate::app::{Action, AppState, Focus};

/// A key combination
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub fn shift(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::SHIFT,
        }
    }

    pub fn from_event(event: &KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event.modifiers,
        }
    }
}

/// Context for keybindings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyContext {
    Global,
    LogExplorer,
    SearchInput,
    FilterPanel,
    ColumnToggle,
}

impl KeyContext {
    /// Context receiving keys in the given state
    pub fn for_state(state: &AppState) -> Self {
        if state.ui_state.columns_visible {
            Self::ColumnToggle
        } else {
            match state.ui_state.focus {
                Focus::Search => Self::SearchInput,
                Focus::Filters => Self::FilterPanel,
                Focus::Logs => Self::LogExplorer,
            }
        }
    }
}

/// Keybinding configuration
pub struct KeyBindings {
    bindings: HashMap<KeyContext, HashMap<KeyBinding, Action>>,
}

impl KeyBindings {
    pub fn new() -> Self {
        let mut bindings = HashMap::new();

        // Global bindings: toolbar hotkeys
        let mut global = HashMap::new();
        global.insert(KeyBinding::new(KeyCode::Char('?')), Action::ToggleHelp);
        global.insert(KeyBinding::new(KeyCode::Esc), Action::Dismiss);
        global.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        global.insert(KeyBinding::new(KeyCode::Char('q')), Action::Quit);
        global.insert(KeyBinding::new(KeyCode::Tab), Action::CycleFocus);
        global.insert(KeyBinding::new(KeyCode::Char('/')), Action::FocusSearch);
        global.insert(KeyBinding::new(KeyCode::Char('f')), Action::ToggleFilters);
        global.insert(KeyBinding::new(KeyCode::Char('l')), Action::ToggleLive);
        global.insert(KeyBinding::new(KeyCode::Char('r')), Action::Refresh);
        global.insert(KeyBinding::new(KeyCode::Char('x')), Action::ClearFilters);
        global.insert(KeyBinding::new(KeyCode::Char('c')), Action::ToggleColumns);
        global.insert(KeyBinding::new(KeyCode::Char('d')), Action::ToggleDetails);
        global.insert(KeyBinding::new(KeyCode::Char('t')), Action::ToggleTimeZone);
        global.insert(KeyBinding::new(KeyCode::Char('o')), Action::ToggleConnection);
        bindings.insert(KeyContext::Global, global);

        // Log table - less-like navigation
        let mut explorer = HashMap::new();
        explorer.insert(KeyBinding::new(KeyCode::Char('j')), Action::SelectNext);
        explorer.insert(KeyBinding::new(KeyCode::Down), Action::SelectNext);
        explorer.insert(KeyBinding::new(KeyCode::Char('k')), Action::SelectPrev);
        explorer.insert(KeyBinding::new(KeyCode::Up), Action::SelectPrev);
        explorer.insert(KeyBinding::ctrl(KeyCode::Char('d')), Action::PageDown);
        explorer.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::PageUp);
        explorer.insert(KeyBinding::new(KeyCode::PageDown), Action::PageDown);
        explorer.insert(KeyBinding::new(KeyCode::PageUp), Action::PageUp);
        explorer.insert(KeyBinding::new(KeyCode::Char('g')), Action::SelectFirst);
        explorer.insert(KeyBinding::shift(KeyCode::Char('G')), Action::SelectLast);
        explorer.insert(KeyBinding::new(KeyCode::Home), Action::SelectFirst);
        explorer.insert(KeyBinding::new(KeyCode::End), Action::SelectLast);
        explorer.insert(KeyBinding::new(KeyCode::Enter), Action::ToggleDetails);
        explorer.insert(KeyBinding::shift(KeyCode::Char('J')), Action::DetailsScrollDown);
        explorer.insert(KeyBinding::shift(KeyCode::Char('K')), Action::DetailsScrollUp);
        bindings.insert(KeyContext::LogExplorer, explorer);

        // Filters panel
        let mut filters = HashMap::new();
        filters.insert(KeyBinding::new(KeyCode::Char('j')), Action::FilterDown);
        filters.insert(KeyBinding::new(KeyCode::Down), Action::FilterDown);
        filters.insert(KeyBinding::new(KeyCode::Char('k')), Action::FilterUp);
        filters.insert(KeyBinding::new(KeyCode::Up), Action::FilterUp);
        filters.insert(KeyBinding::new(KeyCode::Enter), Action::FilterToggleValue);
        filters.insert(KeyBinding::new(KeyCode::Char(' ')), Action::FilterToggleValue);
        bindings.insert(KeyContext::FilterPanel, filters);

        // Column visibility popup
        let mut columns = HashMap::new();
        columns.insert(KeyBinding::new(KeyCode::Char('j')), Action::ColumnDown);
        columns.insert(KeyBinding::new(KeyCode::Down), Action::ColumnDown);
        columns.insert(KeyBinding::new(KeyCode::Char('k')), Action::ColumnUp);
        columns.insert(KeyBinding::new(KeyCode::Up), Action::ColumnUp);
        columns.insert(KeyBinding::new(KeyCode::Enter), Action::ColumnToggle);
        columns.insert(KeyBinding::new(KeyCode::Char(' ')), Action::ColumnToggle);
        bindings.insert(KeyContext::ColumnToggle, columns);

        // Search input (when the search bar is focused)
        let mut search = HashMap::new();
        search.insert(KeyBinding::new(KeyCode::Enter), Action::ApplySearch);
        search.insert(KeyBinding::new(KeyCode::Esc), Action::CancelSearch);
        search.insert(KeyBinding::new(KeyCode::Backspace), Action::SearchBackspace);
        search.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::SearchClear);
        search.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::CancelSearch);
        bindings.insert(KeyContext::SearchInput, search);

        Self { bindings }
    }

    /// Look up action for key event in given context
    pub fn get_action(&self, context: KeyContext, key: &KeyEvent) -> Option<Action> {
        if context == KeyContext::SearchInput {
            return self.get_search_input_action(key);
        }

        let binding = KeyBinding::from_event(key);

        // First check context-specific bindings
        if let Some(action) = self
            .bindings
            .get(&context)
            .and_then(|context_bindings| context_bindings.get(&binding))
        {
            return Some(action.clone());
        }

        // Fall back to global bindings
        self.bindings
            .get(&KeyContext::Global)?
            .get(&binding)
            .cloned()
    }

    /// Handle key event in search input mode
    /// Returns Some(Action) for special keys, SearchInput for regular characters
    pub fn get_search_input_action(&self, key: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        if let Some(action) = self
            .bindings
            .get(&KeyContext::SearchInput)
            .and_then(|search| search.get(&binding))
        {
            return Some(action.clone());
        }

        if let KeyCode::Char(c) = key.code {
            if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                return Some(Action::SearchInput(c));
            }
        }

        None
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}
