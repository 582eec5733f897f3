use super::{Action, AppState, Connection, FetchRequest};

/// Side effect requested by an action, carried out by the runner
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Load the introspection, then start the query
    Connect,
    Fetch(FetchRequest),
}

/// Apply an action to the state
pub fn handle_action(state: &mut AppState, action: Action) -> Option<Effect> {
    match action {
        Action::Quit => {
            state.should_quit = true;
            None
        }
        Action::Render => None,
        Action::ToggleHelp => {
            state.ui_state.help_visible = !state.ui_state.help_visible;
            None
        }
        Action::Dismiss => {
            state.dismiss();
            None
        }
        Action::CycleFocus => {
            state.cycle_focus();
            None
        }

        // Search input
        Action::FocusSearch => {
            state.start_search();
            None
        }
        Action::SearchInput(c) => {
            state.ui_state.search_input.push(c);
            None
        }
        Action::SearchBackspace => {
            state.ui_state.search_input.pop();
            None
        }
        Action::SearchClear => {
            state.ui_state.search_input.clear();
            None
        }
        Action::ApplySearch => {
            if state.apply_search() {
                state.restart_query().map(Effect::Fetch)
            } else {
                None
            }
        }
        Action::CancelSearch => {
            state.cancel_search();
            None
        }

        // Log table
        Action::SelectNext => {
            state.select_next();
            None
        }
        Action::SelectPrev => {
            state.select_prev();
            None
        }
        Action::SelectFirst => {
            state.select(Some(0));
            None
        }
        Action::SelectLast => {
            state.select_last();
            None
        }
        Action::PageDown => {
            state.page_down();
            None
        }
        Action::PageUp => {
            state.page_up();
            None
        }

        // Toolbar
        Action::ToggleFilters => {
            state.toggle_filters();
            None
        }
        Action::ToggleLive => {
            state.live = !state.live;
            tracing::debug!(live = state.live, "Toggled live mode");
            state.restart_query().map(Effect::Fetch)
        }
        Action::Refresh => match state.connection {
            Connection::Connected => state.refetch().map(Effect::Fetch),
            Connection::Connecting => None,
            Connection::Disconnected | Connection::Unreachable(_) => {
                state.connect();
                Some(Effect::Connect)
            }
        },
        Action::ClearFilters => {
            if state.clear_filters() {
                state.restart_query().map(Effect::Fetch)
            } else {
                None
            }
        }
        Action::ToggleColumns => {
            state.ui_state.columns_visible = !state.ui_state.columns_visible;
            None
        }
        Action::ToggleDetails => {
            state.ui_state.details_visible = !state.ui_state.details_visible;
            None
        }
        Action::ToggleTimeZone => {
            state.ui_state.time_zone = state.ui_state.time_zone.toggle();
            None
        }
        Action::ToggleConnection => match state.connection {
            Connection::Disconnected => {
                state.connect();
                Some(Effect::Connect)
            }
            _ => {
                state.disconnect();
                None
            }
        },

        // Filters panel
        Action::FilterUp => {
            state.filter_up();
            None
        }
        Action::FilterDown => {
            state.filter_down();
            None
        }
        Action::FilterToggleValue => {
            if state.toggle_filter_at_cursor() {
                state.restart_query().map(Effect::Fetch)
            } else {
                None
            }
        }

        // Column visibility popup
        Action::ColumnUp => {
            state.column_up();
            None
        }
        Action::ColumnDown => {
            state.column_down();
            None
        }
        Action::ColumnToggle => {
            state.toggle_column_at_cursor();
            None
        }

        // Details panel
        Action::DetailsScrollUp => {
            state.ui_state.details_scroll = state.ui_state.details_scroll.saturating_sub(1);
            None
        }
        Action::DetailsScrollDown => {
            state.ui_state.details_scroll = state.ui_state.details_scroll.saturating_add(1);
            None
        }
    }
}
