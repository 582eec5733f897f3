/// All possible actions in the studio (command pattern)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Quit,
    Render,
    ToggleHelp,
    /// Close the topmost overlay or panel
    Dismiss,
    /// Move focus between the log table and the filters panel
    CycleFocus,

    // Search input
    FocusSearch,
    SearchInput(char),
    SearchBackspace,
    SearchClear,
    ApplySearch,
    CancelSearch,

    // Log table
    SelectNext,
    SelectPrev,
    SelectFirst,
    SelectLast,
    PageDown,
    PageUp,

    // Toolbar
    ToggleFilters,
    ToggleLive,
    Refresh,
    ClearFilters,
    ToggleColumns,
    ToggleDetails,
    ToggleTimeZone,
    ToggleConnection,

    // Filters panel
    FilterUp,
    FilterDown,
    FilterToggleValue,

    // Column visibility popup
    ColumnUp,
    ColumnDown,
    ColumnToggle,

    // Details panel
    DetailsScrollUp,
    DetailsScrollDown,
}
