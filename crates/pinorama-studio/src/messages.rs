//! User-facing strings in the supported languages

/// Display language of the studio
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    En,
    It,
}

impl Locale {
    /// Parse a language tag such as `it`, `it-IT` or `it_IT.UTF-8`
    pub fn from_tag(tag: &str) -> Option<Self> {
        let lang = tag
            .split(['-', '_', '.'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match lang.as_str() {
            "en" => Some(Self::En),
            "it" => Some(Self::It),
            _ => None,
        }
    }

    pub fn messages(self) -> &'static Messages {
        match self {
            Self::En => &EN,
            Self::It => &IT,
        }
    }
}

pub struct Messages {
    pub search_logs: &'static str,
    pub no_logs_found: &'static str,
    pub loading: &'static str,
    pub error_loading: &'static str,
    pub filters: &'static str,
    pub no_facets: &'static str,
    pub columns: &'static str,
    pub details: &'static str,
    pub no_selection: &'static str,
    pub live: &'static str,
    pub refresh: &'static str,
    pub refreshing: &'static str,
    pub clear_filters: &'static str,
    pub help: &'static str,
    pub quit: &'static str,
    pub connected: &'static str,
    pub connecting: &'static str,
    pub disconnected: &'static str,
    pub unreachable: &'static str,
    pub logs: &'static str,
    pub local_time: &'static str,
    pub utc: &'static str,
}

static EN: Messages = Messages {
    search_logs: "Search logs...",
    no_logs_found: "No logs found",
    loading: "Loading...",
    error_loading: "Error loading logs",
    filters: "Filters",
    no_facets: "No facets",
    columns: "Columns",
    details: "Details",
    no_selection: "No row selected",
    live: "Live",
    refresh: "Refresh",
    refreshing: "Refreshing",
    clear_filters: "Clear filters",
    help: "Help",
    quit: "Quit",
    connected: "Connected",
    connecting: "Connecting",
    disconnected: "Disconnected",
    unreachable: "Unreachable",
    logs: "logs",
    local_time: "local",
    utc: "UTC",
};

static IT: Messages = Messages {
    search_logs: "Cerca nei log...",
    no_logs_found: "Nessun log trovato",
    loading: "Caricamento...",
    error_loading: "Errore nel caricamento dei log",
    filters: "Filtri",
    no_facets: "Nessun filtro disponibile",
    columns: "Colonne",
    details: "Dettagli",
    no_selection: "Nessuna riga selezionata",
    live: "Live",
    refresh: "Aggiorna",
    refreshing: "Aggiornamento",
    clear_filters: "Rimuovi filtri",
    help: "Aiuto",
    quit: "Esci",
    connected: "Connesso",
    connecting: "Connessione",
    disconnected: "Disconnesso",
    unreachable: "Non raggiungibile",
    logs: "log",
    local_time: "locale",
    utc: "UTC",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_from_tag() {
        assert_eq!(Locale::from_tag("it"), Some(Locale::It));
        assert_eq!(Locale::from_tag("it_IT.UTF-8"), Some(Locale::It));
        assert_eq!(Locale::from_tag("EN-us"), Some(Locale::En));
        assert_eq!(Locale::from_tag("fr"), None);
        assert_eq!(Locale::from_tag(""), None);
    }

    #[test]
    fn test_messages_are_translated() {
        assert_eq!(Locale::En.messages().no_logs_found, "No logs found");
        assert_eq!(Locale::It.messages().no_logs_found, "Nessun log trovato");
    }
}
