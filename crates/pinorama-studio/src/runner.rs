use std::io;
use std::time::Duration;

use indexmap::IndexMap;
use pinorama_client::PinoramaClient;
use pinorama_types::{FacetResult, Introspection};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::app::{handle_action, Action, AppState, Connection, Effect, FetchRequest, Focus};
use crate::config::{KeyBindings, KeyContext};
use crate::format::TimeZoneMode;
use crate::messages::Locale;
use crate::tui::{Event, EventHandler, Tui};
use crate::ui::screens::LogExplorerScreen;

/// Studio settings
#[derive(Clone, Debug, PartialEq)]
pub struct StudioOptions {
    /// Delay between live-mode polls
    pub poll_interval: Duration,
    /// Redraw interval
    pub tick_rate: Duration,
    /// Start in live mode
    pub live: bool,
    pub locale: Locale,
    pub time_zone: TimeZoneMode,
    /// Values fetched per facet
    pub facet_limit: usize,
}

impl Default for StudioOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1500),
            tick_rate: Duration::from_millis(250),
            live: false,
            locale: Locale::En,
            time_zone: TimeZoneMode::Local,
            facet_limit: 20,
        }
    }
}

/// Results of background requests
#[derive(Debug)]
enum InternalAction {
    Connected(Introspection),
    ConnectFailed(String),
    LogsLoaded {
        generation: u64,
        rows: Vec<Value>,
        append: bool,
    },
    LogsFailed {
        generation: u64,
        message: String,
        append: bool,
    },
    FacetsLoaded {
        generation: u64,
        facets: IndexMap<String, FacetResult>,
    },
}

/// Run the studio until the user quits
pub async fn run(client: PinoramaClient, options: StudioOptions) -> io::Result<()> {
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (internal_tx, mut internal_rx) = mpsc::unbounded_channel::<InternalAction>();

    let mut state = AppState::new(client.url(), options.locale);
    state.live = options.live;
    state.facet_limit = options.facet_limit;
    state.ui_state.time_zone = options.time_zone;

    let mut tui = Tui::new()?;
    let mut events = EventHandler::new(options.tick_rate);
    let keybindings = KeyBindings::new();

    let mut poll = tokio::time::interval(options.poll_interval);
    poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(url = %client.url(), "Starting studio");
    spawn_connect(&client, &internal_tx);
    render(&mut tui, &mut state)?;

    loop {
        tokio::select! {
            Some(event) = events.next() => match event {
                Event::Key(key) => {
                    let context = KeyContext::for_state(&state);
                    if let Some(action) = keybindings.get_action(context, &key) {
                        let _ = action_tx.send(action);
                    }
                }
                Event::Paste(text) => {
                    if state.ui_state.focus == Focus::Search {
                        for c in pasted_chars(&text) {
                            let _ = action_tx.send(Action::SearchInput(c));
                        }
                    }
                }
                Event::Tick => {}
                Event::Resize(_, _) => {
                    let _ = action_tx.send(Action::Render);
                }
                Event::Error(e) => state.show_error(e),
            },

            Some(action) = action_rx.recv() => match handle_action(&mut state, action) {
                Some(Effect::Connect) => spawn_connect(&client, &internal_tx),
                Some(Effect::Fetch(request)) => spawn_fetch(&client, &internal_tx, request),
                None => {}
            },

            Some(internal) = internal_rx.recv() => {
                if let Some(request) = apply_internal(&mut state, internal) {
                    spawn_fetch(&client, &internal_tx, request);
                }
            }

            _ = poll.tick() => {
                if let Some(request) = state.poll_request() {
                    spawn_fetch(&client, &internal_tx, request);
                }
            }
        }

        if state.should_quit {
            break;
        }

        render(&mut tui, &mut state)?;
    }

    events.shutdown().await;
    tui.restore()?;
    Ok(())
}

fn render(tui: &mut Tui, state: &mut AppState) -> io::Result<()> {
    tui.terminal()
        .draw(|frame| LogExplorerScreen::render(frame, state))?;
    Ok(())
}

/// Search input characters of pasted text, line breaks folded into spaces
fn pasted_chars(text: &str) -> impl Iterator<Item = char> + '_ {
    text.trim_end_matches(['\r', '\n'])
        .chars()
        .filter(|c| *c != '\r')
        .map(|c| if c == '\n' || c == '\t' { ' ' } else { c })
}

/// Fold a background result into the state; may start the first query
fn apply_internal(state: &mut AppState, internal: InternalAction) -> Option<FetchRequest> {
    match internal {
        InternalAction::Connected(intro) => {
            if state.connection != Connection::Connecting {
                return None;
            }
            tracing::info!(columns = intro.columns.len(), facets = intro.facets.len(), "Connected");
            state.set_introspection(intro);
            state.restart_query()
        }
        InternalAction::ConnectFailed(message) => {
            if state.connection == Connection::Connecting {
                tracing::warn!(error = %message, "Connection failed");
                state.connection_failed(message);
            }
            None
        }
        InternalAction::LogsLoaded {
            generation,
            rows,
            append,
        } => {
            let count = rows.len();
            if state.logs_loaded(generation, rows, append) {
                tracing::debug!(rows = count, append, "Loaded logs");
            } else {
                tracing::debug!(generation, "Dropped stale response");
            }
            None
        }
        InternalAction::LogsFailed {
            generation,
            message,
            append,
        } => {
            tracing::warn!(error = %message, append, "Log query failed");
            state.logs_failed(generation, message, append);
            None
        }
        InternalAction::FacetsLoaded { generation, facets } => {
            state.facets_loaded(generation, facets);
            None
        }
    }
}

fn spawn_connect(client: &PinoramaClient, tx: &mpsc::UnboundedSender<InternalAction>) {
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = match client.introspection().await {
            Ok(intro) => InternalAction::Connected(intro),
            Err(e) => InternalAction::ConnectFailed(e.to_string()),
        };
        let _ = tx.send(result);
    });
}

fn spawn_fetch(
    client: &PinoramaClient,
    tx: &mpsc::UnboundedSender<InternalAction>,
    request: FetchRequest,
) {
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let FetchRequest {
            generation,
            payload,
            append,
            facets,
        } = request;

        let result = match client.search(&payload).await {
            Ok(response) => InternalAction::LogsLoaded {
                generation,
                rows: response.into_documents(),
                append,
            },
            Err(e) => InternalAction::LogsFailed {
                generation,
                message: e.to_string(),
                append,
            },
        };
        if tx.send(result).is_err() {
            return;
        }

        if let Some(facets) = facets {
            match client.search(&facets).await {
                Ok(response) => {
                    let _ = tx.send(InternalAction::FacetsLoaded {
                        generation,
                        facets: response.facets.unwrap_or_default(),
                    });
                }
                Err(e) => tracing::warn!(error = %e, "Facet query failed"),
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use pinorama_client::ClientOptions;
    use pinorama_server::{router, ServerConfig, ServerState};
    use serde_json::json;

    async fn spawn_server() -> PinoramaClient {
        let config = ServerConfig::default();
        let state = Arc::new(ServerState::from_config(&config).unwrap());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(state, &config);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        PinoramaClient::new(ClientOptions {
            url: format!("http://{}", addr),
            max_retries: 0,
            ..Default::default()
        })
        .unwrap()
    }

    async fn next(rx: &mut mpsc::UnboundedReceiver<InternalAction>) -> InternalAction {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn test_connect_fetch_and_poll_against_server() {
        let client = spawn_server().await;
        client
            .bulk(&[
                json!({ "level": 30, "msg": "first", "time": 1 }),
                json!({ "level": 50, "msg": "second", "time": 2 }),
            ])
            .await
            .unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut state = AppState::new(client.url(), Locale::En);
        state.live = true;

        spawn_connect(&client, &tx);
        let request = apply_internal(&mut state, next(&mut rx).await).unwrap();
        assert_eq!(state.connection, Connection::Connected);

        spawn_fetch(&client, &tx, request);
        apply_internal(&mut state, next(&mut rx).await);
        assert_eq!(state.rows.len(), 2);
        assert_eq!(state.rows[0]["msg"], "first");

        // facets arrive after the rows
        apply_internal(&mut state, next(&mut rx).await);
        assert_eq!(state.facets["level"].values.get("50"), Some(&1));

        // live poll only returns newer records
        client
            .bulk(&[json!({ "level": 30, "msg": "third", "time": 3 })])
            .await
            .unwrap();
        let poll = state.poll_request().unwrap();
        spawn_fetch(&client, &tx, poll);
        apply_internal(&mut state, next(&mut rx).await);
        assert_eq!(state.rows.len(), 3);
        assert_eq!(state.rows[2]["msg"], "third");
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = PinoramaClient::new(ClientOptions {
            url: format!("http://{}", addr),
            max_retries: 0,
            ..Default::default()
        })
        .unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut state = AppState::new(client.url(), Locale::En);
        spawn_connect(&client, &tx);
        assert!(apply_internal(&mut state, next(&mut rx).await).is_none());
        assert!(matches!(state.connection, Connection::Unreachable(_)));
    }

    #[test]
    fn test_pasted_chars() {
        let chars: String = pasted_chars("request\r\nfailed\n").collect();
        assert_eq!(chars, "request failed");
    }

    #[test]
    fn test_connect_result_ignored_after_disconnect() {
        let mut state = AppState::new("http://127.0.0.1:6200", Locale::En);
        state.disconnect();
        let intro = Introspection::default();
        assert!(apply_internal(&mut state, InternalAction::Connected(intro)).is_none());
        assert_eq!(state.connection, Connection::Disconnected);
    }
}
