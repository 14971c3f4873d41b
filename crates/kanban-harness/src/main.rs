#![forbid(unsafe_code)]

//! Keyboard-only kanban board in the terminal.
//!
//! Arrows move focus; Space/Enter picks a card up and drops it; arrows move
//! a held card, Home/End jump to the top or bottom of a column; Escape
//! cancels; `r` reloads from the store; `q` quits.
//!
//! Environment:
//!
//! - `KANBAN_HARNESS_REPLAY_SCRIPT`: replay a JSON script and exit
//!   (status 2 on failure).
//! - `KANBAN_HARNESS_STORE`: JSON board file; created with demo cards if
//!   missing. Without it the board lives in memory.
//! - `KANBAN_HARNESS_LOG`: log filter (`RUST_LOG` wins), default `warn`.
//! - `KANBAN_HARNESS_LOG_JSON`: log as JSON lines.
//! - `KANBAN_DND_*`: engine settings, see `DndConfig::from_env`.

use std::collections::HashMap;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use crossterm::{cursor, execute, terminal};
use kanban_core::event::{Event, KeyCode, Modifiers};
use kanban_core::id::ItemId;
use kanban_dnd::{
    AdapterContext, Board, DndConfig, DragReport, DropOutcome, InputAdapter, KeyboardAdapter,
    MoveEngine,
};
use kanban_harness::{StackedLayout, fixture, script};
use kanban_sync::{FileStore, Item, MemoryStore, PersistenceSync, SyncConfig, SyncEvent, TaskStore};

fn env_flag(name: &str) -> Option<bool> {
    let value = std::env::var(name).ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let enabled = matches!(
        trimmed,
        "1" | "true" | "TRUE" | "True" | "yes" | "YES" | "on" | "ON"
    );
    Some(enabled)
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(feature = "tracing-json")]
fn init_logging() {
    use kanban_core::logging::{LogFormat, init_subscriber};

    let format = if env_flag("KANBAN_HARNESS_LOG_JSON").unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    let filter = env_string("KANBAN_HARNESS_LOG").unwrap_or_else(|| "warn".to_string());
    init_subscriber(&filter, format);
}

#[cfg(not(feature = "tracing-json"))]
fn init_logging() {
    let _ = env_flag("KANBAN_HARNESS_LOG_JSON");
}

fn open_store() -> io::Result<Arc<dyn TaskStore>> {
    let Some(path) = env_string("KANBAN_HARNESS_STORE") else {
        return Ok(Arc::new(MemoryStore::with_items(fixture::demo_items())));
    };
    let store = FileStore::new(&path);
    if !Path::new(&path).exists() {
        store.seed(&fixture::demo_items()).map_err(io::Error::other)?;
    }
    Ok(Arc::new(store))
}

/// Leaves raw mode on every exit path.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

struct Driver {
    engine: MoveEngine,
    store: Arc<dyn TaskStore>,
    adapter: KeyboardAdapter,
    layout: StackedLayout,
    titles: HashMap<ItemId, String>,
    status: String,
}

impl Driver {
    fn new(store: Arc<dyn TaskStore>, config: DndConfig) -> io::Result<Self> {
        let items = store.list_items().map_err(io::Error::other)?;
        let titles = titles_of(&items);
        let board = Board::from_items(&fixture::demo_columns(), items);
        let sync = PersistenceSync::start(store.clone(), SyncConfig::default())
            .map_err(io::Error::other)?;
        let mut adapter = KeyboardAdapter::new();
        if let Some(first) = board.item_ids().next() {
            adapter.set_focus(first.clone());
        }
        Ok(Self {
            engine: MoveEngine::new(board, config).with_sync(sync),
            store,
            adapter,
            layout: StackedLayout::default(),
            titles,
            status: format!("store: {}", store_label()),
        })
    }

    /// Feed one event. Returns `false` to quit.
    fn handle(&mut self, event: &Event) -> bool {
        if let Event::Key(key) = event
            && key.is_actionable()
            && !self.adapter.is_dragging()
        {
            if key.is_char('q') || (key.is_char('c') && key.modifiers.contains(Modifiers::CTRL)) {
                return false;
            }
            if key.is_char('r') {
                self.reload();
                return true;
            }
        }

        self.dispatch(event);
        if matches!(event, Event::Key(key) if key.code != KeyCode::Escape) {
            // The board was redrawn; let a pending relocation settle.
            self.dispatch(&Event::Tick);
        }
        self.collect_sync_events();
        true
    }

    fn dispatch(&mut self, event: &Event) {
        let registry = self.layout.registry(self.engine.board());
        let ctx = AdapterContext::new(self.engine.board(), &registry);
        let Some(drag) = self.adapter.handle(event, ctx) else {
            return;
        };
        match self.engine.apply(&drag) {
            Ok(DragReport::Started) => self.status = "holding; arrows move, Space drops".into(),
            Ok(DragReport::Dropped(outcome)) => self.status = describe(&outcome),
            Ok(DragReport::Cancelled) => self.status = "cancelled".into(),
            Ok(DragReport::Over(_) | DragReport::Settled(_)) => {}
            Err(e) => {
                self.adapter.reset();
                self.status = format!("rejected: {e}");
            }
        }
    }

    fn reload(&mut self) {
        if let Some(sync) = self.engine.sync() {
            sync.flush();
        }
        self.collect_sync_events();
        match self.store.list_items() {
            Ok(items) => {
                self.titles = titles_of(&items);
                self.status = match self.engine.reload(items) {
                    Ok(()) => "reloaded".into(),
                    Err(e) => format!("reload failed: {e}"),
                };
            }
            Err(e) => self.status = format!("reload failed: {e}"),
        }
    }

    fn collect_sync_events(&mut self) {
        for event in self.engine.drain_sync_events() {
            if let SyncEvent::Failed { item, error, .. } = event {
                self.status = format!("saving {item} failed: {error} (press r to reload)");
            }
        }
    }

    fn render(&self) -> String {
        let board = self.engine.board();
        let focus = self.adapter.focus();
        let cursor = self.adapter.cursor();
        let mut lines = Vec::new();
        for (ci, column) in board.columns().iter().enumerate() {
            lines.push(format!("{} ({})", column.name(), column.len()));
            for (ii, item) in column.items().iter().enumerate() {
                let marker = if cursor == Some((ci, ii)) {
                    "=>"
                } else if focus == Some(item) {
                    if self.adapter.is_dragging() { "**" } else { " >" }
                } else {
                    "  "
                };
                let title = self.titles.get(item).map_or("", String::as_str);
                lines.push(format!("{marker} {item}  {title}"));
            }
            if cursor.is_some_and(|(c, slot)| c == ci && slot >= column.len()) {
                lines.push("=> (end)".to_string());
            }
            lines.push(String::new());
        }
        lines.push(self.status.clone());
        lines.push("arrows/home/end: move  space/enter: pick up/drop  esc: cancel  r: reload  q: quit".into());
        lines.join("\r\n")
    }
}

fn titles_of(items: &[Item]) -> HashMap<ItemId, String> {
    items
        .iter()
        .filter_map(|item| {
            let title = item.attributes.get("title")?.as_str()?;
            Some((item.id.clone(), title.to_string()))
        })
        .collect()
}

fn describe(outcome: &DropOutcome) -> String {
    match outcome {
        DropOutcome::Committed(commit) => format!(
            "moved {} from {} to {} #{}",
            commit.item, commit.from, commit.to, commit.index
        ),
        DropOutcome::Unchanged => "dropped in place".into(),
        DropOutcome::Aborted => "no target; restored".into(),
        DropOutcome::ColumnsReordered { column, to, .. } => {
            format!("column {column} moved to #{to}")
        }
    }
}

fn store_label() -> String {
    env_string("KANBAN_HARNESS_STORE").unwrap_or_else(|| "memory".to_string())
}

fn run_interactive() -> io::Result<()> {
    let store = open_store()?;
    let mut driver = Driver::new(store, DndConfig::from_env())?;
    let mut out = io::stdout();
    let _raw = RawModeGuard::enable()?;

    loop {
        execute!(
            out,
            terminal::Clear(terminal::ClearType::All),
            cursor::MoveTo(0, 0)
        )?;
        write!(out, "{}\r\n", driver.render())?;
        out.flush()?;

        let Some(event) = Event::from_crossterm(crossterm::event::read()?) else {
            continue;
        };
        if !driver.handle(&event) {
            break;
        }
    }

    if let Some(sync) = driver.engine.sync() {
        sync.flush();
    }
    Ok(())
}

fn main() -> io::Result<()> {
    init_logging();

    if let Some(script_path) = env_string("KANBAN_HARNESS_REPLAY_SCRIPT") {
        match script::replay_file(Path::new(&script_path)) {
            Ok(summary) => {
                eprintln!(
                    "script replay OK: events={} rejected={} commits={} persisted={} failed={}",
                    summary.events,
                    summary.rejected,
                    summary.commits,
                    summary.persisted.len(),
                    summary.failed
                );
                println!("{}", kanban_harness::board_to_text(&summary.board));
                return Ok(());
            }
            Err(err) => {
                eprintln!("script replay failed: {err}");
                std::process::exit(2);
            }
        }
    }

    run_interactive()
}
