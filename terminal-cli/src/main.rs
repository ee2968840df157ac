use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crossterm::event::{Event as CEvent, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use taixiu_execution::{
    DiceRoller, GameRng, KeyValueStore, PersistenceGateway, RoundController, TableConfig,
};
use tokio::select;
use tokio::sync::mpsc;
use tracing::{info, Level};

mod app;
mod commands;
mod config;
mod port;
mod ui;

use app::AppState;
use commands::{autocomplete, handle_line, quick_bet_for_key, CommandAction, COMMANDS};
use config::{default_data_dir, load_config, open_store, save_config, StoreKind};
use port::{ChannelPort, UiEvent};

type Table = RoundController<Box<dyn KeyValueStore>, ChannelPort, GameRng>;

/// Longest the loop sleeps without a timer or key event.
const IDLE_REDRAW: Duration = Duration::from_millis(250);

/// CLI flags (user-provided override persisted config)
#[derive(Parser, Debug)]
#[command(name = "taixiu", about = "Tài Xỉu (Big/Small) dice table in the terminal")]
struct Args {
    /// Where balance and history are kept
    #[arg(long, value_enum)]
    store: Option<StoreKind>,

    /// Directory for the store and log file
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Seed the deciding dice (reproducible sessions)
    #[arg(long)]
    seed: Option<u64>,

    /// Roll animation length in milliseconds
    #[arg(long)]
    roll_ms: Option<u64>,

    /// Cosmetic tick interval in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Log level written to taixiu.log (trace|debug|info|warn|error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut cfg = load_config().unwrap_or_default();

    let store_kind = args.store.or(cfg.store).unwrap_or_default();
    let data_dir = args
        .data_dir
        .clone()
        .or_else(|| cfg.data_dir.clone())
        .unwrap_or_else(default_data_dir);
    let log_level = args
        .log_level
        .clone()
        .or_else(|| cfg.log_level.clone())
        .unwrap_or_else(|| "info".to_string());
    let mut table_config = cfg.table.unwrap_or_default();
    if let Some(roll_ms) = args.roll_ms {
        table_config.roll_duration_ms = roll_ms;
    }
    if let Some(tick_ms) = args.tick_ms {
        table_config.tick_interval_ms = tick_ms;
    }
    table_config.validate().context("invalid table config")?;

    cfg.store = Some(store_kind);
    cfg.data_dir = Some(data_dir.clone());
    cfg.log_level = Some(log_level.clone());
    cfg.table = Some(table_config);
    save_config(&cfg)?;

    // The terminal owns stdout, so logs go to a file in the data dir.
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("create data dir {}", data_dir.display()))?;
    let level: Level = log_level
        .parse()
        .map_err(|_| anyhow!("invalid log level: {log_level}"))?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join("taixiu.log"))
        .context("open log file")?;
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .init();

    let store = open_store(store_kind, &data_dir)?;
    let dice = match args.seed {
        Some(seed) => GameRng::from_seed(seed),
        None => GameRng::from_entropy(),
    };
    info!(store = ?store_kind, data_dir = %data_dir.display(), seed = ?args.seed, "Starting table");

    let (ui_tx, mut ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let mut table: Table = RoundController::new(
        table_config,
        PersistenceGateway::new(store),
        ChannelPort::new(ui_tx),
        dice,
    );
    if let Some(seed) = args.seed {
        // Seeded sessions replay the animation too.
        table = table.with_cosmetic_rng(GameRng::from_seed(seed.wrapping_add(1)));
    }

    // TUI setup
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let status = format!("Store: {store_kind:?} @ {}", data_dir.display());
    let mut app = AppState::new(status);
    let clock = Instant::now();
    let mut events = EventStream::new();

    let result = loop {
        let now = Instant::now();
        while let Ok(event) = ui_rx.try_recv() {
            app.apply(event, now);
        }
        app.expire_toast(now);
        if let Err(e) = terminal.draw(|f| ui::draw_ui(f, &app)) {
            break Err(e.into());
        }

        let now_ms = elapsed_ms(clock);
        let timeout = table
            .next_deadline()
            .map(|due| Duration::from_millis(due.saturating_sub(now_ms)))
            .unwrap_or(IDLE_REDRAW)
            .min(IDLE_REDRAW);

        select! {
            maybe_ev = events.next() => {
                match maybe_ev {
                    Some(Ok(ev)) => match handle_key_event(ev, &mut app, &mut table, elapsed_ms(clock)) {
                        Ok(true) => break Ok(()),
                        Ok(false) => {}
                        Err(e) => break Err(e),
                    },
                    Some(Err(e)) => break Err(e.into()),
                    None => break Ok(()),
                }
            }
            Some(ui_msg) = ui_rx.recv() => {
                app.apply(ui_msg, Instant::now());
            }
            _ = tokio::time::sleep(timeout) => {}
        }
        table.advance(elapsed_ms(clock));
    };

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::cursor::Show
    )?;
    terminal.show_cursor()?;
    info!(balance = table.state().balance, "Table closed");
    result
}

fn elapsed_ms(clock: Instant) -> u64 {
    u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn handle_key_event<S: KeyValueStore, D: DiceRoller>(
    ev: CEvent,
    app: &mut AppState,
    table: &mut RoundController<S, ChannelPort, D>,
    now_ms: u64,
) -> Result<bool> {
    let CEvent::Key(KeyEvent { code, modifiers, kind, .. }) = ev else {
        return Ok(false);
    };
    if kind == KeyEventKind::Release {
        return Ok(false);
    }
    match (code, modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => return Ok(true),
        (KeyCode::Char('d'), KeyModifiers::CONTROL) => return Ok(true),
        (KeyCode::Char(c @ '1'..='9'), m) if m.contains(KeyModifiers::ALT) => {
            if let Some(quick) = quick_bet_for_key(c) {
                // Rejections already reached the UI as notices.
                let _ = table.set_quick_bet(quick);
            }
        }
        (KeyCode::Up, _) => {
            let len = app.completion.filtered.len();
            if len > 0 {
                app.completion.selected = app.completion.selected.saturating_add(len - 1) % len;
            }
        }
        (KeyCode::Down, _) => {
            let len = app.completion.filtered.len();
            if len > 0 {
                app.completion.selected = (app.completion.selected + 1) % len;
            }
        }
        (KeyCode::Tab, _) => {
            if !app.completion.filtered.is_empty() {
                let idx = app.completion.filtered
                    [app.completion.selected.min(app.completion.filtered.len() - 1)];
                app.input = format!("/{} ", COMMANDS[idx].name);
            } else if let Some(completed) = autocomplete(&app.input) {
                app.input = completed;
            }
            app.update_hint();
        }
        (KeyCode::Enter, _) => {
            let line = app.input.trim().to_string();
            app.input.clear();
            if line.is_empty() {
                let _ = table.roll(now_ms);
                app.update_hint();
                return Ok(false);
            }
            match handle_line(&line) {
                Ok(CommandAction::Bet(raw)) => {
                    let _ = table.set_bet_amount(&raw);
                }
                Ok(CommandAction::Quick(quick)) => {
                    let _ = table.set_quick_bet(quick);
                }
                Ok(CommandAction::Side(side)) => {
                    let _ = table.select_side(side);
                }
                Ok(CommandAction::Roll) => {
                    let _ = table.roll(now_ms);
                }
                Ok(CommandAction::Reset) => table.reset(),
                Ok(CommandAction::History) => {
                    for entry in app.history_lines() {
                        app.push_log(entry);
                    }
                }
                Ok(CommandAction::Local(msg)) => {
                    if !msg.is_empty() {
                        app.push_log(msg);
                    }
                }
                Ok(CommandAction::Quit) => return Ok(true),
                Err(e) => app.push_log(format!("⚠️ {e}")),
            }
            app.update_hint();
        }
        (KeyCode::Char(c), _) => {
            app.input.push(c);
            app.update_hint();
        }
        (KeyCode::Backspace, _) => {
            app.input.pop();
            app.update_hint();
        }
        (KeyCode::Esc, _) => {
            app.input.clear();
            app.update_hint();
        }
        _ => {}
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use taixiu_execution::mocks::ScriptedDice;
    use taixiu_execution::MemoryStore;
    use taixiu_types::Outcome;

    type TestTable = RoundController<MemoryStore, ChannelPort, ScriptedDice>;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> CEvent {
        CEvent::Key(KeyEvent::new(code, modifiers))
    }

    fn type_line(app: &mut AppState, table: &mut TestTable, line: &str, now_ms: u64) -> bool {
        for c in line.chars() {
            handle_key_event(key(KeyCode::Char(c), KeyModifiers::NONE), app, table, now_ms).unwrap();
        }
        handle_key_event(key(KeyCode::Enter, KeyModifiers::NONE), app, table, now_ms).unwrap()
    }

    fn table(rolls: &[[u8; 3]]) -> (TestTable, mpsc::UnboundedReceiver<UiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let table = RoundController::new(
            TableConfig::default(),
            PersistenceGateway::new(MemoryStore::default()),
            ChannelPort::new(tx),
            ScriptedDice::new(rolls),
        );
        (table, rx)
    }

    #[test]
    fn test_keyboard_round() {
        let (mut table, mut rx) = table(&[[1, 2, 3]]);
        let mut app = AppState::new(String::new());

        assert!(!type_line(&mut app, &mut table, "/bet 250", 0));
        assert_eq!(table.state().bet_amount, 250);
        type_line(&mut app, &mut table, "/xiu", 0);
        assert!(table.can_roll());

        // Enter on empty input rolls.
        type_line(&mut app, &mut table, "", 10);
        assert_eq!(table.state().balance, 9_750);
        table.advance(10 + table.config().roll_duration_ms);
        assert_eq!(table.history().len(), 1);
        assert_eq!(table.history().latest().unwrap().outcome, Outcome::Win);
        assert_eq!(table.state().balance, 10_250);

        while let Ok(event) = rx.try_recv() {
            app.apply(event, Instant::now());
        }
        assert_eq!(app.board.faces.values(), [1, 2, 3]);
        assert_eq!(app.board.snapshot.balance, 10_250);
        assert!(type_line(&mut app, &mut table, "/quit", 0));
    }

    #[test]
    fn test_alt_digit_quick_bets() {
        let (mut table, _rx) = table(&[]);
        let mut app = AppState::new(String::new());
        handle_key_event(key(KeyCode::Char('3'), KeyModifiers::ALT), &mut app, &mut table, 0).unwrap();
        assert_eq!(table.state().bet_amount, 1_000);
        handle_key_event(key(KeyCode::Char('5'), KeyModifiers::ALT), &mut app, &mut table, 0).unwrap();
        assert_eq!(table.state().bet_amount, 5_000);
        assert!(app.input.is_empty());
    }

    #[test]
    fn test_tab_completes_and_ctrl_c_quits() {
        let (mut table, _rx) = table(&[]);
        let mut app = AppState::new(String::new());
        for c in "/ro".chars() {
            handle_key_event(key(KeyCode::Char(c), KeyModifiers::NONE), &mut app, &mut table, 0).unwrap();
        }
        handle_key_event(key(KeyCode::Tab, KeyModifiers::NONE), &mut app, &mut table, 0).unwrap();
        assert_eq!(app.input, "/roll ");
        assert!(handle_key_event(key(KeyCode::Char('c'), KeyModifiers::CONTROL), &mut app, &mut table, 0).unwrap());
    }

    #[test]
    fn test_unknown_command_logs_warning() {
        let (mut table, _rx) = table(&[]);
        let mut app = AppState::new(String::new());
        type_line(&mut app, &mut table, "/dance", 0);
        assert!(app.logs.last().unwrap().contains("Unknown command /dance"));
    }
}
