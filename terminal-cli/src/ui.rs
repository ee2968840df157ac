use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, Wrap};
use taixiu_execution::Severity;
use taixiu_types::casino::{format_chips, QUICK_BET_AMOUNTS};
use taixiu_types::{Outcome, Phase, Side};

use crate::app::AppState;
use crate::commands::COMMANDS;

/// Pip rows for a face, three cells wide.
fn pips(face: u8) -> [&'static str; 3] {
    match face {
        1 => ["     ", "  ●  ", "     "],
        2 => ["●    ", "     ", "    ●"],
        3 => ["●    ", "  ●  ", "    ●"],
        4 => ["●   ●", "     ", "●   ●"],
        5 => ["●   ●", "  ●  ", "●   ●"],
        _ => ["●   ●", "●   ●", "●   ●"],
    }
}

pub fn dice_art(faces: [u8; 3]) -> Vec<String> {
    let mut rows = vec![String::new(); 5];
    for face in faces {
        let p = pips(face);
        rows[0].push_str("┌───────┐ ");
        rows[1].push_str(&format!("│ {} │ ", p[0]));
        rows[2].push_str(&format!("│ {} │ ", p[1]));
        rows[3].push_str(&format!("│ {} │ ", p[2]));
        rows[4].push_str("└───────┘ ");
    }
    rows
}

fn side_color(side: Side) -> Color {
    match side {
        Side::Big => Color::Red,
        Side::Small => Color::Blue,
    }
}

pub fn draw_ui(f: &mut ratatui::Frame, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(1), Constraint::Length(3)].as_ref())
        .split(f.area());

    render_status(f, app, chunks[0]);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)].as_ref())
        .split(chunks[1]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(4)].as_ref())
        .split(main_chunks[0]);
    render_table(f, app, left[0]);
    render_history(f, app, left[1]);
    render_log(f, app, main_chunks[1]);
    render_input(f, app, chunks[2]);

    if let Some((notice, _)) = &app.toast {
        let color = match notice.severity {
            Severity::Info => Color::Cyan,
            Severity::Success => Color::Green,
            Severity::Error => Color::Red,
        };
        let width = (notice.message.chars().count() as u16 + 4).min(f.area().width);
        let area = Rect::new(
            f.area().width.saturating_sub(width + 1),
            chunks[1].y,
            width,
            3,
        );
        f.render_widget(Clear, area);
        f.render_widget(
            Paragraph::new(notice.message.as_str())
                .style(Style::default().fg(color))
                .block(Block::default().borders(Borders::ALL)),
            area,
        );
    }
}

fn render_status(f: &mut ratatui::Frame, app: &AppState, area: Rect) {
    let snap = &app.board.snapshot;
    let side = snap
        .selected_side
        .map(|s| s.to_string())
        .unwrap_or_else(|| "—".to_string());
    let status = Paragraph::new(format!(
        "Balance {} | Bet {} | Side {} | {}",
        format_chips(snap.balance),
        format_chips(snap.bet_amount),
        side,
        snap.phase.name(),
    ))
    .style(Style::default().fg(Color::Gray));
    f.render_widget(status, area);

    let quick = QUICK_BET_AMOUNTS
        .iter()
        .enumerate()
        .map(|(i, amt)| {
            let enabled = !matches!(snap.phase, Phase::Rolling) && *amt <= snap.balance;
            if enabled {
                format!("Alt+{} {}", i + 1, format_chips(*amt))
            } else {
                format!("Alt+{} ({})", i + 1, format_chips(*amt))
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    let line = Paragraph::new(format!("{quick}  Alt+5 ½  Alt+6 Max | {}", app.status))
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(
        line,
        Rect {
            x: area.x,
            y: area.y.saturating_add(1),
            width: area.width,
            height: 1,
        },
    );
}

fn render_table(f: &mut ratatui::Frame, app: &AppState, area: Rect) {
    let snap = &app.board.snapshot;
    let faces = app.board.faces;
    let mut lines: Vec<Line> = dice_art(faces.values())
        .into_iter()
        .map(Line::raw)
        .collect();

    let sum = faces.sum();
    let landed = faces.side();
    if snap.phase == Phase::Rolling {
        lines.push(Line::styled("Rolling…", Style::default().fg(Color::Yellow)));
    } else {
        lines.push(Line::from(vec![
            Span::raw(format!("Total {sum} ")),
            Span::styled(
                landed.to_string(),
                Style::default().fg(side_color(landed)).add_modifier(Modifier::BOLD),
            ),
        ]));
    }

    if let Some(last) = &app.board.last {
        let (text, color) = match last.outcome {
            Outcome::Win => (
                format!("Won {} (paid {})", format_chips(last.bet_amount), format_chips(last.payout)),
                Color::Green,
            ),
            Outcome::Lose => (format!("Lost {}", format_chips(last.bet_amount)), Color::Red),
        };
        lines.push(Line::styled(format!("Last: {} {text}", last.dice), Style::default().fg(color)));
    }

    let roll_hint = if snap.can_roll {
        "Enter to roll"
    } else if snap.selected_side.is_none() {
        "/tai or /xiu to pick a side"
    } else {
        "…"
    };
    let board = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Tài Xỉu · {roll_hint}")),
    );
    f.render_widget(board, area);
}

fn render_history(f: &mut ratatui::Frame, app: &AppState, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("History");
    if app.board.history.is_empty() {
        let empty = Paragraph::new("No games played yet. Place your bets and roll the dice!")
            .style(Style::default().fg(Color::Gray))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let rows = app.board.history.iter().map(|r| {
        let outcome_color = match r.outcome {
            Outcome::Win => Color::Green,
            Outcome::Lose => Color::Red,
        };
        let [a, b, c] = r.dice_values.values();
        Row::new(vec![
            Cell::from(r.timestamp.with_timezone(&chrono::Local).format("%H:%M:%S").to_string()),
            Cell::from(format!("{a} {b} {c}")),
            Cell::from(r.sum_total.to_string()),
            Cell::from(r.bet_side.short_name()).style(Style::default().fg(side_color(r.bet_side))),
            Cell::from(format_chips(r.bet_amount)),
            Cell::from(r.outcome.to_string()).style(Style::default().fg(outcome_color)),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Length(9),
            Constraint::Length(6),
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Min(6),
            Constraint::Length(5),
        ],
    )
    .header(
        Row::new(vec!["Time", "Dice", "Sum", "Bet", "Amount", "Result"])
            .style(Style::default().fg(Color::Yellow)),
    )
    .block(block);
    f.render_widget(table, area);
}

fn render_log(f: &mut ratatui::Frame, app: &AppState, area: Rect) {
    let log_lines: Vec<Line> = app
        .logs
        .iter()
        .rev()
        .take((area.height.saturating_sub(2)) as usize)
        .rev()
        .map(|l| Line::raw(l.clone()))
        .collect();
    let log = Paragraph::new(log_lines)
        .block(Block::default().borders(Borders::ALL).title("Log"))
        .wrap(Wrap { trim: true });
    f.render_widget(log, area);
}

fn render_input(f: &mut ratatui::Frame, app: &AppState, area: Rect) {
    let completions = if app.completion.filtered.is_empty() {
        0
    } else {
        (app.completion.filtered.len() as u16).min(6) + 2
    };
    let bottom = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(completions)].as_ref())
        .split(area);

    let input = if app.input.is_empty() && !app.hint.is_empty() {
        Paragraph::new(app.hint.as_str()).style(Style::default().fg(Color::Gray))
    } else {
        Paragraph::new(format!("taixiu $ {}", app.input))
    };
    f.render_widget(Clear, bottom[0]);
    f.render_widget(
        input.block(Block::default().borders(Borders::ALL).title("Input")),
        bottom[0],
    );

    if completions > 0 {
        // Completion list overlays the lower panes.
        let list_area = Rect {
            x: bottom[0].x,
            y: bottom[0].y.saturating_sub(completions),
            width: bottom[0].width.min(60),
            height: completions,
        };
        let items: Vec<ListItem> = app
            .completion
            .filtered
            .iter()
            .map(|&idx| {
                let cmd = &COMMANDS[idx];
                ListItem::new(Line::from(vec![
                    Span::styled(format!("/{}", cmd.name), Style::default().fg(Color::Cyan)),
                    Span::raw("  "),
                    Span::styled(cmd.desc, Style::default().fg(Color::Gray)),
                ]))
            })
            .collect();
        let mut state = ListState::default();
        state.select(Some(app.completion.selected.min(items.len().saturating_sub(1))));
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(app.hint.as_str()))
            .highlight_style(Style::default().fg(Color::Yellow));
        f.render_widget(Clear, list_area);
        f.render_stateful_widget(list, list_area, &mut state);
    }
}
