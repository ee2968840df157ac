use std::collections::{HashMap, HashSet};

use anyhow::{anyhow, Result};
use lazy_static::lazy_static;
use taixiu_types::casino::QUICK_BET_AMOUNTS;
use taixiu_types::{QuickBet, Side};

#[derive(Clone)]
pub struct CommandDef {
    pub name: &'static str,
    pub usage: &'static str,
    pub desc: &'static str,
    pub group: &'static str,
}

const fn cmd(name: &'static str, usage: &'static str, desc: &'static str, group: &'static str) -> CommandDef {
    CommandDef { name, usage, desc, group }
}

lazy_static! {
    pub static ref COMMANDS: Vec<CommandDef> = vec![
        // Table
        cmd("bet", "/bet <amount|half|max>", "Set the stake", "Table"),
        cmd("tai", "/tai", "Bet on Tài (Big, 11-18)", "Table"),
        cmd("big", "/big", "Alias of /tai", "Table"),
        cmd("xiu", "/xiu", "Bet on Xỉu (Small, 3-10)", "Table"),
        cmd("small", "/small", "Alias of /xiu", "Table"),
        cmd("roll", "/roll", "Roll the dice (Enter on empty input)", "Table"),
        // Session
        cmd("history", "/history", "Print recent rounds to the log", "Session"),
        cmd("reset", "/reset", "Reset balance and history", "Session"),
        cmd("help", "/help", "Show grouped palette", "Session"),
        cmd("quit", "/quit", "Exit", "Session"),
    ];
    static ref COMPLETIONS: HashSet<String> = COMMANDS.iter().map(|c| format!("/{}", c.name)).collect();
    static ref GROUPS: Vec<&'static str> = {
        let mut g: Vec<_> = COMMANDS.iter().map(|c| c.group).collect();
        g.sort();
        g.dedup();
        g
    };
    pub static ref HINTS: HashMap<String, String> = COMMANDS
        .iter()
        .map(|c| (format!("/{}", c.name), format!("{} — {}", c.usage, c.desc)))
        .collect();
    pub static ref TEMPLATES: HashMap<&'static str, &'static str> = HashMap::from([
        ("bet", "/bet 500 | /bet half | /bet max"),
        ("tai", "/tai then /roll"),
        ("xiu", "/xiu then /roll"),
    ]);
}

#[derive(Debug, PartialEq, Eq)]
pub enum CommandAction {
    /// Typed stake, clamped by the table.
    Bet(String),
    Quick(QuickBet),
    Side(Side),
    Roll,
    Reset,
    History,
    Local(String),
    Quit,
}

/// Quick bet bound to Alt+digit.
pub fn quick_bet_for_key(digit: char) -> Option<QuickBet> {
    let idx = digit.to_digit(10)? as usize;
    match idx {
        1..=4 => QUICK_BET_AMOUNTS.get(idx - 1).copied().map(QuickBet::Amount),
        5 => Some(QuickBet::Half),
        6 => Some(QuickBet::Max),
        _ => None,
    }
}

pub fn handle_line(line: &str) -> Result<CommandAction> {
    if !line.starts_with('/') {
        return Err(anyhow!("Commands start with '/'"));
    }
    let mut parts = line[1..].split_whitespace().map(str::to_string).collect::<Vec<_>>();
    if parts.is_empty() {
        return Ok(CommandAction::Local(String::new()));
    }
    let cmd = parts.remove(0).to_lowercase();
    match cmd.as_str() {
        "quit" | "exit" => Ok(CommandAction::Quit),
        "help" => Ok(CommandAction::Local(render_help())),
        "bet" | "b" => handle_bet(parts),
        "roll" | "r" => Ok(CommandAction::Roll),
        "reset" => Ok(CommandAction::Reset),
        "history" | "h" => Ok(CommandAction::History),
        side => side
            .parse::<Side>()
            .map(CommandAction::Side)
            .map_err(|_| anyhow!("Unknown command /{cmd}")),
    }
}

fn handle_bet(args: Vec<String>) -> Result<CommandAction> {
    let Some(raw) = args.first() else {
        return Err(anyhow!("Usage: /bet <amount|half|max>"));
    };
    // Typed amounts go through the table's clamping; only half/max are quick bets.
    match raw.parse::<QuickBet>() {
        Ok(quick @ (QuickBet::Half | QuickBet::Max)) => Ok(CommandAction::Quick(quick)),
        _ => Ok(CommandAction::Bet(args.join(" "))),
    }
}

pub fn render_help() -> String {
    let mut out = String::new();
    for group in GROUPS.iter() {
        out.push_str(&format!("{group}: "));
        let names: Vec<String> = COMMANDS
            .iter()
            .filter(|c| c.group == *group)
            .map(|c| c.usage.to_string())
            .collect();
        out.push_str(&names.join("  "));
        out.push_str(" | ");
    }
    out.push_str("Alt+1..4 stake 100/500/1000/5000, Alt+5 half, Alt+6 max");
    out
}

/// Complete the command word in `input` to the first matching command.
pub fn autocomplete(input: &str) -> Option<String> {
    let trimmed = input.trim_start();
    let (head, tail) = if let Some(space) = trimmed.find(' ') {
        (&trimmed[..space], Some(&trimmed[space + 1..]))
    } else {
        (trimmed, None)
    };
    let mut matches: Vec<&String> = COMPLETIONS.iter().filter(|c| c.starts_with(head)).collect();
    matches.sort();
    let first = matches.first()?;
    Some(match tail {
        Some(rest) => format!("{first} {rest}"),
        None => first.to_string(),
    })
}

/// Indexes into [`COMMANDS`] whose name starts with the typed word.
pub fn filter_commands(trimmed: &str) -> Vec<usize> {
    if !trimmed.starts_with('/') {
        return Vec::new();
    }
    let needle = trimmed.trim_start_matches('/').to_lowercase();
    COMMANDS
        .iter()
        .enumerate()
        .filter(|(_, cmd)| cmd.name.starts_with(&needle))
        .map(|(idx, _)| idx)
        .collect()
}

/// Hint line for the current input.
pub fn hint_for(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return "Type /help or Tab for completions; Enter rolls".into();
    }
    let first = trimmed.split_whitespace().next().unwrap_or("");
    match HINTS.get(&first.to_lowercase()) {
        Some(h) => {
            let tpl = TEMPLATES
                .get(first.trim_start_matches('/'))
                .copied()
                .unwrap_or("");
            if tpl.is_empty() {
                h.clone()
            } else {
                format!("{h} | {tpl}")
            }
        }
        None => String::new(),
    }
}
