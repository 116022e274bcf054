//! Utility helper functions for the UI module.

use std::io::{self, Stdout};

use anyhow::Result;
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::Terminal;

/// Fill an entire area with a background color
pub fn fill_area(buf: &mut Buffer, area: Rect, color: Color) {
    let style = Style::default().bg(color);
    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            buf.set_string(x, y, " ", style);
        }
    }
}

/// Truncate or pad a string to exactly the given width
pub fn truncate_or_pad(s: &str, width: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() >= width {
        chars[..width].iter().collect()
    } else {
        let mut result: String = chars.into_iter().collect();
        result.push_str(&" ".repeat(width - result.len()));
        result
    }
}

/// Set up the terminal for TUI mode
pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal mode
pub fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    Ok(())
}

/// Format an ISO 8601 timestamp as a relative age (e.g., "2h ago")
pub fn format_relative_time(iso_time: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(iso_time)
        .map(|dt| {
            let now = chrono::Utc::now();
            let diff = now.signed_duration_since(dt);
            if diff.num_hours() < 1 {
                format!("{}m ago", diff.num_minutes())
            } else if diff.num_days() < 1 {
                format!("{}h ago", diff.num_hours())
            } else {
                format!("{}d ago", diff.num_days())
            }
        })
        .unwrap_or_else(|_| iso_time.to_string())
}

/// Character-based text wrapping - breaks at the width boundary.
/// Used for the PR description panel.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut result = Vec::new();

    for line in text.split('\n') {
        if line.is_empty() {
            result.push(String::new());
            continue;
        }

        let expanded = line.replace('\t', "    ");
        let chars: Vec<char> = expanded.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let end = (i + width).min(chars.len());
            result.push(chars[i..end].iter().collect());
            i = end;
        }
    }

    if result.is_empty() {
        result.push(String::new());
    }

    result
}
