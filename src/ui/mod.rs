use std::io::Stdout;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};
use ratatui::Terminal;

use crate::bitbucket::{annotate_statuses, BitbucketClient};
use crate::config::Config;
use crate::types::{FileDiff, PullRequest};

pub mod helpers;
pub mod review;

use helpers::{restore_terminal, setup_terminal};
use review::{DiffStyle, FileDiffList, PrHeader, PrMeta, SectionState};

const CHROME_BG: Color = Color::Rgb(30, 30, 40);

/// Which screen is currently active
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    PrList,
    PrDetail,
}

/// Loading state for async operations
#[derive(Clone, PartialEq, Eq)]
pub enum LoadingState {
    Idle,
    Loading(String),
    Error(String),
}

/// Help display state
#[derive(Clone, Copy, PartialEq, Eq)]
enum HelpMode {
    None,
    PrList,
    PrDetail,
}

/// Application state
pub struct App {
    screen: Screen,
    loading: LoadingState,
    help_mode: HelpMode,
    should_quit: bool,

    config: Config,
    client: BitbucketClient,
    style: DiffStyle,

    // PR list state
    workspace: String,
    repo: String,
    prs: Vec<PullRequest>,
    selected_pr: usize,
    pr_scroll: usize,
    filtered_indices: Vec<usize>,
    search_mode: bool,
    search_query: String,

    // PR detail state
    current_pr: Option<PullRequest>,
    diff_list: Option<FileDiffList>,
    // Height of the diff viewport from the last draw, used to clamp
    // scrolling in key handlers
    detail_viewport: usize,

    // Async receivers for non-blocking operations
    pr_list_receiver: Option<mpsc::Receiver<Result<Vec<PullRequest>, String>>>,
    diff_receiver: Option<mpsc::Receiver<Result<Vec<FileDiff>, String>>>,
}

impl App {
    /// Create app in detail mode (for a direct PR URL)
    pub fn new_detail(
        config: Config,
        client: BitbucketClient,
        pr: PullRequest,
        files: Vec<FileDiff>,
    ) -> Self {
        let style = DiffStyle::from_colors(&config.colors);
        let initial = if config.review.collapse_by_default {
            SectionState::Collapsed
        } else {
            SectionState::Expanded
        };
        let workspace = pr.workspace.clone();
        let repo = pr.repo.clone();
        Self {
            screen: Screen::PrDetail,
            loading: LoadingState::Idle,
            help_mode: HelpMode::None,
            should_quit: false,

            config,
            client,
            style,

            workspace,
            repo,
            prs: Vec::new(),
            selected_pr: 0,
            pr_scroll: 0,
            filtered_indices: Vec::new(),
            search_mode: false,
            search_query: String::new(),

            current_pr: Some(pr),
            diff_list: Some(FileDiffList::new(files, initial, style)),
            detail_viewport: 0,

            pr_list_receiver: None,
            diff_receiver: None,
        }
    }

    /// Create app in PR list mode
    pub fn new_with_prs(
        config: Config,
        client: BitbucketClient,
        workspace: String,
        repo: String,
        mut prs: Vec<PullRequest>,
    ) -> Self {
        // Newest first
        prs.sort_by(|a, b| b.id.cmp(&a.id));
        let count = prs.len();
        let style = DiffStyle::from_colors(&config.colors);
        Self {
            screen: Screen::PrList,
            loading: LoadingState::Idle,
            help_mode: HelpMode::None,
            should_quit: false,

            config,
            client,
            style,

            workspace,
            repo,
            prs,
            selected_pr: 0,
            pr_scroll: 0,
            filtered_indices: (0..count).collect(),
            search_mode: false,
            search_query: String::new(),

            current_pr: None,
            diff_list: None,
            detail_viewport: 0,

            pr_list_receiver: None,
            diff_receiver: None,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;
        let result = self.event_loop(&mut terminal);
        restore_terminal(&mut terminal)?;
        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            // Check for async PR list refresh completion
            if let Some(ref receiver) = self.pr_list_receiver {
                if let Ok(result) = receiver.try_recv() {
                    match result {
                        Ok(mut prs) => {
                            prs.sort_by(|a, b| b.id.cmp(&a.id));
                            let count = prs.len();
                            self.prs = prs;
                            self.filtered_indices = (0..count).collect();
                            self.selected_pr = 0;
                            self.pr_scroll = 0;
                            self.search_query.clear();
                            self.loading = LoadingState::Idle;
                        }
                        Err(e) => {
                            self.loading = LoadingState::Error(e);
                        }
                    }
                    self.pr_list_receiver = None;
                }
            }

            // Check for async diff loading completion
            if let Some(ref receiver) = self.diff_receiver {
                if let Ok(result) = receiver.try_recv() {
                    match result {
                        Ok(files) => {
                            let initial = if self.config.review.collapse_by_default {
                                SectionState::Collapsed
                            } else {
                                SectionState::Expanded
                            };
                            self.diff_list = Some(FileDiffList::new(files, initial, self.style));
                            self.screen = Screen::PrDetail;
                            self.loading = LoadingState::Idle;
                        }
                        Err(e) => {
                            self.loading = LoadingState::Error(e);
                        }
                    }
                    self.diff_receiver = None;
                }
            }

            terminal.draw(|f| self.render(f))?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        // While loading, only allow quit
        if matches!(self.loading, LoadingState::Loading(_)) {
            if key.code == KeyCode::Char('q') || key.code == KeyCode::Esc {
                self.should_quit = true;
            }
            return;
        }

        // Clear error on any key
        if matches!(self.loading, LoadingState::Error(_)) {
            self.loading = LoadingState::Idle;
            return;
        }

        if self.help_mode != HelpMode::None {
            self.help_mode = HelpMode::None;
            return;
        }

        match self.screen {
            Screen::PrList => self.handle_key_pr_list(key),
            Screen::PrDetail => self.handle_key_pr_detail(key),
        }
    }

    fn handle_key_pr_list(&mut self, key: KeyEvent) {
        if self.search_mode {
            match key.code {
                KeyCode::Esc => {
                    self.search_mode = false;
                    self.search_query.clear();
                    self.update_filtered_indices();
                }
                KeyCode::Enter => {
                    self.search_mode = false;
                }
                KeyCode::Backspace => {
                    self.search_query.pop();
                    self.update_filtered_indices();
                }
                KeyCode::Char(c) => {
                    self.search_query.push(c);
                    self.update_filtered_indices();
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc => {
                if !self.search_query.is_empty() {
                    self.search_query.clear();
                    self.update_filtered_indices();
                } else {
                    self.should_quit = true;
                }
            }
            KeyCode::Char('j') | KeyCode::Down => self.select_next_pr(),
            KeyCode::Char('k') | KeyCode::Up => self.select_prev_pr(),
            KeyCode::Char('/') => {
                self.search_mode = true;
                self.search_query.clear();
                self.update_filtered_indices();
            }
            KeyCode::Char('r') | KeyCode::Char('R') => self.refresh_pr_list(),
            KeyCode::Char('o') => self.open_selected_in_browser(),
            KeyCode::Enter | KeyCode::Char('v') => self.open_selected_pr(),
            KeyCode::Char('?') => self.help_mode = HelpMode::PrList,
            _ => {}
        }
    }

    fn handle_key_pr_detail(&mut self, key: KeyEvent) {
        let viewport = self.detail_viewport.max(1);
        let half_page = self.config.navigation.scroll_lines as isize;

        let Some(ref mut list) = self.diff_list else {
            if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                self.back_to_list();
            }
            return;
        };

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.back_to_list(),
            KeyCode::Char('j') | KeyCode::Down => list.scroll_by(1, viewport),
            KeyCode::Char('k') | KeyCode::Up => list.scroll_by(-1, viewport),
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                list.scroll_by(half_page, viewport)
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                list.scroll_by(-half_page, viewport)
            }
            KeyCode::Char('g') => list.scroll_to_top(),
            KeyCode::Char('G') => list.scroll_to_bottom(viewport),
            KeyCode::Char('l') | KeyCode::Right => list.select_next(viewport),
            KeyCode::Char('h') | KeyCode::Left => list.select_prev(viewport),
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('x') => {
                list.toggle_selected(viewport)
            }
            KeyCode::Char('r') | KeyCode::Char('R') => self.reload_current_pr(),
            KeyCode::Char('o') => self.open_current_in_browser(),
            KeyCode::Char('?') => self.help_mode = HelpMode::PrDetail,
            _ => {}
        }
    }

    fn back_to_list(&mut self) {
        if self.prs.is_empty() {
            // Came straight from a PR URL, nothing to go back to
            self.should_quit = true;
        } else {
            self.screen = Screen::PrList;
            self.current_pr = None;
            self.diff_list = None;
        }
    }

    fn update_filtered_indices(&mut self) {
        let query = self.search_query.to_lowercase();
        self.filtered_indices = self
            .prs
            .iter()
            .enumerate()
            .filter(|(_, pr)| {
                query.is_empty()
                    || pr.title.to_lowercase().contains(&query)
                    || pr.author.to_lowercase().contains(&query)
            })
            .map(|(i, _)| i)
            .collect();
        if !self.filtered_indices.contains(&self.selected_pr) {
            self.selected_pr = self.filtered_indices.first().copied().unwrap_or(0);
        }
    }

    fn select_next_pr(&mut self) {
        let pos = self
            .filtered_indices
            .iter()
            .position(|&i| i == self.selected_pr)
            .unwrap_or(0);
        if pos + 1 < self.filtered_indices.len() {
            self.selected_pr = self.filtered_indices[pos + 1];
        }
    }

    fn select_prev_pr(&mut self) {
        let pos = self
            .filtered_indices
            .iter()
            .position(|&i| i == self.selected_pr)
            .unwrap_or(0);
        if pos > 0 {
            self.selected_pr = self.filtered_indices[pos - 1];
        }
    }

    /// The selected PR, or None when the search filter hides everything
    fn current_selected_pr(&self) -> Option<&PullRequest> {
        if !self.filtered_indices.contains(&self.selected_pr) {
            return None;
        }
        self.prs.get(self.selected_pr)
    }

    fn open_selected_in_browser(&self) {
        if let Some(pr) = self.current_selected_pr() {
            open_in_browser(&pr.web_url());
        }
    }

    fn open_current_in_browser(&self) {
        if let Some(ref pr) = self.current_pr {
            open_in_browser(&pr.web_url());
        }
    }

    fn open_selected_pr(&mut self) {
        let Some(pr) = self.current_selected_pr().cloned() else {
            return;
        };
        self.loading = LoadingState::Loading(format!(
            "Loading {}#{} ...",
            pr.repo_full_name(),
            pr.id
        ));
        self.current_pr = Some(pr.clone());
        self.spawn_diff_fetch(pr);
    }

    fn reload_current_pr(&mut self) {
        let Some(pr) = self.current_pr.clone() else {
            return;
        };
        self.loading = LoadingState::Loading(format!(
            "Reloading {}#{} ...",
            pr.repo_full_name(),
            pr.id
        ));
        self.spawn_diff_fetch(pr);
    }

    fn spawn_diff_fetch(&mut self, pr: PullRequest) {
        let pr_info = pr.to_pr_info();
        let client = self.client.clone();
        let (tx, rx) = mpsc::channel();
        self.diff_receiver = Some(rx);

        std::thread::spawn(move || {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let result = rt.block_on(async {
                // Diff is required, the diffstat only refines statuses
                let (diff_result, stat_result) = tokio::join!(
                    client.fetch_diff(&pr_info),
                    client.fetch_diffstat(&pr_info)
                );

                match diff_result {
                    Ok(diff_content) => {
                        let mut files = crate::parser::parse_diff(&diff_content);
                        if let Ok(statuses) = stat_result {
                            annotate_statuses(&mut files, &statuses);
                        }
                        Ok(files)
                    }
                    Err(e) => Err(e.to_string()),
                }
            });

            let _ = tx.send(result);
        });
    }

    fn refresh_pr_list(&mut self) {
        self.loading = LoadingState::Loading(format!(
            "Refreshing open PRs for {}/{} ...",
            self.workspace, self.repo
        ));

        let client = self.client.clone();
        let workspace = self.workspace.clone();
        let repo = self.repo.clone();
        let (tx, rx) = mpsc::channel();
        self.pr_list_receiver = Some(rx);

        std::thread::spawn(move || {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let result = rt.block_on(async {
                client
                    .list_open_prs(&workspace, &repo)
                    .await
                    .map_err(|e| e.to_string())
            });

            let _ = tx.send(result);
        });
    }

    fn render(&mut self, frame: &mut ratatui::Frame) {
        match &self.loading {
            LoadingState::Loading(msg) => {
                let msg = msg.clone();
                self.render_loading(frame, &msg);
                return;
            }
            LoadingState::Error(msg) => {
                let msg = msg.clone();
                self.render_error(frame, &msg);
                return;
            }
            LoadingState::Idle => {}
        }

        match self.screen {
            Screen::PrList => self.render_pr_list(frame),
            Screen::PrDetail => self.render_pr_detail(frame),
        }

        if self.help_mode != HelpMode::None {
            self.render_help(frame);
        }
    }

    fn render_loading(&self, frame: &mut ratatui::Frame, message: &str) {
        let area = frame.area();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let text = Paragraph::new(message)
            .block(block)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow));

        let popup_area = Rect {
            x: area.width / 4,
            y: (area.height / 2).saturating_sub(1),
            width: area.width / 2,
            height: 3,
        };

        frame.render_widget(text, popup_area);
    }

    fn render_error(&self, frame: &mut ratatui::Frame, message: &str) {
        let area = frame.area();
        let block = Block::default()
            .title(" Error ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red));

        let text = Paragraph::new(format!("{}\n\nPress any key to continue", message))
            .block(block)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Red));

        let popup_area = Rect {
            x: area.width / 6,
            y: (area.height / 2).saturating_sub(2),
            width: area.width * 2 / 3,
            height: 5,
        };

        frame.render_widget(text, popup_area);
    }

    fn render_help(&self, frame: &mut ratatui::Frame) {
        let area = frame.area();

        let popup_width = 56.min(area.width.saturating_sub(4));
        let popup_height: u16 = match self.help_mode {
            HelpMode::PrList => 12,
            HelpMode::PrDetail => 16,
            HelpMode::None => return,
        };
        let popup_height = popup_height.min(area.height.saturating_sub(4));

        let popup_area = Rect {
            x: area.x + (area.width - popup_width) / 2,
            y: area.y + (area.height - popup_height) / 2,
            width: popup_width,
            height: popup_height,
        };

        let buf = frame.buffer_mut();
        for y in popup_area.y..popup_area.y + popup_area.height {
            for x in popup_area.x..popup_area.x + popup_area.width {
                buf.set_string(x, y, " ", Style::default().bg(CHROME_BG));
            }
        }

        let block = Block::default()
            .title(" Keyboard Shortcuts (press any key to close) ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner_area = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let commands: Vec<(&str, &str)> = match self.help_mode {
            HelpMode::PrList => vec![
                ("j / ↓", "Move down"),
                ("k / ↑", "Move up"),
                ("Enter", "Open selected PR"),
                ("o", "Open PR in browser"),
                ("/", "Search PRs"),
                ("r", "Refresh PR list"),
                ("Esc", "Clear search or quit"),
                ("q", "Quit"),
                ("?", "Show this help"),
            ],
            HelpMode::PrDetail => vec![
                ("j / ↓", "Scroll down"),
                ("k / ↑", "Scroll up"),
                ("Ctrl+d", "Half page down"),
                ("Ctrl+u", "Half page up"),
                ("g / G", "Go to top / bottom"),
                ("h / ←", "Previous file"),
                ("l / →", "Next file"),
                ("Enter / Space / x", "Collapse/expand file"),
                ("r", "Reload diff"),
                ("o", "Open PR in browser"),
                ("q / Esc", "Back to PR list"),
                ("?", "Show this help"),
            ],
            HelpMode::None => return,
        };

        let buf = frame.buffer_mut();
        let key_style = Style::default()
            .fg(Color::Yellow)
            .bg(CHROME_BG)
            .add_modifier(Modifier::BOLD);
        let desc_style = Style::default().fg(Color::White).bg(CHROME_BG);

        for (i, (key, desc)) in commands.iter().enumerate() {
            if i as u16 >= inner_area.height {
                break;
            }
            let y = inner_area.y + i as u16;

            let key_display = format!("{:>18}  ", key);
            buf.set_string(inner_area.x, y, &key_display, key_style);

            let desc_x = inner_area.x + 20;
            let available = (inner_area.width as usize).saturating_sub(20);
            let desc_truncated: String = desc.chars().take(available).collect();
            buf.set_string(desc_x, y, &desc_truncated, desc_style);
        }
    }

    fn render_pr_list(&mut self, frame: &mut ratatui::Frame) {
        let area = frame.area();
        let buf = frame.buffer_mut();

        // Title bar
        let bar_height = 2;
        let bar_bg = Style::default().bg(CHROME_BG);
        for x in area.x..area.x + area.width {
            buf.set_string(x, area.y, " ", bar_bg);
            buf.set_string(x, area.y + 1, " ", bar_bg);
        }

        let name_style = Style::default()
            .fg(Color::Magenta)
            .bg(CHROME_BG)
            .add_modifier(Modifier::BOLD);
        buf.set_string(area.x + 1, area.y, "bbtui", name_style);

        let title = format!(
            " │ {}/{}  open PRs ({})",
            self.workspace,
            self.repo,
            self.filtered_indices.len()
        );
        buf.set_string(
            area.x + 6,
            area.y,
            &title,
            Style::default().fg(Color::Cyan).bg(CHROME_BG),
        );

        // Search line
        if self.search_mode {
            buf.set_string(
                area.x + 1,
                area.y + 1,
                format!(" /{}_ ", self.search_query),
                Style::default().fg(Color::Yellow).bg(CHROME_BG),
            );
        } else if !self.search_query.is_empty() {
            buf.set_string(
                area.x + 1,
                area.y + 1,
                format!(" search:{} ", self.search_query),
                Style::default().fg(Color::Yellow).bg(CHROME_BG),
            );
        }

        let content_area = Rect {
            x: area.x,
            y: area.y + bar_height,
            width: area.width,
            height: area.height.saturating_sub(bar_height),
        };

        let block = Block::default()
            .borders(Borders::LEFT | Borders::RIGHT | Borders::BOTTOM)
            .border_style(Style::default().fg(Color::Cyan));
        let inner_area = block.inner(content_area);
        frame.render_widget(block, content_area);

        if self.filtered_indices.is_empty() {
            let msg = if self.prs.is_empty() {
                "No open pull requests"
            } else {
                "No PRs match the current search"
            };
            let text = Paragraph::new(msg)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center);
            frame.render_widget(text, inner_area);
            self.render_pr_list_footer(frame, area);
            return;
        }

        let visible_height = inner_area.height.saturating_sub(1) as usize;

        let selected_pos = self
            .filtered_indices
            .iter()
            .position(|&i| i == self.selected_pr)
            .unwrap_or(0);

        // Auto-scroll to keep the selection visible
        let scroll = if selected_pos < self.pr_scroll {
            selected_pos
        } else if visible_height > 0 && selected_pos >= self.pr_scroll + visible_height {
            selected_pos.saturating_sub(visible_height - 1)
        } else {
            self.pr_scroll
        };
        self.pr_scroll = scroll;

        let buf = frame.buffer_mut();
        for (row, &pr_idx) in self
            .filtered_indices
            .iter()
            .skip(scroll)
            .take(visible_height)
            .enumerate()
        {
            let pr = &self.prs[pr_idx];
            let y = inner_area.y + row as u16;
            let is_selected = pr_idx == self.selected_pr;

            let style = if is_selected {
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            for x in inner_area.x..inner_area.x + inner_area.width {
                buf.set_string(x, y, " ", style);
            }

            let mut x = inner_area.x;
            buf.set_string(x, y, "  ", style);
            x += 2;

            let num_str = format!("#{:<5}", pr.id);
            buf.set_string(x, y, &num_str, style.fg(Color::Green));
            x += 6;

            let approvals = pr.approval_count();
            let badge = if approvals > 0 {
                format!("✓{} ", approvals)
            } else {
                String::new()
            };
            buf.set_string(x, y, &badge, style.fg(Color::Green));
            x += badge.chars().count() as u16;

            let trailer = format!("{} · @{} {}", pr.status, pr.author, pr.age());
            let trailer_len = trailer.chars().count() as u16;
            let title_max_width = (inner_area.x + inner_area.width)
                .saturating_sub(x)
                .saturating_sub(trailer_len + 2) as usize;

            let title: String = pr.title.chars().take(title_max_width).collect();
            buf.set_string(x, y, &title, style);

            // Skip the trailer entirely when the terminal is too narrow
            if inner_area.width > trailer_len + 1 {
                let right_x = inner_area.x + inner_area.width - trailer_len - 1;
                buf.set_string(right_x, y, &trailer, style.fg(Color::DarkGray));
            }
        }

        self.render_pr_list_footer(frame, area);

        if self.filtered_indices.len() > visible_height {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None);
            let mut scrollbar_state =
                ScrollbarState::new(self.filtered_indices.len()).position(scroll);
            frame.render_stateful_widget(
                scrollbar,
                content_area.inner(ratatui::layout::Margin {
                    horizontal: 0,
                    vertical: 1,
                }),
                &mut scrollbar_state,
            );
        }
    }

    fn render_pr_list_footer(&self, frame: &mut ratatui::Frame, area: Rect) {
        let buf = frame.buffer_mut();
        let help = " j/k:nav  Enter:view  o:browser  /:search  r:refresh  ?:help  q:quit ";
        let help_y = area.y + area.height - 1;
        buf.set_string(area.x + 1, help_y, help, Style::default().fg(Color::DarkGray));
    }

    fn render_pr_detail(&mut self, frame: &mut ratatui::Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // header bar
                Constraint::Length(8), // meta/description panel
                Constraint::Min(0),    // diff list
                Constraint::Length(1), // key hints
            ])
            .split(area);

        if let Some(ref pr) = self.current_pr {
            frame.render_widget(PrHeader::new(pr, self.style), chunks[0]);
            frame.render_widget(PrMeta::new(pr, self.style), chunks[1]);
        }

        let diff_area = chunks[2];
        // The list draws its own top border; the viewport is what remains
        self.detail_viewport = diff_area.height.saturating_sub(1) as usize;
        if let Some(ref list) = self.diff_list {
            list.render(diff_area, frame.buffer_mut());
        }

        // Selected file name on the right of the key hints
        let current_file = self
            .diff_list
            .as_ref()
            .and_then(|l| l.sections().get(l.selected()))
            .map(|s| s.file.filename().to_string());

        let buf = frame.buffer_mut();
        let help = " j/k:scroll  h/l:file  Enter:fold  g/G:top/bottom  o:browser  ?:help  q:back ";
        buf.set_string(
            chunks[3].x + 1,
            chunks[3].y,
            help,
            Style::default().fg(Color::DarkGray),
        );

        if let Some(name) = current_file {
            let label = format!(" {} ", name);
            let len = label.chars().count() as u16;
            if chunks[3].width > len + 1 {
                buf.set_string(
                    chunks[3].x + chunks[3].width - len - 1,
                    chunks[3].y,
                    label,
                    Style::default().fg(Color::Cyan),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthSettings;
    use ratatui::backend::TestBackend;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.auth = AuthSettings {
            username: "user".to_string(),
            app_password: "secret".to_string(),
        };
        config
    }

    fn sample_pr(id: u32, title: &str, author: &str) -> PullRequest {
        PullRequest {
            id,
            title: title.to_string(),
            author: author.to_string(),
            description: String::new(),
            status: "Open".to_string(),
            branch: "feature/x".to_string(),
            created: "2026-08-01T12:00:00+00:00".to_string(),
            approvals: Vec::new(),
            comment_count: 0,
            reviewers: Vec::new(),
            workspace: "acme".to_string(),
            repo: "widgets".to_string(),
        }
    }

    fn list_app(prs: Vec<PullRequest>) -> App {
        let config = test_config();
        let client = BitbucketClient::new(&config.auth).unwrap();
        App::new_with_prs(
            config,
            client,
            "acme".to_string(),
            "widgets".to_string(),
            prs,
        )
    }

    #[test]
    fn test_search_with_no_matches_selects_nothing() {
        let mut app = list_app(vec![
            sample_pr(1, "alpha", "alice"),
            sample_pr(2, "beta", "bob"),
        ]);

        app.search_query = "zzz".to_string();
        app.update_filtered_indices();

        assert!(app.filtered_indices.is_empty());
        assert!(app.current_selected_pr().is_none());
    }

    #[test]
    fn test_search_match_restores_selection() {
        let mut app = list_app(vec![
            sample_pr(1, "alpha", "alice"),
            sample_pr(2, "beta", "bob"),
        ]);

        app.search_query = "zzz".to_string();
        app.update_filtered_indices();
        assert!(app.current_selected_pr().is_none());

        app.search_query = "alp".to_string();
        app.update_filtered_indices();
        assert_eq!(app.current_selected_pr().map(|p| p.id), Some(1));
    }

    #[test]
    fn test_empty_diff_opens_detail_with_zero_sections() {
        let config = test_config();
        let client = BitbucketClient::new(&config.auth).unwrap();
        let mut app = App::new_detail(config, client, sample_pr(7, "No changes", "carol"), Vec::new());

        assert!(app.screen == Screen::PrDetail);
        assert_eq!(app.diff_list.as_ref().map(|l| l.len()), Some(0));

        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
    }

    #[test]
    fn test_pr_list_renders_in_narrow_terminal() {
        let mut app = list_app(vec![
            sample_pr(1, "a very long pull request title", "a-long-author-name"),
            sample_pr(2, "another one", "bob"),
        ]);

        let backend = TestBackend::new(12, 6);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
    }
}

fn open_in_browser(url: &str) {
    #[cfg(target_os = "macos")]
    let opener = "open";
    #[cfg(not(target_os = "macos"))]
    let opener = "xdg-open";

    let _ = std::process::Command::new(opener)
        .arg(url)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn();
}
