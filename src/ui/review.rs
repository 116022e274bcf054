//! Review screen widgets: PR header, metadata panel, and the scrollable
//! list of per-file collapsible diff sections.
//!
//! Every widget takes its style explicitly at construction; nothing here
//! consults global state. Collapse is an explicit state with section
//! height a pure function of it, so the container's total height is
//! always the sum of its sections' current heights.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{
    Block, Borders, Padding, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
    StatefulWidget, Widget,
};

use crate::config::{DiffColors, RgbColor};
use crate::types::{DiffLine, FileDiff, LineKind, PullRequest};
use crate::ui::helpers::{fill_area, format_relative_time, truncate_or_pad, wrap_text};

/// Width of the line-number gutter: old (5) + space + new (5) + space
const GUTTER_WIDTH: usize = 12;

/// Explicit per-component style configuration, built once from config
/// colors and passed to each widget at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffStyle {
    pub add_bg: Color,
    pub del_bg: Color,
    pub info_bg: Color,
    pub base_bg: Color,
    pub header_bg: Color,
    pub accent: Color,
    pub text_fg: Color,
    pub muted_fg: Color,
}

impl DiffStyle {
    pub fn from_colors(colors: &DiffColors) -> Self {
        let rgb = |c: RgbColor| Color::Rgb(c.r, c.g, c.b);
        Self {
            add_bg: rgb(colors.add_bg),
            del_bg: rgb(colors.del_bg),
            info_bg: rgb(colors.info_bg),
            base_bg: rgb(colors.base_bg),
            header_bg: Color::Rgb(30, 30, 40),
            accent: rgb(colors.accent),
            text_fg: Color::White,
            muted_fg: Color::DarkGray,
        }
    }

    /// Background tint for a diff line kind
    pub fn line_bg(&self, kind: LineKind) -> Color {
        match kind {
            LineKind::Add => self.add_bg,
            LineKind::Del => self.del_bg,
            LineKind::Info => self.info_bg,
        }
    }

    /// Foreground for a diff line kind; Info lines are muted
    pub fn line_fg(&self, kind: LineKind) -> Color {
        match kind {
            LineKind::Add | LineKind::Del => self.text_fg,
            LineKind::Info => Color::Gray,
        }
    }
}

impl Default for DiffStyle {
    fn default() -> Self {
        Self::from_colors(&DiffColors::default())
    }
}

/// Expand/collapse state of one file section. Mutated only by a user
/// toggle; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionState {
    Expanded,
    Collapsed,
}

impl SectionState {
    pub fn toggle(self) -> Self {
        match self {
            SectionState::Expanded => SectionState::Collapsed,
            SectionState::Collapsed => SectionState::Expanded,
        }
    }

    pub fn is_expanded(self) -> bool {
        self == SectionState::Expanded
    }
}

/// Renders an ordered window of diff lines, one row per line, left
/// aligned, no padding. Scrolling belongs to the parent container; this
/// widget just skips the rows above the window.
pub struct DiffContent<'a> {
    lines: &'a [DiffLine],
    style: DiffStyle,
    skip: usize,
}

impl<'a> DiffContent<'a> {
    pub fn new(lines: &'a [DiffLine], style: DiffStyle) -> Self {
        Self {
            lines,
            style,
            skip: 0,
        }
    }

    pub fn skip(mut self, skip: usize) -> Self {
        Self { skip, ..self }
    }

    /// Always exactly GUTTER_WIDTH wide, so content never shifts even
    /// when a line number outgrows its column
    fn gutter(line: &DiffLine) -> String {
        let fmt = |n: Option<u32>| match n {
            Some(n) => format!("{:>5}", n),
            None => "     ".to_string(),
        };
        truncate_or_pad(
            &format!("{} {} ", fmt(line.old_ln), fmt(line.new_ln)),
            GUTTER_WIDTH,
        )
    }
}

impl Widget for DiffContent<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for (row, line) in self
            .lines
            .iter()
            .skip(self.skip)
            .take(area.height as usize)
            .enumerate()
        {
            let y = area.y + row as u16;
            let bg = self.style.line_bg(line.kind);

            // Fill the whole row with the kind's tint first
            for x in area.x..area.x + area.width {
                buf.set_string(x, y, " ", Style::default().bg(bg));
            }

            let gutter_style = Style::default().fg(self.style.muted_fg).bg(bg);
            buf.set_string(area.x, y, Self::gutter(line), gutter_style);

            let content_width = (area.width as usize).saturating_sub(GUTTER_WIDTH);
            if content_width == 0 {
                continue;
            }
            let content = truncate_or_pad(&line.content, content_width);
            let content_style = Style::default().fg(self.style.line_fg(line.kind)).bg(bg);
            buf.set_string(area.x + GUTTER_WIDTH as u16, y, content, content_style);
        }
    }
}

/// One file's collapsible diff section: a header that is always visible
/// and a body that is only mounted while expanded.
pub struct FileDiffSection {
    pub file: FileDiff,
    state: SectionState,
}

impl FileDiffSection {
    /// Boxed header: title row plus rule row
    pub const HEADER_HEIGHT: usize = 2;

    pub fn new(file: FileDiff, initial: SectionState) -> Self {
        Self {
            file,
            state: initial,
        }
    }

    pub fn state(&self) -> SectionState {
        self.state
    }

    pub fn toggle(&mut self) {
        self.state = self.state.toggle();
    }

    /// Current height in rows, a pure function of the collapse state.
    /// Collapsed sections consume the header alone.
    pub fn height(&self) -> usize {
        match self.state {
            SectionState::Collapsed => Self::HEADER_HEIGHT,
            SectionState::Expanded => Self::HEADER_HEIGHT + self.file.line_count(),
        }
    }

    fn header_title(&self) -> String {
        let marker = if self.state.is_expanded() {
            "▾"
        } else {
            "▸"
        };
        let rename = match &self.file.old_path {
            Some(old) => format!(" (was {})", old),
            None => String::new(),
        };
        format!(
            " {} {}{} {} {}",
            marker,
            self.file.path,
            rename,
            self.file.status.badge(),
            self.file.stats_text()
        )
    }

    fn render_title_row(&self, area: Rect, y: u16, selected: bool, style: &DiffStyle, buf: &mut Buffer) {
        let bg = style.header_bg;
        let title_style = if selected {
            Style::default()
                .fg(style.accent)
                .bg(bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
                .fg(self.file.status.color())
                .bg(bg)
                .add_modifier(Modifier::BOLD)
        };
        let text = truncate_or_pad(&self.header_title(), area.width as usize);
        buf.set_string(area.x, y, text, title_style);
    }

    fn render_rule_row(&self, area: Rect, y: u16, style: &DiffStyle, buf: &mut Buffer) {
        let rule = "─".repeat(area.width as usize);
        buf.set_string(area.x, y, rule, Style::default().fg(style.muted_fg).bg(style.base_bg));
    }
}

/// Scrollable container for the ordered file sections. Fills whatever
/// vertical space it is given; vertical overflow scrolls, horizontal
/// overflow is clipped.
pub struct FileDiffList {
    sections: Vec<FileDiffSection>,
    style: DiffStyle,
    scroll: usize,
    selected: usize,
}

impl FileDiffList {
    pub fn new(files: Vec<FileDiff>, initial: SectionState, style: DiffStyle) -> Self {
        Self {
            sections: files
                .into_iter()
                .map(|f| FileDiffSection::new(f, initial))
                .collect(),
            style,
            scroll: 0,
            selected: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn sections(&self) -> &[FileDiffSection] {
        &self.sections
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    /// Sum of all sections' current heights
    pub fn total_height(&self) -> usize {
        self.sections.iter().map(|s| s.height()).sum()
    }

    /// Row at which section `idx` starts in the virtual row space
    pub fn section_offset(&self, idx: usize) -> usize {
        self.sections[..idx.min(self.sections.len())]
            .iter()
            .map(|s| s.height())
            .sum()
    }

    pub fn max_scroll(&self, viewport: usize) -> usize {
        self.total_height().saturating_sub(viewport)
    }

    pub fn scroll_by(&mut self, delta: isize, viewport: usize) {
        let max = self.max_scroll(viewport);
        self.scroll = self.scroll.saturating_add_signed(delta).min(max);
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self, viewport: usize) {
        self.scroll = self.max_scroll(viewport);
    }

    /// Select the next section and bring its header into view
    pub fn select_next(&mut self, viewport: usize) {
        if self.selected + 1 < self.sections.len() {
            self.selected += 1;
            self.scroll_selected_into_view(viewport);
        }
    }

    /// Select the previous section and bring its header into view
    pub fn select_prev(&mut self, viewport: usize) {
        if self.selected > 0 {
            self.selected -= 1;
            self.scroll_selected_into_view(viewport);
        }
    }

    fn scroll_selected_into_view(&mut self, viewport: usize) {
        let offset = self.section_offset(self.selected);
        if offset < self.scroll || offset >= self.scroll + viewport {
            self.scroll = offset.min(self.max_scroll(viewport));
        }
    }

    /// Flip the selected section's collapse state. Total content height
    /// changes, so the scroll offset is re-clamped.
    pub fn toggle_selected(&mut self, viewport: usize) {
        if let Some(section) = self.sections.get_mut(self.selected) {
            section.toggle();
            self.scroll = self.scroll.min(self.max_scroll(viewport));
        }
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        // Top border separating the list from the meta panel above
        let block = Block::default()
            .title(format!(" Changed files ({}) ", self.sections.len()))
            .borders(Borders::TOP)
            .border_style(Style::default().fg(self.style.muted_fg));
        let inner = block.inner(area);
        block.render(area, buf);

        fill_area(buf, inner, self.style.base_bg);

        if inner.height == 0 || inner.width == 0 {
            return;
        }

        if self.sections.is_empty() {
            buf.set_string(
                inner.x + 1,
                inner.y,
                "No changes to display",
                Style::default().fg(self.style.muted_fg).bg(self.style.base_bg),
            );
            return;
        }

        let viewport = inner.height as usize;
        let scroll = self.scroll.min(self.max_scroll(viewport));

        let mut offset = 0usize;
        for (idx, section) in self.sections.iter().enumerate() {
            let height = section.height();
            if offset + height <= scroll {
                offset += height;
                continue;
            }
            if offset >= scroll + viewport {
                break;
            }

            // Header rows
            let title_row = offset;
            let rule_row = offset + 1;
            if title_row >= scroll && title_row < scroll + viewport {
                let y = inner.y + (title_row - scroll) as u16;
                section.render_title_row(inner, y, idx == self.selected, &self.style, buf);
            }
            if rule_row >= scroll && rule_row < scroll + viewport {
                let y = inner.y + (rule_row - scroll) as u16;
                section.render_rule_row(inner, y, &self.style, buf);
            }

            // Body, only while expanded
            if section.state().is_expanded() && section.file.line_count() > 0 {
                let body_start = offset + FileDiffSection::HEADER_HEIGHT;
                let first_visible = scroll.max(body_start);
                let body_end = offset + height;
                let last_visible = (scroll + viewport).min(body_end);
                if first_visible < last_visible {
                    let body_area = Rect {
                        x: inner.x,
                        y: inner.y + (first_visible - scroll) as u16,
                        width: inner.width,
                        height: (last_visible - first_visible) as u16,
                    };
                    DiffContent::new(&section.file.lines, self.style)
                        .skip(first_visible - body_start)
                        .render(body_area, buf);
                }
            }

            offset += height;
        }

        // Scrollbar when the content overflows the viewport
        let total = self.total_height();
        if total > viewport {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None);
            let mut state = ScrollbarState::new(total).position(scroll);
            StatefulWidget::render(scrollbar, inner, buf, &mut state);
        }
    }
}

/// Top-docked bar with the PR title and right-docked review stats.
/// Read-only projection of the PullRequest.
pub struct PrHeader<'a> {
    pr: &'a PullRequest,
    style: DiffStyle,
}

impl<'a> PrHeader<'a> {
    pub fn new(pr: &'a PullRequest, style: DiffStyle) -> Self {
        Self { pr, style }
    }

    fn stats_text(&self) -> String {
        format!(
            " {} approvals · {} comments ",
            self.pr.approval_count(),
            self.pr.comment_count
        )
    }
}

impl Widget for PrHeader<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        fill_area(buf, area, self.style.header_bg);

        let title = format!(
            " {} #{}: {}",
            self.pr.repo_full_name(),
            self.pr.id,
            self.pr.title
        );
        let stats = self.stats_text();
        let stats_len = stats.chars().count() as u16;

        let title_width = (area.width.saturating_sub(stats_len + 1)) as usize;
        let title_style = Style::default()
            .fg(self.style.accent)
            .bg(self.style.header_bg)
            .add_modifier(Modifier::BOLD);
        buf.set_string(area.x, area.y, truncate_or_pad(&title, title_width), title_style);

        if area.width > stats_len {
            let stats_x = area.x + area.width - stats_len;
            let stats_style = Style::default()
                .fg(self.style.text_fg)
                .bg(self.style.header_bg);
            buf.set_string(stats_x, area.y, stats, stats_style);
        }
    }
}

/// Padded metadata/description panel below the header: author, branch,
/// reviewers on the left, the wrapped description on the right.
pub struct PrMeta<'a> {
    pr: &'a PullRequest,
    style: DiffStyle,
}

impl<'a> PrMeta<'a> {
    pub fn new(pr: &'a PullRequest, style: DiffStyle) -> Self {
        Self { pr, style }
    }

    fn meta_lines(&self) -> Vec<Line<'static>> {
        let label = Style::default().add_modifier(Modifier::BOLD);
        let join = |names: &[String]| {
            if names.is_empty() {
                "none".to_string()
            } else {
                names.join(", ")
            }
        };
        vec![
            Line::from(vec![
                ratatui::text::Span::styled("Author: ", label),
                ratatui::text::Span::raw(self.pr.author.clone()),
            ]),
            Line::from(vec![
                ratatui::text::Span::styled("Branch: ", label),
                ratatui::text::Span::raw(self.pr.branch.clone()),
            ]),
            Line::from(vec![
                ratatui::text::Span::styled("Status: ", label),
                ratatui::text::Span::raw(self.pr.status.clone()),
            ]),
            Line::from(vec![
                ratatui::text::Span::styled("Created: ", label),
                ratatui::text::Span::raw(format_relative_time(&self.pr.created)),
            ]),
            Line::from(vec![
                ratatui::text::Span::styled("Reviewers: ", label),
                ratatui::text::Span::raw(join(&self.pr.reviewers)),
            ]),
            Line::from(vec![
                ratatui::text::Span::styled("Approved by: ", label),
                ratatui::text::Span::raw(join(&self.pr.approvals)),
            ]),
        ]
    }
}

impl Widget for PrMeta<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
            .split(area);

        let border_style = Style::default().fg(self.style.muted_fg);

        let meta = Paragraph::new(self.meta_lines()).block(
            Block::default()
                .title(" Details ")
                .borders(Borders::ALL)
                .border_style(border_style)
                .padding(Padding::horizontal(1)),
        );
        meta.render(chunks[0], buf);

        let description = if self.pr.description.is_empty() {
            "No description provided".to_string()
        } else {
            self.pr.description.clone()
        };
        let desc_block = Block::default()
            .title(" Description ")
            .borders(Borders::ALL)
            .border_style(border_style)
            .padding(Padding::horizontal(1));
        let desc_inner = desc_block.inner(chunks[1]);
        desc_block.render(chunks[1], buf);

        for (row, line) in wrap_text(&description, desc_inner.width as usize)
            .iter()
            .take(desc_inner.height as usize)
            .enumerate()
        {
            buf.set_string(desc_inner.x, desc_inner.y + row as u16, line, Style::default());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileStatus;

    fn file_with_adds(path: &str, count: u32) -> FileDiff {
        FileDiff {
            path: path.to_string(),
            old_path: None,
            status: FileStatus::Modified,
            lines: (1..=count)
                .map(|n| DiffLine::add(format!("added {}", n), n))
                .collect(),
        }
    }

    fn mixed_file(path: &str) -> FileDiff {
        FileDiff {
            path: path.to_string(),
            old_path: None,
            status: FileStatus::Modified,
            lines: vec![
                DiffLine::del("removed".to_string(), 1),
                DiffLine::context("kept".to_string(), 2, 1),
            ],
        }
    }

    fn sample_pr() -> PullRequest {
        PullRequest {
            id: 9,
            title: "Tune retry backoff".to_string(),
            author: "Alex Doe".to_string(),
            description: "Backoff is now exponential.".to_string(),
            status: "Open".to_string(),
            branch: "fix/backoff".to_string(),
            created: "2026-08-01T12:00:00+00:00".to_string(),
            approvals: vec!["Sam Lee".to_string(), "Kim Park".to_string()],
            comment_count: 5,
            reviewers: vec!["Sam Lee".to_string()],
            workspace: "acme".to_string(),
            repo: "widgets".to_string(),
        }
    }

    #[test]
    fn test_line_kinds_have_distinct_backgrounds() {
        let style = DiffStyle::default();
        let kinds = [LineKind::Add, LineKind::Del, LineKind::Info];
        for a in kinds {
            for b in kinds {
                if a != b {
                    assert_ne!(style.line_bg(a), style.line_bg(b));
                }
            }
        }
    }

    #[test]
    fn test_diff_content_renders_kind_backgrounds() {
        let style = DiffStyle::default();
        let lines = vec![
            DiffLine::add("plus".to_string(), 1),
            DiffLine::del("minus".to_string(), 1),
            DiffLine::info("@@ -1 +1 @@".to_string()),
        ];

        let area = Rect::new(0, 0, 40, 3);
        let mut buf = Buffer::empty(area);
        DiffContent::new(&lines, style).render(area, &mut buf);

        assert_eq!(buf.cell((0, 0)).unwrap().style().bg, Some(style.add_bg));
        assert_eq!(buf.cell((0, 1)).unwrap().style().bg, Some(style.del_bg));
        assert_eq!(buf.cell((0, 2)).unwrap().style().bg, Some(style.info_bg));

        // Content starts right after the gutter, left aligned
        let x = GUTTER_WIDTH as u16;
        assert_eq!(buf.cell((x, 0)).unwrap().symbol(), "p");
        assert_eq!(buf.cell((x, 1)).unwrap().symbol(), "m");
    }

    #[test]
    fn test_diff_content_skip_window() {
        let style = DiffStyle::default();
        let file = file_with_adds("a.rs", 5);

        let area = Rect::new(0, 0, 30, 2);
        let mut buf = Buffer::empty(area);
        DiffContent::new(&file.lines, style)
            .skip(3)
            .render(area, &mut buf);

        // Rows show lines 4 and 5
        let x = GUTTER_WIDTH as u16;
        assert_eq!(buf.cell((x + 6, 0)).unwrap().symbol(), "4");
        assert_eq!(buf.cell((x + 6, 1)).unwrap().symbol(), "5");
    }

    #[test]
    fn test_diff_content_gutter_width_is_stable() {
        let style = DiffStyle::default();
        let lines = vec![
            DiffLine::add("small".to_string(), 7),
            DiffLine::add("large".to_string(), 12345),
            // Outgrows even the widened column; gutter is clamped
            DiffLine::context("huge".to_string(), 1234567, 7654321),
        ];

        for line in &lines {
            assert_eq!(DiffContent::gutter(line).chars().count(), GUTTER_WIDTH);
        }

        let area = Rect::new(0, 0, 40, 3);
        let mut buf = Buffer::empty(area);
        DiffContent::new(&lines, style).render(area, &mut buf);

        // Content starts at the same column on every row
        let x = GUTTER_WIDTH as u16;
        assert_eq!(buf.cell((x, 0)).unwrap().symbol(), "s");
        assert_eq!(buf.cell((x, 1)).unwrap().symbol(), "l");
        assert_eq!(buf.cell((x, 2)).unwrap().symbol(), "h");
    }

    #[test]
    fn test_section_height_pure_function_of_state() {
        let mut section =
            FileDiffSection::new(file_with_adds("a.rs", 10), SectionState::Expanded);
        assert_eq!(section.height(), FileDiffSection::HEADER_HEIGHT + 10);

        section.toggle();
        assert_eq!(section.state(), SectionState::Collapsed);
        assert_eq!(section.height(), FileDiffSection::HEADER_HEIGHT);

        // Round trip restores the body unchanged
        section.toggle();
        assert_eq!(section.height(), FileDiffSection::HEADER_HEIGHT + 10);
        assert_eq!(section.file.lines[0].content, "added 1");
        assert_eq!(section.file.lines[9].content, "added 10");
    }

    #[test]
    fn test_total_height_is_sum_of_sections() {
        let files = vec![
            file_with_adds("a.rs", 3),
            file_with_adds("b.rs", 7),
            file_with_adds("c.rs", 1),
        ];
        let mut list = FileDiffList::new(files, SectionState::Expanded, DiffStyle::default());

        let expected: usize = list.sections().iter().map(|s| s.height()).sum();
        assert_eq!(list.total_height(), expected);
        assert_eq!(list.total_height(), 3 * FileDiffSection::HEADER_HEIGHT + 11);

        // Collapsing the middle section subtracts exactly its body height
        list.select_next(100);
        list.toggle_selected(100);
        assert_eq!(list.total_height(), 3 * FileDiffSection::HEADER_HEIGHT + 4);
    }

    #[test]
    fn test_section_offsets() {
        let files = vec![file_with_adds("a.rs", 3), file_with_adds("b.rs", 7)];
        let list = FileDiffList::new(files, SectionState::Expanded, DiffStyle::default());

        assert_eq!(list.section_offset(0), 0);
        assert_eq!(list.section_offset(1), FileDiffSection::HEADER_HEIGHT + 3);
        assert_eq!(list.section_offset(2), list.total_height());
    }

    #[test]
    fn test_scroll_clamping() {
        let files = vec![file_with_adds("a.rs", 20)];
        let mut list = FileDiffList::new(files, SectionState::Expanded, DiffStyle::default());
        let viewport = 10;

        list.scroll_by(1000, viewport);
        assert_eq!(list.scroll(), list.max_scroll(viewport));
        assert_eq!(
            list.max_scroll(viewport),
            FileDiffSection::HEADER_HEIGHT + 20 - viewport
        );

        list.scroll_by(-1000, viewport);
        assert_eq!(list.scroll(), 0);

        // Collapsing re-clamps the scroll offset
        list.scroll_to_bottom(viewport);
        list.toggle_selected(viewport);
        assert_eq!(list.scroll(), list.max_scroll(viewport));
        assert_eq!(list.max_scroll(viewport), 0);
    }

    #[test]
    fn test_scroll_to_bottom_reveals_last_line() {
        let files = vec![file_with_adds("a.rs", 20)];
        let mut list = FileDiffList::new(files, SectionState::Expanded, DiffStyle::default());

        // Area includes the list's own top border row
        let area = Rect::new(0, 0, 40, 11);
        let viewport = area.height as usize - 1;
        list.scroll_to_bottom(viewport);

        let mut buf = Buffer::empty(area);
        list.render(area, &mut buf);

        // Bottom row of the viewport shows the final added line (new
        // line number 20 ends in "0" at gutter column 8)
        let y = area.height - 1;
        let x = GUTTER_WIDTH as u16;
        assert_eq!(buf.cell((x, y)).unwrap().symbol(), "a");
        assert_eq!(buf.cell((x + 6, y)).unwrap().symbol(), "2");
        assert_eq!(buf.cell((x + 7, y)).unwrap().symbol(), "0");
    }

    #[test]
    fn test_collapsed_section_renders_header_only() {
        let files = vec![file_with_adds("a.rs", 5), file_with_adds("b.rs", 5)];
        let mut list = FileDiffList::new(files, SectionState::Collapsed, DiffStyle::default());
        assert_eq!(list.total_height(), 2 * FileDiffSection::HEADER_HEIGHT);

        let area = Rect::new(0, 0, 40, 10);
        let mut buf = Buffer::empty(area);
        list.render(area, &mut buf);

        // Row 1 (after the top border) is a.rs's header, row 3 is b.rs's.
        // No body rows with an addition tint appear anywhere.
        let style = DiffStyle::default();
        for y in 0..area.height {
            for x in 0..area.width {
                assert_ne!(buf.cell((x, y)).unwrap().style().bg, Some(style.add_bg));
            }
        }

        // Expanding the first section mounts its body again
        list.toggle_selected(9);
        let mut buf = Buffer::empty(area);
        list.render(area, &mut buf);
        assert_eq!(
            buf.cell((0, 3)).unwrap().style().bg,
            Some(style.add_bg),
            "first body row should carry the addition tint"
        );
    }

    #[test]
    fn test_empty_diff_set_renders_without_error() {
        let list = FileDiffList::new(Vec::new(), SectionState::Expanded, DiffStyle::default());
        assert!(list.is_empty());
        assert_eq!(list.total_height(), 0);

        let area = Rect::new(0, 0, 40, 8);
        let mut buf = Buffer::empty(area);
        list.render(area, &mut buf);
        // Placeholder message, no sections
        assert_eq!(buf.cell((1, 1)).unwrap().symbol(), "N");
    }

    #[test]
    fn test_review_scenario_two_files() {
        // File A: 3 added lines; file B: 1 deleted + 1 context line
        let file_a = file_with_adds("a.rs", 3);
        let file_b = mixed_file("b.rs");
        let mut list = FileDiffList::new(
            vec![file_a, file_b],
            SectionState::Expanded,
            DiffStyle::default(),
        );

        assert_eq!(list.len(), 2);
        let before = list.total_height();

        // Collapsing A shrinks the total by exactly A's body height
        list.toggle_selected(100);
        assert_eq!(before - list.total_height(), 3);

        // B's lines keep deletion/info styling
        let area = Rect::new(0, 0, 40, 10);
        let mut buf = Buffer::empty(area);
        list.render(area, &mut buf);

        let style = DiffStyle::default();
        // Rows: border, A header, A rule, B header, B rule, B del, B context
        assert_eq!(buf.cell((0, 5)).unwrap().style().bg, Some(style.del_bg));
        assert_eq!(buf.cell((0, 6)).unwrap().style().bg, Some(style.info_bg));
    }

    #[test]
    fn test_selection_moves_and_scrolls() {
        let files = vec![
            file_with_adds("a.rs", 30),
            file_with_adds("b.rs", 30),
            file_with_adds("c.rs", 30),
        ];
        let mut list = FileDiffList::new(files, SectionState::Expanded, DiffStyle::default());
        let viewport = 10;

        list.select_next(viewport);
        assert_eq!(list.selected(), 1);
        assert_eq!(list.scroll(), list.section_offset(1));

        list.select_next(viewport);
        list.select_next(viewport); // No fourth section
        assert_eq!(list.selected(), 2);

        list.select_prev(viewport);
        assert_eq!(list.selected(), 1);
    }

    #[test]
    fn test_pr_header_docks_stats_right() {
        let pr = sample_pr();
        let style = DiffStyle::default();
        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);
        PrHeader::new(&pr, style).render(area, &mut buf);

        // Title at the left
        assert_eq!(buf.cell((1, 0)).unwrap().symbol(), "a");

        // Stats flush against the right edge: "... 5 comments "
        assert_eq!(buf.cell((58, 0)).unwrap().symbol(), "s");
        let stats = " 2 approvals · 5 comments ";
        let start = 60 - stats.chars().count() as u16;
        assert_eq!(buf.cell((start + 1, 0)).unwrap().symbol(), "2");
    }

    #[test]
    fn test_pr_meta_renders_fields() {
        let pr = sample_pr();
        let style = DiffStyle::default();
        let area = Rect::new(0, 0, 80, 10);
        let mut buf = Buffer::empty(area);
        PrMeta::new(&pr, style).render(area, &mut buf);

        // Details block: border row 0, padded content from row 1
        assert_eq!(buf.cell((2, 1)).unwrap().symbol(), "A"); // "Author: "
    }
}
