use std::collections::VecDeque;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::model::buffer::Buffer;
use crate::model::config::AppConfig;
use crate::model::document::{AddonItem, AddonSection};
use crate::model::mode::Mode;
use crate::msg::{Direction as MoveDir, Msg};
use crate::plugin::AddonManager;
use crate::plugin::installer::InstallRequest;
use crate::plugin::manifest::PluginId;

const NOTICE_TTL: Duration = Duration::from_secs(5);
const MAX_NOTIFICATIONS: usize = 8;

pub struct App {
    pub mode: Mode,
    pub manager: AddonManager,
    pub config: AppConfig,
    code_input: Buffer,
    style_input: Buffer,
    selected: usize,
    /// First visible row of the addon list.
    list_offset: usize,
    pending_uninstall: Option<PluginId>,
    seen_render: u64,
    pub should_quit: bool,
    pub notifications: VecDeque<String>,
    notice_until: Option<Instant>,
}

impl App {
    pub fn new(config: AppConfig, manager: AddonManager, startup_notices: Vec<String>) -> Self {
        let seen_render = manager.document().render_count();
        let mut app = Self {
            mode: Mode::Normal,
            manager,
            config,
            code_input: Buffer::new(),
            style_input: Buffer::new(),
            selected: 0,
            list_offset: 0,
            pending_uninstall: None,
            seen_render,
            should_quit: false,
            notifications: VecDeque::new(),
            notice_until: None,
        };

        if app.manager.is_empty() {
            app.push_notification("no plugins installed, press i to add one".to_string());
        } else {
            app.push_notification(format!("plugins: {} installed", app.manager.len()));
        }
        for notice in startup_notices {
            app.push_notification(notice);
        }
        app
    }

    // ── MVU: Update ──────────────────────────────────────────────

    pub fn update(&mut self, msg: Msg) -> Result<()> {
        match msg {
            Msg::Key(key) => self.handle_key(key)?,
            Msg::Paste(_) if self.mode == Mode::ConfirmUninstall => {}
            Msg::Paste(text) => {
                if let Some(buffer) = self.active_input() {
                    buffer.insert_str(&text);
                } else {
                    // Pasting from the list view starts a new plugin.
                    self.mode = Mode::EditCode;
                    self.code_input.insert_str(&text);
                }
            }
            Msg::InsertChar(ch) => {
                if let Some(buffer) = self.active_input() {
                    buffer.insert_char(ch);
                }
            }
            Msg::DeleteChar => {
                if let Some(buffer) = self.active_input() {
                    buffer.delete_char_before();
                }
            }
            Msg::NewLine => {
                if let Some(buffer) = self.active_input() {
                    buffer.insert_newline();
                }
            }
            Msg::MoveCursor(dir) => self.move_cursor(dir),
            Msg::SetMode(mode) => self.mode = mode,
            Msg::SelectNext => {
                if self.selected + 1 < self.section_len() {
                    self.selected += 1;
                }
            }
            Msg::SelectPrev => self.selected = self.selected.saturating_sub(1),
            Msg::ToggleSelected => self.toggle_selected(),
            Msg::RequestUninstall => self.request_uninstall(),
            Msg::ConfirmUninstall(confirmed) => self.confirm_uninstall(confirmed),
            Msg::InstallFromForm => self.install_from_form(),
            Msg::Tick => self.handle_tick(),
            Msg::Quit => self.should_quit = true,
            Msg::Resize => {}
        }

        self.sync_selection();
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            return self.update(Msg::Quit);
        }
        if ctrl && key.code == KeyCode::Char('s') {
            return self.update(Msg::InstallFromForm);
        }

        match self.mode {
            Mode::Normal => self.handle_key_normal(key),
            Mode::EditCode | Mode::EditStyle => self.handle_key_edit(key),
            Mode::ConfirmUninstall => self.handle_key_confirm(key),
        }
    }

    fn handle_key_normal(&mut self, key: KeyEvent) -> Result<()> {
        let msg = match key.code {
            KeyCode::Char('q') => Msg::Quit,
            KeyCode::Char('j') | KeyCode::Down => Msg::SelectNext,
            KeyCode::Char('k') | KeyCode::Up => Msg::SelectPrev,
            KeyCode::Char(' ') | KeyCode::Enter => Msg::ToggleSelected,
            KeyCode::Char('d') | KeyCode::Delete => Msg::RequestUninstall,
            KeyCode::Char('i') | KeyCode::Tab => Msg::SetMode(Mode::EditCode),
            KeyCode::Char('s') => Msg::SetMode(Mode::EditStyle),
            KeyCode::Char('?') => {
                self.show_help();
                return Ok(());
            }
            _ => return Ok(()),
        };
        self.update(msg)
    }

    fn handle_key_edit(&mut self, key: KeyEvent) -> Result<()> {
        let msg = match key.code {
            KeyCode::Esc => Msg::SetMode(Mode::Normal),
            KeyCode::Tab | KeyCode::BackTab => {
                let next = if self.mode == Mode::EditCode {
                    Mode::EditStyle
                } else {
                    Mode::EditCode
                };
                Msg::SetMode(next)
            }
            KeyCode::Enter => Msg::NewLine,
            KeyCode::Backspace => Msg::DeleteChar,
            KeyCode::Left => Msg::MoveCursor(MoveDir::Left),
            KeyCode::Right => Msg::MoveCursor(MoveDir::Right),
            KeyCode::Up => Msg::MoveCursor(MoveDir::Up),
            KeyCode::Down => Msg::MoveCursor(MoveDir::Down),
            KeyCode::Home => Msg::MoveCursor(MoveDir::LineStart),
            KeyCode::End => Msg::MoveCursor(MoveDir::LineEnd),
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                Msg::InsertChar(ch)
            }
            _ => return Ok(()),
        };
        self.update(msg)
    }

    fn handle_key_confirm(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => self.update(Msg::ConfirmUninstall(true)),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.update(Msg::ConfirmUninstall(false))
            }
            _ => Ok(()),
        }
    }

    fn active_input(&mut self) -> Option<&mut Buffer> {
        match self.mode {
            Mode::EditCode => Some(&mut self.code_input),
            Mode::EditStyle => Some(&mut self.style_input),
            _ => None,
        }
    }

    fn move_cursor(&mut self, dir: MoveDir) {
        let Some(buffer) = self.active_input() else {
            return;
        };

        match dir {
            MoveDir::Up => buffer.move_up(),
            MoveDir::Down => buffer.move_down(),
            MoveDir::Left => buffer.move_left(),
            MoveDir::Right => buffer.move_right(),
            MoveDir::LineStart => buffer.move_line_start(),
            MoveDir::LineEnd => buffer.move_line_end(),
        }
    }

    fn install_from_form(&mut self) {
        let request =
            match InstallRequest::from_form(&self.code_input.text(), &self.style_input.text()) {
                Ok(request) => request,
                Err(err) => {
                    self.push_notification(err.to_string());
                    return;
                }
            };

        if self
            .manager
            .install(&request.code, request.style.as_deref())
        {
            self.code_input.clear();
            self.style_input.clear();
            self.mode = Mode::Normal;
            self.selected = self.manager.len().saturating_sub(1);
            self.push_notification("plugin installed".to_string());
        } else {
            self.push_notification(
                "plugin install failed, check the plugin code (see log for details)".to_string(),
            );
        }
    }

    fn toggle_selected(&mut self) {
        let Some((id, enabled, name)) = self
            .selected_item()
            .map(|item| (item.id.clone(), item.enabled, item.name.clone()))
        else {
            return;
        };

        let (changed, verb) = if enabled {
            (self.manager.disable_addon(&id), "disabled")
        } else {
            (self.manager.enable_addon(&id), "enabled")
        };

        if changed {
            self.push_notification(format!("{name} {verb}"));
        } else {
            self.push_notification(format!("{name} cannot be {verb}"));
        }
    }

    fn request_uninstall(&mut self) {
        let Some(id) = self.selected_item().map(|item| item.id.clone()) else {
            return;
        };

        if self.config.addons.confirm_uninstall {
            self.pending_uninstall = Some(id);
            self.mode = Mode::ConfirmUninstall;
        } else {
            self.uninstall(&id);
        }
    }

    fn confirm_uninstall(&mut self, confirmed: bool) {
        self.mode = Mode::Normal;
        let Some(id) = self.pending_uninstall.take() else {
            return;
        };

        if confirmed && self.manager.is_installed(&id) {
            self.uninstall(&id);
        }
    }

    fn uninstall(&mut self, id: &PluginId) {
        if self.manager.uninstall(id) {
            self.push_notification(format!("plugin {id} uninstalled"));
        } else {
            self.push_notification(format!("failed to uninstall plugin {id}"));
        }
    }

    fn show_help(&mut self) {
        let entries: Vec<&str> = self.manager.catalog().entries().collect();
        let help = format!(
            "keys: j/k move, space toggle, d uninstall, i code, s style, ctrl+s install, q quit | entries: {}",
            entries.join(", ")
        );
        self.push_notification(help);
    }

    fn handle_tick(&mut self) {
        if self
            .notice_until
            .is_some_and(|deadline| Instant::now() >= deadline)
        {
            self.notice_until = None;
        }
    }

    fn push_notification(&mut self, message: String) {
        tracing::debug!("notice: {message}");
        self.notifications.push_back(message);
        while self.notifications.len() > MAX_NOTIFICATIONS {
            self.notifications.pop_front();
        }
        self.notice_until = Some(Instant::now() + NOTICE_TTL);
    }

    fn section(&self) -> Option<&AddonSection> {
        self.manager.document().addon_section()
    }

    fn section_len(&self) -> usize {
        self.section().map(|section| section.items.len()).unwrap_or(0)
    }

    fn selected_item(&self) -> Option<&AddonItem> {
        self.section()
            .and_then(|section| section.items.get(self.selected))
    }

    /// Keep the selection in range after the section is re-rendered.
    fn sync_selection(&mut self) {
        let render_count = self.manager.document().render_count();
        if render_count == self.seen_render {
            return;
        }

        self.seen_render = render_count;
        self.selected = self.selected.min(self.section_len().saturating_sub(1));
    }

    // ── MVU: View ────────────────────────────────────────────────

    pub fn view(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // title bar
                Constraint::Min(1),    // body
                Constraint::Length(1), // status bar
            ])
            .split(frame.area());

        self.render_title_bar(frame, chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Min(1)])
            .split(chunks[1]);

        let widget_height = self.page_widget_height();
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(widget_height)])
            .split(body[0]);
        self.render_addon_list(frame, left[0]);
        self.render_page_widgets(frame, left[1]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(8)])
            .split(body[1]);
        render_text_area(
            frame,
            right[0],
            " Plugin code ",
            &mut self.code_input,
            self.mode == Mode::EditCode,
        );
        render_text_area(
            frame,
            right[1],
            " Style code (optional) ",
            &mut self.style_input,
            self.mode == Mode::EditStyle,
        );

        self.render_status_bar(frame, chunks[2]);

        if self.mode == Mode::ConfirmUninstall {
            self.render_confirm_overlay(frame);
        }
    }

    fn render_title_bar(&self, frame: &mut Frame, area: Rect) {
        let styles = self.manager.document().styles().len();
        let enabled = self.manager.plugins().filter(|plugin| plugin.enabled).count();
        let title = Line::from(vec![
            Span::styled(
                " SleekTab ",
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(
                    " Add-ons  {} installed, {enabled} enabled, {styles} style blocks ",
                    self.manager.len()
                ),
                Style::default().fg(Color::Gray),
            ),
        ]);
        frame.render_widget(
            Paragraph::new(title).style(Style::default().bg(Color::Rgb(15, 15, 24))),
            area,
        );
    }

    /// Move `list_offset` so every row of the selected item fits in `height`.
    fn scroll_list_to_selection(&mut self, height: usize) {
        let (start, end, total) = match self.section() {
            Some(section) => {
                let start: usize = section
                    .items
                    .iter()
                    .take(self.selected)
                    .map(item_rows)
                    .sum();
                let end = start + section.items.get(self.selected).map_or(0, item_rows);
                let total: usize = section.items.iter().map(item_rows).sum();
                (start, end, total)
            }
            None => (0, 0, 0),
        };

        if start < self.list_offset {
            self.list_offset = start;
        } else if end > self.list_offset + height {
            self.list_offset = end.saturating_sub(height);
        }
        self.list_offset = self.list_offset.min(total.saturating_sub(height));
    }

    fn render_addon_list(&mut self, frame: &mut Frame, area: Rect) {
        self.scroll_list_to_selection(area.height.saturating_sub(2) as usize);

        let focused = self.mode == Mode::Normal;
        let block = Block::default()
            .title(" Installed ")
            .borders(Borders::ALL)
            .border_style(focus_style(focused));

        let lines: Vec<Line> = match self.section() {
            Some(section) if !section.is_empty() => section
                .items
                .iter()
                .enumerate()
                .flat_map(|(idx, item)| {
                    let toggle = if item.enabled { "[x]" } else { "[ ]" };
                    let style_marker = if item.has_style { " +css" } else { "" };
                    let header = format!("{toggle} {} v{}{style_marker}", item.name, item.version);
                    let header = if idx == self.selected {
                        Line::from(Span::styled(
                            format!("> {header}"),
                            Style::default().fg(Color::Black).bg(Color::Cyan),
                        ))
                    } else {
                        Line::from(Span::styled(
                            format!("  {header}"),
                            Style::default().fg(Color::White),
                        ))
                    };

                    let mut lines = vec![
                        header,
                        Line::from(Span::styled(
                            format!("      {}", item.description),
                            Style::default().fg(Color::Gray),
                        )),
                    ];
                    if let Some(author) = &item.author {
                        lines.push(Line::from(Span::styled(
                            format!("      by {author}"),
                            Style::default().fg(Color::DarkGray),
                        )));
                    }
                    lines
                })
                .collect(),
            _ => vec![Line::from(Span::styled(
                AddonSection::EMPTY_MESSAGE,
                Style::default().fg(Color::DarkGray),
            ))],
        };

        let offset = u16::try_from(self.list_offset).unwrap_or(u16::MAX);
        frame.render_widget(Paragraph::new(lines).block(block).scroll((offset, 0)), area);
    }

    fn page_widget_height(&self) -> u16 {
        let lines: usize = self
            .manager
            .document()
            .widgets()
            .iter()
            .map(|widget| widget.lines.len() + 1)
            .sum();
        widget_panel_height(lines)
    }

    fn render_page_widgets(&self, frame: &mut Frame, area: Rect) {
        if area.height == 0 {
            return;
        }

        let lines: Vec<Line> = self
            .manager
            .document()
            .widgets()
            .iter()
            .flat_map(|widget| {
                std::iter::once(Line::from(Span::styled(
                    widget.title.clone(),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )))
                .chain(
                    widget
                        .lines
                        .iter()
                        .map(|line| Line::from(format!("  {line}"))),
                )
            })
            .collect();

        frame.render_widget(
            Paragraph::new(lines).block(
                Block::default()
                    .title(" Page ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            ),
            area,
        );
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let mode_style = match self.mode {
            Mode::Normal => Style::default()
                .fg(Color::Black)
                .bg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            Mode::EditCode | Mode::EditStyle => Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            Mode::ConfirmUninstall => Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        };

        let mode_span = Span::styled(format!(" {} ", self.mode.label()), mode_style);

        let message = match (self.notice_until, self.notifications.back()) {
            (Some(_), Some(notice)) => notice.clone(),
            _ if self.mode == Mode::EditCode && self.code_input.is_blank() => {
                "paste or type a plugin definition (TOML), ctrl+s installs".to_string()
            }
            _ if self.mode.is_editing() => {
                "esc: back  tab: switch field  ctrl+s: install".to_string()
            }
            _ => "?: help  q: quit".to_string(),
        };

        let info = Span::styled(
            format!(" {message} "),
            Style::default().fg(Color::Gray).bg(Color::DarkGray),
        );

        let bar = Line::from(vec![mode_span, info]);
        let status = Paragraph::new(bar).style(Style::default().bg(Color::DarkGray));
        frame.render_widget(status, area);
    }

    fn render_confirm_overlay(&self, frame: &mut Frame) {
        let area = centered_rect(50, 20, frame.area());
        frame.render_widget(Clear, area);

        let name = self
            .pending_uninstall
            .as_ref()
            .and_then(|id| self.manager.get(id))
            .map(|plugin| plugin.display_name().to_string())
            .unwrap_or_default();

        let prompt = Paragraph::new(format!("Uninstall {name}? (y/n)")).block(
            Block::default()
                .title(" Confirm ")
                .borders(Borders::ALL)
                .style(Style::default().bg(Color::Rgb(15, 15, 24))),
        );
        frame.render_widget(prompt, area);
    }
}

/// Panel height for `lines` widget rows plus borders, capped at 14.
fn widget_panel_height(lines: usize) -> u16 {
    if lines == 0 {
        return 0;
    }
    u16::try_from(lines)
        .unwrap_or(u16::MAX)
        .saturating_add(2)
        .min(14)
}

/// Rows one addon takes in the list: header, description, optional author.
fn item_rows(item: &AddonItem) -> usize {
    2 + usize::from(item.author.is_some())
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn render_text_area(frame: &mut Frame, area: Rect, title: &str, buffer: &mut Buffer, focused: bool) {
    buffer.viewport.height = area.height.saturating_sub(2).max(1);
    buffer.scroll_to_cursor();

    let top = buffer.viewport.top_line;
    let bottom = (top + buffer.viewport.height as usize).min(buffer.line_count());
    let lines: Vec<Line> = (top..bottom)
        .map(|row| Line::from(buffer.line_text(row).unwrap_or_default()))
        .collect();

    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title(title.to_string())
                .borders(Borders::ALL)
                .border_style(focus_style(focused)),
        ),
        area,
    );

    if focused {
        let cursor_x = area.x + 1 + buffer.cursor_display_col() as u16;
        let cursor_y = area.y + 1 + (buffer.cursor.row - top) as u16;
        if cursor_y < area.y + area.height.saturating_sub(1) {
            frame.set_cursor_position((cursor_x, cursor_y));
        }
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::extension::ExtensionCatalog;
    use crate::store::MemoryStore;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn app() -> App {
        let config = AppConfig::from_layers(None).unwrap();
        let mut manager = AddonManager::new(Box::new(MemoryStore::new()), ExtensionCatalog::builtin());
        manager.initialize();
        App::new(config, manager, Vec::new())
    }

    fn press(app: &mut App, code: KeyCode) {
        app.update(Msg::Key(KeyEvent::new(code, KeyModifiers::NONE)))
            .unwrap();
    }

    fn ctrl(app: &mut App, ch: char) {
        app.update(Msg::Key(KeyEvent::new(
            KeyCode::Char(ch),
            KeyModifiers::CONTROL,
        )))
        .unwrap();
    }

    const NOTES: &str = "id = \"sticky-notes\"\nname = \"Sticky Notes\"\n\
                         description = \"notes\"\nversion = \"1.0.0\"\nentry = \"sticky-notes\"\n";

    #[test]
    fn empty_form_is_rejected_before_install() {
        let mut app = app();
        press(&mut app, KeyCode::Char('i'));
        press(&mut app, KeyCode::Char(' '));
        ctrl(&mut app, 's');

        assert!(app.manager.is_empty());
        assert_eq!(
            app.notifications.back().map(String::as_str),
            Some("enter plugin code before installing")
        );
        assert_eq!(app.mode, Mode::EditCode);
    }

    #[test]
    fn pasted_plugin_installs_and_clears_form() {
        let mut app = app();
        app.update(Msg::Paste(NOTES.to_string())).unwrap();
        assert_eq!(app.mode, Mode::EditCode);
        press(&mut app, KeyCode::Tab);
        app.update(Msg::Paste(".sticky-note { color: black; }".to_string()))
            .unwrap();
        ctrl(&mut app, 's');

        assert_eq!(app.manager.len(), 1);
        assert_eq!(app.mode, Mode::Normal);
        assert!(app.code_input.is_blank());
        assert!(app.style_input.is_blank());
        assert!(
            app.manager
                .document()
                .style(&PluginId::new("sticky-notes"))
                .is_some()
        );
    }

    #[test]
    fn failed_install_keeps_form_contents() {
        let mut app = app();
        app.update(Msg::Paste("name = \"no id\"".to_string())).unwrap();
        ctrl(&mut app, 's');

        assert!(app.manager.is_empty());
        assert!(!app.code_input.is_blank());
        assert!(
            app.notifications
                .back()
                .is_some_and(|notice| notice.starts_with("plugin install failed"))
        );
    }

    #[test]
    fn toggle_and_confirmed_uninstall() {
        let mut app = app();
        assert!(app.manager.install(NOTES, None));
        app.update(Msg::Tick).unwrap();
        let id = PluginId::new("sticky-notes");

        press(&mut app, KeyCode::Char(' '));
        assert!(app.manager.get(&id).unwrap().enabled);
        assert_eq!(app.manager.document().widgets().len(), 1);

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.mode, Mode::ConfirmUninstall);
        press(&mut app, KeyCode::Char('n'));
        assert!(app.manager.is_installed(&id));

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert!(!app.manager.is_installed(&id));
        assert!(app.manager.document().widgets().is_empty());
        assert_eq!(app.mode, Mode::Normal);
    }

    #[test]
    fn selection_stays_in_range_after_uninstall() {
        let mut app = app();
        for id in ["a", "b"] {
            let code = format!(
                "id = \"{id}\"\nname = \"{id}\"\ndescription = \"d\"\nversion = \"1\""
            );
            assert!(app.manager.install(&code, None));
        }
        app.update(Msg::SelectNext).unwrap();
        app.update(Msg::SelectNext).unwrap();
        assert_eq!(app.selected, 1);

        app.config.addons.confirm_uninstall = false;
        app.update(Msg::RequestUninstall).unwrap();

        assert_eq!(app.selected, 0);
        assert_eq!(app.selected_item().map(|item| item.id.as_str()), Some("a"));
    }

    #[test]
    fn paste_is_ignored_while_confirming_uninstall() {
        let mut app = app();
        assert!(app.manager.install(NOTES, None));
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.mode, Mode::ConfirmUninstall);

        app.update(Msg::Paste("id = \"x\"".to_string())).unwrap();

        assert_eq!(app.mode, Mode::ConfirmUninstall);
        assert!(app.code_input.is_blank());
        press(&mut app, KeyCode::Char('y'));
        assert!(app.manager.is_empty());
    }

    #[test]
    fn selected_addon_stays_visible_in_long_list() {
        let mut app = app();
        for idx in 0..15 {
            let code = format!(
                "id = \"p{idx}\"\nname = \"Plugin{idx}\"\ndescription = \"d\"\nversion = \"1\"\nauthor = \"me\""
            );
            assert!(app.manager.install(&code, None));
        }
        for _ in 0..14 {
            app.update(Msg::SelectNext).unwrap();
        }
        assert_eq!(app.selected, 14);

        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|frame| app.view(frame)).unwrap();
        assert!(screen(&terminal).contains("> [ ] Plugin14 v1"));

        for _ in 0..14 {
            app.update(Msg::SelectPrev).unwrap();
        }
        terminal.draw(|frame| app.view(frame)).unwrap();
        let text = screen(&terminal);
        assert!(text.contains("> [ ] Plugin0 v1"));
        assert!(!text.contains("Plugin14"));
    }

    #[test]
    fn widget_panel_height_is_capped() {
        assert_eq!(widget_panel_height(0), 0);
        assert_eq!(widget_panel_height(4), 6);
        assert_eq!(widget_panel_height(65_536), 14);
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }
}
