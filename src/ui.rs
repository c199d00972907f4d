use crate::color::HexColor;
use crate::history::{ColorSelection, HistoryStore};
use crate::selection::{Preset, SelectionState, Slot};
use crate::storage::KeyValueStore;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};
use ratatui::Frame;
use std::time::Duration;

type Terminal = ratatui::Terminal<ratatui::backend::CrosstermBackend<std::io::Stdout>>;

const TITLE: &str = "Color Selector";
const PROMPT: &str = "Choose the color that you think best matches this word.";
const EMPTY_GALLERY: &str = "No colors selected yet. Pick a color above and add it to the gallery!";

const SWATCH_WIDTH: u16 = 8;
const SWATCH_HEIGHT: u16 = 3;
const SWATCH_GAP: u16 = 1;
const MAX_INPUT_LEN: usize = 7;

pub struct App<S> {
    terminal: Terminal,
    ui: UiState<S>,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(ui: UiState<S>) -> anyhow::Result<Self> {
        let terminal = Self::setup_terminal()?;
        log::debug!("setup terminal");
        Ok(Self { terminal, ui })
    }

    pub fn run(mut self) -> anyhow::Result<()> {
        self.render_ui()?;
        loop {
            if self.handle_event()? {
                break;
            }
        }
        Ok(())
    }

    fn handle_event(&mut self) -> anyhow::Result<bool> {
        if !crossterm::event::poll(Duration::from_millis(100))? {
            return Ok(false);
        }
        match crossterm::event::read()? {
            crossterm::event::Event::Key(key) => {
                if self.ui.handle_key_event(key) {
                    return Ok(true);
                }
                self.render_ui()?;
            }
            crossterm::event::Event::Resize(_, _) => {
                self.render_ui()?;
            }
            _ => {}
        }
        Ok(false)
    }

    fn render_ui(&mut self) -> anyhow::Result<()> {
        self.terminal.draw(|f| self.ui.render(f))?;
        Ok(())
    }
}

impl<S> App<S> {
    fn setup_terminal() -> anyhow::Result<Terminal> {
        crossterm::terminal::enable_raw_mode()?;
        let result = (|| {
            let mut stdout = std::io::stdout();
            crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
            let backend = ratatui::backend::CrosstermBackend::new(stdout);
            let terminal = ratatui::Terminal::new(backend)?;
            anyhow::Ok(terminal)
        })();
        if result.is_err() {
            // No `App` yet, so `Drop` will not restore the terminal.
            if let Err(e) = crossterm::terminal::disable_raw_mode() {
                log::warn!("failed to disable raw mode: {e}");
            }
        }
        result
    }

    fn teardown_terminal(&mut self) -> anyhow::Result<()> {
        crossterm::terminal::disable_raw_mode()?;
        crossterm::execute!(
            self.terminal.backend_mut(),
            crossterm::terminal::LeaveAlternateScreen,
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl<S> Drop for App<S> {
    fn drop(&mut self) {
        if let Err(e) = self.teardown_terminal() {
            log::warn!("failed to tear down terminal: {e}");
        } else {
            log::debug!("tear down terminal");
        }
    }
}

/// Everything the screen is drawn from.
#[derive(Debug)]
pub struct UiState<S> {
    selection: SelectionState,
    history: HistoryStore<S>,
    focus: Slot,
    input: Option<String>,
    cursor: usize,
    status: Option<String>,
}

impl<S: KeyValueStore> UiState<S> {
    /// Restores the saved history from `storage`.
    ///
    /// A history that cannot be read starts the session empty and is
    /// reported on the status line.
    pub fn open(storage: S, preset: Preset) -> Self {
        let mut history = HistoryStore::new(storage);
        let status = match history.load() {
            Ok(loaded) => {
                log::info!("restored {} color selections", loaded.len());
                None
            }
            Err(e) => {
                log::warn!("starting with an empty color history: {e}");
                Some(e.to_string())
            }
        };
        Self {
            selection: SelectionState::new(preset),
            history,
            focus: Slot::Emerald,
            input: None,
            cursor: 0,
            status,
        }
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn history(&self) -> &HistoryStore<S> {
        &self.history
    }

    pub fn focus(&self) -> Slot {
        self.focus
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn is_editing(&self) -> bool {
        self.input.is_some()
    }

    /// Applies one key press. Returns `true` when the application should quit.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }
        let plain = key.modifiers == KeyModifiers::NONE || key.modifiers == KeyModifiers::SHIFT;
        if let KeyCode::Char(_) = key.code {
            if !plain {
                return false;
            }
        }
        if self.input.is_some() {
            self.handle_input_key(key.code);
            return false;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                return true;
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right => {
                self.focus = self.focus.other();
            }
            KeyCode::Char('e') | KeyCode::Char('i') => {
                self.input = Some(self.selection.get(self.focus).to_string());
                self.status = None;
            }
            KeyCode::Enter | KeyCode::Char('a') => {
                self.commit();
            }
            KeyCode::Char('c') => {
                self.clear();
            }
            KeyCode::Up => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.cursor + 1 < self.history.len() {
                    self.cursor += 1;
                }
            }
            _ => {}
        }
        false
    }

    fn handle_input_key(&mut self, code: KeyCode) {
        let Some(input) = &mut self.input else {
            return;
        };
        match code {
            KeyCode::Char(c) if c.is_ascii_hexdigit() || c == '#' => {
                if input.len() < MAX_INPUT_LEN {
                    input.push(c);
                }
            }
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Esc => {
                self.input = None;
                self.status = None;
            }
            KeyCode::Enter => match input.parse::<HexColor>() {
                Ok(color) => {
                    self.selection.set(self.focus, color);
                    self.input = None;
                    self.status = None;
                }
                Err(e) => {
                    self.status = Some(e.to_string());
                }
            },
            _ => {}
        }
    }

    fn commit(&mut self) {
        let color = self.selection.get(self.focus);
        self.cursor = 0;
        self.status = match self.history.commit(color, self.focus) {
            Ok(()) => None,
            Err(e) => {
                log::warn!("{e}");
                Some(e.to_string())
            }
        };
    }

    fn clear(&mut self) {
        if self.history.is_empty() {
            return;
        }
        self.cursor = 0;
        self.status = match self.history.clear() {
            Ok(()) => None,
            Err(e) => {
                log::warn!("{e}");
                Some(e.to_string())
            }
        };
    }

    pub fn render(&self, f: &mut Frame) {
        let help = self.help_lines();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(9),
                Constraint::Min(SWATCH_HEIGHT + 4),
                Constraint::Length(help.len() as u16 + 2),
                Constraint::Length(1),
            ])
            .split(f.size());

        self.render_header(f, chunks[0]);
        self.render_pickers(f, chunks[1]);
        self.render_gallery(f, chunks[2]);
        self.render_help(f, chunks[3], help);
        self.render_status(f, chunks[4]);
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let paragraph = Paragraph::new(vec![
            Line::from(Span::styled(
                TITLE,
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(PROMPT, Style::default().fg(Color::Gray))),
        ])
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
        f.render_widget(paragraph, area);
    }

    fn render_pickers(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        for (slot, area) in Slot::ALL.into_iter().zip(chunks.iter()) {
            self.render_picker(f, *area, slot);
        }
    }

    fn render_picker(&self, f: &mut Frame, area: Rect, slot: Slot) {
        let focused = slot == self.focus;
        let mut block = self.make_block(slot.label());
        if focused {
            block = block
                .border_type(BorderType::Thick)
                .border_style(Style::default().fg(Color::Yellow));
        }
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(SWATCH_HEIGHT),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let color = self.selection.get(slot);
        let swatch_width = (SWATCH_WIDTH * 2).min(chunks[0].width);
        let swatch_area = Rect {
            x: chunks[0].x + (chunks[0].width - swatch_width) / 2,
            width: swatch_width,
            ..chunks[0]
        };
        let swatch = Paragraph::new(vec![Line::from(""), Line::from(color.to_string())])
            .alignment(Alignment::Center)
            .style(Style::default().bg(color.to_tui()).fg(color.contrast_text()));
        f.render_widget(swatch, swatch_area);

        let value = match &self.input {
            Some(input) if focused => Line::from(vec![
                Span::raw("> "),
                Span::styled(
                    format!("{input}_"),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ]),
            _ => Line::from(""),
        };
        f.render_widget(
            Paragraph::new(value).alignment(Alignment::Center),
            chunks[1],
        );

        let hint = if focused {
            "[Enter] Add to Gallery"
        } else {
            "Add to Gallery"
        };
        f.render_widget(
            Paragraph::new(Line::from(hint)).alignment(Alignment::Center),
            chunks[2],
        );
    }

    fn render_gallery(&self, f: &mut Frame, area: Rect) {
        let block = self.make_block("Color Gallery");
        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        f.render_widget(
            Paragraph::new(Line::from(count_label(self.history.len())))
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Gray)),
            chunks[0],
        );

        let history = self.history.history();
        if history.is_empty() {
            f.render_widget(
                Paragraph::new(Line::from(EMPTY_GALLERY))
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true }),
                chunks[1],
            );
            return;
        }

        self.render_swatches(f, chunks[1], history.as_slice());
        if let Some(selection) = history.get(self.cursor) {
            f.render_widget(
                Paragraph::new(Line::from(describe(selection))).alignment(Alignment::Center),
                chunks[2],
            );
        }
    }

    fn render_swatches(&self, f: &mut Frame, area: Rect, selections: &[ColorSelection]) {
        let grid = GalleryGrid::new(area);
        if grid.visible_rows() == 0 {
            return;
        }
        let first_row = grid.first_visible_row(self.cursor);
        let skip = first_row * grid.columns();
        let visible = grid.columns() * grid.visible_rows();

        for (i, selection) in selections.iter().enumerate().skip(skip).take(visible) {
            let cell = grid.cell_area(i - skip);
            let mut swatch = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(selection.slot.accent().to_tui()))
                .style(Style::default().bg(selection.color.to_tui()));
            if i == self.cursor {
                swatch = swatch.border_type(BorderType::Double);
            }
            f.render_widget(swatch, cell);
        }
    }

    fn help_lines(&self) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from("Quit:           'q' / ESC / CTRL-C keys"),
            Line::from("Switch slot:    TAB / LEFT / RIGHT keys"),
            Line::from("Edit color:     'e' key, then ENTER to apply / ESC to cancel"),
            Line::from("Add to gallery: ENTER / 'a' key"),
            Line::from("Browse gallery: UP / DOWN keys"),
        ];
        if !self.history.is_empty() {
            lines.push(Line::from("Clear history:  'c' key"));
        }
        lines
    }

    fn render_help(&self, f: &mut Frame, area: Rect, lines: Vec<Line<'static>>) {
        let paragraph = Paragraph::new(lines)
            .block(self.make_block("Help"))
            .alignment(Alignment::Left);
        f.render_widget(paragraph, area);
    }

    fn render_status(&self, f: &mut Frame, area: Rect) {
        if let Some(status) = &self.status {
            f.render_widget(
                Paragraph::new(Line::from(Span::styled(
                    status.as_str(),
                    Style::default().fg(Color::Red),
                ))),
                area,
            );
        }
    }

    fn make_block(&self, name: &str) -> Block<'static> {
        Block::default().borders(Borders::ALL).title(Span::styled(
            name.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ))
    }
}

/// Fixed-size swatch cells laid out left to right, then top to bottom.
#[derive(Debug, Clone, Copy)]
struct GalleryGrid {
    area: Rect,
}

impl GalleryGrid {
    fn new(area: Rect) -> Self {
        Self { area }
    }

    fn columns(&self) -> usize {
        usize::from((self.area.width + SWATCH_GAP) / (SWATCH_WIDTH + SWATCH_GAP)).max(1)
    }

    fn visible_rows(&self) -> usize {
        usize::from(self.area.height / SWATCH_HEIGHT)
    }

    /// Scrolls just enough to keep the row holding `cursor` on screen.
    fn first_visible_row(&self, cursor: usize) -> usize {
        let row = cursor / self.columns();
        (row + 1).saturating_sub(self.visible_rows())
    }

    fn cell_area(&self, index: usize) -> Rect {
        let col = (index % self.columns()) as u16;
        let row = (index / self.columns()) as u16;
        let x = self.area.x + col * (SWATCH_WIDTH + SWATCH_GAP);
        let y = self.area.y + row * SWATCH_HEIGHT;
        Rect {
            x,
            y,
            width: SWATCH_WIDTH.min(self.area.right().saturating_sub(x)),
            height: SWATCH_HEIGHT,
        }
    }
}

fn count_label(n: usize) -> String {
    format!("{n} color{} selected", if n == 1 { "" } else { "s" })
}

fn describe(selection: &ColorSelection) -> String {
    let mut text = format!("{} - {}", selection.slot.name(), selection.color);
    if let Some(at) = selection.committed_at() {
        let at = at.with_timezone(&chrono::Local);
        text.push_str(&format!(" ({})", at.format("%Y-%m-%d %H:%M:%S")));
    }
    text
}
