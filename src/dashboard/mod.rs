//! # Dashboard
//!
//! Full-screen terminal view: a text panel with the latest readings on the
//! left and the history charts on the right. Keys are polled without
//! blocking so the frame stream never waits on the operator.

pub mod charts;
pub mod view;

use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph};
use ratatui::Terminal;
use tracing::warn;

use crate::error::Result;
use crate::protocol::command::Key;
use crate::telemetry::history::ChartSeries;
use view::DashboardView;

/// Width of the readings panel in columns
const PANEL_WIDTH: u16 = 52;

const HELP_TEXT: &str = "a/b/c arm command  Enter send  Esc quit";

/// Operator input from one polled terminal event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Key(Key),
    Quit,
}

/// Map a terminal key event to operator input.
///
/// Raw mode swallows SIGINT, so Ctrl+C arrives here as a key and quits
/// like Esc. Release and repeat events are ignored.
pub fn translate_key(event: KeyEvent) -> Option<Input> {
    if event.kind != KeyEventKind::Press {
        return None;
    }

    let input = match event.code {
        KeyCode::Esc => Input::Quit,
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => Input::Quit,
        KeyCode::Char(c) => Input::Key(Key::Char(c)),
        KeyCode::Enter => Input::Key(Key::Enter),
        _ => Input::Key(Key::Other),
    };
    Some(input)
}

/// Lay out and draw one dashboard refresh.
pub fn render(f: &mut ratatui::Frame, view: &DashboardView, series: &[ChartSeries]) {
    let [body, footer] = Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(f.area());
    let [panel, charts_area] =
        Layout::horizontal([Constraint::Length(PANEL_WIDTH), Constraint::Min(0)]).areas(body);

    let lines: Vec<Line> = view
        .lines
        .iter()
        .map(|line| Line::raw(line.to_string()))
        .collect();
    let readings = Paragraph::new(lines).block(Block::bordered().title("power monitor"));
    f.render_widget(readings, panel);

    charts::render_grid(f, charts_area, series);

    let help = Paragraph::new(HELP_TEXT).style(Style::default().fg(Color::DarkGray));
    f.render_widget(help, footer);
}

/// Owns the terminal while the dashboard is shown.
///
/// Raw mode and the alternate screen are left again on drop, including
/// when the session ends with an error.
pub struct DashboardTerminal {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl DashboardTerminal {
    /// Switch the terminal into raw mode on the alternate screen
    pub fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e.into());
        }

        match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => Ok(Self { terminal }),
            Err(e) => {
                if let Err(restore) = restore_terminal(&mut io::stdout()) {
                    warn!("Failed to restore terminal: {}", restore);
                }
                Err(e.into())
            }
        }
    }

    /// Draw one refresh
    pub fn draw(&mut self, view: &DashboardView, series: &[ChartSeries]) -> Result<()> {
        self.terminal.draw(|f| render(f, view, series))?;
        Ok(())
    }

    /// Drain pending key events without blocking
    pub fn poll_inputs(&mut self) -> Result<Vec<Input>> {
        let mut inputs = Vec::new();
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if let Some(input) = translate_key(key) {
                    inputs.push(input);
                }
            }
        }
        Ok(inputs)
    }
}

/// Leave raw mode and the alternate screen, attempting both even if the
/// first fails.
fn restore_terminal<W: Write>(out: &mut W) -> io::Result<()> {
    let raw = disable_raw_mode();
    execute!(out, LeaveAlternateScreen)?;
    raw
}

impl Drop for DashboardTerminal {
    fn drop(&mut self) {
        if let Err(e) = restore_terminal(self.terminal.backend_mut()) {
            warn!("Failed to restore terminal: {}", e);
        }
        let _ = self.terminal.show_cursor();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::decoder::parse_frame;
    use crate::telemetry::history::HistoryBuffer;
    use ratatui::backend::TestBackend;
    use view::LinkStatus;

    const GOLDEN_LINE: &str =
        "16/1/1/1:12:0,255,255,79,69,33,34,33,176,118,7,110,0,1,0,27,3,36,37,36,37,128,32,21,0,7";

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_translate_letters_and_enter() {
        assert_eq!(translate_key(press(KeyCode::Char('a'))), Some(Input::Key(Key::Char('a'))));
        assert_eq!(translate_key(press(KeyCode::Enter)), Some(Input::Key(Key::Enter)));
        assert_eq!(translate_key(press(KeyCode::Tab)), Some(Input::Key(Key::Other)));
    }

    #[test]
    fn test_translate_quit_keys() {
        assert_eq!(translate_key(press(KeyCode::Esc)), Some(Input::Quit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(translate_key(ctrl_c), Some(Input::Quit));
    }

    #[test]
    fn test_release_ignored() {
        let mut release = press(KeyCode::Char('a'));
        release.kind = KeyEventKind::Release;
        assert_eq!(translate_key(release), None);
    }

    #[test]
    fn test_render_shows_readings_and_charts() {
        let mut history = HistoryBuffer::seeded(10).unwrap();
        history.append(parse_frame(GOLDEN_LINE).unwrap());
        let view = DashboardView::build(history.latest(), &LinkStatus::default());
        let series = history.all_chart_series();

        let mut terminal = Terminal::new(TestBackend::new(160, 48)).unwrap();
        terminal.draw(|f| render(f, &view, &series)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains(&format!("{:<30} = -0.1298", "power balance[W]")));
        assert!(text.contains("pv supply"));
        assert!(text.contains("Esc quit"));
    }

    #[test]
    fn test_restore_leaves_alternate_screen() {
        let mut out = Vec::new();
        restore_terminal(&mut out).unwrap();

        let mut expected = Vec::new();
        execute!(expected, LeaveAlternateScreen).unwrap();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_longest_line_fits_panel() {
        let status = LinkStatus {
            armed: Some(crate::protocol::command::Command::A),
            last_sent: Some(crate::protocol::command::Command::A),
            ..LinkStatus::default()
        };
        let frame = parse_frame(GOLDEN_LINE).unwrap();
        let view = DashboardView::build(Some(&frame), &status);
        let inner = usize::from(PANEL_WIDTH) - 2;
        for line in &view.lines {
            let text = line.to_string();
            assert!(text.chars().count() <= inner, "{:?} wider than panel", text);
        }
    }

    #[test]
    fn test_render_in_small_terminal() {
        let history = HistoryBuffer::seeded(3).unwrap();
        let view = DashboardView::build(history.latest(), &LinkStatus::default());
        let mut terminal = Terminal::new(TestBackend::new(20, 5)).unwrap();
        terminal
            .draw(|f| render(f, &view, &history.all_chart_series()))
            .unwrap();
    }
}
