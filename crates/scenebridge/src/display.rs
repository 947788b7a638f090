//! Status output: a ratatui panel for interactive use, log lines otherwise

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Terminal;
use scenebridge_core::StatusSnapshot;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

pub trait StatusView {
    fn render(&mut self, status: &StatusSnapshot) -> Result<()>;
}

/// Full-screen panel showing the current value and scene
pub struct TerminalPanel {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    universe: u16,
    channel: u16,
    log_file: Option<PathBuf>,
}

impl TerminalPanel {
    pub fn new(universe: u16, channel: u16, log_file: Option<PathBuf>) -> Result<Self> {
        Ok(Self {
            terminal: init_terminal()?,
            universe,
            channel,
            log_file,
        })
    }

    fn header(&self) -> Line<'static> {
        Line::from(format!(
            "sACN universe {} | channel {}",
            self.universe, self.channel
        ))
    }
}

impl StatusView for TerminalPanel {
    fn render(&mut self, status: &StatusSnapshot) -> Result<()> {
        let header = self.header();
        let (indicator, color) = if status.receiving {
            ("receiving", Color::Green)
        } else {
            ("no data", Color::Red)
        };

        let mut lines = vec![
            header,
            Line::from(""),
            Line::from(" Value | Scene").style(Style::default().fg(Color::Yellow)),
            Line::from(status.line()).style(Style::default().add_modifier(Modifier::BOLD)),
            Line::from(""),
            Line::from(vec![
                Span::raw("sACN: "),
                Span::styled(indicator, Style::default().fg(color)),
            ]),
        ];
        if let Some(notice) = &status.notice {
            lines.push(Line::from(notice.clone()).style(Style::default().fg(Color::Red)));
        }
        if let Some(path) = &self.log_file {
            lines.push(Line::from(format!("Log: {}", path.display())));
        }
        lines.push(Line::from("Press q to quit."));
        let height = lines.len() as u16 + 2;

        self.terminal.draw(|frame| {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(height), Constraint::Min(0)])
                .split(frame.area());
            frame.render_widget(
                Paragraph::new(Text::from(lines)).block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title("sACN -> LedFx"),
                ),
                rows[0],
            );
        })?;
        Ok(())
    }
}

impl Drop for TerminalPanel {
    fn drop(&mut self) {
        let _ = restore_terminal(&mut self.terminal);
    }
}

/// Daemon mode: status changes go to the log
#[derive(Default)]
pub struct HeadlessView {
    last: Option<StatusSnapshot>,
}

impl StatusView for HeadlessView {
    fn render(&mut self, status: &StatusSnapshot) -> Result<()> {
        if self.last.as_ref() != Some(status) {
            debug!(
                "Status:{} (receiving: {})",
                status.line(),
                status.receiving
            );
            self.last = Some(status.clone());
        }
        Ok(())
    }
}

fn init_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Forward `q`, `Esc` and Ctrl-C from the panel to `quit_tx`
pub fn spawn_input_task(quit_tx: UnboundedSender<()>) {
    tokio::task::spawn_blocking(move || {
        while !quit_tx.is_closed() {
            match event::poll(Duration::from_millis(100)) {
                Ok(true) => match event::read() {
                    Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                        let quit = match key.code {
                            KeyCode::Char('q') | KeyCode::Esc => true,
                            KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
                            _ => false,
                        };
                        if quit && quit_tx.send(()).is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(_) => break,
                },
                Ok(false) => {}
                Err(_) => break,
            }
        }
    });
}
