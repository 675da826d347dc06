use std::io::stdout;

use crossterm::cursor::SetCursorStyle;
use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyModifiers,
};
use crossterm::execute;
use ratatui::{Frame, style::Stylize, text::ToLine, widgets::Padding};
use tracing::{error, info};
use web_time::{Duration, Instant};

use crate::config::Config;
use crate::page;
use crate::utils::ROUNDED_BLOCK;

/// Upper bound for waiting on input, so the screen keeps refreshing while idle
const MAX_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// An app message
pub enum Message {
    /// An error occurred
    Error(Box<dyn std::error::Error + Send>),
    /// Show a specific page
    Show(page::Page),
    /// Reset to the main menu
    Reset,
    /// Quit the application
    Quit,
}

/// The app itself
pub struct App {
    page: page::Page,
    config: Config,
}

impl App {
    /// Creates a new `App`
    ///
    /// With a `language`, a run of that language starts right away instead of the menu.
    pub fn new(config: Config, language: Option<&str>) -> Self {
        let page = match language {
            Some(language) => match page::Practice::new(&config, language) {
                Ok(practice) => practice.into(),
                Err(error) => page::Error::from(error).into(),
            },
            None => page::Menu::new(&config).into(),
        };
        Self { page, config }
    }

    /// Runs the app
    pub fn run(&mut self) -> std::io::Result<()> {
        let mut terminal = ratatui::init();

        execute!(stdout(), SetCursorStyle::SteadyBar, EnableBracketedPaste)?;
        info!("terminal ready");

        let result = self.event_loop(&mut terminal);

        execute!(stdout(), DisableBracketedPaste, SetCursorStyle::DefaultUserShape)?;
        ratatui::restore();

        result
    }

    fn event_loop(&mut self, terminal: &mut ratatui::DefaultTerminal) -> std::io::Result<()> {
        loop {
            terminal.draw(|frame| self.draw(frame))?;

            // Wake up in time for the next countdown tick
            let timeout = self
                .page
                .time_until_next_poll(Instant::now())
                .map_or(MAX_POLL_INTERVAL, |until| until.min(MAX_POLL_INTERVAL));

            let event = event::poll(timeout)?.then(event::read).transpose()?;
            if let Some(message) = self.handle_events(event) {
                match message {
                    Message::Error(error) => {
                        error!(%error, "page error");
                        self.page = page::Error::from(error).into();
                    }
                    Message::Show(page) => self.page = page,
                    Message::Reset => self.page = page::Menu::new(&self.config).into(),
                    Message::Quit => break,
                }
            }
        }

        info!("quitting");
        Ok(())
    }

    /// Draws the next frame
    fn draw(&mut self, frame: &mut Frame) {
        let mut block = ROUNDED_BLOCK
            .padding(Padding::new(1, 1, 0, 0))
            .title_top("CODETYPE".to_line().bold().centered())
            .title_top("<CTRL-Q> to exit".to_line().right_aligned());

        if let Some(top_msg) = self.page.render_top(&self.config) {
            block = block.title_top(top_msg);
        }

        let area = frame.area();
        let content = block.inner(area);

        frame.render_widget(block, area);

        self.page.render(frame, content, &self.config);
    }

    /// Global event handler
    ///
    /// The page sees every event first and is polled on every cycle, so the countdown advances
    /// without input.
    fn handle_events(&mut self, event_opt: Option<Event>) -> Option<Message> {
        event_opt
            .and_then(|event| {
                self.page.handle_events(&event, &self.config).or_else(|| {
                    match event {
                        Event::Key(key) => self.handle_key_event(key),
                        _ => None,
                    }
                })
            })
            .or_else(|| self.page.poll(&self.config))
    }

    /// Global key events
    const fn handle_key_event(&self, key: KeyEvent) -> Option<Message> {
        match (key.code, key.modifiers) {
            (KeyCode::Char('q'), KeyModifiers::CONTROL) => Some(Message::Quit),
            (KeyCode::Esc, KeyModifiers::NONE) => Some(Message::Reset),
            _ => None,
        }
    }
}
