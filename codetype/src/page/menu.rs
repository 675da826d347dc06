use super::{Message, practice::Practice};

use crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{
    layout::Constraint,
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, List, Padding},
};

use crate::{
    config::Config,
    utils::{KeyEventHelper, center},
};

/// Page: Main menu
///
/// Lists the languages of the snippet catalog.
#[derive(Debug)]
pub struct Menu {
    languages: Vec<String>,
    index: usize,
}

impl Menu {
    /// Creates a new menu with the configured default language selected
    pub fn new(config: &Config) -> Self {
        let languages: Vec<String> = config
            .catalog
            .languages()
            .into_iter()
            .map(str::to_string)
            .collect();

        let index = languages
            .iter()
            .position(|language| *language == config.settings.default_language)
            .unwrap_or(0);

        Self { languages, index }
    }

    pub fn selected(&self) -> Option<&str> {
        self.languages.get(self.index).map(String::as_str)
    }
}

// Rendering logic
impl Menu {
    pub fn render(
        &self,
        frame: &mut ratatui::Frame,
        area: ratatui::prelude::Rect,
        config: &Config,
    ) {
        let area = center(area, Constraint::Percentage(80), Constraint::Percentage(80));

        let items = self.languages.iter().enumerate().map(|(i, language)| {
            let mut selector = "  ";
            let style = if i == self.index {
                selector = "> ";
                Style::new()
                    .fg(config.settings.theme.text.highlight)
                    .reversed()
            } else {
                Style::new()
            };
            Line::from(Span::styled(format!("{selector}{language}"), style))
        });

        let list = List::new(items);
        let height = list.len() as u16 + 1;
        let padding = Padding::top(area.height.saturating_sub(height) / 2);
        let area = Block::new().padding(padding).inner(area);

        frame.render_widget(
            list.block(Block::new().title("Select Language (<Enter> to start)")),
            area,
        );
    }

    pub fn handle_events(&mut self, event: &Event, config: &Config) -> Option<Message> {
        if let Event::Key(key) = event
            && key.is_press()
        {
            return self.handle_key(key, config);
        }

        None
    }
}

// Event handlers
impl Menu {
    fn handle_key(&mut self, key: &KeyEvent, config: &Config) -> Option<Message> {
        if self.languages.is_empty() {
            return None;
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                decrement_index(&mut self.index, self.languages.len());
            }
            KeyCode::Down | KeyCode::Char('j') => {
                increment_index(&mut self.index, self.languages.len());
            }
            KeyCode::Enter => {
                let language = self.selected()?;
                return Some(match Practice::new(config, language) {
                    Ok(practice) => Message::Show(practice.into()),
                    Err(error) => Message::Error(Box::new(error)),
                });
            }
            _ => (),
        };

        None
    }
}

const fn decrement_index(index: &mut usize, len: usize) {
    *index = if *index == 0 { len - 1 } else { *index - 1 }
}

const fn increment_index(index: &mut usize, len: usize) {
    *index = (*index + 1) % len
}
