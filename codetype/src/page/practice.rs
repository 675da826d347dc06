use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use quill::{
    Classification, Key, Phase, ReferenceText, RunSession, cursor::CursorMapper,
    render::RenderingContext,
};
use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span, ToLine},
    widgets::{Clear, Paragraph},
};
use tracing::info;
use web_time::{Duration, Instant};

use crate::{
    catalog::CatalogError,
    config::{Config, theme::Theme},
    utils::{KeyEventHelper, ROUNDED_BLOCK, center, fade},
};

use super::Message;

/// Fade added per line of distance from the cursor's line
const FADE_STEP: f32 = 0.2;
const MAX_FADE: f32 = 0.6;

/// Page: Practice
///
/// One timed run over a random snippet of a language.
#[derive(Debug)]
pub struct Practice {
    language: String,
    session: RunSession,
}

impl Practice {
    /// Start a run over a random snippet of `language`
    pub fn new(config: &Config, language: &str) -> Result<Self, CatalogError> {
        let reference = pick_reference(config, language)?;
        let session = RunSession::from_reference(reference)
            .with_configuration(config.settings.engine_configuration());

        info!(language, "practice started");

        Ok(Self {
            language: language.to_string(),
            session,
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub const fn session(&self) -> &RunSession {
        &self.session
    }

    /// Replace the run with a new random snippet of the current language
    pub fn restart(&mut self, config: &Config) -> Result<(), CatalogError> {
        let reference = pick_reference(config, &self.language)?;
        self.session.restart(reference);
        info!(language = %self.language, "practice restarted");
        Ok(())
    }

    /// Switch to `language` and restart with one of its snippets
    pub fn select_language(&mut self, config: &Config, language: &str) -> Result<(), CatalogError> {
        let reference = pick_reference(config, language)?;
        self.language = language.to_string();
        self.session.restart(reference);
        info!(language, "language selected");
        Ok(())
    }

    pub fn time_until_next_tick(&self, now: Instant) -> Option<Duration> {
        self.session.time_until_next_tick(now)
    }
}

fn pick_reference(config: &Config, language: &str) -> Result<ReferenceText, CatalogError> {
    let snippet = config.catalog.pick_random(language)?;
    ReferenceText::new(snippet).ok_or_else(|| CatalogError::EmptyPool(language.to_string()))
}

// Rendering logic
impl Practice {
    pub fn render(&self, frame: &mut Frame, area: Rect, config: &Config) {
        let theme = &config.settings.theme;
        let reference = self.session.reference();
        let snapshot = self.session.snapshot();

        let area = center(area, Constraint::Percentage(90), Constraint::Percentage(90));
        let top = snapshot.scroll_top_line;
        let visible = top..top + area.height as usize;

        let lines: Vec<Line> = snapshot
            .lines(reference)
            .into_iter()
            .filter(|line| visible.contains(&line.line_index))
            .map(|line| {
                let distance = line.active_line_offset.unsigned_abs();
                let fade_percent = if config.settings.fade_distant_lines {
                    (distance as f32 * FADE_STEP).min(MAX_FADE)
                } else {
                    0.0
                };

                line.contents
                    .iter()
                    .map(|ctx| styled_character(ctx, theme, fade_percent))
                    .collect::<Line>()
            })
            .collect();

        frame.render_widget(Paragraph::new(lines), area);

        // The caret lives in the input, which is aligned with the reference's flat offsets
        let caret = self.session.buffer().caret();
        let flat_len = reference.flat_len();
        let position = CursorMapper::new(reference).position_of(caret.min(flat_len));
        let column = position.column + caret.saturating_sub(flat_len);

        if let Some((x, y)) = cursor_cell(area, top, position.line, column) {
            frame.set_cursor_position((x, y));
        }

        if snapshot.phase == Phase::Finished {
            self.render_results(frame, area, theme);
        }
    }

    fn render_results(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let metrics = self.session.metrics();
        let popup = center(area, Constraint::Length(44), Constraint::Length(8));

        let lines = vec![
            Line::default(),
            Line::from(format!("CPM: {}", metrics.chars_per_minute))
                .bold()
                .centered(),
            Line::from(format!("Accuracy: {}%", metrics.accuracy_percent))
                .bold()
                .centered(),
            Line::default(),
            "<CTRL-R> new snippet | <CTRL-L> next language"
                .to_line()
                .centered(),
            "<ESC> menu".to_line().centered(),
        ];

        let block = ROUNDED_BLOCK
            .title_top("Time's up!".to_line().bold().centered())
            .border_style(Style::new().fg(theme.text.highlight));

        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(lines).block(block), popup);
    }

    pub fn render_top(&self, _config: &Config) -> Option<Line<'_>> {
        let snapshot = self.session.snapshot();

        let status = match snapshot.phase {
            Phase::Idle => "start typing to begin".to_string(),
            Phase::Running | Phase::Finished => format!(
                "CPM: {} | ACC: {}%",
                snapshot.chars_per_minute, snapshot.accuracy_percent
            ),
        };

        Some(Line::raw(format!(
            "{} | {}s | {status}",
            self.language, snapshot.remaining_seconds
        )))
    }

    pub fn poll(&mut self, _config: &Config) -> Option<Message> {
        self.session.poll_timer(Instant::now());
        None
    }

    pub fn handle_events(&mut self, event: &Event, config: &Config) -> Option<Message> {
        match event {
            Event::Key(key) if key.is_press() => {
                if key.is_ctrl_press_char('r') {
                    return self.restart(config).err().map(error_message);
                }

                if key.is_ctrl_press_char('l') {
                    let next = config.catalog.next_language(&self.language)?.to_string();
                    return self.select_language(config, &next).err().map(error_message);
                }

                if let Some(engine_key) = engine_key(key) {
                    self.session.handle_key(engine_key, Instant::now());
                }

                None
            }
            Event::Paste(text) => {
                self.session
                    .handle_key(Key::Paste(text.clone()), Instant::now());
                None
            }
            _ => None,
        }
    }
}

/// Terminal cell of the caret inside `area`, if its line is scrolled into view
///
/// Columns past the right edge stick to the last cell.
fn cursor_cell(area: Rect, top: usize, line: usize, column: usize) -> Option<(u16, u16)> {
    let row = line.checked_sub(top)?;
    if row >= usize::from(area.height) || area.width == 0 {
        return None;
    }

    let column = column.min(usize::from(area.width) - 1);
    Some((area.x + column as u16, area.y + row as u16))
}

fn error_message(error: CatalogError) -> Message {
    Message::Error(Box::new(error))
}

/// Style a reference character by its classification
fn styled_character(ctx: &RenderingContext, theme: &Theme, fade_percent: f32) -> Span<'static> {
    let faded = |color| {
        if fade_percent > 0.0 {
            fade(color, theme.term_bg, fade_percent, false)
        } else {
            color
        }
    };

    let is_blank = ctx.character.is_whitespace();
    let style = match ctx.classification {
        Classification::Correct => Style::new().fg(faded(theme.text.correct)),
        // Mistyped whitespace has no glyph, so it is shown as a colored cell
        Classification::Incorrect if is_blank => Style::new().bg(faded(theme.text.incorrect)),
        Classification::Incorrect => Style::new()
            .fg(faded(theme.text.incorrect))
            .add_modifier(Modifier::BOLD),
        Classification::Current => Style::new()
            .fg(theme.term_fg)
            .add_modifier(Modifier::UNDERLINED),
        Classification::Pending => Style::new().fg(faded(theme.text.pending)),
    };

    let character = if ctx.character == '\n' {
        ' '
    } else {
        ctx.character
    };

    Span::styled(character.to_string(), style)
}

/// Translate a terminal key into an engine key
///
/// Keys with CTRL or ALT are left to the page and the app.
fn engine_key(key: &KeyEvent) -> Option<Key> {
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return None;
    }

    let extend = key.modifiers.contains(KeyModifiers::SHIFT);

    let engine_key = match key.code {
        KeyCode::Char(character) => Key::Char(character),
        KeyCode::Tab => Key::Tab,
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Left if extend => Key::SelectLeft,
        KeyCode::Left => Key::Left,
        KeyCode::Right if extend => Key::SelectRight,
        KeyCode::Right => Key::Right,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        _ => return None,
    };

    Some(engine_key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog::Catalog, config::Settings};

    fn config() -> Config {
        Config {
            settings: Settings::default(),
            catalog: Catalog::builtin(4).unwrap(),
        }
    }

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_engine_key_mapping() {
        let key = |code, modifiers| engine_key(&KeyEvent::new(code, modifiers));

        assert_eq!(key(KeyCode::Char('a'), KeyModifiers::NONE), Some(Key::Char('a')));
        assert_eq!(key(KeyCode::Char('A'), KeyModifiers::SHIFT), Some(Key::Char('A')));
        assert_eq!(key(KeyCode::Tab, KeyModifiers::NONE), Some(Key::Tab));
        assert_eq!(key(KeyCode::Enter, KeyModifiers::NONE), Some(Key::Enter));
        assert_eq!(key(KeyCode::Left, KeyModifiers::SHIFT), Some(Key::SelectLeft));
        assert_eq!(key(KeyCode::Right, KeyModifiers::NONE), Some(Key::Right));
        assert_eq!(key(KeyCode::Char('q'), KeyModifiers::CONTROL), None);
        assert_eq!(key(KeyCode::Esc, KeyModifiers::NONE), None);
    }

    #[test]
    fn test_cursor_cell_clamps_wide_columns() {
        let area = Rect::new(2, 3, 40, 10);

        assert_eq!(cursor_cell(area, 0, 0, 5), Some((7, 3)));
        assert_eq!(cursor_cell(area, 4, 6, 0), Some((2, 5)));
        // Far past the right edge, including columns that do not fit in a u16
        assert_eq!(cursor_cell(area, 0, 1, 70_000), Some((41, 4)));
        assert_eq!(cursor_cell(area, 0, 1, 65_536 + 3), Some((41, 4)));

        // Lines outside the scroll window get no cursor
        assert_eq!(cursor_cell(area, 4, 3, 0), None);
        assert_eq!(cursor_cell(area, 0, 10, 0), None);
        assert_eq!(cursor_cell(Rect::new(0, 0, 0, 5), 0, 0, 0), None);
    }

    #[test]
    fn test_new_practice_uses_language_pool() {
        let config = config();
        let practice = Practice::new(&config, "c").unwrap();

        assert_eq!(practice.language(), "c");
        assert!(practice.session().reference().line_at(0).starts_with("#include"));
        assert_eq!(practice.session().phase(), Phase::Idle);
        assert_eq!(practice.session().remaining_seconds(), 60);
    }

    #[test]
    fn test_unknown_language() {
        assert!(matches!(
            Practice::new(&config(), "cobol"),
            Err(CatalogError::UnknownLanguage(_))
        ));
    }

    #[test]
    fn test_typing_and_restart() {
        let config = config();
        let mut practice = Practice::new(&config, "python").unwrap();

        let first = practice.session().reference().chars()[0];
        practice.handle_events(&press(KeyCode::Char(first), KeyModifiers::NONE), &config);
        assert_eq!(practice.session().typed_count(), 1);
        assert_eq!(practice.session().phase(), Phase::Running);

        let message = practice.handle_events(
            &press(KeyCode::Char('r'), KeyModifiers::CONTROL),
            &config,
        );
        assert!(message.is_none());
        assert_eq!(practice.session().typed_count(), 0);
        assert_eq!(practice.session().phase(), Phase::Idle);
        assert_eq!(practice.language(), "python");
    }

    #[test]
    fn test_ctrl_l_cycles_language() {
        let config = config();
        let mut practice = Practice::new(&config, "javascript").unwrap();

        practice.handle_events(&press(KeyCode::Char('l'), KeyModifiers::CONTROL), &config);
        assert_eq!(practice.language(), "python");

        practice.handle_events(&press(KeyCode::Char('l'), KeyModifiers::CONTROL), &config);
        assert_eq!(practice.language(), "c");
        assert!(practice.session().reference().line_at(0).starts_with("#include"));
    }

    #[test]
    fn test_paste_and_global_keys() {
        let config = config();
        let mut practice = Practice::new(&config, "c").unwrap();

        practice.handle_events(&Event::Paste("#inc".to_string()), &config);
        assert_eq!(practice.session().typed_count(), 4);

        // Quit and back are left to the app
        assert!(
            practice
                .handle_events(&press(KeyCode::Char('q'), KeyModifiers::CONTROL), &config)
                .is_none()
        );
        assert_eq!(practice.session().typed_count(), 4);
    }
}
