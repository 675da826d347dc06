use crossterm::event::Event;
use ratatui::{Frame, layout::Rect, text::Line};
use web_time::{Duration, Instant};

pub mod error;
pub mod menu;
pub mod practice;

pub use error::Error;
pub use menu::Menu;
pub use practice::Practice;

use crate::{app::Message, config::Config};

macro_rules! make_page_enum {
    ($($t:tt),*) => {
        pub enum Page {
            $(
                $t(Box<$t>),
            )*
        }

        $(
            impl From<$t> for Page {
                fn from(value: $t) -> Page {
                    Page::$t(Box::new(value))
                }
            }
        )*
    };
}

make_page_enum!(Menu, Practice, Error);

impl Page {
    pub fn render(&mut self, frame: &mut Frame, area: Rect, config: &Config) {
        match self {
            Self::Menu(page) => page.render(frame, area, config),
            Self::Practice(page) => page.render(frame, area, config),
            Self::Error(page) => page.render(frame, area, config),
        }
    }

    pub fn render_top(&mut self, config: &Config) -> Option<Line<'_>> {
        match self {
            Self::Menu(_) => None,
            Self::Practice(page) => page.render_top(config),
            Self::Error(page) => page.render_top(config),
        }
    }

    pub fn handle_events(&mut self, event: &Event, config: &Config) -> Option<Message> {
        match self {
            Self::Menu(page) => page.handle_events(event, config),
            Self::Practice(page) => page.handle_events(event, config),
            Self::Error(page) => page.handle_events(event, config),
        }
    }

    pub fn poll(&mut self, config: &Config) -> Option<Message> {
        match self {
            Self::Menu(_) => None,
            Self::Practice(page) => page.poll(config),
            Self::Error(_) => None,
        }
    }

    /// How long the page can wait for input before it needs to be polled again
    pub fn time_until_next_poll(&self, now: Instant) -> Option<Duration> {
        match self {
            Self::Practice(page) => page.time_until_next_tick(now),
            Self::Menu(_) | Self::Error(_) => None,
        }
    }
}
