use crossterm::event::KeyEvent;
use ratatui::{buffer::Buffer, layout::Rect};
use std::fmt::Debug;

use crate::{app::Action, context::Context};

pub trait Component: Debug + Send {
    fn on_key(&mut self, key: KeyEvent, context: &Context) -> Option<Action>;

    fn on_paste(&mut self, _text: &str) {}

    fn on_tick(&mut self, _context: &Context) {}

    /// A message for the user that did not come from the court record.
    fn notify(&mut self, _message: String) {}

    fn render(&self, area: Rect, buffer: &mut Buffer, context: &Context);
}
