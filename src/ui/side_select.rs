// ui/side_select.rs

use super::{
    Component,
    constants::{ART, SIDE_HINT, TITLE},
    utils::center_rect,
};
use crate::{app::Action, case::Side, context::Context};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget, Wrap},
};

/// Splash screen where the user picks a side before court opens.
#[derive(Debug)]
pub struct SideSelect {
    selected: Side,
}

impl Default for SideSelect {
    fn default() -> Self {
        Self {
            selected: Side::Defense,
        }
    }
}

impl Component for SideSelect {
    fn on_key(&mut self, key: KeyEvent, _context: &Context) -> Option<Action> {
        match key.code {
            KeyCode::Char('d') | KeyCode::Char('D') => Some(Action::StartSession(Side::Defense)),
            KeyCode::Char('p') | KeyCode::Char('P') => {
                Some(Action::StartSession(Side::Prosecution))
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Char('h') | KeyCode::Char('l') => {
                self.selected = self.selected.opposite();
                None
            }
            KeyCode::Enter => Some(Action::StartSession(self.selected)),
            KeyCode::Esc | KeyCode::Char('q') => Some(Action::Quit),
            _ => None,
        }
    }

    fn render(&self, area: Rect, buffer: &mut Buffer, context: &Context) {
        let [header, art, title, caption, choices, status] = Layout::vertical([
            Constraint::Max(1),
            Constraint::Length(if area.height > 40 { 14 } else { 0 }),
            Constraint::Length(6),
            Constraint::Length(4),
            Constraint::Min(8),
            Constraint::Max(1),
        ])
        .areas(area);

        render_header(buffer, header, context);
        if area.height > 40 {
            Paragraph::new(ART)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray))
                .render(art, buffer);
        }
        Paragraph::new(TITLE)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow))
            .render(title, buffer);
        render_caption(buffer, caption, context);
        self.render_choices(buffer, choices, context);

        Paragraph::new(SIDE_HINT)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .render(status, buffer);
    }
}

impl SideSelect {
    fn render_choices(&self, buffer: &mut Buffer, area: Rect, context: &Context) {
        let area = center_rect(area, Constraint::Length(90), Constraint::Length(8));
        let [defense, prosecution] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(area);

        for (side, key, area) in [
            (Side::Defense, 'd', defense),
            (Side::Prosecution, 'p', prosecution),
        ] {
            let color = if side == self.selected {
                Color::Yellow
            } else {
                Color::DarkGray
            };
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(color))
                .title(format!(" [{key}] {} ", side.role_label()));
            Paragraph::new(context.case.details.description.get(side).as_str())
                .wrap(Wrap { trim: true })
                .block(block)
                .render(area, buffer);
        }
    }
}

fn render_header(buffer: &mut Buffer, area: Rect, context: &Context) {
    let connection = if context.online {
        Span::styled("online", Style::default().fg(Color::Green))
    } else {
        Span::styled("offline", Style::default().fg(Color::Red))
    };
    let header = Line::from(vec![
        Span::raw(format!("Lex Simulacra v{} | ", env!("CARGO_PKG_VERSION"))),
        Span::raw(format!("{} | ", context.settings.model)),
        connection,
    ])
    .style(Style::default().fg(Color::DarkGray))
    .alignment(Alignment::Center);
    header.render(area, buffer);
}

fn render_caption(buffer: &mut Buffer, area: Rect, context: &Context) {
    let details = &context.case.details;
    let lines = vec![
        Line::from(Span::styled(
            details.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("{} | {}", details.charge, details.location)),
        Line::from(format!(
            "Day {} of {} | The Honorable {} presiding",
            details.day, details.total_days, details.presiding_judge
        )),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(area, buffer);
}
