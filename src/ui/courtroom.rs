// ui/courtroom.rs

use super::{
    Component,
    spinner::{Spinner, spinner_frame},
};
use crate::{
    app::{Action, Intent},
    case::{CaseFile, EvidenceFilter, Side},
    command::SlashCommand,
    context::Context,
    error::CommandError,
    impact::Metrics,
    session::TurnOwner,
    transcript::{Speaker, Turn},
};
use chrono::{DateTime, Local};
use crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Gauge, Paragraph, Tabs, Widget, Wrap},
};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};
use tui_input::{Input, InputRequest, backend::crossterm::EventHandler};

const SCROLL_STEP: usize = 5;
const STATEMENT_PREVIEW: usize = 120;
const KEY_HINT: &str = concat!(
    "Enter to speak | /help for commands | Tab to switch panels | ",
    "PgUp/PgDn to scroll | Esc to leave"
);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumIter)]
pub enum SidebarTab {
    #[default]
    Case,
    Witnesses,
    Timeline,
    Evidence,
    Notes,
    Tactics,
}

impl SidebarTab {
    fn index(self) -> usize {
        SidebarTab::iter().position(|tab| tab == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        let count = SidebarTab::iter().count();
        SidebarTab::iter()
            .nth((self.index() + 1) % count)
            .unwrap_or_default()
    }

    fn previous(self) -> Self {
        let count = SidebarTab::iter().count();
        SidebarTab::iter()
            .nth((self.index() + count - 1) % count)
            .unwrap_or_default()
    }
}

/// A private jotting; never sent to the court.
#[derive(Debug, Clone)]
pub struct Note {
    pub content: String,
    pub timestamp: DateTime<Local>,
}

#[derive(Debug)]
pub struct Courtroom {
    side: Side,
    input: Input,
    tab: SidebarTab,
    evidence: EvidenceFilter,
    notes: Vec<Note>,
    scroll: usize,
    spinner: Spinner,
    show_help: bool,
    status: Option<String>,
}

impl Courtroom {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            input: Input::default(),
            tab: SidebarTab::default(),
            evidence: EvidenceFilter::default(),
            notes: Vec::new(),
            scroll: 0,
            spinner: Spinner::new(),
            // The command catalog greets a fresh session until the first submit or Tab.
            show_help: true,
            status: None,
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn input_value(&self) -> &str {
        self.input.value()
    }

    fn submit(&mut self, context: &Context) -> Option<Action> {
        let line = self.input.value().trim().to_string();
        if line.is_empty() {
            return None;
        }
        self.show_help = false;

        match SlashCommand::parse(&line) {
            None if !context.accepts_speech() => {
                self.status = Some("The court has the floor. Wait for your turn.".to_string());
                None
            }
            None => {
                self.input.reset();
                self.scroll = 0;
                self.status = None;
                Some(Action::Intent(Intent::SendMessage(line)))
            }
            Some(Err(err)) => {
                self.status = Some(err.to_string());
                None
            }
            Some(Ok(command)) => {
                self.input.reset();
                self.status = None;
                self.run_command(command, context)
            }
        }
    }

    fn run_command(&mut self, command: SlashCommand, context: &Context) -> Option<Action> {
        match command {
            SlashCommand::Address(role) => Some(Action::Intent(Intent::SwitchPersona(role))),
            SlashCommand::Call(id) => {
                self.scroll = 0;
                Some(Action::Intent(Intent::CallWitness(id)))
            }
            SlashCommand::Note(content) => {
                self.notes.insert(
                    0,
                    Note {
                        content,
                        timestamp: Local::now(),
                    },
                );
                self.tab = SidebarTab::Notes;
                None
            }
            SlashCommand::Unnote(number) => {
                if number <= self.notes.len() {
                    self.notes.remove(number - 1);
                } else {
                    let err = CommandError::InvalidNoteIndex(number.to_string());
                    self.status = Some(err.to_string());
                }
                None
            }
            SlashCommand::Template(id) => {
                match context.case.template(&id) {
                    Some(template) => self.input = Input::new(template.text.clone()),
                    None => self.status = Some(format!("No tactical template '{id}'")),
                }
                None
            }
            SlashCommand::Filter(filter) => {
                self.evidence = filter;
                self.tab = SidebarTab::Evidence;
                None
            }
            SlashCommand::Help => {
                self.show_help = true;
                None
            }
            SlashCommand::Quit => Some(Action::Quit),
        }
    }

    fn render_header(&self, buffer: &mut Buffer, area: Rect, context: &Context) {
        let details = &context.case.details;
        let (turn, turn_style) = match context.snapshot.map(|snapshot| snapshot.state.turn) {
            Some(TurnOwner::User) => ("YOUR TURN", Style::default().fg(Color::Green)),
            Some(TurnOwner::Opponent) => ("OPPONENT MOVING", Style::default().fg(Color::Red)),
            None => ("COURT OPENING", Style::default().fg(Color::DarkGray)),
        };
        let target = context
            .snapshot
            .map_or("...", |snapshot| snapshot.persona_name.as_str());

        let lines = vec![
            Line::from(vec![
                Span::styled(
                    details.title.as_str(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(
                    " | Day {} of {} | {}",
                    details.day, details.total_days, details.location
                )),
            ]),
            Line::from(vec![
                Span::styled(
                    format!("{} CONSOLE", self.side.party().to_uppercase()),
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw(" | "),
                Span::styled(turn, turn_style.add_modifier(Modifier::BOLD)),
                Span::raw(" | Target: "),
                Span::styled(target, Style::default().fg(Color::Cyan)),
            ]),
        ];
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::BOTTOM)
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .render(area, buffer);
    }

    fn render_transcript(&self, buffer: &mut Buffer, area: Rect, context: &Context) {
        let block = Block::default()
            .title(" Court Record ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Green));
        let inner = block.inner(area);
        block.render(area, buffer);

        let Some(snapshot) = context.snapshot else {
            Paragraph::new("Court will be in session momentarily.")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray))
                .render(inner, buffer);
            return;
        };

        let width = usize::from(inner.width.saturating_sub(1)).max(10);
        let height = usize::from(inner.height);
        let lines = transcript_lines(snapshot.state.log.all(), width);
        let bottom = lines.len().saturating_sub(self.scroll);
        let top = bottom.saturating_sub(height);
        let visible: Vec<Line> = lines[top..bottom].to_vec();
        Paragraph::new(visible).render(inner, buffer);
    }

    fn render_sidebar(&self, buffer: &mut Buffer, area: Rect, context: &Context) {
        let [tabs_area, body] =
            Layout::vertical([Constraint::Length(2), Constraint::Min(1)]).areas(area);

        Tabs::new(SidebarTab::iter().map(|tab| tab.to_string()))
            .select(self.tab.index())
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .divider("|")
            .block(Block::default().borders(Borders::BOTTOM))
            .render(tabs_area, buffer);

        let lines = if self.show_help {
            help_lines(self.side)
        } else {
            match self.tab {
                SidebarTab::Case => case_lines(context.case, self.side),
                SidebarTab::Witnesses => witness_lines(context),
                SidebarTab::Timeline => timeline_lines(context.case),
                SidebarTab::Evidence => evidence_lines(context.case, self.evidence),
                SidebarTab::Notes => self.note_lines(),
                SidebarTab::Tactics => tactic_lines(context.case),
            }
        };

        let title = if self.show_help {
            " Commands ".to_string()
        } else {
            format!(" {} ", self.tab)
        };
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .render(body, buffer);
    }

    fn note_lines(&self) -> Vec<Line<'static>> {
        if self.notes.is_empty() {
            return vec![Line::from(Span::styled(
                "No notes. Use /note <text>.",
                Style::default().fg(Color::DarkGray),
            ))];
        }
        self.notes
            .iter()
            .enumerate()
            .map(|(i, note)| {
                Line::from(vec![
                    Span::styled(format!("{}. ", i + 1), Style::default().fg(Color::Yellow)),
                    Span::styled(
                        format!("{} ", note.timestamp.format("%H:%M")),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw(note.content.clone()),
                ])
            })
            .collect()
    }

    fn render_input(&self, buffer: &mut Buffer, area: Rect, context: &Context) {
        let ready = context.accepts_speech();
        let title = match context.snapshot {
            Some(snapshot) if ready => format!(" Address {} ", snapshot.persona_name),
            _ => " Input disabled while the court speaks ".to_string(),
        };
        let color = if ready { Color::White } else { Color::DarkGray };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(color));
        let inner = block.inner(area);
        block.render(area, buffer);

        let width = usize::from(inner.width.max(1)) - 1;
        let scroll = self.input.visual_scroll(width);
        let value: String = self.input.value().chars().skip(scroll).collect();
        let cursor = self.input.visual_cursor().saturating_sub(scroll);
        let (before, rest) = split_at_char(&value, cursor);
        let (under, after) = split_at_char(rest, 1);
        let under = if under.is_empty() { " " } else { under };

        Paragraph::new(Line::from(vec![
            Span::styled(before.to_string(), Style::default().fg(Color::Yellow)),
            Span::styled(
                under.to_string(),
                Style::default().add_modifier(Modifier::REVERSED),
            ),
            Span::styled(after.to_string(), Style::default().fg(Color::Yellow)),
        ]))
        .render(inner, buffer);
    }

    fn render_status(&self, buffer: &mut Buffer, area: Rect, context: &Context) {
        let (text, color) = match (context.snapshot, &self.status) {
            (Some(snapshot), _) if snapshot.thinking => (
                spinner_frame(&self.spinner, &snapshot.persona_name),
                Color::Green,
            ),
            (_, Some(status)) => (status.clone(), Color::Red),
            _ => (KEY_HINT.to_string(), Color::DarkGray),
        };
        Paragraph::new(text)
            .style(Style::default().fg(color))
            .alignment(Alignment::Center)
            .render(area, buffer);
    }
}

impl Component for Courtroom {
    fn on_key(&mut self, key: KeyEvent, context: &Context) -> Option<Action> {
        match key.code {
            KeyCode::Esc => Some(Action::Quit),
            KeyCode::Tab => {
                self.show_help = false;
                self.tab = self.tab.next();
                None
            }
            KeyCode::BackTab => {
                self.show_help = false;
                self.tab = self.tab.previous();
                None
            }
            KeyCode::PageUp => {
                self.scroll += SCROLL_STEP;
                None
            }
            KeyCode::PageDown => {
                self.scroll = self.scroll.saturating_sub(SCROLL_STEP);
                None
            }
            KeyCode::Enter => self.submit(context),
            _ => {
                self.input.handle_event(&Event::Key(key));
                None
            }
        }
    }

    fn on_paste(&mut self, text: &str) {
        for ch in text.chars().filter(|ch| !ch.is_control()) {
            self.input.handle(InputRequest::InsertChar(ch));
        }
    }

    fn on_tick(&mut self, context: &Context) {
        if context.snapshot.is_some_and(|snapshot| snapshot.thinking) {
            self.spinner.next_frame();
        }
    }

    fn notify(&mut self, message: String) {
        self.status = Some(message);
    }

    fn render(&self, area: Rect, buffer: &mut Buffer, context: &Context) {
        let [header, metrics, body, input, status] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(area);

        self.render_header(buffer, header, context);
        render_metrics(
            buffer,
            metrics,
            context
                .snapshot
                .map_or_else(Metrics::default, |snapshot| snapshot.state.metrics),
        );

        let [transcript, sidebar] =
            Layout::horizontal([Constraint::Percentage(65), Constraint::Percentage(35)])
                .areas(body);
        self.render_transcript(buffer, transcript, context);
        self.render_sidebar(buffer, sidebar, context);
        self.render_input(buffer, input, context);
        self.render_status(buffer, status, context);
    }
}

fn render_metrics(buffer: &mut Buffer, area: Rect, metrics: Metrics) {
    let areas: [Rect; 3] = Layout::horizontal([Constraint::Ratio(1, 3); 3]).areas(area);
    let gauges = [
        ("Case Strength", metrics.case_strength, Color::Blue),
        ("Jury Sentiment", metrics.jury_sentiment, Color::Magenta),
        ("Evidence", metrics.evidence_score, Color::Green),
    ];
    for ((label, value, color), area) in gauges.into_iter().zip(areas) {
        Gauge::default()
            .block(
                Block::default()
                    .title(format!(" {label} "))
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded),
            )
            .gauge_style(Style::default().fg(color))
            .percent(u16::from(value))
            .render(area, buffer);
    }
}

/// Lays out the court record: a speaker line per turn followed by the wrapped content.
pub fn transcript_lines(turns: &[Turn], width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for turn in turns {
        let (color, alignment) = match turn.speaker {
            Speaker::User => (Color::Cyan, Alignment::Right),
            Speaker::Ai(_) => (Color::Green, Alignment::Left),
            Speaker::System => (Color::Yellow, Alignment::Center),
        };
        let time = turn.timestamp.with_timezone(&Local).format("%H:%M");

        if turn.speaker != Speaker::System {
            lines.push(
                Line::from(Span::styled(
                    format!("{} · {time}", turn.persona_name),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ))
                .alignment(alignment),
            );
        }
        for wrapped in textwrap::wrap(&turn.content, width) {
            lines.push(
                Line::from(Span::styled(wrapped.into_owned(), Style::default().fg(color)))
                    .alignment(alignment),
            );
        }
        lines.push(Line::default());
    }
    lines
}

fn split_at_char(text: &str, chars: usize) -> (&str, &str) {
    match text.char_indices().nth(chars) {
        Some((index, _)) => text.split_at(index),
        None => (text, ""),
    }
}

fn heading(text: impl Into<String>) -> Line<'static> {
    Line::from(Span::styled(
        text.into(),
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    ))
}

fn case_lines(case: &CaseFile, side: Side) -> Vec<Line<'static>> {
    let details = &case.details;
    let mentor = case.mentor(side);
    let mut lines = vec![
        heading(details.title.clone()),
        Line::from(format!("Defendant: {}", details.defendant)),
        Line::from(format!("Charge: {}", details.charge)),
        Line::from(format!("Judge: {}", details.presiding_judge)),
        Line::from(format!("You: {}", side.role_label())),
        Line::from(format!("Opposing: {}", case.adversary(side).name)),
        Line::default(),
        Line::from(details.description.get(side).clone()),
        Line::default(),
        heading(format!("{} advises", mentor.name)),
    ];
    lines.extend(mentor.points.iter().map(|point| Line::from(format!("- {point}"))));
    lines
}

fn witness_lines(context: &Context) -> Vec<Line<'static>> {
    let on_stand = context
        .snapshot
        .and_then(|snapshot| snapshot.state.active_witness.as_ref())
        .map(|witness| witness.id.clone());

    let mut lines = Vec::new();
    for witness in context.case.witnesses() {
        let mut title = vec![
            Span::styled(
                format!("{} ", witness.id),
                Style::default().fg(Color::Cyan),
            ),
            Span::styled(
                witness.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" ({:?})", witness.side)),
        ];
        if on_stand.as_deref() == Some(witness.id.as_str()) {
            title.push(Span::styled(" ON STAND", Style::default().fg(Color::Red)));
        }
        lines.push(Line::from(title));
        lines.push(Line::from(witness.role.clone()));
        lines.push(Line::from(Span::styled(
            witness.description.clone(),
            Style::default().fg(Color::DarkGray),
        )));
        if !witness.facts.is_empty() {
            lines.push(Line::from(Span::styled(
                "Key facts",
                Style::default().add_modifier(Modifier::UNDERLINED),
            )));
            lines.extend(witness.facts.iter().map(|fact| Line::from(format!("- {fact}"))));
        }
        lines.push(Line::from(Span::styled(
            format!("\"{}\"", preview(&witness.statement, STATEMENT_PREVIEW)),
            Style::default().add_modifier(Modifier::ITALIC),
        )));
        lines.push(Line::default());
    }
    lines.push(Line::from(Span::styled(
        "Call a witness with /call <id>",
        Style::default().fg(Color::DarkGray),
    )));
    lines
}

fn timeline_lines(case: &CaseFile) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for event in case.timeline() {
        let pin = if event.pinned { "* " } else { "" };
        lines.push(Line::from(vec![
            Span::styled(format!("{pin}{} ", event.date), Style::default().fg(Color::DarkGray)),
            Span::styled(format!("[{}] ", event.kind), Style::default().fg(Color::Magenta)),
            Span::styled(
                event.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]));
        lines.push(Line::from(event.description.clone()));
        for attachment in &event.attachments {
            lines.push(Line::from(Span::styled(
                format!("  attached: {}", attachment.name),
                Style::default().fg(Color::DarkGray),
            )));
        }
        for step in &event.ai_chain {
            lines.push(Line::from(Span::styled(
                format!("  > {}: {}", step.step, step.detail),
                Style::default().fg(Color::Cyan),
            )));
        }
        if !event.tags.is_empty() {
            lines.push(Line::from(Span::styled(
                event
                    .tags
                    .iter()
                    .map(|tag| format!("#{tag}"))
                    .collect::<Vec<_>>()
                    .join(" "),
                Style::default().fg(Color::Blue),
            )));
        }
        lines.push(Line::default());
    }
    lines
}

fn evidence_lines(case: &CaseFile, filter: EvidenceFilter) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        Span::raw("Showing: "),
        Span::styled(filter.to_string(), Style::default().fg(Color::Yellow)),
    ])];
    let mut found = false;
    for (event, attachment) in case.evidence(filter) {
        found = true;
        lines.push(Line::from(vec![
            Span::styled(
                format!("[{:?}] ", attachment.kind),
                Style::default().fg(Color::Magenta),
            ),
            Span::styled(
                attachment.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]));
        lines.push(Line::from(Span::styled(
            format!("  {} | {}", event.date, event.title),
            Style::default().fg(Color::DarkGray),
        )));
    }
    if !found {
        lines.push(Line::from(Span::styled(
            "Nothing on file of that kind.",
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "Narrow with /filter <all|document|image|pdf>",
        Style::default().fg(Color::DarkGray),
    )));
    lines
}

/// The first `limit` characters, with an ellipsis when anything was cut.
fn preview(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((index, _)) => format!("{}...", &text[..index]),
        None => text.to_string(),
    }
}

fn tactic_lines(case: &CaseFile) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for category in case.templates() {
        lines.push(heading(category.title.clone()));
        for template in &category.templates {
            lines.push(Line::from(vec![
                Span::styled(format!("{} ", template.id), Style::default().fg(Color::Cyan)),
                Span::raw(template.label.clone()),
            ]));
            if let Some(description) = &template.description {
                lines.push(Line::from(Span::styled(
                    format!("  {description}"),
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }
        lines.push(Line::default());
    }
    lines.push(Line::from(Span::styled(
        "Load one with /template <id>",
        Style::default().fg(Color::DarkGray),
    )));
    lines
}

fn help_lines(side: Side) -> Vec<Line<'static>> {
    SlashCommand::catalog(side)
        .into_iter()
        .map(|entry| {
            Line::from(vec![
                Span::styled(
                    format!("{:<18}", entry.usage),
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw(entry.description),
            ])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        persona::RoleKind,
        session::{SessionSnapshot, SessionState},
        settings::Settings,
        transcript::Transcript,
    };
    use crossterm::event::KeyModifiers;

    fn snapshot(side: Side, turn: TurnOwner) -> SessionSnapshot {
        SessionSnapshot {
            state: SessionState {
                side,
                turn,
                active_role: RoleKind::Judge,
                active_witness: None,
                metrics: Metrics::default(),
                log: Transcript::new(),
            },
            persona_name: "Judge Morrison".to_string(),
            thinking: false,
            opponent_pending: false,
        }
    }

    fn type_line(courtroom: &mut Courtroom, context: &Context, text: &str) -> Option<Action> {
        for ch in text.chars() {
            courtroom.on_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE), context);
        }
        courtroom.on_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), context)
    }

    #[test]
    fn speech_becomes_a_send_intent() {
        let case = CaseFile::builtin().unwrap();
        let settings = Settings::default();
        let snapshot = snapshot(Side::Prosecution, TurnOwner::User);
        let context = Context {
            case: &case,
            settings: &settings,
            snapshot: Some(&snapshot),
            online: false,
        };
        let mut courtroom = Courtroom::new(Side::Prosecution);

        let action = type_line(&mut courtroom, &context, "The State calls its first witness.");
        assert!(matches!(
            action,
            Some(Action::Intent(Intent::SendMessage(ref text)))
                if text == "The State calls its first witness."
        ));
        assert_eq!(courtroom.input_value(), "");
    }

    #[test]
    fn speech_is_held_while_the_opponent_moves() {
        let case = CaseFile::builtin().unwrap();
        let settings = Settings::default();
        let snapshot = snapshot(Side::Defense, TurnOwner::Opponent);
        let context = Context {
            case: &case,
            settings: &settings,
            snapshot: Some(&snapshot),
            online: false,
        };
        let mut courtroom = Courtroom::new(Side::Defense);

        assert!(type_line(&mut courtroom, &context, "Objection!").is_none());
        assert_eq!(courtroom.input_value(), "Objection!");
        assert!(courtroom.status.is_some());
    }

    #[test]
    fn commands_are_routed() {
        let case = CaseFile::builtin().unwrap();
        let settings = Settings::default();
        let snapshot = snapshot(Side::Defense, TurnOwner::Opponent);
        let context = Context {
            case: &case,
            settings: &settings,
            snapshot: Some(&snapshot),
            online: false,
        };
        let mut courtroom = Courtroom::new(Side::Defense);

        assert!(matches!(
            type_line(&mut courtroom, &context, "/mentor"),
            Some(Action::Intent(Intent::SwitchPersona(RoleKind::Mentor)))
        ));
        assert!(matches!(
            type_line(&mut courtroom, &context, "/call miller"),
            Some(Action::Intent(Intent::CallWitness(ref id))) if id == "miller"
        ));
        assert!(type_line(&mut courtroom, &context, "/bogus").is_none());
        assert_eq!(
            courtroom.status.as_deref(),
            Some("Unknown command: /bogus")
        );
    }

    #[test]
    fn notes_are_kept_newest_first() {
        let case = CaseFile::builtin().unwrap();
        let settings = Settings::default();
        let context = Context {
            case: &case,
            settings: &settings,
            snapshot: None,
            online: false,
        };
        let mut courtroom = Courtroom::new(Side::Defense);

        type_line(&mut courtroom, &context, "/note first");
        type_line(&mut courtroom, &context, "/note second");
        let contents: Vec<&str> = courtroom.notes().iter().map(|n| n.content.as_str()).collect();
        assert_eq!(contents, ["second", "first"]);
        assert_eq!(courtroom.tab, SidebarTab::Notes);

        type_line(&mut courtroom, &context, "/unnote 1");
        assert_eq!(courtroom.notes().len(), 1);
        assert_eq!(courtroom.notes()[0].content, "first");

        type_line(&mut courtroom, &context, "/unnote 5");
        assert_eq!(courtroom.notes().len(), 1);
    }

    #[test]
    fn templates_fill_the_input() {
        let case = CaseFile::builtin().unwrap();
        let template = case.templates()[0].templates[0].clone();
        let settings = Settings::default();
        let context = Context {
            case: &case,
            settings: &settings,
            snapshot: None,
            online: false,
        };
        let mut courtroom = Courtroom::new(Side::Defense);

        type_line(&mut courtroom, &context, &format!("/template {}", template.id));
        assert_eq!(courtroom.input_value(), template.text);
    }

    #[test]
    fn tabs_cycle_both_ways() {
        assert_eq!(SidebarTab::Case.next(), SidebarTab::Witnesses);
        assert_eq!(SidebarTab::Timeline.next(), SidebarTab::Evidence);
        assert_eq!(SidebarTab::Tactics.next(), SidebarTab::Case);
        assert_eq!(SidebarTab::Case.previous(), SidebarTab::Tactics);
    }

    #[test]
    fn transcript_aligns_by_speaker() {
        let turns = vec![
            Turn::system("Court is now in session."),
            Turn::new(Speaker::User, "Prosecutor", "Your Honor."),
            Turn::new(Speaker::Ai(RoleKind::Judge), "Judge Morrison", "Proceed."),
        ];
        let lines = transcript_lines(&turns, 40);
        // System: content + spacer. Others: speaker line + content + spacer.
        assert_eq!(lines.len(), 2 + 3 + 3);
        assert_eq!(lines[0].alignment, Some(Alignment::Center));
        assert_eq!(lines[2].alignment, Some(Alignment::Right));
        assert_eq!(lines[5].alignment, Some(Alignment::Left));
    }

    #[test]
    fn long_turns_wrap() {
        let turns = vec![Turn::new(
            Speaker::Ai(RoleKind::Opposing),
            "Prosecutor Vance",
            "word ".repeat(30),
        )];
        let lines = transcript_lines(&turns, 20);
        assert!(lines.len() > 4);
    }

    fn text(lines: &[Line]) -> String {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|span| span.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn a_fresh_courtroom_opens_on_the_command_catalog() {
        let case = CaseFile::builtin().unwrap();
        let settings = Settings::default();
        let context = Context {
            case: &case,
            settings: &settings,
            snapshot: None,
            online: false,
        };
        let mut courtroom = Courtroom::new(Side::Prosecution);
        assert!(courtroom.show_help);

        courtroom.on_key(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE), &context);
        assert!(!courtroom.show_help);
        assert_eq!(courtroom.tab, SidebarTab::Witnesses);
    }

    #[test]
    fn filter_command_narrows_the_evidence_tab() {
        let case = CaseFile::builtin().unwrap();
        let settings = Settings::default();
        let context = Context {
            case: &case,
            settings: &settings,
            snapshot: None,
            online: false,
        };
        let mut courtroom = Courtroom::new(Side::Defense);

        let everything = text(&evidence_lines(&case, courtroom.evidence));
        assert!(everything.contains("Crime_Scene.jpg"));
        assert!(everything.contains("Miller_Report.pdf"));

        assert!(type_line(&mut courtroom, &context, "/filter pdf").is_none());
        assert_eq!(courtroom.tab, SidebarTab::Evidence);
        assert_eq!(courtroom.evidence, EvidenceFilter::Pdf);

        let pdfs = text(&evidence_lines(&case, courtroom.evidence));
        assert!(pdfs.contains("Motion.pdf"));
        assert!(pdfs.contains("Forensics.pdf"));
        assert!(!pdfs.contains("Crime_Scene.jpg"));
        assert!(!pdfs.contains("Miller_Report.pdf"));
    }

    #[test]
    fn witness_cards_show_facts_and_a_statement_preview() {
        let case = CaseFile::builtin().unwrap();
        let settings = Settings::default();
        let context = Context {
            case: &case,
            settings: &settings,
            snapshot: None,
            online: false,
        };
        let miller = case.witness("miller").unwrap();

        let card = text(&witness_lines(&context));
        assert!(card.contains(&miller.facts[0]));
        let opening: String = miller.statement.chars().take(40).collect();
        assert!(card.contains(&opening));
    }

    #[test]
    fn previews_cut_on_char_boundaries() {
        assert_eq!(preview("short", 120), "short");
        assert_eq!(preview("héllo wörld", 4), "héll...");
    }
}
