// /app.rs
use crate::{
    case::{CaseFile, Side},
    context::Context,
    persona::RoleKind,
    session::{SendOutcome, Session, SessionBuilder, SessionSnapshot},
    settings::Settings,
    transport::{ChatTransport, OpenAiTransport},
    tui::{Tui, TuiEvent},
    ui::{Component, Courtroom, SideSelect},
};

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use std::sync::Arc;
use tokio::{sync::mpsc, task::JoinHandle};

/// What the shell asks of the engine task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    SendMessage(String),
    SwitchPersona(RoleKind),
    CallWitness(String),
    Quit,
}

#[derive(Debug)]
pub enum Action {
    Quit,
    StartSession(Side),
    Intent(Intent),
    Rejected(String),
}

pub struct App {
    running: bool,
    component: Box<dyn Component>,

    settings: Settings,
    case: Arc<CaseFile>,
    transport: OpenAiTransport,

    snapshot: Option<SessionSnapshot>,
    snapshot_receiver: Option<mpsc::UnboundedReceiver<SessionSnapshot>>,
    intent_sender: Option<mpsc::UnboundedSender<Intent>>,
    engine: Option<JoinHandle<()>>,

    action_sender: mpsc::UnboundedSender<Action>,
    action_receiver: mpsc::UnboundedReceiver<Action>,
}

fn context<'a>(
    case: &'a CaseFile,
    settings: &'a Settings,
    snapshot: &'a Option<SessionSnapshot>,
    transport: &OpenAiTransport,
) -> Context<'a> {
    Context {
        case,
        settings,
        snapshot: snapshot.as_ref(),
        online: transport.is_online(),
    }
}

impl App {
    pub fn new(settings: Settings, case: Arc<CaseFile>, transport: OpenAiTransport) -> Self {
        let (action_sender, action_receiver) = mpsc::unbounded_channel();
        Self {
            running: true,
            component: Box::new(SideSelect::default()),
            settings,
            case,
            transport,
            snapshot: None,
            snapshot_receiver: None,
            intent_sender: None,
            engine: None,
            action_sender,
            action_receiver,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?
            .tick_rate(10.0) // spinner frames
            .frame_rate(30.0);

        tui.enter()?;

        while self.running {
            tui.draw(|frame| {
                let context = context(&self.case, &self.settings, &self.snapshot, &self.transport);
                self.component
                    .render(frame.area(), frame.buffer_mut(), &context)
            })?;

            tokio::select! {
                Some(event) = tui.next() => self.handle_tui_event(event)?,
                Some(snapshot) = next_snapshot(&mut self.snapshot_receiver) => {
                    self.snapshot = Some(snapshot);
                }
                Some(action) = self.action_receiver.recv() => self.handle_action(action)?,
            }
        }

        self.shutdown().await;
        tui.exit()?;
        Ok(())
    }

    fn handle_tui_event(&mut self, event: TuiEvent) -> Result<()> {
        match event {
            TuiEvent::Key(key_event) => self.on_key(key_event)?,
            TuiEvent::Paste(text) => self.component.on_paste(&text),
            TuiEvent::Tick => {
                let context = context(&self.case, &self.settings, &self.snapshot, &self.transport);
                self.component.on_tick(&context);
            }
            TuiEvent::Error => log::warn!("Terminal event stream reported an error"),
            TuiEvent::Init | TuiEvent::Render | TuiEvent::Resize(_, _) => {}
        }
        Ok(())
    }

    fn on_key(&mut self, key_event: KeyEvent) -> Result<()> {
        let context = context(&self.case, &self.settings, &self.snapshot, &self.transport);
        if let Some(action) = self.component.on_key(key_event, &context) {
            self.handle_action(action)?
        };
        Ok(())
    }

    fn handle_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Quit => self.quit(),
            Action::StartSession(side) => self.start_session(side),
            Action::Intent(intent) => self.dispatch(intent),
            Action::Rejected(reason) => self.component.notify(reason),
        }
        Ok(())
    }

    fn start_session(&mut self, side: Side) {
        let (snapshot_sender, snapshot_receiver) = mpsc::unbounded_channel();
        let (intent_sender, intent_receiver) = mpsc::unbounded_channel();

        let builder = Session::builder(side, self.transport.clone(), Arc::clone(&self.case))
            .config(self.settings.session_config())
            .observer(snapshot_sender);
        self.engine = Some(tokio::spawn(drive(
            builder,
            intent_receiver,
            self.action_sender.clone(),
        )));

        self.snapshot = None;
        self.snapshot_receiver = Some(snapshot_receiver);
        self.intent_sender = Some(intent_sender);
        self.component = Box::new(Courtroom::new(side));
    }

    fn dispatch(&mut self, intent: Intent) {
        let delivered = self
            .intent_sender
            .as_ref()
            .is_some_and(|sender| sender.send(intent).is_ok());
        if !delivered {
            log::error!("Intent dropped, the session task is gone");
            self.component.notify("The session has ended.".to_string());
        }
    }

    fn quit(&mut self) {
        self.running = false;
    }

    async fn shutdown(&mut self) {
        if let Some(sender) = self.intent_sender.take() {
            let _ = sender.send(Intent::Quit);
        }
        if let Some(engine) = self.engine.take() {
            // A transport call in flight is not worth waiting for.
            engine.abort();
            let _ = engine.await;
        }
    }
}

async fn next_snapshot(
    receiver: &mut Option<mpsc::UnboundedReceiver<SessionSnapshot>>,
) -> Option<SessionSnapshot> {
    match receiver {
        Some(receiver) => receiver.recv().await,
        None => std::future::pending().await,
    }
}

/// The engine task: sole owner of the session, serving one intent at a time.
pub async fn drive<T>(
    builder: SessionBuilder<T>,
    mut intents: mpsc::UnboundedReceiver<Intent>,
    actions: mpsc::UnboundedSender<Action>,
) where
    T: ChatTransport + 'static,
{
    let mut session = builder.start().await;

    while let Some(intent) = intents.recv().await {
        let outcome = match intent {
            Intent::SendMessage(text) => session.send_message(&text).await.map(|outcome| {
                if let SendOutcome::TransportFailed(notice) = outcome {
                    log::warn!("{notice}");
                }
            }),
            Intent::SwitchPersona(role) => session.switch_persona(role),
            Intent::CallWitness(id) => session.call_witness(&id),
            Intent::Quit => break,
        };

        if let Err(rejection) = outcome {
            log::info!("Rejected: {rejection}");
            let _ = actions.send(Action::Rejected(rejection.to_string()));
        }

        session.settle().await;
    }

    log::info!("Session closed with {} turns on record", session.state().log.len());
}
