//! The litigation session engine.
//!
//! [`Session`] is the single owner of the courtroom state: whose turn it is, which
//! persona the user is addressing, who is on the stand, the scoreboard and the
//! transcript. The shell drives it through a handful of async entry points and
//! receives [`SessionSnapshot`]s after every change.
//!
//! Automatic opponent turns are two-phase: an entry point *schedules* one (handing
//! the turn to the opponent and publishing that) and [`Session::settle`] plays it
//! after its pacing delay. While a turn is scheduled every user send is rejected.

use crate::case::{CaseFile, Side, Witness};
use crate::error::{InvalidTransition, TransportError};
use crate::impact::{self, Metrics};
use crate::persona::{self, Persona, RoleKind};
use crate::transcript::{Speaker, Transcript, Turn};
use crate::transport::ChatTransport;
use rand::{Rng, RngCore, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Scripted answer of a witness taking the oath.
pub const OATH_REPLY: &str = "I do.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnOwner {
    User,
    Opponent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub side: Side,
    pub turn: TurnOwner,
    pub active_role: RoleKind,
    pub active_witness: Option<Witness>,
    pub metrics: Metrics,
    pub log: Transcript,
}

/// Read-only view handed to the shell after every transition.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub persona_name: String,
    pub thinking: bool,
    pub opponent_pending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Chance that the opponent reacts after the judge answers the user.
    pub rebuttal_probability: f64,
    pub rebuttal_delay: Duration,
    pub opening_delay: Duration,
    /// Announce the session and read the judge's opening line at start.
    pub opening_docket: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rebuttal_probability: 0.2,
            rebuttal_delay: Duration::from_millis(1500),
            opening_delay: Duration::from_millis(2500),
            opening_docket: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Answered { rebuttal_scheduled: bool },
    TransportFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingTurn {
    instruction: String,
    delay: Duration,
}

pub struct SessionBuilder<T: ChatTransport> {
    side: Side,
    transport: T,
    case: Arc<CaseFile>,
    config: SessionConfig,
    rng: Option<Box<dyn RngCore + Send>>,
    observer: Option<mpsc::UnboundedSender<SessionSnapshot>>,
}

impl<T: ChatTransport> SessionBuilder<T> {
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    pub fn observer(mut self, observer: mpsc::UnboundedSender<SessionSnapshot>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Opens court and plays any automatic opening before handing control to the user.
    pub async fn start(self) -> Session<T> {
        let mut session = self.open();
        session.settle().await;
        session
    }

    /// Opens court without playing a scheduled opening statement.
    pub fn open(self) -> Session<T> {
        let mut config = self.config;
        if !config.rebuttal_probability.is_finite() {
            config.rebuttal_probability = 0.0;
        }
        config.rebuttal_probability = config.rebuttal_probability.clamp(0.0, 1.0);

        let persona = persona::resolve(RoleKind::Judge, self.side, None, &self.case);
        let chat = self.transport.configure(&persona);
        let rng = self
            .rng
            .unwrap_or_else(|| Box::new(StdRng::from_os_rng()));

        let mut session = Session {
            state: SessionState {
                side: self.side,
                turn: TurnOwner::User,
                active_role: RoleKind::Judge,
                active_witness: None,
                metrics: Metrics::default(),
                log: Transcript::new(),
            },
            case: self.case,
            transport: self.transport,
            chat,
            persona,
            thinking: false,
            pending: None,
            config,
            rng,
            observer: self.observer,
        };
        log::info!("Session opened, user plays the {}", session.state.side);
        session.open_court();
        session
    }
}

pub struct Session<T: ChatTransport> {
    state: SessionState,
    case: Arc<CaseFile>,
    transport: T,
    chat: T::Session,
    persona: Persona,
    thinking: bool,
    pending: Option<PendingTurn>,
    config: SessionConfig,
    rng: Box<dyn RngCore + Send>,
    observer: Option<mpsc::UnboundedSender<SessionSnapshot>>,
}

impl<T: ChatTransport> Session<T> {
    pub fn builder(side: Side, transport: T, case: Arc<CaseFile>) -> SessionBuilder<T> {
        SessionBuilder {
            side,
            transport,
            case,
            config: SessionConfig::default(),
            rng: None,
            observer: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    pub fn case(&self) -> &CaseFile {
        &self.case
    }

    pub fn is_thinking(&self) -> bool {
        self.thinking
    }

    pub fn opponent_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state.clone(),
            persona_name: self.persona.name.clone(),
            thinking: self.thinking,
            opponent_pending: self.pending.is_some(),
        }
    }

    fn publish(&self) {
        if let Some(observer) = &self.observer {
            // A closed shell just stops listening.
            let _ = observer.send(self.snapshot());
        }
    }

    fn open_court(&mut self) {
        let side = self.state.side;
        if self.config.opening_docket {
            let judge = self.case.details.presiding_judge.clone();
            self.state.log.append(Turn::system(format!(
                "Court is now in session. The Honorable {judge} presiding."
            )));
            let opening = self.case.script.judge_opening.get(side).clone();
            self.state
                .log
                .append(Turn::new(Speaker::Ai(RoleKind::Judge), judge, opening));
        }

        // The prosecution always opens; a defense user waits for it.
        if side == Side::Defense {
            let instruction = self.case.script.opening_statement.clone();
            let delay = self.config.opening_delay;
            self.schedule_opponent(instruction, delay);
        } else {
            self.publish();
        }
    }

    /// The user addresses the active persona.
    ///
    /// `RequestInFlight` cannot arise from a single caller: every entry point takes
    /// `&mut self` and the engine task serves one intent at a time. The guard only
    /// keeps the invariant explicit should the session ever be shared.
    pub async fn send_message(&mut self, text: &str) -> Result<SendOutcome, InvalidTransition> {
        if self.thinking {
            return Err(InvalidTransition::RequestInFlight);
        }
        if self.state.turn != TurnOwner::User {
            return Err(InvalidTransition::NotUserTurn);
        }
        if text.trim().is_empty() {
            return Err(InvalidTransition::EmptyMessage);
        }

        let counsel = self.state.side.counsel_title();
        self.state.log.append(Turn::new(Speaker::User, counsel, text));
        let role = self.state.active_role;

        match self.ask(text).await {
            Ok(reply) => {
                self.record_reply(role, reply);
                let rebuttal = role == RoleKind::Judge
                    && self.rng.random_bool(self.config.rebuttal_probability);
                if rebuttal {
                    let instruction = self.case.script.rebuttal.clone();
                    let delay = self.config.rebuttal_delay;
                    self.schedule_opponent(instruction, delay);
                }
                Ok(SendOutcome::Answered {
                    rebuttal_scheduled: rebuttal,
                })
            }
            Err(err) => {
                let notice = self.report_failure(&err);
                Ok(SendOutcome::TransportFailed(notice))
            }
        }
    }

    /// Puts `id` on the stand. The oath is scripted; the transport is not consulted.
    pub fn call_witness(&mut self, id: &str) -> Result<(), InvalidTransition> {
        if self.thinking {
            return Err(InvalidTransition::RequestInFlight);
        }
        let witness = self
            .case
            .witness(id)
            .cloned()
            .ok_or_else(|| InvalidTransition::UnknownWitness(id.to_string()))?;

        let announcement = format!(
            "{} calls {} to the stand.",
            witness.side.calling_party(),
            witness.name
        );
        self.state.active_witness = Some(witness);
        self.switch_to(RoleKind::Witness);

        self.state.log.append(Turn::system(announcement));
        self.state.log.append(Turn::new(
            Speaker::Ai(RoleKind::Witness),
            self.persona.name.clone(),
            OATH_REPLY,
        ));
        self.publish();
        Ok(())
    }

    /// Addresses a different persona from now on, with a fresh transport session.
    pub fn switch_persona(&mut self, role: RoleKind) -> Result<(), InvalidTransition> {
        if self.thinking {
            return Err(InvalidTransition::RequestInFlight);
        }
        self.switch_to(role);
        self.publish();
        Ok(())
    }

    /// Plays every scheduled opponent turn, honouring its pacing delay.
    /// Returns the number of turns played.
    pub async fn settle(&mut self) -> usize {
        let mut played = 0;
        while let Some(pending) = self.pending.take() {
            if !pending.delay.is_zero() {
                tokio::time::sleep(pending.delay).await;
            }
            self.opponent_turn(&pending.instruction).await;
            played += 1;
        }
        played
    }

    fn schedule_opponent(&mut self, instruction: String, delay: Duration) {
        log::debug!("Opponent turn scheduled in {delay:?}");
        self.state.turn = TurnOwner::Opponent;
        self.pending = Some(PendingTurn { instruction, delay });
        self.publish();
    }

    async fn opponent_turn(&mut self, instruction: &str) {
        self.switch_to(RoleKind::Opposing);
        match self.ask(instruction).await {
            Ok(reply) => self.record_reply(RoleKind::Opposing, reply),
            Err(err) => {
                self.report_failure(&err);
            }
        }
        self.state.turn = TurnOwner::User;
        self.publish();
    }

    fn switch_to(&mut self, role: RoleKind) {
        let witness = match role {
            RoleKind::Witness => self.state.active_witness.as_ref(),
            _ => None,
        };
        self.persona = persona::resolve(role, self.state.side, witness, &self.case);
        self.chat = self.transport.configure(&self.persona);
        self.state.active_role = role;
        log::info!("Now addressing {} ({role})", self.persona.name);
    }

    async fn ask(&mut self, message: &str) -> Result<String, TransportError> {
        self.thinking = true;
        self.publish();
        let result = self.transport.send(&mut self.chat, message).await;
        self.thinking = false;
        result
    }

    fn record_reply(&mut self, role: RoleKind, reply: String) {
        let before = self.state.metrics;
        self.state.metrics = impact::apply(before, &reply, role);
        if self.state.metrics != before {
            log::debug!("Metrics {before:?} -> {:?}", self.state.metrics);
        }
        self.state.log.append(Turn::new(
            Speaker::Ai(role),
            self.persona.name.clone(),
            reply,
        ));
        self.publish();
    }

    fn report_failure(&mut self, err: &TransportError) -> String {
        log::error!("Transport failure while addressing {}: {err}", self.persona.name);
        let notice = format!("Error communicating with {}: {err}", self.persona.name);
        self.state.log.append(Turn::system(notice.clone()));
        self.publish();
        notice
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{OpenAiTransport, offline_reply};

    fn quiet() -> SessionConfig {
        SessionConfig {
            rebuttal_probability: 0.0,
            rebuttal_delay: Duration::ZERO,
            opening_delay: Duration::ZERO,
            opening_docket: true,
        }
    }

    fn builder(side: Side) -> SessionBuilder<OpenAiTransport> {
        let case = Arc::new(CaseFile::builtin().unwrap());
        Session::builder(side, OpenAiTransport::offline(), case)
            .config(quiet())
            .rng(StdRng::seed_from_u64(3))
    }

    #[test]
    fn defense_opening_waits_until_settled() {
        let session = builder(Side::Defense).open();
        assert_eq!(session.state().turn, TurnOwner::Opponent);
        assert!(session.opponent_pending());
        assert_eq!(session.state().log.len(), 2);
        assert_eq!(session.persona().role, RoleKind::Judge);
    }

    #[tokio::test]
    async fn settling_plays_the_opening_once() {
        let mut session = builder(Side::Defense).open();
        assert_eq!(session.settle().await, 1);
        assert_eq!(session.settle().await, 0);

        let last = session.state().log.last().unwrap();
        let opening = session.case().script.opening_statement.clone();
        assert_eq!(last.content, offline_reply("Prosecutor Vance", &opening));
        assert_eq!(session.state().turn, TurnOwner::User);
        assert!(!session.opponent_pending());
    }

    #[test]
    fn nonsense_probability_never_rebuts() {
        let session = builder(Side::Prosecution)
            .config(SessionConfig {
                rebuttal_probability: f64::NAN,
                ..quiet()
            })
            .open();
        assert_eq!(session.config.rebuttal_probability, 0.0);

        let session = builder(Side::Prosecution)
            .config(SessionConfig {
                rebuttal_probability: 4.0,
                ..quiet()
            })
            .open();
        assert_eq!(session.config.rebuttal_probability, 1.0);
    }

    #[tokio::test]
    async fn witness_switch_uses_the_witness_on_the_stand() {
        let mut session = builder(Side::Prosecution).start().await;
        session.call_witness("sarah").unwrap();
        session.switch_persona(RoleKind::Judge).unwrap();
        session.switch_persona(RoleKind::Witness).unwrap();
        assert_eq!(session.persona().name, "Sarah Jenkins");

        let snapshot = session.snapshot();
        assert_eq!(snapshot.persona_name, "Sarah Jenkins");
        assert!(!snapshot.thinking);
        assert_eq!(snapshot.state.log.last().map(|turn| turn.content.as_str()), Some(OATH_REPLY));
    }
}
