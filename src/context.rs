use crate::{case::CaseFile, session::SessionSnapshot, settings::Settings};

/// What a component may read while handling a key or rendering.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub case: &'a CaseFile,
    pub settings: &'a Settings,
    pub snapshot: Option<&'a SessionSnapshot>,
    pub online: bool,
}

impl Context<'_> {
    /// The user may speak: it is their turn and no reply is pending.
    pub fn accepts_speech(&self) -> bool {
        self.snapshot.is_some_and(|snapshot| {
            snapshot.state.turn == crate::session::TurnOwner::User && !snapshot.thinking
        })
    }
}
