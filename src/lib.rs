pub mod app;
pub mod case;
pub mod command;
pub mod context;
pub mod error;
pub mod impact;
pub mod logging;
pub mod persona;
pub mod session;
pub mod settings;
pub mod transcript;
pub mod transport;
pub mod tui;
pub mod ui;

// Re-export commonly used items for easier access
pub use case::{CaseFile, EvidenceFilter, Side, Witness, WitnessSide};
pub use error::{AppError, CommandError, InvalidTransition, TransportError};
pub use impact::Metrics;
pub use persona::{Persona, RoleKind};
pub use session::{SendOutcome, Session, SessionConfig, SessionSnapshot, SessionState, TurnOwner};
pub use transcript::{Speaker, Transcript, Turn};
pub use transport::{ChatTransport, OpenAiTransport};
