use thiserror::Error;

// Enum for handling application-level errors at the binary edge.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Case file error: {0}")]
    Case(#[from] CaseError), // The case file could not be loaded or validated.

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error), // Errors related to settings serialization.

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error), // Input/output errors.

    #[error("Logger error: {0}")]
    Logger(String),

    #[error("Home directory not found")]
    NoHomeDir,

    #[error("Session task stopped")]
    SessionClosed, // The engine task dropped its end of the channel.
}

impl From<log::SetLoggerError> for AppError {
    fn from(error: log::SetLoggerError) -> Self {
        AppError::Logger(error.to_string())
    }
}

// Failures of the chat transport. Always recovered into a system turn by the session.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("OpenAI API error: {0}")]
    OpenAI(#[from] async_openai::error::OpenAIError),

    #[error("The model returned no choices")]
    NoChoices,

    #[error("No transport credential configured")]
    MissingCredential,

    #[error("Transport failure: {0}")]
    Other(String),
}

// An engine entry point was called while its precondition does not hold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTransition {
    #[error("It is not your turn")]
    NotUserTurn,

    #[error("A request is already in flight")]
    RequestInFlight,

    #[error("Cannot send an empty message")]
    EmptyMessage,

    #[error("No witness with id '{0}' in the roster")]
    UnknownWitness(String),
}

#[derive(Debug, Error)]
pub enum CaseError {
    #[error("Failed to read case file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse case file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate witness id: {0}")]
    DuplicateWitness(String),

    #[error("Witness with an empty id: {0}")]
    EmptyWitnessId(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unknown command: /{0}")]
    UnknownCommand(String),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("/{0} needs an argument")]
    MissingArgument(&'static str),

    #[error("'{0}' is not a note number")]
    InvalidNoteIndex(String),

    #[error("No evidence kind '{0}' (all, document, image, pdf)")]
    UnknownFilter(String),
}
