use crate::error::TransportError;
use crate::persona::Persona;
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};
use std::future::Future;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// A hosted chat model the court personas speak through.
///
/// `configure` opens a fresh conversation conditioned on a persona; every persona
/// switch gets a new handle, so no context leaks from one voice to the next.
pub trait ChatTransport: Send + Sync {
    type Session: Send;

    fn configure(&self, persona: &Persona) -> Self::Session;

    fn send(
        &self,
        session: &mut Self::Session,
        message: &str,
    ) -> impl Future<Output = Result<String, TransportError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Author {
    User,
    Model,
}

#[derive(Debug, Clone)]
pub struct OpenAiSession {
    persona_name: String,
    instruction: String,
    history: Vec<(Author, String)>,
}

impl OpenAiSession {
    /// Number of user/model messages exchanged so far.
    pub fn exchanged(&self) -> usize {
        self.history.len()
    }
}

/// Chat completions over the OpenAI API. Without a key it answers with an offline echo.
#[derive(Debug, Clone)]
pub struct OpenAiTransport {
    client: Option<Client<OpenAIConfig>>,
    model: String,
    temperature: f32,
}

impl OpenAiTransport {
    pub fn new(api_key: Option<String>, model: impl Into<String>, temperature: f32) -> Self {
        let client = api_key
            .filter(|key| !key.trim().is_empty())
            .map(|key| Client::with_config(OpenAIConfig::new().with_api_key(key)));
        if client.is_none() {
            log::warn!("No OpenAI API key configured, personas will answer offline");
        }
        Self {
            client,
            model: model.into(),
            temperature,
        }
    }

    pub fn offline() -> Self {
        Self::new(None, DEFAULT_MODEL, DEFAULT_TEMPERATURE)
    }

    pub fn is_online(&self) -> bool {
        self.client.is_some()
    }

    // Asynchronously validate the configured key by listing the available models.
    pub async fn verify_credential(&self) -> Result<(), TransportError> {
        let client = self.client.as_ref().ok_or(TransportError::MissingCredential)?;
        client.models().list().await?;
        Ok(())
    }

    fn build_messages(
        session: &OpenAiSession,
        message: &str,
    ) -> Result<Vec<ChatCompletionRequestMessage>, TransportError> {
        let mut messages: Vec<ChatCompletionRequestMessage> =
            Vec::with_capacity(session.history.len() + 2);
        messages.push(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(session.instruction.as_str())
                .build()?
                .into(),
        );
        for (author, content) in &session.history {
            let entry = match author {
                Author::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(content.as_str())
                    .build()?
                    .into(),
                Author::Model => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(content.as_str())
                    .build()?
                    .into(),
            };
            messages.push(entry);
        }
        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(message)
                .build()?
                .into(),
        );
        Ok(messages)
    }
}

impl ChatTransport for OpenAiTransport {
    type Session = OpenAiSession;

    fn configure(&self, persona: &Persona) -> OpenAiSession {
        log::debug!("Opening chat session for {} ({})", persona.name, persona.role);
        OpenAiSession {
            persona_name: persona.name.clone(),
            instruction: persona.instruction.clone(),
            history: Vec::new(),
        }
    }

    async fn send(
        &self,
        session: &mut OpenAiSession,
        message: &str,
    ) -> Result<String, TransportError> {
        let Some(client) = &self.client else {
            return Ok(offline_reply(&session.persona_name, message));
        };

        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.as_str())
            .temperature(self.temperature)
            .messages(Self::build_messages(session, message)?)
            .build()?;

        let response = client.chat().create(request).await?;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(TransportError::NoChoices)?;
        let reply = choice
            .message
            .content
            .filter(|content| !content.trim().is_empty())
            .unwrap_or_else(|| "(No response)".to_string());

        session.history.push((Author::User, message.to_string()));
        session.history.push((Author::Model, reply.clone()));
        Ok(reply)
    }
}

pub fn offline_reply(persona_name: &str, message: &str) -> String {
    format!("{persona_name} (Offline): I acknowledge: \"{message}\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::RoleKind;

    fn clerk() -> Persona {
        Persona {
            role: RoleKind::Clerk,
            name: "Court Clerk".to_string(),
            instruction: "Be robotic and helpful.".to_string(),
        }
    }

    #[tokio::test]
    async fn offline_transport_echoes() {
        let transport = OpenAiTransport::offline();
        assert!(!transport.is_online());
        let mut session = transport.configure(&clerk());
        let reply = transport.send(&mut session, "What now?").await.unwrap();
        assert_eq!(reply, "Court Clerk (Offline): I acknowledge: \"What now?\"");
        assert_eq!(session.exchanged(), 0);
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let transport = OpenAiTransport::new(Some("  ".to_string()), DEFAULT_MODEL, 0.7);
        assert!(!transport.is_online());
    }

    #[tokio::test]
    async fn offline_credential_check_fails() {
        let transport = OpenAiTransport::offline();
        assert!(matches!(
            transport.verify_credential().await,
            Err(TransportError::MissingCredential)
        ));
    }

    #[test]
    fn request_carries_instruction_history_and_message() {
        let transport = OpenAiTransport::new(Some("sk-test".into()), DEFAULT_MODEL, 0.7);
        let mut session = transport.configure(&clerk());
        session.history.push((Author::User, "Hello".into()));
        session.history.push((Author::Model, "Greetings, counsel.".into()));
        let messages = OpenAiTransport::build_messages(&session, "Next?").unwrap();
        assert_eq!(messages.len(), 4);
        assert!(matches!(messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(messages[2], ChatCompletionRequestMessage::Assistant(_)));
        assert!(matches!(messages[3], ChatCompletionRequestMessage::User(_)));
    }
}
