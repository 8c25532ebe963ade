//! Prompt composition.
//!
//! Every completion request has the same three-message shape:
//!
//! ```text
//! system: identity + formatting instructions (answer language)
//! system: conversation transcript, "<name>: <transcript>\n" per sentence
//! user:   the prompt, verbatim
//! ```

use std::fmt::Write;

use crate::chat::ChatRequest;
use crate::config::CompletionConfig;
use crate::message::{Message, Sentence};

/// Builds completion requests from a conversation history and a prompt.
///
/// Holds only configuration, so one composer can serve any number of
/// concurrent requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptComposer {
    config: CompletionConfig,
}

impl PromptComposer {
    /// Creates a composer from configuration.
    #[must_use]
    pub const fn new(config: CompletionConfig) -> Self {
        Self { config }
    }

    /// Returns the composer's configuration.
    #[must_use]
    pub const fn config(&self) -> &CompletionConfig {
        &self.config
    }

    /// The fixed system instructions for the configured language.
    #[must_use]
    pub fn instructions(&self) -> String {
        format!(
            "You are a voice assistant named {name}. \
             Answer with multiple small/medium sentences with the right punctuation. \
             Only use dot (.) to end a sentence. \
             Here is the current conversation, the name of the user is prefixed to each message. \
             Answer the user question with the {language} language.",
            name = self.config.assistant_name,
            language = self.config.language,
        )
    }

    /// Compose the streaming request for `prompt` given `history`.
    ///
    /// No validation is applied: long histories and empty prompts pass
    /// through untouched.
    #[must_use]
    pub fn compose(&self, history: &[Sentence], prompt: &str) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                Message::system(self.instructions()),
                Message::system(transcript(history)),
                Message::user(prompt),
            ],
            stream: true,
        }
    }
}

/// Render a history as one `"<name>: <transcript>\n"` line per sentence.
#[must_use]
pub fn transcript(history: &[Sentence]) -> String {
    history.iter().fold(String::new(), |mut out, sentence| {
        let _ = writeln!(out, "{}: {}", sentence.name, sentence.transcript);
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;

    fn history() -> Vec<Sentence> {
        vec![
            Sentence::new("Ada", "Hi there."),
            Sentence::new("Grace", "What's the weather like?"),
        ]
    }

    #[test]
    fn test_transcript_format() {
        assert_eq!(
            transcript(&history()),
            "Ada: Hi there.\nGrace: What's the weather like?\n"
        );
    }

    #[test]
    fn test_transcript_empty() {
        assert_eq!(transcript(&[]), "");
    }

    #[test]
    fn test_compose_shape() {
        let composer = PromptComposer::default();
        let prompt = "  Tell me a joke!  ";

        for history in [Vec::new(), history()] {
            let request = composer.compose(&history, prompt);

            assert!(request.stream);
            assert_eq!(request.model, CompletionConfig::DEFAULT_MODEL);
            let roles: Vec<Role> = request.messages.iter().map(|m| m.role).collect();
            assert_eq!(roles, [Role::System, Role::System, Role::User]);
            assert_eq!(request.messages[1].content, transcript(&history));
            assert_eq!(request.messages[2].content, prompt);
        }
    }

    #[test]
    fn test_instructions_use_configured_language() {
        let french = PromptComposer::new(CompletionConfig::new("fr-FR"));
        let german = PromptComposer::new(CompletionConfig::new("de-DE"));

        let request = french.compose(&[], "Bonjour");
        assert!(request.messages[0].content.contains("with the fr-FR language"));
        assert!(german.instructions().contains("with the de-DE language"));
        assert!(german.instructions().contains("named LiveGPT"));
    }
}
