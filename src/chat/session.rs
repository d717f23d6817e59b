use crate::llm::provider::{AssistantInput, ChatMessage, LlmProvider, LlmResult};
use crate::llm::system_instruction;

/// Settings sent with every provider call. They are loaded once at startup
/// and only change through the `ChatSession` setters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSettings {
    pub model: String,
    pub system_prompt: String,
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    settings: ChatSettings,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(settings: ChatSettings) -> Self {
        Self {
            settings,
            messages: Vec::new(),
        }
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    /// Returns `false` for a blank model name, which is ignored.
    pub fn set_model(&mut self, model: &str) -> bool {
        let model = model.trim();
        if model.is_empty() {
            return false;
        }
        self.settings.model = model.to_string();
        true
    }

    pub fn set_system_prompt(&mut self, prompt: &str) {
        self.settings.system_prompt = prompt.trim().to_string();
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Sends `text` with the whole conversation so far.
    ///
    /// The user message is kept even when the provider fails; the assistant
    /// reply is only recorded on success.
    pub async fn send<P: LlmProvider>(&mut self, provider: &P, text: &str) -> LlmResult<String> {
        self.messages.push(ChatMessage::user(text));

        let output = provider
            .generate(AssistantInput {
                model: self.settings.model.clone(),
                messages: self.messages.clone(),
                system_instruction: Some(system_instruction(&self.settings.system_prompt)),
            })
            .await?;

        self.messages.push(ChatMessage::assistant(output.text.clone()));
        Ok(output.text)
    }
}
