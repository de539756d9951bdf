use uuid::Uuid;

use crate::errors::StudioError;
use crate::extract::{extract, Extraction};
use crate::handoff::Brief;
use crate::prompt;
use crate::provider::ModelClient;
use crate::settings::overrides::{resolve, OverridesPatch, SceneOverrides};
use crate::settings::SettingsStore;
use crate::wire::{Conversation, GenerationConfig, Message};

/// Result of one completed turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub index: usize,
    pub prompt: String,
    pub reply: String,
    pub extraction: Extraction,
}

/// Everything one chat session owns. The CLI loop holds it and passes it
/// into each turn.
pub struct Session {
    pub id: Uuid,
    pub settings: SettingsStore,
    pub brief: Brief,
    pub auto_overrides: bool,
    pub overrides_patch: OverridesPatch,
    pub generation: GenerationConfig,
    conversation: Conversation,
    turns: usize,
}

impl Session {
    pub fn new(system: impl Into<String>, settings: SettingsStore, brief: Brief, generation: GenerationConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            settings,
            brief,
            auto_overrides: true,
            overrides_patch: OverridesPatch::default(),
            generation,
            conversation: Conversation::new(system),
            turns: 0,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn turns(&self) -> usize {
        self.turns
    }

    /// Scene overrides for the current city.
    pub fn scene_overrides(&self) -> SceneOverrides {
        resolve(&self.settings.current().city, self.auto_overrides, &self.overrides_patch)
    }

    /// Assemble, send, extract. On failure the conversation is untouched so the
    /// same input can be retried.
    pub async fn turn(
        &mut self,
        client: &dyn ModelClient,
        direction: &str,
        translate: bool,
    ) -> Result<TurnOutcome, StudioError> {
        let prompt = prompt::assemble(self.settings.current(), direction, client.model(), translate);
        let pending = self.conversation.with_user(&prompt);

        tracing::info!(session = %self.id, turn = self.turns + 1, model = client.model(), "sending turn");
        let reply = client
            .send(&pending, &self.generation)
            .await
            .map_err(|e| StudioError::Transport(format!("{e:#}")))?;

        self.conversation = pending;
        self.conversation.messages.push(Message::model(reply.clone()));
        self.turns += 1;

        let extraction = extract(&reply);
        tracing::info!(
            session = %self.id,
            turn = self.turns,
            has_payload = extraction.payload.is_some(),
            "turn complete"
        );
        Ok(TurnOutcome { index: self.turns, prompt, reply, extraction })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{SettingEdit, Settings};
    use anyhow::{anyhow, Result};
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct Scripted {
        replies: Mutex<Vec<String>>,
        seen: Mutex<Vec<Conversation>>,
    }

    impl Scripted {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().rev().map(|s| s.to_string()).collect()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ModelClient for Scripted {
        async fn send(&self, conversation: &Conversation, _generation: &GenerationConfig) -> Result<String> {
            self.seen.lock().unwrap().push(conversation.clone());
            self.replies.lock().unwrap().pop().ok_or_else(|| anyhow!("quota exceeded"))
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    fn session() -> Session {
        Session::new("sys", SettingsStore::new(Settings::default()), Brief::default(), GenerationConfig::default())
    }

    #[tokio::test]
    async fn successful_turn_records_both_messages() {
        let client = Scripted::new(&["Meet Ana.\n```json\n{\"character\": {\"hair\": \"bob\"}}\n```"]);
        let mut s = session();
        let out = s.turn(&client, "warm gallery light", false).await.unwrap();

        assert_eq!(out.index, 1);
        assert_eq!(out.extraction.payload, Some(json!({"character": {"hair": "bob"}})));
        assert_eq!(out.extraction.display_text, "Meet Ana.");
        assert!(out.prompt.contains("Model: scripted"));
        assert_eq!(s.turns(), 1);
        assert_eq!(s.conversation().messages.len(), 2);
        assert_eq!(s.conversation().messages[0].content, out.prompt);
        assert_eq!(s.conversation().system, "sys");
    }

    #[tokio::test]
    async fn failed_turn_leaves_conversation_unchanged() {
        let client = Scripted::new(&["first"]);
        let mut s = session();
        s.turn(&client, "one", false).await.unwrap();
        let before = s.conversation().clone();

        let err = s.turn(&client, "two", false).await;
        assert_matches!(err, Err(StudioError::Transport(msg)) if msg.contains("quota"));
        assert_eq!(s.conversation(), &before);
        assert_eq!(s.turns(), 1);
    }

    #[tokio::test]
    async fn later_turns_carry_history_and_new_settings() {
        let client = Scripted::new(&["a", "b"]);
        let mut s = session();
        s.turn(&client, "one", false).await.unwrap();
        s.settings.apply(SettingEdit::Age(50));
        let out = s.turn(&client, "two", true).await.unwrap();

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen[1].messages.len(), 3);
        assert!(out.prompt.contains("Age: 50"));
        assert!(out.prompt.contains(prompt::TRANSLATION_HEADER));
        assert_eq!(out.extraction.payload, None);
        assert_eq!(out.extraction.display_text, "b");
    }

    #[test]
    fn overrides_follow_city() {
        let mut s = session();
        assert_eq!(s.scene_overrides(), SceneOverrides::for_city("Paris (파리)"));
        s.settings.apply(SettingEdit::City("London".into()));
        assert_eq!(s.scene_overrides(), SceneOverrides::for_city("London (런던)"));
    }
}
