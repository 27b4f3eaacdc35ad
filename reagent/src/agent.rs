//! [`Agent`]: ties a [`reagent_react::ReactEngine`] together with an
//! optional plan notebook and exposes the `StateModule` persistence
//! protocol over the whole.

use crate::config::AgentConfig;
use crate::state::{StateModule, StatePersistence};
use async_trait::async_trait;
use reagent_core::{
    ContentBlock, GenerateOptions, Msg, MsgId, ReactError, Role, Session, SessionKey, StateError,
    AGENT_META_FIELD, MEMORY_MESSAGES_FIELD, PLAN_NOTEBOOK_FIELD, TOOLKIT_ACTIVE_GROUPS_FIELD,
};
use reagent_hooks::HookBus;
use reagent_model::Model;
use reagent_plan::{PlanNotebook, PlanViewHook};
use reagent_react::{EngineConfig, ReactEngine, StreamItem, StreamOptions};
use reagent_structured::StructuredOutputCoordinator;
use reagent_tool::ToolRegistry;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// An LLM-driven agent: a [`ReactEngine`] plus the construction-time
/// identity (`name`/`description`/`system_prompt`) and optional plan
/// notebook that don't belong to the engine itself.
///
/// Cheaply cloneable: the engine and plan notebook are held behind `Arc`.
#[derive(Clone)]
pub struct Agent {
    name: String,
    description: String,
    system_prompt: String,
    engine: Arc<ReactEngine>,
    plan_notebook: Option<Arc<Mutex<PlanNotebook>>>,
    state_persistence: StatePersistence,
    default_options: GenerateOptions,
}

impl Agent {
    /// Assemble an agent from its config and collaborators.
    ///
    /// `memory` seeds the transcript; when `None`, a fresh memory is
    /// created and (if `config.system_prompt` is non-empty) seeded with a
    /// single `Role::System` message.
    pub fn new(
        config: AgentConfig,
        model: Arc<dyn Model>,
        mut tools: ToolRegistry,
        mut hooks: HookBus,
        memory: Option<reagent_core::Memory>,
    ) -> Self {
        let plan_notebook = config.plan_max_subtasks.map(|max_subtasks| {
            let notebook = Arc::new(Mutex::new(PlanNotebook::new(max_subtasks)));
            for descriptor in reagent_plan::tool_descriptors(notebook.clone()) {
                tools.register(descriptor);
            }
            hooks.add(Arc::new(PlanViewHook::new(notebook.clone())));
            notebook
        });

        let structured = config.target_schema.clone().map(|schema| {
            StructuredOutputCoordinator::new(config.structured_output_mode, schema, config.max_schema_retries)
        });

        let mut memory = memory.unwrap_or_default();
        if memory.is_empty() && !config.system_prompt.is_empty() {
            memory.append(Msg::new(
                MsgId::new("system"),
                config.name.clone(),
                Role::System,
                vec![ContentBlock::text(config.system_prompt.clone())],
            ));
        }

        let engine_config = EngineConfig {
            max_iters: config.max_iters,
            tool_timeout: config.tool_timeout,
            stream_capacity: config.stream_capacity,
        };

        let engine = ReactEngine::new(
            config.name.clone(),
            config.model_name.clone(),
            model,
            memory,
            tools,
            hooks,
            structured,
            engine_config,
        );

        Self {
            name: config.name,
            description: config.description,
            system_prompt: config.system_prompt,
            engine: Arc::new(engine),
            plan_notebook,
            state_persistence: config.state_persistence,
            default_options: config.default_options,
        }
    }

    /// This agent's name, as recorded on every message it authors.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// This agent's description, as recorded in `agent_meta`.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The plan notebook, if this agent was configured with one.
    pub fn plan_notebook(&self) -> Option<&Arc<Mutex<PlanNotebook>>> {
        self.plan_notebook.as_ref()
    }

    /// A read-only snapshot of the agent's transcript so far.
    pub async fn memory_snapshot(&self) -> Vec<Msg> {
        self.engine.memory_snapshot().await
    }

    /// Run one turn to completion. `options` overlays [`AgentConfig::default_options`];
    /// any field left unset in `options` falls back to the agent's configured default.
    pub async fn call(&self, input: Option<String>, options: GenerateOptions) -> Result<Msg, ReactError> {
        self.engine.call(input, self.default_options.merge_overlay(&options)).await
    }

    /// Like [`Self::call`], honoring an externally owned cancellation token.
    pub async fn call_with_cancel(
        &self,
        input: Option<String>,
        options: GenerateOptions,
        cancel: CancellationToken,
    ) -> Result<Msg, ReactError> {
        self.engine
            .call_with_cancel(input, self.default_options.merge_overlay(&options), cancel)
            .await
    }

    /// Like [`Self::call`], additionally streaming events over a channel.
    pub fn call_stream(
        &self,
        input: Option<String>,
        options: GenerateOptions,
        stream_opts: StreamOptions,
    ) -> (
        tokio::sync::mpsc::Receiver<StreamItem>,
        tokio::task::JoinHandle<Result<Msg, ReactError>>,
    ) {
        self.engine.call_stream(input, self.default_options.merge_overlay(&options), stream_opts)
    }

    /// Like [`Self::call_stream`], honoring an externally owned cancellation token.
    pub fn call_stream_with_cancel(
        &self,
        input: Option<String>,
        options: GenerateOptions,
        stream_opts: StreamOptions,
        cancel: CancellationToken,
    ) -> (
        tokio::sync::mpsc::Receiver<StreamItem>,
        tokio::task::JoinHandle<Result<Msg, ReactError>>,
    ) {
        self.engine
            .call_stream_with_cancel(input, self.default_options.merge_overlay(&options), stream_opts, cancel)
    }
}

fn to_state_error(e: serde_json::Error) -> StateError {
    StateError::Serialization(e.to_string())
}

#[async_trait]
impl StateModule for Agent {
    async fn save_to(&self, session: &dyn Session, key: &SessionKey) -> Result<(), StateError> {
        let meta = json!({
            "id": self.name,
            "name": self.name,
            "description": self.description,
            "systemPrompt": self.system_prompt,
        });
        session.put(key, AGENT_META_FIELD, meta).await?;

        if self.state_persistence.memory_managed {
            let messages = self.engine.memory_snapshot().await;
            let value = serde_json::to_value(messages).map_err(to_state_error)?;
            session.put(key, MEMORY_MESSAGES_FIELD, value).await?;
        }

        if self.state_persistence.toolkit_managed {
            let groups = self.engine.active_tool_groups().await;
            let value = serde_json::to_value(groups).map_err(to_state_error)?;
            session.put(key, TOOLKIT_ACTIVE_GROUPS_FIELD, value).await?;
        }

        if self.state_persistence.plan_notebook_managed {
            if let Some(notebook) = &self.plan_notebook {
                let notebook = notebook.lock().await;
                let value = serde_json::to_value(&*notebook).map_err(to_state_error)?;
                session.put(key, PLAN_NOTEBOOK_FIELD, value).await?;
            }
        }

        Ok(())
    }

    async fn load_from(&self, session: &dyn Session, key: &SessionKey) -> Result<bool, StateError> {
        if !session.exists(key, AGENT_META_FIELD).await? {
            return Ok(false);
        }

        if self.state_persistence.memory_managed {
            if let Some(value) = session.get(key, MEMORY_MESSAGES_FIELD).await? {
                let messages: Vec<Msg> = serde_json::from_value(value).map_err(to_state_error)?;
                self.engine.load_memory(messages).await;
            }
        }

        if self.state_persistence.toolkit_managed {
            if let Some(value) = session.get(key, TOOLKIT_ACTIVE_GROUPS_FIELD).await? {
                let groups: Option<HashSet<String>> = serde_json::from_value(value).map_err(to_state_error)?;
                self.engine.set_active_tool_groups(groups).await;
            }
        }

        if self.state_persistence.plan_notebook_managed {
            if let Some(notebook) = &self.plan_notebook {
                if let Some(value) = session.get(key, PLAN_NOTEBOOK_FIELD).await? {
                    let restored: PlanNotebook = serde_json::from_value(value).map_err(to_state_error)?;
                    *notebook.lock().await = restored;
                }
            }
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait as async_trait_attr;
    use reagent_core::ChatUsage;
    use reagent_model::{ChatResponse, ChatStream};
    use reagent_state_memory::MemoryStore;

    struct EchoModel;

    #[async_trait_attr]
    impl Model for EchoModel {
        async fn stream(
            &self,
            messages: Vec<Msg>,
            _tools: Vec<serde_json::Value>,
            _options: GenerateOptions,
        ) -> Result<ChatStream, reagent_core::ModelError> {
            let text = messages.last().map(|m| m.text()).unwrap_or_default();
            let resp = ChatResponse::complete("r1", vec![ContentBlock::text(format!("echo: {text}"))], Some(ChatUsage::default()));
            Ok(Box::pin(futures_util::stream::once(async move { Ok(resp) })))
        }
    }

    fn config() -> AgentConfig {
        AgentConfig {
            name: "assistant".into(),
            description: "a test agent".into(),
            system_prompt: "Be helpful.".into(),
            model_name: "mock".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn seeds_system_prompt_into_fresh_memory() {
        let agent = Agent::new(config(), Arc::new(EchoModel), ToolRegistry::new(), HookBus::new(), None);
        let snapshot = agent.memory_snapshot().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].role, Role::System);
        assert_eq!(snapshot[0].text(), "Be helpful.");
    }

    #[tokio::test]
    async fn call_runs_the_underlying_engine() {
        let agent = Agent::new(config(), Arc::new(EchoModel), ToolRegistry::new(), HookBus::new(), None);
        let result = agent.call(Some("hi".into()), GenerateOptions::default()).await.unwrap();
        assert_eq!(result.text(), "echo: hi");
    }

    #[tokio::test]
    async fn save_then_load_restores_memory_into_a_fresh_agent() {
        let store = MemoryStore::new();
        let key = SessionKey::new("session-1");

        let agent = Agent::new(config(), Arc::new(EchoModel), ToolRegistry::new(), HookBus::new(), None);
        agent.call(Some("hi".into()), GenerateOptions::default()).await.unwrap();
        agent.save_to(&store, &key).await.unwrap();

        let restored = Agent::new(config(), Arc::new(EchoModel), ToolRegistry::new(), HookBus::new(), None);
        let existed = restored.load_from(&store, &key).await.unwrap();
        assert!(existed);

        let snapshot = restored.memory_snapshot().await;
        assert_eq!(snapshot.len(), agent.memory_snapshot().await.len());
        assert_eq!(snapshot.last().unwrap().text(), "echo: hi");
    }

    #[tokio::test]
    async fn load_from_absent_key_returns_false() {
        let store = MemoryStore::new();
        let key = SessionKey::new("never-saved");
        let agent = Agent::new(config(), Arc::new(EchoModel), ToolRegistry::new(), HookBus::new(), None);
        assert!(!agent.load_from(&store, &key).await.unwrap());
    }

    #[tokio::test]
    async fn plan_notebook_tools_are_registered_when_configured() {
        let cfg = AgentConfig {
            plan_max_subtasks: Some(5),
            ..config()
        };
        let agent = Agent::new(cfg, Arc::new(EchoModel), ToolRegistry::new(), HookBus::new(), None);
        assert!(agent.plan_notebook().is_some());
    }
}
