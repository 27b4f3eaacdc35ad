//! The ReAct engine: REASON ↔ ACT, structured-output coordination,
//! overflow summarization, and interrupt handling.

use crate::config::EngineConfig;
use crate::events::{EventKind, EventSink, StreamItem, StreamOptions};
use futures_util::StreamExt;
use reagent_core::{
    ContentBlock, GenerateOptions, InterruptError, Memory, Msg, MsgId, ReactError, Role,
    ToolChoice,
};
use reagent_hooks::event::{
    PostActingEvent, PostReasoningEvent, PostToolEvent, PreActingEvent, PreReasoningEvent,
    PreToolEvent, ReasoningChunkEvent,
};
use reagent_hooks::{HookBus, HookEvent, HookOutcome};
use reagent_model::Model;
use reagent_structured::{StructuredOutputCoordinator, StructuredOutputOutcome};
use reagent_tool::{ToolCtx, ToolRegistry};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// One in-flight turn's running state. Not the overall agent — the engine
/// itself owns memory/toolkit/structured-output state across calls, but a
/// `Run` threads per-call bookkeeping (iteration count, last assistant
/// message) through the loop.
struct Run<'a> {
    engine: &'a ReactEngine,
    cancel: CancellationToken,
    sink: Option<EventSink>,
}

/// Reasoning ↔ acting loop over one agent's shared [`Memory`], toolkit,
/// and (optional) structured-output target.
///
/// Concurrent calls on the same engine are serialized by the memory/tools
/// locks (the same mutex discipline the corpus applies at any boundary a
/// suspension point can occur inside the guard).
pub struct ReactEngine {
    agent_name: String,
    model_name: String,
    model: Arc<dyn Model>,
    memory: Mutex<Memory>,
    tools: Mutex<ToolRegistry>,
    hooks: HookBus,
    structured: Mutex<Option<StructuredOutputCoordinator>>,
    config: EngineConfig,
    finish_sentinel_tools: HashSet<String>,
    msg_counter: AtomicU64,
}

impl ReactEngine {
    /// Assemble an engine from its collaborators.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        agent_name: impl Into<String>,
        model_name: impl Into<String>,
        model: Arc<dyn Model>,
        memory: Memory,
        tools: ToolRegistry,
        hooks: HookBus,
        structured: Option<StructuredOutputCoordinator>,
        config: EngineConfig,
    ) -> Self {
        Self {
            agent_name: agent_name.into(),
            model_name: model_name.into(),
            model,
            memory: Mutex::new(memory),
            tools: Mutex::new(tools),
            hooks,
            structured: Mutex::new(structured),
            config,
            finish_sentinel_tools: ["finish_plan".to_string()].into_iter().collect(),
            msg_counter: AtomicU64::new(1),
        }
    }

    /// Register an additional tool name that ends the turn on success,
    /// alongside the default `finish_plan`.
    pub fn add_finish_sentinel(&mut self, tool_name: impl Into<String>) {
        self.finish_sentinel_tools.insert(tool_name.into());
    }

    /// A read-only snapshot of the agent's transcript so far.
    pub async fn memory_snapshot(&self) -> Vec<Msg> {
        self.memory.lock().await.snapshot()
    }

    /// Replace the entire transcript, e.g. when restoring from a session.
    pub async fn load_memory(&self, messages: Vec<Msg>) {
        *self.memory.lock().await = Memory::from_messages(messages);
    }

    /// Restrict the exposed toolkit to `groups` (plus any ungrouped tool),
    /// or remove the filter entirely when `None`.
    pub async fn set_active_tool_groups(&self, groups: Option<HashSet<String>>) {
        let mut tools = self.tools.lock().await;
        match groups {
            Some(g) => tools.set_active_groups(g),
            None => tools.clear_active_groups(),
        }
    }

    /// The currently configured active tool groups, if filtering is enabled.
    pub async fn active_tool_groups(&self) -> Option<HashSet<String>> {
        self.tools.lock().await.active_groups().cloned()
    }

    fn next_msg_id(&self) -> MsgId {
        MsgId::from_counter(self.msg_counter.fetch_add(1, Ordering::SeqCst))
    }

    /// Run one turn to completion: optionally append `input`, then loop
    /// REASON/ACT until a terminal message is produced.
    pub async fn call(&self, input: Option<String>, options: GenerateOptions) -> Result<Msg, ReactError> {
        self.call_with_cancel(input, options, CancellationToken::new()).await
    }

    /// Like [`Self::call`], but honoring an externally owned cancellation
    /// token (checked at every suspension point).
    pub async fn call_with_cancel(
        &self,
        input: Option<String>,
        options: GenerateOptions,
        cancel: CancellationToken,
    ) -> Result<Msg, ReactError> {
        let run = Run { engine: self, cancel, sink: None };
        run.execute(input, options).await
    }

    /// Like [`Self::call`], but additionally streams [`StreamItem`]s over
    /// a bounded channel as the turn progresses. Returns the receiver
    /// immediately; the terminal result arrives via the returned join
    /// handle once the background task completes.
    pub fn call_stream(
        self: &Arc<Self>,
        input: Option<String>,
        options: GenerateOptions,
        stream_opts: StreamOptions,
    ) -> (
        tokio::sync::mpsc::Receiver<StreamItem>,
        tokio::task::JoinHandle<Result<Msg, ReactError>>,
    ) {
        self.call_stream_with_cancel(input, options, stream_opts, CancellationToken::new())
    }

    /// Like [`Self::call_stream`], honoring an externally owned cancellation
    /// token (checked at every suspension point, same as [`Self::call_with_cancel`]).
    pub fn call_stream_with_cancel(
        self: &Arc<Self>,
        input: Option<String>,
        options: GenerateOptions,
        stream_opts: StreamOptions,
        cancel: CancellationToken,
    ) -> (
        tokio::sync::mpsc::Receiver<StreamItem>,
        tokio::task::JoinHandle<Result<Msg, ReactError>>,
    ) {
        let (tx, rx) = tokio::sync::mpsc::channel(stream_opts.capacity.max(1));
        let engine = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let run = Run {
                engine: &engine,
                cancel,
                sink: Some(EventSink { tx, opts: stream_opts }),
            };
            run.execute(input, options).await
        });
        (rx, handle)
    }
}

impl<'a> Run<'a> {
    async fn emit(&self, kind: EventKind, item: StreamItem) {
        if let Some(sink) = &self.sink {
            sink.emit(kind, item).await;
        }
    }

    fn wants_cumulative(&self) -> bool {
        self.sink.as_ref().map(|s| s.opts.cumulative).unwrap_or(false)
    }

    /// Turn a hook dispatch's collected errors into a `ReactError`, if any
    /// hook failed. A hook failure aborts the current round the same way
    /// a model or tool failure would.
    fn escalate(outcome: HookOutcome) -> Result<(), ReactError> {
        match outcome.errors.into_iter().next() {
            Some(e) => Err(ReactError::Hook(e)),
            None => Ok(()),
        }
    }

    fn check_cancelled(&self, last: &Option<Msg>) -> Option<Result<Msg, ReactError>> {
        if !self.cancel.is_cancelled() {
            return None;
        }
        Some(match last {
            Some(msg) => Ok(msg.clone()),
            None => Err(ReactError::Interrupted(InterruptError::Requested(
                "cancelled before any reasoning round completed".into(),
            ))),
        })
    }

    async fn execute(&self, input: Option<String>, options: GenerateOptions) -> Result<Msg, ReactError> {
        let engine = self.engine;
        tracing::debug!(agent = %engine.agent_name, "starting react turn");

        if let Some(text) = input {
            let id = engine.next_msg_id();
            let msg = Msg::user_text(id, engine.agent_name.clone(), text);
            engine.memory.lock().await.append(msg);
        }

        let mut last_assistant: Option<Msg> = None;
        let mut round_options = options;

        for _iter in 0..engine.config.max_iters {
            if let Some(result) = self.check_cancelled(&last_assistant) {
                return result;
            }

            let assistant_msg = self.reason(&round_options).await?;
            last_assistant = Some(assistant_msg.clone());

            if assistant_msg.has_tool_use() {
                match self.act(&assistant_msg).await? {
                    ActOutcome::Finished(terminal) => return Ok(terminal),
                    ActOutcome::Continue => {
                        round_options = self.next_round_options(&round_options).await;
                        continue;
                    }
                }
            }

            let structured_required = engine.structured.lock().await.is_some();
            if !structured_required {
                return Ok(assistant_msg);
            }

            match self.inspect_structured(&assistant_msg).await? {
                Some(terminal) => return Ok(terminal),
                None => {
                    round_options = self.next_round_options(&round_options).await;
                    continue;
                }
            }
        }

        tracing::warn!(agent = %engine.agent_name, max_iters = engine.config.max_iters, "react turn exceeded iteration budget, summarizing");
        self.summarize(&round_options).await
    }

    async fn next_round_options(&self, base: &GenerateOptions) -> GenerateOptions {
        match self.engine.structured.lock().await.as_ref() {
            Some(coordinator) => coordinator.before_round(base),
            None => base.clone(),
        }
    }

    /// REASON: one model round, with pre/chunk/post hooks.
    async fn reason(&self, options: &GenerateOptions) -> Result<Msg, reagent_core::ReactError> {
        let engine = self.engine;
        let mut current_options = options.clone();
        loop {
            let messages = engine.memory.lock().await.snapshot();
            let mut tool_schemas = engine.tools.lock().await.tool_schemas();
            if let Some(coordinator) = engine.structured.lock().await.as_ref() {
                tool_schemas.push(coordinator.synthetic_tool_schema());
            }

            let mut pre = HookEvent::PreReasoning(PreReasoningEvent {
                agent_name: engine.agent_name.clone(),
                model_name: engine.model_name.clone(),
                options: current_options.clone(),
                messages,
            });
            let pre_outcome = engine.hooks.dispatch(&mut pre).await;
            Self::escalate(pre_outcome)?;
            let HookEvent::PreReasoning(pre) = pre else { unreachable!() };

            let effective_options = pre.options;
            let mut stream = engine.model.stream(pre.messages, tool_schemas, effective_options.clone()).await?;

            let mut accumulated: Vec<ContentBlock> = Vec::new();
            let mut chat_usage = None;
            let mut response_id = String::new();

            loop {
                let next = tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => {
                        return Err(ReactError::Interrupted(InterruptError::Requested(
                            "cancelled while awaiting the model stream".into(),
                        )));
                    }
                    next = stream.next() => next,
                };
                let Some(next) = next else { break };
                let chunk = next?;
                response_id = chunk.id;
                if let Some(usage) = chunk.usage {
                    chat_usage = Some(usage);
                }
                for block in chunk.content {
                    merge_delta(&mut accumulated, block.clone());
                    let partial = Msg::new(
                        MsgId::new(response_id.clone()),
                        engine.agent_name.clone(),
                        Role::Assistant,
                        accumulated.clone(),
                    );
                    let mut chunk_event = HookEvent::ReasoningChunk(ReasoningChunkEvent {
                        agent_name: engine.agent_name.clone(),
                        delta: block.clone(),
                        accumulated: partial,
                    });
                    let chunk_outcome = engine.hooks.dispatch(&mut chunk_event).await;
                    Self::escalate(chunk_outcome)?;
                    let emitted = if self.wants_cumulative() {
                        accumulated.last().cloned().unwrap_or_else(|| block.clone())
                    } else {
                        block
                    };
                    self.emit(EventKind::Reasoning, StreamItem::Reasoning(emitted)).await;
                }
            }

            let assistant_id = if response_id.is_empty() {
                self.engine.next_msg_id()
            } else {
                MsgId::new(response_id)
            };
            let mut assistant_msg = Msg::new(assistant_id, engine.agent_name.clone(), Role::Assistant, accumulated);
            assistant_msg.chat_usage = chat_usage;

            let mut post = HookEvent::PostReasoning(PostReasoningEvent {
                agent_name: engine.agent_name.clone(),
                model_name: engine.model_name.clone(),
                options: effective_options,
                assistant_msg: assistant_msg.clone(),
                goto_reasoning_requested: false,
                injected_messages: Vec::new(),
                next_options: None,
            });
            let post_outcome = engine.hooks.dispatch(&mut post).await;
            Self::escalate(post_outcome)?;
            let HookEvent::PostReasoning(post) = post else { unreachable!() };

            engine.memory.lock().await.append(assistant_msg.clone());

            if post.goto_reasoning_requested {
                let mut memory = engine.memory.lock().await;
                for injected in post.injected_messages {
                    memory.append(injected);
                }
                drop(memory);
                if let Some(next) = post.next_options {
                    current_options = next;
                }
                continue;
            }

            return Ok(assistant_msg);
        }
    }

    /// ACT: dispatch every `ToolUse` block in `assistant_msg`, in order.
    async fn act(&self, assistant_msg: &Msg) -> Result<ActOutcome, reagent_core::ReactError> {
        let engine = self.engine;
        let tool_calls: Vec<ContentBlock> = assistant_msg.tool_uses().cloned().collect();

        let mut pre_acting = HookEvent::PreActing(PreActingEvent {
            agent_name: engine.agent_name.clone(),
            tool_calls: tool_calls.clone(),
        });
        let pre_outcome = engine.hooks.dispatch(&mut pre_acting).await;
        Self::escalate(pre_outcome)?;

        let mut futures = Vec::new();
        for block in &tool_calls {
            futures.push(self.dispatch_one(block));
        }
        let dispatched = futures_util::future::join_all(futures).await;

        let mut outcomes = Vec::with_capacity(dispatched.len());
        for outcome in dispatched {
            outcomes.push(outcome?);
        }

        let mut result_blocks = Vec::with_capacity(outcomes.len());
        let mut reminders = Vec::new();
        let mut finished: Option<Msg> = None;

        for outcome in outcomes {
            result_blocks.push(outcome.result_block);
            if let Some(reminder) = outcome.reminder {
                reminders.push(reminder);
            }
            if outcome.is_finish_sentinel && finished.is_none() {
                let mut terminal = assistant_msg.clone();
                if let Some(payload) = outcome.structured_payload {
                    terminal.metadata.insert("structured_data".to_string(), payload);
                }
                finished = Some(terminal);
            }
        }

        let mut post_acting = HookEvent::PostActing(PostActingEvent {
            agent_name: engine.agent_name.clone(),
            tool_results: result_blocks.clone(),
        });
        let post_outcome = engine.hooks.dispatch(&mut post_acting).await;
        Self::escalate(post_outcome)?;
        let HookEvent::PostActing(post_acting) = post_acting else { unreachable!() };

        for block in &post_acting.tool_results {
            self.emit(EventKind::ToolResult, StreamItem::ToolResult(block.clone())).await;
        }

        let tool_msg_id = engine.next_msg_id();
        let tool_msg = Msg::new(tool_msg_id, engine.agent_name.clone(), Role::Tool, post_acting.tool_results.clone());
        let mut memory = engine.memory.lock().await;
        memory.append(tool_msg);
        for reminder in reminders {
            self.emit(EventKind::Hint, StreamItem::Hint(reminder.clone())).await;
            memory.append(reminder);
        }
        drop(memory);

        match finished {
            Some(terminal) => Ok(ActOutcome::Finished(terminal)),
            None => Ok(ActOutcome::Continue),
        }
    }

    async fn dispatch_one(&self, block: &ContentBlock) -> Result<ToolOutcome, ReactError> {
        let engine = self.engine;
        let ContentBlock::ToolUse { id, name, input, .. } = block else {
            unreachable!("tool_uses() only yields ToolUse blocks");
        };

        if name.as_str() == reagent_structured::GENERATE_RESPONSE_TOOL {
            return Ok(self.dispatch_generate_response(id.clone(), name.clone(), input).await);
        }

        let mut pre_tool = HookEvent::PreTool(PreToolEvent {
            agent_name: engine.agent_name.clone(),
            tool_name: name.clone(),
            tool_input: input.clone(),
            skip: false,
            skip_reason: None,
            override_input: None,
        });
        let pre_outcome = engine.hooks.dispatch(&mut pre_tool).await;
        Self::escalate(pre_outcome)?;
        let HookEvent::PreTool(pre_tool) = pre_tool else { unreachable!() };

        let (output, succeeded) = if pre_tool.skip {
            (vec![ContentBlock::text(pre_tool.skip_reason.unwrap_or_else(|| "skipped".to_string()))], false)
        } else {
            let effective_input = pre_tool.override_input.unwrap_or(pre_tool.tool_input);
            let ctx = ToolCtx { agent_name: engine.agent_name.clone(), call_id: Some(id.clone()) };
            let tools = engine.tools.lock().await;
            let invocation = tools.invoke(name, effective_input, &ctx, engine.config.tool_timeout);
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    return Err(ReactError::Interrupted(InterruptError::Requested(
                        "cancelled while awaiting a tool call".into(),
                    )));
                }
                result = invocation => match result {
                    Ok(blocks) => (blocks, true),
                    Err(e) => {
                        tracing::warn!(tool = %name, error = %e, "tool invocation failed");
                        (vec![ContentBlock::text(format!("Error: {e}"))], false)
                    }
                },
            }
        };

        let mut post_tool = HookEvent::PostTool(PostToolEvent {
            agent_name: engine.agent_name.clone(),
            tool_name: name.clone(),
            tool_output: output,
            override_output: None,
        });
        let post_outcome = engine.hooks.dispatch(&mut post_tool).await;
        Self::escalate(post_outcome)?;
        let HookEvent::PostTool(post_tool) = post_tool else { unreachable!() };
        let final_output = post_tool.override_output.unwrap_or(post_tool.tool_output);

        let result_block = ContentBlock::ToolResult {
            id: id.clone(),
            name: name.clone(),
            output: final_output,
            is_error: !succeeded,
        };

        Ok(ToolOutcome {
            result_block,
            is_finish_sentinel: succeeded && engine.finish_sentinel_tools.contains(name.as_str()),
            reminder: None,
            structured_payload: None,
        })
    }

    async fn dispatch_generate_response(
        &self,
        id: reagent_core::ToolCallId,
        name: String,
        input: &serde_json::Value,
    ) -> ToolOutcome {
        let engine = self.engine;
        let fake_msg = Msg::new(
            engine.next_msg_id(),
            engine.agent_name.clone(),
            Role::Assistant,
            vec![ContentBlock::ToolUse { id: id.clone(), name: name.clone(), input: input.clone(), raw_content: None }],
        );

        let mut guard = engine.structured.lock().await;
        let Some(coordinator) = guard.as_mut() else {
            return ToolOutcome {
                result_block: ContentBlock::tool_error(id, name, "no structured output target configured"),
                is_finish_sentinel: false,
                reminder: None,
                structured_payload: None,
            };
        };

        match coordinator.inspect(&fake_msg) {
            StructuredOutputOutcome::Satisfied(payload) => ToolOutcome {
                result_block: ContentBlock::ToolResult {
                    id,
                    name,
                    output: vec![ContentBlock::text("Structured response recorded.")],
                    is_error: false,
                },
                is_finish_sentinel: true,
                reminder: None,
                structured_payload: Some(payload),
            },
            StructuredOutputOutcome::Retry { reminder } => ToolOutcome {
                result_block: ContentBlock::tool_error(id, name, "structured response did not satisfy the required schema yet"),
                is_finish_sentinel: false,
                reminder: Some(reminder),
                structured_payload: None,
            },
            StructuredOutputOutcome::Exhausted(_) | StructuredOutputOutcome::NotApplicable => ToolOutcome {
                result_block: ContentBlock::tool_error(id, name, "structured output retry budget exhausted"),
                is_finish_sentinel: false,
                reminder: None,
                structured_payload: None,
            },
        }
    }

    /// Handle the "no ToolUse but structured output required" branch.
    async fn inspect_structured(&self, assistant_msg: &Msg) -> Result<Option<Msg>, reagent_core::ReactError> {
        let engine = self.engine;
        let mut guard = engine.structured.lock().await;
        let Some(coordinator) = guard.as_mut() else {
            return Ok(Some(assistant_msg.clone()));
        };

        match coordinator.inspect(assistant_msg) {
            StructuredOutputOutcome::Satisfied(payload) => {
                let mut terminal = assistant_msg.clone();
                terminal.metadata.insert("structured_data".to_string(), payload);
                Ok(Some(terminal))
            }
            StructuredOutputOutcome::Retry { reminder } => {
                drop(guard);
                self.emit(EventKind::Hint, StreamItem::Hint(reminder.clone())).await;
                engine.memory.lock().await.append(reminder);
                Ok(None)
            }
            StructuredOutputOutcome::Exhausted(e) => Err(reagent_core::ReactError::Schema(e)),
            StructuredOutputOutcome::NotApplicable => Ok(Some(assistant_msg.clone())),
        }
    }

    /// Iteration budget exhausted without a terminal message: ask the
    /// model for a best-effort summary, collapse the transcript, and
    /// return that as the terminal message.
    async fn summarize(&self, options: &GenerateOptions) -> Result<Msg, reagent_core::ReactError> {
        let engine = self.engine;
        let hint_id = engine.next_msg_id();
        let hint = Msg::hint(
            hint_id,
            engine.agent_name.clone(),
            "The agent failed to generate response within the iteration budget for this turn; summarizing progress now. Give your best final answer without calling any more tools.",
            Default::default(),
        );
        let pre_len = {
            let mut memory = engine.memory.lock().await;
            memory.append(hint);
            memory.len()
        };

        let summary_options = GenerateOptions {
            tool_choice: Some(ToolChoice::None),
            ..options.clone()
        };
        let summary_msg = self.reason(&summary_options).await?;

        // `reason` already appended `summary_msg`; collapse everything
        // before it, leaving just the summary as the transcript.
        engine.memory.lock().await.replace_range(0, pre_len, vec![]);

        self.emit(EventKind::Summary, StreamItem::Summary(summary_msg.clone())).await;
        self.emit(EventKind::AgentResult, StreamItem::AgentResult(summary_msg.clone())).await;
        Ok(summary_msg)
    }
}

enum ActOutcome {
    Finished(Msg),
    Continue,
}

struct ToolOutcome {
    result_block: ContentBlock,
    is_finish_sentinel: bool,
    reminder: Option<Msg>,
    structured_payload: Option<serde_json::Value>,
}

/// Merge one streamed content block into the accumulated list: adjacent
/// `Text` deltas concatenate into the running last block; anything else
/// (including `ToolUse`, which providers emit whole) is appended as a new
/// block.
fn merge_delta(accumulated: &mut Vec<ContentBlock>, delta: ContentBlock) {
    if let ContentBlock::Text { text: delta_text } = &delta {
        if let Some(ContentBlock::Text { text }) = accumulated.last_mut() {
            text.push_str(delta_text);
            return;
        }
    }
    accumulated.push(delta);
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reagent_core::{ChatUsage, ToolCallId, ToolError};
    use reagent_model::{ChatResponse, ChatStream};
    use reagent_tool::{ToolDescriptor, ToolHandler};
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    struct ScriptedModel {
        responses: Mutex<Vec<ChatResponse>>,
    }

    #[async_trait]
    impl Model for ScriptedModel {
        async fn stream(
            &self,
            _messages: Vec<Msg>,
            _tools: Vec<serde_json::Value>,
            _options: GenerateOptions,
        ) -> Result<ChatStream, reagent_core::ModelError> {
            let mut responses = self.responses.lock().await;
            let next = if responses.is_empty() {
                ChatResponse::complete("final", vec![ContentBlock::text("done")], None)
            } else {
                responses.remove(0)
            };
            Ok(Box::pin(futures_util::stream::once(async move { Ok(next) })))
        }
    }

    fn text_only_engine(replies: Vec<&str>) -> ReactEngine {
        let responses = replies
            .into_iter()
            .map(|t| ChatResponse::complete("r", vec![ContentBlock::text(t)], Some(ChatUsage::default())))
            .collect();
        let model = Arc::new(ScriptedModel { responses: Mutex::new(responses) });
        ReactEngine::new(
            "agent",
            "mock-model",
            model,
            Memory::new(),
            ToolRegistry::new(),
            HookBus::new(),
            None,
            EngineConfig::default(),
        )
    }

    #[tokio::test]
    async fn plain_text_response_finishes_immediately() {
        let engine = text_only_engine(vec!["hello there"]);
        let result = engine.call(Some("hi".into()), GenerateOptions::default()).await.unwrap();
        assert_eq!(result.text(), "hello there");
    }

    #[tokio::test]
    async fn tool_call_then_text_response_loops_once() {
        let call_count = Arc::new(AtomicUsize::new(0));

        struct CountingTool {
            calls: Arc<AtomicUsize>,
        }
        #[async_trait]
        impl ToolHandler for CountingTool {
            async fn call(&self, _input: serde_json::Value, _ctx: &ToolCtx) -> Result<Vec<ContentBlock>, ToolError> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Ok(vec![ContentBlock::text("tool ran")])
            }
        }

        let responses = vec![
            ChatResponse::complete(
                "r1",
                vec![ContentBlock::ToolUse {
                    id: ToolCallId::new("c1"),
                    name: "lookup".into(),
                    input: json!({}),
                    raw_content: None,
                }],
                None,
            ),
            ChatResponse::complete("r2", vec![ContentBlock::text("final answer")], None),
        ];
        let model = Arc::new(ScriptedModel { responses: Mutex::new(responses) });

        let mut tools = ToolRegistry::new();
        tools.register(ToolDescriptor {
            name: "lookup".into(),
            description: "d".into(),
            input_schema: json!({"type": "object"}),
            group_tag: None,
            handler: Arc::new(CountingTool { calls: call_count.clone() }),
        });

        let engine = ReactEngine::new(
            "agent",
            "mock-model",
            model,
            Memory::new(),
            tools,
            HookBus::new(),
            None,
            EngineConfig::default(),
        );

        let result = engine.call(Some("go".into()), GenerateOptions::default()).await.unwrap();
        assert_eq!(result.text(), "final answer");
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn structured_output_satisfied_on_first_call() {
        let responses = vec![ChatResponse::complete(
            "r1",
            vec![ContentBlock::ToolUse {
                id: ToolCallId::new("c1"),
                name: reagent_structured::GENERATE_RESPONSE_TOOL.into(),
                input: json!({"response": {"location": "SF"}}),
                raw_content: None,
            }],
            None,
        )];
        let model = Arc::new(ScriptedModel { responses: Mutex::new(responses) });

        let schema = json!({"type": "object", "required": ["location"]});
        let coordinator = StructuredOutputCoordinator::new(
            reagent_structured::StructuredOutputMode::ToolChoice,
            schema,
            2,
        );

        let engine = ReactEngine::new(
            "agent",
            "mock-model",
            model,
            Memory::new(),
            ToolRegistry::new(),
            HookBus::new(),
            Some(coordinator),
            EngineConfig::default(),
        );

        let result = engine.call(Some("go".into()), GenerateOptions::default()).await.unwrap();
        assert_eq!(result.metadata.get("structured_data").unwrap()["location"], "SF");
    }

    #[tokio::test]
    async fn overflow_without_finish_triggers_summarize() {
        // Two rounds keep calling a tool (never finishing), so the
        // iteration budget (2) is exhausted and the third, unforced round
        // must be the summarize pass.
        let mut config = EngineConfig::default();
        config.max_iters = 2;

        struct NoopTool;
        #[async_trait]
        impl ToolHandler for NoopTool {
            async fn call(&self, _input: serde_json::Value, _ctx: &ToolCtx) -> Result<Vec<ContentBlock>, ToolError> {
                Ok(vec![ContentBlock::text("noop ran")])
            }
        }
        let mut tools = ToolRegistry::new();
        tools.register(ToolDescriptor {
            name: "noop".into(),
            description: "d".into(),
            input_schema: json!({"type": "object"}),
            group_tag: None,
            handler: Arc::new(NoopTool),
        });

        let model = Arc::new(ScriptedModel {
            responses: Mutex::new(vec![
                ChatResponse::complete(
                    "r1",
                    vec![ContentBlock::ToolUse { id: ToolCallId::new("c1"), name: "noop".into(), input: json!({}), raw_content: None }],
                    None,
                ),
                ChatResponse::complete(
                    "r2",
                    vec![ContentBlock::ToolUse { id: ToolCallId::new("c2"), name: "noop".into(), input: json!({}), raw_content: None }],
                    None,
                ),
                ChatResponse::complete("summary", vec![ContentBlock::text("best effort summary")], None),
            ]),
        });

        let engine = ReactEngine::new(
            "agent",
            "mock-model",
            model,
            Memory::new(),
            tools,
            HookBus::new(),
            None,
            config,
        );

        let result = engine.call(Some("go".into()), GenerateOptions::default()).await.unwrap();
        assert_eq!(result.text(), "best effort summary");
    }

    #[tokio::test]
    async fn call_stream_delivers_reasoning_and_result() {
        let engine = Arc::new(text_only_engine(vec!["streamed answer"]));
        let (mut rx, handle) = engine.call_stream(Some("hi".into()), GenerateOptions::default(), StreamOptions::default());

        let mut saw_reasoning = false;
        while let Some(item) = rx.recv().await {
            if matches!(item, StreamItem::Reasoning(_)) {
                saw_reasoning = true;
            }
        }
        let result = handle.await.unwrap().unwrap();
        assert!(saw_reasoning);
        assert_eq!(result.text(), "streamed answer");
    }
}
