//! Tool descriptors, the active-group filter, and timeout-guarded dispatch.

use async_trait::async_trait;
use reagent_core::{ContentBlock, ToolCallId, ToolError};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

/// JSON Schema for a tool's parameters, as exposed to the Model each round.
pub type ToolSchema = serde_json::Value;

/// Per-call context passed to a [`ToolHandler`].
///
/// Minimal by design: the engine is the only caller and has already
/// resolved the agent/session identity by the time a handler runs.
#[derive(Debug, Clone, Default)]
pub struct ToolCtx {
    /// Name of the agent invoking the tool, for logging/attribution.
    pub agent_name: String,
    /// Correlates this invocation with its `ToolUse` block.
    pub call_id: Option<ToolCallId>,
}

/// Object-safe handler for one registered tool.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Execute with the given (already schema-validated by the caller, if
    /// at all) input.
    async fn call(
        &self,
        input: serde_json::Value,
        ctx: &ToolCtx,
    ) -> Result<Vec<ContentBlock>, ToolError>;
}

#[async_trait]
impl<F, Fut> ToolHandler for F
where
    F: Fn(serde_json::Value, ToolCtx) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<Vec<ContentBlock>, ToolError>> + Send,
{
    async fn call(
        &self,
        input: serde_json::Value,
        ctx: &ToolCtx,
    ) -> Result<Vec<ContentBlock>, ToolError> {
        (self)(input, ctx.clone()).await
    }
}

/// A registered tool: static metadata plus its handler.
#[derive(Clone)]
pub struct ToolDescriptor {
    /// Unique name the model calls this tool by.
    pub name: String,
    /// Description sent to the model alongside the schema.
    pub description: String,
    /// JSON Schema for the tool's input.
    pub input_schema: ToolSchema,
    /// Optional group tag used by active-group filtering. Tools with no
    /// tag are always exposed regardless of the active-group filter.
    pub group_tag: Option<String>,
    /// The handler invoked on a call.
    pub handler: Arc<dyn ToolHandler>,
}

impl ToolDescriptor {
    /// Convert to the `{name, description, input_schema}` shape the Model
    /// interface expects.
    pub fn to_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "description": self.description,
            "input_schema": self.input_schema,
        })
    }
}

/// Registry of tool descriptors, with active-group filtering and
/// timeout-guarded invocation.
///
/// When `active_groups` is `None`, every registered tool is exposed. When
/// it is `Some(set)`, a tool is exposed iff it has no `group_tag` or its
/// `group_tag` is a member of `set`.
pub struct ToolRegistry {
    tools: HashMap<String, ToolDescriptor>,
    active_groups: Option<HashSet<String>>,
}

impl ToolRegistry {
    /// An empty registry with no group filter (all future registrations
    /// are exposed).
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            active_groups: None,
        }
    }

    /// Register a tool, overwriting any existing tool with the same name.
    pub fn register(&mut self, tool: ToolDescriptor) {
        self.tools.insert(tool.name.clone(), tool);
    }

    /// Restrict exposed tools to `groups` (plus any ungrouped tool).
    pub fn set_active_groups(&mut self, groups: HashSet<String>) {
        self.active_groups = Some(groups);
    }

    /// Remove the active-group filter; every registered tool is exposed.
    pub fn clear_active_groups(&mut self) {
        self.active_groups = None;
    }

    /// The currently configured active groups, if filtering is enabled.
    pub fn active_groups(&self) -> Option<&HashSet<String>> {
        self.active_groups.as_ref()
    }

    fn is_exposed(&self, tool: &ToolDescriptor) -> bool {
        match (&self.active_groups, &tool.group_tag) {
            (None, _) => true,
            (Some(_), None) => true,
            (Some(groups), Some(tag)) => groups.contains(tag),
        }
    }

    /// Tool schemas for every exposed tool, for inclusion in the next
    /// Model call.
    pub fn tool_schemas(&self) -> Vec<serde_json::Value> {
        self.tools
            .values()
            .filter(|t| self.is_exposed(t))
            .map(ToolDescriptor::to_schema)
            .collect()
    }

    /// Look up a descriptor by name, regardless of active-group filtering
    /// (a tool hidden from the model this round may still have been
    /// requested on a stale transcript; the engine decides whether to honor it).
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.get(name)
    }

    /// Number of registered tools (not filtered by active groups).
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invoke `name` with `input`, enforcing `timeout`.
    ///
    /// Never returns an `Err` to the caller: a missing tool, handler
    /// failure, or elapsed timeout all become a single `Error: …` text
    /// block, matching the toolkit's error-capture contract. The engine
    /// is responsible for wrapping the result into a `ToolResult` block
    /// and marking `is_error`.
    pub async fn invoke(
        &self,
        name: &str,
        input: serde_json::Value,
        ctx: &ToolCtx,
        timeout: Duration,
    ) -> Result<Vec<ContentBlock>, ToolError> {
        let Some(tool) = self.tools.get(name) else {
            return Err(ToolError::NotFound(name.to_string()));
        };

        match tokio::time::timeout(timeout, tool.handler.call(input, ctx)).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(e),
            Err(_elapsed) => Err(ToolError::Timeout(timeout)),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
