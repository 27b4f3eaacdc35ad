//! The four tools the plan notebook exposes to the model.

use crate::state::{Plan, PlanNotebook, SubTask, SubTaskState};
use reagent_core::ContentBlock;
use reagent_tool::{ToolCtx, ToolDescriptor, ToolHandler};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use reagent_core::ToolError;
use async_trait::async_trait;

fn bad_input(e: impl std::fmt::Display) -> ToolError {
    ToolError::InvalidInput(e.to_string())
}

#[derive(Deserialize)]
struct CreatePlanInput {
    name: String,
    description: String,
    expected_outcome: String,
    subtasks: Vec<CreateSubTaskInput>,
}

#[derive(Deserialize)]
struct CreateSubTaskInput {
    id: String,
    name: String,
    description: String,
    expected_outcome: String,
}

struct CreatePlanTool {
    notebook: Arc<Mutex<PlanNotebook>>,
}

#[async_trait]
impl ToolHandler for CreatePlanTool {
    async fn call(&self, input: Value, _ctx: &ToolCtx) -> Result<Vec<ContentBlock>, ToolError> {
        let input: CreatePlanInput = serde_json::from_value(input).map_err(bad_input)?;
        let plan = Plan {
            id: format!("plan_{}", input.name.to_lowercase().replace(' ', "_")),
            name: input.name,
            description: input.description,
            expected_outcome: input.expected_outcome,
            subtasks: input
                .subtasks
                .into_iter()
                .map(|s| SubTask::new(s.id, s.name, s.description, s.expected_outcome))
                .collect(),
        };
        let count = plan.subtasks.len();
        let mut notebook = self.notebook.lock().await;
        notebook
            .create_plan(plan)
            .map_err(ToolError::ExecutionFailed)?;
        Ok(vec![ContentBlock::text(format!(
            "Plan created with {count} subtask(s)."
        ))])
    }
}

#[derive(Deserialize)]
struct UpdateSubtaskStateInput {
    subtask_id: String,
    state: SubTaskState,
    #[serde(default)]
    #[allow(dead_code)]
    note: Option<String>,
}

struct UpdateSubtaskStateTool {
    notebook: Arc<Mutex<PlanNotebook>>,
}

#[async_trait]
impl ToolHandler for UpdateSubtaskStateTool {
    async fn call(&self, input: Value, _ctx: &ToolCtx) -> Result<Vec<ContentBlock>, ToolError> {
        let input: UpdateSubtaskStateInput = serde_json::from_value(input).map_err(bad_input)?;
        let mut notebook = self.notebook.lock().await;
        notebook
            .update_subtask_state(&input.subtask_id, input.state)
            .map_err(ToolError::ExecutionFailed)?;
        Ok(vec![ContentBlock::text(format!(
            "Subtask {} moved to {:?}.",
            input.subtask_id, input.state
        ))])
    }
}

#[derive(Deserialize)]
struct FinishSubtaskInput {
    subtask_id: String,
    #[serde(default)]
    evidence: Option<String>,
}

struct FinishSubtaskTool {
    notebook: Arc<Mutex<PlanNotebook>>,
}

#[async_trait]
impl ToolHandler for FinishSubtaskTool {
    async fn call(&self, input: Value, _ctx: &ToolCtx) -> Result<Vec<ContentBlock>, ToolError> {
        let input: FinishSubtaskInput = serde_json::from_value(input).map_err(bad_input)?;
        let mut notebook = self.notebook.lock().await;
        notebook
            .finish_subtask(&input.subtask_id, input.evidence)
            .map_err(ToolError::ExecutionFailed)?;
        Ok(vec![ContentBlock::text(format!(
            "Subtask {} finished.",
            input.subtask_id
        ))])
    }
}

#[derive(Deserialize)]
struct FinishPlanInput {
    summary: String,
}

struct FinishPlanTool {
    notebook: Arc<Mutex<PlanNotebook>>,
}

#[async_trait]
impl ToolHandler for FinishPlanTool {
    async fn call(&self, input: Value, _ctx: &ToolCtx) -> Result<Vec<ContentBlock>, ToolError> {
        let input: FinishPlanInput = serde_json::from_value(input).map_err(bad_input)?;
        let notebook = self.notebook.lock().await;
        notebook.finish_plan().map_err(ToolError::ExecutionFailed)?;
        Ok(vec![ContentBlock::text(input.summary)])
    }
}

/// Build the four plan-notebook tool descriptors, all sharing `notebook`.
pub fn tool_descriptors(notebook: Arc<Mutex<PlanNotebook>>) -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: "create_plan".into(),
            description: "Create (or replace) the active plan with an ordered list of subtasks.".into(),
            input_schema: json!({
                "type": "object",
                "required": ["name", "description", "expected_outcome", "subtasks"],
                "properties": {
                    "name": {"type": "string"},
                    "description": {"type": "string"},
                    "expected_outcome": {"type": "string"},
                    "subtasks": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "required": ["id", "name", "description", "expected_outcome"],
                            "properties": {
                                "id": {"type": "string"},
                                "name": {"type": "string"},
                                "description": {"type": "string"},
                                "expected_outcome": {"type": "string"}
                            }
                        }
                    }
                }
            }),
            group_tag: None,
            handler: Arc::new(CreatePlanTool { notebook: notebook.clone() }),
        },
        ToolDescriptor {
            name: "update_subtask_state".into(),
            description: "Transition a subtask to a new state (TODO -> IN_PROGRESS -> DONE/ABANDONED).".into(),
            input_schema: json!({
                "type": "object",
                "required": ["subtask_id", "state"],
                "properties": {
                    "subtask_id": {"type": "string"},
                    "state": {"type": "string", "enum": ["TODO", "IN_PROGRESS", "DONE", "ABANDONED"]},
                    "note": {"type": "string"}
                }
            }),
            group_tag: None,
            handler: Arc::new(UpdateSubtaskStateTool { notebook: notebook.clone() }),
        },
        ToolDescriptor {
            name: "finish_subtask".into(),
            description: "Mark a subtask DONE and record evidence that it was completed.".into(),
            input_schema: json!({
                "type": "object",
                "required": ["subtask_id"],
                "properties": {
                    "subtask_id": {"type": "string"},
                    "evidence": {"type": "string"}
                }
            }),
            group_tag: None,
            handler: Arc::new(FinishSubtaskTool { notebook: notebook.clone() }),
        },
        ToolDescriptor {
            name: "finish_plan".into(),
            description: "Finish the plan once every subtask is DONE or ABANDONED. Ends the turn.".into(),
            input_schema: json!({
                "type": "object",
                "required": ["summary"],
                "properties": { "summary": {"type": "string"} }
            }),
            group_tag: None,
            handler: Arc::new(FinishPlanTool { notebook }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notebook() -> Arc<Mutex<PlanNotebook>> {
        Arc::new(Mutex::new(PlanNotebook::new(5)))
    }

    #[tokio::test]
    async fn create_plan_then_finish_subtask_then_finish_plan() {
        let nb = notebook();
        let tools = tool_descriptors(nb.clone());
        let ctx = ToolCtx::default();

        tools[0]
            .handler
            .call(
                json!({
                    "name": "Ship it",
                    "description": "desc",
                    "expected_outcome": "shipped",
                    "subtasks": [
                        {"id": "t0", "name": "Write code", "description": "d", "expected_outcome": "e"}
                    ]
                }),
                &ctx,
            )
            .await
            .unwrap();

        tools[1]
            .handler
            .call(json!({"subtask_id": "t0", "state": "IN_PROGRESS"}), &ctx)
            .await
            .unwrap();

        tools[2]
            .handler
            .call(json!({"subtask_id": "t0"}), &ctx)
            .await
            .unwrap();

        let out = tools[3]
            .handler
            .call(json!({"summary": "all done"}), &ctx)
            .await
            .unwrap();
        assert_eq!(out[0].as_text(), Some("all done"));

        let locked = nb.lock().await;
        assert_eq!(
            locked.plan.as_ref().unwrap().subtasks[0].finish_evidence.as_deref(),
            Some("")
        );
    }

    #[tokio::test]
    async fn create_plan_over_budget_surfaces_as_tool_error() {
        let nb = Arc::new(Mutex::new(PlanNotebook::new(0)));
        let tools = tool_descriptors(nb);
        let err = tools[0]
            .handler
            .call(
                json!({
                    "name": "n", "description": "d", "expected_outcome": "e",
                    "subtasks": [{"id": "t0", "name": "n", "description": "d", "expected_outcome": "e"}]
                }),
                &ToolCtx::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::ExecutionFailed(_)));
    }
}
