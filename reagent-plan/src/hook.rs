//! Pre-reasoning hook that appends a rendered plan view to the transcript
//! whenever a plan is active, so the model can reference current subtask
//! state without re-deriving it from tool-result history.

use crate::state::PlanNotebook;
use async_trait::async_trait;
use reagent_core::{HookError, Msg, MsgId};
use reagent_hooks::{Hook, HookEvent, HookPoint};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Registered at [`HookPoint::PreReasoning`]; a no-op when no plan is active.
pub struct PlanViewHook {
    notebook: Arc<Mutex<PlanNotebook>>,
    points: [HookPoint; 1],
    hint_counter: AtomicU64,
}

impl PlanViewHook {
    /// Build a hook sharing `notebook` with the plan-notebook tools.
    pub fn new(notebook: Arc<Mutex<PlanNotebook>>) -> Self {
        Self {
            notebook,
            points: [HookPoint::PreReasoning],
            hint_counter: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl Hook for PlanViewHook {
    fn points(&self) -> &[HookPoint] {
        &self.points
    }

    async fn on_event(&self, event: &mut HookEvent) -> Result<(), HookError> {
        let HookEvent::PreReasoning(ev) = event else {
            return Ok(());
        };

        let notebook = self.notebook.lock().await;
        let Some(plan) = notebook.plan.as_ref() else {
            return Ok(());
        };

        let rendered = format!("<system-hint>\n{}</system-hint>", plan.render());
        let id = MsgId::from_counter(self.hint_counter.fetch_add(1, Ordering::SeqCst));
        ev.messages.push(Msg::hint(id, "plan_notebook", rendered, Default::default()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Plan, SubTask};
    use reagent_core::GenerateOptions;
    use reagent_hooks::PreReasoningEvent;

    fn plan_with_one_subtask() -> Plan {
        Plan {
            id: "p1".into(),
            name: "Ship it".into(),
            description: "desc".into(),
            expected_outcome: "shipped".into(),
            subtasks: vec![SubTask::new("t0", "Write code", "d", "e")],
        }
    }

    #[tokio::test]
    async fn appends_nothing_when_no_plan_active() {
        let nb = Arc::new(Mutex::new(PlanNotebook::new(5)));
        let hook = PlanViewHook::new(nb);
        let mut event = HookEvent::PreReasoning(PreReasoningEvent {
            agent_name: "a".into(),
            model_name: "m".into(),
            options: GenerateOptions::default(),
            messages: vec![],
        });
        hook.on_event(&mut event).await.unwrap();
        match event {
            HookEvent::PreReasoning(ev) => assert!(ev.messages.is_empty()),
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn appends_rendered_plan_when_active() {
        let mut nb = PlanNotebook::new(5);
        nb.create_plan(plan_with_one_subtask()).unwrap();
        let nb = Arc::new(Mutex::new(nb));
        let hook = PlanViewHook::new(nb);

        let mut event = HookEvent::PreReasoning(PreReasoningEvent {
            agent_name: "a".into(),
            model_name: "m".into(),
            options: GenerateOptions::default(),
            messages: vec![],
        });
        hook.on_event(&mut event).await.unwrap();
        match event {
            HookEvent::PreReasoning(ev) => {
                assert_eq!(ev.messages.len(), 1);
                let text = ev.messages[0].text();
                assert!(text.starts_with("<system-hint>"));
                assert!(text.contains("Write code"));
            }
            _ => unreachable!(),
        }
    }
}
