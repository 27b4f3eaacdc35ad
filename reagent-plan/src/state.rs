//! Plan and subtask types, and the notebook holding at most one active plan.
//!
//! Written by the `create_plan`/`update_subtask_state`/`finish_subtask`
//! tool handlers; read by the pre-reasoning plan-view hook and by
//! `finish_plan` to check terminality.

use serde::{Deserialize, Serialize};

/// Execution status of a single subtask.
///
/// Written by `update_subtask_state`/`finish_subtask`: TODO until picked
/// up, IN_PROGRESS while worked, DONE or ABANDONED once terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubTaskState {
    /// Not yet started.
    Todo,
    /// Currently being worked.
    InProgress,
    /// Completed successfully; `finish_evidence` is set.
    Done,
    /// Abandoned without completion.
    Abandoned,
}

impl SubTaskState {
    /// Whether `self` is a terminal state (`finish_plan` requires all
    /// subtasks to be terminal).
    pub fn is_terminal(self) -> bool {
        matches!(self, SubTaskState::Done | SubTaskState::Abandoned)
    }

    /// Whether a transition from `self` to `next` is on the allowed graph:
    /// TODO → IN_PROGRESS → {DONE, ABANDONED} only.
    pub fn can_transition_to(self, next: SubTaskState) -> bool {
        matches!(
            (self, next),
            (SubTaskState::Todo, SubTaskState::InProgress)
                | (SubTaskState::InProgress, SubTaskState::Done)
                | (SubTaskState::InProgress, SubTaskState::Abandoned)
        )
    }
}

/// One unit of work within a plan.
///
/// Order of creation is preserved in `Plan::subtasks`; subtasks are never
/// reordered by a state transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubTask {
    /// Unique id within the owning plan.
    pub id: String,
    /// Short name.
    pub name: String,
    /// Longer description of the work.
    pub description: String,
    /// What "done" looks like for this subtask.
    pub expected_outcome: String,
    /// Current lifecycle state.
    pub state: SubTaskState,
    /// Evidence recorded by `finish_subtask`. Empty until finished; an
    /// empty string is a valid, final value (a missing-evidence call is
    /// coerced to this rather than rejected).
    #[serde(default)]
    pub finish_evidence: Option<String>,
}

impl SubTask {
    /// A freshly created subtask: TODO, no evidence yet.
    pub fn new(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>, expected_outcome: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            expected_outcome: expected_outcome.into(),
            state: SubTaskState::Todo,
            finish_evidence: None,
        }
    }
}

/// A plan: a name/description/expected-outcome plus an ordered list of
/// subtasks. At most one plan is active in a [`PlanNotebook`] at a time;
/// `create_plan` replaces it atomically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Unique id for this plan.
    pub id: String,
    /// Short name.
    pub name: String,
    /// Longer description.
    pub description: String,
    /// What success looks like overall.
    pub expected_outcome: String,
    /// Subtasks, in creation order.
    pub subtasks: Vec<SubTask>,
}

impl Plan {
    /// True once every subtask is terminal (DONE or ABANDONED).
    pub fn all_subtasks_terminal(&self) -> bool {
        self.subtasks.iter().all(|s| s.state.is_terminal())
    }

    fn subtask_mut(&mut self, id: &str) -> Option<&mut SubTask> {
        self.subtasks.iter_mut().find(|s| s.id == id)
    }

    /// Render a compact view of this plan, for the pre-reasoning hint.
    pub fn render(&self) -> String {
        let mut out = format!("Plan: {} — {}\n", self.name, self.description);
        for s in &self.subtasks {
            out.push_str(&format!("  [{:?}] {} — {}\n", s.state, s.id, s.name));
        }
        out
    }
}

/// Holds at most one active [`Plan`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanNotebook {
    /// The active plan, if any.
    #[serde(default)]
    pub plan: Option<Plan>,
    /// Upper bound on `Plan::subtasks.len()` enforced by `create_plan`.
    #[serde(default = "default_max_subtasks")]
    pub max_subtasks: usize,
}

fn default_max_subtasks() -> usize {
    20
}

impl Default for PlanNotebook {
    fn default() -> Self {
        Self {
            plan: None,
            max_subtasks: default_max_subtasks(),
        }
    }
}

impl PlanNotebook {
    /// A notebook with no active plan and the default subtask cap.
    pub fn new(max_subtasks: usize) -> Self {
        Self {
            plan: None,
            max_subtasks,
        }
    }

    /// Replace the active plan, failing if `subtasks.len() > max_subtasks`.
    pub fn create_plan(&mut self, plan: Plan) -> Result<(), String> {
        if plan.subtasks.len() > self.max_subtasks {
            return Err(format!(
                "plan has {} subtasks, exceeding the maximum of {}",
                plan.subtasks.len(),
                self.max_subtasks
            ));
        }
        self.plan = Some(plan);
        Ok(())
    }

    /// Transition `subtask_id` to `next`, rejecting illegal transitions.
    pub fn update_subtask_state(&mut self, subtask_id: &str, next: SubTaskState) -> Result<(), String> {
        let plan = self.plan.as_mut().ok_or_else(|| "no active plan".to_string())?;
        let subtask = plan
            .subtask_mut(subtask_id)
            .ok_or_else(|| format!("no subtask \"{subtask_id}\" in the active plan"))?;
        if !subtask.state.can_transition_to(next) {
            return Err(format!("illegal transition {:?} -> {:?}", subtask.state, next));
        }
        subtask.state = next;
        Ok(())
    }

    /// Mark `subtask_id` DONE and record `evidence`. A missing/absent
    /// evidence argument is coerced to an empty string rather than
    /// rejected.
    pub fn finish_subtask(&mut self, subtask_id: &str, evidence: Option<String>) -> Result<(), String> {
        let plan = self.plan.as_mut().ok_or_else(|| "no active plan".to_string())?;
        let subtask = plan
            .subtask_mut(subtask_id)
            .ok_or_else(|| format!("no subtask \"{subtask_id}\" in the active plan"))?;
        if !subtask.state.can_transition_to(SubTaskState::Done) {
            return Err(format!("illegal transition {:?} -> Done", subtask.state));
        }
        subtask.state = SubTaskState::Done;
        subtask.finish_evidence = Some(evidence.unwrap_or_default());
        Ok(())
    }

    /// Require all subtasks terminal, then return the active plan so the
    /// caller can record a summary and finish the turn.
    pub fn finish_plan(&self) -> Result<&Plan, String> {
        let plan = self.plan.as_ref().ok_or_else(|| "no active plan".to_string())?;
        if !plan.all_subtasks_terminal() {
            return Err("not all subtasks are terminal (DONE or ABANDONED)".to_string());
        }
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_plan(n_subtasks: usize) -> Plan {
        Plan {
            id: "p1".into(),
            name: "Ship feature".into(),
            description: "Implement and test the thing".into(),
            expected_outcome: "Feature merged".into(),
            subtasks: (0..n_subtasks)
                .map(|i| SubTask::new(format!("t{i}"), format!("Task {i}"), "do it", "done"))
                .collect(),
        }
    }

    #[test]
    fn create_plan_rejects_over_budget_subtask_count() {
        let mut nb = PlanNotebook::new(2);
        let err = nb.create_plan(sample_plan(3)).unwrap_err();
        assert!(err.contains("exceeding"));
        assert!(nb.plan.is_none());
    }

    #[test]
    fn legal_transition_graph_is_enforced() {
        let mut nb = PlanNotebook::new(5);
        nb.create_plan(sample_plan(1)).unwrap();

        nb.update_subtask_state("t0", SubTaskState::InProgress).unwrap();
        let err = nb.update_subtask_state("t0", SubTaskState::Todo).unwrap_err();
        assert!(err.contains("illegal transition"));

        nb.update_subtask_state("t0", SubTaskState::Done).unwrap();
        let err = nb.update_subtask_state("t0", SubTaskState::Abandoned).unwrap_err();
        assert!(err.contains("illegal transition"));
    }

    #[test]
    fn finish_subtask_with_missing_evidence_is_coerced_to_empty() {
        let mut nb = PlanNotebook::new(5);
        nb.create_plan(sample_plan(1)).unwrap();
        nb.update_subtask_state("t0", SubTaskState::InProgress).unwrap();
        nb.finish_subtask("t0", None).unwrap();
        let subtask = &nb.plan.as_ref().unwrap().subtasks[0];
        assert_eq!(subtask.state, SubTaskState::Done);
        assert_eq!(subtask.finish_evidence.as_deref(), Some(""));
    }

    #[test]
    fn finish_plan_requires_every_subtask_terminal() {
        let mut nb = PlanNotebook::new(5);
        nb.create_plan(sample_plan(2)).unwrap();
        nb.update_subtask_state("t0", SubTaskState::InProgress).unwrap();
        nb.finish_subtask("t0", Some("done".into())).unwrap();

        assert!(nb.finish_plan().is_err(), "t1 is still TODO");

        nb.update_subtask_state("t1", SubTaskState::InProgress).unwrap();
        nb.update_subtask_state("t1", SubTaskState::Abandoned).unwrap();
        assert!(nb.finish_plan().is_ok());
    }

    #[test]
    fn subtask_order_is_preserved_across_transitions() {
        let mut nb = PlanNotebook::new(5);
        nb.create_plan(sample_plan(3)).unwrap();
        nb.update_subtask_state("t1", SubTaskState::InProgress).unwrap();
        let ids: Vec<_> = nb.plan.unwrap().subtasks.into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec!["t0", "t1", "t2"]);
    }
}
