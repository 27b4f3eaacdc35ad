#![deny(missing_docs)]
//! Hook bus for reagent.
//!
//! The [`HookBus`] collects multiple [`Hook`] implementations into an
//! ordered pipeline. At each hook point, hooks are dispatched in
//! registration order, each seeing the mutations of the ones before it.
//! Hook errors are logged via `tracing` and do not halt the pipeline —
//! callers that need a hook failure to abort the round (e.g. a
//! post-reasoning hook) inspect the returned errors explicitly.

pub mod event;

pub use event::{
    HookEvent, HookPoint, PostActingEvent, PostReasoningEvent, PostToolEvent, PreActingEvent,
    PreReasoningEvent, PreToolEvent, ReasoningChunkEvent,
};

use async_trait::async_trait;
use reagent_core::HookError;
use std::sync::Arc;

/// A pure event handler. Implementations mutate the event's control
/// fields in place and return `Ok(())`, or return `Err` if the hook body
/// itself failed (not the same as a deliberate `skip`/`halt`).
#[async_trait]
pub trait Hook: Send + Sync {
    /// The points this hook should be dispatched at.
    fn points(&self) -> &[HookPoint];

    /// Handle one event, mutating it in place.
    async fn on_event(&self, event: &mut HookEvent) -> Result<(), HookError>;
}

/// One hook's outcome, surfaced to the caller of [`HookBus::dispatch`] so
/// the engine can log or (for post-reasoning hooks) escalate.
#[derive(Debug)]
pub struct HookOutcome {
    /// Hooks that returned an error, in dispatch order.
    pub errors: Vec<HookError>,
}

impl HookOutcome {
    /// True if every dispatched hook succeeded.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// An ordered pipeline of [`Hook`] implementations.
pub struct HookBus {
    hooks: Vec<Arc<dyn Hook>>,
}

impl HookBus {
    /// An empty hook bus.
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Register a hook at the end of the pipeline.
    pub fn add(&mut self, hook: Arc<dyn Hook>) {
        self.hooks.push(hook);
    }

    /// Dispatch `event` through every hook registered for its
    /// [`HookPoint`], in registration order, mutating it in place.
    pub async fn dispatch(&self, event: &mut HookEvent) -> HookOutcome {
        let point = event.point();
        let mut errors = Vec::new();

        for hook in &self.hooks {
            if !hook.points().contains(&point) {
                continue;
            }

            if let Err(e) = hook.on_event(event).await {
                tracing::warn!(hook_point = ?point, error = %e, "hook failed");
                errors.push(e);
            }
        }

        HookOutcome { errors }
    }
}

impl Default for HookBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use event::PreToolEvent;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHook {
        points: Vec<HookPoint>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Hook for CountingHook {
        fn points(&self) -> &[HookPoint] {
            &self.points
        }

        async fn on_event(&self, _event: &mut HookEvent) -> Result<(), HookError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct SkippingHook;

    #[async_trait]
    impl Hook for SkippingHook {
        fn points(&self) -> &[HookPoint] {
            &[HookPoint::PreTool]
        }

        async fn on_event(&self, event: &mut HookEvent) -> Result<(), HookError> {
            if let HookEvent::PreTool(ev) = event {
                ev.skip = true;
                ev.skip_reason = Some("blocked by policy".into());
            }
            Ok(())
        }
    }

    fn pre_tool_event() -> HookEvent {
        HookEvent::PreTool(PreToolEvent {
            agent_name: "a".into(),
            tool_name: "lookup".into(),
            tool_input: serde_json::json!({}),
            skip: false,
            skip_reason: None,
            override_input: None,
        })
    }

    #[tokio::test]
    async fn only_dispatches_to_registered_points() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut bus = HookBus::new();
        bus.add(Arc::new(CountingHook {
            points: vec![HookPoint::PostTool],
            calls: calls.clone(),
        }));

        let mut event = pre_tool_event();
        bus.dispatch(&mut event).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn mutation_is_visible_after_dispatch() {
        let mut bus = HookBus::new();
        bus.add(Arc::new(SkippingHook));

        let mut event = pre_tool_event();
        let outcome = bus.dispatch(&mut event).await;

        assert!(outcome.is_ok());
        match event {
            HookEvent::PreTool(ev) => {
                assert!(ev.skip);
                assert_eq!(ev.skip_reason.as_deref(), Some("blocked by policy"));
            }
            _ => panic!("expected PreTool"),
        }
    }

    #[tokio::test]
    async fn errors_are_collected_not_fatal() {
        struct FailingHook;
        #[async_trait]
        impl Hook for FailingHook {
            fn points(&self) -> &[HookPoint] {
                &[HookPoint::PreTool]
            }
            async fn on_event(&self, _event: &mut HookEvent) -> Result<(), HookError> {
                Err(HookError::Failed("boom".into()))
            }
        }

        let calls = Arc::new(AtomicUsize::new(0));
        let mut bus = HookBus::new();
        bus.add(Arc::new(FailingHook));
        bus.add(Arc::new(CountingHook {
            points: vec![HookPoint::PreTool],
            calls: calls.clone(),
        }));

        let mut event = pre_tool_event();
        let outcome = bus.dispatch(&mut event).await;

        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1, "later hooks still run");
    }
}
