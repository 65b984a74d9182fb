//! Effect executor: handler registry and dispatch.
//!
//! ## Execution order
//!
//! `execute_all` threads the state through a sequence strictly in order. A
//! single `execute` call:
//!
//! 1. Evaluates the effect's conditions, if any. A passing chain that
//!    surfaces success effects runs those instead of the effect itself. A
//!    failing chain runs its failure effects, or logs that the condition
//!    was not met.
//! 2. Dispatches to the handler registered for the effect type.
//! 3. Runs whatever follow-up effects the handler queued.
//!
//! Messages are concatenated in execution order. Nothing here fails: an
//! unregistered type yields an `Info` message and the unchanged state.

use futures::future::{BoxFuture, FutureExt};
use rustc_hash::FxHashMap;

use super::condition::evaluate_conditions;
use super::context::ExecutionContext;
use super::handlers::{standard_handlers, Handler};
use super::message::{Message, MessageKind};
use crate::effects::{Effect, EffectType};
use crate::state::GameState;

/// Final state and log of an execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionResult {
    pub state: GameState,
    pub messages: Vec<Message>,
}

impl ExecutionResult {
    /// Message kinds in order.
    #[must_use]
    pub fn message_kinds(&self) -> Vec<MessageKind> {
        self.messages.iter().map(|m| m.kind).collect()
    }
}

/// Maps effect types to handlers.
#[derive(Clone)]
pub struct EffectExecutor {
    handlers: FxHashMap<EffectType, Handler>,
}

impl Default for EffectExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EffectExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<String> = self.handlers.keys().map(ToString::to_string).collect();
        types.sort();
        f.debug_struct("EffectExecutor").field("handlers", &types).finish()
    }
}

impl EffectExecutor {
    /// An executor with every built-in handler registered.
    #[must_use]
    pub fn new() -> Self {
        let mut executor = Self::empty();
        for (effect_type, handler) in standard_handlers() {
            executor.register(effect_type, handler);
        }
        executor
    }

    /// An executor with no handlers.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            handlers: FxHashMap::default(),
        }
    }

    /// Register a handler, returning the one it replaces.
    pub fn register(&mut self, effect_type: EffectType, handler: Handler) -> Option<Handler> {
        self.handlers.insert(effect_type, handler)
    }

    /// Whether a handler is registered for a type.
    #[must_use]
    pub fn handles(&self, effect_type: EffectType) -> bool {
        self.handlers.contains_key(&effect_type)
    }

    /// Execute one effect, including its condition routing and any
    /// follow-up effects.
    pub fn execute<'a>(
        &'a self,
        state: GameState,
        effect: &'a Effect,
        ctx: &'a mut ExecutionContext,
    ) -> BoxFuture<'a, ExecutionResult> {
        async move {
            let mut messages = Vec::new();
            let unconditioned;
            let to_run = if effect.conditions.is_empty() {
                effect
            } else {
                let outcome = evaluate_conditions(&state, &effect.conditions, ctx);
                messages.extend(outcome.messages);

                let branch = if outcome.passed {
                    outcome.success_effects
                } else {
                    outcome.failure_effects
                };
                if !branch.is_empty() {
                    log::debug!(
                        "{} effect: condition {}, running {} continuation effect(s)",
                        effect.effect_type(),
                        if outcome.passed { "passed" } else { "failed" },
                        branch.len()
                    );
                    let result = self.execute_all(state, &branch, ctx).await;
                    messages.extend(result.messages);
                    return ExecutionResult {
                        state: result.state,
                        messages,
                    };
                }
                if !outcome.passed {
                    messages.push(Message::new(MessageKind::Condition, "Condition not met"));
                    return ExecutionResult { state, messages };
                }
                unconditioned = effect.without_conditions();
                &unconditioned
            };

            let effect_type = to_run.effect_type();
            let Some(handler) = self.handlers.get(&effect_type).copied() else {
                log::warn!("no handler for effect type '{effect_type}'");
                messages.push(Message::info(format!("Unknown effect type: {effect_type}")));
                return ExecutionResult { state, messages };
            };

            log::debug!("executing {effect_type} effect");
            let outcome = handler(state, to_run, ctx).await;
            messages.extend(outcome.messages);
            if outcome.pending.is_empty() {
                return ExecutionResult {
                    state: outcome.state,
                    messages,
                };
            }

            let result = self.execute_all(outcome.state, &outcome.pending, ctx).await;
            messages.extend(result.messages);
            ExecutionResult {
                state: result.state,
                messages,
            }
        }
        .boxed()
    }

    /// Execute effects in order, feeding each resulting state into the next.
    pub fn execute_all<'a>(
        &'a self,
        state: GameState,
        effects: &'a [Effect],
        ctx: &'a mut ExecutionContext,
    ) -> BoxFuture<'a, ExecutionResult> {
        async move {
            let mut state = state;
            let mut messages = Vec::new();
            for effect in effects {
                let result = self.execute(state, effect, ctx).await;
                state = result.state;
                messages.extend(result.messages);
            }
            ExecutionResult { state, messages }
        }
        .boxed()
    }
}

/// Execute one effect with the built-in handlers.
pub fn execute_effect<'a>(
    state: GameState,
    effect: &'a Effect,
    ctx: &'a mut ExecutionContext,
) -> BoxFuture<'a, ExecutionResult> {
    async move {
        let executor = EffectExecutor::new();
        executor.execute(state, effect, ctx).await
    }
    .boxed()
}

/// Execute a sequence of effects with the built-in handlers.
pub fn execute_effects<'a>(
    state: GameState,
    effects: &'a [Effect],
    ctx: &'a mut ExecutionContext,
) -> BoxFuture<'a, ExecutionResult> {
    async move {
        let executor = EffectExecutor::new();
        executor.execute_all(state, effects, ctx).await
    }
    .boxed()
}
