//! Execution context: the host-provided RNG, configuration and choice
//! callbacks.
//!
//! ## Suspension
//!
//! Player decisions are the only suspension points of the interpreter. A
//! handler that needs a decision builds a `ChoiceRequest` and awaits the
//! deciding side's `ChoiceCallback`. Nothing else in the state changes while
//! the future is pending. A callback that never resolves leaves the
//! execution suspended; timing out is the host's business.
//!
//! Whatever a callback returns is sanitized against the request before the
//! handler sees it (see `sanitize_selection`).

use std::collections::VecDeque;

use futures::future::{self, BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{EngineConfig, GameRng};
use crate::state::Side;

/// Indices into `ChoiceRequest::options`.
pub type Selection = SmallVec<[usize; 4]>;

/// What a choice is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChoiceKind {
    /// Cards in a zone.
    Cards,
    /// Pokémon in play.
    Pokemon,
    /// Energy attached to a Pokémon.
    Energy,
    /// A Benched Pokémon to become the new Active Pokémon.
    BenchSlot,
    /// One of a Pokémon's attacks.
    Attack,
}

/// A decision deferred to a player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceRequest {
    pub kind: ChoiceKind,
    pub prompt: String,
    /// Labels of the options, in index order.
    pub options: Vec<String>,
    pub min_selections: usize,
    pub max_selections: usize,
}

impl ChoiceRequest {
    /// A request for exactly one option.
    #[must_use]
    pub fn new(kind: ChoiceKind, prompt: impl Into<String>, options: Vec<String>) -> Self {
        let single = usize::from(!options.is_empty());
        Self {
            kind,
            prompt: prompt.into(),
            options,
            min_selections: single,
            max_selections: single,
        }
    }

    /// Set the allowed selection range, clamped to the option count
    /// (builder pattern).
    #[must_use]
    pub fn with_range(mut self, min: usize, max: usize) -> Self {
        let len = self.options.len();
        self.max_selections = max.min(len);
        self.min_selections = min.min(self.max_selections);
        self
    }
}

/// A source of player decisions.
///
/// Implementations return indices into `request.options`. The engine
/// tolerates bad answers: duplicates and out-of-range indices are dropped
/// and the count is clamped to the request's range.
pub trait ChoiceCallback: Send {
    fn choose<'a>(&'a mut self, request: &'a ChoiceRequest) -> BoxFuture<'a, Vec<usize>>;
}

/// Always picks the first `max_selections` options.
#[derive(Clone, Copy, Debug, Default)]
pub struct AutoChooser;

impl ChoiceCallback for AutoChooser {
    fn choose<'a>(&'a mut self, request: &'a ChoiceRequest) -> BoxFuture<'a, Vec<usize>> {
        future::ready((0..request.max_selections).collect()).boxed()
    }
}

/// Answers from a queue, then picks the way `AutoChooser` does.
#[derive(Clone, Debug, Default)]
pub struct ScriptedChooser {
    answers: VecDeque<Vec<usize>>,
}

impl ScriptedChooser {
    pub fn new(answers: impl IntoIterator<Item = Vec<usize>>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
        }
    }

    /// Answers not consumed yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl ChoiceCallback for ScriptedChooser {
    fn choose<'a>(&'a mut self, request: &'a ChoiceRequest) -> BoxFuture<'a, Vec<usize>> {
        match self.answers.pop_front() {
            Some(answer) => future::ready(answer).boxed(),
            None => future::ready((0..request.max_selections).collect()).boxed(),
        }
    }
}

/// Clamp a callback's answer to what the request allows.
///
/// Keeps the first occurrence of each in-range index, truncates to
/// `max_selections` and tops up with the lowest unselected indices until
/// `min_selections` is reached.
#[must_use]
pub fn sanitize_selection(request: &ChoiceRequest, picked: &[usize]) -> Selection {
    let len = request.options.len();
    let mut selection = Selection::new();

    for &index in picked {
        if selection.len() == request.max_selections {
            break;
        }
        if index < len && !selection.contains(&index) {
            selection.push(index);
        }
    }

    let mut next = 0;
    while selection.len() < request.min_selections && next < len {
        if !selection.contains(&next) {
            selection.push(next);
        }
        next += 1;
    }

    selection
}

/// Everything the interpreter needs from its host.
pub struct ExecutionContext {
    pub rng: GameRng,
    pub config: EngineConfig,
    choose_for_self: Box<dyn ChoiceCallback>,
    choose_for_opponent: Box<dyn ChoiceCallback>,
}

impl ExecutionContext {
    /// A seeded context with automatic choices for both sides.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_rng(GameRng::new(seed))
    }

    /// A context around an existing RNG with automatic choices.
    #[must_use]
    pub fn with_rng(rng: GameRng) -> Self {
        Self {
            rng,
            config: EngineConfig::default(),
            choose_for_self: Box::new(AutoChooser),
            choose_for_opponent: Box::new(AutoChooser),
        }
    }

    /// Set the configuration (builder pattern).
    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the player's chooser (builder pattern).
    #[must_use]
    pub fn with_self_chooser(mut self, chooser: impl ChoiceCallback + 'static) -> Self {
        self.choose_for_self = Box::new(chooser);
        self
    }

    /// Set the opponent's chooser (builder pattern).
    #[must_use]
    pub fn with_opponent_chooser(mut self, chooser: impl ChoiceCallback + 'static) -> Self {
        self.choose_for_opponent = Box::new(chooser);
        self
    }

    /// Ask `side` to decide and wait for the answer.
    pub async fn choose(&mut self, side: Side, request: &ChoiceRequest) -> Selection {
        log::trace!("choice for {side:?}: {} ({} options)", request.prompt, request.options.len());
        let callback = match side {
            Side::Player => &mut self.choose_for_self,
            Side::Opponent => &mut self.choose_for_opponent,
        };
        let picked = callback.choose(request).await;
        sanitize_selection(request, &picked)
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("rng", &self.rng)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    fn request(options: usize, min: usize, max: usize) -> ChoiceRequest {
        let labels = (0..options).map(|i| format!("option {i}")).collect();
        ChoiceRequest::new(ChoiceKind::Cards, "pick", labels).with_range(min, max)
    }

    #[test]
    fn test_sanitize_dedupes_and_drops_out_of_range() {
        let request = request(4, 0, 3);
        let selection = sanitize_selection(&request, &[2, 2, 9, 1]);
        assert_eq!(selection.as_slice(), &[2, 1]);
    }

    #[test]
    fn test_sanitize_truncates_to_max() {
        let request = request(5, 1, 2);
        let selection = sanitize_selection(&request, &[4, 3, 2]);
        assert_eq!(selection.as_slice(), &[4, 3]);
    }

    #[test]
    fn test_sanitize_tops_up_to_min() {
        let request = request(4, 3, 3);
        let selection = sanitize_selection(&request, &[1]);
        assert_eq!(selection.as_slice(), &[1, 0, 2]);
    }

    #[test]
    fn test_with_range_clamps() {
        let request = request(2, 5, 5);
        assert_eq!(request.max_selections, 2);
        assert_eq!(request.min_selections, 2);
    }

    #[test]
    fn test_auto_chooser_takes_first() {
        let request = request(5, 0, 2);
        let mut chooser = AutoChooser;
        assert_eq!(block_on(chooser.choose(&request)), vec![0, 1]);
    }

    #[test]
    fn test_scripted_then_auto() {
        let mut ctx = ExecutionContext::new(1).with_opponent_chooser(ScriptedChooser::new([vec![3]]));
        let request = request(4, 1, 1);

        let first = block_on(ctx.choose(Side::Opponent, &request));
        let second = block_on(ctx.choose(Side::Opponent, &request));
        let mine = block_on(ctx.choose(Side::Player, &request));

        assert_eq!(first.as_slice(), &[3]);
        assert_eq!(second.as_slice(), &[0]);
        assert_eq!(mine.as_slice(), &[0]);
    }

    #[test]
    fn test_scripted_chooser_falls_back_when_empty() {
        let request = request(5, 0, 2);
        let mut chooser = ScriptedChooser::new([vec![4]]);

        assert_eq!(block_on(chooser.choose(&request)), vec![4]);
        assert_eq!(chooser.remaining(), 0);
        assert_eq!(block_on(chooser.choose(&request)), vec![0, 1]);
    }
}
