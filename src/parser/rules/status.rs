//! Special condition matcher.

use regex_lite::Regex;

use super::{attach_condition, CONDITIONAL_MARKERS};
use crate::effects::{Condition, Effect, LocationType, Target};
use crate::parser::registry::{ParserRegistry, RuleParser};
use crate::parser::text::{capture_u32, compile, has_any, pokemon_scope, statuses};

/// "相手のバトルポケモンをマヒにする", "このポケモンはねむりになる",
/// including a leading coin flip ("コインを1回投げオモテなら、…").
pub struct StatusParser {
    coins: Regex,
}

impl StatusParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            coins: compile(r"コインを(\d+)回投げ"),
        }
    }

    fn coin_condition(&self, clause: &str) -> Option<Condition> {
        let coins = capture_u32(&self.coins, clause)?;
        if clause.contains("ウラなら") {
            Some(Condition::coin_flip_tails())
        } else if clause.contains("すべてオモテ") {
            Some(Condition::coin_flip(coins, coins))
        } else {
            Some(Condition::coin_flip(coins, 1))
        }
    }
}

impl Default for StatusParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleParser for StatusParser {
    fn name(&self) -> &'static str {
        "status"
    }

    fn can_parse(&self, clause: &str) -> bool {
        if statuses(clause).is_empty()
            || !has_any(clause, &["にする", "になる"])
            || clause.contains("回復")
        {
            return false;
        }
        if !has_any(clause, &CONDITIONAL_MARKERS) {
            return true;
        }
        // Other conditions, and coin flips gating several clauses, belong to
        // the condition-check parser.
        self.coins.is_match(clause) && !has_any(clause, &["して、", "してから、"])
    }

    fn parse(&self, clause: &str, _registry: &ParserRegistry) -> Vec<Effect> {
        // Only the words after the condition name the target.
        let body = clause.rsplit("なら、").next().unwrap_or(clause);
        let target = Target::pokemon(pokemon_scope(body), LocationType::Active);

        let effects: Vec<Effect> = statuses(body)
            .into_iter()
            .map(|status| Effect::status(status, target.clone()))
            .collect();

        match self.coin_condition(clause) {
            Some(condition) => attach_condition(effects, condition),
            None => effects,
        }
    }
}
