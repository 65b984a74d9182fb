//! Text normalization and the small extraction helpers rule parsers share.

use regex_lite::Regex;

use crate::effects::{Comparison, Filter, PlayerScope, Stage, TargetKind, TrainerKind};
use crate::state::StatusKind;

/// Fold full-width digits and operators to ASCII, map the multiplication
/// variants onto `×`, and collapse whitespace runs.
///
/// Whitespace between two CJK characters carries no meaning in card text
/// and is dropped; elsewhere a run becomes a single space.
#[must_use]
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .chars()
        .map(|c| match c {
            '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32).unwrap_or(c),
            '＋' => '+',
            '－' | '−' | '‐' => '-',
            '✕' | 'Ｘ' | '＊' => '×',
            '，' => '、',
            '\u{3000}' => ' ',
            other => other,
        })
        .collect();

    let mut out = String::with_capacity(folded.len());
    let mut pending_space = false;
    for c in folded.chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            let prev_ascii = out.chars().last().is_some_and(|p| p.is_ascii_alphanumeric());
            if prev_ascii && c.is_ascii_alphanumeric() {
                out.push(' ');
            }
            pending_space = false;
        }
        out.push(c);
    }
    out
}

/// Compile a built-in pattern.
///
/// Panics on an invalid pattern: the patterns are fixed strings in this
/// crate, so a failure is a programming error.
#[must_use]
pub fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(err) => panic!("invalid built-in pattern {pattern:?}: {err}"),
    }
}

/// First capture group parsed as a number.
#[must_use]
pub fn capture_u32(regex: &Regex, text: &str) -> Option<u32> {
    regex
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Whether the text contains any of the needles.
#[must_use]
pub fn has_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}

/// The first 「quoted」 proper name.
#[must_use]
pub fn quoted(text: &str) -> Option<String> {
    let start = text.find('「')? + '「'.len_utf8();
    let len = text[start..].find('」')?;
    Some(text[start..start + len].to_string())
}

/// Player scope of a clause. Self unless an opponent or both-players
/// marker appears.
#[must_use]
pub fn scope(text: &str) -> PlayerScope {
    if text.contains("おたがい") {
        PlayerScope::Both
    } else if text.contains("相手") {
        PlayerScope::Opponent
    } else {
        PlayerScope::SelfSide
    }
}

/// Scope of the object of a clause whose subject may be the opponent:
/// "相手のバトルポケモン" is the opponent, "このポケモン" is self.
#[must_use]
pub fn pokemon_scope(text: &str) -> PlayerScope {
    if text.contains("このポケモン") && !text.contains("相手のバトルポケモン") {
        PlayerScope::SelfSide
    } else {
        scope(text)
    }
}

/// Evolution stage named in the text.
#[must_use]
pub fn stage(text: &str) -> Option<Stage> {
    if text.contains("たねポケモン") {
        Some(Stage::Basic)
    } else if text.contains("1進化") {
        Some(Stage::Stage1)
    } else if text.contains("2進化") {
        Some(Stage::Stage2)
    } else {
        None
    }
}

/// Energy type named as "<type>エネルギー", as the English card name part.
#[must_use]
pub fn energy_type(text: &str) -> Option<&'static str> {
    const TYPES: [(&str, &str); 11] = [
        ("草", "Grass"),
        ("炎", "Fire"),
        ("水", "Water"),
        ("雷", "Lightning"),
        ("超", "Psychic"),
        ("闘", "Fighting"),
        ("悪", "Darkness"),
        ("鋼", "Metal"),
        ("竜", "Dragon"),
        ("妖", "Fairy"),
        ("無色", "Colorless"),
    ];
    TYPES
        .iter()
        .find(|(ja, _)| text.contains(&format!("{ja}エネルギー")))
        .map(|(_, en)| *en)
}

/// Status condition named in the text, in the order they appear.
#[must_use]
pub fn statuses(text: &str) -> Vec<StatusKind> {
    const NAMES: [(&str, StatusKind); 5] = [
        ("マヒ", StatusKind::Paralyzed),
        ("ねむり", StatusKind::Asleep),
        ("こんらん", StatusKind::Confused),
        ("やけど", StatusKind::Burned),
        ("どく", StatusKind::Poisoned),
    ];
    let mut found: Vec<(usize, StatusKind)> = NAMES
        .iter()
        .filter_map(|(name, kind)| text.find(name).map(|pos| (pos, *kind)))
        .collect();
    found.sort_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, kind)| kind).collect()
}

/// Trainer kinds named in the text.
#[must_use]
pub fn trainer_kinds(text: &str) -> Vec<TrainerKind> {
    let mut kinds = Vec::new();
    if text.contains("グッズ") {
        kinds.push(TrainerKind::Item);
    }
    if text.contains("サポート") {
        kinds.push(TrainerKind::Supporter);
    }
    if text.contains("スタジアム") {
        kinds.push(TrainerKind::Stadium);
    }
    if text.contains("どうぐ") {
        kinds.push(TrainerKind::Tool);
    }
    kinds
}

/// Kind of card and filters for a card noun phrase: "たねポケモン",
/// "基本雷エネルギー", "グッズ", ...
#[must_use]
pub fn card_noun(text: &str) -> (TargetKind, Vec<Filter>) {
    let mut filters = Vec::new();
    if let Some(stage) = stage(text) {
        filters.push(Filter::Stage(stage));
        return (TargetKind::Pokemon, filters);
    }
    if text.contains("エネルギー") {
        if let Some(kind) = energy_type(text) {
            filters.push(Filter::EnergyType(kind.to_string()));
        }
        return (TargetKind::Energy, filters);
    }
    if let Some(kind) = trainer_kinds(text).first() {
        filters.push(Filter::CardType(trainer_subtype(*kind).to_string()));
        return (TargetKind::Trainer, filters);
    }
    if text.contains("トレーナーズ") {
        return (TargetKind::Trainer, filters);
    }
    if text.contains("ポケモン") {
        return (TargetKind::Pokemon, filters);
    }
    (TargetKind::Card, filters)
}

/// Subtype string carried by trainer cards of a kind.
#[must_use]
pub const fn trainer_subtype(kind: TrainerKind) -> &'static str {
    match kind {
        TrainerKind::Item => "item",
        TrainerKind::Supporter => "supporter",
        TrainerKind::Stadium => "stadium",
        TrainerKind::Tool => "tool",
    }
}

/// Comparison implied by the words following a number.
///
/// `以上` is the default "at least" and yields `None`.
#[must_use]
pub fn comparison_suffix(rest: &str) -> Option<Comparison> {
    if rest.starts_with("以上") {
        None
    } else if rest.starts_with("以下") {
        Some(Comparison::LessThanOrEqual)
    } else if rest.starts_with("未満") {
        Some(Comparison::LessThan)
    } else if rest.starts_with("より多") {
        Some(Comparison::GreaterThan)
    } else {
        Some(Comparison::Equal)
    }
}
