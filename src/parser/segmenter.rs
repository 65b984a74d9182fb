//! Sentence segmentation.
//!
//! Splits card text into ordered clauses. Sentences end at `。`, `!` or
//! `?`; non-conditional sentences are further split on sequential
//! connectives ("…して、", "…してから、", "その後、"). Bracketed
//! annotations (`［…］`) are pulled out first and become `Modifier`
//! segments pointing at the clause produced just before them.
//!
//! Segmentation is total and order-preserving: it never fails, and a text
//! with no delimiters yields exactly one independent segment.

use serde::{Deserialize, Serialize};

/// How a clause relates to the clauses around it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Relationship {
    Independent,
    /// Follows the previous clause of the same sentence.
    Sequential,
    /// Carries a condition marker.
    Conditional,
    /// A bracketed annotation modifying an earlier clause.
    Modifier,
}

/// Kind of conditional connective.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionType {
    If,
    When,
    Else,
}

/// One clause of card text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub text: String,
    pub relationship: Relationship,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_type: Option<ConditionType>,
    /// For modifiers: index of the segment the annotation applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_index: Option<usize>,
}

impl Segment {
    fn new(text: impl Into<String>, relationship: Relationship) -> Self {
        Self {
            text: text.into(),
            relationship,
            condition_type: None,
            parent_index: None,
        }
    }
}

/// Splits card text into clauses.
///
/// Owned by the parser and immutable once built.
#[derive(Clone, Debug)]
pub struct Segmenter {
    sentence_ends: Vec<char>,
    /// Connectives that end a clause, with the verb ending that replaces
    /// them ("して、" becomes "する").
    clause_endings: Vec<(&'static str, &'static str)>,
    /// Connectives that start a clause.
    clause_openers: Vec<&'static str>,
    else_markers: Vec<&'static str>,
    when_markers: Vec<&'static str>,
    if_markers: Vec<&'static str>,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Segmenter {
    /// A segmenter with the standard connective sets.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sentence_ends: vec!['。', '!', '?', '！', '？'],
            clause_endings: vec![("してから、", "する"), ("して、", "する")],
            clause_openers: vec!["その後、", "それから、", "そして、"],
            else_markers: vec!["そうでないなら", "そうでない場合", "ウラなら", "それ以外の場合", "それ以外"],
            when_markers: vec!["とき、", "たび、", "時、"],
            if_markers: vec!["なら", "場合"],
        }
    }

    /// Conditional connective in a sentence, if any.
    #[must_use]
    pub fn condition_type(&self, sentence: &str) -> Option<ConditionType> {
        let contains = |markers: &[&str]| markers.iter().any(|m| sentence.contains(m));
        if contains(&self.else_markers) {
            Some(ConditionType::Else)
        } else if contains(&self.when_markers) {
            Some(ConditionType::When)
        } else if contains(&self.if_markers) {
            Some(ConditionType::If)
        } else {
            None
        }
    }

    /// The body of an otherwise-branch sentence ("ウラなら、…"): the text
    /// after its else connective.
    #[must_use]
    pub fn else_body<'a>(&self, sentence: &'a str) -> Option<&'a str> {
        let (at, marker) = self
            .else_markers
            .iter()
            .filter_map(|marker| sentence.find(marker).map(|at| (at, *marker)))
            .min_by(|a, b| a.0.cmp(&b.0).then(b.1.len().cmp(&a.1.len())))?;

        let rest = &sentence[at + marker.len()..];
        let body = rest.strip_prefix('は').unwrap_or(rest).trim_start_matches('、').trim();
        (!body.is_empty()).then_some(body)
    }

    /// Split one sentence on its sequential connectives.
    ///
    /// Unlike `segment`, this also splits conditional sentences, so it is
    /// meant for the body of a condition once the condition half is gone.
    #[must_use]
    pub fn clauses(&self, sentence: &str) -> Vec<String> {
        self.split_clauses(sentence)
    }

    /// Split text into clauses.
    #[must_use]
    pub fn segment(&self, text: &str) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut rest = text;

        while !rest.is_empty() {
            let Some((open, open_len)) = find_open(rest) else {
                self.push_plain(rest, &mut segments);
                break;
            };
            self.push_plain(&rest[..open], &mut segments);

            let body_start = open + open_len;
            let (body, next) = match find_close(&rest[body_start..]) {
                Some((close, close_len)) => (
                    &rest[body_start..body_start + close],
                    &rest[body_start + close + close_len..],
                ),
                // Unclosed bracket: the rest of the text is the annotation.
                None => (&rest[body_start..], ""),
            };

            let body = body.trim().trim_end_matches(&self.sentence_ends[..]).trim();
            if !body.is_empty() {
                let mut modifier = Segment::new(body, Relationship::Modifier);
                modifier.parent_index = segments.len().checked_sub(1);
                segments.push(modifier);
            }
            rest = next;
        }
        segments
    }

    fn push_plain(&self, text: &str, segments: &mut Vec<Segment>) {
        for sentence in text.split(&self.sentence_ends[..]) {
            let sentence = sentence.trim();
            if sentence.is_empty() {
                continue;
            }

            if let Some(condition_type) = self.condition_type(sentence) {
                let mut segment = Segment::new(sentence, Relationship::Conditional);
                segment.condition_type = Some(condition_type);
                segments.push(segment);
                continue;
            }

            for (i, clause) in self.split_clauses(sentence).into_iter().enumerate() {
                let relationship = if i == 0 {
                    Relationship::Independent
                } else {
                    Relationship::Sequential
                };
                segments.push(Segment::new(clause, relationship));
            }
        }
    }

    fn split_clauses(&self, sentence: &str) -> Vec<String> {
        let mut clauses = Vec::new();
        let mut rest = sentence;

        loop {
            let ending = self
                .clause_endings
                .iter()
                .filter_map(|(marker, verb)| rest.find(marker).map(|at| (at, marker.len(), Some(*verb))));
            let opener = self
                .clause_openers
                .iter()
                .filter_map(|marker| rest.find(marker).map(|at| (at, marker.len(), None)));

            // Earliest connective; at equal positions the longer one wins.
            let next = ending
                .chain(opener)
                .min_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

            let Some((at, len, verb)) = next else {
                push_clause(&mut clauses, rest.to_string());
                break;
            };

            let mut head = rest[..at].to_string();
            if let Some(verb) = verb {
                head.push_str(verb);
            }
            push_clause(&mut clauses, head);
            rest = &rest[at + len..];
        }

        clauses
    }
}

fn push_clause(clauses: &mut Vec<String>, clause: String) {
    let clause = clause.trim().trim_end_matches('、').trim();
    if !clause.is_empty() {
        clauses.push(clause.to_string());
    }
}

fn find_open(text: &str) -> Option<(usize, usize)> {
    text.char_indices()
        .find(|(_, c)| matches!(c, '［' | '['))
        .map(|(i, c)| (i, c.len_utf8()))
}

fn find_close(text: &str) -> Option<(usize, usize)> {
    text.char_indices()
        .find(|(_, c)| matches!(c, '］' | ']'))
        .map(|(i, c)| (i, c.len_utf8()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(segments: &[Segment]) -> Vec<&str> {
        segments.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_single_clause() {
        let segments = Segmenter::new().segment("山札を2枚引く");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].relationship, Relationship::Independent);
        assert_eq!(segments[0].text, "山札を2枚引く");
    }

    #[test]
    fn test_empty_text() {
        assert!(Segmenter::new().segment("").is_empty());
        assert!(Segmenter::new().segment("。").is_empty());
    }

    #[test]
    fn test_punctuation_only_text() {
        let segmenter = Segmenter::new();
        assert!(segmenter.segment("、。").is_empty());
        assert!(segmenter.segment("［］").is_empty());
        assert!(segmenter.segment(" 。 ！").is_empty());
    }

    #[test]
    fn test_sentences_and_connectives() {
        let segments = Segmenter::new()
            .segment("手札をすべて山札にもどして切る。その後、山札を6枚引く。");
        assert_eq!(texts(&segments), vec!["手札をすべて山札にもどして切る", "山札を6枚引く"]);
        assert_eq!(segments[1].relationship, Relationship::Independent);

        let segments = Segmenter::new().segment("このポケモンをベンチポケモンと入れ替えて、その後、山札を1枚引く");
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].relationship, Relationship::Sequential);
    }

    #[test]
    fn test_shite_becomes_suru() {
        let segments = Segmenter::new().segment("相手のバトルポケモンをマヒにして、山札を1枚引く");
        assert_eq!(texts(&segments), vec!["相手のバトルポケモンをマヒにする", "山札を1枚引く"]);
        assert_eq!(segments[1].relationship, Relationship::Sequential);
    }

    #[test]
    fn test_conditional_not_split() {
        let segments = Segmenter::new()
            .segment("コインを1回投げオモテなら、相手のバトルポケモンをマヒにして、山札を1枚引く。");
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].relationship, Relationship::Conditional);
        assert_eq!(segments[0].condition_type, Some(ConditionType::If));
    }

    #[test]
    fn test_condition_types() {
        let segmenter = Segmenter::new();
        assert_eq!(segmenter.condition_type("ウラなら、このワザは失敗"), Some(ConditionType::Else));
        assert_eq!(
            segmenter.condition_type("このポケモンがきぜつしたとき、相手のポケモンにダメカンを3個のせる"),
            Some(ConditionType::When)
        );
        assert_eq!(segmenter.condition_type("山札を1枚引く"), None);
    }

    #[test]
    fn test_else_body() {
        let segmenter = Segmenter::new();
        assert_eq!(
            segmenter.else_body("ウラなら、相手のバトルポケモンをやけどにする"),
            Some("相手のバトルポケモンをやけどにする")
        );
        assert_eq!(segmenter.else_body("それ以外の場合は、山札を1枚引く"), Some("山札を1枚引く"));
        assert_eq!(segmenter.else_body("ウラなら"), None);
        assert_eq!(segmenter.else_body("山札を1枚引く"), None);
    }

    #[test]
    fn test_clauses_split_condition_body() {
        let clauses = Segmenter::new().clauses("相手のバトルポケモンをマヒにして、山札を1枚引く");
        assert_eq!(clauses, vec!["相手のバトルポケモンをマヒにする", "山札を1枚引く"]);
    }

    #[test]
    fn test_annotation_becomes_modifier() {
        let segments = Segmenter::new()
            .segment("相手のベンチポケモン1匹にも、30ダメージ。［ベンチは弱点・抵抗力を計算しない。］");
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].relationship, Relationship::Modifier);
        assert_eq!(segments[1].text, "ベンチは弱点・抵抗力を計算しない");
        assert_eq!(segments[1].parent_index, Some(0));
    }

    #[test]
    fn test_leading_annotation_has_no_parent() {
        let segments = Segmenter::new().segment("［注記］山札を1枚引く");
        assert_eq!(segments[0].relationship, Relationship::Modifier);
        assert_eq!(segments[0].parent_index, None);
        assert_eq!(segments[1].text, "山札を1枚引く");
    }
}
