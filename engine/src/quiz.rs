//! Quiz scoring and selection
//!
//! Pure algorithms over quiz content: building the question order for a new
//! session, matching a raw answer to a trait weight, and picking the outcome
//! that best fits the accumulated weights. Nothing here does I/O; every
//! random choice goes through the caller's `Rng` so tests can seed it.

use crate::ssml::strip_emoji;
use rand::seq::SliceRandom;
use rand::Rng;
use sdk::types::{Outcome, Question};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Hard cap on questions asked in one quiz
pub const MAX_QUESTIONS_PER_QUIZ: usize = 10;

/// Canonical answer sentinel that always scores +1
pub const POSITIVE: &str = "positive";

/// Canonical answer sentinel that always scores -1
pub const NEGATIVE: &str = "negative";

/// Progress through one quiz
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuizState {
    /// Questions answered so far
    pub count: usize,
    /// Questions this quiz will ask
    pub limit: usize,
    /// Ordered questions for this quiz, `limit` long
    pub questions: Vec<Question>,
    /// Running weight per trait, keyed by every trait in the loaded pool
    pub trait_to_weight: BTreeMap<String, i64>,
}

impl Default for QuizState {
    fn default() -> Self {
        Self {
            count: 0,
            limit: MAX_QUESTIONS_PER_QUIZ,
            questions: Vec::new(),
            trait_to_weight: BTreeMap::new(),
        }
    }
}

impl QuizState {
    /// The question to ask next, if the quiz has not run out
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.count)
    }

    pub fn is_complete(&self) -> bool {
        self.count >= self.limit
    }
}

/// Build a fresh quiz from the full question pool
///
/// Traits are lowercased in place. `limit` is the smallest of the requested
/// count, the pool size and `MAX_QUESTIONS_PER_QUIZ`, and the questions are
/// the first `limit` of a trait-balanced shuffle. Weights start at zero for
/// every trait in the pool, including traits that did not make the cut.
pub fn init_session_state<R: Rng + ?Sized>(
    mut questions: Vec<Question>,
    questions_per_quiz: usize,
    rng: &mut R,
) -> QuizState {
    for question in questions.iter_mut() {
        question.trait_name = question.trait_name.to_lowercase();
    }
    let limit = questions_per_quiz
        .min(questions.len())
        .min(MAX_QUESTIONS_PER_QUIZ);

    let trait_to_weight = unique_traits(&questions)
        .into_iter()
        .map(|t| (t, 0))
        .collect();

    let mut ordered = shuffle_by_traits(&questions, rng);
    ordered.truncate(limit);

    QuizState {
        count: 0,
        limit,
        questions: ordered,
        trait_to_weight,
    }
}

/// Distinct lowercased traits, in first-seen order
pub fn unique_traits(questions: &[Question]) -> Vec<String> {
    let mut seen = Vec::new();
    for question in questions {
        let t = question.trait_name.to_lowercase();
        if !seen.contains(&t) {
            seen.push(t);
        }
    }
    seen
}

/// Shuffle questions in rounds of distinct traits
///
/// Each round takes one random question from every trait that still has
/// questions left, in a random trait order. A pool of 3xA, 3xB, 2xC, 1xD
/// comes out as a shuffled {A,B,C,D}, then {A,B,C}, then {A,B}. The input
/// slice is not modified.
pub fn shuffle_by_traits<R: Rng + ?Sized>(questions: &[Question], rng: &mut R) -> Vec<Question> {
    let mut buckets: Vec<(String, Vec<&Question>)> = Vec::new();
    for question in questions {
        let t = question.trait_name.to_lowercase();
        match buckets.iter_mut().find(|(name, _)| *name == t) {
            Some((_, bucket)) => bucket.push(question),
            None => buckets.push((t, vec![question])),
        }
    }

    let mut shuffled = Vec::with_capacity(questions.len());
    while !buckets.is_empty() {
        buckets.shuffle(rng);
        for (_, bucket) in buckets.iter_mut() {
            let pick = rng.gen_range(0..bucket.len());
            shuffled.push(bucket.swap_remove(pick).clone());
        }
        buckets.retain(|(_, bucket)| !bucket.is_empty());
    }
    shuffled
}

fn normalize_answer(answer: &str) -> String {
    let squashed: String = answer
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    strip_emoji(&squashed)
}

/// Match a raw answer against a question's synonyms
///
/// Comparison ignores case, whitespace and emoji. The sentinels `positive`
/// and `negative` always match. Returns the question's lowercased trait and
/// `+1` or `-1`, or `None` when the answer matches neither side.
pub fn match_answer(question: &Question, answer: &str) -> Option<(String, i64)> {
    let answer = normalize_answer(answer);
    let trait_name = question.trait_name.to_lowercase();

    let hit = |synonyms: &[String]| synonyms.iter().any(|s| normalize_answer(s) == answer);

    if answer == POSITIVE || hit(&question.positive_answers) {
        return Some((trait_name, 1));
    }
    if answer == NEGATIVE || hit(&question.negative_answers) {
        return Some((trait_name, -1));
    }
    None
}

fn parse_traits(tags: Option<&str>) -> Vec<String> {
    tags.map(|t| t.split('&').map(|s| s.trim().to_lowercase()).collect())
        .unwrap_or_default()
}

/// Score of one outcome against the accumulated trait weights
///
/// Each trait adds its weight when it is a positive tag of the outcome and
/// subtracts it when it is a negative tag.
pub fn score_outcome(outcome: &Outcome, trait_to_weight: &BTreeMap<String, i64>) -> i64 {
    let positive = parse_traits(outcome.positive_traits.as_deref());
    let negative = parse_traits(outcome.negative_traits.as_deref());

    trait_to_weight
        .iter()
        .map(|(t, weight)| {
            let t = t.to_lowercase();
            let mut score = 0;
            if positive.contains(&t) {
                score += weight;
            }
            if negative.contains(&t) {
                score -= weight;
            }
            score
        })
        .sum()
}

/// Pick the outcome with the highest score
///
/// Ties on the exact maximum are broken uniformly at random. Returns `None`
/// only for an empty outcome list.
pub fn match_outcome<'a, R: Rng + ?Sized>(
    outcomes: &'a [Outcome],
    trait_to_weight: &BTreeMap<String, i64>,
    rng: &mut R,
) -> Option<&'a Outcome> {
    let scored: Vec<(i64, &Outcome)> = outcomes
        .iter()
        .map(|o| (score_outcome(o, trait_to_weight), o))
        .collect();
    let max = scored.iter().map(|(score, _)| *score).max()?;
    let best: Vec<&Outcome> = scored
        .into_iter()
        .filter(|(score, _)| *score == max)
        .map(|(_, o)| o)
        .collect();
    best.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn question(t: &str, id: usize) -> Question {
        Question::new(
            t,
            format!("{}-{}", t, id),
            vec![format!("p{}", id)],
            vec![format!("n{}", id)],
        )
    }

    /// 3xA, 3xB, 2xC, 1xD
    fn pool() -> Vec<Question> {
        vec![
            question("A", 1),
            question("A", 2),
            question("A", 3),
            question("B", 4),
            question("B", 5),
            question("B", 6),
            question("C", 7),
            question("C", 8),
            question("D", 9),
        ]
    }

    fn outcome(positive: &str, negative: Option<&str>) -> Outcome {
        Outcome {
            text: positive.to_string(),
            positive_traits: Some(positive.to_string()),
            negative_traits: negative.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_shuffle_rounds_cover_distinct_traits() {
        let mut rng = StdRng::seed_from_u64(7);
        let shuffled = shuffle_by_traits(&pool(), &mut rng);
        let traits: Vec<&str> = shuffled.iter().map(|q| q.trait_name.as_str()).collect();

        fn round<'a>(r: &[&'a str]) -> HashSet<&'a str> {
            r.iter().copied().collect()
        }
        assert_eq!(round(&traits[0..4]), HashSet::from(["A", "B", "C", "D"]));
        assert_eq!(round(&traits[4..7]), HashSet::from(["A", "B", "C"]));
        assert_eq!(round(&traits[7..9]), HashSet::from(["A", "B"]));
    }

    #[test]
    fn test_init_session_state_limits_and_weights() {
        let mut rng = StdRng::seed_from_u64(1);
        let state = init_session_state(pool(), 9, &mut rng);
        assert_eq!(state.count, 0);
        assert_eq!(state.limit, 9);
        assert_eq!(state.questions.len(), 9);
        assert_eq!(
            state.trait_to_weight.keys().cloned().collect::<Vec<_>>(),
            vec!["a", "b", "c", "d"]
        );
        assert!(state.trait_to_weight.values().all(|w| *w == 0));
        assert!(state.questions.iter().all(|q| q.trait_name == q.trait_name.to_lowercase()));
    }

    #[test]
    fn test_init_session_state_caps_limit() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut big = Vec::new();
        for i in 0..15 {
            big.push(question("x", i));
        }
        let state = init_session_state(big, 50, &mut rng);
        assert_eq!(state.limit, MAX_QUESTIONS_PER_QUIZ);

        let state = init_session_state(pool(), 3, &mut rng);
        assert_eq!(state.limit, 3);
        // Weights still cover the whole pool, not just the chosen three
        assert_eq!(state.trait_to_weight.len(), 4);
    }

    #[test]
    fn test_init_session_state_empty_pool() {
        let mut rng = StdRng::seed_from_u64(1);
        let state = init_session_state(Vec::new(), 3, &mut rng);
        assert_eq!(state.limit, 0);
        assert!(state.questions.is_empty());
        assert!(state.is_complete());
    }

    #[test]
    fn test_match_answer() {
        let q = pool().remove(0);
        assert_eq!(match_answer(&q, "p1"), Some(("a".to_string(), 1)));
        assert_eq!(match_answer(&q, " P 1 "), Some(("a".to_string(), 1)));
        assert_eq!(match_answer(&q, "n1"), Some(("a".to_string(), -1)));
        assert_eq!(match_answer(&q, "positive"), Some(("a".to_string(), 1)));
        assert_eq!(match_answer(&q, "NEGATIVE"), Some(("a".to_string(), -1)));
        assert_eq!(match_answer(&q, "maybe"), None);
        assert_eq!(match_answer(&q, ""), None);
    }

    #[test]
    fn test_match_answer_ignores_emoji() {
        let q = Question::new("Dog", "Dogs?", vec!["Yes 🐶".into()], vec!["Nope 🙅".into()]);
        assert_eq!(match_answer(&q, "yes"), Some(("dog".to_string(), 1)));
        assert_eq!(match_answer(&q, "🙅 nope"), Some(("dog".to_string(), -1)));
    }

    #[test]
    fn test_score_outcome_combination() {
        let weights: BTreeMap<String, i64> =
            [("a".into(), 2), ("b".into(), -1), ("c".into(), 1), ("d".into(), 0)].into();
        let o = outcome("A & C", Some("B&D"));
        assert_eq!(score_outcome(&o, &weights), 4);
    }

    #[test]
    fn test_opposed_traits_outcome_always_wins() {
        let weights: BTreeMap<String, i64> =
            [("a".into(), 1), ("b".into(), -1), ("c".into(), 1), ("d".into(), -1)].into();
        let outcomes = vec![
            outcome("B", Some("A")),
            outcome("A&C", Some("B&D")),
            outcome("C", None),
        ];
        assert_eq!(score_outcome(&outcomes[1], &weights), 4);

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let best = match_outcome(&outcomes, &weights, &mut rng).unwrap();
            assert_eq!(best.text, "A&C");
        }
    }

    #[test]
    fn test_match_outcome_picks_max() {
        let weights: BTreeMap<String, i64> =
            [("a".into(), 2), ("b".into(), -1), ("c".into(), 1), ("d".into(), 0)].into();
        let outcomes = vec![outcome("a&c", Some("b&d")), outcome("b", None), outcome("d", None)];
        let mut rng = StdRng::seed_from_u64(3);
        let best = match_outcome(&outcomes, &weights, &mut rng).unwrap();
        assert_eq!(best.text, "a&c");
    }

    #[test]
    fn test_match_outcome_ties_are_random() {
        let weights: BTreeMap<String, i64> = [("a".into(), 1), ("b".into(), 1)].into();
        let outcomes = vec![outcome("a", None), outcome("b", None), outcome("c", None)];
        let mut seen = HashSet::new();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            seen.insert(match_outcome(&outcomes, &weights, &mut rng).unwrap().text.clone());
        }
        assert_eq!(seen, HashSet::from(["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_match_outcome_empty() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(match_outcome(&[], &BTreeMap::new(), &mut rng).is_none());
    }
}
