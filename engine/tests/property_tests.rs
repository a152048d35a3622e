use proptest::prelude::*;
use persona_engine::quiz::{
    init_session_state, match_answer, match_outcome, score_outcome, shuffle_by_traits,
    MAX_QUESTIONS_PER_QUIZ, NEGATIVE, POSITIVE,
};
use persona_engine::ssml::Ssml;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sdk::types::{Outcome, Question};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Pool of questions over up to five traits, mixed case
fn pool() -> impl Strategy<Value = Vec<Question>> {
    prop::collection::vec((0..5usize, any::<bool>()), 1..24).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (t, upper))| {
                let name = if upper {
                    format!("Trait{}", t)
                } else {
                    format!("trait{}", t)
                };
                Question::new(
                    name,
                    format!("q{}", i),
                    vec![format!("yes{}", i)],
                    vec![format!("no{}", i)],
                )
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn test_shuffle_is_a_permutation(questions in pool(), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let shuffled = shuffle_by_traits(&questions, &mut rng);

        let before: BTreeSet<_> = questions.iter().map(|q| q.question_text.clone()).collect();
        let after: BTreeSet<_> = shuffled.iter().map(|q| q.question_text.clone()).collect();
        prop_assert_eq!(shuffled.len(), questions.len());
        prop_assert_eq!(before, after);
    }

    #[test]
    fn test_shuffle_plays_traits_in_rounds(questions in pool(), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let shuffled = shuffle_by_traits(&questions, &mut rng);

        // The n-th question of any trait comes before the (n+1)-th of any trait
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut round = 0;
        for question in &shuffled {
            let n = seen.entry(question.trait_name.to_lowercase()).or_insert(0);
            *n += 1;
            prop_assert!(*n >= round, "trait repeated before the round finished");
            round = *n;
        }

        let traits: BTreeSet<_> = questions.iter().map(|q| q.trait_name.to_lowercase()).collect();
        let first_round: BTreeSet<_> = shuffled
            .iter()
            .take(traits.len())
            .map(|q| q.trait_name.to_lowercase())
            .collect();
        prop_assert_eq!(first_round, traits);
    }

    #[test]
    fn test_session_state_respects_limits(
        questions in pool(),
        per_quiz in 0..20usize,
        seed in any::<u64>(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let state = init_session_state(questions.clone(), per_quiz, &mut rng);

        let expected = per_quiz.min(questions.len()).min(MAX_QUESTIONS_PER_QUIZ);
        prop_assert_eq!(state.limit, expected);
        prop_assert_eq!(state.questions.len(), expected);
        prop_assert_eq!(state.count, 0);

        let traits: BTreeSet<_> = questions.iter().map(|q| q.trait_name.to_lowercase()).collect();
        let keys: BTreeSet<_> = state.trait_to_weight.keys().cloned().collect();
        prop_assert_eq!(keys, traits);
        prop_assert!(state.trait_to_weight.values().all(|w| *w == 0));
        prop_assert!(state.questions.iter().all(|q| q.trait_name == q.trait_name.to_lowercase()));
    }

    #[test]
    fn test_answers_match_ignoring_case_and_spacing(
        word in "[a-z]{1,8}",
        upper in any::<bool>(),
        padding in " {0,3}",
    ) {
        let question = Question::new(
            "Bold",
            "Q?",
            vec![format!("yes{}", word)],
            vec![format!("no{}", word)],
        );

        let spoken = if upper {
            format!("{}YES {}{}", padding, word.to_uppercase(), padding)
        } else {
            format!("{}yes{}", padding, word)
        };
        prop_assert_eq!(match_answer(&question, &spoken), Some(("bold".to_string(), 1)));
        prop_assert_eq!(
            match_answer(&question, &format!("no {}", word)),
            Some(("bold".to_string(), -1))
        );
        prop_assert_eq!(match_answer(&question, POSITIVE).map(|m| m.1), Some(1));
        prop_assert_eq!(match_answer(&question, NEGATIVE).map(|m| m.1), Some(-1));
        prop_assert_eq!(match_answer(&question, &format!("maybe{}", word)), None);
    }

    #[test]
    fn test_matched_outcome_has_the_top_score(
        weights in prop::collection::vec(-3..=3i64, 3),
        tags in prop::collection::vec((0..3usize, 0..3usize), 1..6),
        seed in any::<u64>(),
    ) {
        let names = ["a", "b", "c"];
        let trait_to_weight: BTreeMap<String, i64> = names
            .iter()
            .zip(&weights)
            .map(|(n, w)| (n.to_string(), *w))
            .collect();
        let outcomes: Vec<Outcome> = tags
            .iter()
            .enumerate()
            .map(|(i, (pos, neg))| Outcome {
                text: format!("outcome {}", i),
                positive_traits: Some(names[*pos].to_uppercase()),
                negative_traits: Some(names[*neg].to_string()),
                ..Default::default()
            })
            .collect();

        let mut rng = StdRng::seed_from_u64(seed);
        let best = match_outcome(&outcomes, &trait_to_weight, &mut rng).unwrap();
        let top = outcomes
            .iter()
            .map(|o| score_outcome(o, &trait_to_weight))
            .max()
            .unwrap();
        prop_assert_eq!(score_outcome(best, &trait_to_weight), top);
    }

    #[test]
    fn test_marks_separate_every_spoken_fragment(
        parts in prop::collection::vec("[a-z ]{0,6}", 0..6),
    ) {
        let documents: Vec<String> = parts.iter().map(|p| format!("<speak>{}</speak>", p)).collect();
        let marked = Ssml::default().merge_with_mark(&documents);

        let spoken = parts.iter().filter(|p| !p.trim().is_empty()).count();
        prop_assert_eq!(marked.matches("<mark name=\"FLIP\"/>").count(), spoken.saturating_sub(1));
        prop_assert!(marked.starts_with("<speak><mark name=\"START\"/>"));
        prop_assert!(marked.ends_with("<mark name=\"END\"/></speak>"));
    }
}
