//! Question, answer and outcome handlers

use super::{Fulfillment, Transition};
use crate::canvas::{CanvasState, Template, TemplateAction};
use crate::content::{pick_prompt, PromptName};
use crate::conversation::{build_outcome_basic_card, clean_rich_suggestion, Conversation};
use crate::dispatch::{PromptItem, Simple, TurnResponses};
use crate::quiz;
use crate::session;
use crate::ssml::strip_emoji;
use sdk::errors::EngineError;
use sdk::types::Prompt;
use serde_json::json;
use tracing::{debug, warn};

/// Intent slot carrying an ordinal answer ("the first one")
const ORDINAL_SLOT: &str = "count";
const ORDINAL_FIRST: &str = "first";

impl Fulfillment {
    /// Repeat the current question behind a short lead-in
    pub async fn question_repeat(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        let repeat = conv.get_random_prompt(PromptName::QuestionRepeat).await?;
        conv.setup_session_type_and_speech_biasing()?;
        let question = conv.current_question()?.prompt();
        let chips = conv.question_rich_suggestions()?;
        let ssml = conv.ssml.merge(&[&repeat.speech, &question.speech]);

        conv.immersive
            .set_template(Template::Say)
            .set_speech(&ssml);
        let mut immersive = vec![PromptItem::Simple(Simple::speech(ssml.clone()))];
        immersive.extend(conv.build_canvas());

        let mut rich = vec![
            PromptItem::Simple(Simple::from(repeat)),
            PromptItem::Simple(Simple::from(question)),
        ];
        rich.extend(chips.into_iter().map(PromptItem::Suggestion));

        conv.ask(TurnResponses {
            simple: ssml,
            rich,
            immersive,
        });
        Ok(())
    }

    /// Score an answer and move to the next question or the outcome
    ///
    /// `explicit` wins over the captured `UserAnswer` slot; the slot is
    /// cleared either way once read. An answer matching neither side of the
    /// question is treated as the first no-match.
    pub async fn answer(
        &self,
        conv: &mut Conversation,
        explicit: Option<String>,
    ) -> Result<(), EngineError> {
        let answer = match explicit {
            Some(answer) => answer,
            None => session::take_user_answer(&mut conv.params).unwrap_or_default(),
        };
        let question = conv.current_question()?.clone();
        let Some((trait_name, weight)) = quiz::match_answer(&question, &answer) else {
            warn!("Answer {:?} matched neither side of the question", answer);
            return self.answer_no_match_1(conv).await;
        };
        debug!("Answer scored {:+} for trait {}", weight, trait_name);
        *conv.data.quiz.trait_to_weight.entry(trait_name).or_insert(0) += weight;

        let followup = question.followup(weight > 0);
        let transition = if followup.is_silent() {
            None
        } else {
            let immersive = conv.new_canvas(
                CanvasState::new()
                    .with_template(Template::Say)
                    .with_action(TemplateAction::for_weight(weight))
                    .with_speech(followup.speech.clone()),
            );
            let rich = if followup.is_empty() {
                Vec::new()
            } else {
                vec![PromptItem::Simple(Simple::from(&followup))]
            };
            Some(Transition {
                simple: followup.speech,
                rich,
                immersive,
            })
        };

        conv.data.quiz.count += 1;
        if conv.data.quiz.is_complete() {
            self.outcome(conv, transition).await
        } else {
            self.question(conv, transition).await
        }
    }

    /// Answer by position: the first option is positive, the second negative
    pub async fn answer_ordinal(&self, conv: &mut Conversation) -> Result<(), EngineError> {
        // Any resolved ordinal past the first is the negative answer
        let answer = match conv.intent.resolved(ORDINAL_SLOT) {
            Some(ORDINAL_FIRST) => quiz::POSITIVE,
            Some(other) => {
                debug!("Ordinal {:?} picks the negative answer", other);
                quiz::NEGATIVE
            }
            None => return self.answer_no_match_1(conv).await,
        };
        self.answer(conv, Some(answer.to_string())).await
    }

    /// Ask the current question, led by an optional transition
    pub async fn question(
        &self,
        conv: &mut Conversation,
        transition: Option<Transition>,
    ) -> Result<(), EngineError> {
        let (count, limit) = (conv.data.quiz.count, conv.data.quiz.limit);
        let lead_in = if count == 0 {
            Prompt::empty()
        } else if count + 1 < limit {
            conv.get_random_prompt(PromptName::TransitionsRegular).await?
        } else {
            conv.get_random_prompt(PromptName::TransitionsFinal).await?
        };

        conv.setup_session_type_and_speech_biasing()?;
        let question = conv.current_question()?.clone();
        let question_prompt = question.prompt();
        let positive = question.first_positive().to_string();
        let negative = question.first_negative().to_string();
        let slide_speech = conv.ssml.merge(&[&lead_in.speech, &question_prompt.speech]);

        let slide = conv.new_canvas(
            CanvasState::new()
                .with_template(Template::Question)
                .with_action(TemplateAction::Reset)
                .with_speech(slide_speech.clone())
                .with_data(json!({
                    "body": question_prompt.text,
                    "progress": count,
                    "background": {
                        "landscape": question.background_landscape,
                        "portrait": question.background_portrait,
                    },
                }))
                .with_suggestions(vec![
                    json!({
                        "image": question.positive_answer_image,
                        "text": positive,
                        "speech": strip_emoji(&positive),
                    }),
                    json!({
                        "image": question.negative_answer_image,
                        "text": negative,
                        "speech": strip_emoji(&negative),
                    }),
                ]),
        );

        let mut speeches = vec![lead_in.speech.clone(), question_prompt.speech.clone()];
        let mut canvas_speeches = vec![slide_speech];
        let mut rich = Vec::new();
        match transition {
            Some(mut transition) => {
                transition.immersive.append_slide(slide);
                conv.immersive = transition.immersive;
                speeches.insert(0, transition.simple.clone());
                canvas_speeches.insert(0, transition.simple);
                rich = transition.rich;
            }
            None => conv.immersive = slide,
        }

        let bubble = conv.merge_prompts(&lead_in, &question_prompt);
        rich.push(PromptItem::Simple(Simple::from(bubble)));
        rich.push(PromptItem::Suggestion(clean_rich_suggestion(&positive)));
        rich.push(PromptItem::Suggestion(clean_rich_suggestion(&negative)));

        let marked = conv.ssml.merge_with_mark(&canvas_speeches);
        let mut immersive = vec![PromptItem::Simple(Simple::speech(marked))];
        immersive.extend(conv.build_canvas());

        let simple = conv.ssml.merge(&speeches);
        conv.ask(TurnResponses {
            simple,
            rich,
            immersive,
        });
        Ok(())
    }

    /// Reveal the best-fitting outcome and offer another round
    pub async fn outcome(
        &self,
        conv: &mut Conversation,
        transition: Option<Transition>,
    ) -> Result<(), EngineError> {
        let (outcomes, intro, end_of_game, yes_chip, no_chip) = tokio::try_join!(
            conv.content.get_all_outcomes(),
            conv.content.prompt_candidates(PromptName::OutcomeIntro),
            conv.content.prompt_candidates(PromptName::EndOfGame),
            conv.content.prompt_candidates(PromptName::EndOfGamePlayAgainYes),
            conv.content.prompt_candidates(PromptName::EndOfGamePlayAgainNo),
        )?;
        let intro = pick_prompt(PromptName::OutcomeIntro, intro, &mut conv.rng)?;
        let end_of_game = pick_prompt(PromptName::EndOfGame, end_of_game, &mut conv.rng)?;
        let yes_chip = pick_prompt(PromptName::EndOfGamePlayAgainYes, yes_chip, &mut conv.rng)?;
        let no_chip = pick_prompt(PromptName::EndOfGamePlayAgainNo, no_chip, &mut conv.rng)?;

        let outcome = quiz::match_outcome(&outcomes, &conv.data.quiz.trait_to_weight, &mut conv.rng)
            .cloned()
            .ok_or_else(|| EngineError::Validation("no outcomes to match".to_string()))?;
        let outcome_prompt = outcome.prompt();
        debug!("Matched outcome {:?}", outcome.title);

        let outcome_slide = conv.new_canvas(
            CanvasState::new()
                .with_template(Template::Outcome)
                .with_action(TemplateAction::Reset)
                .with_speech(conv.ssml.merge(&[&outcome_prompt.speech, &end_of_game.speech]))
                .with_data(json!({
                    "body": outcome.title,
                    "small": outcome.text,
                    "image": {
                        "landscape": outcome.image_portrait,
                        "portrait": outcome.image_landscape,
                    },
                    "background": {
                        "landscape": outcome.background_landscape,
                        "portrait": outcome.background_portrait,
                    },
                }))
                .with_suggestions(vec![json!({
                    "text": conv.data.quiz_settings.restart_button_text,
                    "speech": yes_chip.text,
                })]),
        );

        // The intro slide only plays when the intro says something
        let mut head = if intro.is_silent() {
            outcome_slide
        } else {
            let mut intro_slide = conv.new_canvas(
                CanvasState::new()
                    .with_template(Template::Say)
                    .with_speech(intro.speech.clone()),
            );
            intro_slide.append_slide(outcome_slide);
            intro_slide
        };
        head.add("data", json!({ "progress": conv.data.quiz.limit }));

        let card = build_outcome_basic_card(&outcome);
        let outcome_text = match card {
            Some(_) => String::new(),
            None => outcome.title.clone().unwrap_or_default(),
        };
        let mut combined = Prompt {
            text: format!("{}  \n\n{}", intro.text, outcome_text).trim().to_string(),
            speech: conv.ssml.merge(&[&intro.speech, &outcome_prompt.speech]),
        };
        let mut speeches = vec![
            intro.speech.clone(),
            outcome_prompt.speech.clone(),
            end_of_game.speech.clone(),
        ];
        let mut canvas_speeches = vec![
            intro.speech.clone(),
            conv.ssml.merge(&[&outcome_prompt.speech, &end_of_game.speech]),
        ];

        match transition {
            Some(mut transition) => {
                transition.immersive.append_slide(head);
                conv.immersive = transition.immersive;
                speeches.insert(0, transition.simple.clone());
                canvas_speeches.insert(0, transition.simple);
                if let Some(PromptItem::Simple(lead)) = transition.rich.first() {
                    let lead = Prompt {
                        text: lead.text.clone().unwrap_or_default(),
                        speech: lead.speech.clone(),
                    };
                    combined = conv.merge_prompts(&lead, &combined);
                }
            }
            None => conv.immersive = head,
        }

        let mut rich = vec![PromptItem::Simple(Simple::from(combined))];
        rich.extend(card.map(PromptItem::Card));
        rich.push(PromptItem::Simple(Simple::from(&end_of_game)));
        rich.push(PromptItem::Suggestion(clean_rich_suggestion(&yes_chip.text)));
        rich.push(PromptItem::Suggestion(clean_rich_suggestion(&no_chip.text)));

        let marked = conv.ssml.merge_with_mark(&canvas_speeches);
        let mut immersive = vec![PromptItem::Simple(Simple::speech(marked))];
        immersive.extend(conv.build_canvas());

        let simple = conv.ssml.merge(&speeches);
        conv.ask(TurnResponses {
            simple,
            rich,
            immersive,
        });
        Ok(())
    }
}
