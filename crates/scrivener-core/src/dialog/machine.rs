//! The dialog state machine.
//!
//! `StateMachine::apply` is the only code path that mutates a session. It
//! takes the session by value (the coordinator removes it from the store
//! first) and hands back an [`Applied`] describing what to do with it:
//! put it back, submit it, or -- for rejected actions -- put it back
//! provably untouched.
//!
//! Guarding rules:
//! - Discrete choices carry the state their keyboard was generated for;
//!   a mismatch is a stale action and never mutates.
//! - Free text is only meaningful in the text-expecting states (plus the
//!   implicit topic input that creates a session); elsewhere it yields
//!   guidance for the current state.
//! - Unknown choice ids re-prompt the current state without mutation.

use std::str::FromStr;
use std::sync::Arc;

use scrivener_types::action::{ClientAction, Reply};
use scrivener_types::catalog::{
    ColorScheme, Depth, FontFamily, FontSize, HeaderStyle, Language, LineHeight, OutputFormat,
    PageMargin, StyleMode, TemplateId,
};
use scrivener_types::error::DialogError;
use scrivener_types::job::StatusHandle;
use scrivener_types::session::{ClientId, DialogState, Session};

use crate::collaborator::QuestionGenerator;
use crate::dialog::prompts;

/// Upper bound on clarification questions kept from the generator.
const MAX_QUESTIONS: usize = 5;

/// Result of applying one action to one (possibly absent) session.
#[derive(Debug)]
pub enum Applied {
    /// The session advanced; store it and send the reply.
    Continue { session: Session, reply: Reply },

    /// The action was understood but changes nothing (free text where a
    /// button is expected, a choice for a state that has none). Store the
    /// session unchanged and send the guidance.
    Ignored { session: Session, reply: Reply },

    /// The dialog is complete; the coordinator snapshots the session into
    /// a job and attempts admission.
    ReadyToSubmit {
        session: Session,
        status_handle: Option<StatusHandle>,
    },

    /// The action was refused. The session (when one exists) is returned
    /// exactly as it came in.
    Rejected {
        session: Option<Session>,
        error: DialogError,
        reply: Reply,
    },
}

/// Validates and applies dialog transitions.
pub struct StateMachine<Q> {
    questions: Arc<Q>,
}

impl<Q: QuestionGenerator> StateMachine<Q> {
    pub fn new(questions: Arc<Q>) -> Self {
        Self { questions }
    }

    /// Apply one client action. The only suspension point is the
    /// clarification-question call on the language transition; everything
    /// else is pure bookkeeping.
    pub async fn apply(&self, session: Option<Session>, action: ClientAction) -> Applied {
        match action {
            ClientAction::FreeText { client_id, text } => {
                self.apply_text(session, client_id, text)
            }
            ClientAction::Choice {
                choice_id,
                expected_state,
                status_handle,
                ..
            } => {
                self.apply_choice(session, choice_id, expected_state, status_handle)
                    .await
            }
        }
    }

    fn apply_text(&self, session: Option<Session>, client_id: ClientId, text: String) -> Applied {
        let text = text.trim().to_string();

        let Some(mut session) = session else {
            // First qualifying input creates the session with the text as
            // its topic.
            if text.is_empty() {
                return Applied::Rejected {
                    session: None,
                    error: DialogError::SessionExpired,
                    reply: prompts::topic_prompt(),
                };
            }
            let session = Session::new(client_id, text);
            let reply = prompts::language_prompt(&session.topic);
            return Applied::Continue { session, reply };
        };

        match session.state {
            DialogState::Answering => {
                if text.is_empty() {
                    let reply = prompts::prompt_for(&session);
                    return Applied::Ignored { session, reply };
                }
                session.answers.push(text);
                let next = session
                    .next_question()
                    .map(|(index, question)| (index, question.to_string()));
                let reply = match next {
                    Some((index, question)) => {
                        prompts::question_prompt(index, session.questions.len(), &question)
                    }
                    None => {
                        session.state = DialogState::ChoosingTitle;
                        prompts::title_prompt()
                    }
                };
                Applied::Continue { session, reply }
            }

            DialogState::ChoosingTitle => {
                if text.is_empty() {
                    let reply = prompts::prompt_for(&session);
                    return Applied::Ignored { session, reply };
                }
                session.title = Some(text);
                session.state = DialogState::ChoosingDepth;
                Applied::Continue {
                    session,
                    reply: prompts::depth_prompt(),
                }
            }

            DialogState::EnteringComparison => {
                if text.is_empty() {
                    let reply = prompts::prompt_for(&session);
                    return Applied::Ignored { session, reply };
                }
                session.choices.comparison = Some(text);
                Applied::ReadyToSubmit {
                    session,
                    status_handle: None,
                }
            }

            // Every other state expects a button press; guide, don't touch.
            _ => {
                let reply = prompts::prompt_for(&session);
                Applied::Ignored { session, reply }
            }
        }
    }

    async fn apply_choice(
        &self,
        session: Option<Session>,
        choice_id: String,
        expected_state: DialogState,
        status_handle: Option<StatusHandle>,
    ) -> Applied {
        let Some(mut session) = session else {
            return Applied::Rejected {
                session: None,
                error: DialogError::SessionExpired,
                reply: prompts::start_over_reply(),
            };
        };

        if session.state != expected_state {
            let error = DialogError::StaleAction {
                expected: expected_state,
                actual: session.state,
            };
            let reply = prompts::stale_reply(&session);
            return Applied::Rejected {
                session: Some(session),
                error,
                reply,
            };
        }

        match session.state {
            DialogState::ChoosingLanguage => {
                let language = match parse::<Language>(&choice_id) {
                    Ok(v) => v,
                    Err(error) => return reject_unknown(session, error),
                };
                session.choices.language = Some(language);
                session.state = DialogState::GeneratingQuestions;
                let reply = self.generate_questions(&mut session, language).await;
                Applied::Continue { session, reply }
            }

            DialogState::ChoosingDepth => {
                let depth = match parse::<Depth>(&choice_id) {
                    Ok(v) => v,
                    Err(error) => return reject_unknown(session, error),
                };
                session.choices.depth = Some(depth);
                session.state = DialogState::ChoosingStyleMode;
                Applied::Continue {
                    session,
                    reply: prompts::style_mode_prompt(),
                }
            }

            DialogState::ChoosingStyleMode => {
                let mode = match parse::<StyleMode>(&choice_id) {
                    Ok(v) => v,
                    Err(error) => return reject_unknown(session, error),
                };
                session.choices.style_mode = Some(mode);
                let reply = match mode {
                    StyleMode::Template => {
                        session.state = DialogState::ChoosingTemplate;
                        prompts::template_prompt()
                    }
                    StyleMode::Custom => {
                        session.state = DialogState::ChoosingFontSize;
                        prompts::font_size_prompt()
                    }
                };
                Applied::Continue { session, reply }
            }

            DialogState::ChoosingTemplate => {
                let template = match parse::<TemplateId>(&choice_id) {
                    Ok(v) => v,
                    Err(error) => return reject_unknown(session, error),
                };
                session.choices.template = Some(template);
                session.state = DialogState::ChoosingFormat;
                Applied::Continue {
                    session,
                    reply: prompts::format_prompt(),
                }
            }

            DialogState::ChoosingFontSize => {
                let font_size = match parse::<FontSize>(&choice_id) {
                    Ok(v) => v,
                    Err(error) => return reject_unknown(session, error),
                };
                session.choices.font_size = Some(font_size);
                session.state = DialogState::ChoosingFont;
                Applied::Continue {
                    session,
                    reply: prompts::font_prompt(),
                }
            }

            DialogState::ChoosingFont => {
                let font = match parse::<FontFamily>(&choice_id) {
                    Ok(v) => v,
                    Err(error) => return reject_unknown(session, error),
                };
                session.choices.font = Some(font);
                session.state = DialogState::ChoosingColors;
                Applied::Continue {
                    session,
                    reply: prompts::colors_prompt(),
                }
            }

            DialogState::ChoosingColors => {
                let colors = match parse::<ColorScheme>(&choice_id) {
                    Ok(v) => v,
                    Err(error) => return reject_unknown(session, error),
                };
                session.choices.colors = Some(colors);
                session.state = DialogState::ChoosingLineHeight;
                Applied::Continue {
                    session,
                    reply: prompts::line_height_prompt(),
                }
            }

            DialogState::ChoosingLineHeight => {
                let line_height = match parse::<LineHeight>(&choice_id) {
                    Ok(v) => v,
                    Err(error) => return reject_unknown(session, error),
                };
                session.choices.line_height = Some(line_height);
                session.state = DialogState::ChoosingPageMargin;
                Applied::Continue {
                    session,
                    reply: prompts::page_margin_prompt(),
                }
            }

            DialogState::ChoosingPageMargin => {
                let page_margin = match parse::<PageMargin>(&choice_id) {
                    Ok(v) => v,
                    Err(error) => return reject_unknown(session, error),
                };
                session.choices.page_margin = Some(page_margin);
                session.state = DialogState::ChoosingHeaderStyle;
                Applied::Continue {
                    session,
                    reply: prompts::header_style_prompt(),
                }
            }

            DialogState::ChoosingHeaderStyle => {
                let header_style = match parse::<HeaderStyle>(&choice_id) {
                    Ok(v) => v,
                    Err(error) => return reject_unknown(session, error),
                };
                session.choices.header_style = Some(header_style);
                session.state = DialogState::ChoosingShowHeader;
                Applied::Continue {
                    session,
                    reply: prompts::show_header_prompt(),
                }
            }

            DialogState::ChoosingShowHeader => {
                let show = match parse_yes_no(&choice_id) {
                    Some(show) => show,
                    None => {
                        return reject_unknown(
                            session,
                            DialogError::UnknownChoice { choice_id },
                        );
                    }
                };
                session.choices.show_header = Some(show);
                session.state = DialogState::ChoosingFormat;
                Applied::Continue {
                    session,
                    reply: prompts::format_prompt(),
                }
            }

            DialogState::ChoosingFormat => {
                let format = match parse::<OutputFormat>(&choice_id) {
                    Ok(v) => v,
                    Err(error) => return reject_unknown(session, error),
                };
                session.choices.format = Some(format);
                session.state = DialogState::AskingComparison;
                Applied::Continue {
                    session,
                    reply: prompts::comparison_prompt(),
                }
            }

            DialogState::AskingComparison => match parse_yes_no(&choice_id) {
                Some(true) => {
                    session.state = DialogState::EnteringComparison;
                    Applied::Continue {
                        session,
                        reply: prompts::comparison_text_prompt(),
                    }
                }
                Some(false) => Applied::ReadyToSubmit {
                    session,
                    status_handle,
                },
                None => reject_unknown(session, DialogError::UnknownChoice { choice_id }),
            },

            // These states never offer choices; a matching expected_state
            // here means a hand-crafted action, not a real keyboard.
            DialogState::GeneratingQuestions
            | DialogState::Answering
            | DialogState::ChoosingTitle
            | DialogState::EnteringComparison
            | DialogState::InQueue => {
                let reply = prompts::prompt_for(&session);
                Applied::Ignored { session, reply }
            }
        }
    }

    /// Fetch clarification questions for the freshly chosen language. On
    /// any failure the dialog degrades gracefully: straight to depth
    /// selection with no answering phase.
    async fn generate_questions(&self, session: &mut Session, language: Language) -> Reply {
        match self.questions.ask(&session.topic, language).await {
            Ok(questions) if !questions.is_empty() => {
                session.questions = questions.into_iter().take(MAX_QUESTIONS).collect();
                session.state = DialogState::Answering;
                let first = session.questions[0].clone();
                prompts::question_prompt(0, session.questions.len(), &first)
            }
            Ok(_) => {
                tracing::warn!(
                    client_id = %session.client_id,
                    "question generator returned nothing, skipping clarification"
                );
                session.state = DialogState::ChoosingDepth;
                prompts::depth_prompt()
            }
            Err(err) => {
                tracing::warn!(
                    client_id = %session.client_id,
                    error = %err,
                    "question generation failed, skipping clarification"
                );
                session.state = DialogState::ChoosingDepth;
                prompts::depth_prompt()
            }
        }
    }
}

fn parse<T: FromStr>(choice_id: &str) -> Result<T, DialogError> {
    choice_id.parse().map_err(|_| DialogError::UnknownChoice {
        choice_id: choice_id.to_string(),
    })
}

fn parse_yes_no(choice_id: &str) -> Option<bool> {
    match choice_id {
        "yes" => Some(true),
        "no" => Some(false),
        _ => None,
    }
}

fn reject_unknown(session: Session, error: DialogError) -> Applied {
    let reply = prompts::prompt_for(&session);
    Applied::Rejected {
        session: Some(session),
        error,
        reply,
    }
}
