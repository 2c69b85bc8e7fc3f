//! Outgoing prompt construction.
//!
//! Every reply the dialog can produce is built here, so the machine stays
//! free of presentation strings and the prompts stay consistent between
//! first-time prompting and re-prompting after a stale action.

use scrivener_types::action::{ChoiceOption, Reply};
use scrivener_types::catalog::{
    ColorScheme, Depth, FontFamily, FontSize, HeaderStyle, Language, LineHeight, OutputFormat,
    PageMargin, StyleMode, TemplateId,
};
use scrivener_types::session::{DialogState, Session};

fn catalog_options<I>(items: I, state: DialogState) -> Vec<ChoiceOption>
where
    I: IntoIterator<Item = (&'static str, &'static str)>,
{
    items
        .into_iter()
        .map(|(id, label)| ChoiceOption::new(id, label, state))
        .collect()
}

fn yes_no_options(state: DialogState) -> Vec<ChoiceOption> {
    vec![
        ChoiceOption::new("yes", "Yes", state),
        ChoiceOption::new("no", "No", state),
    ]
}

pub fn topic_prompt() -> Reply {
    Reply::text("Send the topic you would like a report on.")
}

pub fn language_prompt(topic: &str) -> Reply {
    Reply::with_options(
        format!("Got it -- a report on \"{topic}\". Which language should it be written in?"),
        catalog_options(
            Language::ALL.iter().map(|l| (l.id(), l.label())),
            DialogState::ChoosingLanguage,
        ),
    )
}

pub fn question_prompt(index: usize, total: usize, question: &str) -> Reply {
    Reply::text(format!(
        "A few questions to sharpen the report ({} of {total}):\n{question}",
        index + 1
    ))
}

pub fn title_prompt() -> Reply {
    Reply::text("What title should the report carry?")
}

pub fn depth_prompt() -> Reply {
    Reply::with_options(
        "How long should the report be?",
        catalog_options(
            Depth::ALL.iter().map(|d| (d.id(), d.label())),
            DialogState::ChoosingDepth,
        ),
    )
}

pub fn style_mode_prompt() -> Reply {
    Reply::with_options(
        "Use a ready-made design, or build the layout yourself?",
        catalog_options(
            StyleMode::ALL.iter().map(|m| (m.id(), m.label())),
            DialogState::ChoosingStyleMode,
        ),
    )
}

pub fn template_prompt() -> Reply {
    Reply::with_options(
        "Pick a design template:",
        catalog_options(
            TemplateId::ALL.iter().map(|t| (t.id(), t.label())),
            DialogState::ChoosingTemplate,
        ),
    )
}

pub fn font_size_prompt() -> Reply {
    Reply::with_options(
        "Body font size:",
        catalog_options(
            FontSize::ALL.iter().map(|s| (s.id(), s.label())),
            DialogState::ChoosingFontSize,
        ),
    )
}

pub fn font_prompt() -> Reply {
    Reply::with_options(
        "Font family:",
        catalog_options(
            FontFamily::ALL.iter().map(|f| (f.id(), f.label())),
            DialogState::ChoosingFont,
        ),
    )
}

pub fn colors_prompt() -> Reply {
    Reply::with_options(
        "Accent color scheme:",
        catalog_options(
            ColorScheme::ALL.iter().map(|c| (c.id(), c.label())),
            DialogState::ChoosingColors,
        ),
    )
}

pub fn line_height_prompt() -> Reply {
    Reply::with_options(
        "Line spacing:",
        catalog_options(
            LineHeight::ALL.iter().map(|l| (l.id(), l.label())),
            DialogState::ChoosingLineHeight,
        ),
    )
}

pub fn page_margin_prompt() -> Reply {
    Reply::with_options(
        "Page margins:",
        catalog_options(
            PageMargin::ALL.iter().map(|m| (m.id(), m.label())),
            DialogState::ChoosingPageMargin,
        ),
    )
}

pub fn header_style_prompt() -> Reply {
    Reply::with_options(
        "Section heading style:",
        catalog_options(
            HeaderStyle::ALL.iter().map(|h| (h.id(), h.label())),
            DialogState::ChoosingHeaderStyle,
        ),
    )
}

pub fn show_header_prompt() -> Reply {
    Reply::with_options(
        "Show a page header with the report title?",
        yes_no_options(DialogState::ChoosingShowHeader),
    )
}

pub fn format_prompt() -> Reply {
    Reply::with_options(
        "Which file format do you want?",
        catalog_options(
            OutputFormat::ALL.iter().map(|f| (f.id(), f.label())),
            DialogState::ChoosingFormat,
        ),
    )
}

pub fn comparison_prompt() -> Reply {
    Reply::with_options(
        "Should the report include a comparison section (e.g. against an alternative approach)?",
        yes_no_options(DialogState::AskingComparison),
    )
}

pub fn comparison_text_prompt() -> Reply {
    Reply::text("Describe what the report should compare against.")
}

pub fn queued_reply(position: usize) -> Reply {
    Reply::text(format!(
        "Your request is in. You are number {position} in the queue; \
         the report will be delivered as soon as it is ready."
    ))
}

pub fn queue_full_reply() -> Reply {
    Reply::text(
        "The generation queue is full right now. Your settings are saved -- \
         try submitting again in a moment.",
    )
}

pub fn stale_reply(session: &Session) -> Reply {
    let mut reply = prompt_for(session);
    reply.text = format!(
        "That button belongs to an earlier step and no longer applies.\n{}",
        reply.text
    );
    reply
}

pub fn start_over_reply() -> Reply {
    Reply::text("There is no active request for you. Send a topic to start a new report.")
}

pub fn session_reset_reply() -> Reply {
    Reply::text(
        "Something went wrong with your session and it has been reset. \
         Send a topic to start over.",
    )
}

pub fn cancelled_reply() -> Reply {
    Reply::text("Your request has been cancelled. Send a topic whenever you want a new report.")
}

pub fn nothing_to_cancel_reply() -> Reply {
    Reply::text("There is nothing to cancel. Send a topic to start a new report.")
}

pub fn already_running_reply() -> Reply {
    Reply::text(
        "Your report is already being generated and can no longer be cancelled. \
         It will be delivered shortly.",
    )
}

/// The guidance shown when free text arrives in a state that expects a
/// button press, and the re-prompt appended after a stale action.
pub fn prompt_for(session: &Session) -> Reply {
    match session.state {
        DialogState::ChoosingLanguage => language_prompt(&session.topic),
        DialogState::GeneratingQuestions => {
            Reply::text("One moment -- preparing a few clarification questions.")
        }
        DialogState::Answering => match session.next_question() {
            Some((index, question)) => {
                question_prompt(index, session.questions.len(), question)
            }
            None => title_prompt(),
        },
        DialogState::ChoosingTitle => title_prompt(),
        DialogState::ChoosingDepth => depth_prompt(),
        DialogState::ChoosingStyleMode => style_mode_prompt(),
        DialogState::ChoosingTemplate => template_prompt(),
        DialogState::ChoosingFontSize => font_size_prompt(),
        DialogState::ChoosingFont => font_prompt(),
        DialogState::ChoosingColors => colors_prompt(),
        DialogState::ChoosingLineHeight => line_height_prompt(),
        DialogState::ChoosingPageMargin => page_margin_prompt(),
        DialogState::ChoosingHeaderStyle => header_style_prompt(),
        DialogState::ChoosingShowHeader => show_header_prompt(),
        DialogState::ChoosingFormat => format_prompt(),
        DialogState::AskingComparison => comparison_prompt(),
        DialogState::EnteringComparison => comparison_text_prompt(),
        DialogState::InQueue => Reply::text(
            "Your report is in the queue and will be delivered when ready. \
             Use cancel if you no longer want it.",
        ),
    }
}
