// Dioxus imports
use dioxus::prelude::*;

// mod imports
use super::{
    query_state::{SourceCard, SubmitQueryState, QUERY_VIEW},
    svg_icons::{file_icon_svg, send_icon_svg},
};

/// Clear the input and hand the question to the window's submitter
fn start_submission(submit_query: Coroutine<SubmitQueryState>) {
    let (ticket, question) = QUERY_VIEW.write().begin_submit();
    submit_query.send(SubmitQueryState { ticket, question });
}

/// View for the answer and its source documents
#[component]
pub fn query_interface_view() -> Element {
    let view = QUERY_VIEW();
    let status = view.status.as_str().to_string();

    rsx! {
        div {
            class: "answer_list",
            p {
                id: "status",
                class: "status {status}",
                "{view.status.message()}"
            }
            div {
                class: "answer",
                h2 { "Answer" }
                p { id: "answer", "{view.answer}" }
            }
            div {
                id: "source-documents",
                class: "source_list",
                for card in view.cards.iter() {
                    source_card { key: "{card.index}", card: card.clone() }
                }
            }
        }
    }
}

/// One source document with its excerpt and a link to the file
#[component]
pub fn source_card(card: SourceCard) -> Element {
    rsx! {
        div {
            id: "card{card.index}",
            class: "card",
            div {
                class: "card-body",
                div {
                    class: "entete",
                    svg { dangerous_inner_html: file_icon_svg() }
                    h6 { class: "card-title", "Source {card.index}: {card.file_name}" }
                }
                p { class: "card-text", "{card.excerpt}" }
                a {
                    href: "{card.file_path}",
                    target: "_blank",
                    rel: "noopener noreferrer",
                    class: "btn btn-primary",
                    "Go To File"
                }
            }
        }
    }
}

/// Question input and submit button
#[component]
pub fn query_interface_footer() -> Element {
    // DM: the submitter coroutine lives in `main_window` so that it survives this footer
    let submit_query = use_coroutine_handle::<SubmitQueryState>();

    rsx! {
        footer {
            div {
                class: "text_input",
                form {
                    id: "question_form",
                    input {
                        id: "question-input",
                        r#type: "text",
                        placeholder: "Ask a question about the documents...",
                        value: "{QUERY_VIEW.read().question}",
                        oninput: move |event| QUERY_VIEW.write().question = event.value(),
                        onkeydown: move |event: KeyboardEvent| {
                            if event.key() == Key::Enter {
                                event.prevent_default();
                                start_submission(submit_query);
                            }
                        },
                    }
                }
            }

            div {
                class: "submit_button",
                // This must be outside the form or it will be refreshed on each submit
                button {
                    id: "submit-button",
                    onclick: move |_| start_submission(submit_query),
                    svg { dangerous_inner_html: send_icon_svg() }
                }
            }
        }
    }
}
