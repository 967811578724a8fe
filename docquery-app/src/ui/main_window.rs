// Dioxus imports
use dioxus::prelude::*;

use super::query_interface::{query_interface_footer, query_interface_view};
use super::query_state::submit_query_state;
use super::svg_icons::{help_icon_svg, message_icon_svg};

#[component]
pub fn page_title() -> Element {
    rsx! {
        h1 { "Document questions" }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HeaderMenu {
    Help,
    Ask,
}

impl HeaderMenu {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Help => "Help",
            Self::Ask => "Ask",
        }
    }
}

#[component]
pub fn main_window() -> Element {
    let mut header_menu: Signal<HeaderMenu> = use_signal(|| HeaderMenu::Ask);

    // DM: owned here and not by the footer, which is dropped when the help page is shown
    use_coroutine(submit_query_state);

    rsx! {
        main {
            id: "query_main",
            header {
                div {
                    class: "search",
                    button {
                        title: HeaderMenu::Help.as_str(),
                        onclick: move |_| header_menu.set(HeaderMenu::Help),
                        svg { dangerous_inner_html: help_icon_svg() }
                    }
                    button {
                        title: HeaderMenu::Ask.as_str(),
                        onclick: move |_| header_menu.set(HeaderMenu::Ask),
                        svg { dangerous_inner_html: message_icon_svg() }
                    }
                }
                div {
                    class: "logo",
                    page_title {}
                }
            }

            // DM: required because each component is its own type!
            {match header_menu() {
                HeaderMenu::Help => rsx! { about_text_modal {} },
                HeaderMenu::Ask => rsx! {
                    query_interface_view {}
                    query_interface_footer {}
                },
            }}
        }
    }
}

#[component]
pub fn about_text_modal() -> Element {
    rsx! {
        div {
            class: "answer_list",
            p { "Ask a question about the ingested documents and press enter or the send button." }
            p {
                "The answer is written by the language model from the most relevant passages. "
                "Each passage is listed below the answer with a link to the original file."
            }
            p { "Asking a new question before the previous answer arrives replaces it." }
        }
    }
}
