//! Custom widgets

pub mod prompt_modal;

pub use prompt_modal::PromptModal;
