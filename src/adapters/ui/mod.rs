pub mod banner;
pub mod html;
pub mod setup;
pub mod tui;

use crate::domain::DomainError;
use crossterm::ExecutableCommand;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use inquire::InquireError;
use std::io::{Write, stdout};

/// Prints the welcome banner and applies the theme for all subsequent inquire prompts.
/// Call once at startup (e.g. in main after tracing init).
pub fn init_ui() {
    banner::print_welcome();
    tui::apply_theme();
}

/// What the user did with a prompt.
pub(crate) enum Answer<T> {
    Value(T),
    /// Esc: back out of the current prompt.
    Cancelled,
    /// Ctrl-C: leave the application.
    Quit,
}

pub(crate) fn answer<T>(result: Result<T, InquireError>) -> Result<Answer<T>, DomainError> {
    match result {
        Ok(v) => Ok(Answer::Value(v)),
        Err(InquireError::OperationCanceled) => Ok(Answer::Cancelled),
        Err(InquireError::OperationInterrupted) => Ok(Answer::Quit),
        Err(e) => Err(DomainError::Ui(e.to_string())),
    }
}

pub(crate) fn print_styled(text: &str, color: Color, bold: bool) {
    let mut out = stdout();
    let _ = out.execute(SetForegroundColor(color));
    if bold {
        let _ = out.execute(SetAttribute(Attribute::Bold));
    }
    let _ = out.execute(Print(text));
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(Print("\r\n"));
    let _ = out.flush();
}

pub(crate) fn print_title(text: &str) {
    println!();
    print_styled(text, Color::White, true);
}

pub(crate) fn print_info(text: &str) {
    print_styled(text, Color::Grey, false);
}

pub(crate) fn print_warning(text: &str) {
    print_styled(text, Color::Yellow, true);
}

pub(crate) fn print_error(text: &str) {
    print_styled(text, Color::Red, false);
}

/// Open `url` in the browser, printing it when that is not possible.
pub(crate) fn open_link(url: &str) {
    if let Err(e) = open::that(url) {
        tracing::debug!(error = %e, url, "could not open browser");
        print_info(&format!("Open this link: {}", url));
    }
}
