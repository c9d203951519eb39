//! Setup view. Renders the current AuthFlow step and feeds it the user's input.

use super::{Answer, answer, open_link, print_error, print_info, print_title};
use crate::domain::DomainError;
use crate::ports::{ChatBackend, ConfigStore};
use crate::usecases::{AuthFlow, StepView};
use indicatif::ProgressBar;
use inquire::{Password, PasswordDisplayMode, Select, Text};
use std::sync::Arc;
use std::time::Duration;

const QUIT: &str = "Quit";

/// Build the flow, showing a spinner while the saved session is checked.
pub async fn start(config: Arc<dyn ConfigStore>, backend: Arc<dyn ChatBackend>) -> AuthFlow {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Checking session...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    let flow = AuthFlow::start(config, backend).await;
    spinner.finish_and_clear();
    flow
}

/// Drive the flow until it is ready. Returns `false` if the user quit.
pub async fn run(flow: &mut AuthFlow) -> Result<bool, DomainError> {
    while !flow.is_ready() {
        let view = flow.view();
        print_step(&view);

        let mut actions = vec![view.button.to_string()];
        if let Some(link) = &view.learn_more {
            actions.push(link.label.to_string());
        }
        actions.push(QUIT.to_string());

        let choice = match answer(Select::new("Action:", actions).prompt())? {
            Answer::Value(choice) => choice,
            Answer::Cancelled => continue,
            Answer::Quit => return Ok(false),
        };
        if choice == QUIT {
            return Ok(false);
        }
        if let Some(link) = view.learn_more.as_ref().filter(|l| l.label == choice) {
            open_link(link.url);
            continue;
        }

        let Some(inputs) = read_fields(&view)? else {
            continue;
        };
        if let Err(e) = flow.submit(&inputs).await {
            print_error(&format!("Error: {}", e));
        }
    }
    Ok(true)
}

fn print_step(view: &StepView) {
    print_title(view.title);
    print_info(&view.message);
}

/// Prompt every visible field. `None` if the user backed out.
fn read_fields(view: &StepView) -> Result<Option<Vec<String>>, DomainError> {
    let mut inputs = Vec::with_capacity(view.fields.len());
    for field in &view.fields {
        let result = if field.secret {
            Password::new(field.placeholder)
                .without_confirmation()
                .with_display_mode(PasswordDisplayMode::Masked)
                .prompt()
        } else {
            Text::new(field.placeholder).prompt()
        };
        match answer(result)? {
            Answer::Value(v) => inputs.push(v),
            Answer::Cancelled | Answer::Quit => return Ok(None),
        }
    }
    Ok(Some(inputs))
}
