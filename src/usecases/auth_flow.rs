//! First-run setup and login (API credentials -> phone -> code -> 2FA -> Gemini key).
//!
//! Each step validates its own inputs, calls the backend, and either advances
//! or returns a recoverable `AuthError`. The flow then stays on the same step,
//! except for an expired login code, which sends it back to phone entry.

use crate::domain::{ConfigKey, DomainError, SignInCredentials, SignInResult};
use crate::ports::{ChatBackend, ConfigStore};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

const TELEGRAM_API_URL: &str = "https://my.telegram.org/auth";
const GEMINI_KEY_URL: &str = "https://aistudio.google.com/app/apikey";

/// Setup step. Payload only where the step needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// `notice` carries the reason when we were sent back here.
    NeedsApiCredentials { notice: Option<String> },
    NeedsPhone,
    NeedsCode { phone: String },
    NeedsPassword { phone: String, hint: Option<String> },
    NeedsSummarizerKey,
    Ready,
}

/// Recoverable, user-visible failure of a step.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("Could not save settings:\n{0}")]
    Storage(String),

    #[error("Could not connect:\n{0}")]
    Connect(String),

    #[error("Failed to send code:\n{0}")]
    SendCode(String),

    #[error("Login error:\n{0}")]
    Login(String),

    #[error("The login code can no longer be used, request a new one:\n{0}")]
    CodeExpired(String),

    #[error("Invalid password:\n{0}")]
    Password(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputField {
    pub placeholder: &'static str,
    /// Masked input (passwords).
    pub secret: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnMore {
    pub label: &'static str,
    pub url: &'static str,
}

/// What the setup view shows for the current step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepView {
    pub title: &'static str,
    pub message: String,
    pub fields: Vec<InputField>,
    pub button: &'static str,
    pub learn_more: Option<LearnMore>,
}

fn field(placeholder: &'static str) -> InputField {
    InputField {
        placeholder,
        secret: false,
    }
}

impl AuthState {
    pub fn view(&self) -> StepView {
        match self {
            AuthState::NeedsApiCredentials { notice } => {
                let base = "You need your API ID and HASH. It is free.";
                StepView {
                    title: "Step 1: Telegram API",
                    message: match notice {
                        Some(n) => format!("{}\n{}", n, base),
                        None => base.to_string(),
                    },
                    fields: vec![field("Paste API ID"), field("Paste API HASH")],
                    button: "SAVE",
                    learn_more: Some(LearnMore {
                        label: "Get API ID and HASH (my.telegram.org)",
                        url: TELEGRAM_API_URL,
                    }),
                }
            }
            AuthState::NeedsPhone => StepView {
                title: "Step 2: Account Login",
                message: "Enter phone number (with country code, e.g. +1...)".to_string(),
                fields: vec![field("+19001234567")],
                button: "SEND CODE",
                learn_more: None,
            },
            AuthState::NeedsCode { phone } => StepView {
                title: "Step 3: Confirmation",
                message: format!("Enter the code sent to Telegram at {}", phone),
                fields: vec![field("Code (e.g., 12345)")],
                button: "LOGIN",
                learn_more: None,
            },
            AuthState::NeedsPassword { hint, .. } => StepView {
                title: "Two-Step Verification",
                message: match hint {
                    Some(h) => format!(
                        "Your account is protected by a password. Enter it. (hint: {})",
                        h
                    ),
                    None => "Your account is protected by a password. Enter it.".to_string(),
                },
                fields: vec![InputField {
                    placeholder: "Cloud Password",
                    secret: true,
                }],
                button: "CONFIRM PASSWORD",
                learn_more: None,
            },
            AuthState::NeedsSummarizerKey => StepView {
                title: "Step 4: Google Gemini AI",
                message: "Paste Gemini API key for neural network.".to_string(),
                fields: vec![field("AIzaSy...")],
                button: "DONE",
                learn_more: Some(LearnMore {
                    label: "Get key for free (aistudio.google.com)",
                    url: GEMINI_KEY_URL,
                }),
            },
            AuthState::Ready => StepView {
                title: "Ready",
                message: "Setup complete.".to_string(),
                fields: Vec::new(),
                button: "CONTINUE",
                learn_more: None,
            },
        }
    }
}

/// Setup/login state machine over the config store and the chat backend.
pub struct AuthFlow {
    config: Arc<dyn ConfigStore>,
    backend: Arc<dyn ChatBackend>,
    state: AuthState,
}

impl AuthFlow {
    /// Pick the entry step: credential entry when none are stored, otherwise
    /// reuse the saved session.
    ///
    /// Must run inside the runtime (it connects).
    pub async fn start(config: Arc<dyn ConfigStore>, backend: Arc<dyn ChatBackend>) -> Self {
        let mut flow = Self {
            config,
            backend,
            state: AuthState::NeedsApiCredentials { notice: None },
        };
        if !flow.has_api_credentials().await {
            info!("no Telegram API credentials stored");
            return flow;
        }

        match flow.backend.connect_and_check_authorized().await {
            Ok(true) => {
                info!("existing session is authorized");
                flow.check_summarizer_key().await;
            }
            Ok(false) => flow.state = AuthState::NeedsPhone,
            Err(e) => {
                warn!(error = %e, "could not reuse session");
                flow.state = AuthState::NeedsApiCredentials {
                    notice: Some(e.to_string()),
                };
            }
        }
        flow
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn view(&self) -> StepView {
        self.state.view()
    }

    pub fn is_ready(&self) -> bool {
        self.state == AuthState::Ready
    }

    /// Primary button of the current step. `inputs` follow `view().fields` order.
    pub async fn submit(&mut self, inputs: &[String]) -> Result<(), AuthError> {
        let input = move |i: usize| inputs.get(i).map(|s| s.trim()).unwrap_or("");
        match self.state.clone() {
            AuthState::NeedsApiCredentials { .. } => {
                self.submit_api_credentials(input(0), input(1)).await
            }
            AuthState::NeedsPhone => self.submit_phone(input(0)).await,
            AuthState::NeedsCode { phone } => self.submit_code(phone, input(0)).await,
            AuthState::NeedsPassword { .. } => self.submit_password(input(0)).await,
            AuthState::NeedsSummarizerKey => self.submit_summarizer_key(input(0)).await,
            AuthState::Ready => Ok(()),
        }
    }

    async fn submit_api_credentials(&mut self, api_id: &str, api_hash: &str) -> Result<(), AuthError> {
        if api_id.is_empty() || api_hash.is_empty() {
            return Err(AuthError::Validation("Fill both fields"));
        }
        if api_id.parse::<i32>().is_err() {
            return Err(AuthError::Validation("Incorrect data"));
        }
        self.config
            .save(HashMap::from([
                (ConfigKey::ApiId, api_id.to_string()),
                (ConfigKey::ApiHash, api_hash.to_string()),
            ]))
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        self.backend.reset().await;
        match self.backend.connect_and_check_authorized().await {
            Ok(true) => {
                self.check_summarizer_key().await;
                Ok(())
            }
            Ok(false) => {
                self.state = AuthState::NeedsPhone;
                Ok(())
            }
            Err(e) => Err(AuthError::Connect(e.to_string())),
        }
    }

    async fn submit_phone(&mut self, phone: &str) -> Result<(), AuthError> {
        if phone.is_empty() {
            return Err(AuthError::Validation("Enter phone number"));
        }
        match self.backend.send_login_code(phone).await {
            Ok(()) => {
                self.state = AuthState::NeedsCode {
                    phone: phone.to_string(),
                };
                Ok(())
            }
            Err(e) => self.backend_failure(e, AuthError::SendCode),
        }
    }

    async fn submit_code(&mut self, phone: String, code: &str) -> Result<(), AuthError> {
        if code.is_empty() {
            return Err(AuthError::Validation("Enter the code"));
        }
        match self
            .backend
            .sign_in(SignInCredentials::Code(code.to_string()))
            .await
        {
            Ok(SignInResult::Success) => {
                self.check_summarizer_key().await;
                Ok(())
            }
            Ok(SignInResult::PasswordRequired { hint }) => {
                info!("two-step verification required");
                self.state = AuthState::NeedsPassword { phone, hint };
                Ok(())
            }
            Ok(SignInResult::InvalidCredentials(reason)) => Err(AuthError::Login(reason)),
            Ok(SignInResult::CodeExpired { reason }) => {
                warn!(reason = %reason, "login code expired");
                self.state = AuthState::NeedsPhone;
                Err(AuthError::CodeExpired(reason))
            }
            Err(e) => self.backend_failure(e, AuthError::Login),
        }
    }

    async fn submit_password(&mut self, password: &str) -> Result<(), AuthError> {
        if password.is_empty() {
            return Err(AuthError::Validation("Enter password"));
        }
        match self
            .backend
            .sign_in(SignInCredentials::Password(password.to_string()))
            .await
        {
            Ok(SignInResult::Success) => {
                self.check_summarizer_key().await;
                Ok(())
            }
            Ok(SignInResult::InvalidCredentials(reason) | SignInResult::CodeExpired { reason }) => {
                Err(AuthError::Password(reason))
            }
            Ok(SignInResult::PasswordRequired { .. }) => {
                Err(AuthError::Password("password was not accepted".into()))
            }
            Err(e) => self.backend_failure(e, AuthError::Password),
        }
    }

    async fn submit_summarizer_key(&mut self, key: &str) -> Result<(), AuthError> {
        if key.is_empty() {
            return Err(AuthError::Validation("Enter key"));
        }
        self.config
            .save(HashMap::from([(ConfigKey::GeminiKey, key.to_string())]))
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;
        self.check_summarizer_key().await;
        Ok(())
    }

    /// Config errors send the flow back to credential entry; anything else
    /// stays on the current step.
    fn backend_failure(
        &mut self,
        error: DomainError,
        wrap: fn(String) -> AuthError,
    ) -> Result<(), AuthError> {
        match error {
            DomainError::Config(_) => {
                warn!(error = %error, "returning to credential entry");
                self.state = AuthState::NeedsApiCredentials {
                    notice: Some(error.to_string()),
                };
                Ok(())
            }
            other => Err(wrap(other.to_string())),
        }
    }

    async fn has_api_credentials(&self) -> bool {
        let present = |v: Option<String>| v.is_some_and(|s| !s.trim().is_empty());
        present(self.config.get(ConfigKey::ApiId).await)
            && present(self.config.get(ConfigKey::ApiHash).await)
    }

    /// Ready only when every required key is stored.
    async fn check_summarizer_key(&mut self) {
        if !self.has_api_credentials().await {
            self.state = AuthState::NeedsApiCredentials {
                notice: Some("Config error: API ID and API HASH are not set".into()),
            };
            return;
        }
        let key = self.config.get(ConfigKey::GeminiKey).await;
        self.state = if key.is_some_and(|k| !k.trim().is_empty()) {
            info!("setup complete");
            AuthState::Ready
        } else {
            AuthState::NeedsSummarizerKey
        };
    }
}
