//! State of the phone number form.
//!
//! The page holds three pieces of state: the masked input text, whether the
//! confirmation dialog is open and whether the "sent" dialog is open. The
//! server keeps no session, so every submission rebuilds a [`PhoneForm`] from
//! the posted input and applies one [`FormAction`] to it.

use crate::transport::SendTransport;
use regex::Regex;
use serde::Deserialize;
use sms_core::{to_e164, Region, SendTextRequest, SmsError};
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{debug, info, warn};

/// How long the "sent" dialog stays open before closing itself.
pub const SENT_DIALOG_TIMEOUT: Duration = Duration::from_secs(10);

/// Input mask. `#` accepts 1-9, `0` accepts any digit.
pub const PHONE_MASK: &str = "(#00) 000-0000";

const MASK_DIGITS: usize = 10;

static CONFIRM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\+?1\s?)?(\()?\d{3}(\))?(-|\s)?\d{3}(-|\s)\d{4}$").expect("valid pattern")
});

/// Errors raised while sending from the form
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("send requested without an open confirmation dialog")]
    NotConfirmed,
    #[error("unable to normalize phone number: {0}")]
    Normalize(#[from] SmsError),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("send endpoint returned {status}: {error}")]
    Rejected { status: u16, error: String },
}

/// Fit raw input into [`PHONE_MASK`], dropping characters the mask rejects.
pub fn apply_mask(raw: &str) -> String {
    let mut digits = String::with_capacity(MASK_DIGITS);
    for c in raw.chars() {
        if digits.len() == MASK_DIGITS {
            break;
        }
        match c {
            '1'..='9' => digits.push(c),
            '0' if !digits.is_empty() => digits.push(c),
            _ => {}
        }
    }

    match digits.len() {
        0 => String::new(),
        1..=3 => format!("({}", digits),
        4..=6 => format!("({}) {}", &digits[..3], &digits[3..]),
        _ => format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..]),
    }
}

/// Whether the confirm button accepts `input`.
pub fn is_confirmable(input: &str) -> bool {
    CONFIRM_PATTERN.is_match(input)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhoneForm {
    phone_number: String,
    confirm_open: bool,
    sent_open: bool,
    sent_number: Option<String>,
}

impl PhoneForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// A closed form holding `raw` after masking.
    pub fn with_input(raw: &str) -> Self {
        let mut form = Self::new();
        form.set_input(raw);
        form
    }

    pub fn set_input(&mut self, raw: &str) {
        self.phone_number = apply_mask(raw);
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    pub fn confirm_open(&self) -> bool {
        self.confirm_open
    }

    pub fn sent_open(&self) -> bool {
        self.sent_open
    }

    pub fn sent_number(&self) -> Option<&str> {
        self.sent_number.as_deref()
    }

    /// Open the confirmation dialog if the input matches the confirm pattern.
    /// Otherwise nothing happens.
    pub fn confirm(&mut self) -> bool {
        if is_confirmable(&self.phone_number) {
            self.confirm_open = true;
        } else {
            debug!("Confirm ignored for {:?}", self.phone_number);
        }
        self.confirm_open
    }

    pub fn confirm_title(&self) -> String {
        format!("Confirm Phone Number {}", self.phone_number)
    }

    pub fn sent_title(&self) -> Option<String> {
        self.sent_number
            .as_ref()
            .map(|number| format!("Text sent to {}", number))
    }

    pub fn cancel(&mut self) {
        self.confirm_open = false;
    }

    pub fn close_sent(&mut self) {
        self.sent_open = false;
        self.sent_number = None;
    }

    /// Build the endpoint request, normalizing the input to E.164.
    pub fn send_request(&self, region: Region) -> Result<SendTextRequest, FormError> {
        if !self.confirm_open {
            return Err(FormError::NotConfirmed);
        }
        Ok(SendTextRequest {
            phone_number: to_e164(&self.phone_number, region)?,
        })
    }

    /// Apply a successful send.
    pub fn mark_sent(&mut self, number: String) {
        self.phone_number.clear();
        self.confirm_open = false;
        self.sent_open = true;
        self.sent_number = Some(number);
    }
}

/// Buttons on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormAction {
    Confirm,
    Send,
    Cancel,
    Close,
}

/// Drives a [`PhoneForm`] and talks to the send endpoint.
#[derive(Clone)]
pub struct FormController {
    transport: Arc<dyn SendTransport>,
    region: Region,
}

impl FormController {
    pub fn new(transport: Arc<dyn SendTransport>, region: Region) -> Self {
        Self { transport, region }
    }

    /// Issue one send for a confirmed form. On failure the form is untouched.
    pub async fn send(&self, form: &mut PhoneForm) -> Result<(), FormError> {
        let request = form.send_request(self.region)?;
        let message = self.transport.send(&request).await?;
        info!("{}", message);
        form.mark_sent(request.phone_number);
        Ok(())
    }

    /// Rebuild the form from the posted input and apply `action`.
    pub async fn handle(&self, action: FormAction, input: &str) -> PhoneForm {
        let mut form = PhoneForm::with_input(input);
        match action {
            FormAction::Confirm => {
                form.confirm();
            }
            FormAction::Send => {
                // The send button only exists inside the confirmation dialog.
                if form.confirm() {
                    if let Err(e) = self.send(&mut form).await {
                        warn!("Send failed: {}", e);
                    }
                }
            }
            FormAction::Cancel => form.cancel(),
            FormAction::Close => form.close_sent(),
        }
        form
    }
}
