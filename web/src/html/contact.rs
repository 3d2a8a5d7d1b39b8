use super::flash_message;
use crate::{
    error::Error,
    state::AppState,
    util::{FlashMessage, FlashMessageKind},
};
use axum::{
    Form,
    extract::{State, rejection::FormRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect},
};
use libentree::empty_string_as_none;
use serde::Deserialize;
use tracing::{debug, info};

pub(super) const THANK_YOU: &str = "Thank you for your message! We'll get back to you soon.";

const MAX_MESSAGE_CHARS: usize = 5000;

#[derive(Debug, Deserialize)]
pub(crate) struct ContactParams {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    email: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    message: Option<String>,
}

/// A contact message with every field filled in
#[derive(Debug)]
struct ContactMessage {
    name: String,
    email: String,
    message: String,
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split('.').count() > 1
                && domain.split('.').all(|part| !part.is_empty())
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

impl ContactParams {
    fn validate(self) -> Result<ContactMessage, String> {
        let missing: Vec<&str> = [
            ("name", self.name.is_none()),
            ("email", self.email.is_none()),
            ("message", self.message.is_none()),
        ]
        .into_iter()
        .filter_map(|(field, missing)| missing.then_some(field))
        .collect();
        let (Some(name), Some(email), Some(message)) = (self.name, self.email, self.message)
        else {
            return Err(format!(
                "Please fill in the following fields: {}",
                missing.join(", ")
            ));
        };
        let email = email.trim().to_string();
        if !looks_like_email(&email) {
            return Err(format!("'{email}' is not a valid email address"));
        }
        if message.chars().count() > MAX_MESSAGE_CHARS {
            return Err(format!(
                "Your message is too long. Please keep it under {MAX_MESSAGE_CHARS} characters."
            ));
        }
        Ok(ContactMessage {
            name: name.trim().to_string(),
            email,
            message,
        })
    }
}

/// Accept a message from the contact form. Messages are only logged; the
/// visitor gets a confirmation either way so the form can be reused.
pub(super) async fn send_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    form: Result<Form<ContactParams>, FormRejection>,
) -> Result<impl IntoResponse, Error> {
    let Form(params) = form.map_err(Error::UnprocessableEntityFormRejection)?;
    let htmx = headers.get("HX-Request").is_some();
    match params.validate() {
        Ok(msg) => {
            info!(name = %msg.name, email = %msg.email, chars = msg.message.chars().count(), "Received contact message");
            debug!("Contact message: {:?}", msg.message);
            if htmx {
                Ok((
                    StatusCode::OK,
                    flash_message(
                        state,
                        FlashMessage {
                            kind: FlashMessageKind::Success,
                            msg: THANK_YOU.to_string(),
                        },
                    ),
                )
                    .into_response())
            } else {
                Ok(Redirect::to("/?contact=sent#contact").into_response())
            }
        }
        Err(reason) => {
            debug!("Rejected contact message: {reason}");
            Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                flash_message(
                    state,
                    FlashMessage {
                        kind: FlashMessageKind::Error,
                        msg: reason,
                    },
                ),
            )
                .into_response())
        }
    }
}
