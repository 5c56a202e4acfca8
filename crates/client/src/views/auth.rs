//! Login and signup forms.

use marketplace_core::{AddressComponent, Email, compose_full_address};
use secrecy::SecretString;
use tracing::instrument;

use super::{Flash, Page};
use crate::api::{ApiError, LoginRequest, MarketplaceApi, RegisterRequest};
use crate::session::SessionStore;

const LOGIN_FAILED: &str = "Login failed. Please check your credentials and try again.";
const LOGIN_SUCCEEDED: &str = "Login successful!";
const SIGNUP_FAILED: &str = "Signup failed.";
const SIGNUP_SUCCEEDED: &str = "Signup successful! Please log in.";

/// Result of submitting a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// Leave the form for `to`, showing `flash` on arrival.
    Navigate { to: Page, flash: Flash },
    /// Stay on the form and show this message next to it.
    InlineError(String),
}

/// Login form fields, as entered.
pub struct LoginForm {
    pub email: String,
    pub password: SecretString,
}

/// Signup form fields, as entered.
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub full_address: String,
    pub email: String,
    pub password: SecretString,
}

impl SignupForm {
    /// Fill the address field from the place picked in the autocomplete
    /// widget.
    pub fn set_address_from_place(&mut self, components: &[AddressComponent]) {
        self.full_address = compose_full_address(components);
        tracing::debug!(full_address = %self.full_address, "Address selected");
    }
}

/// Submit the login form.
///
/// On success all three session fields are persisted and the user is sent
/// to the listing. On any failure nothing is stored.
#[instrument(level = "debug", skip_all)]
pub async fn submit_login(
    api: &MarketplaceApi,
    store: &dyn SessionStore,
    form: LoginForm,
) -> FormOutcome {
    let email = match Email::parse(&form.email) {
        Ok(email) => email,
        Err(e) => return FormOutcome::InlineError(format!("Invalid email: {e}")),
    };
    let request = LoginRequest {
        email,
        password: form.password,
    };

    let session = match api.login(&request).await {
        Ok(response) => response.into_session(),
        Err(e) => return login_failure(&e),
    };
    let Some(session) = session else {
        tracing::warn!("Login response was missing session fields");
        return FormOutcome::InlineError(LOGIN_FAILED.to_owned());
    };

    if let Err(e) = store.save(&session) {
        tracing::error!(error = %e, "Failed to persist session");
        return FormOutcome::InlineError(format!("Could not save login: {e}"));
    }

    tracing::info!(user_id = %session.user_id(), "Logged in");
    FormOutcome::Navigate {
        to: Page::Listing,
        flash: Flash::success(LOGIN_SUCCEEDED),
    }
}

fn login_failure(error: &ApiError) -> FormOutcome {
    if error.is_network() {
        tracing::warn!(error = %error, "Login request did not reach the backend");
        FormOutcome::InlineError(format!("Login error: {error}"))
    } else {
        tracing::info!(error = %error, "Login rejected");
        FormOutcome::InlineError(LOGIN_FAILED.to_owned())
    }
}

/// Submit the signup form. On success the user is sent to the login page.
#[instrument(level = "debug", skip_all)]
pub async fn submit_signup(api: &MarketplaceApi, form: SignupForm) -> FormOutcome {
    let email = match Email::parse(&form.email) {
        Ok(email) => email,
        Err(e) => return FormOutcome::InlineError(format!("Invalid email: {e}")),
    };
    let request = RegisterRequest {
        first_name: form.first_name,
        last_name: form.last_name,
        full_address: form.full_address,
        email,
        password: form.password,
    };

    match api.register(&request).await {
        Ok(()) => {
            tracing::info!(email = %request.email, "Registered");
            FormOutcome::Navigate {
                to: Page::Login,
                flash: Flash::success(SIGNUP_SUCCEEDED),
            }
        }
        Err(ApiError::Http { status, message, .. }) => {
            tracing::info!(%status, %message, "Signup rejected");
            FormOutcome::InlineError(format!("{SIGNUP_FAILED} {message}"))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Signup request failed");
            FormOutcome::InlineError(format!("Signup error: {e}"))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::config::ClientConfig;
    use crate::session::MemorySessionStore;

    fn offline_api() -> MarketplaceApi {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let config = ClientConfig::for_api_url(&format!("http://127.0.0.1:{port}")).unwrap();
        MarketplaceApi::new(ApiClient::new(&config).unwrap())
    }

    #[tokio::test]
    async fn test_login_with_malformed_email_stays_on_form() {
        let store = MemorySessionStore::new();
        let outcome = submit_login(
            &offline_api(),
            &store,
            LoginForm {
                email: "not-an-email".to_owned(),
                password: SecretString::from("pw"),
            },
        )
        .await;
        assert!(
            matches!(outcome, FormOutcome::InlineError(ref m) if m.starts_with("Invalid email"))
        );
        assert!(store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_network_failure_is_inline_and_stores_nothing() {
        let store = MemorySessionStore::new();
        let outcome = submit_login(
            &offline_api(),
            &store,
            LoginForm {
                email: "a@b.c".to_owned(),
                password: SecretString::from("pw"),
            },
        )
        .await;
        assert!(matches!(outcome, FormOutcome::InlineError(ref m) if m.starts_with("Login error")));
        assert!(store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_signup_network_failure_is_inline() {
        let outcome = submit_signup(
            &offline_api(),
            SignupForm {
                first_name: "Noa".to_owned(),
                last_name: "Levi".to_owned(),
                full_address: String::new(),
                email: "noa@example.com".to_owned(),
                password: SecretString::from("pw"),
            },
        )
        .await;
        assert!(
            matches!(outcome, FormOutcome::InlineError(ref m) if m.starts_with("Signup error"))
        );
    }

    #[test]
    fn test_set_address_from_place() {
        let mut form = SignupForm {
            first_name: String::new(),
            last_name: String::new(),
            full_address: "typed by hand".to_owned(),
            email: String::new(),
            password: SecretString::from(""),
        };
        form.set_address_from_place(&[
            AddressComponent::new("3", "3", "street_number"),
            AddressComponent::new("Jaffa Road", "Jaffa Rd", "route"),
            AddressComponent::new("Jerusalem", "Jerusalem", "locality"),
        ]);
        assert_eq!(form.full_address, "3 Jaffa Rd, Jerusalem");
    }
}
