//! Session lifecycle: a stubbed credential flow with persisted identity.
//!
//! Authentication is simulated end to end. Credentials are validated locally,
//! then a fabricated user record comes back from the auth seam after a short
//! delay. The session record persists to a slot so identity survives reload;
//! passwords never do.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use storefront_core::effect::{Effect, EffectId};
use storefront_core::reducer::Reducer;
use storefront_core::slot::{self, Slot};
use storefront_core::{SmallVec, smallvec};

/// Identifier for the in-flight authentication effect
pub const AUTH_EFFECT: EffectId = EffectId::new("session-auth");

const MIN_PASSWORD_LEN: usize = 6;

/// An authenticated shopper
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Sign-in email
    pub email: String,
    /// Whether the account has admin privileges
    pub is_admin: bool,
}

/// Failure reported by the auth seam
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("authentication failed: {0}")]
pub struct AuthError(pub String);

/// Resolves credentials to a user record.
///
/// Dyn-compatible so environments can hold `Arc<dyn AuthClient>`.
pub trait AuthClient: Send + Sync {
    /// Sign an existing shopper in
    fn login(&self, email: String) -> BoxFuture<'static, Result<User, AuthError>>;

    /// Create an account and sign it in
    fn register(&self, name: String, email: String) -> BoxFuture<'static, Result<User, AuthError>>;
}

/// An auth client that accepts any locally-valid credentials after a fixed
/// delay, fabricating the user record.
///
/// Login answers with a canned profile; `admin@example.com` gets the admin
/// flag. Registration echoes the submitted name back.
#[derive(Clone, Debug)]
pub struct SimulatedAuth {
    delay: Duration,
}

impl SimulatedAuth {
    /// A client that resolves after the given delay
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedAuth {
    fn default() -> Self {
        Self::new(Duration::from_millis(300))
    }
}

impl AuthClient for SimulatedAuth {
    fn login(&self, email: String) -> BoxFuture<'static, Result<User, AuthError>> {
        let delay = self.delay;
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            Ok(User {
                id: "1".to_string(),
                name: "May Fung".to_string(),
                is_admin: email == "admin@example.com",
                email,
            })
        })
    }

    fn register(&self, name: String, email: String) -> BoxFuture<'static, Result<User, AuthError>> {
        let delay = self.delay;
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            Ok(User {
                id: "2".to_string(),
                name,
                email,
                is_admin: false,
            })
        })
    }
}

/// The current session
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionState {
    /// The signed-in shopper, if any
    pub user: Option<User>,
    /// An auth request is in flight
    pub authenticating: bool,
    /// The most recent validation or auth failure
    pub last_error: Option<String>,
}

impl SessionState {
    /// A signed-out session
    #[must_use]
    pub const fn new() -> Self {
        Self {
            user: None,
            authenticating: false,
            last_error: None,
        }
    }

    /// Rebuild a session from a slot, signed out when the slot is missing
    /// or malformed
    #[must_use]
    pub fn restore(slot: &dyn Slot) -> Self {
        Self {
            user: slot::load_json(slot, "session"),
            authenticating: false,
            last_error: None,
        }
    }

    /// Whether a shopper is signed in
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Dependencies for the session flow
#[derive(Clone)]
pub struct SessionEnv {
    /// The auth seam
    pub auth: Arc<dyn AuthClient>,
    /// Where the session record persists
    pub slot: Arc<dyn Slot>,
}

/// Everything the session can do
#[derive(Clone, Debug, PartialEq)]
pub enum SessionAction {
    /// Sign in with credentials
    Login {
        /// Sign-in email
        email: String,
        /// Password; validated locally, never stored
        password: String,
    },
    /// Create an account
    Register {
        /// Display name
        name: String,
        /// Sign-in email
        email: String,
        /// Password; validated locally, never stored
        password: String,
        /// Must match the password
        confirm_password: String,
    },
    /// The auth seam accepted the credentials
    LoggedIn {
        /// The authenticated shopper
        user: User,
    },
    /// The auth seam rejected the credentials
    AuthFailed {
        /// Human-readable failure description
        reason: String,
    },
    /// Abort an in-flight auth request
    CancelAuth,
    /// Sign out
    Logout,
}

/// Validates credentials locally, then defers to the auth seam.
///
/// A validation failure lands in `last_error` with no effect emitted. A
/// passing validation marks the session as authenticating and starts a
/// cancellable auth request.
#[derive(Clone, Copy, Debug, Default)]
pub struct SessionReducer;

impl Reducer for SessionReducer {
    type State = SessionState;
    type Action = SessionAction;
    type Environment = SessionEnv;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            SessionAction::Login { email, password } => {
                if let Err(reason) = validate_login(&email, &password) {
                    state.last_error = Some(reason);
                    return smallvec![];
                }
                state.last_error = None;
                state.authenticating = true;
                let auth = env.auth.clone();
                smallvec![Effect::cancellable(
                    AUTH_EFFECT,
                    Effect::future(async move {
                        Some(match auth.login(email).await {
                            Ok(user) => SessionAction::LoggedIn { user },
                            Err(error) => SessionAction::AuthFailed {
                                reason: error.to_string(),
                            },
                        })
                    }),
                )]
            },
            SessionAction::Register {
                name,
                email,
                password,
                confirm_password,
            } => {
                if let Err(reason) = validate_register(&name, &email, &password, &confirm_password)
                {
                    state.last_error = Some(reason);
                    return smallvec![];
                }
                state.last_error = None;
                state.authenticating = true;
                let auth = env.auth.clone();
                smallvec![Effect::cancellable(
                    AUTH_EFFECT,
                    Effect::future(async move {
                        Some(match auth.register(name, email).await {
                            Ok(user) => SessionAction::LoggedIn { user },
                            Err(error) => SessionAction::AuthFailed {
                                reason: error.to_string(),
                            },
                        })
                    }),
                )]
            },
            // An auth outcome with no request in flight is stale: the request
            // was cancelled after the response was already produced. Dropping
            // it keeps a cancelled sign-in signed out.
            SessionAction::LoggedIn { .. } | SessionAction::AuthFailed { .. }
                if !state.authenticating =>
            {
                tracing::debug!("dropping stale auth result");
                smallvec![]
            },
            SessionAction::LoggedIn { user } => {
                state.authenticating = false;
                state.last_error = None;
                slot::store_json(env.slot.as_ref(), "session", &user);
                state.user = Some(user);
                smallvec![]
            },
            SessionAction::AuthFailed { reason } => {
                state.authenticating = false;
                state.last_error = Some(reason);
                smallvec![]
            },
            SessionAction::CancelAuth => {
                state.authenticating = false;
                smallvec![Effect::cancel(AUTH_EFFECT)]
            },
            SessionAction::Logout => {
                state.user = None;
                state.authenticating = false;
                state.last_error = None;
                slot::clear_slot(env.slot.as_ref(), "session");
                smallvec![]
            },
        }
    }
}

fn validate_login(email: &str, password: &str) -> Result<(), String> {
    if email.trim().is_empty() || password.is_empty() {
        return Err("Please fill in all fields".to_string());
    }
    if !is_plausible_email(email) {
        return Err("Please enter a valid email address".to_string());
    }
    Ok(())
}

fn validate_register(
    name: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), String> {
    if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
        return Err("Please fill in all fields".to_string());
    }
    if !is_plausible_email(email) {
        return Err("Please enter a valid email address".to_string());
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }
    if password != confirm_password {
        return Err("Passwords do not match".to_string());
    }
    Ok(())
}

// Something non-blank, an @, then something containing a dot. Matches the
// lenient check a sign-in form applies, nothing RFC-grade.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.trim().is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.trim().is_empty()
}
