use log::{info, warn};

use crate::api::{ApiClient, Transport};
use crate::error::{ClientError, Field, Result};
use crate::models::{ApprovalStatus, TutorProfile, UserRole};
use crate::session::{Session, SessionStore, UserSession};

/// Where the app should go after a successful login.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Landing {
    Home,
    AdminDashboard,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoginOutcome {
    pub session: UserSession,
    pub landing: Landing,
    pub notice: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Registration {
    pub username: String,
    pub password: String,
    pub role: Option<UserRole>,
    /// Required when registering as a tutor
    pub tutor: Option<TutorProfile>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RegistrationOutcome {
    Student { username: String, notice: String },
    TutorPendingApproval { username: String, notice: String },
}

impl RegistrationOutcome {
    pub fn notice(&self) -> &str {
        match self {
            RegistrationOutcome::Student { notice, .. }
            | RegistrationOutcome::TutorPendingApproval { notice, .. } => notice,
        }
    }

    pub fn username(&self) -> &str {
        match self {
            RegistrationOutcome::Student { username, .. }
            | RegistrationOutcome::TutorPendingApproval { username, .. } => username,
        }
    }
}

#[derive(Clone)]
pub struct AuthGateway<T> {
    api: ApiClient<T>,
    store: SessionStore,
}

impl<T: Transport> AuthGateway<T> {
    pub fn new(api: ApiClient<T>, store: SessionStore) -> Self {
        Self { api, store }
    }

    pub async fn login(&self, username: &str, password: &str, role: UserRole) -> Result<LoginOutcome> {
        let username = username.trim();
        validate_credentials(username, password)?;

        let reply = self.api.login(username, password, role).await?;

        let approval = match reply.role {
            UserRole::Tutor => reply.approval_status,
            _ => None,
        };
        let session = UserSession::new(reply.username, reply.role).with_approval(approval);
        self.store.set(Session::Authenticated(session.clone()))?;
        info!("Logged in {} as {}", session.username, session.role);

        let landing = match session.role {
            UserRole::Admin => Landing::AdminDashboard,
            _ => Landing::Home,
        };
        let notice = format!("Login successful! Welcome back {}!", session.username);

        Ok(LoginOutcome {
            session,
            landing,
            notice,
        })
    }

    /// Creates the account only; the session is left alone.
    pub async fn register(&self, registration: &Registration) -> Result<RegistrationOutcome> {
        let username = registration.username.trim();
        validate_credentials(username, &registration.password)?;
        let role = validate_role(registration.role)?;
        let tutor = match role {
            UserRole::Tutor => Some(validate_tutor_profile(registration.tutor.as_ref())?),
            _ => None,
        };

        self.api
            .register(username, &registration.password, role, tutor)
            .await?;
        info!("Registered {} as {}", username, role);

        Ok(match role {
            UserRole::Tutor => RegistrationOutcome::TutorPendingApproval {
                username: username.to_string(),
                notice: "Registration successful! Your tutor application is pending admin approval."
                    .to_string(),
            },
            _ => RegistrationOutcome::Student {
                username: username.to_string(),
                notice: format!("Registration successful! Welcome {}!", username),
            },
        })
    }

    pub fn logout(&self) -> Result<String> {
        let previous = self.store.get();
        self.store.clear()?;

        Ok(match previous.username() {
            Some(username) => {
                info!("Logged out {}", username);
                format!("Goodbye {}! You have been logged out.", username)
            }
            None => "You have been logged out.".to_string(),
        })
    }

    /// Re-derive a logged-in tutor's approval from the application lists.
    /// Returns the status now stored, or `None` for non-tutor sessions.
    pub async fn refresh_approval_status(&self) -> Result<Option<ApprovalStatus>> {
        let session = self.store.get();
        let Some(user) = session.user().filter(|u| u.role == UserRole::Tutor) else {
            return Ok(None);
        };

        let mut found = None;
        for status in [
            ApprovalStatus::Approved,
            ApprovalStatus::Rejected,
            ApprovalStatus::Pending,
        ] {
            let tutors = self.api.tutors(status).await?;
            if tutors.iter().any(|t| t.username == user.username) {
                found = Some(status);
                break;
            }
        }

        let Some(status) = found else {
            return Ok(user.approval);
        };
        if self.store.update_approval(Some(status))? {
            info!("Approval for {} is now {}", user.username, status);
        }
        Ok(Some(status))
    }

    pub async fn check_backend(&self) -> Result<()> {
        self.api
            .ping()
            .await
            .inspect_err(|e| warn!("Backend server is not reachable: {}", e))
    }
}

fn validate_credentials(username: &str, password: &str) -> Result<()> {
    if username.trim().is_empty() {
        return Err(ClientError::validation(
            Field::Username,
            "Please enter a username",
        ));
    }
    if password.trim().is_empty() {
        return Err(ClientError::validation(
            Field::Password,
            "Please enter a password",
        ));
    }
    Ok(())
}

fn validate_role(role: Option<UserRole>) -> Result<UserRole> {
    match role {
        None => Err(ClientError::validation(
            Field::UserType,
            "Please select a user type",
        )),
        Some(UserRole::Admin) => Err(ClientError::validation(
            Field::UserType,
            "Admin accounts cannot be created from the registration form",
        )),
        Some(role) => Ok(role),
    }
}

fn validate_tutor_profile(profile: Option<&TutorProfile>) -> Result<&TutorProfile> {
    let Some(profile) = profile else {
        return Err(ClientError::validation(
            Field::FullName,
            "Please enter your full name",
        ));
    };

    if profile.full_name.trim().is_empty() {
        return Err(ClientError::validation(
            Field::FullName,
            "Please enter your full name",
        ));
    }
    let email = profile.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ClientError::validation(
            Field::Email,
            "Please enter a valid email address",
        ));
    }
    if profile.qualification.trim().is_empty() {
        return Err(ClientError::validation(
            Field::Qualification,
            "Please enter your qualification",
        ));
    }
    if profile.years_of_experience.is_none() {
        return Err(ClientError::validation(
            Field::Experience,
            "Please enter your years of experience",
        ));
    }
    Ok(profile)
}
