//! Sign-in, session and health profile

use crate::{App, ProfileArgs, ProfileCommand};
use anyhow::Result;
use healthwatch_api_client::endpoints::{AuthSession, HealthProfile, LoginRequest, RegisterRequest};
use healthwatch_api_client::ApiError;
use healthwatch_cli::output::Status;
use healthwatch_cli::progress;
use healthwatch_state::Action;
use tracing::warn;

pub async fn login(app: &mut App, email: String, password: String) -> Result<()> {
    let spinner = progress::spinner_unless(app.json, "Signing in...");
    let session = app.client.auth().login(&LoginRequest { email, password }).await;
    spinner.finish_and_clear();
    start_session(app, session?)
}

pub async fn register(app: &mut App, name: String, email: String, password: String) -> Result<()> {
    let spinner = progress::spinner_unless(app.json, "Creating account...");
    let request = RegisterRequest {
        name,
        email,
        password,
    };
    let session = app.client.auth().register(&request).await;
    spinner.finish_and_clear();
    start_session(app, session?)
}

fn start_session(app: &mut App, session: AuthSession) -> Result<()> {
    let AuthSession { token, user } = session;
    app.store.dispatch(Action::LoggedIn {
        token,
        user: user.clone(),
    })?;

    if app.json {
        return app.print_json(&user);
    }
    Status::success(&format!("Signed in as {} <{}>", user.name, user.email));
    Ok(())
}

pub fn logout(app: &mut App) -> Result<()> {
    let was_signed_in = app.store.state().is_authenticated;
    app.client.auth().logout();
    app.store.dispatch(Action::LoggedOut)?;
    if was_signed_in {
        Status::success("Signed out");
    } else {
        Status::info("Not signed in");
    }
    Ok(())
}

pub async fn whoami(app: &mut App) -> Result<()> {
    if !app.store.state().is_authenticated {
        return Err(ApiError::NotAuthenticated.into());
    }

    match app.client.auth().me().await {
        Ok(user) => {
            app.store.dispatch(Action::UserUpdated(user))?;
        }
        Err(e) if e.is_unauthorized() => {
            // Token expired or revoked
            app.store.dispatch(Action::LoggedOut)?;
            return Err(e.into());
        }
        Err(e) => warn!(error = %e, "Could not refresh user, showing saved copy"),
    }

    let user = app.store.state().user.as_ref();
    if app.json {
        return app.print_json(&user);
    }
    match user {
        Some(user) => {
            Status::field("name", &user.name);
            Status::field("email", &user.email);
            Status::field("id", &user.id);
            if let Some(role) = &user.role {
                Status::field("role", role);
            }
        }
        None => Status::info("Signed in, but the account details are not available offline"),
    }
    Ok(())
}

pub async fn profile(app: &mut App, cmd: ProfileCommand) -> Result<()> {
    match cmd {
        ProfileCommand::Show => {
            let spinner = progress::spinner_unless(app.json, "Loading profile...");
            let fetched = app.client.profile().get().await;
            spinner.finish_and_clear();

            match fetched {
                Ok(profile) => {
                    app.store.dispatch(Action::HealthProfileUpdated(profile))?;
                }
                Err(e) if e.is_backend_failure() && app.store.state().health_profile.is_some() => {
                    Status::warning("Offline, showing the last saved profile");
                }
                Err(e) => return Err(e.into()),
            }
        }
        ProfileCommand::Set(args) => {
            let mut profile = app.store.state().health_profile.clone().unwrap_or_default();
            apply_profile(&args, &mut profile);

            let spinner = progress::spinner_unless(app.json, "Saving profile...");
            let saved = app.client.profile().update(&profile).await;
            spinner.finish_and_clear();

            app.store.dispatch(Action::HealthProfileUpdated(saved?))?;
            if !app.json {
                Status::success("Profile updated");
            }
        }
    }

    let profile = app.store.state().health_profile.as_ref();
    if app.json {
        return app.print_json(&profile);
    }
    if let Some(profile) = profile {
        print_profile(profile);
    }
    Ok(())
}

/// Flags replace scalar fields; list flags replace the whole list
fn apply_profile(args: &ProfileArgs, profile: &mut HealthProfile) {
    if args.age.is_some() {
        profile.age = args.age;
    }
    if args.gender.is_some() {
        profile.gender.clone_from(&args.gender);
    }
    if args.weight.is_some() {
        profile.weight = args.weight;
    }
    if args.height.is_some() {
        profile.height = args.height;
    }
    if let Some(blood_type) = &args.blood_type {
        profile.blood_type = Some(blood_type.trim().to_ascii_uppercase());
    }
    if !args.allergies.is_empty() {
        profile.allergies.clone_from(&args.allergies);
    }
    if !args.chronic_conditions.is_empty() {
        profile.chronic_conditions.clone_from(&args.chronic_conditions);
    }
    if !args.medications.is_empty() {
        profile.medications.clone_from(&args.medications);
    }
}

fn print_profile(profile: &HealthProfile) {
    fn show<T: ToString>(label: &str, value: Option<T>) {
        Status::field(label, &value.map_or_else(|| "-".to_string(), |v| v.to_string()));
    }

    Status::header("Health profile");
    show("age", profile.age);
    show("gender", profile.gender.as_deref());
    show("weight (kg)", profile.weight);
    show("height (cm)", profile.height);
    show("BMI", profile.bmi().map(|bmi| format!("{bmi:.1}")));
    show("blood type", profile.blood_type.as_deref());
    for (label, items) in [
        ("allergies", &profile.allergies),
        ("conditions", &profile.chronic_conditions),
        ("medications", &profile.medications),
    ] {
        show(label, (!items.is_empty()).then(|| items.join(", ")));
    }
    if let Some(contact) = &profile.emergency_contact {
        Status::field("emergency contact", &format!("{} ({})", contact.name, contact.phone));
    }
}
