use crate::components::{render_error, render_field};
use crate::config::CODEFORCES_LOGIN_URL;
use crate::hooks::use_validated_field;
use crate::utils::{validate_email, validate_handle, validate_password, validate_username};
use cp_mentor::api::{post_json, Login, LoginBody, Signup, SignupBody};
use cp_mentor::AuthenticatedUser;
use log::{info, warn};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct AuthPageProps {
    /// Receives the user the backend returned, if any.
    pub on_auth: Callback<Option<AuthenticatedUser>>,
    /// Switch to the other auth form.
    pub on_switch: Callback<()>,
}

fn render_submit(label: &'static str, busy_label: &'static str, submitting: bool) -> Html {
    html! {
        <button class="primary-button" type="submit" disabled={submitting}>
            { if submitting { busy_label } else { label } }
        </button>
    }
}

#[function_component(SignUpPage)]
pub fn sign_up_page(props: &AuthPageProps) -> Html {
    let username = use_validated_field(validate_username);
    let email = use_validated_field(validate_email);
    let password = use_validated_field(validate_password);
    let handle = use_validated_field(validate_handle);
    let submitting = use_state(|| false);
    let error_message = use_state(|| None::<String>);

    let onsubmit = {
        let fields = (username.clone(), email.clone(), password.clone(), handle.clone());
        let submitting = submitting.clone();
        let error_message = error_message.clone();
        let on_auth = props.on_auth.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if *submitting {
                return;
            }
            let (username, email, password, handle) = &fields;
            // Check every field so all errors show at once
            let checked = (username.check(), email.check(), password.check(), handle.check());
            let (Some(username), Some(email), Some(password), Some(codeforces_id)) = checked else {
                return;
            };

            let body = SignupBody {
                username,
                email,
                password,
                codeforces_id,
            };
            submitting.set(true);
            error_message.set(None);

            let submitting = submitting.clone();
            let error_message = error_message.clone();
            let on_auth = on_auth.clone();
            spawn_local(async move {
                let outcome = post_json::<Signup>(&body, None).await;
                submitting.set(false);
                match outcome {
                    Ok(resp) => {
                        info!("signed up {}", body.username);
                        on_auth.emit(resp.and_then(|r| r.user));
                    }
                    Err(err) => {
                        warn!("signup failed: {}", err);
                        error_message.set(Some(err.to_string()));
                    }
                }
            });
        })
    };

    let on_switch = {
        let on_switch = props.on_switch.clone();
        Callback::from(move |_: MouseEvent| on_switch.emit(()))
    };

    html! {
        <div class="auth-page">
            <div class="auth-card">
                <h2>{ "Create your account" }</h2>
                <p class="muted">{ "Track your Codeforces progress and practice your weakest topics." }</p>
                <form {onsubmit} novalidate=true>
                    { render_field("Username", "person", "text", "tourist", &username) }
                    { render_field("Email", "mail", "email", "you@example.com", &email) }
                    { render_field("Password", "lock", "password", "Choose a password", &password) }
                    { render_field("Codeforces Handle", "code", "text", "Your Codeforces handle", &handle) }
                    <p class="hint">
                        { "Don't have one? " }
                        <a href={CODEFORCES_LOGIN_URL} target="_blank" rel="noopener noreferrer">
                            { "Create a Codeforces account" }
                        </a>
                    </p>
                    { render_error(error_message.as_deref()) }
                    { render_submit("Sign Up", "Signing up...", *submitting) }
                </form>
                <p class="switch-line">
                    { "Already have an account? " }
                    <button class="link-button" type="button" onclick={on_switch}>{ "Log in" }</button>
                </p>
            </div>
        </div>
    }
}

#[function_component(LoginPage)]
pub fn login_page(props: &AuthPageProps) -> Html {
    let email = use_validated_field(validate_email);
    let password = use_validated_field(validate_password);
    let submitting = use_state(|| false);
    let error_message = use_state(|| None::<String>);

    let onsubmit = {
        let fields = (email.clone(), password.clone());
        let submitting = submitting.clone();
        let error_message = error_message.clone();
        let on_auth = props.on_auth.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if *submitting {
                return;
            }
            let (email, password) = &fields;
            let (Some(email), Some(password)) = (email.check(), password.check()) else {
                return;
            };

            let body = LoginBody { email, password };
            submitting.set(true);
            error_message.set(None);

            let submitting = submitting.clone();
            let error_message = error_message.clone();
            let on_auth = on_auth.clone();
            spawn_local(async move {
                let outcome = post_json::<Login>(&body, None).await;
                submitting.set(false);
                match outcome {
                    Ok(resp) => on_auth.emit(resp.and_then(|r| r.user)),
                    Err(err) => {
                        warn!("login failed: {}", err);
                        error_message.set(Some(err.to_string()));
                    }
                }
            });
        })
    };

    let on_switch = {
        let on_switch = props.on_switch.clone();
        Callback::from(move |_: MouseEvent| on_switch.emit(()))
    };

    html! {
        <div class="auth-page">
            <div class="auth-card">
                <h2>{ "Welcome back" }</h2>
                <p class="muted">{ "Log in to continue your practice." }</p>
                <form {onsubmit} novalidate=true>
                    { render_field("Email", "mail", "email", "you@example.com", &email) }
                    { render_field("Password", "lock", "password", "Your password", &password) }
                    { render_error(error_message.as_deref()) }
                    { render_submit("Log In", "Logging in...", *submitting) }
                </form>
                <p class="switch-line">
                    { "New here? " }
                    <button class="link-button" type="button" onclick={on_switch}>{ "Create an account" }</button>
                </p>
            </div>
        </div>
    }
}
