use crate::utils::FieldError;
use cp_mentor::api::{post_json, AbortHandle, UserEndpoint};
use cp_mentor::controller::{FetchController, FetchMode, SyncAction};
use cp_mentor::Keyed;
use log::warn;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

/// Signature shared by the form validators in `utils`.
pub type Validator = fn(&str) -> Result<String, FieldError>;

/// Holds the state and callbacks for a validated text field.
#[derive(Clone)]
pub struct ValidatedField {
    /// The current text content of the input field.
    pub text: String,
    /// An optional error message if validation failed.
    pub error: Option<String>,
    /// Callback for the input's `oninput` event. Updates the text state.
    pub on_input: Callback<InputEvent>,
    /// Callback for the input's `onchange` event. Validates what was typed.
    pub on_commit: Callback<Event>,
    validate: Validator,
    error_setter: UseStateHandle<Option<String>>,
}

impl ValidatedField {
    /// Validate the current text, showing or clearing the field's error.
    pub fn check(&self) -> Option<String> {
        match (self.validate)(&self.text) {
            Ok(value) => {
                self.error_setter.set(None);
                Some(value)
            }
            Err(err) => {
                self.error_setter.set(Some(err.to_string()));
                None
            }
        }
    }
}

/// Custom hook to manage state for a validated text field.
#[hook]
pub fn use_validated_field(validate: Validator) -> ValidatedField {
    let text_state_handle = use_state(String::new);
    let error_state_handle = use_state(|| None::<String>);

    let on_input = {
        let text_setter = text_state_handle.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            text_setter.set(input.value());
        })
    };

    let on_commit = {
        let error_setter = error_state_handle.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            error_setter.set(validate(&input.value()).err().map(|err| err.to_string()));
        })
    };

    ValidatedField {
        text: (*text_state_handle).clone(),
        error: (*error_state_handle).clone(),
        on_input,
        on_commit,
        validate,
        error_setter: error_state_handle,
    }
}

/// How a fetch should be issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub mode: FetchMode,
    /// Ask the backend to skip its own cache.
    pub force_refresh: bool,
}

impl FetchOptions {
    pub fn foreground() -> Self {
        Self {
            mode: FetchMode::Foreground,
            force_refresh: false,
        }
    }

    pub fn silent() -> Self {
        Self {
            mode: FetchMode::Silent,
            force_refresh: false,
        }
    }

    pub fn forced() -> Self {
        Self {
            mode: FetchMode::Foreground,
            force_refresh: true,
        }
    }
}

/// What a data-backed view renders from.
pub struct RemoteData<T> {
    pub data: Option<Rc<T>>,
    pub loading: bool,
    pub error: Option<String>,
    pub refresh: Callback<FetchOptions>,
}

/// Keep a view in sync with endpoint `E` for `user_id`.
///
/// A cached payload owned by `user_id` is shown without a request; otherwise a
/// foreground fetch starts. Successful payloads are handed to `on_data` so the session
/// cache can keep them. Whatever is still in flight is cancelled on unmount.
#[hook]
pub fn use_remote<E>(
    user_id: Option<String>,
    cached: Option<Rc<E::Payload>>,
    on_data: Callback<Rc<E::Payload>>,
) -> RemoteData<E::Payload>
where
    E: UserEndpoint + 'static,
    E::Body: 'static,
    E::Payload: Keyed + PartialEq + 'static,
{
    let controller = use_mut_ref(FetchController::<E::Payload>::new);
    let redraw = use_force_update();

    let refresh = {
        let controller = controller.clone();
        let redraw = redraw.clone();
        let user_id = user_id.clone();
        Callback::from(move |opts: FetchOptions| {
            let abort = match AbortHandle::new() {
                Ok(abort) => abort,
                Err(err) => {
                    warn!("cannot start {}: {}", E::PATH, err);
                    controller.borrow_mut().reject(opts.mode, &err);
                    redraw.force_update();
                    return;
                }
            };
            let Some(ticket) =
                controller
                    .borrow_mut()
                    .begin(user_id.as_deref(), opts.mode, Box::new(abort.clone()))
            else {
                return;
            };
            redraw.force_update();

            let body = E::body(ticket.user_id(), opts.force_refresh);
            let controller = controller.clone();
            let redraw = redraw.clone();
            let on_data = on_data.clone();
            spawn_local(async move {
                let outcome = post_json::<E>(&body, Some(&abort)).await;
                let written = controller.borrow_mut().settle(&ticket, outcome);
                if let Some(payload) = written {
                    on_data.emit(payload);
                }
                redraw.force_update();
            });
        })
    };

    // Re-evaluate whenever the user or the cache entry for them changes
    {
        let controller = controller.clone();
        let refresh = refresh.clone();
        let redraw = redraw.clone();
        use_effect_with((user_id.clone(), cached), move |(user_id, cached)| {
            let action = controller
                .borrow_mut()
                .sync(user_id.as_deref(), cached.clone());
            match action {
                SyncAction::Fetch => refresh.emit(FetchOptions::foreground()),
                SyncAction::Adopted => redraw.force_update(),
                SyncAction::Skipped => {}
            }
            || ()
        });
    }

    // Cancel whatever is in flight when the view goes away
    {
        let controller = controller.clone();
        use_effect_with((), move |_| move || controller.borrow_mut().teardown());
    }

    let (data, loading, error) = {
        let state = controller.borrow();
        (
            state.visible(user_id.as_deref()),
            state.is_loading(),
            state.error().map(str::to_owned),
        )
    };

    RemoteData {
        data,
        loading,
        error,
        refresh,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_update_action_forces_a_backend_refresh() {
        let forced = FetchOptions::forced();
        assert_eq!(forced.mode, FetchMode::Foreground);
        assert!(forced.force_refresh);

        let first_load = FetchOptions::foreground();
        assert_eq!(first_load.mode, FetchMode::Foreground);
        assert!(!first_load.force_refresh);

        let background = FetchOptions::silent();
        assert_eq!(background.mode, FetchMode::Silent);
        assert!(!background.force_refresh);
    }
}
