//! Main module for the CP Mentor client using Yew.
//! Holds session state (signed-in user, current page, per-user cache) and routes between pages.

use cp_mentor::cache::{CacheAction, SessionCache};
use cp_mentor::{AuthenticatedUser, DashboardSnapshot, RecommendationSheet};
use log::info;
use std::rc::Rc;
use yew::prelude::*;

mod auth;
mod components;
mod config;
mod contest;
mod dashboard;
mod hooks;
mod logger;
mod placeholder;
mod sheet;
mod utils;

use auth::{LoginPage, SignUpPage};
use contest::{PersonalizedContestPage, UpcomingContestsPage};
use dashboard::DashboardPage;
use sheet::PersonalizedSheetPage;

/// Top-level views. There is no URL routing; the current page lives in `App` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    SignUp,
    LogIn,
    Dashboard,
    PersonalizedSheet,
    PersonalizedContest,
    UpcomingContests,
}

#[function_component]
pub fn App() -> Html {
    let page = use_state(|| Page::SignUp);
    let auth_user = use_state(|| None::<AuthenticatedUser>);
    let cache = use_reducer(SessionCache::default);

    let handle = auth_user
        .as_ref()
        .and_then(|u| u.handle())
        .map(str::to_owned);

    let record_authenticated_user = {
        let page = page.clone();
        let auth_user = auth_user.clone();
        Callback::from(move |user: Option<AuthenticatedUser>| {
            info!(
                "signed in as {}",
                user.as_ref().map(|u| u.username.as_str()).unwrap_or("<unknown>")
            );
            auth_user.set(user);
            page.set(Page::Dashboard);
        })
    };

    let navigate = {
        let page = page.clone();
        Callback::from(move |target: Page| page.set(target))
    };

    let store_dashboard = {
        let cache = cache.dispatcher();
        let handle = handle.clone();
        Callback::from(move |payload: Rc<DashboardSnapshot>| {
            cache.dispatch(CacheAction::StoreDashboard(payload, handle.clone()))
        })
    };
    let store_sheet = {
        let cache = cache.dispatcher();
        let handle = handle.clone();
        Callback::from(move |payload: Rc<RecommendationSheet>| {
            cache.dispatch(CacheAction::StoreSheet(payload, handle.clone()))
        })
    };

    let user = (*auth_user).clone();
    let name = user
        .as_ref()
        .map(|u| u.username.clone())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "user".to_string());
    let subtitle = handle.clone().unwrap_or_else(|| "Not linked".to_string());

    match *page {
        Page::SignUp => {
            let page = page.clone();
            html! {
                <SignUpPage
                    on_auth={record_authenticated_user}
                    on_switch={Callback::from(move |_: ()| page.set(Page::LogIn))}
                />
            }
        }
        Page::LogIn => {
            let page = page.clone();
            html! {
                <LoginPage
                    on_auth={record_authenticated_user}
                    on_switch={Callback::from(move |_: ()| page.set(Page::SignUp))}
                />
            }
        }
        Page::Dashboard => html! {
            <DashboardPage
                {user}
                cached={handle.as_deref().and_then(|id| cache.dashboards.read(id))}
                on_data={store_dashboard}
                on_navigate={navigate}
            />
        },
        Page::PersonalizedSheet => html! {
            <PersonalizedSheetPage
                {user}
                cached={handle.as_deref().and_then(|id| cache.sheets.read(id))}
                on_data={store_sheet}
                on_navigate={navigate}
            />
        },
        Page::PersonalizedContest => html! {
            <PersonalizedContestPage {name} {subtitle} on_navigate={navigate} />
        },
        Page::UpcomingContests => html! {
            <UpcomingContestsPage {name} {subtitle} on_navigate={navigate} />
        },
    }
}

/// Entry point: installs the panic hook and logger, then renders the App component.
fn main() {
    console_error_panic_hook::set_once();
    logger::init();
    yew::Renderer::<App>::new().render();
}
