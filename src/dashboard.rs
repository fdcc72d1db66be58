use crate::components::{
    render_bar, render_error, render_submissions, render_topic_accuracy, AppShell, StatCard,
};
use crate::config::{AUTO_SYNC_INTERVAL_MS, SUBMISSION_WINDOW_FEATURES, SUBMISSION_WINDOW_NAME};
use crate::hooks::{use_remote, FetchOptions};
use crate::placeholder::PLACEHOLDER;
use crate::utils::{format_last_synced, format_rating_delta, rating_bar_pct};
use crate::Page;
use cp_mentor::api::Dashboard;
use cp_mentor::{AuthenticatedUser, DashboardSnapshot};
use gloo_timers::callback::Interval;
use gloo_utils::window;
use log::warn;
use std::rc::Rc;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct DashboardProps {
    pub user: Option<AuthenticatedUser>,
    /// Session cache entry for the user's handle.
    pub cached: Option<Rc<DashboardSnapshot>>,
    pub on_data: Callback<Rc<DashboardSnapshot>>,
    pub on_navigate: Callback<Page>,
}

fn open_submission_popup(url: String) {
    if url.is_empty() {
        return;
    }
    if let Err(err) = window().open_with_url_and_target_and_features(
        &url,
        SUBMISSION_WINDOW_NAME,
        SUBMISSION_WINDOW_FEATURES,
    ) {
        warn!("could not open submission window: {:?}", err);
    }
}

#[function_component(DashboardPage)]
pub fn dashboard_page(props: &DashboardProps) -> Html {
    let handle = props
        .user
        .as_ref()
        .and_then(|u| u.handle())
        .map(str::to_owned);
    let remote = use_remote::<Dashboard>(handle.clone(), props.cached.clone(), props.on_data.clone());

    // Quiet refresh while the page stays open
    {
        let refresh = remote.refresh.clone();
        use_effect_with(handle.clone(), move |handle| {
            let timer = handle.is_some().then(|| {
                Interval::new(AUTO_SYNC_INTERVAL_MS, move || {
                    refresh.emit(FetchOptions::silent())
                })
            });
            move || drop(timer)
        });
    }

    let snapshot = remote.data.as_deref();
    let display_name = snapshot
        .and_then(|s| s.username.clone())
        .filter(|name| !name.is_empty())
        .or_else(|| props.user.as_ref().map(|u| u.username.clone()))
        .filter(|name| !name.is_empty());
    let rank = snapshot
        .and_then(|s| s.rank.clone())
        .unwrap_or_else(|| "unrated".to_string());

    let stat = |pick: fn(&DashboardSnapshot) -> Option<i64>| snapshot.and_then(pick).unwrap_or(0);
    let current_rating = stat(|s| s.current_rating);
    let rating_delta = stat(|s| s.rating_delta);
    let max_rank = snapshot
        .and_then(|s| s.max_rank.clone())
        .unwrap_or_else(|| "unrated".to_string());

    let topic_rows = match snapshot {
        Some(s) if !s.topic_accuracy.is_empty() => s.topic_accuracy.as_slice(),
        _ => PLACEHOLDER.topic_accuracy.as_slice(),
    };
    let submission_rows = match snapshot {
        Some(s) if !s.recent_submissions.is_empty() => s.recent_submissions.as_slice(),
        _ => PLACEHOLDER.recent_submissions.as_slice(),
    };

    let sync_disabled = remote.loading || handle.is_none();
    let on_sync = {
        let refresh = remote.refresh.clone();
        Callback::from(move |_: MouseEvent| refresh.emit(FetchOptions::foreground()))
    };
    let on_view = Callback::from(open_submission_popup);
    let delta_class = if rating_delta >= 0 { "delta-up" } else { "delta-down" };

    html! {
        <AppShell
            active={Page::Dashboard}
            on_navigate={props.on_navigate.clone()}
            name={display_name.clone().unwrap_or_else(|| "user".to_string())}
            subtitle={rank}
        >
            <header class="page-header">
                <div>
                    <h2>
                        { "Welcome back, " }
                        <span class="accent">{ display_name.unwrap_or_else(|| "coder".to_string()) }</span>
                    </h2>
                    <p class="muted">
                        { format!("Last synced: {}", format_last_synced(snapshot.and_then(|s| s.last_synced))) }
                    </p>
                </div>
                <button class="primary-button" type="button" disabled={sync_disabled} onclick={on_sync}>
                    { if remote.loading { "Syncing..." } else { "Sync Profile" } }
                </button>
            </header>

            if remote.loading {
                <p class="muted">{ "Loading latest Codeforces data..." }</p>
            }
            { render_error(remote.error.as_deref()) }

            <section>
                <h3>{ "Codeforces Stats" }</h3>
                <div class="stats-grid">
                    <StatCard
                        label="Current Rating"
                        value={current_rating.to_string()}
                        value_class={classes!("accent-purple")}
                        hint={html! {
                            <>
                                <span class={delta_class}>{ format_rating_delta(rating_delta) }</span>
                                { render_bar("bar-fill-purple", rating_bar_pct(current_rating)) }
                            </>
                        }}
                    />
                    <StatCard
                        label="Max Rating"
                        value={stat(|s| s.max_rating).to_string()}
                        hint={html! { <span class="muted">{ format!("{} peak", max_rank) }</span> }}
                    />
                    <StatCard
                        label="Friend Of"
                        value={stat(|s| s.friend_of_count).to_string()}
                        hint={html! {
                            <span class="muted">{ format!("Contribution: {}", stat(|s| s.contribution)) }</span>
                        }}
                    />
                    <StatCard label="Problems Solved" value={stat(|s| s.problems_solved).to_string()} />
                </div>
            </section>

            <div class="dashboard-columns">
                <section>
                    <h3>{ "Topic Accuracy" }</h3>
                    { render_topic_accuracy(topic_rows) }
                </section>
                <section>
                    <h3>{ "Recent Submissions" }</h3>
                    { render_submissions(submission_rows, &on_view) }
                </section>
            </div>
        </AppShell>
    }
}
