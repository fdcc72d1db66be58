use crate::components::{render_bar, AppShell};
use crate::hooks::{use_remote, FetchOptions};
use crate::utils::{format_success_rate, weakness_bar_pct, Difficulty};
use crate::Page;
use cp_mentor::api::WeakTopics;
use cp_mentor::controller::TopicExpansion;
use cp_mentor::export::{export_sheet, format_topic_label, rating_cell};
use cp_mentor::{AuthenticatedUser, RecommendationSheet, RecommendedProblem, TopicRecommendation};
use std::rc::Rc;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct SheetProps {
    pub user: Option<AuthenticatedUser>,
    /// Session cache entry for the user's handle.
    pub cached: Option<Rc<RecommendationSheet>>,
    pub on_data: Callback<Rc<RecommendationSheet>>,
    pub on_navigate: Callback<Page>,
}

enum ExpansionAction {
    Seed(Vec<String>),
    Toggle(String),
}

/// Open/closed topic cards, as a Yew reducer.
#[derive(Clone, Default, PartialEq)]
struct OpenTopics(TopicExpansion);

impl Reducible for OpenTopics {
    type Action = ExpansionAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            ExpansionAction::Seed(topics) => next.0.seed(topics.iter().map(String::as_str)),
            ExpansionAction::Toggle(topic) => next.0.toggle(&topic),
        }
        Rc::new(next)
    }
}

/// Progress bar width for the "Suggested Problems" header.
fn progress_pct(total: usize) -> f64 {
    (total as f64 * 4.0).min(100.0)
}

fn render_problem(problem: &RecommendedProblem) -> Html {
    let difficulty = Difficulty::from_rating(problem.problem_rating);
    html! {
        <li class="problem-row" key={problem.problem_key.clone()}>
            <div>
                <a href={problem.cf_link.clone()} target="_blank" rel="noopener noreferrer">
                    { problem.problem_name.clone() }
                </a>
                <div class="problem-meta">
                    <span class={difficulty.class()}>{ difficulty.label() }</span>
                    <span class="muted">{ format!("#{}", problem.problem_key) }</span>
                    <span class="muted">{ format!("Rating {}", rating_cell(problem)) }</span>
                </div>
            </div>
            <span class="success-rate">{ format_success_rate(problem.success_rate) }</span>
        </li>
    }
}

fn render_topic(
    topic: &TopicRecommendation,
    expanded: bool,
    on_toggle: &Callback<String>,
) -> Html {
    let onclick = {
        let on_toggle = on_toggle.clone();
        let name = topic.topic.clone();
        Callback::from(move |_: MouseEvent| on_toggle.emit(name.clone()))
    };

    html! {
        <div class="card topic-card" key={topic.topic.clone()}>
            <button class="topic-header" type="button" {onclick}>
                <div class="topic-title">
                    <h3>{ format_topic_label(&topic.topic) }</h3>
                    { render_bar("bar-fill-weak", weakness_bar_pct(topic.weakness_score)) }
                    <span class="muted">
                        { format!("{}/{} Solved", topic.solved_unique, topic.attempted_unique) }
                    </span>
                </div>
                <span class="muted">{ format!("Weakness {}", topic.weakness_score) }</span>
                <span class="material-symbols-outlined">
                    { if expanded { "expand_less" } else { "expand_more" } }
                </span>
            </button>
            if expanded {
                <ul class="problem-list">
                    { topic.problems.iter().map(render_problem).collect::<Html>() }
                </ul>
            }
        </div>
    }
}

fn notice(text: String, class: &'static str) -> Html {
    html! { <div class={classes!("card", "notice", class)}>{ text }</div> }
}

#[function_component(PersonalizedSheetPage)]
pub fn personalized_sheet_page(props: &SheetProps) -> Html {
    let handle = props
        .user
        .as_ref()
        .and_then(|u| u.handle())
        .map(str::to_owned);
    let remote =
        use_remote::<WeakTopics>(handle.clone(), props.cached.clone(), props.on_data.clone());
    let open_topics = use_reducer_eq(OpenTopics::default);

    let topic_names: Vec<String> = remote
        .data
        .as_ref()
        .map(|sheet| sheet.recommendations.iter().map(|t| t.topic.clone()).collect())
        .unwrap_or_default();

    // Open the first card the first time topics arrive
    {
        let open_topics = open_topics.dispatcher();
        use_effect_with(topic_names, move |names| {
            if !names.is_empty() {
                open_topics.dispatch(ExpansionAction::Seed(names.clone()));
            }
            || ()
        });
    }

    let on_toggle = {
        let open_topics = open_topics.dispatcher();
        Callback::from(move |topic: String| open_topics.dispatch(ExpansionAction::Toggle(topic)))
    };
    let on_update = {
        let refresh = remote.refresh.clone();
        Callback::from(move |_: MouseEvent| refresh.emit(FetchOptions::forced()))
    };
    let on_export = {
        let sheet = remote.data.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(sheet) = &sheet {
                export_sheet(sheet);
            }
        })
    };

    let sheet = remote.data.as_deref();
    let topics = sheet.map(|s| s.recommendations.as_slice()).unwrap_or_default();
    let total = sheet.map(RecommendationSheet::total_problems).unwrap_or(0);
    let cluster = sheet
        .and_then(|s| s.cluster.clone())
        .unwrap_or_else(|| "-".to_string());
    let show_topics = !remote.loading && remote.error.is_none();

    let user_name = props
        .user
        .as_ref()
        .map(|u| u.username.clone())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "user".to_string());

    html! {
        <AppShell
            active={Page::PersonalizedSheet}
            on_navigate={props.on_navigate.clone()}
            name={user_name}
            subtitle={handle.clone().unwrap_or_else(|| "Not linked".to_string())}
        >
            <header class="page-header">
                <h2>{ "Personalized Sheet" }</h2>
                <div class="header-actions">
                    <button
                        class="secondary-button"
                        type="button"
                        disabled={remote.loading || handle.is_none()}
                        onclick={on_update}
                    >
                        { if remote.loading { "Updating..." } else { "Update" } }
                    </button>
                    <button
                        class="primary-button"
                        type="button"
                        disabled={remote.loading || topics.is_empty()}
                        onclick={on_export}
                    >
                        <span class="material-symbols-outlined">{ "download" }</span>
                        <span>{ "Export" }</span>
                    </button>
                </div>
            </header>

            <div class="card progress-card">
                <div class="progress-head">
                    <div>
                        <p class="muted">{ "Overall Progress" }</p>
                        <p class="progress-total">
                            { total.to_string() }
                            <span class="muted">{ " Suggested Problems" }</span>
                        </p>
                    </div>
                    <div class="cluster">
                        <span class="muted">{ "Cluster " }</span>
                        <span class="accent">{ cluster }</span>
                    </div>
                </div>
                { render_bar("bar-fill", progress_pct(total)) }
            </div>

            <div class="topic-list">
                if handle.is_none() {
                    { notice(
                        "Log in with a Codeforces-linked account to generate your personalized sheet.".to_string(),
                        "notice-info",
                    ) }
                }
                if remote.loading {
                    { notice("Generating recommendations...".to_string(), "notice-info") }
                }
                if let Some(err) = remote.error.clone() {
                    { notice(err, "notice-error") }
                }
                if show_topics && handle.is_some() && topics.is_empty() {
                    { notice("No recommendations found for this user yet.".to_string(), "notice-info") }
                }
                if show_topics {
                    { topics.iter()
                        .map(|t| render_topic(t, open_topics.0.is_expanded(&t.topic), &on_toggle))
                        .collect::<Html>() }
                }
            </div>
        </AppShell>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn seeding_opens_only_the_first_topic_once() {
        let state = Rc::new(OpenTopics::default());
        let state = state.reduce(ExpansionAction::Seed(names(&["dp", "graphs"])));
        assert!(state.0.is_expanded("dp"));
        assert!(!state.0.is_expanded("graphs"));

        let state = state.reduce(ExpansionAction::Toggle("dp".into()));
        let state = state.reduce(ExpansionAction::Seed(names(&["graphs", "dp"])));
        assert!(!state.0.is_expanded("dp"));
        assert!(!state.0.is_expanded("graphs"));
    }

    #[test]
    fn progress_bar_saturates() {
        assert_eq!(progress_pct(5), 20.0);
        assert_eq!(progress_pct(40), 100.0);
    }
}
