//! Pure Yew view components for the CP Mentor UI.
//!
//! This module contains stateless components and render helpers shared by the
//! pages: navigation chrome, stat cards, tables and form fields.

use crate::hooks::ValidatedField;
use crate::utils::verdict_class;
use crate::Page;
use cp_mentor::{Submission, TopicAccuracy};
use yew::prelude::*;

/// (target page, material icon, label, short label). `None` marks a link with no view yet.
const NAV_ITEMS: &[(Option<Page>, &str, &str, &str)] = &[
    (Some(Page::Dashboard), "dashboard", "Dashboard", "Dashboard"),
    (Some(Page::PersonalizedSheet), "description", "Personalized Sheet", "Sheet"),
    (Some(Page::PersonalizedContest), "emoji_events", "Personalized Contest", "Contest"),
    (None, "public", "Global Contest", "Global"),
    (Some(Page::UpcomingContests), "calendar_month", "Upcoming Contest", "Upcoming"),
];

fn icon(name: &'static str) -> Html {
    html! { <span class="material-symbols-outlined">{ name }</span> }
}

/// Sidebar, content area and bottom navigation around a page.
#[derive(Properties, PartialEq)]
pub struct AppShellProps {
    pub active: Page,
    pub on_navigate: Callback<Page>,
    pub name: AttrValue,
    pub subtitle: AttrValue,
    #[prop_or_default]
    pub children: Html,
}

#[function_component(AppShell)]
pub fn app_shell(props: &AppShellProps) -> Html {
    let nav_entry = |short: bool| {
        NAV_ITEMS
            .iter()
            .map(|&(target, icon_name, label, short_label)| {
                let text = if short { short_label } else { label };
                match target {
                    Some(page) => {
                        let class = classes!("nav-item", (page == props.active).then_some("active"));
                        let on_navigate = props.on_navigate.clone();
                        html! {
                            <button {class} type="button" onclick={move |_| on_navigate.emit(page)}>
                                { icon(icon_name) }
                                <span>{ text }</span>
                            </button>
                        }
                    }
                    None => html! {
                        <a class="nav-item" href="#">
                            { icon(icon_name) }
                            <span>{ text }</span>
                        </a>
                    },
                }
            })
            .collect::<Html>()
    };

    html! {
        <div class="app-shell">
            <aside class="sidebar">
                <div class="brand">
                    { icon("terminal") }
                    <h1>{ "CP Tracker" }</h1>
                </div>
                <nav class="sidebar-nav">{ nav_entry(false) }</nav>
                <div class="profile-chip">
                    <p class="profile-name">{ props.name.clone() }</p>
                    <p class="profile-subtitle">{ props.subtitle.clone() }</p>
                </div>
            </aside>
            <div class="page-content">
                { props.children.clone() }
            </div>
            <nav class="bottom-nav">{ nav_entry(true) }</nav>
        </div>
    }
}

/// One number on the dashboard's stats row.
#[derive(Properties, PartialEq)]
pub struct StatCardProps {
    pub label: AttrValue,
    pub value: AttrValue,
    #[prop_or_default]
    pub hint: Html,
    #[prop_or_default]
    pub value_class: Classes,
}

#[function_component(StatCard)]
pub fn stat_card(props: &StatCardProps) -> Html {
    html! {
        <div class="stat-card">
            <span class="stat-label">{ props.label.clone() }</span>
            <span class={classes!("stat-value", props.value_class.clone())}>{ props.value.clone() }</span>
            { props.hint.clone() }
        </div>
    }
}

/// Horizontal bar of `pct` percent.
pub fn render_bar(class: &'static str, pct: f64) -> Html {
    html! {
        <div class="bar-track">
            <div class={class} style={format!("width: {}%", pct)}></div>
        </div>
    }
}

/// Renders the per-topic accuracy bars.
pub fn render_topic_accuracy(rows: &[TopicAccuracy]) -> Html {
    html! {
        <div class="card topic-accuracy">
            { rows.iter().map(|row| html! {
                <div class="accuracy-row" key={row.topic.clone()}>
                    <div class="accuracy-head">
                        <span class="accuracy-topic">{ row.topic.clone() }</span>
                        <span class="accuracy-value">{ format!("{}%", row.value) }</span>
                    </div>
                    { render_bar("bar-fill", row.value.clamp(0.0, 100.0)) }
                </div>
            }).collect::<Html>() }
        </div>
    }
}

/// Renders the recent submissions table. `on_view` receives the submission URL.
pub fn render_submissions(rows: &[Submission], on_view: &Callback<String>) -> Html {
    html! {
        <div class="card table-card">
            <table class="submissions">
                <thead>
                    <tr>
                        <th>{ "Problem Name" }</th>
                        <th>{ "Topic" }</th>
                        <th>{ "Verdict" }</th>
                        <th class="center">{ "View" }</th>
                        <th class="right">{ "Time" }</th>
                    </tr>
                </thead>
                <tbody>
                    { rows.iter().map(|row| render_submission_row(row, on_view)).collect::<Html>() }
                </tbody>
            </table>
        </div>
    }
}

fn render_submission_row(row: &Submission, on_view: &Callback<String>) -> Html {
    let url = row.view_url.clone().filter(|u| !u.is_empty());
    let onclick = {
        let on_view = on_view.clone();
        let url = url.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(url) = &url {
                on_view.emit(url.clone());
            }
        })
    };

    html! {
        <tr key={format!("{}-{}", row.name, row.time)}>
            <td class="strong">{ row.name.clone() }</td>
            <td class="muted">{ row.topic.clone() }</td>
            <td><span class={verdict_class(&row.tone)}>{ row.verdict.clone() }</span></td>
            <td class="center">
                <button class="view-button" type="button" disabled={url.is_none()} {onclick}>
                    { "View" }
                </button>
            </td>
            <td class="right muted">{ row.time.clone() }</td>
        </tr>
    }
}

/// Inline error line; renders nothing when there is no message.
pub fn render_error(message: Option<&str>) -> Html {
    match message {
        Some(msg) if !msg.is_empty() => html! { <p class="error-line">{ msg.to_string() }</p> },
        _ => html! {},
    }
}

/// Labelled input bound to a [`ValidatedField`].
pub fn render_field(
    label: &'static str,
    icon_name: &'static str,
    input_type: &'static str,
    placeholder: &'static str,
    field: &ValidatedField,
) -> Html {
    html! {
        <div class="form-group">
            <label>{ label }</label>
            <div class="input-with-icon">
                { icon(icon_name) }
                <input
                    type={input_type}
                    placeholder={placeholder}
                    value={field.text.clone()}
                    oninput={field.on_input.clone()}
                    onchange={field.on_commit.clone()}
                />
            </div>
            { render_error(field.error.as_deref()) }
        </div>
    }
}
