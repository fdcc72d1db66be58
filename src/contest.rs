//! Views backed only by placeholder data.

use crate::components::AppShell;
use crate::placeholder::{ContestProblem, UpcomingContest, PLACEHOLDER};
use crate::utils::Difficulty;
use crate::Page;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct StaticPageProps {
    pub name: AttrValue,
    pub subtitle: AttrValue,
    pub on_navigate: Callback<Page>,
}

fn difficulty_class(label: &str) -> &'static str {
    match label {
        "Easy" => Difficulty::Easy.class(),
        "Medium" => Difficulty::Medium.class(),
        "Hard" => Difficulty::Hard.class(),
        _ => Difficulty::Unrated.class(),
    }
}

fn status_icon(status: &str) -> &'static str {
    match status {
        "Solved" => "check_circle",
        "Attempted" => "pending",
        _ => "play_arrow",
    }
}

fn render_contest_problem(index: usize, problem: &ContestProblem) -> Html {
    let letter = char::from(b'A' + (index % 26) as u8);
    html! {
        <div class="card contest-problem" key={problem.title.clone()}>
            <span class="problem-letter">{ letter.to_string() }</span>
            <div class="problem-body">
                <h4>{ problem.title.clone() }</h4>
                <div class="problem-meta">
                    <span class={difficulty_class(&problem.difficulty)}>{ problem.difficulty.clone() }</span>
                    <span class="muted">{ format!("- {}", problem.topic) }</span>
                </div>
            </div>
            <div class="problem-status">
                <span class="material-symbols-outlined">{ status_icon(&problem.status) }</span>
                <span>{ problem.status.clone() }</span>
            </div>
            <span class="points">{ format!("{} PTS", problem.points) }</span>
            <button class="secondary-button" type="button">{ problem.action.clone() }</button>
        </div>
    }
}

#[function_component(PersonalizedContestPage)]
pub fn personalized_contest_page(props: &StaticPageProps) -> Html {
    let contest = &PLACEHOLDER.contest;
    let solved = contest
        .problems
        .iter()
        .filter(|p| p.status == "Solved")
        .count();

    html! {
        <AppShell
            active={Page::PersonalizedContest}
            on_navigate={props.on_navigate.clone()}
            name={props.name.clone()}
            subtitle={props.subtitle.clone()}
        >
            <header class="page-header">
                <h2>{ "Personalized Contest" }</h2>
                <span class="live-badge">{ "Live" }</span>
            </header>
            <div class="card timer-card">
                <p class="muted">{ "Contest Time Remaining" }</p>
                <p class="timer">{ contest.time_remaining.clone() }</p>
                <button class="danger-button" type="button">
                    <span class="material-symbols-outlined">{ "stop" }</span>
                    <span>{ "End Contest" }</span>
                </button>
            </div>
            <section>
                <div class="section-head">
                    <h3>{ "Problems" }</h3>
                    <span class="muted">
                        { format!("{}/{} Solved", solved, contest.problems.len()) }
                    </span>
                </div>
                { contest.problems.iter().enumerate()
                    .map(|(i, p)| render_contest_problem(i, p))
                    .collect::<Html>() }
            </section>
        </AppShell>
    }
}

fn render_upcoming(contest: &UpcomingContest) -> Html {
    html! {
        <div class="card upcoming-card" key={contest.title.clone()}>
            <div class="upcoming-head">
                <span class="platform">{ contest.platform.clone() }</span>
                <span class="tag">{ contest.tag.clone() }</span>
            </div>
            <h4>{ contest.title.clone() }</h4>
            <p class="accent">{ contest.starts_in.clone() }</p>
            <div class="upcoming-meta">
                <span>
                    <span class="material-symbols-outlined">{ "calendar_today" }</span>
                    { contest.date.clone() }
                </span>
                <span>
                    <span class="material-symbols-outlined">{ "schedule" }</span>
                    { contest.duration.clone() }
                </span>
            </div>
            <button class="primary-button" type="button">
                <span class="material-symbols-outlined">{ "calendar_add_on" }</span>
                <span>{ contest.action.clone() }</span>
            </button>
        </div>
    }
}

#[function_component(UpcomingContestsPage)]
pub fn upcoming_contests_page(props: &StaticPageProps) -> Html {
    let upcoming = &PLACEHOLDER.upcoming;

    html! {
        <AppShell
            active={Page::UpcomingContests}
            on_navigate={props.on_navigate.clone()}
            name={props.name.clone()}
            subtitle={props.subtitle.clone()}
        >
            <header class="page-header">
                <div>
                    <h2>{ "Upcoming Contests" }</h2>
                    <p class="muted">{ "Stay updated with future CP rounds" }</p>
                </div>
            </header>
            <section>
                <div class="section-head">
                    <h3>{ "Upcoming List" }</h3>
                    <span class="muted">{ format!("{} Total", upcoming.len()) }</span>
                </div>
                <div class="upcoming-grid">
                    { upcoming.iter().map(render_upcoming).collect::<Html>() }
                </div>
            </section>
        </AppShell>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contest_badges_follow_labels() {
        assert_eq!(difficulty_class("Hard"), "badge badge-hard");
        assert_eq!(difficulty_class("Impossible"), "badge badge-unrated");
        assert_eq!(status_icon("Solved"), "check_circle");
        assert_eq!(status_icon("Not Attempted"), "play_arrow");
    }
}
