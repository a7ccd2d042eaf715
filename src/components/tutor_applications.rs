use leptos::prelude::*;

use crate::models::{ApprovalStatus, User};
use crate::services::TutorApplications;

/// The three application lists with the moves each status allows.
#[component]
pub fn TutorApplicationsView(
    applications: TutorApplications,
    #[prop(into)] on_approve: Callback<String>,
    #[prop(into)] on_reject: Callback<String>,
) -> impl IntoView {
    view! {
        <div class="tutor-applications">
            <ApplicationList
                title="Pending"
                status=ApprovalStatus::Pending
                tutors=applications.pending
                on_approve=on_approve
                on_reject=on_reject
            />
            <ApplicationList
                title="Approved"
                status=ApprovalStatus::Approved
                tutors=applications.approved
                on_approve=on_approve
                on_reject=on_reject
            />
            <ApplicationList
                title="Rejected"
                status=ApprovalStatus::Rejected
                tutors=applications.rejected
                on_approve=on_approve
                on_reject=on_reject
            />
        </div>
    }
}

#[component]
fn ApplicationList(
    title: &'static str,
    status: ApprovalStatus,
    tutors: Vec<User>,
    on_approve: Callback<String>,
    on_reject: Callback<String>,
) -> impl IntoView {
    let can_approve = status.can_transition_to(ApprovalStatus::Approved);
    let can_reject = status.can_transition_to(ApprovalStatus::Rejected);

    view! {
        <section class=format!("application-list status-{}", status)>
            <h4>{format!("{} ({})", title, tutors.len())}</h4>
            {if tutors.is_empty() {
                view! { <p class="empty">{format!("No {} applications.", status)}</p> }.into_any()
            } else {
                view! {
                    <ul>
                        {tutors
                            .into_iter()
                            .map(|tutor| {
                                let approve_name = tutor.username.clone();
                                let reject_name = tutor.username.clone();
                                view! {
                                    <li class="application">
                                        <div class="applicant">
                                            <strong>{tutor.display_name().to_string()}</strong>
                                            <span>{format!(" @{}", tutor.username)}</span>
                                            <div class="applicant-meta">
                                                {tutor.email.clone().unwrap_or_default()}
                                                {tutor.qualification.clone().map(|q| format!(" | {}", q))}
                                                {tutor.years_of_experience.map(|y| format!(" | {} years", y))}
                                            </div>
                                            <div class="applied">{format!("Applied {}", tutor.joined())}</div>
                                        </div>
                                        <div class="actions">
                                            {can_approve
                                                .then(|| {
                                                    view! {
                                                        <button
                                                            type="button"
                                                            class="btn btn-small btn-success"
                                                            on:click=move |_| on_approve.run(approve_name.clone())
                                                        >
                                                            "Approve"
                                                        </button>
                                                    }
                                                })}
                                            {can_reject
                                                .then(|| {
                                                    view! {
                                                        <button
                                                            type="button"
                                                            class="btn btn-small btn-danger"
                                                            on:click=move |_| on_reject.run(reject_name.clone())
                                                        >
                                                            "Reject"
                                                        </button>
                                                    }
                                                })}
                                        </div>
                                    </li>
                                }
                            })
                            .collect_view()}
                    </ul>
                }
                .into_any()
            }}
        </section>
    }
}
