use leptos::prelude::*;

use crate::models::{User, UserRole};
use crate::services::{CourseDetails, UserDetails};

#[component]
pub fn UserTable(
    users: Vec<User>,
    /// The logged-in admin, who gets no delete button
    admin: String,
    #[prop(into)] on_view: Callback<String>,
    #[prop(into)] on_delete: Callback<String>,
) -> impl IntoView {
    view! {
        <table class="user-table">
            <thead>
                <tr>
                    <th>"Username"</th>
                    <th>"Role"</th>
                    <th>"Joined"</th>
                    <th>"Actions"</th>
                </tr>
            </thead>
            <tbody>
                {users
                    .into_iter()
                    .map(|user| {
                        let view_name = user.username.clone();
                        let delete_name = user.username.clone();
                        let is_self = user.username == admin;
                        view! {
                            <tr>
                                <td>{user.display_name().to_string()}</td>
                                <td>
                                    <span class=format!("role-badge role-{}", user.role)>
                                        {user.role.title()}
                                    </span>
                                </td>
                                <td>{user.joined()}</td>
                                <td class="actions">
                                    <button
                                        type="button"
                                        class="btn btn-small"
                                        on:click=move |_| on_view.run(view_name.clone())
                                    >
                                        "View"
                                    </button>
                                    {(!is_self)
                                        .then(|| {
                                            view! {
                                                <button
                                                    type="button"
                                                    class="btn btn-small btn-danger"
                                                    on:click=move |_| on_delete.run(delete_name.clone())
                                                >
                                                    "Delete"
                                                </button>
                                            }
                                        })}
                                </td>
                            </tr>
                        }
                    })
                    .collect_view()}
            </tbody>
        </table>
    }
}

#[component]
pub fn UserDetailsPanel(
    details: UserDetails,
    #[prop(into)] on_course: Callback<String>,
    #[prop(into)] on_close: Callback<()>,
) -> impl IntoView {
    let user = details.user().clone();
    let header = format!("{} ({})", user.display_name(), user.role.title());

    let body = match details {
        UserDetails::Admin { .. } => view! {
            <p>"Administrator account."</p>
        }
        .into_any(),
        UserDetails::Student { enrollments, .. } => view! {
            <h4>{format!("Enrolled courses ({})", enrollments.len())}</h4>
            <ul class="detail-list">
                {enrollments
                    .into_iter()
                    .map(|e| {
                        let course_id = e.course_id.clone();
                        view! {
                            <li>
                                <button type="button" class="link" on:click=move |_| on_course.run(course_id.clone())>
                                    {e.title.clone()}
                                </button>
                                {format!(" {} | {} | By: {}", e.subject, e.grade, e.tutor)}
                                <div class="ratings">{e.ratings_display()}</div>
                                <div class="average">{format!("Average: {}", e.average_display())}</div>
                            </li>
                        }
                    })
                    .collect_view()}
            </ul>
        }
        .into_any(),
        UserDetails::Tutor {
            user,
            courses,
            question_count,
            question_downloads,
        } => view! {
            <p>{format!("Email: {}", user.email.clone().unwrap_or_else(|| "Not provided".to_string()))}</p>
            <p>{format!("Qualification: {}", user.qualification.clone().unwrap_or_else(|| "Not provided".to_string()))}</p>
            <p>
                {format!(
                    "Experience: {}",
                    user.years_of_experience
                        .map(|y| format!("{} years", y))
                        .unwrap_or_else(|| "Not provided".to_string())
                )}
            </p>
            <p>
                {format!(
                    "Application: {}",
                    user.approval_status.map(|s| s.to_string()).unwrap_or_else(|| "unknown".to_string())
                )}
            </p>
            <p>{format!("Questions uploaded: {} ({} downloads)", question_count, question_downloads)}</p>
            <h4>{format!("Courses ({})", courses.len())}</h4>
            <ul class="detail-list">
                {courses
                    .into_iter()
                    .map(|c| {
                        let course_id = c.course_id.clone();
                        view! {
                            <li>
                                <button type="button" class="link" on:click=move |_| on_course.run(course_id.clone())>
                                    {c.title.clone()}
                                </button>
                                {format!(
                                    " {} | {} | {} enrolled | {:.1}★ ({} ratings)",
                                    c.subject, c.grade, c.enrolled, c.average, c.rating_count
                                )}
                            </li>
                        }
                    })
                    .collect_view()}
            </ul>
        }
        .into_any(),
    };

    view! {
        <section class="details-panel">
            <header>
                <h3>{header}</h3>
                <p class="joined">{format!("Joined {}", user.joined())}</p>
                <button type="button" class="modal-close" aria-label="Close" on:click=move |_| on_close.run(())>
                    "×"
                </button>
            </header>
            {body}
        </section>
    }
}

#[component]
pub fn CourseDetailsPanel(details: CourseDetails, #[prop(into)] on_close: Callback<()>) -> impl IntoView {
    view! {
        <section class="details-panel">
            <header>
                <h3>{details.title}</h3>
                <p>{format!("{} | {} | By: {} | Created {}", details.subject, details.grade, details.tutor, details.created)}</p>
                <button type="button" class="modal-close" aria-label="Close" on:click=move |_| on_close.run(())>
                    "×"
                </button>
            </header>
            <h4>{format!("Enrolled students ({})", details.students.len())}</h4>
            <table class="user-table">
                <thead>
                    <tr>
                        <th>"Student"</th>
                        <th>"Ratings"</th>
                        <th>"Average"</th>
                    </tr>
                </thead>
                <tbody>
                    {details
                        .students
                        .into_iter()
                        .map(|s| {
                            view! {
                                <tr>
                                    <td>{s.username.clone()}</td>
                                    <td class="pre-line">{s.ratings_display()}</td>
                                    <td>{s.average_display()}</td>
                                </tr>
                            }
                        })
                        .collect_view()}
                </tbody>
            </table>
        </section>
    }
}

/// Role filter for the user list; `None` shows everyone.
pub fn role_matches(user: &User, role: Option<UserRole>) -> bool {
    role.map_or(true, |r| user.role == r)
}
