//! Server-rendered HTML for the landing page and the role dashboards.
//!
//! Pure functions from view data to markup; every interpolated value goes through
//! `escape`.

use crate::models::{
    ApplicationSummary, Course, HeroSectionResponse, InstructorDashboard, LearnerDashboard,
    SuperAdminDashboard,
};

/// Message shown in place of a dashboard whose data could not be loaded.
pub const INLINE_ERROR_MESSAGE: &str = "Something went wrong while loading this page. Please try again later.";

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{} | Course Portal</title>\n</head>\n<body>\n<main>\n{}\n</main>\n</body>\n</html>\n",
        escape(title),
        body
    )
}

fn price(value: f64) -> String {
    format!("{:.2}", value)
}

fn course_cards(courses: &[Course], empty: &str) -> String {
    if courses.is_empty() {
        return format!("<p class=\"empty\">{}</p>", escape(empty));
    }
    let items: String = courses
        .iter()
        .map(|c| {
            let starts = c
                .start_date
                .map(|d| format!("<span class=\"starts\">Starts {}</span>", d.format("%Y-%m-%d")))
                .unwrap_or_default();
            format!(
                "<li class=\"course\" data-course-id=\"{}\"><h3>{}</h3><span class=\"price\">{}</span>{}<span class=\"status\">{}</span></li>",
                c.id,
                escape(&c.title),
                price(c.price),
                starts,
                escape(&c.status),
            )
        })
        .collect();
    format!("<ul class=\"courses\">{}</ul>", items)
}

fn application_rows(applications: &[ApplicationSummary], empty: &str) -> String {
    if applications.is_empty() {
        return format!("<p class=\"empty\">{}</p>", escape(empty));
    }
    let rows: String = applications
        .iter()
        .map(|a| {
            format!(
                "<tr data-application-id=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                a.id,
                escape(&a.full_name),
                escape(&a.email),
                escape(&a.course_title),
                price(a.price),
                escape(&a.status),
            )
        })
        .collect();
    format!(
        "<table class=\"applications\"><thead><tr><th>Name</th><th>Email</th><th>Course</th><th>Price</th><th>Status</th></tr></thead><tbody>{}</tbody></table>",
        rows
    )
}

pub fn landing_page(hero: &HeroSectionResponse) -> String {
    let body = format!(
        "<h1>Course Portal</h1>\n<section id=\"upcoming\"><h2>Starting soon</h2>{}</section>\n<section id=\"latest\"><h2>Latest courses</h2>{}</section>",
        course_cards(&hero.upcoming_courses, "No upcoming courses yet."),
        course_cards(&hero.courses, "No courses published yet."),
    );
    layout("Home", &body)
}

pub fn learner_dashboard(data: &LearnerDashboard) -> String {
    let body = format!(
        "<h1 id=\"learner-dashboard\">My learning</h1>\n<p class=\"viewer\">Signed in as {}</p>\n<section><h2>My applications</h2>{}</section>",
        escape(&data.viewer_email),
        application_rows(&data.applications, "You have not applied to any course yet."),
    );
    layout("Learner dashboard", &body)
}

pub fn instructor_dashboard(data: &InstructorDashboard) -> String {
    let body = format!(
        "<h1 id=\"instructor-dashboard\">My courses</h1>\n<p class=\"viewer\">Signed in as {}</p>\n<section>{}</section>",
        escape(&data.viewer_email),
        course_cards(&data.courses, "You have not created any course yet."),
    );
    layout("Instructor dashboard", &body)
}

pub fn super_admin_dashboard(data: &SuperAdminDashboard) -> String {
    let body = format!(
        "<h1 id=\"super-admin-dashboard\">Administration</h1>\n<section id=\"pending-applications\"><h2>Applications awaiting review</h2>{}</section>\n<section id=\"pending-courses\"><h2>Courses awaiting approval</h2>{}</section>",
        application_rows(&data.pending_applications, "No applications awaiting review."),
        course_cards(&data.pending_courses, "No courses awaiting approval."),
    );
    layout("Super-admin dashboard", &body)
}

pub fn inline_error(title: &str) -> String {
    layout(
        title,
        &format!("<div class=\"error\" role=\"alert\">{}</div>", INLINE_ERROR_MESSAGE),
    )
}
