//! Server-rendered pages.
//!
//! Every page is static markup: a shared layout, some fixed text and links,
//! and, for the login pages, exactly one `login_form`.

mod form;

pub use self::form::{FORM_SCRIPT, SEND_OTP_ACTION, VERIFY_OTP_ACTION, login_form};

use crate::portal::Portal;

const STYLE: &str = r"<style>
body { margin: 0; font-family: Arial, Helvetica, sans-serif; background: #f4f5f7; color: #1f2933; }
main { max-width: 420px; margin: 64px auto; background: #fff; border-radius: 8px; padding: 32px; }
h1 { margin-top: 0; }
.tagline { color: #52606d; }
.login-form label { display: block; margin-bottom: 8px; font-weight: 600; }
.login-form input[type=text] { width: 100%; box-sizing: border-box; padding: 10px; font-size: 18px; letter-spacing: 3px; }
.actions { display: flex; gap: 8px; margin-top: 16px; }
.actions button { flex: 1; padding: 10px; }
.status { min-height: 1em; color: #52606d; }
nav a { margin-right: 12px; }
</style>";

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} | Hostel</title>
    {STYLE}
</head>
<body>
<main>
{body}
</main>
</body>
</html>"#
    )
}

fn tagline(portal: Portal) -> &'static str {
    match portal {
        Portal::Hosteller => "Residents sign in here to view rooms, dues and notices.",
        Portal::Warden => "Wardens sign in here to manage rooms, residents and approvals.",
    }
}

/// A portal login page: heading, tagline, the login form and links.
#[must_use]
pub fn login_page(portal: Portal) -> String {
    let title = format!("{} Login", portal.title());
    let other = portal.other();
    let body = format!(
        r#"<h1>{title}</h1>
<p class="tagline">{tagline}</p>
<p>Request a one-time password; it is sent to the hostel admin, who will share it with you.</p>
{form}
<nav>
    <a href="{other_path}">{other_title} login</a>
    <a href="/">Home</a>
</nav>
{FORM_SCRIPT}"#,
        tagline = tagline(portal),
        form = login_form(portal),
        other_path = other.login_path(),
        other_title = other.title(),
    );

    layout(&title, &body)
}

#[must_use]
pub fn hosteller_login() -> String {
    login_page(Portal::Hosteller)
}

#[must_use]
pub fn warden_login() -> String {
    login_page(Portal::Warden)
}

/// Landing page linking both portals.
#[must_use]
pub fn index() -> String {
    let links = Portal::ALL
        .iter()
        .map(|portal| {
            format!(
                r#"    <li><a href="{}">{} login</a></li>"#,
                portal.login_path(),
                portal.title()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    layout(
        "Welcome",
        &format!("<h1>Hostel Management</h1>\n<p class=\"tagline\">Choose your portal.</p>\n<ul>\n{links}\n</ul>"),
    )
}
