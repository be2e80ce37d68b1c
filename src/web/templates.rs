//! HTML pages.
//!
//! Every interpolated value goes through [`escape`]; nothing else writes
//! user-controlled text into a page.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use super::forms::{AccountPasswordUpdateForm, SnippetCreateForm, UserLoginForm, UserSignupForm};
use super::helpers::TemplateData;
use crate::models::{Snippet, User};
use crate::validator::Validator;

/// Escapes text for use in element content and quoted attribute values.
pub(crate) fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn human_date(t: DateTime<Utc>) -> String {
    t.format("%d %b %Y at %H:%M").to_string()
}

fn layout(title: &str, data: &TemplateData, main: &str) -> String {
    let nav = if data.is_authenticated {
        r#"<a href="/snippet/create">Create snippet</a>
            <a href="/account/view">Account</a>
            <form action="/user/logout" method="POST"><button>Logout</button></form>"#
    } else {
        r#"<a href="/user/signup">Signup</a>
            <a href="/user/login">Login</a>"#
    };
    let flash = data
        .flash
        .as_deref()
        .map(|f| format!(r#"<div class="flash">{}</div>"#, escape(f)))
        .unwrap_or_default();

    format!(
        r#"<!doctype html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>{title} - Snippetbox</title>
    <link rel="stylesheet" href="/static/css/main.css">
    <link rel="shortcut icon" href="/static/img/favicon.ico" type="image/x-icon">
</head>
<body>
    <header><h1><a href="/">Snippetbox</a></h1></header>
    <nav>
        <div><a href="/">Home</a> <a href="/about">About</a></div>
        <div>{nav}</div>
    </nav>
    <main>
        {flash}
        {main}
    </main>
    <footer>Powered by Rust in {year}</footer>
</body>
</html>"#,
        title = escape(title),
        year = data.current_year,
    )
}

fn field_error(v: &Validator, key: &str) -> String {
    v.field_error(key)
        .map(|e| format!(r#"<label class="error">{}</label>"#, escape(e)))
        .unwrap_or_default()
}

fn non_field_errors(v: &Validator) -> String {
    v.non_field_errors
        .iter()
        .map(|e| format!(r#"<div class="error">{}</div>"#, escape(e)))
        .collect()
}

pub(crate) fn home(data: &TemplateData, snippets: &[Snippet]) -> String {
    let main = if snippets.is_empty() {
        "<h2>Latest Snippets</h2>\n<p>There's nothing to see here... yet!</p>".to_owned()
    } else {
        let mut rows = String::new();
        for s in snippets {
            let _ = write!(
                rows,
                r#"<tr><td><a href="/snippet/view/{id}">{title}</a></td><td>{created}</td><td>#{id}</td></tr>"#,
                id = s.id,
                title = escape(&s.title),
                created = human_date(s.created),
            );
        }
        format!(
            "<h2>Latest Snippets</h2>\n<table>\n<tr><th>Title</th><th>Created</th><th>ID</th></tr>\n{rows}\n</table>"
        )
    };
    layout("Home", data, &main)
}

pub(crate) fn about(data: &TemplateData) -> String {
    layout(
        "About",
        data,
        "<h2>About</h2>\n<p>Snippetbox is a place to paste and share text snippets, like a pastebin.</p>",
    )
}

pub(crate) fn snippet_view(data: &TemplateData, s: &Snippet) -> String {
    let main = format!(
        r#"<div class="snippet">
    <div class="metadata"><strong>{title}</strong><span>#{id}</span></div>
    <pre><code>{content}</code></pre>
    <div class="metadata">
        <time>Created: {created}</time>
        <time>Expires: {expires}</time>
    </div>
</div>"#,
        id = s.id,
        title = escape(&s.title),
        content = escape(&s.content),
        created = human_date(s.created),
        expires = human_date(s.expires),
    );
    layout(&format!("Snippet #{}", s.id), data, &main)
}

pub(crate) fn snippet_create(data: &TemplateData, form: &SnippetCreateForm) -> String {
    let checked = |days: i64| if form.expires == days { " checked" } else { "" };
    let main = format!(
        r#"<form action="/snippet/create" method="POST">
    <div>
        <label>Title:</label>
        {title_error}
        <input type="text" name="title" value="{title}">
    </div>
    <div>
        <label>Content:</label>
        {content_error}
        <textarea name="content">{content}</textarea>
    </div>
    <div>
        <label>Delete in:</label>
        {expires_error}
        <input type="radio" name="expires" value="365"{y}> One Year
        <input type="radio" name="expires" value="7"{w}> One Week
        <input type="radio" name="expires" value="1"{d}> One Day
    </div>
    <div><input type="submit" value="Publish snippet"></div>
</form>"#,
        title_error = field_error(&form.validator, "title"),
        title = escape(&form.title),
        content_error = field_error(&form.validator, "content"),
        content = escape(&form.content),
        expires_error = field_error(&form.validator, "expires"),
        y = checked(365),
        w = checked(7),
        d = checked(1),
    );
    layout("Create a New Snippet", data, &main)
}

pub(crate) fn signup(data: &TemplateData, form: &UserSignupForm) -> String {
    let main = format!(
        r#"<form action="/user/signup" method="POST" novalidate>
    <div>
        <label>Name:</label>
        {name_error}
        <input type="text" name="name" value="{name}">
    </div>
    <div>
        <label>Email:</label>
        {email_error}
        <input type="email" name="email" value="{email}">
    </div>
    <div>
        <label>Password:</label>
        {password_error}
        <input type="password" name="password">
    </div>
    <div><input type="submit" value="Signup"></div>
</form>"#,
        name_error = field_error(&form.validator, "name"),
        name = escape(&form.name),
        email_error = field_error(&form.validator, "email"),
        email = escape(&form.email),
        password_error = field_error(&form.validator, "password"),
    );
    layout("Signup", data, &main)
}

pub(crate) fn login(data: &TemplateData, form: &UserLoginForm) -> String {
    let main = format!(
        r#"<form action="/user/login" method="POST" novalidate>
    {errors}
    <div>
        <label>Email:</label>
        {email_error}
        <input type="email" name="email" value="{email}">
    </div>
    <div>
        <label>Password:</label>
        {password_error}
        <input type="password" name="password">
    </div>
    <div><input type="submit" value="Login"></div>
</form>"#,
        errors = non_field_errors(&form.validator),
        email_error = field_error(&form.validator, "email"),
        email = escape(&form.email),
        password_error = field_error(&form.validator, "password"),
    );
    layout("Login", data, &main)
}

pub(crate) fn account_view(data: &TemplateData, user: &User) -> String {
    let main = format!(
        r#"<h2>Your Account</h2>
<table>
    <tr><th>Name</th><td>{name}</td></tr>
    <tr><th>Email</th><td>{email}</td></tr>
    <tr><th>Joined</th><td>{joined}</td></tr>
    <tr><th>Password</th><td><a href="/account/password/update">Change password</a></td></tr>
</table>"#,
        name = escape(&user.name),
        email = escape(&user.email),
        joined = human_date(user.created),
    );
    layout("Your Account", data, &main)
}

pub(crate) fn password_update(data: &TemplateData, form: &AccountPasswordUpdateForm) -> String {
    let main = format!(
        r#"<h2>Change Password</h2>
<form action="/account/password/update" method="POST" novalidate>
    <div>
        <label>Current password:</label>
        {current_error}
        <input type="password" name="currentPassword">
    </div>
    <div>
        <label>New password:</label>
        {new_error}
        <input type="password" name="newPassword">
    </div>
    <div>
        <label>Confirm new password:</label>
        {confirm_error}
        <input type="password" name="newPasswordConfirmation">
    </div>
    <div><input type="submit" value="Change password"></div>
</form>"#,
        current_error = field_error(&form.validator, "currentPassword"),
        new_error = field_error(&form.validator, "newPassword"),
        confirm_error = field_error(&form.validator, "newPasswordConfirmation"),
    );
    layout("Change Password", data, &main)
}
