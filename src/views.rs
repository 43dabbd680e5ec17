//! Server-rendered HTML pages.

use std::borrow::Cow;
use std::fmt::Write;

use crate::auth::session::Flash;
use crate::profile::dto::Profile;

pub fn register_page(flashes: &[Flash]) -> String {
    layout(
        "Register",
        flashes,
        r#"<h1>Register</h1>
<form method="post" action="/register">
  <label>Username <input type="text" name="username"></label>
  <label>Email <input type="email" name="email"></label>
  <label>Password <input type="password" name="password"></label>
  <button type="submit">Register</button>
</form>
<p>Already have an account? <a href="/login">Log in</a></p>"#,
    )
}

pub fn login_page(flashes: &[Flash]) -> String {
    layout(
        "Login",
        flashes,
        r#"<h1>Login</h1>
<form method="post" action="/login">
  <label>Email <input type="email" name="email"></label>
  <label>Password <input type="password" name="password"></label>
  <button type="submit">Log in</button>
</form>
<p>No account yet? <a href="/register">Register</a></p>"#,
    )
}

pub fn profile_page(flashes: &[Flash], profile: &Profile) -> String {
    let picture = escape(profile.picture());
    let body = format!(
        r#"<h1>{username}</h1>
<img src="/{picture}" alt="Profile picture" width="150">
<dl>
  <dt>Username</dt><dd>{username}</dd>
  <dt>Email</dt><dd>{email}</dd>
  <dt>Name</dt><dd>{name}</dd>
  <dt>Age</dt><dd>{age}</dd>
  <dt>Bio</dt><dd>{bio}</dd>
</dl>
<form method="post" action="/profile" enctype="multipart/form-data">
  <label>Name <input type="text" name="name" value="{name}"></label>
  <label>Age <input type="text" name="age" value="{age}"></label>
  <label>Bio <textarea name="bio">{bio}</textarea></label>
  <label>Picture <input type="file" name="profile_picture" accept="image/*"></label>
  <button type="submit">Save</button>
</form>
<p><a href="/logout">Log out</a></p>"#,
        username = escape(&profile.username),
        email = escape(&profile.email),
        name = escape(profile.name.as_deref().unwrap_or_default()),
        age = escape(profile.age.as_deref().unwrap_or_default()),
        bio = escape(profile.bio.as_deref().unwrap_or_default()),
        picture = picture,
    );
    layout("Profile", flashes, &body)
}

fn layout(title: &str, flashes: &[Flash], body: &str) -> String {
    let mut html = String::with_capacity(body.len() + 512);
    html.push_str("<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{}</title>", escape(title));
    html.push_str("</head>\n<body>\n");
    if !flashes.is_empty() {
        html.push_str("<ul class=\"flashes\">\n");
        for flash in flashes {
            let _ = writeln!(
                html,
                "<li class=\"{}\">{}</li>",
                flash.category.as_str(),
                escape(&flash.message)
            );
        }
        html.push_str("</ul>\n");
    }
    html.push_str(body);
    html.push_str("\n</body>\n</html>\n");
    html
}

/// Escapes text for use in HTML element content and quoted attribute values.
pub fn escape(input: &str) -> Cow<'_, str> {
    if !input.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(input);
    }
    let mut out = String::with_capacity(input.len() + 16);
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}
