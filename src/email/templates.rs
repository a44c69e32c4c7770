use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::reset::TOKEN_TTL_SECS;

fn greeting(name: &str) -> &str {
    if name.trim().is_empty() { "there" } else { name }
}

pub fn password_reset_text(name: &str, reset_url: &str) -> String {
    let minutes = TOKEN_TTL_SECS / 60;
    format!(
        "Hi {},\n\n\
         Someone asked to reset the password of your Forge Gym account.\n\
         Open this link to choose a new one:\n\n\
         {reset_url}\n\n\
         The link expires in {minutes} minutes. If you did not ask for this, ignore this email.\n",
        greeting(name)
    )
}

pub fn password_reset_html(name: &str, reset_url: &str) -> String {
    let name = encode_text(greeting(name));
    let href = encode_double_quoted_attribute(reset_url);
    let minutes = TOKEN_TTL_SECS / 60;
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: sans-serif; max-width: 560px; margin: 0 auto; padding: 24px; color: #1d1d1f;">
    <h2 style="color: #e63946;">Forge Gym</h2>
    <p>Hi {name},</p>
    <p>Someone asked to reset the password of your Forge Gym account.</p>
    <p><a href="{href}" style="display: inline-block; padding: 10px 20px; background: #e63946; color: #fff; text-decoration: none; border-radius: 4px;">Choose a new password</a></p>
    <p style="color: #6b6b70; font-size: 14px;">The link expires in {minutes} minutes. If you did not ask for this, ignore this email.</p>
</body>
</html>"#
    )
}
