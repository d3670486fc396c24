//! Account-lifecycle messages
//!
//! The transactional mails PebbleNotes sends around sign-up: address
//! verification, password reset, and the post-verification welcome.
//! Each builder returns a ready-to-send [`Mail`] with a plain-text
//! body and a lightweight HTML alternative.

use crate::message::Mail;

fn display_name(name: Option<&str>) -> &str {
    name.unwrap_or("there")
}

/// Address-verification message. `link` expires server-side after
/// 24 hours.
#[must_use]
pub fn verification(to: &str, name: Option<&str>, link: &str) -> Mail {
    let name = display_name(name);
    let text = format!(
        "Hi {name},\n\n\
         Please verify your PebbleNotes account by clicking the link below:\n\
         {link}\n\n\
         This link expires in 24 hours.\n\n\
         If you did not create this account, please ignore this email.\n\n\
         Best regards,\n\
         PebbleNotes Team"
    );
    let html = format!(
        "<h2>Verify Your PebbleNotes Account</h2>\
         <p>Hi <strong>{name}</strong>,</p>\
         <p>Welcome to PebbleNotes! Please verify your email address to \
         complete your registration.</p>\
         <p><a href=\"{link}\">Verify Email Address</a></p>\
         <p>This link expires in 24 hours. If it expires, you can request \
         a new one from the Sign In page.</p>"
    );
    Mail::new(to, "Verify Your PebbleNotes Account", text).with_html(html)
}

/// Password-reset message. `link` expires server-side after 1 hour.
#[must_use]
pub fn password_reset(to: &str, name: Option<&str>, link: &str) -> Mail {
    let name = display_name(name);
    let text = format!(
        "Hi {name},\n\n\
         You requested a password reset for your PebbleNotes account.\n\n\
         Click the link below to reset your password:\n\
         {link}\n\n\
         This link expires in 1 hour. If you did not request this, please \
         ignore this email.\n\n\
         Best regards,\n\
         PebbleNotes Team"
    );
    let html = format!(
        "<h2>Reset Your PebbleNotes Password</h2>\
         <p>Hi <strong>{name}</strong>,</p>\
         <p>We received a request to reset the password for your account.</p>\
         <p><a href=\"{link}\">Reset Password</a></p>\
         <p>This link expires in 1 hour. If you did not request this, you \
         can ignore this email and your account will remain secure.</p>"
    );
    Mail::new(to, "Reset Your PebbleNotes Password", text).with_html(html)
}

/// Welcome message, sent after the address is verified.
#[must_use]
pub fn welcome(to: &str, name: Option<&str>) -> Mail {
    let name = display_name(name);
    let text = format!(
        "Hi {name},\n\n\
         Welcome to PebbleNotes! Your account is now fully verified and \
         ready to use.\n\n\
         You can now:\n\
         - Browse and search notes\n\
         - Save notes to favorites\n\
         - Purchase premium notes\n\
         - Review and rate notes from other users\n\n\
         Start exploring quality study notes today!\n\n\
         Best regards,\n\
         PebbleNotes Team"
    );
    let html = format!(
        "<h2>Welcome to PebbleNotes!</h2>\
         <p>Hi <strong>{name}</strong>,</p>\
         <p>Your email has been verified! Your account is now fully \
         activated and ready to use.</p>\
         <ul>\
         <li>Browse and search high-quality study notes</li>\
         <li>Save notes to your favorites</li>\
         <li>Purchase premium notes and materials</li>\
         <li>Review and rate notes from other users</li>\
         </ul>"
    );
    Mail::new(to, "Welcome to PebbleNotes!", text).with_html(html)
}
