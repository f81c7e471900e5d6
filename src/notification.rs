//! Sends transactional emails over SMTP.
//!
//! Email is strictly best-effort: a failed send is logged and swallowed so
//! that signing up or requesting a password reset never fails because the
//! relay is down.

use lettre::{
    Message, SmtpTransport, Transport, message::Mailbox,
    transport::smtp::authentication::Credentials,
};

use crate::Error;

/// Sends welcome and password-reset emails through an SMTP relay.
#[derive(Clone)]
pub struct Mailer {
    transport: SmtpTransport,
    from: Mailbox,
}

impl Mailer {
    /// Create a mailer that connects to `relay` with the given credentials.
    ///
    /// `from` is the sender address, e.g. `"ProcVisual <no-reply@example.com>"`.
    ///
    /// # Errors
    /// Returns an [Error::EmailError] if `relay` cannot be resolved or `from`
    /// is not a valid mailbox.
    pub fn new(relay: &str, username: &str, password: &str, from: &str) -> Result<Self, Error> {
        let transport = SmtpTransport::relay(relay)
            .map_err(|error| Error::EmailError(error.to_string()))?
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .build();

        let from = from
            .parse()
            .map_err(|error: lettre::address::AddressError| Error::EmailError(error.to_string()))?;

        Ok(Self { transport, from })
    }

    /// Send the post-registration welcome email.
    pub fn send_welcome(&self, to: &str, name: &str) {
        self.send(
            to,
            "Welcome to ProcVisual",
            format!(
                "Hi {name},\n\n\
                Welcome to ProcVisual! Add your first transaction to start \
                tracking where your money goes.\n\n\
                The ProcVisual team"
            ),
        );
    }

    /// Send the password reset instructions email.
    pub fn send_password_reset_instructions(&self, to: &str, name: &str) {
        self.send(
            to,
            "Resetting your ProcVisual password",
            format!(
                "Hi {name},\n\n\
                We received a request to reset the password for this email \
                address. Reply to this email and an administrator will help \
                you regain access to your account.\n\n\
                If you did not request a password reset, you can ignore this \
                email.\n\n\
                The ProcVisual team"
            ),
        );
    }

    fn send(&self, to: &str, subject: &str, body: String) {
        let to = match to.parse::<Mailbox>() {
            Ok(mailbox) => mailbox,
            Err(error) => {
                tracing::warn!("Not sending \"{subject}\" email, invalid recipient: {error}");
                return;
            }
        };

        let message = match Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .body(body)
        {
            Ok(message) => message,
            Err(error) => {
                tracing::warn!("Could not build \"{subject}\" email: {error}");
                return;
            }
        };

        if let Err(error) = self.transport.send(&message) {
            tracing::warn!("Could not send \"{subject}\" email: {error}");
        }
    }
}
