//! Transactional email via AWS SES
//!
//! Callers treat sends as non-critical: when the primary write (license,
//! invoice) already succeeded, a failed mail is logged and swallowed.

use aws_sdk_sesv2::Client as SesClient;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

async fn send(ses: &SesClient, from: &str, to: &str, subject: &str, text: String) -> Result<(), BoxError> {
    let subject = Content::builder().data(subject).build()?;
    let body = Body::builder()
        .text(Content::builder().data(text).build()?)
        .build();
    let message = Message::builder().subject(subject).body(body).build();

    ses.send_email()
        .from_email_address(from)
        .destination(Destination::builder().to_addresses(to).build())
        .content(EmailContent::builder().simple(message).build())
        .send()
        .await?;
    Ok(())
}

/// License key after purchase; shadow accounts additionally get the
/// password-set link to claim their portal login.
pub async fn send_license_key(
    ses: &SesClient,
    from: &str,
    to: &str,
    license_key: &str,
    package: &str,
    password_set_url: Option<&str>,
) -> Result<(), BoxError> {
    let mut body_text = format!(
        "Vielen Dank für deinen Kauf von GermanFence ({package}).\n\
         Dein Lizenzschlüssel: {license_key}\n\
         Trage ihn in den Plugin-Einstellungen unter \"Lizenz\" ein.\n\n\
         Thank you for purchasing GermanFence ({package}).\n\
         Your license key: {license_key}\n\
         Enter it in the plugin settings under \"License\"."
    );
    if let Some(url) = password_set_url {
        body_text.push_str(&format!(
            "\n\nLege hier dein Passwort für das Kundenportal fest (48 Stunden gültig):\n{url}\n\n\
             Set your customer portal password here (valid for 48 hours):\n{url}"
        ));
    }

    send(
        ses,
        from,
        to,
        "Dein GermanFence Lizenzschlüssel / Your GermanFence license key",
        body_text,
    )
    .await?;
    tracing::info!(to = to, "License key email sent");
    Ok(())
}

pub async fn send_password_token(
    ses: &SesClient,
    from: &str,
    to: &str,
    password_set_url: &str,
) -> Result<(), BoxError> {
    let body_text = format!(
        "Über diesen Link kannst du dein Passwort festlegen (48 Stunden gültig):\n{password_set_url}\n\n\
         Use this link to set your password (valid for 48 hours):\n{password_set_url}"
    );

    send(
        ses,
        from,
        to,
        "Passwort festlegen / Set your password",
        body_text,
    )
    .await?;
    tracing::info!(to = to, "Password token email sent");
    Ok(())
}

pub async fn send_invoice_notice(
    ses: &SesClient,
    from: &str,
    to: &str,
    invoice_number: &str,
    gross_amount: &str,
    download_url: &str,
) -> Result<(), BoxError> {
    let body_text = format!(
        "Deine Rechnung {invoice_number} über {gross_amount} ist verfügbar:\n{download_url}\n\n\
         Your invoice {invoice_number} for {gross_amount} is available:\n{download_url}"
    );

    send(
        ses,
        from,
        to,
        "Deine GermanFence Rechnung / Your GermanFence invoice",
        body_text,
    )
    .await?;
    tracing::info!(to = to, invoice = invoice_number, "Invoice email sent");
    Ok(())
}

pub async fn send_license_cancelled(
    ses: &SesClient,
    from: &str,
    to: &str,
    license_key: &str,
) -> Result<(), BoxError> {
    let body_text = format!(
        "Deine Lizenz {license_key} wurde gekündigt und deaktiviert.\n\
         Falls das ein Irrtum war, melde dich bitte bei unserem Support.\n\n\
         Your license {license_key} has been cancelled and deactivated.\n\
         If this was a mistake, please contact our support."
    );

    send(
        ses,
        from,
        to,
        "Lizenz gekündigt / License cancelled",
        body_text,
    )
    .await?;
    tracing::info!(to = to, "License cancelled email sent");
    Ok(())
}
