//! Confirmation email content

use shared::models::EmployeeRecord;

use super::OutgoingEmail;

/// Welcome email sent once the record is persisted
///
/// Returns `None` when the employee gave no email address.
pub fn registration_confirmation(record: &EmployeeRecord) -> Option<OutgoingEmail> {
    let employee = &record.employee;
    let to = employee
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())?;

    let qr_line = employee
        .qr_id
        .as_deref()
        .map(|qr| format!("<p>Identifiant QR : <strong>{}</strong></p>", escape(qr)))
        .unwrap_or_default();

    let html = format!(
        "<!DOCTYPE html>\
<html lang=\"fr\"><body style=\"font-family: sans-serif\">\
<h2>Bienvenue chez Nova, {prenom} {nom} !</h2>\
<p>Votre inscription en tant que <strong>{poste}</strong> a bien été enregistrée.</p>\
<p>Votre matricule : <strong>{matricule}</strong></p>\
{qr_line}\
<p>Conservez votre code PIN : il vous sera demandé pour pointer.</p>\
<p>L'équipe RH</p>\
</body></html>",
        prenom = escape(&employee.prenom),
        nom = escape(&employee.nom),
        poste = escape(&employee.poste),
        matricule = escape(&employee.matricule),
    );

    Some(OutgoingEmail {
        to: to.to_string(),
        subject: format!("Bienvenue chez Nova : votre matricule {}", employee.matricule),
        html,
    })
}

/// Minimal HTML escaping for user-supplied text
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
