//! Invoice receipt rendering
//!
//! Single A4 page: seller block, buyer block, line table with net / VAT /
//! gross, license key. Returned as raw bytes for the download endpoint.

use printpdf::{BuiltinFont, Mm, PdfDocument};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Everything the receipt shows, pre-formatted by the caller
pub struct InvoiceDocument {
    pub invoice_number: String,
    pub invoice_date: String,
    pub buyer_email: String,
    pub package_name: String,
    pub license_key: Option<String>,
    pub net_amount_cents: i64,
    pub tax_amount_cents: i64,
    pub gross_amount_cents: i64,
    pub tax_rate_percent: i32,
}

const SELLER_LINES: [&str; 4] = [
    "GermanFence GmbH",
    "Musterstraße 12",
    "10115 Berlin",
    "USt-IdNr. DE123456789",
];

/// Format cents as a German-style EUR amount, e.g. `1.234,56 €`
pub fn format_eur(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.abs();
    let whole = cents / 100;
    let frac = cents % 100;

    // Thousands separator
    let digits = whole.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    format!("{sign}{grouped},{frac:02} €")
}

/// Render the receipt to PDF bytes
pub fn render_invoice(inv: &InvoiceDocument) -> Result<Vec<u8>, BoxError> {
    let (doc, page, layer) = PdfDocument::new(
        format!("Rechnung {}", inv.invoice_number),
        Mm(210.0),
        Mm(297.0),
        "Rechnung",
    );
    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
    let layer = doc.get_page(page).get_layer(layer);

    // Header
    layer.use_text("GermanFence", 22.0, Mm(20.0), Mm(272.0), &bold);
    layer.use_text("Rechnung / Invoice", 12.0, Mm(20.0), Mm(263.0), &font);

    // Seller block
    let mut y = 248.0;
    for line in SELLER_LINES {
        layer.use_text(line, 9.0, Mm(20.0), Mm(y), &font);
        y -= 4.5;
    }

    // Invoice metadata
    layer.use_text(
        format!("Rechnungsnummer: {}", inv.invoice_number),
        10.0,
        Mm(120.0),
        Mm(248.0),
        &font,
    );
    layer.use_text(
        format!("Datum: {}", inv.invoice_date),
        10.0,
        Mm(120.0),
        Mm(243.0),
        &font,
    );

    // Buyer block
    layer.use_text("Rechnungsempfänger:", 10.0, Mm(20.0), Mm(220.0), &bold);
    layer.use_text(&inv.buyer_email, 10.0, Mm(20.0), Mm(214.0), &font);

    // Line items
    let mut y = 190.0;
    layer.use_text("Position", 10.0, Mm(20.0), Mm(y), &bold);
    layer.use_text("Betrag", 10.0, Mm(150.0), Mm(y), &bold);
    y -= 8.0;

    layer.use_text(
        format!("GermanFence Lizenz — Paket {} (12 Monate)", inv.package_name),
        10.0,
        Mm(20.0),
        Mm(y),
        &font,
    );
    layer.use_text(format_eur(inv.net_amount_cents), 10.0, Mm(150.0), Mm(y), &font);
    y -= 12.0;

    layer.use_text("Nettobetrag", 10.0, Mm(100.0), Mm(y), &font);
    layer.use_text(format_eur(inv.net_amount_cents), 10.0, Mm(150.0), Mm(y), &font);
    y -= 6.0;

    layer.use_text(
        format!("zzgl. {}% USt.", inv.tax_rate_percent),
        10.0,
        Mm(100.0),
        Mm(y),
        &font,
    );
    layer.use_text(format_eur(inv.tax_amount_cents), 10.0, Mm(150.0), Mm(y), &font);
    y -= 8.0;

    layer.use_text("Gesamtbetrag", 11.0, Mm(100.0), Mm(y), &bold);
    layer.use_text(format_eur(inv.gross_amount_cents), 11.0, Mm(150.0), Mm(y), &bold);
    y -= 16.0;

    if let Some(ref key) = inv.license_key {
        layer.use_text(format!("Lizenzschlüssel: {key}"), 10.0, Mm(20.0), Mm(y), &font);
        y -= 10.0;
    }

    layer.use_text(
        "Der Betrag wurde bereits per Kreditkarte beglichen. / Already paid by card.",
        9.0,
        Mm(20.0),
        Mm(y),
        &font,
    );

    Ok(doc.save_to_bytes()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> InvoiceDocument {
        InvoiceDocument {
            invoice_number: "GF-2026-000042".into(),
            invoice_date: "23.08.2026".into(),
            buyer_email: "kunde@example.de".into(),
            package_name: "AGENCY".into(),
            license_key: Some("GS-AGENCY-7XK2-M4PQ-WR9T".into()),
            net_amount_cents: 25_126,
            tax_amount_cents: 4_774,
            gross_amount_cents: 29_900,
            tax_rate_percent: 19,
        }
    }

    #[test]
    fn test_format_eur() {
        assert_eq!(format_eur(0), "0,00 €");
        assert_eq!(format_eur(5), "0,05 €");
        assert_eq!(format_eur(29_900), "299,00 €");
        assert_eq!(format_eur(123_456), "1.234,56 €");
        assert_eq!(format_eur(-9_950), "-99,50 €");
    }

    #[test]
    fn test_render_produces_pdf_bytes() {
        let bytes = render_invoice(&sample()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn test_render_without_license_key() {
        let mut inv = sample();
        inv.license_key = None;
        assert!(render_invoice(&inv).is_ok());
    }
}
