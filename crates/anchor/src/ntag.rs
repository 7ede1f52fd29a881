//! NTAG programming export
//!
//! After a batch is anchored, the operator downloads one line per serial with
//! the URL to write into the NFC tag and print as QR code.

use crate::csv::{CsvRow, SERIAL_NUMBER};

pub const NTAG_HEADER: &str =
    "serial_number,qr_code_url,nfc_payload,codigo_validacao,verification_url";

/// Marks that `encodeURIComponent` leaves alone but `urlencoding` escapes
const URI_COMPONENT_MARKS: [(&str, &str); 5] = [
    ("%21", "!"),
    ("%27", "'"),
    ("%28", "("),
    ("%29", ")"),
    ("%2A", "*"),
];

/// `{base}/verify?serial={serial}` with trailing slashes trimmed from `base`
/// and the serial encoded the way browsers' `encodeURIComponent` does
#[must_use]
pub fn verification_url(base: &str, serial: &str) -> String {
    format!(
        "{}/verify?serial={}",
        base.trim_end_matches('/'),
        encode_uri_component(serial)
    )
}

fn encode_uri_component(value: &str) -> String {
    URI_COMPONENT_MARKS
        .iter()
        .fold(urlencoding::encode(value).into_owned(), |encoded, (escaped, mark)| {
            encoded.replace(escaped, mark)
        })
}

/// Build the export CSV for `rows` of an anchored batch
#[must_use]
pub fn ntag_export(rows: &[CsvRow], batch_id: &str, verify_base: &str) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(NTAG_HEADER.to_string());
    for row in rows {
        let serial = row.get(SERIAL_NUMBER).map(String::as_str).unwrap_or("");
        let url = verification_url(verify_base, serial);
        lines.push(format!("{serial},{url},{batch_id},{batch_id},{url}"));
    }
    lines.join("\n")
}

/// `ntag_export_{first 8 chars of the batch id}.csv`
#[must_use]
pub fn ntag_file_name(batch_id: &str) -> String {
    let prefix: String = batch_id.chars().take(8).collect();
    format!("ntag_export_{prefix}.csv")
}
