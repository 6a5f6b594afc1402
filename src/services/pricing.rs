//! Quote pricing and revisioning.
//!
//! Pure logic: header validation, line item aggregation, GST/discount
//! arithmetic and the flattened snapshot build. Storage and command wiring
//! live elsewhere; everything here is deterministic and directly testable.

use thiserror::Error;

use crate::models::{
    FinalizedQuote, HistoryEntry, Instrument, LineItem, LineItemKind, QuoteHeader, QuoteSummary,
};

/// GST is charged at a fixed 18% on the post-discount items total.
pub const GST_RATE: f64 = 0.18;
pub const GST_PERCENT: f64 = 18.0;

#[derive(Debug, Error, PartialEq)]
pub enum QuoteError {
    #[error("{}", missing_fields_message(.0))]
    MissingFields(Vec<String>),
    #[error("No instruments added to the quote")]
    EmptyQuote,
    #[error("Instrument(s) no longer in the master catalog: {}", .0.join(", "))]
    UnresolvedInstruments(Vec<String>),
}

fn missing_fields_message(fields: &[String]) -> String {
    fields
        .iter()
        .map(|field| format!("{} is missing", field))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Precondition check for finalization. All missing fields are reported in
/// one pass; there is no partial success.
pub fn validate_header(header: &QuoteHeader) -> Result<(), QuoteError> {
    let required = [
        ("Quote No", &header.quote_no),
        ("Quote Date", &header.quote_date),
        ("Hospital Name", &header.hospital_name),
        ("Hospital Address", &header.hospital_address),
    ];

    let missing: Vec<String> = required
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(label, _)| label.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(QuoteError::MissingFields(missing))
    }
}

/// Sums instrument and additional-item contributions across all lines.
///
/// Instrument lines contribute `unit_price * quantity`, additional items
/// `unit_price * qty`. Config items are "Included" and contribute nothing.
/// Every line must resolve against the catalog; unresolved ids abort the
/// computation and are reported together.
pub fn compute_items_total(
    catalog: &[Instrument],
    header: &QuoteHeader,
) -> Result<f64, QuoteError> {
    let mut unresolved = Vec::new();
    let mut total = 0.0;

    for line in &header.lines {
        match find_instrument(catalog, &line.instrument_id) {
            Some(instrument) => total += instrument.unit_price * f64::from(line.quantity),
            None => unresolved.push(line.instrument_id.clone()),
        }
        for item in &line.additional_items {
            total += item.unit_price * f64::from(item.qty);
        }
    }

    if unresolved.is_empty() {
        Ok(total)
    } else {
        Err(QuoteError::UnresolvedInstruments(unresolved))
    }
}

/// Discount is applied verbatim (no clamping), then GST, then rounding to
/// the nearest rupee. `rounded_total - round_off == total_value` holds.
pub fn summarize(items_total: f64, discount: f64) -> QuoteSummary {
    let after_discount = items_total - discount;
    let gst_amount = after_discount * GST_RATE;
    let total_value = after_discount + gst_amount;
    let rounded_total = total_value.round();
    let round_off = rounded_total - total_value;

    QuoteSummary {
        items_total,
        discount,
        after_discount,
        gst_percent: GST_PERCENT,
        gst_amount,
        total_value,
        rounded_total,
        round_off,
    }
}

/// Validates, prices and snapshots the working header into an immutable
/// finalized quote carrying the given revision and a single "submitted"
/// history entry. The caller supplies the revision (one past the stored
/// maximum for this quote number) and the date/time stamps.
pub fn finalize_quote(
    catalog: &[Instrument],
    header: &QuoteHeader,
    revision: u32,
    date: String,
    time: String,
) -> Result<FinalizedQuote, QuoteError> {
    validate_header(header)?;
    if header.lines.is_empty() {
        return Err(QuoteError::EmptyQuote);
    }

    let items_total = compute_items_total(catalog, header)?;
    let summary = summarize(items_total, header.discount);
    let line_items = flatten_line_items(catalog, header);

    Ok(FinalizedQuote {
        id: uuid::Uuid::new_v4().to_string(),
        header: header.clone(),
        line_items,
        summary,
        revision,
        history: vec![HistoryEntry {
            status: "submitted".to_string(),
            date,
            time,
        }],
    })
}

/// Display-ordered flattening: each instrument entry, then its config
/// items, then its additional items. Config items carry no price (rendered
/// as "Included"); sub-items name the instrument they ship with.
fn flatten_line_items(catalog: &[Instrument], header: &QuoteHeader) -> Vec<LineItem> {
    let mut items = Vec::new();

    for line in &header.lines {
        let Some(instrument) = find_instrument(catalog, &line.instrument_id) else {
            continue;
        };

        items.push(LineItem {
            name: instrument.name.clone(),
            code: instrument.catalog_code.clone(),
            kind: LineItemKind::Instrument,
            price: Some(instrument.unit_price * f64::from(line.quantity)),
            supplied_with: None,
        });

        for config in &line.config_items {
            items.push(LineItem {
                name: config.name.clone(),
                code: config.catalog_code.clone(),
                kind: LineItemKind::Configuration,
                price: None,
                supplied_with: Some(instrument.name.clone()),
            });
        }

        for extra in &line.additional_items {
            items.push(LineItem {
                name: extra.name.clone(),
                code: extra.catalog_code.clone(),
                kind: LineItemKind::Additional,
                price: Some(extra.unit_price * f64::from(extra.qty)),
                supplied_with: Some(instrument.name.clone()),
            });
        }
    }

    items
}

fn find_instrument<'a>(catalog: &'a [Instrument], id: &str) -> Option<&'a Instrument> {
    catalog.iter().find(|instrument| instrument.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AdditionalItem, ConfigItem, QuoteLine};

    fn instrument(id: &str, unit_price: f64) -> Instrument {
        Instrument {
            id: id.to_string(),
            name: format!("Instrument {}", id),
            catalog_code: Some(format!("CAT-{}", id)),
            hsn_code: None,
            gst_type: None,
            gst_percent: None,
            unit_price,
            created_at: "2025-01-01T00:00:00Z".to_string(),
            updated_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    fn valid_header() -> QuoteHeader {
        QuoteHeader {
            quote_no: "Q-100".to_string(),
            quote_date: "2025-01-01".to_string(),
            hospital_name: "City Hospital".to_string(),
            hospital_address: "MG Road".to_string(),
            ..QuoteHeader::default()
        }
    }

    fn line(instrument_id: &str, quantity: u32) -> QuoteLine {
        QuoteLine {
            instrument_id: instrument_id.to_string(),
            quantity,
            config_items: vec![],
            additional_items: vec![],
        }
    }

    fn additional(name: &str, unit_price: f64, qty: u32) -> AdditionalItem {
        AdditionalItem {
            name: name.to_string(),
            catalog_code: None,
            unit_price,
            qty,
        }
    }

    #[test]
    fn validation_reports_every_missing_field_at_once() {
        let header = QuoteHeader {
            quote_no: "Q-1".to_string(),
            quote_date: "  ".to_string(),
            ..QuoteHeader::default()
        };

        let err = validate_header(&header).unwrap_err();
        match &err {
            QuoteError::MissingFields(fields) => {
                assert_eq!(
                    fields,
                    &vec![
                        "Quote Date".to_string(),
                        "Hospital Name".to_string(),
                        "Hospital Address".to_string()
                    ]
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
        let message = err.to_string();
        assert!(message.contains("Quote Date is missing"));
        assert!(message.contains("Hospital Name is missing"));
        assert!(message.contains("Hospital Address is missing"));
    }

    #[test]
    fn validation_passes_on_complete_header() {
        assert!(validate_header(&valid_header()).is_ok());
    }

    #[test]
    fn items_total_sums_instruments_and_additional_items_only() {
        let catalog = vec![instrument("a", 5000.0)];
        let mut header = valid_header();
        let mut quote_line = line("a", 1);
        quote_line.config_items.push(ConfigItem {
            name: "Camera Head".to_string(),
            catalog_code: None,
            // numeric price present on the document, still "Included"
            unit_price: Some(99999.0),
        });
        quote_line.additional_items.push(additional("Cable", 1500.0, 2));
        header.lines.push(quote_line);

        let total = compute_items_total(&catalog, &header).unwrap();
        assert_eq!(total, 5000.0 + 3000.0);
    }

    #[test]
    fn unresolved_instruments_abort_with_all_ids() {
        let catalog = vec![instrument("a", 5000.0)];
        let mut header = valid_header();
        header.lines.push(line("a", 1));
        header.lines.push(line("gone-1", 1));
        header.lines.push(line("gone-2", 3));

        let err = compute_items_total(&catalog, &header).unwrap_err();
        assert_eq!(
            err,
            QuoteError::UnresolvedInstruments(vec!["gone-1".to_string(), "gone-2".to_string()])
        );
        assert!(err.to_string().contains("gone-1"));
        assert!(err.to_string().contains("gone-2"));
    }

    #[test]
    fn summary_applies_discount_then_gst_then_round_off() {
        // 5000x1 instrument + 1500x2 additional, discount 1000
        let summary = summarize(8000.0, 1000.0);
        assert_eq!(summary.after_discount, 7000.0);
        assert_eq!(summary.gst_amount, 1260.0);
        assert_eq!(summary.total_value, 8260.0);
        assert_eq!(summary.rounded_total, 8260.0);
        assert_eq!(summary.round_off, 0.0);
    }

    #[test]
    fn round_off_reconciles_total_to_whole_rupees() {
        let summary = summarize(1001.0, 0.0);
        // 1001 * 1.18 = 1181.18
        assert!((summary.total_value - 1181.18).abs() < 1e-9);
        assert_eq!(summary.rounded_total, 1181.0);
        assert!((summary.round_off - (-0.18)).abs() < 1e-9);
        assert!(
            (summary.total_value + summary.round_off - summary.rounded_total).abs() < 1e-9
        );
        assert_eq!(summary.rounded_total.fract(), 0.0);
    }

    #[test]
    fn discount_is_not_clamped_to_items_total() {
        let summary = summarize(1000.0, 2500.0);
        assert_eq!(summary.after_discount, -1500.0);
        assert_eq!(summary.gst_amount, -270.0);
        assert_eq!(summary.total_value, -1770.0);
    }

    #[test]
    fn finalize_builds_snapshot_with_submitted_history() {
        let catalog = vec![instrument("a", 10000.0)];
        let mut header = valid_header();
        header.lines.push(line("a", 2));

        let quote = finalize_quote(
            &catalog,
            &header,
            1,
            "2025-01-01".to_string(),
            "10:00:00".to_string(),
        )
        .unwrap();

        assert_eq!(quote.summary.items_total, 20000.0);
        assert_eq!(quote.summary.gst_amount, 3600.0);
        assert_eq!(quote.summary.total_value, 23600.0);
        assert_eq!(quote.summary.rounded_total, 23600.0);
        assert_eq!(quote.revision, 1);
        assert_eq!(quote.history.len(), 1);
        assert_eq!(quote.history[0].status, "submitted");
        assert_eq!(quote.header.quote_no, "Q-100");
    }

    #[test]
    fn finalize_rejects_empty_line_list_with_distinct_error() {
        let err = finalize_quote(
            &[],
            &valid_header(),
            1,
            "2025-01-01".to_string(),
            "10:00:00".to_string(),
        )
        .unwrap_err();
        assert_eq!(err, QuoteError::EmptyQuote);
    }

    #[test]
    fn finalize_rejects_incomplete_header_before_anything_else() {
        let mut header = valid_header();
        header.hospital_address.clear();
        header.lines.push(line("missing-anyway", 1));

        let err = finalize_quote(
            &[],
            &header,
            1,
            "2025-01-01".to_string(),
            "10:00:00".to_string(),
        )
        .unwrap_err();
        assert!(matches!(err, QuoteError::MissingFields(_)));
        assert!(err.to_string().contains("Hospital Address is missing"));
    }

    #[test]
    fn flattened_line_items_preserve_header_order() {
        let catalog = vec![instrument("a", 5000.0), instrument("b", 8000.0)];
        let mut header = valid_header();

        let mut first = line("a", 1);
        first.config_items.push(ConfigItem {
            name: "Light Source".to_string(),
            catalog_code: Some("LS-2".to_string()),
            unit_price: None,
        });
        first.additional_items.push(additional("Foot Switch", 2500.0, 1));
        header.lines.push(first);
        header.lines.push(line("b", 1));

        let quote = finalize_quote(
            &catalog,
            &header,
            1,
            "2025-01-01".to_string(),
            "10:00:00".to_string(),
        )
        .unwrap();

        let kinds: Vec<LineItemKind> = quote.line_items.iter().map(|item| item.kind).collect();
        assert_eq!(
            kinds,
            vec![
                LineItemKind::Instrument,
                LineItemKind::Configuration,
                LineItemKind::Additional,
                LineItemKind::Instrument,
            ]
        );

        // config items render as "Included"
        assert_eq!(quote.line_items[1].price, None);
        assert_eq!(
            quote.line_items[1].supplied_with.as_deref(),
            Some("Instrument a")
        );
        assert_eq!(quote.line_items[2].price, Some(2500.0));
    }

    #[test]
    fn items_total_is_order_independent() {
        let catalog = vec![instrument("a", 1234.0), instrument("b", 987.0)];
        let mut forward = valid_header();
        forward.lines.push(line("a", 2));
        forward.lines.push(line("b", 3));

        let mut reversed = valid_header();
        reversed.lines.push(line("b", 3));
        reversed.lines.push(line("a", 2));

        assert_eq!(
            compute_items_total(&catalog, &forward).unwrap(),
            compute_items_total(&catalog, &reversed).unwrap()
        );
    }
}
