use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hospital {
    pub id: String,
    pub name: String,
    pub address: String,
    pub city: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instrument {
    pub id: String,
    pub name: String,
    pub catalog_code: Option<String>,
    pub hsn_code: Option<String>,
    pub gst_type: Option<String>,
    pub gst_percent: Option<f64>,
    pub unit_price: f64,
    pub created_at: String,
    pub updated_at: String,
}

/// The in-progress quote. Exactly one per operator, persisted as a single
/// record and mutated incrementally by the builder commands. Finalization
/// does NOT clear it; finalizing again produces the next revision.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuoteHeader {
    #[serde(default)]
    pub quote_no: String,
    #[serde(default)]
    pub quote_date: String,
    #[serde(default)]
    pub hospital_name: String,
    #[serde(default)]
    pub hospital_address: String,
    #[serde(default)]
    pub contact_person: String,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub terms: String,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub lines: Vec<QuoteLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteLine {
    pub instrument_id: String,
    #[serde(default = "default_qty")]
    pub quantity: u32,
    #[serde(default)]
    pub config_items: Vec<ConfigItem>,
    #[serde(default)]
    pub additional_items: Vec<AdditionalItem>,
}

/// Bundled configuration item, commercially priced as "Included". A unit
/// price may be present on the source document but never enters totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigItem {
    pub name: String,
    #[serde(default, alias = "code")]
    pub catalog_code: Option<String>,
    #[serde(default)]
    pub unit_price: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdditionalItem {
    pub name: String,
    pub catalog_code: Option<String>,
    pub unit_price: f64,
    pub qty: u32,
}

// Legacy and remote documents carry the price under any of several keys;
// the first numeric one wins.
impl<'de> Deserialize<'de> for AdditionalItem {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            name: String,
            #[serde(default, alias = "code")]
            catalog_code: Option<String>,
            #[serde(default)]
            price: Option<serde_json::Value>,
            #[serde(default, alias = "unitPrice")]
            unit_price: Option<serde_json::Value>,
            #[serde(default, alias = "upInr")]
            up_inr: Option<serde_json::Value>,
            #[serde(default, alias = "tpInr")]
            tp_inr: Option<serde_json::Value>,
            #[serde(default = "default_qty")]
            qty: u32,
        }

        let raw = Raw::deserialize(deserializer)?;
        let unit_price = [&raw.price, &raw.unit_price, &raw.up_inr, &raw.tp_inr]
            .into_iter()
            .flatten()
            .find_map(numeric_value)
            .unwrap_or(0.0);

        Ok(AdditionalItem {
            name: raw.name,
            catalog_code: raw.catalog_code,
            unit_price,
            qty: raw.qty,
        })
    }
}

fn numeric_value(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn default_qty() -> u32 {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineItemKind {
    Instrument,
    Configuration,
    Additional,
}

impl std::fmt::Display for LineItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineItemKind::Instrument => write!(f, "Instrument"),
            LineItemKind::Configuration => write!(f, "Configuration"),
            LineItemKind::Additional => write!(f, "Additional"),
        }
    }
}

/// One row of the flattened, display-ordered line item list on a finalized
/// quote. `price` of `None` renders as "Included".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub code: Option<String>,
    pub kind: LineItemKind,
    pub price: Option<f64>,
    pub supplied_with: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSummary {
    pub items_total: f64,
    pub discount: f64,
    pub after_discount: f64,
    pub gst_percent: f64,
    pub gst_amount: f64,
    pub total_value: f64,
    pub rounded_total: f64,
    pub round_off: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub status: String,
    pub date: String,
    pub time: String,
}

/// Immutable snapshot appended by finalization. Follow-up notes live in
/// their own table and never touch `summary` or `revision`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizedQuote {
    pub id: String,
    pub header: QuoteHeader,
    pub line_items: Vec<LineItem>,
    pub summary: QuoteSummary,
    pub revision: u32,
    pub history: Vec<HistoryEntry>,
}

/// List-view row for the quote history screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub id: String,
    pub quote_no: String,
    pub revision: u32,
    pub hospital_name: String,
    pub total_value: f64,
    pub finalized_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteDetail {
    pub quote: FinalizedQuote,
    pub follow_ups: Vec<FollowUpNote>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpNote {
    pub id: String,
    pub quote_id: String,
    pub status: String,
    pub note: String,
    pub date: String,
    pub time: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Sales,
    Service,
}

impl UserRole {
    pub fn landing_page(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin.html",
            UserRole::Sales => "quotes.html",
            UserRole::Service => "followups.html",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Sales => write!(f, "sales"),
            UserRole::Service => write!(f, "service"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "sales" => Ok(UserRole::Sales),
            "service" => Ok(UserRole::Service),
            _ => Err(format!("Invalid role: {}. Use admin, sales, or service", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffUser {
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub remote_base_url: Option<String>,
    pub remote_api_key: Option<String>,
    pub quote_prefix: String,
}

/// Success confirmation returned by finalization, naming the quote number
/// and the revision it was stored under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalizeOutcome {
    pub quote_no: String,
    pub revision: u32,
    pub rounded_total: f64,
    pub display_total: String,
    pub remote_synced: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn additional_item_price_resolves_first_numeric_key() {
        let item: AdditionalItem =
            serde_json::from_str(r#"{"name":"Foot Switch","upInr":2500,"qty":2}"#).unwrap();
        assert_eq!(item.unit_price, 2500.0);
        assert_eq!(item.qty, 2);

        let item: AdditionalItem =
            serde_json::from_str(r#"{"name":"Cable","price":"1500.50","tpInr":9999}"#).unwrap();
        assert_eq!(item.unit_price, 1500.5);
        assert_eq!(item.qty, 1);
    }

    #[test]
    fn additional_item_skips_non_numeric_keys() {
        let item: AdditionalItem =
            serde_json::from_str(r#"{"name":"Probe","price":"n/a","tpInr":800}"#).unwrap();
        assert_eq!(item.unit_price, 800.0);
    }

    #[test]
    fn additional_item_without_any_price_defaults_to_zero() {
        let item: AdditionalItem = serde_json::from_str(r#"{"name":"Manual"}"#).unwrap();
        assert_eq!(item.unit_price, 0.0);
        assert_eq!(item.qty, 1);
    }

    #[test]
    fn additional_item_roundtrips_through_own_serialization() {
        let item = AdditionalItem {
            name: "Trolley".to_string(),
            catalog_code: Some("TR-01".to_string()),
            unit_price: 12000.0,
            qty: 1,
        };
        let json = serde_json::to_string(&item).unwrap();
        let back: AdditionalItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back.unit_price, 12000.0);
        assert_eq!(back.catalog_code.as_deref(), Some("TR-01"));
    }

    #[test]
    fn role_parses_and_maps_to_landing_page() {
        let role: UserRole = "Sales".parse().unwrap();
        assert_eq!(role, UserRole::Sales);
        assert_eq!(role.landing_page(), "quotes.html");
        assert!("manager".parse::<UserRole>().is_err());
    }
}
