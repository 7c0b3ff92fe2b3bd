use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ClientInfo {
    pub name: String,
    pub email: String,
    pub address: String,
    pub phone: String,
}

/// One billable row on an invoice. `id` is generated at creation and never
/// reused; row order in `InvoiceData::line_items` is display order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LineItem {
    pub id: Uuid,
    pub description: String,
    pub quantity: i64,
    pub rate: f64,
    /// Bill only 30% of this row's amount upfront.
    #[serde(default)]
    pub advance: bool,
}

impl LineItem {
    pub fn new(description: impl Into<String>, quantity: i64, rate: f64, advance: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            quantity,
            rate,
            advance,
        }
    }
}

/// Issuing business identity, filled from `BusinessConfig`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BusinessInfo {
    pub business_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InvoiceData {
    pub invoice_number: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub shoot_date: Option<NaiveDateTime>,
    pub shoot_location: Option<String>,
    pub client: ClientInfo,
    pub business: Option<BusinessInfo>,
    pub line_items: Vec<LineItem>,
    pub payment_details: String,
    /// Display cache only. The renderer always recomputes the real total
    /// from `line_items`; this field is never a source of truth.
    pub total_amount: Option<f64>,
}

pub const DEFAULT_PAYMENT_DETAILS: &str = "Payment is due within 14 days of the invoice date.\nAccepted payment methods: Bank Transfer, PayPal, Venmo\n\nThank you for your business!";

impl InvoiceData {
    /// Fresh per-session aggregate: today's issue date, due in 14 days,
    /// one default session row. Never persisted.
    pub fn seed(today: NaiveDate) -> Self {
        Self {
            invoice_number: "TS-2025-001".to_string(),
            issue_date: today,
            due_date: today + Duration::days(14),
            shoot_date: None,
            shoot_location: None,
            client: ClientInfo::default(),
            business: None,
            line_items: vec![LineItem::new("Photography Session", 1, 500.0, false)],
            payment_details: DEFAULT_PAYMENT_DETAILS.to_string(),
            total_amount: None,
        }
    }
}

/// Contract-only usage-rights opt-outs. Lives for one contract session,
/// separate from `InvoiceData`.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Restrictions {
    pub no_advertising: bool,
    pub no_printed_materials: bool,
    pub no_social_media: bool,
    pub other_restrictions: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_defaults_one_session_row_due_in_two_weeks() {
        let today = NaiveDate::from_ymd_opt(2025, 4, 10).unwrap();
        let data = InvoiceData::seed(today);

        assert_eq!(data.issue_date, today);
        assert_eq!(data.due_date, NaiveDate::from_ymd_opt(2025, 4, 24).unwrap());
        assert_eq!(data.line_items.len(), 1);
        assert_eq!(data.line_items[0].description, "Photography Session");
        assert_eq!(data.line_items[0].quantity, 1);
        assert_eq!(data.line_items[0].rate, 500.0);
        assert!(!data.line_items[0].advance);
        assert!(data.total_amount.is_none());
    }

    #[test]
    fn line_item_ids_are_unique() {
        let a = LineItem::new("Session", 1, 500.0, false);
        let b = LineItem::new("Session", 1, 500.0, false);
        assert_ne!(a.id, b.id);
    }
}
