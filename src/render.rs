use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use tera::{Context, Tera, Value};
use thiserror::Error;

use crate::compute::{DatePattern, format_currency, format_date, invoice_total, line_item_total};
use crate::config::BusinessConfig;
use crate::model::{InvoiceData, Restrictions};

// Embed templates at compile time to ensure availability
const INVOICE_TEMPLATE: &str = include_str!("../templates/invoice.typ.tera");
const CONTRACT_TEMPLATE: &str = include_str!("../templates/contract.typ.tera");

const BLANK_LINE: &str = "_____________________________";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] tera::Error),
}

// ==========================================
// Invoice view
// ==========================================

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct InvoiceRow {
    pub description: String,
    pub quantity: i64,
    pub rate: String,
    pub amount: String,
}

/// Fully resolved invoice document: every field is display-ready, no
/// further computation happens downstream.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct InvoiceView {
    pub invoice_number: String,
    pub issue_date: String,
    pub due_date: String,
    pub client_name: String,
    pub client_address: String,
    pub client_phone: String,
    pub rows: Vec<InvoiceRow>,
    pub total_due: String,
    pub payment_details: Option<String>,
    pub website: String,
}

pub fn build_invoice_view(
    data: &InvoiceData,
    config: &BusinessConfig,
    today: NaiveDate,
) -> InvoiceView {
    let rows = data
        .line_items
        .iter()
        .map(|item| {
            let mut description = or_placeholder(&item.description, "Photography Session");
            if item.advance {
                description.push_str(" (30% Advance)");
            }
            InvoiceRow {
                description,
                quantity: item.quantity,
                rate: format_currency(item.rate),
                amount: format_currency(line_item_total(item.quantity, item.rate, item.advance)),
            }
        })
        .collect();

    InvoiceView {
        invoice_number: or_placeholder(&data.invoice_number, "001"),
        issue_date: format_date(Some(data.issue_date), DatePattern::Long, today),
        due_date: format_date(Some(data.due_date), DatePattern::Long, today),
        client_name: or_placeholder(&data.client.name, "Client Name"),
        client_address: or_placeholder(
            &data.client.address,
            "Purdue University, West Lafayette, Indiana, 47906",
        ),
        client_phone: or_placeholder(&data.client.phone, "(123) 456-7890"),
        rows,
        total_due: format_currency(invoice_total(&data.line_items)),
        payment_details: if data.payment_details.is_empty() {
            None
        } else {
            Some(data.payment_details.clone())
        },
        website: config.website.clone(),
    }
}

pub fn render_invoice_typst(view: &InvoiceView) -> Result<String, RenderError> {
    render_template("invoice", INVOICE_TEMPLATE, view)
}

// ==========================================
// Contract view
// ==========================================

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ContractSection {
    pub heading: String,
    pub body: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct RestrictionLine {
    pub label: String,
    pub checked: bool,
}

/// Fully resolved contract document: fixed legal copy with the business
/// identity filled in, restriction checkbox states, and the two-party
/// signature block.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ContractView {
    pub title: String,
    pub copyright_heading: String,
    pub copyright_intro: Vec<String>,
    pub permitted_uses: Vec<String>,
    pub opt_out_note: String,
    pub restrictions: Vec<RestrictionLine>,
    pub other_restrictions: String,
    pub copyright_closing: String,
    pub sections: Vec<ContractSection>,
    pub signature_note: String,
    pub photographer_name: String,
    pub client_name: String,
    pub signed_date: String,
}

pub fn build_contract_view(
    data: &InvoiceData,
    restrictions: &Restrictions,
    config: &BusinessConfig,
    today: NaiveDate,
) -> ContractView {
    let fill = |text: &str| {
        text.replace("{photographer}", &config.photographer)
            .replace("{business}", &config.business_name)
    };

    ContractView {
        title: "PHOTOGRAPHY AGREEMENT".to_string(),
        copyright_heading: "1. COPYRIGHT & OWNERSHIP".to_string(),
        copyright_intro: COPYRIGHT_INTRO.iter().map(|&p| fill(p)).collect(),
        permitted_uses: PERMITTED_USES.iter().map(|u| u.to_string()).collect(),
        opt_out_note: OPT_OUT_NOTE.to_string(),
        restrictions: vec![
            RestrictionLine {
                label: "No use in paid advertising".to_string(),
                checked: restrictions.no_advertising,
            },
            RestrictionLine {
                label: "No use in printed marketing materials".to_string(),
                checked: restrictions.no_printed_materials,
            },
            RestrictionLine {
                label: "No use on social media".to_string(),
                checked: restrictions.no_social_media,
            },
        ],
        other_restrictions: or_placeholder(&restrictions.other_restrictions, BLANK_LINE),
        copyright_closing: COPYRIGHT_CLOSING.to_string(),
        sections: CONTRACT_SECTIONS
            .iter()
            .map(|&(heading, body)| ContractSection {
                heading: heading.to_string(),
                body: fill(body),
            })
            .collect(),
        signature_note: SIGNATURE_NOTE.to_string(),
        photographer_name: config.photographer.clone(),
        client_name: or_placeholder(&data.client.name, "Client Name"),
        signed_date: format_date(Some(today), DatePattern::Ordinal, today),
    }
}

pub fn render_contract_typst(view: &ContractView) -> Result<String, RenderError> {
    render_template("contract", CONTRACT_TEMPLATE, view)
}

fn render_template<T: Serialize>(name: &str, raw: &str, view: &T) -> Result<String, RenderError> {
    let mut tera = Tera::default();
    tera.register_filter("typst", typst_filter);
    tera.add_raw_template(name, raw)?;
    let context = Context::from_serialize(view)?;
    Ok(tera.render(name, &context)?)
}

/// Escapes Typst-active characters so free text lands literally in content
/// position. Without this a description like `Venue shoot $500` opens an
/// unclosed math block and the compile fails.
pub fn typst_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' | '$' | '#' | '"' | '@' | '*' | '_' | '[' | ']' | '<' | '>' | '`' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            _ => escaped.push(ch),
        }
    }
    escaped
}

// Tera filter: applied in the templates to every field that carries user
// or configured text. Non-string values pass through untouched.
fn typst_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    match value.as_str() {
        Some(text) => Ok(Value::String(typst_escape(text))),
        None => Ok(value.clone()),
    }
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    if value.is_empty() {
        placeholder.to_string()
    } else {
        value.to_string()
    }
}

// ==========================================
// Fixed agreement copy
// ==========================================

const COPYRIGHT_INTRO: [&str; 2] = [
    "The Photographer, {photographer}, retains full rights to use and publish the images from this photoshoot on personal and professional platforms, including but not limited to social media accounts (e.g., Instagram), personal website, and any portfolio or online showcase. All photographs created during this session remain the intellectual property of {business}, and copyright is not transferred with the delivery of images.",
    "By signing this agreement, the Client grants permission to the Photographer to use the Client's likeness and the resulting images for the following purposes:",
];

const PERMITTED_USES: [&str; 6] = [
    "Portfolio display (online and print)",
    "Social media marketing",
    "Website content",
    "Contest submissions",
    "Professional publications",
    "Advertising and promotional materials",
];

const OPT_OUT_NOTE: &str =
    "The Client may opt out of specific usage types by indicating their preferences below:";

const COPYRIGHT_CLOSING: &str = "The Photographer may use these images for self-promotion, including marketing materials, future collaborations, and submissions to publications or competitions, provided these uses do not exploit the client in any way. The Photographer agrees to respect any opt-out choices indicated above.";

const CONTRACT_SECTIONS: [(&str, &str); 8] = [
    (
        "2. PHOTOGRAPHER'S USAGE RIGHTS",
        "The Client is granted a personal, non-exclusive right to post and share the images on personal or professional social media platforms and websites. If sharing on social media, credit to the Photographer (\"Photo by {photographer}\") is appreciated but not mandatory. The Client may not use the images for commercial purposes (e.g., advertising or resale) without additional written permission from the Photographer.",
    ),
    (
        "3. PRIVACY & RELEASE",
        "The Photographer agrees not to use the images in a manner that may be harmful to the Client's reputation or privacy. Any image deemed sensitive by the Client (such as those involving private or confidential scenarios) will be excluded from the Photographer's public platforms upon the Client's request.",
    ),
    (
        "4. IMAGE SELECTION & DELIVERY",
        "The Photographer will select and edit the final images to be delivered to the Client. The Client will receive a digital album of selected images within 5 - 7 days of the photoshoot date (unless the client has paid for the \"Express Delivery\" service). The quantity and quality of images are at the Photographer's discretion, ensuring a selection that best represents the Photographer's style and professionalism.",
    ),
    (
        "5. PHOTO ALTERATIONS",
        "The Client agrees not to alter the images in any significant way (e.g., adding filters, heavy editing) before posting. Light adjustments (e.g., cropping) are acceptable, but any edits that alter the Photographer's work significantly are discouraged. If any alterations are made, the Client should acknowledge that these edits do not reflect the Photographer's original style.",
    ),
    (
        "6. TERMINATION & MODIFICATIONS",
        "This agreement may only be modified or terminated by a written amendment signed by both parties. If either party wishes to use the images beyond the scope of this agreement (e.g., for commercial purposes), a separate written agreement shall be required.",
    ),
    (
        "7. PAYMENT TERMS",
        "The Client agrees to pay a 30% advance of the total agreed hourly rate to confirm the booking. This advance must be received before the photoshoot date to secure the appointment. The remaining balance shall be paid in full upon delivery of the final edited images. Failure to make the advance payment may result in the cancellation of the booking without further notice.",
    ),
    (
        "8. WATERMARKING",
        "All delivered images will include a small watermark of the \"{business}\" logo. The watermark will be placed at the bottom, top, left, or right of the image in a manner that does not interfere with the subject or composition of the photograph. The watermark will be applied with reduced opacity to maintain the aesthetic integrity of the image while preserving the Photographer's branding.",
    ),
    (
        "9. IMAGE EDITING REVISIONS",
        "The Photographer will provide up to three (3) rounds of reasonable revision requests per image following the initial edit. These revisions must be requested within 7 days of the initial image delivery. Additional revision requests beyond the three included rounds may incur additional fees at the Photographer's discretion. Extensive edits that significantly alter the nature of the image may be considered outside the scope of standard revisions (e.g., adding an absent member to a group picture, changing of background, outfit, etc...).",
    ),
];

const SIGNATURE_NOTE: &str = "By signing below, both parties agree to the terms specified in this Photography Usage Agreement, granting the Photographer the rights to use and post images from the shoot and allowing the Client to share the images within the limits specified.";
