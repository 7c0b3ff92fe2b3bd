mod compute;
mod config;
mod export;
mod model;
mod reminder;
mod render;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{Datelike, Duration, Local, NaiveDate};
use clap::{Parser, Subcommand};
use comfy_table::{Attribute, Cell, Table};
use inquire::{Confirm, DateSelect, Select, Text};

use crate::config::BusinessConfig;
use crate::export::{
    ExportFormat, ExportedFile, contract_filename_base, export_document, invoice_email_filename_base,
    invoice_filename_base,
};
use crate::model::{ClientInfo, InvoiceData, LineItem, Restrictions};
use crate::reminder::{ReminderKind, ReminderRequest, send_reminder};
use crate::render::{
    InvoiceView, build_contract_view, build_invoice_view, render_contract_typst,
    render_invoice_typst,
};

// ==========================================
// CLI
// ==========================================

#[derive(Parser)]
#[command(name = "sora-invoice")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new invoice
    New,
    /// Generate a photography agreement
    Contract,
    /// Email a shoot reminder to a client
    Remind,
    /// Configure data directory
    Config,
    /// Open output folder
    Open,
}

fn main() {
    let cli = Cli::parse();

    // 1. Initialize configuration
    let settings = config::load_settings().unwrap_or_else(config::setup_config_wizard);
    let expanded_path = config::expand_home_dir(&settings.data_root);
    let root = PathBuf::from(expanded_path);

    if let Err(e) = fs::create_dir_all(&root) {
        eprintln!("❌ Error: Failed to create data directory: {}", e);
        return;
    }

    let business = config::load_business_config(&root);

    if cli.command.is_none() {
        use clap::CommandFactory;
        Cli::command().print_help().unwrap();
        return;
    }

    match cli.command.unwrap() {
        Commands::New => new_invoice(&root, &business),
        Commands::Contract => new_contract(&root, &business),
        Commands::Remind => reminder_wizard(&business),
        Commands::Config => {
            config::setup_config_wizard();
        }
        Commands::Open => open_output_folder(&root),
    }
}

// ==========================================
// 1. Invoice Flow
// ==========================================

fn new_invoice(root: &Path, business: &BusinessConfig) {
    let today = Local::now().date_naive();
    let mut data = InvoiceData::seed(today);
    data.business = Some(business.business_info());

    println!("\n--- New Invoice ---");

    data.invoice_number = Text::new("Invoice Number:")
        .with_default(&data.invoice_number)
        .prompt()
        .unwrap();

    data.issue_date = DateSelect::new("Issue Date:")
        .with_default(today)
        .prompt()
        .unwrap();
    data.due_date = DateSelect::new("Due Date:")
        .with_default(data.issue_date + Duration::days(14))
        .prompt()
        .unwrap();

    data.client = client_info_wizard();

    let keep_default = Confirm::new("Start from the default 'Photography Session' row ($500)?")
        .with_default(true)
        .prompt()
        .unwrap();
    if !keep_default {
        data.line_items.clear();
    }
    data.line_items.extend(enter_line_items());

    if data.line_items.is_empty() {
        println!("❌ No items entered. Aborting.");
        return;
    }

    let keep_payment = Confirm::new("Use the default payment details?")
        .with_default(true)
        .prompt()
        .unwrap();
    if !keep_payment {
        data.payment_details = Text::new("Payment Details:").prompt().unwrap();
    }

    let view = build_invoice_view(&data, business, today);
    print_invoice_preview(&view);

    let typst_source = match render_invoice_typst(&view) {
        Ok(source) => source,
        Err(e) => {
            println!("❌ Template Error: {}", e);
            return;
        }
    };

    let exported = if Confirm::new("Export this invoice?")
        .with_default(true)
        .prompt()
        .unwrap()
    {
        let format = choose_format();
        export_and_report(
            &typst_source,
            format,
            &invoice_filename_base(&data.invoice_number),
            &output_dir(root, today),
        )
    } else {
        None
    };

    maybe_email_document(
        business,
        &data,
        ReminderKind::Invoice,
        exported,
        &invoice_email_filename_base(&data.invoice_number),
    );
}

// ==========================================
// 2. Contract Flow
// ==========================================

fn new_contract(root: &Path, business: &BusinessConfig) {
    let today = Local::now().date_naive();
    let mut data = InvoiceData::seed(today);
    data.business = Some(business.business_info());

    println!("\n--- New Photography Agreement ---");
    data.client = client_info_wizard();

    println!("\n--- Usage Restrictions (client opt-outs) ---");
    let restrictions = Restrictions {
        no_advertising: Confirm::new("No use in paid advertising?")
            .with_default(false)
            .prompt()
            .unwrap(),
        no_printed_materials: Confirm::new("No use in printed marketing materials?")
            .with_default(false)
            .prompt()
            .unwrap(),
        no_social_media: Confirm::new("No use on social media?")
            .with_default(false)
            .prompt()
            .unwrap(),
        other_restrictions: Text::new("Other restrictions (leave empty for none):")
            .prompt()
            .unwrap(),
    };

    let view = build_contract_view(&data, &restrictions, business, today);

    println!("\n--- Agreement Summary ---");
    for line in &view.restrictions {
        let mark = if line.checked { "☑" } else { "☐" };
        println!("  {} {}", mark, line.label);
    }
    println!("  Signatories: {} / {}", view.photographer_name, view.client_name);
    println!("  Date: {}", view.signed_date);

    let typst_source = match render_contract_typst(&view) {
        Ok(source) => source,
        Err(e) => {
            println!("❌ Template Error: {}", e);
            return;
        }
    };

    let filename_base = contract_filename_base(&data.client.name, today);
    let exported = if Confirm::new("Export this agreement?")
        .with_default(true)
        .prompt()
        .unwrap()
    {
        let format = choose_format();
        export_and_report(&typst_source, format, &filename_base, &output_dir(root, today))
    } else {
        None
    };

    maybe_email_document(business, &data, ReminderKind::Contract, exported, &filename_base);
}

// ==========================================
// 3. Reminder Flow
// ==========================================

fn reminder_wizard(business: &BusinessConfig) {
    println!("\n--- Shoot Reminder Email ---");

    let client_name = Text::new("Client Name:").prompt().unwrap();
    let client_email = Text::new("Client Email:").prompt().unwrap();

    let shoot_date = DateSelect::new("Shoot Date:")
        .with_default(Local::now().date_naive() + Duration::days(7))
        .prompt()
        .unwrap();

    let shoot_location = Text::new("Shoot Location:")
        .with_default(&business.default_shoot_location)
        .prompt()
        .unwrap();

    let custom_message = Text::new("Personal message (optional, appended to the template):")
        .prompt()
        .unwrap();

    let kind_choice = Select::new("Reminder concerns:", vec!["Invoice", "Contract"])
        .prompt()
        .unwrap();

    let request = ReminderRequest {
        client_email,
        client_name,
        shoot_date: shoot_date.and_hms_opt(9, 0, 0),
        shoot_location: Some(shoot_location),
        custom_message: if custom_message.is_empty() {
            None
        } else {
            Some(custom_message)
        },
        kind: reminder_kind_from_choice(kind_choice),
        attachment: None,
    };

    dispatch_reminder(business, &request);
}

fn reminder_kind_from_choice(choice: &str) -> ReminderKind {
    if choice == "Contract" {
        ReminderKind::Contract
    } else {
        ReminderKind::Invoice
    }
}

fn dispatch_reminder(business: &BusinessConfig, request: &ReminderRequest) {
    println!("📨 Sending email...");
    match send_reminder(business, request) {
        Ok(()) => println!(
            "✅ {} reminder emailed to {}",
            request.kind.document_name(),
            request.client_email
        ),
        Err(e) => println!("❌ {}", e),
    }
}

/// Offers to email the current document. A fresh snapshot of the data is
/// used for the message; the artifact (when present) rides along renamed
/// to the email filename convention.
fn maybe_email_document(
    business: &BusinessConfig,
    data: &InvoiceData,
    kind: ReminderKind,
    exported: Option<ExportedFile>,
    email_filename: &str,
) {
    let send = Confirm::new(&format!(
        "Email this {} to the client?",
        kind.document_name().to_lowercase()
    ))
    .with_default(false)
    .prompt()
    .unwrap();
    if !send {
        return;
    }

    let attachment = exported.map(|file| rename_for_email(file, email_filename));

    let request = ReminderRequest {
        client_email: data.client.email.clone(),
        client_name: data.client.name.clone(),
        shoot_date: data.shoot_date,
        shoot_location: data.shoot_location.clone(),
        custom_message: None,
        kind,
        attachment,
    };

    dispatch_reminder(business, &request);
}

/// Emailed artifacts carry the branded filename; the extension follows the
/// format the document was exported in.
fn rename_for_email(mut file: ExportedFile, email_filename: &str) -> ExportedFile {
    let extension = file
        .path
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_else(|| "pdf".to_string());
    file.filename = format!("{}.{}", email_filename, extension);
    file
}

// ==========================================
// 4. Data Entry Helpers
// ==========================================

fn client_info_wizard() -> ClientInfo {
    println!("\n--- Client Details (all optional) ---");
    ClientInfo {
        name: Text::new("Client Name:").prompt().unwrap(),
        email: Text::new("Client Email:").prompt().unwrap(),
        address: Text::new("Client Address:").prompt().unwrap(),
        phone: Text::new("Client Phone:").prompt().unwrap(),
    }
}

fn enter_line_items() -> Vec<LineItem> {
    let mut items = Vec::new();
    println!("\n--- Additional Line Items ---");
    println!("(Leave Description empty to finish)");

    loop {
        let description = Text::new("Description (leave empty to finish):")
            .prompt()
            .unwrap();
        if description.trim().is_empty() {
            break;
        }

        let quantity: i64 = Text::new("Quantity:")
            .with_default("1")
            .prompt()
            .unwrap()
            .parse()
            .unwrap_or(1);
        let rate: f64 = Text::new("Rate ($):")
            .prompt()
            .unwrap()
            .parse()
            .unwrap_or(0.0);
        let advance = Confirm::new("Bill as 30% advance payment?")
            .with_default(false)
            .prompt()
            .unwrap();

        items.push(LineItem::new(description, quantity, rate, advance));
    }
    items
}

fn choose_format() -> ExportFormat {
    let options = vec!["PDF", "Image (PNG)"];
    match Select::new("Export Format:", options).prompt() {
        Ok("Image (PNG)") => ExportFormat::Png,
        _ => ExportFormat::Pdf,
    }
}

// ==========================================
// 5. Preview & Export
// ==========================================

fn print_invoice_preview(view: &InvoiceView) {
    println!("\n--- Invoice Preview ---");
    println!(
        "INVOICE # {}   DATE {}   DUE {}",
        view.invoice_number, view.issue_date, view.due_date
    );
    println!("Bill To: {}", view.client_name);

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Description"),
        Cell::new("Qty"),
        Cell::new("Rate"),
        Cell::new("Amount"),
    ]);
    for row in &view.rows {
        table.add_row(vec![
            Cell::new(&row.description),
            Cell::new(row.quantity),
            Cell::new(&row.rate),
            Cell::new(&row.amount),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL DUE").add_attribute(Attribute::Bold),
        Cell::new(""),
        Cell::new(""),
        Cell::new(&view.total_due).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
}

fn output_dir(root: &Path, today: NaiveDate) -> PathBuf {
    root.join("output").join(today.year().to_string())
}

fn export_and_report(
    typst_source: &str,
    format: ExportFormat,
    filename_base: &str,
    out_dir: &Path,
) -> Option<ExportedFile> {
    println!("🔨 Compiling {}...", format.extension().to_uppercase());
    match export_document(typst_source, format, filename_base, out_dir) {
        Ok(file) => {
            println!("✅ Exported: {:?}", file.path);
            open_and_reveal(&file.path);
            Some(file)
        }
        Err(e) => {
            println!("❌ {}", e);
            println!("   The document was not exported. Please try again.");
            None
        }
    }
}

// ==========================================
// 6. Open Folder & Utilities
// ==========================================

fn open_output_folder(root: &Path) {
    let output_root = root.join("output");
    if !output_root.exists() {
        println!("❌ No output directory found.");
        return;
    }
    println!("🚀 Opening: {:?}", output_root);

    #[cfg(target_os = "macos")]
    Command::new("open").arg(&output_root).spawn().ok();
    #[cfg(target_os = "windows")]
    Command::new("explorer").arg(&output_root).spawn().ok();
    #[cfg(target_os = "linux")]
    Command::new("xdg-open").arg(&output_root).spawn().ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reminder_kind_follows_document_choice() {
        assert_eq!(reminder_kind_from_choice("Contract"), ReminderKind::Contract);
        assert_eq!(reminder_kind_from_choice("Invoice"), ReminderKind::Invoice);
    }

    #[test]
    fn emailed_attachment_gets_branded_name_and_keeps_extension() {
        let file = ExportedFile {
            bytes: vec![1, 2, 3],
            path: "out/Invoice-TS-2025-001.png".into(),
            filename: "Invoice-TS-2025-001.png".to_string(),
        };
        let renamed = rename_for_email(file, "TheSora_Invoice_TS-2025-001");
        assert_eq!(renamed.filename, "TheSora_Invoice_TS-2025-001.png");
        assert_eq!(renamed.bytes, vec![1, 2, 3]);
    }
}

// Helper: Open file and reveal in Finder/Explorer
fn open_and_reveal(path: &Path) {
    #[cfg(target_os = "macos")]
    Command::new("open").arg("-R").arg(path).spawn().ok();

    #[cfg(target_os = "windows")]
    Command::new("explorer")
        .arg(format!("/select,{}", path.to_string_lossy()))
        .spawn()
        .ok();

    #[cfg(target_os = "linux")]
    if let Some(parent) = path.parent() {
        Command::new("xdg-open").arg(parent).spawn().ok();
    }
}
