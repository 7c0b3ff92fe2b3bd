use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Png,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Png => "png",
        }
    }
}

/// A finished artifact: the compiled bytes plus where they live on disk.
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub bytes: Vec<u8>,
    pub path: PathBuf,
    pub filename: String,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("'typst' is not installed. Please install it (brew install typst).")]
    TypstMissing,
    #[error("typst compilation failed: {0}")]
    CompileFailed(String),
    #[error("export I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Compiles rendered Typst markup into a PDF or PNG under `out_dir`.
/// The artifact is compiled to a scratch path and only moved into place on
/// success, so a failed export never leaves a partial file behind.
pub fn export_document(
    typst_source: &str,
    format: ExportFormat,
    filename_base: &str,
    out_dir: &Path,
) -> Result<ExportedFile, ExportError> {
    if Command::new("typst").arg("--version").output().is_err() {
        return Err(ExportError::TypstMissing);
    }

    fs::create_dir_all(out_dir)?;

    let typ_path = out_dir.join(format!("{}.typ", filename_base));
    fs::write(&typ_path, typst_source)?;

    let filename = format!("{}.{}", filename_base, format.extension());
    let scratch_path = out_dir.join(format!(".{}.part", filename));
    let final_path = out_dir.join(&filename);

    // The scratch extension hides the format, so pass it explicitly
    let mut cmd = Command::new("typst");
    cmd.arg("compile").arg("--format").arg(format.extension());
    if format == ExportFormat::Png {
        // 2x density for quality, matching on-screen export scale
        cmd.arg("--ppi").arg("288");
    }
    let output = cmd.arg(&typ_path).arg(&scratch_path).output()?;

    if !output.status.success() {
        fs::remove_file(&scratch_path).ok();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(ExportError::CompileFailed(stderr));
    }

    fs::rename(&scratch_path, &final_path)?;
    let bytes = fs::read(&final_path)?;

    Ok(ExportedFile {
        bytes,
        path: final_path,
        filename,
    })
}

// ==========================================
// Filename conventions
// ==========================================

pub fn invoice_filename_base(invoice_number: &str) -> String {
    let number = if invoice_number.is_empty() { "001" } else { invoice_number };
    format!("Invoice-{}", number)
}

/// Filename used when the invoice is emailed rather than saved directly.
pub fn invoice_email_filename_base(invoice_number: &str) -> String {
    let number = if invoice_number.is_empty() { "001" } else { invoice_number };
    format!("TheSora_Invoice_{}", number)
}

pub fn contract_filename_base(client_name: &str, today: NaiveDate) -> String {
    format!(
        "TheSora_Agreement_{}_{}",
        client_name_slug(client_name),
        today.format("%b-%d-%Y")
    )
}

/// Whitespace runs become hyphens; an empty name falls back to "Client".
pub fn client_name_slug(name: &str) -> String {
    let parts: Vec<&str> = name.split_whitespace().collect();
    if parts.is_empty() {
        "Client".to_string()
    } else {
        parts.join("-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoice_filenames_use_invoice_number() {
        assert_eq!(invoice_filename_base("TS-2025-001"), "Invoice-TS-2025-001");
        assert_eq!(invoice_filename_base(""), "Invoice-001");
        assert_eq!(
            invoice_email_filename_base("TS-2025-001"),
            "TheSora_Invoice_TS-2025-001"
        );
    }

    #[test]
    fn contract_filename_slugs_client_and_date() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
        assert_eq!(
            contract_filename_base("Jane Doe", today),
            "TheSora_Agreement_Jane-Doe_Aug-25-2026"
        );
    }

    #[test]
    fn client_slug_falls_back_when_empty() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 2).unwrap();
        assert_eq!(client_name_slug(""), "Client");
        assert_eq!(client_name_slug("   "), "Client");
        assert_eq!(client_name_slug("Jane   Q  Doe"), "Jane-Q-Doe");
        assert_eq!(
            contract_filename_base("", today),
            "TheSora_Agreement_Client_Jan-02-2026"
        );
    }

    #[test]
    fn png_exports_carry_png_extension() {
        assert_eq!(ExportFormat::Png.extension(), "png");
        assert_eq!(ExportFormat::Pdf.extension(), "pdf");
    }
}
