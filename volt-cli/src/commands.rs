//! Command implementations: the entry form, list/stats views, export,
//! and the insight calls. Validation happens here, at the form boundary,
//! before anything reaches the store.

use anyhow::{Context, Result, anyhow, bail};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::NaiveDate;
use clap::Args;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use volt_core::{BillRecord, compute_totals};
use volt_store::{LocalStore, RemoteConfig, RemoteStore, Store};

use crate::auth;
use crate::config::Config;
use crate::export;
use crate::insight::{EMPTY_PLACEHOLDER, HttpGemini, InsightClient, ReceiptFields};
use crate::state;

/// Build the backend named in the config. Everything after this point is
/// backend-agnostic.
pub async fn open_store(cfg: &Config) -> Result<Store> {
    match cfg.store.backend.as_str() {
        "local" => Ok(Store::Local(LocalStore::open(state::bills_path()?)?)),
        "remote" => {
            let remote = cfg.store.remote.as_ref().context(
                "backend is \"remote\" but config has no [store.remote] section; run: volt init",
            )?;
            let store = RemoteStore::connect(RemoteConfig {
                base_url: remote.base_url.clone(),
                api_key: remote.api_key.clone(),
                table: remote.table.clone(),
            })
            .await?;
            Ok(Store::Remote(store))
        }
        other => bail!("unknown store backend '{other}' (expected \"local\" or \"remote\")"),
    }
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Purchase amount
    #[arg(long)]
    pub amount: Option<f64>,

    /// Date purchased, YYYY-MM-DD (default: today)
    #[arg(long)]
    pub purchased: Option<NaiveDate>,

    /// Date loaded onto the meter, YYYY-MM-DD (default: today)
    #[arg(long)]
    pub inserted: Option<NaiveDate>,

    /// Date the credit ran out (omit while still running)
    #[arg(long)]
    pub finished: Option<NaiveDate>,

    #[arg(long)]
    pub notes: Option<String>,

    /// Attach a receipt photo (stored with the record)
    #[arg(long)]
    pub receipt: Option<PathBuf>,

    /// Pre-fill amount and purchase date from the receipt via AI
    /// extraction; explicit flags win
    #[arg(long, requires = "receipt")]
    pub scan: bool,
}

pub async fn add(store: &mut Store, cfg: &Config, args: AddArgs) -> Result<()> {
    let receipt = match &args.receipt {
        Some(path) => Some(read_image(path)?),
        None => None,
    };

    let scanned = match (args.scan, &receipt) {
        (true, Some((mime, data))) => scan_receipt(cfg, mime, data).await,
        _ => ReceiptFields::default(),
    };

    let amount = args.amount.or(scanned.amount).ok_or_else(|| {
        anyhow!("an amount is required (pass --amount, or --scan a readable receipt)")
    })?;
    let scanned_date = scanned.date.as_deref().and_then(parse_iso_date);
    let today = chrono::Local::now().date_naive();

    let mut record = BillRecord::new(
        Uuid::new_v4().to_string(),
        args.purchased.or(scanned_date).unwrap_or(today),
        args.inserted.unwrap_or(today),
        amount,
    );
    record.date_finished = args.finished;
    record.notes = args.notes;
    record.receipt_image = receipt.map(|(_, data)| data);

    record.validate()?;
    let id = record.id.clone();
    store.save(record).await.context("saving record")?;
    println!("Saved record {id}");
    Ok(())
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Id of the record to replace
    pub id: String,

    #[arg(long)]
    pub amount: Option<f64>,

    #[arg(long)]
    pub purchased: Option<NaiveDate>,

    #[arg(long)]
    pub inserted: Option<NaiveDate>,

    #[arg(long)]
    pub finished: Option<NaiveDate>,

    /// Clear the finish date (mark the record active again)
    #[arg(long, conflicts_with = "finished")]
    pub clear_finished: bool,

    #[arg(long)]
    pub notes: Option<String>,

    #[arg(long)]
    pub receipt: Option<PathBuf>,
}

/// Full replace-by-id: unspecified flags keep the stored value, but the
/// store sees one whole-record upsert.
pub async fn edit(store: &mut Store, args: EditArgs) -> Result<()> {
    let mut record = store
        .list()
        .iter()
        .find(|r| r.id == args.id)
        .cloned()
        .with_context(|| format!("no record with id {}", args.id))?;

    if let Some(amount) = args.amount {
        record.amount_purchased = amount;
    }
    if let Some(purchased) = args.purchased {
        record.date_purchased = purchased;
    }
    if let Some(inserted) = args.inserted {
        record.date_inserted = inserted;
    }
    if args.clear_finished {
        record.date_finished = None;
    } else if let Some(finished) = args.finished {
        record.date_finished = Some(finished);
    }
    if let Some(notes) = args.notes {
        record.notes = if notes.is_empty() { None } else { Some(notes) };
    }
    if let Some(path) = &args.receipt {
        let (_, data) = read_image(path)?;
        record.receipt_image = Some(data);
    }

    record.validate()?;
    store.save(record).await.context("saving record")?;
    println!("Updated record {}", args.id);
    Ok(())
}

pub async fn delete(store: &mut Store, id: &str, yes: bool) -> Result<()> {
    if !yes && !confirm(&format!("Delete record {id}? This cannot be undone."))? {
        println!("Aborted.");
        return Ok(());
    }
    store.delete(id).await.context("deleting record")?;
    println!("Deleted {id}");
    Ok(())
}

pub fn list(store: &Store) {
    let records = store.list();
    if records.is_empty() {
        println!("No records yet. Add one with: volt add --amount <n>");
        return;
    }

    println!(
        "{:<36}  {:<10}  {:<10}  {:<10}  {:>10}  {:<8}  NOTES",
        "ID", "PURCHASED", "INSERTED", "FINISHED", "AMOUNT", "STATUS"
    );
    for r in records {
        println!(
            "{:<36}  {:<10}  {:<10}  {:<10}  {:>10.2}  {:<8}  {}",
            r.id,
            r.date_purchased.to_string(),
            r.date_inserted.to_string(),
            r.date_finished
                .map(|d| d.to_string())
                .unwrap_or_else(|| "ongoing".to_string()),
            r.amount_purchased,
            r.status().label(),
            r.notes.as_deref().unwrap_or("")
        );
    }
}

pub fn stats(store: &Store) {
    let totals = compute_totals(store.list());
    println!("Total spent:      {:.2}", totals.total_spent);
    println!("Avg bill amount:  {:.2}", totals.avg_spent);
    println!("Total entries:    {}", totals.entry_count);
    println!("Avg duration:     {} days", totals.avg_duration_days);
}

pub fn export(store: &Store, out: Option<PathBuf>) -> Result<()> {
    let records = store.list();
    if records.is_empty() {
        bail!("no records to export");
    }
    let path = out.unwrap_or_else(|| PathBuf::from(export::DEFAULT_EXPORT_FILE));
    export::write_csv(records, &path)?;
    println!("Exported {} records to {}", records.len(), path.display());
    Ok(())
}

pub async fn analyze(store: &Store, cfg: &Config) -> Result<()> {
    let records = store.list();
    if records.is_empty() {
        println!("{EMPTY_PLACEHOLDER}");
        return Ok(());
    }

    let key = auth::gemini_key()?.context(
        "missing Gemini API key; run: volt auth paste-gemini-key (or set GEMINI_API_KEY)",
    )?;
    let client = InsightClient::new(HttpGemini::new(key), cfg.insight.model.as_str());
    let report = client
        .analyze_usage(records)
        .await
        .context("analysis failed; re-run volt analyze to retry")?;
    println!("{report}");
    Ok(())
}

pub async fn scan(cfg: &Config, image: &Path) -> Result<()> {
    let (mime, data) = read_image(image)?;
    let fields = scan_receipt(cfg, &mime, &data).await;

    match (fields.amount, fields.date.as_deref()) {
        (None, None) => println!("Nothing extracted."),
        (amount, date) => {
            if let Some(a) = amount {
                println!("Amount: {a}");
            }
            if let Some(d) = date {
                println!("Date:   {d}");
            }
        }
    }
    Ok(())
}

/// Extraction path used by `scan` and `add --scan`. A missing key, like
/// any other failure, yields empty fields.
async fn scan_receipt(cfg: &Config, mime: &str, data_b64: &str) -> ReceiptFields {
    let Ok(Some(key)) = auth::gemini_key() else {
        log::warn!("no Gemini API key configured; skipping receipt extraction");
        return ReceiptFields::default();
    };
    let client = InsightClient::new(HttpGemini::new(key), cfg.insight.model.as_str());
    client.extract_from_image(mime, data_b64).await
}

fn read_image(path: &Path) -> Result<(String, String)> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let mime = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    };
    Ok((mime.to_string(), STANDARD.encode(&bytes)))
}

fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N]: ");
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(matches!(s.trim(), "y" | "Y" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_image_guesses_mime_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.png");
        fs::write(&path, b"not-really-a-png").unwrap();

        let (mime, data) = read_image(&path).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(data, STANDARD.encode(b"not-really-a-png"));

        let jpg = dir.path().join("receipt.JPG");
        fs::write(&jpg, b"x").unwrap();
        assert_eq!(read_image(&jpg).unwrap().0, "image/jpeg");
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(
            parse_iso_date("2024-03-01"),
            Some(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
        assert_eq!(parse_iso_date("03/01/2024"), None);
        assert_eq!(parse_iso_date(""), None);
    }
}
