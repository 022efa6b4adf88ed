//! CSV ingest and normalization.
//!
//! This module turns a sales export (`;`-separated, decimal commas) into clean
//! `TransactionRecord`s that are safe to model.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors before any fitting)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (no hidden randomness)
//! - **Separation of concerns**: no modeling logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::TransactionRecord;
use crate::error::{AppError, Stage};

const REQUIRED_COLUMNS: [&str; 4] = ["quantidade", "preco_unitario", "valor_total", "campanha"];

/// Summary of the records actually kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetStats {
    pub n_records: usize,
    pub total_revenue: f64,
    /// Sum of `lucro` over records that carry a cost.
    pub total_profit: Option<f64>,
    /// Mean of `margem_lucro` (percent) over records that carry a cost.
    pub mean_margin_pct: Option<f64>,
    pub campaign_share: f64,
    pub mean_satisfaction: Option<f64>,
    pub first_sale: Option<NaiveDate>,
    pub last_sale: Option<NaiveDate>,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: adapted records + stats + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub records: Vec<TransactionRecord>,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

impl IngestedData {
    /// Wrap already-adapted records (e.g. synthetic samples).
    pub fn from_records(records: Vec<TransactionRecord>) -> Result<Self, AppError> {
        let stats = compute_stats(&records)
            .ok_or_else(|| AppError::input_shape(Stage::Load, "No records to summarize."))?;
        let n = records.len();
        Ok(Self {
            records,
            stats,
            row_errors: Vec::new(),
            rows_read: n,
            rows_used: n,
        })
    }
}

/// Load and adapt a sales CSV file.
pub fn load_transactions(path: &Path, no_campaign_label: &str) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::io(Stage::Load, format!("Failed to open CSV '{}': {e}", path.display())))?;
    let data = read_transactions(file, no_campaign_label)?;
    info!(
        path = %path.display(),
        rows_read = data.rows_read,
        rows_used = data.rows_used,
        "dataset loaded"
    );
    Ok(data)
}

/// Adapt sales CSV content from any reader.
pub fn read_transactions<R: Read>(reader: R, no_campaign_label: &str) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::io(Stage::Load, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1 and CSV lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_row(&record, &header_map, no_campaign_label));
        match parsed {
            Ok(r) => records.push(r),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if !row_errors.is_empty() {
        warn!(skipped = row_errors.len(), first = %row_errors[0].message, "skipped invalid rows");
    }

    let rows_used = records.len();
    let stats = compute_stats(&records).ok_or_else(|| {
        AppError::input_shape(
            Stage::Load,
            format!("No valid rows remain after normalization ({rows_read} read)."),
        )
    })?;

    Ok(IngestedData {
        records,
        stats,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a BOM.
    let name = name.trim().trim_start_matches('\u{feff}').trim();
    name.to_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !header_map.contains_key(*c))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(AppError::input_shape(
        Stage::Load,
        format!("Missing required column(s): {}", missing.join(", ")),
    ))
}

fn parse_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    no_campaign_label: &str,
) -> Result<TransactionRecord, String> {
    let quantity = parse_quantity(get_required(record, header_map, "quantidade")?)?;
    let unit_price = parse_decimal(get_required(record, header_map, "preco_unitario")?)
        .ok_or_else(|| "Invalid `preco_unitario` value.".to_string())?;
    if unit_price <= 0.0 {
        return Err(format!("`preco_unitario` must be > 0, got {unit_price}."));
    }
    let total_value = parse_decimal(get_required(record, header_map, "valor_total")?)
        .ok_or_else(|| "Invalid `valor_total` value.".to_string())?;
    let campaign = get_required(record, header_map, "campanha")?.to_string();
    let has_campaign = campaign != no_campaign_label.trim();

    let total_cost = match get_optional(record, header_map, "custo_total") {
        Some(s) => Some(parse_decimal(s).ok_or_else(|| "Invalid `custo_total` value.".to_string())?),
        None => None,
    };
    let satisfaction = match get_optional(record, header_map, "satisfacao_cliente") {
        Some(s) => Some(parse_decimal(s).ok_or_else(|| "Invalid `satisfacao_cliente` value.".to_string())?),
        None => None,
    };
    let sale_date = match get_optional(record, header_map, "data_venda") {
        Some(s) => Some(parse_date(s)?),
        None => None,
    };

    Ok(TransactionRecord {
        sale_date,
        quantity,
        unit_price,
        total_value,
        total_cost,
        campaign,
        has_campaign,
        satisfaction,
        channel: get_optional(record, header_map, "canal_venda").map(str::to_string),
        region: get_optional(record, header_map, "regiao").map(str::to_string),
    })
}

fn compute_stats(records: &[TransactionRecord]) -> Option<DatasetStats> {
    if records.is_empty() {
        return None;
    }
    let n = records.len() as f64;

    let total_revenue: f64 = records.iter().map(|r| r.total_value).sum();

    let profits: Vec<f64> = records.iter().filter_map(TransactionRecord::profit).collect();
    let total_profit: Option<f64> = (!profits.is_empty()).then(|| profits.iter().sum());

    let margins: Vec<f64> = records.iter().filter_map(TransactionRecord::margin_pct).collect();
    let mean_margin_pct = mean(&margins);

    let satisfaction: Vec<f64> = records.iter().filter_map(|r| r.satisfaction).collect();
    let mean_satisfaction = mean(&satisfaction);

    let campaign_share = records.iter().filter(|r| r.has_campaign).count() as f64 / n;

    Some(DatasetStats {
        n_records: records.len(),
        total_revenue,
        total_profit,
        mean_margin_pct,
        campaign_share,
        mean_satisfaction,
        first_sale: records.iter().filter_map(|r| r.sale_date).min(),
        last_sale: records.iter().filter_map(|r| r.sale_date).max(),
    })
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a localized number: `1234,56`, `1.234,56` or plain `1234.56`.
fn parse_decimal(s: &str) -> Option<f64> {
    let s = s.trim();
    let normalized = if s.contains(',') {
        s.replace('.', "").replace(',', ".")
    } else {
        s.to_string()
    };
    let v = normalized.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

fn parse_quantity(s: &str) -> Result<u32, String> {
    let v = parse_decimal(s).ok_or_else(|| format!("Invalid `quantidade` value '{s}'."))?;
    if v.fract() != 0.0 || v < 1.0 || v > f64::from(u32::MAX) {
        return Err(format!("`quantidade` must be a positive integer, got '{s}'."));
    }
    Ok(v as u32)
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const SAMPLE: &str = "\u{feff}data_venda; Quantidade ;preco_unitario;valor_total;custo_total;campanha;satisfacao_cliente;canal_venda\n\
        2024-01-05;10;150,50;1505,00;903,00;Nenhuma;8,5;Loja\n\
        2024-01-06;3;1.200,00;3240,00;2160,00;Black Friday;9;Online\n\
        2024-01-07;abc;10,00;10,00;5,00;Nenhuma;7;Loja\n\
        07/01/2024;2;20,00;40,00;;Natal;;\n";

    #[test]
    fn parses_localized_csv() {
        let data = read_transactions(SAMPLE.as_bytes(), "Nenhuma").unwrap();

        assert_eq!(data.rows_read, 4);
        assert_eq!(data.rows_used, 3);
        assert_eq!(data.row_errors.len(), 1);
        assert_eq!(data.row_errors[0].line, 4);

        let first = &data.records[0];
        assert_eq!(first.quantity, 10);
        assert!((first.unit_price - 150.5).abs() < 1e-12);
        assert!(!first.has_campaign);
        assert_eq!(first.channel.as_deref(), Some("Loja"));

        let second = &data.records[1];
        assert!((second.unit_price - 1200.0).abs() < 1e-12);
        assert!(second.has_campaign);
        assert!((second.profit().unwrap() - 1080.0).abs() < 1e-9);

        let third = &data.records[2];
        assert_eq!(third.total_cost, None);
        assert_eq!(third.sale_date, NaiveDate::from_ymd_opt(2024, 1, 7));
    }

    #[test]
    fn stats_summarize_kept_rows() {
        let data = read_transactions(SAMPLE.as_bytes(), "Nenhuma").unwrap();
        let stats = &data.stats;

        assert_eq!(stats.n_records, 3);
        assert!((stats.total_revenue - (1505.0 + 3240.0 + 40.0)).abs() < 1e-9);
        assert!((stats.total_profit.unwrap() - (602.0 + 1080.0)).abs() < 1e-9);
        assert!((stats.mean_margin_pct.unwrap() - ((40.0 + 100.0 / 3.0) / 2.0)).abs() < 1e-9);
        assert!((stats.campaign_share - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(stats.first_sale, NaiveDate::from_ymd_opt(2024, 1, 5));
    }

    #[test]
    fn missing_required_column_fails_before_rows() {
        let csv = "quantidade;preco_unitario;valor_total\n1;2,0;2,0\n";
        let err = read_transactions(csv.as_bytes(), "Nenhuma").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputShape);
        assert!(err.message().contains("campanha"));
    }

    #[test]
    fn all_rows_invalid_is_an_error() {
        let csv = "quantidade;preco_unitario;valor_total;campanha\n0;2,0;2,0;Nenhuma\n";
        let err = read_transactions(csv.as_bytes(), "Nenhuma").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InputShape);
    }

    #[test]
    fn parse_decimal_handles_locales() {
        assert_eq!(parse_decimal("1234,5"), Some(1234.5));
        assert_eq!(parse_decimal("1.234,5"), Some(1234.5));
        assert_eq!(parse_decimal("1234.5"), Some(1234.5));
        assert_eq!(parse_decimal("x"), None);
    }
}
