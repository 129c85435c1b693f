use clap::ValueEnum;
use serde::Serialize;
use upkeep_core::UpkeepError;
use upkeep_predict::PredictError;
use upkeep_store::StoreError;
use upkeep_users::UserError;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Print `value` as pretty JSON, or hand it to `text` for the human layout.
pub(crate) fn emit<T: Serialize + ?Sized>(
    format: OutputFormat,
    value: &T,
    text: impl FnOnce(&T),
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => text(value),
    }
    Ok(())
}

/// Left-aligned columns sized to their widest cell.
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        println!("(none)");
        return;
    }
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }
    let line = |cells: Vec<&str>| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!("{c:<w$}"))
            .collect();
        println!("{}", padded.join("  ").trim_end());
    };
    line(headers.to_vec());
    for row in rows {
        line(row.iter().map(String::as_str).collect());
    }
}

pub(crate) fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

/// Stable error code for the failure, printed next to the message.
pub(crate) fn error_code(err: &anyhow::Error) -> &'static str {
    if let Some(e) = err.downcast_ref::<UpkeepError>() {
        return e.code();
    }
    if let Some(e) = err.downcast_ref::<UserError>() {
        return match e {
            UserError::NotFound(_) => "NOT_FOUND",
            UserError::AlreadyExists(_) => "ALREADY_EXISTS",
            UserError::DatabaseError(_) => "DATABASE_ERROR",
            UserError::InvalidRole(_) | UserError::InvalidInput(_) => "INVALID_INPUT",
        };
    }
    if let Some(e) = err.downcast_ref::<StoreError>() {
        return match e {
            StoreError::Database(_) => "DATABASE_ERROR",
            StoreError::NotFound { .. } => "NOT_FOUND",
            StoreError::InvalidDate { .. } => "INVALID_DATE_FORMAT",
            StoreError::InvalidField { .. } => "INVALID_INPUT",
        };
    }
    if err.downcast_ref::<PredictError>().is_some() {
        return "INVALID_DATE_FORMAT";
    }
    "ERROR"
}

pub(crate) fn report_error(err: &anyhow::Error, format: OutputFormat) {
    let code = error_code(err);
    match format {
        OutputFormat::Json => {
            let body = serde_json::json!({ "error": format!("{err:#}"), "code": code });
            eprintln!("{body}");
        }
        OutputFormat::Text => eprintln!("error [{code}]: {err:#}"),
    }
}
