//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `dossier_core` linkage, configuration and schema bootstrap.
//! - Optionally print a patient's antecedent summary: `dossier_cli <patient-id>`.
//! - Keep output deterministic for quick local sanity checks.

use dossier_core::db::migrations::current_version;
use dossier_core::{antecedent_service, init_logging_from_config, open_db, CoreConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("dossier_core ping={}", dossier_core::ping());
    println!("dossier_core version={}", dossier_core::core_version());

    match run(std::env::args().nth(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(patient_arg: Option<String>) -> Result<(), String> {
    let config = CoreConfig::from_env().map_err(|err| err.to_string())?;
    let logging = init_logging_from_config(&config).map_err(|err| err.to_string())?;
    println!("logging enabled={logging}");

    let conn = open_db(&config.db_path).map_err(|err| err.to_string())?;
    let version = current_version(&conn).map_err(|err| err.to_string())?;
    println!("db path={} schema_version={version}", config.db_path.display());

    let Some(raw) = patient_arg else {
        return Ok(());
    };
    let patient_id = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("`{raw}` is not a patient id"))?;
    let antecedents = antecedent_service(&conn)
        .get_by_patient_id(patient_id)
        .map_err(|err| err.to_string())?;

    println!("patient id={patient_id} antecedents={}", antecedents.len());
    for antecedent in antecedents {
        println!(
            "  #{} {} {}",
            antecedent.id,
            antecedent.kind.as_str(),
            antecedent.created_at.format("%Y-%m-%d")
        );
    }
    Ok(())
}
