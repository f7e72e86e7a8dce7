//! Command line front end: budget export JSON in, ledger or beancount
//! text out.

use std::path::PathBuf;
use std::process::ExitCode;

use ynab_export::config::Configuration;
use ynab_export::entry::render::{entry_rows, OutputKind};
use ynab_export::entry::Entry;
use ynab_export::errors::ExportError;
use ynab_export::source::ynab::provider::{ProviderOptions, YnabProvider};

struct Args {
    budget_path: PathBuf,
    config_path: Option<PathBuf>,
    output: OutputKind,
    options: ProviderOptions,
}

const USAGE: &str =
    "usage: ynab_export_cli <budget.json> [--config <path>] [--format ledger|beancount] [--no-budget]";

fn parse_args() -> Result<Args, String> {
    let mut budget_path = None;
    let mut config_path = None;
    let mut output = OutputKind::Ledger;
    let mut options = ProviderOptions::default();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().ok_or("--config expects a path")?;
                config_path = Some(PathBuf::from(path));
            }
            "--format" => {
                output = match args.next().as_deref() {
                    Some("ledger") => OutputKind::Ledger,
                    Some("beancount") => OutputKind::Beancount,
                    _ => return Err("--format expects ledger or beancount".into()),
                };
            }
            "--no-budget" => options.budget = false,
            "--help" | "-h" => return Err(USAGE.into()),
            other if budget_path.is_none() => budget_path = Some(PathBuf::from(other)),
            other => return Err(format!("unexpected argument `{other}`")),
        }
    }
    let budget_path = budget_path.ok_or(USAGE)?;
    Ok(Args {
        budget_path,
        config_path,
        output,
        options,
    })
}

fn run(args: Args) -> Result<String, ExportError> {
    let config_path = args
        .config_path
        .unwrap_or_else(Configuration::default_path);
    let config = if config_path.exists() {
        Configuration::load(&config_path)?
    } else {
        Configuration::default()
    };

    let provider = YnabProvider::from_path(&args.budget_path)?;
    let entries = provider.export_entries(&config, args.options)?;
    render(&entries, args.output, &config)
}

fn render(
    entries: &[Entry],
    output: OutputKind,
    config: &Configuration,
) -> Result<String, ExportError> {
    let mut text = String::new();
    for entry in entries {
        let rows = entry_rows(entry, output)?;
        text.push_str(&header(entry, output));
        text.push('\n');
        if output == OutputKind::Beancount && config.beancount_tags {
            for (key, value) in &entry.metadata {
                if let Some(value) = value {
                    text.push_str(&format!("  {}: \"{}\"\n", key.replace('_', "-"), value));
                }
            }
        }
        for row in rows {
            text.push_str("    ");
            text.push_str(&row.values.join("  "));
            text.push('\n');
        }
        text.push('\n');
    }
    Ok(text)
}

fn header(entry: &Entry, output: OutputKind) -> String {
    let flag = if entry.cleared { '*' } else { '!' };
    match output {
        OutputKind::Ledger => {
            let mut line = format!(
                "{} {} {}",
                entry.record_date.format("%Y/%m/%d"),
                flag,
                entry.payee.as_deref().unwrap_or_default()
            );
            if let Some(memo) = &entry.memo {
                line.push_str(&format!("  ; {memo}"));
            }
            line
        }
        OutputKind::Beancount => format!(
            "{} {} \"{}\" \"{}\"",
            entry.record_date,
            flag,
            entry.payee.as_deref().unwrap_or_default(),
            entry.memo.as_deref().unwrap_or_default()
        ),
    }
}

fn main() -> ExitCode {
    ynab_export::init();
    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };
    match run(args) {
        Ok(text) => {
            print!("{text}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}
