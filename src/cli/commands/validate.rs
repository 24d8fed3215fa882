//! `eoscfg validate` command - Check config files for errors

use console::style;
use miette::Result;
use serde::Serialize;
use serde_json::Value;

use crate::cli::output::{print_json, print_summary_title};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::config::{
    Config, ConfigError, ConfigFile, ConfigStore, LegacyConfig, Platform, ProductConfig,
    SteamConfig,
};
use crate::json::parse_json;
use crate::schema::{
    check_platform_references, validate_document, DocumentKind, FieldIssue, SchemaRegistry,
    Severity,
};

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Strict mode - warnings become errors
    #[arg(long)]
    pub strict: bool,

    /// Show summary only, don't show individual issues
    #[arg(long)]
    pub summary: bool,
}

/// Validation statistics
#[derive(Default)]
struct ValidationStats {
    files_checked: usize,
    files_passed: usize,
    files_failed: usize,
    total_errors: usize,
    total_warnings: usize,
}

/// Issues found in one file
#[derive(Debug, Serialize)]
struct FileReport {
    file: String,
    issues: Vec<FieldIssue>,
}

impl FileReport {
    fn errors(&self) -> usize {
        self.issues.iter().filter(|i| i.is_error()).count()
    }

    fn warnings(&self) -> usize {
        self.issues.len() - self.errors()
    }

    fn failed(&self, strict: bool) -> bool {
        self.errors() > 0 || (strict && self.warnings() > 0)
    }
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let store = ConfigStore::resolve(global.dir.clone())?;
    let registry = SchemaRegistry::default();

    if !store.exists(ProductConfig::FILE_NAME) && !store.exists(LegacyConfig::FILE_NAME) {
        return Err(ConfigError::NotFound {
            path: store.path_for(ProductConfig::FILE_NAME),
        }
        .into());
    }

    let mut reports = Vec::new();
    let mut syntax_errors = Vec::new();

    let product = if store.exists(ProductConfig::FILE_NAME) {
        let mut report = check_file(&store, &registry, ProductConfig::FILE_NAME, &mut syntax_errors);
        let outdated = store
            .load_product_config()
            .is_ok_and(|stored| stored.needs_migration());
        if outdated {
            report.issues.push(FieldIssue::warning(
                "",
                "Product config is out of date, run `eoscfg migrate`",
            ));
        }
        reports.push(report);
        store.load_migrated_product_config().ok().map(|(config, _)| config)
    } else {
        reports.push(FileReport {
            file: LegacyConfig::FILE_NAME.to_string(),
            issues: vec![FieldIssue::warning(
                "",
                "Only the legacy config exists, run `eoscfg migrate`",
            )],
        });
        store.load_migrated_product_config().ok().map(|(config, _)| config)
    };

    for platform in Platform::all() {
        let file = platform.file_name();
        if !store.exists(&file) {
            continue;
        }

        let mut report = check_file(&store, &registry, &file, &mut syntax_errors);
        if let (Some(product), Ok(config)) = (&product, store.load_platform_config(*platform)) {
            report.issues.extend(check_platform_references(product, &config));
        }
        reports.push(report);
    }

    if store.exists(SteamConfig::FILE_NAME) {
        reports.push(check_file(&store, &registry, SteamConfig::FILE_NAME, &mut syntax_errors));
    }

    let mut stats = ValidationStats::default();
    for report in &reports {
        stats.files_checked += 1;
        stats.total_errors += report.errors();
        stats.total_warnings += report.warnings();
        if report.failed(args.strict) {
            stats.files_failed += 1;
        } else {
            stats.files_passed += 1;
        }
    }

    if global.format == OutputFormat::Json {
        print_json(&reports)?;
    } else if !global.quiet {
        println!(
            "{} Validating {} file(s) in {}\n",
            style("→").blue(),
            reports.len(),
            store.dir().display()
        );

        if !args.summary {
            for report in &reports {
                print_report(report, args.strict);
            }
            for error in syntax_errors {
                println!("{:?}", error);
            }
        }

        println!();
        print_summary_title("Validation Summary");
        println!("  Files checked:  {}", style(stats.files_checked).cyan());
        println!("  Files passed:   {}", style(stats.files_passed).green());
        println!("  Files failed:   {}", style(stats.files_failed).red());
        println!("  Total errors:   {}", style(stats.total_errors).red());
        if stats.total_warnings > 0 {
            println!("  Total warnings: {}", style(stats.total_warnings).yellow());
        }
        println!();
    }

    if stats.files_failed > 0 {
        if stats.files_failed == 1 {
            Err(miette::miette!("Validation failed: 1 file has errors"))
        } else {
            Err(miette::miette!(
                "Validation failed: {} files have errors",
                stats.files_failed
            ))
        }
    } else {
        if global.format != OutputFormat::Json && !global.quiet {
            println!("{} All files passed validation!", style("✓").green().bold());
        }
        Ok(())
    }
}

/// Schema and field checks for one file. Syntax errors are kept as reports
/// to print with their source snippet.
fn check_file(
    store: &ConfigStore,
    registry: &SchemaRegistry,
    file: &str,
    syntax_errors: &mut Vec<miette::Report>,
) -> FileReport {
    let mut report = FileReport {
        file: file.to_string(),
        issues: Vec::new(),
    };

    let Some(kind) = DocumentKind::from_file_name(file) else {
        return report;
    };

    let content = match std::fs::read_to_string(store.path_for(file)) {
        Ok(content) => content,
        Err(e) => {
            report.issues.push(FieldIssue::error("", format!("Could not read file: {}", e)));
            return report;
        }
    };

    let document: Value = match parse_json(&content, file) {
        Ok(document) => document,
        Err(e) => {
            report.issues.push(FieldIssue::error("", e.to_string()));
            syntax_errors.push(miette::Report::new(e));
            return report;
        }
    };

    match validate_document(registry, kind, &document) {
        Ok(issues) => report.issues.extend(issues),
        Err(e) => report.issues.push(FieldIssue::error("", e.to_string())),
    }

    tracing::debug!(file, issues = report.issues.len(), "Checked file");
    report
}

fn print_report(report: &FileReport, strict: bool) {
    if report.issues.is_empty() {
        println!("{} {}", style("✓").green(), report.file);
        return;
    }

    let marker = if report.failed(strict) {
        style("✗").red()
    } else {
        style("!").yellow()
    };
    println!(
        "{} {} - {} error(s), {} warning(s)",
        marker,
        report.file,
        report.errors(),
        report.warnings()
    );

    for issue in &report.issues {
        let label = match issue.severity {
            Severity::Error => style("error").red(),
            Severity::Warning => style("warning").yellow(),
        };
        println!("    {} {}", label, issue);
    }
}
