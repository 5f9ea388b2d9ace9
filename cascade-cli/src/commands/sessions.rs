use std::sync::Arc;

use clap::{Args, Subcommand};
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};

use cascade_core::{
    ActivationRecord, AwaitOptions, AwaitResult, HttpConductor, ListOptions, NameFilter,
    ResultProjector, SelectorRequest, SessionAwaiter, SessionLister, SessionRecord,
    SessionStatus, DEFAULT_LIST_LIMIT,
};

use crate::config::CliConfig;

#[derive(Subcommand)]
pub enum SessionCommand {
    #[command(
        about = "Await a session and show the resolved record",
        visible_alias = "await"
    )]
    Get {
        #[command(flatten)]
        target: TargetArgs,

        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },

    #[command(about = "Await a session and print only its result payload")]
    Result {
        #[command(flatten)]
        target: TargetArgs,
    },

    #[command(about = "List recent sessions")]
    List {
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT, help = "Page size")]
        limit: usize,

        #[arg(long, help = "Offset into the listing")]
        skip: Option<usize>,

        #[arg(long, help = "Filter by workflow name")]
        name: Option<String>,

        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },
}

/// Which session to await, plus the polling knobs.
#[derive(Args, Clone)]
pub struct TargetArgs {
    #[arg(help = "Session id")]
    session_id: Option<String>,

    #[arg(
        long,
        num_args = 0..=1,
        require_equals = true,
        value_name = "WORKFLOW",
        help = "Await the most recent session, optionally of one workflow"
    )]
    last: Option<Option<String>>,

    #[arg(
        long = "last-failed",
        num_args = 0..=1,
        require_equals = true,
        value_name = "WORKFLOW",
        help = "Await the most recent failed session, optionally of one workflow"
    )]
    last_failed: Option<Option<String>>,

    #[arg(
        long,
        value_name = "DURATION",
        help = "How long each completion probe may block (e.g. 45s, 2m; default 30s)"
    )]
    timeout: Option<String>,

    #[arg(long, default_value_t = DEFAULT_LIST_LIMIT, help = "Page size for --last/--last-failed")]
    limit: usize,

    #[arg(long, help = "Offset for --last/--last-failed")]
    skip: Option<usize>,
}

impl TargetArgs {
    fn into_parts(self, raw_args: &[String]) -> (SelectorRequest, AwaitOptions) {
        let request = SelectorRequest {
            session_id: self
                .session_id
                .map(|id| recover_raw_id(&id, raw_args)),
            last: self.last.map(NameFilter::from),
            last_failed: self.last_failed.map(NameFilter::from),
        };
        let options = AwaitOptions {
            timeout: self.timeout,
            list: ListOptions {
                limit: self.limit,
                skip: self.skip,
            },
        };
        (request, options)
    }
}

/// Re-anchor a session id to its raw argv spelling.
///
/// Ids are opaque strings, but all-numeric ids that transit a front end with
/// numeric argv coercion (shell wrappers, older launchers) can come back
/// reformatted, e.g. "00123" as "123". When the captured id parses as a
/// number, prefer the raw token that is numerically equal but spelled
/// differently.
fn recover_raw_id(parsed: &str, raw_args: &[String]) -> String {
    let Ok(parsed_num) = parsed.parse::<f64>() else {
        return parsed.to_string();
    };
    raw_args
        .iter()
        .find(|arg| {
            arg.as_str() != parsed
                && arg
                    .parse::<f64>()
                    .map(|n| n == parsed_num)
                    .unwrap_or(false)
        })
        .cloned()
        .unwrap_or_else(|| parsed.to_string())
}

pub async fn handle_session_command(cmd: SessionCommand) -> anyhow::Result<()> {
    let config = CliConfig::load()?;
    tracing::debug!(conductor = %config.conductor_url, "dispatching session command");
    let backend = Arc::new(HttpConductor::new(&config.conductor_url));
    let raw_args: Vec<String> = std::env::args().collect();

    match cmd {
        SessionCommand::Get { target, format } => {
            let (request, options) = target.into_parts(&raw_args);
            let awaiter = SessionAwaiter::with_poll_config(backend, config.poll);
            let result = awaiter
                .run(&request, &options, &ResultProjector::full())
                .await?;
            render_await_result(&result, &format)
        }
        SessionCommand::Result { target } => {
            let (request, options) = target.into_parts(&raw_args);
            let awaiter = SessionAwaiter::with_poll_config(backend, config.poll);
            let result = awaiter
                .run(&request, &options, &ResultProjector::result_only())
                .await?;
            match result {
                AwaitResult::Projected(value) => {
                    println!("{}", serde_json::to_string_pretty(&value)?);
                    Ok(())
                }
                // the id named a plain activation; show its payload instead
                AwaitResult::Activation(activation) => {
                    let value = activation.result.unwrap_or(serde_json::Value::Null);
                    println!("{}", serde_json::to_string_pretty(&value)?);
                    Ok(())
                }
                AwaitResult::Session(record) => {
                    let value = record.result.clone().unwrap_or(serde_json::Value::Null);
                    println!("{}", serde_json::to_string_pretty(&value)?);
                    Ok(())
                }
            }
        }
        SessionCommand::List {
            limit,
            skip,
            name,
            format,
        } => cmd_session_list(backend.as_ref(), limit, skip, name, &format).await,
    }
}

async fn cmd_session_list(
    backend: &HttpConductor,
    limit: usize,
    skip: Option<usize>,
    name: Option<String>,
    format: &str,
) -> anyhow::Result<()> {
    let lister = SessionLister::new(backend);
    let summaries = lister
        .list(&NameFilter::from(name), &ListOptions { limit, skip })
        .await?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if summaries.is_empty() {
        println!("{}", "No sessions found.".yellow());
        return Ok(());
    }

    println!("{}", "Sessions".cyan().bold());
    println!();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Session ID").fg(Color::White),
            Cell::new("Workflow").fg(Color::White),
            Cell::new("Status").fg(Color::White),
        ]);

    for summary in &summaries {
        let status = if summary.is_failed() {
            Cell::new(format!("failed ({})", summary.status_code)).fg(Color::Red)
        } else {
            Cell::new("success").fg(Color::Green)
        };
        table.add_row(vec![
            Cell::new(&summary.session_id),
            Cell::new(&summary.workflow_name),
            status,
        ]);
    }

    println!("{table}");
    println!();
    let failed = summaries.iter().filter(|s| s.is_failed()).count();
    println!("  Total: {} session(s) ({} failed)", summaries.len(), failed);

    Ok(())
}

fn render_await_result(result: &AwaitResult, format: &str) -> anyhow::Result<()> {
    if format == "json" {
        let value = match result {
            AwaitResult::Session(record) => serde_json::to_value(record)?,
            AwaitResult::Activation(activation) => serde_json::to_value(activation)?,
            AwaitResult::Projected(value) => value.clone(),
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    match result {
        AwaitResult::Session(record) => print_session_record(record),
        AwaitResult::Activation(activation) => print_activation_record(activation),
        AwaitResult::Projected(value) => {
            println!("{}", serde_json::to_string_pretty(value)?);
            Ok(())
        }
    }
}

fn print_session_record(record: &SessionRecord) -> anyhow::Result<()> {
    println!("{}", "Session".cyan().bold());
    println!("{}", "═".repeat(50).dimmed());
    println!();

    println!("  {:<14} {}", "Session ID:".bold(), record.session_id);
    if let Some(workflow) = record
        .workflow_name
        .as_deref()
        .or_else(|| record.path_annotation())
    {
        println!("  {:<14} {}", "Workflow:".bold(), workflow);
    }
    println!("  {:<14} {}", "Status:".bold(), colorize_status(record.status));

    if let Some(start) = record.start {
        println!(
            "  {:<14} {}",
            "Started:".bold(),
            start.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    if let Some(end) = record.end {
        println!(
            "  {:<14} {}",
            "Ended:".bold(),
            end.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    if let Some(duration) = record.duration_seconds() {
        println!("  {:<14} {}", "Duration:".bold(), format_duration(duration));
    }

    if !record.modes.is_empty() {
        println!();
        println!("  {}", "Views".yellow().bold());
        for mode in &record.modes {
            let label = mode.label.as_deref().unwrap_or(&mode.mode);
            match &mode.direct {
                Some(command) => println!("    {:<14} {}", label, command.dimmed()),
                None => println!("    {label}"),
            }
        }
    }

    if let Some(command) = &record.open_command {
        println!();
        println!("  {:<14} {}", "Open with:".bold(), command.dimmed());
    }

    if let Some(result) = &record.result {
        println!();
        println!("  {}", "Result".yellow().bold());
        for line in serde_json::to_string_pretty(result)?.lines() {
            println!("    {line}");
        }
    }

    Ok(())
}

fn print_activation_record(activation: &ActivationRecord) -> anyhow::Result<()> {
    println!("{}", "Activation".cyan().bold());
    println!("{}", "═".repeat(50).dimmed());
    println!();

    println!(
        "  {:<14} {}",
        "Activation ID:".bold(),
        activation.activation_id
    );
    if let Some(name) = &activation.name {
        println!("  {:<14} {}", "Name:".bold(), name);
    }
    let status = if activation.status_code == 0 {
        "success".green().to_string()
    } else {
        format!("failed ({})", activation.status_code).red().to_string()
    };
    println!("  {:<14} {}", "Status:".bold(), status);

    if let Some(result) = &activation.result {
        println!();
        println!("  {}", "Result".yellow().bold());
        for line in serde_json::to_string_pretty(result)?.lines() {
            println!("    {line}");
        }
    }

    Ok(())
}

fn colorize_status(status: SessionStatus) -> String {
    match status {
        SessionStatus::Success => status.to_string().green().to_string(),
        SessionStatus::Failed => status.to_string().red().to_string(),
        SessionStatus::Running => status.to_string().yellow().to_string(),
    }
}

fn format_duration(seconds: i64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_recover_raw_id_restores_leading_zeros() {
        let raw = args(&["cascade", "session", "get", "00123"]);
        assert_eq!(recover_raw_id("123", &raw), "00123");
    }

    #[test]
    fn test_recover_raw_id_ignores_non_numeric_ids() {
        let raw = args(&["cascade", "session", "get", "abc-123"]);
        assert_eq!(recover_raw_id("abc-123", &raw), "abc-123");
    }

    #[test]
    fn test_recover_raw_id_keeps_exact_numeric_token() {
        // the raw token is identical to the parsed one; nothing to recover
        let raw = args(&["cascade", "session", "get", "123"]);
        assert_eq!(recover_raw_id("123", &raw), "123");
    }

    #[test]
    fn test_recover_raw_id_without_matching_token() {
        let raw = args(&["cascade", "session", "get", "--last"]);
        assert_eq!(recover_raw_id("123", &raw), "123");
    }

    #[test]
    fn test_target_args_plumb_into_selector_request() {
        let target = TargetArgs {
            session_id: None,
            last: Some(Some("demo".to_string())),
            last_failed: None,
            timeout: Some("45s".to_string()),
            limit: 50,
            skip: Some(5),
        };
        let (request, options) = target.into_parts(&[]);

        assert_eq!(request.last, Some(NameFilter::Named("demo".to_string())));
        assert!(request.last_failed.is_none());
        assert!(request.session_id.is_none());
        assert_eq!(options.timeout.as_deref(), Some("45s"));
        assert_eq!(options.list.limit, 50);
        assert_eq!(options.list.skip, Some(5));
    }

    #[test]
    fn test_bare_last_flag_means_any_workflow() {
        let target = TargetArgs {
            session_id: None,
            last: Some(None),
            last_failed: None,
            timeout: None,
            limit: DEFAULT_LIST_LIMIT,
            skip: None,
        };
        let (request, _) = target.into_parts(&[]);
        assert_eq!(request.last, Some(NameFilter::Any));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(42), "42s");
        assert_eq!(format_duration(90), "1m 30s");
        assert_eq!(format_duration(3900), "1h 5m");
    }
}
