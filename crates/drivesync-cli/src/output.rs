use std::io::IsTerminal;

use drivesync_core::domain::{Change, Operation};
use drivesync_sync::reconciler::{Direction, Plan, PlanSummary};

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Trait for formatting CLI output
pub trait OutputFormatter {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn info(&self, message: &str);
    fn print_json(&self, value: &serde_json::Value);
}

/// Human-readable output formatter with checkmarks and indentation
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn success(&self, message: &str) {
        println!("\u{2713} {}", message);
    }
    fn error(&self, message: &str) {
        eprintln!("\u{2717} Error: {}", message);
    }
    fn info(&self, message: &str) {
        println!("  {}", message);
    }
    fn print_json(&self, _value: &serde_json::Value) {
        // Human formatter doesn't print JSON
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn success(&self, message: &str) {
        println!(
            "{}",
            serde_json::json!({"success": true, "message": message})
        );
    }
    fn error(&self, message: &str) {
        println!("{}", error_document(message));
    }
    fn info(&self, _message: &str) {}
    fn print_json(&self, value: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_default()
        );
    }
}

/// The JSON document printed for a failed command
pub fn error_document(message: &str) -> serde_json::Value {
    serde_json::json!({"success": false, "error": message})
}

pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(HumanFormatter)
    }
}

// ============================================================================
// Plan rendering
// ============================================================================

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Colors are used only on a terminal and when `NO_COLOR` is unset
pub fn use_color() -> bool {
    std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// One plan line, e.g. `+ Addition /docs/a.txt`
pub fn render_change(change: &Change, color: bool, with_differences: bool) -> String {
    let symbol = change.symbol();
    let glyph = match (color, change.op()) {
        (false, _) | (true, Operation::None) => symbol.to_string(),
        (true, Operation::Add) => format!("{GREEN}{symbol}{RESET}"),
        (true, Operation::Delete) => format!("{RED}{symbol}{RESET}"),
        (true, Operation::Modify) => format!("{YELLOW}{symbol}{RESET}"),
    };

    let mut line = format!("{glyph} {:<12} {}", change.label(), change.path());
    if with_differences && change.op() == Operation::Modify {
        line.push_str(&format!(" ({})", change.differences()));
    }
    line
}

/// e.g. "3 changes: 1 addition, 1 deletion, 1 modification"
pub fn summary_line(summary: &PlanSummary) -> String {
    fn count(n: usize, noun: &str) -> String {
        if n == 1 {
            format!("{n} {noun}")
        } else {
            format!("{n} {noun}s")
        }
    }

    format!(
        "{}: {}, {}, {}",
        count(summary.active(), "change"),
        count(summary.additions, "addition"),
        count(summary.deletions, "deletion"),
        count(summary.modifications, "modification"),
    )
}

/// JSON document describing an ordered plan
///
/// Differences may hash file content, so they are only computed when
/// `with_differences` is set.
pub fn plan_to_json(plan: &Plan, direction: Direction, with_differences: bool) -> serde_json::Value {
    let changes: Vec<serde_json::Value> = plan
        .active()
        .map(|change| {
            let mut entry = serde_json::json!({
                "path": change.path().as_str(),
                "op": change.op(),
                "symbol": change.symbol(),
                "label": change.label(),
            });
            if with_differences {
                entry["differences"] = serde_json::json!(change.differences().names());
            }
            entry
        })
        .collect();

    serde_json::json!({
        "direction": direction,
        "summary": plan.summary(),
        "changes": changes,
    })
}

/// Prints a plan in the selected format
pub fn print_plan(
    formatter: &dyn OutputFormatter,
    format: OutputFormat,
    plan: &Plan,
    direction: Direction,
    quiet: bool,
    with_differences: bool,
) {
    if format == OutputFormat::Json {
        formatter.print_json(&plan_to_json(plan, direction, with_differences));
        return;
    }

    if plan.is_empty() {
        if !quiet {
            formatter.success("Everything is up-to-date.");
        }
        return;
    }

    let color = use_color();
    for change in plan.active() {
        println!("{}", render_change(change, color, with_differences));
    }
    if !quiet {
        formatter.info("");
        formatter.info(&summary_line(&plan.summary()));
    }
}
