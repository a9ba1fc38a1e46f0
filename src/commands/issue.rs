//! # Issue Command Handler
//!
//! Handles issue-related CLI commands: logging an incident, listing the
//! triage queue, and updating an issue as its status evolves.

use serde_json::{Value, json};

use crate::{
    Issue, cli_utils,
    commands::shared::{dispatch_command, validate_args_count_or_exit},
    http_utils,
};

const ISSUE_USAGE: &str = "Usage: questctl issue <list|create|update> [args...]";

/// Handles all issue-related commands.
pub async fn handle_issue_command(
    args: &[String],
    client: &http_utils::QuestboardClient,
    output_format: cli_utils::OutputFormat,
) {
    dispatch_command!("issue", ISSUE_USAGE, args, client, output_format, {
        "list" => handle_issue_list,
        "create" => handle_issue_create,
        "update" => handle_issue_update,
    });
}

async fn handle_issue_list(
    args: &[String],
    client: &http_utils::QuestboardClient,
    output_format: cli_utils::OutputFormat,
) {
    validate_args_count_or_exit(args, 1, 1, "list", "Usage: questctl issue list");

    let issues = http_utils::execute_or_exit(
        || client.fetch::<Vec<Issue>>("issues"),
        "Failed to list issues",
    )
    .await;

    if issues.is_empty() {
        println!("No issues found");
    } else {
        cli_utils::print_formatted_or_exit(&issues, output_format, "issues");
    }
}

async fn handle_issue_create(
    args: &[String],
    client: &http_utils::QuestboardClient,
    _output_format: cli_utils::OutputFormat,
) {
    validate_args_count_or_exit(
        args,
        7,
        7,
        "create",
        "Usage: questctl issue create <party> <job> <type> <priority> <status> <situation>",
    );

    let request = json!({
        "party": args[1],
        "job": args[2],
        "type": args[3],
        "priority": args[4],
        "status": args[5],
        "situation": args[6],
    });
    let issue = http_utils::execute_or_exit(
        || client.post::<Value, Issue>("issues", &request),
        "Failed to create issue",
    )
    .await;

    cli_utils::print_success(&format!("Created issue: {}", issue.id));
}

fn issue_update_body(field: &str, value: &str) -> Value {
    match field {
        "status" => json!({"status": value}),
        "situation" => json!({"situation": value}),
        "hasDetails" => match value {
            "true" => json!({"hasDetails": true}),
            "false" => json!({"hasDetails": false}),
            other => cli_utils::exit_with_error(&format!(
                "Invalid hasDetails value '{}'. Expected true or false",
                other
            )),
        },
        other => cli_utils::exit_with_error(&format!(
            "Unknown issue field '{}'. Updatable fields: status, situation, hasDetails",
            other
        )),
    }
}

async fn handle_issue_update(
    args: &[String],
    client: &http_utils::QuestboardClient,
    _output_format: cli_utils::OutputFormat,
) {
    validate_args_count_or_exit(
        args,
        4,
        4,
        "update",
        "Usage: questctl issue update <issue-id> <status|situation|hasDetails> <value>",
    );

    let path = format!("issues/{}", args[1]);
    let request = issue_update_body(&args[2], &args[3]);
    let issue = http_utils::execute_or_exit(
        || client.patch::<Value, Issue>(&path, &request),
        "Failed to update issue",
    )
    .await;

    cli_utils::print_success(&format!("Updated issue: {} ({})", issue.id, issue.status));
}
