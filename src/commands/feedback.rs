//! # Feedback Command Handler
//!
//! Handles feedback-related CLI commands: collecting a stakeholder
//! comment, listing the queue, and moving a record through review.

use serde_json::{Value, json};

use crate::{
    Feedback, cli_utils,
    commands::shared::{dispatch_command, validate_args_count_or_exit},
    http_utils,
};

const FEEDBACK_USAGE: &str = "Usage: questctl feedback <list|create|update> [args...]";

/// Handles all feedback-related commands.
pub async fn handle_feedback_command(
    args: &[String],
    client: &http_utils::QuestboardClient,
    output_format: cli_utils::OutputFormat,
) {
    dispatch_command!("feedback", FEEDBACK_USAGE, args, client, output_format, {
        "list" => handle_feedback_list,
        "create" => handle_feedback_create,
        "update" => handle_feedback_update,
    });
}

async fn handle_feedback_list(
    args: &[String],
    client: &http_utils::QuestboardClient,
    output_format: cli_utils::OutputFormat,
) {
    validate_args_count_or_exit(args, 1, 1, "list", "Usage: questctl feedback list");

    let feedback = http_utils::execute_or_exit(
        || client.fetch::<Vec<Feedback>>("feedback"),
        "Failed to list feedback",
    )
    .await;

    if feedback.is_empty() {
        println!("No feedback found");
    } else {
        cli_utils::print_formatted_or_exit(&feedback, output_format, "feedback");
    }
}

async fn handle_feedback_create(
    args: &[String],
    client: &http_utils::QuestboardClient,
    _output_format: cli_utils::OutputFormat,
) {
    validate_args_count_or_exit(
        args,
        4,
        4,
        "create",
        "Usage: questctl feedback create <name> <feature> <comments>",
    );

    let request = json!({
        "name": args[1],
        "feature": args[2],
        "comments": args[3],
    });
    let feedback = http_utils::execute_or_exit(
        || client.post::<Value, Feedback>("feedback", &request),
        "Failed to create feedback",
    )
    .await;

    cli_utils::print_success(&format!("Created feedback: {}", feedback.id));
}

async fn handle_feedback_update(
    args: &[String],
    client: &http_utils::QuestboardClient,
    _output_format: cli_utils::OutputFormat,
) {
    validate_args_count_or_exit(
        args,
        3,
        3,
        "update",
        "Usage: questctl feedback update <feedback-id> <New|Reviewed|Accepted|Rejected>",
    );

    let path = format!("feedback/{}", args[1]);
    let request = json!({"status": args[2]});
    let feedback = http_utils::execute_or_exit(
        || client.patch::<Value, Feedback>(&path, &request),
        "Failed to update feedback",
    )
    .await;

    cli_utils::print_success(&format!(
        "Updated feedback: {} ({})",
        feedback.id, feedback.status
    ));
}
