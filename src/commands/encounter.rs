//! # Encounter Command Handler
//!
//! Handles encounter-related CLI commands. Encounters are loaded at setup;
//! the `update` subcommand covers the event-time workflow of marking a
//! beat complete or replacing its notes.

use serde_json::{Value, json};

use crate::{
    Encounter, cli_utils,
    commands::shared::{dispatch_command, validate_args_count_or_exit},
    http_utils,
};

const ENCOUNTER_USAGE: &str = "Usage: questctl encounter <list|for-party|update> [args...]";

/// Handles all encounter-related commands.
pub async fn handle_encounter_command(
    args: &[String],
    client: &http_utils::QuestboardClient,
    output_format: cli_utils::OutputFormat,
) {
    dispatch_command!("encounter", ENCOUNTER_USAGE, args, client, output_format, {
        "list" => handle_encounter_list,
        "for-party" => handle_encounter_for_party,
        "update" => handle_encounter_update,
    });
}

async fn handle_encounter_list(
    args: &[String],
    client: &http_utils::QuestboardClient,
    output_format: cli_utils::OutputFormat,
) {
    validate_args_count_or_exit(args, 1, 1, "list", "Usage: questctl encounter list");

    let encounters = http_utils::execute_or_exit(
        || client.fetch::<Vec<Encounter>>("encounters"),
        "Failed to list encounters",
    )
    .await;

    if encounters.is_empty() {
        println!("No encounters found");
    } else {
        cli_utils::print_formatted_or_exit(&encounters, output_format, "encounters");
    }
}

async fn handle_encounter_for_party(
    args: &[String],
    client: &http_utils::QuestboardClient,
    output_format: cli_utils::OutputFormat,
) {
    validate_args_count_or_exit(
        args,
        2,
        2,
        "for-party",
        "Usage: questctl encounter for-party <party-id>",
    );

    let path = format!("encounters/party/{}", args[1]);
    let encounters = http_utils::execute_or_exit(
        || client.fetch::<Vec<Encounter>>(&path),
        "Failed to list encounters",
    )
    .await;

    if encounters.is_empty() {
        println!("No encounters found");
    } else {
        cli_utils::print_formatted_or_exit(&encounters, output_format, "encounters");
    }
}

/// Builds the PATCH body for one field assignment, typing `completed` as a
/// boolean and `notes` as text.
fn encounter_update_body(field: &str, value: &str) -> Value {
    match field {
        "completed" => match value {
            "true" => json!({"completed": true}),
            "false" => json!({"completed": false}),
            other => cli_utils::exit_with_error(&format!(
                "Invalid completed value '{}'. Expected true or false",
                other
            )),
        },
        "notes" => json!({"notes": value}),
        other => cli_utils::exit_with_error(&format!(
            "Unknown encounter field '{}'. Updatable fields: completed, notes",
            other
        )),
    }
}

async fn handle_encounter_update(
    args: &[String],
    client: &http_utils::QuestboardClient,
    _output_format: cli_utils::OutputFormat,
) {
    validate_args_count_or_exit(
        args,
        4,
        4,
        "update",
        "Usage: questctl encounter update <encounter-id> <completed|notes> <value>",
    );

    let path = format!("encounters/{}", args[1]);
    let request = encounter_update_body(&args[2], &args[3]);
    let encounter = http_utils::execute_or_exit(
        || client.patch::<Value, Encounter>(&path, &request),
        "Failed to update encounter",
    )
    .await;

    cli_utils::print_success(&format!("Updated encounter: {}", encounter.name));
}
