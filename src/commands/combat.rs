//! # Combat Command Handler
//!
//! Handles combat encounter and checkin CLI commands. Scenarios and
//! checkin rows are loaded at setup; `update` flips a checkin's
//! encountered flag or replaces its notes during the event.

use serde_json::{Value, json};

use crate::{
    CombatCheckin, CombatEncounter, cli_utils,
    commands::shared::{dispatch_command, validate_args_count_or_exit},
    http_utils,
};

const COMBAT_USAGE: &str = "Usage: questctl combat <list|checkins|checkins-for|update> [args...]";

/// Handles all combat-related commands.
pub async fn handle_combat_command(
    args: &[String],
    client: &http_utils::QuestboardClient,
    output_format: cli_utils::OutputFormat,
) {
    dispatch_command!("combat", COMBAT_USAGE, args, client, output_format, {
        "list" => handle_combat_list,
        "checkins" => handle_combat_checkins,
        "checkins-for" => handle_combat_checkins_for,
        "update" => handle_combat_update,
    });
}

async fn handle_combat_list(
    args: &[String],
    client: &http_utils::QuestboardClient,
    output_format: cli_utils::OutputFormat,
) {
    validate_args_count_or_exit(args, 1, 1, "list", "Usage: questctl combat list");

    let combats = http_utils::execute_or_exit(
        || client.fetch::<Vec<CombatEncounter>>("combat-encounters"),
        "Failed to list combat encounters",
    )
    .await;

    if combats.is_empty() {
        println!("No combat encounters found");
    } else {
        cli_utils::print_formatted_or_exit(&combats, output_format, "combat encounters");
    }
}

async fn handle_combat_checkins(
    args: &[String],
    client: &http_utils::QuestboardClient,
    output_format: cli_utils::OutputFormat,
) {
    validate_args_count_or_exit(args, 1, 1, "checkins", "Usage: questctl combat checkins");

    let checkins = http_utils::execute_or_exit(
        || client.fetch::<Vec<CombatCheckin>>("combat-checkins"),
        "Failed to list combat checkins",
    )
    .await;

    if checkins.is_empty() {
        println!("No combat checkins found");
    } else {
        cli_utils::print_formatted_or_exit(&checkins, output_format, "combat checkins");
    }
}

async fn handle_combat_checkins_for(
    args: &[String],
    client: &http_utils::QuestboardClient,
    output_format: cli_utils::OutputFormat,
) {
    validate_args_count_or_exit(
        args,
        2,
        2,
        "checkins-for",
        "Usage: questctl combat checkins-for <combat-id>",
    );

    let path = format!("combat-checkins/{}", args[1]);
    let checkins = http_utils::execute_or_exit(
        || client.fetch::<Vec<CombatCheckin>>(&path),
        "Failed to list combat checkins",
    )
    .await;

    if checkins.is_empty() {
        println!("No combat checkins found");
    } else {
        cli_utils::print_formatted_or_exit(&checkins, output_format, "combat checkins");
    }
}

fn checkin_update_body(field: &str, value: &str) -> Value {
    match field {
        "encountered" => match value {
            "true" => json!({"encountered": true}),
            "false" => json!({"encountered": false}),
            other => cli_utils::exit_with_error(&format!(
                "Invalid encountered value '{}'. Expected true or false",
                other
            )),
        },
        "notes" => json!({"notes": value}),
        other => cli_utils::exit_with_error(&format!(
            "Unknown checkin field '{}'. Updatable fields: encountered, notes",
            other
        )),
    }
}

async fn handle_combat_update(
    args: &[String],
    client: &http_utils::QuestboardClient,
    _output_format: cli_utils::OutputFormat,
) {
    validate_args_count_or_exit(
        args,
        4,
        4,
        "update",
        "Usage: questctl combat update <checkin-id> <encountered|notes> <value>",
    );

    let path = format!("combat-checkins/{}", args[1]);
    let request = checkin_update_body(&args[2], &args[3]);
    let checkin = http_utils::execute_or_exit(
        || client.patch::<Value, CombatCheckin>(&path, &request),
        "Failed to update combat checkin",
    )
    .await;

    cli_utils::print_success(&format!("Updated combat checkin: {}", checkin.id));
}
