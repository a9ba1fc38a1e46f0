//! # Party Command Handler
//!
//! Handles party-related CLI commands, including the derived dashboard
//! view assembled client-side from the party's encounters, checkins, and
//! issues. Parties are loaded at setup, so there is no create subcommand.

use crate::{
    CombatCheckin, Encounter, Issue, Party, cli_utils,
    commands::shared::{dispatch_command, validate_args_count_or_exit},
    dashboard, http_utils,
};

const PARTY_USAGE: &str = "Usage: questctl party <list|get|dashboard> [args...]";

/// Handles all party-related commands.
pub async fn handle_party_command(
    args: &[String],
    client: &http_utils::QuestboardClient,
    output_format: cli_utils::OutputFormat,
) {
    dispatch_command!("party", PARTY_USAGE, args, client, output_format, {
        "list" => handle_party_list,
        "get" => handle_party_get,
        "dashboard" => handle_party_dashboard,
    });
}

async fn handle_party_list(
    args: &[String],
    client: &http_utils::QuestboardClient,
    output_format: cli_utils::OutputFormat,
) {
    validate_args_count_or_exit(args, 1, 1, "list", "Usage: questctl party list");

    let parties = http_utils::execute_or_exit(
        || client.fetch::<Vec<Party>>("parties"),
        "Failed to list parties",
    )
    .await;

    if parties.is_empty() {
        println!("No parties found");
    } else {
        cli_utils::print_formatted_or_exit(&parties, output_format, "parties");
    }
}

async fn handle_party_get(
    args: &[String],
    client: &http_utils::QuestboardClient,
    output_format: cli_utils::OutputFormat,
) {
    validate_args_count_or_exit(args, 2, 2, "get", "Usage: questctl party get <name>");

    let path = format!("parties/{}", args[1]);
    let party = http_utils::execute_or_exit(
        || client.fetch::<Party>(&path),
        "Failed to get party",
    )
    .await;

    cli_utils::print_formatted_or_exit(&party, output_format, "party");
}

async fn handle_party_dashboard(
    args: &[String],
    client: &http_utils::QuestboardClient,
    output_format: cli_utils::OutputFormat,
) {
    validate_args_count_or_exit(
        args,
        2,
        2,
        "dashboard",
        "Usage: questctl party dashboard <name>",
    );
    let name = &args[1];

    let party_path = format!("parties/{}", name);
    let party = http_utils::execute_or_exit(
        || client.fetch::<Party>(&party_path),
        "Failed to get party",
    )
    .await;

    let encounters_path = format!("encounters/party/{}", party.id);
    let encounters = http_utils::execute_or_exit(
        || client.fetch::<Vec<Encounter>>(&encounters_path),
        "Failed to list encounters",
    )
    .await;

    let checkins = http_utils::execute_or_exit(
        || client.fetch::<Vec<CombatCheckin>>("combat-checkins"),
        "Failed to list combat checkins",
    )
    .await;
    let checkins: Vec<CombatCheckin> = checkins
        .into_iter()
        .filter(|c| c.party_id == party.id)
        .collect();

    let issues = http_utils::execute_or_exit(
        || client.fetch::<Vec<Issue>>("issues"),
        "Failed to list issues",
    )
    .await;

    let summary = dashboard::summarize(&party.name, &encounters, &checkins, &issues);
    cli_utils::print_formatted_or_exit(&summary, output_format, "dashboard");
}
