use arrrg::CommandLine;
use arrrg_derive::CommandLine;

use questboard::{
    cli_utils::{self, OutputFormat},
    commands::{
        handle_combat_command, handle_encounter_command, handle_feedback_command,
        handle_issue_command, handle_party_command,
    },
    http_utils,
};

#[derive(CommandLine, Default, PartialEq, Eq)]
struct Options {
    #[arrrg(optional, "Base URL of the Questboard API server")]
    base_url: String,
    #[arrrg(
        optional,
        "Output format for get/list commands: json or yaml (default: json)"
    )]
    output: OutputFormat,
}

const USAGE: &str = r#"Usage: questctl [options] <command> [args...]

Options:
  --base-url <url>     Base URL of the Questboard API server (default: http://localhost:8080)
  --output <format>    Output format for get/list commands: json or yaml (default: json)

Commands:
  party list                                        List all parties
  party get <name>                                  Get a party by name
  party dashboard <name>                            Show a party's progress summary
  encounter list                                    List all encounters
  encounter for-party <party-id>                    List a party's encounters
  encounter update <id> <completed|notes> <value>   Update an encounter
  combat list                                       List all combat encounters
  combat checkins                                   List all combat checkins
  combat checkins-for <combat-id>                   List checkins for a combat
  combat update <id> <encountered|notes> <value>    Update a combat checkin
  issue list                                        List issues, newest first
  issue create <party> <job> <type> <priority> <status> <situation>
                                                    Log an issue
  issue update <id> <status|situation|hasDetails> <value>
                                                    Update an issue
  feedback list                                     List feedback, newest first
  feedback create <name> <feature> <comments>       Record feedback
  feedback update <id> <status>                     Update feedback review status"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (options, free) = Options::from_command_line_relaxed("USAGE: questctl <command> [args...]");

    if free.is_empty() {
        cli_utils::exit_with_usage_error("No command specified", USAGE);
    }

    let base_url = if options.base_url.is_empty() {
        "http://localhost:8080".to_string()
    } else {
        options.base_url
    };

    let client = http_utils::QuestboardClient::new(base_url);

    match free[0].as_str() {
        "party" => {
            handle_party_command(&free[1..], &client, options.output).await;
        }
        "encounter" => {
            handle_encounter_command(&free[1..], &client, options.output).await;
        }
        "combat" => {
            handle_combat_command(&free[1..], &client, options.output).await;
        }
        "issue" => {
            handle_issue_command(&free[1..], &client, options.output).await;
        }
        "feedback" => {
            handle_feedback_command(&free[1..], &client, options.output).await;
        }
        _ => {
            cli_utils::exit_with_error(&format!(
                "Unknown command '{}'. Available commands: party, encounter, combat, issue, feedback",
                free[0]
            ));
        }
    }

    Ok(())
}
