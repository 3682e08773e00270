use flowboard::domain::{MitigationPolicy, Stage};
use flowboard::{AppError, GameConfig, GameFlowService};
use tracing::{info, warn};

const DEMO_TURNS: u32 = 8;
const DEMO_CARDS: [(&str, u8); 5] = [
    ("Login page", 3),
    ("Audit log", 5),
    ("Fix typo in footer", 1),
    ("Export to CSV", 3),
    ("Rate limiting", 1),
];

fn main() {
    flowboard::telemetry::init_tracing();

    let config = match GameConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    match run_demo(config) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("❌ Demo session failed: {e}");
            std::process::exit(1);
        }
    }
}

/// Play one short session and return its metrics as pretty JSON.
fn run_demo(config: GameConfig) -> Result<String, AppError> {
    let service = GameFlowService::builder().with_config(config).build();
    let session_id = service.start_game(None).id;

    for (title, effort) in DEMO_CARDS {
        let card = service.create_card(session_id, title, effort)?;
        service.move_card(session_id, card.id, Stage::Funnel, Stage::ProductBacklog)?;
    }

    for _ in 0..DEMO_TURNS {
        let board = service.get_session(session_id)?.board;
        let waiting: Vec<_> = board
            .stage(Stage::ProductBacklog)
            .map(|s| s.slots.iter().chain(s.queue.iter()).map(|c| c.id).collect())
            .unwrap_or_default();
        for card_id in waiting {
            if let Err(e) = service.pull_to_sprint(session_id, card_id) {
                info!(card_id = %card_id, reason = %e, "Card stays in backlog");
            }
        }

        let in_flight: Vec<_> = board
            .stages
            .iter()
            .filter(|s| !matches!(s.stage, Stage::Funnel | Stage::ProductBacklog | Stage::Production))
            .flat_map(|s| s.slots.iter().map(|c| c.id))
            .collect();
        for card_id in in_flight {
            match service.roll_for_card(session_id, card_id, MitigationPolicy::WhenEligible) {
                Ok(result) => info!(card_id = %card_id, effect = %result.outcome.effect, "Rolled"),
                Err(e) if e.is_recoverable() => warn!(card_id = %card_id, reason = %e, "Roll rejected"),
                Err(e) => return Err(e),
            }
        }
        service.advance_turn(session_id)?;
    }

    service.end_game(session_id)?;
    let metrics = service.compute_metrics(session_id)?;
    Ok(serde_json::to_string_pretty(&metrics)?)
}
