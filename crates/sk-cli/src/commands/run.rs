use std::fmt::Write as _;
use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};

use sk_encounter::{Condition, EncounterView, Engine, EngineConfig, EventType, LogEntry};

use crate::scenario::{Playback, Scenario};

pub fn run(
    path: &Path,
    format: &str,
    output: Option<&Path>,
    seed: Option<u64>,
    no_explode: bool,
) -> Result<(), String> {
    let scenario = Scenario::load(path)?;
    let config = EngineConfig::default().with_rule_of_six(!no_explode);
    let engine = Engine::with_dice(config, super::dice(seed));
    let played = scenario.play(engine)?;

    let content = match format {
        "table" => render_table(&scenario, &played)?,
        "markdown" | "md" => played
            .engine
            .export_markdown(played.encounter)
            .map_err(|e| format!("export failed: {e}"))?,
        "text" => played
            .engine
            .export_text(played.encounter)
            .map_err(|e| format!("export failed: {e}"))?,
        "json" => render_json(&played)?,
        _ => {
            return Err(format!(
                "unsupported format: \"{format}\". Use: table, markdown, text, json"
            ));
        }
    };

    if let Some(path) = output {
        std::fs::write(path, &content)
            .map_err(|e| format!("cannot write to {}: {e}", path.display()))?;
        println!("  Exported to {}", path.display());
    } else {
        print!("{content}");
    }
    Ok(())
}

fn render_json(played: &Playback) -> Result<String, String> {
    let state = played
        .engine
        .state(played.encounter)
        .map_err(|e| format!("cannot read state: {e}"))?;
    let log = played
        .engine
        .log(played.encounter)
        .map_err(|e| format!("cannot read log: {e}"))?;
    let export = serde_json::json!({
        "state": state,
        "log": log,
        "summary": played.summary,
    });
    let mut out = serde_json::to_string_pretty(&export)
        .map_err(|e| format!("JSON serialization error: {e}"))?;
    out.push('\n');
    Ok(out)
}

fn render_table(scenario: &Scenario, played: &Playback) -> Result<String, String> {
    let state = played
        .engine
        .state(played.encounter)
        .map_err(|e| format!("cannot read state: {e}"))?;
    let log = played
        .engine
        .log(played.encounter)
        .map_err(|e| format!("cannot read log: {e}"))?;

    // Writing to a String cannot fail.
    let mut out = String::new();
    let _ = writeln!(
        out,
        "  {} '{}' {}",
        "Encounter".bold(),
        state.name,
        format!("({}, round {})", state.status, state.round).dimmed()
    );
    if !scenario.description.is_empty() {
        let _ = writeln!(out, "  {}", scenario.description.dimmed());
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "  {}", "Event Log".bold().underline());
    let _ = writeln!(out);
    for entry in &log {
        let round = format!("[round {:>2}]", entry.round_number).dimmed();
        let _ = writeln!(out, "  {round} {}", colorize_event(entry));
    }
    if log.is_empty() {
        let _ = writeln!(out, "  {}", "(no events)".dimmed());
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "  {}", "Participants".bold().underline());
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", participant_table(&state));
    let _ = writeln!(out);

    if let Some(summary) = &played.summary {
        let _ = writeln!(
            out,
            "  {} after {} round{}, {} enem{} defeated",
            "Combat over".bold(),
            summary.rounds,
            if summary.rounds == 1 { "" } else { "s" },
            summary.enemies_defeated,
            if summary.enemies_defeated == 1 { "y" } else { "ies" }
        );
    }
    Ok(out)
}

fn participant_table(state: &EncounterView) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "Name",
        "Team",
        "Init",
        "HP",
        "Damage",
        "Edge",
        "Condition",
        "Effects",
    ]);

    for p in &state.participants {
        let effects: Vec<String> = state
            .effects
            .iter()
            .filter(|e| e.participant == p.id)
            .map(|e| format!("{} ({})", e.name, e.rounds_remaining))
            .collect();
        let condition = match p.condition {
            Condition::Healthy => p.condition.to_string().green().to_string(),
            Condition::Wounded => p.condition.to_string().yellow().to_string(),
            Condition::BadlyWounded | Condition::Critical => p.condition.to_string().red().to_string(),
            Condition::Defeated => p.condition.to_string().red().bold().to_string(),
        };
        table.add_row(vec![
            p.name.clone(),
            p.team.to_string(),
            p.initiative.to_string(),
            format!("{}/{}", p.current_hp, p.max_hp),
            format!("{}P {}S", p.physical_damage, p.stun_damage),
            format!("{}/{}", p.edge_current, p.edge_max),
            condition,
            if effects.is_empty() {
                "--".to_string()
            } else {
                effects.join(", ")
            },
        ]);
    }
    table
}

fn colorize_event(entry: &LogEntry) -> String {
    let desc = &entry.description;
    match entry.event_type {
        EventType::CombatStart | EventType::CombatEnd => desc.bold().to_string(),
        EventType::RoundStart => desc.cyan().bold().to_string(),
        EventType::TurnStart => desc.cyan().to_string(),
        EventType::Attack => desc.dimmed().to_string(),
        EventType::Damage => desc.yellow().to_string(),
        EventType::Defeated => desc.red().bold().to_string(),
        EventType::Healing => desc.green().to_string(),
        EventType::EffectApplied | EventType::EffectExpired => desc.magenta().to_string(),
        _ => desc.to_string(),
    }
}
