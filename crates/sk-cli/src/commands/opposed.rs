use colored::Colorize;

use sk_mechanics::{DicePool, Winner, opposed_test};

pub fn run(
    attack: u32,
    defense: u32,
    edge: bool,
    no_explode: bool,
    seed: Option<u64>,
) -> Result<(), String> {
    let explode = !no_explode;
    let attack_pool = DicePool::checked(attack)
        .map_err(|e| format!("invalid attack pool: {e}"))?
        .exploding(edge || explode);
    let defense_pool = DicePool::checked(defense)
        .map_err(|e| format!("invalid defense pool: {e}"))?
        .exploding(explode);

    let mut dice = super::dice(seed);
    let attack_roll = attack_pool.roll(&mut dice);
    let defense_roll = defense_pool.roll(&mut dice);
    let result = opposed_test(attack_roll.hits, defense_roll.hits);

    println!(
        "  {} {attack}d6 vs {defense}d6",
        "Opposed test".bold()
    );
    println!(
        "  Attack:  {}  {}",
        attack_roll.formatted(),
        super::colorize_summary(&attack_roll, None)
    );
    println!(
        "  Defense: {}  {}",
        defense_roll.formatted(),
        super::colorize_summary(&defense_roll, None)
    );

    let verdict = match result.winner {
        Winner::Attacker => format!("Attacker wins by {}", result.net_hits).green().bold(),
        Winner::Defender => format!("Defender wins by {}", result.net_hits).red().bold(),
        Winner::Tie => "Tie, the defender holds".yellow().bold(),
    };
    println!("  {verdict}");
    Ok(())
}
