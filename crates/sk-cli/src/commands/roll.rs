use colored::Colorize;

use sk_mechanics::{DicePool, HitQuality};

pub fn run(
    size: u32,
    edge: bool,
    no_explode: bool,
    threshold: Option<u32>,
    seed: Option<u64>,
) -> Result<(), String> {
    let pool = DicePool::checked(size)
        .map_err(|e| format!("invalid pool: {e}"))?
        .exploding(edge || !no_explode);
    let mut dice = super::dice(seed);
    let roll = pool.roll(&mut dice);

    let mode = if pool.explodes() {
        "sixes explode"
    } else {
        "no explosions"
    };
    println!(
        "  {} {size}d6 {}",
        "Roll".bold(),
        format!("({mode})").dimmed()
    );
    println!("  Dice:    {}", roll.formatted());
    println!(
        "  Result:  {}",
        super::colorize_summary(&roll, threshold)
    );
    println!("  Quality: {}", HitQuality::describe(roll.hits));
    if !roll.explosions().is_empty() {
        println!(
            "  {}",
            format!("{} extra dice from sixes", roll.explosions().len()).dimmed()
        );
    }
    Ok(())
}
