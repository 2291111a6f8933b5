//! List the paper catalog.

use posterkit_poster_model::units::from_physical;
use posterkit_poster_model::{Unit, PAPER_SIZES};

pub fn run(unit: &str) -> anyhow::Result<()> {
    let unit: Unit = unit.parse()?;

    println!("{:<14} {:<12} {:>18}  Category", "ID", "Name", "Size");
    for paper in PAPER_SIZES {
        let size = format!(
            "{:.2} x {:.2} {}",
            from_physical(paper.width_mm, unit),
            from_physical(paper.height_mm, unit),
            unit
        );
        println!(
            "{:<14} {:<12} {:>18}  {:?}",
            paper.id, paper.name, size, paper.category
        );
    }

    Ok(())
}
