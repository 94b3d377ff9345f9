use anyhow::Result;
use chrono::Utc;
use std::io::Write;

use crate::stream::{EventGenerator, GeneratorConfig};

/// Write `count` ticks worth of events to `out`, one JSON document per line
pub fn print_sample<W: Write>(
    out: &mut W,
    config: GeneratorConfig,
    count: usize,
    seed: Option<u64>,
) -> Result<usize> {
    config.validate()?;
    let mut generator = match seed {
        Some(seed) => EventGenerator::seeded(config, seed),
        None => EventGenerator::from_entropy(config),
    };

    let mut written = 0;
    for _ in 0..count {
        for event in generator.tick(Utc::now()) {
            writeln!(out, "{}", event.encode()?.as_str())?;
            written += 1;
        }
    }
    Ok(written)
}
