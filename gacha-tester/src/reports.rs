use anyhow::Result;
use colored::Colorize;
use gacha_core::{GuaranteeInfo, PityConfig};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::time::Duration;

use crate::simulation::SimulationSummary;

/// Everything a report format needs, serialized as-is for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct Report<'a> {
    pub generated_at: String,
    pub catalog_size: usize,
    pub total_weight: f64,
    pub probabilities: BTreeMap<String, f64>,
    pub pity: Option<&'a PityConfig>,
    pub guarantee_preview: Option<GuaranteeInfo>,
    pub final_states: Option<BTreeMap<&'static str, usize>>,
    pub runs: &'a [SimulationSummary],
    pub failures: &'a [String],
}

pub fn generate_console_report<W: Write>(
    out: &mut W,
    report: &Report<'_>,
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Draw Simulation Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "==========================".cyan())?;
    writeln!(
        out,
        "Catalog: {} cards, total weight {}",
        report.catalog_size, report.total_weight
    )?;
    match (report.pity, report.guarantee_preview) {
        (Some(pity), Some(preview)) => writeln!(
            out,
            "Pity: {} guaranteed at {} draws (first session starts {} away)",
            pity.guaranteed_rarity.as_str().bold(),
            pity.guarantee_limit,
            preview.remaining
        )?,
        _ => writeln!(out, "Pity: {}", "disabled".yellow())?,
    }
    writeln!(out)?;

    for run in report.runs {
        writeln!(out, "{} {}", "🎲 Seed".bold(), run.seed)?;
        writeln!(out, "   Draws: {}", run.total_draws)?;
        for stat in &run.rarity_stats {
            writeln!(
                out,
                "   {:<12} {:>7}  {:>6.2}% (expected {:>6.2}%)",
                stat.rarity, stat.count, stat.observed_pct, stat.expected_pct
            )?;
        }
        writeln!(out, "   Forced guarantees: {}", run.forced_guarantees)?;
        writeln!(out, "   Longest drought: {}", run.longest_drought)?;
        writeln!(out, "   RNG pulls: {}", run.rng_pulls)?;
        if !run.sample.is_empty() {
            let names: Vec<String> = run
                .sample
                .iter()
                .map(|result| format!("{} ({})", result.name(), result.rarity()))
                .collect();
            writeln!(out, "   First pull: {}", names.join(", "))?;
        }
        writeln!(out)?;
    }

    if let Some(states) = &report.final_states {
        writeln!(out, "{}", "🧮 Final pity states".bright_yellow().bold())?;
        for (state, count) in states {
            writeln!(out, "   {state}: {count}")?;
        }
        writeln!(out)?;
    }

    if report.failures.is_empty() {
        writeln!(out, "{}", "✅ Rates within tolerance".green())?;
    } else {
        writeln!(out, "{}", "❌ Rate drift detected".red())?;
        for failure in report.failures {
            writeln!(out, "     • {}", failure.red())?;
        }
    }
    writeln!(out)?;
    writeln!(out, "🏁 Total time: {total_duration:?}")?;
    Ok(())
}

pub fn generate_json_report<W: Write>(out: &mut W, report: &Report<'_>) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report<W: Write>(out: &mut W, report: &Report<'_>) -> Result<()> {
    writeln!(out, "# Gacha Draw Simulation")?;
    writeln!(out)?;
    writeln!(out, "_Generated {}_", report.generated_at)?;
    writeln!(out)?;
    match report.pity {
        Some(pity) => writeln!(
            out,
            "Pity: `{}` guaranteed at {} draws.",
            pity.guaranteed_rarity, pity.guarantee_limit
        )?,
        None => writeln!(out, "Pity: disabled.")?,
    }
    writeln!(out)?;

    for run in report.runs {
        writeln!(out, "## Seed {}", run.seed)?;
        writeln!(out)?;
        writeln!(out, "| Rarity | Count | Observed % | Expected % |")?;
        writeln!(out, "|--------|------:|-----------:|-----------:|")?;
        for stat in &run.rarity_stats {
            writeln!(
                out,
                "| {} | {} | {:.2} | {:.2} |",
                stat.rarity, stat.count, stat.observed_pct, stat.expected_pct
            )?;
        }
        writeln!(out)?;
        writeln!(
            out,
            "- Draws: {}\n- Forced guarantees: {}\n- Longest drought: {}",
            run.total_draws, run.forced_guarantees, run.longest_drought
        )?;
        writeln!(out)?;
    }

    if !report.failures.is_empty() {
        writeln!(out, "## Failures")?;
        writeln!(out)?;
        for failure in report.failures {
            writeln!(out, "- {failure}")?;
        }
    }
    Ok(())
}
