use anyhow::Result;
use colored::Colorize;
use freshkill_game::clan::display_amount;
use std::io::Write;
use std::time::Duration;

use super::ScenarioResult;

#[allow(clippy::cast_precision_loss)]
fn success_rate(results: &[ScenarioResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let passed = results.iter().filter(|r| r.passed).count();
    (passed as f64 / results.len() as f64) * 100.0
}

pub fn generate_console_report(
    out: &mut dyn Write,
    results: &[ScenarioResult],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Freshkill Scenario Results".bright_cyan().bold())?;
    writeln!(out, "{}", "==============================".cyan())?;

    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    writeln!(out, "Total runs: {total}")?;
    writeln!(out, "Passed: {}", passed.to_string().green())?;
    writeln!(out, "Failed: {}", (total - passed).to_string().red())?;
    writeln!(out, "Success rate: {:.1}%", success_rate(results))?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(
            out,
            "{} {} (seed {})",
            status,
            result.scenario_name.bold(),
            result.seed
        )?;
        writeln!(
            out,
            "   Moons: {}  Eaten: {}  Spoiled: {}  Pile left: {}",
            result.moons_run,
            display_amount(result.total_eaten),
            display_amount(result.total_spoiled),
            display_amount(result.final_pile)
        )?;
        writeln!(out, "   Starving at end: {}", result.starving_at_end)?;
        if !result.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &result.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, results)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, results: &[ScenarioResult]) -> Result<()> {
    writeln!(out, "# Freshkill Scenario Results\n")?;

    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total runs**: {total}")?;
    writeln!(out, "- **Passed**: {passed}")?;
    writeln!(out, "- **Failed**: {}", total - passed)?;
    writeln!(out, "- **Success rate**: {:.1}%\n", success_rate(results))?;

    writeln!(out, "## Detailed Results\n")?;
    writeln!(out, "| Scenario | Seed | Result | Moons | Eaten | Spoiled | Pile left | Starving |")?;
    writeln!(out, "|---|---|---|---|---|---|---|---|")?;
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };
        writeln!(
            out,
            "| {} | {} | {} | {} | {:.2} | {:.2} | {:.2} | {} |",
            result.scenario_name,
            result.seed,
            status,
            result.moons_run,
            result.total_eaten,
            result.total_spoiled,
            result.final_pile,
            result.starving_at_end
        )?;
    }

    let failing: Vec<&ScenarioResult> = results.iter().filter(|r| !r.passed).collect();
    if !failing.is_empty() {
        writeln!(out, "\n## Failures\n")?;
        for result in failing {
            writeln!(out, "### {} (seed {})\n", result.scenario_name, result.seed)?;
            for failure in &result.failures {
                writeln!(out, "- {failure}")?;
            }
            writeln!(out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, passed: bool) -> ScenarioResult {
        ScenarioResult {
            scenario_name: name.to_string(),
            seed: 42,
            passed,
            moons_run: 8,
            final_pile: 12.345,
            total_eaten: 80.0,
            total_spoiled: 3.5,
            starving_at_end: usize::from(!passed),
            failures: if passed {
                Vec::new()
            } else {
                vec!["moon 3: pile went negative".to_string()]
            },
            duration: Duration::from_millis(5),
        }
    }

    #[test]
    fn markdown_lists_failures() {
        let mut buffer = Vec::new();
        generate_markdown_report(&mut buffer, &[result("steady", true), result("famine", false)])
            .unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("| steady | 42 | ✅ |"));
        assert!(text.contains("### famine (seed 42)"));
        assert!(text.contains("- moon 3: pile went negative"));
        assert!(text.contains("**Success rate**: 50.0%"));
    }

    #[test]
    fn json_report_is_an_array() {
        let mut buffer = Vec::new();
        generate_json_report(&mut buffer, &[result("feast", true)]).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(parsed[0]["scenario_name"], "feast");
        assert_eq!(parsed[0]["duration"], 5);
    }

    #[test]
    fn console_report_rounds_amounts() {
        colored::control::set_override(false);
        let mut buffer = Vec::new();
        generate_console_report(&mut buffer, &[result("steady", true)], Duration::from_secs(1))
            .unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("Pile left: 12"));
        assert!(text.contains("Spoiled: 4"));
    }
}
