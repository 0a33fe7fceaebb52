use std::fmt::Write;
use std::path::Path;

use nurseflow_engine::{BalanceEngine, Snapshot};

pub async fn run(config: Option<&Path>, ticks: u64, format: &str) -> anyhow::Result<()> {
    let config = super::load_config(config)?;
    let engine = BalanceEngine::from_config(&config)?;

    engine.run_until_converged(ticks).await?;
    let snapshot = engine.snapshot().await;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        _ => {
            print!("{}", format_report(&snapshot));
        }
    }

    Ok(())
}

/// Plain-text history table followed by the final per-nurse loads.
pub fn format_report(snapshot: &Snapshot) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{:>5}  {:>7}  {:>4}  {:<11}  counts", "tick", "std-dev", "max", "status");
    for entry in &snapshot.history {
        let _ = writeln!(
            out,
            "{:>5}  {:>7.3}  {:>4}  {:<11}  {:?}",
            entry.tick, entry.metrics.std_dev, entry.metrics.max, entry.metrics.status, entry.counts
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{:<6} {:<10} {:>8} {:>7} {:>6}", "nurse", "name", "patients", "acuity", "util%");
    for load in &snapshot.loads {
        let _ = writeln!(
            out,
            "{:<6} {:<10} {:>8} {:>7} {:>6.1}",
            load.nurse_id, load.name, load.patients, load.acuity_total, load.utilization_pct
        );
    }

    match &snapshot.metrics {
        Some(m) => {
            let _ = writeln!(
                out,
                "\nafter {} ticks: {} (mean {:.2}, std-dev {:.3}, max {})",
                snapshot.tick, m.status, m.mean, m.std_dev, m.max
            );
        }
        None => {
            let _ = writeln!(out, "\nward has no nurses");
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use nurseflow_core::WardConfig;

    #[tokio::test]
    async fn report_lists_every_tick() {
        let engine = BalanceEngine::from_config(&WardConfig::scaffold()).unwrap();
        engine.run_until_converged(3).await.unwrap();
        let report = format_report(&engine.snapshot().await);

        assert!(report.contains("[6, 4, 4, 4, 3, 2, 2, 1, 1, 0]"));
        assert!(report.contains("Avery"));
        assert!(report.contains("after 3 ticks"));
        // header + 3 ticks + blank + header + 10 nurses + blank + summary
        assert_eq!(report.lines().count(), 18);
    }
}
