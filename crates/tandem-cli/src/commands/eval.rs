use anyhow::Result;
use cliclack::spinner;
use console::style;

use crate::inputs::required_input;
use crate::profile::{load_profile_or_default, set_provider_config};
use tandem::panel::{Panel, PanelReport, DEFAULT_JUDGES};
use tandem::providers::factory::get_provider;

pub async fn handle_eval(
    text: Option<String>,
    profile_name: Option<String>,
    judges: Option<usize>,
    pool: Option<usize>,
) -> Result<()> {
    let text = match text {
        Some(text) => text,
        None => required_input(
            "What text should the panel evaluate?",
            "The text cannot be empty",
        )?,
    };

    let profile = load_profile_or_default(profile_name);
    let provider = get_provider(set_provider_config(&profile.provider, profile.model)?)?;
    let panel = Panel::new(provider).with_judges(judges.unwrap_or(DEFAULT_JUDGES));

    let spin = spinner();
    spin.start("Consulting the panel...");
    let report = match pool {
        Some(pool_size) => panel.run_pooled(&text, pool_size).await,
        None => panel.run(&text).await,
    };

    match report {
        Ok(report) => {
            spin.stop("The panel has ruled.");
            render_report(&report);
        }
        Err(e) => {
            spin.stop("The panel could not reach a verdict.");
            println!("{}", style(format!("Error: {}", e)).red());
        }
    }

    Ok(())
}

fn render_report(report: &PanelReport) {
    for (i, evaluation) in report.evaluations.iter().enumerate() {
        let ruling = if evaluation.is_appropriate {
            style("appropriate").green()
        } else {
            style("not appropriate").red()
        };
        println!(
            "{} {} - {}",
            style(format!("judge {}:", i + 1)).dim(),
            ruling,
            evaluation.explanation
        );
    }

    println!();
    let ruling = if report.verdict.is_appropriate {
        style("appropriate").green().bold()
    } else {
        style("not appropriate").red().bold()
    };
    println!("{} {}", style("verdict:").bold(), ruling);
    println!("{}", report.verdict.summary);
}
