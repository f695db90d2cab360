use std::{env, fs};

use anyhow::{Context, bail};
use log::info;

use chain_rule::ChainRuleConfig;

const CONFIG_ENV: &str = "CHAIN_RULE_CONFIG";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let path = match env::args().nth(1).or_else(|| env::var(CONFIG_ENV).ok()) {
        Some(path) => path,
        None => bail!("usage: chain_rule <config.json>, or set {CONFIG_ENV}"),
    };

    let raw = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let config = ChainRuleConfig::from_json(&raw)?;
    let orchestrator = config.build()?;
    info!("loaded {path}: {orchestrator:?}");

    let rows = match config.output_neuron {
        Some(output_neuron) => vec![orchestrator.compute_row(output_neuron)?],
        None => orchestrator.compute_rows()?,
    };

    for row in rows {
        println!("{}", serde_json::to_string(&row)?);
    }

    Ok(())
}
