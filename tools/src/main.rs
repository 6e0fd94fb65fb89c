//! sim-runner: headless runner for the email dataset simulator.
//!
//! Usage:
//!   sim-runner --seed 12345 --data-dir ./data --db run.db
//!   sim-runner --seed 12345 --end-date 2024-06-30 --dataset dataset.json
//!   sim-runner --unique-consumers consumers.json

use anyhow::{Context, Result};
use chrono::NaiveDate;
use mailsim_core::{
    config::SimConfig,
    dataset::SimulationDataset,
    engine::SimEngine,
    store::SimStore,
};
use std::env;
use std::fs::File;
use std::io::BufWriter;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let db = flag_value(&args, "--db").unwrap_or(":memory:");
    let data_dir = flag_value(&args, "--data-dir").unwrap_or("./data");
    let end_date = match flag_value(&args, "--end-date") {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("--end-date expects YYYY-MM-DD, got {s}"))?,
        None => chrono::Local::now().date_naive(),
    };

    let config = SimConfig::load(data_dir)?;
    log::debug!("sim-runner: args {:?}", args.iter().skip(1).collect::<Vec<_>>());

    println!("sim-runner: synthetic email dataset simulator");
    println!("  seed:       {seed}");
    println!("  consumers:  {}", config.population_size);
    println!("  horizon:    {} days (step {})", config.horizon_days, config.step_days);
    println!("  end date:   {end_date}");
    println!("  db:         {db}");
    println!("  data_dir:   {data_dir}");
    println!();

    let store = SimStore::open(db)?;
    store.migrate()?;

    let run_id = format!("run-{seed}-{}", uuid::Uuid::new_v4());
    let mut engine = SimEngine::build(run_id.clone(), seed, config, end_date, store)?;
    let dataset = engine.run()?;

    print_summary(&run_id, dataset);

    if let Some(path) = flag_value(&args, "--dataset") {
        write_json(path, dataset)?;
        println!("Dataset saved at: {path}");
    }
    if let Some(path) = flag_value(&args, "--unique-consumers") {
        write_json(path, &dataset.unique_consumers())?;
        println!("Unique consumers saved at: {path}");
    }
    Ok(())
}

fn print_summary(run_id: &str, dataset: &SimulationDataset) {
    let s = &dataset.summary;
    println!("=== RUN SUMMARY ===");
    println!("  run_id:            {run_id}");
    println!("  mailings:          {}", s.total_mailings);
    println!("  open rate:         {:.4}", s.average_open_rate);
    println!("  purchases:         {}", s.total_purchases);
    println!("  simulated days:    {}", s.simulated_days);
    println!("  avg timespan:      {:.2}", s.average_timespan);
    println!("  observations:      {}", dataset.rows.len());
    println!();
    println!("=== PER MONTH ===");
    for (month, mailings) in &dataset.mailings_per_month {
        let purchases = dataset.purchases_per_month.get(month).copied().unwrap_or(0);
        println!("  {month} | mailings: {mailings:>3} | purchases: {purchases:>4}");
    }
}

fn write_json<T: serde::Serialize + ?Sized>(path: &str, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Cannot create {path}"))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
