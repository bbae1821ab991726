//! metrics-runner: headless runner for the campaign metrics pipeline.
//!
//! Usage:
//!   metrics-runner --input campaigns.csv --out-dir ./out
//!   metrics-runner --input campaigns.csv --seed 7 --db run.db
//!   metrics-runner --input campaigns.csv --ipc-mode

use anyhow::{bail, Context, Result};
use campaign_metrics::{
    analysis::{
        monthly_cac_by_platform, monthly_revenue, roas_pivot, CampaignFilter, MonthlyGroupPoint,
        MonthlyPoint, RoasPivot,
    },
    compute_reallocation, compute_rollup,
    config::MetricsConfig,
    pipeline::{MetricsPipeline, PipelineOutput},
    reallocation::Reallocation,
    record::DerivedRecord,
    rollup::{GroupKey, GroupRollup},
    store::MetricsStore,
    summary::{render_report, Summary},
    table, MetricResult,
};
use std::env;
use std::fs::{self, File};
use std::io::{self, BufRead, BufWriter, Write};
use std::path::Path;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetSummary,
    Filter(CampaignFilter),
    Rollup {
        #[serde(default)]
        group_by: GroupKey,
    },
    Quit,
}

#[derive(serde::Serialize)]
struct DashboardView {
    showing: usize,
    total: usize,
    summary: Summary,
    platform_rollup: Vec<GroupRollup>,
    reallocation: Option<Reallocation>,
    monthly_revenue: Vec<MonthlyPoint>,
    monthly_cac: Vec<MonthlyGroupPoint>,
    roas_pivot: RoasPivot,
}

#[derive(serde::Serialize)]
struct RollupView {
    group_by: GroupKey,
    rows: Vec<GroupRollup>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let Some(input) = string_arg(&args, "--input") else {
        bail!("missing required --input <path to campaign CSV>");
    };
    let data_dir = string_arg(&args, "--data-dir").unwrap_or("./data");
    let db = string_arg(&args, "--db").unwrap_or(":memory:");
    let out_dir = string_arg(&args, "--out-dir");

    let mut config = MetricsConfig::load(data_dir)?;
    config.seed = parse_arg(&args, "--seed", config.seed);

    if !ipc_mode {
        println!("Campaign metrics - metrics-runner");
        println!("  input:     {input}");
        println!("  seed:      {}", config.seed);
        println!("  db:        {db}");
        println!("  data_dir:  {data_dir}");
        println!();
    }

    let store = MetricsStore::open(db)?;
    store.migrate()?;
    let pipeline = MetricsPipeline::new(config, store)?;

    let records = table::read_campaigns_path(input).with_context(|| format!("reading {input}"))?;
    let output = pipeline.run(&records, input)?;

    if let Some(dir) = out_dir {
        write_outputs(Path::new(dir), &output)?;
    }

    if ipc_mode {
        run_ipc_loop(&output)?;
    } else {
        print!("{}", render_report(&output.summary, &output.reallocation));
        println!("  run_id: {}", output.run_id);
    }

    Ok(())
}

fn write_outputs(dir: &Path, output: &PipelineOutput) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let create = |name: &str| -> Result<BufWriter<File>> {
        let path = dir.join(name);
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        Ok(BufWriter::new(file))
    };

    table::write_derived(create("influencer_marketing_cleaned.csv")?, &output.derived)?;
    for (name, key) in [
        ("summary_by_platform.csv", GroupKey::Platform),
        ("summary_by_category.csv", GroupKey::InfluencerCategory),
        ("summary_by_campaign_type.csv", GroupKey::CampaignType),
    ] {
        table::write_rollup(create(name)?, key, output.rollup(key))?;
    }
    table::write_allocations(create("budget_recommendations.csv")?, &output.reallocation)?;
    let mut report = create("dashboard_summary_report.txt")?;
    report.write_all(render_report(&output.summary, &output.reallocation).as_bytes())?;
    report.flush()?;

    log::info!("outputs written to {}", dir.display());
    Ok(())
}

fn run_ipc_loop(output: &PipelineOutput) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };

        let response = match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetSummary => {
                build_view(&output.derived, &CampaignFilter::default()).and_then(to_json)
            }
            IpcCommand::Filter(filter) => build_view(&output.derived, &filter).and_then(to_json),
            IpcCommand::Rollup { group_by } => compute_rollup(&output.derived, group_by)
                .and_then(|rows| to_json(RollupView { group_by, rows })),
        };

        match response {
            Ok(json) => writeln!(stdout, "{json}")?,
            Err(e) => write_error(&mut stdout, &e.to_string())?,
        }
        stdout.flush()?;
    }
    Ok(())
}

/// Recompute the dashboard aggregates over the filtered slice.
/// An empty slice has no reallocation rather than an error.
fn build_view(derived: &[DerivedRecord], filter: &CampaignFilter) -> MetricResult<DashboardView> {
    let rows = filter.apply(derived);
    let platform_rollup = compute_rollup(&rows, GroupKey::Platform)?;
    let campaign_type_rollup = compute_rollup(&rows, GroupKey::CampaignType)?;
    let reallocation = if rows.is_empty() {
        None
    } else {
        Some(compute_reallocation(&platform_rollup)?)
    };

    Ok(DashboardView {
        showing: rows.len(),
        total: derived.len(),
        summary: Summary::compute(&rows, &platform_rollup, &campaign_type_rollup)?,
        monthly_revenue: monthly_revenue(&rows),
        monthly_cac: monthly_cac_by_platform(&rows),
        roas_pivot: roas_pivot(&rows),
        platform_rollup,
        reallocation,
    })
}

fn to_json<T: serde::Serialize>(value: T) -> MetricResult<String> {
    Ok(serde_json::to_string(&value)?)
}

fn write_error(out: &mut impl Write, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(out, "{err_json}")?;
    out.flush()?;
    Ok(())
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
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
