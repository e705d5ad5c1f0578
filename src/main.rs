use std::io::Read;

use clap::Parser;
use panel_planner::config::PlannerConfig;
use panel_planner::render;
use panel_planner::solver::GuillotinePacker;
use panel_planner::types::CalculationRequest;
use panel_planner::Strategy;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "panel_planner",
    about = "Panel cutting planner with grain and edge-band aware output"
)]
struct Cli {
    /// Request JSON file, or - for stdin
    #[arg(long, default_value = "-")]
    request: String,

    /// Method: greedy, forward_greedy, greedy_native, or forward_greedy_native
    #[arg(long, default_value = "greedy", value_parser = parse_method)]
    method: Strategy,

    #[command(flatten)]
    planner: PlannerConfig,

    /// Print the full JSON response instead of a text summary
    #[arg(long)]
    json: bool,

    /// Show ASCII layout of each panel
    #[arg(long)]
    layout: bool,
}

fn parse_method(s: &str) -> Result<Strategy, String> {
    s.parse().map_err(|e: panel_planner::PlanError| e.to_string())
}

fn read_request(path: &str) -> Result<CalculationRequest, String> {
    let mut body = String::new();
    if path == "-" {
        std::io::stdin()
            .read_to_string(&mut body)
            .map_err(|e| format!("failed to read stdin: {e}"))?;
    } else {
        body = std::fs::read_to_string(path).map_err(|e| format!("failed to read '{path}': {e}"))?;
    }
    serde_json::from_str(&body).map_err(|e| format!("invalid request '{path}': {e}"))
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let request = read_request(&cli.request).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let planner = cli.planner.build(GuillotinePacker::new());
    let response = planner
        .calculate_with(&request, cli.method)
        .unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });

    if cli.json {
        match serde_json::to_string_pretty(&response) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    } else if let Some(error) = &response.error {
        eprintln!("Error: {}", error);
    } else {
        for panel in &response.panels {
            println!(
                "Panel {} ({} {}x{}):",
                panel.panel_id, panel.panel_name, panel.width, panel.height
            );
            for item in &panel.used_items {
                let rot = if item.rotate { " [rotated]" } else { "" };
                println!(
                    "  {} {}x{} @ ({}, {}){}",
                    item.item_id, item.width, item.height, item.x, item.y, rot
                );
            }
            let grain = request
                .panels
                .iter()
                .find(|spec| spec.name == panel.panel_name)
                .map(|spec| spec.grain);
            if cli.layout
                && let Some(grain) = grain
            {
                print!("{}", render::render_panel(panel, grain));
            }
            println!();
        }

        if let Some(summary) = &response.summary {
            println!(
                "Summary: {} panel{} used, {} item{} placed, {} offcut{}, {:.3}s",
                summary.total_panels_used,
                if summary.total_panels_used == 1 { "" } else { "s" },
                summary.total_items_placed,
                if summary.total_items_placed == 1 { "" } else { "s" },
                summary.total_unused_areas,
                if summary.total_unused_areas == 1 { "" } else { "s" },
                response.calculation_time.unwrap_or_default(),
            );
        }
    }

    if !response.success {
        std::process::exit(1);
    }
}
