//! Command-line front end for crucible: read a cost grid, solve one
//! constrained shortest-path query and report the result.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use crucible_core::{CostGrid, Distance, Point};
use crucible_paths::{Crucible, Query, Route, RunLimits, render_route};
use log::{debug, info};
use serde::Serialize;

/// Minimum heat loss through a grid under straight-run limits.
#[derive(Debug, Parser)]
#[command(name = "crucible", version, about)]
pub struct Cli {
    /// Grid file: one digit per cell, or whitespace-separated costs.
    /// Use `-` to read standard input.
    pub input: PathBuf,

    /// Cells to hold a heading before turning or stopping.
    #[arg(long, default_value_t = 1, conflicts_with = "ultra")]
    pub min_run: u32,

    /// Most cells to hold a heading.
    #[arg(long, default_value_t = 3, conflicts_with = "ultra")]
    pub max_run: u32,

    /// Shorthand for `--min-run 4 --max-run 10`.
    #[arg(long)]
    pub ultra: bool,

    /// Start cell as `X,Y`.
    #[arg(long, value_parser = parse_point, default_value = "0,0")]
    pub start: Point,

    /// End cell as `X,Y` [default: bottom-right cell].
    #[arg(long, value_parser = parse_point)]
    pub end: Option<Point>,

    /// Give up on paths costing more than this.
    #[arg(long)]
    pub max_cost: Option<Distance>,

    /// Print the grid with the route drawn in before the cost.
    #[arg(long)]
    pub show_path: bool,

    /// Print a JSON report instead of plain text.
    #[arg(long, conflicts_with = "show_path")]
    pub json: bool,
}

impl Cli {
    /// Run limits selected on the command line.
    pub fn runs(&self) -> RunLimits {
        if self.ultra {
            RunLimits::ULTRA
        } else {
            RunLimits::new(self.min_run, self.max_run)
        }
    }

    /// The query described by the arguments, with defaults resolved
    /// against `grid`.
    pub fn query(&self, grid: &CostGrid) -> Query {
        let mut query = Query::new(self.start, self.end.unwrap_or_else(|| grid.last_cell()))
            .with_limits(self.runs());
        if let Some(cost) = self.max_cost {
            query = query.with_max_cost(cost);
        }
        query
    }
}

/// Parse `X,Y` into a point.
pub fn parse_point(s: &str) -> Result<Point> {
    let Some((x, y)) = s.split_once(',') else {
        bail!("expected X,Y, got {s:?}");
    };
    let x = x.trim().parse().with_context(|| format!("bad x in {s:?}"))?;
    let y = y.trim().parse().with_context(|| format!("bad y in {s:?}"))?;
    Ok(Point::new(x, y))
}

/// Result of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Found(Distance),
    NoPath,
}

#[derive(Serialize)]
struct Report {
    cost: Option<Distance>,
    start: Point,
    end: Point,
    runs: RunLimits,
    path: Option<Route>,
}

/// Solve the query described by `cli`, writing the report to `out`.
///
/// "No path" is an [`Outcome`], not an error; errors are I/O failures,
/// malformed grids and invalid queries.
pub fn run(cli: &Cli, out: &mut impl Write) -> Result<Outcome> {
    run_with_stdin(cli, io::stdin().lock(), out)
}

/// Like [`run`], reading the grid from `stdin` when the input is `-`.
pub fn run_with_stdin(cli: &Cli, stdin: impl Read, out: &mut impl Write) -> Result<Outcome> {
    let text = read_input(&cli.input, stdin)?;
    let grid: CostGrid = text
        .parse()
        .with_context(|| format!("parse grid from {}", cli.input.display()))?;
    info!("loaded {}x{} grid", grid.width(), grid.height());

    let query = cli.query(&grid);
    debug!("query: {query:?}");

    let mut engine = Crucible::new();
    let (cost, route) = if cli.show_path || cli.json {
        let route = engine.route(&grid, &query).context("invalid query")?;
        (route.as_ref().map(|r| r.cost), route)
    } else {
        (engine.min_cost(&grid, &query).context("invalid query")?, None)
    };
    info!("expanded {} states", engine.expanded());

    if cli.json {
        let report = Report {
            cost,
            start: query.start,
            end: query.end,
            runs: query.runs,
            path: route,
        };
        serde_json::to_writer_pretty(&mut *out, &report).context("write report")?;
        writeln!(out).context("write report")?;
    } else if let Some(cost) = cost {
        if let Some(route) = &route {
            writeln!(out, "{}", render_route(&grid, route)).context("write route")?;
        }
        writeln!(out, "{cost}").context("write cost")?;
    }

    Ok(match cost {
        Some(cost) => Outcome::Found(cost),
        None => Outcome::NoPath,
    })
}

fn read_input(path: &Path, mut stdin: impl Read) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        stdin
            .read_to_string(&mut text)
            .context("read grid from stdin")?;
        return Ok(text);
    }
    fs::read_to_string(path).with_context(|| format!("read grid from {}", path.display()))
}
