use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use serde::Serialize;
use tracing::info;

use hexmap_core::{
    encode_snapshot, find_path, generate_map, load_generator_config_from_env, snapshot_digest,
    GenerationReport, GeneratorConfig, HexGrid, Path, SearchContext,
};

mod render;

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate a hex map and search it", long_about = None)]
struct Cli {
    /// Map width in cells; a multiple of 5.
    #[arg(long, default_value_t = 40)]
    width: u32,
    /// Map height in cells; a multiple of 5.
    #[arg(long, default_value_t = 30)]
    height: u32,
    /// Seed overriding the configured one.
    #[arg(long)]
    seed: Option<u64>,
    /// Generator config JSON. Defaults to `HEXMAP_GENERATOR_CONFIG`, then the builtin.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Find a path between two offset coordinates, written `x,z:x,z`.
    #[arg(long, value_parser = parse_route)]
    path: Option<Route>,
    /// Movement points per turn for `--path`.
    #[arg(long, default_value_t = 24)]
    speed: u32,
    /// Write the generated map as a binary snapshot.
    #[arg(long)]
    snapshot: Option<PathBuf>,
    /// Print a JSON summary instead of the map.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Route {
    from: (i32, i32),
    to: (i32, i32),
}

fn parse_offset(text: &str) -> Result<(i32, i32), String> {
    let (x, z) = text
        .split_once(',')
        .ok_or_else(|| format!("expected `x,z`, got `{text}`"))?;
    let x = x.trim().parse().map_err(|err| format!("bad x in `{text}`: {err}"))?;
    let z = z.trim().parse().map_err(|err| format!("bad z in `{text}`: {err}"))?;
    Ok((x, z))
}

fn parse_route(text: &str) -> Result<Route, String> {
    let (from, to) = text
        .split_once(':')
        .ok_or_else(|| format!("expected `x,z:x,z`, got `{text}`"))?;
    Ok(Route {
        from: parse_offset(from)?,
        to: parse_offset(to)?,
    })
}

#[derive(Serialize)]
struct Summary<'a> {
    report: &'a GenerationReport,
    digest: String,
    path: Option<&'a Path>,
}

fn load_config(cli: &Cli) -> Result<Arc<GeneratorConfig>> {
    let mut config = match &cli.config {
        Some(path) => Arc::new(
            GeneratorConfig::from_file(path)
                .wrap_err_with(|| format!("loading {}", path.display()))?,
        ),
        None => load_generator_config_from_env().0,
    };
    if let Some(seed) = cli.seed {
        Arc::make_mut(&mut config).seed = Some(seed);
    }
    Ok(config)
}

fn run_path(
    grid: &mut HexGrid,
    ctx: &mut SearchContext,
    route: Route,
    speed: u32,
) -> Result<Option<Path>> {
    let lookup = |(x, z): (i32, i32)| {
        grid.index_at_offset(x, z)
            .ok_or_else(|| eyre!("offset {x},{z} is outside the map"))
    };
    let from = lookup(route.from)?;
    let to = lookup(route.to)?;
    let path = find_path(grid, ctx, from, to, speed);
    match &path {
        Some(path) => info!(
            from,
            to,
            cost = path.cost,
            turns = path.turns,
            "path found"
        ),
        None => info!(from, to, "no path"),
    }
    Ok(path)
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let mut grid = HexGrid::new(1, 1)?;
    let mut ctx = SearchContext::new();
    let report = generate_map(&mut grid, &mut ctx, cli.width, cli.height, &config)?;

    let path = match cli.path {
        Some(route) => run_path(&mut grid, &mut ctx, route, cli.speed)?,
        None => None,
    };

    if let Some(out) = &cli.snapshot {
        fs::write(out, encode_snapshot(&grid))
            .wrap_err_with(|| format!("writing snapshot to {}", out.display()))?;
        info!(path = %out.display(), "snapshot written");
    }

    if cli.json {
        let summary = Summary {
            report: &report,
            digest: format!("{:016x}", snapshot_digest(&grid)),
            path: path.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!(
            "{}",
            render::render_ascii(&grid, path.as_ref().map_or(&[][..], |p| &p.cells[..]))
        );
        println!(
            "seed {} | land {} | rivers {} | erosion steps {}",
            report.seed, report.land_cells, report.rivers, report.erosion_steps
        );
        if let Some(path) = &path {
            println!("path cost {} in {} turn(s)", path.cost, path.turns);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_routes() {
        assert_eq!(
            parse_route("1,2:30,-4"),
            Ok(Route {
                from: (1, 2),
                to: (30, -4)
            })
        );
        assert!(parse_route("1,2").is_err());
        assert!(parse_route("a,2:3,4").is_err());
    }

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["hexmap"]);
        assert_eq!((cli.width, cli.height, cli.speed), (40, 30, 24));
        assert!(cli.path.is_none() && !cli.json);
    }
}
