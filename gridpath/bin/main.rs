use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use env_logger::Env;
use gridpath::{
    parse_img, Canvas, Config, Grid, PathFinderState, Point, Preset, Session, WeightMode,
};
use log::info;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum PresetArg {
    Unweighted,
    Weighted,
}

impl From<PresetArg> for Preset {
    fn from(value: PresetArg) -> Self {
        match value {
            PresetArg::Unweighted => Preset::Unweighted,
            PresetArg::Weighted => Preset::Weighted,
        }
    }
}

/// Runs an A* search on a grid and prints the result
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON configuration file, flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, conflicts_with = "config")]
    preset: Option<PresetArg>,

    #[arg(long)]
    rows: Option<usize>,

    #[arg(long)]
    cols: Option<usize>,

    #[arg(long)]
    heuristic_weight: Option<f64>,

    /// Seed for random weights, switches the grid to random weights
    #[arg(long)]
    seed: Option<u64>,

    /// Black and white image, dark pixels become walls
    #[arg(long, conflicts_with = "layout")]
    image: Option<PathBuf>,

    /// Text layout: '#' wall, '.' free, '0'-'9' weight, 'S' start, 'G' goal
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Walls to add, as "col,row;col,row"
    #[arg(long)]
    walls: Option<String>,

    /// Print the grid after every step
    #[arg(long)]
    trace: bool,
}

impl Args {
    fn config(&self) -> anyhow::Result<Config> {
        let mut config = match (&self.config, self.preset) {
            (Some(path), _) => Config::from_json_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            (None, Some(preset)) => Preset::from(preset).config(),
            (None, None) => Config::default(),
        };

        if let Some(rows) = self.rows {
            config.rows = rows;
        }
        if let Some(cols) = self.cols {
            config.columns = cols;
        }
        if let Some(heuristic_weight) = self.heuristic_weight {
            config.heuristic_weight = heuristic_weight;
        }
        if let Some(seed) = self.seed {
            config.weights = WeightMode::Random { seed: Some(seed) };
        }

        config.validate()?;
        Ok(config)
    }

    fn grid(&self) -> anyhow::Result<Option<Grid>> {
        if let Some(path) = &self.image {
            let img = image::open(path)
                .with_context(|| format!("failed to open image {}", path.display()))?;
            return Ok(Some(parse_img(&img)?));
        }
        if let Some(path) = &self.layout {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read layout {}", path.display()))?;
            return Ok(Some(text.parse()?));
        }
        Ok(None)
    }

    fn walls(&self) -> anyhow::Result<Vec<Point>> {
        let Some(walls) = &self.walls else {
            return Ok(Vec::new());
        };
        walls
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<Point>().map_err(anyhow::Error::from))
            .collect()
    }
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = args.config()?;

    let mut session = match args.grid()? {
        Some(grid) => Session::with_grid(config, grid)?,
        None => Session::new(config)?,
    };
    for wall in args.walls()? {
        session
            .paint(wall, true)
            .with_context(|| format!("failed to place wall at {}", wall))?;
    }

    let grid = session.grid();
    info!(
        "searching a {}x{} grid from {} to {} with {} walls",
        grid.columns(),
        grid.rows(),
        grid.start(),
        grid.goal(),
        grid.wall_count()
    );

    let mut canvas = Canvas::for_grid(session.grid());
    session.render_all(&mut canvas);

    let state = if args.trace {
        loop {
            let state = session.step_once(&mut canvas)?;
            println!("{}", canvas);
            if state.is_done() {
                break state;
            }
        }
    } else {
        session.finish(&mut canvas)
    };

    println!("{}", canvas);

    let finder = session.finder();
    match (state, finder.result()) {
        (PathFinderState::PathFound, Some(result)) => println!(
            "path found: {} cells, cost {}",
            result.len(),
            result.total_cost
        ),
        _ => println!("no path from {} to {}", finder.start(), finder.goal()),
    }
    println!(
        "steps: {}, visited: {}, frontier: {}",
        finder.steps(),
        finder.visited_len(),
        finder.frontier_len()
    );

    Ok(())
}
