use std::time::Duration;

use log::{debug, info};

use crate::{
    config::Config,
    find::{PathFinder, PathFinderState, SearchEvent},
    grid::{Cell, Grid, Point},
    render::{CellRole, Surface},
    Error, Result,
};

/// What the driver is doing with the search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// A fresh search is waiting to be started
    Idle,
    /// Steps are taken on every `advance`
    Running,
    /// Stopped mid-search, resumes where it left off
    Paused,
    /// The search reached a terminal state
    Finished,
}

/// Owns the grid and the search on it and decides when steps happen.
///
/// The session is the only way the presentation touches the engine: it ticks
/// the search at the configured rate, pauses and resumes it, and refuses grid
/// edits while steps are being taken. Any edit restarts the search.
#[derive(Debug, Clone)]
pub struct Session {
    config: Config,
    grid: Grid,
    /// Loaded layouts are restored on reset instead of generating a new grid
    layout: Option<Grid>,
    finder: PathFinder,
    run: RunState,
    pending: Duration,
}

impl Default for Session {
    /// An open grid with the default configuration
    fn default() -> Self {
        let config = Config::default();
        let cells = vec![Cell::default(); config.rows * config.columns];
        let grid = Grid::from_cells(config.rows, config.columns, cells);
        Self::from_parts(config, grid, None)
    }
}

impl Session {
    pub fn new(config: Config) -> Result<Self> {
        let grid = config.build_grid()?;
        Ok(Self::from_parts(config, grid, None))
    }

    /// A session on a prepared grid (loaded from an image or a text layout).
    /// The grid dimensions and endpoints override the ones in `config`.
    pub fn with_grid(mut config: Config, grid: Grid) -> Result<Self> {
        config.rows = grid.rows();
        config.columns = grid.columns();
        config.start = Some(grid.start());
        config.goal = Some(grid.goal());
        config.validate()?;
        Ok(Self::from_parts(config, grid.clone(), Some(grid)))
    }

    fn from_parts(config: Config, grid: Grid, layout: Option<Grid>) -> Self {
        let finder = PathFinder::new(&grid, config.heuristic_weight);
        Self {
            config,
            grid,
            layout,
            finder,
            run: RunState::Idle,
            pending: Duration::ZERO,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn finder(&self) -> &PathFinder {
        &self.finder
    }

    pub fn run_state(&self) -> RunState {
        self.run
    }

    pub fn search_state(&self) -> PathFinderState {
        self.finder.state()
    }

    pub fn is_running(&self) -> bool {
        self.run == RunState::Running
    }

    /// Starts, pauses or resumes the search. After a finished search a new
    /// one is started on the same grid.
    pub fn start_pause(&mut self) -> RunState {
        self.run = match self.run {
            RunState::Running => RunState::Paused,
            RunState::Idle | RunState::Paused => RunState::Running,
            RunState::Finished => {
                self.restart_search();
                RunState::Running
            }
        };
        self.pending = Duration::ZERO;
        debug!("run state is now {:?}", self.run);
        self.run
    }

    /// Feeds elapsed wall time into the session. Takes one step for every
    /// full step interval, at most `max_steps_per_advance` per call.
    /// Returns the number of steps taken.
    pub fn advance<S: Surface + ?Sized>(&mut self, elapsed: Duration, surface: &mut S) -> usize {
        if self.run != RunState::Running {
            return 0;
        }

        let interval = self.config.step_interval();
        let limit = self.config.max_steps_per_advance;
        self.pending += elapsed;

        let mut steps = 0;
        while self.pending >= interval && steps < limit {
            self.pending -= interval;
            steps += 1;
            if self.step_forward(surface).is_done() {
                break;
            }
        }

        if steps == limit {
            // too far behind, do not try to catch up
            self.pending = Duration::ZERO;
        }
        steps
    }

    /// Takes a single step by hand, only while not running
    pub fn step_once<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Result<PathFinderState> {
        match self.run {
            RunState::Running => Err(Error::SearchRunning),
            RunState::Finished => Ok(self.finder.state()),
            RunState::Idle | RunState::Paused => {
                self.run = RunState::Paused;
                Ok(self.step_forward(surface))
            }
        }
    }

    /// Runs the search to completion right away
    pub fn finish<S: Surface + ?Sized>(&mut self, surface: &mut S) -> PathFinderState {
        loop {
            let state = self.step_forward(surface);
            if state.is_done() {
                return state;
            }
        }
    }

    fn step_forward<S: Surface + ?Sized>(&mut self, surface: &mut S) -> PathFinderState {
        let grid = &self.grid;
        let state = self
            .finder
            .step_with(grid, |event| forward_event(grid, event, &mut *surface));

        if state.is_done() && self.run != RunState::Finished {
            self.run = RunState::Finished;
            self.pending = Duration::ZERO;
        }
        state
    }

    /// Rebuilds the grid and the search, back to idle
    pub fn reset(&mut self) -> Result<()> {
        self.grid = match &self.layout {
            Some(layout) => {
                // endpoints moved since loading go back with the layout
                self.config.start = Some(layout.start());
                self.config.goal = Some(layout.goal());
                layout.clone()
            }
            None => self.config.build_grid()?,
        };
        info!(
            "reset to a {}x{} grid",
            self.grid.columns(),
            self.grid.rows()
        );
        self.restart_search();
        Ok(())
    }

    /// Applies new settings. Changes to the grid shape or weights rebuild the
    /// grid, a new heuristic weight restarts the search, timing changes apply
    /// immediately.
    pub fn reconfigure(&mut self, config: Config) -> Result<()> {
        config.validate()?;
        if config == self.config {
            return Ok(());
        }

        let rebuild = self.config.changes_grid(&config);
        let restart = rebuild || self.config.heuristic_weight != config.heuristic_weight;
        if restart && self.is_running() {
            return Err(Error::SearchRunning);
        }

        if rebuild {
            let grid = config.build_grid()?;
            self.layout = None;
            self.grid = grid;
        }
        self.config = config;
        if restart {
            self.restart_search();
        }
        Ok(())
    }

    pub fn toggle_wall(&mut self, point: Point) -> Result<bool> {
        self.ensure_editable()?;
        let blocked = self.grid.toggle_wall(point)?;
        self.restart_search();
        Ok(blocked)
    }

    /// Sets a wall state, used for painting with the pointer. Returns the
    /// resulting state, the search only restarts when something changed.
    pub fn paint(&mut self, point: Point, blocked: bool) -> Result<bool> {
        self.ensure_editable()?;
        let current = self.grid.is_blocked(point)?;
        if current == blocked || self.grid.is_endpoint(point) {
            return Ok(current);
        }
        let blocked = self.grid.set_wall(point, blocked)?;
        self.restart_search();
        Ok(blocked)
    }

    pub fn set_start(&mut self, point: Point) -> Result<()> {
        self.ensure_editable()?;
        self.grid.set_start(point)?;
        self.config.start = Some(point);
        self.restart_search();
        Ok(())
    }

    pub fn set_goal(&mut self, point: Point) -> Result<()> {
        self.ensure_editable()?;
        self.grid.set_goal(point)?;
        self.config.goal = Some(point);
        self.restart_search();
        Ok(())
    }

    pub fn clear_walls(&mut self) -> Result<()> {
        self.ensure_editable()?;
        self.grid.clear_walls();
        self.restart_search();
        Ok(())
    }

    /// Draws every cell with its current role
    pub fn render_all<S: Surface + ?Sized>(&self, surface: &mut S) {
        for point in self.grid.points() {
            surface.render(point, self.finder.role_of(&self.grid, point));
        }
    }

    fn ensure_editable(&self) -> Result<()> {
        if self.is_running() {
            Err(Error::SearchRunning)
        } else {
            Ok(())
        }
    }

    fn restart_search(&mut self) {
        self.finder = PathFinder::new(&self.grid, self.config.heuristic_weight);
        self.run = RunState::Idle;
        self.pending = Duration::ZERO;
    }
}

fn forward_event<S: Surface + ?Sized>(grid: &Grid, event: SearchEvent, surface: &mut S) {
    match event {
        SearchEvent::NodeVisited(point) => surface.render(point, CellRole::Visited),
        SearchEvent::FrontierAdded(point) => {
            let role = if point == grid.goal() {
                CellRole::Goal
            } else if point == grid.start() {
                CellRole::Start
            } else {
                CellRole::Frontier
            };
            surface.render(point, role);
        }
        SearchEvent::PathFound(result) => {
            for point in result.interior() {
                surface.render(*point, CellRole::Path);
            }
        }
        SearchEvent::Relaxed(_) | SearchEvent::Exhausted => {}
    }
}
