//! Grid mechanics for a single round: bomb placement, reveal order, and the
//! collect/stop/resolve lifecycle driven by the page layer.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{RevealOrder, TaskConfig};

/// One box on the grid, addressed 1-based from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoxCell {
    pub row: u32,
    pub col: u32,
}

impl BoxCell {
    #[must_use]
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// All cells in row-major order, rows then columns, 1-based.
#[must_use]
pub fn row_major_cells(rows: u32, cols: u32) -> Vec<BoxCell> {
    let mut cells = Vec::with_capacity((rows * cols) as usize);
    for row in 1..=rows {
        for col in 1..=cols {
            cells.push(BoxCell::new(row, col));
        }
    }
    cells
}

/// Board state for one round of the task.
///
/// The surrounding page layer drives the lifecycle: `start`, then either
/// timed [`RoundBoard::advance`] calls (dynamic play), individual
/// [`RoundBoard::toggle`] clicks, or a single [`RoundBoard::set_collected_count`]
/// (number entry), then `stop` and optionally `resolve` for feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundBoard {
    rows: u32,
    cols: u32,
    bomb: BoxCell,
    /// Reveal order for automatic and counted collection.
    order: Vec<BoxCell>,
    /// Collected boxes in collection order (the `boxes_scheme` form field).
    collected: Vec<BoxCell>,
    cursor: usize,
    undoable: bool,
    started: bool,
    stopped: bool,
    resolved: bool,
}

impl RoundBoard {
    /// Build a fresh board for one round, drawing the bomb cell and the
    /// reveal order from the session RNG.
    #[must_use]
    pub fn new(cfg: &TaskConfig, rng: &mut impl Rng) -> Self {
        let bomb = BoxCell::new(
            rng.gen_range(1..=cfg.num_rows),
            rng.gen_range(1..=cfg.num_cols),
        );
        let order = match cfg.reveal_order {
            RevealOrder::Sequential => row_major_cells(cfg.num_rows, cfg.num_cols),
            RevealOrder::Shuffled => shuffled_cells(cfg.num_rows, cfg.num_cols, rng),
        };
        Self {
            rows: cfg.num_rows,
            cols: cfg.num_cols,
            bomb,
            order,
            collected: Vec::new(),
            cursor: 0,
            undoable: cfg.undoable,
            started: false,
            stopped: false,
            resolved: false,
        }
    }

    /// Begin the round. Collection calls before `start` are ignored.
    pub fn start(&mut self) {
        self.started = true;
    }

    /// Collect the next box in reveal order (one dynamic-play tick).
    ///
    /// Returns the collected cell, or `None` once the grid is exhausted,
    /// at which point the round stops automatically.
    pub fn advance(&mut self) -> Option<BoxCell> {
        if !self.accepting() {
            return None;
        }
        let Some(&cell) = self.order.get(self.cursor) else {
            self.stop();
            return None;
        };
        self.cursor += 1;
        self.collected.push(cell);
        if self.cursor == self.order.len() {
            self.stop();
        }
        Some(cell)
    }

    /// Toggle a clicked box. De-selection is refused when the session is
    /// configured as not undoable. Returns the box's resulting state.
    pub fn toggle(&mut self, cell: BoxCell) -> bool {
        if !self.accepting() || !self.contains(cell) {
            return self.collected.contains(&cell);
        }
        if let Some(pos) = self.collected.iter().position(|c| *c == cell) {
            if self.undoable {
                self.collected.remove(pos);
                return false;
            }
            return true;
        }
        self.collected.push(cell);
        true
    }

    /// Set the collection to the first `count` boxes in reveal order
    /// (number-entry input). Counts beyond the grid size are clamped.
    pub fn set_collected_count(&mut self, count: u32) {
        if !self.accepting() {
            return;
        }
        let count = (count as usize).min(self.order.len());
        self.collected.clear();
        self.collected.extend_from_slice(&self.order[..count]);
        self.cursor = count;
    }

    /// Stop the round; no further collection is accepted.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// Reveal all boxes (the feedback step after stopping).
    pub fn resolve(&mut self) {
        if self.stopped {
            self.resolved = true;
        }
    }

    fn accepting(&self) -> bool {
        self.started && !self.stopped
    }

    fn contains(&self, cell: BoxCell) -> bool {
        (1..=self.rows).contains(&cell.row) && (1..=self.cols).contains(&cell.col)
    }

    /// Whether the bomb is among the collected boxes.
    #[must_use]
    pub fn has_bomb(&self) -> bool {
        self.collected.contains(&self.bomb)
    }

    #[must_use]
    pub const fn bomb(&self) -> BoxCell {
        self.bomb
    }

    /// Collected boxes in collection order.
    #[must_use]
    pub fn scheme(&self) -> &[BoxCell] {
        &self.collected
    }

    #[must_use]
    pub fn collected_count(&self) -> u32 {
        self.collected.len() as u32
    }

    #[must_use]
    pub fn remaining(&self) -> u32 {
        self.rows * self.cols - self.collected_count()
    }

    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.started
    }

    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        self.stopped
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.resolved
    }
}

/// Inside-out shuffle of the row-major cell sequence.
fn shuffled_cells(rows: u32, cols: u32, rng: &mut impl Rng) -> Vec<BoxCell> {
    let mut order: Vec<BoxCell> = Vec::with_capacity((rows * cols) as usize);
    for cell in row_major_cells(rows, cols) {
        let slot = rng.gen_range(0..=order.len());
        if slot == order.len() {
            order.push(cell);
        } else {
            let displaced = order[slot];
            order.push(displaced);
            order[slot] = cell;
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayMode;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use std::collections::HashSet;

    fn small_config(reveal_order: RevealOrder, undoable: bool) -> TaskConfig {
        TaskConfig {
            num_rows: 3,
            num_cols: 4,
            reveal_order,
            undoable,
            play_mode: PlayMode::Static,
            ..TaskConfig::default()
        }
    }

    #[test]
    fn bomb_within_bounds_and_order_is_permutation() {
        let cfg = small_config(RevealOrder::Shuffled, true);
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        for _ in 0..20 {
            let board = RoundBoard::new(&cfg, &mut rng);
            assert!((1..=3).contains(&board.bomb().row));
            assert!((1..=4).contains(&board.bomb().col));
            let unique: HashSet<BoxCell> = board.order.iter().copied().collect();
            assert_eq!(unique.len(), 12);
        }
    }

    #[test]
    fn sequential_order_is_row_major() {
        let cfg = small_config(RevealOrder::Sequential, true);
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let board = RoundBoard::new(&cfg, &mut rng);
        assert_eq!(board.order[0], BoxCell::new(1, 1));
        assert_eq!(board.order[3], BoxCell::new(1, 4));
        assert_eq!(board.order[4], BoxCell::new(2, 1));
        assert_eq!(board.order[11], BoxCell::new(3, 4));
    }

    #[test]
    fn same_seed_reproduces_board() {
        let cfg = small_config(RevealOrder::Shuffled, true);
        let a = RoundBoard::new(&cfg, &mut ChaCha20Rng::seed_from_u64(99));
        let b = RoundBoard::new(&cfg, &mut ChaCha20Rng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn advance_walks_order_and_stops_at_exhaustion() {
        let cfg = small_config(RevealOrder::Sequential, true);
        let mut board = RoundBoard::new(&cfg, &mut ChaCha20Rng::seed_from_u64(1));
        assert_eq!(board.advance(), None); // not started yet
        board.start();
        for _ in 0..12 {
            assert!(board.advance().is_some());
        }
        assert!(board.is_stopped());
        assert_eq!(board.advance(), None);
        assert_eq!(board.collected_count(), 12);
        assert_eq!(board.remaining(), 0);
        assert!(board.has_bomb());
    }

    #[test]
    fn toggle_honors_undoable() {
        let cfg = small_config(RevealOrder::Sequential, false);
        let mut board = RoundBoard::new(&cfg, &mut ChaCha20Rng::seed_from_u64(2));
        board.start();

        let cell = BoxCell::new(2, 2);
        assert!(board.toggle(cell));
        // toggling again must not deselect when undoable is off
        assert!(board.toggle(cell));
        assert_eq!(board.collected_count(), 1);

        let cfg = small_config(RevealOrder::Sequential, true);
        let mut board = RoundBoard::new(&cfg, &mut ChaCha20Rng::seed_from_u64(2));
        board.start();
        assert!(board.toggle(cell));
        assert!(!board.toggle(cell));
        assert_eq!(board.collected_count(), 0);
    }

    #[test]
    fn toggle_rejects_out_of_bounds_and_stopped_boards() {
        let cfg = small_config(RevealOrder::Sequential, true);
        let mut board = RoundBoard::new(&cfg, &mut ChaCha20Rng::seed_from_u64(3));
        board.start();
        assert!(!board.toggle(BoxCell::new(9, 9)));
        board.stop();
        assert!(!board.toggle(BoxCell::new(1, 1)));
        assert_eq!(board.collected_count(), 0);
    }

    #[test]
    fn set_collected_count_clamps_and_follows_order() {
        let cfg = small_config(RevealOrder::Sequential, true);
        let mut board = RoundBoard::new(&cfg, &mut ChaCha20Rng::seed_from_u64(4));
        board.start();
        board.set_collected_count(3);
        assert_eq!(
            board.scheme(),
            &[BoxCell::new(1, 1), BoxCell::new(1, 2), BoxCell::new(1, 3)]
        );
        board.set_collected_count(100);
        assert_eq!(board.collected_count(), 12);
    }

    #[test]
    fn resolve_requires_stop() {
        let cfg = small_config(RevealOrder::Sequential, true);
        let mut board = RoundBoard::new(&cfg, &mut ChaCha20Rng::seed_from_u64(6));
        board.start();
        board.resolve();
        assert!(!board.is_resolved());
        board.stop();
        board.resolve();
        assert!(board.is_resolved());
    }
}
