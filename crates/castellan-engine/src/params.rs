//! Numeric search parameters.
//!
//! Pruning margins, reduction thresholds, and ordering scores, supplied at
//! construction and immutable afterwards. The external tuner explores these
//! freely, so [`SearchParameters::sanitized`] clamps every value that could
//! otherwise divide by zero or invert a threshold.

/// Tunable pruning/reduction/ordering thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParameters {
    /// Iteration depth from which aspiration windows are tried.
    pub aspiration_min_depth: u8,
    /// Half-width of the first aspiration window, in centipawns.
    pub aspiration_initial_delta: i32,
    /// Widened half-widths tried after each aspiration failure, before
    /// falling back to a full-width window.
    pub aspiration_widening: [i32; 2],

    /// Maximum depth for reverse futility pruning.
    pub rfp_max_depth: u8,
    /// Reverse futility margin per remaining ply of depth.
    pub rfp_margin: i32,
    /// Use the lazy evaluation for reverse futility checks.
    pub rfp_lazy_eval: bool,

    /// Razoring margins indexed by `depth - 1`; razoring applies at depths
    /// `1..=3`.
    pub futility_margins: [i32; 3],
    /// Use the lazy evaluation for razoring checks.
    pub razor_lazy_eval: bool,

    /// Minimum depth for null-move pruning.
    pub null_move_min_depth: u8,
    /// Base depth reduction of the null-move search.
    pub null_move_base_reduction: u8,
    /// Extra reduction divisor: the reduction grows by `depth / divisor`.
    pub null_move_depth_divisor: u8,
    /// Use the lazy evaluation for the null-move precondition.
    pub null_move_lazy_eval: bool,

    /// Quiescence delta-pruning margin, in centipawns.
    pub delta_margin: i32,

    /// Minimum depth for late-move reductions.
    pub lmr_min_depth: u8,
    /// Moves searched before late-move reductions apply.
    pub lmr_min_moves: usize,
    /// Depth from which an extra ply of reduction is taken.
    pub lmr_deep_depth: u8,
    /// Move count from which an extra ply of reduction is taken.
    pub lmr_deep_moves: usize,

    /// Maximum depth for late-move pruning of quiet moves.
    pub lmp_max_depth: u8,
    /// Quiet moves examined before late-move pruning, plus `depth²`.
    pub lmp_base_moves: usize,

    /// Ordering bonus for promotions within their band.
    pub promotion_move_score: i32,
    /// Ordering bonus for killer moves within their band.
    pub killer_move_score: i32,
    /// Base ordering score for quiet moves.
    pub base_move_score: i32,

    /// Ceiling on iterative-deepening depth.
    pub max_depth: u8,
}

impl Default for SearchParameters {
    fn default() -> Self {
        SearchParameters {
            aspiration_min_depth: 7,
            aspiration_initial_delta: 20,
            aspiration_widening: [100, 350],
            rfp_max_depth: 3,
            rfp_margin: 120,
            rfp_lazy_eval: true,
            futility_margins: [300, 900, 1300],
            razor_lazy_eval: true,
            null_move_min_depth: 3,
            null_move_base_reduction: 2,
            null_move_depth_divisor: 4,
            null_move_lazy_eval: true,
            delta_margin: 300,
            lmr_min_depth: 3,
            lmr_min_moves: 3,
            lmr_deep_depth: 6,
            lmr_deep_moves: 4,
            lmp_max_depth: 3,
            lmp_base_moves: 3,
            promotion_move_score: 200,
            killer_move_score: 100,
            base_move_score: 10,
            max_depth: 64,
        }
    }
}

impl SearchParameters {
    /// Clamp every parameter into its safe range.
    ///
    /// The tuner can hand over degenerate values (a zero divisor, a negative
    /// margin, a zero depth ceiling); the search must never trust them raw.
    pub fn sanitized(self) -> Self {
        SearchParameters {
            aspiration_min_depth: self.aspiration_min_depth.max(2),
            aspiration_initial_delta: self.aspiration_initial_delta.max(1),
            aspiration_widening: [
                self.aspiration_widening[0].max(1),
                self.aspiration_widening[1].max(1),
            ],
            rfp_max_depth: self.rfp_max_depth.min(8),
            rfp_margin: self.rfp_margin.max(0),
            rfp_lazy_eval: self.rfp_lazy_eval,
            futility_margins: self.futility_margins.map(|m| m.max(0)),
            razor_lazy_eval: self.razor_lazy_eval,
            null_move_min_depth: self.null_move_min_depth.max(2),
            null_move_base_reduction: self.null_move_base_reduction.clamp(1, 4),
            null_move_depth_divisor: self.null_move_depth_divisor.max(1),
            null_move_lazy_eval: self.null_move_lazy_eval,
            delta_margin: self.delta_margin.max(0),
            lmr_min_depth: self.lmr_min_depth.max(2),
            lmr_min_moves: self.lmr_min_moves.max(1),
            lmr_deep_depth: self.lmr_deep_depth.max(self.lmr_min_depth.max(2)),
            lmr_deep_moves: self.lmr_deep_moves.max(1),
            lmp_max_depth: self.lmp_max_depth.min(6),
            lmp_base_moves: self.lmp_base_moves.max(1),
            promotion_move_score: self.promotion_move_score.clamp(0, 10_000),
            killer_move_score: self.killer_move_score.clamp(0, 10_000),
            base_move_score: self.base_move_score.clamp(0, 10_000),
            max_depth: self.max_depth.clamp(1, 64),
        }
    }
}
