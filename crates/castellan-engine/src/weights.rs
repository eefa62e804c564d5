//! Named evaluation weight tables.
//!
//! Every scored feature carries a `{middlegame, endgame}` pair. The tables
//! are immutable for the engine's lifetime and are produced externally by
//! the tuner; [`EvaluationWeights::pairs`] / [`EvaluationWeights::from_pairs`]
//! are the narrow adapter to its ordered wire format, so nothing in the
//! search or evaluation depends on how the tuner packs its genomes.

use crate::eval::taper::{S, TaperedScore};

/// Errors from rebuilding a weight table out of the tuner's ordered pairs.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WeightsError {
    /// Wrong number of entries.
    #[error("expected {expected} weight entries, got {got}")]
    WrongCount { expected: usize, got: usize },

    /// An entry appeared out of order or under an unknown name.
    #[error("expected feature `{expected}`, got `{got}`")]
    NameMismatch { expected: &'static str, got: String },
}

macro_rules! weight_table {
    ($($field:ident),* $(,)?) => {
        /// One `{mg, eg}` weight per scored feature.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct EvaluationWeights {
            $(pub $field: TaperedScore,)*
        }

        /// Feature names in declaration order — the tuner's wire order.
        pub const FEATURE_NAMES: &[&str] = &[$(stringify!($field)),*];

        impl EvaluationWeights {
            /// Number of scored features.
            pub const FEATURE_COUNT: usize = FEATURE_NAMES.len();

            /// The table as ordered `(name, value)` pairs.
            pub fn pairs(&self) -> Vec<(&'static str, TaperedScore)> {
                vec![$((stringify!($field), self.$field)),*]
            }

            /// Rebuild a table from ordered `(name, value)` pairs.
            ///
            /// The sequence must list every feature, in declaration order.
            pub fn from_pairs(pairs: &[(&str, TaperedScore)]) -> Result<Self, WeightsError> {
                if pairs.len() != Self::FEATURE_COUNT {
                    return Err(WeightsError::WrongCount {
                        expected: Self::FEATURE_COUNT,
                        got: pairs.len(),
                    });
                }
                let mut entries = pairs.iter();
                $(
                    let $field = {
                        let &(name, value) = match entries.next() {
                            Some(entry) => entry,
                            None => unreachable!("length checked above"),
                        };
                        if name != stringify!($field) {
                            return Err(WeightsError::NameMismatch {
                                expected: stringify!($field),
                                got: name.to_string(),
                            });
                        }
                        value
                    };
                )*
                Ok(EvaluationWeights { $($field),* })
            }
        }
    };
}

weight_table!(
    pawn,
    knight,
    bishop,
    rook,
    queen,
    passed_pawn,
    doubled_pawn,
    isolated_pawn,
    backward_pawn,
    weak_square,
    rule_of_square,
    knight_outpost,
    knight_mobility,
    bishop_mobility,
    bishop_pair,
    rook_on_king_file,
    rook_on_king_adjacent_file,
    rook_on_seventh,
    rook_connected,
    rook_mobility,
    rook_behind_passed_pawn,
    rook_open_file,
    rook_semi_open_file,
    rook_on_weak_pawn_file,
    queen_mobility,
    king_pawn_shelter,
    king_pawn_storm,
    king_pressure,
);

impl Default for EvaluationWeights {
    /// The hand-tuned baseline table.
    fn default() -> Self {
        EvaluationWeights {
            pawn: S(100, 100),
            knight: S(305, 300),
            bishop: S(315, 320),
            rook: S(480, 520),
            queen: S(910, 910),
            passed_pawn: S(40, 80),
            doubled_pawn: S(10, 20),
            isolated_pawn: S(10, 20),
            backward_pawn: S(40, 40),
            weak_square: S(5, 2),
            rule_of_square: S(0, 50),
            knight_outpost: S(40, 35),
            knight_mobility: S(1, 2),
            bishop_mobility: S(3, 1),
            bishop_pair: S(15, 20),
            rook_on_king_file: S(15, 5),
            rook_on_king_adjacent_file: S(10, 5),
            rook_on_seventh: S(25, 35),
            rook_connected: S(20, 10),
            rook_mobility: S(2, 1),
            rook_behind_passed_pawn: S(10, 35),
            rook_open_file: S(15, 5),
            rook_semi_open_file: S(20, 10),
            rook_on_weak_pawn_file: S(35, 30),
            queen_mobility: S(1, 1),
            king_pawn_shelter: S(4, 0),
            king_pawn_storm: S(5, 0),
            king_pressure: S(3, 1),
        }
    }
}

impl EvaluationWeights {
    /// A tuner-produced table, kept to exercise the external-tuning pathway.
    pub fn tuned() -> Self {
        EvaluationWeights {
            pawn: S(100, 115),
            knight: S(174, 294),
            bishop: S(373, 371),
            rook: S(455, 504),
            queen: S(885, 822),
            passed_pawn: S(2, 7),
            doubled_pawn: S(20, 49),
            isolated_pawn: S(32, 7),
            backward_pawn: S(32, 28),
            weak_square: S(0, 13),
            rule_of_square: S(4, 58),
            knight_outpost: S(31, 9),
            knight_mobility: S(25, 3),
            bishop_mobility: S(6, 16),
            bishop_pair: S(33, 21),
            rook_on_king_file: S(60, 7),
            rook_on_king_adjacent_file: S(3, 13),
            rook_on_seventh: S(3, 0),
            rook_connected: S(2, 61),
            rook_mobility: S(8, 3),
            rook_behind_passed_pawn: S(41, 32),
            rook_open_file: S(60, 34),
            rook_semi_open_file: S(41, 38),
            rook_on_weak_pawn_file: S(38, 43),
            queen_mobility: S(1, 6),
            king_pawn_shelter: S(6, 3),
            king_pawn_storm: S(5, 10),
            king_pressure: S(11, 11),
        }
    }

    /// Middlegame material value of a piece kind, for capture gain estimates.
    pub fn material_mg(&self, kind: castellan_core::PieceKind) -> i32 {
        use castellan_core::PieceKind;
        match kind {
            PieceKind::Pawn => self.pawn.mg,
            PieceKind::Knight => self.knight.mg,
            PieceKind::Bishop => self.bishop.mg,
            PieceKind::Rook => self.rook.mg,
            PieceKind::Queen => self.queen.mg,
            PieceKind::King => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{EvaluationWeights, WeightsError, FEATURE_NAMES};
    use crate::eval::taper::S;

    #[test]
    fn pairs_follow_declared_order() {
        let weights = EvaluationWeights::default();
        let pairs = weights.pairs();
        assert_eq!(pairs.len(), EvaluationWeights::FEATURE_COUNT);
        for (pair, name) in pairs.iter().zip(FEATURE_NAMES) {
            assert_eq!(pair.0, *name);
        }
        assert_eq!(pairs[0], ("pawn", S(100, 100)));
    }

    #[test]
    fn from_pairs_roundtrip() {
        let weights = EvaluationWeights::tuned();
        let rebuilt = EvaluationWeights::from_pairs(&weights.pairs()).unwrap();
        assert_eq!(rebuilt, weights);
    }

    #[test]
    fn from_pairs_rejects_wrong_count() {
        let weights = EvaluationWeights::default();
        let mut pairs = weights.pairs();
        pairs.pop();
        assert!(matches!(
            EvaluationWeights::from_pairs(&pairs),
            Err(WeightsError::WrongCount { .. })
        ));
    }

    #[test]
    fn from_pairs_rejects_reordered_names() {
        let weights = EvaluationWeights::default();
        let mut pairs = weights.pairs();
        pairs.swap(0, 1);
        assert!(matches!(
            EvaluationWeights::from_pairs(&pairs),
            Err(WeightsError::NameMismatch { .. })
        ));
    }
}
