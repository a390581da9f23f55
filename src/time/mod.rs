//! Time management helper for arrocco

use crate::board::Color;

/// Clock state sent with a "go" command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeControl {
    pub wtime: Option<u64>,
    pub btime: Option<u64>,
    pub winc: Option<u64>,
    pub binc: Option<u64>,
    pub movestogo: Option<u64>,
    pub movetime: Option<u64>,
}

impl TimeControl {
    /// Whether any clock field was given at all
    pub fn is_timed(&self) -> bool {
        self.movetime.is_some() || self.wtime.is_some() || self.btime.is_some()
    }
}

pub struct TimeManager;

impl TimeManager {
    /// Kept back from the clock for transmission lag
    pub const SAFETY_MARGIN_MS: u64 = 50;
    pub const DEFAULT_MOVES_TO_GO: u64 = 30;
    pub const MIN_TIME_MS: u64 = 10;

    /// Milliseconds to spend on this move, or None when the search should
    /// run without a clock (depth-only or infinite requests)
    pub fn allocate_time(tc: &TimeControl, side: Color, fullmove: u16) -> Option<u64> {
        if let Some(mt) = tc.movetime {
            return Some(mt);
        }

        let (time, inc) = match side {
            Color::White => (tc.wtime?, tc.winc.unwrap_or(0)),
            Color::Black => (tc.btime?, tc.binc.unwrap_or(0)),
        };

        let available = time.saturating_sub(Self::SAFETY_MARGIN_MS);
        if available == 0 {
            return Some(Self::MIN_TIME_MS);
        }

        let moves_to_go = tc.movestogo.filter(|&m| m > 0).unwrap_or(Self::DEFAULT_MOVES_TO_GO);
        let mut alloc = available / moves_to_go + inc * 9 / 10;

        // opening gets a little more, the late game a little less
        if fullmove < 10 {
            alloc = alloc * 12 / 10;
        } else if fullmove > 40 {
            alloc = alloc * 8 / 10;
        }

        alloc = alloc.min(available / 4).max(Self::MIN_TIME_MS);
        log::debug!(
            "time: clock {}ms inc {}ms movestogo {} -> {}ms",
            time,
            inc,
            moves_to_go,
            alloc
        );
        Some(alloc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movetime_wins() {
        let tc = TimeControl {
            wtime: Some(60_000),
            movetime: Some(1234),
            ..Default::default()
        };
        assert_eq!(TimeManager::allocate_time(&tc, Color::White, 20), Some(1234));
    }

    #[test]
    fn no_clock_means_no_limit() {
        let tc = TimeControl::default();
        assert!(!tc.is_timed());
        assert_eq!(TimeManager::allocate_time(&tc, Color::White, 1), None);

        // only the opponent's clock is known
        let tc = TimeControl {
            btime: Some(10_000),
            ..Default::default()
        };
        assert_eq!(TimeManager::allocate_time(&tc, Color::White, 1), None);
    }

    #[test]
    fn middlegame_split_with_increment() {
        let tc = TimeControl {
            wtime: Some(60_050),
            winc: Some(1000),
            ..Default::default()
        };
        // 60000 / 30 + 900
        assert_eq!(TimeManager::allocate_time(&tc, Color::White, 20), Some(2900));
    }

    #[test]
    fn phase_scaling() {
        let tc = TimeControl {
            btime: Some(30_050),
            movestogo: Some(10),
            ..Default::default()
        };
        assert_eq!(TimeManager::allocate_time(&tc, Color::Black, 5), Some(3600));
        assert_eq!(TimeManager::allocate_time(&tc, Color::Black, 20), Some(3000));
        assert_eq!(TimeManager::allocate_time(&tc, Color::Black, 50), Some(2400));
    }

    #[test]
    fn capped_at_quarter_and_floored() {
        let tc = TimeControl {
            wtime: Some(4_050),
            winc: Some(10_000),
            ..Default::default()
        };
        assert_eq!(TimeManager::allocate_time(&tc, Color::White, 20), Some(1000));

        let tc = TimeControl {
            wtime: Some(60),
            ..Default::default()
        };
        assert_eq!(TimeManager::allocate_time(&tc, Color::White, 20), Some(10));

        let tc = TimeControl {
            wtime: Some(20),
            ..Default::default()
        };
        assert_eq!(TimeManager::allocate_time(&tc, Color::White, 20), Some(10));
    }
}
