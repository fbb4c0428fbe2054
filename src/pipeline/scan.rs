//! The scan controller: produces the band-interleaved-by-pixel index stream
//! and the per-step control flags consumed by every downstream stage.
//!
//! Order is z innermost, then x, then y. The scale exponent follows the
//! weight-update schedule: pinned at v_min through the first row of pixels,
//! then rising by one every 2^tinc_log pixels until it saturates at v_max.

/// Per-step control flags, valid for exactly one sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CtrlFlags {
    /// y == 0.
    pub first_line: bool,
    /// x == 0.
    pub first_in_line: bool,
    /// x == NX - 1.
    pub last_in_line: bool,
    /// Terminal cell of the whole cube.
    pub last: bool,
    /// Weight-update scale exponent p(t), non-decreasing over the frame.
    pub scale_exponent: i16,
}

/// Cursor position emitted alongside the flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanStep {
    pub x: u16,
    pub y: u16,
    pub z: u16,
    pub ctrl: CtrlFlags,
}

/// Dimensions plus the scale-exponent schedule.
#[derive(Debug, Clone, Copy)]
pub struct ScanConfig {
    pub nx: u16,
    pub ny: u16,
    pub nz: u16,
    pub v_min: i16,
    pub v_max: i16,
    pub tinc_log: i16,
}

/// The BIP scan cursor. One `step` yields the current cell and advances.
#[derive(Debug)]
pub struct ScanState {
    cfg: ScanConfig,
    x: u16,
    y: u16,
    z: u16,
    /// Spatial pixel index, shared by all bands of a pixel.
    t: u32,
}

impl ScanState {
    pub fn new(cfg: ScanConfig) -> Self {
        Self {
            cfg,
            x: 0,
            y: 0,
            z: 0,
            t: 0,
        }
    }

    /// Emits the current cell, then advances the cursor: z first, then x,
    /// then y. The spatial index wraps at the frame boundary.
    pub fn step(&mut self) -> ScanStep {
        let ctrl = CtrlFlags {
            first_line: self.y == 0,
            first_in_line: self.x == 0,
            last_in_line: self.x == self.cfg.nx - 1,
            last: self.x == self.cfg.nx - 1
                && self.y == self.cfg.ny - 1
                && self.z == self.cfg.nz - 1,
            scale_exponent: self.scale_exponent(),
        };
        let out = ScanStep {
            x: self.x,
            y: self.y,
            z: self.z,
            ctrl,
        };

        if self.z + 1 > self.cfg.nz - 1 {
            self.z = 0;
            let spatial_limit = u32::from(self.cfg.nx) * u32::from(self.cfg.ny);
            self.t = (self.t + 1) % spatial_limit;
            if self.x == self.cfg.nx - 1 {
                self.x = 0;
                if self.y == self.cfg.ny - 1 {
                    self.y = 0;
                } else {
                    self.y += 1;
                }
            } else {
                self.x += 1;
            }
        } else {
            self.z += 1;
        }

        out
    }

    fn scale_exponent(&self) -> i16 {
        let adjusted = self.t as i64 - i64::from(self.cfg.nx);
        if adjusted <= 0 {
            return self.cfg.v_min;
        }
        let limit = i64::from(self.cfg.v_max) - i64::from(self.cfg.v_min);
        if adjusted >= limit << self.cfg.tinc_log {
            self.cfg.v_max
        } else {
            self.cfg.v_min + (adjusted >> self.cfg.tinc_log) as i16
        }
    }
}

//==================================================================================
// Unit Tests
//==================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(nx: u16, ny: u16, nz: u16) -> ScanState {
        ScanState::new(ScanConfig {
            nx,
            ny,
            nz,
            v_min: -6,
            v_max: 9,
            tinc_log: 4,
        })
    }

    #[test]
    fn test_bip_order_covers_every_cell_once() {
        let nx = 4;
        let ny = 3;
        let nz = 2;
        let mut state = scan(nx, ny, nz);
        let mut visited = Vec::new();
        let mut exponents = Vec::new();
        for _ in 0..(nx as usize * ny as usize * nz as usize) {
            let step = state.step();
            visited.push((step.x, step.y, step.z));
            exponents.push(step.ctrl.scale_exponent);
        }

        assert_eq!(visited.first(), Some(&(0, 0, 0)));
        assert_eq!(visited.last(), Some(&(nx - 1, ny - 1, nz - 1)));
        // z innermost: pixel t holds bands 0..nz contiguously.
        for t in 0..(nx as usize * ny as usize) {
            for z in 0..nz as usize {
                let (x, y, vz) = visited[t * nz as usize + z];
                assert_eq!(x as usize, t % nx as usize);
                assert_eq!(y as usize, t / nx as usize);
                assert_eq!(vz as usize, z);
            }
        }

        // The scale exponent starts at v_min, never leaves [v_min, v_max],
        // and is non-decreasing.
        assert_eq!(exponents[0], -6);
        assert!(exponents.iter().all(|&v| (-6..=9).contains(&v)));
        assert!(exponents.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_flags_mark_row_edges() {
        let mut state = scan(3, 2, 1);
        let expected = [
            // (first_line, first_in_line, last_in_line, last)
            (true, true, false, false),
            (true, false, false, false),
            (true, false, true, false),
            (false, true, false, false),
            (false, false, false, false),
            (false, false, true, true),
        ];
        for &(fl, fil, lil, last) in &expected {
            let step = state.step();
            assert_eq!(step.ctrl.first_line, fl);
            assert_eq!(step.ctrl.first_in_line, fil);
            assert_eq!(step.ctrl.last_in_line, lil);
            assert_eq!(step.ctrl.last, last);
        }
    }

    #[test]
    fn test_scale_exponent_schedule_saturates() {
        // Narrow schedule so saturation is reachable in a small frame:
        // v_min=-1, v_max=1, period 2^1.
        let mut state = ScanState::new(ScanConfig {
            nx: 2,
            ny: 8,
            nz: 1,
            v_min: -1,
            v_max: 1,
            tinc_log: 1,
        });
        let mut exponents = Vec::new();
        for _ in 0..16 {
            exponents.push(state.step().ctrl.scale_exponent);
        }
        // First row of pixels (t <= nx) stays at v_min.
        assert!(exponents[..3].iter().all(|&v| v == -1));
        // Saturates at v_max and stays there.
        assert_eq!(*exponents.last().unwrap(), 1);
        let first_max = exponents.iter().position(|&v| v == 1).unwrap();
        assert!(exponents[first_max..].iter().all(|&v| v == 1));
    }

    #[test]
    fn test_single_band_cursor_wraps_spatially() {
        let mut state = scan(2, 2, 1);
        for _ in 0..4 {
            state.step();
        }
        // After one full frame the cursor is back at the origin.
        let step = state.step();
        assert_eq!((step.x, step.y, step.z), (0, 0, 0));
        assert!(step.ctrl.first_line && step.ctrl.first_in_line);
    }
}
