//! Floating point control state.
//!
//! The FP register values themselves live in the general register file,
//! exactly as the hardware description shares them; this module only
//! models the control and status registers.

use maven_core::error::Exception;

/// Sticky/cause flag bits, within the five-bit fcsr fields.
pub mod flag {
    pub const INEXACT: u32 = 0x01;
    pub const UNDERFLOW: u32 = 0x02;
    pub const OVERFLOW: u32 = 0x04;
    pub const DIV0: u32 = 0x08;
    pub const INVALID: u32 = 0x10;
    /// Cause-only bit, never sticky.
    pub const UNIMPLEMENTED: u32 = 0x20;
}

/// Rounding modes in the fcsr rm field.
pub mod rm {
    pub const NEAREST: u32 = 0;
    pub const TOWARD_ZERO: u32 = 1;
    pub const UP: u32 = 2;
    pub const DOWN: u32 = 3;
}

/// FP control register numbers for cfc1/ctc1.
pub mod ctl {
    pub const FIR: usize = 0;
    pub const FCCR: usize = 25;
    pub const FEXR: usize = 26;
    pub const FENR: usize = 28;
    pub const FCSR: usize = 31;
}

/// Control/status register, layout (LSB first):
/// rm[1:0] flags[6:2] enables[11:7] cause[17:12] zeros[20:18]
/// impl[22:21] fcc0[23] fs[24] fcc[31:25]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fcsr(pub u32);

impl Fcsr {
    fn field(self, shift: u32, width: u32) -> u32 {
        (self.0 >> shift) & ((1 << width) - 1)
    }

    fn set_field(&mut self, shift: u32, width: u32, val: u32) {
        let mask = ((1u32 << width) - 1) << shift;
        self.0 = (self.0 & !mask) | ((val << shift) & mask);
    }

    pub fn rm(self) -> u32 {
        self.field(0, 2)
    }

    pub fn set_rm(&mut self, v: u32) {
        self.set_field(0, 2, v);
    }

    pub fn flags(self) -> u32 {
        self.field(2, 5)
    }

    pub fn set_flags(&mut self, v: u32) {
        self.set_field(2, 5, v);
    }

    pub fn enables(self) -> u32 {
        self.field(7, 5)
    }

    pub fn set_enables(&mut self, v: u32) {
        self.set_field(7, 5, v);
    }

    pub fn cause(self) -> u32 {
        self.field(12, 6)
    }

    pub fn set_cause(&mut self, v: u32) {
        self.set_field(12, 6, v);
    }

    pub fn fcc0(self) -> u32 {
        self.field(23, 1)
    }

    pub fn set_fcc0(&mut self, v: u32) {
        self.set_field(23, 1, v);
    }

    pub fn fs(self) -> u32 {
        self.field(24, 1)
    }

    pub fn fcc(self) -> u32 {
        self.field(25, 7)
    }

    pub fn set_fcc(&mut self, v: u32) {
        self.set_field(25, 7, v);
    }
}

/// Floating point unit control state.
#[derive(Debug, Clone, Default)]
pub struct Fpu {
    pub fcsr: Fcsr,
    pub fir: u32,
}

impl Fpu {
    pub fn new() -> Self {
        // fir advertises single and double support.
        Self {
            fcsr: Fcsr(0),
            fir: (1 << 16) | (1 << 17),
        }
    }

    /// Clears the per-operation cause bits and re-applies the rounding
    /// mode. Must be called before every FP operation; a false return
    /// aborts the operation.
    pub fn cleanup_state(&mut self) -> bool {
        self.fcsr.set_cause(0);
        self.set_rounding_mode(self.fcsr.rm())
    }

    pub fn set_rounding_mode(&mut self, mode: u32) -> bool {
        if mode > rm::DOWN {
            return false;
        }
        self.fcsr.set_rm(mode);
        true
    }

    /// Doubles occupy an even/odd register pair.
    pub fn check_double_aligned(&self, idx: usize) -> bool {
        idx & 0x1 == 0
    }

    /// Records a raised IEEE exception in the cause field.
    pub fn signal_exception(&mut self, flag: u32) -> bool {
        self.fcsr.set_cause(self.fcsr.cause() | flag);
        true
    }

    /// Decides whether the raised exceptions allow the operation to
    /// complete. Allowed exceptions accumulate into the sticky flags;
    /// anything else (or an enabled trap) aborts the register write.
    pub fn handle_exceptions(&mut self, allowed: u32) -> bool {
        let cause = self.fcsr.cause();
        if cause & !allowed != 0 {
            return false;
        }
        if cause & self.fcsr.enables() != 0 {
            return false;
        }
        self.fcsr.set_flags(self.fcsr.flags() | (cause & 0x1f));
        true
    }

    /// cfc1 view of a control register.
    pub fn read_ctl(&self, idx: usize) -> Option<u32> {
        match idx {
            ctl::FIR => Some(self.fir),
            ctl::FCCR => Some((self.fcsr.fcc() << 1) | self.fcsr.fcc0()),
            ctl::FEXR => Some((self.fcsr.flags() << 2) | (self.fcsr.cause() << 12)),
            ctl::FENR => {
                Some(self.fcsr.rm() | (self.fcsr.fs() << 2) | (self.fcsr.enables() << 7))
            }
            ctl::FCSR => Some(self.fcsr.0),
            _ => None,
        }
    }

    /// ctc1 write of a control register.
    pub fn write_ctl(&mut self, idx: usize, val: u32) -> Option<()> {
        match idx {
            ctl::FCCR => {
                self.fcsr.set_fcc0(val & 0x1);
                self.fcsr.set_fcc((val >> 1) & 0x7f);
                Some(())
            }
            ctl::FEXR => {
                self.fcsr.set_flags((val >> 2) & 0x1f);
                self.fcsr.set_cause((val >> 12) & 0x3f);
                Some(())
            }
            ctl::FENR => {
                self.fcsr.set_rm(val & 0x3);
                self.fcsr.set_enables((val >> 7) & 0x1f);
                Some(())
            }
            ctl::FCSR => {
                // The zero and impl fields read back as zero.
                self.fcsr = Fcsr(val & !0x007c_0000);
                Some(())
            }
            _ => None,
        }
    }
}

/// Exception raised when an FP operation may not complete.
pub const FP_ABORT: Exception = Exception::FpIeee754;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fcsr_field_round_trip() {
        let mut f = Fcsr(0);
        f.set_rm(rm::TOWARD_ZERO);
        f.set_flags(0x15);
        f.set_enables(0x0a);
        f.set_cause(0x3f);
        f.set_fcc0(1);
        f.set_fcc(0x55);
        assert_eq!(f.rm(), rm::TOWARD_ZERO);
        assert_eq!(f.flags(), 0x15);
        assert_eq!(f.enables(), 0x0a);
        assert_eq!(f.cause(), 0x3f);
        assert_eq!(f.fcc0(), 1);
        assert_eq!(f.fcc(), 0x55);
    }

    #[test]
    fn cleanup_clears_cause_only() {
        let mut fpu = Fpu::new();
        fpu.signal_exception(flag::INVALID);
        fpu.fcsr.set_flags(flag::INEXACT);
        assert!(fpu.cleanup_state());
        assert_eq!(fpu.fcsr.cause(), 0);
        assert_eq!(fpu.fcsr.flags(), flag::INEXACT);
    }

    #[test]
    fn allowed_exceptions_become_sticky() {
        let mut fpu = Fpu::new();
        fpu.signal_exception(flag::INEXACT);
        assert!(fpu.handle_exceptions(flag::INEXACT));
        assert_eq!(fpu.fcsr.flags(), flag::INEXACT);
    }

    #[test]
    fn disallowed_exception_aborts() {
        let mut fpu = Fpu::new();
        fpu.signal_exception(flag::INVALID);
        assert!(!fpu.handle_exceptions(flag::INEXACT));
    }

    #[test]
    fn enabled_trap_aborts() {
        let mut fpu = Fpu::new();
        fpu.fcsr.set_enables(flag::DIV0);
        fpu.signal_exception(flag::DIV0);
        assert!(!fpu.handle_exceptions(flag::DIV0));
    }

    #[test]
    fn double_alignment() {
        let fpu = Fpu::new();
        assert!(fpu.check_double_aligned(0));
        assert!(fpu.check_double_aligned(2));
        assert!(!fpu.check_double_aligned(1));
    }
}
