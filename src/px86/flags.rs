use bitflags::bitflags;

bitflags! {
    /// The modelled subset of EFLAGS, at their architectural bit positions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Flags: u32 {
        const CARRY = 1 << 0;
        const ZERO = 1 << 6;
        const SIGN = 1 << 7;
        const OVERFLOW = 1 << 11;
    }
}

impl Flags {
    #[inline] pub fn carry(self) -> bool { self.contains(Flags::CARRY) }
    #[inline] pub fn zero(self) -> bool { self.contains(Flags::ZERO) }
    #[inline] pub fn sign(self) -> bool { self.contains(Flags::SIGN) }
    #[inline] pub fn overflow(self) -> bool { self.contains(Flags::OVERFLOW) }

    #[inline] pub fn set_carry(&mut self, v: bool) { self.set(Flags::CARRY, v) }
    #[inline] pub fn set_zero(&mut self, v: bool) { self.set(Flags::ZERO, v) }
    #[inline] pub fn set_sign(&mut self, v: bool) { self.set(Flags::SIGN, v) }
    #[inline] pub fn set_overflow(&mut self, v: bool) { self.set(Flags::OVERFLOW, v) }

    /// Recomputes all four flags for `a - b`, the way `sub` and `cmp` do.
    ///
    /// The subtraction is done in 64 bits so a borrow shows up as a negative
    /// difference instead of being lost to wrap-around.
    pub fn update_sub(&mut self, a: u32, b: u32) {
        let wide = a as i64 - b as i64;
        let res = wide as u32;
        let sign_a = a >> 31;
        let sign_b = b >> 31;
        let sign_r = res >> 31;

        self.set_carry(wide < 0);
        self.set_zero(res == 0);
        self.set_sign(sign_r == 1);
        self.set_overflow(sign_a != sign_b && sign_a != sign_r);
    }
}
