use crate::error::OutOfBounds;

/// Default number of addressable cells per bank.
pub const DEFAULT_BANK_SIZE: usize = 0x100;

/// Upper-bound rule for addresses.
///
/// `Inclusive` accepts `address <= size`, so each bank holds `size + 1`
/// cells and address `size` is a real cell. `Strict` accepts `address < size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundsPolicy {
    #[default]
    Inclusive,
    Strict,
}

impl BoundsPolicy {
    fn cells(self, size: usize) -> usize {
        match self {
            BoundsPolicy::Inclusive => size.saturating_add(1),
            BoundsPolicy::Strict => size,
        }
    }
}

/// Double-buffered boolean memory.
///
/// `mode == false`: reads come from bank A, writes go to bank B.
/// `mode == true`: reads come from bank B, writes go to bank A.
#[derive(Debug, Clone)]
pub struct MemoryBanks {
    a: Vec<bool>,
    b: Vec<bool>,
    size: usize,
    bounds: BoundsPolicy,
    mode: bool,
}

impl MemoryBanks {
    /// Create a zeroed bank pair with bank A as the read bank.
    pub fn new(size: usize, bounds: BoundsPolicy) -> Self {
        let cells = bounds.cells(size);
        Self {
            a: vec![false; cells],
            b: vec![false; cells],
            size,
            bounds,
            mode: false,
        }
    }

    /// Declared bank size (not counting the extra cell under `Inclusive`).
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn bounds(&self) -> BoundsPolicy {
        self.bounds
    }

    /// Number of addressable cells, `0..cells()`.
    pub fn cells(&self) -> usize {
        self.a.len()
    }

    pub fn mode(&self) -> bool {
        self.mode
    }

    /// Return to the initial role assignment, bank A as the read bank.
    pub fn reset_mode(&mut self) {
        self.mode = false;
    }

    /// Swap the read and write roles.
    pub fn toggle(&mut self) {
        self.mode = !self.mode;
    }

    /// Swap roles, then refresh the new write bank from the new read bank so
    /// that cells nobody writes next scan keep their value.
    pub fn commit(&mut self) {
        self.toggle();
        if self.mode {
            self.a.copy_from_slice(&self.b);
        } else {
            self.b.copy_from_slice(&self.a);
        }
    }

    pub fn check(&self, address: usize) -> Result<usize, OutOfBounds> {
        if address < self.cells() {
            Ok(address)
        } else {
            Err(OutOfBounds {
                address,
                size: self.size,
                bounds: self.bounds,
            })
        }
    }

    /// Read `address` from the current read bank.
    pub fn read(&self, address: usize) -> Result<bool, OutOfBounds> {
        let address = self.check(address)?;
        Ok(if self.mode {
            self.b[address]
        } else {
            self.a[address]
        })
    }

    /// Write `value` into the current write bank.
    pub fn write(&mut self, address: usize, value: bool) -> Result<(), OutOfBounds> {
        let address = self.check(address)?;
        if self.mode {
            self.a[address] = value;
        } else {
            self.b[address] = value;
        }
        Ok(())
    }

    /// Force a cell in both banks, independent of the mode.
    pub fn set_input(&mut self, address: usize, value: bool) -> Result<(), OutOfBounds> {
        let address = self.check(address)?;
        self.a[address] = value;
        self.b[address] = value;
        Ok(())
    }

    /// Read-bank contents, for rendering.
    pub fn snapshot(&self) -> Vec<bool> {
        if self.mode {
            self.b.clone()
        } else {
            self.a.clone()
        }
    }

    pub fn clear(&mut self) {
        self.a.fill(false);
        self.b.fill(false);
    }
}

impl Default for MemoryBanks {
    fn default() -> Self {
        Self::new(DEFAULT_BANK_SIZE, BoundsPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_initialized() {
        let banks = MemoryBanks::default();
        assert!(!banks.mode());
        for addr in 0..banks.cells() {
            assert_eq!(banks.read(addr), Ok(false));
        }
    }

    #[test]
    fn test_write_goes_to_other_bank() {
        let mut banks = MemoryBanks::default();
        banks.write(5, true).unwrap();
        // Mode false reads A, the write landed in B.
        assert_eq!(banks.read(5), Ok(false));
        banks.toggle();
        assert_eq!(banks.read(5), Ok(true));
    }

    #[test]
    fn test_write_after_toggle_lands_in_a() {
        let mut banks = MemoryBanks::default();
        banks.toggle();
        banks.write(7, true).unwrap();
        assert_eq!(banks.read(7), Ok(false));
        banks.toggle();
        assert_eq!(banks.read(7), Ok(true));
    }

    #[test]
    fn test_inclusive_bounds_allow_size() {
        let mut banks = MemoryBanks::new(0x100, BoundsPolicy::Inclusive);
        assert_eq!(banks.cells(), 0x101);
        assert!(banks.write(0x100, true).is_ok());
        assert!(banks.read(0x100).is_ok());
        let err = banks.read(0x101).unwrap_err();
        assert_eq!(err.address, 0x101);
        assert_eq!(err.bounds, BoundsPolicy::Inclusive);
    }

    #[test]
    fn test_strict_bounds_reject_size() {
        let mut banks = MemoryBanks::new(0x100, BoundsPolicy::Strict);
        assert_eq!(banks.cells(), 0x100);
        assert!(banks.read(0xFF).is_ok());
        assert!(banks.read(0x100).is_err());
        assert!(banks.write(0x100, true).is_err());
        assert!(banks.set_input(0x100, true).is_err());
    }

    #[test]
    fn test_out_of_bounds_does_not_wrap() {
        let mut banks = MemoryBanks::new(16, BoundsPolicy::Strict);
        assert!(banks.write(16, true).is_err());
        // Nothing wrapped around to address 0.
        banks.toggle();
        assert_eq!(banks.read(0), Ok(false));
    }

    #[test]
    fn test_set_input_visible_in_both_modes() {
        let mut banks = MemoryBanks::default();
        banks.set_input(3, true).unwrap();
        assert_eq!(banks.read(3), Ok(true));
        banks.toggle();
        assert_eq!(banks.read(3), Ok(true));
    }

    #[test]
    fn test_commit_carries_values_forward() {
        let mut banks = MemoryBanks::default();
        banks.set_input(1, true).unwrap();
        banks.write(2, true).unwrap();
        banks.commit();
        assert!(banks.mode());
        assert_eq!(banks.read(1), Ok(true));
        assert_eq!(banks.read(2), Ok(true));
        // The new write bank starts as a copy, so an unwritten cell survives
        // the next commit too.
        banks.commit();
        assert_eq!(banks.read(2), Ok(true));
    }

    #[test]
    fn test_inclusive_cell_count_saturates() {
        assert_eq!(BoundsPolicy::Inclusive.cells(usize::MAX), usize::MAX);
        assert_eq!(BoundsPolicy::Inclusive.cells(0), 1);
        assert_eq!(BoundsPolicy::Strict.cells(usize::MAX), usize::MAX);
    }

    #[test]
    fn test_clear() {
        let mut banks = MemoryBanks::default();
        banks.set_input(9, true).unwrap();
        banks.clear();
        assert_eq!(banks.read(9), Ok(false));
    }
}
