//! Register bus abstractions
//!
//! The bridge never reports bus-level failures: a load always returns a
//! word and a store always lands. Device faults surface only through status
//! bits, so these methods are infallible.

/// 32-bit register transport
///
/// Addresses are absolute (instance base address plus register offset).
pub trait RegisterBus {
    /// Read a 32-bit register
    fn read32(&mut self, address: u32) -> u32;

    /// Write a 32-bit register
    fn write32(&mut self, address: u32, value: u32);
}

impl<T: RegisterBus + ?Sized> RegisterBus for &mut T {
    fn read32(&mut self, address: u32) -> u32 {
        (**self).read32(address)
    }

    fn write32(&mut self, address: u32, value: u32) {
        (**self).write32(address, value)
    }
}

/// A register bus bound to one instance's base address
///
/// All accesses take an offset from the base, so callers never compute
/// absolute addresses themselves.
#[derive(Debug)]
pub struct RegisterBlock<B> {
    bus: B,
    base: u32,
}

impl<B: RegisterBus> RegisterBlock<B> {
    /// Bind a bus to a base address
    pub fn new(bus: B, base: u32) -> Self {
        Self { bus, base }
    }

    /// Base address of this block
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Read the register at `offset`
    pub fn read(&mut self, offset: u32) -> u32 {
        self.bus.read32(self.base.wrapping_add(offset))
    }

    /// Write the register at `offset`
    pub fn write(&mut self, offset: u32, value: u32) {
        self.bus.write32(self.base.wrapping_add(offset), value)
    }

    /// Read-modify-write the register at `offset`
    ///
    /// Returns the value written.
    pub fn modify<F>(&mut self, offset: u32, f: F) -> u32
    where
        F: FnOnce(u32) -> u32,
    {
        let value = f(self.read(offset));
        self.write(offset, value);
        value
    }

    /// Borrow the underlying bus
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Mutably borrow the underlying bus
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Release the underlying bus
    pub fn release(self) -> B {
        self.bus
    }
}
