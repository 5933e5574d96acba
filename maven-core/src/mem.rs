//! Flat byte-addressable memory image.
//!
//! A single image is shared by the control processor and every vector
//! lane. The execution model is strictly sequential, so the lock is
//! never contended; it exists so the image can be handed out as a
//! cloneable handle.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::MemError;
use crate::types::Addr;

/// Cloneable handle to a shared memory image.
pub type SharedMem = Arc<RwLock<MemoryImage>>;

/// Little-endian flat memory with no protection.
pub struct MemoryImage {
    bytes: Vec<u8>,
}

impl MemoryImage {
    pub fn new(size: usize) -> Self {
        Self {
            bytes: vec![0; size],
        }
    }

    pub fn shared(size: usize) -> SharedMem {
        Arc::new(RwLock::new(Self::new(size)))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    fn check(&self, addr: Addr, len: usize) -> Result<usize, MemError> {
        let addr = addr as usize;
        if addr.checked_add(len).map_or(true, |end| end > self.bytes.len()) {
            return Err(MemError::Invalid);
        }
        Ok(addr)
    }

    pub fn read_u8(&self, addr: Addr) -> Result<u8, MemError> {
        let a = self.check(addr, 1)?;
        Ok(self.bytes[a])
    }

    pub fn read_u16(&self, addr: Addr) -> Result<u16, MemError> {
        let a = self.check(addr, 2)?;
        Ok(u16::from_le_bytes([self.bytes[a], self.bytes[a + 1]]))
    }

    pub fn read_u32(&self, addr: Addr) -> Result<u32, MemError> {
        let a = self.check(addr, 4)?;
        let mut b = [0u8; 4];
        b.copy_from_slice(&self.bytes[a..a + 4]);
        Ok(u32::from_le_bytes(b))
    }

    pub fn read_u64(&self, addr: Addr) -> Result<u64, MemError> {
        let a = self.check(addr, 8)?;
        let mut b = [0u8; 8];
        b.copy_from_slice(&self.bytes[a..a + 8]);
        Ok(u64::from_le_bytes(b))
    }

    pub fn write_u8(&mut self, addr: Addr, val: u8) -> Result<(), MemError> {
        let a = self.check(addr, 1)?;
        self.bytes[a] = val;
        Ok(())
    }

    pub fn write_u16(&mut self, addr: Addr, val: u16) -> Result<(), MemError> {
        let a = self.check(addr, 2)?;
        self.bytes[a..a + 2].copy_from_slice(&val.to_le_bytes());
        Ok(())
    }

    pub fn write_u32(&mut self, addr: Addr, val: u32) -> Result<(), MemError> {
        let a = self.check(addr, 4)?;
        self.bytes[a..a + 4].copy_from_slice(&val.to_le_bytes());
        Ok(())
    }

    pub fn write_u64(&mut self, addr: Addr, val: u64) -> Result<(), MemError> {
        let a = self.check(addr, 8)?;
        self.bytes[a..a + 8].copy_from_slice(&val.to_le_bytes());
        Ok(())
    }

    /// Copies a raw image into memory at the given address.
    pub fn load(&mut self, addr: Addr, data: &[u8]) -> Result<(), MemError> {
        let a = self.check(addr, data.len())?;
        self.bytes[a..a + data.len()].copy_from_slice(data);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.bytes.fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn little_endian_round_trip() {
        let mut mem = MemoryImage::new(64);
        mem.write_u32(0, 0x1234_5678).unwrap();
        assert_eq!(mem.read_u8(0).unwrap(), 0x78);
        assert_eq!(mem.read_u8(3).unwrap(), 0x12);
        assert_eq!(mem.read_u16(0).unwrap(), 0x5678);
        assert_eq!(mem.read_u32(0).unwrap(), 0x1234_5678);
    }

    #[test]
    fn out_of_range_is_invalid() {
        let mut mem = MemoryImage::new(16);
        assert_eq!(mem.read_u32(14), Err(MemError::Invalid));
        assert_eq!(mem.write_u8(16, 0), Err(MemError::Invalid));
        assert_eq!(mem.read_u32(u32::MAX), Err(MemError::Invalid));
    }

    #[test]
    fn load_places_bytes() {
        let mut mem = MemoryImage::new(32);
        mem.load(4, &[1, 2, 3, 4]).unwrap();
        assert_eq!(mem.read_u32(4).unwrap(), 0x0403_0201);
    }
}
