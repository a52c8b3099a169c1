use crate::constants::{FONT_ADDR, MAX_PROGRAM_SIZE, MEMORY_SIZE, PROGRAM_START, SPRITE_SHEET};
use crate::error::Chip8Error;

/// # Memory
/// 4096 bytes of flat, byte-addressable memory.
///
/// ```text
/// 0x000..0x050  sprite sheet for the hex digits 0..F
/// 0x050..0x200  reserved for the interpreter
/// 0x200..0x1000 program code and working data
/// ```
///
/// Every access is bounds-checked. Stores are additionally refused below
/// `PROGRAM_START` so a running program can never overwrite the font.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Memory {
    bytes: [u8; MEMORY_SIZE],
}

impl Memory {
    /// Zeroed memory with the sprite sheet installed.
    pub fn new() -> Self {
        let mut bytes = [0; MEMORY_SIZE];
        let font = FONT_ADDR as usize;
        bytes[font..font + SPRITE_SHEET.len()].copy_from_slice(&SPRITE_SHEET);
        Memory { bytes }
    }

    /// Copy a program into memory starting at `PROGRAM_START`.
    ///
    /// Nothing is written if the program doesn't fit.
    pub fn load(&mut self, program: &[u8]) -> Result<(), Chip8Error> {
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(Chip8Error::RomTooLarge {
                size: program.len(),
                max_size: MAX_PROGRAM_SIZE,
            });
        }
        let start = PROGRAM_START as usize;
        self.bytes[start..start + program.len()].copy_from_slice(program);
        Ok(())
    }

    pub fn read(&self, addr: u16) -> Result<u8, Chip8Error> {
        self.bytes
            .get(addr as usize)
            .copied()
            .ok_or(Chip8Error::MemoryOutOfBounds {
                address: addr as usize,
            })
    }

    pub fn write(&mut self, addr: u16, value: u8) -> Result<(), Chip8Error> {
        self.write_slice(addr, &[value])
    }

    /// `len` bytes starting at `addr`
    pub fn slice(&self, addr: u16, len: usize) -> Result<&[u8], Chip8Error> {
        let start = addr as usize;
        self.check_bounds(start, len)?;
        Ok(&self.bytes[start..start + len])
    }

    /// Store `data` starting at `addr`; either all of it is written or none of it.
    pub fn write_slice(&mut self, addr: u16, data: &[u8]) -> Result<(), Chip8Error> {
        let start = addr as usize;
        self.check_bounds(start, data.len())?;
        if !data.is_empty() && start < PROGRAM_START as usize {
            return Err(Chip8Error::ReservedWrite { address: start });
        }
        self.bytes[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }

    pub fn as_bytes(&self) -> &[u8; MEMORY_SIZE] {
        &self.bytes
    }

    fn check_bounds(&self, start: usize, len: usize) -> Result<(), Chip8Error> {
        if start + len > MEMORY_SIZE {
            // report the first address that doesn't exist
            let address = start.max(MEMORY_SIZE);
            return Err(Chip8Error::MemoryOutOfBounds { address });
        }
        Ok(())
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let used = self.bytes.iter().filter(|&&b| b != 0).count();
        f.debug_struct("Memory")
            .field("size", &MEMORY_SIZE)
            .field("non_zero_bytes", &used)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_zeroed_past_font() {
        let m = Memory::new();
        assert_eq!(m.bytes[SPRITE_SHEET.len()..], [0; MEMORY_SIZE - 80][..]);
    }

    #[test]
    fn test_font_installed() {
        let m = Memory::new();
        assert_eq!(m.slice(FONT_ADDR, 80).unwrap(), &SPRITE_SHEET[..]);
    }

    #[test]
    fn test_program_load_ok() {
        let mut m = Memory::new();
        m.load(&[0x00, 0xE0]).unwrap();
        assert_eq!(m.slice(0x200, 2).unwrap(), &[0x00, 0xE0]);
    }

    #[test]
    fn test_load_fills_memory_exactly() {
        let mut m = Memory::new();
        let program = vec![0xAB; MAX_PROGRAM_SIZE];
        m.load(&program).unwrap();
        assert_eq!(m.read(0xFFF).unwrap(), 0xAB);
    }

    #[test]
    fn test_oversized_load_leaves_memory_unchanged() {
        let mut m = Memory::new();
        let before = m;
        let program = vec![0xAB; MAX_PROGRAM_SIZE + 1];
        assert_eq!(
            m.load(&program),
            Err(Chip8Error::RomTooLarge {
                size: MAX_PROGRAM_SIZE + 1,
                max_size: MAX_PROGRAM_SIZE
            })
        );
        assert!(m == before);
    }

    #[test]
    fn test_read_out_of_bounds() {
        let m = Memory::new();
        assert_eq!(
            m.read(0x1000),
            Err(Chip8Error::MemoryOutOfBounds { address: 0x1000 })
        );
    }

    #[test]
    fn test_write_out_of_bounds_writes_nothing() {
        let mut m = Memory::new();
        assert!(m.write_slice(0xFFE, &[1, 2, 3]).is_err());
        assert_eq!(m.slice(0xFFE, 2).unwrap(), &[0, 0]);
    }

    #[test]
    fn test_reserved_region_is_write_protected() {
        let mut m = Memory::new();
        assert_eq!(
            m.write(0x000, 0xFF),
            Err(Chip8Error::ReservedWrite { address: 0x000 })
        );
        assert_eq!(
            m.write_slice(0x1FF, &[0xFF, 0xFF]),
            Err(Chip8Error::ReservedWrite { address: 0x1FF })
        );
        assert_eq!(m.read(0x000).unwrap(), 0xF0);
    }
}
