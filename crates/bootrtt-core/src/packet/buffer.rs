/// A datagram buffer over a borrowed mutable or immutable byte slice.
#[derive(Debug)]
pub enum Buffer<'a> {
    Immutable(&'a [u8]),
    Mutable(&'a mut [u8]),
}

impl Buffer<'_> {
    /// The buffer as an immutable slice of bytes.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Immutable(datagram) => datagram,
            Buffer::Mutable(datagram) => datagram,
        }
    }

    /// Get N bytes starting at `offset`.
    #[must_use]
    pub fn get_bytes<const N: usize>(&self, offset: usize) -> [u8; N] {
        core::array::from_fn(|i| self.read(offset + i))
    }

    /// Set N bytes starting at `offset`.
    pub fn set_bytes<const N: usize>(&mut self, offset: usize, bytes: [u8; N]) {
        for (i, b) in bytes.into_iter().enumerate() {
            *self.write(offset + i) = b;
        }
    }

    /// Get the byte at `offset`.
    #[must_use]
    pub fn read(&self, offset: usize) -> u8 {
        self.as_slice()[offset]
    }

    /// Get a mutable reference to the byte at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if called on an `Immutable` buffer.
    pub fn write(&mut self, offset: usize) -> &mut u8 {
        match self {
            Buffer::Immutable(_) => panic!("write operation called on readonly buffer"),
            Buffer::Mutable(datagram) => &mut datagram[offset],
        }
    }
}
