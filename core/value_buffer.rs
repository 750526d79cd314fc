use std::collections::TryReserveError;
use std::fmt;
use std::mem;

use crate::{Value, LINE_SIZE};

/// Per-key buffer of values, grown in whole `LINE_SIZE` increments (spec §4.5).
///
/// The buffer's allocated length is always exactly its capacity in `Value`s —
/// growth recomputes the target capacity from `len` rather than trusting
/// whatever the allocator handed back, so the byte-length invariant (every
/// non-empty buffer's length is a multiple of `LINE_SIZE` strictly greater
/// than `len * size_of::<Value>()`) holds unconditionally.
#[derive(Debug, Default)]
pub(crate) struct ValueBuffer {
    storage: Option<Box<[Value]>>,
    len: usize,
}

/// The value buffer could not grow because the allocator is exhausted.
#[derive(Debug)]
pub struct AllocError(TryReserveError);

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to grow value buffer: {}", self.0)
    }
}
impl std::error::Error for AllocError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl ValueBuffer {
    pub(crate) const fn empty() -> Self {
        ValueBuffer {
            storage: None,
            len: 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Allocated length in bytes, for invariant checks. Zero when empty.
    #[cfg(test)]
    pub(crate) fn alloc_bytes(&self) -> usize {
        self.storage
            .as_ref()
            .map_or(0, |s| s.len() * mem::size_of::<Value>())
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = Value> + '_ {
        self.storage.as_deref().unwrap_or(&[])[..self.len]
            .iter()
            .copied()
    }

    pub(crate) fn contains(&self, value: Value) -> bool {
        self.iter().any(|v| v == value)
    }

    /// Appends `value`, growing the backing allocation by one `LINE_SIZE`
    /// chunk first if there isn't room for it (spec §4.5 steps 1-4).
    pub(crate) fn push(&mut self, value: Value) -> Result<(), AllocError> {
        let value_size = mem::size_of::<Value>();
        let taken = self.len * value_size;
        let alloced = Self::rounded_up_to_line(taken);
        if alloced - taken < value_size {
            self.grow_to(alloced + LINE_SIZE)?;
        }
        let storage = self
            .storage
            .as_mut()
            .expect("buffer must be allocated by this point");
        storage[self.len] = value;
        self.len += 1;
        Ok(())
    }

    fn rounded_up_to_line(bytes: usize) -> usize {
        if bytes == 0 {
            0
        } else {
            (bytes + LINE_SIZE - 1) / LINE_SIZE * LINE_SIZE
        }
    }

    fn grow_to(&mut self, new_byte_len: usize) -> Result<(), AllocError> {
        assert_eq!(
            new_byte_len % mem::size_of::<Value>(),
            0,
            "LINE_SIZE must be a whole multiple of size_of::<Value>()"
        );
        let new_cap = new_byte_len / mem::size_of::<Value>();

        let mut new_storage: Vec<Value> = Vec::new();
        new_storage.try_reserve_exact(new_cap).map_err(AllocError)?;
        new_storage.resize(new_cap, 0);
        if let Some(old) = &self.storage {
            new_storage[..self.len].copy_from_slice(&old[..self.len]);
        }
        self.storage = Some(new_storage.into_boxed_slice());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_push_allocates_one_line() {
        let mut buf = ValueBuffer::empty();
        buf.push(7).unwrap();
        assert_eq!(buf.alloc_bytes(), LINE_SIZE);
        assert_eq!(buf.len(), 1);
        assert!(buf.contains(7));
    }

    #[test]
    fn growth_progresses_in_whole_lines() {
        // sizeof(Value) == 4, LINE_SIZE == 64 => 16 values per line.
        let mut buf = ValueBuffer::empty();
        for v in 0..17 {
            buf.push(v).unwrap();
        }
        assert_eq!(buf.len(), 17);
        assert_eq!(buf.alloc_bytes(), 128);
        for v in 0..17 {
            assert!(buf.contains(v));
        }
    }

    #[test]
    fn insertion_order_preserved() {
        let mut buf = ValueBuffer::empty();
        for v in [5, 3, 5, 9, 1] {
            buf.push(v).unwrap();
        }
        assert_eq!(buf.iter().collect::<Vec<_>>(), vec![5, 3, 5, 9, 1]);
    }
}
