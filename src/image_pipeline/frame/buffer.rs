//! Reference-counted pixel buffer delivered by the capture subsystem.
//!
//! A `PixelBuffer` is a cheap handle: cloning it retains the same backing
//! memory. Reading the memory requires a base-address lock. Writing it (the
//! producer reusing the buffer for the next frame) is refused while any
//! reader, including an image built on top of the buffer, still holds a lock.

use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, TryLockError};

use tracing::trace;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::frame::types::PixelFormat;

type ReleaseCallback = Box<dyn FnOnce() + Send>;

struct BufferInner {
    pixel_format: PixelFormat,
    width: usize,
    height: usize,
    bytes_per_row: usize,
    memory: RwLock<Vec<u8>>,
    read_locks: Arc<AtomicUsize>,
    on_release: Mutex<Option<ReleaseCallback>>,
}

impl Drop for BufferInner {
    fn drop(&mut self) {
        let callback = self
            .on_release
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(callback) = callback {
            trace!(width = self.width, height = self.height, "Pixel buffer released");
            callback();
        }
    }
}

/// Captured frame: pixel layout, geometry, and lockable backing memory.
#[derive(Clone)]
pub struct PixelBuffer {
    inner: Arc<BufferInner>,
}

impl PixelBuffer {
    /// Allocates a zeroed, tightly packed buffer (`bytes_per_row = width * 4`).
    pub fn new(pixel_format: PixelFormat, width: usize, height: usize) -> Result<Self> {
        let bytes_per_row = width
            .checked_mul(4)
            .ok_or(ConversionError::InvalidDimensions(width, height))?;
        Self::with_stride(pixel_format, width, height, bytes_per_row)
    }

    /// Allocates a zeroed buffer with explicit row padding.
    pub fn with_stride(
        pixel_format: PixelFormat,
        width: usize,
        height: usize,
        bytes_per_row: usize,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ConversionError::InvalidDimensions(width, height));
        }
        let len = bytes_per_row
            .checked_mul(height)
            .ok_or(ConversionError::InvalidDimensions(width, height))?;
        Ok(Self::from_bytes(pixel_format, width, height, bytes_per_row, vec![0u8; len]))
    }

    /// Wraps memory handed over by a producer as-is.
    ///
    /// No geometry checks happen here; the converter validates the descriptor
    /// before touching the memory.
    pub fn from_bytes(
        pixel_format: PixelFormat,
        width: usize,
        height: usize,
        bytes_per_row: usize,
        data: Vec<u8>,
    ) -> Self {
        Self {
            inner: Arc::new(BufferInner {
                pixel_format,
                width,
                height,
                bytes_per_row,
                memory: RwLock::new(data),
                read_locks: Arc::new(AtomicUsize::new(0)),
                on_release: Mutex::new(None),
            }),
        }
    }

    /// Registers a callback run exactly once, when the last handle to this
    /// buffer (including handles held by images) is dropped. Replaces any
    /// previously registered callback.
    pub fn set_release_callback<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut slot = self
            .inner
            .on_release
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Box::new(callback));
    }

    pub fn pixel_format(&self) -> PixelFormat {
        self.inner.pixel_format
    }

    pub fn width(&self) -> usize {
        self.inner.width
    }

    pub fn height(&self) -> usize {
        self.inner.height
    }

    pub fn bytes_per_row(&self) -> usize {
        self.inner.bytes_per_row
    }

    /// Length of the backing memory in bytes.
    pub fn data_len(&self) -> usize {
        self.inner
            .memory
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Number of live handles sharing this buffer.
    pub fn retain_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Number of outstanding read locks (scoped and retained).
    pub fn lock_count(&self) -> usize {
        self.inner.read_locks.load(Ordering::Acquire)
    }

    /// Locks the base address for reading. The lock is released when the
    /// returned guard is dropped.
    pub fn lock_base_address(&self) -> BaseAddressLock<'_> {
        let memory = self
            .inner
            .memory
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        self.inner.read_locks.fetch_add(1, Ordering::AcqRel);
        trace!(locks = self.lock_count(), "Base address locked");
        BaseAddressLock { buffer: self, memory }
    }

    /// Gives the producer mutable access to the backing memory, e.g. to fill
    /// the next frame into a pooled buffer.
    ///
    /// Never waits on readers: fails with [`ConversionError::BufferLocked`]
    /// while any reader holds a lock, so images retaining this buffer are
    /// never overwritten.
    pub fn write_base_address<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut [u8]) -> R,
    {
        self.ensure_unlocked()?;
        let mut memory = match self.inner.memory.try_write() {
            Ok(memory) => memory,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                return Err(ConversionError::BufferLocked(self.lock_count().max(1)));
            }
        };
        // Retained locks outlive their read guard.
        self.ensure_unlocked()?;
        Ok(f(&mut memory))
    }

    fn ensure_unlocked(&self) -> Result<()> {
        match self.lock_count() {
            0 => Ok(()),
            locks => Err(ConversionError::BufferLocked(locks)),
        }
    }

    #[cfg(test)]
    pub(crate) fn lock_counter(&self) -> Arc<AtomicUsize> {
        self.inner.read_locks.clone()
    }

    pub(crate) fn read_memory(&self) -> RwLockReadGuard<'_, Vec<u8>> {
        self.inner
            .memory
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("pixel_format", &self.inner.pixel_format)
            .field("width", &self.inner.width)
            .field("height", &self.inner.height)
            .field("bytes_per_row", &self.inner.bytes_per_row)
            .field("retain_count", &self.retain_count())
            .field("lock_count", &self.lock_count())
            .finish()
    }
}

/// Scoped read lock on a buffer's base address.
pub struct BaseAddressLock<'a> {
    buffer: &'a PixelBuffer,
    memory: RwLockReadGuard<'a, Vec<u8>>,
}

impl BaseAddressLock<'_> {
    /// Retains the buffer and takes a second read lock that lives as long as
    /// the returned handle, independent of this scoped guard.
    pub fn retain(&self) -> RetainedLock {
        RetainedLock::new(self.buffer)
    }
}

impl Deref for BaseAddressLock<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.memory
    }
}

impl Drop for BaseAddressLock<'_> {
    fn drop(&mut self) {
        self.buffer.inner.read_locks.fetch_sub(1, Ordering::AcqRel);
        trace!(locks = self.buffer.lock_count(), "Base address unlocked");
    }
}

/// Owned retain + read lock pair. Dropping it unlocks, then releases.
pub struct RetainedLock {
    buffer: PixelBuffer,
}

impl RetainedLock {
    fn new(buffer: &PixelBuffer) -> Self {
        buffer.inner.read_locks.fetch_add(1, Ordering::AcqRel);
        Self {
            buffer: buffer.clone(),
        }
    }

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }
}

impl fmt::Debug for RetainedLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RetainedLock").field(&self.buffer).finish()
    }
}

impl Drop for RetainedLock {
    fn drop(&mut self) {
        self.buffer.inner.read_locks.fetch_sub(1, Ordering::AcqRel);
        trace!(locks = self.buffer.lock_count(), "Retained lock dropped");
    }
}
