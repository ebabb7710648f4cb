//! Kernel selection for structural indexing.
//!
//! Each kernel answers one question: which bytes of a 64-byte window equal a
//! given character. The vectorized character classification follows
//! Langdale & Lemire, ["Parsing Gigabytes of JSON per
//! Second"](https://arxiv.org/abs/1902.08318) (2019).
//!
//! ## x86_64
//!
//! - **SSE2** (baseline): four 16-byte compares, universal availability
//! - **AVX2 + PCLMULQDQ**: two 32-byte compares and a carry-less multiply
//!   for the string-mask prefix XOR
//!
//! ## ARM
//!
//! - **NEON**: four 16-byte compares with movemask emulation, mandatory on
//!   all aarch64
//!
//! Other targets use the portable SWAR kernel. Detection runs once per
//! process and is cached; without the `std` feature each target uses its
//! baseline kernel.

#[cfg(target_arch = "x86_64")]
pub(crate) mod avx2;

#[cfg(target_arch = "aarch64")]
pub(crate) mod neon;

#[cfg(target_arch = "x86_64")]
pub(crate) mod sse2;

use super::scalar;

/// Which per-window kernel the index runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kernel {
    /// AVX2 compares plus CLMUL prefix XOR (x86_64, detected).
    Avx2,
    /// SSE2 compares (x86_64 baseline).
    Sse2,
    /// NEON compares (aarch64 baseline).
    Neon,
    /// Portable SWAR over u64 lanes.
    Swar,
}

/// Best kernel available on this machine.
#[cfg(all(target_arch = "x86_64", any(test, feature = "std")))]
pub fn detect() -> Kernel {
    use core::sync::atomic::{AtomicU8, Ordering};

    // 0 = unknown, 1 = AVX2, 2 = SSE2
    static LEVEL: AtomicU8 = AtomicU8::new(0);

    match LEVEL.load(Ordering::Relaxed) {
        1 => Kernel::Avx2,
        2 => Kernel::Sse2,
        _ => {
            let kernel = if is_x86_feature_detected!("avx2")
                && is_x86_feature_detected!("pclmulqdq")
            {
                Kernel::Avx2
            } else {
                Kernel::Sse2
            };
            let tag = if kernel == Kernel::Avx2 { 1 } else { 2 };
            LEVEL.store(tag, Ordering::Relaxed);
            kernel
        }
    }
}

// Without std, stay on the universal x86_64 baseline.
#[cfg(all(target_arch = "x86_64", not(any(test, feature = "std"))))]
pub fn detect() -> Kernel {
    Kernel::Sse2
}

#[cfg(target_arch = "aarch64")]
pub fn detect() -> Kernel {
    Kernel::Neon
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
pub fn detect() -> Kernel {
    Kernel::Swar
}

/// Bitmap of bytes in `block` equal to `byte`, bit `k` for byte `k`.
#[inline]
pub(crate) fn eq_mask(kernel: Kernel, block: &[u8; 64], byte: u8) -> u64 {
    match kernel {
        #[cfg(target_arch = "x86_64")]
        // SAFETY: Avx2 is only produced by detect() after feature checks
        Kernel::Avx2 => unsafe { avx2::eq_mask(block, byte) },
        #[cfg(target_arch = "x86_64")]
        // SAFETY: SSE2 is part of the x86_64 baseline
        Kernel::Sse2 => unsafe { sse2::eq_mask(block, byte) },
        #[cfg(target_arch = "aarch64")]
        // SAFETY: NEON is mandatory on aarch64
        Kernel::Neon => unsafe { neon::eq_mask(block, byte) },
        _ => scalar::eq_mask(block, byte),
    }
}

/// Inclusive prefix XOR of a quote bitmap.
#[inline]
pub(crate) fn prefix_xor(kernel: Kernel, x: u64) -> u64 {
    match kernel {
        #[cfg(target_arch = "x86_64")]
        // SAFETY: Avx2 implies PCLMULQDQ was detected
        Kernel::Avx2 => unsafe { avx2::prefix_xor(x) },
        _ => scalar::prefix_xor(x),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detected_kernel_matches_scalar() {
        let kernel = detect();
        let mut block = [b'f'; 64];
        for (i, b) in block.iter_mut().enumerate() {
            if i % 5 == 0 {
                *b = b'"';
            } else if i % 7 == 0 {
                *b = b'{';
            }
        }
        for &needle in b"\"{f," {
            assert_eq!(
                eq_mask(kernel, &block, needle),
                scalar::eq_mask(&block, needle),
                "kernel={:?} needle={}",
                kernel,
                needle as char
            );
        }
    }

    #[test]
    fn test_detected_prefix_xor_matches_scalar() {
        let kernel = detect();
        for &x in &[0u64, 1, 0x8000_0000_0000_0001, 0xDEAD_BEEF_CAFE_F00D] {
            assert_eq!(prefix_xor(kernel, x), scalar::prefix_xor(x), "x={:#x}", x);
        }
    }

    #[test]
    fn test_detect_is_stable() {
        assert_eq!(detect(), detect());
    }
}
