//! Interrupt-masking critical sections.
//!
//! With the `bare_metal` feature the closure runs with interrupts disabled
//! and the previous interrupt state is restored afterwards. Without it (host
//! builds, tests) the closure simply runs.
//!
//! # Architecture Notes
//!
//! - x86_64: `cli`/`sti` through the `x86_64` crate
//! - AArch64: the DAIF I bit, set with `msr daifset, #2` and restored only if
//!   IRQs were enabled on entry

/// DAIF I bit (IRQ mask).
#[cfg(all(feature = "bare_metal", target_arch = "aarch64"))]
const DAIF_IRQ_BIT: u64 = 1 << 7;

/// Run `f` with interrupts disabled.
#[cfg(all(feature = "bare_metal", target_arch = "x86_64"))]
#[inline]
pub fn without_interrupts<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    x86_64::instructions::interrupts::without_interrupts(f)
}

/// Run `f` with IRQs masked through DAIF.
///
/// FIQs are left alone: the recorder only races with the scheduler tick.
#[cfg(all(feature = "bare_metal", target_arch = "aarch64"))]
#[inline]
pub fn without_interrupts<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    let irqs_enabled = {
        let daif: u64;
        unsafe {
            core::arch::asm!("mrs {}, daif", out(reg) daif, options(nomem, nostack));
        }
        (daif & DAIF_IRQ_BIT) == 0
    };
    if irqs_enabled {
        unsafe { core::arch::asm!("msr daifset, #2", options(nomem, nostack)) };
    }

    let result = f();

    if irqs_enabled {
        unsafe { core::arch::asm!("msr daifclr, #2", options(nomem, nostack)) };
    }
    result
}

/// Run `f` directly: there is no interrupt controller to mask.
#[cfg(not(all(
    feature = "bare_metal",
    any(target_arch = "x86_64", target_arch = "aarch64")
)))]
#[inline(always)]
pub fn without_interrupts<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_result_is_returned() {
        let mut calls = 0;
        let value = without_interrupts(|| {
            calls += 1;
            42
        });
        assert_eq!(value, 42);
        assert_eq!(calls, 1);
    }
}
