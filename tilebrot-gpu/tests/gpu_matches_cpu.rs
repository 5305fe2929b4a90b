//! Compares the shader kernel against the scalar CPU kernel.
//!
//! Every test skips itself when no adapter is available.

use std::sync::Arc;

use tilebrot_core::{Kernel, StandardKernel, MAX_ITER};
use tilebrot_gpu::{GpuAvailability, GpuContext, GpuKernel, Precision};

fn context() -> Option<Arc<GpuContext>> {
    match pollster::block_on(GpuContext::try_init()) {
        GpuAvailability::Available(ctx) => Some(Arc::new(ctx)),
        GpuAvailability::Unavailable(reason) => {
            println!("Skipping test: no GPU available ({reason})");
            None
        }
    }
}

/// Fraction of pixels within ±1 iteration of the CPU result.
fn agreement(gpu: &[u32], cpu: &[u32]) -> f64 {
    let close = gpu
        .iter()
        .zip(cpu)
        .filter(|&(&g, &c)| g.abs_diff(c) <= 1)
        .count();
    close as f64 / cpu.len() as f64
}

fn cpu_field(width: u32, height: u32) -> Vec<u32> {
    let mut kernel = StandardKernel::new(width, height);
    kernel.compute(&mut |_| {});
    kernel.data().to_vec()
}

#[test]
fn gpu_init_does_not_panic() {
    match pollster::block_on(GpuContext::try_init()) {
        GpuAvailability::Available(ctx) => println!("GPU available, f64: {}", ctx.supports_f64),
        GpuAvailability::Unavailable(reason) => println!("GPU unavailable: {reason}"),
    }
}

#[test]
fn float_kernel_matches_cpu_home_view() {
    let Some(ctx) = context() else { return };

    let mut kernel = GpuKernel::try_new(ctx, 64, 48, Precision::Float).unwrap();
    let mut calls = 0;
    kernel.compute(&mut |_| calls += 1);
    assert_eq!(calls, 1, "GPU kernels report progress once, on completion");

    let gpu = kernel.data().to_vec();
    let cpu = cpu_field(64, 48);
    assert!(gpu.iter().all(|&v| v <= MAX_ITER));
    let agree = agreement(&gpu, &cpu);
    assert!(agree > 0.95, "only {:.1}% of pixels within ±1", agree * 100.0);
}

#[test]
fn double_kernel_matches_cpu_home_view() {
    let Some(ctx) = context() else { return };
    if !ctx.supports_f64 {
        println!("Skipping test: adapter lacks SHADER_F64");
        return;
    }

    let mut kernel = GpuKernel::try_new(ctx, 64, 48, Precision::Double).unwrap();
    kernel.compute(&mut |_| {});

    let agree = agreement(kernel.data(), &cpu_field(64, 48));
    assert!(agree > 0.99, "only {:.1}% of pixels within ±1", agree * 100.0);
}

#[test]
fn rows_are_not_mirrored() {
    // An off-centre view is asymmetric about the real axis, so a flipped
    // readback would disagree with the CPU on most rows.
    let Some(ctx) = context() else { return };

    let mut kernel = GpuKernel::try_new(ctx, 40, 30, Precision::Float).unwrap();
    kernel.update_bounds(-0.5, 0.6, 1.2);
    kernel.compute(&mut |_| {});

    let mut cpu = StandardKernel::new(40, 30);
    cpu.update_bounds(-0.5, 0.6, 1.2);
    cpu.compute(&mut |_| {});

    let agree = agreement(kernel.data(), cpu.data());
    assert!(agree > 0.9, "only {:.1}% of pixels within ±1", agree * 100.0);
}

#[test]
fn double_without_support_degrades() {
    let Some(ctx) = context() else { return };
    if ctx.supports_f64 {
        return;
    }
    let kernel = GpuKernel::new(Some(ctx), 16, 16, Precision::Double);
    assert!(!kernel.is_ready());
}

#[test]
fn zero_size_target_degrades() {
    let Some(ctx) = context() else { return };
    let kernel = GpuKernel::new(Some(ctx), 0, 16, Precision::Float);
    assert!(!kernel.is_ready());
}
