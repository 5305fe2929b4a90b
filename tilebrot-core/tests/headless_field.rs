use rand::rngs::StdRng;
use rand::SeedableRng;
use tilebrot_core::navigation::{centered_rect, zoom_in_bounds};
use tilebrot_core::{
    BorderKernel, Kernel, SimdKernel, StandardKernel, ZoomPointChooser, MAX_ITER,
};

fn compute<K: Kernel>(kernel: &mut K) -> Vec<u32> {
    kernel.compute(&mut |_| {});
    kernel.data().to_vec()
}

#[test]
fn headless_home_view_field() {
    let mut kernel = StandardKernel::new(100, 100);
    let data = compute(&mut kernel);

    assert_eq!(data.len(), 100 * 100);

    let interior = data.iter().filter(|&&v| v == MAX_ITER).count();
    let escaped = data.iter().filter(|&&v| v < MAX_ITER).count();

    assert!(escaped > 0, "should have some escaped points");
    assert!(interior > 0, "should have some interior points");
    assert_eq!(escaped + interior, 10_000);
}

#[test]
fn headless_field_is_deterministic() {
    let run1 = compute(&mut BorderKernel::new(80, 60));
    let run2 = compute(&mut BorderKernel::new(80, 60));
    assert_eq!(run1, run2, "two identical computes must produce identical fields");
}

#[test]
fn zoomed_region_agrees_across_cpu_engines() {
    let home = StandardKernel::new(64, 48);
    let (cre, cim, diam) = zoom_in_bounds(home.viewport(), 8, 18, 24, 30).unwrap();

    let mut standard = StandardKernel::new(64, 48);
    let mut simd = SimdKernel::new(64, 48);
    standard.update_bounds(cre, cim, diam);
    simd.update_bounds(cre, cim, diam);

    assert_eq!(compute(&mut standard), compute(&mut simd));
}

#[test]
fn auto_exploration_narrows_the_view() {
    let (w, h) = (64u32, 48u32);
    let chooser = ZoomPointChooser::new(w, h);
    let mut rng = StdRng::seed_from_u64(2024);
    let mut kernel = BorderKernel::new(w, h);

    let mut diameter = kernel.viewport().diameter();
    for _ in 0..4 {
        kernel.compute(&mut |_| {});
        assert!(kernel.is_fully_loaded());

        let point = chooser.find_interesting_point(kernel.data(), w / 4, h / 4, &mut rng);
        assert!(point.x < w && point.y < h);

        let (x1, y1, x2, y2) =
            centered_rect(point.x as i32, point.y as i32, (w / 4) as i32, (h / 4) as i32);
        let (cre, cim, diam) = zoom_in_bounds(kernel.viewport(), x1, y1, x2, y2).unwrap();
        assert!(diam < diameter, "each step must zoom in");

        kernel.update_bounds(cre, cim, diam);
        kernel.reset();
        diameter = diam;
    }
}
