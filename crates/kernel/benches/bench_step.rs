use std::hint::black_box;
use std::time::Instant;

use glam::Vec2;
use rooftop_city::{City, CityConfig};
use rooftop_common::Ray;
use rooftop_input::InputFrame;
use rooftop_kernel::{GameConfig, GameWorld};

fn city_config(blocks: u32) -> CityConfig {
    CityConfig {
        blocks_x: blocks,
        blocks_z: blocks,
        ..CityConfig::default()
    }
}

fn bench_generate(blocks: u32, iterations: usize) {
    let config = city_config(blocks);
    let start = Instant::now();
    for seed in 0..iterations {
        let _ = black_box(City::generate(black_box(&config), seed as u64));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  generate ({blocks}x{blocks} blocks, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn bench_step(blocks: u32, ticks: usize) {
    let config = GameConfig {
        city: city_config(blocks),
        ..GameConfig::default()
    };
    let Ok(mut world) = GameWorld::new(config) else {
        println!("  step ({blocks}x{blocks} blocks): config rejected");
        return;
    };

    // Walk in a slow circle while holding the trigger.
    let start = Instant::now();
    for i in 0..ticks {
        let frame = InputFrame {
            move_axis: Vec2::new(0.0, 1.0),
            fire: true,
            look_delta: Vec2::new(3.0, if i % 120 < 60 { 0.5 } else { -0.5 }),
            ..InputFrame::default()
        };
        world.step(black_box(&frame));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / ticks as u32;
    println!(
        "  step ({blocks}x{blocks} blocks, {ticks} ticks): {per_iter:?}/tick, total {elapsed:?}, {} splats",
        world.splats().len()
    );
}

fn bench_raycast(blocks: u32, iterations: usize) {
    let Ok(city) = City::generate(&city_config(blocks), 1) else {
        return;
    };
    let center = city.bounds.center();
    let start = Instant::now();
    for i in 0..iterations {
        let angle = i as f32 * 0.01;
        let dir = glam::Vec3::new(angle.cos(), -0.2, angle.sin());
        if let Some(ray) = Ray::new(center + glam::Vec3::Y * 20.0, dir) {
            let _ = black_box(city.raycast(black_box(&ray), 500.0));
        }
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  raycast ({blocks}x{blocks} blocks, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn main() {
    println!("=== Game Kernel Benchmarks ===\n");

    println!("City generation:");
    bench_generate(4, 200);
    bench_generate(8, 50);
    bench_generate(16, 10);

    println!("\nRaycast:");
    bench_raycast(4, 10000);
    bench_raycast(16, 10000);

    println!("\nSimulation step:");
    bench_step(4, 3600);
    bench_step(8, 3600);

    println!("\n=== Done ===");
}
