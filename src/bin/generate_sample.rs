use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use hytraj::TrajGroup;

const HOURS: usize = 48;

/// One hourly backward run released at `(lat, lon)` on 2019-`month`-15 12:00.
fn generate_trajectory(rng: &mut ChaCha8Rng, lat: f64, lon: f64, month: u32) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "     1     1");
    let _ = writeln!(out, "    GDAS1    19 {month:5}    15     0     0");
    let _ = writeln!(out, "     1 BACKWARD    OMEGA");
    let _ = writeln!(out, "    19 {month:5}    15    12 {lat:9.3} {lon:9.3}    500.0");
    let _ = writeln!(out, "     2 PRESSURE RAINFALL");

    let (mut lat, mut lon, mut height) = (lat, lon, 500.0_f64);
    for step in 0..HOURS {
        let hours_back = step as i64;
        let day = 15 - (hours_back + 11).div_euclid(24);
        let hour = (12 - hours_back).rem_euclid(24);
        let pressure = 1013.25 * (-height / 8400.0).exp();
        let rain = if rng.gen_bool(0.2) {
            rng.gen_range(0.1..3.0)
        } else {
            0.0
        };
        let _ = writeln!(
            out,
            "     1     1    19 {month:5} {day:5} {hour:5}     0     0 {age:7.1} {lat:8.3} {lon:8.3} {height:8.1} {pressure:8.1} {rain:8.1}",
            age = -(step as f64),
        );

        lat += rng.gen_range(-0.25..0.35);
        lon += rng.gen_range(-0.6..0.1);
        height = (height + rng.gen_range(-60.0..90.0)).max(0.0);
    }
    out
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let output_dir = PathBuf::from(args.next().unwrap_or_else(|| "sample_trajs".to_string()));
    let count: usize = match args.next() {
        Some(n) => n.parse().with_context(|| format!("'{n}' is not a count"))?,
        None => 6,
    };

    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("creating {}", output_dir.display()))?;

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    for i in 0..count {
        let month = (i % 12) as u32 + 1;
        let lat = rng.gen_range(30.0..45.0);
        let lon = rng.gen_range(-100.0..-75.0);
        let path = output_dir.join(format!("traj_{i:03}_m{month:02}.txt"));
        std::fs::write(&path, generate_trajectory(&mut rng, lat, lon, month))
            .with_context(|| format!("writing {}", path.display()))?;
    }

    // Something the loader must skip.
    let notes = output_dir.join("README.txt");
    std::fs::write(&notes, "Synthetic HYSPLIT trajectories written by generate_sample.\n")
        .with_context(|| format!("writing {}", notes.display()))?;

    let group = TrajGroup::new("sample", [output_dir.as_path()]).context("reading samples back")?;
    info!(
        "{group}: total RAINFALL {:.1}, {} skipped",
        group.total("RAINFALL").unwrap_or(0.0),
        group.skipped().len()
    );
    println!(
        "Wrote {} trajectories ({HOURS} points each) to {}",
        group.len(),
        output_dir.display()
    );
    Ok(())
}
