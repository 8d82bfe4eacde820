//! Write a deterministic synthetic scan file for manual testing.
//!
//! The output follows the instrument text format: plain `key: value`
//! metadata lines, one `Active:` scan-info line per revolver slot, the
//! `UNIXTime` column-header line, then comma-separated data rows.

use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{Context, Result};
use log::info;

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = SimpleRng::new(42);

    let output_path = "sample_scan.txt";
    let file = File::create(output_path)
        .with_context(|| format!("creating '{output_path}'"))?;
    let mut out = BufWriter::new(file);

    // Header region.
    writeln!(out, "Run: 1")?;
    writeln!(out, "Operator: autogen")?;
    writeln!(out, "Comment: synthetic reflectivity sweep")?;

    let slots: &[(i64, &str, f64)] = &[
        (0, "No sample", 1.0),
        (1, "Sample A", 0.62),
        (2, "Sample B", 0.38),
    ];
    for (position, label, _) in slots {
        writeln!(out, "Active: Rev.Pos:{position}, Label:{label}")?;
    }

    writeln!(
        out,
        "UNIXTime,RevPos,SamplePos,PmtPos,Wavelength,Current,CurrentStd,DC,DCStd,Temp,Humidity"
    )?;

    // Data region: per (slot, wavelength) a detector sweep with a
    // gaussian lobe around the specular angle plus noise.
    let wavelengths = [450.0, 500.0, 550.0, 600.0, 650.0];
    let detector_positions: Vec<f64> = (0..=12).map(|i| i as f64 * 5.0).collect();

    let mut timestamp = 1_752_480_000.0;
    let mut rows = 0u32;
    for (position, _, reflectance) in slots {
        for &wl in &wavelengths {
            // Mild wavelength dependence so the ratio curves have shape.
            let amplitude = reflectance * (0.6 + 0.4 * (wl - 450.0) / 200.0);
            for &pmt in &detector_positions {
                let signal = gaussian(pmt, 30.0, 8.0, amplitude) + rng.gauss(0.02, 0.002);
                let signal_std = 0.01 + 0.01 * rng.next_f64();
                let dc_std = 0.001 + 0.001 * rng.next_f64();
                let temperature = rng.gauss(21.0, 0.2);
                let humidity = rng.gauss(38.0, 1.5);

                writeln!(
                    out,
                    "{timestamp:.1},{position},0.0,{pmt:.1},{wl:.1},{signal:.6},{signal_std:.6},{dc_std:.6},0.0,{temperature:.2},{humidity:.2}"
                )?;
                timestamp += 2.0;
                rows += 1;
            }
        }
    }

    out.flush().context("flushing output")?;
    info!("wrote {rows} data rows for {} slots to {output_path}", slots.len());
    println!("Wrote {rows} data rows to {output_path}");
    Ok(())
}
