//! Writes a small synthetic drive-test library to `sample_library/`:
//! three parquet traces from a recent UE firmware and one CSV trace whose
//! firmware only logs MAC throughput.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

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

/// One simulated drive: one sample per second.
struct Drive {
    time: Vec<String>,
    velocity: Vec<f64>,
    bandwidth: Vec<i64>,
    prb_util: Vec<Option<f64>>,
    throughput: Vec<f64>,
}

/// Share of the physical rate left at application layer.
const APP_OVERHEAD: f64 = 0.75;

fn simulate(rng: &mut SimpleRng, samples: usize, carriers: &[i64]) -> Drive {
    let mut drive = Drive {
        time: Vec::with_capacity(samples),
        velocity: Vec::with_capacity(samples),
        bandwidth: Vec::with_capacity(samples),
        prb_util: Vec::with_capacity(samples),
        throughput: Vec::with_capacity(samples),
    };

    let parked = samples / 10;
    let hand_over_every = samples / carriers.len().max(1);
    for i in 0..samples {
        let bw = carriers[(i / hand_over_every.max(1)).min(carriers.len() - 1)];
        let velocity = if i < parked {
            0.0
        } else {
            rng.gauss(45.0, 15.0).max(0.0)
        };
        let efficiency = rng.gauss(2.5, 0.9).clamp(0.2, 5.0);
        let util = rng.gauss(70.0, 20.0).clamp(5.0, 100.0);
        // The logger occasionally misses a PRB report.
        let util_reported = (rng.next_f64() > 0.03).then_some(util);

        drive.time.push(format!("{:02}:{:02}:{:02}", i / 3600, (i / 60) % 60, i % 60));
        drive.velocity.push(velocity);
        drive.bandwidth.push(bw);
        drive.prb_util.push(util_reported);
        drive
            .throughput
            .push(efficiency * bw as f64 * 1e6 * util / 100.0 * APP_OVERHEAD);
    }
    drive
}

fn write_parquet(path: &Path, drive: &Drive) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Time", DataType::Utf8, false),
        Field::new("Velocity", DataType::Float64, false),
        Field::new("Bandwidth downlink", DataType::Int64, false),
        Field::new("PRB utilization downlink", DataType::Float64, true),
        Field::new("Application throughput downlink", DataType::Float64, false),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(
            drive.time.iter().map(String::as_str).collect::<Vec<_>>(),
        )),
        Arc::new(Float64Array::from(drive.velocity.clone())),
        Arc::new(Int64Array::from(drive.bandwidth.clone())),
        Arc::new(Float64Array::from(drive.prb_util.clone())),
        Arc::new(Float64Array::from(drive.throughput.clone())),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

/// Legacy firmware: MAC throughput column, CSV export.
fn write_legacy_csv(path: &Path, drive: &Drive) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record([
        "Time",
        "Velocity",
        "Bandwidth downlink",
        "PRB utilization downlink",
        "MAC downlink throughput",
    ])?;
    for i in 0..drive.time.len() {
        writer.write_record([
            drive.time[i].clone(),
            format!("{:.2}", drive.velocity[i]),
            drive.bandwidth[i].to_string(),
            drive.prb_util[i].map(|u| format!("{u:.1}")).unwrap_or_default(),
            format!("{:.0}", drive.throughput[i] / APP_OVERHEAD * 0.95),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let out_dir = Path::new("sample_library");
    std::fs::create_dir_all(out_dir).context("creating sample_library")?;

    let drives: [(&str, usize, &[i64]); 3] = [
        ("city_center_20mhz", 900, &[20]),
        ("suburb_mixed", 1200, &[10, 15, 20]),
        ("highway_10_15mhz", 1500, &[10, 15]),
    ];
    for (name, samples, carriers) in drives {
        let drive = simulate(&mut rng, samples, carriers);
        let path = out_dir.join(format!("{name}.parquet"));
        write_parquet(&path, &drive)?;
        println!("Wrote {samples} samples to {}", path.display());
    }

    let legacy = simulate(&mut rng, 600, &[15]);
    let path = out_dir.join("legacy_firmware.csv");
    write_legacy_csv(&path, &legacy)?;
    println!("Wrote {} samples to {}", legacy.time.len(), path.display());

    Ok(())
}
