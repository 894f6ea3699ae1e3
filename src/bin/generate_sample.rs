use std::path::Path;

use anyhow::{Context, Result};

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

const METADATA_HEADER: [&str; 10] = [
    "type",
    "start_time",
    "ambient_temperature",
    "battery_id",
    "test_id",
    "uid",
    "filename",
    "Capacity",
    "Re",
    "Rct",
];

/// Battery id, ambient temperature, number of cycles.
const BATTERIES: [(&str, u32, usize); 3] = [("B0005", 24, 12), ("B0006", 24, 10), ("B0018", 4, 8)];

fn write_discharge(path: &Path, capacity: f64, temp: f64, rng: &mut SimpleRng) -> Result<()> {
    let mut w = csv::Writer::from_path(path)?;
    w.write_record([
        "Voltage_measured",
        "Current_measured",
        "Temperature_measured",
        "Current_load",
        "Voltage_load",
        "Time",
    ])?;
    let steps = (capacity * 100.0) as usize;
    for i in 0..steps {
        let t = i as f64 * 18.7;
        let v = 4.2 - 1.5 * i as f64 / steps as f64 + rng.gauss(0.0, 0.005);
        let cur = -2.0 + rng.gauss(0.0, 0.002);
        let temp = temp + 10.0 * i as f64 / steps as f64 + rng.gauss(0.0, 0.05);
        w.write_record(&[
            format!("{v:.6}"),
            format!("{cur:.6}"),
            format!("{temp:.4}"),
            "-2.0".to_string(),
            format!("{:.4}", v - 0.9),
            format!("{t:.3}"),
        ])?;
    }
    w.flush()?;
    Ok(())
}

fn write_impedance(path: &Path, re: f64, rct: f64, rng: &mut SimpleRng) -> Result<()> {
    let mut w = csv::Writer::from_path(path)?;
    w.write_record([
        "Sense_current",
        "Battery_current",
        "Current_ratio",
        "Battery_impedance",
        "Rectified_Impedance",
    ])?;
    for k in 0..48 {
        let f = k as f64 / 48.0;
        let real = re + rct * f + rng.gauss(0.0, 0.001);
        let imag = -rct * 0.3 * (std::f64::consts::PI * f).sin();
        w.write_record(&[
            format!("({:.4}+{:.4}j)", 1000.0 + rng.gauss(0.0, 5.0), 0.0),
            format!("({:.4}{:+.4}j)", 200.0 + rng.gauss(0.0, 2.0), 0.0),
            format!("({:.4}{:+.4}j)", 5.0 + rng.gauss(0.0, 0.05), 0.0),
            format!("({real:.6}{imag:+.6}j)"),
            // rectified impedance only covers the first sweep points
            if k < 40 { format!("({real:.6}{:+.6}j)", imag.abs()) } else { String::new() },
        ])?;
    }
    w.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let root = Path::new("sample_dataset");
    let data_dir = root.join("data");
    std::fs::create_dir_all(&data_dir).context("creating sample_dataset/data")?;

    let mut meta = csv::Writer::from_path(root.join("metadata.csv"))?;
    meta.write_record(METADATA_HEADER)?;

    let mut uid = 0usize;
    for (battery, ambient, cycles) in BATTERIES {
        let mut capacity = 1.86 + rng.gauss(0.0, 0.01);
        let mut re = 0.045 + rng.gauss(0.0, 0.002);
        let mut rct = 0.07 + rng.gauss(0.0, 0.005);

        for test_id in 0..cycles {
            uid += 1;
            let filename = format!("{uid:05}.csv");
            let start_time = format!("[2008. 4. {}. 13. 8. 17.921]", 2 + test_id);

            if test_id % 2 == 0 {
                write_impedance(&data_dir.join(&filename), re, rct, &mut rng)?;
                // B0018 impedance runs never produced a fitted Re
                let re_cell = if battery == "B0018" { String::new() } else { format!("{re:.6}") };
                meta.write_record(&[
                    "impedance".to_string(),
                    start_time,
                    ambient.to_string(),
                    battery.to_string(),
                    test_id.to_string(),
                    uid.to_string(),
                    filename,
                    String::new(),
                    re_cell,
                    format!("{rct:.6}"),
                ])?;
                re += 0.0015 + rng.gauss(0.0, 0.0003);
                rct += 0.004 + rng.gauss(0.0, 0.001);
            } else {
                write_discharge(&data_dir.join(&filename), capacity, ambient as f64, &mut rng)?;
                meta.write_record(&[
                    "discharge".to_string(),
                    start_time,
                    ambient.to_string(),
                    battery.to_string(),
                    test_id.to_string(),
                    uid.to_string(),
                    filename,
                    format!("{capacity:.6}"),
                    String::new(),
                    String::new(),
                ])?;
                capacity -= 0.02 + rng.gauss(0.0, 0.003);
            }
        }
    }

    // A metadata row without a file, and a file without a metadata row.
    meta.write_record(["impedance", "", "24", "B0005", "99", "999", "99999.csv", "", "0.05", "0.2"])?;
    meta.flush()?;
    write_discharge(&data_dir.join("unlisted.csv"), 1.5, 24.0, &mut rng)?;

    let config = serde_json::json!({
        "data_dir": data_dir,
        "metadata_path": root.join("metadata.csv"),
        "pattern": "*.csv",
    });
    std::fs::write(root.join("impedance.json"), serde_json::to_string_pretty(&config)?)?;

    println!(
        "Wrote {uid} runs for {} batteries to {}; copy {} next to the viewer to use it",
        BATTERIES.len(),
        root.display(),
        root.join("impedance.json").display()
    );
    Ok(())
}
