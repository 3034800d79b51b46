//! Writes `sample_data.csv`, a small sales dataset with numeric, text and
//! boolean columns and a sprinkling of missing cells, for trying the
//! dashboard.

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

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        let i = (self.next_f64() * items.len() as f64) as usize;
        items.get(i.min(items.len() - 1)).copied().unwrap_or_default()
    }

    /// `value`, or an empty cell for roughly `missing` of the calls.
    fn maybe(&mut self, missing: f64, value: String) -> String {
        if self.next_f64() < missing {
            String::new()
        } else {
            value
        }
    }
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let regions = ["North", "South", "East", "West"];
    let products = ["Widget", "Gadget", "Gizmo"];

    let output_path = "sample_data.csv";
    let mut writer = csv::Writer::from_path(output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer.write_record([
        "order_id", "region", "product", "units", "unit_price", "discount", "revenue", "returned",
    ])?;

    let rows = 250;
    for order_id in 1..=rows {
        let region = rng.pick(&regions);
        let product = rng.pick(&products);
        let units = rng.gauss(20.0, 6.0).round().max(1.0);
        let unit_price = match product {
            "Widget" => rng.gauss(9.5, 0.8),
            "Gadget" => rng.gauss(24.0, 2.5),
            _ => rng.gauss(49.0, 5.0),
        };
        let discount = (rng.next_f64() * 0.3 * 100.0).round() / 100.0;
        let revenue = units * unit_price * (1.0 - discount);
        let returned = rng.next_f64() < 0.08;

        let record = [
            order_id.to_string(),
            rng.maybe(0.02, region.to_owned()),
            product.to_owned(),
            rng.maybe(0.05, format!("{units}")),
            format!("{unit_price:.2}"),
            rng.maybe(0.1, format!("{discount:.2}")),
            format!("{revenue:.2}"),
            if returned { "True" } else { "False" }.to_owned(),
        ];
        writer.write_record(&record)?;
    }
    writer.flush()?;

    println!("Wrote {rows} orders to {output_path}");
    Ok(())
}
