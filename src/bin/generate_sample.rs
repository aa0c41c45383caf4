use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

/// Write synthetic `dry_mass`, `entropy` and `energy` files in the model's
/// tab separated integral format.
#[derive(Parser, Debug)]
#[command(about = "Generate sample integral files")]
struct Args {
    /// Target directory
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Number of output steps
    #[arg(long, default_value_t = 240)]
    steps: u32,

    /// Seconds between output steps
    #[arg(long, default_value_t = 900)]
    interval: u32,
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

    /// Uniform in [-1, 1).
    fn next_signed(&mut self) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        2.0 * unit - 1.0
    }
}

fn create(dir: &Path, name: &str) -> Result<BufWriter<File>> {
    let path = dir.join(name);
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn main() -> Result<()> {
    let args = Args::parse();
    std::fs::create_dir_all(&args.dir)
        .with_context(|| format!("creating {}", args.dir.display()))?;
    let mut rng = SimpleRng::new(42);

    let mut dry_mass = create(&args.dir, "dry_mass")?;
    let mut entropy = create(&args.dir, "entropy")?;
    let mut energy = create(&args.dir, "energy")?;

    // Earth-atmosphere sized integrals
    let mass0 = 5.1e18;
    let entropy0 = 1.52e21;
    let (kinetic0, potential0, internal0) = (7.5e20, 1.3e24, 3.7e24);

    for step in 0..args.steps {
        let t = u64::from(step) * u64::from(args.interval);
        let phase = f64::from(step) / f64::from(args.steps.max(1));

        let mass = mass0 * (1.0 + 1e-9 * phase + 1e-11 * rng.next_signed());
        writeln!(dry_mass, "{t}\t{mass:.6}")?;

        let s = entropy0 * (1.0 + 2e-6 * phase + 1e-8 * rng.next_signed());
        writeln!(entropy, "{t}\t{s:.6}")?;

        // Kinetic energy spins up from rest, drawing on internal energy.
        let spin_up = 1.0 - (-6.0 * phase).exp();
        let kinetic = kinetic0 * (spin_up + 0.02 * rng.next_signed().abs());
        let potential = potential0 * (1.0 - 1e-5 * spin_up);
        let internal = internal0 - kinetic - 2e-5 * potential0 * phase;
        writeln!(energy, "{t}\t{kinetic:.6}\t{potential:.6}\t{internal:.6}")?;
    }

    for mut file in [dry_mass, entropy, energy] {
        file.flush()?;
    }

    println!(
        "Wrote {} samples to {}/{{dry_mass,entropy,energy}}",
        args.steps,
        args.dir.display()
    );
    Ok(())
}
