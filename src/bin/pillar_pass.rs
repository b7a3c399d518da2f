use env_logger::Env;
use log::info;
use pillarsim::prelude::*;
use std::path::Path;
use structopt::StructOpt;

/// Command line options
#[derive(StructOpt, Debug)]
#[structopt(
    name = "pillar_pass",
    about = "Rolls a round bar through a flat pass with the pillar model and writes the results"
)]
struct Options {
    /// Diameter of the round bar
    #[structopt(long, default_value = "19.5")]
    diameter: f64,

    /// Roll gap
    #[structopt(long, default_value = "10.0")]
    gap: f64,

    /// Roll radius
    #[structopt(long, default_value = "160.0")]
    radius: f64,

    /// Number of pillars
    #[structopt(long, default_value = "10")]
    pillars: usize,

    /// Number of disk elements
    #[structopt(long, default_value = "15")]
    disks: usize,

    /// Uses uniform-area pillars instead of equidistant ones
    #[structopt(long)]
    uniform: bool,

    /// Disables the spread correction
    #[structopt(long)]
    no_correction: bool,

    /// Adds the corner-correction strain
    #[structopt(long)]
    corner: bool,

    /// Exponent of the draught-power spread law (zero means no spread)
    #[structopt(long, default_value = "0.0")]
    spread_exponent: f64,

    /// Prints the spread-correction iterations
    #[structopt(short, long)]
    verbose: bool,

    /// Output JSON file
    #[structopt(long, default_value = "/tmp/pillarsim/results/pillar_pass.json")]
    out: String,
}

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    // parse options
    let options = Options::from_args();

    // configuration
    let mut config = Config::new();
    config
        .set_pillar_count(options.pillars)?
        .set_pillar_type(if options.uniform {
            PillarType::UniformArea
        } else {
            PillarType::Equidistant
        })?
        .set_elongation_correction(!options.no_correction)?
        .set_corner_correction(options.corner)?
        .set_verbose(options.verbose)?;
    info!("\n{}", config);

    // inbound profile
    let discretizer = Discretizer::new(&config)?;
    let section = SampleSections::round(options.diameter)?;
    let profile = PillarProfile::new(section, &discretizer)?;

    // roll pass
    let roll = FlatRoll::new(options.radius)?;
    let mut pass = RollPass::new(Box::new(roll), options.gap, 1.0, options.disks)?;
    if options.spread_exponent > 0.0 {
        pass.set_spread_law(Box::new(DraughtPowerSpread::new(options.spread_exponent)?));
    }
    pass.solve(profile, &config)?;

    // results
    let results = PassResults::new(&pass)?;
    results.write_json(&options.out)?;
    let out = pass.out_profile()?;
    info!(
        "out width = {:.4}, out height = {:.4}, mean elongation = {:.6}",
        out.width(),
        out.height(),
        results.mean_elongation
    );
    let path = Path::new(&options.out);
    let thin_line = format!("{:─^1$}", "", options.out.len());
    println!("\n\n{}", thin_line);
    println!("Results written to:");
    println!("{}", path.display());
    println!("{}\n\n", thin_line);
    Ok(())
}
