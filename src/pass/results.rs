use super::RollPass;
use crate::base::Error;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

/// Holds the results of a solved roll pass
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct PassResults {
    pub in_pillars: Vec<f64>,                // centers of the inbound pillars
    pub in_pillar_heights: Vec<f64>,         // heights of the inbound pillars
    pub in_pillar_widths: Vec<f64>,          // widths of the inbound pillars
    pub out_pillars: Vec<f64>,               // centers of the outbound pillars
    pub out_pillar_heights: Vec<f64>,        // heights of the outbound pillars
    pub out_pillar_widths: Vec<f64>,         // widths of the outbound pillars
    pub out_pillar_strains: Vec<f64>,        // accumulated strains of the outbound pillars
    pub total_pillar_draughts: Vec<f64>,     // products along the pass
    pub total_pillar_spreads: Vec<f64>,      // products along the pass
    pub total_pillar_elongations: Vec<f64>,  // products along the pass
    pub total_pillar_strain_rates: Vec<f64>, // sums along the pass
    pub spread_correction_coefficients: Vec<f64>,
    pub mean_elongation: f64,
    pub contact_area: f64,
    pub n_iterations: usize,
}

impl PassResults {
    /// Collects the results of a solved roll pass
    pub fn new(pass: &RollPass) -> Result<Self, Error> {
        let in_set = pass.in_profile()?.pillar_set();
        let out_profile = pass.out_profile()?;
        let out_set = out_profile.pillar_set();
        Ok(PassResults {
            in_pillars: in_set.pillars.as_data().to_vec(),
            in_pillar_heights: in_set.pillar_heights.as_data().to_vec(),
            in_pillar_widths: in_set.pillar_widths.as_data().to_vec(),
            out_pillars: out_set.pillars.as_data().to_vec(),
            out_pillar_heights: out_set.pillar_heights.as_data().to_vec(),
            out_pillar_widths: out_set.pillar_widths.as_data().to_vec(),
            out_pillar_strains: out_profile.pillar_strains.as_data().to_vec(),
            total_pillar_draughts: pass.total_pillar_draughts()?.as_data().to_vec(),
            total_pillar_spreads: pass.total_pillar_spreads()?.as_data().to_vec(),
            total_pillar_elongations: pass.total_pillar_elongations()?.as_data().to_vec(),
            total_pillar_strain_rates: pass.total_pillar_strain_rates()?.as_data().to_vec(),
            spread_correction_coefficients: pass.pillar_spread_correction_coefficients().as_data().to_vec(),
            mean_elongation: pass.mean_elongation()?,
            contact_area: pass.contact_area()?,
            n_iterations: pass.n_iterations(),
        })
    }

    /// Reads a JSON file containing the results
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn read_json<P>(full_path: &P) -> Result<Self, Error>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        let file = File::open(&path)?;
        let reader = BufReader::new(file);
        let results = serde_json::from_reader(reader)?;
        Ok(results)
    }

    /// Writes a JSON file with the results
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn write_json<P>(&self, full_path: &P) -> Result<(), Error>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        if let Some(p) = path.parent() {
            fs::create_dir_all(p)?;
        }
        let mut file = File::create(&path)?;
        serde_json::to_writer_pretty(&mut file, &self)?;
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
