use super::DiskElement;
use crate::base::Error;
use russell_lab::Vector;

/// Multiplies a per-pillar quantity along the pass
///
/// ```text
/// total[i] = Π_e value_e[i]
/// ```
pub fn pillar_products<F>(elements: &[DiskElement], select: F) -> Result<Vector, Error>
where
    F: Fn(&DiskElement) -> &Vector,
{
    let n = npillar(elements)?;
    let mut total = Vector::filled(n, 1.0);
    for element in elements {
        let values = select(element);
        for i in 0..n {
            total[i] *= values[i];
        }
    }
    Ok(total)
}

/// Sums a per-pillar quantity along the pass
///
/// ```text
/// total[i] = Σ_e value_e[i]
/// ```
pub fn pillar_sums<F>(elements: &[DiskElement], select: F) -> Result<Vector, Error>
where
    F: Fn(&DiskElement) -> &Vector,
{
    let n = npillar(elements)?;
    let mut total = Vector::new(n);
    for element in elements {
        let values = select(element);
        for i in 0..n {
            total[i] += values[i];
        }
    }
    Ok(total)
}

/// Sums the lengths of the disk elements in which each pillar is in contact
pub fn pillar_contact_lengths(elements: &[DiskElement]) -> Result<Vector, Error> {
    let n = npillar(elements)?;
    let mut total = Vector::new(n);
    for element in elements {
        for i in 0..n {
            if element.pillars_in_contact[i] {
                total[i] += element.length;
            }
        }
    }
    Ok(total)
}

/// Computes the area-weighted harmonic mean of the pillar elongations
///
/// ```text
///           Σ Aᵢ
/// λ = ————————————
///      Σ (Aᵢ / λᵢ)
/// ```
///
/// where `Aᵢ` are the outbound pillar areas and `λᵢ` the total pillar elongations.
pub fn mean_elongation(out_areas: &Vector, total_elongations: &Vector) -> Result<f64, Error> {
    if out_areas.dim() != total_elongations.dim() {
        return Err(Error::Input("the number of areas must equal the number of elongations"));
    }
    let mut sum_areas = 0.0;
    let mut sum_reduced = 0.0;
    for i in 0..out_areas.dim() {
        if !(total_elongations[i] > 0.0) {
            return Err(Error::DegenerateGeometry(format!(
                "the total elongation of pillar {} is not positive",
                i
            )));
        }
        sum_areas += out_areas[i];
        sum_reduced += out_areas[i] / total_elongations[i];
    }
    if !(sum_reduced > 0.0) {
        return Err(Error::DegenerateGeometry("the outbound pillar areas sum to zero".to_string()));
    }
    Ok(sum_areas / sum_reduced)
}

fn npillar(elements: &[DiskElement]) -> Result<usize, Error> {
    match elements.first() {
        Some(element) => Ok(element.npillar()),
        None => Err(Error::Input("the pass has no disk elements")),
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
