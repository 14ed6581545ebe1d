//! SI quantity types at the crate boundaries. Inside the solver everything
//! is plain f64 in bar, K, grams and m/s.

use uom::si::f64::{
    Mass as UomMass, MassDensity as UomMassDensity, Pressure as UomPressure,
    ThermodynamicTemperature as UomThermodynamicTemperature, Velocity as UomVelocity,
};

pub type Mass = UomMass;
pub type Density = UomMassDensity;
pub type Pressure = UomPressure;
pub type Temperature = UomThermodynamicTemperature;
pub type Velocity = UomVelocity;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn bar(v: f64) -> Pressure {
    use uom::si::pressure::bar;
    Pressure::new::<bar>(v)
}

#[inline]
pub fn atm(v: f64) -> Pressure {
    use uom::si::pressure::atmosphere;
    Pressure::new::<atmosphere>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn kg(v: f64) -> Mass {
    use uom::si::mass::kilogram;
    Mass::new::<kilogram>(v)
}

#[inline]
pub fn grams(v: f64) -> Mass {
    use uom::si::mass::gram;
    Mass::new::<gram>(v)
}

#[inline]
pub fn kgpm3(v: f64) -> Density {
    use uom::si::mass_density::kilogram_per_cubic_meter;
    Density::new::<kilogram_per_cubic_meter>(v)
}

#[inline]
pub fn mps(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}

#[inline]
pub fn to_bar(p: Pressure) -> f64 {
    p.get::<uom::si::pressure::bar>()
}

#[inline]
pub fn to_pa(p: Pressure) -> f64 {
    p.get::<uom::si::pressure::pascal>()
}

#[inline]
pub fn to_k(t: Temperature) -> f64 {
    t.get::<uom::si::thermodynamic_temperature::kelvin>()
}

#[inline]
pub fn to_grams(m: Mass) -> f64 {
    m.get::<uom::si::mass::gram>()
}

#[inline]
pub fn to_mps(v: Velocity) -> f64 {
    v.get::<uom::si::velocity::meter_per_second>()
}

#[inline]
pub fn to_kgpm3(d: Density) -> f64 {
    d.get::<uom::si::mass_density::kilogram_per_cubic_meter>()
}

pub mod constants {
    /// Standard gravity, m/s².
    pub const G0_MPS2: f64 = 9.806_65;

    /// Universal gas constant, J/(mol K).
    pub const R_J_PER_MOL_K: f64 = 8.314_462_618;

    /// Standard-state reference pressure of the thermodynamic fits, bar.
    pub const P_REF_BAR: f64 = 1.0;

    /// Reference temperature for heats of formation, K.
    pub const T_REF_K: f64 = 298.15;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        let _p = pa(101_325.0);
        let _t = k(300.0);
        let _m = kg(1.2);
        let _rho = kgpm3(1000.0);
        let _v = mps(2000.0);
    }

    #[test]
    fn pressure_readers_agree() {
        let p = atm(1.0);
        assert!((to_pa(p) - 101_325.0).abs() < 1e-6);
        assert!((to_bar(p) - 1.013_25).abs() < 1e-12);
        assert!((to_bar(bar(53.317)) - 53.317).abs() < 1e-12);
    }

    #[test]
    fn mass_readers_agree() {
        assert!((to_grams(kg(0.25)) - 250.0).abs() < 1e-9);
        assert!((to_grams(grams(3.0)) - 3.0).abs() < 1e-12);
    }
}
