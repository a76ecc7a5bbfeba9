use std::fmt;

/// Number of species in the first generation; ids live in `1..=GEN1_SIZE`.
pub const GEN1_SIZE: u32 = 151;

const ACCUMULATOR_MODULUS: u32 = 10_000;

/// Species identifier derived from a GitHub username.
#[derive(Eq, PartialEq, Hash, Clone, Copy, Debug, PartialOrd, Ord)]
pub struct SpeciesId(u32);

impl SpeciesId {
    /// Derive the species id for `username`.
    ///
    /// Sums UTF-16 code units modulo 10000 left to right, then maps the
    /// accumulator into `1..=151`. The input is used as given: callers trim
    /// it, nothing else is normalized. The empty string maps to 1.
    pub fn derive(username: &str) -> Self {
        let sum = username
            .encode_utf16()
            .fold(0u32, |acc, unit| (acc + u32::from(unit)) % ACCUMULATOR_MODULUS);

        let id = sum % GEN1_SIZE + 1;
        log::trace!("username {:?} maps to species {}", username, id);

        SpeciesId(id)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<SpeciesId> for u32 {
    fn from(id: SpeciesId) -> Self {
        id.0
    }
}
