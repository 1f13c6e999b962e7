//! Employee identifier allocation
//!
//! `NOV-KJ-2024-04217` style codes: organization prefix, initials, year and a
//! five-digit random suffix. Codes are not rechecked against the store.

use chrono::Datelike;
use rand::Rng;

/// Upper bound (exclusive) of the random suffix
pub const SUFFIX_RANGE: u32 = 99_999;

/// Initial used when a name part has no letter
const MISSING_INITIAL: char = 'X';

#[derive(Debug, Clone)]
pub struct MatriculeAllocator {
    prefix: String,
}

impl MatriculeAllocator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Matricule for the current year, random suffix from the thread RNG
    pub fn allocate(&self, nom: &str, prenom: &str) -> String {
        self.allocate_with(nom, prenom, current_year(), &mut rand::thread_rng())
    }

    pub fn allocate_with<R: Rng + ?Sized>(
        &self,
        nom: &str,
        prenom: &str,
        year: i32,
        rng: &mut R,
    ) -> String {
        format!(
            "{}-{}{}-{year}-{:05}",
            self.prefix,
            initial(nom),
            initial(prenom),
            suffix(rng)
        )
    }

    /// Name-less variant: `NOV-EMP-2024-00042`
    pub fn sequence_code<R: Rng + ?Sized>(&self, year: i32, rng: &mut R) -> String {
        format!("{}-EMP-{year}-{:05}", self.prefix, suffix(rng))
    }

    /// QR identifier: `EMP-00042`
    pub fn qr_code<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        format!("EMP-{:05}", suffix(rng))
    }
}

impl Default for MatriculeAllocator {
    fn default() -> Self {
        Self::new("NOV")
    }
}

fn current_year() -> i32 {
    chrono::Utc::now().year()
}

fn suffix<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.gen_range(0..SUFFIX_RANGE)
}

/// First letter of a name part, uppercased
fn initial(name: &str) -> char {
    name.chars()
        .find(|c| c.is_alphabetic())
        .and_then(|c| c.to_uppercase().next())
        .unwrap_or(MISSING_INITIAL)
}
