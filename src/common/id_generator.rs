// src/common/id_generator.rs
//! Crockford Base32 ID Generator
//!
//! Generates human-readable, prefixed IDs using Crockford Base32 encoding.
//! Format: PREFIX_XXXXXX (e.g., T_K7NP3X for tours)

use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Entity type prefixes for ID generation
#[derive(Debug, Clone, Copy)]
pub enum EntityPrefix {
    /// Tour (T_)
    Tour,
    /// Region (R_)
    Region,
    /// Booking or custom trip request (B_)
    Booking,
    /// Testimonial (S_) - S for Story
    Testimonial,
}

impl EntityPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::Tour => "T",
            EntityPrefix::Region => "R",
            EntityPrefix::Booking => "B",
            EntityPrefix::Testimonial => "S",
        }
    }
}

fn generate_crockford_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..32);
            CROCKFORD_ALPHABET[idx] as char
        })
        .collect()
}

/// Generate a prefixed ID, e.g. "T_K7NP3X"
pub fn generate_id(prefix: EntityPrefix) -> String {
    format!("{}_{}", prefix.as_str(), generate_crockford_string(6))
}

pub fn generate_tour_id() -> String {
    generate_id(EntityPrefix::Tour)
}

pub fn generate_region_id() -> String {
    generate_id(EntityPrefix::Region)
}

pub fn generate_booking_id() -> String {
    generate_id(EntityPrefix::Booking)
}

pub fn generate_testimonial_id() -> String {
    generate_id(EntityPrefix::Testimonial)
}
