//! Password hashing and credential checks.

use rand::RngCore;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

const SALT_LEN: usize = 16;

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Salted SHA-256, stored as `salt$hexdigest`.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt = hex::encode(salt);
    let hash = digest(&salt, password);
    format!("{}${}", salt, hash)
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, hash)) => digest(salt, password) == hash,
        None => false,
    }
}

pub fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok())
        .as_ref()
        .map_or(false, |re| re.is_match(email.trim()))
}
