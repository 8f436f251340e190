//! Constrained cipher-suite shuffling.
//!
//! Varies the advertised TLS cipher-suite order across client instances
//! to resist static fingerprinting while keeping modern suites dominant.
//! The shuffle is applied once when a [`TlsConfig`] is built, not per
//! request.

use rand::seq::SliceRandom;
use rand::Rng;

// TLS 1.3 suites (RFC 8446).
pub const TLS_AES_128_GCM_SHA256: u16 = 0x1301;
pub const TLS_AES_256_GCM_SHA384: u16 = 0x1302;
pub const TLS_CHACHA20_POLY1305_SHA256: u16 = 0x1303;

// Legacy suites, IANA identifiers.
pub const TLS_RSA_WITH_RC4_128_SHA: u16 = 0x0005;
pub const TLS_RSA_WITH_3DES_EDE_CBC_SHA: u16 = 0x000a;
pub const TLS_RSA_WITH_AES_128_CBC_SHA: u16 = 0x002f;
pub const TLS_RSA_WITH_AES_256_CBC_SHA: u16 = 0x0035;
pub const TLS_RSA_WITH_AES_128_CBC_SHA256: u16 = 0x003c;
pub const TLS_RSA_WITH_AES_128_GCM_SHA256: u16 = 0x009c;
pub const TLS_RSA_WITH_AES_256_GCM_SHA384: u16 = 0x009d;
pub const TLS_ECDHE_ECDSA_WITH_RC4_128_SHA: u16 = 0xc007;
pub const TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA: u16 = 0xc009;
pub const TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA: u16 = 0xc00a;
pub const TLS_ECDHE_RSA_WITH_RC4_128_SHA: u16 = 0xc011;
pub const TLS_ECDHE_RSA_WITH_3DES_EDE_CBC_SHA: u16 = 0xc012;
pub const TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA: u16 = 0xc013;
pub const TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA: u16 = 0xc014;
pub const TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA256: u16 = 0xc023;
pub const TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA256: u16 = 0xc027;
pub const TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256: u16 = 0xc02b;
pub const TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384: u16 = 0xc02c;
pub const TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256: u16 = 0xc02f;
pub const TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384: u16 = 0xc030;
pub const TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256: u16 = 0xcca8;
pub const TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256: u16 = 0xcca9;

/// Modern suites, canonical order. Index 0 never moves; indices 1 and 2
/// may swap.
pub const CIPHER_SUITES_MAIN: &[u16] = &[
    TLS_AES_128_GCM_SHA256,
    TLS_AES_256_GCM_SHA384,
    TLS_CHACHA20_POLY1305_SHA256,
];

/// Legacy tail, canonical order. Fully permuted by the shuffle.
pub const CIPHER_SUITES_EXTRA: &[u16] = &[
    TLS_RSA_WITH_RC4_128_SHA,
    TLS_RSA_WITH_3DES_EDE_CBC_SHA,
    TLS_RSA_WITH_AES_128_CBC_SHA,
    TLS_RSA_WITH_AES_256_CBC_SHA,
    TLS_RSA_WITH_AES_128_CBC_SHA256,
    TLS_RSA_WITH_AES_128_GCM_SHA256,
    TLS_RSA_WITH_AES_256_GCM_SHA384,
    TLS_ECDHE_ECDSA_WITH_RC4_128_SHA,
    TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA,
    TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA,
    TLS_ECDHE_RSA_WITH_RC4_128_SHA,
    TLS_ECDHE_RSA_WITH_3DES_EDE_CBC_SHA,
    TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA,
    TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA,
    TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA256,
    TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA256,
    TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256,
    TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,
    TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384,
    TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384,
    TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256,
    TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256,
];

/// Fresh copy of the canonical suite list, main partition first.
///
/// The canonical constants are never mutated; every call returns the
/// same order.
pub fn default_suites() -> Vec<u16> {
    let mut suites = Vec::with_capacity(CIPHER_SUITES_MAIN.len() + CIPHER_SUITES_EXTRA.len());
    suites.extend_from_slice(CIPHER_SUITES_MAIN);
    suites.extend_from_slice(CIPHER_SUITES_EXTRA);
    suites
}

/// Shuffle a suite list in place under the fingerprint-resistance
/// constraints:
///
/// - fewer than 3 suites: unchanged
/// - index 0 is always fixed
/// - indices 1 and 2 swap with probability 1/2
/// - 5 or more suites: indices `[3, len)` are uniformly permuted
///
/// Uses the thread-local generator, so concurrent construction of
/// multiple clients is safe.
pub fn shuffle_cipher_suites(suites: &mut [u16]) {
    if suites.len() < 3 {
        return;
    }
    let mut rng = rand::thread_rng();
    if rng.gen_bool(0.5) {
        suites.swap(1, 2);
    }
    if suites.len() < 5 {
        return;
    }
    suites[3..].shuffle(&mut rng);
}

/// Fresh shuffled copy of the canonical suite list.
pub fn cipher_suites() -> Vec<u16> {
    let mut suites = default_suites();
    shuffle_cipher_suites(&mut suites);
    suites
}

/// Client-side TLS parameters carried by a transport.
///
/// The canonical transport stores but does not consume these; a
/// TLS-capable [`Transport`](crate::transport::Transport) implementation
/// applies them to its ClientHello.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    /// Cipher suites in advertisement order.
    pub cipher_suites: Vec<u16>,
}

impl TlsConfig {
    /// Config advertising the canonical suite order.
    pub fn new() -> Self {
        Self {
            cipher_suites: default_suites(),
        }
    }

    /// Config with a one-shot shuffled suite order.
    pub fn shuffled() -> Self {
        Self {
            cipher_suites: cipher_suites(),
        }
    }
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Shuffle an existing config's suites in place.
pub fn shuffle_config(cfg: &mut TlsConfig) {
    shuffle_cipher_suites(&mut cfg.cipher_suites);
}
