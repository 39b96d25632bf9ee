use rand::RngCore;

/// Hex string of `length` characters drawn from the thread-local CSPRNG.
pub fn random_string(length: usize) -> String {
    let mut bytes = vec![0u8; length.div_ceil(2)];
    rand::thread_rng().fill_bytes(&mut bytes);
    let mut encoded = hex::encode(bytes);
    encoded.truncate(length);
    encoded
}
