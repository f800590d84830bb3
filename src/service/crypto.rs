use sha3::{Digest, Sha3_256};

pub fn get_sha3_256_hash(data: &str) -> String {
    let mut hasher = Sha3_256::default();
    hasher.update(data.as_bytes());
    format!("{:X}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashing_is_deterministic_and_input_sensitive() {
        assert_eq!(get_sha3_256_hash("hunter22"), get_sha3_256_hash("hunter22"));
        assert_ne!(get_sha3_256_hash("hunter22"), get_sha3_256_hash("hunter23"));
        assert_eq!(get_sha3_256_hash("hunter22").len(), 64);
    }
}
