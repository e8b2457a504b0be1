// Small helpers shared by the row model, the exporters and the SQLite adapter

pub mod fingerprint {
    use sha2::{Digest, Sha256};

    /// Canonical field encoder backed by SHA-256.
    ///
    /// Each field is written as `tag, len (u64 LE), bytes`, so two different
    /// field sequences never serialize to the same byte stream.
    pub struct Canonical {
        hasher: Sha256,
    }

    impl Default for Canonical {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Canonical {
        #[must_use]
        pub fn new() -> Self {
            Self { hasher: Sha256::new() }
        }

        pub fn field(&mut self, tag: u8, bytes: &[u8]) -> &mut Self {
            self.hasher.update([tag]);
            self.hasher.update((bytes.len() as u64).to_le_bytes());
            self.hasher.update(bytes);
            self
        }

        #[must_use]
        pub fn finish(self) -> [u8; 32] {
            let digest = self.hasher.finalize();
            let mut out = [0u8; 32];
            out.copy_from_slice(&digest);
            out
        }
    }
}

pub mod hex {
    use std::fmt::Write as _;

    // Lowercase hex, two digits per byte
    #[must_use]
    pub fn encode(bytes: &[u8]) -> String {
        let mut s = String::with_capacity(bytes.len() * 2);
        for b in bytes {
            let _ = write!(s, "{b:02x}");
        }
        s
    }
}

pub mod ident {
    /// Quote an SQL identifier with double quotes, doubling embedded quotes.
    #[must_use]
    pub fn quote(name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_fields_do_not_run_together() {
        let mut a = fingerprint::Canonical::new();
        a.field(1, b"ab").field(1, b"c");
        let mut b = fingerprint::Canonical::new();
        b.field(1, b"a").field(1, b"bc");
        assert_ne!(a.finish(), b.finish());
    }

    #[test]
    fn hex_is_lowercase_and_padded() {
        assert_eq!(hex::encode(&[0x00, 0x0f, 0xab]), "000fab");
        assert_eq!(hex::encode(&[]), "");
    }

    #[test]
    fn quote_doubles_embedded_quotes() {
        assert_eq!(ident::quote("users"), "\"users\"");
        assert_eq!(ident::quote("we\"ird"), "\"we\"\"ird\"");
    }
}
