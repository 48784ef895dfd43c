/// Separator between the segments of a storage path.
pub const DB_SEPARATOR: u8 = b'/';

/// A storage key built from `/`-joined segments.
///
/// `begin()`/`end()` bound the half-open key range covering every key
/// that extends this prefix by at least one segment.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Prefix(Vec<u8>);

impl Prefix {
    pub fn new(data: &[u8]) -> Self {
        Prefix(data.to_vec())
    }

    pub fn push(&self, sub: &[u8]) -> Self {
        let mut data = self.0.clone();
        data.push(DB_SEPARATOR);
        data.extend_from_slice(sub);
        Prefix(data)
    }

    pub fn begin(&self) -> Vec<u8> {
        let mut data = self.0.clone();
        data.push(DB_SEPARATOR);
        data
    }

    pub fn end(&self) -> Vec<u8> {
        let mut data = self.begin();
        data.push(0xff);
        data
    }
}

impl AsRef<[u8]> for Prefix {
    fn as_ref(&self) -> &[u8] {
        self.0.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_paths() {
        let p = Prefix::new(b"DposDelegationStore");
        let full = p.push(b"aa").push(b"bb-01");
        assert_eq!(full.as_ref(), b"DposDelegationStore/aa/bb-01".as_ref());
        assert!(full.as_ref() > p.begin().as_slice());
        assert!(full.as_ref() < p.end().as_slice());
    }
}
