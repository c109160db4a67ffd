use bytes::{Buf, BufMut};
use commonware_codec::{Error, FixedSize, ReadExt, Write};

/// Helper to write a fixed-length array of `u64` counters.
pub fn write_u64_array<const N: usize>(values: &[u64; N], writer: &mut impl BufMut) {
    for value in values {
        value.write(writer);
    }
}

/// Helper to read a fixed-length array of `u64` counters.
pub fn read_u64_array<const N: usize>(reader: &mut impl Buf) -> Result<[u64; N], Error> {
    if reader.remaining() < N * u64::SIZE {
        return Err(Error::EndOfBuffer);
    }
    let mut values = [0u64; N];
    for value in values.iter_mut() {
        *value = u64::read(reader)?;
    }
    Ok(values)
}

/// Helper to get encode size of a fixed-length `u64` array.
pub fn u64_array_encode_size<const N: usize>(_: &[u64; N]) -> usize {
    N * u64::SIZE
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn read_u64_array_rejects_truncated_buffers() {
        let mut buf = BytesMut::new();
        write_u64_array(&[1u64, 2, 3], &mut buf);

        let mut reader = &buf[..buf.len() - 1];
        let err = read_u64_array::<3>(&mut reader).expect_err("should reject truncated buffer");
        assert!(matches!(err, Error::EndOfBuffer));
    }

    #[test]
    fn u64_array_preserves_order() {
        let values = [7u64, 0, u64::MAX, 42];
        let mut buf = BytesMut::new();
        write_u64_array(&values, &mut buf);
        assert_eq!(buf.len(), u64_array_encode_size(&values));

        let mut reader = buf.as_ref();
        assert_eq!(read_u64_array::<4>(&mut reader).unwrap(), values);
        assert!(reader.is_empty());
    }
}
