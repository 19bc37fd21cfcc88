use crate::record::MAX_RECORD;
use crate::{DecodeError, Record};

impl Record {
    /// Writes the ASCII form of the record (without a line terminator) and
    /// returns the number of bytes written.
    pub fn serialize<T>(&self, buffer: &mut T) -> Result<usize, DecodeError>
    where
        T: AsMut<[u8]>,
    {
        let buffer = buffer.as_mut();

        let mut bytes = [0; MAX_RECORD];
        let data_length = self.to_bytes(&mut bytes);

        let buffer_length = 2 * data_length + 1;
        if buffer.len() < buffer_length {
            return Err(DecodeError::BufferTooSmall);
        }

        buffer[0] = b':';

        if hex::encode_to_slice(&bytes[..data_length], &mut buffer[1..buffer_length]).is_err() {
            return Err(DecodeError::BufferTooSmall);
        }

        Ok(buffer_length)
    }
}
