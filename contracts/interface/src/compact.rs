use thiserror::Error;

/// Ordered set of compact calls carried by `WalletInstruction::ExecuteBatch`.
///
/// Instead of repeating full public keys, each call indexes into the account
/// list of the batch instruction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompactCalls {
    pub inner_calls: Vec<CompactCall>,
}

/// A single call in compact format.
///
/// # Fields
/// * `program_id_index` - Index of the target program in the account list
/// * `value` - Lamports funded into the first writable account before the call
/// * `accounts` - Indexes of accounts used by this call
/// * `data` - Raw instruction data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactCall {
    pub program_id_index: u8,
    pub value: u64,
    pub accounts: Vec<u8>,
    pub data: Vec<u8>,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompactError {
    #[error("Batch has {0} calls, max 255")]
    TooManyCalls(usize),

    #[error("Call references {0} accounts, max 255")]
    TooManyAccounts(usize),

    #[error("Call data is {0} bytes, max 65535")]
    DataTooLong(usize),

    #[error("Compact call data truncated")]
    Truncated,
}

impl CompactCalls {
    /// Serializes the calls into bytes.
    ///
    /// The byte format is:
    /// 1. Number of calls (u8)
    /// 2. For each call:
    ///    - Program ID index (u8)
    ///    - Value (u64 LE)
    ///    - Number of accounts (u8)
    ///    - Account indexes (u8 array)
    ///    - Data length (u16 LE)
    ///    - Call data (bytes)
    pub fn into_bytes(&self) -> Result<Vec<u8>, CompactError> {
        let count = u8::try_from(self.inner_calls.len())
            .map_err(|_| CompactError::TooManyCalls(self.inner_calls.len()))?;
        let mut bytes = vec![count];
        for call in self.inner_calls.iter() {
            bytes.extend(call.to_bytes()?);
        }
        Ok(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CompactError> {
        let (&count, mut rest) = bytes.split_first().ok_or(CompactError::Truncated)?;
        let mut inner_calls = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let (call, remaining) = CompactCall::from_bytes(rest)?;
            inner_calls.push(call);
            rest = remaining;
        }
        Ok(Self { inner_calls })
    }
}

impl CompactCall {
    /// Serialize this call.
    /// Format: [program_id_index: u8][value: u64][num_accounts: u8][accounts...][data_len: u16][data...]
    pub fn to_bytes(&self) -> Result<Vec<u8>, CompactError> {
        let num_accounts = u8::try_from(self.accounts.len())
            .map_err(|_| CompactError::TooManyAccounts(self.accounts.len()))?;
        let data_len = u16::try_from(self.data.len())
            .map_err(|_| CompactError::DataTooLong(self.data.len()))?;

        let mut bytes = Vec::with_capacity(12 + self.accounts.len() + self.data.len());
        bytes.push(self.program_id_index);
        bytes.extend_from_slice(&self.value.to_le_bytes());
        bytes.push(num_accounts);
        bytes.extend_from_slice(&self.accounts);
        bytes.extend_from_slice(&data_len.to_le_bytes());
        bytes.extend_from_slice(&self.data);
        Ok(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), CompactError> {
        // Minimum: program_id(1) + value(8) + num_accounts(1) + data_len(2)
        if bytes.len() < 12 {
            return Err(CompactError::Truncated);
        }

        let program_id_index = bytes[0];
        let mut value = [0u8; 8];
        value.copy_from_slice(&bytes[1..9]);
        let num_accounts = bytes[9] as usize;

        let data_len_offset = 10 + num_accounts;
        if bytes.len() < data_len_offset + 2 {
            return Err(CompactError::Truncated);
        }
        let accounts = bytes[10..data_len_offset].to_vec();
        let data_len =
            u16::from_le_bytes([bytes[data_len_offset], bytes[data_len_offset + 1]]) as usize;

        let data_start = data_len_offset + 2;
        if bytes.len() < data_start + data_len {
            return Err(CompactError::Truncated);
        }

        Ok((
            CompactCall {
                program_id_index,
                value: u64::from_le_bytes(value),
                accounts,
                data: bytes[data_start..data_start + data_len].to_vec(),
            },
            &bytes[data_start + data_len..],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_call_order() {
        let calls = CompactCalls {
            inner_calls: vec![
                CompactCall {
                    program_id_index: 2,
                    value: 100,
                    accounts: vec![0, 1],
                    data: vec![17],
                },
                CompactCall {
                    program_id_index: 0,
                    value: 0,
                    accounts: vec![],
                    data: vec![1, 2, 3],
                },
            ],
        };
        let bytes = calls.into_bytes().unwrap();
        assert_eq!(bytes[0], 2);
        assert_eq!(CompactCalls::from_bytes(&bytes).unwrap(), calls);
    }

    #[test]
    fn rejects_oversized_data() {
        let call = CompactCall {
            program_id_index: 0,
            value: 0,
            accounts: vec![],
            data: vec![0u8; u16::MAX as usize + 1],
        };
        assert_eq!(
            call.to_bytes(),
            Err(CompactError::DataTooLong(u16::MAX as usize + 1))
        );
    }

    #[test]
    fn truncated_input_is_an_error() {
        assert_eq!(CompactCalls::from_bytes(&[]), Err(CompactError::Truncated));
        assert_eq!(
            CompactCalls::from_bytes(&[1, 0, 0]),
            Err(CompactError::Truncated)
        );
    }
}
