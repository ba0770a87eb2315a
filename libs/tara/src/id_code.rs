use serde::{Deserialize, Serialize};

use crate::error::TaraError;

const ID_CODE_LEN: usize = 11;
const WEIGHTS_FIRST: [u32; 10] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 1];
const WEIGHTS_SECOND: [u32; 10] = [3, 4, 5, 6, 7, 8, 9, 1, 2, 3];

/// National identity code (isikukood), 11 ASCII digits.
///
/// Holding an `IdCode` proves the format; whether the broker knows the person
/// is only decided by the broker. The check digit is reported separately by
/// [`has_valid_checksum`](IdCode::has_valid_checksum).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdCode(String);

impl IdCode {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the last digit matches the mod-11 check digit of the first ten.
    #[must_use]
    pub fn has_valid_checksum(&self) -> bool {
        let digits: Vec<u32> = self.0.chars().filter_map(|c| c.to_digit(10)).collect();
        let Some((&check, body)) = digits.split_last() else {
            return false;
        };

        let weighted = |weights: &[u32]| -> u32 {
            body.iter().zip(weights).map(|(d, w)| d * w).sum::<u32>() % 11
        };

        let mut expected = weighted(&WEIGHTS_FIRST);
        if expected == 10 {
            expected = weighted(&WEIGHTS_SECOND);
        }
        if expected == 10 {
            expected = 0;
        }
        expected == check
    }

    /// The code with its middle digits hidden, for logs.
    #[must_use]
    pub fn masked(&self) -> String {
        self.0
            .chars()
            .enumerate()
            .map(|(i, c)| if i < 3 || i == ID_CODE_LEN - 1 { c } else { '*' })
            .collect()
    }
}

impl std::fmt::Debug for IdCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("IdCode").field(&self.masked()).finish()
    }
}

impl std::fmt::Display for IdCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for IdCode {
    type Err = TaraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.trim().to_owned())
    }
}

impl TryFrom<String> for IdCode {
    type Error = TaraError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s.len() == ID_CODE_LEN && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s))
        } else {
            Err(TaraError::login(
                format!("Invalid national identity code: expected {ID_CODE_LEN} digits"),
                None,
                None,
            ))
        }
    }
}

impl From<IdCode> for String {
    fn from(code: IdCode) -> Self {
        code.0
    }
}
